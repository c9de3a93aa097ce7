use fioritura_ports::{
    ChannelMessage, DeviceId, MidiError, MidiOutputDevice, OutputPort, SendError,
};
use midir::{MidiOutput, MidiOutputConnection};

pub struct MidirMidiOutputPort {
    client_name: String,
}

impl MidirMidiOutputPort {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }

    fn create_midi_out(&self) -> Result<MidiOutput, MidiError> {
        let midi_out =
            MidiOutput::new(&self.client_name).map_err(|e| MidiError::Backend(e.to_string()))?;
        Ok(midi_out)
    }

    fn device_id(index: usize, name: &str) -> DeviceId {
        DeviceId(format!("midir:{}:{}", index, name))
    }

    pub fn list_outputs(&self) -> Result<Vec<MidiOutputDevice>, MidiError> {
        let midi_out = self.create_midi_out()?;
        let ports = midi_out.ports();
        let mut devices = Vec::new();

        for (index, port) in ports.iter().enumerate() {
            let name = midi_out
                .port_name(port)
                .unwrap_or_else(|_| "Unknown Output".to_string());
            devices.push(MidiOutputDevice {
                id: Self::device_id(index, &name),
                name,
                is_available: true,
            });
        }

        Ok(devices)
    }

    pub fn open_output(&self, device_id: &DeviceId) -> Result<MidirOutputStream, MidiError> {
        let midi_out = self.create_midi_out()?;

        let ports = midi_out.ports();
        let mut selected = None;
        for (index, port) in ports.iter().enumerate() {
            let name = midi_out
                .port_name(port)
                .unwrap_or_else(|_| "Unknown Output".to_string());
            let id = Self::device_id(index, &name);
            if &id == device_id {
                selected = Some(port.clone());
                break;
            }
        }

        let port = selected.ok_or_else(|| MidiError::DeviceNotFound(device_id.to_string()))?;

        let connection = midi_out
            .connect(&port, "fioritura-midi-output")
            .map_err(|e| MidiError::Backend(e.to_string()))?;

        Ok(MidirOutputStream {
            connection: Some(connection),
        })
    }
}

impl Default for MidirMidiOutputPort {
    fn default() -> Self {
        Self::new("Fioritura")
    }
}

pub struct MidirOutputStream {
    connection: Option<MidiOutputConnection>,
}

impl MidirOutputStream {
    pub fn close(mut self) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
        }
    }
}

fn encode(message: ChannelMessage) -> Vec<u8> {
    match message {
        ChannelMessage::NoteOn {
            channel,
            note,
            velocity,
        } => vec![0x90 | channel.get(), note, velocity],
        ChannelMessage::NoteOff {
            channel,
            note,
            velocity,
        } => vec![0x80 | channel.get(), note, velocity],
        ChannelMessage::ControlChange {
            channel,
            controller,
            value,
        } => vec![0xB0 | channel.get(), controller, value],
        ChannelMessage::ProgramChange { channel, program } => {
            vec![0xC0 | channel.get(), program]
        }
        // Coarse value duplicated into both data bytes, centring the fine part.
        ChannelMessage::PitchWheel { channel, value } => {
            vec![0xE0 | channel.get(), value, value]
        }
    }
}

impl OutputPort for MidirOutputStream {
    fn send(&mut self, message: ChannelMessage) -> Result<(), SendError> {
        let connection = self.connection.as_mut().ok_or(SendError::Disconnected)?;
        connection
            .send(&encode(message))
            .map_err(|e| SendError::Backend(e.to_string()))
    }
}
