pub mod articulation;
pub mod basic_chord;
pub mod chord;
pub mod dynamics;
pub mod envelope;
pub mod ornament;
pub mod settings;

pub use articulation::*;
pub use basic_chord::*;
pub use chord::*;
pub use dynamics::*;
pub use envelope::*;
pub use ornament::*;
pub use settings::*;
