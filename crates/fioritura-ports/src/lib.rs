pub mod midi;
pub mod types;

pub use midi::*;
pub use types::*;
