pub mod dispatcher;
pub mod schedule;
pub mod scheduler;

pub use dispatcher::*;
pub use schedule::*;
pub use scheduler::*;
