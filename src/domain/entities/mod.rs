//! Domain entities - Data the runtime routes between transports and plugins

pub mod command;
pub mod event;
pub mod message;
pub mod task;

pub use command::{Command, CommandHandler};
pub use event::TransportEvent;
pub use message::{Attachment, InboundMessage};
pub use task::{Schedule, Task, TaskHandler};
