//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod command;
pub mod device;

pub use user::User;
pub use message::{Message, MessageType, Content};
pub use command::{Command, Invocation, InvocationSource, ScheduleSpec};
pub use device::{Capability, CommandResult, DeviceRequest, Fields, Params};
