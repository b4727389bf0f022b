//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod store;
pub mod device;

pub use bot::{Bot, BotInfo, KeyboardButton, Reply};
pub use store::AuthStore;
pub use device::DeviceClient;
