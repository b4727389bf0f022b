//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (User, Message, Command, DeviceRequest)
//! - Traits: Abstractions for infrastructure (Bot, AuthStore, DeviceClient)

pub mod entities;
pub mod traits;
