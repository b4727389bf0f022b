//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Command routing and transport bridging
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing and reply templates

pub mod errors;
pub mod services;
pub mod messaging;
