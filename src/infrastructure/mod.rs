//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: In-memory authorization set
//! - Device: HTTP client for the watering controller
//! - Adapters: Platform integrations (Telegram, console)

pub mod config;
pub mod storage;
pub mod device;
pub mod adapters;
