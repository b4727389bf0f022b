//! greenhouse-bot - chat remote control for a plant watering controller

pub mod domain;
pub mod application;
pub mod infrastructure;
