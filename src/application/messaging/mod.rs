//! Message handling - Parsing input and rendering replies

pub mod parser;
pub mod reply;

pub use parser::MessageParser;
