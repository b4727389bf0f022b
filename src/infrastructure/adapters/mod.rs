//! Chat transport adapters

pub mod console;
pub mod telegram;

pub use console::ConsoleAdapter;
pub use telegram::TelegramAdapter;
