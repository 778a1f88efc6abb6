pub mod formatter;
pub mod generator;

pub use formatter::format_prompt;
pub use generator::{PromptGenerator, DEFAULT_MODEL, DEFAULT_SYSTEM_CONTENT};
