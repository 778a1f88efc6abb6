pub mod image;
pub mod prompt;
pub mod slack;
pub mod text;

pub use image::*;
pub use prompt::*;
pub use slack::*;
pub use text::*;
