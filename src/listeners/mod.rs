pub mod json;
pub mod text;

pub use json::{JsonGraphListener, SharedJsonGraphListener};
pub use text::TextListener;
