mod document;
mod event;
pub mod render;

pub use document::*;
pub use event::*;
