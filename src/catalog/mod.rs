mod expandable;
mod nodes;
mod photo;
mod views;

pub use expandable::*;
pub use nodes::*;
pub use photo::{CaptionSlot, PhotoPresenter};
pub use views::*;
