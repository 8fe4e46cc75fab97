mod favourites;
mod models;
mod operations;

pub use favourites::Favourites;
pub use models::*;
pub use operations::*;
