mod data_source;
mod fetch_error;

pub use data_source::*;
pub use fetch_error::FetchError;
