pub mod api_client;
pub mod catalog;
pub mod configuration;
pub mod dom;
pub mod foundation;
pub mod page;
pub mod session;
pub mod startup;

pub use api_client::{DataSource, FetchError, HttpDataSource};
pub use configuration::*;
pub use foundation::database::*;
pub use page::{PageController, Route};
