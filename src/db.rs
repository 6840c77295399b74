pub mod repository;
pub use repository::{Record, Repository, Scope};
pub mod local_store;
pub use local_store::{keys, LocalStore};
