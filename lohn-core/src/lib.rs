pub mod calculations;
pub mod db;
pub mod models;

pub use db::repository::{InsurerRepository, RepositoryError};
pub use models::*;
