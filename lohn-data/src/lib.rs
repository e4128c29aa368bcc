pub mod loader;

pub use loader::{InsurerLoader, InsurerLoaderError, InsurerRecord};
