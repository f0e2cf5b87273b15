mod catalog;
mod loader;

pub use catalog::{Catalog, LoadError};
pub(crate) use catalog::checked;
pub use loader::{load_question_sets_from_json, FileCatalog};
