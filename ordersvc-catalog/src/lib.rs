pub mod catalog;
pub mod selector;

pub use catalog::{Catalog, CatalogError};
pub use selector::{OrderSelector, RandomSelector};
