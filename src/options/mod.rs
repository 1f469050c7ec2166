pub mod catalog;
pub mod custom;
pub mod resolver;

pub use catalog::{OptionCatalog, OptionEntry};
pub use custom::{normalize_value, AddOutcome, CustomOptionStore};
pub use resolver::OptionResolver;
