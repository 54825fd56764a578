//! Storage layer: the durable set of already-announced holidays.

mod error;
pub use error::StoreError;

mod notified;
pub use notified::NotifiedStore;
