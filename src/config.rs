//! Configuration schema, loading and persistence.
//!
//! Settings live in a small JSON document. Loading goes through the `config`
//! crate so `ARRIVO__*` environment variables can override file values;
//! saving writes the document back with `serde_json`.

mod load;
mod schema;
mod store;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;
pub use store::ConfigStore;
