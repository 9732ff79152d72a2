//! Persistence boundary for achievement state.

mod json;
mod memory;
mod traits;

pub use json::JsonStateStore;
pub use memory::InMemoryStateStore;
pub use traits::{PersistedState, StateStore, StorageError};
