use crate::error::Result;

pub mod card_store;
pub mod expiry;
pub mod memory_storage;
pub mod record;

#[cfg(feature = "file-storage")]
pub mod file_storage;

pub use card_store::CardStore;
pub use expiry::{ArmOutcome, ExpiryScheduler, ManualTimer, Timer};
pub use memory_storage::MemoryStore;
pub use record::ColumnRecord;

#[cfg(not(target_arch = "wasm32"))]
pub use expiry::TokioTimer;

#[cfg(feature = "file-storage")]
pub use file_storage::FileStore;

/// String key/value storage scoped to one origin or profile.
///
/// Calls are synchronous. There is no cross-key transaction and no
/// coordination between processes sharing the same backing store.
pub trait KeyValueStore {
    /// Returns the stored value, or `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
