//! Platform key-value store
//!
//! Browser builds persist to LocalStorage; native builds keep everything in
//! memory for the life of the process.

use crate::persistence::StorageError;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorageStore as PlatformStore;

#[cfg(not(target_arch = "wasm32"))]
pub use crate::persistence::MemoryStore as PlatformStore;

/// Open the platform's default store
#[cfg(target_arch = "wasm32")]
pub fn open() -> Result<PlatformStore, StorageError> {
    PlatformStore::open()
}

/// Open the platform's default store
#[cfg(not(target_arch = "wasm32"))]
pub fn open() -> Result<PlatformStore, StorageError> {
    Ok(PlatformStore::new())
}

#[cfg(target_arch = "wasm32")]
mod local {
    use super::*;
    use crate::persistence::KeyValueStore;

    /// Window LocalStorage
    #[derive(Debug, Clone)]
    pub struct LocalStorageStore {
        storage: web_sys::Storage,
    }

    impl LocalStorageStore {
        pub fn open() -> Result<Self, StorageError> {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()
                .ok_or_else(|| StorageError::Unavailable("LocalStorage not available".into()))?;
            Ok(Self { storage })
        }
    }

    fn js_err(e: wasm_bindgen::JsValue) -> StorageError {
        StorageError::Unavailable(format!("{:?}", e))
    }

    impl KeyValueStore for LocalStorageStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.storage.get_item(key).map_err(js_err)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            self.storage.set_item(key, value).map_err(js_err)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.storage.remove_item(key).map_err(js_err)
        }
    }
}
