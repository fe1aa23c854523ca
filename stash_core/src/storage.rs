/// Failures reported by a backing store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage is unavailable")]
    Unavailable,
    #[error("Storage is disabled")]
    Disabled,
    #[error("Quota exceeded while writing {key}")]
    QuotaExceeded { key: String },
    #[error("Platform error: {0}")]
    Platform(String),
}

/// A string-to-string store such as the browser's `localStorage`.
///
/// Methods take `&self`; stores that need mutation use interior
/// mutability, like the platform ones do.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove_item(&self, key: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove_item(key)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}
