use log::warn;
use stash_core::{
    Accessor, Stash,
    storage::{KeyValueStore, StoreError},
};
use wasm_bindgen::{JsCast, JsValue};

const QUOTA_ERROR_NAMES: [&str; 2] = ["QuotaExceededError", "NS_ERROR_DOM_QUOTA_REACHED"];

fn platform<E: std::fmt::Debug>(err: E) -> StoreError {
    StoreError::Platform(format!("{err:?}"))
}

/// `name` is the `DOMException` name, when the thrown value is one.
fn write_error(key: &str, name: Option<&str>, detail: String) -> StoreError {
    match name {
        Some(name) if QUOTA_ERROR_NAMES.contains(&name) => StoreError::QuotaExceeded {
            key: key.to_owned(),
        },
        _ => StoreError::Platform(detail),
    }
}

/// `window.localStorage` or `window.sessionStorage`.
pub struct WebStorage {
    storage: web_sys::Storage,
}

impl From<web_sys::Storage> for WebStorage {
    fn from(storage: web_sys::Storage) -> Self {
        Self { storage }
    }
}

impl WebStorage {
    /// `Ok(None)` when the browser hands out `null` for disabled storage;
    /// `Err` when merely touching the property throws.
    pub fn local() -> Result<Option<Self>, StoreError> {
        let window = web_sys::window().ok_or(StoreError::Unavailable)?;
        window
            .local_storage()
            .map(|x| x.map(Self::from))
            .map_err(platform)
    }

    pub fn session() -> Result<Option<Self>, StoreError> {
        let window = web_sys::window().ok_or(StoreError::Unavailable)?;
        window
            .session_storage()
            .map(|x| x.map(Self::from))
            .map_err(platform)
    }
}

impl KeyValueStore for WebStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(platform)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(|err: JsValue| {
            let name = err.dyn_ref::<web_sys::DomException>().map(|e| e.name());
            write_error(key, name.as_deref(), format!("{err:?}"))
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.storage.remove_item(key).map_err(platform)
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.storage.clear().map_err(platform)
    }
}

fn open(name: &str, storage: Result<Option<WebStorage>, StoreError>) -> Option<WebStorage> {
    match storage {
        Ok(Some(storage)) => Some(storage),
        Ok(None) => {
            warn!("{name} is null, storage is disabled");
            None
        }
        Err(err) => {
            warn!("{name} is not accessible: {err}");
            None
        }
    }
}

/// Accessors over the page's local and session storage. A store the
/// browser refuses to hand out makes its operations report
/// `STORAGE_ERROR`.
#[must_use]
pub fn browser_stash() -> Stash<WebStorage, WebStorage> {
    Stash::new(
        Accessor::from(open("localStorage", WebStorage::local())),
        Accessor::from(open("sessionStorage", WebStorage::session())),
    )
}
