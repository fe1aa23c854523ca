use crate::storage::{KeyValueStore, StoreError};
use log::debug;
use serde::{Deserialize, Serialize};
use stash_common::{CodecConfig, CodecError, Storable, decode, encode};
use std::fmt;

/// Outcome of an accessor operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    /// Nothing is stored under the key.
    Absent,
    /// The stored entry does not have the fallback's shape.
    TypeError,
    /// The entry could not be parsed or the value could not be serialized.
    JsonError,
    /// The value contains a non-finite number and the codec rejects those.
    NumberError,
    /// The backing store failed or is unusable.
    StorageError,
}

impl Status {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Absent => "ABSENT",
            Status::TypeError => "TYPE_ERROR",
            Status::JsonError => "JSON_ERROR",
            Status::NumberError => "NUMBER_ERROR",
            Status::StorageError => "STORAGE_ERROR",
        }
    }

    #[must_use]
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&CodecError> for Status {
    fn from(err: &CodecError) -> Self {
        match err {
            CodecError::Parse(_) | CodecError::Serialize(_) => Status::JsonError,
            CodecError::Shape { .. } => Status::TypeError,
            CodecError::Range(_) => Status::NumberError,
        }
    }
}

impl From<&StoreError> for Status {
    fn from(_: &StoreError) -> Self {
        Status::StorageError
    }
}

/// Result of every accessor operation.
///
/// `value` is usable whatever the status: on failure it holds the
/// fallback (for reads) or the value the caller tried to write.
#[derive(Clone, Debug, PartialEq)]
pub struct Response<T> {
    pub status: Status,
    pub value: T,
}

impl<T> Response<T> {
    fn new(status: Status, value: T) -> Self {
        Self { status, value }
    }

    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[derive(Debug, thiserror::Error)]
enum AccessError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Decoded value does not fit the requested type")]
    Conversion,
}

impl From<&AccessError> for Status {
    fn from(err: &AccessError) -> Self {
        match err {
            AccessError::Codec(e) => e.into(),
            AccessError::Store(e) => e.into(),
            AccessError::Conversion => Status::TypeError,
        }
    }
}

/// Typed reads and writes against one backing store.
///
/// A missing store (`None`) stands for a platform that hands out no
/// storage object at all. It is reported as `STORAGE_ERROR` without
/// touching anything.
pub struct Accessor<S> {
    store: Option<S>,
    config: CodecConfig,
}

impl<S> From<Option<S>> for Accessor<S> {
    fn from(store: Option<S>) -> Self {
        Self {
            store,
            config: CodecConfig::default(),
        }
    }
}

impl<S: KeyValueStore> Accessor<S> {
    pub fn new(store: S) -> Self {
        Some(store).into()
    }

    #[must_use]
    pub fn unavailable() -> Self {
        Self::from(None)
    }

    #[must_use]
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn store(&self) -> Option<&S> {
        self.store.as_ref()
    }

    fn open(&self) -> Result<&S, StoreError> {
        self.store.as_ref().ok_or(StoreError::Unavailable)
    }

    /// Reads `key`, using `fallback` both as the expected shape and as the
    /// value returned when nothing usable is stored.
    pub fn get<T: Storable>(&self, key: &str, fallback: T) -> Response<T> {
        match self.read(key, &fallback) {
            Ok(Some(value)) => Response::new(Status::Ok, value),
            Ok(None) => Response::new(Status::Absent, fallback),
            Err(err) => {
                let status = Status::from(&err);
                debug!("get {key:?} failed with {status}: {err}");
                Response::new(status, fallback)
            }
        }
    }

    pub fn set<T: Storable>(&self, key: &str, value: T) -> Response<T> {
        match self.write(key, &value) {
            Ok(()) => Response::new(Status::Ok, value),
            Err(err) => {
                let status = Status::from(&err);
                debug!("set {key:?} failed with {status}: {err}");
                Response::new(status, value)
            }
        }
    }

    /// Removing a key that holds nothing succeeds.
    pub fn remove(&self, key: &str) -> Response<bool> {
        match self.open().and_then(|store| store.remove_item(key)) {
            Ok(()) => Response::new(Status::Ok, true),
            Err(err) => {
                debug!("remove {key:?} failed: {err}");
                Response::new(Status::StorageError, false)
            }
        }
    }

    fn read<T: Storable>(&self, key: &str, fallback: &T) -> Result<Option<T>, AccessError> {
        let Some(raw) = self.open()?.get_item(key)? else {
            return Ok(None);
        };
        let value = decode(&raw, &fallback.to_value(), &self.config)?;
        T::from_value(value)
            .map(Some)
            .ok_or(AccessError::Conversion)
    }

    fn write<T: Storable>(&self, key: &str, value: &T) -> Result<(), AccessError> {
        let raw = encode(&value.to_value(), &self.config)?;
        self.open()?.set_item(key, &raw)?;
        Ok(())
    }
}

/// The durable and session-scoped accessors side by side.
pub struct Stash<D, S> {
    durable: Accessor<D>,
    session: Accessor<S>,
}

impl<D: KeyValueStore, S: KeyValueStore> Stash<D, S> {
    pub fn new(durable: Accessor<D>, session: Accessor<S>) -> Self {
        Self { durable, session }
    }

    #[must_use]
    pub fn with_config(self, config: CodecConfig) -> Self {
        Self {
            durable: self.durable.with_config(config.clone()),
            session: self.session.with_config(config),
        }
    }

    pub fn durable(&self) -> &Accessor<D> {
        &self.durable
    }

    pub fn session(&self) -> &Accessor<S> {
        &self.session
    }

    pub fn get<T: Storable>(&self, key: &str, fallback: T) -> Response<T> {
        self.durable.get(key, fallback)
    }

    pub fn get_session<T: Storable>(&self, key: &str, fallback: T) -> Response<T> {
        self.session.get(key, fallback)
    }

    pub fn set<T: Storable>(&self, key: &str, value: T) -> Response<T> {
        self.durable.set(key, value)
    }

    pub fn set_session<T: Storable>(&self, key: &str, value: T) -> Response<T> {
        self.session.set(key, value)
    }

    pub fn remove(&self, key: &str) -> Response<bool> {
        self.durable.remove(key)
    }

    pub fn remove_session(&self, key: &str) -> Response<bool> {
        self.session.remove(key)
    }
}
