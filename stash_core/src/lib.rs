pub mod accessor;
pub mod storage;

pub use accessor::{Accessor, Response, Stash, Status};
pub use stash_common::{CodecConfig, NonFinitePolicy, Storable, Value};
pub use storage::{KeyValueStore, StoreError};
