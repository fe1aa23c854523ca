pub mod codec;
pub mod value;

pub use codec::{CodecConfig, CodecError, NonFinitePolicy, decode, encode};
pub use value::{Storable, Value, ValueKind};
