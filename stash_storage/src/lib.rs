#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "web")]
pub mod web;
