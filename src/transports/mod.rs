//! Transport implementations

pub mod console;
pub mod memory;

#[cfg(feature = "file")]
pub mod json_file;

pub use console::ConsoleTransport;
pub use memory::MemoryTransport;

#[cfg(feature = "file")]
pub use json_file::JsonFileTransport;

pub use crate::core::{Transport, TransportCapabilities};
