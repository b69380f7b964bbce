//! The core module holds the device wrapper, the error type and descriptor settings.

pub mod device;
pub mod error;
pub mod settings;
