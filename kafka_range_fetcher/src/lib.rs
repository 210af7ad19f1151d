pub mod connection_settings;
pub mod consumer;
pub mod error;
pub mod queries;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
