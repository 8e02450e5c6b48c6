pub mod app;
pub mod configs;
pub mod consts;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod server;
pub mod state;
pub mod utils;

/// Name of the service binary, for logs and spans.
#[macro_export]
macro_rules! service_name {
    () => {
        env!("CARGO_PKG_NAME")
    };
}

/// Version of the service binary.
#[macro_export]
macro_rules! version {
    () => {
        env!("CARGO_PKG_VERSION")
    };
}
