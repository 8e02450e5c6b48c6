#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid host for socket: {0}")]
    AddressError(#[from] std::net::AddrParseError),
    #[error("Invalid merchant configuration: {0}")]
    MerchantConfigError(String),
    #[error("Error while creating metrics server")]
    MetricsServerError,
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
