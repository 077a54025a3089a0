use thiserror::Error;

/// Main error type for the resource-report application
#[derive(Error, Debug)]
pub enum ReportError {
    /// Kubernetes API errors
    #[error("Kubernetes error: {0}")]
    Kubernetes(#[from] KubernetesError),

    /// Metrics API errors
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Resource quantity parsing errors
    #[error("Quantity error: {0}")]
    Quantity(#[from] ParseQuantityError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Kubernetes-specific errors
#[derive(Error, Debug)]
pub enum KubernetesError {
    /// API server connection failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// API error
    #[error("API error: {0}")]
    ApiError(String),
}

/// Metrics API specific errors
///
/// The `metrics.k8s.io` group is served by an optional aggregated API
/// server; a cluster without metrics-server deployed fails every call.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Metrics API call failed
    #[error("API error: {0}")]
    ApiError(String),
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid configuration value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// Configuration file error
    #[error("File error: {0}")]
    FileError(String),
}

/// Error parsing a Kubernetes resource quantity string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid quantity '{quantity}'")]
pub struct ParseQuantityError {
    pub quantity: String,
}

/// Helper type alias for Results
pub type Result<T> = std::result::Result<T, ReportError>;
