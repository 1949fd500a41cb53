//! Error types for schedule loading and guide rendering

/// Result type alias for ottepg operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading the schedule or rendering the guide
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Schedule file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Schedule file did not contain a valid document
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// XMLTV serialization failed
    #[error("XML serialization failed: {0}")]
    Xml(#[from] quick_xml::SeError),
}
