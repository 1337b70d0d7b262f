//! Error types for the protocol layer.
//!
//! Each crate in Nightfall defines its own error enum. A `ProtocolError`
//! always means a problem with bytes or vocabulary, never with game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: a truncated record on disk, or a record written
    /// by an incompatible version.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The name is not one of the closed set of player properties.
    #[error("unknown player property: {0}")]
    UnknownProperty(String),

    /// The name is not a known command or command alias.
    #[error("unknown command: {0}")]
    UnknownCommand(String),
}
