//! Error types for the randwalk environment abstraction.

use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Send or receive failed (connection closed, channel dropped, etc.)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Destination rank is outside the topology or has no route
    #[error("Rank unreachable: {0}")]
    RankUnreachable(String),

    /// Frame serialization/deserialization failed
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Peer broke the message protocol (duplicate rank, extra report, etc.)
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Context operation failed
    #[error("Context error: {0}")]
    ContextError(String),

    /// Operation timed out
    #[error("Timeout after {0}ms")]
    Timeout(u64),
}

impl EnvError {
    /// Creates a network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }

    /// Creates a protocol error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::ProtocolError(msg.into())
    }

    /// Creates an unreachable error.
    pub fn unreachable(rank: impl std::fmt::Display) -> Self {
        Self::RankUnreachable(rank.to_string())
    }
}

impl From<std::io::Error> for EnvError {
    fn from(err: std::io::Error) -> Self {
        Self::NetworkError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(EnvError::network("closed").to_string(), "Network error: closed");
        assert_eq!(EnvError::unreachable(7).to_string(), "Rank unreachable: 7");
        assert_eq!(EnvError::Timeout(250).to_string(), "Timeout after 250ms");
        assert_eq!(EnvError::protocol("dup").to_string(), "Protocol error: dup");
    }

    #[test]
    fn test_io_error_is_network_error() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert!(matches!(EnvError::from(io), EnvError::NetworkError(_)));
    }
}
