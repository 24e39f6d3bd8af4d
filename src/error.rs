//! Error types for GridCache codec operations.

use crate::serialization::{InstantiationFailure, TypeId};
use thiserror::Error;

/// The main error type for codec and registry operations.
#[derive(Debug, Error)]
pub enum GridError {
    /// A wire type id is already bound to a different type.
    #[error("type id {type_id} is already registered to {existing}, cannot bind {attempted}")]
    DuplicateTypeId {
        /// The conflicting wire type id.
        type_id: TypeId,
        /// Name of the type already bound to the id.
        existing: &'static str,
        /// Name of the type whose registration was rejected.
        attempted: &'static str,
    },

    /// A read ran past the end of the buffer (malformed or truncated stream).
    #[error("unexpected end of stream: need {needed} bytes, have {remaining}")]
    UnexpectedEndOfStream {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A self-describing read referenced a field name that was never written.
    #[error("unknown field: {0}")]
    UnknownField(String),

    /// A self-describing writer was given the same field name twice.
    #[error("duplicate field: {0}")]
    DuplicateField(String),

    /// Malformed wire data (bad tag, negative length, invalid text encoding).
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No usable factory for a received type id.
    ///
    /// Surfaced as [`crate::serialization::DecodeOutcome::Unresolved`] at the
    /// top of a decode; seen as an error only while a nested slot is failing.
    #[error("instantiation failure: no factory registered for type id {}", .0.type_id)]
    Instantiation(InstantiationFailure),
}

/// A specialized `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_type_id_display() {
        let err = GridError::DuplicateTypeId {
            type_id: 7,
            existing: "OrderKey",
            attempted: "TradeKey",
        };
        assert_eq!(
            err.to_string(),
            "type id 7 is already registered to OrderKey, cannot bind TradeKey"
        );
    }

    #[test]
    fn test_end_of_stream_display() {
        let err = GridError::UnexpectedEndOfStream {
            needed: 4,
            remaining: 1,
        };
        assert_eq!(
            err.to_string(),
            "unexpected end of stream: need 4 bytes, have 1"
        );
    }

    #[test]
    fn test_unknown_field_display() {
        let err = GridError::UnknownField("price".to_string());
        assert_eq!(err.to_string(), "unknown field: price");
    }

    #[test]
    fn test_duplicate_field_display() {
        let err = GridError::DuplicateField("price".to_string());
        assert_eq!(err.to_string(), "duplicate field: price");
    }

    #[test]
    fn test_serialization_display() {
        let err = GridError::Serialization("bad string tag: 9".to_string());
        assert_eq!(err.to_string(), "serialization error: bad string tag: 9");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<GridError>();
    }
}
