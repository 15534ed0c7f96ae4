//! Error types for ordered sequences.

use thiserror::Error;

/// Errors raised by [`OrderedSequence`](crate::OrderedSequence) operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// A binary-search operation was invoked while the sequence may be out of order.
    ///
    /// This is a programming error: the caller mutated the sequence through an
    /// order-breaking operation and did not call `resort()` afterwards.
    #[error(
        "{operation}() cannot be called on this OrderedSequence: it is potentially out of order; call resort() before {operation}()"
    )]
    Unsafe {
        /// Name of the rejected operation.
        operation: &'static str,
    },
}

impl SequenceError {
    /// Creates an unsafe-collection error for the named operation.
    #[must_use]
    pub const fn unsafe_collection(operation: &'static str) -> Self {
        Self::Unsafe { operation }
    }
}

/// Result type for ordered sequence operations.
pub type Result<T> = std::result::Result<T, SequenceError>;
