//! A sortedness-aware sequence container.
//!
//! [`OrderedSequence`] owns its elements and a comparator, and tracks whether the
//! elements are currently guaranteed to be in comparator order. Operations that can
//! break the order (`push`, `splice`, `reverse`, mutable access, ...) mark the
//! sequence *unsafe*; binary-search operations (`search_last`, `search_first`,
//! `ordered_insert`, `ordered_remove`) refuse to run on an unsafe sequence and
//! return [`SequenceError::Unsafe`] instead of a silently wrong answer.
//! [`OrderedSequence::resort`] restores the order with a stable insertion sort,
//! which is cheap on the nearly-sorted input produced by small per-frame changes.
//!
//! # Example
//!
//! ```
//! use ordered_sequence::{OrderedSequence, SequenceError};
//!
//! let mut seq = OrderedSequence::from_vec(vec![5, 1, 4, 1]);
//! assert_eq!(seq.as_slice(), &[1, 1, 4, 5]);
//! assert_eq!(seq.search_first(&1), Ok(Some(0)));
//!
//! seq.push(0);
//! assert_eq!(
//!     seq.search_last(&0),
//!     Err(SequenceError::Unsafe { operation: "search_last" })
//! );
//!
//! seq.resort();
//! assert_eq!(seq.search_last(&0), Ok(Some(0)));
//! ```

mod error;
mod sequence;


pub use error::{Result, SequenceError};
pub use sequence::{Comparator, OrderedSequence, ascending};
