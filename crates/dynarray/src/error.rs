//! Array-specific error types.

use std::alloc::Layout;
use std::convert::Infallible;
use std::error::Error;
use std::fmt;

/// Errors that can occur during array operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// The byte size of the requested capacity does not fit in `isize::MAX`.
    CapacityOverflow {
        /// Number of elements requested.
        requested: usize,
    },
    /// The global allocator could not supply the requested block.
    AllocationFailed {
        /// Number of elements requested.
        requested: usize,
        /// Layout passed to the allocator.
        layout: Layout,
    },
    /// A positional argument fell outside the legal range for the operation.
    ///
    /// Insertion accepts `[0, len]`; removal accepts `[0, len)`.
    InvalidPosition {
        /// The rejected position.
        position: usize,
        /// Number of live elements at the time of the call.
        len: usize,
    },
}

impl ArrayError {
    /// Escalate an error inside an infallible trait method.
    ///
    /// Allocation failure goes through [`std::alloc::handle_alloc_error`],
    /// everything else panics, matching `Vec`.
    pub(crate) fn escalate(self) -> ! {
        match self {
            Self::AllocationFailed { layout, .. } => std::alloc::handle_alloc_error(layout),
            other => panic!("{other}"),
        }
    }
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow: {requested} elements exceed isize::MAX bytes")
            }
            Self::AllocationFailed { requested, layout } => {
                write!(
                    f,
                    "allocation failed: {requested} elements ({} bytes, align {})",
                    layout.size(),
                    layout.align()
                )
            }
            Self::InvalidPosition { position, len } => {
                write!(f, "invalid position {position} for array of length {len}")
            }
        }
    }
}

impl Error for ArrayError {}

/// Errors from operations that run a caller-supplied fallible constructor.
///
/// Returned by the `try_*` family. Either the array itself could not
/// proceed, or the constructor reported a failure. In both cases every
/// element built during the call has already been dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConstructError<E> {
    /// The array rejected the operation before or after construction.
    Array(ArrayError),
    /// The element constructor returned an error.
    Element(E),
}

impl<E> From<ArrayError> for ConstructError<E> {
    fn from(err: ArrayError) -> Self {
        Self::Array(err)
    }
}

impl From<ConstructError<Infallible>> for ArrayError {
    fn from(err: ConstructError<Infallible>) -> Self {
        match err {
            ConstructError::Array(err) => err,
            ConstructError::Element(never) => match never {},
        }
    }
}

impl<E: fmt::Display> fmt::Display for ConstructError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(err) => write!(f, "{err}"),
            Self::Element(err) => write!(f, "element construction failed: {err}"),
        }
    }
}

impl<E: Error + 'static> Error for ConstructError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Array(err) => Some(err),
            Self::Element(err) => Some(err),
        }
    }
}
