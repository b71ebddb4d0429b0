//! Event macros used across the crate.
//!
//! With the `tracing` feature these are the `tracing` macros. Without it
//! they accept the same syntax and expand to nothing.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
macro_rules! discard {
    ($($tt:tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use {discard as debug, discard as trace, discard as warn};
