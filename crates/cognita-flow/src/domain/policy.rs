//! Handling of flow contract violations at the call site.
//!
//! Sequencer operations return `FlowStateError`s. UI-facing callers route
//! those results through [`tolerate`]: a not-ready step is routine, while a
//! real contract violation panics in debug builds and is logged and
//! swallowed in release builds so the user-facing flow keeps running.

use cognita_core::error::FlowStateError;
use tracing::{debug, warn};

/// Converts a sequencer result into an optional value, applying the
/// violation policy to errors.
///
/// # Panics
///
/// In builds with debug assertions, panics on any error other than
/// `FlowStateError::NotReady`.
pub fn tolerate<T>(result: Result<T, FlowStateError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(FlowStateError::NotReady { index }) => {
            debug!(index, "step not ready; advance ignored");
            None
        }
        Err(error) => {
            if cfg!(debug_assertions) {
                panic!("flow contract violated: {error}");
            }
            warn!(%error, "flow contract violated; treating as no-op");
            None
        }
    }
}
