use thiserror::Error;

use crate::event_log::action::{Action, MAX_ORIGINAL_CODE};

/// Error raised by the discovery engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// An action was looked up in a directly-follows matrix built for a different alphabet
    ///
    /// This means the matrix is stale with respect to the log it is used with.
    #[error("action {0} is not part of the directly-follows matrix alphabet")]
    UnknownAction(Action),
    /// The first synthetic code overlaps with the range of original actions
    #[error("first synthetic code {0} must be greater than {max}", max = MAX_ORIGINAL_CODE)]
    SyntheticCodeInOriginalRange(u32),
    /// The code allocator ran out of codes
    #[error("synthetic action codes exhausted")]
    CodesExhausted,
}
