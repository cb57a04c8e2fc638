#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

///
/// Event Logs of action traces
///
pub mod event_log {
    /// [`Action`] codes (original letters and synthetic pattern codes)
    pub mod action;
    /// [`EventLog`] and [`Trace`] structs
    pub mod event_log_struct;
    /// Import of plain-text trace files (one trace per line)
    pub mod import_traces;
    /// Descriptive statistics of an [`EventLog`]
    pub mod statistics;

    #[doc(inline)]
    pub use action::Action;
    #[doc(inline)]
    pub use event_log_struct::{EventLog, Trace};
}

///
/// Heuristic discovery by iterative pattern abstraction
///
pub mod discovery {
    /// Rewriting the log: relabeling a pair onto a synthetic code and collapsing runs
    pub mod abstraction;
    /// Discovery driver (bootstrap and classify phases)
    pub mod driver;
    /// Error type of the discovery engine
    pub mod error;
    /// Directly-follows matrix over the current alphabet
    pub mod matrix;
    /// Heuristic measures (support, dependency, weight)
    pub mod metrics;
    /// Pattern selection strategies
    pub mod selection;

    #[doc(inline)]
    pub use error::DiscoveryError;
    #[doc(inline)]
    pub use matrix::DirectlyFollowsMatrix;
}

/// Util module with smaller helper functions
pub mod utils;

#[doc(inline)]
pub use event_log::{Action, EventLog, Trace};

#[doc(inline)]
pub use event_log::import_traces::{
    import_traces_from_path, import_traces_from_reader, import_traces_from_slice,
    TraceImportError,
};

#[doc(inline)]
pub use event_log::statistics::LogStatistics;

#[doc(inline)]
pub use discovery::driver::{
    discover_patterns, DiscoveryConfig, DiscoveryPhase, DiscoveryRecord, DiscoveryResult,
    PatternMiner,
};

#[doc(inline)]
pub use discovery::selection::{PatternCandidate, PatternType, SelectionThresholds};

#[doc(inline)]
pub use discovery::{DirectlyFollowsMatrix, DiscoveryError};
