use std::collections::HashMap;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::action::Action;

///
/// A single observed trace: an ordered sequence of [`Action`]s
///
/// The `frequency` records how many traces of the log carry an identical sequence
/// (see [`EventLog::recompute_trace_frequencies`]).
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    /// Actions of this trace in order of occurrence
    pub actions: Vec<Action>,
    /// Number of times this sequence was observed in the log
    pub frequency: u64,
}

impl Trace {
    /// Create a new [`Trace`] with a frequency of 1
    pub fn new(actions: Vec<Action>) -> Self {
        Self {
            actions,
            frequency: 1,
        }
    }

    /// Number of events in this trace
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether this trace has no events
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Render the trace as a compact string (letters as characters, synthetic codes as numbers)
    pub fn to_compact_string(&self) -> String {
        self.actions.iter().map(Action::to_string).collect()
    }
}

///
/// Event log: the ordered collection of all loaded [`Trace`]s
///
/// Discovery rewrites the traces of a log in place.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    /// Traces in input order
    pub traces: Vec<Trace>,
}

impl EventLog {
    /// Create an [`EventLog`] from traces and compute their frequencies
    pub fn from_traces(traces: Vec<Trace>) -> Self {
        let mut log = Self { traces };
        log.recompute_trace_frequencies();
        log
    }

    /// Whether the log contains no traces
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    /// Total number of events over all traces
    pub fn total_events(&self) -> usize {
        self.traces.par_iter().map(Trace::len).sum()
    }

    /// Lexicographically sorted set of distinct actions currently used in the log
    pub fn distinct_actions(&self) -> Vec<Action> {
        self.traces
            .iter()
            .flat_map(|t| t.actions.iter().copied())
            .sorted_unstable()
            .dedup()
            .collect()
    }

    /// Occurrence count of every distinct action, ordered like [`EventLog::distinct_actions`]
    pub fn action_frequencies(&self) -> Vec<(Action, u64)> {
        self.traces
            .par_iter()
            .fold(HashMap::<Action, u64>::new, |mut map, t| {
                t.actions
                    .iter()
                    .for_each(|a| *map.entry(*a).or_insert(0) += 1);
                map
            })
            .reduce(HashMap::new, |mut m1, m2| {
                for (k, v) in m2 {
                    *m1.entry(k).or_default() += v;
                }
                m1
            })
            .into_iter()
            .sorted_unstable()
            .collect()
    }

    /// Set the frequency of each trace to the number of traces with an identical action sequence
    ///
    /// Traces are not merged: every trace keeps its own position in the log.
    pub fn recompute_trace_frequencies(&mut self) {
        let counts: HashMap<&[Action], u64> = self
            .traces
            .iter()
            .map(|t| t.actions.as_slice())
            .counts()
            .into_iter()
            .map(|(acts, c)| (acts, c as u64))
            .collect();
        let freqs: Vec<u64> = self
            .traces
            .iter()
            .map(|t| counts.get(t.actions.as_slice()).copied().unwrap_or(1))
            .collect();
        self.traces
            .iter_mut()
            .zip(freqs)
            .for_each(|(t, f)| t.frequency = f);
    }
}
