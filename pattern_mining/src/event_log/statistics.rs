use std::{collections::HashSet, fmt::Display};

use serde::{Deserialize, Serialize};

use super::{
    action::Action,
    event_log_struct::{EventLog, Trace},
};

///
/// Descriptive statistics of an [`EventLog`]
///
/// Computed once for reporting; discovery never reads them.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogStatistics {
    /// Number of distinct actions
    pub distinct_action_count: usize,
    /// Number of distinct traces (action sequences)
    pub distinct_trace_count: usize,
    /// Total number of events
    pub total_event_count: usize,
    /// Total number of traces
    pub total_trace_count: usize,
    /// First trace with the highest frequency
    pub most_frequent_trace: Option<Trace>,
    /// Occurrence count of every distinct action (sorted by action)
    pub action_frequencies: Vec<(Action, u64)>,
}

impl LogStatistics {
    /// Compute the statistics of an [`EventLog`] as it currently is
    pub fn from_event_log(log: &EventLog) -> Self {
        let distinct_traces: HashSet<&[Action]> =
            log.traces.iter().map(|t| t.actions.as_slice()).collect();
        let mut most_frequent_trace: Option<&Trace> = None;
        for t in &log.traces {
            if most_frequent_trace.map_or(true, |best| t.frequency > best.frequency) {
                most_frequent_trace = Some(t);
            }
        }
        let action_frequencies = log.action_frequencies();
        Self {
            distinct_action_count: action_frequencies.len(),
            distinct_trace_count: distinct_traces.len(),
            total_event_count: log.total_events(),
            total_trace_count: log.traces.len(),
            most_frequent_trace: most_frequent_trace.cloned(),
            action_frequencies,
        }
    }

    /// Frequency of the most frequent trace (0 for an empty log)
    pub fn most_frequent_trace_frequency(&self) -> u64 {
        self.most_frequent_trace
            .as_ref()
            .map(|t| t.frequency)
            .unwrap_or_default()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Display for LogStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of distinct events: {}", self.distinct_action_count)?;
        writeln!(f, "Number of distinct traces: {}", self.distinct_trace_count)?;
        writeln!(f, "Total number of events: {}", self.total_event_count)?;
        writeln!(f, "Total number of traces: {}", self.total_trace_count)?;
        writeln!(
            f,
            "Most frequent trace frequency: {}",
            self.most_frequent_trace_frequency()
        )?;
        if let Some(t) = &self.most_frequent_trace {
            writeln!(f, "{}", t.to_compact_string())?;
        }
        write_action_frequencies(f, &self.action_frequencies)
    }
}

/// Write one `action = count` line per entry
pub(crate) fn write_action_frequencies(
    f: &mut std::fmt::Formatter<'_>,
    freqs: &[(Action, u64)],
) -> std::fmt::Result {
    for (act, count) in freqs {
        writeln!(f, "{act} = {count}")?;
    }
    Ok(())
}
