use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use flate2::bufread::GzDecoder;
use thiserror::Error;

use crate::utils::is_gz_path;

use super::{
    action::Action,
    event_log_struct::{EventLog, Trace},
};

/// Error encountered while loading a trace file
#[derive(Debug, Error)]
pub enum TraceImportError {
    /// The source could not be read
    #[error("failed to read traces: {0}")]
    Io(#[from] std::io::Error),
    /// The source did not contain a single action
    #[error("no trace with at least one action found")]
    EmptyLog,
}

/// Tokenize one line into the original actions it contains
///
/// Every ASCII alphabetic character is one action; all other characters are skipped.
pub fn parse_trace_line(line: &str) -> Vec<Action> {
    line.chars()
        .filter(char::is_ascii_alphabetic)
        .map(Action::from)
        .collect()
}

///
/// Import an [`EventLog`] from a buffered reader, one trace per line
///
/// Lines without any action are skipped. Trace frequencies are computed after loading.
///
pub fn import_traces_from_reader<R: BufRead>(reader: R) -> Result<EventLog, TraceImportError> {
    let mut traces = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let actions = parse_trace_line(&line);
        if actions.is_empty() {
            if !line.trim().is_empty() {
                tracing::warn!(line = line_no + 1, "skipping line without any action");
            }
            continue;
        }
        traces.push(Trace::new(actions));
    }
    if traces.is_empty() {
        return Err(TraceImportError::EmptyLog);
    }
    let log = EventLog::from_traces(traces);
    tracing::debug!(
        traces = log.traces.len(),
        events = log.total_events(),
        "imported traces"
    );
    Ok(log)
}

///
/// Import an [`EventLog`] from a byte slice
///
pub fn import_traces_from_slice(slice: &[u8]) -> Result<EventLog, TraceImportError> {
    import_traces_from_reader(slice)
}

///
/// Import an [`EventLog`] from a filepath
///
/// Paths ending in `.gz` are decompressed while reading.
///
pub fn import_traces_from_path<P: AsRef<Path>>(path: P) -> Result<EventLog, TraceImportError> {
    let reader = BufReader::new(File::open(&path)?);
    if is_gz_path(&path) {
        import_traces_from_reader(BufReader::new(GzDecoder::new(reader)))
    } else {
        import_traces_from_reader(reader)
    }
}
