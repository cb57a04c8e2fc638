use std::path::Path;

/// Whether the given path points to a gzip-compressed file (judged by its `.gz` extension)
pub fn is_gz_path<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

#[cfg(test)]
pub mod test_utils {
    use std::path::PathBuf;

    use crate::{Action, EventLog, Trace};

    pub fn get_test_data_path() -> PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data")
    }

    /// Build an [`EventLog`] from string traces, one trace per string (letters only)
    pub fn log_from_strs(traces: &[&str]) -> EventLog {
        let mut log = EventLog {
            traces: traces
                .iter()
                .map(|t| Trace::new(t.chars().map(Action::from).collect()))
                .collect(),
        };
        log.recompute_trace_frequencies();
        log
    }

    pub fn acts(s: &str) -> Vec<Action> {
        s.chars().map(Action::from).collect()
    }

    #[test]
    fn gz_path_detection() {
        assert!(super::is_gz_path("traces.txt.gz"));
        assert!(super::is_gz_path("TRACES.GZ"));
        assert!(!super::is_gz_path("traces.txt"));
        assert!(!super::is_gz_path("gz"));
    }
}
