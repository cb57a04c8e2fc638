use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{
    abstraction::{abstract_pair, ActionCodeAllocator, DEFAULT_FIRST_SYNTHETIC_CODE},
    error::DiscoveryError,
    matrix::DirectlyFollowsMatrix,
    selection::{select_pattern, select_sequence, PatternCandidate, SelectionThresholds},
};
use crate::event_log::{
    action::Action, event_log_struct::EventLog, statistics::write_action_frequencies,
    statistics::LogStatistics,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Parameters of the pattern discovery
pub struct DiscoveryConfig {
    /// Code of the first synthetic action (has to lie above all letters)
    pub first_synthetic_code: u32,
    /// Maximum number of bootstrap rounds
    ///
    /// Defaults to half the number of distinct actions of the input log.
    pub bootstrap_round_cap: Option<usize>,
    /// Maximum number of classification rounds
    ///
    /// Defaults to half the number of distinct actions when classification starts.
    pub classify_round_cap: Option<usize>,
    /// Thresholds for classifying pairs
    pub thresholds: SelectionThresholds,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            first_synthetic_code: DEFAULT_FIRST_SYNTHETIC_CODE,
            bootstrap_round_cap: None,
            classify_round_cap: None,
            thresholds: SelectionThresholds::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Serialize discovery parameters to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
    /// Deserialize discovery parameters from JSON string (missing fields take their defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
    /// Check that the parameters can be used for discovery
    pub fn validate(&self) -> Result<(), DiscoveryError> {
        ActionCodeAllocator::starting_at(self.first_synthetic_code).map(|_| ())
    }
}

/// Phase of the discovery state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscoveryPhase {
    /// Abstracting sequences of original actions
    Bootstrap,
    /// Abstracting sequences, choices and concurrency over all current actions
    Classify,
    /// No further rounds
    Finished,
}

/// Outcome of one abstraction round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    /// Round number over the whole run (starting at 1)
    pub round: usize,
    /// Round number within the phase (starting at 1)
    pub phase_round: usize,
    /// Phase the round ran in
    pub phase: DiscoveryPhase,
    /// Synthetic action assigned to the pattern
    pub code: Action,
    /// Selected pattern
    pub pattern: PatternCandidate,
    /// Number of events removed by collapsing
    pub events_removed: usize,
    /// Directly-follows matrix the pattern was selected from
    pub matrix: DirectlyFollowsMatrix,
    /// Action frequencies of the log after the round
    pub action_frequencies: Vec<(Action, u64)>,
}

impl DiscoveryRecord {
    /// The pattern as `TYPE(first,second) = code`
    pub fn pattern_string(&self) -> String {
        format!(
            "{}({},{}) = {}",
            self.pattern.pattern_type, self.pattern.first, self.pattern.second, self.code
        )
    }
}

impl Display for DiscoveryRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.matrix)?;
        writeln!(f, "-------------------------------------")?;
        writeln!(f, "{}", self.pattern_string())?;
        writeln!(f, "Number of events removed: {}", self.events_removed)?;
        write_action_frequencies(f, &self.action_frequencies)
    }
}

/// Result of a full discovery run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    /// Statistics of the log before any abstraction
    pub statistics: LogStatistics,
    /// One record per abstraction round, in order
    pub records: Vec<DiscoveryRecord>,
    /// The log after the last round
    pub final_log: EventLog,
}

impl DiscoveryResult {
    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Records of the given phase
    pub fn records_of(&self, phase: DiscoveryPhase) -> impl Iterator<Item = &DiscoveryRecord> {
        self.records.iter().filter(move |r| r.phase == phase)
    }
}

impl Display for DiscoveryResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "==STAGE 0============================")?;
        write!(f, "{}", self.statistics)?;
        for (stage, phase) in [(1, DiscoveryPhase::Bootstrap), (2, DiscoveryPhase::Classify)] {
            writeln!(f, "==STAGE {stage}============================")?;
            for (i, record) in self.records_of(phase).enumerate() {
                if i > 0 {
                    writeln!(f, "=====================================")?;
                }
                write!(f, "{record}")?;
            }
        }
        Ok(())
    }
}

///
/// Discovery driver: repeatedly selects a pattern and abstracts it in the log
///
/// Starts in [`DiscoveryPhase::Bootstrap`], which only abstracts sequences of original
/// actions. It moves to [`DiscoveryPhase::Classify`] once no such sequence is left or its
/// round cap is reached. Discovery finishes when fewer than two distinct actions remain,
/// the classification cap is reached, or no pair can be classified.
///
#[derive(Debug, Clone)]
pub struct PatternMiner {
    log: EventLog,
    config: DiscoveryConfig,
    statistics: LogStatistics,
    allocator: ActionCodeAllocator,
    phase: DiscoveryPhase,
    phase_cap: usize,
    phase_rounds: usize,
    rounds: usize,
}

impl PatternMiner {
    /// Create a miner for the given log
    pub fn new(log: EventLog, config: DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let allocator = ActionCodeAllocator::starting_at(config.first_synthetic_code)?;
        let statistics = LogStatistics::from_event_log(&log);
        let phase_cap = config
            .bootstrap_round_cap
            .unwrap_or(statistics.distinct_action_count / 2);
        Ok(Self {
            log,
            config,
            statistics,
            allocator,
            phase: DiscoveryPhase::Bootstrap,
            phase_cap,
            phase_rounds: 0,
            rounds: 0,
        })
    }

    /// Current (possibly abstracted) log
    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Statistics of the log before any abstraction
    pub fn statistics(&self) -> &LogStatistics {
        &self.statistics
    }

    /// Current phase
    pub fn phase(&self) -> DiscoveryPhase {
        self.phase
    }

    /// Number of completed rounds
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Distinct actions of the current log
    pub fn current_alphabet(&self) -> Vec<Action> {
        self.log.distinct_actions()
    }

    /// Directly-follows matrix of the current log
    pub fn current_matrix(&self) -> DirectlyFollowsMatrix {
        DirectlyFollowsMatrix::from_event_log(&self.log)
    }

    /// Per-action frequencies of the current log
    pub fn current_action_frequencies(&self) -> Vec<(Action, u64)> {
        self.log.action_frequencies()
    }

    fn advance_phase(&mut self) {
        match self.phase {
            DiscoveryPhase::Bootstrap => {
                let distinct = self.log.distinct_actions().len();
                self.phase = DiscoveryPhase::Classify;
                self.phase_cap = self.config.classify_round_cap.unwrap_or(distinct / 2);
                tracing::info!(
                    bootstrap_rounds = self.phase_rounds,
                    distinct_actions = distinct,
                    cap = self.phase_cap,
                    "switching to classification"
                );
            }
            DiscoveryPhase::Classify => {
                self.phase = DiscoveryPhase::Finished;
                tracing::info!(rounds = self.rounds, "discovery finished");
            }
            DiscoveryPhase::Finished => {}
        }
        self.phase_rounds = 0;
    }

    fn finish(&mut self) {
        if self.phase != DiscoveryPhase::Finished {
            self.phase = DiscoveryPhase::Finished;
            tracing::info!(rounds = self.rounds, "discovery finished");
        }
    }

    /// Select a candidate for the active phase from a freshly built matrix
    fn select(&self, matrix: &DirectlyFollowsMatrix) -> Option<PatternCandidate> {
        match self.phase {
            DiscoveryPhase::Bootstrap => select_sequence(matrix, &self.config.thresholds)
                .filter(PatternCandidate::is_original_pair),
            DiscoveryPhase::Classify => select_pattern(matrix, &self.config.thresholds),
            DiscoveryPhase::Finished => None,
        }
    }

    ///
    /// Run a single abstraction round
    ///
    /// Phase transitions happen as part of the step. Returns `None` once discovery has finished.
    ///
    pub fn step(&mut self) -> Result<Option<DiscoveryRecord>, DiscoveryError> {
        while self.phase != DiscoveryPhase::Finished {
            let alphabet = self.log.distinct_actions();
            if alphabet.len() < 2 {
                tracing::debug!(
                    distinct_actions = alphabet.len(),
                    "alphabet cannot be reduced further"
                );
                self.finish();
                break;
            }
            if self.phase_rounds >= self.phase_cap {
                self.advance_phase();
                continue;
            }
            let matrix = DirectlyFollowsMatrix::from_alphabet(alphabet, &self.log);
            let Some(candidate) = self.select(&matrix) else {
                tracing::debug!(phase = ?self.phase, "no candidate pattern");
                self.advance_phase();
                continue;
            };

            let code = self.allocator.allocate()?;
            let events_removed = abstract_pair(&mut self.log, &candidate, code);
            self.rounds += 1;
            self.phase_rounds += 1;
            let record = DiscoveryRecord {
                round: self.rounds,
                phase_round: self.phase_rounds,
                phase: self.phase,
                code,
                pattern: candidate,
                events_removed,
                matrix,
                action_frequencies: self.log.action_frequencies(),
            };
            tracing::debug!(
                round = record.round,
                pattern = %record.pattern_string(),
                events_removed,
                "abstracted pattern"
            );
            return Ok(Some(record));
        }
        Ok(None)
    }

    /// Run all remaining rounds
    pub fn run(mut self) -> Result<DiscoveryResult, DiscoveryError> {
        let mut records = Vec::new();
        while let Some(record) = self.step()? {
            records.push(record);
        }
        Ok(DiscoveryResult {
            statistics: self.statistics,
            records,
            final_log: self.log,
        })
    }
}

///
/// Discover patterns in an [`EventLog`] by iterative abstraction
///
pub fn discover_patterns(
    log: EventLog,
    config: DiscoveryConfig,
) -> Result<DiscoveryResult, DiscoveryError> {
    PatternMiner::new(log, config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        discovery::selection::PatternType,
        utils::test_utils::{acts, log_from_strs},
    };

    #[test]
    fn config_json() {
        let config = DiscoveryConfig {
            classify_round_cap: Some(3),
            ..DiscoveryConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(DiscoveryConfig::from_json(&json).unwrap(), config);

        let partial = DiscoveryConfig::from_json(r#"{"bootstrap_round_cap": 1}"#).unwrap();
        assert_eq!(partial.bootstrap_round_cap, Some(1));
        assert_eq!(partial.first_synthetic_code, 256);
        assert_eq!(partial.thresholds, SelectionThresholds::default());
    }

    #[test]
    fn invalid_first_code() {
        let config = DiscoveryConfig {
            first_synthetic_code: 'x' as u32,
            ..DiscoveryConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(matches!(
            PatternMiner::new(log_from_strs(&["ab"]), config),
            Err(DiscoveryError::SyntheticCodeInOriginalRange(_))
        ));
    }

    #[test]
    fn bootstrap_then_classify() {
        let log = log_from_strs(&["abcd", "abdc", "abcd", "abdc"]);
        let mut miner = PatternMiner::new(log, DiscoveryConfig::default()).unwrap();
        assert_eq!(miner.phase(), DiscoveryPhase::Bootstrap);

        // a -> b is the strongest sequence (weight 200)
        let first = miner.step().unwrap().unwrap();
        assert_eq!(first.phase, DiscoveryPhase::Bootstrap);
        assert_eq!(first.pattern.pattern_type, PatternType::Sequence);
        assert_eq!(
            (first.pattern.first, first.pattern.second),
            ('a'.into(), 'b'.into())
        );
        assert_eq!(first.code, Action(256));
        assert_eq!(first.events_removed, 4);
        assert_eq!(miner.log().traces[0].actions, [vec![Action(256)], acts("cd")].concat());

        // 256 -> c / 256 -> d is no longer a pair of original actions, c/d are concurrent
        let second = miner.step().unwrap().unwrap();
        assert_eq!(second.phase, DiscoveryPhase::Classify);
        assert_eq!(second.pattern.pattern_type, PatternType::Concurrency);
        assert_eq!(
            (second.pattern.first, second.pattern.second),
            ('c'.into(), 'd'.into())
        );
        assert_eq!(second.code, Action(257));
        assert_eq!(
            miner.log().traces[1].actions,
            vec![Action(256), Action(257)]
        );

        // half of the 3 distinct actions at the start of classification
        assert_eq!(miner.step().unwrap(), None);
        assert_eq!(miner.phase(), DiscoveryPhase::Finished);
        assert_eq!(miner.rounds(), 2);
    }

    #[test]
    fn bootstrap_cap_is_half_the_original_actions() {
        // 6 distinct actions: at most 3 bootstrap rounds
        let log = log_from_strs(&["abcdef", "abcdef"]);
        let result = discover_patterns(log, DiscoveryConfig::default()).unwrap();
        let bootstrap: Vec<_> = result.records_of(DiscoveryPhase::Bootstrap).collect();
        assert_eq!(bootstrap.len(), 3);
        assert_eq!(
            bootstrap
                .iter()
                .map(|r| r.pattern_string())
                .collect::<Vec<_>>(),
            vec!["SEQ(a,b) = 256", "SEQ(c,d) = 257", "SEQ(e,f) = 258"]
        );

        // 3 distinct actions remain at the switch: a single classification round
        assert_eq!(result.records.len(), 4);
        let fourth = &result.records[3];
        assert_eq!(fourth.phase, DiscoveryPhase::Classify);
        assert_eq!(fourth.phase_round, 1);
        assert_eq!(fourth.pattern_string(), "CHC(256,258) = 259");
        assert_eq!(fourth.events_removed, 0);
        assert_eq!(
            result.final_log.traces[0].actions,
            vec![Action(259), Action(257), Action(259)]
        );
    }

    #[test]
    fn bootstrap_cap_switches_with_sequences_left() {
        let log = log_from_strs(&["abcdef", "abcdef"]);
        let config = DiscoveryConfig {
            bootstrap_round_cap: Some(1),
            ..DiscoveryConfig::default()
        };
        let mut miner = PatternMiner::new(log, config).unwrap();
        let first = miner.step().unwrap().unwrap();
        assert_eq!(first.phase, DiscoveryPhase::Bootstrap);
        assert_eq!(first.pattern_string(), "SEQ(a,b) = 256");

        // c -> d is still an original sequence, but the bootstrap cap is reached
        let second = miner.step().unwrap().unwrap();
        assert_eq!(second.phase, DiscoveryPhase::Classify);
        assert_eq!(second.phase_round, 1);
        assert_eq!(second.pattern_string(), "SEQ(c,d) = 257");
        assert_eq!(second.pattern.weight, 100 * 100);

        // classify cap: 5 distinct actions at the switch
        assert!(miner.step().unwrap().is_some());
        assert_eq!(miner.step().unwrap(), None);
        assert_eq!(miner.rounds(), 3);
    }

    #[test]
    fn zero_progress_round_is_recorded() {
        // c/a and c/b are neither sequential nor concurrent, a and b never follow each other
        let log = log_from_strs(&["ca", "ca", "ac", "cb", "cb", "bc"]);
        let result = discover_patterns(log, DiscoveryConfig::default()).unwrap();
        assert_eq!(result.records.len(), 1);
        let record = &result.records[0];
        assert_eq!(record.phase, DiscoveryPhase::Classify);
        assert_eq!(record.pattern.pattern_type, PatternType::Choice);
        assert_eq!(
            (record.pattern.first, record.pattern.second),
            ('a'.into(), 'b'.into())
        );
        assert_eq!(record.events_removed, 0);
        assert!(result.final_log.traces.iter().all(|t| t.len() == 2));
        assert_eq!(
            result.final_log.traces[0].actions,
            vec![Action::from('c'), Action(256)]
        );
    }

    #[test]
    fn stops_below_two_actions() {
        let log = log_from_strs(&["ab", "ab"]);
        let config = DiscoveryConfig {
            bootstrap_round_cap: Some(10),
            classify_round_cap: Some(10),
            ..DiscoveryConfig::default()
        };
        let result = discover_patterns(log, config).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.final_log.distinct_actions(), vec![Action(256)]);
        assert!(result.final_log.traces.iter().all(|t| t.len() == 1));
    }

    #[test]
    fn single_action_log_has_no_rounds() {
        let result = discover_patterns(log_from_strs(&["aaa"]), DiscoveryConfig::default())
            .unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.final_log.traces[0].actions, acts("aaa"));
    }

    #[test]
    fn codes_strictly_increase() {
        let log = log_from_strs(&["abcdef", "abcdfe", "acbdef", "abcdef"]);
        let config = DiscoveryConfig {
            bootstrap_round_cap: Some(10),
            classify_round_cap: Some(10),
            ..DiscoveryConfig::default()
        };
        let result = discover_patterns(log, config).unwrap();
        assert!(!result.records.is_empty());
        assert!(result
            .records
            .windows(2)
            .all(|w| w[0].code < w[1].code && w[0].round + 1 == w[1].round));
        for record in &result.records {
            // the matrix of a round is built over the alphabet the pattern was chosen from
            assert!(record.matrix.index_of(record.pattern.first).is_ok());
            assert!(record.matrix.index_of(record.pattern.second).is_ok());
            assert!(record.matrix.index_of(record.code).is_err());
        }
    }

    #[test]
    fn record_report() {
        let log = log_from_strs(&["ab", "ab", "ac"]);
        let mut miner = PatternMiner::new(log, DiscoveryConfig::default()).unwrap();
        let record = miner.step().unwrap().unwrap();
        assert_eq!(record.pattern_string(), "SEQ(a,b) = 256");
        let report = record.to_string();
        assert!(report.contains("-------------------------------------\nSEQ(a,b) = 256\n"));
        assert!(report.contains("Number of events removed: 2\n"));
        assert!(report.ends_with("c = 1\n256 = 3\n"));
    }
}
