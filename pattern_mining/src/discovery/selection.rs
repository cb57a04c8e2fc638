use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::{
    matrix::DirectlyFollowsMatrix,
    metrics::{dependency_of_supports, weight_of_supports},
};
use crate::event_log::action::Action;

/// Type of a two-element pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternType {
    /// `x` is (almost always) directly followed by `y`
    Sequence,
    /// `x` and `y` (almost) never directly follow each other
    Choice,
    /// `x` and `y` follow each other in both orders with similar frequency
    Concurrency,
}

impl Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            PatternType::Sequence => "SEQ",
            PatternType::Choice => "CHC",
            PatternType::Concurrency => "CON",
        })
    }
}

/// A pair of actions classified as a pattern, ranked by its weight within one round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternCandidate {
    /// First operand
    pub first: Action,
    /// Second operand
    pub second: Action,
    /// Classified pattern type
    pub pattern_type: PatternType,
    /// Ranking weight (only comparable within the same matrix)
    pub weight: u64,
}

impl PatternCandidate {
    /// Whether both operands are original actions
    pub fn is_original_pair(&self) -> bool {
        self.first.is_original() && self.second.is_original()
    }
}

/// Thresholds used to classify pairs of actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionThresholds {
    /// A pair is sequential if its dependency is strictly above this value
    pub sequence_dependency: u64,
    /// A pair is concurrent if its dependency is strictly below this value
    pub concurrency_dependency: u64,
    /// A pair is a choice if its larger support is at most `distinct actions / choice_support_divisor`
    pub choice_support_divisor: u64,
}

impl Default for SelectionThresholds {
    fn default() -> Self {
        Self {
            sequence_dependency: 70,
            concurrency_dependency: 30,
            choice_support_divisor: 100,
        }
    }
}

/// All ordered pairs of distinct alphabet positions, row-major
fn ordered_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |row| (0..n).filter(move |col| *col != row).map(move |col| (row, col)))
}

///
/// Bootstrap selection: the strongest strictly sequential pair
///
/// Every ordered pair with a dependency above [`SelectionThresholds::sequence_dependency`]
/// competes in row-major order; a later pair only replaces the current best on a strictly
/// greater weight, so the first pair found wins ties. The winner is then oriented in its
/// dominant direction.
///
/// Returns `None` if no pair is sequential. There is no fallback to the first visited
/// pair: without a sequential pair nothing is merged and the bootstrap phase ends.
///
pub fn select_sequence(
    matrix: &DirectlyFollowsMatrix,
    thresholds: &SelectionThresholds,
) -> Option<PatternCandidate> {
    let mut best: Option<(usize, usize, u64)> = None;
    for (row, col) in ordered_pairs(matrix.len()) {
        let sxy = matrix.support_at(row, col);
        let syx = matrix.support_at(col, row);
        if dependency_of_supports(sxy, syx) <= thresholds.sequence_dependency {
            continue;
        }
        let weight = weight_of_supports(sxy, syx);
        if best.map_or(true, |(_, _, w)| weight > w) {
            best = Some((row, col, weight));
        }
    }
    best.map(|(row, col, weight)| {
        let (row, col) = if matrix.support_at(row, col) < matrix.support_at(col, row) {
            (col, row)
        } else {
            (row, col)
        };
        PatternCandidate {
            first: matrix.actions()[row],
            second: matrix.actions()[col],
            pattern_type: PatternType::Sequence,
            weight,
        }
    })
}

/// Classify the ordered pair at `(row, col)` and compute its candidate weight
fn classify_pair(
    matrix: &DirectlyFollowsMatrix,
    thresholds: &SelectionThresholds,
    row: usize,
    col: usize,
) -> Option<(PatternType, u64)> {
    let n = matrix.len() as u64;
    let sxy = matrix.support_at(row, col);
    let syx = matrix.support_at(col, row);
    let dependency = dependency_of_supports(sxy, syx);
    if sxy.max(syx) <= n / thresholds.choice_support_divisor.max(1) {
        Some((PatternType::Choice, n * 100))
    } else if sxy > 0 && syx > 0 && dependency < thresholds.concurrency_dependency {
        Some((PatternType::Concurrency, 100 * weight_of_supports(sxy, syx)))
    } else if sxy > syx && dependency > thresholds.sequence_dependency {
        let mut weight = weight_of_supports(sxy, syx);
        if matrix.actions()[row].is_original() && matrix.actions()[col].is_original() {
            weight *= 100;
        }
        Some((PatternType::Sequence, weight))
    } else {
        None
    }
}

///
/// Full classification: the highest-weighted sequence, choice or concurrency pair
///
/// Choice candidates weigh `distinct actions * 100`, concurrency candidates
/// `100 * weight` and sequence candidates `weight` (times 100 between two original
/// actions). A later candidate only replaces the current best on a strictly greater
/// weight. Returns `None` if no pair can be classified with a positive weight.
///
pub fn select_pattern(
    matrix: &DirectlyFollowsMatrix,
    thresholds: &SelectionThresholds,
) -> Option<PatternCandidate> {
    let mut best: Option<PatternCandidate> = None;
    let mut max_weight = 0;
    for (row, col) in ordered_pairs(matrix.len()) {
        if let Some((pattern_type, weight)) = classify_pair(matrix, thresholds, row, col) {
            if weight > max_weight {
                max_weight = weight;
                best = Some(PatternCandidate {
                    first: matrix.actions()[row],
                    second: matrix.actions()[col],
                    pattern_type,
                    weight,
                });
            }
        }
    }
    best
}
