use std::{collections::HashMap, fmt::Display};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;

use super::error::DiscoveryError;
use crate::event_log::{action::Action, event_log_struct::EventLog};

///
/// Directly-follows matrix over the alphabet of an [`EventLog`]
///
/// Entry `(a, b)` counts how often action `a` is immediately followed by action `b`
/// in any trace of the log. The matrix is only valid for the log state it was built
/// from: after the log is rewritten it has to be rebuilt.
///
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MatrixRelations", try_from = "MatrixRelations")]
pub struct DirectlyFollowsMatrix {
    actions: Vec<Action>,
    index: HashMap<Action, usize>,
    /// Row-major counts, `actions.len()` x `actions.len()`
    counts: Vec<u64>,
}

impl DirectlyFollowsMatrix {
    /// Build the matrix for the current alphabet of the log
    pub fn from_event_log(log: &EventLog) -> Self {
        Self::from_alphabet(log.distinct_actions(), log)
    }

    /// Build the matrix over the given (sorted, distinct) alphabet
    ///
    /// Pairs involving actions outside the alphabet are not counted.
    pub fn from_alphabet(actions: Vec<Action>, log: &EventLog) -> Self {
        let index: HashMap<Action, usize> = actions
            .iter()
            .enumerate()
            .map(|(i, act)| (*act, i))
            .collect();
        let n = actions.len();
        let counts = log
            .traces
            .par_iter()
            .fold(
                || vec![0_u64; n * n],
                |mut counts, t| {
                    for pair in t.actions.windows(2) {
                        if let (Some(row), Some(col)) = (index.get(&pair[0]), index.get(&pair[1]))
                        {
                            counts[row * n + col] += 1;
                        }
                    }
                    counts
                },
            )
            .reduce(
                || vec![0_u64; n * n],
                |mut c1, c2| {
                    c1.iter_mut().zip(c2).for_each(|(a, b)| *a += b);
                    c1
                },
            );
        Self {
            actions,
            index,
            counts,
        }
    }

    /// Alphabet of the matrix (sorted)
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Number of distinct actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the alphabet is empty
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Position of an action in the alphabet
    pub fn index_of(&self, act: Action) -> Result<usize, DiscoveryError> {
        self.index
            .get(&act)
            .copied()
            .ok_or(DiscoveryError::UnknownAction(act))
    }

    /// Support by alphabet positions
    ///
    /// Callers iterate over `0..self.len()`; positions outside that range panic.
    pub fn support_at(&self, row: usize, col: usize) -> u64 {
        self.counts[row * self.len() + col]
    }

    /// Number of times `x` is directly followed by `y`
    pub fn support(&self, x: Action, y: Action) -> Result<u64, DiscoveryError> {
        Ok(self.support_at(self.index_of(x)?, self.index_of(y)?))
    }

    /// Number of times `x` is directly followed by any action
    pub fn row_sum(&self, x: Action) -> Result<u64, DiscoveryError> {
        let row = self.index_of(x)?;
        let n = self.len();
        Ok(self.counts[row * n..(row + 1) * n].iter().sum())
    }

    /// Non-zero entries of the matrix
    pub fn relations(&self) -> impl Iterator<Item = ((Action, Action), u64)> + '_ {
        let n = self.len();
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, c)| **c > 0)
            .map(move |(i, c)| ((self.actions[i / n], self.actions[i % n]), *c))
    }
}

impl Display for DirectlyFollowsMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "     ")?;
        for act in &self.actions {
            write!(f, "{act:>5}")?;
        }
        writeln!(f)?;
        for (row, act) in self.actions.iter().enumerate() {
            write!(f, "{act:>5}")?;
            for col in 0..self.len() {
                write!(f, "{:>5}", self.support_at(row, col))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Serialized form of a [`DirectlyFollowsMatrix`]: alphabet plus non-zero relations
#[serde_as]
#[derive(Debug, Serialize, Deserialize)]
struct MatrixRelations {
    actions: Vec<Action>,
    #[serde_as(as = "Vec<(_, _)>")]
    relations: HashMap<(Action, Action), u64>,
}

impl From<DirectlyFollowsMatrix> for MatrixRelations {
    fn from(m: DirectlyFollowsMatrix) -> Self {
        let relations = m.relations().collect();
        Self {
            actions: m.actions,
            relations,
        }
    }
}

impl TryFrom<MatrixRelations> for DirectlyFollowsMatrix {
    type Error = DiscoveryError;

    fn try_from(value: MatrixRelations) -> Result<Self, Self::Error> {
        let mut actions = value.actions;
        actions.sort_unstable();
        actions.dedup();
        let mut ret = Self::from_alphabet(actions, &EventLog::default());
        let n = ret.len();
        for ((x, y), c) in value.relations {
            let (row, col) = (ret.index_of(x)?, ret.index_of(y)?);
            ret.counts[row * n + col] = c;
        }
        Ok(ret)
    }
}
