use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{error::DiscoveryError, selection::PatternCandidate};
use crate::event_log::{
    action::{Action, MAX_ORIGINAL_CODE},
    event_log_struct::EventLog,
};

/// Default code of the first synthetic action
pub const DEFAULT_FIRST_SYNTHETIC_CODE: u32 = 256;

///
/// Allocator of synthetic [`Action`] codes
///
/// Codes strictly increase and are never handed out twice.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCodeAllocator {
    next: u32,
}

impl Default for ActionCodeAllocator {
    fn default() -> Self {
        Self {
            next: DEFAULT_FIRST_SYNTHETIC_CODE,
        }
    }
}

impl ActionCodeAllocator {
    /// Create an allocator starting at `first_code`, which has to lie above all original actions
    pub fn starting_at(first_code: u32) -> Result<Self, DiscoveryError> {
        if first_code <= MAX_ORIGINAL_CODE {
            return Err(DiscoveryError::SyntheticCodeInOriginalRange(first_code));
        }
        Ok(Self { next: first_code })
    }

    /// Code the next call to [`ActionCodeAllocator::allocate`] returns
    pub fn peek(&self) -> Action {
        Action(self.next)
    }

    /// Hand out the next code
    pub fn allocate(&mut self) -> Result<Action, DiscoveryError> {
        let code = self.next;
        self.next = code.checked_add(1).ok_or(DiscoveryError::CodesExhausted)?;
        Ok(Action(code))
    }
}

/// Rewrite every occurrence of `x` or `y` in the log to `code`
pub fn relabel(log: &mut EventLog, x: Action, y: Action, code: Action) {
    log.traces.par_iter_mut().for_each(|t| {
        t.actions
            .iter_mut()
            .filter(|a| **a == x || **a == y)
            .for_each(|a| *a = code);
    });
}

///
/// Collapse each run of adjacent `code` occurrences into a single occurrence
///
/// Returns the number of removed events. A trace never becomes empty since every
/// run keeps its first occurrence.
///
pub fn collapse(log: &mut EventLog, code: Action) -> usize {
    log.traces
        .par_iter_mut()
        .map(|t| {
            let before = t.actions.len();
            t.actions.dedup_by(|cur, prev| *cur == code && *prev == code);
            before - t.actions.len()
        })
        .sum()
}

///
/// Abstract the pair of a [`PatternCandidate`] into the synthetic action `code`
///
/// Both operands are relabeled to `code`, then adjacent occurrences are collapsed.
/// Returns the number of removed events, which is 0 if the operands never occur next
/// to each other.
///
pub fn abstract_pair(log: &mut EventLog, candidate: &PatternCandidate, code: Action) -> usize {
    relabel(log, candidate.first, candidate.second, code);
    collapse(log, code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        discovery::selection::PatternType,
        utils::test_utils::{acts, log_from_strs},
    };

    fn seq(first: char, second: char) -> PatternCandidate {
        PatternCandidate {
            first: first.into(),
            second: second.into(),
            pattern_type: PatternType::Sequence,
            weight: 0,
        }
    }

    #[test]
    fn allocator_is_monotone() {
        let mut alloc = ActionCodeAllocator::default();
        assert_eq!(alloc.peek(), Action(256));
        assert_eq!(alloc.allocate(), Ok(Action(256)));
        assert_eq!(alloc.allocate(), Ok(Action(257)));
        assert_eq!(alloc.peek(), Action(258));
    }

    #[test]
    fn allocator_rejects_original_range() {
        assert_eq!(
            ActionCodeAllocator::starting_at('a' as u32),
            Err(DiscoveryError::SyntheticCodeInOriginalRange('a' as u32))
        );
        assert!(ActionCodeAllocator::starting_at(1000).is_ok());
        let mut alloc = ActionCodeAllocator::starting_at(u32::MAX).unwrap();
        assert_eq!(alloc.allocate(), Err(DiscoveryError::CodesExhausted));
    }

    #[test]
    fn collapse_run_of_code() {
        // "aab" with a abstracted: C,C,b -> C,b
        let mut log = log_from_strs(&["aab"]);
        let code = Action(256);
        relabel(&mut log, 'a'.into(), 'a'.into(), code);
        assert_eq!(log.traces[0].actions, vec![code, code, Action::from('b')]);
        assert_eq!(collapse(&mut log, code), 1);
        assert_eq!(log.traces[0].actions, vec![code, Action::from('b')]);
    }

    #[test]
    fn abstract_sequence_pair() {
        let mut log = log_from_strs(&["abab", "cab", "b", "abba"]);
        let code = Action(256);
        let removed = abstract_pair(&mut log, &seq('a', 'b'), code);
        let c = Action::from('c');
        assert_eq!(log.traces[0].actions, vec![code]);
        assert_eq!(log.traces[1].actions, vec![c, code]);
        assert_eq!(log.traces[2].actions, vec![code]);
        assert_eq!(log.traces[3].actions, vec![code]);
        assert_eq!(removed, 3 + 1 + 0 + 3);
        for t in &log.traces {
            assert!(!t.is_empty());
            assert!(!t.actions.contains(&'a'.into()));
            assert!(!t.actions.contains(&'b'.into()));
            assert!(t.actions.windows(2).all(|w| w[0] != code || w[1] != code));
        }
    }

    #[test]
    fn non_adjacent_pair_removes_nothing() {
        let mut log = log_from_strs(&["acb", "bca", "a"]);
        let lengths: Vec<usize> = log.traces.iter().map(|t| t.len()).collect();
        let removed = abstract_pair(&mut log, &seq('a', 'b'), Action(300));
        assert_eq!(removed, 0);
        assert_eq!(
            log.traces.iter().map(|t| t.len()).collect::<Vec<_>>(),
            lengths
        );
        assert_eq!(log.traces[0].actions[0], Action(300));
        assert_eq!(log.traces[0].actions[1], Action::from('c'));
    }

    #[test]
    fn other_runs_are_untouched() {
        let mut log = log_from_strs(&["ccab"]);
        let removed = abstract_pair(&mut log, &seq('a', 'b'), Action(256));
        assert_eq!(removed, 1);
        assert_eq!(
            log.traces[0].actions,
            [acts("cc"), vec![Action(256)]].concat()
        );
    }
}
