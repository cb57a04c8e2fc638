//! Heuristic measures over a [`DirectlyFollowsMatrix`]
//!
//! All measures are integers; divisions truncate.

use super::{error::DiscoveryError, matrix::DirectlyFollowsMatrix};
use crate::event_log::action::Action;

/// Dependency of two mutual supports: `100 * |sxy - syx| / max(sxy, syx)`, or 0 if both are 0
///
/// Ranges from 0 (perfectly symmetric) to 100 (strictly one-directional).
pub fn dependency_of_supports(sxy: u64, syx: u64) -> u64 {
    let max = sxy.max(syx);
    if max == 0 {
        0
    } else {
        100 * sxy.abs_diff(syx) / max
    }
}

/// Weight of two mutual supports: `|50 - dependency| * max(sxy, syx)`
pub fn weight_of_supports(sxy: u64, syx: u64) -> u64 {
    dependency_of_supports(sxy, syx).abs_diff(50) * sxy.max(syx)
}

/// Number of times `x` is directly followed by `y`
pub fn support(matrix: &DirectlyFollowsMatrix, x: Action, y: Action) -> Result<u64, DiscoveryError> {
    matrix.support(x, y)
}

/// Dependency between `x` and `y` (symmetric in its arguments)
pub fn dependency(
    matrix: &DirectlyFollowsMatrix,
    x: Action,
    y: Action,
) -> Result<u64, DiscoveryError> {
    Ok(dependency_of_supports(
        matrix.support(x, y)?,
        matrix.support(y, x)?,
    ))
}

/// Weight of the pair `(x, y)`, only meaningful for ranking within one matrix
pub fn weight(matrix: &DirectlyFollowsMatrix, x: Action, y: Action) -> Result<u64, DiscoveryError> {
    Ok(weight_of_supports(
        matrix.support(x, y)?,
        matrix.support(y, x)?,
    ))
}
