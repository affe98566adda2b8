//! The configured population of task types and their unit-interval slices.
use serde::{Deserialize, Serialize};

use crate::error::TaskMixError;

const PERCENTAGE_TOLERANCE: f64 = 1e-6;

/// A class of tasks sharing a mixture weight and resource envelope.
///
/// Profiles must be given most-compute-intensive first, most-I/O-intensive
/// last; the piecewise routing policy in [`crate::arbiter::pyxis`] depends on
/// this ordering to stay monotone in x.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProfile {
    pub type_id: u32,
    pub percentage: f64,
    pub num_kv: u32,
    pub compute_secs: f64,
}

/// Half-open `[lo, hi)` slice of `[0, 1]` for each task type, indexed by `typeID`.
#[derive(Debug, Clone)]
pub struct TaskBoundaries {
    bounds: Vec<(f64, f64)>,
}

impl TaskBoundaries {
    /// Builds the cumulative boundaries from a profile list.
    ///
    /// # Errors
    ///
    /// Returns [`TaskMixError`] if profiles are empty, not indexed `0..n` by
    /// `typeID`, contain a negative percentage, or their percentages do not
    /// sum to 1 within tolerance.
    #[expect(
        clippy::float_arithmetic,
        reason = "accumulating cumulative percentage boundaries is inherent float addition, bounded by the profile list length so it cannot run away"
    )]
    pub fn from_profiles(profiles: &[TaskProfile]) -> Result<Self, TaskMixError> {
        if profiles.is_empty() {
            return Err(TaskMixError::Empty);
        }

        let mut bounds = Vec::with_capacity(profiles.len());
        let mut cursor = 0.0;
        for (index, profile) in profiles.iter().enumerate() {
            let expected = index as u32;
            if profile.type_id != expected {
                return Err(TaskMixError::NonConsecutiveTypeId {
                    expected,
                    found: profile.type_id,
                });
            }
            if profile.percentage < 0.0 {
                return Err(TaskMixError::NegativePercentage {
                    type_id: profile.type_id,
                    percentage: profile.percentage,
                });
            }
            let next = cursor + profile.percentage;
            bounds.push((cursor, next));
            cursor = next;
        }

        if (cursor - 1.0).abs() > PERCENTAGE_TOLERANCE {
            return Err(TaskMixError::PercentagesDoNotSumToOne { total: cursor });
        }

        Ok(TaskBoundaries { bounds })
    }

    /// Returns the `[lo, hi)` slice for `type_id`, or `None` if out of range.
    #[must_use]
    pub fn range_for(&self, type_id: u32) -> Option<(f64, f64)> {
        self.bounds.get(type_id as usize).copied()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.bounds.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(type_id: u32, percentage: f64) -> TaskProfile {
        TaskProfile {
            type_id,
            percentage,
            num_kv: 4,
            compute_secs: 0.1,
        }
    }

    #[test]
    fn two_profiles_produce_contiguous_boundaries() -> Result<(), String> {
        let boundaries = TaskBoundaries::from_profiles(&[profile(0, 0.5), profile(1, 0.5)])
            .map_err(|err| err.to_string())?;
        assert_eq!(boundaries.range_for(0), Some((0.0, 0.5)));
        assert_eq!(boundaries.range_for(1), Some((0.5, 1.0)));
        assert_eq!(boundaries.range_for(2), None);
        Ok(())
    }

    #[test]
    fn rejects_percentages_not_summing_to_one() -> Result<(), String> {
        match TaskBoundaries::from_profiles(&[profile(0, 0.4), profile(1, 0.4)]) {
            Ok(_) => Err("expected an error".to_owned()),
            Err(err) => {
                if !matches!(err, TaskMixError::PercentagesDoNotSumToOne { .. }) {
                    return Err(format!("expected PercentagesDoNotSumToOne, got {err:?}"));
                }
                if !err.to_string().contains("sum to 1.0") {
                    return Err(format!("unexpected message: {err}"));
                }
                Ok(())
            }
        }
    }

    #[test]
    fn rejects_non_consecutive_type_ids() -> Result<(), String> {
        match TaskBoundaries::from_profiles(&[profile(0, 0.5), profile(2, 0.5)]) {
            Ok(_) => Err("expected an error".to_owned()),
            Err(err) if matches!(err, TaskMixError::NonConsecutiveTypeId { .. }) => Ok(()),
            Err(err) => Err(format!("expected NonConsecutiveTypeId, got {err:?}")),
        }
    }

    #[test]
    fn rejects_empty_profile_list() -> Result<(), String> {
        match TaskBoundaries::from_profiles(&[]) {
            Ok(_) => Err("expected an error".to_owned()),
            Err(err) if matches!(err, TaskMixError::Empty) => Ok(()),
            Err(err) => Err(format!("expected Empty, got {err:?}")),
        }
    }
}
