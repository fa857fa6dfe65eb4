//! Excitation profiles.
//!
//! A profile is a sequence of `(time, value)` samples interpreted as a
//! piecewise-constant signal: the value applied over `[t, t+dt)` is the
//! value of the last sample at or before `t`. Duplicate timestamps
//! encode an instantaneous step change, with the later sample winning
//! from that instant onward.

use serde::{Deserialize, Serialize};

use ecn_core::units::{self, Current, Time, Voltage};
use ecn_solver::Excitation;

use crate::error::{SimError, SimResult};

/// Which terminal quantity the profile drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExcitationKind {
    /// Applied terminal current in amperes; positive discharges.
    Current,
    /// Applied terminal voltage in volts.
    Voltage,
}

/// A validated piecewise-constant excitation schedule.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExcitationProfile {
    kind: ExcitationKind,
    times: Vec<f64>,
    values: Vec<f64>,
}

impl ExcitationProfile {
    /// Builds a profile from `(time_s, value)` samples.
    ///
    /// Samples must be non-empty, finite, start at a non-negative time,
    /// and have non-decreasing timestamps. Equal consecutive timestamps
    /// are allowed and mark a step change.
    pub fn new(kind: ExcitationKind, samples: &[(f64, f64)]) -> SimResult<Self> {
        if samples.is_empty() {
            return Err(SimError::InvalidArg {
                what: "excitation profile has no samples".into(),
            });
        }
        for &(t, v) in samples {
            if !t.is_finite() || !v.is_finite() {
                return Err(SimError::InvalidArg {
                    what: format!("non-finite profile sample ({t}, {v})"),
                });
            }
        }
        if samples[0].0 < 0.0 {
            return Err(SimError::InvalidArg {
                what: format!("profile starts at negative time {}", samples[0].0),
            });
        }
        for pair in samples.windows(2) {
            if pair[1].0 < pair[0].0 {
                return Err(SimError::InvalidArg {
                    what: format!(
                        "profile timestamps decrease: {} after {}",
                        pair[1].0, pair[0].0
                    ),
                });
            }
        }
        Ok(Self {
            kind,
            times: samples.iter().map(|s| s.0).collect(),
            values: samples.iter().map(|s| s.1).collect(),
        })
    }

    /// A single-sample profile holding `value` from `t = 0` to `t_end`.
    pub fn constant(kind: ExcitationKind, value: f64, t_end: f64) -> SimResult<Self> {
        Self::new(kind, &[(0.0, value), (t_end, value)])
    }

    /// Typed constant-current profile; quantities enter SI here.
    pub fn constant_current(i: Current, t_end: Time) -> SimResult<Self> {
        Self::constant(ExcitationKind::Current, units::amps(i), units::seconds(t_end))
    }

    /// Typed constant-voltage profile.
    pub fn constant_voltage(v: Voltage, t_end: Time) -> SimResult<Self> {
        Self::constant(ExcitationKind::Voltage, units::volts(v), units::seconds(t_end))
    }

    pub fn kind(&self) -> ExcitationKind {
        self.kind
    }

    /// Signal value at time `t`: the last sample with timestamp `<= t`.
    /// Before the first sample the first value applies.
    pub fn value_at(&self, t: f64) -> f64 {
        let after = self.times.partition_point(|&ts| ts <= t);
        let idx = after.saturating_sub(1);
        self.values[idx]
    }

    /// Solver excitation for the step starting at `t`.
    pub fn excitation_at(&self, t: f64) -> Excitation {
        match self.kind {
            ExcitationKind::Current => Excitation::Current(self.value_at(t)),
            ExcitationKind::Voltage => Excitation::Voltage(self.value_at(t)),
        }
    }

    /// Timestamp of the last sample; the natural end of the run.
    pub fn end_time(&self) -> f64 {
        *self.times.last().unwrap_or(&0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn last_sample_at_or_before_wins() {
        let p = ExcitationProfile::new(
            ExcitationKind::Current,
            &[(0.0, 1.0), (5.0, 2.0), (10.0, -3.0)],
        )
        .unwrap();
        assert_eq!(p.value_at(0.0), 1.0);
        assert_eq!(p.value_at(4.9), 1.0);
        assert_eq!(p.value_at(5.0), 2.0);
        assert_eq!(p.value_at(9.999), 2.0);
        assert_eq!(p.value_at(10.0), -3.0);
        assert_eq!(p.value_at(100.0), -3.0);
        assert_eq!(p.end_time(), 10.0);
    }

    #[test]
    fn duplicate_timestamp_is_a_step_change() {
        let p = ExcitationProfile::new(
            ExcitationKind::Current,
            &[(0.0, 1.0), (10.0, 1.0), (10.0, 5.0), (20.0, 5.0)],
        )
        .unwrap();
        assert_eq!(p.value_at(9.999_999), 1.0);
        assert_eq!(p.value_at(10.0), 5.0);
    }

    #[test]
    fn before_first_sample_holds_first_value() {
        let p =
            ExcitationProfile::new(ExcitationKind::Voltage, &[(2.0, 3.7), (4.0, 3.5)]).unwrap();
        assert_eq!(p.value_at(0.0), 3.7);
    }

    #[test]
    fn rejects_decreasing_times() {
        let err = ExcitationProfile::new(ExcitationKind::Current, &[(5.0, 1.0), (1.0, 1.0)])
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidArg { .. }));
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        assert!(ExcitationProfile::new(ExcitationKind::Current, &[]).is_err());
        assert!(
            ExcitationProfile::new(ExcitationKind::Current, &[(0.0, f64::NAN)]).is_err()
        );
        assert!(
            ExcitationProfile::new(ExcitationKind::Current, &[(-1.0, 0.0), (1.0, 0.0)]).is_err()
        );
    }

    proptest! {
        // value_at always returns one of the sample values, and the
        // selected sample's timestamp never exceeds the query time
        // (except before the first sample).
        #[test]
        fn value_at_returns_a_sample_value(
            mut times in proptest::collection::vec(0.0f64..1e4, 1..20),
            query in 0.0f64..2e4,
        ) {
            times.sort_by(|a, b| a.partial_cmp(b).unwrap());
            let samples: Vec<(f64, f64)> =
                times.iter().enumerate().map(|(i, &t)| (t, i as f64)).collect();
            let p = ExcitationProfile::new(ExcitationKind::Current, &samples).unwrap();
            let v = p.value_at(query);
            let idx = v as usize;
            prop_assert!(idx < samples.len());
            if query >= samples[0].0 {
                prop_assert!(samples[idx].0 <= query);
                if idx + 1 < samples.len() && samples[idx + 1].0 != samples[idx].0 {
                    prop_assert!(samples[idx + 1].0 > query);
                }
            }
        }
    }
}
