//! Array-backed interpolation tables.
//!
//! Tables are validated once at construction; evaluation afterwards can only
//! fail on out-of-range queries under `Extrapolation::Fail` or on non-finite
//! query values.

use crate::error::{LookupError, LookupResult};

/// What to do with a query outside the table's axis range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolation {
    /// Clamp to the nearest table edge (typical for property LUTs).
    #[default]
    Clamp,
    /// Refuse the lookup; the step aborts without a state commit.
    Fail,
}

/// 1-D lookup table with linear interpolation.
#[derive(Debug, Clone)]
pub struct Lut1d {
    axis: Vec<f64>,
    values: Vec<f64>,
    extrapolation: Extrapolation,
}

impl Lut1d {
    pub fn new(
        axis: Vec<f64>,
        values: Vec<f64>,
        extrapolation: Extrapolation,
    ) -> LookupResult<Self> {
        validate_axis(&axis, "lut1d axis")?;
        if values.len() != axis.len() {
            return Err(LookupError::BadTable {
                what: "lut1d",
                why: "values length differs from axis length",
            });
        }
        for &v in &values {
            if !v.is_finite() {
                return Err(LookupError::NonFinite {
                    what: "lut1d value",
                    value: v,
                });
            }
        }
        Ok(Self {
            axis,
            values,
            extrapolation,
        })
    }

    /// A single-entry table evaluating to a constant.
    pub fn constant(value: f64) -> LookupResult<Self> {
        Self::new(vec![0.0], vec![value], Extrapolation::Clamp)
    }

    pub fn eval(&self, x: f64, what: &'static str) -> LookupResult<f64> {
        if !x.is_finite() {
            return Err(LookupError::NonFinite { what, value: x });
        }
        let x = apply_policy(x, &self.axis, self.extrapolation, what)?;
        Ok(interp1(&self.axis, &self.values, x))
    }
}

/// 2-D lookup table over (temperature, SOC) with bilinear interpolation.
///
/// Values are row-major: `values[ti * soc_axis.len() + si]`.
#[derive(Debug, Clone)]
pub struct Lut2d {
    t_axis: Vec<f64>,
    soc_axis: Vec<f64>,
    values: Vec<f64>,
    extrapolation: Extrapolation,
}

impl Lut2d {
    pub fn new(
        t_axis: Vec<f64>,
        soc_axis: Vec<f64>,
        values: Vec<f64>,
        extrapolation: Extrapolation,
    ) -> LookupResult<Self> {
        validate_axis(&t_axis, "lut2d temperature axis")?;
        validate_axis(&soc_axis, "lut2d soc axis")?;
        if values.len() != t_axis.len() * soc_axis.len() {
            return Err(LookupError::BadTable {
                what: "lut2d",
                why: "values length differs from axis product",
            });
        }
        for &v in &values {
            if !v.is_finite() {
                return Err(LookupError::NonFinite {
                    what: "lut2d value",
                    value: v,
                });
            }
        }
        Ok(Self {
            t_axis,
            soc_axis,
            values,
            extrapolation,
        })
    }

    /// A 1x1 table evaluating to a constant.
    pub fn constant(value: f64) -> LookupResult<Self> {
        Self::new(vec![0.0], vec![0.0], vec![value], Extrapolation::Clamp)
    }

    pub fn eval(&self, t: f64, soc: f64, what: &'static str) -> LookupResult<f64> {
        if !t.is_finite() {
            return Err(LookupError::NonFinite { what, value: t });
        }
        if !soc.is_finite() {
            return Err(LookupError::NonFinite { what, value: soc });
        }
        let t = apply_policy(t, &self.t_axis, self.extrapolation, what)?;
        let soc = apply_policy(soc, &self.soc_axis, self.extrapolation, what)?;

        let ns = self.soc_axis.len();
        let (t_lo, t_hi, tw) = bracket(&self.t_axis, t);
        let (s_lo, s_hi, sw) = bracket(&self.soc_axis, soc);

        let at = |ti: usize, si: usize| self.values[ti * ns + si];
        let row_lo = at(t_lo, s_lo) * (1.0 - sw) + at(t_lo, s_hi) * sw;
        let row_hi = at(t_hi, s_lo) * (1.0 - sw) + at(t_hi, s_hi) * sw;
        Ok(row_lo * (1.0 - tw) + row_hi * tw)
    }
}

fn validate_axis(axis: &[f64], what: &'static str) -> LookupResult<()> {
    if axis.is_empty() {
        return Err(LookupError::BadTable {
            what: "axis",
            why: "empty axis",
        });
    }
    for &v in axis {
        if !v.is_finite() {
            return Err(LookupError::NonFinite { what, value: v });
        }
    }
    for pair in axis.windows(2) {
        if pair[1] <= pair[0] {
            return Err(LookupError::BadTable {
                what: "axis",
                why: "axis must be strictly increasing",
            });
        }
    }
    Ok(())
}

fn apply_policy(
    x: f64,
    axis: &[f64],
    extrapolation: Extrapolation,
    what: &'static str,
) -> LookupResult<f64> {
    let lo = axis[0];
    let hi = axis[axis.len() - 1];
    if x < lo || x > hi {
        return match extrapolation {
            Extrapolation::Clamp => Ok(x.clamp(lo, hi)),
            Extrapolation::Fail => Err(LookupError::OutOfRange {
                what,
                value: x,
                lo,
                hi,
            }),
        };
    }
    Ok(x)
}

/// Bracket indices and fractional weight for an in-range query.
fn bracket(axis: &[f64], x: f64) -> (usize, usize, f64) {
    if axis.len() == 1 {
        return (0, 0, 0.0);
    }
    // partition_point gives the first index with axis[i] > x.
    let hi = axis.partition_point(|&a| a <= x).min(axis.len() - 1).max(1);
    let lo = hi - 1;
    let w = (x - axis[lo]) / (axis[hi] - axis[lo]);
    (lo, hi, w.clamp(0.0, 1.0))
}

fn interp1(axis: &[f64], values: &[f64], x: f64) -> f64 {
    let (lo, hi, w) = bracket(axis, x);
    values[lo] * (1.0 - w) + values[hi] * w
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn lut1d_midpoints() {
        let lut = Lut1d::new(
            vec![0.0, 10.0, 20.0],
            vec![1.0, 2.0, 4.0],
            Extrapolation::Clamp,
        )
        .unwrap();
        assert_eq!(lut.eval(0.0, "r").unwrap(), 1.0);
        assert_eq!(lut.eval(5.0, "r").unwrap(), 1.5);
        assert_eq!(lut.eval(15.0, "r").unwrap(), 3.0);
        assert_eq!(lut.eval(20.0, "r").unwrap(), 4.0);
    }

    #[test]
    fn lut1d_clamp_vs_fail() {
        let clamp = Lut1d::new(vec![0.0, 1.0], vec![5.0, 6.0], Extrapolation::Clamp).unwrap();
        assert_eq!(clamp.eval(2.0, "r").unwrap(), 6.0);

        let fail = Lut1d::new(vec![0.0, 1.0], vec![5.0, 6.0], Extrapolation::Fail).unwrap();
        assert!(matches!(
            fail.eval(2.0, "r").unwrap_err(),
            LookupError::OutOfRange { .. }
        ));
    }

    #[test]
    fn lut1d_rejects_unsorted_axis() {
        let err = Lut1d::new(vec![0.0, 0.0], vec![1.0, 2.0], Extrapolation::Clamp).unwrap_err();
        assert!(matches!(err, LookupError::BadTable { .. }));
    }

    #[test]
    fn lut2d_bilinear_corner_and_center() {
        let lut = Lut2d::new(
            vec![290.0, 310.0],
            vec![0.0, 1.0],
            vec![1.0, 2.0, 3.0, 4.0],
            Extrapolation::Clamp,
        )
        .unwrap();
        assert_eq!(lut.eval(290.0, 0.0, "r").unwrap(), 1.0);
        assert_eq!(lut.eval(310.0, 1.0, "r").unwrap(), 4.0);
        assert_eq!(lut.eval(300.0, 0.5, "r").unwrap(), 2.5);
    }

    #[test]
    fn lut2d_constant_table() {
        let lut = Lut2d::constant(0.7).unwrap();
        assert_eq!(lut.eval(250.0, 0.3, "r").unwrap(), 0.7);
    }

    #[test]
    fn nan_query_rejected() {
        let lut = Lut1d::constant(1.0).unwrap();
        assert!(matches!(
            lut.eval(f64::NAN, "r").unwrap_err(),
            LookupError::NonFinite { .. }
        ));
    }

    proptest! {
        /// Clamped interpolation stays within the table's value bounds.
        #[test]
        fn lut1d_within_value_bounds(x in -50.0f64..50.0) {
            let lut = Lut1d::new(
                vec![-10.0, 0.0, 10.0],
                vec![3.0, 1.0, 2.0],
                Extrapolation::Clamp,
            ).unwrap();
            let v = lut.eval(x, "prop").unwrap();
            prop_assert!((1.0..=3.0).contains(&v));
        }

        /// Bilinear result is bounded by the min/max of the table values.
        #[test]
        fn lut2d_within_value_bounds(t in 280.0f64..320.0, soc in 0.0f64..1.0) {
            let lut = Lut2d::new(
                vec![290.0, 300.0, 310.0],
                vec![0.0, 0.5, 1.0],
                vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0],
                Extrapolation::Clamp,
            ).unwrap();
            let v = lut.eval(t, soc, "prop").unwrap();
            prop_assert!((1.0..=9.0).contains(&v));
        }
    }
}
