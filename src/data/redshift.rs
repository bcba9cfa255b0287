use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Redshift value
// ---------------------------------------------------------------------------

/// Lowest physically meaningful redshift. Below it `1 + z` turns negative.
pub const MIN_REDSHIFT: f64 = -1.0;

/// Lowest redshift the input control accepts.
pub const MIN_INPUT_REDSHIFT: f64 = 0.0;

/// Increment of the input control's step buttons.
pub const INPUT_STEP: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RedshiftError {
    #[error("redshift is empty")]
    Empty,
    #[error("'{0}' is not a number")]
    NotANumber(String),
    #[error("redshift must be finite")]
    NotFinite,
    #[error("redshift {value} is below the minimum of {min}")]
    BelowMinimum { value: f64, min: f64 },
}

/// A validated redshift `z`, mapping rest to observed wavelength by `1 + z`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Redshift(f64);

impl Redshift {
    pub const ZERO: Redshift = Redshift(0.0);

    pub fn new(z: f64) -> Result<Self, RedshiftError> {
        if !z.is_finite() {
            return Err(RedshiftError::NotFinite);
        }
        if z < MIN_REDSHIFT {
            return Err(RedshiftError::BelowMinimum {
                value: z,
                min: MIN_REDSHIFT,
            });
        }
        Ok(Redshift(z))
    }

    /// Parse the text of the redshift input control, which also enforces
    /// its own minimum of zero.
    pub fn parse_input(text: &str) -> Result<Self, RedshiftError> {
        let z: Redshift = text.parse()?;
        if z.0 < MIN_INPUT_REDSHIFT {
            return Err(RedshiftError::BelowMinimum {
                value: z.0,
                min: MIN_INPUT_REDSHIFT,
            });
        }
        Ok(z)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Stretch factor `1 + z`.
    pub fn factor(self) -> f64 {
        1.0 + self.0
    }

    /// Step the value by `steps` control increments, clamped at the control
    /// minimum. A value between increments first snaps to the neighbouring
    /// increment in the step direction, which counts as the first step.
    pub fn stepped(self, steps: i32) -> Self {
        let pos = self.0 / INPUT_STEP;
        let nearest = pos.round();
        let base = if (pos - nearest).abs() < 1e-9 {
            nearest + steps as f64
        } else if steps > 0 {
            pos.floor() + steps as f64
        } else if steps < 0 {
            pos.ceil() + steps as f64
        } else {
            pos
        };
        Redshift((base * INPUT_STEP).max(MIN_INPUT_REDSHIFT))
    }
}

impl FromStr for Redshift {
    type Err = RedshiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RedshiftError::Empty);
        }
        let z: f64 = s
            .parse()
            .map_err(|_| RedshiftError::NotANumber(s.to_string()))?;
        Redshift::new(z)
    }
}

impl TryFrom<f64> for Redshift {
    type Error = RedshiftError;

    fn try_from(z: f64) -> Result<Self, Self::Error> {
        Redshift::new(z)
    }
}

impl From<Redshift> for f64 {
    fn from(z: Redshift) -> f64 {
        z.0
    }
}

impl fmt::Display for Redshift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Frame transforms
// ---------------------------------------------------------------------------

/// Rest frame → observed frame: `w * (1 + z)` element-wise.
pub fn shift(wavelengths: &[f64], redshift: Redshift) -> Vec<f64> {
    let factor = redshift.factor();
    wavelengths.iter().map(|&w| w * factor).collect()
}

/// Observed frame → rest frame for a source at `catalog_z`.
pub fn rest_frame(observed: &[f64], catalog_z: f64) -> Vec<f64> {
    let factor = 1.0 + catalog_z;
    observed.iter().map(|&w| w / factor).collect()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn z(v: f64) -> Redshift {
        Redshift::new(v).unwrap()
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.0163)]
    #[case(0.5)]
    #[case(6.2)]
    fn shift_scales_every_element(#[case] redshift: f64) {
        let w = [3.2, 4.5, 6.1, 28.0];
        let shifted = shift(&w, z(redshift));
        assert_eq!(shifted.len(), w.len());
        for (s, orig) in shifted.iter().zip(w.iter()) {
            assert_eq!(*s, orig * (1.0 + redshift));
        }
    }

    #[test]
    fn zero_redshift_is_identity() {
        let w = vec![5.0, 7.7, 10.0, 25.5];
        assert_eq!(shift(&w, Redshift::ZERO), w);
    }

    #[test]
    fn shift_of_empty_is_empty() {
        assert!(shift(&[], z(1.0)).is_empty());
    }

    #[test]
    fn rest_frame_then_shift_restores_observed() {
        let observed = [5.0832, 10.163, 20.326];
        let rest = rest_frame(&observed, 0.0163);
        let back = shift(&rest, z(0.0163));
        for (b, o) in back.iter().zip(observed.iter()) {
            assert!((b - o).abs() < 1e-12, "{b} != {o}");
        }
    }

    #[rstest]
    #[case(-1.5)]
    #[case(-1.000001)]
    fn rejects_below_minus_one(#[case] v: f64) {
        assert!(matches!(
            Redshift::new(v),
            Err(RedshiftError::BelowMinimum { .. })
        ));
    }

    #[test]
    fn accepts_minus_one_and_blueshift() {
        assert!(Redshift::new(-1.0).is_ok());
        assert!(Redshift::new(-0.2).is_ok());
    }

    #[test]
    fn rejects_non_finite() {
        assert_eq!(Redshift::new(f64::NAN), Err(RedshiftError::NotFinite));
        assert_eq!(Redshift::new(f64::INFINITY), Err(RedshiftError::NotFinite));
        assert_eq!("inf".parse::<Redshift>(), Err(RedshiftError::NotFinite));
    }

    #[rstest]
    #[case("0", 0.0)]
    #[case(" 0.0163 ", 0.0163)]
    #[case("2", 2.0)]
    #[case("1e-2", 0.01)]
    fn parse_input_accepts_numbers(#[case] text: &str, #[case] expected: f64) {
        assert_eq!(Redshift::parse_input(text).unwrap().value(), expected);
    }

    #[test]
    fn parse_input_rejects_bad_text() {
        assert_eq!(Redshift::parse_input(""), Err(RedshiftError::Empty));
        assert_eq!(Redshift::parse_input("   "), Err(RedshiftError::Empty));
        assert_eq!(
            Redshift::parse_input("abc"),
            Err(RedshiftError::NotANumber("abc".to_string()))
        );
        assert!(matches!(
            Redshift::parse_input("-0.5"),
            Err(RedshiftError::BelowMinimum { min, .. }) if min == 0.0
        ));
    }

    #[rstest]
    #[case(0.0163, 1, 0.02)]
    #[case(0.0163, -1, 0.01)]
    #[case(0.0163, 2, 0.03)]
    #[case(0.02, 1, 0.03)]
    #[case(0.02, -1, 0.01)]
    #[case(0.005, -1, 0.0)]
    fn stepping_moves_to_next_increment(
        #[case] start: f64,
        #[case] steps: i32,
        #[case] expected: f64,
    ) {
        let got = z(start).stepped(steps).value();
        assert!((got - expected).abs() < 1e-12, "{start} {steps:+} -> {got}");
    }

    #[test]
    fn stepping_clamps_at_zero() {
        assert_eq!(Redshift::ZERO.stepped(-1), Redshift::ZERO);
        let up = Redshift::ZERO.stepped(3);
        assert!((up.value() - 0.03).abs() < 1e-12);
    }

    #[test]
    fn serde_rejects_invalid_values() {
        assert!(serde_json::from_str::<Redshift>("-3.0").is_err());
        let ok: Redshift = serde_json::from_str("0.25").unwrap();
        assert_eq!(ok.value(), 0.25);
    }
}
