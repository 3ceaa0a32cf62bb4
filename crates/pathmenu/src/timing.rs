//! Cubic Bezier timing functions.
//!
//! The curve has implicit end points (0,0) and (1,1) and two user control
//! points. `evaluate` maps normalized time to normalized progress by solving
//! the x polynomial for its parameter and sampling the y polynomial there.

use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use serde_with::DeserializeFromStr;
use strum::{Display as StrumDisplay, EnumIter, EnumString};
use thiserror::Error;

pub const DEFAULT_DURATION: f64 = 1.0;

/// Smallest duration used when deriving the solve epsilon.
pub const MIN_DURATION: f64 = 1e-6;

const NEWTON_ITERATIONS: usize = 8;
const BISECTION_ITERATIONS: usize = 64;
const DERIVATIVE_EPSILON: f64 = 1e-6;

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// A control point with both coordinates clamped to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlPoint {
    x: f64,
    y: f64,
}

impl ControlPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_unit(x),
            y: clamp_unit(y),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

impl From<(f64, f64)> for ControlPoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// Power-basis coefficients of the x and y polynomials, evaluated with
/// Horner's rule.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PolynomialCoefficients {
    pub ax: f64,
    pub bx: f64,
    pub cx: f64,
    pub ay: f64,
    pub by: f64,
    pub cy: f64,
}

impl PolynomialCoefficients {
    pub fn from_points(p1: ControlPoint, p2: ControlPoint) -> Self {
        let cx = 3.0 * p1.x;
        let bx = 3.0 * (p2.x - p1.x) - cx;
        let ax = 1.0 - cx - bx;

        let cy = 3.0 * p1.y;
        let by = 3.0 * (p2.y - p1.y) - cy;
        let ay = 1.0 - cy - by;

        Self {
            ax,
            bx,
            cx,
            ay,
            by,
            cy,
        }
    }

    pub fn sample_curve_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    pub fn sample_curve_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    pub fn sample_curve_derivative_x(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimingError {
    #[error("Unknown timing function '{0}'")]
    UnknownPreset(String),
}

/// Named curves with the same control points as the platform media timing
/// functions.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "camelCase")]
pub enum TimingPreset {
    #[strum(to_string = "linear")]
    Linear,
    #[strum(to_string = "easeIn", serialize = "ease_in", serialize = "ease-in")]
    EaseIn,
    #[strum(to_string = "easeOut", serialize = "ease_out", serialize = "ease-out")]
    EaseOut,
    #[strum(
        to_string = "easeInEaseOut",
        serialize = "ease_in_ease_out",
        serialize = "ease-in-out"
    )]
    EaseInEaseOut,
    #[strum(to_string = "default")]
    Default,
}

impl TimingPreset {
    /// Strict lookup; unknown names are an error.
    pub fn parse(name: &str) -> Result<Self, TimingError> {
        name.trim()
            .parse()
            .map_err(|_| TimingError::UnknownPreset(name.to_string()))
    }

    pub fn control_points(&self) -> (ControlPoint, ControlPoint) {
        let (p1, p2) = match self {
            Self::Linear => ((0.0, 0.0), (1.0, 1.0)),
            Self::EaseIn => ((0.42, 0.0), (1.0, 1.0)),
            Self::EaseOut => ((0.0, 0.0), (0.58, 1.0)),
            Self::EaseInEaseOut => ((0.42, 0.0), (0.58, 1.0)),
            Self::Default => ((0.25, 0.1), (0.25, 1.0)),
        };
        (p1.into(), p2.into())
    }
}

/// Free-form timing function name as typed by a user.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct TimingName(String);

crate::impl_name_newtype!(TimingName);

#[derive(Debug, Clone, PartialEq)]
pub struct TimingFunction {
    control_point1: ControlPoint,
    control_point2: ControlPoint,
    duration: f64,
    coefficients: PolynomialCoefficients,
}

impl TimingFunction {
    pub fn new(control_point1: ControlPoint, control_point2: ControlPoint) -> Self {
        Self::with_duration(control_point1, control_point2, DEFAULT_DURATION)
    }

    pub fn with_duration(
        control_point1: ControlPoint,
        control_point2: ControlPoint,
        duration: f64,
    ) -> Self {
        Self {
            control_point1,
            control_point2,
            duration: guard_duration(duration),
            coefficients: PolynomialCoefficients::from_points(control_point1, control_point2),
        }
    }

    pub fn from_preset(preset: TimingPreset) -> Self {
        let (p1, p2) = preset.control_points();
        Self::new(p1, p2)
    }

    pub fn linear() -> Self {
        Self::from_preset(TimingPreset::Linear)
    }

    /// Lenient lookup. Names that are not a preset yield the degenerate
    /// (0,0)-(0,0) curve.
    pub fn named(name: &TimingName) -> Self {
        match TimingPreset::parse(name.as_str()) {
            Ok(preset) => Self::from_preset(preset),
            Err(e) => {
                log::warn!("{}, falling back to the zero curve", e);
                Self::new(ControlPoint::default(), ControlPoint::default())
            }
        }
    }

    pub fn control_point1(&self) -> ControlPoint {
        self.control_point1
    }

    pub fn control_point2(&self) -> ControlPoint {
        self.control_point2
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn coefficients(&self) -> &PolynomialCoefficients {
        &self.coefficients
    }

    pub fn set_control_point1(&mut self, point: ControlPoint) {
        if self.control_point1 != point {
            self.control_point1 = point;
            self.recalculate_coefficients();
        }
    }

    pub fn set_control_point2(&mut self, point: ControlPoint) {
        if self.control_point2 != point {
            self.control_point2 = point;
            self.recalculate_coefficients();
        }
    }

    /// Negative durations are stored as zero.
    pub fn set_duration(&mut self, duration: f64) {
        self.duration = guard_duration(duration);
    }

    fn recalculate_coefficients(&mut self) {
        self.coefficients =
            PolynomialCoefficients::from_points(self.control_point1, self.control_point2);
    }

    /// Solve tolerance. Longer durations need more precision to avoid visible
    /// discontinuities; a zero duration is treated as [`MIN_DURATION`].
    pub fn epsilon(&self) -> f64 {
        1.0 / (200.0 * self.duration.max(MIN_DURATION))
    }

    /// Progress at normalized time `x`.
    ///
    /// `x` is not clamped: callers such as the stagger interval pass values
    /// above one, which Newton may still solve on the curve's extension.
    /// Otherwise the solver falls back to the nearest end of `[0, 1]`.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x.is_nan() {
            return 0.0;
        }
        let t = self.solve_curve_x(x, self.epsilon());
        self.coefficients.sample_curve_y(t)
    }

    /// Parameter `t` whose x sample is within `epsilon` of `x`.
    pub fn solve_curve_x(&self, x: f64, epsilon: f64) -> f64 {
        let c = &self.coefficients;

        // Newton-Raphson, normally converges in a couple of steps.
        let mut t = x;
        for _ in 0..NEWTON_ITERATIONS {
            let err = c.sample_curve_x(t) - x;
            if err.abs() < epsilon {
                return t;
            }
            let d = c.sample_curve_derivative_x(t);
            if d.abs() < DERIVATIVE_EPSILON {
                break;
            }
            t -= err / d;
        }

        // Bisection over [0, 1].
        let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
        let mut t = x;
        if t < lo {
            return lo;
        }
        if t > hi {
            return hi;
        }

        for _ in 0..BISECTION_ITERATIONS {
            if lo >= hi {
                break;
            }
            let sample = c.sample_curve_x(t);
            if (sample - x).abs() < epsilon {
                return t;
            }
            if x > sample {
                lo = t;
            } else {
                hi = t;
            }
            t = (hi - lo) * 0.5 + lo;
        }

        t
    }
}

fn guard_duration(duration: f64) -> f64 {
    if duration <= 0.0 || duration.is_nan() {
        log::warn!(
            "Timing duration {} is not positive, solving with {}s precision",
            duration,
            MIN_DURATION
        );
        0.0
    } else {
        duration
    }
}

impl Default for TimingFunction {
    fn default() -> Self {
        Self::from_preset(TimingPreset::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_control_points_are_clamped() {
        let p = ControlPoint::new(-0.5, 1.7);
        assert_eq!(p.x(), 0.0);
        assert_eq!(p.y(), 1.0);

        let p = ControlPoint::new(f64::NAN, 0.3);
        assert_eq!(p.x(), 0.0);
        assert_eq!(p.y(), 0.3);
    }

    #[test]
    fn test_coefficients_follow_control_points() {
        let mut f = TimingFunction::linear();
        assert_eq!(f.coefficients().cx, 0.0);

        f.set_control_point1(ControlPoint::new(0.42, 0.0));
        let expected = PolynomialCoefficients::from_points(
            ControlPoint::new(0.42, 0.0),
            ControlPoint::new(1.0, 1.0),
        );
        assert_eq!(*f.coefficients(), expected);

        f.set_control_point2(ControlPoint::new(0.58, 1.0));
        assert_eq!(
            *f.coefficients(),
            TimingFunction::from_preset(TimingPreset::EaseInEaseOut).coefficients
        );
    }

    #[test]
    fn test_linear_is_identity() {
        let f = TimingFunction::linear();
        for i in 0..=100 {
            let x = i as f64 / 100.0;
            assert!(
                (f.evaluate(x) - x).abs() < f.epsilon(),
                "linear({}) = {}",
                x,
                f.evaluate(x)
            );
        }
    }

    #[test]
    fn test_presets_are_monotonic() {
        for preset in TimingPreset::iter() {
            let (p1, p2) = preset.control_points();
            let f = TimingFunction::with_duration(p1, p2, 1000.0);
            let mut prev = f.evaluate(0.0);
            for i in 1..=100 {
                let y = f.evaluate(i as f64 / 100.0);
                assert!(y >= prev - 1e-4, "{} decreases at step {}", preset, i);
                prev = y;
            }
        }
    }

    #[test]
    fn test_ease_in_ease_out_is_symmetric() {
        let f = TimingFunction::with_duration(
            ControlPoint::new(0.42, 0.0),
            ControlPoint::new(0.58, 1.0),
            100.0,
        );
        assert!((f.evaluate(0.5) - 0.5).abs() < 1e-3);
        assert!(f.evaluate(0.25) < 0.25);
        assert!(f.evaluate(0.75) > 0.75);
    }

    #[test]
    fn test_zero_duration_is_guarded() {
        let mut f = TimingFunction::from_preset(TimingPreset::EaseIn);
        f.set_duration(0.0);
        assert!(f.epsilon().is_finite());
        for i in 0..=10 {
            let y = f.evaluate(i as f64 / 10.0);
            assert!(y.is_finite());
        }

        f.set_duration(-3.0);
        assert_eq!(f.duration(), 0.0);
    }

    #[test]
    fn test_unknown_name_falls_back_to_zero_curve() {
        let f = TimingFunction::named(&TimingName::from("bouncy"));
        assert_eq!(f.control_point1(), ControlPoint::default());
        assert_eq!(f.control_point2(), ControlPoint::default());

        let f = TimingFunction::named(&TimingName::from("easeOut"));
        assert_eq!(f, TimingFunction::from_preset(TimingPreset::EaseOut));
    }

    #[test]
    fn test_strict_parse_rejects_unknown() {
        assert_eq!(
            TimingPreset::parse("bouncy"),
            Err(TimingError::UnknownPreset("bouncy".to_string()))
        );
        assert_eq!(TimingPreset::parse("EASEIN"), Ok(TimingPreset::EaseIn));
    }

    #[test]
    fn test_preset_deserialization() {
        let cases = vec![
            ("\"linear\"", TimingPreset::Linear),
            ("\"easeIn\"", TimingPreset::EaseIn),
            ("\"ease_out\"", TimingPreset::EaseOut),
            ("\"ease-in-out\"", TimingPreset::EaseInEaseOut),
            ("\"easeInEaseOut\"", TimingPreset::EaseInEaseOut),
            ("\"DEFAULT\"", TimingPreset::Default),
        ];

        for (json, expected) in cases {
            let deserialized: TimingPreset = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    #[test]
    fn test_evaluate_does_not_clamp_input() {
        let f = TimingFunction::linear();
        // Newton finds the root on the curve's extension.
        assert!((f.evaluate(2.0) - 2.0).abs() < f.epsilon());
        // No root within reach: bisection returns the nearest end.
        assert_eq!(f.evaluate(1.5), 1.0);
        assert_eq!(f.evaluate(f64::NAN), 0.0);
    }

    #[test]
    fn test_bisection_handles_out_of_range_input() {
        let f = TimingFunction::from_preset(TimingPreset::EaseIn);
        assert_eq!(f.solve_curve_x(-0.5, 0.0), 0.0);
        assert_eq!(f.solve_curve_x(1.5, 0.0), 1.0);
    }

    proptest! {
        #[test]
        fn endpoints_are_fixed(
            x1 in 0.0f64..=1.0,
            y1 in 0.0f64..=1.0,
            x2 in 0.0f64..=1.0,
            y2 in 0.0f64..=1.0,
        ) {
            let f = TimingFunction::new(ControlPoint::new(x1, y1), ControlPoint::new(x2, y2));
            prop_assert!(f.evaluate(0.0).abs() < f.epsilon());
            prop_assert!((f.evaluate(1.0) - 1.0).abs() < f.epsilon());
        }

        #[test]
        fn evaluate_stays_finite(
            x1 in 0.0f64..=1.0,
            y1 in 0.0f64..=1.0,
            x2 in 0.0f64..=1.0,
            y2 in 0.0f64..=1.0,
            x in -1.0f64..=2.0,
        ) {
            let f = TimingFunction::new(ControlPoint::new(x1, y1), ControlPoint::new(x2, y2));
            prop_assert!(f.evaluate(x).is_finite());
        }
    }
}
