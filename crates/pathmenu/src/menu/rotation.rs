use crate::geometry::{Size, boundary_margin, normalize, wrap_delta};
use crate::menu::layout::MenuGeometry;
use crate::menu::{DEFAULT_MENU_RADIUS, SNAP_SECONDS_PER_STEP};
use serde::Serialize;
use serde_with::DeserializeFromStr;
use std::f64::consts::TAU;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Rotation closer than this to a step multiple counts as on the step.
const SNAP_TOLERANCE: f64 = 1e-9;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    DeserializeFromStr,
    EnumString,
    EnumIter,
    StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Continuous rotation.
    #[default]
    #[strum(to_string = "point", serialize = "continuous")]
    Point,
    /// Rotation settles on multiples of the slot spacing.
    #[strum(to_string = "custom_num", serialize = "customnum", serialize = "steps")]
    CustomNum,
}

/// Arc the dial may be grabbed and rotated within.
///
/// Each end is widened by the angular half-width of the largest item at the
/// current radius. Every setter recomputes both boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollBounds {
    start_arc: f64,
    end_arc: f64,
    start_boundary: f64,
    end_boundary: f64,
    whole_circle: bool,
    radius: f64,
    max_item: Size,
}

impl Default for ScrollBounds {
    fn default() -> Self {
        let mut bounds = Self {
            start_arc: 0.0,
            end_arc: TAU,
            start_boundary: 0.0,
            end_boundary: 0.0,
            whole_circle: true,
            radius: DEFAULT_MENU_RADIUS,
            max_item: Size::default(),
        };
        bounds.recompute();
        bounds
    }
}

impl ScrollBounds {
    pub fn start_arc(&self) -> f64 {
        self.start_arc
    }

    pub fn end_arc(&self) -> f64 {
        self.end_arc
    }

    pub fn start_boundary(&self) -> f64 {
        self.start_boundary
    }

    pub fn end_boundary(&self) -> f64 {
        self.end_boundary
    }

    pub fn is_whole_circle(&self) -> bool {
        self.whole_circle
    }

    /// Restricts scrolling; the stored arc is normalized.
    pub fn set_start_arc(&mut self, arc: f64) {
        self.start_arc = normalize(arc);
        self.whole_circle = false;
        self.recompute();
    }

    /// Restricts scrolling; the stored arc is normalized.
    pub fn set_end_arc(&mut self, arc: f64) {
        self.end_arc = normalize(arc);
        self.whole_circle = false;
        self.recompute();
    }

    pub fn set_whole_circle(&mut self, whole_circle: bool) {
        self.whole_circle = whole_circle;
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius.max(0.0);
        self.recompute();
    }

    pub fn set_max_item_size(&mut self, size: Size) {
        self.max_item = size;
        self.recompute();
    }

    pub fn margin(&self) -> f64 {
        boundary_margin(
            self.max_item.width / 2.0,
            self.radius,
            self.max_item.height / 2.0,
        )
    }

    fn recompute(&mut self) {
        let margin = self.margin();
        self.start_boundary = self.start_arc - margin;
        self.end_boundary = self.end_arc + margin;
    }

    /// Whether a pointer at `angle` may grab the dial.
    ///
    /// Negative angles are lifted by a full turn when the start boundary lies
    /// on the other side of zero.
    pub fn contains(&self, angle: f64) -> bool {
        if self.whole_circle {
            return true;
        }
        let mut rad = normalize(angle);
        if rad * self.start_boundary < 0.0 && rad < 0.0 {
            rad += TAU;
        }
        rad >= self.start_boundary && rad <= self.end_boundary
    }

    /// Lowest and highest container rotation that keeps the menu arc inside
    /// the scroll arc.
    pub fn rotation_limits(&self, menu: &MenuGeometry) -> (f64, f64) {
        (
            self.start_arc - menu.start_arc,
            self.end_arc - menu.end_arc,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// `anchor` is the last accepted pointer angle. A gesture that began
    /// outside the scroll boundary stays in this state with `receiving` unset
    /// and never rotates.
    Dragging { anchor: f64, receiving: bool },
}

/// How the container (and, inverted, each item) must change after a move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationUpdate {
    /// Rotate further by this many radians.
    Incremental(f64),
    /// Replace the rotation with exactly this angle.
    Clamped(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapPlan {
    pub from: f64,
    pub to: f64,
    pub duration: f64,
}

#[derive(Debug, Clone)]
pub struct RotationController {
    bounds: ScrollBounds,
    granularity: Granularity,
    step_multiplier: u32,
    rotation: f64,
    drag: DragState,
}

impl Default for RotationController {
    fn default() -> Self {
        Self {
            bounds: ScrollBounds::default(),
            granularity: Granularity::Point,
            step_multiplier: 1,
            rotation: 0.0,
            drag: DragState::Idle,
        }
    }
}

impl RotationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounds(&self) -> &ScrollBounds {
        &self.bounds
    }

    pub fn bounds_mut(&mut self) -> &mut ScrollBounds {
        &mut self.bounds
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    pub fn step_multiplier(&self) -> u32 {
        self.step_multiplier
    }

    /// Stores `count - 1`, never less than one.
    pub fn set_minimum_step_count(&mut self, count: u32) {
        self.step_multiplier = count.saturating_sub(1).max(1);
    }

    /// Starts a gesture at `pointer_angle`; returns whether it will rotate.
    pub fn begin_drag(&mut self, pointer_angle: f64) -> bool {
        let receiving = self.bounds.contains(pointer_angle);
        if !receiving {
            log::debug!(
                "Drag at {:.3} rad outside [{:.3}, {:.3}]",
                pointer_angle,
                self.bounds.start_boundary,
                self.bounds.end_boundary
            );
        }
        self.drag = DragState::Dragging {
            anchor: pointer_angle,
            receiving,
        };
        receiving
    }

    pub fn drag_to(&mut self, pointer_angle: f64, menu: &MenuGeometry) -> Option<RotationUpdate> {
        let DragState::Dragging {
            anchor,
            receiving: true,
        } = self.drag
        else {
            return None;
        };
        if !self.bounds.contains(pointer_angle) {
            return None;
        }

        let delta = wrap_delta(normalize(pointer_angle) - normalize(anchor));
        self.drag = DragState::Dragging {
            anchor: pointer_angle,
            receiving: true,
        };
        self.rotation += delta;

        match self.clamp(menu, delta) {
            Some(limit) => Some(RotationUpdate::Clamped(limit)),
            None => Some(RotationUpdate::Incremental(delta)),
        }
    }

    /// Pulls the rotation back inside the limits after the menu or scroll
    /// arc changed. Returns the new rotation if it moved.
    pub fn clamp_to_limits(&mut self, menu: &MenuGeometry) -> Option<f64> {
        self.clamp(menu, 0.0)
    }

    /// With inverted limits every rotation is out of range; the direction of
    /// the last step picks the side.
    fn clamp(&mut self, menu: &MenuGeometry, delta: f64) -> Option<f64> {
        if self.bounds.whole_circle {
            return None;
        }
        let (lower, upper) = self.bounds.rotation_limits(menu);
        let below = self.rotation < lower;
        let above = self.rotation > upper;
        let limit = match (below, above) {
            (true, true) if delta > 0.0 => upper,
            (true, _) => lower,
            (false, true) => upper,
            (false, false) => return None,
        };
        log::debug!(
            "Rotation {:.4} clamped to {:.4} within [{:.4}, {:.4}]",
            self.rotation,
            limit,
            lower,
            upper
        );
        self.rotation = limit;
        Some(limit)
    }

    /// Ends the gesture. With [`Granularity::CustomNum`] the rotation moves
    /// to the nearest step multiple and the returned plan describes the
    /// settling animation.
    pub fn end_drag(&mut self, menu: &MenuGeometry, count: usize) -> Option<SnapPlan> {
        self.drag = DragState::Idle;
        if self.granularity != Granularity::CustomNum {
            return None;
        }

        let step = self.snap_step(menu, count)?;
        let ratio = self.rotation / step;
        let n = ratio.round();
        if (ratio - n).abs() <= SNAP_TOLERANCE {
            return None;
        }

        let from = self.rotation;
        self.rotation = n * step;
        log::debug!("Snapping rotation {:.4} -> {:.4}", from, self.rotation);
        Some(SnapPlan {
            from,
            to: self.rotation,
            duration: SNAP_SECONDS_PER_STEP * self.step_multiplier as f64,
        })
    }

    /// Angular step of a quantized dial; `None` when it would be zero.
    pub fn snap_step(&self, menu: &MenuGeometry, count: usize) -> Option<f64> {
        let step = normalize(menu.slot_spacing(count)) * self.step_multiplier as f64;
        (step.is_finite() && step != 0.0).then_some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn arc(start_arc: f64, end_arc: f64) -> MenuGeometry {
        MenuGeometry {
            radius: 100.0,
            start_arc,
            end_arc,
        }
    }

    #[test]
    fn test_setting_a_scroll_arc_leaves_whole_circle_mode() {
        let mut bounds = ScrollBounds::default();
        assert!(bounds.is_whole_circle());
        bounds.set_end_arc(PI);
        assert!(!bounds.is_whole_circle());
        assert_eq!(bounds.end_arc(), PI);
    }

    #[test]
    fn test_boundaries_widen_with_item_size() {
        let mut bounds = ScrollBounds::default();
        bounds.set_start_arc(0.5);
        bounds.set_end_arc(2.0);
        assert_eq!(bounds.start_boundary(), 0.5);
        assert_eq!(bounds.end_boundary(), 2.0);

        bounds.set_max_item_size(Size::new(40.0, 40.0));
        let margin = boundary_margin(20.0, DEFAULT_MENU_RADIUS, 20.0);
        assert!((bounds.start_boundary() - (0.5 - margin)).abs() < 1e-12);
        assert!((bounds.end_boundary() - (2.0 + margin)).abs() < 1e-12);

        bounds.set_radius(200.0);
        assert!(bounds.margin() < margin);
    }

    #[test]
    fn test_contains_wraps_negative_angles() {
        let mut bounds = ScrollBounds::default();
        bounds.set_start_arc(FRAC_PI_2);
        bounds.set_end_arc(3.0 * FRAC_PI_2);

        assert!(bounds.contains(PI));
        // Just past -PI/2 lifts to just inside 3PI/2.
        assert!(bounds.contains(-FRAC_PI_2 - 1e-9));
        assert!(!bounds.contains(0.1));
        assert!(!bounds.contains(-0.1));
    }

    #[test]
    fn test_drag_outside_boundary_is_rejected() {
        let mut rotation = RotationController::new();
        rotation.bounds_mut().set_start_arc(0.0);
        rotation.bounds_mut().set_end_arc(FRAC_PI_2);

        assert!(!rotation.begin_drag(PI));
        assert_eq!(rotation.drag_to(0.5, &arc(0.0, FRAC_PI_4)), None);
        assert_eq!(rotation.rotation(), 0.0);
        assert_eq!(rotation.end_drag(&arc(0.0, FRAC_PI_4), 3), None);
        assert_eq!(rotation.drag_state(), DragState::Idle);
    }

    #[test]
    fn test_whole_circle_accumulates() {
        let mut rotation = RotationController::new();
        let menu = arc(0.0, -PI);
        rotation.begin_drag(0.0);
        for i in 1..=12 {
            let update = rotation.drag_to(i as f64 * FRAC_PI_2, &menu);
            assert!(matches!(update, Some(RotationUpdate::Incremental(_))));
        }
        assert!((rotation.rotation() - 6.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_crossing_the_negative_axis_is_a_small_step() {
        let mut rotation = RotationController::new();
        let menu = arc(0.0, -PI);
        rotation.begin_drag(PI - 0.05);
        let update = rotation.drag_to(-PI + 0.05, &menu);
        match update {
            Some(RotationUpdate::Incremental(delta)) => assert!((delta - 0.1).abs() < 1e-9),
            other => panic!("unexpected update {:?}", other),
        }
    }

    #[test]
    fn test_clamp_discards_overshoot() {
        let mut rotation = RotationController::new();
        rotation.bounds_mut().set_start_arc(0.0);
        rotation.bounds_mut().set_end_arc(PI);
        let menu = arc(0.0, FRAC_PI_2);

        rotation.begin_drag(0.2);
        assert_eq!(
            rotation.drag_to(0.1, &menu),
            Some(RotationUpdate::Clamped(0.0))
        );
        assert_eq!(rotation.rotation(), 0.0);

        rotation.drag_to(1.0, &menu);
        rotation.drag_to(2.0, &menu);
        assert_eq!(
            rotation.drag_to(3.0, &menu),
            Some(RotationUpdate::Clamped(FRAC_PI_2))
        );
        assert_eq!(rotation.rotation(), FRAC_PI_2);
    }

    #[test]
    fn test_positive_step_below_lower_limit_is_clamped() {
        let mut rotation = RotationController::new();
        rotation.bounds_mut().set_start_arc(0.0);
        rotation.bounds_mut().set_end_arc(PI);
        let menu = arc(-0.5, 0.5);

        rotation.begin_drag(1.0);
        assert_eq!(rotation.drag_to(1.1, &menu), Some(RotationUpdate::Clamped(0.5)));
        assert_eq!(rotation.rotation(), 0.5);

        assert!(matches!(
            rotation.drag_to(1.3, &menu),
            Some(RotationUpdate::Incremental(_))
        ));
        assert!((rotation.rotation() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_inverted_limits_follow_step_direction() {
        let mut rotation = RotationController::new();
        rotation.bounds_mut().set_start_arc(1.0);
        rotation.bounds_mut().set_end_arc(1.5);
        // Limits are (1.0, -0.5).
        let menu = arc(0.0, 2.0);

        rotation.begin_drag(1.2);
        assert_eq!(rotation.drag_to(1.3, &menu), Some(RotationUpdate::Clamped(-0.5)));
        assert_eq!(rotation.drag_to(1.2, &menu), Some(RotationUpdate::Clamped(1.0)));
    }

    #[test]
    fn test_clamp_to_limits_after_arc_change() {
        let mut rotation = RotationController::new();
        assert_eq!(rotation.clamp_to_limits(&arc(-0.5, 0.5)), None);

        rotation.bounds_mut().set_start_arc(0.0);
        rotation.bounds_mut().set_end_arc(PI);
        assert_eq!(rotation.clamp_to_limits(&arc(-0.5, 0.5)), Some(0.5));
        assert_eq!(rotation.rotation(), 0.5);
        assert_eq!(rotation.clamp_to_limits(&arc(-0.5, 0.5)), None);
    }

    #[test]
    fn test_minimum_step_count_is_decremented() {
        let mut rotation = RotationController::new();
        rotation.set_minimum_step_count(0);
        assert_eq!(rotation.step_multiplier(), 1);
        rotation.set_minimum_step_count(1);
        assert_eq!(rotation.step_multiplier(), 1);
        rotation.set_minimum_step_count(2);
        assert_eq!(rotation.step_multiplier(), 1);
        rotation.set_minimum_step_count(5);
        assert_eq!(rotation.step_multiplier(), 4);
    }

    #[test]
    fn test_quantized_snap() {
        let mut rotation = RotationController::new();
        rotation.set_granularity(Granularity::CustomNum);
        rotation.set_minimum_step_count(5);
        let menu = arc(0.0, PI);

        let step = rotation.snap_step(&menu, 5).unwrap();
        assert!((step - FRAC_PI_4 * 4.0).abs() < 1e-12);

        rotation.begin_drag(0.0);
        rotation.drag_to(2.0, &menu);
        let plan = rotation.end_drag(&menu, 5).unwrap();
        assert_eq!(plan.from, 2.0);
        assert!((plan.to - PI).abs() < 1e-12);
        assert!((plan.duration - 0.24).abs() < 1e-12);

        let ratio = rotation.rotation() / step;
        assert!((ratio - ratio.round()).abs() < 1e-9);

        // Already on a step: nothing to do.
        rotation.begin_drag(0.0);
        assert_eq!(rotation.end_drag(&menu, 5), None);
    }

    #[test]
    fn test_single_item_never_snaps() {
        let mut rotation = RotationController::new();
        rotation.set_granularity(Granularity::CustomNum);
        rotation.begin_drag(0.0);
        rotation.drag_to(0.3, &arc(0.0, PI));
        assert_eq!(rotation.end_drag(&arc(0.0, PI), 1), None);
        assert_eq!(rotation.rotation(), 0.3);
    }

    #[test]
    fn test_granularity_deserialization() {
        let cases = vec![
            ("\"point\"", Granularity::Point),
            ("\"Continuous\"", Granularity::Point),
            ("\"custom_num\"", Granularity::CustomNum),
            ("\"CustomNum\"", Granularity::CustomNum),
            ("\"steps\"", Granularity::CustomNum),
        ];

        for (json, expected) in cases {
            let deserialized: Granularity = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }
    }

    proptest! {
        #[test]
        fn rotation_stays_within_limits(
            end in 0.1f64..PI,
            moves in proptest::collection::vec(0.0f64..PI, 1..40),
        ) {
            let mut rotation = RotationController::new();
            rotation.bounds_mut().set_start_arc(0.0);
            rotation.bounds_mut().set_end_arc(PI);
            let menu = arc(0.0, end);
            let (lower, upper) = rotation.bounds().rotation_limits(&menu);

            rotation.begin_drag(moves[0]);
            for angle in moves {
                rotation.drag_to(angle, &menu);
                prop_assert!(rotation.rotation() >= lower - 1e-12);
                prop_assert!(rotation.rotation() <= upper + 1e-12);
            }
        }

        #[test]
        fn rotation_starting_below_limits_is_pulled_in(
            start in -1.0f64..0.0,
            span in 0.1f64..PI,
            moves in proptest::collection::vec(0.0f64..PI, 1..40),
        ) {
            let mut rotation = RotationController::new();
            rotation.bounds_mut().set_start_arc(0.0);
            rotation.bounds_mut().set_end_arc(PI);
            let menu = arc(start, start + span);
            let (lower, upper) = rotation.bounds().rotation_limits(&menu);

            rotation.begin_drag(moves[0]);
            for angle in moves {
                prop_assert!(rotation.drag_to(angle, &menu).is_some());
                prop_assert!(rotation.rotation() >= lower - 1e-12);
                prop_assert!(rotation.rotation() <= upper + 1e-12);
            }
        }
    }
}
