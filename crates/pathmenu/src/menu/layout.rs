use crate::animation::{
    AnimatedProperty, AnimationKind, AnimationRequest, AnimationTarget, AnimationTracker, ItemId,
    PendingAnimation,
};
use crate::geometry::Point;
use crate::menu::{DEFAULT_ANIMATION_DURATION, DEFAULT_MENU_END_ARC, DEFAULT_MENU_RADIUS};
use crate::timing::{TimingFunction, TimingPreset};
use serde::Serialize;
use serde_with::DeserializeFromStr;
use std::f64::consts::TAU;
use strum::{Display as StrumDisplay, EnumIter, EnumString};

/// Where items sit when the menu is expanded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MenuGeometry {
    pub radius: f64,
    pub start_arc: f64,
    pub end_arc: f64,
}

impl Default for MenuGeometry {
    fn default() -> Self {
        Self {
            radius: DEFAULT_MENU_RADIUS,
            start_arc: 0.0,
            end_arc: DEFAULT_MENU_END_ARC,
        }
    }
}

impl MenuGeometry {
    /// Angle between neighbouring slots; zero for fewer than two items.
    pub fn slot_spacing(&self, count: usize) -> f64 {
        if count > 1 {
            (self.end_arc - self.start_arc) / (count - 1) as f64
        } else {
            0.0
        }
    }

    pub fn slot_angle(&self, index: usize, count: usize) -> f64 {
        self.start_arc + index as f64 * self.slot_spacing(count)
    }

    /// Slot position relative to the menu center.
    pub fn slot_offset(&self, index: usize, count: usize) -> Point {
        Point::polar(self.radius, self.slot_angle(index, count))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpansionState {
    #[default]
    Collapsed,
    Expanded,
}

impl ExpansionState {
    pub fn is_expanded(&self) -> bool {
        matches!(self, Self::Expanded)
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Collapsed => Self::Expanded,
            Self::Expanded => Self::Collapsed,
        }
    }
}

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
pub enum ItemAnimationType {
    #[strum(to_string = "custom")]
    Custom,
    #[default]
    #[strum(to_string = "rotate_equation", serialize = "simultaneous")]
    RotateEquation,
    #[strum(to_string = "rotate_linear", serialize = "stagger")]
    RotateLinear,
}

impl ItemAnimationType {
    pub fn style(&self) -> AnimationStyle {
        match self {
            Self::RotateEquation => AnimationStyle::Simultaneous,
            Self::Custom | Self::RotateLinear => AnimationStyle::Staggered,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStyle {
    /// Every item starts at once.
    Simultaneous,
    /// Item `i` starts `i` timing-curve intervals after the first.
    Staggered,
}

/// Slot layout and expand/shrink batches.
#[derive(Debug, Clone)]
pub struct RadialLayoutEngine {
    geometry: MenuGeometry,
    animation_type: ItemAnimationType,
    timing: TimingFunction,
    duration: f64,
    state: ExpansionState,
}

impl Default for RadialLayoutEngine {
    fn default() -> Self {
        Self {
            geometry: MenuGeometry::default(),
            animation_type: ItemAnimationType::default(),
            timing: TimingFunction::from_preset(TimingPreset::EaseInEaseOut),
            duration: DEFAULT_ANIMATION_DURATION,
            state: ExpansionState::Collapsed,
        }
    }
}

impl RadialLayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn geometry(&self) -> &MenuGeometry {
        &self.geometry
    }

    pub fn state(&self) -> ExpansionState {
        self.state
    }

    pub fn animation_type(&self) -> ItemAnimationType {
        self.animation_type
    }

    pub fn timing_function(&self) -> &TimingFunction {
        &self.timing
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.geometry.radius = radius.max(0.0);
    }

    pub fn set_start_arc(&mut self, arc: f64) {
        self.geometry.start_arc = arc;
    }

    pub fn set_end_arc(&mut self, arc: f64) {
        self.geometry.end_arc = arc;
    }

    /// Choosing [`ItemAnimationType::RotateLinear`] also resets the timing
    /// function to the linear preset.
    pub fn set_animation_type(&mut self, animation_type: ItemAnimationType) {
        self.animation_type = animation_type;
        if animation_type == ItemAnimationType::RotateLinear {
            self.timing = TimingFunction::linear();
        }
    }

    pub fn set_timing_function(&mut self, timing: TimingFunction) {
        self.timing = timing;
    }

    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = seconds.max(0.0);
    }

    /// Start offset between consecutive items.
    pub fn stagger_interval(&self, count: usize) -> f64 {
        match self.animation_type.style() {
            AnimationStyle::Simultaneous => 0.0,
            AnimationStyle::Staggered if count > 1 => {
                self.timing.evaluate(self.duration / (count - 1) as f64)
            }
            AnimationStyle::Staggered => 0.0,
        }
    }

    pub fn stagger_delay(&self, index: usize, count: usize) -> f64 {
        index as f64 * self.stagger_interval(count)
    }

    pub fn slot_offsets(&self, count: usize) -> Vec<Point> {
        (0..count)
            .map(|i| self.geometry.slot_offset(i, count))
            .collect()
    }

    /// Starts an expand or shrink batch for `items` in slot order.
    ///
    /// Refused (returns `None`) while `tracker` still holds animations of the
    /// previous batch, or when the menu is already in `target` state. On
    /// success the state flips immediately and one spin and one translation
    /// request per item are tracked and returned.
    pub fn begin_transition(
        &mut self,
        target: ExpansionState,
        items: &[ItemId],
        tracker: &mut AnimationTracker,
    ) -> Option<Vec<AnimationRequest>> {
        if !tracker.is_batch_idle() {
            log::debug!("Ignoring {:?} request, previous batch still animating", target);
            return None;
        }
        if self.state == target {
            log::debug!("Menu already {:?}", target);
            return None;
        }

        self.state = target;
        let count = items.len();
        let interval = self.stagger_interval(count);

        let mut requests = Vec::with_capacity(count * 2);
        for (index, &item) in items.iter().enumerate() {
            let delay = index as f64 * interval;
            let offset = self.geometry.slot_offset(index, count);
            let displacement = match target {
                ExpansionState::Expanded => offset,
                ExpansionState::Collapsed => offset.negated(),
            };

            let spin = AnimatedProperty::Rotation { from: 0.0, to: TAU };
            let slide = AnimatedProperty::Translation {
                from: Point::default(),
                to: displacement,
            };
            for (kind, property) in [
                (AnimationKind::Rotate, spin),
                (AnimationKind::Translate, slide),
            ] {
                let item_target = AnimationTarget::Item(item);
                let id = tracker.track(PendingAnimation {
                    target: item_target,
                    kind,
                    property,
                });
                requests.push(AnimationRequest {
                    id,
                    target: item_target,
                    kind,
                    property,
                    delay,
                    duration: self.duration,
                });
            }
        }

        log::debug!(
            "Menu {:?}: {} items, stagger {:.3}s",
            target,
            count,
            interval
        );
        Some(requests)
    }
}
