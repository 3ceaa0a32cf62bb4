use std::f64::consts::PI;

pub mod control;
pub mod layout;
pub mod rotation;

pub use control::{Item, PathMenu};
pub use layout::{
    AnimationStyle, ExpansionState, ItemAnimationType, MenuGeometry, RadialLayoutEngine,
};
pub use rotation::{
    DragState, Granularity, RotationController, RotationUpdate, ScrollBounds, SnapPlan,
};

pub const DEFAULT_MENU_RADIUS: f64 = 100.0;
pub const DEFAULT_MENU_END_ARC: f64 = -PI;
pub const DEFAULT_ANIMATION_DURATION: f64 = 0.2; // seconds per item animation
pub const SNAP_SECONDS_PER_STEP: f64 = 0.06;
