//! Radial "path" menu: a center button whose items fan out along an arc,
//! spin into place, and can be rotated as a dial.
//!
//! The crate is headless. A host supplies an [`animation::Animator`] that
//! runs the requested animations and reports completions back to
//! [`menu::PathMenu::animation_finished`].

mod macros;

pub mod animation;
pub mod config;
pub mod events;
pub mod geometry;
pub mod menu;
pub mod sim;
pub mod timing;

pub use animation::{AnimationId, AnimationRequest, Animator, ItemId};
pub use config::{ConfigError, MenuConfig};
pub use events::{GesturePhase, MenuDelegate, MenuEvent};
pub use geometry::{Point, Rect, Size, Transform};
pub use menu::PathMenu;
pub use timing::{TimingFunction, TimingPreset};
