//! Contract with the host animation system.
//!
//! The menu never runs animations itself. It hands the host an
//! [`AnimationRequest`] ("animate property P of target T from A to B over D
//! seconds, starting after a delay") tagged with an [`AnimationId`], and the
//! host reports back by id when the animation stops. Completions may arrive in
//! any order, so the [`AnimationTracker`] matches them by id only.

use crate::geometry::Point;
use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;
use strum::Display as StrumDisplay;

new_key_type! {
    /// Handle to an animation handed to the host.
    pub struct AnimationId;
    /// Handle to an item added to a menu.
    pub struct ItemId;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationTarget {
    /// The rotating container that carries every item.
    Container,
    Item(ItemId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay)]
#[strum(serialize_all = "snake_case")]
pub enum AnimationKind {
    /// Full-turn spin of an item during expand/shrink.
    Rotate,
    /// Move of an item between the center and its slot.
    Translate,
    /// Settling rotation after a quantized dial gesture.
    Snap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimatedProperty {
    /// Rotation in radians about the target's own center.
    Rotation { from: f64, to: f64 },
    /// Translation relative to the target's resting position.
    Translation { from: Point, to: Point },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationRequest {
    pub id: AnimationId,
    pub target: AnimationTarget,
    pub kind: AnimationKind,
    pub property: AnimatedProperty,
    /// Seconds to wait before starting.
    pub delay: f64,
    /// Seconds from start to finish.
    pub duration: f64,
}

/// Host animation system.
///
/// Implementations must eventually report each request back through
/// `PathMenu::animation_finished` with the request's id.
pub trait Animator {
    fn animate(&mut self, request: AnimationRequest);
}

impl<A: Animator + ?Sized> Animator for Box<A> {
    fn animate(&mut self, request: AnimationRequest) {
        (**self).animate(request)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingAnimation {
    pub target: AnimationTarget,
    pub kind: AnimationKind,
    pub property: AnimatedProperty,
}

impl PendingAnimation {
    pub fn item(&self) -> Option<ItemId> {
        match self.target {
            AnimationTarget::Item(item) => Some(item),
            AnimationTarget::Container => None,
        }
    }

    fn gates_batch(&self) -> bool {
        matches!(self.kind, AnimationKind::Rotate | AnimationKind::Translate)
    }
}

/// Animations handed to the host that have not reported back yet.
#[derive(Debug, Default)]
pub struct AnimationTracker {
    pending: SlotMap<AnimationId, PendingAnimation>,
    by_item: HashMap<ItemId, Vec<AnimationId>>,
}

impl AnimationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, animation: PendingAnimation) -> AnimationId {
        let id = self.pending.insert(animation);
        if let Some(item) = animation.item() {
            self.by_item.entry(item).or_default().push(id);
        }
        id
    }

    /// Removes a finished animation. Unknown or already finished ids yield
    /// `None`.
    pub fn finish(&mut self, id: AnimationId) -> Option<PendingAnimation> {
        let animation = self.pending.remove(id)?;
        if let Some(item) = animation.item() {
            self.unlink(item, id);
        }
        Some(animation)
    }

    fn unlink(&mut self, item: ItemId, id: AnimationId) {
        if let Some(ids) = self.by_item.get_mut(&item) {
            ids.retain(|&other| other != id);
            if ids.is_empty() {
                self.by_item.remove(&item);
            }
        }
    }

    /// True when no expand/shrink animation is outstanding.
    pub fn is_batch_idle(&self) -> bool {
        !self.pending.values().any(PendingAnimation::gates_batch)
    }

    pub fn is_settled(&self, item: ItemId) -> bool {
        !self.by_item.contains_key(&item)
    }

    pub fn pending_for(&self, item: ItemId) -> &[AnimationId] {
        self.by_item.get(&item).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn get(&self, id: AnimationId) -> Option<&PendingAnimation> {
        self.pending.get(id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Stops tracking every animation of `item`.
    pub fn forget_item(&mut self, item: ItemId) -> Vec<PendingAnimation> {
        self.by_item
            .remove(&item)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|id| self.pending.remove(id))
            .collect()
    }

    /// Stops tracking the expand/shrink batch, returning what was in flight.
    pub fn cancel_batch(&mut self) -> Vec<PendingAnimation> {
        let ids: Vec<AnimationId> = self
            .pending
            .iter()
            .filter(|(_, a)| a.gates_batch())
            .map(|(id, _)| id)
            .collect();
        ids.into_iter().filter_map(|id| self.finish(id)).collect()
    }
}
