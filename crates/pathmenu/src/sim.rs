//! Deterministic animation host on a virtual clock.
//!
//! Requests never run; they are stored with their submission time and report
//! completion once the clock passes `delay + duration`. Animations ending at
//! the same instant complete newest first, so callers never rely on
//! submission order.

use crate::animation::{AnimationId, AnimationRequest, Animator};
use crate::menu::PathMenu;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledAnimation {
    pub request: AnimationRequest,
    pub submitted_at: f64,
    seq: u64,
}

impl ScheduledAnimation {
    pub fn starts_at(&self) -> f64 {
        self.submitted_at + self.request.delay
    }

    pub fn ends_at(&self) -> f64 {
        self.starts_at() + self.request.duration
    }
}

#[derive(Debug, Default)]
pub struct SimulatedAnimator {
    now: f64,
    next_seq: u64,
    running: Vec<ScheduledAnimation>,
    history: Vec<ScheduledAnimation>,
}

impl SimulatedAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    /// Every request ever submitted, in submission order.
    pub fn history(&self) -> &[ScheduledAnimation] {
        &self.history
    }

    pub fn in_flight(&self) -> &[ScheduledAnimation] {
        &self.running
    }

    pub fn next_completion_time(&self) -> Option<f64> {
        self.running
            .iter()
            .map(ScheduledAnimation::ends_at)
            .min_by(f64::total_cmp)
    }

    /// Moves the clock forward to `time` and returns the animations that
    /// finished on the way, in completion order.
    pub fn advance_to(&mut self, time: f64) -> Vec<AnimationId> {
        if time > self.now {
            self.now = time;
        }
        let now = self.now;

        let (mut done, running): (Vec<_>, Vec<_>) = self
            .running
            .drain(..)
            .partition(|s| s.ends_at() <= now);
        self.running = running;

        done.sort_by(|a, b| {
            a.ends_at()
                .total_cmp(&b.ends_at())
                .then_with(|| b.seq.cmp(&a.seq))
        });
        done.into_iter().map(|s| s.request.id).collect()
    }
}

impl Animator for SimulatedAnimator {
    fn animate(&mut self, request: AnimationRequest) {
        let scheduled = ScheduledAnimation {
            request,
            submitted_at: self.now,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        log::trace!(
            "t={:.3} {} {:?} delay {:.3}s for {:.3}s",
            self.now,
            request.kind,
            request.target,
            request.delay,
            request.duration
        );
        self.running.push(scheduled);
        self.history.push(scheduled);
    }
}

impl PathMenu<SimulatedAnimator> {
    /// Advances virtual time by `dt` seconds, reporting finished animations.
    pub fn advance(&mut self, dt: f64) -> usize {
        let target = self.animator().now() + dt;
        let finished = self.animator_mut().advance_to(target);
        let count = finished.len();
        for id in finished {
            self.animation_finished(id);
        }
        count
    }

    /// Runs the clock until nothing is in flight.
    pub fn settle_animations(&mut self) -> usize {
        let mut count = 0;
        while let Some(time) = self.animator().next_completion_time() {
            let finished = self.animator_mut().advance_to(time);
            count += finished.len();
            for id in finished {
                self.animation_finished(id);
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimatedProperty, AnimationKind, AnimationTarget};
    use crate::geometry::{Rect, Size};
    use crate::menu::ItemAnimationType;
    use slotmap::SlotMap;

    fn request(id: AnimationId, delay: f64, duration: f64) -> AnimationRequest {
        AnimationRequest {
            id,
            target: AnimationTarget::Container,
            kind: AnimationKind::Snap,
            property: AnimatedProperty::Rotation { from: 0.0, to: 1.0 },
            delay,
            duration,
        }
    }

    #[test]
    fn test_completions_follow_end_time() {
        let mut keys: SlotMap<AnimationId, ()> = SlotMap::with_key();
        let (a, b, c) = (keys.insert(()), keys.insert(()), keys.insert(()));

        let mut animator = SimulatedAnimator::new();
        animator.animate(request(a, 0.0, 0.3));
        animator.animate(request(b, 0.1, 0.1));
        animator.animate(request(c, 0.0, 0.2));

        assert_eq!(animator.next_completion_time(), Some(0.2));
        assert!(animator.advance_to(0.1).is_empty());
        // b and c both end at 0.2; the later submission reports first.
        assert_eq!(animator.advance_to(0.25), vec![c, b]);
        assert_eq!(animator.advance_to(1.0), vec![a]);
        assert!(animator.in_flight().is_empty());
        assert_eq!(animator.history().len(), 3);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut animator = SimulatedAnimator::new();
        animator.advance_to(2.0);
        animator.advance_to(1.0);
        assert_eq!(animator.now(), 2.0);
    }

    #[test]
    fn test_staggered_expand_completes_in_time() {
        let mut menu = PathMenu::new(Rect::new(0.0, 0.0, 200.0, 200.0), SimulatedAnimator::new());
        for _ in 0..3 {
            menu.add_item(Size::new(30.0, 30.0));
        }
        menu.set_item_animation_type(ItemAnimationType::RotateLinear);
        menu.set_item_animation_duration(0.2);
        menu.expand();

        // Linear stagger: items start near 0, 0.1 and 0.2 and each runs 0.2s.
        assert_eq!(menu.advance(0.25), 2);
        assert!(menu.is_animating());
        assert_eq!(menu.advance(0.1), 2);
        assert!(menu.is_animating());
        assert_eq!(menu.advance(0.1), 2);
        assert!(!menu.is_animating());
        assert_eq!(menu.settle_animations(), 0);
    }
}
