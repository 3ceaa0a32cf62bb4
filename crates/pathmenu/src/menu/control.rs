use crate::animation::{
    AnimatedProperty, AnimationId, AnimationKind, AnimationRequest, AnimationTarget,
    AnimationTracker, Animator, ItemId, PendingAnimation,
};
use crate::config::MenuConfig;
use crate::events::{GesturePhase, MenuDelegate};
use crate::geometry::{Point, Rect, Size, Transform, point_to_angle};
use crate::menu::layout::{ExpansionState, ItemAnimationType, RadialLayoutEngine};
use crate::menu::rotation::{Granularity, RotationController, RotationUpdate, SnapPlan};
use crate::timing::TimingFunction;
use slotmap::SlotMap;

/// One icon of the menu. The host owns the view; the menu only tracks what
/// the layout needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub size: Size,
    /// Resting position relative to the menu center.
    pub position: Point,
    /// Counter-rotation keeping the item upright inside the container.
    pub transform: Transform,
    pub hidden: bool,
}

/// Radial menu control: a center button with items fanned out along an arc.
pub struct PathMenu<A: Animator> {
    center: Point,
    bounds: Size,
    items: SlotMap<ItemId, Item>,
    order: Vec<ItemId>,
    max_item: Size,
    layout: RadialLayoutEngine,
    rotation: RotationController,
    tracker: AnimationTracker,
    container_transform: Transform,
    animator: A,
    delegate: Option<Box<dyn MenuDelegate>>,
    draggable: bool,
    scrollable: bool,
    antialiasing: bool,
}

impl<A: Animator> PathMenu<A> {
    /// Places the control at `frame`; the radius starts at half the frame
    /// width.
    pub fn new(frame: Rect, animator: A) -> Self {
        let mut menu = Self {
            center: frame.center(),
            bounds: frame.size,
            items: SlotMap::with_key(),
            order: Vec::new(),
            max_item: Size::default(),
            layout: RadialLayoutEngine::new(),
            rotation: RotationController::new(),
            tracker: AnimationTracker::new(),
            container_transform: Transform::IDENTITY,
            animator,
            delegate: None,
            draggable: false,
            scrollable: false,
            antialiasing: false,
        };
        menu.set_menu_radius(frame.size.width / 2.0);
        menu
    }

    pub fn set_delegate(&mut self, delegate: impl MenuDelegate + 'static) {
        self.delegate = Some(Box::new(delegate));
    }

    pub fn clear_delegate(&mut self) {
        self.delegate = None;
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Origin of pointer angles, in control coordinates.
    pub fn container_center(&self) -> Point {
        self.bounds.midpoint()
    }

    pub fn container_transform(&self) -> Transform {
        self.container_transform
    }

    pub fn layout(&self) -> &RadialLayoutEngine {
        &self.layout
    }

    pub fn rotation_controller(&self) -> &RotationController {
        &self.rotation
    }

    pub fn rotation(&self) -> f64 {
        self.rotation.rotation()
    }

    pub fn tracker(&self) -> &AnimationTracker {
        &self.tracker
    }

    pub fn animator(&self) -> &A {
        &self.animator
    }

    pub fn animator_mut(&mut self) -> &mut A {
        &mut self.animator
    }

    pub fn state(&self) -> ExpansionState {
        self.layout.state()
    }

    pub fn is_expanded(&self) -> bool {
        self.layout.state().is_expanded()
    }

    /// True while an expand/shrink batch is still running.
    pub fn is_animating(&self) -> bool {
        !self.tracker.is_batch_idle()
    }

    pub fn max_item_size(&self) -> Size {
        self.max_item
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn item_ids(&self) -> &[ItemId] {
        &self.order
    }

    /// Items in slot order.
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.order.iter().map(|&id| (id, &self.items[id]))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_draggable(&self) -> bool {
        self.draggable
    }

    pub fn is_scrollable(&self) -> bool {
        self.scrollable
    }

    pub fn antialiasing(&self) -> bool {
        self.antialiasing
    }

    // Configuration. Every setter recomputes what depends on it before
    // returning.

    pub fn set_menu_radius(&mut self, radius: f64) {
        self.layout.set_radius(radius);
        self.rotation.bounds_mut().set_radius(radius);
        self.update_size();
    }

    pub fn set_menu_start_arc(&mut self, arc: f64) {
        self.layout.set_start_arc(arc);
        self.clamp_rotation();
    }

    pub fn set_menu_end_arc(&mut self, arc: f64) {
        self.layout.set_end_arc(arc);
        self.clamp_rotation();
    }

    pub fn set_scroll_start_arc(&mut self, arc: f64) {
        self.rotation.bounds_mut().set_start_arc(arc);
        self.clamp_rotation();
    }

    pub fn set_scroll_end_arc(&mut self, arc: f64) {
        self.rotation.bounds_mut().set_end_arc(arc);
        self.clamp_rotation();
    }

    pub fn set_scrollable_of_whole_circle(&mut self, whole_circle: bool) {
        self.rotation.bounds_mut().set_whole_circle(whole_circle);
        self.clamp_rotation();
    }

    fn clamp_rotation(&mut self) {
        if let Some(angle) = self.rotation.clamp_to_limits(self.layout.geometry()) {
            self.set_rotation_transforms(angle);
        }
    }

    pub fn set_scroll_angle_granularity(&mut self, granularity: Granularity) {
        self.rotation.set_granularity(granularity);
    }

    pub fn set_scroll_minimum_num(&mut self, count: u32) {
        self.rotation.set_minimum_step_count(count);
    }

    pub fn set_item_animation_duration(&mut self, seconds: f64) {
        self.layout.set_duration(seconds);
    }

    pub fn set_item_animation_type(&mut self, animation_type: ItemAnimationType) {
        self.layout.set_animation_type(animation_type);
    }

    pub fn set_timing_function(&mut self, timing: TimingFunction) {
        self.layout.set_timing_function(timing);
    }

    pub fn set_draggable(&mut self, draggable: bool) {
        self.draggable = draggable;
    }

    pub fn set_scrollable(&mut self, scrollable: bool) {
        self.scrollable = scrollable;
    }

    pub fn set_antialiasing(&mut self, antialiasing: bool) {
        self.antialiasing = antialiasing;
    }

    pub fn apply_config(&mut self, config: &MenuConfig) {
        if let Some(radius) = config.menu_radius {
            self.set_menu_radius(radius);
        }
        self.set_menu_start_arc(config.menu_start_arc);
        self.set_menu_end_arc(config.menu_end_arc);
        if let Some(arc) = config.scroll_start_arc {
            self.set_scroll_start_arc(arc);
        }
        if let Some(arc) = config.scroll_end_arc {
            self.set_scroll_end_arc(arc);
        }
        if let Some(whole_circle) = config.scroll_whole_circle {
            self.set_scrollable_of_whole_circle(whole_circle);
        }
        self.set_scroll_angle_granularity(config.scroll_angle_granularity);
        self.set_scroll_minimum_num(config.scroll_minimum_num);
        self.set_item_animation_duration(config.item_animation_duration);
        self.set_item_animation_type(config.item_animation_type);
        if let Some(preset) = config.timing_function {
            self.set_timing_function(TimingFunction::from_preset(preset));
        }
        self.set_draggable(config.draggable);
        self.set_scrollable(config.scrollable);
        self.set_antialiasing(config.antialiasing);
    }

    fn update_size(&mut self) {
        if self.bounds.is_empty() {
            let side = self.layout.geometry().radius * 2.0;
            self.bounds = Size::new(side, side);
        }
    }

    // Items

    /// Adds an item at the center, hidden until the menu expands.
    pub fn add_item(&mut self, size: Size) -> ItemId {
        let id = self.items.insert(Item {
            size,
            position: Point::default(),
            transform: Transform::rotation(-self.rotation.rotation()),
            hidden: true,
        });
        self.order.push(id);
        self.update_item_sizes();
        self.relayout();
        id
    }

    pub fn remove_item(&mut self, id: ItemId) -> bool {
        if self.items.remove(id).is_none() {
            return false;
        }
        self.order.retain(|&other| other != id);
        let dropped = self.tracker.forget_item(id);
        if !dropped.is_empty() {
            log::debug!("Removed item with {} animations in flight", dropped.len());
        }
        self.update_item_sizes();
        self.relayout();
        true
    }

    /// Puts every item at rest for the current state after the item set
    /// changed. An expand/shrink batch in flight is cut short.
    fn relayout(&mut self) {
        let cancelled = self.tracker.cancel_batch();
        if !cancelled.is_empty() {
            log::debug!(
                "Item set changed, dropped {} in-flight animations",
                cancelled.len()
            );
        }
        let expanded = self.is_expanded();
        let count = self.order.len();
        for (index, &id) in self.order.iter().enumerate() {
            if let Some(item) = self.items.get_mut(id) {
                item.position = if expanded {
                    self.layout.geometry().slot_offset(index, count)
                } else {
                    Point::default()
                };
                item.hidden = !expanded;
            }
        }
    }

    /// Grows or shrinks the control by the change in the largest item.
    fn update_item_sizes(&mut self) {
        let max = self.items.values().fold(Size::default(), |acc, item| {
            Size::new(acc.width.max(item.size.width), acc.height.max(item.size.height))
        });
        self.bounds = Size::new(
            self.bounds.width - self.max_item.width + max.width,
            self.bounds.height - self.max_item.height + max.height,
        );
        self.max_item = max;
        self.rotation.bounds_mut().set_max_item_size(max);
    }

    // Expand / shrink

    pub fn expand(&mut self) -> bool {
        self.transition(ExpansionState::Expanded)
    }

    pub fn shrink(&mut self) -> bool {
        self.transition(ExpansionState::Collapsed)
    }

    /// Tap on the center button.
    pub fn tap_center(&mut self) -> bool {
        self.transition(self.layout.state().toggled())
    }

    /// Tap on an item: collapses the menu and reports the click.
    pub fn tap_item(&mut self, id: ItemId) -> bool {
        if !self.items.contains_key(id) {
            return false;
        }
        if self.is_expanded() {
            self.shrink();
        }
        if let Some(delegate) = self.delegate.as_mut() {
            delegate.click_at(id);
        }
        true
    }

    fn transition(&mut self, target: ExpansionState) -> bool {
        let Some(requests) = self
            .layout
            .begin_transition(target, &self.order, &mut self.tracker)
        else {
            return false;
        };

        if let Some(delegate) = self.delegate.as_mut() {
            delegate.menu_status(target.is_expanded());
        }
        for request in requests {
            if let AnimationTarget::Item(id) = request.target
                && let Some(item) = self.items.get_mut(id)
            {
                item.hidden = false;
            }
            self.animator.animate(request);
        }
        true
    }

    /// Host callback for a finished animation.
    pub fn animation_finished(&mut self, id: AnimationId) {
        let Some(animation) = self.tracker.finish(id) else {
            log::debug!("Ignoring completion of untracked animation {:?}", id);
            return;
        };
        if animation.kind == AnimationKind::Translate {
            self.settle(&animation);
        }
        if animation.kind != AnimationKind::Snap && self.tracker.is_batch_idle() {
            log::debug!("Menu {:?} batch complete", self.layout.state());
        }
    }

    /// Moves an item to where its translation ends.
    fn settle(&mut self, animation: &PendingAnimation) {
        let collapsed = !self.is_expanded();
        if let (Some(id), AnimatedProperty::Translation { to, .. }) =
            (animation.item(), animation.property)
            && let Some(item) = self.items.get_mut(id)
        {
            item.position = item.position.offset(to);
            if collapsed {
                item.hidden = true;
            }
        }
    }

    // Gestures

    /// Dial gesture on the container, `pointer` in control coordinates.
    pub fn dial(&mut self, phase: GesturePhase, pointer: Point) {
        if !self.scrollable {
            return;
        }
        let angle = point_to_angle(pointer, self.container_center());
        match phase {
            GesturePhase::Began => {
                self.rotation.begin_drag(angle);
            }
            GesturePhase::Changed => {
                if let Some(update) = self.rotation.drag_to(angle, self.layout.geometry()) {
                    self.apply_rotation(update);
                }
            }
            GesturePhase::Ended | GesturePhase::Cancelled => {
                let count = self.order.len();
                if let Some(plan) = self.rotation.end_drag(self.layout.geometry(), count) {
                    self.snap(plan);
                }
            }
        }
    }

    fn apply_rotation(&mut self, update: RotationUpdate) {
        match update {
            RotationUpdate::Incremental(delta) => {
                self.container_transform = self.container_transform.rotated(delta);
                for item in self.items.values_mut() {
                    item.transform = item.transform.rotated(-delta);
                }
            }
            RotationUpdate::Clamped(angle) => self.set_rotation_transforms(angle),
        }
    }

    fn set_rotation_transforms(&mut self, angle: f64) {
        self.container_transform = Transform::rotation(angle);
        for item in self.items.values_mut() {
            item.transform = Transform::rotation(-angle);
        }
    }

    fn snap(&mut self, plan: SnapPlan) {
        self.set_rotation_transforms(plan.to);

        let targets = std::iter::once((AnimationTarget::Container, 1.0)).chain(
            self.order
                .iter()
                .map(|&id| (AnimationTarget::Item(id), -1.0)),
        );
        let requests: Vec<AnimationRequest> = targets
            .map(|(target, sign)| {
                let property = AnimatedProperty::Rotation {
                    from: sign * plan.from,
                    to: sign * plan.to,
                };
                let id = self.tracker.track(PendingAnimation {
                    target,
                    kind: AnimationKind::Snap,
                    property,
                });
                AnimationRequest {
                    id,
                    target,
                    kind: AnimationKind::Snap,
                    property,
                    delay: 0.0,
                    duration: plan.duration,
                }
            })
            .collect();

        for request in requests {
            self.animator.animate(request);
        }
    }

    /// Drag of the whole control, `point` in the host's coordinates.
    ///
    /// Starting a drag stops tracking any expand/shrink batch, settling its
    /// items where they were headed, and collapses an expanded menu.
    pub fn drag_menu(&mut self, phase: GesturePhase, point: Point) {
        if !self.draggable {
            return;
        }
        if phase == GesturePhase::Began {
            let cancelled = self.tracker.cancel_batch();
            if !cancelled.is_empty() {
                log::debug!("Drag cancelled {} in-flight animations", cancelled.len());
            }
            for animation in cancelled
                .iter()
                .filter(|a| a.kind == AnimationKind::Translate)
            {
                self.settle(animation);
            }
            if self.is_expanded() {
                self.shrink();
            }
        }
        self.center = point;
    }
}
