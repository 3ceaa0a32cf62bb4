use crate::animation::ItemId;
use derive_more::Display;

/// Notifications raised to the host.
#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum MenuEvent {
    #[display("click_at({_0:?})")]
    ClickAt(ItemId),
    #[display("menu_status(expanded: {_0})")]
    MenuStatus(bool),
}

/// Host callbacks. Both methods are optional; the defaults do nothing.
pub trait MenuDelegate {
    fn click_at(&mut self, _item: ItemId) {}

    fn menu_status(&mut self, _expanded: bool) {}
}

impl<F> MenuDelegate for F
where
    F: FnMut(MenuEvent),
{
    fn click_at(&mut self, item: ItemId) {
        self(MenuEvent::ClickAt(item))
    }

    fn menu_status(&mut self, expanded: bool) {
        self(MenuEvent::MenuStatus(expanded))
    }
}

/// Phase of a pointer gesture as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
}
