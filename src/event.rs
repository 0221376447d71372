//! Directions, the cancellable event protocol, and the small configuration
//! enums shared between sections and the coordinator.

/// One of the four arrow-key directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// `up<->down`, `left<->right`.
    pub fn reverse(self) -> Direction {
        use Direction::*;
        match self {
            Up => Down,
            Down => Up,
            Left => Right,
            Right => Left,
        }
    }

    /// Map a `KeyboardEvent.key` value to the direction it requests, or
    /// `None` for anything but the four arrow keys. This crate has no DOM
    /// dependency to own a concrete key-event type, so it matches on the
    /// key's string name rather than an enum.
    pub fn from_key_name(key: &str) -> Option<Direction> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// What caused a navigation request to be issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavCause {
    Keydown,
    Api,
}

/// `self-only`, `self-first`, `none`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestrictPolicy {
    SelfOnly,
    #[default]
    SelfFirst,
    None,
}

/// `none`, `last-focused`, `default-element`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriorityStrategy {
    #[default]
    None,
    LastFocused,
    DefaultElement,
}

/// The three-valued outcome of resolving a section's `leaveFor` override for
/// a direction.
///
/// This must never collapse to a `bool`: `Suppressed` (an explicit
/// empty-string override) must be distinguishable from `NotApplicable` (no
/// `leaveFor` entry for this direction, fall through to the caller's own
/// handling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveForOutcome {
    /// A target was found and focus was successfully moved to it.
    Handled,
    /// No `leaveFor` override applies to this direction; caller should fall
    /// through to its normal handling.
    NotApplicable,
    /// An empty-string override was resolved: navigation is explicitly
    /// suppressed, the caller must report `navigate-failed` and stop.
    Suppressed,
}

/// Payload of the cancellable `will-move` event.
#[derive(Debug, Clone)]
pub struct WillMove {
    pub direction: Direction,
    pub section: String,
    pub cause: NavCause,
}

/// Payload of the cancellable `will-unfocus` event.
#[derive(Debug, Clone)]
pub struct WillUnfocus<Id> {
    pub next_element: Option<Id>,
    pub next_section: Option<String>,
    pub direction: Option<Direction>,
    pub native: bool,
}

/// Payload of the cancellable `will-focus` event.
#[derive(Debug, Clone)]
pub struct WillFocus<Id> {
    pub previous_element: Option<Id>,
    pub section: Option<String>,
    pub direction: Option<Direction>,
    pub native: bool,
}

/// Payload of the non-cancellable `focused`/`unfocused` notifications.
#[derive(Debug, Clone, Copy)]
pub struct FocusNotification<Id> {
    pub element: Id,
    pub native: bool,
}

/// Payload of the non-cancellable `navigate-failed` notification.
#[derive(Debug, Clone)]
pub struct NavigateFailed {
    pub section: String,
    pub direction: Direction,
}

/// The cancellable event protocol.
///
/// An embedder implements this the way it would wire up any other DOM
/// boundary (see [`crate::dom`]): cancellable events return whether a
/// listener canceled them (`preventDefault`); notifications return nothing.
pub trait EventSink<Id> {
    /// Fire `sn:will-move`. Returns `true` if canceled.
    fn will_move(&mut self, source: Id, payload: WillMove) -> bool;
    /// Fire `sn:will-unfocus`. Returns `true` if canceled.
    fn will_unfocus(&mut self, element: Id, payload: WillUnfocus<Id>) -> bool;
    /// Fire `sn:will-focus`. Returns `true` if canceled.
    fn will_focus(&mut self, element: Id, payload: WillFocus<Id>) -> bool;
    /// Fire `sn:enter-down`. Returns `true` if canceled.
    fn enter_down(&mut self, element: Id) -> bool;
    /// Fire `sn:enter-up`. Returns `true` if canceled.
    fn enter_up(&mut self, element: Id) -> bool;

    /// Fire non-cancellable `sn:unfocused`.
    fn unfocused(&mut self, payload: FocusNotification<Id>);
    /// Fire non-cancellable `sn:focused`.
    fn focused(&mut self, payload: FocusNotification<Id>);
    /// Fire non-cancellable `sn:navigate-failed`.
    fn navigate_failed(&mut self, payload: NavigateFailed);
}

#[cfg(test)]
mod tests {
    use super::Direction::*;

    #[test]
    fn reverse_is_involutive() {
        for d in [Up, Down, Left, Right] {
            assert_eq!(d.reverse().reverse(), d);
        }
    }

    #[test]
    fn reverse_pairs_are_the_opposite_axis_direction() {
        assert_eq!(Up.reverse(), Down);
        assert_eq!(Down.reverse(), Up);
        assert_eq!(Left.reverse(), Right);
        assert_eq!(Right.reverse(), Left);
    }
}
