//! Boundary traits for the external collaborators named below:
//! DOM querying, native focus/blur, and scheduling. The engine never talks
//! to a real DOM or browser event loop directly; an embedder implements
//! these traits the way a bevy system takes `Query`/`Commands` as parameters
//! instead of owning the `World` it reads from.

use crate::rect::Rect;
use std::fmt::Debug;
use std::hash::Hash;

/// The opaque handle type a host passes around, the direct analogue of
/// bevy's `Entity`.
pub trait ElementId: Copy + Eq + Hash + Debug {}
impl<T: Copy + Eq + Hash + Debug> ElementId for T {}

/// Measurement and predicate boundary: everything the algorithm needs to
/// know about an element's geometry and DOM-level state.
pub trait Dom<Id: ElementId> {
    /// Read the element's current bounding box. Called once per element per
    /// navigation round, from a live measurement.
    fn rect(&self, element: Id) -> Rect<Id>;

    /// `true` unless the element has zero width and zero height.
    fn has_area(&self, element: Id) -> bool;

    /// `true` if the element carries a disabled attribute/state.
    fn is_disabled(&self, element: Id) -> bool;

    /// Does `element` match the given section selector?
    fn matches_selector(&self, element: Id, selector: &str) -> bool;

    /// Resolve a selector string to the elements it currently matches.
    /// Selector resolution errors are swallowed here and reported as an
    /// empty result.
    fn query_selector_all(&self, selector: &str) -> Vec<Id>;

    /// Read the per-direction `data-sn-<direction>` override, if present.
    /// `Some("")` is the explicit "suppress navigation" override.
    fn leave_for_attribute(&self, element: Id, direction: crate::event::Direction) -> Option<String>;

    /// Does this element carry an explicit `tabindex` attribute already?
    fn has_tab_index(&self, element: Id) -> bool;

    /// Assign `tabindex = value` to the element (used by `make_focusable`).
    fn set_tab_index(&self, element: Id, value: i32);

    /// Does the element carry the `non-scrollable` marker class used by
    /// "smart focus" to defer the native focus call to the next animation
    /// frame?
    fn is_non_scrollable(&self, element: Id) -> bool;
}

/// Native focus/blur boundary. Takes `&self`, not `&mut self`: a native
/// focus/blur call is a side effect on the document, not a mutation of
/// Rust-owned state — embedders needing to track state do so behind
/// interior mutability, the way `web_sys` calls themselves take `&self`.
pub trait FocusDriver<Id: ElementId> {
    /// Whatever is currently focused in the document, if anything.
    fn currently_focused(&self) -> Option<Id>;
    /// Invoke the platform's native focus call on `element`.
    fn focus(&self, element: Id);
    /// Invoke the platform's native blur call on `element`.
    fn blur(&self, element: Id);
}

/// The two deferred callbacks named below: a macro-task delay (for
/// re-focusing after a rejected native blur) and an animation-frame delay
/// (for "smart focus" on `non-scrollable`-classed elements).
///
/// A synchronous test double simply runs the callback immediately; a real
/// `wasm-bindgen` embedder schedules it via `setTimeout`/
/// `requestAnimationFrame`.
pub trait Scheduler<Id: ElementId> {
    fn defer_macrotask(&self, element: Id);
    fn defer_animation_frame(&self, element: Id);
}

/// An in-memory `Dom`/`FocusDriver`/`Scheduler` test harness.
/// `u32` element ids, string selectors matched by exact membership.
#[cfg(test)]
pub(crate) mod test_support {
    use super::{Dom, FocusDriver, Scheduler};
    use crate::event::Direction;
    use crate::rect::Rect;
    use std::cell::RefCell;
    use std::collections::HashMap;

    struct ElementData {
        selectors: Vec<String>,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        disabled: bool,
        has_tab_index: bool,
        non_scrollable: bool,
        leave_for: HashMap<Direction, String>,
    }

    #[derive(Default)]
    pub(crate) struct FakeDom {
        elements: RefCell<HashMap<u32, ElementData>>,
        focused: RefCell<Option<u32>>,
    }

    impl FakeDom {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn add(&mut self, id: u32, selector: &str, left: i32, top: i32, width: i32, height: i32) {
            self.elements.borrow_mut().insert(
                id,
                ElementData {
                    selectors: vec![selector.to_string()],
                    left,
                    top,
                    width,
                    height,
                    disabled: false,
                    has_tab_index: false,
                    non_scrollable: false,
                    leave_for: HashMap::new(),
                },
            );
        }

        pub(crate) fn set_disabled(&self, id: u32, disabled: bool) {
            if let Some(e) = self.elements.borrow_mut().get_mut(&id) {
                e.disabled = disabled;
            }
        }

        pub(crate) fn set_leave_for(&self, id: u32, direction: Direction, value: &str) {
            if let Some(e) = self.elements.borrow_mut().get_mut(&id) {
                e.leave_for.insert(direction, value.to_string());
            }
        }

        pub(crate) fn set_non_scrollable(&self, id: u32, value: bool) {
            if let Some(e) = self.elements.borrow_mut().get_mut(&id) {
                e.non_scrollable = value;
            }
        }
    }

    impl Dom<u32> for FakeDom {
        fn rect(&self, element: u32) -> Rect<u32> {
            let elements = self.elements.borrow();
            let e = elements.get(&element).expect("unknown element");
            Rect::new(element, e.left, e.top, e.width, e.height)
        }
        fn has_area(&self, element: u32) -> bool {
            let elements = self.elements.borrow();
            let e = elements.get(&element).expect("unknown element");
            e.width > 0 || e.height > 0
        }
        fn is_disabled(&self, element: u32) -> bool {
            self.elements.borrow().get(&element).map_or(false, |e| e.disabled)
        }
        fn matches_selector(&self, element: u32, selector: &str) -> bool {
            self.elements
                .borrow()
                .get(&element)
                .map_or(false, |e| e.selectors.iter().any(|s| s == selector))
        }
        fn query_selector_all(&self, selector: &str) -> Vec<u32> {
            let mut matches: Vec<u32> = self
                .elements
                .borrow()
                .iter()
                .filter(|(_, e)| e.selectors.iter().any(|s| s == selector))
                .map(|(&id, _)| id)
                .collect();
            matches.sort_unstable();
            matches
        }
        fn leave_for_attribute(&self, element: u32, direction: Direction) -> Option<String> {
            self.elements.borrow().get(&element)?.leave_for.get(&direction).cloned()
        }
        fn has_tab_index(&self, element: u32) -> bool {
            self.elements.borrow().get(&element).map_or(false, |e| e.has_tab_index)
        }
        fn set_tab_index(&self, element: u32, _value: i32) {
            if let Some(e) = self.elements.borrow_mut().get_mut(&element) {
                e.has_tab_index = true;
            }
        }
        fn is_non_scrollable(&self, element: u32) -> bool {
            self.elements.borrow().get(&element).map_or(false, |e| e.non_scrollable)
        }
    }

    impl FocusDriver<u32> for FakeDom {
        fn currently_focused(&self) -> Option<u32> {
            *self.focused.borrow()
        }
        fn focus(&self, element: u32) {
            *self.focused.borrow_mut() = Some(element);
        }
        fn blur(&self, element: u32) {
            if *self.focused.borrow() == Some(element) {
                *self.focused.borrow_mut() = None;
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct ImmediateScheduler {
        pub(crate) macrotasks: RefCell<Vec<u32>>,
        pub(crate) animation_frames: RefCell<Vec<u32>>,
    }
    impl Scheduler<u32> for ImmediateScheduler {
        fn defer_macrotask(&self, element: u32) {
            self.macrotasks.borrow_mut().push(element);
        }
        fn defer_animation_frame(&self, element: u32) {
            self.animation_frames.borrow_mut().push(element);
        }
    }

    /// Records every event fired on it, for assertions in coordinator tests.
    /// Never cancels anything unless an id is listed in `cancel_will_focus`
    /// etc.
    #[derive(Default)]
    pub(crate) struct RecordingEvents {
        pub(crate) will_moves: Vec<(u32, crate::event::WillMove)>,
        pub(crate) will_unfocuses: Vec<(u32, crate::event::WillUnfocus<u32>)>,
        pub(crate) will_focuses: Vec<(u32, crate::event::WillFocus<u32>)>,
        pub(crate) unfocused: Vec<crate::event::FocusNotification<u32>>,
        pub(crate) focused: Vec<crate::event::FocusNotification<u32>>,
        pub(crate) navigate_failed: Vec<crate::event::NavigateFailed>,
        pub(crate) cancel_will_focus_for: Vec<u32>,
    }

    impl crate::event::EventSink<u32> for RecordingEvents {
        fn will_move(&mut self, source: u32, payload: crate::event::WillMove) -> bool {
            self.will_moves.push((source, payload));
            false
        }
        fn will_unfocus(&mut self, element: u32, payload: crate::event::WillUnfocus<u32>) -> bool {
            self.will_unfocuses.push((element, payload));
            false
        }
        fn will_focus(&mut self, element: u32, payload: crate::event::WillFocus<u32>) -> bool {
            self.will_focuses.push((element, payload));
            self.cancel_will_focus_for.contains(&element)
        }
        fn enter_down(&mut self, _element: u32) -> bool {
            false
        }
        fn enter_up(&mut self, _element: u32) -> bool {
            false
        }
        fn unfocused(&mut self, payload: crate::event::FocusNotification<u32>) {
            self.unfocused.push(payload);
        }
        fn focused(&mut self, payload: crate::event::FocusNotification<u32>) {
            self.focused.push(payload);
        }
        fn navigate_failed(&mut self, payload: crate::event::NavigateFailed) {
            self.navigate_failed.push(payload);
        }
    }
}
