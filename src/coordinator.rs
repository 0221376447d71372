//! The engine's front door: owns the section registry, runs
//! the election on each arrow-key move, and drives the cancellable
//! focus-change protocol. A `Coordinator` never owns a `Dom`/`FocusDriver`/
//! `EventSink`/`Scheduler` itself — every operation takes them as
//! parameters, the way a bevy system takes `Query`/`Commands` rather than a
//! `World`.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::config::{Config, LeaveForTarget, PartialConfig};
use crate::dom::{Dom, ElementId, FocusDriver, Scheduler};
use crate::elect;
use crate::event::{
    Direction, EventSink, FocusNotification, LeaveForOutcome, NavCause, NavigateFailed,
    RestrictPolicy, WillFocus, WillMove, WillUnfocus,
};
use crate::rect::Rect;
use crate::section::Section;

/// Owns every [`Section`] and the process-wide default [`Config`].
/// `default_config` lives as a plain instance field rather than shared or
/// global state.
pub struct Coordinator<Id> {
    sections: Vec<Section<Id>>,
    section_index: HashMap<String, usize>,
    default_section_id: Option<String>,
    last_section_id: Option<String>,
    pub default_config: Config<Id>,
    ready: bool,
    paused: bool,
    during_focus_change: bool,
    /// Monotonically increasing counter backing auto-generated section ids,
    /// used when [`Coordinator::add_section_with_generated_id`] is called.
    id_pool: u64,
}

impl<Id: ElementId> Default for Coordinator<Id> {
    fn default() -> Self {
        Coordinator {
            sections: Vec::new(),
            section_index: HashMap::new(),
            default_section_id: None,
            last_section_id: None,
            default_config: Config::default(),
            ready: false,
            paused: false,
            during_focus_change: false,
            id_pool: 0,
        }
    }
}

impl<Id: ElementId> Coordinator<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Lifecycle --------------------------------------------------------

    /// Idempotent: marks the coordinator ready to react to native focus
    /// events. The embedder is responsible for actually attaching the
    /// window listeners this enables.
    pub fn init(&mut self) {
        self.ready = true;
    }

    pub fn uninit(&mut self) {
        self.ready = false;
        self.clear();
    }

    pub fn clear(&mut self) {
        self.sections.clear();
        self.section_index.clear();
        self.default_section_id = None;
        self.last_section_id = None;
        self.paused = false;
        self.during_focus_change = false;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    // --- Section management ------------------------------------

    /// # Panics
    /// If `id` is already registered.
    pub fn add_section(
        &mut self,
        id: impl Into<String>,
        selector: impl Into<String>,
        config: PartialConfig<Id>,
    ) -> &Section<Id> {
        let id = id.into();
        assert!(
            !self.section_index.contains_key(&id),
            "section id {id:?} already registered"
        );
        let section = Section::new(id.clone(), selector).with_config(config);
        self.section_index.insert(id.clone(), self.sections.len());
        self.sections.push(section);
        if self.default_section_id.is_none() {
            self.default_section_id = Some(id);
        }
        self.sections.last().unwrap()
    }

    /// Add a section without naming an id: generates a fresh,
    /// never-before-used one.
    pub fn add_section_with_generated_id(&mut self, selector: impl Into<String>, config: PartialConfig<Id>) -> &Section<Id> {
        let id = loop {
            let candidate = format!("section-{}", self.id_pool);
            self.id_pool += 1;
            if !self.section_index.contains_key(&candidate) {
                break candidate;
            }
        };
        self.add_section(id, selector, config)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn get_section(&self, id: &str) -> Option<&Section<Id>> {
        self.section_index.get(id).map(|&i| &self.sections[i])
    }

    pub fn get_section_mut(&mut self, id: &str) -> Option<&mut Section<Id>> {
        let index = *self.section_index.get(id)?;
        Some(&mut self.sections[index])
    }

    pub fn get_last_section(&self) -> Option<&Section<Id>> {
        self.last_section_id.as_deref().and_then(|id| self.get_section(id))
    }

    /// First section whose selector matches `element`.
    pub fn find_section(&self, dom: &impl Dom<Id>, element: Id) -> Option<&Section<Id>> {
        self.sections.iter().find(|s| dom.matches_selector(element, &s.selector))
    }

    /// Remove a section by reference.
    ///
    /// # Panics
    /// If `section`'s id is not registered.
    pub fn remove_section(&mut self, section: &Section<Id>) {
        self.remove_section_by_id(section.id());
    }

    /// # Panics
    /// If `id` is not registered.
    pub fn remove_section_by_id(&mut self, id: &str) {
        let index = *self.section_index.get(id).unwrap_or_else(|| panic!("unknown section {id:?}"));
        self.sections.remove(index);
        self.section_index.remove(id);
        for i in self.section_index.values_mut() {
            if *i > index {
                *i -= 1;
            }
        }
        if self.default_section_id.as_deref() == Some(id) {
            self.default_section_id = None;
        }
        if self.last_section_id.as_deref() == Some(id) {
            self.last_section_id = None;
        }
    }

    pub fn disable_section(&mut self, id: &str) {
        self.get_section_mut(id).unwrap_or_else(|| panic!("unknown section {id:?}")).disabled = true;
    }

    pub fn enable_section(&mut self, id: &str) {
        self.get_section_mut(id).unwrap_or_else(|| panic!("unknown section {id:?}")).disabled = false;
    }

    /// # Panics
    /// If `id` is not registered.
    pub fn set_default_section(&mut self, id: &str) {
        assert!(self.section_index.contains_key(id), "unknown section {id:?}");
        self.default_section_id = Some(id.to_string());
    }

    /// # Panics
    /// If `id` is `Some` and not registered.
    pub fn make_focusable(&self, dom: &impl Dom<Id>, id: Option<&str>) {
        match id {
            Some(id) => {
                let section = self.get_section(id).unwrap_or_else(|| panic!("unknown section {id:?}"));
                let config = section.effective_config(&self.default_config);
                section.make_focusable(dom, &config);
            }
            None => {
                for section in &self.sections {
                    let config = section.effective_config(&self.default_config);
                    section.make_focusable(dom, &config);
                }
            }
        }
    }

    /// Overlay `config` onto the process-wide default, or merge it onto a
    /// named section's existing overrides.
    ///
    /// # Panics
    /// If `section_id` is `Some` and not registered.
    pub fn set_config(&mut self, config: PartialConfig<Id>, section_id: Option<&str>) {
        match section_id {
            Some(id) => {
                let section = self.get_section_mut(id).unwrap_or_else(|| panic!("unknown section {id:?}"));
                let current = std::mem::take(&mut section.overrides);
                section.overrides = current.merge(config);
            }
            None => config.overlay_onto(&mut self.default_config),
        }
    }

    // --- Focus -------------------------------------------

    pub fn focused_element<F: FocusDriver<Id>>(&self, focus_driver: &F) -> Option<Id> {
        focus_driver.currently_focused()
    }

    /// Blur whatever is focused and focus `element` without firing any
    /// events.
    pub fn focus_silent<F: FocusDriver<Id>>(&mut self, focus_driver: &F, element: Id) {
        if let Some(current) = focus_driver.currently_focused() {
            focus_driver.blur(current);
        }
        focus_driver.focus(element);
    }

    /// `focus()` with no argument: fall back through default, last-active,
    /// then every remaining section in insertion order.
    pub fn focus<D, F, E, S>(&mut self, dom: &D, focus_driver: &F, events: &mut E, scheduler: &S) -> bool
    where
        D: Dom<Id>,
        F: FocusDriver<Id>,
        E: EventSink<Id>,
        S: Scheduler<Id>,
    {
        self.focus_section(dom, focus_driver, events, scheduler, None)
    }

    /// `focusSection(id?)`: try `id` alone if given, else the
    /// default section, the last-active section, then every remaining
    /// section in insertion order, de-duplicated.
    pub fn focus_section<D, F, E, S>(
        &mut self,
        dom: &D,
        focus_driver: &F,
        events: &mut E,
        scheduler: &S,
        id: Option<&str>,
    ) -> bool
    where
        D: Dom<Id>,
        F: FocusDriver<Id>,
        E: EventSink<Id>,
        S: Scheduler<Id>,
    {
        let mut order = Vec::new();
        match id {
            Some(id) => order.push(id.to_string()),
            None => {
                if let Some(id) = &self.default_section_id {
                    order.push(id.clone());
                }
                if let Some(id) = &self.last_section_id {
                    if !order.contains(id) {
                        order.push(id.clone());
                    }
                }
                for section in &self.sections {
                    if !order.contains(&section.id) {
                        order.push(section.id().to_string());
                    }
                }
            }
        }

        for section_id in order {
            let Some(section) = self.get_section(&section_id) else {
                continue;
            };
            let config = section.effective_config(&self.default_config);
            let Some(element) = section.focus_candidate(dom, &config) else {
                continue;
            };
            if self.focus_element(dom, focus_driver, events, scheduler, element, &section_id, None) {
                return true;
            }
        }
        false
    }

    /// Extended-selector focus: `@` focuses a section by id (or falls
    /// through to `focus_section(None)` if bare), anything else resolves to
    /// at most one element.
    pub fn focus_extended_selector<D, F, E, S>(
        &mut self,
        dom: &D,
        focus_driver: &F,
        events: &mut E,
        scheduler: &S,
        selector: &str,
        direction: Option<Direction>,
    ) -> bool
    where
        D: Dom<Id>,
        F: FocusDriver<Id>,
        E: EventSink<Id>,
        S: Scheduler<Id>,
    {
        if let Some(rest) = selector.strip_prefix('@') {
            let target = if rest.is_empty() { None } else { Some(rest) };
            return self.focus_section(dom, focus_driver, events, scheduler, target);
        }

        let mut matches = dom.query_selector_all(selector);
        if matches.len() != 1 {
            return false;
        }
        let element = matches.remove(0);
        let Some(section_id) = self.find_section(dom, element).map(|s| s.id().to_string()) else {
            return false;
        };
        let section = self.get_section(&section_id).expect("section just looked up by id");
        let config = section.effective_config(&self.default_config);
        if !section.is_navigable(dom, &config, element, true) {
            return false;
        }
        self.focus_element(dom, focus_driver, events, scheduler, element, &section_id, direction)
    }

    /// The focus-change protocol. Re-entrant calls (native focus/blur
    /// handlers firing synchronously inside our own call) and calls while
    /// paused degrade to a silent blur+focus with no events fired, per the
    /// re-entrancy guard invariant.
    pub fn focus_element<D, F, E, S>(
        &mut self,
        dom: &D,
        focus_driver: &F,
        events: &mut E,
        scheduler: &S,
        element: Id,
        section_id: &str,
        direction: Option<Direction>,
    ) -> bool
    where
        D: Dom<Id>,
        F: FocusDriver<Id>,
        E: EventSink<Id>,
        S: Scheduler<Id>,
    {
        if self.during_focus_change || self.paused {
            trace!(
                during_focus_change = self.during_focus_change,
                paused = self.paused,
                ?element,
                "re-entrancy guard engaged, degrading to silent focus"
            );
            self.focus_silent(focus_driver, element);
            return true;
        }

        self.during_focus_change = true;
        let previous = focus_driver.currently_focused();

        if let Some(current) = previous {
            let current_section_id = self.find_section(dom, current).map(|s| s.id().to_string());
            let canceled = events.will_unfocus(
                current,
                WillUnfocus {
                    next_element: Some(element),
                    next_section: Some(section_id.to_string()),
                    direction,
                    native: false,
                },
            );
            if canceled {
                self.during_focus_change = false;
                return false;
            }
            focus_driver.blur(current);
            if current_section_id.as_deref() != Some(section_id) {
                if let Some(id) = &current_section_id {
                    if let Some(on_blur) = self
                        .get_section(id)
                        .map(|s| s.effective_config(&self.default_config))
                        .and_then(|c| c.on_blur.clone())
                    {
                        on_blur(current);
                    }
                }
            }
            events.unfocused(FocusNotification { element: current, native: false });
        }

        let canceled = events.will_focus(
            element,
            WillFocus {
                previous_element: previous,
                section: Some(section_id.to_string()),
                direction,
                native: false,
            },
        );
        if canceled {
            self.during_focus_change = false;
            return false;
        }

        // Smart focus: defer non-scrollable elements to the
        // next animation frame instead of focusing them synchronously.
        if dom.is_non_scrollable(element) {
            scheduler.defer_animation_frame(element);
        } else {
            focus_driver.focus(element);
        }

        events.focused(FocusNotification { element, native: false });
        self.during_focus_change = false;

        if let Some(&index) = self.section_index.get(section_id) {
            self.sections[index].last_focused_element = Some(element);
            if let Some(on_focus) = self.sections[index]
                .effective_config(&self.default_config)
                .on_focus
                .clone()
            {
                on_focus(element);
            }
        }
        self.last_section_id = Some(section_id.to_string());
        true
    }

    // --- Native event handling ------

    /// A native `focus` landing on the window/document itself: trigger
    /// automatic section focus.
    pub fn on_window_focus<D, F, E, S>(
        &mut self,
        dom: &D,
        focus_driver: &F,
        events: &mut E,
        scheduler: &S,
    ) -> bool
    where
        D: Dom<Id>,
        F: FocusDriver<Id>,
        E: EventSink<Id>,
        S: Scheduler<Id>,
    {
        if !self.ready {
            return false;
        }
        self.focus_section(dom, focus_driver, events, scheduler, None)
    }

    /// A native `focus` landing on a tracked element, outside of our own
    /// `focus_element` call.
    pub fn on_native_element_focus<D, F, E>(
        &mut self,
        dom: &D,
        focus_driver: &F,
        events: &mut E,
        element: Id,
    ) -> bool
    where
        D: Dom<Id>,
        F: FocusDriver<Id>,
        E: EventSink<Id>,
    {
        if !self.ready || self.during_focus_change {
            return false;
        }
        let Some(section_id) = self.find_section(dom, element).map(|s| s.id().to_string()) else {
            return false;
        };
        let canceled = events.will_focus(
            element,
            WillFocus {
                previous_element: None,
                section: Some(section_id.clone()),
                direction: None,
                native: true,
            },
        );
        if canceled {
            focus_driver.blur(element);
            return false;
        }
        events.focused(FocusNotification { element, native: true });
        if let Some(&index) = self.section_index.get(&section_id) {
            self.sections[index].last_focused_element = Some(element);
        }
        self.last_section_id = Some(section_id);
        true
    }

    /// A native `blur` firing on a tracked element. Cancellation schedules
    /// re-focus on the next macro-task.
    pub fn on_native_blur<E, S>(&mut self, events: &mut E, scheduler: &S, element: Id)
    where
        E: EventSink<Id>,
        S: Scheduler<Id>,
    {
        let canceled = events.will_unfocus(
            element,
            WillUnfocus {
                next_element: None,
                next_section: None,
                direction: None,
                native: true,
            },
        );
        if canceled {
            scheduler.defer_macrotask(element);
            return;
        }
        events.unfocused(FocusNotification { element, native: true });
    }

    pub fn on_enter_down<E: EventSink<Id>>(&mut self, events: &mut E, element: Id) -> bool {
        events.enter_down(element)
    }

    pub fn on_enter_up<E: EventSink<Id>>(&mut self, events: &mut E, element: Id) -> bool {
        events.enter_up(element)
    }

    // --- Directional navigation --------------------------------------------

    /// Run one directional navigation step. `cause` distinguishes a real
    /// keydown from a programmatic API call for the `will-move` payload.
    pub fn navigate<D, F, E, S>(
        &mut self,
        dom: &D,
        focus_driver: &F,
        events: &mut E,
        scheduler: &S,
        direction: Direction,
        cause: NavCause,
    ) -> bool
    where
        D: Dom<Id>,
        F: FocusDriver<Id>,
        E: EventSink<Id>,
        S: Scheduler<Id>,
    {
        if self.sections.is_empty() || self.paused {
            return false;
        }

        let source_element = match focus_driver.currently_focused() {
            Some(element) => element,
            None => return self.focus_section(dom, focus_driver, events, scheduler, None),
        };

        let Some(source_section_id) = self.find_section(dom, source_element).map(|s| s.id().to_string()) else {
            warn!(?source_element, "focused element does not belong to any registered section");
            return false;
        };

        let canceled = events.will_move(
            source_element,
            WillMove { direction, section: source_section_id.clone(), cause },
        );
        if canceled {
            return false;
        }

        if let Some(value) = dom.leave_for_attribute(source_element, direction) {
            if value.is_empty() {
                events.navigate_failed(NavigateFailed { section: source_section_id, direction });
                return false;
            }
            let handled = self.focus_extended_selector(dom, focus_driver, events, scheduler, &value, Some(direction));
            if !handled {
                events.navigate_failed(NavigateFailed { section: source_section_id, direction });
            }
            return handled;
        }

        let source_index = self.section_index[&source_section_id];
        let effective_config = self.sections[source_index].effective_config(&self.default_config);
        let source_rect = dom.rect(source_element);

        let mut own = Vec::new();
        let mut other = Vec::new();
        for section in &self.sections {
            let section_config = section.effective_config(&self.default_config);
            for candidate in section.navigable_elements(dom, &section_config) {
                if candidate == source_element {
                    continue;
                }
                let rect = dom.rect(candidate);
                if section.id() == source_section_id {
                    own.push(rect);
                } else {
                    other.push(rect);
                }
            }
        }

        let elected = match effective_config.restrict {
            RestrictPolicy::SelfOnly => self.elect_from(&own, source_rect, direction, &effective_config, source_index),
            RestrictPolicy::SelfFirst => self
                .elect_from(&own, source_rect, direction, &effective_config, source_index)
                .or_else(|| self.elect_from(&other, source_rect, direction, &effective_config, source_index)),
            RestrictPolicy::None => {
                let combined: Vec<Rect<Id>> = own.iter().chain(other.iter()).copied().collect();
                self.elect_from(&combined, source_rect, direction, &effective_config, source_index)
            }
        };

        match elected {
            Some(element) => {
                self.sections[source_index].save_previous_focus(source_element, element, direction.reverse());
                let destination_section_id = self.find_section(dom, element).map(|s| s.id().to_string());
                let crossing_sections = destination_section_id.as_deref() != Some(source_section_id.as_str());

                let final_element = if crossing_sections {
                    match self.goto_leave_for(dom, focus_driver, events, scheduler, &source_section_id, direction) {
                        LeaveForOutcome::Handled => return true,
                        LeaveForOutcome::Suppressed => {
                            events.navigate_failed(NavigateFailed { section: source_section_id, direction });
                            return false;
                        }
                        LeaveForOutcome::NotApplicable => destination_section_id
                            .as_deref()
                            .and_then(|id| self.get_section(id))
                            .and_then(|s| s.primary_element(dom, &s.effective_config(&self.default_config)))
                            .unwrap_or(element),
                    }
                } else {
                    element
                };

                let focus_section_id = self
                    .find_section(dom, final_element)
                    .map(|s| s.id().to_string())
                    .unwrap_or(source_section_id);
                self.focus_element(dom, focus_driver, events, scheduler, final_element, &focus_section_id, Some(direction))
            }
            None => match self.goto_leave_for(dom, focus_driver, events, scheduler, &source_section_id, direction) {
                LeaveForOutcome::Handled => true,
                LeaveForOutcome::NotApplicable | LeaveForOutcome::Suppressed => {
                    events.navigate_failed(NavigateFailed { section: source_section_id, direction });
                    false
                }
            },
        }
    }

    /// Drive a navigation move directly from a keydown event: suppressed
    /// entirely if a modifier key is held or the key isn't one of the four
    /// arrow keys, otherwise delegates to [`Coordinator::navigate`] with
    /// [`NavCause::Keydown`].
    pub fn navigate_from_keydown<D, F, E, S>(
        &mut self,
        dom: &D,
        focus_driver: &F,
        events: &mut E,
        scheduler: &S,
        key: &str,
        modifier_held: bool,
    ) -> bool
    where
        D: Dom<Id>,
        F: FocusDriver<Id>,
        E: EventSink<Id>,
        S: Scheduler<Id>,
    {
        if modifier_held {
            return false;
        }
        let Some(direction) = Direction::from_key_name(key) else {
            return false;
        };
        self.navigate(dom, focus_driver, events, scheduler, direction, NavCause::Keydown)
    }

    fn elect_from(
        &self,
        candidates: &[Rect<Id>],
        source_rect: Rect<Id>,
        direction: Direction,
        config: &Config<Id>,
        source_index: usize,
    ) -> Option<Id> {
        elect::navigate(
            source_rect,
            direction,
            candidates,
            config.straight_only,
            config.straight_overlap_threshold,
            config.remember_source,
            self.sections[source_index].previous_focus,
        )
    }

    /// `gotoLeaveFor`, delegated here rather than living on
    /// `Section`.
    fn goto_leave_for<D, F, E, S>(
        &mut self,
        dom: &D,
        focus_driver: &F,
        events: &mut E,
        scheduler: &S,
        section_id: &str,
        direction: Direction,
    ) -> LeaveForOutcome
    where
        D: Dom<Id>,
        F: FocusDriver<Id>,
        E: EventSink<Id>,
        S: Scheduler<Id>,
    {
        let Some(config) = self.get_section(section_id).map(|s| s.effective_config(&self.default_config)) else {
            debug!(section_id, "leave-for resolution falling through: section not found");
            return LeaveForOutcome::NotApplicable;
        };
        let Some(leave_for) = config.leave_for.get(&direction) else {
            debug!(section_id, ?direction, "leave-for resolution falling through: no override for this direction");
            return LeaveForOutcome::NotApplicable;
        };

        match leave_for.resolve() {
            LeaveForTarget::Selector(selector) if selector.is_empty() => LeaveForOutcome::Suppressed,
            LeaveForTarget::Selector(selector) => {
                let handled = self.focus_extended_selector(dom, focus_driver, events, scheduler, &selector, Some(direction));
                if handled {
                    LeaveForOutcome::Handled
                } else {
                    debug!(section_id, selector, "leave-for resolution falling through: selector matched nothing focusable");
                    LeaveForOutcome::NotApplicable
                }
            }
            LeaveForTarget::Element(element) => self.focus_leave_for_element(dom, focus_driver, events, scheduler, section_id, element, direction),
            LeaveForTarget::Collection(elements) => match elements.into_iter().next() {
                Some(element) => self.focus_leave_for_element(dom, focus_driver, events, scheduler, section_id, element, direction),
                None => {
                    debug!(section_id, "leave-for resolution falling through: collection override was empty");
                    LeaveForOutcome::NotApplicable
                }
            },
        }
    }

    fn focus_leave_for_element<D, F, E, S>(
        &mut self,
        dom: &D,
        focus_driver: &F,
        events: &mut E,
        scheduler: &S,
        fallback_section_id: &str,
        element: Id,
        direction: Direction,
    ) -> LeaveForOutcome
    where
        D: Dom<Id>,
        F: FocusDriver<Id>,
        E: EventSink<Id>,
        S: Scheduler<Id>,
    {
        let section_id = self
            .find_section(dom, element)
            .map(|s| s.id().to_string())
            .unwrap_or_else(|| fallback_section_id.to_string());
        let handled = self.focus_element(dom, focus_driver, events, scheduler, element, &section_id, Some(direction));
        if handled {
            LeaveForOutcome::Handled
        } else {
            debug!(section_id, ?element, "leave-for resolution falling through: target element rejected the focus change");
            LeaveForOutcome::NotApplicable
        }
    }
}
