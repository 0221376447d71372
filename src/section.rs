//! A named region of the UI with its own configuration and focus history.

use crate::config::{Config, PartialConfig};
use crate::dom::{Dom, ElementId};
use crate::elect::PreviousFocus;
use crate::event::{Direction, PriorityStrategy};

/// A named region of focusable elements.
///
/// A `Section` never holds a reference back to its owning
/// [`crate::coordinator::Coordinator`]: every operation that needs
/// coordinator-level delegation (`focus`, `goto_leave_for`) lives on
/// `Coordinator` instead, taking a section id.
pub struct Section<Id> {
    pub(crate) id: String,
    pub selector: String,
    pub default_element_selector: Option<String>,
    pub(crate) overrides: PartialConfig<Id>,
    pub(crate) disabled: bool,
    pub(crate) last_focused_element: Option<Id>,
    pub(crate) previous_focus: Option<PreviousFocus<Id>>,
}

impl<Id: ElementId> Section<Id> {
    pub fn new(id: impl Into<String>, selector: impl Into<String>) -> Self {
        Section {
            id: id.into(),
            selector: selector.into(),
            default_element_selector: None,
            overrides: PartialConfig::new(),
            disabled: false,
            last_focused_element: None,
            previous_focus: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Overlay `config` onto this section's current overrides.
    pub fn with_config(mut self, config: PartialConfig<Id>) -> Self {
        self.overrides = config;
        self
    }

    pub fn set_default_element_selector(&mut self, selector: impl Into<String>) {
        self.default_element_selector = Some(selector.into());
    }

    /// Effective config for this section: `self.overrides` overlaid onto the
    /// coordinator's process-wide default.
    pub fn effective_config(&self, default: &Config<Id>) -> Config<Id> {
        self.overrides.clone().overlay(default)
    }

    /// `isNavigable`.
    pub fn is_navigable(
        &self,
        dom: &impl Dom<Id>,
        config: &Config<Id>,
        element: Id,
        verify_selector: bool,
    ) -> bool {
        if self.disabled {
            return false;
        }
        if !dom.has_area(element) || dom.is_disabled(element) {
            return false;
        }
        if verify_selector && !dom.matches_selector(element, &self.selector) {
            return false;
        }
        if let Some(filter) = &config.navigable_filter {
            if !filter(element) {
                return false;
            }
        }
        true
    }

    /// `getNavigableElements`.
    pub fn navigable_elements(&self, dom: &impl Dom<Id>, config: &Config<Id>) -> Vec<Id> {
        if self.disabled {
            return Vec::new();
        }
        dom.query_selector_all(&self.selector)
            .into_iter()
            .filter(|&e| self.is_navigable(dom, config, e, false))
            .collect()
    }

    /// `getDefaultElement`.
    pub fn default_element(&self, dom: &impl Dom<Id>, config: &Config<Id>) -> Option<Id> {
        let selector = self.default_element_selector.as_ref()?;
        dom.query_selector_all(selector)
            .into_iter()
            .find(|&e| self.is_navigable(dom, config, e, true))
    }

    /// `getLastFocusedElement`: re-checks navigability every read rather than
    /// trusting the cached id, since the element may have become disabled or
    /// left the document since it was last focused.
    pub fn last_focused_element(&self, dom: &impl Dom<Id>, config: &Config<Id>) -> Option<Id> {
        let candidate = self.last_focused_element?;
        self.is_navigable(dom, config, candidate, true)
            .then_some(candidate)
    }

    /// `getPrimaryElement`.
    pub fn primary_element(&self, dom: &impl Dom<Id>, config: &Config<Id>) -> Option<Id> {
        match config.priority {
            PriorityStrategy::LastFocused => self
                .last_focused_element(dom, config)
                .or_else(|| self.default_element(dom, config)),
            PriorityStrategy::DefaultElement => self.default_element(dom, config),
            PriorityStrategy::None => None,
        }
    }

    /// The element `focus()` should pick: `last-focused` prefers last, then
    /// default, then the first navigable element; any other priority
    /// prefers default, then last, then first navigable.
    pub fn focus_candidate(&self, dom: &impl Dom<Id>, config: &Config<Id>) -> Option<Id> {
        if self.disabled {
            return None;
        }
        let first_navigable = || self.navigable_elements(dom, config).into_iter().next();
        match config.priority {
            PriorityStrategy::LastFocused => self
                .last_focused_element(dom, config)
                .or_else(|| self.default_element(dom, config))
                .or_else(first_navigable),
            _ => self
                .default_element(dom, config)
                .or_else(|| self.last_focused_element(dom, config))
                .or_else(first_navigable),
        }
    }

    /// `makeFocusable`.
    pub fn make_focusable(&self, dom: &impl Dom<Id>, config: &Config<Id>) {
        for element in dom.query_selector_all(&self.selector) {
            let ignored = config
                .tab_index_ignore_list
                .iter()
                .any(|selector| dom.matches_selector(element, selector));
            if !ignored && !dom.has_tab_index(element) {
                dom.set_tab_index(element, -1);
            }
        }
    }

    /// `savePreviousFocus`.
    pub fn save_previous_focus(&mut self, target: Id, destination: Id, reverse: Direction) {
        self.previous_focus = Some(PreviousFocus {
            target,
            destination,
            reverse,
        });
    }
}
