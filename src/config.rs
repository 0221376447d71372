//! Section/coordinator configuration, and the overlay mechanism that
//! distinguishes an unset field from one explicitly set to a falsy value.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::event::{Direction, PriorityStrategy, RestrictPolicy};
use crate::partition::DEFAULT_THRESHOLD;

/// Where a `leaveFor` override points, once resolved.
pub enum LeaveForTarget<Id> {
    /// A selector string. An empty string is the "suppress navigation"
    /// sentinel; a leading `@` is an extended selector naming a section.
    Selector(String),
    Element(Id),
    Collection(Vec<Id>),
}

/// A per-direction `leaveFor` entry: either a resolved target or a callable
/// that produces one when invoked.
#[derive(Clone)]
pub enum LeaveFor<Id> {
    Target(LeaveForTarget<Id>),
    Callback(Rc<dyn Fn() -> LeaveForTarget<Id>>),
}

impl<Id> LeaveFor<Id> {
    pub fn resolve(&self) -> LeaveForTarget<Id>
    where
        Id: Clone,
    {
        match self {
            LeaveFor::Target(t) => t.clone(),
            LeaveFor::Callback(f) => f(),
        }
    }
}

impl<Id: Clone> Clone for LeaveForTarget<Id> {
    fn clone(&self) -> Self {
        match self {
            LeaveForTarget::Selector(s) => LeaveForTarget::Selector(s.clone()),
            LeaveForTarget::Element(e) => LeaveForTarget::Element(e.clone()),
            LeaveForTarget::Collection(v) => LeaveForTarget::Collection(v.clone()),
        }
    }
}

/// A fully-populated navigation configuration, as held by the coordinator's
/// process-wide default and, once overlaid, by each section.
pub struct Config<Id> {
    pub straight_only: bool,
    pub straight_overlap_threshold: f32,
    pub remember_source: bool,
    pub priority: PriorityStrategy,
    pub restrict: RestrictPolicy,
    pub tab_index_ignore_list: Vec<String>,
    pub navigable_filter: Option<Rc<dyn Fn(Id) -> bool>>,
    pub on_focus: Option<Rc<dyn Fn(Id)>>,
    pub on_blur: Option<Rc<dyn Fn(Id)>>,
    pub leave_for: HashMap<Direction, LeaveFor<Id>>,
}

impl<Id> Default for Config<Id> {
    fn default() -> Self {
        Config {
            straight_only: false,
            straight_overlap_threshold: DEFAULT_THRESHOLD,
            remember_source: false,
            priority: PriorityStrategy::default(),
            restrict: RestrictPolicy::default(),
            tab_index_ignore_list: Vec::new(),
            navigable_filter: None,
            on_focus: None,
            on_blur: None,
            leave_for: HashMap::new(),
        }
    }
}

impl<Id: Clone> Clone for Config<Id> {
    fn clone(&self) -> Self {
        Config {
            straight_only: self.straight_only,
            straight_overlap_threshold: self.straight_overlap_threshold,
            remember_source: self.remember_source,
            priority: self.priority.clone(),
            restrict: self.restrict.clone(),
            tab_index_ignore_list: self.tab_index_ignore_list.clone(),
            navigable_filter: self.navigable_filter.clone(),
            on_focus: self.on_focus.clone(),
            on_blur: self.on_blur.clone(),
            leave_for: self.leave_for.clone(),
        }
    }
}

impl<Id> fmt::Debug for Config<Id> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("straight_only", &self.straight_only)
            .field("straight_overlap_threshold", &self.straight_overlap_threshold)
            .field("remember_source", &self.remember_source)
            .field("priority", &self.priority)
            .field("restrict", &self.restrict)
            .field("tab_index_ignore_list", &self.tab_index_ignore_list)
            .field("navigable_filter", &self.navigable_filter.is_some())
            .field("on_focus", &self.on_focus.is_some())
            .field("on_blur", &self.on_blur.is_some())
            .field("leave_for_directions", &self.leave_for.len())
            .finish()
    }
}

/// One overlay field: either not mentioned at all ([`Setting::Unset`], fall
/// through to the base config) or explicitly provided, possibly to a falsy
/// value ([`Setting::Set`]).
///
/// An unset section key is not the same as a key explicitly set to a falsy
/// value: a plain `Option<T>` cannot distinguish "the caller didn't mention
/// `on_focus`" from "the caller explicitly cleared `on_focus` to `None`".
#[derive(Clone)]
pub enum Setting<T> {
    Unset,
    Set(T),
}

impl<T> Default for Setting<T> {
    fn default() -> Self {
        Setting::Unset
    }
}

impl<T> Setting<T> {
    fn overlay_onto(self, base: &mut T) {
        if let Setting::Set(value) = self {
            *base = value;
        }
    }

    /// Combine two settings of the same field, `newer` taking precedence
    /// when explicitly `Set`, falling back to `self` otherwise. Used by
    /// [`crate::coordinator::Coordinator::set_config`] to merge incremental
    /// overrides onto a section's existing ones.
    fn merge(self, newer: Setting<T>) -> Setting<T> {
        match newer {
            Setting::Set(_) => newer,
            Setting::Unset => self,
        }
    }
}

/// A sparse set of config overrides, as accepted by [`crate::section::Section::with_config`]
/// and [`crate::coordinator::Coordinator::set_config`].
pub struct PartialConfig<Id> {
    pub straight_only: Setting<bool>,
    pub straight_overlap_threshold: Setting<f32>,
    pub remember_source: Setting<bool>,
    pub priority: Setting<PriorityStrategy>,
    pub restrict: Setting<RestrictPolicy>,
    pub tab_index_ignore_list: Setting<Vec<String>>,
    pub navigable_filter: Setting<Option<Rc<dyn Fn(Id) -> bool>>>,
    pub on_focus: Setting<Option<Rc<dyn Fn(Id)>>>,
    pub on_blur: Setting<Option<Rc<dyn Fn(Id)>>>,
    pub leave_for: Setting<HashMap<Direction, LeaveFor<Id>>>,
}

impl<Id> Default for PartialConfig<Id> {
    fn default() -> Self {
        PartialConfig {
            straight_only: Setting::default(),
            straight_overlap_threshold: Setting::default(),
            remember_source: Setting::default(),
            priority: Setting::default(),
            restrict: Setting::default(),
            tab_index_ignore_list: Setting::default(),
            navigable_filter: Setting::default(),
            on_focus: Setting::default(),
            on_blur: Setting::default(),
            leave_for: Setting::default(),
        }
    }
}

impl<Id: Clone> Clone for PartialConfig<Id> {
    fn clone(&self) -> Self {
        PartialConfig {
            straight_only: self.straight_only.clone(),
            straight_overlap_threshold: self.straight_overlap_threshold.clone(),
            remember_source: self.remember_source.clone(),
            priority: self.priority.clone(),
            restrict: self.restrict.clone(),
            tab_index_ignore_list: self.tab_index_ignore_list.clone(),
            navigable_filter: self.navigable_filter.clone(),
            on_focus: self.on_focus.clone(),
            on_blur: self.on_blur.clone(),
            leave_for: self.leave_for.clone(),
        }
    }
}

impl<Id> PartialConfig<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overlay `self` onto `base`, mutating it in place. Only fields
    /// explicitly [`Setting::Set`] replace the base's value.
    pub fn overlay_onto(self, base: &mut Config<Id>) {
        self.straight_only.overlay_onto(&mut base.straight_only);
        self.straight_overlap_threshold
            .overlay_onto(&mut base.straight_overlap_threshold);
        self.remember_source.overlay_onto(&mut base.remember_source);
        self.priority.overlay_onto(&mut base.priority);
        self.restrict.overlay_onto(&mut base.restrict);
        self.tab_index_ignore_list
            .overlay_onto(&mut base.tab_index_ignore_list);
        self.navigable_filter.overlay_onto(&mut base.navigable_filter);
        self.on_focus.overlay_onto(&mut base.on_focus);
        self.on_blur.overlay_onto(&mut base.on_blur);
        self.leave_for.overlay_onto(&mut base.leave_for);
    }

    /// Produce a fully-populated `Config` by overlaying `self` onto a
    /// cloned `base`, leaving `base` untouched.
    pub fn overlay(self, base: &Config<Id>) -> Config<Id>
    where
        Id: Clone,
    {
        let mut result = base.clone();
        self.overlay_onto(&mut result);
        result
    }

    /// Merge `newer`'s explicitly-set fields onto `self`, keeping `self`'s
    /// value wherever `newer` leaves a field `Unset`.
    pub fn merge(self, newer: PartialConfig<Id>) -> PartialConfig<Id> {
        PartialConfig {
            straight_only: self.straight_only.merge(newer.straight_only),
            straight_overlap_threshold: self.straight_overlap_threshold.merge(newer.straight_overlap_threshold),
            remember_source: self.remember_source.merge(newer.remember_source),
            priority: self.priority.merge(newer.priority),
            restrict: self.restrict.merge(newer.restrict),
            tab_index_ignore_list: self.tab_index_ignore_list.merge(newer.tab_index_ignore_list),
            navigable_filter: self.navigable_filter.merge(newer.navigable_filter),
            on_focus: self.on_focus.merge(newer.on_focus),
            on_blur: self.on_blur.merge(newer.on_blur),
            leave_for: self.leave_for.merge(newer.leave_for),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_field_falls_through_to_base() {
        let base = Config::<u32> {
            straight_only: true,
            ..Config::default()
        };
        let overlay = PartialConfig::<u32>::new();
        let result = overlay.overlay(&base);
        assert!(result.straight_only);
    }

    #[test]
    fn set_to_falsy_value_overrides_base() {
        let base = Config::<u32> {
            straight_only: true,
            ..Config::default()
        };
        let overlay = PartialConfig {
            straight_only: Setting::Set(false),
            ..PartialConfig::default()
        };
        let result = overlay.overlay(&base);
        assert!(!result.straight_only);
    }

    #[test]
    fn explicit_none_clears_optional_hook_distinctly_from_unset() {
        let base = Config::<u32> {
            on_focus: Some(Rc::new(|_: u32| {})),
            ..Config::default()
        };
        let unset = PartialConfig::<u32>::new().overlay(&base);
        assert!(unset.on_focus.is_some());

        let cleared = PartialConfig {
            on_focus: Setting::Set(None),
            ..PartialConfig::default()
        }
        .overlay(&base);
        assert!(cleared.on_focus.is_none());
    }
}
