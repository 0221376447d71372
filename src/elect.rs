//! The directional election algorithm: given a focused rect, a direction,
//! and a pool of candidates, pick the single best next element.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::Hash;

use crate::event::Direction;
use crate::partition::{partition, Groups};
use crate::rect::{self, Rect};

/// The record enabling "snap back" on direction reversal.
#[derive(Debug, Clone, Copy)]
pub struct PreviousFocus<Id> {
    pub target: Id,
    pub destination: Id,
    pub reverse: Direction,
}

type Meter<Id> = fn(Rect<Id>, Rect<Id>) -> i32;

fn near_plumb_line<Id: Copy>(target: Rect<Id>, candidate: Rect<Id>) -> i32 {
    target.near_plumb_line_is_better(candidate)
}
fn near_horizon<Id: Copy>(target: Rect<Id>, candidate: Rect<Id>) -> i32 {
    target.near_horizon_is_better(candidate)
}
fn near_target_left<Id: Copy>(target: Rect<Id>, candidate: Rect<Id>) -> i32 {
    target.near_target_left_is_better(candidate)
}
fn near_target_top<Id: Copy>(target: Rect<Id>, candidate: Rect<Id>) -> i32 {
    target.near_target_top_is_better(candidate)
}
fn top<Id: Copy>(_target: Rect<Id>, candidate: Rect<Id>) -> i32 {
    rect::top_is_better(candidate)
}
fn bottom<Id: Copy>(_target: Rect<Id>, candidate: Rect<Id>) -> i32 {
    rect::bottom_is_better(candidate)
}
fn left<Id: Copy>(_target: Rect<Id>, candidate: Rect<Id>) -> i32 {
    rect::left_is_better(candidate)
}
fn right<Id: Copy>(_target: Rect<Id>, candidate: Rect<Id>) -> i32 {
    rect::right_is_better(candidate)
}

enum Source {
    Internal,
    Outer,
}

struct PriorityClass<Id> {
    source: Source,
    indices: &'static [usize],
    meters: Vec<Meter<Id>>,
}

/// The priority classes for `direction`, strongest first. `straight_only`
/// drops the third, "off-axis fallback" class.
fn priority_classes<Id: Copy>(direction: Direction, straight_only: bool) -> Vec<PriorityClass<Id>> {
    use Direction::*;
    let (class1, class2, class3): (&'static [usize], &'static [usize], &'static [usize]) = match direction {
        Left => (&[0, 3, 6], &[3], &[0, 6]),
        Right => (&[2, 5, 8], &[5], &[2, 8]),
        Up => (&[0, 1, 2], &[1], &[0, 2]),
        Down => (&[6, 7, 8], &[7], &[6, 8]),
    };
    let primary_meters: Vec<Meter<Id>> = match direction {
        Left | Right => vec![near_plumb_line, top],
        Up | Down => vec![near_horizon, left],
    };
    let fallback_meters: Vec<Meter<Id>> = match direction {
        Left => vec![near_horizon, right, near_target_top],
        Right => vec![near_horizon, left, near_target_top],
        Up => vec![near_plumb_line, bottom, near_target_left],
        Down => vec![near_plumb_line, top, near_target_left],
    };
    let mut classes = vec![
        PriorityClass {
            source: Source::Internal,
            indices: class1,
            meters: primary_meters.clone(),
        },
        PriorityClass {
            source: Source::Outer,
            indices: class2,
            meters: primary_meters,
        },
    ];
    if !straight_only {
        classes.push(PriorityClass {
            source: Source::Outer,
            indices: class3,
            meters: fallback_meters,
        });
    }
    classes
}

fn combine<Id: Copy + Eq + Hash>(groups: &Groups<Id>, indices: &[usize]) -> Vec<Rect<Id>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for &i in indices {
        for &candidate in &groups[i] {
            if seen.insert(candidate.element) {
                out.push(candidate);
            }
        }
    }
    out
}

fn sort_by_meters<Id: Copy>(mut group: Vec<Rect<Id>>, target: Rect<Id>, meters: &[Meter<Id>]) -> Vec<Rect<Id>> {
    group.sort_by(|&a, &b| {
        for meter in meters {
            match meter(target, a).cmp(&meter(target, b)) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    });
    group
}

/// Elect the best next element to focus from `target` in `direction` among
/// `candidates`. Returns `None` if there is no candidate in the requested
/// direction, modulo the `remember_source` override.
pub fn navigate<Id: Copy + Eq + Hash>(
    target: Rect<Id>,
    direction: Direction,
    candidates: &[Rect<Id>],
    straight_only: bool,
    threshold: f32,
    remember_source: bool,
    previous_focus: Option<PreviousFocus<Id>>,
) -> Option<Id> {
    if candidates.is_empty() {
        return None;
    }

    let groups = partition(candidates, target, threshold);
    let inside = Rect::at_point(target.element, target.center);
    let internal = partition(&groups[4], inside, threshold);

    for class in priority_classes::<Id>(direction, straight_only) {
        let source = match class.source {
            Source::Internal => &internal,
            Source::Outer => &groups,
        };
        let combined = combine(source, class.indices);
        if combined.is_empty() {
            continue;
        }
        let sorted = sort_by_meters(combined, target, &class.meters);
        return Some(apply_remember_source(
            sorted,
            target.element,
            direction,
            remember_source,
            previous_focus,
        ));
    }
    None
}

fn apply_remember_source<Id: Copy + Eq>(
    sorted: Vec<Rect<Id>>,
    target: Id,
    direction: Direction,
    remember_source: bool,
    previous_focus: Option<PreviousFocus<Id>>,
) -> Id {
    if remember_source {
        if let Some(prev) = previous_focus {
            if prev.destination == target && prev.reverse == direction {
                if let Some(found) = sorted.iter().find(|r| r.element == prev.target) {
                    return found.element;
                }
            }
        }
    }
    sorted[0].element
}
