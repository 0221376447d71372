#![doc = include_str!("../Readme.md")]

pub mod config;
pub mod coordinator;
pub mod dom;
pub mod elect;
pub mod event;
pub mod partition;
pub mod rect;
pub mod section;

pub use config::{Config, LeaveFor, LeaveForTarget, PartialConfig, Setting};
pub use coordinator::Coordinator;
pub use dom::{Dom, ElementId, FocusDriver, Scheduler};
pub use elect::PreviousFocus;
pub use event::{
    Direction, EventSink, FocusNotification, LeaveForOutcome, NavCause, NavigateFailed,
    PriorityStrategy, RestrictPolicy, WillFocus, WillMove, WillUnfocus,
};
pub use partition::DEFAULT_THRESHOLD;
pub use rect::{Point, Rect};
pub use section::Section;
