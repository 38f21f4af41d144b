//! Domain Services
//!
//! Pure decision logic over domain values. I/O happens behind ports.

mod trigger_filter;

pub use trigger_filter::{GateDecision, SkipReason, TriggerFilter};
