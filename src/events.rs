//! User-facing diagnostics. Events describe what happened to a run and cost
//! lines record the number of molecules it processed; both go through `log`
//! under their own targets so they can be filtered apart from debug output.

use std::fmt::Display;

use log::info;

pub const EVENT_TARGET: &str = "event";
pub const COST_TARGET: &str = "cost";

pub fn emit_event(msg: impl Display) {
    info!(target: EVENT_TARGET, "{msg}");
}

pub fn emit_cost(units: usize) {
    info!(target: COST_TARGET, "{units}");
}
