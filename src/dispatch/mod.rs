// src/dispatch/mod.rs
// =============================================================================
// The concurrent core: a bounded pool of workers sharing one view of whether
// the target is blocking us.
//
// Submodules:
// - engine: the worker pool, backoff protocol and progress accounting
// - state: blocking state, progress and per-outcome tallies shared by workers
// =============================================================================

mod engine;
mod state;

pub use engine::{DispatchConfig, Engine};
pub use state::{Progress, RunSummary};
