//! Deploy Module
//!
//! Orchestrates the post-receive deployment flow.
//!
//! ## Structure
//!
//! - `options` - Resolved settings (`DeployOptions`, `StepTimeouts`)
//! - `result` - Outcome of a run (`DeployOutcome`)
//! - `sync` - Mirror bootstrap / incremental push (`SyncExecutor`)
//! - `steps` - Remote checkout, build, deploy
//! - `use_case` - Core use case logic (`DeployUseCase`)
//!
//! ## Usage
//!
//! ```ignore
//! use deploygate::application::deploy::{DeployOptions, DeployUseCase};
//!
//! let use_case = DeployUseCase::new(repo, store, transfer, shell, DeployOptions::new());
//! let outcome = use_case.execute(&event, &sink);
//! ```

mod options;
mod result;
mod steps;
mod sync;
mod use_case;

pub use options::{DeployOptions, StepTimeouts};
pub use result::DeployOutcome;
pub use steps::{run_steps, step_command};
pub use sync::{SyncExecutor, SyncFailure};
pub use use_case::{evaluate_gate, evaluate_ref, DeployUseCase};
