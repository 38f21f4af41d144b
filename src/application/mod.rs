//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `DeployUseCase` - Gate a push, sync the remote mirror, run the remote steps
//! - `MirrorUseCase` - Operator view of the per-project mirror state

pub mod deploy;
pub mod mirror;

pub use deploy::{DeployOptions, DeployOutcome, DeployUseCase, StepTimeouts};
pub use mirror::MirrorUseCase;
