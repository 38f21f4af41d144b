//! Presentation Layer
//!
//! This layer handles:
//! - CLI argument parsing (via clap)
//! - Creating use cases with infrastructure dependencies
//! - Output formatting (text/JSON)
//!
//! ## Structure
//!
//! - `cli` - Hook flags and maintenance subcommands
//! - `factory` - Creates use cases with proper dependencies (dependency injection)
//! - `output` - Final outcome lines and exit status
//!
//! ## Usage
//!
//! ```ignore
//! use deploygate::presentation::factory;
//!
//! let session = factory::create_session(&config)?;
//! let repo = factory::create_repository(&config, &location.path, session.clone());
//! let use_case = factory::create_deploy_use_case(&config, repo, session, format)?;
//! let outcome = use_case.execute(&event, &sink);
//! ```

pub mod cli;
pub mod factory;
pub mod output;

pub use cli::{Cli, Commands, HookArgs, MirrorAction};
pub use factory::{create_deploy_use_case, ConcreteDeployUseCase, RepositoryLocation};
pub use output::{OutputFormat, Reporter};
