//! Common test utilities for deploygate CLI tests.
//!
//! This module provides:
//! - `TestEnv`: a bare repository, a fake remote host, and a config file
//!   wiring the binary to them
//! - `git` helpers for building fixture history

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
