//! Domain Layer
//!
//! The gate's decisions without I/O: what was pushed, whether it should be
//! deployed, and which sync strategy applies.
//!
//! ## Structure
//!
//! - `entities/` - The triggering `PushEvent`
//! - `value_objects/` - Validated ids and small state enums
//! - `services/` - The trigger filter
//! - `ports/` - Interface definitions for infrastructure

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
