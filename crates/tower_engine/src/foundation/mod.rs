//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - Arena handle types
//! - JSON field accessors with defaults
//! - Logging utilities

pub mod math;
pub mod collections;
pub mod json;
pub mod logging;
