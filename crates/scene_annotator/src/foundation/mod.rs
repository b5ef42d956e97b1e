//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Math types and transforms
//! - Time measurement for progress reporting
//! - Logging initialization

pub mod math;
pub mod time;
pub mod logging;
