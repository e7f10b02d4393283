//! Command handlers for CLI operations
//!
//! Copyright (c) 2025 Conforma Team
//! Licensed under the Apache-2.0 license

pub mod changelog;
pub mod check;
pub mod completions;
pub mod config;
pub mod schemas;
mod utils;
