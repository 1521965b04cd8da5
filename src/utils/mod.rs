// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 e2eflow contributors

//! Utility modules
//!
//! Common terminal-output helpers for the e2eflow CLI.

pub mod colors;
pub mod spinner;

pub use colors::*;
pub use spinner::*;
