// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// gridlens-core: grid type, configuration and error definitions shared by
// the other crates.

pub mod config;
pub mod error;
pub mod grid;
pub mod human_errors;

pub use config::ReaderConfig;
pub use error::{FailureReason, GridlensError, Result};
pub use grid::{GRID_CELLS, GRID_SIDE, Grid};
