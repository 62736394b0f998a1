// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The 9x9 puzzle grid and its 81-character string form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GridlensError;

/// Number of rows (and columns) of a grid.
pub const GRID_SIDE: usize = 9;

/// Number of cells of a grid.
pub const GRID_CELLS: usize = GRID_SIDE * GRID_SIDE;

/// A 9x9 puzzle grid. Each cell holds a digit in `0..=9`, 0 meaning blank.
///
/// The string form is the 81 digits concatenated row by row, which is also
/// the key the cache collaborator stores solutions under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Grid {
    cells: [[u8; GRID_SIDE]; GRID_SIDE],
}

impl Grid {
    /// An all-blank grid.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a grid from rows, rejecting values above 9.
    pub fn from_rows(rows: [[u8; GRID_SIDE]; GRID_SIDE]) -> Result<Self, GridlensError> {
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value > 9 {
                    return Err(GridlensError::InvalidGrid(format!(
                        "cell ({row}, {col}) holds {value}"
                    )));
                }
            }
        }
        Ok(Self { cells: rows })
    }

    /// Parse the row-major 81-character digit string.
    pub fn parse(digits: &str) -> Result<Self, GridlensError> {
        let count = digits.chars().count();
        if count != GRID_CELLS {
            return Err(GridlensError::InvalidGrid(format!(
                "expected {GRID_CELLS} digits, got {count}"
            )));
        }
        let mut grid = Self::empty();
        for (idx, ch) in digits.chars().enumerate() {
            let value = ch.to_digit(10).ok_or_else(|| {
                GridlensError::InvalidGrid(format!("non-digit {ch:?} at position {idx}"))
            })?;
            grid.cells[idx / GRID_SIDE][idx % GRID_SIDE] = value as u8;
        }
        Ok(grid)
    }

    /// Row-major 81-character digit string.
    pub fn serialize(&self) -> String {
        self.cells
            .iter()
            .flatten()
            .map(|&d| char::from(b'0' + d))
            .collect()
    }

    /// Value at `(row, col)`. Panics when out of range.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    /// Store `value` at `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, value: u8) -> Result<(), GridlensError> {
        if row >= GRID_SIDE || col >= GRID_SIDE || value > 9 {
            return Err(GridlensError::InvalidGrid(format!(
                "cannot store {value} at ({row}, {col})"
            )));
        }
        self.cells[row][col] = value;
        Ok(())
    }

    pub fn rows(&self) -> &[[u8; GRID_SIDE]; GRID_SIDE] {
        &self.cells
    }

    /// Number of blank cells.
    pub fn blank_count(&self) -> usize {
        self.cells.iter().flatten().filter(|&&d| d == 0).count()
    }

    /// True when no cell is blank.
    pub fn is_complete(&self) -> bool {
        self.blank_count() == 0
    }

    /// Boxed multi-line rendering, blanks shown as dots.
    pub fn pretty(&self) -> String {
        let separator = "+-------+-------+-------+\n";
        let mut out = String::with_capacity(13 * 26);
        for (row, values) in self.cells.iter().enumerate() {
            if row % 3 == 0 {
                out.push_str(separator);
            }
            for (col, &value) in values.iter().enumerate() {
                if col % 3 == 0 {
                    out.push_str("| ");
                }
                out.push(if value == 0 { '.' } else { char::from(b'0' + value) });
                out.push(' ');
            }
            out.push_str("|\n");
        }
        out.push_str(separator);
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}

impl FromStr for Grid {
    type Err = GridlensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Grid {
    type Error = GridlensError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Grid> for String {
    fn from(grid: Grid) -> Self {
        grid.serialize()
    }
}
