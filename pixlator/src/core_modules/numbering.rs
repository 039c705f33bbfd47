// THEORY:
// The numbering layer partitions the grid into ordered groups. A `NumberingMode`
// is a closed set of four strategies, and everything a mode means is kept in a
// single rule table: how a coordinate maps to a group and how many groups a grid
// of a given size has. Adding a fifth mode means adding one enum variant and one
// table row.
//
// Key principles:
// 1.  **Total and deterministic**: every pixel gets exactly one group number, and
//     the same grid and mode always produce the same numbering.
// 2.  **No gaps by construction**: each formula maps onto `[0, group_count)` and
//     every value in that range is hit by at least one cell of a non-empty grid.
//     `assign` still verifies this and reports an `EmptyGroup` if it ever fails.
// 3.  **Members in scan order**: the pixels of each group are collected during a
//     single row-major pass. The path layer re-orders them.

use crate::core_modules::pixel_grid::{Dimensions, PixelGrid, Point};
use crate::error::{ClassifyError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingMode {
    /// One group per row, numbered from the top.
    TopToBottom,
    /// One group per row, numbered from the bottom.
    BottomToTop,
    /// Anti-diagonals, `x + y` constant.
    #[default]
    DiagonalBottomRight,
    /// Diagonals, `(width - 1 - x) + y` constant.
    DiagonalBottomLeft,
}

/// Everything that distinguishes one numbering mode from another.
pub struct ModeRule {
    pub mode: NumberingMode,
    pub name: &'static str,
    pub group_of: fn(Point, Dimensions) -> usize,
    pub group_count: fn(Dimensions) -> usize,
}

fn rows(d: Dimensions) -> usize {
    d.height as usize
}

fn diagonals(d: Dimensions) -> usize {
    d.width as usize + d.height as usize - 1
}

static MODE_RULES: [ModeRule; 4] = [
    ModeRule {
        mode: NumberingMode::TopToBottom,
        name: "top_to_bottom",
        group_of: |p, _| p.y as usize,
        group_count: rows,
    },
    ModeRule {
        mode: NumberingMode::BottomToTop,
        name: "bottom_to_top",
        group_of: |p, d| (d.height - 1 - p.y) as usize,
        group_count: rows,
    },
    ModeRule {
        mode: NumberingMode::DiagonalBottomRight,
        name: "diagonal_bottom_right",
        group_of: |p, _| p.x as usize + p.y as usize,
        group_count: diagonals,
    },
    ModeRule {
        mode: NumberingMode::DiagonalBottomLeft,
        name: "diagonal_bottom_left",
        group_of: |p, d| (d.width - 1 - p.x) as usize + p.y as usize,
        group_count: diagonals,
    },
];

impl NumberingMode {
    pub const ALL: [NumberingMode; 4] = [
        NumberingMode::TopToBottom,
        NumberingMode::BottomToTop,
        NumberingMode::DiagonalBottomRight,
        NumberingMode::DiagonalBottomLeft,
    ];

    pub fn rule(self) -> &'static ModeRule {
        let rule = &MODE_RULES[self as usize];
        debug_assert_eq!(rule.mode, self);
        rule
    }

    pub fn name(self) -> &'static str {
        self.rule().name
    }

    pub fn group_of(self, point: Point, dimensions: Dimensions) -> usize {
        (self.rule().group_of)(point, dimensions)
    }

    pub fn group_count(self, dimensions: Dimensions) -> usize {
        (self.rule().group_count)(dimensions)
    }
}

impl fmt::Display for NumberingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NumberingMode {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self> {
        MODE_RULES
            .iter()
            .find(|rule| rule.name == s)
            .map(|rule| rule.mode)
            .ok_or_else(|| ClassifyError::UnknownNumberingMode(s.to_string()))
    }
}

/// The outcome of numbering a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMap {
    pub mode: NumberingMode,
    /// Group number per pixel, row-major.
    numbers: Vec<usize>,
    /// Members of each group in scan order, indexed by group number.
    members: Vec<Vec<Point>>,
}

impl GroupMap {
    pub fn group_count(&self) -> usize {
        self.members.len()
    }

    pub fn numbers(&self) -> &[usize] {
        &self.numbers
    }

    pub fn members(&self, group: usize) -> Option<&[Point]> {
        self.members.get(group).map(Vec::as_slice)
    }

    pub fn iter_groups(&self) -> impl Iterator<Item = (usize, &[Point])> {
        self.members.iter().map(Vec::as_slice).enumerate()
    }

    pub(crate) fn into_numbers(self) -> Vec<usize> {
        self.numbers
    }
}

pub mod group_assigner {
    use super::*;

    /// Numbers every pixel of `grid` under `mode`.
    pub fn assign(grid: &PixelGrid, mode: NumberingMode) -> Result<GroupMap> {
        let dimensions = grid.dimensions();
        let group_count = mode.group_count(dimensions);
        let mut numbers = Vec::with_capacity(grid.pixel_count());
        let mut members: Vec<Vec<Point>> = vec![Vec::new(); group_count];

        for (point, _) in grid.iter() {
            let group = mode.group_of(point, dimensions);
            numbers.push(group);
            members[group].push(point);
        }

        if let Some(group) = members.iter().position(Vec::is_empty) {
            return Err(ClassifyError::EmptyGroup {
                group,
                mode: mode.to_string(),
            });
        }

        Ok(GroupMap {
            mode,
            numbers,
            members,
        })
    }
}
