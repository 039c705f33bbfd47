// THEORY:
// The `PathOrderer` decides the visiting order of one group's pixels, the
// "path" that the run-length encoder walks. The rule is a snake
// (boustrophedon): even-numbered groups run in ascending `x`, odd-numbered
// groups in descending `x`. `x` is the primary axis in every mode: it is the
// coordinate that varies along a row, and on a diagonal it fixes `y`. Reading
// groups in numeric order therefore traces one continuous zig-zag over the grid.
//
// The direction is a pure function of the group number, and the comparison is
// a pure function of `(direction, x)`, so every group can be ordered
// independently. When two pixels share an `x` (which a row or diagonal
// partition never produces) the order falls back to ascending `y`.

use crate::core_modules::pixel_grid::Point;
use std::cmp::Ordering;

pub mod path_orderer {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Direction {
        Ascending,
        Descending,
    }

    #[inline]
    pub fn direction(group_number: usize) -> Direction {
        if group_number % 2 == 0 {
            Direction::Ascending
        } else {
            Direction::Descending
        }
    }

    /// Path comparison of two pixels in the same group.
    pub fn compare(direction: Direction, a: Point, b: Point) -> Ordering {
        let primary = a.x.cmp(&b.x);
        let primary = match direction {
            Direction::Ascending => primary,
            Direction::Descending => primary.reverse(),
        };
        primary.then(a.y.cmp(&b.y))
    }

    /// Orders the pixels of `group_number` along its path. The result is a
    /// permutation of `pixels`.
    pub fn order(group_number: usize, pixels: &[Point]) -> Vec<Point> {
        let direction = direction(group_number);
        let mut path = pixels.to_vec();
        path.sort_unstable_by(|a, b| compare(direction, *a, *b));
        path
    }
}
