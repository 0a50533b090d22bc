use std::fmt::{self, Display, Formatter};

use ndarray::Array2;
use pathfinding::directed::bfs::bfs_reach;
use thiserror::Error;

use crate::geometry::Coordinate;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("no data")]
    NoRows,
    #[error("row {row} has {found} cells but row 0 has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid (non-numeric) cell '{found}' at row {row}, column {column}")]
    NotADigit {
        row: usize,
        column: usize,
        found: char,
    },
    #[error("border value {0} is also a legitimate cell value")]
    SentinelInDomain(i32),
}

/// A grid of digits wrapped in a one-cell border of a sentinel value.
///
/// The border means every neighbour of an interior cell is a real cell, so
/// callers never need a bounds check; neighbours which are border cells are
/// recognised by holding the sentinel.  Coordinates are (x, y) over the
/// padded grid, so interior cells run from 1 to `width() - 2` and 1 to
/// `height() - 2`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderedGrid {
    sentinel: i32,
    // Indexed by (row, column), i.e. (y, x).
    cells: Array2<i32>,
}

fn decode_cell(row: usize, column: usize, cell: char) -> Result<i32, GridError> {
    match cell.to_digit(10) {
        Some(n) => Ok(n as i32),
        None => Err(GridError::NotADigit {
            row,
            column,
            found: cell,
        }),
    }
}

impl BorderedGrid {
    /// Builds the grid from lines of decimal digits, one row per line.
    pub fn populate<S: AsRef<str>>(lines: &[S], sentinel: i32) -> Result<BorderedGrid, GridError> {
        if (0..=9).contains(&sentinel) {
            return Err(GridError::SentinelInDomain(sentinel));
        }
        let width = match lines.first() {
            Some(line) => line.as_ref().chars().count(),
            None => {
                return Err(GridError::NoRows);
            }
        };
        let mut cells = Array2::from_elem((lines.len() + 2, width + 2), sentinel);
        for (r, line) in lines.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(GridError::RaggedRow {
                    row: r,
                    expected: width,
                    found,
                });
            }
            for (c, ch) in line.chars().enumerate() {
                cells[(r + 1, c + 1)] = decode_cell(r, c, ch)?;
            }
        }
        Ok(BorderedGrid { sentinel, cells })
    }

    pub fn sentinel(&self) -> i32 {
        self.sentinel
    }

    pub fn width(&self) -> usize {
        self.cells.ncols()
    }

    pub fn height(&self) -> usize {
        self.cells.nrows()
    }

    /// Number of interior cells.
    pub fn size(&self) -> usize {
        (self.height() - 2) * (self.width() - 2)
    }

    // A negative coordinate turns into a huge index, so it panics just
    // like any other out-of-range access.
    fn index(&self, c: Coordinate) -> (usize, usize) {
        (c.y as usize, c.x as usize)
    }

    pub fn value_at(&self, x: usize, y: usize) -> i32 {
        self.cells[(y, x)]
    }

    pub fn value(&self, c: Coordinate) -> i32 {
        self.cells[self.index(c)]
    }

    pub fn is_border(&self, c: Coordinate) -> bool {
        let (row, col) = self.index(c);
        row == 0 || col == 0 || row == self.height() - 1 || col == self.width() - 1
    }

    /// Interior coordinates in row-major order.
    pub fn interior(&self) -> impl Iterator<Item = Coordinate> {
        let width = self.width() as i32;
        let height = self.height() as i32;
        (1..height - 1).flat_map(move |y| (1..width - 1).map(move |x| Coordinate::new(x, y)))
    }

    /// Replaces every interior cell with `visit(coordinate, value)`.
    ///
    /// Some callers run this repeatedly until nothing changes, so a visitor
    /// should not depend on the traversal order.
    pub fn visit_each<F>(&mut self, mut visit: F)
    where
        F: FnMut(Coordinate, i32) -> i32,
    {
        for c in self.interior() {
            let pos = self.index(c);
            self.cells[pos] = visit(c, self.cells[pos]);
        }
    }

    /// Applies `update` to each listed cell in turn.  A coordinate listed
    /// twice is updated twice; border coordinates are skipped.
    pub fn for_each_in<F>(&mut self, coordinates: &[Coordinate], mut update: F)
    where
        F: FnMut(i32) -> i32,
    {
        for c in coordinates {
            if self.is_border(*c) {
                continue;
            }
            let pos = self.index(*c);
            self.cells[pos] = update(self.cells[pos]);
        }
    }

    /// For each listed coordinate, applies `visit` to each of its eight
    /// neighbours which does not currently hold the sentinel.
    pub fn for_each_adjacent_in<F>(&mut self, coordinates: &[Coordinate], mut visit: F)
    where
        F: FnMut(Coordinate, i32) -> i32,
    {
        for c in coordinates {
            for adjacent in c.all_adjacent() {
                let pos = self.index(adjacent);
                let value = self.cells[pos];
                if value == self.sentinel {
                    continue;
                }
                self.cells[pos] = visit(adjacent, value);
            }
        }
    }

    /// The N, S, E, W neighbours of `c` which are not border cells.
    pub fn neighbours(&self, c: Coordinate) -> impl Iterator<Item = (Coordinate, i32)> + '_ {
        c.adjacent()
            .into_iter()
            .map(move |n| (n, self.value(n)))
            .filter(move |(_, value)| *value != self.sentinel)
    }

    /// Flood fill from `start` through N, S, E, W neighbours whose value
    /// satisfies `passable`.  Each reachable cell appears once, `start`
    /// first.
    pub fn reachable_from<P>(&self, start: Coordinate, passable: P) -> Vec<Coordinate>
    where
        P: Fn(i32) -> bool,
    {
        let open = |c: Coordinate| -> bool {
            let value = self.value(c);
            value != self.sentinel && passable(value)
        };
        if !open(start) {
            return Vec::new();
        }
        let successors = |c: &Coordinate| -> Vec<Coordinate> {
            c.adjacent().into_iter().filter(|n| open(*n)).collect()
        };
        bfs_reach(start, successors).collect()
    }
}

impl Display for BorderedGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for row in self.cells.rows() {
            for value in row {
                write!(f, "{:>2} ", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
fn small_grid() -> BorderedGrid {
    BorderedGrid::populate(&["12", "34"], -1).expect("valid test input")
}

#[cfg(test)]
fn border_cells(grid: &BorderedGrid) -> Vec<i32> {
    let mut result = Vec::new();
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.is_border(Coordinate::new(x as i32, y as i32)) {
                result.push(grid.value_at(x, y));
            }
        }
    }
    result
}

#[cfg(test)]
fn interior_rows(grid: &BorderedGrid) -> Vec<Vec<i32>> {
    (1..grid.height() - 1)
        .map(|y| (1..grid.width() - 1).map(|x| grid.value_at(x, y)).collect())
        .collect()
}

#[test]
fn test_populate() {
    let grid = small_grid();
    assert_eq!(grid.width(), 4);
    assert_eq!(grid.height(), 4);
    assert_eq!(grid.size(), 4);
    assert_eq!(grid.sentinel(), -1);
    assert_eq!(interior_rows(&grid), vec![vec![1, 2], vec![3, 4]]);
    let border = border_cells(&grid);
    assert_eq!(border.len(), 12);
    assert!(border.iter().all(|v| *v == -1));
}

#[test]
fn test_populate_rectangular() {
    let grid = BorderedGrid::populate(&["123", "456"], i32::MIN).expect("valid test input");
    assert_eq!(grid.width(), 5);
    assert_eq!(grid.height(), 4);
    assert_eq!(grid.size(), 6);
    assert_eq!(grid.value_at(3, 2), 6);
    assert_eq!(grid.value(Coordinate::new(1, 1)), 1);
}

#[test]
fn test_populate_rejects_bad_input() {
    let none: [&str; 0] = [];
    assert_eq!(BorderedGrid::populate(&none, -1), Err(GridError::NoRows));
    assert_eq!(
        BorderedGrid::populate(&["123", "45"], -1),
        Err(GridError::RaggedRow {
            row: 1,
            expected: 3,
            found: 2
        })
    );
    assert_eq!(
        BorderedGrid::populate(&["12", "3x"], -1),
        Err(GridError::NotADigit {
            row: 1,
            column: 1,
            found: 'x'
        })
    );
    assert_eq!(
        BorderedGrid::populate(&["12"], 9),
        Err(GridError::SentinelInDomain(9))
    );
}

#[test]
fn test_visit_each_identity() {
    let mut grid = small_grid();
    let before = grid.clone();
    grid.visit_each(|_, v| v);
    assert_eq!(grid, before);
}

#[test]
fn test_visit_each_touches_interior_once() {
    let mut grid = BorderedGrid::populate(&["123", "456", "789"], -1).expect("valid test input");
    let mut seen: Vec<Coordinate> = Vec::new();
    grid.visit_each(|c, v| {
        seen.push(c);
        v * 10
    });
    assert_eq!(seen.len(), grid.size());
    assert!(seen.iter().all(|c| !grid.is_border(*c)));
    let mut deduped = seen.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), seen.len());
    assert_eq!(
        interior_rows(&grid),
        vec![vec![10, 20, 30], vec![40, 50, 60], vec![70, 80, 90]]
    );
    assert!(border_cells(&grid).iter().all(|v| *v == -1));
}

#[test]
fn test_for_each_in() {
    let mut grid = small_grid();
    let top_left = Coordinate::new(1, 1);
    let bottom_right = Coordinate::new(2, 2);
    grid.for_each_in(&[top_left, bottom_right, top_left], |v| v + 1);
    assert_eq!(interior_rows(&grid), vec![vec![3, 2], vec![3, 5]]);

    // Border cells are left alone.
    grid.for_each_in(&[Coordinate::new(0, 0), Coordinate::new(3, 2)], |_| 0);
    assert!(border_cells(&grid).iter().all(|v| *v == -1));
}

#[test]
fn test_for_each_adjacent_in_skips_border() {
    let mut grid = small_grid();
    let mut visited: Vec<Coordinate> = Vec::new();
    grid.for_each_adjacent_in(&[Coordinate::new(1, 1)], |c, _| {
        visited.push(c);
        100
    });
    visited.sort();
    assert_eq!(
        visited,
        vec![
            Coordinate::new(1, 2),
            Coordinate::new(2, 1),
            Coordinate::new(2, 2),
        ]
    );
    assert_eq!(interior_rows(&grid), vec![vec![1, 100], vec![100, 100]]);
    assert!(border_cells(&grid).iter().all(|v| *v == -1));
}

#[test]
fn test_for_each_adjacent_in_every_edge_cell() {
    let mut grid = BorderedGrid::populate(&["000", "000", "000"], -7).expect("valid test input");
    let everything: Vec<Coordinate> = grid.interior().collect();
    grid.for_each_adjacent_in(&everything, |c, v| {
        assert!(!(c.x == 0 || c.y == 0 || c.x == 4 || c.y == 4));
        v + 1
    });
    // Each cell is bumped once per neighbour it has.
    assert_eq!(
        interior_rows(&grid),
        vec![vec![3, 5, 3], vec![5, 8, 5], vec![3, 5, 3]]
    );
    assert!(border_cells(&grid).iter().all(|v| *v == -7));
}

#[test]
fn test_neighbours() {
    let grid = small_grid();
    let mut got: Vec<(Coordinate, i32)> = grid.neighbours(Coordinate::new(1, 1)).collect();
    got.sort();
    assert_eq!(
        got,
        vec![(Coordinate::new(1, 2), 3), (Coordinate::new(2, 1), 2)]
    );
}

#[test]
fn test_reachable_from() {
    let grid = BorderedGrid::populate(
        &[
            "2199943210",
            "3987894921",
            "9856789892",
            "8767896789",
            "9899965678",
        ],
        -1,
    )
    .expect("valid test input");
    let not_nine = |v: i32| v != 9;
    let basin = grid.reachable_from(Coordinate::new(2, 1), not_nine);
    assert_eq!(basin.len(), 3);
    assert_eq!(basin[0], Coordinate::new(2, 1));
    assert_eq!(grid.reachable_from(Coordinate::new(10, 1), not_nine).len(), 9);
    assert_eq!(grid.reachable_from(Coordinate::new(3, 3), not_nine).len(), 14);
    // Walls and the border reach nothing.
    assert!(grid.reachable_from(Coordinate::new(3, 1), not_nine).is_empty());
    assert!(grid.reachable_from(Coordinate::new(0, 0), not_nine).is_empty());
}

#[test]
fn test_display() {
    assert_eq!(
        small_grid().to_string(),
        concat!(
            "-1 -1 -1 -1 \n",
            "-1  1  2 -1 \n",
            "-1  3  4 -1 \n",
            "-1 -1 -1 -1 \n",
        )
    );
}
