//! # Grid Model
//!
//! The shared data structure produced by every generator: a flat grid of
//! [`Cell`]s plus a little bookkeeping metadata. Generators mutate a `Grid`
//! in place while they run; once returned, callers treat it as an immutable
//! value (see the crate-level docs for the full lifecycle).
//!
//! Coordinate convention: `x` increases eastward, `y` increases northward.
//! The origin `(0, 0)` is the south-west corner. Cells are stored row-major
//! with `index = y * width + x`.

mod direction;
mod position;

pub use direction::Direction;
pub use position::Position;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One unit of the grid.
///
/// An empty cell has no floor and no walls of its own and is never passable;
/// setting `is_empty = true` always forces `is_passable = false` (see
/// [`Cell::set_empty`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Cell {
    pub is_empty: bool,
    pub is_passable: bool,
    pub has_north_wall: bool,
    pub has_east_wall: bool,
    pub has_south_wall: bool,
    pub has_west_wall: bool,
    pub has_north_door: bool,
    pub has_east_door: bool,
    pub has_south_door: bool,
    pub has_west_door: bool,
    pub cell_type: String,
    pub properties: HashMap<String, String>,
}

impl Cell {
    /// An empty cell: no floor, no walls, not passable.
    pub fn empty() -> Self {
        Self {
            is_empty: true,
            is_passable: false,
            has_north_wall: false,
            has_east_wall: false,
            has_south_wall: false,
            has_west_wall: false,
            has_north_door: false,
            has_east_door: false,
            has_south_door: false,
            has_west_door: false,
            cell_type: "Default".to_string(),
            properties: HashMap::new(),
        }
    }

    /// An open floor cell: non-empty, passable, no walls or doors yet.
    pub fn floor() -> Self {
        Self {
            is_empty: false,
            is_passable: true,
            ..Self::empty()
        }
    }

    /// Marks this cell empty, forcing `is_passable` false (invariant 5).
    pub fn set_empty(&mut self) {
        self.is_empty = true;
        self.is_passable = false;
    }

    /// Marks this cell carved floor: non-empty and passable.
    pub fn carve(&mut self) {
        self.is_empty = false;
        self.is_passable = true;
    }

    pub fn has_wall(&self, dir: Direction) -> bool {
        match dir {
            Direction::North => self.has_north_wall,
            Direction::East => self.has_east_wall,
            Direction::South => self.has_south_wall,
            Direction::West => self.has_west_wall,
        }
    }

    pub fn set_wall(&mut self, dir: Direction, value: bool) {
        match dir {
            Direction::North => self.has_north_wall = value,
            Direction::East => self.has_east_wall = value,
            Direction::South => self.has_south_wall = value,
            Direction::West => self.has_west_wall = value,
        }
    }

    pub fn has_door(&self, dir: Direction) -> bool {
        match dir {
            Direction::North => self.has_north_door,
            Direction::East => self.has_east_door,
            Direction::South => self.has_south_door,
            Direction::West => self.has_west_door,
        }
    }

    /// Cuts a door on `dir`: implies a wall on the same edge (invariant 3).
    pub fn set_door(&mut self, dir: Direction, value: bool) {
        match dir {
            Direction::North => self.has_north_door = value,
            Direction::East => self.has_east_door = value,
            Direction::South => self.has_south_door = value,
            Direction::West => self.has_west_door = value,
        }
        if value {
            self.set_wall(dir, true);
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::empty()
    }
}

/// A flat grid of cells plus descriptive metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Grid {
    pub width: u32,
    pub height: u32,
    pub map_name: String,
    pub floor_level: i32,
    pub metadata: HashMap<String, String>,
    pub cells: Vec<Cell>,
}

impl Grid {
    /// Allocates a grid of the given dimensions, every cell empty.
    ///
    /// This is the generator base contract's `empty_map(w, h)` (spec §4.2).
    pub fn empty(width: u32, height: u32) -> Self {
        let count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            map_name: "Dungeon".to_string(),
            floor_level: 0,
            metadata: HashMap::new(),
            cells: vec![Cell::empty(); count],
        }
    }

    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Returns the cell at `(x, y)`, or `None` if out of bounds. This is the
    /// "sentinel out-of-bounds indicator" from spec §4.2's `cell_at`: absence
    /// (`None`) plays that role rather than a dummy cell value.
    pub fn cell_at(&self, x: i32, y: i32) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Mutable counterpart of [`Grid::cell_at`].
    pub fn cell_at_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            Some(&mut self.cells[idx])
        } else {
            None
        }
    }

    pub fn cell_at_pos(&self, pos: Position) -> Option<&Cell> {
        self.cell_at(pos.x, pos.y)
    }

    pub fn cell_at_pos_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.cell_at_mut(pos.x, pos.y)
    }

    /// Iterates over every in-bounds position of the grid, low `y` to high.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        let width = self.width as i32;
        let height = self.height as i32;
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }

    /// Returns the neighbour position one step from `pos` in `dir`, together
    /// with whether that neighbour is in bounds.
    pub fn neighbour(&self, pos: Position, dir: Direction) -> Position {
        pos + dir.delta()
    }

    /// True if every adjacent non-empty pair has matching wall and door
    /// flags, every door implies a wall, every border is walled, and every
    /// passable cell is non-empty. Used by tests and by the renderer's
    /// input validation.
    pub fn check_invariants(&self) -> Result<(), String> {
        for pos in self.positions() {
            let cell = self.cell_at_pos(pos).expect("in-bounds position");
            if cell.is_passable && cell.is_empty {
                return Err(format!("{pos:?} is passable but empty"));
            }
            for dir in Direction::ALL {
                if cell.has_door(dir) && !cell.has_wall(dir) {
                    return Err(format!("{pos:?} has a {dir:?} door without a wall"));
                }
                if cell.is_empty {
                    continue;
                }
                let neighbour = self.neighbour(pos, dir);
                match self.cell_at_pos(neighbour) {
                    None => {
                        if !cell.has_wall(dir) {
                            return Err(format!("{pos:?} borders the map edge ({dir:?}) without a wall"));
                        }
                    }
                    Some(neighbour_cell) => {
                        if neighbour_cell.is_empty {
                            if !cell.has_wall(dir) {
                                return Err(format!(
                                    "{pos:?} borders an empty neighbour ({dir:?}) without a wall"
                                ));
                            }
                            continue;
                        }
                        let opposite = dir.opposite();
                        if cell.has_wall(dir) != neighbour_cell.has_wall(opposite) {
                            return Err(format!(
                                "wall mismatch between {pos:?} ({dir:?}) and {neighbour:?} ({opposite:?})"
                            ));
                        }
                        if cell.has_door(dir) != neighbour_cell.has_door(opposite) {
                            return Err(format!(
                                "door mismatch between {pos:?} ({dir:?}) and {neighbour:?} ({opposite:?})"
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_grid_has_no_floor() {
        let grid = Grid::empty(10, 10);
        assert_eq!(grid.cells.len(), 100);
        assert!(grid.cells.iter().all(|c| c.is_empty && !c.is_passable));
    }

    #[test]
    fn set_door_implies_wall() {
        let mut cell = Cell::floor();
        assert!(!cell.has_wall(Direction::North));
        cell.set_door(Direction::North, true);
        assert!(cell.has_wall(Direction::North));
        assert!(cell.has_door(Direction::North));
    }

    #[test]
    fn set_empty_forces_not_passable() {
        let mut cell = Cell::floor();
        cell.set_empty();
        assert!(cell.is_empty);
        assert!(!cell.is_passable);
    }

    #[test]
    fn cell_at_out_of_bounds_is_none() {
        let grid = Grid::empty(5, 5);
        assert!(grid.cell_at(-1, 0).is_none());
        assert!(grid.cell_at(0, 5).is_none());
        assert!(grid.cell_at(4, 4).is_some());
    }

    #[test]
    fn empty_grid_satisfies_invariants() {
        let grid = Grid::empty(12, 12);
        assert!(grid.check_invariants().is_ok());
    }
}
