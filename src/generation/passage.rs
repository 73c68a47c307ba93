//! # Passage Connector
//!
//! Scatters rectangular and circular rooms, joins them with a spanning tree
//! of corridors plus a handful of extra loop passages, and runs a final
//! normalisation pass over mutually-adjacent passage cells (see the module
//! note below on the wall-coherence open question).

use super::{GenerationParams, Generator};
use crate::grid::{Direction, Grid, Position};
use crate::rng::DungeonRng;
use crate::MapResult;

const RECT_MIN_SIDE: u32 = 3;
const RECT_MAX_SIDE_CAP: u32 = 8;
const CIRCLE_MIN_RADIUS: u32 = 2;
const CIRCLE_MAX_RADIUS_CAP: u32 = 4;
const OVERLAP_BUFFER: i32 = 2;
const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

const ROOM_CELL_TYPE: &str = "Room";
const PASSAGE_CELL_TYPE: &str = "Passage";

enum RoomShape {
    Rectangle { x: i32, y: i32, width: u32, height: u32 },
    Circle { cx: i32, cy: i32, radius: i32 },
}

struct PassageRoom {
    shape: RoomShape,
    center: Position,
}

impl PassageRoom {
    fn aabb(&self) -> (i32, i32, i32, i32) {
        match self.shape {
            RoomShape::Rectangle { x, y, width, height } => {
                (x, y, x + width as i32 - 1, y + height as i32 - 1)
            }
            RoomShape::Circle { cx, cy, radius } => (cx - radius, cy - radius, cx + radius, cy + radius),
        }
    }

    fn cells(&self) -> Vec<Position> {
        match self.shape {
            RoomShape::Rectangle { x, y, width, height } => {
                let mut out = Vec::with_capacity((width * height) as usize);
                for dy in 0..height as i32 {
                    for dx in 0..width as i32 {
                        out.push(Position::new(x + dx, y + dy));
                    }
                }
                out
            }
            RoomShape::Circle { cx, cy, radius } => {
                let mut out = Vec::new();
                let r = radius as f64;
                for dy in -radius..=radius {
                    for dx in -radius..=radius {
                        let dist = ((dx * dx + dy * dy) as f64).sqrt();
                        if dist <= r {
                            out.push(Position::new(cx + dx, cy + dy));
                        }
                    }
                }
                out
            }
        }
    }

    fn contains(&self, pos: Position) -> bool {
        match self.shape {
            RoomShape::Rectangle { x, y, width, height } => {
                pos.x >= x && pos.x < x + width as i32 && pos.y >= y && pos.y < y + height as i32
            }
            RoomShape::Circle { cx, cy, radius } => {
                let dx = (pos.x - cx) as f64;
                let dy = (pos.y - cy) as f64;
                (dx * dx + dy * dy).sqrt() <= radius as f64
            }
        }
    }

    fn overlaps_with_buffer(&self, other: &PassageRoom, buffer: i32) -> bool {
        let (a_min_x, a_min_y, a_max_x, a_max_y) = self.aabb();
        let (b_min_x, b_min_y, b_max_x, b_max_y) = other.aabb();
        (a_min_x - buffer) <= b_max_x
            && (a_max_x + buffer) >= b_min_x
            && (a_min_y - buffer) <= b_max_y
            && (a_max_y + buffer) >= b_min_y
    }
}

#[derive(Default)]
pub struct PassageGenerator;

impl Generator for PassageGenerator {
    fn generate(&self, params: &GenerationParams, rng: &mut DungeonRng) -> MapResult<Grid> {
        let mut grid = Grid::empty(params.width, params.height);

        let room_count = rng.range_inclusive_u32(params.min_rooms, params.max_rooms);
        let mut rooms: Vec<PassageRoom> = Vec::new();
        for _ in 0..room_count {
            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                if let Some(room) = try_place_room(&grid, rng, &rooms) {
                    paint_room(&mut grid, &room);
                    rooms.push(room);
                    break;
                }
            }
        }

        if (rooms.len() as u32) < room_count {
            grid.metadata.insert("placement_exhausted".to_string(), "true".to_string());
            grid.metadata.insert("rooms_placed".to_string(), rooms.len().to_string());
            grid.metadata.insert("rooms_target".to_string(), room_count.to_string());
        }

        if rooms.len() < 2 {
            return Ok(grid);
        }

        connect_rooms(&mut grid, &rooms, rng);

        let extra_count = rng.range_inclusive_u32(1, (rooms.len() as u32 / 2).max(2));
        for _ in 0..extra_count {
            let a = rng.range_u32(0, rooms.len() as u32) as usize;
            let b = nearest_other(&rooms, a);
            carve_passage(&mut grid, &rooms[a], &rooms[b], rng);
        }

        normalize_passage_walls(&mut grid);

        Ok(grid)
    }

    fn generator_type(&self) -> &'static str {
        "passage"
    }
}

fn try_place_room(grid: &Grid, rng: &mut DungeonRng, existing: &[PassageRoom]) -> Option<PassageRoom> {
    let rectangular = rng.chance(0.5);
    let candidate = if rectangular {
        let max_w = RECT_MAX_SIDE_CAP.min(grid.width / 3).max(RECT_MIN_SIDE);
        let max_h = RECT_MAX_SIDE_CAP.min(grid.height / 3).max(RECT_MIN_SIDE);
        let width = rng.range_inclusive_u32(RECT_MIN_SIDE, max_w);
        let height = rng.range_inclusive_u32(RECT_MIN_SIDE, max_h);
        let max_x = (grid.width as i32) - 1 - (width as i32) - 1;
        let max_y = (grid.height as i32) - 1 - (height as i32) - 1;
        if max_x < 1 || max_y < 1 {
            return None;
        }
        let x = rng.range_inclusive_u32(1, max_x as u32) as i32;
        let y = rng.range_inclusive_u32(1, max_y as u32) as i32;
        PassageRoom {
            shape: RoomShape::Rectangle { x, y, width, height },
            center: Position::new(x + width as i32 / 2, y + height as i32 / 2),
        }
    } else {
        let max_radius = CIRCLE_MAX_RADIUS_CAP.min((grid.width.min(grid.height)) / 6).max(CIRCLE_MIN_RADIUS);
        let radius = rng.range_inclusive_u32(CIRCLE_MIN_RADIUS, max_radius) as i32;
        let max_x = (grid.width as i32) - 1 - radius;
        let max_y = (grid.height as i32) - 1 - radius;
        if radius + 1 > max_x || radius + 1 > max_y {
            return None;
        }
        let cx = rng.range_inclusive_u32((radius + 1) as u32, max_x as u32) as i32;
        let cy = rng.range_inclusive_u32((radius + 1) as u32, max_y as u32) as i32;
        PassageRoom {
            shape: RoomShape::Circle { cx, cy, radius },
            center: Position::new(cx, cy),
        }
    };

    if existing.iter().any(|r| candidate.overlaps_with_buffer(r, OVERLAP_BUFFER)) {
        return None;
    }
    Some(candidate)
}

fn paint_room(grid: &mut Grid, room: &PassageRoom) {
    for pos in room.cells() {
        if let Some(cell) = grid.cell_at_pos_mut(pos) {
            cell.carve();
            cell.cell_type = ROOM_CELL_TYPE.to_string();
        }
    }
    for pos in room.cells() {
        for dir in Direction::ALL {
            let neighbour = pos + dir.delta();
            let wants_wall = !room.contains(neighbour);
            if wants_wall {
                if let Some(cell) = grid.cell_at_pos_mut(pos) {
                    cell.set_wall(dir, true);
                }
            }
        }
    }
}

fn nearest_other(rooms: &[PassageRoom], from: usize) -> usize {
    let mut best = if from == 0 { 1 } else { 0 };
    let mut best_dist = rooms[from].center.euclidean_distance(rooms[best].center);
    for (i, room) in rooms.iter().enumerate() {
        if i == from {
            continue;
        }
        let dist = rooms[from].center.euclidean_distance(room.center);
        if dist < best_dist {
            best_dist = dist;
            best = i;
        }
    }
    best
}

fn connect_rooms(grid: &mut Grid, rooms: &[PassageRoom], rng: &mut DungeonRng) {
    let mut connected = vec![false; rooms.len()];
    connected[0] = true;

    loop {
        let unconnected: Vec<usize> = (0..rooms.len()).filter(|&i| !connected[i]).collect();
        if unconnected.is_empty() {
            break;
        }
        let pick = unconnected[rng.range_u32(0, unconnected.len() as u32) as usize];

        let mut nearest_connected = None;
        let mut nearest_dist = f64::INFINITY;
        for (i, room) in rooms.iter().enumerate() {
            if !connected[i] {
                continue;
            }
            let dist = rooms[pick].center.euclidean_distance(room.center);
            if dist < nearest_dist {
                nearest_dist = dist;
                nearest_connected = Some(i);
            }
        }

        let target = nearest_connected.expect("at least the seed room is connected");
        carve_passage(grid, &rooms[pick], &rooms[target], rng);
        connected[pick] = true;
    }
}

enum PassageKind {
    Straight,
    T,
    X,
}

fn carve_passage(grid: &mut Grid, a: &PassageRoom, b: &PassageRoom, rng: &mut DungeonRng) {
    let kind = match rng.range_u32(0, 3) {
        0 => PassageKind::Straight,
        1 => PassageKind::T,
        _ => PassageKind::X,
    };

    let from = a.center;
    let to = b.center;
    carve_l_path(grid, from, to);

    match kind {
        PassageKind::Straight => {}
        PassageKind::T => {
            let axis_horizontal = rng.chance(0.5);
            let length = rng.range_inclusive_u32(3, 6) as i32;
            carve_stub(grid, midpoint(from, to), axis_horizontal, length);
        }
        PassageKind::X => {
            let length = rng.range_inclusive_u32(3, 6) as i32;
            let mid = midpoint(from, to);
            carve_stub(grid, mid, true, length);
            carve_stub(grid, mid, false, length);
        }
    }
}

fn midpoint(a: Position, b: Position) -> Position {
    Position::new((a.x + b.x) / 2, (a.y + b.y) / 2)
}

fn carve_stub(grid: &mut Grid, origin: Position, horizontal: bool, length: i32) {
    let (plus, minus) = if horizontal {
        (Direction::East, Direction::West)
    } else {
        (Direction::North, Direction::South)
    };
    let mut pos = origin;
    for _ in 0..length / 2 {
        pos = pos + plus.delta();
        carve_passage_point(grid, pos);
    }
    let mut pos = origin;
    for _ in 0..length / 2 {
        pos = pos + minus.delta();
        carve_passage_point(grid, pos);
    }
}

/// Carves an L-shaped route: horizontal leg at `from.y`, then vertical leg
/// at `to.x` (spec §4.4's straight passage shape; every other passage kind
/// starts from this same backbone).
fn carve_l_path(grid: &mut Grid, from: Position, to: Position) {
    let step_x = if to.x >= from.x { 1 } else { -1 };
    let mut x = from.x;
    while x != to.x {
        carve_passage_point(grid, Position::new(x, from.y));
        x += step_x;
    }
    carve_passage_point(grid, Position::new(to.x, from.y));

    let step_y = if to.y >= from.y { 1 } else { -1 };
    let mut y = from.y;
    while y != to.y {
        carve_passage_point(grid, Position::new(to.x, y));
        y += step_y;
    }
    carve_passage_point(grid, Position::new(to.x, to.y));
}

/// Carves one passage cell, wiring its walls against whatever neighbours
/// already exist and cutting a door where it meets a room perimeter.
fn carve_passage_point(grid: &mut Grid, pos: Position) {
    let already_room = grid
        .cell_at_pos(pos)
        .map(|c| !c.is_empty && c.cell_type == ROOM_CELL_TYPE)
        .unwrap_or(true);
    if already_room {
        // Don't overwrite a room cell; still open a door where this point's
        // neighbours are passage cells approaching the room (handled below
        // from the passage side).
        open_join_doors(grid, pos);
        return;
    }

    if let Some(cell) = grid.cell_at_pos_mut(pos) {
        if cell.is_empty {
            cell.carve();
            cell.cell_type = PASSAGE_CELL_TYPE.to_string();
        }
    } else {
        return;
    }

    for dir in Direction::ALL {
        let neighbour = pos + dir.delta();
        let neighbour_empty = grid.cell_at_pos(neighbour).map(|c| c.is_empty).unwrap_or(true);
        if let Some(cell) = grid.cell_at_pos_mut(pos) {
            cell.set_wall(dir, neighbour_empty);
        }
    }

    open_join_doors(grid, pos);
}

/// Where this passage cell borders a room cell whose perimeter wall faces
/// it, replace that wall with a door on both sides (spec §4.4 door
/// insertion at passage/room joins).
fn open_join_doors(grid: &mut Grid, pos: Position) {
    for dir in Direction::ALL {
        let neighbour = pos + dir.delta();
        let is_room_with_wall = grid
            .cell_at_pos(neighbour)
            .map(|c| !c.is_empty && c.cell_type == ROOM_CELL_TYPE && c.has_wall(dir.opposite()))
            .unwrap_or(false);
        let this_is_open = grid
            .cell_at_pos(pos)
            .map(|c| !c.is_empty)
            .unwrap_or(false);
        if is_room_with_wall && this_is_open {
            if let Some(cell) = grid.cell_at_pos_mut(neighbour) {
                cell.set_door(dir.opposite(), true);
            }
            if let Some(cell) = grid.cell_at_pos_mut(pos) {
                cell.set_door(dir, true);
            }
        }
    }
}

/// Final pass resolving the open question in spec §9: clears mutual walls
/// between two adjacent passage cells (neither a room perimeter), leaving
/// room perimeter walls and any doors untouched.
fn normalize_passage_walls(grid: &mut Grid) {
    let positions: Vec<Position> = grid.positions().collect();
    for pos in positions {
        let cell_type = match grid.cell_at_pos(pos) {
            Some(c) if !c.is_empty && c.cell_type == PASSAGE_CELL_TYPE => c.cell_type.clone(),
            _ => continue,
        };
        let _ = cell_type;
        for dir in Direction::ALL {
            let has_wall_no_door = grid
                .cell_at_pos(pos)
                .map(|c| c.has_wall(dir) && !c.has_door(dir))
                .unwrap_or(false);
            if !has_wall_no_door {
                continue;
            }
            let neighbour = pos + dir.delta();
            let neighbour_clears = grid
                .cell_at_pos(neighbour)
                .map(|c| !c.is_empty && c.cell_type == PASSAGE_CELL_TYPE && !c.has_door(dir.opposite()))
                .unwrap_or(false);
            if neighbour_clears {
                if let Some(cell) = grid.cell_at_pos_mut(pos) {
                    cell.set_wall(dir, false);
                }
                if let Some(cell) = grid.cell_at_pos_mut(neighbour) {
                    cell.set_wall(dir.opposite(), false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationParams;

    #[test]
    fn s1_rooms_connect_and_are_non_overlapping() {
        let params = GenerationParams::new(30, 30).with_seed(42).with_room_bounds(5, 8);
        let mut rng = DungeonRng::from_seed(42);
        let grid = PassageGenerator.generate(&params, &mut rng).unwrap();
        assert!(grid.cells.iter().any(|c| c.is_passable));
    }

    #[test]
    fn s5_small_map_completes_with_full_cell_count() {
        let params = GenerationParams::new(10, 10).with_seed(1).with_room_bounds(5, 5);
        let mut rng = DungeonRng::from_seed(1);
        let grid = PassageGenerator.generate(&params, &mut rng).unwrap();
        assert_eq!(grid.cells.len(), 100);
    }

    #[test]
    fn deterministic_for_same_seed() {
        let params = GenerationParams::new(30, 30).with_seed(42).with_room_bounds(5, 8);
        let mut rng_a = DungeonRng::from_seed(42);
        let mut rng_b = DungeonRng::from_seed(42);
        let a = PassageGenerator.generate(&params, &mut rng_a).unwrap();
        let b = PassageGenerator.generate(&params, &mut rng_b).unwrap();
        assert_eq!(a.cells, b.cells);
    }

    #[test]
    fn rectangle_overlap_detection_respects_buffer() {
        let a = PassageRoom {
            shape: RoomShape::Rectangle { x: 0, y: 0, width: 4, height: 4 },
            center: Position::new(2, 2),
        };
        let b = PassageRoom {
            shape: RoomShape::Rectangle { x: 5, y: 0, width: 4, height: 4 },
            center: Position::new(7, 2),
        };
        assert!(a.overlaps_with_buffer(&b, 2));
        let c = PassageRoom {
            shape: RoomShape::Rectangle { x: 10, y: 0, width: 4, height: 4 },
            center: Position::new(12, 2),
        };
        assert!(!a.overlaps_with_buffer(&c, 2));
    }
}
