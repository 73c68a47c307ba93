//! # Random-Walk Generator
//!
//! Grows a dungeon outward from a 3x3 anchor room at the map centre via
//! turn-biased corridor walks, branching at recorded turn points, and
//! terminating each walk either by striking existing floor, dead-ending at
//! the map edge, or blossoming into a terminal "end room". This is the most
//! intricate of the three generators; see the module-level constants for
//! the tuning surface spec §4.5 exposes.

use std::collections::VecDeque;

use super::{GenerationParams, Generator};
use crate::grid::{Direction, Grid, Position};
use crate::rng::DungeonRng;
use crate::{limits, MapResult};

const MIN_WALK_STEPS: u32 = 2;
#[allow(dead_code)]
const MAX_WALK_STEPS: u32 = 8;
const MAX_POSSIBLE_STEPS: u32 = 16;
const INITIAL_CONTINUE_CHANCE: f64 = 0.75;
const TURN_CHANCE: f64 = 0.5;

const MIN_END_ROOM_SIZE: u32 = 2;
const MAX_END_ROOM_SIZE: u32 = 4;
const END_ROOM_DOOR_CHANCE: f64 = 0.5;
const EDGE_DOOR_REDUCTION: f64 = 0.15;
const MIN_WALL_DISTANCE_FROM_EDGE: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Turn {
    Left,
    Right,
}

fn right_of(dir: Direction) -> Direction {
    match dir {
        Direction::North => Direction::East,
        Direction::East => Direction::South,
        Direction::South => Direction::West,
        Direction::West => Direction::North,
    }
}

fn left_of(dir: Direction) -> Direction {
    match dir {
        Direction::North => Direction::West,
        Direction::West => Direction::South,
        Direction::South => Direction::East,
        Direction::East => Direction::North,
    }
}

#[derive(Default)]
pub struct WalkGenerator;

impl Generator for WalkGenerator {
    fn generate(&self, params: &GenerationParams, rng: &mut DungeonRng) -> MapResult<Grid> {
        let mut grid = Grid::empty(params.width, params.height);
        let mut queue: VecDeque<(Position, Direction)> = VecDeque::new();

        place_anchor_room(&mut grid, &mut queue);

        while let Some((door_pos, dir)) = queue.pop_front() {
            let start = door_pos + dir.delta();
            run_walk(&mut grid, rng, &mut queue, start, dir, true);
        }

        apply_border_wall_pass(&mut grid);

        Ok(grid)
    }

    fn generator_type(&self) -> &'static str {
        "walk"
    }
}

/// Places the 3x3 anchor room at map centre with one door per wall, and
/// seeds the stub queue with all four.
fn place_anchor_room(grid: &mut Grid, queue: &mut VecDeque<(Position, Direction)>) {
    let cx = (grid.width / 2) as i32;
    let cy = (grid.height / 2) as i32;

    for dy in -1..=1 {
        for dx in -1..=1 {
            let pos = Position::new(cx + dx, cy + dy);
            if let Some(cell) = grid.cell_at_pos_mut(pos) {
                cell.carve();
            }
        }
    }
    for dy in -1..=1 {
        for dx in -1..=1 {
            let pos = Position::new(cx + dx, cy + dy);
            for dir in Direction::ALL {
                let on_edge = match dir {
                    Direction::West => dx == -1,
                    Direction::East => dx == 1,
                    Direction::South => dy == -1,
                    Direction::North => dy == 1,
                };
                if on_edge {
                    if let Some(cell) = grid.cell_at_pos_mut(pos) {
                        cell.set_wall(dir, true);
                    }
                }
            }
        }
    }

    let doors = [
        (Position::new(cx, cy + 1), Direction::North),
        (Position::new(cx + 1, cy), Direction::East),
        (Position::new(cx, cy - 1), Direction::South),
        (Position::new(cx - 1, cy), Direction::West),
    ];
    for (pos, dir) in doors {
        if let Some(cell) = grid.cell_at_pos_mut(pos) {
            cell.set_door(dir, true);
        }
        queue.push_back((pos, dir));
    }
}

fn inner_bounds_ok(grid: &Grid, pos: Position) -> bool {
    pos.x >= 1 && pos.y >= 1 && pos.x <= grid.width as i32 - 2 && pos.y <= grid.height as i32 - 2
}

fn door_spacing_ok_within(grid: &Grid, pos: Position, dir: Direction, window: u32) -> bool {
    for perp in dir.perpendicular() {
        let mut p = pos;
        for _ in 0..window {
            p = p + perp.delta();
            match grid.cell_at_pos(p) {
                Some(cell) if cell.has_door(dir) => return false,
                Some(_) => continue,
                None => break,
            }
        }
    }
    true
}

fn door_spacing_ok(grid: &Grid, pos: Position, dir: Direction) -> bool {
    door_spacing_ok_within(grid, pos, dir, limits::MIN_DOOR_SPACING)
}

/// Runs one corridor walk. `carve_start` is true for a launch from a door
/// stub (the cell outside the door must be carved first) and false for a
/// branch launched from a recorded turn point (already floor).
fn run_walk(
    grid: &mut Grid,
    rng: &mut DungeonRng,
    queue: &mut VecDeque<(Position, Direction)>,
    start: Position,
    start_dir: Direction,
    carve_start: bool,
) {
    if carve_start {
        match grid.cell_at_pos(start) {
            Some(cell) if !cell.is_empty => return,
            Some(_) => {
                let cell = grid.cell_at_pos_mut(start).unwrap();
                cell.carve();
                // Reciprocal of the door cut on the stub this walk launches
                // from: `set_door` also sets the matching wall, so this
                // establishes both invariant 1 and invariant 2 for the pair.
                cell.set_door(start_dir.opposite(), true);
            }
            None => return,
        }
    } else if grid.cell_at_pos(start).map(|c| c.is_empty).unwrap_or(true) {
        return;
    }

    let mut pos = start;
    let mut direction = start_dir;
    let mut last_turn: Option<Turn> = None;
    let mut total_steps: u32 = 0;
    let mut turn_points: Vec<(Position, Direction)> = Vec::new();
    let mut attempt_end_room = false;

    loop {
        let next = pos + direction.delta();
        if !inner_bounds_ok(grid, next) {
            if let Some(cell) = grid.cell_at_pos_mut(pos) {
                cell.set_wall(direction, true);
            }
            break;
        }

        let next_info = grid
            .cell_at_pos(next)
            .map(|c| (c.is_empty, c.has_wall(direction.opposite())));

        match next_info {
            Some((false, true)) => {
                if door_spacing_ok(grid, next, direction.opposite()) {
                    if let Some(cell) = grid.cell_at_pos_mut(pos) {
                        cell.set_door(direction, true);
                    }
                    if let Some(cell) = grid.cell_at_pos_mut(next) {
                        cell.set_door(direction.opposite(), true);
                    }
                    queue.retain(|&(p, d)| !(p == next && d == direction.opposite()));
                } else if let Some(cell) = grid.cell_at_pos_mut(pos) {
                    cell.set_wall(direction, true);
                }
                break;
            }
            Some((false, false)) => {
                // Struck a non-empty neighbour with no wall facing us. Spec
                // leaves this undecided; treated as a wall and dead-end. Both
                // sides get the wall so the pair stays bilaterally consistent
                // (invariant 1).
                if let Some(cell) = grid.cell_at_pos_mut(pos) {
                    cell.set_wall(direction, true);
                }
                if let Some(cell) = grid.cell_at_pos_mut(next) {
                    cell.set_wall(direction.opposite(), true);
                }
                break;
            }
            _ => {
                if let Some(cell) = grid.cell_at_pos_mut(next) {
                    cell.carve();
                }
                pos = next;
                total_steps += 1;

                if total_steps >= MIN_WALK_STEPS {
                    let progressed = (total_steps - MIN_WALK_STEPS) as f64;
                    let span = (MAX_POSSIBLE_STEPS - MIN_WALK_STEPS) as f64;
                    let p_continue = INITIAL_CONTINUE_CHANCE * (1.0 - progressed / span);
                    if rng.next_f64() > p_continue {
                        attempt_end_room = true;
                        break;
                    }
                }
                if total_steps >= MAX_POSSIBLE_STEPS {
                    attempt_end_room = true;
                    break;
                }

                if rng.chance(TURN_CHANCE) {
                    let turn = match last_turn {
                        Some(Turn::Left) => Turn::Right,
                        Some(Turn::Right) => Turn::Left,
                        None => {
                            if rng.chance(0.5) {
                                Turn::Left
                            } else {
                                Turn::Right
                            }
                        }
                    };
                    let (new_direction, not_taken) = match turn {
                        Turn::Left => (left_of(direction), right_of(direction)),
                        Turn::Right => (right_of(direction), left_of(direction)),
                    };
                    turn_points.push((pos, not_taken));
                    last_turn = Some(turn);
                    direction = new_direction;
                }
            }
        }
    }

    if attempt_end_room {
        place_end_room(grid, rng, pos, direction, queue);
    }

    for (tp_pos, branch_dir) in turn_points {
        if rng.chance(0.5) {
            run_walk(grid, rng, queue, tp_pos, branch_dir, false);
        }
    }
}

fn end_room_rect(walker: Position, heading: Direction, width: u32, height: u32) -> (i32, i32, i32, i32) {
    let start = walker + heading.delta();
    match heading {
        Direction::East => {
            let depth = width as i32;
            let span = height as i32;
            let y_min = walker.y - span / 2;
            (start.x, y_min, start.x + depth - 1, y_min + span - 1)
        }
        Direction::West => {
            let depth = width as i32;
            let span = height as i32;
            let y_min = walker.y - span / 2;
            (start.x - depth + 1, y_min, start.x, y_min + span - 1)
        }
        Direction::North => {
            let depth = height as i32;
            let span = width as i32;
            let x_min = walker.x - span / 2;
            (x_min, start.y, x_min + span - 1, start.y + depth - 1)
        }
        Direction::South => {
            let depth = height as i32;
            let span = width as i32;
            let x_min = walker.x - span / 2;
            (x_min, start.y - depth + 1, x_min + span - 1, start.y)
        }
    }
}

fn rect_fits(grid: &Grid, rect: (i32, i32, i32, i32)) -> bool {
    let (min_x, min_y, max_x, max_y) = rect;
    min_x >= 1 && min_y >= 1 && max_x <= grid.width as i32 - 2 && max_y <= grid.height as i32 - 2
}

fn rect_overlaps_nonempty(grid: &Grid, rect: (i32, i32, i32, i32)) -> bool {
    let (min_x, min_y, max_x, max_y) = rect;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if let Some(cell) = grid.cell_at(x, y) {
                if !cell.is_empty {
                    return true;
                }
            }
        }
    }
    false
}

fn place_end_room(
    grid: &mut Grid,
    rng: &mut DungeonRng,
    walker_pos: Position,
    heading: Direction,
    queue: &mut VecDeque<(Position, Direction)>,
) {
    let mut width = rng.range_inclusive_u32(MIN_END_ROOM_SIZE, MAX_END_ROOM_SIZE);
    let mut height = rng.range_inclusive_u32(MIN_END_ROOM_SIZE, MAX_END_ROOM_SIZE);

    loop {
        let rect = end_room_rect(walker_pos, heading, width, height);
        if rect_fits(grid, rect) && !rect_overlaps_nonempty(grid, rect) {
            paint_end_room(grid, rect);
            let entry_pos = walker_pos + heading.delta();
            if let Some(cell) = grid.cell_at_pos_mut(walker_pos) {
                cell.set_door(heading, true);
            }
            if let Some(cell) = grid.cell_at_pos_mut(entry_pos) {
                cell.set_door(heading.opposite(), true);
            }
            add_random_doors_to_room(grid, rng, rect, heading, queue);
            return;
        }

        let horizontal = matches!(heading, Direction::East | Direction::West);
        if horizontal {
            width = width.saturating_sub(1);
        } else {
            height = height.saturating_sub(1);
        }
        if width < MIN_END_ROOM_SIZE || height < MIN_END_ROOM_SIZE {
            if let Some(cell) = grid.cell_at_pos_mut(walker_pos) {
                cell.set_wall(heading, true);
            }
            return;
        }
    }
}

fn paint_end_room(grid: &mut Grid, rect: (i32, i32, i32, i32)) {
    let (min_x, min_y, max_x, max_y) = rect;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            if let Some(cell) = grid.cell_at_mut(x, y) {
                cell.carve();
            }
        }
    }
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            for dir in Direction::ALL {
                let on_edge = match dir {
                    Direction::West => x == min_x,
                    Direction::East => x == max_x,
                    Direction::South => y == min_y,
                    Direction::North => y == max_y,
                };
                if on_edge {
                    if let Some(cell) = grid.cell_at_mut(x, y) {
                        cell.set_wall(dir, true);
                    }
                }
            }
        }
    }
}

fn distance_to_map_edge(grid: &Grid, pos: Position) -> i32 {
    let x = pos.x;
    let y = pos.y;
    let w = grid.width as i32;
    let h = grid.height as i32;
    x.min(w - 1 - x).min(y).min(h - 1 - y)
}

/// Candidate non-corner wall cells on every side of `rect` except the entry
/// side (the side the walk entered through).
fn room_wall_candidates(rect: (i32, i32, i32, i32), entry_heading: Direction) -> Vec<(Position, Direction)> {
    let (min_x, min_y, max_x, max_y) = rect;
    let entry_wall = entry_heading.opposite();
    let mut out = Vec::new();

    if entry_wall != Direction::South && entry_wall != Direction::North {
        for x in (min_x + 1)..max_x {
            out.push((Position::new(x, min_y), Direction::South));
            out.push((Position::new(x, max_y), Direction::North));
        }
    } else if entry_wall == Direction::South {
        for x in (min_x + 1)..max_x {
            out.push((Position::new(x, max_y), Direction::North));
        }
    } else {
        for x in (min_x + 1)..max_x {
            out.push((Position::new(x, min_y), Direction::South));
        }
    }

    if entry_wall != Direction::East && entry_wall != Direction::West {
        for y in (min_y + 1)..max_y {
            out.push((Position::new(min_x, y), Direction::West));
            out.push((Position::new(max_x, y), Direction::East));
        }
    } else if entry_wall == Direction::West {
        for y in (min_y + 1)..max_y {
            out.push((Position::new(max_x, y), Direction::East));
        }
    } else {
        for y in (min_y + 1)..max_y {
            out.push((Position::new(min_x, y), Direction::West));
        }
    }

    out
}

fn add_random_doors_to_room(
    grid: &mut Grid,
    rng: &mut DungeonRng,
    rect: (i32, i32, i32, i32),
    entry_heading: Direction,
    queue: &mut VecDeque<(Position, Direction)>,
) {
    for (pos, dir) in room_wall_candidates(rect, entry_heading) {
        let edge_distance = distance_to_map_edge(grid, pos);
        let chance = (END_ROOM_DOOR_CHANCE
            - ((MIN_WALL_DISTANCE_FROM_EDGE - edge_distance) as f64) * EDGE_DOOR_REDUCTION)
            .max(0.0);
        if !rng.chance(chance) {
            continue;
        }
        // §4.5: reject if any existing door within MIN_DOOR_SPACING * 2 cells
        // along this wall already faces the same direction.
        if !door_spacing_ok_within(grid, pos, dir, limits::MIN_DOOR_SPACING * 2) {
            continue;
        }
        if let Some(cell) = grid.cell_at_pos_mut(pos) {
            cell.set_door(dir, true);
        }
        queue.push_back((pos, dir));
    }
}

fn apply_border_wall_pass(grid: &mut Grid) {
    let positions: Vec<Position> = grid.positions().collect();
    for pos in positions {
        let is_empty = match grid.cell_at_pos(pos) {
            Some(c) => c.is_empty,
            None => continue,
        };
        if is_empty {
            continue;
        }
        for dir in Direction::ALL {
            let neighbour = pos + dir.delta();
            let neighbour_empty = grid.cell_at_pos(neighbour).map(|c| c.is_empty).unwrap_or(true);
            if neighbour_empty {
                if let Some(cell) = grid.cell_at_pos_mut(pos) {
                    cell.set_wall(dir, true);
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
    fn s3_anchor_room_centred_and_doors_lead_to_corridors() {
        let params = GenerationParams::new(25, 25).with_seed(123);
        let mut rng = DungeonRng::from_seed(123);
        let grid = WalkGenerator.generate(&params, &mut rng).unwrap();
        let centre = grid.cell_at(12, 12).unwrap();
        assert!(!centre.is_empty);
        assert!(grid.cell_at(12, 13).unwrap().has_north_door);
        assert!(grid.cell_at(13, 12).unwrap().has_east_door);
        assert!(grid.cell_at(12, 11).unwrap().has_south_door);
        assert!(grid.cell_at(11, 12).unwrap().has_west_door);
    }

    #[test]
    fn s4_deterministic_across_runs() {
        let params = GenerationParams::new(25, 25).with_seed(123);
        let mut rng_a = DungeonRng::from_seed(123);
        let mut rng_b = DungeonRng::from_seed(123);
        let a = WalkGenerator.generate(&params, &mut rng_a).unwrap();
        let b = WalkGenerator.generate(&params, &mut rng_b).unwrap();
        assert_eq!(a.cells, b.cells);
    }

    #[test]
    fn border_wall_pass_walls_every_edge_of_occupied_cells() {
        let params = GenerationParams::new(20, 20).with_seed(5);
        let mut rng = DungeonRng::from_seed(5);
        let grid = WalkGenerator.generate(&params, &mut rng).unwrap();
        for pos in grid.positions() {
            let cell = grid.cell_at_pos(pos).unwrap();
            if cell.is_empty {
                continue;
            }
            for dir in Direction::ALL {
                let neighbour = pos + dir.delta();
                let neighbour_empty = grid.cell_at_pos(neighbour).map(|c| c.is_empty).unwrap_or(true);
                if neighbour_empty {
                    assert!(cell.has_wall(dir), "{pos:?} missing {dir:?} wall against empty/edge");
                }
            }
        }
    }

    #[test]
    fn every_door_has_a_carved_neighbour() {
        let params = GenerationParams::new(20, 20).with_seed(9);
        let mut rng = DungeonRng::from_seed(9);
        let grid = WalkGenerator.generate(&params, &mut rng).unwrap();
        for pos in grid.positions() {
            let cell = grid.cell_at_pos(pos).unwrap();
            for dir in Direction::ALL {
                if cell.has_door(dir) {
                    let neighbour = grid.neighbour(pos, dir);
                    let neighbour_nonempty = grid
                        .cell_at_pos(neighbour)
                        .map(|c| !c.is_empty)
                        .unwrap_or(false);
                    assert!(neighbour_nonempty, "{pos:?} door {dir:?} leads nowhere");
                }
            }
        }
    }
}
