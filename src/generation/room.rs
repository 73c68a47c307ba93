//! # Room Packer
//!
//! Packs non-overlapping rectangular rooms into the grid and pierces each
//! with one or more doors. No attempt is made to connect rooms to one
//! another — that's the passage connector's job (see [`super::passage`]).

use super::{GenerationParams, Generator};
use crate::grid::{Direction, Grid, Position};
use crate::rng::DungeonRng;
use crate::MapResult;

const MIN_ROOM_W: u32 = 3;
const MIN_ROOM_H: u32 = 3;
const MAX_ROOM_SIZE: u32 = 8;
const MAX_PLACEMENT_ATTEMPTS: u32 = 100;
const ADDITIONAL_DOOR_CHANCE: f64 = 0.3;

struct PlacedRoom {
    x: i32,
    y: i32,
    width: u32,
    height: u32,
}

impl PlacedRoom {
    fn overlaps_with_padding(&self, other: &PlacedRoom, padding: i32) -> bool {
        let a_min_x = self.x - padding;
        let a_max_x = self.x + self.width as i32 - 1 + padding;
        let a_min_y = self.y - padding;
        let a_max_y = self.y + self.height as i32 - 1 + padding;

        let b_min_x = other.x;
        let b_max_x = other.x + other.width as i32 - 1;
        let b_min_y = other.y;
        let b_max_y = other.y + other.height as i32 - 1;

        a_min_x <= b_max_x && a_max_x >= b_min_x && a_min_y <= b_max_y && a_max_y >= b_min_y
    }
}

#[derive(Default)]
pub struct RoomGenerator;

impl Generator for RoomGenerator {
    fn generate(&self, params: &GenerationParams, rng: &mut DungeonRng) -> MapResult<Grid> {
        let mut grid = Grid::empty(params.width, params.height);
        let target_rooms =
            (params.width * params.height) / (MIN_ROOM_W * MIN_ROOM_H * 3);

        let mut rooms: Vec<PlacedRoom> = Vec::new();
        while (rooms.len() as u32) < target_rooms {
            let mut placed = false;
            for _ in 0..MAX_PLACEMENT_ATTEMPTS {
                if let Some(room) = try_place_room(&grid, rng, &rooms) {
                    paint_room(&mut grid, &room);
                    rooms.push(room);
                    placed = true;
                    break;
                }
            }
            if !placed {
                // Placement exhaustion: not an error, the map simply ends up
                // with fewer rooms than targeted (spec §4.3 failure semantics).
                break;
            }
        }

        for room in &rooms {
            add_doors(&mut grid, room, rng);
        }

        if (rooms.len() as u32) < target_rooms {
            grid.metadata.insert("placement_exhausted".to_string(), "true".to_string());
            grid.metadata.insert("rooms_placed".to_string(), rooms.len().to_string());
            grid.metadata.insert("rooms_target".to_string(), target_rooms.to_string());
        }

        Ok(grid)
    }

    fn generator_type(&self) -> &'static str {
        "room"
    }
}

fn try_place_room(grid: &Grid, rng: &mut DungeonRng, existing: &[PlacedRoom]) -> Option<PlacedRoom> {
    let wide = rng.chance(0.5);
    let long_side = rng.range_inclusive_u32(3, MAX_ROOM_SIZE);
    let short_side = rng.range_inclusive_u32(MIN_ROOM_W, MAX_ROOM_SIZE.min(long_side));
    let (width, height) = if wide {
        (long_side, short_side)
    } else {
        (short_side, long_side)
    };

    let max_x = (grid.width as i32) - 1 - (width as i32) - 1;
    let max_y = (grid.height as i32) - 1 - (height as i32) - 1;
    if max_x < 1 || max_y < 1 {
        return None;
    }
    let x = rng.range_inclusive_u32(1, max_x as u32) as i32;
    let y = rng.range_inclusive_u32(1, max_y as u32) as i32;

    let candidate = PlacedRoom { x, y, width, height };
    if existing.iter().any(|r| candidate.overlaps_with_padding(r, 1)) {
        return None;
    }
    Some(candidate)
}

fn paint_room(grid: &mut Grid, room: &PlacedRoom) {
    for dy in 0..room.height as i32 {
        for dx in 0..room.width as i32 {
            let pos = Position::new(room.x + dx, room.y + dy);
            let cell = grid.cell_at_pos_mut(pos).expect("room fits in bounds");
            cell.carve();
        }
    }
    for dy in 0..room.height as i32 {
        for dx in 0..room.width as i32 {
            let pos = Position::new(room.x + dx, room.y + dy);
            for dir in Direction::ALL {
                let on_edge = match dir {
                    Direction::West => dx == 0,
                    Direction::East => dx == room.width as i32 - 1,
                    Direction::South => dy == 0,
                    Direction::North => dy == room.height as i32 - 1,
                };
                if on_edge {
                    let cell = grid.cell_at_pos_mut(pos).expect("in bounds");
                    cell.set_wall(dir, true);
                }
            }
        }
    }
}

/// A wall-interior position (not a corner) on one side of the room, as a
/// `(cell position, direction)` door candidate.
fn wall_interior_positions(room: &PlacedRoom) -> Vec<(Position, Direction)> {
    let mut out = Vec::new();
    if room.width > 2 {
        for dx in 1..room.width as i32 - 1 {
            out.push((Position::new(room.x + dx, room.y), Direction::South));
            out.push((
                Position::new(room.x + dx, room.y + room.height as i32 - 1),
                Direction::North,
            ));
        }
    }
    if room.height > 2 {
        for dy in 1..room.height as i32 - 1 {
            out.push((Position::new(room.x, room.y + dy), Direction::West));
            out.push((
                Position::new(room.x + room.width as i32 - 1, room.y + dy),
                Direction::East,
            ));
        }
    }
    out
}

fn add_doors(grid: &mut Grid, room: &PlacedRoom, rng: &mut DungeonRng) {
    let mut candidates = wall_interior_positions(room);
    if candidates.is_empty() {
        return;
    }

    let first_idx = rng.range_u32(0, candidates.len() as u32) as usize;
    let (pos, dir) = candidates.remove(first_idx);
    let cell = grid.cell_at_pos_mut(pos).expect("in bounds");
    cell.set_door(dir, true);

    let mut k = 1u32;
    while !candidates.is_empty() {
        let chance = ADDITIONAL_DOOR_CHANCE.powi(k as i32);
        if !rng.chance(chance) {
            break;
        }
        let idx = rng.range_u32(0, candidates.len() as u32) as usize;
        let (pos, dir) = candidates.remove(idx);
        let cell = grid.cell_at_pos_mut(pos).expect("in bounds");
        cell.set_door(dir, true);
        k += 1;
    }
}
