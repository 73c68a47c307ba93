//! Integration tests covering the concrete scenarios.

use dungeonforge::generation::{generate_map, GenerationParams, GeneratorKind};
use dungeonforge::render::AsciiRenderer;

fn connected_components(grid: &dungeonforge::Grid) -> usize {
    use dungeonforge::Direction;
    use std::collections::HashSet;

    let mut visited: HashSet<(i32, i32)> = HashSet::new();
    let mut components = 0;

    for pos in grid.positions() {
        let cell = grid.cell_at_pos(pos).unwrap();
        if !cell.is_passable || visited.contains(&(pos.x, pos.y)) {
            continue;
        }
        components += 1;
        let mut stack = vec![pos];
        while let Some(p) = stack.pop() {
            if !visited.insert((p.x, p.y)) {
                continue;
            }
            let cell = grid.cell_at_pos(p).unwrap();
            for dir in Direction::ALL {
                if !cell.has_wall(dir) || cell.has_door(dir) {
                    let neighbour = grid.neighbour(p, dir);
                    if let Some(ncell) = grid.cell_at_pos(neighbour) {
                        if ncell.is_passable {
                            stack.push(neighbour);
                        }
                    }
                }
            }
        }
    }
    components
}

fn count_rooms(grid: &dungeonforge::Grid) -> usize {
    use std::collections::HashSet;
    let mut visited: HashSet<(i32, i32)> = HashSet::new();
    let mut rooms = 0;
    for pos in grid.positions() {
        let cell = grid.cell_at_pos(pos).unwrap();
        if cell.cell_type != "Room" || visited.contains(&(pos.x, pos.y)) {
            continue;
        }
        rooms += 1;
        let mut stack = vec![pos];
        while let Some(p) = stack.pop() {
            if !visited.insert((p.x, p.y)) {
                continue;
            }
            for dir in dungeonforge::Direction::ALL {
                let neighbour = grid.neighbour(p, dir);
                if let Some(ncell) = grid.cell_at_pos(neighbour) {
                    if ncell.cell_type == "Room" {
                        stack.push(neighbour);
                    }
                }
            }
        }
    }
    rooms
}

#[test]
fn s1_passage_connects_at_least_five_rooms() {
    let params = GenerationParams::new(30, 30).with_seed(42).with_room_bounds(5, 8);
    let grid = generate_map(GeneratorKind::Passage, &params).unwrap();

    assert!(count_rooms(&grid) >= 5);
    assert_eq!(connected_components(&grid), 1);
}

#[test]
fn s2_room_generator_rooms_have_doors_and_no_overlap() {
    let params = GenerationParams::new(20, 20).with_seed(7);
    let grid = generate_map(GeneratorKind::Room, &params).unwrap();

    let door_cells = grid
        .cells
        .iter()
        .filter(|c| c.has_north_door || c.has_east_door || c.has_south_door || c.has_west_door)
        .count();
    assert!(door_cells > 0);
    assert!(grid.check_invariants().is_ok());
}

#[test]
fn s3_walk_anchor_room_centred_at_expected_coordinates() {
    let params = GenerationParams::new(25, 25).with_seed(123);
    let grid = generate_map(GeneratorKind::Walk, &params).unwrap();

    let centre = grid.cell_at(12, 12).unwrap();
    assert!(!centre.is_empty);
    assert!(!grid.cell_at(12, 13).unwrap().is_empty);
    assert!(!grid.cell_at(13, 12).unwrap().is_empty);
    assert!(!grid.cell_at(12, 11).unwrap().is_empty);
    assert!(!grid.cell_at(11, 12).unwrap().is_empty);
}

#[test]
fn s4_walk_is_byte_equal_across_runs() {
    let params = GenerationParams::new(25, 25).with_seed(123);
    let a = generate_map(GeneratorKind::Walk, &params).unwrap();
    let b = generate_map(GeneratorKind::Walk, &params).unwrap();
    assert_eq!(a.cells, b.cells);
}

#[test]
fn s5_small_passage_map_completes_with_full_cell_count() {
    let params = GenerationParams::new(10, 10).with_seed(1).with_room_bounds(5, 5);
    let grid = generate_map(GeneratorKind::Passage, &params).unwrap();
    assert_eq!(grid.cells.len(), 100);
}

#[test]
fn s6_renderer_glyph_count_matches_passable_cells() {
    let params = GenerationParams::new(12, 12).with_seed(99);
    let grid = generate_map(GeneratorKind::Walk, &params).unwrap();
    let renderer = AsciiRenderer::new();
    let rendered = renderer.render(&grid).unwrap();

    let passable_count = grid.cells.iter().filter(|c| c.is_passable).count();
    let floor_glyph_count = rendered.matches('\u{b7}').count();
    assert_eq!(floor_glyph_count, passable_count);
}
