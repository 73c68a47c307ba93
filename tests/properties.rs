//! Property-based tests covering the universally-quantified invariants.

use dungeonforge::generation::{generate_map, GenerationParams, GeneratorKind};
use dungeonforge::Direction;
use proptest::prelude::*;

fn all_kinds() -> impl Strategy<Value = GeneratorKind> {
    prop_oneof![
        Just(GeneratorKind::Room),
        Just(GeneratorKind::Passage),
        Just(GeneratorKind::Walk),
    ]
}

proptest! {
    #[test]
    fn determinism_holds_for_any_seed(seed in any::<u64>(), kind in all_kinds()) {
        let params = GenerationParams::new(20, 20).with_seed(seed).with_room_bounds(4, 6);
        let a = generate_map(kind, &params).unwrap();
        let b = generate_map(kind, &params).unwrap();
        prop_assert_eq!(a.cells, b.cells);
    }

    #[test]
    fn invariants_hold_for_any_seed(seed in any::<u64>(), kind in all_kinds()) {
        let params = GenerationParams::new(20, 20).with_seed(seed).with_room_bounds(4, 6);
        let grid = generate_map(kind, &params).unwrap();
        prop_assert!(grid.check_invariants().is_ok());
    }

    #[test]
    fn door_always_implies_wall(seed in any::<u64>(), kind in all_kinds()) {
        let params = GenerationParams::new(20, 20).with_seed(seed).with_room_bounds(4, 6);
        let grid = generate_map(kind, &params).unwrap();
        for cell in &grid.cells {
            for dir in Direction::ALL {
                if cell.has_door(dir) {
                    prop_assert!(cell.has_wall(dir));
                }
            }
        }
    }

    #[test]
    fn passable_cells_are_never_empty(seed in any::<u64>(), kind in all_kinds()) {
        let params = GenerationParams::new(20, 20).with_seed(seed).with_room_bounds(4, 6);
        let grid = generate_map(kind, &params).unwrap();
        for cell in &grid.cells {
            if cell.is_passable {
                prop_assert!(!cell.is_empty);
            }
        }
    }

    #[test]
    fn json_round_trip_is_structurally_equal(seed in any::<u64>(), kind in all_kinds()) {
        let params = GenerationParams::new(20, 20).with_seed(seed).with_room_bounds(4, 6);
        let grid = generate_map(kind, &params).unwrap();
        let encoded = serde_json::to_string(&grid).unwrap();
        let decoded: dungeonforge::Grid = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(decoded.cells, grid.cells);
        prop_assert_eq!(decoded.width, grid.width);
        prop_assert_eq!(decoded.height, grid.height);
    }

    #[test]
    fn walk_door_spacing_respects_five_cell_window(seed in any::<u64>()) {
        let params = GenerationParams::new(25, 25).with_seed(seed);
        let grid = generate_map(GeneratorKind::Walk, &params).unwrap();

        for pos in grid.positions() {
            let cell = grid.cell_at_pos(pos).unwrap();
            for dir in Direction::ALL {
                if !cell.has_door(dir) {
                    continue;
                }
                for perp in dir.perpendicular() {
                    let mut p = pos;
                    for step in 1..=5 {
                        p = p + perp.delta();
                        if let Some(other) = grid.cell_at_pos(p) {
                            if other.has_door(dir) {
                                prop_assert!(step > 2, "doors on the same wall closer than MIN_DOOR_SPACING");
                            }
                        }
                    }
                }
            }
        }
    }
}
