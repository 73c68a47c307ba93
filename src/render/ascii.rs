use crate::grid::{Cell, Grid};
use crate::{MapError, MapResult};

const WALL_COLOR: &str = "\x1b[90m";
const DOOR_COLOR: &str = "\x1b[33m";
const FLOOR_COLOR: &str = "\x1b[97m";
const RESET: &str = "\x1b[0m";

/// Renders a [`Grid`] to a plain ASCII (optionally ANSI-coloured) string.
///
/// Each cell becomes a 3-column by 2-row glyph block; rows are emitted from
/// the highest `y` to the lowest so the printed output reads top-to-bottom
/// the way a viewer with a conventional screen orientation would expect,
/// even though the grid's own coordinate origin is the south-west corner.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiRenderer {
    pub color: bool,
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self { color: false }
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    pub fn render(&self, grid: &Grid) -> MapResult<String> {
        if grid.width == 0 || grid.height == 0 {
            return Err(MapError::InvalidMap(
                "width and height must both be > 0".to_string(),
            ));
        }
        if grid.cells.len() != (grid.width as usize) * (grid.height as usize) {
            return Err(MapError::InvalidMap(format!(
                "cells.len() == {} but width*height == {}",
                grid.cells.len(),
                grid.width as usize * grid.height as usize
            )));
        }

        let canvas_width = grid.width as usize * 3;
        let canvas_height = grid.height as usize * 2;
        let mut canvas: Vec<Vec<String>> = vec![vec![" ".to_string(); canvas_width]; canvas_height];

        for y in 0..grid.height as i32 {
            for x in 0..grid.width as i32 {
                let cell = grid.cell_at(x, y).expect("in-bounds by construction");
                let block = self.render_block(cell);
                let row_top = (grid.height as i32 - 1 - y) as usize * 2;
                let col = x as usize * 3;
                for (dy, row) in block.iter().enumerate() {
                    for (dx, glyph) in row.iter().enumerate() {
                        canvas[row_top + dy][col + dx] = glyph.clone();
                    }
                }
            }
        }

        let mut out = String::with_capacity(canvas_height * (canvas_width + 1));
        for row in canvas {
            for glyph in row {
                out.push_str(&glyph);
            }
            out.push('\n');
        }
        Ok(out)
    }

    fn render_block(&self, cell: &Cell) -> [[String; 3]; 2] {
        let floor_glyph = if cell.is_empty { " " } else { "\u{b7}" };
        let floor = self.colorize(floor_glyph, FLOOR_COLOR, !cell.is_empty);

        let north = self.edge_glyph(cell.has_north_wall, cell.has_north_door, "\u{2500}", "\u{2550}");
        let west = self.edge_glyph(cell.has_west_wall, cell.has_west_door, "\u{2502}", "\u{2551}");
        let east = self.edge_glyph(cell.has_east_wall, cell.has_east_door, "\u{2502}", "\u{2551}");

        let top_left = self.corner_glyph(cell.has_north_wall, cell.has_west_wall, "\u{250c}");
        let top_right = self.corner_glyph(cell.has_north_wall, cell.has_east_wall, "\u{2510}");

        [
            [top_left, north, top_right],
            [west, floor, east],
        ]
    }

    fn edge_glyph(&self, wall: bool, door: bool, wall_char: &str, door_char: &str) -> String {
        if door {
            self.colorize(door_char, DOOR_COLOR, true)
        } else if wall {
            self.colorize(wall_char, WALL_COLOR, true)
        } else {
            " ".to_string()
        }
    }

    fn corner_glyph(&self, wall_a: bool, wall_b: bool, both_char: &str) -> String {
        match (wall_a, wall_b) {
            (true, true) => self.colorize(both_char, WALL_COLOR, true),
            (true, false) => self.colorize("\u{2500}", WALL_COLOR, true),
            (false, true) => self.colorize("\u{2502}", WALL_COLOR, true),
            (false, false) => " ".to_string(),
        }
    }

    fn colorize(&self, glyph: &str, color: &str, apply: bool) -> String {
        if self.color && apply {
            format!("{color}{glyph}{RESET}")
        } else {
            glyph.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    #[test]
    fn rejects_zero_dimensions() {
        let renderer = AsciiRenderer::new();
        let grid = Grid::empty(0, 5);
        assert!(matches!(renderer.render(&grid), Err(MapError::InvalidMap(_))));
    }

    #[test]
    fn rejects_mismatched_cell_count() {
        let renderer = AsciiRenderer::new();
        let mut grid = Grid::empty(5, 5);
        grid.cells.pop();
        assert!(matches!(renderer.render(&grid), Err(MapError::InvalidMap(_))));
    }

    #[test]
    fn s6_renders_one_floor_glyph_per_passable_cell() {
        let renderer = AsciiRenderer::new();
        let mut grid = Grid::empty(4, 4);
        grid.cell_at_mut(1, 1).unwrap().carve();
        grid.cell_at_mut(2, 2).unwrap().carve();
        let rendered = renderer.render(&grid).unwrap();
        let floor_count = rendered.matches('\u{b7}').count();
        assert_eq!(floor_count, 2);
    }

    #[test]
    fn empty_map_has_no_floor_glyphs() {
        let renderer = AsciiRenderer::new();
        let grid = Grid::empty(4, 4);
        let rendered = renderer.render(&grid).unwrap();
        assert_eq!(rendered.matches('\u{b7}').count(), 0);
    }
}
