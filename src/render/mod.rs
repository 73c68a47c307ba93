//! # ASCII Renderer
//!
//! Visualises a [`Grid`] as a character grid: each cell becomes a 3x2 glyph
//! block, painted bottom-origin (so cardinal directions on screen match the
//! grid's own north-is-+y convention) with optional ANSI colouring.

mod ascii;

pub use ascii::AsciiRenderer;
