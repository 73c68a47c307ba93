//! # Generation Module
//!
//! The generator base contract (parameter validation, empty-map
//! construction, PRNG lifecycle) plus the three concrete algorithms:
//! [`room`] (room packer), [`passage`] (passage connector), and [`walk`]
//! (random-walk generator).
//!
//! All three share one entry point, [`generate_map`], so callers (the CLI
//! and the TCP server) don't duplicate the dispatch over generator kind.

pub mod passage;
pub mod room;
pub mod walk;

use crate::grid::Grid;
use crate::limits;
use crate::rng::DungeonRng;
use crate::{MapError, MapResult};
use serde::{Deserialize, Serialize};

/// Which algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorKind {
    Room,
    Passage,
    Walk,
}

impl GeneratorKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "room" => Some(GeneratorKind::Room),
            "passage" => Some(GeneratorKind::Passage),
            "walk" => Some(GeneratorKind::Walk),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GeneratorKind::Room => "room",
            GeneratorKind::Passage => "passage",
            GeneratorKind::Walk => "walk",
        }
    }
}

impl Default for GeneratorKind {
    fn default() -> Self {
        GeneratorKind::Passage
    }
}

/// Parameters common to every generator, plus the passage connector's
/// room-count bounds (the only generator-specific knobs spec §6 exposes;
/// everything else is a fixed per-algorithm constant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    pub width: u32,
    pub height: u32,
    pub seed: Option<u64>,
    pub min_rooms: u32,
    pub max_rooms: u32,
}

impl GenerationParams {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            seed: None,
            min_rooms: 5,
            max_rooms: 8,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_room_bounds(mut self, min_rooms: u32, max_rooms: u32) -> Self {
        self.min_rooms = min_rooms;
        self.max_rooms = max_rooms;
        self
    }

    fn validate_common(&self) -> MapResult<()> {
        if self.width < limits::MIN_WIDTH
            || self.width > limits::MAX_WIDTH
            || self.height < limits::MIN_HEIGHT
            || self.height > limits::MAX_HEIGHT
        {
            return Err(MapError::InvalidDimensions(format!(
                "width/height must be within [{}, {}]x[{}, {}], got {}x{}",
                limits::MIN_WIDTH,
                limits::MAX_WIDTH,
                limits::MIN_HEIGHT,
                limits::MAX_HEIGHT,
                self.width,
                self.height
            )));
        }
        Ok(())
    }

    fn validate_passage(&self) -> MapResult<()> {
        self.validate_common()?;
        if self.min_rooms < 1 {
            return Err(MapError::InvalidParameters(
                "minRooms must be >= 1".to_string(),
            ));
        }
        if self.max_rooms < self.min_rooms {
            return Err(MapError::InvalidParameters(format!(
                "maxRooms ({}) must be >= minRooms ({})",
                self.max_rooms, self.min_rooms
            )));
        }
        Ok(())
    }
}

/// Trait implemented by every concrete generation algorithm.
///
/// Mirrors the generator base contract: a generator is handed an already
/// validated [`GenerationParams`] and a seeded [`DungeonRng`] and returns a
/// sealed [`Grid`]. It never reaches for randomness outside the given RNG.
pub trait Generator {
    fn generate(&self, params: &GenerationParams, rng: &mut DungeonRng) -> MapResult<Grid>;

    fn generator_type(&self) -> &'static str;
}

/// Allocates an empty grid and stamps generation provenance into its
/// metadata (generator kind, seed) — the generator base contract's
/// `empty_map` plus the bookkeeping every concrete generator needs.
fn empty_map(params: &GenerationParams, kind: GeneratorKind, seed: u64) -> Grid {
    let mut grid = Grid::empty(params.width, params.height);
    grid.map_name = format!("{} dungeon", kind.name());
    grid.metadata.insert("generator".to_string(), kind.name().to_string());
    grid.metadata.insert("seed".to_string(), seed.to_string());
    grid
}

/// The generator base contract's `generate(w, h, seed)`: validates, seeds
/// the PRNG, dispatches to the requested algorithm, returns the sealed map.
pub fn generate_map(kind: GeneratorKind, params: &GenerationParams) -> MapResult<Grid> {
    match kind {
        GeneratorKind::Room => params.validate_common()?,
        GeneratorKind::Passage => params.validate_passage()?,
        GeneratorKind::Walk => params.validate_common()?,
    }

    let seed = params.seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0)
    });
    let mut rng = DungeonRng::from_seed(seed);

    let mut grid = empty_map(params, kind, seed);
    let generated = match kind {
        GeneratorKind::Room => room::RoomGenerator::default().generate(params, &mut rng)?,
        GeneratorKind::Passage => passage::PassageGenerator::default().generate(params, &mut rng)?,
        GeneratorKind::Walk => walk::WalkGenerator::default().generate(params, &mut rng)?,
    };
    // Preserve the provenance metadata stamped above; algorithms build their
    // own grid from scratch via `empty_map`/`Grid::empty` internally.
    grid.cells = generated.cells;
    grid.width = generated.width;
    grid.height = generated.height;
    for (k, v) in generated.metadata {
        grid.metadata.entry(k).or_insert(v);
    }
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_undersized_dimensions() {
        let params = GenerationParams::new(5, 5);
        let err = generate_map(GeneratorKind::Room, &params).unwrap_err();
        assert!(matches!(err, MapError::InvalidDimensions(_)));
    }

    #[test]
    fn rejects_oversized_dimensions() {
        let params = GenerationParams::new(1000, 1000);
        let err = generate_map(GeneratorKind::Room, &params).unwrap_err();
        assert!(matches!(err, MapError::InvalidDimensions(_)));
    }

    #[test]
    fn rejects_max_rooms_below_min_rooms() {
        let params = GenerationParams::new(30, 30).with_room_bounds(8, 5);
        let err = generate_map(GeneratorKind::Passage, &params).unwrap_err();
        assert!(matches!(err, MapError::InvalidParameters(_)));
    }

    #[test]
    fn kind_parse_round_trips_name() {
        for kind in [GeneratorKind::Room, GeneratorKind::Passage, GeneratorKind::Walk] {
            assert_eq!(GeneratorKind::parse(kind.name()), Some(kind));
        }
        assert_eq!(GeneratorKind::parse("bogus"), None);
    }
}
