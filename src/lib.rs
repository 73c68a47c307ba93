//! # Dungeonforge
//!
//! A deterministic procedural dungeon map generator.
//!
//! ## Architecture Overview
//!
//! - **Grid model** ([`grid`]): the flat `Cell` array every generator fills
//!   in and every renderer/transport reads back.
//! - **Seeded PRNG** ([`rng`]): the one randomness source every generator is
//!   required to thread its decisions through.
//! - **Generation** ([`generation`]): the generator base contract plus the
//!   three concrete algorithms (room packer, passage connector, random walk).
//! - **Rendering** ([`render`]): the ASCII visualiser.
//! - **Server** ([`server`]): the TCP wire envelope and request loop that
//!   hands generated maps to a viewer.
//!
//! The generation core is single-threaded and synchronous by design. Every
//! downstream consumer (rendering, transport) treats a returned
//! [`grid::Grid`] as an immutable value once a generator returns it.

pub mod generation;
pub mod grid;
pub mod render;
pub mod rng;
pub mod server;

pub use generation::{generate_map, GenerationParams, Generator, GeneratorKind};
pub use grid::{Cell, Direction, Grid, Position};
pub use render::AsciiRenderer;
pub use rng::DungeonRng;

/// Crate-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum MapError {
    /// Width/height outside the allowed range.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// A generator-specific parameter was out of range (e.g. `maxRooms < minRooms`).
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The ASCII renderer's input preconditions were violated.
    #[error("invalid map: {0}")]
    InvalidMap(String),

    /// JSON encode/decode failure at the transport boundary.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O failure (server socket, framing).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A wire frame did not follow the protocol in the server module.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type used throughout the crate.
pub type MapResult<T> = Result<T, MapError>;

/// Crate version, used in the CLI banner and server greeting.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Generation-wide tuning constants that belong to the generator base
/// contract rather than any one algorithm.
pub mod limits {
    pub const MIN_WIDTH: u32 = 10;
    pub const MIN_HEIGHT: u32 = 10;
    pub const MAX_WIDTH: u32 = 100;
    pub const MAX_HEIGHT: u32 = 100;

    /// Minimum intervening wall cells between two doors on the same wall
    /// segment (invariant 6).
    pub const MIN_DOOR_SPACING: u32 = 2;

    /// Default TCP port for the map-serving collaborator.
    pub const DEFAULT_PORT: u16 = 5000;

    /// Maximum wire payload size in bytes.
    pub const MAX_PAYLOAD_BYTES: u32 = 1024 * 1024;
}
