//! # Dungeonforge Operator CLI
//!
//! Starts the map-serving TCP collaborator in the background and runs an
//! interactive operator console on stdin (`genmap`, `showmap`, `exit`) per
//! spec's command surface.

use clap::Parser;
use dungeonforge::generation::{generate_map, GenerationParams, GeneratorKind};
use dungeonforge::render::AsciiRenderer;
use dungeonforge::server::DungeonServer;
use dungeonforge::{limits, Grid, MapError, MapResult};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(name = "dungeonforge")]
#[command(about = "Deterministic procedural dungeon map generation service")]
#[command(version)]
struct Args {
    /// TCP port for the map-serving collaborator.
    #[arg(short, long, default_value_t = limits::DEFAULT_PORT)]
    port: u16,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    match run(args).await {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            log::error!("fatal error: {err}");
            std::process::exit(1);
        }
    }
}

fn initialize_logging(log_level: &str) {
    let env = env_logger::Env::default().default_filter_or(log_level.to_string());
    env_logger::Builder::from_env(env).format_timestamp_millis().init();
}

async fn run(args: Args) -> MapResult<()> {
    log::info!("dungeonforge v{} starting", dungeonforge::VERSION);

    let server = DungeonServer::bind(args.port).await?;
    let bound_addr = server.local_addr()?;
    log::info!("map-serving collaborator listening on {bound_addr}");
    tokio::spawn(async move {
        if let Err(err) = server.run().await {
            log::error!("server task ended: {err}");
        }
    });

    run_operator_console().await
}

async fn run_operator_console() -> MapResult<()> {
    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut current_map: Option<Grid> = None;
    let renderer = AsciiRenderer::new();

    println!("dungeonforge operator console. Commands: genmap [type] [width] [height] [minRooms] [maxRooms] [seed], showmap, exit");

    while let Some(line) = lines.next_line().await.map_err(MapError::Io)? {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.first().copied() {
            Some("genmap") => match handle_genmap(&tokens[1..]) {
                Ok(grid) => {
                    println!(
                        "generated {}x{} map with {} cells",
                        grid.width,
                        grid.height,
                        grid.cells.len()
                    );
                    current_map = Some(grid);
                }
                Err(err) => eprintln!("genmap failed: {err}"),
            },
            Some("showmap") => match &current_map {
                Some(grid) => match renderer.render(grid) {
                    Ok(rendered) => print!("{rendered}"),
                    Err(err) => eprintln!("render failed: {err}"),
                },
                None => eprintln!("no map generated yet; run genmap first"),
            },
            Some("exit") => {
                log::info!("operator requested shutdown");
                return Ok(());
            }
            Some(other) => eprintln!("unknown command: {other}"),
            None => {}
        }
    }
    Ok(())
}

fn handle_genmap(args: &[&str]) -> MapResult<Grid> {
    let kind = args
        .first()
        .map(|s| GeneratorKind::parse(s).ok_or_else(|| MapError::InvalidParameters(format!("unknown generator type {s}"))))
        .transpose()?
        .unwrap_or_default();

    let width: u32 = parse_arg(args.get(1), limits::MIN_WIDTH)?;
    let height: u32 = parse_arg(args.get(2), limits::MIN_HEIGHT)?;
    let min_rooms: u32 = parse_arg(args.get(3), 5)?;
    let max_rooms: u32 = parse_arg(args.get(4), 8)?;
    let seed: Option<u64> = args.get(5).map(|s| s.parse()).transpose().map_err(|_| {
        MapError::InvalidParameters("seed must be an integer".to_string())
    })?;

    let mut params = GenerationParams::new(width, height).with_room_bounds(min_rooms, max_rooms);
    if let Some(seed) = seed {
        params = params.with_seed(seed);
    }
    generate_map(kind, &params)
}

fn parse_arg(raw: Option<&&str>, default: u32) -> MapResult<u32> {
    match raw {
        Some(s) => s
            .parse()
            .map_err(|_| MapError::InvalidParameters(format!("{s} is not a valid integer"))),
        None => Ok(default),
    }
}
