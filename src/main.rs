use clap::Parser;
use dungeon_forge::render::{AsciiRenderer, RenderSettings};
use dungeon_forge::{GenerationSettings, Pipeline, SpawnSettings, StartingPointCriteria};
use rand::Rng;

#[derive(Parser, Debug)]
#[command(name = "dungeon-forge")]
#[command(about = "Generate procedural BSP tile dungeons")]
struct Args {
    /// Width of the grid in tiles
    #[arg(short = 'W', long, default_value = "100")]
    width: i32,

    /// Height of the grid in tiles
    #[arg(short = 'H', long, default_value = "100")]
    height: i32,

    /// Random seed (uses a random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Minimum room size
    #[arg(long, default_value = "8")]
    min_room_size: i32,

    /// Maximum room size
    #[arg(long, default_value = "20")]
    max_room_size: i32,

    /// Corridor width in tiles
    #[arg(long, default_value = "1")]
    corridor_width: i32,

    /// Load spawn settings from a JSON file instead of the defaults
    #[arg(long)]
    spawn_config: Option<String>,

    /// Skip entity population
    #[arg(long)]
    no_spawns: bool,

    /// Suppress the ASCII map, print only the summary
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let settings = GenerationSettings {
        width: args.width,
        height: args.height,
        seed,
        min_room_size: args.min_room_size,
        max_room_size: args.max_room_size,
        corridor_width: args.corridor_width,
        ..Default::default()
    };
    let criteria = StartingPointCriteria::default();
    let mut spawn_settings = match &args.spawn_config {
        Some(path) => match load_spawn_settings(path) {
            Ok(settings) => settings,
            Err(err) => {
                eprintln!("failed to load spawn config {path}: {err}");
                std::process::exit(1);
            }
        },
        None => SpawnSettings::default(),
    };
    if args.no_spawns {
        spawn_settings.items.clear();
        spawn_settings.enemies.clear();
    }

    let mut pipeline = Pipeline::new();
    let report = match pipeline.generate_complete(&settings, &criteria, &spawn_settings) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("generation failed: {err}");
            std::process::exit(1);
        }
    };

    if !args.quiet {
        let model = pipeline.model();
        let mut ascii = AsciiRenderer::new(model.width(), model.height());
        if let Ok(stats) = pipeline.render(&mut ascii, &RenderSettings::default()) {
            println!("{}", ascii.as_text());
            println!(
                "rendered {} tiles, {} doors ({} failures)",
                stats.tiles, stats.doors, stats.failures
            );
        }
    }

    let model = pipeline.model();
    println!(
        "seed {}: {} rooms, {} doors, {} items, {} enemies",
        seed,
        model.rooms.len(),
        model.doors.len(),
        report.items,
        report.enemies
    );
}

fn load_spawn_settings(path: &str) -> Result<SpawnSettings, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
