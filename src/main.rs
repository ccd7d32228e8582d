//! Hopfield Gridworld CLI
//!
//! Runs the associative memory and the grid Q-learning agent from the
//! terminal and prints their state as text.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hopfield_gridworld::gridworld::render::{format_q_table, render_grid};
use hopfield_gridworld::hopfield::pattern;
use hopfield_gridworld::{AppConfig, Cell, GridPolicyLearner, PatternMemory, UpdateMode};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const GLYPH_SIDE: usize = 5;

/// 5x5 glyphs used as stored memories
const GLYPHS: [(&str, [u8; 25]); 4] = [
    (
        "T",
        [
            1, 1, 1, 1, 1, //
            0, 0, 1, 0, 0, //
            0, 0, 1, 0, 0, //
            0, 0, 1, 0, 0, //
            0, 0, 1, 0, 0,
        ],
    ),
    (
        "L",
        [
            1, 0, 0, 0, 0, //
            1, 0, 0, 0, 0, //
            1, 0, 0, 0, 0, //
            1, 0, 0, 0, 0, //
            1, 1, 1, 1, 1,
        ],
    ),
    (
        "X",
        [
            1, 0, 0, 0, 1, //
            0, 1, 0, 1, 0, //
            0, 0, 1, 0, 0, //
            0, 1, 0, 1, 0, //
            1, 0, 0, 0, 1,
        ],
    ),
    (
        "O",
        [
            0, 1, 1, 1, 0, //
            1, 0, 0, 0, 1, //
            1, 0, 0, 0, 1, //
            1, 0, 0, 0, 1, //
            0, 1, 1, 1, 0,
        ],
    ),
];

#[derive(Parser)]
#[command(name = "hopfield-gridworld")]
#[command(about = "Hopfield associative memory and grid Q-learning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Store glyph patterns, corrupt one and recall it
    Hopfield {
        /// Number of glyphs to store (1-4)
        #[arg(long, default_value = "2")]
        patterns: usize,

        /// Index of the glyph to corrupt
        #[arg(long, default_value = "0")]
        probe: usize,

        /// Update mode (sync, async)
        #[arg(long)]
        mode: Option<UpdateMode>,

        /// Share of units to flip
        #[arg(long)]
        noise: Option<f64>,

        /// Seed for the noise
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Train the Q-learning agent and show the greedy path
    Grid {
        /// Number of training episodes
        #[arg(long)]
        episodes: Option<usize>,

        /// RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the full Q-table
        #[arg(long)]
        show_q_table: bool,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output path
        #[arg(default_value = "config.json")]
        path: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => AppConfig::default(),
    }
    .with_env_overrides();

    match cli.command {
        Commands::Hopfield {
            patterns,
            probe,
            mode,
            noise,
            seed,
        } => run_hopfield(&config, patterns, probe, mode, noise, seed),
        Commands::Grid {
            episodes,
            seed,
            show_q_table,
        } => run_grid(&config, episodes, seed, show_q_table),
        Commands::InitConfig { path } => {
            AppConfig::default().to_file(&path)?;
            info!("Default configuration written to {}", path);
            Ok(())
        }
    }
}

fn run_hopfield(
    config: &AppConfig,
    count: usize,
    probe_index: usize,
    mode: Option<UpdateMode>,
    noise: Option<f64>,
    seed: Option<u64>,
) -> Result<()> {
    let count = count.clamp(1, GLYPHS.len());
    if probe_index >= count {
        anyhow::bail!("probe index {} must be below the stored count {}", probe_index, count);
    }

    let mut recall_config = config.hopfield.clone();
    if let Some(mode) = mode {
        recall_config.mode = mode;
    }
    let noise_level = noise.unwrap_or(config.noise_level);

    let mut memory = PatternMemory::with_config(GLYPH_SIDE * GLYPH_SIDE, recall_config);
    for (name, bits) in GLYPHS.iter().take(count) {
        let outcome = memory.store(&pattern::from_bits(bits))?;
        if outcome.over_capacity {
            warn!(
                "Storing '{}' exceeds the capacity of {} patterns; recall may be unstable",
                name, outcome.capacity
            );
        }
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let (name, bits) = GLYPHS[probe_index];
    let original = pattern::from_bits(&bits);
    let noisy = pattern::add_noise(&original, noise_level, &mut rng);
    let result = memory.recall(&noisy)?;

    println!("\nHopfield Recall ({:?})", memory.config().mode);
    println!("{:-<40}", "");
    println!("Stored patterns: {}", memory.len());
    println!("Capacity: {}", memory.network().capacity());
    println!("Probe: '{}' with {:.0}% noise\n", name, noise_level * 100.0);

    println!("Noisy probe:");
    print!("{}", draw_pattern(&noisy));
    println!("\nRecovered:");
    print!("{}", draw_pattern(&result.pattern));

    println!("\nStatistics:");
    println!("  Iterations: {}", result.iterations);
    println!("  Converged: {}", result.converged);
    println!("  Energy: {:.2}", result.energy);
    println!(
        "  Distance to original: {}",
        pattern::hamming_distance(&original, &result.pattern)
    );
    if let Some((index, distance)) = memory.closest(&result.pattern) {
        println!("  Closest stored: '{}' (distance {})", GLYPHS[index].0, distance);
    }

    Ok(())
}

fn run_grid(
    config: &AppConfig,
    episodes: Option<usize>,
    seed: Option<u64>,
    show_q_table: bool,
) -> Result<()> {
    let layout = config.grid.to_layout()?;
    let mut learner_config = config.learner.clone();
    if seed.is_some() {
        learner_config.seed = seed;
    }
    let episodes = episodes.unwrap_or(config.training.episodes);

    let mut learner = GridPolicyLearner::new(layout.clone(), learner_config)?;

    println!("\nGrid Q-Learning");
    println!("{:-<40}", "");
    print!("{}", render_grid(&layout, Some(learner.position()), &[]));
    println!("\nTraining for {} episodes...", episodes);

    let stats = learner.train(episodes, config.training.max_steps_per_episode);

    println!("\nStatistics:");
    println!("  Steps: {}", stats.steps);
    println!("  Episodes: {} ({} truncated)", stats.attempts, stats.truncated);
    println!("  Success rate: {:.1}%", stats.success_rate());
    println!("  Epsilon: {:.3}", learner.epsilon());

    if show_q_table {
        println!();
        print!("{}", format_q_table(&layout, learner.q_table()));
    }

    match learner.best_path() {
        Some(path) => {
            println!("\nBest path ({} moves):", path.len());
            print!("{}", render_grid(&layout, Some(layout.start()), &path));
            println!("{}", format_path(layout.start(), &path));
        }
        None => println!("\nNo greedy path to the goal yet; try more episodes."),
    }

    Ok(())
}

fn draw_pattern(pattern: &Array1<f64>) -> String {
    pattern::to_bits(pattern)
        .chunks(GLYPH_SIDE)
        .map(|row| {
            let line: String = row.iter().map(|&b| if b == 1 { '#' } else { '.' }).collect();
            line + "\n"
        })
        .collect()
}

fn format_path(start: Cell, path: &[Cell]) -> String {
    std::iter::once(start)
        .chain(path.iter().copied())
        .map(|(r, c)| format!("({r}, {c})"))
        .collect::<Vec<_>>()
        .join(" -> ")
}
