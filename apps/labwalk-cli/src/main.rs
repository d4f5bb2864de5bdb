use clap::{Parser, Subcommand, ValueEnum};
use labwalk_input::InputState;
use labwalk_kernel::{SimConfig, SimEvent, Simulation};
use labwalk_render::{DebugTextRenderer, RenderView, Renderer};
use labwalk_tools::SimInspector;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "labwalk-cli", about = "Headless tools for the lab entrance walk")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Simulation config file (.yaml, .yml or .json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and scene info
    Info,
    /// Run the simulation headless with keys held down
    Simulate {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "600")]
        ticks: u64,
        /// Frame length in seconds
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        /// Keys held for the whole run, e.g. `-k w -k d`
        #[arg(short = 'k', long = "hold")]
        hold: Vec<String>,
        /// Pointer drag per frame in pixels (horizontal)
        #[arg(long, default_value = "0")]
        look_x: f32,
        /// Print a status line every N frames (0 disables)
        #[arg(long, default_value = "0")]
        every: u64,
        /// Run twice and compare state hashes
        #[arg(long)]
        verify: bool,
        /// Disable obstacle resolution
        #[arg(long)]
        no_collision: bool,
    },
    /// Dump the entrance layout
    Layout {
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: Format,
    },
    /// Validate the config file, or print the defaults when none is given
    CheckConfig {
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

struct RunOptions<'a> {
    ticks: u64,
    dt: f32,
    hold: &'a [String],
    look_x: f32,
    every: u64,
    collision: bool,
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SimConfig> {
    Ok(match path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    })
}

fn run(config: SimConfig, opts: &RunOptions) -> anyhow::Result<Simulation> {
    let mut sim = Simulation::new(config)?;
    sim.set_collision_enabled(opts.collision);

    let mut input = InputState::new();
    for key in opts.hold {
        input.key_down(key);
    }
    input.mouse_down(labwalk_input::MouseButton::Left);

    for _ in 0..opts.ticks {
        input.mouse_moved(opts.look_x, 0.0);
        sim.step(opts.dt, &input.snapshot());
        for event in sim.drain_events() {
            match event {
                SimEvent::Collided { .. } => {}
                other => tracing::info!(?other, "event"),
            }
        }
        if opts.every > 0 && sim.tick() % opts.every == 0 {
            let p = sim.avatar().position;
            println!(
                "tick={:>5} pos=({:>7.2}, {:>5.2}, {:>7.2}) door={:?}",
                sim.tick(),
                p.x,
                p.y,
                p.z,
                sim.trigger_state()
            );
        }
    }
    sim.teardown();
    Ok(sim)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            let sim = Simulation::new(load_config(cli.config.as_ref())?)?;
            println!("labwalk-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("obstacles: {}", sim.collision().len());
            for (kind, n) in SimInspector::prop_counts(&sim) {
                println!("  {kind:?}: {n}");
            }
            println!("{}", SimInspector::summary(&sim));
        }
        Commands::Simulate {
            ticks,
            dt,
            hold,
            look_x,
            every,
            verify,
            no_collision,
        } => {
            let config = load_config(cli.config.as_ref())?;
            let opts = RunOptions {
                ticks,
                dt,
                hold: &hold,
                look_x,
                every,
                collision: !no_collision,
            };
            let sim = run(config.clone(), &opts)?;
            print!(
                "{}",
                DebugTextRenderer::new().render(&sim, &RenderView::of(&sim))
            );

            if verify {
                let again = run(config, &opts)?;
                let (a, b) = (sim.state_hash(), again.state_hash());
                println!(
                    "Replay: {a:016x} vs {b:016x} {}",
                    if a == b { "OK" } else { "MISMATCH" }
                );
                if a != b {
                    anyhow::bail!("simulation is not deterministic");
                }
            }
        }
        Commands::Layout { format } => {
            let config = load_config(cli.config.as_ref())?;
            let sim = Simulation::new(config)?;
            let out = match format {
                Format::Yaml => serde_yaml::to_string(sim.layout())?,
                Format::Json => serde_json::to_string_pretty(sim.layout())?,
            };
            println!("{out}");
        }
        Commands::CheckConfig { format } => {
            let config = load_config(cli.config.as_ref())?;
            if let Some(path) = &cli.config {
                println!("{}: OK", path.display());
            }
            let out = match format {
                Format::Yaml => config.to_yaml_string()?,
                Format::Json => serde_json::to_string_pretty(&config)?,
            };
            println!("{out}");
        }
    }

    Ok(())
}
