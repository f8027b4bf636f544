//! piango - play the terminal like a piano
//!
//! Run with: cargo run -- [--config piango.yaml]

mod audio;
mod keymap;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use tracing::info;
use tracing_subscriber::EnvFilter;

use piango::{synth::INSTRUMENTS, Engine, EngineConfig};

use ui::{UiApp, SCOPE_LEN};

/// A polyphonic synthesizer played from the computer keyboard
#[derive(Parser)]
#[command(name = "piango")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Engine configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Starting instrument, by catalog index or name
    #[arg(short, long)]
    instrument: Option<String>,

    /// Starting octave shift (-2 to 2)
    #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
    octave: i32,

    /// Cap on simultaneously rendered voices
    #[arg(long)]
    max_voices: Option<usize>,

    /// Write logs here (RUST_LOG filters, default piango=info)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the instrument catalog
    Instruments,
    /// Print the effective configuration as YAML
    Config,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        init_logging(path)?;
    }

    let config = engine_config(&cli)?;

    match cli.command {
        Some(Commands::Instruments) => {
            for (index, instrument) in INSTRUMENTS.iter().enumerate() {
                let marker = if index == config.instrument { '*' } else { ' ' };
                println!("{marker} {index:>2}  {:<16} {:?}", instrument.name, instrument.waveform);
            }
            Ok(())
        }
        Some(Commands::Config) => {
            print!("{}", config.to_yaml()?);
            Ok(())
        }
        None => play(config, cli.octave),
    }
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(path: &Path) -> EyreResult<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("piango=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| eyre!("failed to install log subscriber: {err}"))
}

/// Defaults, then the config file, then command-line overrides.
fn engine_config(cli: &Cli) -> EyreResult<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .wrap_err_with(|| format!("failed to load config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    if let Some(instrument) = &cli.instrument {
        config.instrument = resolve_instrument(instrument)?;
    }
    if cli.max_voices.is_some() {
        config.max_voices = cli.max_voices;
    }
    if !keymap::OCTAVE_RANGE.contains(&cli.octave) {
        return Err(eyre!("octave must be between -2 and 2, got {}", cli.octave));
    }

    config.validate().wrap_err("invalid configuration")?;
    Ok(config)
}

fn resolve_instrument(name: &str) -> EyreResult<usize> {
    if let Ok(index) = name.parse::<usize>() {
        return Ok(index);
    }
    INSTRUMENTS
        .iter()
        .position(|instrument| instrument.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| eyre!("unknown instrument {name:?} (see `piango instruments`)"))
}

fn play(mut config: EngineConfig, octave: i32) -> EyreResult<()> {
    let (device, stream_config) = audio::open_device(&mut config)?;
    let tick = config.tick();
    info!(?config, "starting");

    let engine = Engine::new(config);
    let output = audio::start(engine.clone(), &device, stream_config, SCOPE_LEN)?;

    let mut terminal = ratatui::init();
    let mut app = UiApp::new(engine, output.scope_rx, output.sample_rate, tick, octave);
    let res = app.run(&mut terminal);
    ratatui::restore();

    info!("stopped");
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruments_resolve_by_index_or_name() {
        assert_eq!(resolve_instrument("3").unwrap(), 3);
        assert_eq!(resolve_instrument("church organ").unwrap(), 4);
        assert!(resolve_instrument("kazoo").is_err());
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::try_parse_from(["piango", "-i", "Pure Sine", "--max-voices", "8", "-o", "-1"])
            .unwrap();
        let config = engine_config(&cli).unwrap();
        assert_eq!(config.instrument, 5);
        assert_eq!(config.max_voices, Some(8));
        assert_eq!(cli.octave, -1);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let cli = Cli::try_parse_from(["piango", "--octave", "3"]).unwrap();
        assert!(engine_config(&cli).is_err());

        let cli = Cli::try_parse_from(["piango", "-i", "99"]).unwrap();
        assert!(engine_config(&cli).is_err());

        let cli = Cli::try_parse_from(["piango", "--max-voices", "0"]).unwrap();
        assert!(engine_config(&cli).is_err());
    }
}
