//! Chat Widgets CLI
//!
//! Replays recorded host transcripts through the widgets, headless.
//!
//! Usage:
//!   chat-widgets dump session.json              # Print each panel's lines
//!   chat-widgets dump session.json --commands   # Also print draw calls
//!   chat-widgets screenshot session.json -o out.webp --fonts ./fonts
//!   chat-widgets init-config                    # Write default settings

mod dump;
mod screenshot;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chat_widgets::config::{self, WidgetConfig};
use chat_widgets::event::Transcript;
use chat_widgets::render::IndexedSprite;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "chat-widgets")]
#[command(about = "Headless replay and rendering of chat overlay panels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a transcript and print every panel's render lines
    Dump {
        /// Transcript JSON file
        transcript: PathBuf,

        /// Settings file overriding the transcript's own config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Icon sprites as JSON (id -> indexed sprite)
        #[arg(long)]
        icons: Option<PathBuf>,

        /// Print the recorded draw calls as well
        #[arg(long)]
        commands: bool,
    },

    /// Replay a transcript and render all panels to an image file
    Screenshot {
        /// Transcript JSON file
        transcript: PathBuf,

        /// Output file path (WebP for .webp, otherwise detected from extension)
        #[arg(short, long, default_value = "chat.webp")]
        output: PathBuf,

        /// Canvas width in pixels
        #[arg(long, default_value_t = 1024)]
        width: u32,

        /// Canvas height in pixels
        #[arg(long, default_value_t = 768)]
        height: u32,

        /// Directory holding runescape.ttf and runescape_small.ttf
        #[arg(long, default_value = "./fonts")]
        fonts: PathBuf,

        /// Settings file overriding the transcript's own config
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Icon sprites as JSON (id -> indexed sprite)
        #[arg(long)]
        icons: Option<PathBuf>,
    },

    /// Write the default settings file
    InitConfig {
        /// Destination (defaults to the user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Dump { transcript, config, icons, commands } => {
            load_inputs(&transcript, config.as_deref(), icons.as_deref())
                .map(|(t, c, i)| dump::dump_transcript(&t, c, &i, commands))
        }
        Commands::Screenshot { transcript, output, width, height, fonts, config, icons } => {
            load_inputs(&transcript, config.as_deref(), icons.as_deref()).and_then(|(t, c, i)| {
                screenshot::screenshot_transcript(&t, c, &i, &fonts, width, height, &output)
            })
        }
        Commands::InitConfig { path, force } => init_config(path, force),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

type Inputs = (Transcript, Option<WidgetConfig>, HashMap<u32, IndexedSprite>);

fn load_inputs(
    transcript: &Path,
    config: Option<&Path>,
    icons: Option<&Path>,
) -> chat_widgets::Result<Inputs> {
    let transcript = Transcript::load(transcript)?;
    let config = config.map(WidgetConfig::load_from).transpose()?;
    let icons = match icons {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => HashMap::new(),
    };
    Ok((transcript, config, icons))
}

fn init_config(path: Option<PathBuf>, force: bool) -> chat_widgets::Result<()> {
    let path = path.unwrap_or_else(config::default_path);
    if path.exists() && !force {
        return Err(chat_widgets::Error::Other(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    WidgetConfig::default().save_to(&path)?;
    println!("Wrote default settings to {}", path.display());
    Ok(())
}
