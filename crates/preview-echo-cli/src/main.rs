mod locate;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use preview_echo_config::Config;
use preview_echo_engine::{
    PreviewSession,
    host::{MemoryDocument, RecordingViewport, StaticSelection},
    text::char_slice,
};
use preview_echo_html::{parse, sanitize};
use std::{
    fs,
    path::{Path, PathBuf},
    process,
};

#[derive(Parser, Debug)]
#[command(name = "preview-echo")]
#[command(about = "Search a rendered preview or map a preview selection into editor text", long_about = None)]
struct Args {
    /// Config file to use instead of ~/.config/preview-echo/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Highlight every occurrence of a term in an HTML preview
    Search {
        /// HTML file holding the rendered preview
        html: PathBuf,
        /// Term to search for (literal, case-insensitive)
        term: String,
        /// Move the current match forward this many times
        #[arg(long, default_value = "0")]
        advance: usize,
    },
    /// Select text in the preview and find it in the editor's plain text
    Locate {
        /// HTML file holding the rendered preview
        html: PathBuf,
        /// Plain-text file holding the editor content
        editor_text: PathBuf,
        /// Text to select in the preview
        needle: String,
    },
    /// Write the default configuration file
    InitConfig,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Commands::Search { html, term, advance } => search(&config, &html, &term, advance),
        Commands::Locate {
            html,
            editor_text,
            needle,
        } => locate(&config, &html, &editor_text, &needle),
        Commands::InitConfig => {
            let path = args.config.unwrap_or_else(Config::config_path);
            config.save_to_path(&path)?;
            log::info!("Wrote config to {}", path.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let loaded = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    match loaded {
        Some(config) => Ok(config),
        None => {
            log::debug!("No config file found, using defaults");
            Ok(Config::default())
        }
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn search(config: &Config, html_path: &Path, term: &str, advance: usize) -> Result<()> {
    let html = sanitize(&read(html_path)?, &config.sanitize);
    let mut session = PreviewSession::new(config.session_options())?;
    let mut viewport = RecordingViewport::new();

    let outcome = session.on_search_term_changed(&html, term);
    for _ in 0..advance {
        session.next_match(&mut viewport);
    }

    let rendered = session.search().rendered_html().unwrap_or(outcome.html);
    println!("{rendered}");
    match session.search().counter() {
        Some(counter) => eprintln!("{} match(es), current {counter}", outcome.matches.len()),
        None => eprintln!("no matches for {term:?}"),
    }
    Ok(())
}

fn locate(config: &Config, html_path: &Path, editor_path: &Path, needle: &str) -> Result<()> {
    let html = sanitize(&read(html_path)?, &config.sanitize);
    let tree = parse(&html).context("Sanitized preview could not be parsed")?;
    let mut doc = MemoryDocument::new(&read(editor_path)?);
    let mut session = PreviewSession::new(config.session_options())?;

    let Some(range) = locate::select_text(&tree, &config.blocks, needle) else {
        eprintln!("Error: {needle:?} does not occur inside a single preview block");
        process::exit(1);
    };
    let mut selection = StaticSelection::new(range);

    session.on_selection_start();
    match session.on_selection_end(&tree, &mut selection, &mut doc) {
        Some(range) => {
            session.flush_deferred(&mut doc);
            let editor = doc.contents();
            println!(
                "index={} length={} text={:?}",
                range.index,
                range.length,
                char_slice(&editor, range.index, range.end())
            );
            Ok(())
        }
        None => {
            let message = session
                .error()
                .map_or_else(|| "nothing selected".to_string(), |e| e.text.clone());
            eprintln!("Error: {message}");
            process::exit(1);
        }
    }
}
