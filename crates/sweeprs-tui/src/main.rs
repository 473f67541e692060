//! sweeprs - review and clean up browser password exports in the terminal.
//!
//! Built with Ratatui and crossterm.

mod app;
mod clipboard;
mod config;
mod handlers;
mod report;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use sweeprs_core::ReviewSession;
use tracing_subscriber::EnvFilter;

use app::{App, AppState};
use config::Config;

/// sweeprs - review, clean up and re-export browser password CSV files
#[derive(Parser, Debug)]
#[command(name = "sweeprs")]
#[command(about = "Review, clean up and re-export browser password CSV exports")]
struct Args {
    /// Password CSV exported from Chrome, Brave, Edge or Firefox
    file: PathBuf,

    /// Path to a config file (default: ~/.config/sweeprs/sweeprs.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Where to write the cleaned CSV
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Leave the status column out of the export
    #[arg(long)]
    strip_status: bool,

    /// Print the security summary and exit
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("sweeprs=info".parse()?))
        .with_writer(std::io::stderr) // Write logs to stderr to not interfere with TUI
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config)?;
    if let Some(output) = args.output {
        config.output_file = output;
    }
    if args.strip_status {
        config.include_status = false;
    }

    let session = ReviewSession::open(&args.file)
        .with_context(|| format!("Failed to import {}", args.file.display()))?;

    if args.summary {
        let summary = report::summary(&session, &session.analysis())
            .context("Failed to format summary")?;
        print!("{summary}");
        return Ok(());
    }

    tracing::info!("Starting review of {}", args.file.display());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, config, args.file);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll with a timeout so the reveal countdown keeps ticking
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handlers::handle_key(app, key) {
                    break;
                }
            }
        }
        app.tick(Instant::now());

        if matches!(app.state, AppState::Quit) {
            break;
        }
    }

    Ok(())
}
