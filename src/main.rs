use anyhow::Context;
use clap::Parser;
use mdnest::app::Shell;
use mdnest::kernel::services::adapters::{
    ensure_settings_file, get_settings_path, load_settings, LocalFileSystem,
};
use mdnest::kernel::services::ports::Settings;
use std::path::PathBuf;
use std::sync::Arc;

mod logging;

/// Browse and edit a folder of markdown notes.
#[derive(Debug, Parser)]
#[command(name = "mdnest", version)]
struct Cli {
    /// Folder to open on start.
    root: Option<PathBuf>,

    /// Settings file (defaults to the app data directory).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Do not watch the folder for external changes.
    #[arg(long)]
    no_watch: bool,

    /// Autosave interval in seconds; 0 disables autosave.
    #[arg(long, value_name = "SECS")]
    autosave: Option<u64>,
}

fn resolve_settings(cli: &Cli) -> Settings {
    let Some(path) = cli.settings.clone().or_else(get_settings_path) else {
        tracing::warn!("cannot determine settings path, using defaults");
        return Settings::default();
    };
    if let Err(e) = ensure_settings_file(&path) {
        tracing::warn!(path = %path.display(), error = %e, "cannot create settings file");
    }
    let mut settings = load_settings(&path).unwrap_or_default();
    tracing::info!(path = %path.display(), "settings loaded");

    if cli.no_watch {
        settings.watch_workspace = false;
    }
    if let Some(secs) = cli.autosave {
        settings.autosave_interval_secs = secs;
    }
    settings
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let logging = logging::init();
    if let Some(guard) = logging.as_ref() {
        eprintln!("logs: {}", guard.log_dir().display());
    }

    let settings = resolve_settings(&cli);
    let mut shell = Shell::new(Arc::new(LocalFileSystem::new()), &settings)
        .context("failed to start runtime")?;
    println!("mdnest ready, type `help` for commands");
    shell.run(cli.root);
    Ok(())
}
