use clap::Parser;
use navchrome::core::config::{self, CliOverrides};
use navchrome::core::nav::{load_tree_file, sample_sections};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "navchrome", about = "Adaptive navigation chrome for the terminal")]
struct Args {
    /// Navigation tree to load (.toml or .json)
    #[arg(short, long)]
    tree: Option<PathBuf>,

    /// Key that toggles the side panel
    #[arg(short, long)]
    shortcut: Option<char>,

    /// Route open/close through an owner instead of local state
    #[arg(long)]
    controlled: bool,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();

    // Logging starts before config so resolution warnings land in the file;
    // the configured level is applied once it is known.
    init_logging(Path::new("navchrome.log"));

    let nav_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: {e}. Using defaults.");
            log::warn!("Config unusable, using defaults: {e}");
            Default::default()
        }
    };
    let cli = CliOverrides {
        tree_file: args.tree,
        shortcut: args.shortcut,
        controlled: args.controlled,
    };
    let resolved = config::resolve(&nav_config, &cli);
    log::set_max_level(resolved.log_level);

    log::info!(
        "navchrome starting up ({:?}, shortcut {:?})",
        resolved.disclosure.ownership,
        resolved.disclosure.shortcut
    );

    let sections = match resolved.tree_file.as_deref() {
        Some(path) => load_tree_file(path).unwrap_or_else(|e| {
            eprintln!("Warning: {}: {e}. Using the built-in tree.", path.display());
            log::warn!("Falling back to sample tree: {e}");
            sample_sections()
        }),
        None => sample_sections(),
    };

    navchrome::tui::run(resolved, sections)
}

/// Initialize the file logger at full verbosity.
fn init_logging(path: &Path) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create(path) {
        let _ = WriteLogger::init(LevelFilter::Trace, log_config, log_file);
    }
}
