mod cli;

use std::process;

use rehearse::config::Config;
use rehearse::storage::Storage;
use tracing_subscriber::EnvFilter;

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rehearse=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let path = config.database_path().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    let storage = match Storage::open(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open {}: {e}", path.display());
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config, &storage) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
