use std::env;

use sat_catalogs::config::{Config, DEFAULT_LOG_FILTER};
use sat_catalogs::{cli, logging};

fn main() {
    let log_filter = Config::from_env()
        .map(|config| config.log_filter)
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
    if let Err(err) = logging::init_tracing(&log_filter) {
        eprintln!("failed to initialize tracing: {err}");
    }

    let args: Vec<String> = env::args().collect();
    std::process::exit(cli::run_with_args(&args));
}
