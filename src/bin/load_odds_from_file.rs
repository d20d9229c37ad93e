use std::env;

use log::{error, info};

use boatrace_analytics::modules::config::{DatabaseConfig, LoggingConfig};
use boatrace_analytics::modules::helpers::logging::setup_logging;
use boatrace_analytics::modules::models::general::establish_pool;
use boatrace_analytics::modules::models::odds::OddsQuote;
use boatrace_analytics::modules::store::postgres::PgStore;
use boatrace_analytics::modules::store::insert_in_batches;

/// rows per insert statement
const BATCH_SIZE: usize = 1000;

fn main() {
    if let Err(error) = setup_logging(&LoggingConfig::from_env()) {
        eprintln!("failed to setup logging: {}", error);
    }

    let Some(path) = env::args().nth(1) else {
        error!(target:"load_odds_from_file", "usage: load_odds_from_file <path>");
        std::process::exit(2);
    };

    let quotes = match OddsQuote::load_from_file(&path) {
        Ok(quotes) => quotes,
        Err(error) => {
            error!(target:"load_odds_from_file", "{}", error);
            std::process::exit(1);
        }
    };

    let config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!(target:"load_odds_from_file", "{}", error);
            std::process::exit(1);
        }
    };
    let store = PgStore::new(establish_pool(&config));

    let load = insert_in_batches(&store, &quotes, BATCH_SIZE);
    info!(target:"load_odds_from_file", "saved {} of {} quotes from {}", load.inserted, quotes.len(), path);

    if !load.is_complete() {
        error!(target:"load_odds_from_file", "{} batches failed", load.failed_batches);
        std::process::exit(1);
    }
}
