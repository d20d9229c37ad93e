use std::sync::Arc;

use log::{error, info};

use boatrace_analytics::build_rocket;
use boatrace_analytics::modules::accessors::Accessors;
use boatrace_analytics::modules::config::{DatabaseConfig, LoggingConfig};
use boatrace_analytics::modules::helpers::logging::setup_logging;
use boatrace_analytics::modules::models::general::establish_pool;
use boatrace_analytics::modules::store::postgres::PgStore;

#[rocket::main]
async fn main() {
    if let Err(error) = setup_logging(&LoggingConfig::from_env()) {
        eprintln!("failed to setup logging: {}", error);
    }

    let config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!(target:"main", "{}", error);
            std::process::exit(1);
        }
    };
    info!(target:"main", "serving the {:?} database", config.data_source);

    // the pool is shared by every request, connections open on first use
    let store = PgStore::new(establish_pool(&config));
    let accessors = Accessors::new(Arc::new(store));

    if let Err(error) = build_rocket(accessors).launch().await {
        error!(target:"main", "server stopped: {}", error);
    }
}
