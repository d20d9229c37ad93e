use rocket::{catchers, routes, Build, Rocket};

use crate::modules::accessors::Accessors;
use crate::modules::helpers::fairings::cors::{self, CORS};
use crate::routes::api;
use crate::routes::catchers;

pub mod errors;
pub mod schema;
pub mod modules;

pub(crate) mod macros {
    pub(crate) mod store_error_handler;
}

pub mod routes {
    pub mod api;
    pub mod catchers;
}

/// # build the web server
///
/// ## Arguments
/// * `accessors` - the data served by the api
///
/// ## Returns
/// * `Rocket<Build>` - the server with every route mounted under `/api`
pub fn build_rocket(accessors: Accessors) -> Rocket<Build> {
    rocket::build()
        .attach(CORS)
        .manage(accessors)
        .register(
            "/",
            catchers![
                catchers::not_found,
                catchers::unprocessable,
                catchers::internal_error,
                catchers::default,
            ],
        )
        .mount(
            "/api",
            routes![
                cors::preflight,
                // stadiums
                api::stats::stadiums,
                api::stats::rankings,
                // races
                api::race::today,
                api::race::between,
                api::race::dates,
                api::race::before_info,
                api::race::weather,
                api::race::payoffs,
                api::race::result,
                // odds
                api::odds::history,
                api::odds::latest,
                api::odds::anomalies,
                // racers
                api::racer::search,
                api::racer::periods,
                api::racer::detail,
                // predictions
                api::prediction::list,
                api::prediction::accuracy,
                // collection
                api::stats::collection,
                // session
                api::auth::me,
                api::auth::logout,
            ],
        )
}
