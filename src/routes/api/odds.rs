use rocket::serde::json::Json;
use rocket::{get, State};

use crate::modules::accessors::Accessors;
use crate::modules::helpers::validation::{parse_odds_type, parse_race_key, parse_threshold};
use crate::modules::models::odds::{OddsAnomaly, OddsQuote};
use crate::routes::api::error::ApiError;

/// # odds of a race in scrape order
#[get("/boatrace/odds/history?<race_date>&<stadium_code>&<race_number>&<odds_type>")]
pub async fn history(
    race_date: Option<String>,
    stadium_code: Option<String>,
    race_number: Option<String>,
    odds_type: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Vec<OddsQuote>>, ApiError> {
    let race = parse_race_key(race_date.as_deref(), stadium_code.as_deref(), race_number.as_deref())?;
    let odds_type = parse_odds_type(odds_type.as_deref())?;

    Ok(Json(accessors.odds_history(race, odds_type).await))
}

/// # the current odds board of a race
/// the most recent quote of every bet type and combination
#[get("/boatrace/odds/latest?<race_date>&<stadium_code>&<race_number>")]
pub async fn latest(
    race_date: Option<String>,
    stadium_code: Option<String>,
    race_number: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Vec<OddsQuote>>, ApiError> {
    let race = parse_race_key(race_date.as_deref(), stadium_code.as_deref(), race_number.as_deref())?;

    Ok(Json(accessors.latest_odds(race).await))
}

/// # sudden odds moves of a race
/// `threshold` is the minimal change in percent, 20 when not given
#[get("/boatrace/odds/anomalies?<race_date>&<stadium_code>&<race_number>&<threshold>")]
pub async fn anomalies(
    race_date: Option<String>,
    stadium_code: Option<String>,
    race_number: Option<String>,
    threshold: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Vec<OddsAnomaly>>, ApiError> {
    let race = parse_race_key(race_date.as_deref(), stadium_code.as_deref(), race_number.as_deref())?;
    let threshold = parse_threshold(threshold.as_deref())?;

    Ok(Json(accessors.odds_anomalies(race, threshold).await))
}
