use chrono::NaiveDate;
use rocket::serde::json::Json;
use rocket::{get, State};

use crate::modules::accessors::Accessors;
use crate::modules::helpers::validation::{parse_date, parse_limit, parse_optional_stadium_code, parse_race_key};
use crate::modules::models::race::{BeforeInfo, Payoff, RaceResult, RaceSummary, WeatherInfo, DEFAULT_RACE_DATES_LIMIT};
use crate::routes::api::error::ApiError;

/// selects every stadium in a race listing
const ALL_STADIUMS: &str = "all";

/********** LISTINGS **********/
#[get("/boatrace/races/today")]
pub async fn today(accessors: &State<Accessors>) -> Json<Vec<RaceSummary>> {
    Json(accessors.today_races().await)
}

#[get("/boatrace/races?<start_date>&<end_date>&<stadium_code>")]
pub async fn between(
    start_date: Option<String>,
    end_date: Option<String>,
    stadium_code: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Vec<RaceSummary>>, ApiError> {
    let start = parse_date("start_date", start_date.as_deref())?;
    let end = parse_date("end_date", end_date.as_deref())?;
    if end < start {
        return Err(ApiError::validation("end_date", "end_date is before start_date"));
    }

    let stadium_code = match stadium_code.as_deref().map(str::trim) {
        Some(ALL_STADIUMS) => None,
        other => parse_optional_stadium_code(other)?,
    };

    Ok(Json(accessors.races_between(start, end, stadium_code).await))
}

#[get("/boatrace/races/dates?<limit>")]
pub async fn dates(limit: Option<String>, accessors: &State<Accessors>) -> Result<Json<Vec<NaiveDate>>, ApiError> {
    let limit = parse_limit(limit.as_deref(), DEFAULT_RACE_DATES_LIMIT)?;

    Ok(Json(accessors.race_dates(limit).await))
}

/********** RACE CONTEXT **********/
#[get("/boatrace/races/before-info?<race_date>&<stadium_code>&<race_number>")]
pub async fn before_info(
    race_date: Option<String>,
    stadium_code: Option<String>,
    race_number: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Vec<BeforeInfo>>, ApiError> {
    let race = parse_race_key(race_date.as_deref(), stadium_code.as_deref(), race_number.as_deref())?;

    Ok(Json(accessors.before_info(race).await))
}

#[get("/boatrace/races/weather?<race_date>&<stadium_code>&<race_number>")]
pub async fn weather(
    race_date: Option<String>,
    stadium_code: Option<String>,
    race_number: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Option<WeatherInfo>>, ApiError> {
    let race = parse_race_key(race_date.as_deref(), stadium_code.as_deref(), race_number.as_deref())?;

    Ok(Json(accessors.weather(race).await))
}

#[get("/boatrace/races/payoffs?<race_date>&<stadium_code>&<race_number>")]
pub async fn payoffs(
    race_date: Option<String>,
    stadium_code: Option<String>,
    race_number: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Vec<Payoff>>, ApiError> {
    let race = parse_race_key(race_date.as_deref(), stadium_code.as_deref(), race_number.as_deref())?;

    Ok(Json(accessors.payoffs(race).await))
}

#[get("/boatrace/races/result?<race_date>&<stadium_code>&<race_number>")]
pub async fn result(
    race_date: Option<String>,
    stadium_code: Option<String>,
    race_number: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Option<RaceResult>>, ApiError> {
    let race = parse_race_key(race_date.as_deref(), stadium_code.as_deref(), race_number.as_deref())?;

    Ok(Json(accessors.race_result(race).await))
}
