use rocket::serde::json::Json;
use rocket::{get, State};

use crate::modules::accessors::Accessors;
use crate::modules::helpers::validation::{
    parse_date, parse_optional_date, parse_optional_race_number, parse_optional_stadium_code, parse_text,
};
use crate::modules::models::prediction::{AccuracyFilter, PredictionAccuracy, PredictionFilter, WebPrediction};
use crate::routes::api::error::ApiError;

/// # predictions of a race day
/// every prediction carries its checked result when there is one
#[get("/boatrace/predictions?<race_date>&<stadium_code>&<race_number>&<source>")]
pub async fn list(
    race_date: Option<String>,
    stadium_code: Option<String>,
    race_number: Option<String>,
    source: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Vec<WebPrediction>>, ApiError> {
    let filter = PredictionFilter {
        race_date: parse_date("race_date", race_date.as_deref())?,
        stadium_code: parse_optional_stadium_code(stadium_code.as_deref())?,
        race_number: parse_optional_race_number(race_number.as_deref())?,
        source: parse_text("source", source.as_deref())?,
    };

    Ok(Json(accessors.web_predictions(filter).await))
}

#[get("/boatrace/predictions/accuracy?<source>&<start_date>&<end_date>")]
pub async fn accuracy(
    source: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Vec<PredictionAccuracy>>, ApiError> {
    let filter = AccuracyFilter {
        source: parse_text("source", source.as_deref())?,
        start_date: parse_optional_date("start_date", start_date.as_deref())?,
        end_date: parse_optional_date("end_date", end_date.as_deref())?,
    };

    Ok(Json(accessors.prediction_accuracy(filter).await))
}
