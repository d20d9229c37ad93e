use rocket::serde::json::Json;
use rocket::{get, State};

use crate::modules::accessors::Accessors;
use crate::modules::helpers::validation::{parse_period, parse_racer_no, parse_racer_search, RacerSearchParams};
use crate::modules::models::racer::{PeriodCount, RacerDetail, RacerSearchPage};
use crate::routes::api::error::ApiError;

#[get("/boatrace/racers/search?<racer_no>&<name>&<year>&<period>&<branch>&<rank>&<limit>&<offset>")]
pub async fn search(
    racer_no: Option<String>,
    name: Option<String>,
    year: Option<String>,
    period: Option<String>,
    branch: Option<String>,
    rank: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<RacerSearchPage>, ApiError> {
    let search = parse_racer_search(RacerSearchParams {
        racer_no: racer_no.as_deref(),
        name: name.as_deref(),
        year: year.as_deref(),
        period: period.as_deref(),
        branch: branch.as_deref(),
        rank: rank.as_deref(),
        limit: limit.as_deref(),
        offset: offset.as_deref(),
    })?;

    Ok(Json(accessors.search_racer_stats(search).await))
}

#[get("/boatrace/racers/periods")]
pub async fn periods(accessors: &State<Accessors>) -> Json<Vec<PeriodCount>> {
    Json(accessors.periods().await)
}

/// # a racer with every period
/// responds with `null` for an unknown racer
#[get("/boatrace/racers/<racer_no>?<period>")]
pub async fn detail(
    racer_no: &str,
    period: Option<String>,
    accessors: &State<Accessors>,
) -> Result<Json<Option<RacerDetail>>, ApiError> {
    let racer_no = parse_racer_no(Some(racer_no))?
        .ok_or_else(|| ApiError::validation("racer_no", "racer_no is required"))?;
    let period = parse_period(period.as_deref())?;

    Ok(Json(accessors.racer_detail(racer_no, period).await))
}
