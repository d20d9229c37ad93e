use rocket::serde::json::Json;
use rocket::{get, State};

use crate::modules::accessors::Accessors;
use crate::modules::models::ranking::StadiumRanking;
use crate::modules::models::stats::CollectionStats;
use crate::modules::stadium::{all_stadiums, Stadium};

#[get("/boatrace/stadiums")]
pub fn stadiums() -> Json<Vec<Stadium>> {
    Json(all_stadiums())
}

#[get("/boatrace/stadiums/rankings")]
pub async fn rankings(accessors: &State<Accessors>) -> Json<Vec<StadiumRanking>> {
    Json(accessors.stadium_rankings().await)
}

/// # state of the data collection
/// row counts of the collected tables and today's odds
#[get("/boatrace/stats")]
pub async fn collection(accessors: &State<Accessors>) -> Json<CollectionStats> {
    Json(accessors.collection_stats().await)
}
