use chrono::NaiveDateTime;
use diesel::dsl::max;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, QuerySnafu};
use crate::schema::stadium_rankings_history;

/// # a stadium's place in one of the scraped rankings
/// every scrape stores a full snapshot, only the newest one is current
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable)]
pub struct StadiumRanking {
    pub ranking_type: String,
    pub rank: i32,
    pub stadium_name: Option<String>,
    pub value: Option<f64>,
    pub scraped_at: NaiveDateTime,
}

impl StadiumRanking {
    /// # get the current rankings
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    ///
    /// ## Returns
    /// * `Vec<StadiumRanking>` - the newest snapshot, ordered by ranking type and rank
    pub fn latest(conn: &mut PgConnection) -> CustomResult<Vec<StadiumRanking>> {
        let latest_scrape = stadium_rankings_history::table
            .select(max(stadium_rankings_history::scraped_at))
            .first::<Option<NaiveDateTime>>(conn)
            .context(QuerySnafu)?;

        let Some(latest_scrape) = latest_scrape else {
            return Ok(Vec::new());
        };

        stadium_rankings_history::table
            .filter(stadium_rankings_history::scraped_at.eq(latest_scrape))
            .order((
                stadium_rankings_history::ranking_type.asc(),
                stadium_rankings_history::rank.asc(),
            ))
            .select((
                stadium_rankings_history::ranking_type,
                stadium_rankings_history::rank,
                stadium_rankings_history::stadium_name,
                stadium_rankings_history::value,
                stadium_rankings_history::scraped_at,
            ))
            .load::<StadiumRanking>(conn)
            .context(QuerySnafu)
    }

    /// the newest snapshot of loaded rankings, ordered like [`StadiumRanking::latest`]
    pub fn latest_snapshot(rankings: &[StadiumRanking]) -> Vec<StadiumRanking> {
        let Some(latest_scrape) = rankings.iter().map(|ranking| ranking.scraped_at).max() else {
            return Vec::new();
        };

        let mut snapshot: Vec<StadiumRanking> = rankings
            .iter()
            .filter(|ranking| ranking.scraped_at == latest_scrape)
            .cloned()
            .collect();
        snapshot.sort_by(|a, b| {
            a.ranking_type
                .cmp(&b.ranking_type)
                .then_with(|| a.rank.cmp(&b.rank))
        });

        snapshot
    }
}
