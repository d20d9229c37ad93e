use chrono::{NaiveDate, NaiveDateTime};
use diesel::pg::PgConnection;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Date, Nullable, Timestamp};
use diesel::{QueryableByName, RunQueryDsl};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, QuerySnafu};
use crate::modules::models::general::table_exists;

/// tables reported in the collection stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackedTable {
    OddsHistory,
    RacerPeriodStats,
    WebPredictions,
    BeforeInfo,
    Weather,
    StadiumRankings,
    Races,
    Payoffs,
}

impl TrackedTable {
    pub const ALL: [TrackedTable; 8] = [
        TrackedTable::OddsHistory,
        TrackedTable::RacerPeriodStats,
        TrackedTable::WebPredictions,
        TrackedTable::BeforeInfo,
        TrackedTable::Weather,
        TrackedTable::StadiumRankings,
        TrackedTable::Races,
        TrackedTable::Payoffs,
    ];

    pub fn table_name(&self) -> &'static str {
        match self {
            TrackedTable::OddsHistory => "odds_history",
            TrackedTable::RacerPeriodStats => "racer_period_stats",
            TrackedTable::WebPredictions => "web_predictions",
            TrackedTable::BeforeInfo => "boatrace_beforeinfo",
            TrackedTable::Weather => "boatrace_weather",
            TrackedTable::StadiumRankings => "stadium_rankings_history",
            TrackedTable::Races => "races",
            TrackedTable::Payoffs => "payoffs",
        }
    }
}

/// # totals of the odds table
/// read in one statement so `today` never exceeds `total`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, QueryableByName)]
pub struct OddsSummary {
    #[diesel(sql_type = BigInt)]
    pub total: i64,
    #[diesel(sql_type = BigInt)]
    pub today: i64,
    #[diesel(sql_type = Nullable<Timestamp>)]
    pub latest: Option<NaiveDateTime>,
}

#[derive(QueryableByName)]
struct RowCount {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_odds: i64,
    pub total_racers: i64,
    pub total_predictions: i64,
    pub total_before_info: i64,
    pub total_weather: i64,
    pub total_stadium_rankings: i64,
    pub total_races: i64,
    pub total_payoffs: i64,
    pub today_odds: i64,
    pub latest_odds_time: Option<NaiveDateTime>,
}

impl CollectionStats {
    /// store the count of one table
    pub fn set_count(&mut self, table: TrackedTable, count: i64) {
        match table {
            TrackedTable::OddsHistory => self.total_odds = count,
            TrackedTable::RacerPeriodStats => self.total_racers = count,
            TrackedTable::WebPredictions => self.total_predictions = count,
            TrackedTable::BeforeInfo => self.total_before_info = count,
            TrackedTable::Weather => self.total_weather = count,
            TrackedTable::StadiumRankings => self.total_stadium_rankings = count,
            TrackedTable::Races => self.total_races = count,
            TrackedTable::Payoffs => self.total_payoffs = count,
        }
    }

    /// the odds summary overrides the separate odds count, both come from one snapshot
    pub fn set_odds_summary(&mut self, summary: OddsSummary) {
        self.total_odds = summary.total;
        self.today_odds = summary.today;
        self.latest_odds_time = summary.latest;
    }
}

/// # count the rows of a tracked table
///
/// ## Arguments
/// * `conn` - the database connection
/// * `table` - the table to count
///
/// ## Returns
/// * `i64` - the amount of rows, 0 when the table does not exist
pub fn count_rows(conn: &mut PgConnection, table: TrackedTable) -> CustomResult<i64> {
    if !table_exists(conn, table.table_name())? {
        return Ok(0);
    }

    // the name comes from the closed set above, never from a request
    sql_query(format!("SELECT COUNT(*) AS count FROM {}", table.table_name()))
        .get_result::<RowCount>(conn)
        .map(|row| row.count)
        .context(QuerySnafu)
}

impl OddsSummary {
    /// # summarize the odds table
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `today` - the day counted as today
    ///
    /// ## Returns
    /// * `OddsSummary` - all zero when the table does not exist
    pub fn read(conn: &mut PgConnection, today: NaiveDate) -> CustomResult<OddsSummary> {
        if !table_exists(conn, TrackedTable::OddsHistory.table_name())? {
            return Ok(OddsSummary::default());
        }

        sql_query(
            "
            SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE race_date = $1) AS today,
                MAX(scraped_at) AS latest
            FROM odds_history",
        )
        .bind::<Date, _>(today)
        .get_result::<OddsSummary>(conn)
        .context(QuerySnafu)
    }
}
