use chrono::NaiveDate;
use log::{error, info};

use crate::errors::CustomResult;
use crate::modules::models::general::RaceKey;
use crate::modules::models::odds::{OddsAnomaly, OddsQuote, OddsType};
use crate::modules::models::prediction::{AccuracyFilter, PredictionAccuracy, PredictionFilter, WebPrediction};
use crate::modules::models::race::{BeforeInfo, Payoff, RaceResult, RaceSummary, WeatherInfo};
use crate::modules::models::racer::{PeriodCount, RacerCourseStat, RacerPeriodStat, RacerSearch, RacerSearchPage};
use crate::modules::models::ranking::StadiumRanking;
use crate::modules::models::stats::{OddsSummary, TrackedTable};

/// # read access to the collected race data
/// implemented by the postgres store and by an in memory store. Every
/// call is blocking, callers on the async side run them on the blocking
/// pool.
pub trait RaceStore: Send + Sync {
    fn insert_odds(&self, quotes: &[OddsQuote]) -> CustomResult<usize>;

    /// quotes of a race in scrape order
    fn odds_history(&self, race: &RaceKey, odds_type: Option<OddsType>) -> CustomResult<Vec<OddsQuote>>;

    /// the most recent quote of every combination of a race
    fn latest_odds(&self, race: &RaceKey) -> CustomResult<Vec<OddsQuote>>;

    /// moves larger than `threshold` percent, most recent first
    fn odds_anomalies(&self, race: &RaceKey, threshold: f64) -> CustomResult<Vec<OddsAnomaly>>;

    fn search_racers(&self, search: &RacerSearch) -> CustomResult<RacerSearchPage>;

    /// the periods of a racer, most recent first
    fn racer_periods(&self, racer_no: &str, period: Option<i32>) -> CustomResult<Vec<RacerPeriodStat>>;

    fn racer_courses(&self, racer_no: &str, data_year: i32, data_period: i32) -> CustomResult<Vec<RacerCourseStat>>;

    fn periods(&self) -> CustomResult<Vec<PeriodCount>>;

    fn before_info(&self, race: &RaceKey) -> CustomResult<Vec<BeforeInfo>>;

    fn weather(&self, race: &RaceKey) -> CustomResult<Option<WeatherInfo>>;

    fn web_predictions(&self, filter: &PredictionFilter) -> CustomResult<Vec<WebPrediction>>;

    fn prediction_accuracy(&self, filter: &AccuracyFilter) -> CustomResult<Vec<PredictionAccuracy>>;

    fn payoffs(&self, race: &RaceKey) -> CustomResult<Vec<Payoff>>;

    fn race_result(&self, race: &RaceKey) -> CustomResult<Option<RaceResult>>;

    fn stadium_rankings(&self) -> CustomResult<Vec<StadiumRanking>>;

    fn races_between(&self, start: NaiveDate, end: NaiveDate, stadium_code: Option<&str>) -> CustomResult<Vec<RaceSummary>>;

    fn race_dates(&self, limit: i64) -> CustomResult<Vec<NaiveDate>>;

    /// rows in a table, 0 for a missing table
    fn count_rows(&self, table: TrackedTable) -> CustomResult<i64>;

    fn odds_summary(&self, today: NaiveDate) -> CustomResult<OddsSummary>;
}

/// outcome of [`insert_in_batches`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchLoad {
    pub inserted: usize,
    pub failed_batches: usize,
}

impl BatchLoad {
    pub fn is_complete(&self) -> bool {
        self.failed_batches == 0
    }
}

/// # insert quotes in batches
/// a failing batch is logged and skipped, the remaining batches are still
/// tried
///
/// ## Arguments
/// * `store` - the store to insert into
/// * `quotes` - the quotes to insert
/// * `batch_size` - quotes per insert, at least 1
///
/// ## Returns
/// * `BatchLoad` - the amount of saved quotes and failed batches
pub fn insert_in_batches(store: &dyn RaceStore, quotes: &[OddsQuote], batch_size: usize) -> BatchLoad {
    let mut load = BatchLoad::default();

    for (batch_no, batch) in quotes.chunks(batch_size.max(1)).enumerate() {
        match store.insert_odds(batch) {
            Ok(count) => {
                load.inserted += count;
                info!(target:"store/race_store:insert_in_batches", "saved batch {} ({} quotes)", batch_no + 1, count);
            }
            Err(error) => {
                load.failed_batches += 1;
                error!(target:"store/race_store:insert_in_batches", "failed saving batch {}. (error: {})", batch_no + 1, error);
            }
        }
    }

    load
}
