use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use snafu::ResultExt;

use crate::errors::{CustomResult, PoolSnafu};
use crate::modules::models::general::{PgPool, RaceKey};
use crate::modules::models::odds::{OddsAnomaly, OddsQuote, OddsType};
use crate::modules::models::prediction::{AccuracyFilter, PredictionAccuracy, PredictionFilter, WebPrediction};
use crate::modules::models::race::{BeforeInfo, Payoff, RaceResult, RaceSummary, WeatherInfo};
use crate::modules::models::racer::{PeriodCount, RacerCourseStat, RacerPeriodStat, RacerSearch, RacerSearchPage};
use crate::modules::models::ranking::StadiumRanking;
use crate::modules::models::stats::{count_rows, OddsSummary, TrackedTable};
use crate::modules::store::RaceStore;

type PgPooledConnection = PooledConnection<ConnectionManager<PgConnection>>;

/// store backed by the postgres pool, one pooled connection per call
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> PgStore {
        PgStore { pool }
    }

    fn connection(&self) -> CustomResult<PgPooledConnection> {
        self.pool.get().context(PoolSnafu)
    }
}

impl RaceStore for PgStore {
    fn insert_odds(&self, quotes: &[OddsQuote]) -> CustomResult<usize> {
        OddsQuote::insert_many(&mut *self.connection()?, quotes)
    }

    fn odds_history(&self, race: &RaceKey, odds_type: Option<OddsType>) -> CustomResult<Vec<OddsQuote>> {
        OddsQuote::history(&mut *self.connection()?, race, odds_type)
    }

    fn latest_odds(&self, race: &RaceKey) -> CustomResult<Vec<OddsQuote>> {
        OddsQuote::latest(&mut *self.connection()?, race)
    }

    fn odds_anomalies(&self, race: &RaceKey, threshold: f64) -> CustomResult<Vec<OddsAnomaly>> {
        OddsAnomaly::detect(&mut *self.connection()?, race, threshold)
    }

    fn search_racers(&self, search: &RacerSearch) -> CustomResult<RacerSearchPage> {
        RacerPeriodStat::search(&mut *self.connection()?, search)
    }

    fn racer_periods(&self, racer_no: &str, period: Option<i32>) -> CustomResult<Vec<RacerPeriodStat>> {
        RacerPeriodStat::for_racer(&mut *self.connection()?, racer_no, period)
    }

    fn racer_courses(&self, racer_no: &str, data_year: i32, data_period: i32) -> CustomResult<Vec<RacerCourseStat>> {
        RacerCourseStat::for_period(&mut *self.connection()?, racer_no, data_year, data_period)
    }

    fn periods(&self) -> CustomResult<Vec<PeriodCount>> {
        RacerPeriodStat::periods(&mut *self.connection()?)
    }

    fn before_info(&self, race: &RaceKey) -> CustomResult<Vec<BeforeInfo>> {
        BeforeInfo::for_race(&mut *self.connection()?, race)
    }

    fn weather(&self, race: &RaceKey) -> CustomResult<Option<WeatherInfo>> {
        WeatherInfo::for_race(&mut *self.connection()?, race)
    }

    fn web_predictions(&self, filter: &PredictionFilter) -> CustomResult<Vec<WebPrediction>> {
        WebPrediction::list(&mut *self.connection()?, filter)
    }

    fn prediction_accuracy(&self, filter: &AccuracyFilter) -> CustomResult<Vec<PredictionAccuracy>> {
        PredictionAccuracy::per_source(&mut *self.connection()?, filter)
    }

    fn payoffs(&self, race: &RaceKey) -> CustomResult<Vec<Payoff>> {
        Payoff::for_race(&mut *self.connection()?, race)
    }

    fn race_result(&self, race: &RaceKey) -> CustomResult<Option<RaceResult>> {
        RaceResult::for_race(&mut *self.connection()?, race)
    }

    fn stadium_rankings(&self) -> CustomResult<Vec<StadiumRanking>> {
        StadiumRanking::latest(&mut *self.connection()?)
    }

    fn races_between(&self, start: NaiveDate, end: NaiveDate, stadium_code: Option<&str>) -> CustomResult<Vec<RaceSummary>> {
        RaceSummary::between(&mut *self.connection()?, start, end, stadium_code)
    }

    fn race_dates(&self, limit: i64) -> CustomResult<Vec<NaiveDate>> {
        RaceSummary::race_dates(&mut *self.connection()?, limit)
    }

    fn count_rows(&self, table: TrackedTable) -> CustomResult<i64> {
        count_rows(&mut *self.connection()?, table)
    }

    fn odds_summary(&self, today: NaiveDate) -> CustomResult<OddsSummary> {
        OddsSummary::read(&mut *self.connection()?, today)
    }
}
