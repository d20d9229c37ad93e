use std::sync::Arc;

use chrono::NaiveDate;
use log::error;
use snafu::ResultExt;
use tokio::task::JoinSet;

use crate::errors::{CustomResult, TaskSnafu};
use crate::macros::store_error_handler::store_or_default;
use crate::modules::models::general::RaceKey;
use crate::modules::models::odds::{OddsAnomaly, OddsQuote, OddsType};
use crate::modules::models::prediction::{AccuracyFilter, PredictionAccuracy, PredictionFilter, WebPrediction};
use crate::modules::models::race::{BeforeInfo, Payoff, RaceResult, RaceSummary, WeatherInfo};
use crate::modules::models::racer::{PeriodCount, RacerDetail, RacerSearch, RacerSearchPage};
use crate::modules::models::ranking::StadiumRanking;
use crate::modules::models::stats::{CollectionStats, TrackedTable};
use crate::modules::store::RaceStore;

/// # the read operations served by the api
/// every operation runs its store calls on the blocking pool. A failing
/// store is logged and answered with an empty result, callers never see
/// store errors.
#[derive(Clone)]
pub struct Accessors {
    store: Arc<dyn RaceStore>,
    today: Option<NaiveDate>,
}

impl Accessors {
    pub fn new(store: Arc<dyn RaceStore>) -> Accessors {
        Accessors { store, today: None }
    }

    /// pin the day used as today instead of the current utc date
    pub fn with_today(mut self, today: NaiveDate) -> Accessors {
        self.today = Some(today);
        self
    }

    /// the race day the scrapers file under, the utc date
    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }

    async fn run<T, F>(&self, job: F) -> CustomResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RaceStore) -> CustomResult<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || job(store.as_ref()))
            .await
            .context(TaskSnafu)?
    }

    /********** ODDS **********/
    pub async fn odds_history(&self, race: RaceKey, odds_type: Option<OddsType>) -> Vec<OddsQuote> {
        let data = self
            .run(move |store| store.odds_history(&race, odds_type))
            .await;
        store_or_default!(data, "accessors:odds_history", "odds history")
    }

    pub async fn latest_odds(&self, race: RaceKey) -> Vec<OddsQuote> {
        let data = self.run(move |store| store.latest_odds(&race)).await;
        store_or_default!(data, "accessors:latest_odds", "latest odds")
    }

    pub async fn odds_anomalies(&self, race: RaceKey, threshold: f64) -> Vec<OddsAnomaly> {
        let data = self
            .run(move |store| store.odds_anomalies(&race, threshold))
            .await;
        store_or_default!(data, "accessors:odds_anomalies", "odds anomalies")
    }

    /********** RACERS **********/
    pub async fn search_racer_stats(&self, search: RacerSearch) -> RacerSearchPage {
        let data = self.run(move |store| store.search_racers(&search)).await;
        store_or_default!(data, "accessors:search_racer_stats", "racer stats")
    }

    /// # get a racer with all periods
    /// the course stats are those of the most recent returned period
    ///
    /// ## Arguments
    /// * `racer_no` - the registration number of the racer
    /// * `period` - only consider this half of the year
    ///
    /// ## Returns
    /// * `Option<RacerDetail>` - none for an unknown racer
    pub async fn racer_detail(&self, racer_no: String, period: Option<i32>) -> Option<RacerDetail> {
        let data = self
            .run(move |store| {
                let periods = store.racer_periods(&racer_no, period)?;
                let courses = match periods.first() {
                    Some(latest) => store.racer_courses(&racer_no, latest.data_year, latest.data_period)?,
                    None => Vec::new(),
                };

                Ok(RacerDetail::new(periods, courses))
            })
            .await;
        store_or_default!(data, "accessors:racer_detail", "racer detail")
    }

    pub async fn periods(&self) -> Vec<PeriodCount> {
        let data = self.run(|store| store.periods()).await;
        store_or_default!(data, "accessors:periods", "periods")
    }

    /********** RACE CONTEXT **********/
    pub async fn before_info(&self, race: RaceKey) -> Vec<BeforeInfo> {
        let data = self.run(move |store| store.before_info(&race)).await;
        store_or_default!(data, "accessors:before_info", "before info")
    }

    pub async fn weather(&self, race: RaceKey) -> Option<WeatherInfo> {
        let data = self.run(move |store| store.weather(&race)).await;
        store_or_default!(data, "accessors:weather", "weather")
    }

    pub async fn payoffs(&self, race: RaceKey) -> Vec<Payoff> {
        let data = self.run(move |store| store.payoffs(&race)).await;
        store_or_default!(data, "accessors:payoffs", "payoffs")
    }

    pub async fn race_result(&self, race: RaceKey) -> Option<RaceResult> {
        let data = self.run(move |store| store.race_result(&race)).await;
        store_or_default!(data, "accessors:race_result", "race result")
    }

    pub async fn web_predictions(&self, filter: PredictionFilter) -> Vec<WebPrediction> {
        let data = self.run(move |store| store.web_predictions(&filter)).await;
        store_or_default!(data, "accessors:web_predictions", "web predictions")
    }

    pub async fn prediction_accuracy(&self, filter: AccuracyFilter) -> Vec<PredictionAccuracy> {
        let data = self
            .run(move |store| store.prediction_accuracy(&filter))
            .await;
        store_or_default!(data, "accessors:prediction_accuracy", "prediction accuracy")
    }

    pub async fn stadium_rankings(&self) -> Vec<StadiumRanking> {
        let data = self.run(|store| store.stadium_rankings()).await;
        store_or_default!(data, "accessors:stadium_rankings", "stadium rankings")
    }

    /********** RACE LISTINGS **********/
    pub async fn today_races(&self) -> Vec<RaceSummary> {
        let today = self.today();
        self.races_between(today, today, None).await
    }

    pub async fn races_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        stadium_code: Option<String>,
    ) -> Vec<RaceSummary> {
        let data = self
            .run(move |store| store.races_between(start, end, stadium_code.as_deref()))
            .await;
        store_or_default!(data, "accessors:races_between", "races")
    }

    pub async fn race_dates(&self, limit: i64) -> Vec<NaiveDate> {
        let data = self.run(move |store| store.race_dates(limit)).await;
        store_or_default!(data, "accessors:race_dates", "race dates")
    }

    /********** STATS **********/
    /// # collection stats
    /// every table is counted in its own blocking task, the odds totals come
    /// from one summary statement. A failed count is logged and left at 0.
    pub async fn collection_stats(&self) -> CollectionStats {
        let mut counts = JoinSet::new();
        for table in TrackedTable::ALL {
            let store = Arc::clone(&self.store);
            counts.spawn_blocking(move || (table, store.count_rows(table)));
        }

        let today = self.today();
        let summary = self.run(move |store| store.odds_summary(today));

        let mut stats = CollectionStats::default();
        let summary_loaded = match summary.await {
            Ok(summary) => {
                stats.set_odds_summary(summary);
                true
            }
            Err(error) => {
                error!(target: "accessors:collection_stats", "Error getting odds summary. (error: {})", error);
                false
            }
        };

        while let Some(joined) = counts.join_next().await {
            match joined {
                // the summary already holds the odds total of the same snapshot
                Ok((TrackedTable::OddsHistory, Ok(_))) if summary_loaded => {}
                Ok((table, Ok(count))) => stats.set_count(table, count),
                Ok((table, Err(error))) => {
                    error!(target: "accessors:collection_stats", "Error counting {}. (error: {})", table.table_name(), error);
                }
                Err(error) => {
                    error!(target: "accessors:collection_stats", "Count task failed. (error: {})", error);
                }
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;

    use super::*;
    use crate::modules::models::racer::{RacerCourseStat, RacerPeriodStat, RacerRank};
    use crate::modules::store::memory::{Fixtures, MemoryStore, RacerCourseRecord};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
    }

    fn at(minute: u32) -> NaiveDateTime {
        day().and_hms_opt(10, minute, 0).unwrap()
    }

    fn quote(odds_type: OddsType, combination: &str, odds_value: f64, minute: u32) -> OddsQuote {
        OddsQuote {
            race_date: day(),
            stadium_code: "01".to_string(),
            race_number: 1,
            odds_type,
            combination: combination.to_string(),
            odds_value,
            scraped_at: at(minute),
            minutes_to_deadline: Some(30 - minute as i32),
        }
    }

    fn period(year: i32, period: i32) -> RacerPeriodStat {
        RacerPeriodStat {
            racer_no: "4320".to_string(),
            data_year: year,
            data_period: period,
            name_kanji: Some("峰 竜太".to_string()),
            name_kana: Some("ミネ リュウタ".to_string()),
            branch: Some("佐賀".to_string()),
            rank: Some(RacerRank::A1),
            birth_year: Some(1985),
            gender: Some("M".to_string()),
            weight: Some(51),
            win_rate: Some(7.5),
            place_rate: Some(55.0),
            avg_start_timing: Some(0.14),
            race_count: Some(110),
            first_count: Some(40),
            second_count: Some(20),
        }
    }

    fn course(year: i32, period: i32, course: i32) -> RacerCourseRecord {
        RacerCourseRecord {
            racer_no: "4320".to_string(),
            data_year: year,
            data_period: period,
            stat: RacerCourseStat {
                course,
                race_count: Some(20),
                win_rate: Some(8.0),
                place_rate: Some(60.0),
                avg_start_timing: Some(0.13),
            },
        }
    }

    fn accessors(fixtures: Fixtures) -> Accessors {
        Accessors::new(Arc::new(MemoryStore::new(fixtures))).with_today(day())
    }

    #[test]
    fn test_today_defaults_to_the_utc_date() {
        let accessors = Accessors::new(Arc::new(MemoryStore::new(Fixtures::default())));

        let before = chrono::Utc::now().date_naive();
        let today = accessors.today();
        let after = chrono::Utc::now().date_naive();

        assert!(today == before || today == after);
    }

    #[tokio::test]
    async fn test_odds_history_sorted_and_filtered() {
        let accessors = accessors(Fixtures {
            odds: vec![
                quote(OddsType::Win, "1", 2.0, 3),
                quote(OddsType::Exacta2, "1-2", 8.0, 1),
                quote(OddsType::Win, "1", 2.2, 2),
            ],
            ..Fixtures::default()
        });
        let race = RaceKey::new(day(), "01", 1);

        let history = accessors.odds_history(race.clone(), None).await;
        assert_eq!(history.len(), 3);
        assert!(history.windows(2).all(|pair| pair[0].scraped_at <= pair[1].scraped_at));

        let win = accessors.odds_history(race, Some(OddsType::Win)).await;
        assert_eq!(win.len(), 2);
        assert!(win.iter().all(|quote| quote.odds_type == OddsType::Win));
    }

    #[tokio::test]
    async fn test_latest_odds_keeps_the_newest_quote() {
        let accessors = accessors(Fixtures {
            odds: vec![
                quote(OddsType::Exacta2, "1-2", 10.0, 0),
                quote(OddsType::Exacta2, "1-2", 15.0, 2),
                quote(OddsType::Win, "1", 2.0, 1),
            ],
            ..Fixtures::default()
        });

        let latest = accessors.latest_odds(RaceKey::new(day(), "01", 1)).await;
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].odds_type, OddsType::Exacta2);
        assert_eq!(latest[0].odds_value, 15.0);
        assert_eq!(latest[1].odds_type, OddsType::Win);

        let unavailable = Accessors::new(Arc::new(MemoryStore::unavailable()));
        assert!(unavailable.latest_odds(RaceKey::new(day(), "01", 1)).await.is_empty());
    }

    #[tokio::test]
    async fn test_anomaly_on_synthetic_partition() {
        let accessors = accessors(Fixtures {
            odds: vec![
                quote(OddsType::Exacta2, "1-2", 10.0, 0),
                quote(OddsType::Exacta2, "1-2", 10.0, 1),
                quote(OddsType::Exacta2, "1-2", 15.0, 2),
            ],
            ..Fixtures::default()
        });

        let anomalies = accessors
            .odds_anomalies(RaceKey::new(day(), "01", 1), 20.0)
            .await;
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].change_percent, 50.0);
        assert_eq!(anomalies[0].prev_odds, 10.0);
        assert_eq!(anomalies[0].current_odds, 15.0);
    }

    #[tokio::test]
    async fn test_unavailable_store_returns_empty_results() {
        let accessors = Accessors::new(Arc::new(MemoryStore::unavailable())).with_today(day());
        let race = RaceKey::new(day(), "01", 1);

        assert!(accessors.odds_history(race.clone(), None).await.is_empty());
        assert!(accessors.odds_anomalies(race.clone(), 20.0).await.is_empty());
        assert!(accessors.weather(race.clone()).await.is_none());
        assert!(accessors.racer_detail("4320".to_string(), None).await.is_none());
        assert_eq!(accessors.search_racer_stats(RacerSearch::default()).await, RacerSearchPage::default());
        assert_eq!(accessors.collection_stats().await, CollectionStats::default());
    }

    #[tokio::test]
    async fn test_unknown_race_is_empty() {
        let accessors = accessors(Fixtures {
            odds: vec![quote(OddsType::Win, "1", 2.0, 3)],
            ..Fixtures::default()
        });
        let race = RaceKey::new(day(), "24", 12);

        assert!(accessors.odds_history(race.clone(), None).await.is_empty());
        assert!(accessors.before_info(race.clone()).await.is_empty());
        assert!(accessors.payoffs(race.clone()).await.is_empty());
        assert!(accessors.race_result(race).await.is_none());
    }

    #[tokio::test]
    async fn test_racer_detail_uses_latest_period() {
        let accessors = accessors(Fixtures {
            racer_periods: vec![period(2024, 1), period(2024, 2), period(2023, 2)],
            racer_courses: vec![course(2024, 2, 2), course(2024, 2, 1), course(2024, 1, 1)],
            ..Fixtures::default()
        });

        let detail = accessors.racer_detail("4320".to_string(), None).await.unwrap();
        assert_eq!(detail.period_stats.len(), 3);
        assert_eq!(detail.period_stats[0].data_period, 2);
        let courses: Vec<i32> = detail.course_stats.iter().map(|c| c.course).collect();
        assert_eq!(courses, vec![1, 2]);

        let first_half = accessors.racer_detail("4320".to_string(), Some(1)).await.unwrap();
        assert_eq!(first_half.period_stats.len(), 1);
        assert_eq!(first_half.course_stats.len(), 1);

        assert!(accessors.racer_detail("9999".to_string(), None).await.is_none());
    }

    #[tokio::test]
    async fn test_collection_stats_today_within_total() {
        let mut yesterday = quote(OddsType::Win, "1", 2.0, 1);
        yesterday.race_date = day().pred_opt().unwrap();
        let accessors = accessors(Fixtures {
            odds: vec![yesterday, quote(OddsType::Win, "1", 2.0, 2), quote(OddsType::Win, "1", 2.1, 3)],
            racer_periods: vec![period(2024, 2)],
            ..Fixtures::default()
        });

        let stats = accessors.collection_stats().await;
        assert_eq!(stats.total_odds, 3);
        assert_eq!(stats.today_odds, 2);
        assert_eq!(stats.total_racers, 1);
        assert_eq!(stats.latest_odds_time, Some(at(3)));
        assert!(stats.today_odds <= stats.total_odds);
    }
}
