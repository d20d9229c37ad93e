use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use chrono::NaiveDate;
use log::warn;

use crate::errors::{CustomResult, Error};
use crate::modules::models::general::RaceKey;
use crate::modules::models::odds::{detect_anomalies, latest_quotes, OddsAnomaly, OddsQuote, OddsType};
use crate::modules::models::prediction::{
    prediction_order, AccuracyFilter, PredictionAccuracy, PredictionFilter, PredictionOutcome, PredictionResult,
    WebPrediction,
};
use crate::modules::models::race::{
    payoff_order, BeforeInfo, Payoff, RaceResult, RaceSummary, WeatherInfo, RACE_LISTING_LIMIT,
};
use crate::modules::models::racer::{
    listing_order, PeriodCount, RacerCourseStat, RacerPeriodStat, RacerSearch, RacerSearchPage,
};
use crate::modules::models::ranking::StadiumRanking;
use crate::modules::models::stats::{OddsSummary, TrackedTable};
use crate::modules::stadium::display_name;
use crate::modules::store::RaceStore;

/// course stats of a racer in one period
#[derive(Debug, Clone, PartialEq)]
pub struct RacerCourseRecord {
    pub racer_no: String,
    pub data_year: i32,
    pub data_period: i32,
    pub stat: RacerCourseStat,
}

/// a race with its finishing order and payoffs
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRace {
    pub key: RaceKey,
    pub title: Option<String>,
    /// the lanes in finishing order, none until the race is decided
    pub finish: Option<[Option<i32>; 6]>,
    pub payoffs: Vec<Payoff>,
}

/// everything the memory store serves, in insertion order
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub odds: Vec<OddsQuote>,
    pub racer_periods: Vec<RacerPeriodStat>,
    pub racer_courses: Vec<RacerCourseRecord>,
    pub before_info: Vec<BeforeInfo>,
    pub weather: Vec<WeatherInfo>,
    pub predictions: Vec<WebPrediction>,
    pub prediction_results: Vec<PredictionResult>,
    pub rankings: Vec<StadiumRanking>,
    pub races: Vec<StoredRace>,
    /// tables that report as absent in the collection stats
    pub missing_tables: HashSet<TrackedTable>,
}

/// # store holding its data in process
/// answers every query like the postgres store does. It can be switched
/// to unavailable, after which every call fails like an unreachable
/// database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    fixtures: RwLock<Fixtures>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new(fixtures: Fixtures) -> MemoryStore {
        MemoryStore {
            fixtures: RwLock::new(fixtures),
            unavailable: AtomicBool::new(false),
        }
    }

    /// a store where every call fails
    pub fn unavailable() -> MemoryStore {
        let store = MemoryStore::default();
        store.set_unavailable(true);
        store
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn read<T>(&self, query: impl FnOnce(&Fixtures) -> T) -> CustomResult<T> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailableError);
        }

        let fixtures = self.fixtures.read().map_err(|_| Error::StoreUnavailableError)?;
        Ok(query(&fixtures))
    }

    fn find_race<'a>(fixtures: &'a Fixtures, race: &RaceKey) -> Option<&'a StoredRace> {
        fixtures.races.iter().find(|stored| &stored.key == race)
    }
}

impl RaceStore for MemoryStore {
    fn insert_odds(&self, quotes: &[OddsQuote]) -> CustomResult<usize> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::StoreUnavailableError);
        }

        let mut fixtures = self.fixtures.write().map_err(|_| Error::StoreUnavailableError)?;
        fixtures.odds.extend_from_slice(quotes);

        Ok(quotes.len())
    }

    fn odds_history(&self, race: &RaceKey, odds_type: Option<OddsType>) -> CustomResult<Vec<OddsQuote>> {
        self.read(|fixtures| {
            let mut quotes: Vec<OddsQuote> = fixtures
                .odds
                .iter()
                .filter(|quote| race.matches(quote.race_date, &quote.stadium_code, quote.race_number))
                .filter(|quote| odds_type.map_or(true, |odds_type| quote.odds_type == odds_type))
                .cloned()
                .collect();
            // stable, quotes scraped at the same time stay in insertion order
            quotes.sort_by_key(|quote| quote.scraped_at);
            quotes
        })
    }

    fn latest_odds(&self, race: &RaceKey) -> CustomResult<Vec<OddsQuote>> {
        let quotes = self.odds_history(race, None)?;
        Ok(latest_quotes(&quotes))
    }

    fn odds_anomalies(&self, race: &RaceKey, threshold: f64) -> CustomResult<Vec<OddsAnomaly>> {
        let quotes = self.odds_history(race, None)?;
        Ok(detect_anomalies(&quotes, threshold))
    }

    fn search_racers(&self, search: &RacerSearch) -> CustomResult<RacerSearchPage> {
        self.read(|fixtures| {
            let mut matching: Vec<&RacerPeriodStat> = fixtures
                .racer_periods
                .iter()
                .filter(|stat| search.matches(stat))
                .collect();
            matching.sort_by(|a, b| listing_order(a, b));

            RacerSearchPage {
                total: matching.len() as i64,
                data: matching
                    .into_iter()
                    .skip(search.offset.max(0) as usize)
                    .take(search.limit.max(0) as usize)
                    .cloned()
                    .collect(),
            }
        })
    }

    fn racer_periods(&self, racer_no: &str, period: Option<i32>) -> CustomResult<Vec<RacerPeriodStat>> {
        self.read(|fixtures| {
            let mut periods: Vec<RacerPeriodStat> = fixtures
                .racer_periods
                .iter()
                .filter(|stat| stat.racer_no == racer_no)
                .filter(|stat| period.map_or(true, |period| stat.data_period == period))
                .cloned()
                .collect();
            periods.sort_by(|a, b| {
                b.data_year
                    .cmp(&a.data_year)
                    .then_with(|| b.data_period.cmp(&a.data_period))
            });
            periods
        })
    }

    fn racer_courses(&self, racer_no: &str, data_year: i32, data_period: i32) -> CustomResult<Vec<RacerCourseStat>> {
        self.read(|fixtures| {
            let mut courses: Vec<RacerCourseStat> = fixtures
                .racer_courses
                .iter()
                .filter(|record| {
                    record.racer_no == racer_no
                        && record.data_year == data_year
                        && record.data_period == data_period
                })
                .map(|record| record.stat.clone())
                .collect();
            courses.sort_by_key(|stat| stat.course);
            courses
        })
    }

    fn periods(&self) -> CustomResult<Vec<PeriodCount>> {
        self.read(|fixtures| {
            let mut counts: BTreeMap<i32, i64> = BTreeMap::new();
            for stat in &fixtures.racer_periods {
                *counts.entry(stat.data_period).or_insert(0) += 1;
            }

            counts
                .into_iter()
                .rev()
                .map(|(period, count)| PeriodCount { period, count })
                .collect()
        })
    }

    fn before_info(&self, race: &RaceKey) -> CustomResult<Vec<BeforeInfo>> {
        self.read(|fixtures| {
            let mut lanes: Vec<BeforeInfo> = fixtures
                .before_info
                .iter()
                .filter(|info| race.matches(info.race_date, &info.stadium_code, info.race_number))
                .cloned()
                .collect();
            lanes.sort_by_key(|info| info.lane);
            lanes
        })
    }

    fn weather(&self, race: &RaceKey) -> CustomResult<Option<WeatherInfo>> {
        self.read(|fixtures| {
            fixtures
                .weather
                .iter()
                .filter(|info| race.matches(info.race_date, &info.stadium_code, info.race_number))
                .max_by_key(|info| info.scraped_at)
                .cloned()
        })
    }

    fn web_predictions(&self, filter: &PredictionFilter) -> CustomResult<Vec<WebPrediction>> {
        self.read(|fixtures| {
            let mut predictions: Vec<WebPrediction> = fixtures
                .predictions
                .iter()
                .filter(|prediction| filter.matches(prediction))
                .map(|prediction| WebPrediction {
                    stadium_name: display_name(&prediction.stadium_code),
                    result: PredictionOutcome::latest_for(prediction.id, &fixtures.prediction_results),
                    ..prediction.clone()
                })
                .collect();
            predictions.sort_by(prediction_order);
            predictions
        })
    }

    fn prediction_accuracy(&self, filter: &AccuracyFilter) -> CustomResult<Vec<PredictionAccuracy>> {
        self.read(|fixtures| PredictionAccuracy::aggregate(&fixtures.prediction_results, filter))
    }

    fn payoffs(&self, race: &RaceKey) -> CustomResult<Vec<Payoff>> {
        self.read(|fixtures| {
            let mut payoffs = MemoryStore::find_race(fixtures, race)
                .map(|stored| stored.payoffs.clone())
                .unwrap_or_default();
            payoffs.sort_by(payoff_order);
            payoffs
        })
    }

    fn race_result(&self, race: &RaceKey) -> CustomResult<Option<RaceResult>> {
        self.read(|fixtures| {
            let stored = MemoryStore::find_race(fixtures, race)?;
            let finish = stored.finish?;

            Some(RaceResult {
                race_date: stored.key.race_date,
                stadium_code: stored.key.stadium_code.clone(),
                race_number: stored.key.race_number,
                title: stored.title.clone(),
                first_place: finish[0],
                second_place: finish[1],
                third_place: finish[2],
                fourth_place: finish[3],
                fifth_place: finish[4],
                sixth_place: finish[5],
            })
        })
    }

    fn stadium_rankings(&self) -> CustomResult<Vec<StadiumRanking>> {
        self.read(|fixtures| StadiumRanking::latest_snapshot(&fixtures.rankings))
    }

    fn races_between(&self, start: NaiveDate, end: NaiveDate, stadium_code: Option<&str>) -> CustomResult<Vec<RaceSummary>> {
        self.read(|fixtures| {
            let mut counts: HashMap<RaceKey, i64> = HashMap::new();
            for quote in &fixtures.odds {
                if quote.race_date < start || quote.race_date > end {
                    continue;
                }
                if stadium_code.map_or(false, |code| quote.stadium_code != code) {
                    continue;
                }
                *counts.entry(quote.race()).or_insert(0) += 1;
            }

            let mut races: Vec<RaceSummary> = counts
                .into_iter()
                .map(|(race, odds_count)| RaceSummary::new(race, odds_count))
                .collect();
            races.sort_by(|a, b| {
                b.race_date
                    .cmp(&a.race_date)
                    .then_with(|| a.stadium_code.cmp(&b.stadium_code))
                    .then_with(|| a.race_number.cmp(&b.race_number))
            });
            races.truncate(RACE_LISTING_LIMIT as usize);
            races
        })
    }

    fn race_dates(&self, limit: i64) -> CustomResult<Vec<NaiveDate>> {
        self.read(|fixtures| {
            let dates: HashSet<NaiveDate> = fixtures.odds.iter().map(|quote| quote.race_date).collect();
            let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
            dates.sort_by(|a, b| b.cmp(a));
            dates.truncate(limit.max(0) as usize);
            dates
        })
    }

    fn count_rows(&self, table: TrackedTable) -> CustomResult<i64> {
        self.read(|fixtures| {
            if fixtures.missing_tables.contains(&table) {
                warn!(target: "store/memory:count_rows", "table {} does not exist", table.table_name());
                return 0;
            }

            let count = match table {
                TrackedTable::OddsHistory => fixtures.odds.len(),
                TrackedTable::RacerPeriodStats => fixtures.racer_periods.len(),
                TrackedTable::WebPredictions => fixtures.predictions.len(),
                TrackedTable::BeforeInfo => fixtures.before_info.len(),
                TrackedTable::Weather => fixtures.weather.len(),
                TrackedTable::StadiumRankings => fixtures.rankings.len(),
                TrackedTable::Races => fixtures.races.len(),
                TrackedTable::Payoffs => fixtures.races.iter().map(|race| race.payoffs.len()).sum(),
            };
            count as i64
        })
    }

    fn odds_summary(&self, today: NaiveDate) -> CustomResult<OddsSummary> {
        self.read(|fixtures| {
            if fixtures.missing_tables.contains(&TrackedTable::OddsHistory) {
                return OddsSummary::default();
            }

            OddsSummary {
                total: fixtures.odds.len() as i64,
                today: fixtures.odds.iter().filter(|quote| quote.race_date == today).count() as i64,
                latest: fixtures.odds.iter().map(|quote| quote.scraped_at).max(),
            }
        })
    }
}
