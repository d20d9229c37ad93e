use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Date, Double, Integer, Nullable, Timestamp, VarChar};
use log::warn;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, Error, ParseFileSnafu, QuerySnafu, ReadFileSnafu};
use crate::modules::helpers::math::Math;
use crate::modules::models::general::{keep_valid, RaceKey};
use crate::schema::odds_history;

/// a move bigger than this percentage between two scrapes is an anomaly
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 20.0;

/// the most anomalies returned for one race
pub const ANOMALY_LIMIT: usize = 50;

/// # bet types odds are quoted for
/// serialized with the short tokens the scraper stores
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OddsType {
    #[serde(rename = "2t")]
    Exacta2,
    #[serde(rename = "2f")]
    Quinella2,
    #[serde(rename = "win")]
    Win,
    #[serde(rename = "place")]
    Place,
    #[serde(rename = "3t")]
    Exacta3,
    #[serde(rename = "3f")]
    Quinella3,
}

impl OddsType {
    pub const ALL: [OddsType; 6] = [
        OddsType::Exacta2,
        OddsType::Quinella2,
        OddsType::Win,
        OddsType::Place,
        OddsType::Exacta3,
        OddsType::Quinella3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OddsType::Exacta2 => "2t",
            OddsType::Quinella2 => "2f",
            OddsType::Win => "win",
            OddsType::Place => "place",
            OddsType::Exacta3 => "3t",
            OddsType::Quinella3 => "3f",
        }
    }
}

impl fmt::Display for OddsType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OddsType {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        OddsType::ALL
            .iter()
            .find(|odds_type| odds_type.as_str() == token)
            .copied()
            .ok_or_else(|| format!("unknown odds type `{}`", token))
    }
}

/// # a single scraped odds value
/// rows for the same race, odds type and combination form a time series
/// ordered by `scraped_at`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OddsQuote {
    pub race_date: NaiveDate,
    pub stadium_code: String,
    pub race_number: i32,
    pub odds_type: OddsType,
    pub combination: String,
    pub odds_value: f64,
    pub scraped_at: NaiveDateTime,
    pub minutes_to_deadline: Option<i32>,
}

#[derive(Queryable, QueryableByName, Debug)]
#[diesel(table_name = odds_history)]
pub struct OddsRow {
    pub id: i32,
    pub race_date: NaiveDate,
    pub stadium_code: String,
    pub race_number: i32,
    pub odds_type: String,
    pub combination: String,
    pub odds_value: f64,
    pub scraped_at: NaiveDateTime,
    pub minutes_to_deadline: Option<i32>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = odds_history)]
pub struct NewOddsQuote<'a> {
    pub race_date: NaiveDate,
    pub stadium_code: &'a str,
    pub race_number: i32,
    pub odds_type: &'a str,
    pub combination: &'a str,
    pub odds_value: f64,
    pub scraped_at: NaiveDateTime,
    pub minutes_to_deadline: Option<i32>,
}

impl TryFrom<OddsRow> for OddsQuote {
    type Error = Error;

    fn try_from(row: OddsRow) -> Result<Self, Self::Error> {
        let odds_type = row.odds_type.parse::<OddsType>().map_err(|reason| {
            Error::InvalidRowError {
                table: format!("odds_history (id {})", row.id),
                reason,
            }
        })?;

        Ok(OddsQuote {
            race_date: row.race_date,
            stadium_code: row.stadium_code,
            race_number: row.race_number,
            odds_type,
            combination: row.combination,
            odds_value: row.odds_value,
            scraped_at: row.scraped_at,
            minutes_to_deadline: row.minutes_to_deadline,
        })
    }
}

impl<'a> From<&'a OddsQuote> for NewOddsQuote<'a> {
    fn from(quote: &'a OddsQuote) -> Self {
        NewOddsQuote {
            race_date: quote.race_date,
            stadium_code: &quote.stadium_code,
            race_number: quote.race_number,
            odds_type: quote.odds_type.as_str(),
            combination: &quote.combination,
            odds_value: quote.odds_value,
            scraped_at: quote.scraped_at,
            minutes_to_deadline: quote.minutes_to_deadline,
        }
    }
}

impl OddsQuote {
    pub fn race(&self) -> RaceKey {
        RaceKey::new(self.race_date, &self.stadium_code, self.race_number)
    }

    /// # read quotes from a json file
    /// the file holds a single array of quotes
    ///
    /// ## Arguments
    /// * `path` - the file to read
    ///
    /// ## Returns
    /// * `Vec<OddsQuote>` - the quotes in file order
    pub fn load_from_file(path: &str) -> CustomResult<Vec<OddsQuote>> {
        let contents = std::fs::read_to_string(path).context(ReadFileSnafu { path })?;

        serde_json::from_str(&contents).context(ParseFileSnafu { path })
    }

    /********** INSERTERS **********/
    /// # insert odds quotes
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `quotes` - the quotes to store
    ///
    /// ## Returns
    /// * `usize` - the amount of inserted rows
    pub fn insert_many(conn: &mut PgConnection, quotes: &[OddsQuote]) -> CustomResult<usize> {
        let new_quotes: Vec<NewOddsQuote> = quotes.iter().map(NewOddsQuote::from).collect();

        diesel::insert_into(odds_history::table)
            .values(&new_quotes)
            .execute(conn)
            .context(QuerySnafu)
    }

    /********** GETTERS **********/
    /// # get the odds history of a race
    /// all quotes of the race in scrape order, optionally only for one bet type
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `race` - the race to get the odds of
    /// * `odds_type` - only return quotes of this bet type
    ///
    /// ## Returns
    /// * `Vec<OddsQuote>` - the quotes ordered by scrape time
    pub fn history(
        conn: &mut PgConnection,
        race: &RaceKey,
        odds_type: Option<OddsType>,
    ) -> CustomResult<Vec<OddsQuote>> {
        let mut query = odds_history::table
            .filter(odds_history::race_date.eq(race.race_date))
            .filter(odds_history::stadium_code.eq(race.stadium_code.as_str()))
            .filter(odds_history::race_number.eq(race.race_number))
            .into_boxed();

        if let Some(odds_type) = odds_type {
            query = query.filter(odds_history::odds_type.eq(odds_type.as_str()));
        }

        let rows = query
            .order((odds_history::scraped_at.asc(), odds_history::id.asc()))
            .load::<OddsRow>(conn)
            .context(QuerySnafu)?;

        Ok(keep_valid(rows, "models/odds:history"))
    }

    /// # get the latest odds of a race
    /// the most recent quote of every bet type and combination
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `race` - the race to get the odds of
    ///
    /// ## Returns
    /// * `Vec<OddsQuote>` - one quote per combination, ordered by bet type and combination
    pub fn latest(conn: &mut PgConnection, race: &RaceKey) -> CustomResult<Vec<OddsQuote>> {
        let rows = sql_query(
            "
            SELECT DISTINCT ON (odds_type, combination) *
            FROM odds_history
            WHERE race_date = $1
            AND stadium_code = $2
            AND race_number = $3
            ORDER BY odds_type, combination, scraped_at DESC, id DESC",
        )
        .bind::<Date, _>(race.race_date)
        .bind::<VarChar, _>(race.stadium_code.as_str())
        .bind::<Integer, _>(race.race_number)
        .load::<OddsRow>(conn)
        .context(QuerySnafu)?;

        Ok(keep_valid(rows, "models/odds:latest"))
    }
}

/// # latest quote per combination in loaded quotes
/// the in process version of [`OddsQuote::latest`]
///
/// ## Arguments
/// * `history` - the quotes of a single race in scrape order
///
/// ## Returns
/// * `Vec<OddsQuote>` - one quote per combination, ordered by bet type and combination
pub fn latest_quotes(history: &[OddsQuote]) -> Vec<OddsQuote> {
    let mut latest: BTreeMap<(&str, &str), &OddsQuote> = BTreeMap::new();
    for quote in history {
        latest.insert((quote.odds_type.as_str(), quote.combination.as_str()), quote);
    }

    latest.into_values().cloned().collect()
}

/// # a large move of one combination between two scrapes
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct OddsAnomaly {
    pub combination: String,
    pub odds_type: OddsType,
    pub current_odds: f64,
    pub prev_odds: f64,
    pub scraped_at: NaiveDateTime,
    pub minutes_to_deadline: Option<i32>,
    pub change_percent: f64,
}

#[derive(QueryableByName, Debug)]
pub struct OddsAnomalyRow {
    #[diesel(sql_type = VarChar)]
    pub combination: String,
    #[diesel(sql_type = VarChar)]
    pub odds_type: String,
    #[diesel(sql_type = Double)]
    pub current_odds: f64,
    #[diesel(sql_type = Double)]
    pub prev_odds: f64,
    #[diesel(sql_type = Timestamp)]
    pub scraped_at: NaiveDateTime,
    #[diesel(sql_type = Nullable<Integer>)]
    pub minutes_to_deadline: Option<i32>,
    #[diesel(sql_type = Double)]
    pub change_percent: f64,
}

impl TryFrom<OddsAnomalyRow> for OddsAnomaly {
    type Error = Error;

    fn try_from(row: OddsAnomalyRow) -> Result<Self, Self::Error> {
        let odds_type = row.odds_type.parse::<OddsType>().map_err(|reason| {
            Error::InvalidRowError {
                table: "odds_history".to_string(),
                reason,
            }
        })?;

        Ok(OddsAnomaly {
            combination: row.combination,
            odds_type,
            current_odds: row.current_odds,
            prev_odds: row.prev_odds,
            scraped_at: row.scraped_at,
            minutes_to_deadline: row.minutes_to_deadline,
            change_percent: row.change_percent,
        })
    }
}

impl OddsAnomaly {
    /// # detect odds anomalies in the database
    /// compares every quote with the previous scrape of the same combination
    /// and bet type using a lag window, rows with a non positive previous
    /// value are skipped.
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `race` - the race to inspect
    /// * `threshold` - the minimal change in percent
    ///
    /// ## Returns
    /// * `Vec<OddsAnomaly>` - the most recent anomalies first
    pub fn detect(
        conn: &mut PgConnection,
        race: &RaceKey,
        threshold: f64,
    ) -> CustomResult<Vec<OddsAnomaly>> {
        let rows = sql_query(
            "
            WITH odds_changes AS (
                SELECT
                    combination,
                    odds_type,
                    odds_value,
                    scraped_at,
                    minutes_to_deadline,
                    LAG(odds_value) OVER (PARTITION BY combination, odds_type ORDER BY scraped_at, id) AS prev_odds
                FROM odds_history
                WHERE race_date = $1
                AND stadium_code = $2
                AND race_number = $3
            )
            SELECT
                combination,
                odds_type,
                odds_value AS current_odds,
                prev_odds,
                scraped_at,
                minutes_to_deadline,
                CAST(ROUND(CAST(ABS(odds_value - prev_odds) / prev_odds * 100 AS NUMERIC), 2) AS DOUBLE PRECISION) AS change_percent
            FROM odds_changes
            WHERE prev_odds IS NOT NULL
            AND prev_odds > 0
            AND ABS(odds_value - prev_odds) / prev_odds * 100 > $4
            ORDER BY scraped_at DESC, combination, odds_type
            LIMIT $5",
        )
        .bind::<Date, _>(race.race_date)
        .bind::<VarChar, _>(race.stadium_code.as_str())
        .bind::<Integer, _>(race.race_number)
        .bind::<Double, _>(threshold)
        .bind::<BigInt, _>(ANOMALY_LIMIT as i64)
        .load::<OddsAnomalyRow>(conn)
        .context(QuerySnafu)?;

        Ok(keep_valid(rows, "models/odds:detect"))
    }
}

/// # detect odds anomalies in loaded quotes
/// the in process version of [`OddsAnomaly::detect`]: quotes are grouped
/// by combination and bet type, ordered by scrape time, and every quote is
/// compared with the one directly before it.
///
/// ## Arguments
/// * `quotes` - the quotes of a single race
/// * `threshold` - the minimal change in percent
///
/// ## Returns
/// * `Vec<OddsAnomaly>` - at most [`ANOMALY_LIMIT`] anomalies, most recent first
pub fn detect_anomalies(quotes: &[OddsQuote], threshold: f64) -> Vec<OddsAnomaly> {
    let mut series: HashMap<(&str, OddsType), Vec<&OddsQuote>> = HashMap::new();
    for quote in quotes {
        series
            .entry((quote.combination.as_str(), quote.odds_type))
            .or_default()
            .push(quote);
    }

    let mut anomalies = Vec::new();
    for partition in series.values_mut() {
        // stable, quotes scraped at the same moment keep their load order
        partition.sort_by_key(|quote| quote.scraped_at);

        for pair in partition.windows(2) {
            let (previous, current) = (pair[0], pair[1]);
            let change = match Math::percent_change(previous.odds_value, current.odds_value) {
                Some(change) => change,
                None => {
                    warn!(target:"models/odds:detect_anomalies",
                        "skipping {} {} at {}: previous odds {} are not positive",
                        current.odds_type, current.combination, current.scraped_at, previous.odds_value);
                    continue;
                }
            };

            if change > threshold {
                anomalies.push(OddsAnomaly {
                    combination: current.combination.clone(),
                    odds_type: current.odds_type,
                    current_odds: current.odds_value,
                    prev_odds: previous.odds_value,
                    scraped_at: current.scraped_at,
                    minutes_to_deadline: current.minutes_to_deadline,
                    change_percent: Math::round_float_to_n_decimals(change, 2),
                });
            }
        }
    }

    anomalies.sort_by(most_recent_first);
    anomalies.truncate(ANOMALY_LIMIT);
    anomalies
}

fn most_recent_first(a: &OddsAnomaly, b: &OddsAnomaly) -> Ordering {
    b.scraped_at
        .cmp(&a.scraped_at)
        .then_with(|| a.combination.cmp(&b.combination))
        .then_with(|| a.odds_type.as_str().cmp(b.odds_type.as_str()))
}
