use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Date, Integer, Nullable, VarChar};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, QuerySnafu};
use crate::modules::models::general::RaceKey;
use crate::modules::stadium::display_name;
use crate::schema::{boatrace_beforeinfo, boatrace_weather, odds_history, payoffs, race_results, races};

/// the most races returned by a date range listing
pub const RACE_LISTING_LIMIT: i64 = 500;

pub const DEFAULT_RACE_DATES_LIMIT: i64 = 30;

/// # pre race inspection of one lane
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable)]
pub struct BeforeInfo {
    pub race_date: NaiveDate,
    pub stadium_code: String,
    pub race_number: i32,
    pub lane: i32,
    pub racer_no: Option<String>,
    pub exhibition_time: Option<f64>,
    pub tilt: Option<f64>,
    pub parts_changed: Option<String>,
    pub start_exhibition: Option<f64>,
    pub scraped_at: NaiveDateTime,
}

/// # water and weather conditions at a race
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable)]
pub struct WeatherInfo {
    pub race_date: NaiveDate,
    pub stadium_code: String,
    pub race_number: i32,
    pub temperature: Option<f64>,
    pub weather: Option<String>,
    pub wind_direction: Option<String>,
    pub wind_speed: Option<i32>,
    pub water_temperature: Option<f64>,
    pub wave_height: Option<i32>,
    pub scraped_at: NaiveDateTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable)]
pub struct Payoff {
    pub bet_type: String,
    pub combination: String,
    pub payoff: i32,
    pub popularity: Option<i32>,
}

/// # finishing order of a race
/// the places hold the lane that finished there
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Queryable)]
pub struct RaceResult {
    pub race_date: NaiveDate,
    pub stadium_code: String,
    pub race_number: i32,
    pub title: Option<String>,
    pub first_place: Option<i32>,
    pub second_place: Option<i32>,
    pub third_place: Option<i32>,
    pub fourth_place: Option<i32>,
    pub fifth_place: Option<i32>,
    pub sixth_place: Option<i32>,
}

/// a race that has odds stored
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RaceSummary {
    pub race_date: NaiveDate,
    pub stadium_code: String,
    pub stadium_name: String,
    pub race_number: i32,
    pub odds_count: i64,
}

#[derive(QueryableByName, Debug)]
struct RaceSummaryRow {
    #[diesel(sql_type = Date)]
    race_date: NaiveDate,
    #[diesel(sql_type = VarChar)]
    stadium_code: String,
    #[diesel(sql_type = Integer)]
    race_number: i32,
    #[diesel(sql_type = BigInt)]
    odds_count: i64,
}

impl RaceSummary {
    pub fn new(race: RaceKey, odds_count: i64) -> RaceSummary {
        RaceSummary {
            stadium_name: display_name(&race.stadium_code),
            race_date: race.race_date,
            stadium_code: race.stadium_code,
            race_number: race.race_number,
            odds_count,
        }
    }

    /// # get the races with odds in a date range
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `start` - the first day, inclusive
    /// * `end` - the last day, inclusive
    /// * `stadium_code` - only list races of this stadium
    ///
    /// ## Returns
    /// * `Vec<RaceSummary>` - newest day first, then by stadium and race number
    pub fn between(
        conn: &mut PgConnection,
        start: NaiveDate,
        end: NaiveDate,
        stadium_code: Option<&str>,
    ) -> CustomResult<Vec<RaceSummary>> {
        let rows = sql_query(
            "
            SELECT
                race_date,
                stadium_code,
                race_number,
                COUNT(*) AS odds_count
            FROM odds_history
            WHERE race_date >= $1
            AND race_date <= $2
            AND ($3::varchar IS NULL OR stadium_code = $3)
            GROUP BY race_date, stadium_code, race_number
            ORDER BY race_date DESC, stadium_code, race_number
            LIMIT $4",
        )
        .bind::<Date, _>(start)
        .bind::<Date, _>(end)
        .bind::<Nullable<VarChar>, _>(stadium_code)
        .bind::<BigInt, _>(RACE_LISTING_LIMIT)
        .load::<RaceSummaryRow>(conn)
        .context(QuerySnafu)?;

        Ok(rows
            .into_iter()
            .map(|row| {
                RaceSummary::new(
                    RaceKey::new(row.race_date, &row.stadium_code, row.race_number),
                    row.odds_count,
                )
            })
            .collect())
    }

    /// the days that have odds stored, newest first
    pub fn race_dates(conn: &mut PgConnection, limit: i64) -> CustomResult<Vec<NaiveDate>> {
        odds_history::table
            .select(odds_history::race_date)
            .distinct()
            .order(odds_history::race_date.desc())
            .limit(limit)
            .load::<NaiveDate>(conn)
            .context(QuerySnafu)
    }
}

impl BeforeInfo {
    /// # get the pre race inspection of a race
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `race` - the race
    ///
    /// ## Returns
    /// * `Vec<BeforeInfo>` - one entry per lane, ordered by lane
    pub fn for_race(conn: &mut PgConnection, race: &RaceKey) -> CustomResult<Vec<BeforeInfo>> {
        boatrace_beforeinfo::table
            .filter(boatrace_beforeinfo::race_date.eq(race.race_date))
            .filter(boatrace_beforeinfo::stadium_code.eq(race.stadium_code.as_str()))
            .filter(boatrace_beforeinfo::race_number.eq(race.race_number))
            .order(boatrace_beforeinfo::lane.asc())
            .select((
                boatrace_beforeinfo::race_date,
                boatrace_beforeinfo::stadium_code,
                boatrace_beforeinfo::race_number,
                boatrace_beforeinfo::lane,
                boatrace_beforeinfo::racer_no,
                boatrace_beforeinfo::exhibition_time,
                boatrace_beforeinfo::tilt,
                boatrace_beforeinfo::parts_changed,
                boatrace_beforeinfo::start_exhibition,
                boatrace_beforeinfo::scraped_at,
            ))
            .load::<BeforeInfo>(conn)
            .context(QuerySnafu)
    }
}

impl WeatherInfo {
    /// the conditions of a race, the latest scrape when there are several
    pub fn for_race(conn: &mut PgConnection, race: &RaceKey) -> CustomResult<Option<WeatherInfo>> {
        boatrace_weather::table
            .filter(boatrace_weather::race_date.eq(race.race_date))
            .filter(boatrace_weather::stadium_code.eq(race.stadium_code.as_str()))
            .filter(boatrace_weather::race_number.eq(race.race_number))
            .order(boatrace_weather::scraped_at.desc())
            .select((
                boatrace_weather::race_date,
                boatrace_weather::stadium_code,
                boatrace_weather::race_number,
                boatrace_weather::temperature,
                boatrace_weather::weather,
                boatrace_weather::wind_direction,
                boatrace_weather::wind_speed,
                boatrace_weather::water_temperature,
                boatrace_weather::wave_height,
                boatrace_weather::scraped_at,
            ))
            .first::<WeatherInfo>(conn)
            .optional()
            .context(QuerySnafu)
    }
}

impl Payoff {
    /// # get the payoffs of a race
    /// the race key is resolved to the stored race first, unknown races have
    /// no payoffs
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `race` - the race
    ///
    /// ## Returns
    /// * `Vec<Payoff>` - ordered by bet type and popularity
    pub fn for_race(conn: &mut PgConnection, race: &RaceKey) -> CustomResult<Vec<Payoff>> {
        payoffs::table
            .inner_join(races::table)
            .filter(races::race_date.eq(race.race_date))
            .filter(races::stadium_code.eq(race.stadium_code.as_str()))
            .filter(races::race_number.eq(race.race_number))
            .order((payoffs::bet_type.asc(), payoffs::popularity.asc()))
            .select((
                payoffs::bet_type,
                payoffs::combination,
                payoffs::payoff,
                payoffs::popularity,
            ))
            .load::<Payoff>(conn)
            .context(QuerySnafu)
    }
}

/// listing order of payoffs, unknown popularity after the known ones
pub fn payoff_order(a: &Payoff, b: &Payoff) -> Ordering {
    a.bet_type
        .cmp(&b.bet_type)
        .then_with(|| match (a.popularity, b.popularity) {
            (Some(a_pop), Some(b_pop)) => a_pop.cmp(&b_pop),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

impl RaceResult {
    /// the finishing order of a race, none when the race has no result yet
    pub fn for_race(conn: &mut PgConnection, race: &RaceKey) -> CustomResult<Option<RaceResult>> {
        race_results::table
            .inner_join(races::table)
            .filter(races::race_date.eq(race.race_date))
            .filter(races::stadium_code.eq(race.stadium_code.as_str()))
            .filter(races::race_number.eq(race.race_number))
            .select((
                races::race_date,
                races::stadium_code,
                races::race_number,
                races::title,
                race_results::first_place,
                race_results::second_place,
                race_results::third_place,
                race_results::fourth_place,
                race_results::fifth_place,
                race_results::sixth_place,
            ))
            .first::<RaceResult>(conn)
            .optional()
            .context(QuerySnafu)
    }
}
