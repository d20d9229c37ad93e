use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use diesel::dsl::sql;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Integer, Nullable, Text};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, Error, QuerySnafu};
use crate::modules::models::general::keep_valid;
use crate::schema::{racer_period_course_stats, racer_period_stats};

pub const DEFAULT_SEARCH_LIMIT: i64 = 50;

/// rows whose rank converts into a [`RacerRank`] (or has none)
const CONVERTIBLE_RANK: &str = "(rank IS NULL OR TRIM(rank) IN ('', 'A1', 'A2', 'B1', 'B2'))";

diesel::sql_function!(fn trim(value: Nullable<Text>) -> Nullable<Text>);

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RacerRank {
    A1,
    A2,
    B1,
    B2,
}

impl RacerRank {
    pub fn as_str(&self) -> &'static str {
        match self {
            RacerRank::A1 => "A1",
            RacerRank::A2 => "A2",
            RacerRank::B1 => "B1",
            RacerRank::B2 => "B2",
        }
    }
}

impl fmt::Display for RacerRank {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RacerRank {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "A1" => Ok(RacerRank::A1),
            "A2" => Ok(RacerRank::A2),
            "B1" => Ok(RacerRank::B1),
            "B2" => Ok(RacerRank::B2),
            other => Err(format!("unknown racer rank `{}`", other)),
        }
    }
}

/// # performance of a racer over one reporting period
/// a racer has one of these per (year, period), the period is 1 for the
/// first half of the year and 2 for the second.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RacerPeriodStat {
    pub racer_no: String,
    pub data_year: i32,
    pub data_period: i32,
    pub name_kanji: Option<String>,
    pub name_kana: Option<String>,
    pub branch: Option<String>,
    pub rank: Option<RacerRank>,
    pub birth_year: Option<i32>,
    pub gender: Option<String>,
    pub weight: Option<i32>,
    pub win_rate: Option<f64>,
    pub place_rate: Option<f64>,
    pub avg_start_timing: Option<f64>,
    pub race_count: Option<i32>,
    pub first_count: Option<i32>,
    pub second_count: Option<i32>,
}

#[derive(Queryable, Debug)]
pub struct RacerPeriodRow {
    pub id: i32,
    pub racer_no: String,
    pub data_year: i32,
    pub data_period: i32,
    pub name_kanji: Option<String>,
    pub name_kana: Option<String>,
    pub branch: Option<String>,
    pub rank: Option<String>,
    pub birth_year: Option<i32>,
    pub gender: Option<String>,
    pub weight: Option<i32>,
    pub win_rate: Option<f64>,
    pub double_rate: Option<f64>,
    pub avg_st: Option<f64>,
    pub race_count: Option<i32>,
    pub rank1_count: Option<i32>,
    pub rank2_count: Option<i32>,
}

impl TryFrom<RacerPeriodRow> for RacerPeriodStat {
    type Error = Error;

    fn try_from(row: RacerPeriodRow) -> Result<Self, Self::Error> {
        let rank = match row.rank.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(token) => Some(token.parse::<RacerRank>().map_err(|reason| {
                Error::InvalidRowError {
                    table: format!("racer_period_stats (id {})", row.id),
                    reason,
                }
            })?),
        };

        Ok(RacerPeriodStat {
            racer_no: row.racer_no,
            data_year: row.data_year,
            data_period: row.data_period,
            name_kanji: row.name_kanji,
            name_kana: row.name_kana,
            branch: row.branch,
            rank,
            birth_year: row.birth_year,
            gender: row.gender,
            weight: row.weight,
            win_rate: row.win_rate,
            place_rate: row.double_rate,
            avg_start_timing: row.avg_st,
            race_count: row.race_count,
            first_count: row.rank1_count,
            second_count: row.rank2_count,
        })
    }
}

/// results of a racer from one starting course within a period
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RacerCourseStat {
    pub course: i32,
    pub race_count: Option<i32>,
    pub win_rate: Option<f64>,
    pub place_rate: Option<f64>,
    pub avg_start_timing: Option<f64>,
}

#[derive(Queryable, Debug)]
pub struct RacerCourseRow {
    pub id: i32,
    pub racer_no: String,
    pub data_year: i32,
    pub data_period: i32,
    pub course: i32,
    pub race_count: Option<i32>,
    pub win_rate: Option<f64>,
    pub double_rate: Option<f64>,
    pub avg_st: Option<f64>,
}

impl From<RacerCourseRow> for RacerCourseStat {
    fn from(row: RacerCourseRow) -> Self {
        RacerCourseStat {
            course: row.course,
            race_count: row.race_count,
            win_rate: row.win_rate,
            place_rate: row.double_rate,
            avg_start_timing: row.avg_st,
        }
    }
}

/// # filters of a racer search
/// every given filter must match, the name matches on either spelling
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RacerSearch {
    pub racer_no: Option<String>,
    pub name: Option<String>,
    pub year: Option<i32>,
    pub period: Option<i32>,
    pub branch: Option<String>,
    pub rank: Option<RacerRank>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for RacerSearch {
    fn default() -> Self {
        RacerSearch {
            racer_no: None,
            name: None,
            year: None,
            period: None,
            branch: None,
            rank: None,
            limit: DEFAULT_SEARCH_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct RacerSearchPage {
    pub data: Vec<RacerPeriodStat>,
    pub total: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, QueryableByName)]
pub struct PeriodCount {
    #[diesel(sql_type = Integer)]
    pub period: i32,
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}

/// # a racer with all known periods
/// `course_stats` only covers the most recent period in `period_stats`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RacerDetail {
    pub racer_no: String,
    pub name_kanji: Option<String>,
    pub name_kana: Option<String>,
    pub branch: Option<String>,
    pub rank: Option<RacerRank>,
    #[serde(rename = "periodStats")]
    pub period_stats: Vec<RacerPeriodStat>,
    #[serde(rename = "courseStats")]
    pub course_stats: Vec<RacerCourseStat>,
}

impl RacerSearch {
    /// the `LIKE` pattern for the name filter, wildcards in the input are escaped
    pub fn name_pattern(&self) -> Option<String> {
        self.name.as_ref().map(|name| {
            let escaped = name
                .replace('\\', "\\\\")
                .replace('%', "\\%")
                .replace('_', "\\_");
            format!("%{}%", escaped)
        })
    }

    /// # check a loaded record against the filters
    /// the in process counterpart of the sql filter used by [`RacerPeriodStat::search`]
    pub fn matches(&self, stat: &RacerPeriodStat) -> bool {
        let contains = |field: &Option<String>, needle: &str| {
            field.as_deref().map_or(false, |value| value.contains(needle))
        };

        self.racer_no.as_ref().map_or(true, |no| &stat.racer_no == no)
            && self.name.as_ref().map_or(true, |name| {
                contains(&stat.name_kanji, name) || contains(&stat.name_kana, name)
            })
            && self.year.map_or(true, |year| stat.data_year == year)
            && self.period.map_or(true, |period| stat.data_period == period)
            && self.branch.as_ref().map_or(true, |branch| stat.branch.as_ref() == Some(branch))
            && self.rank.map_or(true, |rank| stat.rank == Some(rank))
    }
}

/// # listing order of period stats
/// newest period first, then the highest win rate, racers without a win
/// rate last
pub fn listing_order(a: &RacerPeriodStat, b: &RacerPeriodStat) -> Ordering {
    b.data_year
        .cmp(&a.data_year)
        .then_with(|| b.data_period.cmp(&a.data_period))
        .then_with(|| match (a.win_rate, b.win_rate) {
            (Some(a_rate), Some(b_rate)) => b_rate.partial_cmp(&a_rate).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.racer_no.cmp(&b.racer_no))
}

impl RacerDetail {
    /// # assemble a racer detail
    ///
    /// ## Arguments
    /// * `period_stats` - the periods of one racer, most recent first
    /// * `course_stats` - the course stats of the first period
    ///
    /// ## Returns
    /// * `Option<RacerDetail>` - none when there are no periods
    pub fn new(
        period_stats: Vec<RacerPeriodStat>,
        course_stats: Vec<RacerCourseStat>,
    ) -> Option<RacerDetail> {
        let latest = period_stats.first()?.clone();

        Some(RacerDetail {
            racer_no: latest.racer_no,
            name_kanji: latest.name_kanji,
            name_kana: latest.name_kana,
            branch: latest.branch,
            rank: latest.rank,
            period_stats,
            course_stats,
        })
    }
}

type RacerPeriodQuery<'a> = racer_period_stats::BoxedQuery<'a, Pg>;

impl RacerPeriodStat {
    /// # build the filtered query
    /// shared by the page and the count query of a search so both always
    /// see the same rows. rows with an unconvertible rank are excluded here,
    /// not after loading, so `total` agrees with `data`.
    fn filtered(search: &RacerSearch) -> RacerPeriodQuery<'static> {
        let mut query = racer_period_stats::table
            .filter(sql::<Bool>(CONVERTIBLE_RANK))
            .into_boxed();

        if let Some(racer_no) = &search.racer_no {
            query = query.filter(racer_period_stats::racer_no.eq(racer_no.clone()));
        }
        if let Some(pattern) = search.name_pattern() {
            query = query.filter(
                racer_period_stats::name_kanji
                    .like(pattern.clone())
                    .or(racer_period_stats::name_kana.like(pattern)),
            );
        }
        if let Some(year) = search.year {
            query = query.filter(racer_period_stats::data_year.eq(year));
        }
        if let Some(period) = search.period {
            query = query.filter(racer_period_stats::data_period.eq(period));
        }
        if let Some(branch) = &search.branch {
            query = query.filter(racer_period_stats::branch.eq(branch.clone()));
        }
        if let Some(rank) = search.rank {
            query = query.filter(trim(racer_period_stats::rank).eq(rank.as_str()));
        }

        query
    }

    /// # search period stats
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `search` - the filters and the page to return
    ///
    /// ## Returns
    /// * `RacerSearchPage` - the requested page and the total amount of matches
    pub fn search(conn: &mut PgConnection, search: &RacerSearch) -> CustomResult<RacerSearchPage> {
        let rows = RacerPeriodStat::filtered(search)
            .order((
                racer_period_stats::data_year.desc(),
                racer_period_stats::data_period.desc(),
                racer_period_stats::win_rate.desc().nulls_last(),
                racer_period_stats::racer_no.asc(),
            ))
            .limit(search.limit)
            .offset(search.offset)
            .load::<RacerPeriodRow>(conn)
            .context(QuerySnafu)?;

        let total = RacerPeriodStat::filtered(search)
            .count()
            .get_result::<i64>(conn)
            .context(QuerySnafu)?;

        Ok(RacerSearchPage {
            data: keep_valid(rows, "models/racer:search"),
            total,
        })
    }

    /// # get the periods of a racer
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `racer_no` - the registration number of the racer
    /// * `period` - only return this half of the year
    ///
    /// ## Returns
    /// * `Vec<RacerPeriodStat>` - the periods, most recent first
    pub fn for_racer(
        conn: &mut PgConnection,
        racer_no: &str,
        period: Option<i32>,
    ) -> CustomResult<Vec<RacerPeriodStat>> {
        let mut query = racer_period_stats::table
            .filter(racer_period_stats::racer_no.eq(racer_no))
            .into_boxed();

        if let Some(period) = period {
            query = query.filter(racer_period_stats::data_period.eq(period));
        }

        let rows = query
            .order((
                racer_period_stats::data_year.desc(),
                racer_period_stats::data_period.desc(),
            ))
            .load::<RacerPeriodRow>(conn)
            .context(QuerySnafu)?;

        Ok(keep_valid(rows, "models/racer:for_racer"))
    }

    /// all reporting periods with the amount of stored records
    pub fn periods(conn: &mut PgConnection) -> CustomResult<Vec<PeriodCount>> {
        sql_query(
            "
            SELECT
                data_period AS period,
                COUNT(*) AS count
            FROM racer_period_stats
            GROUP BY data_period
            ORDER BY data_period DESC",
        )
        .load::<PeriodCount>(conn)
        .context(QuerySnafu)
    }
}

impl RacerCourseStat {
    /// # get the course stats of a racer in one period
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `racer_no` - the registration number of the racer
    /// * `data_year` - the year of the period
    /// * `data_period` - the half of the year
    ///
    /// ## Returns
    /// * `Vec<RacerCourseStat>` - one entry per course, ordered by course
    pub fn for_period(
        conn: &mut PgConnection,
        racer_no: &str,
        data_year: i32,
        data_period: i32,
    ) -> CustomResult<Vec<RacerCourseStat>> {
        racer_period_course_stats::table
            .filter(racer_period_course_stats::racer_no.eq(racer_no))
            .filter(racer_period_course_stats::data_year.eq(data_year))
            .filter(racer_period_course_stats::data_period.eq(data_period))
            .order(racer_period_course_stats::course.asc())
            .load::<RacerCourseRow>(conn)
            .map(|rows| rows.into_iter().map(RacerCourseStat::from).collect())
            .context(QuerySnafu)
    }
}
