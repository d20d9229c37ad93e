use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::modules::models::general::RaceKey;
use crate::modules::models::odds::{OddsType, DEFAULT_ANOMALY_THRESHOLD};
use crate::modules::models::racer::{RacerRank, RacerSearch, DEFAULT_SEARCH_LIMIT};
use crate::modules::stadium::is_registered;
use crate::routes::api::error::ApiError;

pub const MAX_LIMIT: i64 = 500;
pub const MAX_TEXT_LENGTH: usize = 40;

type Validated<T> = Result<T, ApiError>;

// ascii digits only, `\d` would also accept full width digits
static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("invalid date pattern"));
static TWO_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{2}$").expect("invalid two digit pattern"));
static FOUR_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("invalid four digit pattern"));

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn required<'a>(field: &'static str, value: Option<&'a str>) -> Validated<&'a str> {
    present(value).ok_or_else(|| ApiError::validation(field, format!("{} is required", field)))
}

/********** DATES **********/
pub fn parse_date(field: &'static str, value: Option<&str>) -> Validated<NaiveDate> {
    let value = required(field, value)?;
    parse_date_value(field, value)
}

pub fn parse_optional_date(field: &'static str, value: Option<&str>) -> Validated<Option<NaiveDate>> {
    present(value)
        .map(|value| parse_date_value(field, value))
        .transpose()
}

fn parse_date_value(field: &'static str, value: &str) -> Validated<NaiveDate> {
    if !DATE_PATTERN.is_match(value) {
        return Err(ApiError::validation(field, format!("`{}` is not a YYYY-MM-DD date", value)));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ApiError::validation(field, format!("`{}` is not a valid date", value)))
}

/********** RACES **********/
pub fn parse_stadium_code(value: Option<&str>) -> Validated<String> {
    let value = required("stadium_code", value)?;

    if !TWO_DIGITS.is_match(value) || !is_registered(value) {
        return Err(ApiError::validation(
            "stadium_code",
            format!("`{}` is not a registered stadium code", value),
        ));
    }

    Ok(value.to_string())
}

pub fn parse_optional_stadium_code(value: Option<&str>) -> Validated<Option<String>> {
    present(value)
        .map(|value| parse_stadium_code(Some(value)))
        .transpose()
}

pub fn parse_race_number(value: Option<&str>) -> Validated<i32> {
    let value = required("race_number", value)?;

    match value.parse::<i32>() {
        Ok(number) if (1..=12).contains(&number) => Ok(number),
        _ => Err(ApiError::validation(
            "race_number",
            format!("`{}` is not a race number between 1 and 12", value),
        )),
    }
}

pub fn parse_optional_race_number(value: Option<&str>) -> Validated<Option<i32>> {
    present(value)
        .map(|value| parse_race_number(Some(value)))
        .transpose()
}

/// # validate the three parts of a race key
///
/// ## Returns
/// * `RaceKey` - the key, or the error of the first invalid part
pub fn parse_race_key(
    race_date: Option<&str>,
    stadium_code: Option<&str>,
    race_number: Option<&str>,
) -> Validated<RaceKey> {
    let race_date = parse_date("race_date", race_date)?;
    let stadium_code = parse_stadium_code(stadium_code)?;
    let race_number = parse_race_number(race_number)?;

    Ok(RaceKey::new(race_date, &stadium_code, race_number))
}

/********** ODDS **********/
pub fn parse_odds_type(value: Option<&str>) -> Validated<Option<OddsType>> {
    present(value)
        .map(|value| {
            value.parse::<OddsType>().map_err(|_| {
                ApiError::validation(
                    "odds_type",
                    format!("`{}` is not one of 2t, 2f, win, place, 3t, 3f", value),
                )
            })
        })
        .transpose()
}

pub fn parse_threshold(value: Option<&str>) -> Validated<f64> {
    let Some(value) = present(value) else {
        return Ok(DEFAULT_ANOMALY_THRESHOLD);
    };

    match value.parse::<f64>() {
        Ok(threshold) if threshold.is_finite() && threshold >= 0.0 => Ok(threshold),
        _ => Err(ApiError::validation(
            "threshold",
            format!("`{}` is not a finite number of at least 0", value),
        )),
    }
}

/********** RACERS **********/
pub fn parse_racer_no(value: Option<&str>) -> Validated<Option<String>> {
    present(value)
        .map(|value| {
            if FOUR_DIGITS.is_match(value) {
                Ok(value.to_string())
            } else {
                Err(ApiError::validation(
                    "racer_no",
                    format!("`{}` is not a four digit racer number", value),
                ))
            }
        })
        .transpose()
}

pub fn parse_rank(value: Option<&str>) -> Validated<Option<RacerRank>> {
    present(value)
        .map(|value| {
            value.parse::<RacerRank>().map_err(|_| {
                ApiError::validation("rank", format!("`{}` is not one of A1, A2, B1, B2", value))
            })
        })
        .transpose()
}

pub fn parse_period(value: Option<&str>) -> Validated<Option<i32>> {
    present(value)
        .map(|value| match value {
            "1" => Ok(1),
            "2" => Ok(2),
            _ => Err(ApiError::validation("period", format!("`{}` is not 1 or 2", value))),
        })
        .transpose()
}

pub fn parse_year(value: Option<&str>) -> Validated<Option<i32>> {
    present(value)
        .map(|value| {
            if FOUR_DIGITS.is_match(value) {
                value
                    .parse::<i32>()
                    .map_err(|_| ApiError::validation("year", format!("`{}` is not a year", value)))
            } else {
                Err(ApiError::validation("year", format!("`{}` is not a four digit year", value)))
            }
        })
        .transpose()
}

/// free text filters like a name or a source, at most 40 characters
pub fn parse_text(field: &'static str, value: Option<&str>) -> Validated<Option<String>> {
    present(value)
        .map(|value| {
            if value.chars().count() > MAX_TEXT_LENGTH {
                Err(ApiError::validation(
                    field,
                    format!("{} is longer than {} characters", field, MAX_TEXT_LENGTH),
                ))
            } else {
                Ok(value.to_string())
            }
        })
        .transpose()
}

pub fn parse_limit(value: Option<&str>, default: i64) -> Validated<i64> {
    let Some(value) = present(value) else {
        return Ok(default);
    };

    match value.parse::<i64>() {
        Ok(limit) if (1..=MAX_LIMIT).contains(&limit) => Ok(limit),
        _ => Err(ApiError::validation(
            "limit",
            format!("`{}` is not a number between 1 and {}", value, MAX_LIMIT),
        )),
    }
}

pub fn parse_offset(value: Option<&str>) -> Validated<i64> {
    let Some(value) = present(value) else {
        return Ok(0);
    };

    match value.parse::<i64>() {
        Ok(offset) if offset >= 0 => Ok(offset),
        _ => Err(ApiError::validation("offset", format!("`{}` is not a number of at least 0", value))),
    }
}

/// the raw query of a racer search
#[derive(Debug, Default, Clone, Copy)]
pub struct RacerSearchParams<'a> {
    pub racer_no: Option<&'a str>,
    pub name: Option<&'a str>,
    pub year: Option<&'a str>,
    pub period: Option<&'a str>,
    pub branch: Option<&'a str>,
    pub rank: Option<&'a str>,
    pub limit: Option<&'a str>,
    pub offset: Option<&'a str>,
}

pub fn parse_racer_search(params: RacerSearchParams) -> Validated<RacerSearch> {
    Ok(RacerSearch {
        racer_no: parse_racer_no(params.racer_no)?,
        name: parse_text("name", params.name)?,
        year: parse_year(params.year)?,
        period: parse_period(params.period)?,
        branch: parse_text("branch", params.branch)?,
        rank: parse_rank(params.rank)?,
        limit: parse_limit(params.limit, DEFAULT_SEARCH_LIMIT)?,
        offset: parse_offset(params.offset)?,
    })
}
