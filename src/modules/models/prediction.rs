use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Bool, Date, Double, Integer, Nullable, Text, Timestamp, VarChar};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, QuerySnafu};
use crate::modules::helpers::math::Math;
use crate::modules::stadium::display_name;

/// # a prediction published by an external site
/// `result` is filled in once the race has been checked
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WebPrediction {
    pub id: i32,
    pub race_date: NaiveDate,
    pub stadium_code: String,
    pub stadium_name: String,
    pub race_number: i32,
    pub source: String,
    pub prediction_type: Option<String>,
    pub prediction: Option<String>,
    pub confidence: Option<i32>,
    pub scraped_at: NaiveDateTime,
    pub result: Option<PredictionOutcome>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub is_hit: bool,
    pub payout: Option<f64>,
    pub checked_at: Option<NaiveDateTime>,
}

/// # the checked result of a prediction
/// results without a `prediction_id` only count towards the accuracy of
/// their source
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub prediction_id: Option<i32>,
    pub race_date: NaiveDate,
    pub stadium_code: String,
    pub race_number: i32,
    pub source: String,
    pub is_hit: bool,
    pub payout: Option<f64>,
    pub checked_at: Option<NaiveDateTime>,
}

/// hit rate of one prediction source
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, QueryableByName)]
pub struct PredictionAccuracy {
    #[diesel(sql_type = VarChar)]
    pub source: String,
    #[diesel(sql_type = BigInt)]
    pub total_predictions: i64,
    #[diesel(sql_type = BigInt)]
    pub hits: i64,
    #[diesel(sql_type = Double)]
    pub accuracy: f64,
    #[diesel(sql_type = Nullable<Double>)]
    pub total_payout: Option<f64>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PredictionFilter {
    pub race_date: NaiveDate,
    pub stadium_code: Option<String>,
    pub race_number: Option<i32>,
    pub source: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Default)]
pub struct AccuracyFilter {
    pub source: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(QueryableByName, Debug)]
struct WebPredictionRow {
    #[diesel(sql_type = Integer)]
    id: i32,
    #[diesel(sql_type = Date)]
    race_date: NaiveDate,
    #[diesel(sql_type = VarChar)]
    stadium_code: String,
    #[diesel(sql_type = Integer)]
    race_number: i32,
    #[diesel(sql_type = VarChar)]
    source: String,
    #[diesel(sql_type = Nullable<VarChar>)]
    prediction_type: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    prediction: Option<String>,
    #[diesel(sql_type = Nullable<Integer>)]
    confidence: Option<i32>,
    #[diesel(sql_type = Timestamp)]
    scraped_at: NaiveDateTime,
    #[diesel(sql_type = Bool)]
    has_result: bool,
    #[diesel(sql_type = Nullable<Integer>)]
    is_hit: Option<i32>,
    #[diesel(sql_type = Nullable<Double>)]
    payout: Option<f64>,
    #[diesel(sql_type = Nullable<Timestamp>)]
    checked_at: Option<NaiveDateTime>,
}

impl From<WebPredictionRow> for WebPrediction {
    fn from(row: WebPredictionRow) -> Self {
        let result = row.has_result.then(|| PredictionOutcome {
            is_hit: row.is_hit == Some(1),
            payout: row.payout,
            checked_at: row.checked_at,
        });

        WebPrediction {
            id: row.id,
            race_date: row.race_date,
            stadium_name: display_name(&row.stadium_code),
            stadium_code: row.stadium_code,
            race_number: row.race_number,
            source: row.source,
            prediction_type: row.prediction_type,
            prediction: row.prediction,
            confidence: row.confidence,
            scraped_at: row.scraped_at,
            result,
        }
    }
}

impl PredictionFilter {
    pub fn matches(&self, prediction: &WebPrediction) -> bool {
        prediction.race_date == self.race_date
            && self
                .stadium_code
                .as_ref()
                .map_or(true, |code| &prediction.stadium_code == code)
            && self
                .race_number
                .map_or(true, |number| prediction.race_number == number)
            && self
                .source
                .as_ref()
                .map_or(true, |source| &prediction.source == source)
    }
}

impl AccuracyFilter {
    pub fn matches(&self, result: &PredictionResult) -> bool {
        self.source.as_ref().map_or(true, |source| &result.source == source)
            && self.start_date.map_or(true, |start| result.race_date >= start)
            && self.end_date.map_or(true, |end| result.race_date <= end)
    }
}

/// listing order of predictions, by stadium, race number and source
pub fn prediction_order(a: &WebPrediction, b: &WebPrediction) -> Ordering {
    a.stadium_code
        .cmp(&b.stadium_code)
        .then_with(|| a.race_number.cmp(&b.race_number))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.id.cmp(&b.id))
}

impl PredictionOutcome {
    /// # the outcome of a prediction
    /// the most recently checked result wins when a prediction was checked
    /// more than once
    ///
    /// ## Arguments
    /// * `prediction_id` - the prediction to find the outcome of
    /// * `results` - every stored result
    ///
    /// ## Returns
    /// * `Option<PredictionOutcome>` - none while the prediction is unchecked
    pub fn latest_for(prediction_id: i32, results: &[PredictionResult]) -> Option<PredictionOutcome> {
        results
            .iter()
            .filter(|result| result.prediction_id == Some(prediction_id))
            .max_by_key(|result| result.checked_at)
            .map(|result| PredictionOutcome {
                is_hit: result.is_hit,
                payout: result.payout,
                checked_at: result.checked_at,
            })
    }
}

impl WebPrediction {
    /// # get the predictions of a race day
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `filter` - the day and the optional stadium, race and source
    ///
    /// ## Returns
    /// * `Vec<WebPrediction>` - ordered by stadium, race number and source
    pub fn list(conn: &mut PgConnection, filter: &PredictionFilter) -> CustomResult<Vec<WebPrediction>> {
        let rows = sql_query(
            "
            SELECT
                p.id,
                p.race_date,
                p.stadium_code,
                p.race_number,
                p.source,
                p.prediction_type,
                p.prediction,
                p.confidence,
                p.scraped_at,
                r.prediction_id IS NOT NULL AS has_result,
                r.is_hit,
                r.payout,
                r.checked_at
            FROM web_predictions p
            LEFT JOIN (
                SELECT DISTINCT ON (prediction_id)
                    prediction_id,
                    is_hit,
                    payout,
                    checked_at
                FROM prediction_results
                WHERE prediction_id IS NOT NULL
                ORDER BY prediction_id, checked_at DESC NULLS LAST, id DESC
            ) r ON r.prediction_id = p.id
            WHERE p.race_date = $1
            AND ($2::varchar IS NULL OR p.stadium_code = $2)
            AND ($3::int4 IS NULL OR p.race_number = $3)
            AND ($4::varchar IS NULL OR p.source = $4)
            ORDER BY p.stadium_code, p.race_number, p.source, p.id",
        )
        .bind::<Date, _>(filter.race_date)
        .bind::<Nullable<VarChar>, _>(filter.stadium_code.as_deref())
        .bind::<Nullable<Integer>, _>(filter.race_number)
        .bind::<Nullable<VarChar>, _>(filter.source.as_deref())
        .load::<WebPredictionRow>(conn)
        .context(QuerySnafu)?;

        Ok(rows.into_iter().map(WebPrediction::from).collect())
    }
}

impl PredictionAccuracy {
    /// # hit rate per source
    ///
    /// ## Arguments
    /// * `conn` - the database connection
    /// * `filter` - the optional source and date range
    ///
    /// ## Returns
    /// * `Vec<PredictionAccuracy>` - the most accurate source first
    pub fn per_source(
        conn: &mut PgConnection,
        filter: &AccuracyFilter,
    ) -> CustomResult<Vec<PredictionAccuracy>> {
        sql_query(
            "
            SELECT
                source,
                COUNT(*) AS total_predictions,
                SUM(CASE WHEN is_hit = 1 THEN 1 ELSE 0 END) AS hits,
                CAST(ROUND(SUM(CASE WHEN is_hit = 1 THEN 1 ELSE 0 END) * 100.0 / COUNT(*), 2) AS DOUBLE PRECISION) AS accuracy,
                SUM(payout) AS total_payout
            FROM prediction_results
            WHERE ($1::varchar IS NULL OR source = $1)
            AND ($2::date IS NULL OR race_date >= $2)
            AND ($3::date IS NULL OR race_date <= $3)
            GROUP BY source
            ORDER BY accuracy DESC, source",
        )
        .bind::<Nullable<VarChar>, _>(filter.source.as_deref())
        .bind::<Nullable<Date>, _>(filter.start_date)
        .bind::<Nullable<Date>, _>(filter.end_date)
        .load::<PredictionAccuracy>(conn)
        .context(QuerySnafu)
    }

    /// # hit rate per source of loaded results
    /// the in process counterpart of [`PredictionAccuracy::per_source`]
    pub fn aggregate(results: &[PredictionResult], filter: &AccuracyFilter) -> Vec<PredictionAccuracy> {
        let mut per_source: BTreeMap<&str, (i64, i64, Option<f64>)> = BTreeMap::new();

        for result in results.iter().filter(|result| filter.matches(result)) {
            let entry = per_source.entry(result.source.as_str()).or_insert((0, 0, None));
            entry.0 += 1;
            if result.is_hit {
                entry.1 += 1;
            }
            if let Some(payout) = result.payout {
                entry.2 = Some(entry.2.unwrap_or(0.0) + payout);
            }
        }

        let mut accuracies: Vec<PredictionAccuracy> = per_source
            .into_iter()
            .map(|(source, (total, hits, total_payout))| PredictionAccuracy {
                source: source.to_string(),
                total_predictions: total,
                hits,
                accuracy: Math::percentage(hits, total),
                total_payout,
            })
            .collect();

        accuracies.sort_by(|a, b| {
            b.accuracy
                .partial_cmp(&a.accuracy)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.source.cmp(&b.source))
        });

        accuracies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn checked(prediction_id: Option<i32>, source: &str, date: u32, is_hit: bool, payout: Option<f64>) -> PredictionResult {
        PredictionResult {
            prediction_id,
            race_date: day(date),
            stadium_code: "01".to_string(),
            race_number: 1,
            source: source.to_string(),
            is_hit,
            payout,
            checked_at: day(date).and_hms_opt(18, 0, 0),
        }
    }

    #[test]
    fn test_accuracy_per_source() {
        let results = vec![
            checked(None, "kyotei-navi", 4, true, Some(1200.0)),
            checked(None, "kyotei-navi", 4, false, None),
            checked(None, "kyotei-navi", 5, false, None),
            checked(None, "boat-yoso", 4, true, Some(300.0)),
            checked(None, "boat-yoso", 5, true, Some(450.0)),
        ];

        let accuracies = PredictionAccuracy::aggregate(&results, &AccuracyFilter::default());
        assert_eq!(accuracies.len(), 2);
        assert_eq!(accuracies[0].source, "boat-yoso");
        assert_eq!(accuracies[0].accuracy, 100.0);
        assert_eq!(accuracies[0].total_payout, Some(750.0));
        assert_eq!(accuracies[1].hits, 1);
        assert_eq!(accuracies[1].total_predictions, 3);
        assert_eq!(accuracies[1].accuracy, 33.33);
    }

    #[test]
    fn test_accuracy_filter_by_date() {
        let results = vec![
            checked(None, "kyotei-navi", 3, true, None),
            checked(None, "kyotei-navi", 4, false, None),
        ];
        let filter = AccuracyFilter {
            start_date: Some(day(4)),
            ..AccuracyFilter::default()
        };

        let accuracies = PredictionAccuracy::aggregate(&results, &filter);
        assert_eq!(accuracies[0].total_predictions, 1);
        assert_eq!(accuracies[0].accuracy, 0.0);
        assert_eq!(accuracies[0].total_payout, None);
    }

    #[test]
    fn test_latest_outcome_wins() {
        let mut recheck = checked(Some(7), "kyotei-navi", 5, true, Some(980.0));
        recheck.checked_at = day(6).and_hms_opt(9, 0, 0);
        let results = vec![
            checked(Some(7), "kyotei-navi", 5, false, None),
            recheck,
            checked(Some(8), "kyotei-navi", 5, false, None),
        ];

        let outcome = PredictionOutcome::latest_for(7, &results).unwrap();
        assert!(outcome.is_hit);
        assert_eq!(outcome.payout, Some(980.0));
        assert!(PredictionOutcome::latest_for(9, &results).is_none());
    }
}
