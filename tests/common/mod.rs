use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rocket::local::blocking::Client;

use boatrace_analytics::build_rocket;
use boatrace_analytics::modules::accessors::Accessors;
use boatrace_analytics::modules::models::general::RaceKey;
use boatrace_analytics::modules::models::odds::{OddsQuote, OddsType};
use boatrace_analytics::modules::models::prediction::{PredictionResult, WebPrediction};
use boatrace_analytics::modules::models::race::Payoff;
use boatrace_analytics::modules::models::racer::{RacerPeriodStat, RacerRank};
use boatrace_analytics::modules::store::memory::{Fixtures, MemoryStore, StoredRace};
use boatrace_analytics::modules::store::RaceStore;

pub fn race_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()
}

pub fn at(minute: u32) -> NaiveDateTime {
    race_day().and_hms_opt(10, minute, 0).unwrap()
}

pub fn quote(stadium_code: &str, race_number: i32, odds_type: OddsType, combination: &str, odds_value: f64, minute: u32) -> OddsQuote {
    OddsQuote {
        race_date: race_day(),
        stadium_code: stadium_code.to_string(),
        race_number,
        odds_type,
        combination: combination.to_string(),
        odds_value,
        scraped_at: at(minute),
        minutes_to_deadline: Some(30 - minute as i32),
    }
}

pub fn racer(racer_no: &str, name_kanji: &str, name_kana: &str, win_rate: Option<f64>) -> RacerPeriodStat {
    RacerPeriodStat {
        racer_no: racer_no.to_string(),
        data_year: 2024,
        data_period: 2,
        name_kanji: Some(name_kanji.to_string()),
        name_kana: Some(name_kana.to_string()),
        branch: Some("福岡".to_string()),
        rank: Some(RacerRank::B1),
        birth_year: Some(1992),
        gender: Some("M".to_string()),
        weight: Some(53),
        win_rate,
        place_rate: Some(30.0),
        avg_start_timing: Some(0.17),
        race_count: Some(80),
        first_count: Some(10),
        second_count: Some(12),
    }
}

/// # a race day at 桐生 and 戸田
/// race 01/1 has a 10, 10, 15 exacta partition, twelve racers are named 田中
pub fn fixtures() -> Fixtures {
    let mut yesterday = quote("02", 4, OddsType::Win, "3", 5.0, 0);
    yesterday.race_date = race_day().pred_opt().unwrap();

    let mut racer_periods: Vec<RacerPeriodStat> = (0..12)
        .map(|i| {
            racer(
                &format!("41{:02}", i),
                &format!("田中 {}郎", i),
                "タナカ",
                Some(5.0 + i as f64 / 10.0),
            )
        })
        .collect();
    racer_periods.push(racer("4500", "山田 花子", "ヤマダ ハナコ", Some(6.1)));
    racer_periods.push(racer("4501", "中田 一", "ナカタ ハジメ", None));

    Fixtures {
        odds: vec![
            quote("01", 1, OddsType::Exacta2, "1-2", 10.0, 0),
            quote("01", 1, OddsType::Exacta2, "1-2", 10.0, 1),
            quote("01", 1, OddsType::Exacta2, "1-2", 15.0, 2),
            quote("01", 1, OddsType::Win, "1", 1.8, 2),
            quote("02", 3, OddsType::Win, "1", 2.4, 1),
            yesterday,
        ],
        racer_periods,
        predictions: vec![WebPrediction {
            id: 1,
            race_date: race_day(),
            stadium_code: "01".to_string(),
            stadium_name: String::new(),
            race_number: 1,
            source: "kyotei-navi".to_string(),
            prediction_type: Some("3t".to_string()),
            prediction: Some("1-2-3".to_string()),
            confidence: Some(4),
            scraped_at: at(0),
            result: None,
        }],
        prediction_results: vec![PredictionResult {
            prediction_id: Some(1),
            race_date: race_day(),
            stadium_code: "01".to_string(),
            race_number: 1,
            source: "kyotei-navi".to_string(),
            is_hit: true,
            payout: Some(1230.0),
            checked_at: race_day().and_hms_opt(18, 0, 0),
        }],
        races: vec![StoredRace {
            key: RaceKey::new(race_day(), "01", 1),
            title: Some("一般戦".to_string()),
            finish: Some([Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)]),
            payoffs: vec![
                Payoff {
                    bet_type: "3t".to_string(),
                    combination: "1-2-3".to_string(),
                    payoff: 1230,
                    popularity: Some(2),
                },
                Payoff {
                    bet_type: "2t".to_string(),
                    combination: "1-2".to_string(),
                    payoff: 340,
                    popularity: Some(1),
                },
            ],
        }],
        ..Fixtures::default()
    }
}

/// a client over the given store with today pinned to the race day
pub fn client_for(store: Arc<dyn RaceStore>) -> Client {
    let accessors = Accessors::new(store).with_today(race_day());
    Client::tracked(build_rocket(accessors)).expect("valid rocket instance")
}

pub fn client() -> Client {
    client_for(Arc::new(MemoryStore::new(fixtures())))
}
