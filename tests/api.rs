mod common;

use std::sync::Arc;

use rocket::http::{ContentType, Cookie, Status};
use serde_json::Value;

use boatrace_analytics::modules::models::odds::{OddsQuote, OddsType};
use boatrace_analytics::modules::store::memory::{Fixtures, MemoryStore};
use boatrace_analytics::modules::store::RaceStore;
use common::{client, client_for, quote};

const RACE: &str = "race_date=2025-01-04&stadium_code=01&race_number=1";

/// 田中, percent encoded
const TANAKA: &str = "%E7%94%B0%E4%B8%AD";

fn get_json(client: &rocket::local::blocking::Client, uri: &str) -> (Status, Value) {
    let response = client.get(uri.to_string()).dispatch();
    let status = response.status();
    (status, response.into_json::<Value>().unwrap_or(Value::Null))
}

#[test]
fn test_stadiums() {
    let client = client();
    let (status, body) = get_json(&client, "/api/boatrace/stadiums");

    assert_eq!(status, Status::Ok);
    let stadiums = body.as_array().unwrap();
    assert_eq!(stadiums.len(), 24);
    assert_eq!(stadiums[0]["code"], "01");
    assert_eq!(stadiums[0]["name"], "桐生");
}

#[test]
fn test_odds_history_is_sorted_and_filtered() {
    let client = client();

    let (status, body) = get_json(&client, &format!("/api/boatrace/odds/history?{}", RACE));
    assert_eq!(status, Status::Ok);
    let quotes: Vec<OddsQuote> = serde_json::from_value(body).unwrap();
    assert_eq!(quotes.len(), 4);
    assert!(quotes.windows(2).all(|pair| pair[0].scraped_at <= pair[1].scraped_at));

    let (_, body) = get_json(&client, &format!("/api/boatrace/odds/history?{}&odds_type=win", RACE));
    let quotes: Vec<OddsQuote> = serde_json::from_value(body).unwrap();
    assert_eq!(quotes.len(), 1);
    assert!(quotes.iter().all(|quote| quote.odds_type == OddsType::Win));
}

#[test]
fn test_odds_anomalies() {
    let client = client();
    let (status, body) = get_json(&client, &format!("/api/boatrace/odds/anomalies?{}&threshold=20", RACE));

    assert_eq!(status, Status::Ok);
    let anomalies = body.as_array().unwrap();
    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0]["combination"], "1-2");
    assert_eq!(anomalies[0]["odds_type"], "2t");
    assert_eq!(anomalies[0]["change_percent"], 50.0);
    assert_eq!(anomalies[0]["prev_odds"], 10.0);
    assert_eq!(anomalies[0]["current_odds"], 15.0);
}

#[test]
fn test_latest_odds_board() {
    let client = client();

    let (status, body) = get_json(&client, &format!("/api/boatrace/odds/latest?{}", RACE));
    assert_eq!(status, Status::Ok);
    let quotes: Vec<OddsQuote> = serde_json::from_value(body).unwrap();
    assert_eq!(quotes.len(), 2);
    assert_eq!((quotes[0].odds_type, quotes[0].combination.as_str(), quotes[0].odds_value), (OddsType::Exacta2, "1-2", 15.0));
    assert_eq!((quotes[1].odds_type, quotes[1].combination.as_str(), quotes[1].odds_value), (OddsType::Win, "1", 1.8));

    let (status, body) = get_json(&client, "/api/boatrace/odds/latest?race_date=2025-01-04&stadium_code=01");
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["field"], "race_number");
}

#[test]
fn test_race_key_validation() {
    let client = client();

    let (status, body) = get_json(
        &client,
        "/api/boatrace/odds/history?race_date=2025-01-04&stadium_code=01&race_number=13",
    );
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], "race_number");

    let (status, body) = get_json(&client, "/api/boatrace/races/weather?race_date=2025-01-04&stadium_code=30&race_number=1");
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["field"], "stadium_code");

    let (status, body) = get_json(&client, &format!("/api/boatrace/odds/history?{}&odds_type=4t", RACE));
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["field"], "odds_type");

    let (status, body) = get_json(&client, &format!("/api/boatrace/odds/anomalies?{}&threshold=-5", RACE));
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["field"], "threshold");

    let (status, body) = get_json(&client, "/api/boatrace/races/before-info?stadium_code=01&race_number=1");
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["field"], "race_date");
}

#[test]
fn test_racer_search_by_name() {
    let client = client();
    let (status, body) = get_json(
        &client,
        &format!("/api/boatrace/racers/search?name={}&limit=10&offset=0", TANAKA),
    );

    assert_eq!(status, Status::Ok);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 10);
    assert_eq!(body["total"], 12);
    assert!(data.iter().all(|racer| {
        let kanji = racer["name_kanji"].as_str().unwrap_or_default();
        let kana = racer["name_kana"].as_str().unwrap_or_default();
        kanji.contains("田中") || kana.contains("田中")
    }));
    // highest win rate first
    assert_eq!(data[0]["racer_no"], "4111");
}

#[test]
fn test_racer_search_is_repeatable() {
    let client = client();
    let uri = format!("/api/boatrace/racers/search?name={}&limit=5&offset=5", TANAKA);

    let (_, first) = get_json(&client, &uri);
    let (_, second) = get_json(&client, &uri);
    assert_eq!(first, second);
    assert_eq!(first["total"], 12);
    assert_eq!(first["data"].as_array().unwrap().len(), 5);
}

#[test]
fn test_racer_search_validation() {
    let client = client();

    let (status, body) = get_json(&client, "/api/boatrace/racers/search?limit=501");
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["field"], "limit");

    let (status, body) = get_json(&client, "/api/boatrace/racers/search?rank=S1");
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["field"], "rank");

    let (status, body) = get_json(&client, "/api/boatrace/racers/12345");
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["field"], "racer_no");
}

#[test]
fn test_racer_detail() {
    let client = client();

    let (status, body) = get_json(&client, "/api/boatrace/racers/4500");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["name_kanji"], "山田 花子");
    assert_eq!(body["periodStats"].as_array().unwrap().len(), 1);
    assert!(body["courseStats"].as_array().unwrap().is_empty());

    let (status, body) = get_json(&client, "/api/boatrace/racers/9999");
    assert_eq!(status, Status::Ok);
    assert!(body.is_null());
}

#[test]
fn test_unknown_race_is_empty() {
    let client = client();
    let other_race = "race_date=2025-01-04&stadium_code=24&race_number=12";

    for route in ["odds/history", "odds/anomalies", "races/before-info", "races/payoffs"] {
        let (status, body) = get_json(&client, &format!("/api/boatrace/{}?{}", route, other_race));
        assert_eq!(status, Status::Ok);
        assert_eq!(body, Value::Array(vec![]), "{} is not empty", route);
    }

    for route in ["races/weather", "races/result"] {
        let (status, body) = get_json(&client, &format!("/api/boatrace/{}?{}", route, other_race));
        assert_eq!(status, Status::Ok);
        assert!(body.is_null(), "{} is not null", route);
    }
}

#[test]
fn test_unavailable_store_is_empty() {
    let client = client_for(Arc::new(MemoryStore::unavailable()));

    let (status, body) = get_json(&client, &format!("/api/boatrace/odds/history?{}", RACE));
    assert_eq!(status, Status::Ok);
    assert_eq!(body, Value::Array(vec![]));

    let (status, body) = get_json(&client, "/api/boatrace/racers/search");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["total"], 0);

    let (status, body) = get_json(&client, "/api/boatrace/stats");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["totalOdds"], 0);
    assert!(body["latestOddsTime"].is_null());
}

#[test]
fn test_collection_stats() {
    let client = client();
    let (status, body) = get_json(&client, "/api/boatrace/stats");

    assert_eq!(status, Status::Ok);
    assert_eq!(body["totalOdds"], 6);
    assert_eq!(body["todayOdds"], 5);
    assert_eq!(body["totalRacers"], 14);
    assert_eq!(body["totalPayoffs"], 2);
    assert_eq!(body["latestOddsTime"], "2025-01-04T10:02:00");

    for (key, value) in body.as_object().unwrap() {
        if key != "latestOddsTime" {
            assert!(value.as_i64().unwrap() >= 0, "{} is negative", key);
        }
    }
    assert!(body["todayOdds"].as_i64() <= body["totalOdds"].as_i64());
}

#[test]
fn test_inserted_quote_round_trips() {
    let store = Arc::new(MemoryStore::new(Fixtures::default()));
    let client = client_for(store.clone());

    let inserted = quote("05", 7, OddsType::Quinella3, "1=2=3", 23.7, 4);
    store.insert_odds(&[inserted.clone()]).unwrap();

    let (status, body) = get_json(
        &client,
        "/api/boatrace/odds/history?race_date=2025-01-04&stadium_code=05&race_number=7&odds_type=3f",
    );
    assert_eq!(status, Status::Ok);
    let quotes: Vec<OddsQuote> = serde_json::from_value(body).unwrap();
    assert!(quotes.contains(&inserted));
}

#[test]
fn test_race_listings() {
    let client = client();

    let (status, body) = get_json(&client, "/api/boatrace/races/today");
    assert_eq!(status, Status::Ok);
    let races = body.as_array().unwrap();
    assert_eq!(races.len(), 2);
    assert_eq!(races[0]["stadium_name"], "桐生");
    assert_eq!(races[0]["odds_count"], 4);

    let (status, body) = get_json(
        &client,
        "/api/boatrace/races?start_date=2025-01-03&end_date=2025-01-04&stadium_code=all",
    );
    assert_eq!(status, Status::Ok);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = get_json(
        &client,
        "/api/boatrace/races?start_date=2025-01-03&end_date=2025-01-04&stadium_code=02",
    );
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = get_json(&client, "/api/boatrace/races?start_date=2025-01-04&end_date=2025-01-03");
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["field"], "end_date");

    let (_, body) = get_json(&client, "/api/boatrace/races/dates?limit=1");
    assert_eq!(body, serde_json::json!(["2025-01-04"]));
}

#[test]
fn test_race_context() {
    let client = client();

    let (_, body) = get_json(&client, &format!("/api/boatrace/races/payoffs?{}", RACE));
    let payoffs = body.as_array().unwrap();
    assert_eq!(payoffs[0]["bet_type"], "2t");
    assert_eq!(payoffs[1]["bet_type"], "3t");

    let (_, body) = get_json(&client, &format!("/api/boatrace/races/result?{}", RACE));
    assert_eq!(body["first_place"], 1);
    assert_eq!(body["title"], "一般戦");
}

#[test]
fn test_predictions_carry_their_result() {
    let client = client();

    let (status, body) = get_json(&client, "/api/boatrace/predictions?race_date=2025-01-04&stadium_code=01");
    assert_eq!(status, Status::Ok);
    let predictions = body.as_array().unwrap();
    assert_eq!(predictions.len(), 1);
    assert_eq!(predictions[0]["stadium_name"], "桐生");
    assert_eq!(predictions[0]["result"]["is_hit"], true);
    assert_eq!(predictions[0]["result"]["payout"], 1230.0);

    let (status, body) = get_json(&client, "/api/boatrace/predictions/accuracy?source=kyotei-navi");
    assert_eq!(status, Status::Ok);
    assert_eq!(body[0]["accuracy"], 100.0);
    assert_eq!(body[0]["hits"], 1);
}

#[test]
fn test_unknown_route_is_json_404() {
    let client = client();
    let (status, body) = get_json(&client, "/api/boatrace/unknown");

    assert_eq!(status, Status::NotFound);
    assert_eq!(body["error"], "not_found");
}

#[test]
fn test_cors_headers() {
    let client = client();
    let response = client.get("/api/boatrace/stadiums").dispatch();

    assert_eq!(response.headers().get_one("Access-Control-Allow-Origin"), Some("*"));
}

#[test]
fn test_session_stub() {
    let client = client();

    let (_, body) = get_json(&client, "/api/auth/me");
    assert_eq!(body["authenticated"], false);

    // an arbitrary session cookie does not log anyone in
    let response = client
        .get("/api/auth/me")
        .cookie(Cookie::new("app_session_id", "forged"))
        .dispatch();
    assert_eq!(response.into_json::<Value>().unwrap()["authenticated"], false);

    let response = client.post("/api/auth/logout").header(ContentType::JSON).dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_json::<Value>().unwrap()["success"], true);
}
