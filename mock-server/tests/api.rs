use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Dataset};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let resp = router
        .oneshot(Request::builder().uri(uri).body(String::new()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    (status, body_json(resp).await)
}

fn ids(list: &Value) -> Vec<u64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_u64().unwrap())
        .collect()
}

// --- clubs ---

#[tokio::test]
async fn clubs_search_returns_stubs() {
    let (status, body) = get(app(), "/clubs?name=slo").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clubs"].as_array().unwrap().len(), 1);
    assert_eq!(body["clubs"][0]["name"], "SLO Nexus");
    assert!(body["clubs"][0].get("location").is_none());
}

#[tokio::test]
async fn clubs_search_without_match_is_empty() {
    let (_, body) = get(app(), "/clubs?name=X93afadf80833").await;
    assert_eq!(body["clubs"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn clubs_search_requires_name() {
    let (status, body) = get(app(), "/clubs").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn club_show_returns_full_record() {
    let (_, body) = get(app(), "/clubs/23").await;
    assert_eq!(body["club"]["id"], 23);
    assert_eq!(body["club"]["location"], "San Luis Obispo, CA");
    assert!(body["club"].get("memberIds").is_none());
}

#[tokio::test]
async fn club_show_unknown_id_is_an_error_payload() {
    let (status, body) = get(app(), "/clubs/0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid clubs/0");
}

#[tokio::test]
async fn club_show_non_numeric_id_is_an_error_payload() {
    let (_, body) = get(app(), "/clubs/abc").await;
    assert_eq!(body["error"], "Invalid clubs/abc");
}

#[tokio::test]
async fn club_members_lists_members_with_club_stub() {
    let (_, body) = get(app(), "/clubs/23/members").await;
    assert_eq!(body["club"]["name"], "SLO Nexus");
    assert_eq!(ids(&body["members"]), vec![569, 779, 5747]);
}

// --- rides ---

#[tokio::test]
async fn rides_requires_a_selector() {
    let (status, body) = get(app(), "/rides?offset=10").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn rides_by_athlete_are_newest_first() {
    let (_, body) = get(app(), "/rides?athleteId=779").await;
    assert_eq!(ids(&body["rides"]), vec![191846, 191847, 190933, 190934]);
}

#[tokio::test]
async fn rides_by_unknown_club_is_an_error() {
    let (_, body) = get(app(), "/rides?clubId=24&athleteId=779").await;
    assert_eq!(body["error"], "Invalid clubId");
}

#[tokio::test]
async fn rides_by_date_range() {
    let (_, body) = get(app(), "/rides?startDate=2010-09-21&endDate=2010-09-22").await;
    assert_eq!(ids(&body["rides"]), vec![190933, 190934, 190406]);
}

#[tokio::test]
async fn rides_rejects_malformed_date() {
    let (_, body) = get(app(), "/rides?startDate=21-09-2010").await;
    assert_eq!(body["error"], "Invalid startDate");
}

#[tokio::test]
async fn rides_rejects_impossible_dates() {
    for uri in ["/rides?startDate=2010-13-45", "/rides?endDate=2010-02-30"] {
        let (status, body) = get(app(), uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body.get("error").is_some(), "{uri}");
        assert!(body.get("rides").is_none(), "{uri}");
    }
}

#[tokio::test]
async fn segment_efforts_reject_impossible_start_date() {
    let (_, body) = get(app(), "/segments/99243/efforts?startDate=2010-04-31").await;
    assert_eq!(body["error"], "Invalid startDate");
}

#[tokio::test]
async fn rides_pages_with_offset() {
    let router = app_with(Dataset::fixture(), 4);
    let (_, first) = get(router.clone(), "/rides?clubId=23").await;
    let (_, second) = get(router, "/rides?clubId=23&offset=4").await;
    assert_eq!(ids(&first["rides"]).len(), 4);
    assert_eq!(ids(&second["rides"]), vec![190406, 189654]);
}

#[tokio::test]
async fn ride_show_embeds_athlete_and_bike() {
    let (_, body) = get(app(), "/rides/77563").await;
    let ride = &body["ride"];
    assert_eq!(ride["averageSpeed"], 23260.8064010041);
    assert!(ride["description"].is_null());
    assert_eq!(ride["athlete"]["username"], "julianbill");
    assert_eq!(ride["bike"]["id"], 903);
}

#[tokio::test]
async fn ride_efforts_use_snake_case_elapsed_time() {
    let (_, body) = get(app(), "/rides/77563/efforts").await;
    assert_eq!(body["ride"]["id"], 77563);
    let first = &body["efforts"][0];
    assert_eq!(first["elapsed_time"], 209);
    assert_eq!(first["segment"]["name"], "Panhandle to GGP");
}

// --- segments ---

#[tokio::test]
async fn segments_search_is_case_insensitive() {
    let (_, body) = get(app(), "/segments?name=HAWK%20HILL").await;
    assert_eq!(ids(&body["segments"]), vec![99243]);
}

#[tokio::test]
async fn segment_show_returns_full_record() {
    let (_, body) = get(app(), "/segments/99243").await;
    assert_eq!(body["segment"]["climbCategory"], "4");
    assert_eq!(body["segment"]["elevationLow"], 90.5013);
}

#[tokio::test]
async fn segment_efforts_are_fastest_first() {
    let (_, body) = get(app(), "/segments/99243/efforts").await;
    assert_eq!(ids(&body["efforts"]), vec![911835, 567839, 1591612, 835674]);
    assert_eq!(body["efforts"][0]["activityId"], 95206);
    assert_eq!(body["efforts"][0]["ride"]["id"], 95206);
}

#[tokio::test]
async fn segment_efforts_best_keeps_one_per_athlete() {
    let (_, body) = get(app(), "/segments/99243/efforts?clubId=15&best=true").await;
    assert_eq!(ids(&body["efforts"]), vec![911835, 567839, 835674]);
}

#[tokio::test]
async fn segment_efforts_unknown_segment() {
    let (_, body) = get(app(), "/segments/0/efforts").await;
    assert_eq!(body["error"], "Invalid segments/0");
}

// --- efforts ---

#[tokio::test]
async fn effort_show_embeds_stubs() {
    let (_, body) = get(app(), "/efforts/688432").await;
    let effort = &body["effort"];
    assert_eq!(effort["ride"]["name"], "02/28/10 San Francisco, CA");
    assert!(effort["ride"].get("distance").is_none());
    assert_eq!(effort["segment"]["name"], "Panoramic to Pan Toll");
    assert_eq!(effort["athlete"]["name"], "Julian Bill");
}
