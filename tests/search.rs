//! End-to-end tests for the command handlers
//!
//! The whole pipeline (listing, filters, id resolution, cache, availability,
//! CSV) runs against a `wiremock` server standing in for the booking site.

use std::path::Path;

use chrono::NaiveDate;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{any, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelter_finder::app::{CategoryIds, IdCache};
use shelter_finder::cli::{handle_build_cache, handle_search, SearchArgs};
use shelter_finder::config::AppConfig;
use shelter_finder::constants::booking::{BOOKINGS_PATH, PLACES_PATH};
use shelter_finder::AppError;

fn test_config(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.client.base_url = server.uri();
    config.client.warm_up = false;
    config.listing.page_delay_ms = 0;
    config.resolver.detail_delay_ms = 0;
    config.availability.check_delay_ms = 0;
    config
}

fn test_args(dir: &Path) -> SearchArgs {
    SearchArgs {
        start: NaiveDate::from_ymd_opt(2025, 9, 7),
        nights: 2,
        quiet: true,
        out: dir.join("available_shelters.csv"),
        cache_file: dir.join("ids_cache.json"),
        ..Default::default()
    }
}

/// Three shelters: two on Fyn (one with a category id), one on Bornholm
async fn mount_site(server: &MockServer) {
    let listing = json!({
        "BookingPlacesList": [
            { "Uri": "egeskoven", "Title": "Egeskoven", "PlaceID": 4711,
              "DoubleLat": 55.40, "DoubleLng": 10.40, "RegionName": "" },
            { "Uri": "strandengen", "Title": "Strandengen", "PlaceID": 3012,
              "DoubleLat": "55.30", "DoubleLng": "10.10", "RegionName": "Fyn og øerne" },
            { "Uri": "hammeren", "Title": "Hammeren", "PlaceID": 4800,
              "DoubleLat": 55.28, "DoubleLng": 14.77 }
        ]
    });
    Mock::given(method("GET"))
        .and(path(PLACES_PATH))
        .and(query_param("p", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sted/strandengen/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<div class="booking" data-place-id="5501"></div>"#,
        ))
        .mount(server)
        .await;

    // Egeskoven is booked on the first night, Strandengen is free
    Mock::given(method("GET"))
        .and(path(BOOKINGS_PATH))
        .and(query_param("i", "4711"))
        .and(query_param("d", "20250907"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "BookingDates": ["2025-09-07"] })),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(BOOKINGS_PATH))
        .and(query_param("i", "5501"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "BookingDates": [] })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_writes_available_shelters_in_the_region() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let args = SearchArgs {
        regions: vec!["funen".to_string()],
        ..test_args(temp_dir.path())
    };

    let available = handle_search(&args, &test_config(&server)).await.unwrap();

    assert_eq!(available.len(), 1);
    assert_eq!(available[0].name, "Strandengen");
    assert_eq!(available[0].place_id, 5501);
    assert_eq!(available[0].region, "Fyn og øerne");

    let csv = std::fs::read_to_string(&args.out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "lat,lng,region,name,url,place_id");
    assert_eq!(
        lines[1],
        format!(
            "55.3,10.1,Fyn og øerne,Strandengen,{}/sted/strandengen/,5501",
            server.uri()
        )
    );
    assert_eq!(lines.len(), 2);

    let cache = IdCache::load(&args.cache_file, &CategoryIds::default()).await;
    assert_eq!(
        cache.get(&format!("{}/sted/strandengen/", server.uri())),
        Some(5501)
    );
}

#[tokio::test]
async fn second_run_uses_the_cache_instead_of_the_detail_page() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();
    let args = SearchArgs {
        regions: vec!["fyn".to_string()],
        ..test_args(temp_dir.path())
    };

    let mut cache = IdCache::new();
    cache.insert(
        format!("{}/sted/strandengen/", server.uri()),
        5501,
        &CategoryIds::default(),
    );
    cache.save(&args.cache_file).await.unwrap();

    Mock::given(method("GET"))
        .and(path("/sted/strandengen/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    mount_site(&server).await;

    let available = handle_search(&args, &test_config(&server)).await.unwrap();
    assert_eq!(available.len(), 1);
}

#[tokio::test]
async fn unknown_region_is_ignored_and_the_search_still_runs() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let args = SearchArgs {
        regions: vec!["atlantis".into(), "fyn".into()],
        ..test_args(temp_dir.path())
    };

    let available = handle_search(&args, &test_config(&server)).await.unwrap();

    assert_eq!(available.len(), 1);
    assert_eq!(available[0].name, "Strandengen");
    let csv = std::fs::read_to_string(&args.out).unwrap();
    assert_eq!(csv.lines().count(), 2);
}

#[tokio::test]
async fn failed_availability_check_skips_only_that_shelter() {
    let server = MockServer::start().await;
    // Mounted first so it wins over the Egeskoven mock in `mount_site`
    Mock::given(method("GET"))
        .and(path(BOOKINGS_PATH))
        .and(query_param("i", "4711"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_site(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let args = SearchArgs {
        filter: "e".to_string(),
        regions: vec!["fyn".to_string()],
        ..test_args(temp_dir.path())
    };

    let available = handle_search(&args, &test_config(&server)).await.unwrap();

    let names: Vec<&str> = available.iter().map(|shelter| shelter.name.as_str()).collect();
    assert_eq!(names, vec!["Strandengen"]);
}

#[tokio::test]
async fn missing_start_date_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let temp_dir = TempDir::new().unwrap();
    let args = SearchArgs {
        start: None,
        ..test_args(temp_dir.path())
    };

    let result = handle_search(&args, &test_config(&server)).await;

    assert!(matches!(result, Err(AppError::MissingStartDate)));
    assert!(!args.out.exists());
}

#[tokio::test]
async fn empty_result_still_writes_the_header() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let args = SearchArgs {
        filter: "EGESKOV".to_string(),
        ..test_args(temp_dir.path())
    };

    let available = handle_search(&args, &test_config(&server)).await.unwrap();

    assert!(available.is_empty());
    let csv = std::fs::read_to_string(&args.out).unwrap();
    assert_eq!(csv, "lat,lng,region,name,url,place_id\n");
}

#[tokio::test]
async fn probe_mode_writes_no_csv() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let args = SearchArgs {
        probe: 2,
        ..test_args(temp_dir.path())
    };

    let available = handle_search(&args, &test_config(&server)).await.unwrap();

    assert!(available.is_empty());
    assert!(!args.out.exists());
}

#[tokio::test]
async fn no_cache_neither_reads_nor_writes_the_cache_file() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let args = SearchArgs {
        no_cache: true,
        ..test_args(temp_dir.path())
    };

    handle_search(&args, &test_config(&server)).await.unwrap();
    assert!(!args.cache_file.exists());
}

#[tokio::test]
async fn build_cache_records_listing_and_scraped_ids() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let temp_dir = TempDir::new().unwrap();
    let args = SearchArgs {
        start: None,
        build_cache: true,
        ..test_args(temp_dir.path())
    };

    let stats = handle_build_cache(&args, &test_config(&server)).await.unwrap();

    assert_eq!(stats.from_listing, 2);
    assert_eq!(stats.scraped, 1);

    let cache = IdCache::load(&args.cache_file, &CategoryIds::default()).await;
    assert_eq!(cache.len(), 3);
    assert_eq!(cache.get(&format!("{}/sted/hammeren/", server.uri())), Some(4800));
}
