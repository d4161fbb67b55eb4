use climate_api::db::{ClimateAccess, ClimateData, Database, Error};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{
    str::FromStr,
    sync::atomic::{AtomicUsize, Ordering},
};

static DATASET_COUNTER: AtomicUsize = AtomicUsize::new(0);

type MeasurementRow<'a> = (&'a str, &'a str, Option<f64>, Option<f64>);

fn fresh_dataset_path() -> String {
    let file = format!(
        "climate-api-test-{}-{}.sqlite",
        std::process::id(),
        DATASET_COUNTER.fetch_add(1, Ordering::SeqCst)
    );
    std::env::temp_dir().join(file).to_string_lossy().to_string()
}

/// Build a dataset file with the expected schema, then reopen it read-only
async fn seed_dataset(
    measurements: &[MeasurementRow<'_>],
    stations: &[(&str, &str)],
) -> Database {
    let path = fresh_dataset_path();

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    sqlx::query(
        "CREATE TABLE measurement (
            id INTEGER PRIMARY KEY,
            station TEXT,
            date TEXT,
            prcp REAL,
            tobs REAL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TABLE station (
            id INTEGER PRIMARY KEY,
            station TEXT,
            name TEXT,
            latitude REAL,
            longitude REAL,
            elevation REAL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    for (station, date, prcp, tobs) in measurements {
        sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
            .bind(station)
            .bind(date)
            .bind(*prcp)
            .bind(*tobs)
            .execute(&pool)
            .await
            .unwrap();
    }
    for (station, name) in stations {
        sqlx::query(
            "INSERT INTO station (station, name, latitude, longitude, elevation)
             VALUES (?, ?, 21.27, -157.81, 3.0)",
        )
        .bind(station)
        .bind(name)
        .execute(&pool)
        .await
        .unwrap();
    }

    pool.close().await;

    Database::new(&path).await.unwrap()
}

#[tokio::test]
async fn precipitation_window_matches_trailing_year() {
    // Max date 2017-08-23 puts the cutoff at 2016-08-23
    let db = seed_dataset(
        &[
            ("S1", "2017-08-20", Some(0.5), Some(80.0)),
            ("S1", "2017-08-23", Some(0.1), Some(79.0)),
            ("S1", "2016-08-22", Some(2.0), Some(70.0)),
        ],
        &[("S1", "WAIKIKI 717.2, HI US")],
    )
    .await;
    let access = ClimateAccess::new(&db);

    let readings = access.precipitation_last_year().await.unwrap();

    assert_eq!(readings.len(), 2);
    assert_eq!(readings[0].date, "2017-08-20");
    assert_eq!(readings[0].prcp, Some(0.5));
    assert_eq!(readings[1].date, "2017-08-23");
    assert_eq!(readings[1].prcp, Some(0.1));
    assert!(readings.iter().all(|r| r.date.as_str() >= "2016-08-23"));
}

#[tokio::test]
async fn cutoff_date_itself_is_included() {
    let db = seed_dataset(
        &[
            ("S1", "2017-08-23", Some(0.1), Some(79.0)),
            ("S1", "2016-08-23", Some(1.2), Some(68.0)),
            ("S1", "2016-08-22", Some(1.3), Some(67.0)),
        ],
        &[("S1", "WAIKIKI 717.2, HI US")],
    )
    .await;
    let access = ClimateAccess::new(&db);

    let readings = access.precipitation_last_year().await.unwrap();
    let dates: Vec<&str> = readings.iter().map(|r| r.date.as_str()).collect();

    assert!(dates.contains(&"2016-08-23"));
    assert!(!dates.contains(&"2016-08-22"));
}

#[tokio::test]
async fn station_list_matches_station_rows() {
    let db = seed_dataset(
        &[("S1", "2017-08-20", Some(0.5), Some(80.0))],
        &[
            ("S1", "WAIKIKI 717.2, HI US"),
            ("S2", "KANEOHE 838.1, HI US"),
            ("S3", "PEARL CITY, HI US"),
        ],
    )
    .await;
    let access = ClimateAccess::new(&db);

    let stations = access.stations().await.unwrap();

    assert_eq!(stations.len(), 3);
    assert_eq!(stations[0].station_id, "S1");
    assert_eq!(stations[0].name, "WAIKIKI 717.2, HI US");
}

#[tokio::test]
async fn most_active_station_has_highest_row_count() {
    let db = seed_dataset(
        &[
            ("S2", "2017-08-19", Some(0.0), Some(75.0)),
            ("S1", "2017-08-20", Some(0.5), Some(80.0)),
            ("S1", "2017-08-21", Some(0.2), Some(81.0)),
            ("S1", "2017-08-23", Some(0.1), Some(79.0)),
        ],
        &[("S1", "WAIKIKI 717.2, HI US"), ("S2", "KANEOHE 838.1, HI US")],
    )
    .await;
    let access = ClimateAccess::new(&db);

    let readings = access.most_active_station_tobs_last_year().await.unwrap();

    // All rows belong to S1, the station with three measurements
    assert_eq!(readings.len(), 3);
    let dates: Vec<&str> = readings.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2017-08-20", "2017-08-21", "2017-08-23"]);
}

#[tokio::test]
async fn stats_past_last_date_are_all_null() {
    let db = seed_dataset(
        &[("S1", "2017-08-23", Some(0.1), Some(79.0))],
        &[("S1", "WAIKIKI 717.2, HI US")],
    )
    .await;
    let access = ClimateAccess::new(&db);

    let stats = access.temp_stats_from("2020-01-01").await.unwrap();

    assert_eq!(stats.tmin, None);
    assert_eq!(stats.tavg, None);
    assert_eq!(stats.tmax, None);
}

#[tokio::test]
async fn malformed_start_date_degrades_to_empty_match() {
    let db = seed_dataset(
        &[("S1", "2017-08-23", Some(0.1), Some(79.0))],
        &[("S1", "WAIKIKI 717.2, HI US")],
    )
    .await;
    let access = ClimateAccess::new(&db);

    // "not-a-date" sorts after every "2017-..." string, so nothing matches
    let stats = access.temp_stats_from("not-a-date").await.unwrap();

    assert_eq!(stats.tmin, None);
    assert_eq!(stats.tavg, None);
    assert_eq!(stats.tmax, None);
}

#[tokio::test]
async fn inverted_range_is_empty_not_an_error() {
    let db = seed_dataset(
        &[("S1", "2017-08-23", Some(0.1), Some(79.0))],
        &[("S1", "WAIKIKI 717.2, HI US")],
    )
    .await;
    let access = ClimateAccess::new(&db);

    let stats = access
        .temp_stats_range("2017-08-23", "2017-08-01")
        .await
        .unwrap();
    assert_eq!(stats.tmin, None);

    let daily = access
        .daily_temp_stats_range("2017-08-23", "2017-08-01")
        .await
        .unwrap();
    assert!(daily.is_empty());
}

#[tokio::test]
async fn range_stats_aggregate_inclusive_bounds() {
    let db = seed_dataset(
        &[
            ("S1", "2017-08-19", Some(0.0), Some(70.0)),
            ("S1", "2017-08-20", Some(0.5), Some(80.0)),
            ("S1", "2017-08-23", Some(0.1), Some(76.0)),
            ("S1", "2017-08-24", Some(0.3), Some(90.0)),
        ],
        &[("S1", "WAIKIKI 717.2, HI US")],
    )
    .await;
    let access = ClimateAccess::new(&db);

    let stats = access
        .temp_stats_range("2017-08-20", "2017-08-23")
        .await
        .unwrap();

    assert_eq!(stats.tmin, Some(76.0));
    assert_eq!(stats.tavg, Some(78.0));
    assert_eq!(stats.tmax, Some(80.0));
}

#[tokio::test]
async fn daily_stats_group_one_row_per_date() {
    let db = seed_dataset(
        &[
            ("S1", "2017-08-20", Some(0.5), Some(70.0)),
            ("S2", "2017-08-20", Some(0.2), Some(80.0)),
            ("S1", "2017-08-23", Some(0.1), Some(76.0)),
        ],
        &[("S1", "WAIKIKI 717.2, HI US"), ("S2", "KANEOHE 838.1, HI US")],
    )
    .await;
    let access = ClimateAccess::new(&db);

    let daily = access.daily_temp_stats_from("2017-01-01").await.unwrap();

    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].date, "2017-08-20");
    assert_eq!(daily[0].tmin, Some(70.0));
    assert_eq!(daily[0].tavg, Some(75.0));
    assert_eq!(daily[0].tmax, Some(80.0));
    assert_eq!(daily[1].date, "2017-08-23");
}

#[tokio::test]
async fn operations_are_idempotent_over_a_fixed_dataset() {
    let db = seed_dataset(
        &[
            ("S1", "2017-08-20", Some(0.5), Some(80.0)),
            ("S1", "2017-08-23", Some(0.1), Some(79.0)),
        ],
        &[("S1", "WAIKIKI 717.2, HI US")],
    )
    .await;
    let access = ClimateAccess::new(&db);

    let first = access.precipitation_last_year().await.unwrap();
    let second = access.precipitation_last_year().await.unwrap();
    assert_eq!(first, second);

    let first = access.temp_stats_from("2017-01-01").await.unwrap();
    let second = access.temp_stats_from("2017-01-01").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_measurement_table_is_an_empty_dataset_error() {
    let db = seed_dataset(&[], &[("S1", "WAIKIKI 717.2, HI US")]).await;
    let access = ClimateAccess::new(&db);

    assert!(matches!(
        access.precipitation_last_year().await,
        Err(Error::EmptyDataset)
    ));
    assert!(matches!(
        access.most_active_station_tobs_last_year().await,
        Err(Error::EmptyDataset)
    ));
}

#[tokio::test]
async fn missing_table_is_a_schema_error() {
    let path = fresh_dataset_path();

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::query("CREATE TABLE measurement (station TEXT, date TEXT, prcp REAL, tobs REAL)")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    assert!(matches!(
        Database::new(&path).await,
        Err(Error::Schema(_))
    ));
}

#[tokio::test]
async fn missing_file_is_a_connection_error() {
    assert!(matches!(
        Database::new("/nonexistent/path/climate.sqlite").await,
        Err(Error::Connection(_))
    ));
}
