use axum::Router;
use climate_api::{
    app, db, AppState, ClimateData, DailyTempStats, PrecipitationReading, Station, TempStats,
    TemperatureReading,
};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub ClimateAccess {}

    #[async_trait::async_trait]
    impl ClimateData for ClimateAccess {
        async fn precipitation_last_year(&self) -> Result<Vec<PrecipitationReading>, db::Error>;
        async fn stations(&self) -> Result<Vec<Station>, db::Error>;
        async fn most_active_station_tobs_last_year(&self) -> Result<Vec<TemperatureReading>, db::Error>;
        async fn temp_stats_from(&self, start_date: &str) -> Result<TempStats, db::Error>;
        async fn temp_stats_range(&self, start_date: &str, end_date: &str) -> Result<TempStats, db::Error>;
        async fn daily_temp_stats_from(&self, start_date: &str) -> Result<Vec<DailyTempStats>, db::Error>;
        async fn daily_temp_stats_range(&self, start_date: &str, end_date: &str) -> Result<Vec<DailyTempStats>, db::Error>;
    }
}

pub struct TestApp {
    pub app: Router,
}

pub async fn spawn_app(climate_db: Arc<dyn ClimateData>) -> TestApp {
    let state = AppState {
        remote_url: String::from("http://localhost:5000"),
        climate_db,
    };

    TestApp { app: app(state) }
}
