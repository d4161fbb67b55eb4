use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::{
    format_description::BorrowedFormatItem, macros::format_description, Date, Duration,
};
use utoipa::ToSchema;

use super::{Database, Error};

/// Stored date strings are plain ISO-8601 calendar dates, no timezone.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Read-side query operations over the climate dataset.
///
/// Every call re-queries the underlying store; there is no caching. All
/// operations are pure given a fixed dataset snapshot.
#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Precipitation readings for the trailing year, in storage order
    async fn precipitation_last_year(&self) -> Result<Vec<PrecipitationReading>, Error>;
    /// Every station row, in storage order
    async fn stations(&self) -> Result<Vec<Station>, Error>;
    /// Temperature observations for the most active station over the trailing year
    async fn most_active_station_tobs_last_year(&self)
        -> Result<Vec<TemperatureReading>, Error>;
    /// Min/avg/max temperature over all rows with date >= start_date
    async fn temp_stats_from(&self, start_date: &str) -> Result<TempStats, Error>;
    /// Min/avg/max temperature over rows with start_date <= date <= end_date
    async fn temp_stats_range(&self, start_date: &str, end_date: &str)
        -> Result<TempStats, Error>;
    /// Min/avg/max temperature per matching date, dates >= start_date
    async fn daily_temp_stats_from(&self, start_date: &str)
        -> Result<Vec<DailyTempStats>, Error>;
    /// Min/avg/max temperature per matching date within the inclusive range
    async fn daily_temp_stats_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<DailyTempStats>, Error>;
}

/// One precipitation reading. Duplicate dates across stations are possible;
/// callers building a date-keyed mapping let the later row win.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PrecipitationReading {
    pub date: String,
    pub prcp: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
pub struct Station {
    pub station_id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TemperatureReading {
    pub date: String,
    pub tobs: Option<f64>,
}

/// Aggregate-of-empty-set yields all `None`, never an error
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct TempStats {
    pub tmin: Option<f64>,
    pub tavg: Option<f64>,
    pub tmax: Option<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailyTempStats {
    pub date: String,
    pub tmin: Option<f64>,
    pub tavg: Option<f64>,
    pub tmax: Option<f64>,
}

/// Lower bound of the 365-day window ending at `last_date`.
///
/// The stored maximum date comes from the dataset itself, so a parse failure
/// here means corrupt data rather than bad caller input.
pub fn trailing_year_cutoff(last_date: &str) -> Result<String, Error> {
    let last = Date::parse(last_date, DATE_FORMAT)?;
    let cutoff = last - Duration::days(365);
    Ok(cutoff.format(DATE_FORMAT)?)
}

/// Query Service implementation over the read-only SQLite pool
pub struct ClimateAccess {
    pool: SqlitePool,
}

impl ClimateAccess {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    /// Maximum date string across all measurement rows
    async fn max_measurement_date(&self) -> Result<String, Error> {
        let row: (Option<String>,) = sqlx::query_as("SELECT MAX(date) FROM measurement")
            .fetch_one(&self.pool)
            .await?;

        row.0.ok_or(Error::EmptyDataset)
    }

    /// Station with the highest measurement row count.
    ///
    /// Ties are broken by whatever order the grouped descending count query
    /// yields, which is implementation-defined.
    async fn most_active_station(&self) -> Result<String, Error> {
        let row: Option<(String, i64)> = sqlx::query_as(
            "SELECT station, COUNT(*) AS observation_count
             FROM measurement
             GROUP BY station
             ORDER BY observation_count DESC
             LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(station, _)| station).ok_or(Error::EmptyDataset)
    }
}

#[async_trait]
impl ClimateData for ClimateAccess {
    async fn precipitation_last_year(&self) -> Result<Vec<PrecipitationReading>, Error> {
        let last_date = self.max_measurement_date().await?;
        let cutoff = trailing_year_cutoff(&last_date)?;

        let rows: Vec<(String, Option<f64>)> =
            sqlx::query_as("SELECT date, prcp FROM measurement WHERE date >= ?")
                .bind(&cutoff)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(date, prcp)| PrecipitationReading { date, prcp })
            .collect())
    }

    async fn stations(&self) -> Result<Vec<Station>, Error> {
        let rows: Vec<(String, String, f64, f64, f64)> = sqlx::query_as(
            "SELECT station, name, latitude, longitude, elevation FROM station",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(station_id, name, latitude, longitude, elevation)| Station {
                    station_id,
                    name,
                    latitude,
                    longitude,
                    elevation,
                },
            )
            .collect())
    }

    async fn most_active_station_tobs_last_year(
        &self,
    ) -> Result<Vec<TemperatureReading>, Error> {
        let station = self.most_active_station().await?;

        // Recomputed independently of the precipitation query, no shared cache
        let last_date = self.max_measurement_date().await?;
        let cutoff = trailing_year_cutoff(&last_date)?;

        let rows: Vec<(String, Option<f64>)> =
            sqlx::query_as("SELECT date, tobs FROM measurement WHERE station = ? AND date >= ?")
                .bind(&station)
                .bind(&cutoff)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(date, tobs)| TemperatureReading { date, tobs })
            .collect())
    }

    async fn temp_stats_from(&self, start_date: &str) -> Result<TempStats, Error> {
        // start_date is an opaque string compared lexicographically; malformed
        // input just matches nothing and falls out as an all-null aggregate
        let (tmin, tavg, tmax): (Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement WHERE date >= ?",
        )
        .bind(start_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(TempStats { tmin, tavg, tmax })
    }

    async fn temp_stats_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<TempStats, Error> {
        // end_date < start_date simply matches nothing, no special-case error
        let (tmin, tavg, tmax): (Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            "SELECT MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement
             WHERE date >= ? AND date <= ?",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(TempStats { tmin, tavg, tmax })
    }

    async fn daily_temp_stats_from(
        &self,
        start_date: &str,
    ) -> Result<Vec<DailyTempStats>, Error> {
        let rows: Vec<(String, Option<f64>, Option<f64>, Option<f64>)> = sqlx::query_as(
            "SELECT date, MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement
             WHERE date >= ?
             GROUP BY date
             ORDER BY date",
        )
        .bind(start_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(date, tmin, tavg, tmax)| DailyTempStats {
                date,
                tmin,
                tavg,
                tmax,
            })
            .collect())
    }

    async fn daily_temp_stats_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<DailyTempStats>, Error> {
        let rows: Vec<(String, Option<f64>, Option<f64>, Option<f64>)> = sqlx::query_as(
            "SELECT date, MIN(tobs), AVG(tobs), MAX(tobs) FROM measurement
             WHERE date >= ? AND date <= ?
             GROUP BY date
             ORDER BY date",
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(date, tmin, tavg, tmax)| DailyTempStats {
                date,
                tmin,
                tavg,
                tmax,
            })
            .collect())
    }
}
