mod climate_data;
mod sqlite;

pub use climate_data::{
    trailing_year_cutoff, ClimateAccess, ClimateData, DailyTempStats, PrecipitationReading,
    Station, TempStats, TemperatureReading,
};
pub use sqlite::Database;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The dataset file could not be opened
    #[error("failed to open climate dataset: {0}")]
    Connection(#[source] sqlx::Error),
    /// An expected table or column is absent
    #[error("unexpected dataset schema: {0}")]
    Schema(String),
    /// An aggregate that requires at least one row found none
    #[error("measurement table has no rows, cannot derive the trailing year window")]
    EmptyDataset,
    #[error("failed to query climate dataset: {0}")]
    Query(#[from] sqlx::Error),
    #[error("failed to parse stored date string: {0}")]
    DateParse(#[from] time::error::Parse),
    #[error("failed to format date string: {0}")]
    DateFormat(#[from] time::error::Format),
}
