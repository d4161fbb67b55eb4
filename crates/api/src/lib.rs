pub mod db;
pub mod routes;
pub mod startup;
pub mod templates;
pub mod utils;

pub use db::*;
pub use routes::*;
pub use startup::{app, build_app_state, AppState};
pub use utils::*;
