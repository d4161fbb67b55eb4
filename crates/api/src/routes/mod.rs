pub mod climate;
pub mod home;

pub use climate::*;
pub use home::*;
