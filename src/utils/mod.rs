pub mod calendar;

pub use calendar::{days_in_year, days_of_year, grid_origin};
