pub mod weather_data;

pub use weather_data::*;
