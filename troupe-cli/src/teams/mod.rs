pub mod stateful_weather;
pub mod weather;

pub use stateful_weather::run_stateful_weather_team;
pub use weather::run_weather_team;
