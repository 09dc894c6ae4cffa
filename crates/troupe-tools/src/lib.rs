//! # Troupe Tools
//!
//! Bundled tool library for the Troupe delegation runtime: the weather
//! lookups, conversation framing, build-command and remediation tools the
//! demo team binds, plus the [`ToolSet`] collection agent nodes carry.

pub mod greeting;
pub mod process;
pub mod remediation;
pub mod toolset;
pub mod weather;

pub use greeting::{SayGoodbye, SayHello};
pub use process::RunBuildCommand;
pub use remediation::FixVulnerability;
pub use toolset::{ToolSet, ToolSetError};
pub use weather::{
    GetWeather, GetWeatherStateful, LAST_CITY_KEY, TEMPERATURE_UNIT_KEY, TemperatureUnit,
    last_city_key, temperature_unit_key,
};
