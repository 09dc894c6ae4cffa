//! Weather lookup tools backed by a fixed table.
//!
//! Two variants exist: [`GetWeather`] returns canned reports and ignores the
//! session entirely, while [`GetWeatherStateful`] reads the preferred
//! temperature unit from session state and records the last city it served.
//! Both treat an unknown city as a lookup miss, never a fault.

use tracing::debug;

use troupe_core::identifiers::StateKey;
use troupe_core::tool::{
    FailureReason, ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolOutcome, ToolSchema,
};

/// Session state key holding the preferred temperature unit.
pub const TEMPERATURE_UNIT_KEY: &str = "user_preference_temperature_unit";

/// Session state key recording the last city the stateful lookup served.
pub const LAST_CITY_KEY: &str = "last_city_checked_stateful";

/// The unit preference key as a [`StateKey`].
pub fn temperature_unit_key() -> StateKey {
    StateKey::new_unchecked(TEMPERATURE_UNIT_KEY)
}

/// The last-city key as a [`StateKey`].
pub fn last_city_key() -> StateKey {
    StateKey::new_unchecked(LAST_CITY_KEY)
}

// Temperatures are stored in Celsius; display conversion happens per call.
const WEATHER_DB: [(&str, f64, &str); 3] = [
    ("newyork", 25.0, "sunny"),
    ("london", 15.0, "cloudy"),
    ("tokyo", 18.0, "light rain"),
];

fn normalize_city(city: &str) -> String {
    city.to_lowercase().replace(' ', "")
}

fn capitalize(city: &str) -> String {
    let mut chars = city.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

fn lookup(normalized: &str) -> Option<(f64, &'static str)> {
    WEATHER_DB
        .iter()
        .find(|(name, _, _)| *name == normalized)
        .map(|(_, temp_c, condition)| (*temp_c, *condition))
}

fn unknown_city(city: &str) -> ToolOutcome {
    ToolOutcome::lookup_miss(format!(
        "Sorry, I don't have weather information for '{}'.",
        city
    ))
}

/// Preferred unit for temperature display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    /// Degrees Celsius, the default when no preference is stored
    #[default]
    Celsius,
    /// Degrees Fahrenheit
    Fahrenheit,
}

impl TemperatureUnit {
    /// Interpret a stored preference value.
    ///
    /// Anything other than the literal `"Fahrenheit"` reads as Celsius,
    /// including an absent preference.
    pub fn from_preference(value: Option<&str>) -> Self {
        match value {
            Some("Fahrenheit") => TemperatureUnit::Fahrenheit,
            _ => TemperatureUnit::Celsius,
        }
    }

    /// Render a Celsius temperature in this unit, rounded to whole degrees.
    pub fn render(self, temp_c: f64) -> String {
        match self {
            TemperatureUnit::Celsius => format!("{:.0}°C", temp_c),
            TemperatureUnit::Fahrenheit => format!("{:.0}°F", temp_c * 9.0 / 5.0 + 32.0),
        }
    }
}

/// Pure weather lookup with a canned report per known city.
///
/// City names are normalized by lower-casing and stripping spaces before
/// the table lookup, so `"New York"` and `"newyork"` resolve identically.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetWeather;

impl Tool for GetWeather {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("Retrieves the current weather report for a specified city.")
            .with_param(ParamSpec::required("city", ParamType::Text))
    }

    fn call(&self, args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
        let city = match args.text("city") {
            Ok(city) => city,
            Err(err) => return ToolOutcome::invalid_arguments(err.to_string()),
        };

        debug!(city = %city, "Weather lookup");

        match normalize_city(city).as_str() {
            "newyork" => {
                ToolOutcome::success("The weather in New York is sunny with a temperature of 25°C.")
            }
            "london" => {
                ToolOutcome::success("It's cloudy in London with a temperature of 15°C.")
            }
            "tokyo" => {
                ToolOutcome::success("Tokyo is experiencing light rain and a temperature of 18°C.")
            }
            _ => unknown_city(city),
        }
    }
}

/// Weather lookup honoring the session's temperature unit preference.
///
/// Reads [`TEMPERATURE_UNIT_KEY`] from session state (defaulting to
/// Celsius), renders the report in that unit, and on success records the
/// requested city under [`LAST_CITY_KEY`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GetWeatherStateful;

impl Tool for GetWeatherStateful {
    fn name(&self) -> &str {
        "get_weather_stateful"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(
            "Retrieves the current weather, displaying the temperature in the unit \
             preferred by this session.",
        )
        .with_param(ParamSpec::required("city", ParamType::Text))
    }

    fn call(&self, args: ToolArgs, ctx: &ToolContext) -> ToolOutcome {
        let city = match args.text("city") {
            Ok(city) => city,
            Err(err) => return ToolOutcome::invalid_arguments(err.to_string()),
        };

        let preference = match ctx.state().get(&temperature_unit_key()) {
            Ok(value) => value,
            Err(err) => {
                return ToolOutcome::failure(FailureReason::Raised {
                    message: format!("Session state unavailable: {}", err),
                });
            }
        };
        let unit = TemperatureUnit::from_preference(preference.as_deref());
        debug!(city = %city, unit = ?unit, "Stateful weather lookup");

        let Some((temp_c, condition)) = lookup(&normalize_city(city)) else {
            return unknown_city(city);
        };

        let report = format!(
            "The weather in {} is {} with a temperature of {}.",
            capitalize(city),
            condition,
            unit.render(temp_c)
        );

        if let Err(err) = ctx.state().set(last_city_key(), city) {
            return ToolOutcome::failure(FailureReason::Raised {
                message: format!("Session state unavailable: {}", err),
            });
        }

        ToolOutcome::success(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use troupe_core::session::SessionState;

    #[test]
    fn known_city_reports_condition_and_temperature() {
        let outcome = GetWeather.call(
            ToolArgs::new(serde_json::json!({ "city": "London" })),
            &ToolContext::detached(),
        );

        let report = outcome.payload().expect("Lookup should succeed");
        assert!(report.contains("15"));
        assert!(report.contains("cloudy"));
    }

    #[test]
    fn city_names_are_normalized_before_lookup() {
        for spelling in ["New York", "new york", "NEWYORK"] {
            let outcome = GetWeather.call(
                ToolArgs::new(serde_json::json!({ "city": spelling })),
                &ToolContext::detached(),
            );
            assert!(outcome.is_success(), "Spelling {:?} should resolve", spelling);
        }
    }

    #[test]
    fn unknown_city_is_a_lookup_miss_quoting_the_input() {
        let outcome = GetWeather.call(
            ToolArgs::new(serde_json::json!({ "city": "Atlantis" })),
            &ToolContext::detached(),
        );

        assert!(!outcome.is_success());
        assert_eq!(
            outcome.error_message().as_deref(),
            Some("Sorry, I don't have weather information for 'Atlantis'.")
        );
        assert!(matches!(
            outcome.failure_reason(),
            Some(FailureReason::LookupMiss { .. })
        ));
    }

    #[test]
    fn missing_city_argument_is_invalid() {
        let outcome = GetWeather.call(ToolArgs::empty(), &ToolContext::detached());
        assert!(matches!(
            outcome.failure_reason(),
            Some(FailureReason::InvalidArguments { .. })
        ));
    }

    #[test]
    fn stateful_lookup_defaults_to_celsius() {
        let outcome = GetWeatherStateful.call(
            ToolArgs::new(serde_json::json!({ "city": "London" })),
            &ToolContext::detached(),
        );

        assert_eq!(
            outcome.payload(),
            Some("The weather in London is cloudy with a temperature of 15°C.")
        );
    }

    #[test]
    fn stateful_lookup_honors_fahrenheit_preference() {
        let state = SessionState::new();
        state
            .set(temperature_unit_key(), "Fahrenheit")
            .expect("Set should succeed");

        let outcome = GetWeatherStateful.call(
            ToolArgs::new(serde_json::json!({ "city": "New York" })),
            &ToolContext::new(state),
        );

        let report = outcome.payload().expect("Lookup should succeed");
        assert!(report.contains("77°F"), "Report was: {}", report);
        assert!(report.contains("sunny"));
    }

    #[test]
    fn stateful_lookup_records_last_city() {
        let state = SessionState::new();
        let outcome = GetWeatherStateful.call(
            ToolArgs::new(serde_json::json!({ "city": "Tokyo" })),
            &ToolContext::new(state.clone()),
        );

        assert!(outcome.is_success());
        assert_eq!(
            state.get(&last_city_key()).unwrap().as_deref(),
            Some("Tokyo")
        );
    }

    #[test]
    fn stateful_miss_does_not_record_last_city() {
        let state = SessionState::new();
        let outcome = GetWeatherStateful.call(
            ToolArgs::new(serde_json::json!({ "city": "Atlantis" })),
            &ToolContext::new(state.clone()),
        );

        assert!(!outcome.is_success());
        assert_eq!(state.get(&last_city_key()).unwrap(), None);
    }

    #[test]
    fn unrecognized_preference_reads_as_celsius() {
        assert_eq!(
            TemperatureUnit::from_preference(Some("Kelvin")),
            TemperatureUnit::Celsius
        );
        assert_eq!(
            TemperatureUnit::from_preference(None),
            TemperatureUnit::Celsius
        );
        assert_eq!(
            TemperatureUnit::from_preference(Some("Fahrenheit")),
            TemperatureUnit::Fahrenheit
        );
    }

    #[test]
    fn fahrenheit_rendering_rounds_to_whole_degrees() {
        assert_eq!(TemperatureUnit::Fahrenheit.render(25.0), "77°F");
        assert_eq!(TemperatureUnit::Fahrenheit.render(18.0), "64°F");
        assert_eq!(TemperatureUnit::Celsius.render(15.0), "15°C");
    }

    #[test]
    fn capitalize_matches_report_formatting() {
        assert_eq!(capitalize("london"), "London");
        assert_eq!(capitalize("TOKYO"), "Tokyo");
        assert_eq!(capitalize(""), "");
    }
}
