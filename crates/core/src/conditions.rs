//! Weather condition to collection mapping.

use crate::{CoreError, CoreResult};
use std::str::FromStr;

/// The fixed vocabulary of weather conditions a client may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Sun,
    Cloud,
    Rain,
    Snow,
}

/// `(condition, query keyword, collection name)`.
static CONDITION_COLLECTIONS: [(WeatherCondition, &str, &str); 4] = [
    (WeatherCondition::Sun, "sun", "Sunny Day"),
    (WeatherCondition::Cloud, "cloud", "Cloudy Day"),
    (WeatherCondition::Rain, "rain", "Rainy Day"),
    (WeatherCondition::Snow, "snow", "Snow Day"),
];

impl WeatherCondition {
    pub fn collection_name(self) -> &'static str {
        Self::row(self).2
    }

    // Table rows are in declaration order.
    fn row(self) -> &'static (WeatherCondition, &'static str, &'static str) {
        &CONDITION_COLLECTIONS[self as usize]
    }
}

impl FromStr for WeatherCondition {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CONDITION_COLLECTIONS
            .iter()
            .find(|(_, keyword, _)| *keyword == s)
            .map(|(condition, _, _)| *condition)
            .ok_or_else(|| CoreError::InvalidCondition(s.to_string()))
    }
}

/// Resolves an optional condition keyword to its collection name.
///
/// # Errors
///
/// Returns `CoreError::MissingCondition` when no (or an empty) condition is given and
/// `CoreError::InvalidCondition` for an unknown keyword.
pub fn resolve(condition: Option<&str>) -> CoreResult<&'static str> {
    let condition = condition
        .filter(|c| !c.is_empty())
        .ok_or(CoreError::MissingCondition)?;
    Ok(condition.parse::<WeatherCondition>()?.collection_name())
}
