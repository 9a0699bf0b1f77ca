use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;

use crate::context::types::{ContextSignals, EventInfo};

/// Signals used for locations missing from a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FallbackSignals {
    #[serde(default = "default_demand")]
    pub demand: u32,
    #[serde(default = "default_event_count")]
    pub event_count: u32,
    #[serde(default)]
    pub event_major: bool,
    #[serde(default)]
    pub weather: bool,
}

fn default_demand() -> u32 { 70 }
fn default_event_count() -> u32 { 2 }

impl Default for FallbackSignals {
    fn default() -> Self {
        Self {
            demand: default_demand(),
            event_count: default_event_count(),
            event_major: false,
            weather: false,
        }
    }
}

/// Location-keyed lookup data. Tables omitted from config keep the
/// reference values.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationTables {
    #[serde(default = "reference_demand")]
    pub demand: HashMap<String, u32>,
    #[serde(default = "reference_events")]
    pub events: HashMap<String, EventInfo>,
    #[serde(default = "reference_weather")]
    pub weather: HashMap<String, bool>,
    #[serde(default)]
    pub fallback: FallbackSignals,
}

impl Default for LocationTables {
    fn default() -> Self {
        Self {
            demand: reference_demand(),
            events: reference_events(),
            weather: reference_weather(),
            fallback: FallbackSignals::default(),
        }
    }
}

fn reference_demand() -> HashMap<String, u32> {
    [
        ("mumbai", 85),
        ("delhi", 80),
        ("bangalore", 75),
        ("pune", 70),
        ("goa", 90),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn reference_events() -> HashMap<String, EventInfo> {
    [
        ("mumbai", 5, true),
        ("delhi", 3, false),
        ("bangalore", 4, true),
        ("pune", 2, false),
        ("goa", 6, true),
    ]
    .into_iter()
    .map(|(k, count, major)| (k.to_string(), EventInfo { count, major }))
    .collect()
}

fn reference_weather() -> HashMap<String, bool> {
    [
        ("mumbai", true),
        ("delhi", false),
        ("bangalore", true),
        ("pune", true),
        ("goa", true),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

fn lowercase_keys<V>(table: HashMap<String, V>) -> HashMap<String, V> {
    table.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect()
}

/// Resolves demand, events, weather and calendar signals for a location.
///
/// Tables are immutable after construction; lookups never fail.
#[derive(Debug, Clone)]
pub struct ContextProvider {
    demand: HashMap<String, u32>,
    events: HashMap<String, EventInfo>,
    weather: HashMap<String, bool>,
    fallback: FallbackSignals,
}

impl ContextProvider {
    pub fn new(tables: LocationTables) -> Self {
        Self {
            demand: lowercase_keys(tables.demand),
            events: lowercase_keys(tables.events),
            weather: lowercase_keys(tables.weather),
            fallback: tables.fallback,
        }
    }

    pub fn demand(&self, location: &str) -> u32 {
        self.demand
            .get(&location.to_lowercase())
            .copied()
            .unwrap_or(self.fallback.demand)
    }

    pub fn events(&self, location: &str) -> EventInfo {
        self.events
            .get(&location.to_lowercase())
            .copied()
            .unwrap_or(EventInfo {
                count: self.fallback.event_count,
                major: self.fallback.event_major,
            })
    }

    pub fn weather(&self, location: &str) -> bool {
        self.weather
            .get(&location.to_lowercase())
            .copied()
            .unwrap_or(self.fallback.weather)
    }

    /// Whether any table has an entry for `location`.
    pub fn is_known(&self, location: &str) -> bool {
        let key = location.to_lowercase();
        self.demand.contains_key(&key)
            || self.events.contains_key(&key)
            || self.weather.contains_key(&key)
    }

    /// Resolve signals against today's local date.
    pub fn resolve(&self, location: &str) -> ContextSignals {
        self.resolve_on(location, Local::now().date_naive())
    }

    pub fn resolve_on(&self, location: &str, date: NaiveDate) -> ContextSignals {
        if !self.is_known(location) {
            debug!("No context data for '{}', using fallback signals", location);
        }

        ContextSignals::with_date(
            self.demand(location),
            self.events(location),
            self.weather(location),
            date,
        )
    }
}

impl Default for ContextProvider {
    fn default() -> Self {
        Self::new(LocationTables::default())
    }
}
