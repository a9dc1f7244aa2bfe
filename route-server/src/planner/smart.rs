//! Smart stop suggestions for a planned trip.
//!
//! Three buckets:
//! - `recommended`: places that suit the event the trip is for
//! - `time_based`: coffee in the morning, food around lunch and dinner
//! - `nearby`: everyday essentials (fuel, pharmacy)
//!
//! Every category search for a request runs concurrently. Suggestions the
//! user has accepted are not offered again for the rest of the session.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDateTime, Timelike};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Stop, StopKind, normalize_address};
use crate::resolver::{AddressResolver, LocationBias, PlaceCandidate};

use super::config::PlannerConfig;
use super::dwell::StopTimeEstimator;

/// What the trip is for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventType {
    BirthdayParty,
    SportsEvent,
    DoctorAppointment,
    SchoolEvent,
    GroceryShopping,
    DateNight,
    Workout,
    Other(String),
}

impl EventType {
    /// Parse an event identifier such as `"birthday_party"` or
    /// `"Birthday Party"`. Unknown identifiers become [`EventType::Other`].
    pub fn parse(s: &str) -> Self {
        let key = s.trim().to_lowercase().replace([' ', '-'], "_");
        match key.as_str() {
            "birthday_party" => EventType::BirthdayParty,
            "sports_event" => EventType::SportsEvent,
            "doctor_appointment" => EventType::DoctorAppointment,
            "school_event" => EventType::SchoolEvent,
            "grocery_shopping" => EventType::GroceryShopping,
            "date_night" => EventType::DateNight,
            "workout" => EventType::Workout,
            _ => EventType::Other(s.trim().to_string()),
        }
    }

    /// Place categories worth stopping at on the way.
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            EventType::BirthdayParty => &["toy store", "gift shop", "party supplies", "bakery", "ice cream shop"],
            EventType::SportsEvent => &["sports store", "restaurant", "gas station", "convenience store"],
            EventType::DoctorAppointment => &["pharmacy", "coffee shop", "parking garage"],
            EventType::SchoolEvent => &["office supplies", "bookstore", "coffee shop", "gift shop"],
            EventType::GroceryShopping => &["gas station", "bank", "pharmacy", "coffee shop"],
            EventType::DateNight => &["restaurant", "movie theater", "dessert shop", "parking garage"],
            EventType::Workout => &["smoothie bar", "health food store", "pharmacy", "gas station"],
            EventType::Other(_) => &["restaurant", "coffee shop"],
        }
    }

    fn identifier(&self) -> &str {
        match self {
            EventType::BirthdayParty => "birthday_party",
            EventType::SportsEvent => "sports_event",
            EventType::DoctorAppointment => "doctor_appointment",
            EventType::SchoolEvent => "school_event",
            EventType::GroceryShopping => "grocery_shopping",
            EventType::DateNight => "date_night",
            EventType::Workout => "workout",
            EventType::Other(s) => s,
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier().replace('_', " "))
    }
}

impl Serialize for EventType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.identifier())
    }
}

impl<'de> Deserialize<'de> for EventType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EventType::parse(&s))
    }
}

/// One suggested stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedStop {
    pub place: PlaceCandidate,
    pub dwell_minutes: u32,
    pub reason: String,
}

impl SuggestedStop {
    /// A waypoint for this place.
    pub fn into_stop(self) -> Stop {
        let mut stop = Stop::new(StopKind::Place, self.place.address)
            .with_name(self.place.name)
            .with_dwell_minutes(self.dwell_minutes)
            .with_place(self.place.id, self.place.rating);
        stop.coordinates = self.place.coordinates;
        stop
    }
}

/// The three suggestion buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartSuggestions {
    pub recommended: Vec<SuggestedStop>,
    pub time_based: Vec<SuggestedStop>,
    pub nearby: Vec<SuggestedStop>,
}

impl SmartSuggestions {
    pub fn is_empty(&self) -> bool {
        self.recommended.is_empty() && self.time_based.is_empty() && self.nearby.is_empty()
    }
}

const ESSENTIALS: &[&str] = &["gas station", "pharmacy"];

const MORNING: &[&str] = &["cafe"];
const LUNCH: &[&str] = &["restaurant"];
const DINNER: &[&str] = &["restaurant", "grocery store"];
const NO_MEAL: &[&str] = &[];

/// Meal-time categories for a departure hour.
fn time_categories(hour: u32) -> (&'static [&'static str], &'static str) {
    match hour {
        6..=9 => (MORNING, "Coffee on the way"),
        11..=13 => (LUNCH, "Lunch on the way"),
        17..=19 => (DINNER, "Dinner on the way"),
        _ => (NO_MEAL, ""),
    }
}

/// Interleave lists (first of each, then second of each, ...) skipping
/// repeats, until `cap` items are taken.
fn round_robin(lists: Vec<Vec<PlaceCandidate>>, cap: usize) -> Vec<PlaceCandidate> {
    let mut out: Vec<PlaceCandidate> = Vec::with_capacity(cap);
    let mut seen = HashSet::new();
    let longest = lists.iter().map(Vec::len).max().unwrap_or(0);
    for i in 0..longest {
        for list in &lists {
            if out.len() >= cap {
                return out;
            }
            if let Some(p) = list.get(i) {
                if seen.insert(p.id.clone()) {
                    out.push(p.clone());
                }
            }
        }
    }
    out
}

fn by_rating_desc(places: &mut [PlaceCandidate]) {
    places.sort_by(|a, b| {
        b.rating
            .unwrap_or(0.0)
            .partial_cmp(&a.rating.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Builds suggestion buckets and remembers accepted suggestions.
pub struct SmartStopSuggester {
    resolver: Arc<dyn AddressResolver>,
    estimator: StopTimeEstimator,
    config: PlannerConfig,
    accepted: HashSet<String>,
}

impl SmartStopSuggester {
    pub fn new(resolver: Arc<dyn AddressResolver>, config: PlannerConfig) -> Self {
        Self {
            resolver,
            estimator: StopTimeEstimator::default(),
            config,
            accepted: HashSet::new(),
        }
    }

    /// Accept a suggestion: it becomes a stop and is never offered again.
    pub fn accept(&mut self, suggestion: SuggestedStop) -> Stop {
        self.accepted.insert(normalize_address(&suggestion.place.address));
        suggestion.into_stop()
    }

    /// Exclude an address already on the route.
    pub fn mark_accepted(&mut self, address: &str) {
        self.accepted.insert(normalize_address(address));
    }

    pub fn is_accepted(&self, address: &str) -> bool {
        self.accepted.contains(&normalize_address(address))
    }

    fn suggested(&self, place: PlaceCandidate, reason: String) -> SuggestedStop {
        SuggestedStop {
            dwell_minutes: self.estimator.estimate(&place.name, &place.types),
            place,
            reason,
        }
    }

    /// Suggestions for a trip from `origin` to `destination` leaving at
    /// `departure`.
    pub async fn suggest(
        &self,
        origin: &str,
        destination: &str,
        departure: NaiveDateTime,
        event: Option<&EventType>,
    ) -> SmartSuggestions {
        let event_categories: &[&str] = event.map(EventType::categories).unwrap_or(&[]);
        let (meal_categories, meal_reason) = time_categories(departure.hour());

        let mut queries: Vec<&str> = Vec::new();
        for q in event_categories.iter().chain(meal_categories).chain(ESSENTIALS) {
            if !queries.contains(q) {
                queries.push(*q);
            }
        }

        let found = self.search_all(&queries, origin).await;
        let results_for = |category: &str| -> Vec<PlaceCandidate> {
            found
                .get(category)
                .map(|places| {
                    places
                        .iter()
                        .filter(|p| !self.is_accepted(&p.address))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        let recommended = match event {
            Some(event) => {
                let mut seen = HashSet::new();
                let mut places: Vec<PlaceCandidate> = event_categories
                    .iter()
                    .flat_map(|c| results_for(*c))
                    .filter(|p| seen.insert(p.id.clone()))
                    .collect();
                by_rating_desc(&mut places);
                places
                    .into_iter()
                    .take(self.config.max_recommended)
                    .map(|p| {
                        let reason = format!("Popular {} for {}", p.primary_type().replace('_', " "), event);
                        self.suggested(p, reason)
                    })
                    .collect()
            }
            None => Vec::new(),
        };

        let time_based = round_robin(
            meal_categories.iter().map(|c| results_for(*c)).collect(),
            self.config.max_time_based,
        )
        .into_iter()
        .map(|p| self.suggested(p, meal_reason.to_string()))
        .collect();

        let nearby = round_robin(
            ESSENTIALS
                .iter()
                .map(|c| {
                    let mut places = results_for(*c);
                    by_rating_desc(&mut places);
                    places
                })
                .collect(),
            self.config.max_nearby,
        )
        .into_iter()
        .map(|p| {
            let reason = format!("{} near {}", p.primary_type().replace('_', " "), origin.trim());
            self.suggested(p, reason)
        })
        .collect();

        let suggestions = SmartSuggestions {
            recommended,
            time_based,
            nearby,
        };
        debug!(
            origin,
            destination,
            recommended = suggestions.recommended.len(),
            time_based = suggestions.time_based.len(),
            nearby = suggestions.nearby.len(),
            "built smart suggestions"
        );
        suggestions
    }

    /// Run every category search concurrently. Failed searches yield
    /// nothing for their category.
    async fn search_all(&self, queries: &[&str], origin: &str) -> HashMap<String, Vec<PlaceCandidate>> {
        let bias = (!origin.trim().is_empty()).then(|| LocationBias::near(origin.trim()));
        let searches = queries.iter().map(|q| {
            let bias = bias.clone();
            async move {
                let result = self.resolver.search(q, bias.as_ref()).await;
                (*q, result)
            }
        });

        join_all(searches)
            .await
            .into_iter()
            .map(|(q, result)| {
                let places = result.unwrap_or_else(|e| {
                    warn!(provider = self.resolver.name(), error = %e, category = q, "category search failed");
                    Vec::new()
                });
                (q.to_string(), places)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::resolver::testing::ScriptedResolver;
    use crate::resolver::{FallbackResolver, LocalResolver};

    fn local() -> Arc<dyn AddressResolver> {
        Arc::new(FallbackResolver::local_only(LocalResolver::default()))
    }

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 6)
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap()
    }

    fn ids(stops: &[SuggestedStop]) -> Vec<&str> {
        stops.iter().map(|s| s.place.id.as_str()).collect()
    }

    #[test]
    fn parse_event_types() {
        assert_eq!(EventType::parse("birthday_party"), EventType::BirthdayParty);
        assert_eq!(EventType::parse("Date Night"), EventType::DateNight);
        assert_eq!(EventType::parse(" workout "), EventType::Workout);
        assert_eq!(EventType::parse("bar_mitzvah"), EventType::Other("bar_mitzvah".into()));
        assert_eq!(EventType::parse("bar_mitzvah").categories(), &["restaurant", "coffee shop"]);
        assert_eq!(EventType::SportsEvent.to_string(), "sports event");
    }

    #[test]
    fn event_type_serde() {
        let json = serde_json::to_string(&EventType::DoctorAppointment).unwrap();
        assert_eq!(json, r#""doctor_appointment""#);
        let back: EventType = serde_json::from_str(r#""school_event""#).unwrap();
        assert_eq!(back, EventType::SchoolEvent);
    }

    #[test]
    fn time_windows() {
        assert!(time_categories(5).0.is_empty());
        assert_eq!(time_categories(6).0, &["cafe"]);
        assert_eq!(time_categories(9).0, &["cafe"]);
        assert!(time_categories(10).0.is_empty());
        assert_eq!(time_categories(11).0, &["restaurant"]);
        assert!(time_categories(14).0.is_empty());
        assert_eq!(time_categories(19).0.len(), 2);
        assert!(time_categories(20).0.is_empty());
    }

    #[tokio::test]
    async fn birthday_party_recommendations() {
        let suggester = SmartStopSuggester::new(local(), PlannerConfig::default());
        let s = suggester
            .suggest("1 Home Ln", "2 Party Pl", at(15), Some(&EventType::BirthdayParty))
            .await;

        assert_eq!(ids(&s.recommended), vec!["bakery_1", "ice_cream_1", "hallmark_1"]);
        assert_eq!(s.recommended[0].reason, "Popular bakery for birthday party");
        assert_eq!(s.recommended[0].dwell_minutes, 10);
        // 15:00 is outside every meal window
        assert!(s.time_based.is_empty());
    }

    #[tokio::test]
    async fn no_event_means_no_recommendations() {
        let suggester = SmartStopSuggester::new(local(), PlannerConfig::default());
        let s = suggester.suggest("1 Home Ln", "2 Work Rd", at(8), None).await;
        assert!(s.recommended.is_empty());
        assert_eq!(ids(&s.time_based), vec!["starbucks_1", "dunkin_1"]);
        assert!(s.time_based.iter().all(|t| t.dwell_minutes == 12));
    }

    #[tokio::test]
    async fn unknown_event_falls_back_to_food() {
        let suggester = SmartStopSuggester::new(local(), PlannerConfig::default());
        let s = suggester
            .suggest("1 Home Ln", "2 Hall Rd", at(15), Some(&EventType::parse("book_club")))
            .await;
        assert_eq!(s.recommended.len(), 3);
        assert!(s.recommended[0].reason.ends_with("for book club"));
    }

    #[tokio::test]
    async fn dinner_mixes_restaurants_and_groceries() {
        let suggester = SmartStopSuggester::new(local(), PlannerConfig::default());
        let s = suggester.suggest("1 Home Ln", "2 Work Rd", at(18), None).await;
        assert_eq!(ids(&s.time_based), vec!["olive_garden_1", "whole_foods_1"]);
    }

    #[tokio::test]
    async fn nearby_essentials() {
        let suggester = SmartStopSuggester::new(local(), PlannerConfig::default());
        let s = suggester.suggest("1 Home Ln", "2 Work Rd", at(15), None).await;
        assert_eq!(ids(&s.nearby), vec!["shell_1", "cvs_1"]);
        assert_eq!(s.nearby[0].dwell_minutes, 8);
        assert_eq!(s.nearby[1].dwell_minutes, 12);
    }

    #[tokio::test]
    async fn accepted_suggestions_are_not_reoffered() {
        let mut suggester = SmartStopSuggester::new(local(), PlannerConfig::default());
        let first = suggester.suggest("1 Home Ln", "2 Work Rd", at(15), None).await;
        let shell = first.nearby[0].clone();

        let stop = suggester.accept(shell);
        assert_eq!(stop.kind, StopKind::Place);
        assert_eq!(stop.name.as_deref(), Some("Shell Gas Station"));
        assert_eq!(stop.estimated_dwell_minutes, 8);
        assert_eq!(stop.place_metadata.as_ref().unwrap().place_id, "shell_1");

        let second = suggester.suggest("1 Home Ln", "2 Work Rd", at(15), None).await;
        assert_eq!(ids(&second.nearby), vec!["bp_1", "cvs_1"]);
    }

    #[tokio::test]
    async fn provider_failure_yields_empty_buckets() {
        let resolver = Arc::new(ScriptedResolver::new().failing());
        let suggester = SmartStopSuggester::new(resolver.clone(), PlannerConfig::default());
        let s = suggester
            .suggest("1 Home Ln", "2 Work Rd", at(8), Some(&EventType::Workout))
            .await;
        assert!(s.is_empty());
        // workout (4) + cafe (1), with "gas station" and "pharmacy" shared
        // with the essentials
        assert_eq!(resolver.search_calls(), 5);
    }

    #[test]
    fn round_robin_interleaves_and_caps() {
        let p = |id: &str| PlaceCandidate {
            id: id.into(),
            name: id.into(),
            address: format!("{id} St"),
            rating: None,
            distance_hint: None,
            types: Vec::new(),
            coordinates: None,
        };
        let out = round_robin(vec![vec![p("a1"), p("a2")], vec![p("b1")], vec![p("a1"), p("c2")]], 4);
        let ids: Vec<_> = out.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "b1", "a2", "c2"]);
        assert!(round_robin(Vec::new(), 2).is_empty());
    }
}
