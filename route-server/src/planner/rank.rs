//! Ranking for suggestion lists and along-route results.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::domain::{SuggestionResult, SuggestionSource};

use super::detour::DetourAssessment;

/// Priority bucket of a suggestion. Lower is better.
///
/// 0. saved locations
/// 1. recent searches
/// 2. rated places
/// 3. unrated places and plain addresses
fn tier(s: &SuggestionResult) -> u8 {
    match s.source {
        SuggestionSource::Saved => 0,
        SuggestionSource::Recent => 1,
        SuggestionSource::Place | SuggestionSource::Address => {
            if s.effective_rating().is_some() {
                2
            } else {
                3
            }
        }
    }
}

fn compare(a: &SuggestionResult, b: &SuggestionResult) -> Ordering {
    tier(a).cmp(&tier(b)).then_with(|| match (a.effective_rating(), b.effective_rating()) {
        // Only rated places carry a rating into the comparison
        (Some(ra), Some(rb)) if tier(a) == 2 => rb.partial_cmp(&ra).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    })
}

/// Drop suggestions whose normalized address was already seen. The first
/// occurrence wins, so callers control precedence by input order.
pub fn dedupe_by_address(suggestions: Vec<SuggestionResult>) -> Vec<SuggestionResult> {
    let mut seen = HashSet::with_capacity(suggestions.len());
    suggestions
        .into_iter()
        .filter(|s| seen.insert(s.key()))
        .collect()
}

/// Deduplicate, order by priority and keep the best `max`.
///
/// The sort is stable: within a tier (other than rated places, which order
/// by rating) input order is preserved.
pub fn rank_suggestions(suggestions: Vec<SuggestionResult>, max: usize) -> Vec<SuggestionResult> {
    let mut ranked = dedupe_by_address(suggestions);
    ranked.sort_by(compare);
    ranked.truncate(max);
    ranked
}

/// Order along-route results by position, then rating (best first).
pub fn rank_along_route(mut assessments: Vec<DetourAssessment>) -> Vec<DetourAssessment> {
    assessments.sort_by(|a, b| {
        a.route_position
            .partial_cmp(&b.route_position)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                let ra = a.candidate.rating().unwrap_or(0.0);
                let rb = b.candidate.rating().unwrap_or(0.0);
                rb.partial_cmp(&ra).unwrap_or(Ordering::Equal)
            })
    });
    assessments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Stop, StopKind};
    use crate::planner::detour::Confidence;

    fn place(address: &str, rating: Option<f32>) -> SuggestionResult {
        let mut s = SuggestionResult::new(SuggestionSource::Place, address);
        s.rating = rating;
        s
    }

    #[test]
    fn priority_order() {
        let input = vec![
            SuggestionResult::new(SuggestionSource::Address, "1 Plain St"),
            place("2 Low Rd", Some(3.1)),
            SuggestionResult::new(SuggestionSource::Recent, "3 Recent Ave"),
            place("4 High Rd", Some(4.8)),
            SuggestionResult::new(SuggestionSource::Saved, "5 Home Ln"),
            place("6 Unrated Rd", None),
        ];
        let ranked = rank_suggestions(input, 10);
        let addresses: Vec<_> = ranked.iter().map(|s| s.address.as_str()).collect();
        assert_eq!(
            addresses,
            vec!["5 Home Ln", "3 Recent Ave", "4 High Rd", "2 Low Rd", "1 Plain St", "6 Unrated Rd"]
        );
    }

    #[test]
    fn zero_rating_counts_as_unrated() {
        let ranked = rank_suggestions(
            vec![
                SuggestionResult::new(SuggestionSource::Address, "1 Plain St"),
                place("2 Zero Rd", Some(0.0)),
                place("3 Rated Rd", Some(1.0)),
            ],
            10,
        );
        assert_eq!(ranked[0].address, "3 Rated Rd");
        assert_eq!(ranked[1].address, "1 Plain St");
        assert_eq!(ranked[2].address, "2 Zero Rd");
    }

    #[test]
    fn first_occurrence_wins() {
        let saved = SuggestionResult::new(SuggestionSource::Saved, "123 Main St").with_name("Home");
        let dup = place("  123 MAIN st ", Some(5.0));
        let ranked = rank_suggestions(vec![saved.clone(), dup], 10);
        assert_eq!(ranked, vec![saved]);
    }

    #[test]
    fn truncates() {
        let input: Vec<_> = (0..25).map(|i| place(&format!("{i} Elm St"), Some(4.0))).collect();
        assert_eq!(rank_suggestions(input, 10).len(), 10);
    }

    #[test]
    fn empty_input() {
        assert!(rank_suggestions(Vec::new(), 10).is_empty());
        assert!(rank_along_route(Vec::new()).is_empty());
    }

    #[test]
    fn along_route_position_then_rating() {
        let assessment = |id: &str, position: f64, rating: f32| DetourAssessment {
            candidate: Stop::new(StopKind::Place, format!("{id} Rd")).with_place(id, Some(rating)),
            added_distance_miles: 0.5,
            added_time_mins: 2,
            on_route: true,
            route_position: position,
            confidence: Confidence::Estimated,
        };
        let ranked = rank_along_route(vec![
            assessment("late", 0.9, 5.0),
            assessment("mid_low", 0.5, 3.0),
            assessment("mid_high", 0.5, 4.5),
            assessment("early", 0.1, 2.0),
        ]);
        let ids: Vec<_> = ranked
            .iter()
            .map(|a| a.candidate.place_metadata.as_ref().unwrap().place_id.as_str())
            .collect();
        assert_eq!(ids, vec!["early", "mid_high", "mid_low", "late"]);
    }
}
