use crate::cities::CityIndex;

#[derive(Debug, Clone, PartialEq)]
pub struct LocationAssessment {
    /// Proximity tier: 1.0 same city, 0.9 near, 0.6 reachable, 0.0 far or
    /// undetermined.
    pub score: f64,
    pub distance_km: Option<f64>,
    pub details: String,
}

impl LocationAssessment {
    fn unknown() -> Self {
        Self {
            score: 0.0,
            distance_km: None,
            details: "location information missing".into(),
        }
    }
}

/// Tier the proximity between a candidate's preferred city and a posting's
/// location. Applied only when both sides are present; missing input or
/// unknown cities degrade to the far tier, never an error.
pub fn assess_location(
    cities: &CityIndex,
    preferred: &str,
    posting_location: &str,
    near_km: f64,
    reachable_km: f64,
) -> LocationAssessment {
    if preferred.trim().is_empty() || posting_location.trim().is_empty() {
        return LocationAssessment::unknown();
    }

    let preferred_key = cities.normalize_city(preferred);
    let posting_key = cities.normalize_city(posting_location);
    if preferred_key == posting_key {
        return LocationAssessment {
            score: 1.0,
            distance_km: Some(0.0),
            details: format!("same city ({preferred_key})"),
        };
    }

    let distance = cities.distance_km(&preferred_key, &posting_key);
    let (score, details) = if distance <= near_km {
        (0.9, format!("{posting_key} is {distance:.1} km away"))
    } else if distance <= reachable_km {
        (0.6, format!("{posting_key} is {distance:.1} km away"))
    } else if distance == crate::cities::UNKNOWN_CITY_DISTANCE_KM {
        (0.0, format!("no coordinates for {preferred_key} ↔ {posting_key}"))
    } else {
        (0.0, format!("{posting_key} is {distance:.1} km away"))
    };

    LocationAssessment {
        score,
        distance_km: Some(distance),
        details,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEAR: f64 = 50.0;
    const REACHABLE: f64 = 200.0;

    fn assess(preferred: &str, posting: &str) -> LocationAssessment {
        assess_location(&CityIndex::builtin(), preferred, posting, NEAR, REACHABLE)
    }

    #[test]
    fn same_city_scores_full() {
        let result = assess("Bengaluru", "bangalore");
        assert_eq!(result.score, 1.0);
        assert_eq!(result.distance_km, Some(0.0));
    }

    #[test]
    fn near_city_scores_point_nine() {
        // Mumbai ↔ Thane is well under 50 km.
        let result = assess("Mumbai", "Thane");
        assert_eq!(result.score, 0.9);
    }

    #[test]
    fn reachable_city_scores_point_six() {
        // Mumbai ↔ Pune is roughly 120 km aerial.
        let result = assess("Mumbai", "Pune");
        assert_eq!(result.score, 0.6);
    }

    #[test]
    fn far_city_scores_zero() {
        let result = assess("Delhi", "Chennai");
        assert_eq!(result.score, 0.0);
        assert!(result.distance_km.unwrap() > REACHABLE);
    }

    #[test]
    fn unknown_city_lands_in_far_tier() {
        let result = assess("Foo", "Bar");
        assert_eq!(result.score, 0.0);
        assert_eq!(
            result.distance_km,
            Some(crate::cities::UNKNOWN_CITY_DISTANCE_KM)
        );
    }

    #[test]
    fn missing_input_scores_zero_without_distance() {
        let result = assess("", "Mumbai");
        assert_eq!(result.score, 0.0);
        assert_eq!(result.distance_km, None);
    }
}
