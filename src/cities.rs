use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use lazy_static::lazy_static;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

/// Sentinel returned when either city has no known coordinates. Large enough
/// to land in the "far" proximity tier, so ranking stays deterministic.
pub const UNKNOWN_CITY_DISTANCE_KM: f64 = 1000.0;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const MIN_INPUT_CHARS: usize = 3;
const MIN_UNAMBIGUOUS_CHARS: usize = 4;

static RE_EDGE_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\p{L}\p{N}]+|[^\p{L}\p{N}]+$").unwrap());

lazy_static! {
    /// Canonical city key → (latitude, longitude) in decimal degrees.
    static ref CITY_COORDINATES: HashMap<&'static str, (f64, f64)> = {
        let entries: &[(&str, f64, f64)] = &[
            ("mumbai", 19.0760, 72.8777),
            ("delhi", 28.7041, 77.1025),
            ("bengaluru", 12.9716, 77.5946),
            ("hyderabad", 17.3850, 78.4867),
            ("ahmedabad", 23.0225, 72.5714),
            ("chennai", 13.0827, 80.2707),
            ("kolkata", 22.5726, 88.3639),
            ("pune", 18.5204, 73.8567),
            ("jaipur", 26.9124, 75.7873),
            ("surat", 21.1702, 72.8311),
            ("lucknow", 26.8467, 80.9462),
            ("kanpur", 26.4499, 80.3319),
            ("nagpur", 21.1458, 79.0882),
            ("indore", 22.7196, 75.8577),
            ("thane", 19.2183, 72.9781),
            ("bhopal", 23.2599, 77.4126),
            ("visakhapatnam", 17.6868, 83.2185),
            ("patna", 25.5941, 85.1376),
            ("vadodara", 22.3072, 73.1812),
            ("ghaziabad", 28.6692, 77.4538),
            ("ludhiana", 30.9010, 75.8573),
            ("agra", 27.1767, 78.0081),
            ("nashik", 19.9975, 73.7898),
            ("faridabad", 28.4089, 77.3178),
            ("meerut", 28.9845, 77.7064),
            ("rajkot", 22.3039, 70.8022),
            ("varanasi", 25.3176, 82.9739),
            ("srinagar", 34.0837, 74.7973),
            ("aurangabad", 19.8762, 75.3433),
            ("dhanbad", 23.7957, 86.4304),
            ("amritsar", 31.6340, 74.8723),
            ("navi mumbai", 19.0330, 73.0297),
            ("prayagraj", 25.4358, 81.8463),
            ("ranchi", 23.3441, 85.3096),
            ("howrah", 22.5958, 88.2636),
            ("coimbatore", 11.0168, 76.9558),
            ("jabalpur", 23.1815, 79.9864),
            ("gwalior", 26.2183, 78.1828),
            ("vijayawada", 16.5062, 80.6480),
            ("jodhpur", 26.2389, 73.0243),
            ("madurai", 9.9252, 78.1198),
            ("raipur", 21.2514, 81.6296),
            ("kota", 25.2138, 75.8648),
            ("chandigarh", 30.7333, 76.7794),
            ("guwahati", 26.1445, 91.7362),
            ("mysuru", 12.2958, 76.6394),
            ("gurgaon", 28.4595, 77.0266),
            ("noida", 28.5355, 77.3910),
            ("thiruvananthapuram", 8.5241, 76.9366),
            ("kochi", 9.9312, 76.2673),
            ("pondicherry", 11.9416, 79.8083),
            ("bhubaneswar", 20.2961, 85.8245),
            ("dehradun", 30.3165, 78.0322),
            ("mangaluru", 12.9141, 74.8560),
            ("pimpri-chinchwad", 18.6298, 73.7997),
            ("kalyan-dombivli", 19.2403, 73.1305),
            ("goa", 15.4909, 73.8278),
        ];

        entries.iter().map(|(k, lat, lon)| (*k, (*lat, *lon))).collect()
    };

    /// Common spelling variants and legacy names → canonical city key.
    static ref CITY_ALIASES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("bombay", "mumbai");
        m.insert("bangalore", "bengaluru");
        m.insert("blr", "bengaluru");
        m.insert("calcutta", "kolkata");
        m.insert("madras", "chennai");
        m.insert("new delhi", "delhi");
        m.insert("banaras", "varanasi");
        m.insert("benares", "varanasi");
        m.insert("benaras", "varanasi");
        m.insert("vizag", "visakhapatnam");
        m.insert("puducherry", "pondicherry");
        m.insert("trivandrum", "thiruvananthapuram");
        m.insert("allahabad", "prayagraj");
        m.insert("gurugram", "gurgaon");
        m.insert("navimumbai", "navi mumbai");
        m.insert("pimpri chinchwad", "pimpri-chinchwad");
        m.insert("kalyan dombivli", "kalyan-dombivli");
        m.insert("mysore", "mysuru");
        m.insert("cochin", "kochi");
        m.insert("poona", "pune");
        m.insert("mangalore", "mangaluru");
        m
    };

    /// Short city names that are legitimate despite failing the ambiguity
    /// length check.
    static ref SHORT_NAME_ALLOWLIST: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("goa");
        s
    };
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CityValidationError {
    #[error("city name must be at least {MIN_INPUT_CHARS} characters")]
    TooShort,
    #[error("city name must contain at least one letter")]
    NoLetters,
    #[error("city name '{0}' is too short to disambiguate")]
    Ambiguous(String),
}

/// A place returned by an external geocoding collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub name: String,
    pub region: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    /// True only for feature kinds that denote populated settlements.
    pub populated_place: bool,
}

/// External geocoding lookup, constrained to one country. Optional
/// infrastructure: the resolver works without it and never fails through it.
pub trait Geocoder {
    fn lookup(&self, name: &str, country: &str) -> Option<GeocodedPlace>;
}

/// City name normalization, coordinate lookup and great-circle distance.
///
/// The coordinate and alias tables are immutable snapshots; cities accepted
/// through the geocoding fallback land in an append-only learned cache that
/// is safe under concurrent readers.
#[derive(Debug)]
pub struct CityIndex {
    coordinates: HashMap<String, (f64, f64)>,
    aliases: HashMap<String, String>,
    country: String,
    learned: RwLock<HashMap<String, (f64, f64)>>,
}

impl CityIndex {
    pub fn new(coordinates: HashMap<String, (f64, f64)>, aliases: HashMap<String, String>) -> Self {
        let coordinates = coordinates
            .into_iter()
            .map(|(k, v)| (basic_normalize(&k), v))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        let aliases = aliases
            .into_iter()
            .map(|(alias, canonical)| (basic_normalize(&alias), basic_normalize(&canonical)))
            .filter(|(alias, canonical)| !alias.is_empty() && !canonical.is_empty())
            .collect();

        Self {
            coordinates,
            aliases,
            country: "IN".to_string(),
            learned: RwLock::new(HashMap::new()),
        }
    }

    /// Built-in Indian city table plus common alias spellings.
    pub fn builtin() -> Self {
        Self::new(
            CITY_COORDINATES
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            CITY_ALIASES
                .iter()
                .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
                .collect(),
        )
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }

    /// Load coordinates from a data provider, keeping the built-in alias
    /// table. Load failure degrades to an empty coordinate table and warns;
    /// distances then resolve to the unknown-city sentinel.
    pub fn from_provider(provider: &dyn crate::provider::DataProvider) -> Self {
        match provider.city_coordinates() {
            Ok(coords) => Self::new(
                coords,
                CITY_ALIASES
                    .iter()
                    .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
                    .collect(),
            ),
            Err(err) => {
                warn!(error = %err, "city coordinate table unavailable; distances degrade to sentinel");
                Self::new(HashMap::new(), HashMap::new())
            }
        }
    }

    /// Normalize a city name to its canonical lookup key. Unknown names pass
    /// through unchanged as their own key.
    pub fn normalize_city(&self, name: &str) -> String {
        let cleaned = basic_normalize(name);
        if cleaned.is_empty() {
            return cleaned;
        }
        match self.aliases.get(&cleaned) {
            Some(canonical) => canonical.clone(),
            None => cleaned,
        }
    }

    /// True when the key resolves to known coordinates (table or learned).
    pub fn is_known(&self, name: &str) -> bool {
        self.coordinates(&self.normalize_city(name)).is_some()
    }

    /// Coordinates for a canonical key, checking the static table first and
    /// then the learned cache.
    pub fn coordinates(&self, key: &str) -> Option<(f64, f64)> {
        if let Some(coords) = self.coordinates.get(key) {
            return Some(*coords);
        }
        self.learned
            .read()
            .ok()
            .and_then(|cache| cache.get(key).copied())
    }

    /// Great-circle distance between two cities in kilometers.
    ///
    /// Empty input means the distance cannot be determined (`f64::INFINITY`).
    /// Identical normalized keys are 0.0 without any lookup. A missing
    /// coordinate on either side yields [`UNKNOWN_CITY_DISTANCE_KM`] so
    /// downstream ranking still proceeds deterministically.
    pub fn distance_km(&self, city_a: &str, city_b: &str) -> f64 {
        if city_a.trim().is_empty() || city_b.trim().is_empty() {
            return f64::INFINITY;
        }

        let key_a = self.normalize_city(city_a);
        let key_b = self.normalize_city(city_b);
        if key_a == key_b {
            return 0.0;
        }

        match (self.coordinates(&key_a), self.coordinates(&key_b)) {
            (Some(a), Some(b)) => round1(haversine_km(a, b)),
            _ => UNKNOWN_CITY_DISTANCE_KM,
        }
    }

    /// Cities within `max_km` of the given city, sorted by ascending distance
    /// (ties by name for stable output).
    pub fn nearby_cities(&self, city: &str, max_km: f64) -> Vec<(String, f64)> {
        let key = self.normalize_city(city);
        if key.is_empty() || self.coordinates(&key).is_none() {
            return Vec::new();
        }

        let mut nearby: Vec<(String, f64)> = self
            .coordinates
            .keys()
            .filter(|other| **other != key)
            .map(|other| (other.clone(), self.distance_km(&key, other)))
            .filter(|(_, d)| *d <= max_km)
            .collect();

        nearby.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        nearby
    }

    /// Validate free-typed city input before it enters a profile.
    ///
    /// Requires at least one letter and [`MIN_INPUT_CHARS`] characters.
    /// Normalized names shorter than [`MIN_UNAMBIGUOUS_CHARS`] are rejected
    /// as ambiguous unless allow-listed or already a known canonical key.
    pub fn validate_city_input(&self, raw: &str) -> Result<(), CityValidationError> {
        let trimmed = raw.trim();
        if trimmed.chars().count() < MIN_INPUT_CHARS {
            return Err(CityValidationError::TooShort);
        }
        if !trimmed.chars().any(|c| c.is_alphabetic()) {
            return Err(CityValidationError::NoLetters);
        }

        let key = self.normalize_city(trimmed);
        if key.chars().count() >= MIN_UNAMBIGUOUS_CHARS {
            return Ok(());
        }
        if SHORT_NAME_ALLOWLIST.contains(key.as_str()) || self.coordinates(&key).is_some() {
            return Ok(());
        }
        Err(CityValidationError::Ambiguous(key))
    }

    /// Look up coordinates, falling back to an external geocoder for unknown
    /// cities. A geocoded result is accepted only when it denotes a populated
    /// place, its name matches the alias-normalized expected name, and a
    /// supplied region hint matches its region. Accepted cities are cached
    /// append-only for the remainder of the process lifetime. Never fails: an
    /// ambiguous or failed geocode yields `None`.
    pub fn resolve_or_geocode(
        &self,
        name: &str,
        region_hint: Option<&str>,
        geocoder: &dyn Geocoder,
    ) -> Option<(f64, f64)> {
        let key = self.normalize_city(name);
        if key.is_empty() {
            return None;
        }
        if let Some(coords) = self.coordinates(&key) {
            return Some(coords);
        }

        let place = geocoder.lookup(&key, &self.country)?;
        if !place.populated_place {
            debug!(city = %key, "geocode rejected: not a populated place");
            return None;
        }
        if self.normalize_city(&place.name) != key {
            debug!(city = %key, returned = %place.name, "geocode rejected: name mismatch");
            return None;
        }
        if let Some(hint) = region_hint {
            let hint = basic_normalize(hint);
            match place.region.as_deref().map(basic_normalize) {
                Some(region) if region == hint => {}
                _ => {
                    debug!(city = %key, "geocode rejected: region mismatch");
                    return None;
                }
            }
        }

        let coords = (place.latitude, place.longitude);
        if let Ok(mut cache) = self.learned.write() {
            cache.entry(key).or_insert(coords);
        }
        Some(coords)
    }
}

/// Lowercase, trim, collapse internal whitespace, strip edge punctuation.
fn basic_normalize(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = RE_EDGE_PUNCT.replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn haversine_km(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedGeocoder {
        place: Option<GeocodedPlace>,
    }

    impl Geocoder for FixedGeocoder {
        fn lookup(&self, _name: &str, _country: &str) -> Option<GeocodedPlace> {
            self.place.clone()
        }
    }

    #[test]
    fn normalizes_aliases_and_whitespace() {
        let index = CityIndex::builtin();
        assert_eq!(index.normalize_city("Bombay"), "mumbai");
        assert_eq!(index.normalize_city("  New   Delhi "), "delhi");
        assert_eq!(index.normalize_city("BLR"), "bengaluru");
        assert_eq!(index.normalize_city("Hubballi"), "hubballi");
    }

    #[test]
    fn self_distance_is_zero_for_every_known_city() {
        let index = CityIndex::builtin();
        for key in CITY_COORDINATES.keys() {
            assert_eq!(index.distance_km(key, key), 0.0, "city {key}");
        }
    }

    #[test]
    fn alias_pair_collapses_to_zero_distance() {
        let index = CityIndex::builtin();
        assert_eq!(index.distance_km("Bangalore", "Bengaluru"), 0.0);
    }

    #[test]
    fn distance_sanity_mumbai_pune() {
        let index = CityIndex::builtin();
        let d = index.distance_km("Mumbai", "Pune");
        assert!((90.0..=170.0).contains(&d), "got {d}");
    }

    #[test]
    fn distance_sanity_delhi_jaipur() {
        let index = CityIndex::builtin();
        let d = index.distance_km("Delhi", "Jaipur");
        assert!((200.0..=320.0).contains(&d), "got {d}");
    }

    #[test]
    fn unknown_city_yields_sentinel_not_error() {
        let index = CityIndex::builtin();
        assert_eq!(index.distance_km("Foo", "Bar"), UNKNOWN_CITY_DISTANCE_KM);
        assert_eq!(index.distance_km("Foo", "Mumbai"), UNKNOWN_CITY_DISTANCE_KM);
    }

    #[test]
    fn empty_input_is_undetermined() {
        let index = CityIndex::builtin();
        assert!(index.distance_km("", "Mumbai").is_infinite());
        assert!(index.distance_km("Mumbai", "  ").is_infinite());
    }

    #[test]
    fn nearby_cities_sorted_ascending() {
        let index = CityIndex::builtin();
        let nearby = index.nearby_cities("Mumbai", 60.0);
        assert!(!nearby.is_empty());
        assert!(nearby.windows(2).all(|w| w[0].1 <= w[1].1));
        assert!(nearby.iter().any(|(city, _)| city == "thane"));
        assert!(nearby.iter().all(|(city, _)| city != "mumbai"));
    }

    #[test]
    fn nearby_for_unknown_city_is_empty() {
        let index = CityIndex::builtin();
        assert!(index.nearby_cities("Atlantis", 100.0).is_empty());
    }

    #[test]
    fn validation_rules() {
        let index = CityIndex::builtin();
        assert_eq!(index.validate_city_input("ab"), Err(CityValidationError::TooShort));
        assert_eq!(index.validate_city_input("123"), Err(CityValidationError::NoLetters));
        assert_eq!(
            index.validate_city_input("xyz"),
            Err(CityValidationError::Ambiguous("xyz".into()))
        );
        // Alias expands past the ambiguity cutoff.
        assert_eq!(index.validate_city_input("blr"), Ok(()));
        // Allow-listed short name.
        assert_eq!(index.validate_city_input("Goa"), Ok(()));
        assert_eq!(index.validate_city_input("Pune"), Ok(()));
    }

    #[test]
    fn geocode_accepts_matching_populated_place_and_caches() {
        let index = CityIndex::builtin();
        let geocoder = FixedGeocoder {
            place: Some(GeocodedPlace {
                name: "Shimoga".into(),
                region: Some("Karnataka".into()),
                latitude: 13.9299,
                longitude: 75.5681,
                populated_place: true,
            }),
        };

        let coords = index.resolve_or_geocode("Shimoga", Some("Karnataka"), &geocoder);
        assert_eq!(coords, Some((13.9299, 75.5681)));

        // Cached: a second resolve does not need the geocoder.
        let none_geocoder = FixedGeocoder { place: None };
        assert_eq!(
            index.resolve_or_geocode("Shimoga", None, &none_geocoder),
            Some((13.9299, 75.5681))
        );
        assert!(index.is_known("Shimoga"));
    }

    #[test]
    fn geocode_rejects_name_region_and_kind_mismatches() {
        let index = CityIndex::builtin();

        let wrong_name = FixedGeocoder {
            place: Some(GeocodedPlace {
                name: "Shimla".into(),
                region: None,
                latitude: 31.1,
                longitude: 77.17,
                populated_place: true,
            }),
        };
        assert_eq!(index.resolve_or_geocode("Shimoga2", None, &wrong_name), None);

        let wrong_region = FixedGeocoder {
            place: Some(GeocodedPlace {
                name: "Karwar".into(),
                region: Some("Goa".into()),
                latitude: 14.8,
                longitude: 74.13,
                populated_place: true,
            }),
        };
        assert_eq!(
            index.resolve_or_geocode("Karwar", Some("Karnataka"), &wrong_region),
            None
        );

        let not_settlement = FixedGeocoder {
            place: Some(GeocodedPlace {
                name: "Sharavathi".into(),
                region: None,
                latitude: 14.2,
                longitude: 74.8,
                populated_place: false,
            }),
        };
        assert_eq!(index.resolve_or_geocode("Sharavathi", None, &not_settlement), None);
    }
}
