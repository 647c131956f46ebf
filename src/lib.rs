pub mod cities;
pub mod logging;
pub mod matching;
pub mod normalize;
pub mod provider;
pub mod skill_aliases;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use normalize::normalize_strings;

// Commonly used data models for matching functions. List fields accept
// arbitrarily nested JSON arrays on deserialization and come out flat,
// trimmed, lowercased and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "normalize::flattened_strings")]
    pub skills_possessed: Vec<String>,
    #[serde(default)]
    pub location_preference: String,
    #[serde(default, deserialize_with = "normalize::flattened_strings")]
    pub sector_interests: Vec<String>,
    pub field_of_study: Option<String>,
    pub education_level: Option<String>,
    pub no_experience: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Posting {
    pub posting_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default, deserialize_with = "normalize::flattened_strings")]
    pub skills_required: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub beginner_friendly: Option<bool>,
    pub posted_at: Option<DateTime<Utc>>,
}

impl Candidate {
    /// Return a copy with list fields flattened/cleaned and the location
    /// trimmed. Scoring code assumes this has been applied at the boundary.
    pub fn normalized(&self) -> Candidate {
        Candidate {
            skills_possessed: normalize_strings(&self.skills_possessed),
            sector_interests: normalize_strings(&self.sector_interests),
            location_preference: self.location_preference.trim().to_string(),
            name: self.name.trim().to_string(),
            ..self.clone()
        }
    }
}

impl Posting {
    /// Same boundary cleanup as [`Candidate::normalized`]; required skills are
    /// flattened and normalized identically to candidate skills so the two
    /// sides compare symmetrically.
    pub fn normalized(&self) -> Posting {
        Posting {
            skills_required: normalize_strings(&self.skills_required),
            location: self.location.trim().to_string(),
            ..self.clone()
        }
    }
}
