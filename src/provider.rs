use std::collections::HashMap;

use thiserror::Error;

use crate::{Candidate, Posting};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("collection `{collection}` unavailable: {message}")]
    Unavailable {
        collection: &'static str,
        message: String,
    },
}

/// Boundary through which already-loaded collections reach the matching
/// core. One method per collection; fallback chains (document store → file →
/// defaults) live behind implementations of this trait, never inside the
/// core. An empty collection is valid data, not an error.
pub trait DataProvider {
    fn candidates(&self) -> Result<Vec<Candidate>, ProviderError>;
    fn postings(&self) -> Result<Vec<Posting>, ProviderError>;
    fn skill_aliases(&self) -> Result<HashMap<String, String>, ProviderError>;
    fn city_coordinates(&self) -> Result<HashMap<String, (f64, f64)>, ProviderError>;
}

/// In-memory provider used by tests and embedders that assemble their data
/// up front.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    pub candidates: Vec<Candidate>,
    pub postings: Vec<Posting>,
    pub skill_aliases: HashMap<String, String>,
    pub city_coordinates: HashMap<String, (f64, f64)>,
}

impl DataProvider for StaticProvider {
    fn candidates(&self) -> Result<Vec<Candidate>, ProviderError> {
        Ok(self.candidates.clone())
    }

    fn postings(&self) -> Result<Vec<Posting>, ProviderError> {
        Ok(self.postings.clone())
    }

    fn skill_aliases(&self) -> Result<HashMap<String, String>, ProviderError> {
        Ok(self.skill_aliases.clone())
    }

    fn city_coordinates(&self) -> Result<HashMap<String, (f64, f64)>, ProviderError> {
        Ok(self.city_coordinates.clone())
    }
}
