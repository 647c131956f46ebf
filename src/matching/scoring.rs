use std::collections::BTreeSet;

use serde::Serialize;

use super::location::{assess_location, LocationAssessment};
use super::skills::{score_skills, SkillSimilarity};
use super::weights::{Weights, SIMILAR_POSTING_WEIGHTS};
use crate::cities::CityIndex;
use crate::normalize::nfkc_lower_trim;
use crate::skill_aliases::SkillAliases;
use crate::{Candidate, Posting};

/// Caller-supplied tunables for one ranking call. The core never reads the
/// environment; every constant here is the reference configuration from the
/// product spec and can be overridden per call.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingConfig {
    pub weights: Weights,
    pub top_n: usize,
    /// Fuzzy partial-ratio threshold on a 0–100 scale.
    pub fuzzy_threshold: f64,
    /// Distance tier breakpoints in kilometers.
    pub near_km: f64,
    pub reachable_km: f64,
    /// Additive bonus when an inexperienced candidate meets a
    /// beginner-friendly posting, applied before the final clamp at 1.0.
    pub beginner_bonus: f64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            top_n: 10,
            fuzzy_threshold: 85.0,
            near_km: 50.0,
            reachable_km: 200.0,
            beginner_bonus: 0.08,
        }
    }
}

impl MatchingConfig {
    /// Configuration for posting-to-posting similarity queries.
    pub fn similar_postings() -> Self {
        Self {
            weights: SIMILAR_POSTING_WEIGHTS,
            ..Self::default()
        }
    }
}

/// Candidate fields normalized once per ranking call so per-posting scoring
/// operates on guaranteed-shape data.
#[derive(Debug, Clone)]
pub struct CandidateProfile {
    pub skills: BTreeSet<String>,
    pub sectors: BTreeSet<String>,
    pub location: String,
    pub field_of_study: String,
    pub education_level: String,
    pub no_experience: bool,
}

/// One scored posting, ready for the UI: final score on a 0–100 scale with
/// one decimal, a human-readable reason and the matched skills behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedPosting {
    pub posting_id: String,
    pub title: String,
    pub organization: String,
    pub location: String,
    pub sector: String,
    pub match_score: f64,
    pub reason: String,
    pub matched_skills: Vec<String>,
}

/// Computes the weighted composite score for a single posting. Pure per call;
/// the alias and city tables are read-only snapshots, so concurrent ranking
/// calls share one scorer freely.
pub struct MatchScorer {
    aliases: SkillAliases,
    cities: CityIndex,
}

impl MatchScorer {
    pub fn new(aliases: SkillAliases, cities: CityIndex) -> Self {
        Self { aliases, cities }
    }

    pub fn profile(&self, candidate: &Candidate) -> CandidateProfile {
        CandidateProfile {
            skills: self.aliases.normalize_set(&candidate.skills_possessed),
            sectors: self.aliases.normalize_set(&candidate.sector_interests),
            location: candidate.location_preference.trim().to_string(),
            field_of_study: nfkc_lower_trim(candidate.field_of_study.as_deref().unwrap_or("")),
            education_level: nfkc_lower_trim(candidate.education_level.as_deref().unwrap_or("")),
            no_experience: candidate.no_experience.unwrap_or(false),
        }
    }

    /// Score one posting against a normalized candidate profile. Malformed
    /// posting fields degrade to the lowest applicable sub-scores.
    pub fn score_posting(
        &self,
        config: &MatchingConfig,
        profile: &CandidateProfile,
        posting: &Posting,
    ) -> RankedPosting {
        let posting_skills = self.aliases.normalize_set(&posting.skills_required);
        let skill = score_skills(&profile.skills, &posting_skills, config.fuzzy_threshold);

        let location = assess_location(
            &self.cities,
            &profile.location,
            posting.location.trim(),
            config.near_km,
            config.reachable_km,
        );

        let sector_key = self.aliases.resolve(&posting.sector);
        let sector_sim = if !sector_key.is_empty() && profile.sectors.contains(&sector_key) {
            1.0
        } else {
            0.0
        };

        let misc_sim = (substring_affinity(&profile.field_of_study, &sector_key)
            + substring_affinity(&profile.education_level, &nfkc_lower_trim(&posting.title)))
            / 2.0;

        let weights = &config.weights;
        let mut total = (weights.skill * skill.coverage
            + weights.location * location.score
            + weights.sector * sector_sim
            + weights.misc * misc_sim)
            .clamp(0.0, 1.0);

        if profile.no_experience && posting.beginner_friendly == Some(true) {
            total = (total + config.beginner_bonus).min(1.0);
        }

        let match_score = round1(total * 100.0);
        let reason = build_reason(&skill, &location, sector_sim);

        RankedPosting {
            posting_id: posting.posting_id.clone(),
            title: posting.title.clone(),
            organization: posting.organization.clone(),
            location: posting.location.clone(),
            sector: posting.sector.clone(),
            match_score,
            reason,
            matched_skills: skill.matched_skills,
        }
    }
}

/// Mutual-substring affinity on already-normalized strings: 1.0 when either
/// contains the other, 0.0 otherwise (including empty inputs).
fn substring_affinity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a.contains(b) || b.contains(a) {
        1.0
    } else {
        0.0
    }
}

/// Ordered, comma-joined explanation derived from sub-score thresholds.
fn build_reason(skill: &SkillSimilarity, location: &LocationAssessment, sector_sim: f64) -> String {
    let mut parts: Vec<String> = Vec::new();

    if skill.coverage >= 0.6 {
        parts.push(format!("Strong skill fit ({:.0}%)", skill.coverage * 100.0));
    } else if skill.coverage > 0.0 {
        parts.push(format!("Some skill overlap ({:.0}%)", skill.coverage * 100.0));
    }

    if location.score >= 0.9 {
        parts.push("Close to preferred location".into());
    } else if location.score >= 0.6 {
        parts.push("Within reasonable distance".into());
    }

    if sector_sim >= 1.0 {
        parts.push("Sector match".into());
    }

    if parts.is_empty() {
        "Relevant".into()
    } else {
        parts.join(", ")
    }
}

pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
