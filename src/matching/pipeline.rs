use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use super::scoring::{MatchScorer, MatchingConfig, RankedPosting};
use super::similar::reference_candidate;
use crate::cities::CityIndex;
use crate::skill_aliases::SkillAliases;
use crate::{Candidate, Posting};

/// Ranks a posting catalog against a candidate profile. Pure per call: the
/// only shared state is the read-only alias and coordinate tables, so one
/// engine serves concurrent ranking requests.
pub struct MatchingEngine {
    scorer: MatchScorer,
    config: MatchingConfig,
}

impl MatchingEngine {
    pub fn new(aliases: SkillAliases, cities: CityIndex, config: MatchingConfig) -> Self {
        Self {
            scorer: MatchScorer::new(aliases, cities),
            config,
        }
    }

    /// Engine backed by the built-in alias and city tables with the default
    /// configuration.
    pub fn with_builtin_tables() -> Self {
        Self::new(
            SkillAliases::builtin(),
            CityIndex::builtin(),
            MatchingConfig::default(),
        )
    }

    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Rank all postings for a candidate and return the configured top N.
    pub fn rank_postings(&self, candidate: &Candidate, postings: &[Posting]) -> Vec<RankedPosting> {
        self.rank_top_n(candidate, postings, self.config.top_n)
    }

    /// Rank with an explicit result bound. `top_n = 0` yields an empty list.
    pub fn rank_top_n(
        &self,
        candidate: &Candidate,
        postings: &[Posting],
        top_n: usize,
    ) -> Vec<RankedPosting> {
        self.rank_with_config(&self.config, candidate, postings, top_n)
    }

    /// Rank postings similar to a reference posting. The reference itself is
    /// excluded from the pool and the weights tilt toward content overlap.
    pub fn similar_postings(
        &self,
        reference: &Posting,
        postings: &[Posting],
        top_n: usize,
    ) -> Vec<RankedPosting> {
        let config = MatchingConfig {
            weights: super::weights::SIMILAR_POSTING_WEIGHTS,
            ..self.config.clone()
        };
        let candidate = reference_candidate(reference);
        let pool: Vec<Posting> = postings
            .iter()
            .filter(|p| p.posting_id != reference.posting_id)
            .cloned()
            .collect();
        self.rank_with_config(&config, &candidate, &pool, top_n)
    }

    fn rank_with_config(
        &self,
        config: &MatchingConfig,
        candidate: &Candidate,
        postings: &[Posting],
        top_n: usize,
    ) -> Vec<RankedPosting> {
        let profile = self.scorer.profile(candidate);
        debug!(
            candidate_id = %candidate.candidate_id,
            postings = postings.len(),
            top_n,
            "ranking postings"
        );

        let mut scored: Vec<RankedPosting> = postings
            .iter()
            .map(|posting| self.scorer.score_posting(config, &profile, posting))
            .collect();

        // Descending score; ties broken by ascending posting id so output is
        // reproducible across runs.
        scored.sort_by(|a, b| {
            b.match_score
                .partial_cmp(&a.match_score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.posting_id.cmp(&b.posting_id))
        });

        collect_top_n(scored, top_n)
    }
}

/// Walk the sorted list collecting up to `top_n` results, skipping postings
/// from organizations that already contributed one.
fn collect_top_n(scored: Vec<RankedPosting>, top_n: usize) -> Vec<RankedPosting> {
    let mut seen_orgs: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for result in scored {
        if out.len() >= top_n {
            break;
        }
        let org_key = result.organization.trim().to_lowercase();
        if !org_key.is_empty() && !seen_orgs.insert(org_key) {
            continue;
        }
        out.push(result);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_candidate() -> Candidate {
        Candidate {
            candidate_id: "CAND_1".into(),
            name: "Asha".into(),
            skills_possessed: vec!["python".into(), "data analysis".into(), "excel".into()],
            location_preference: "Bengaluru".into(),
            sector_interests: vec!["data".into(), "governance".into()],
            ..Candidate::default()
        }
    }

    fn posting(id: &str, org: &str, skills: &[&str]) -> Posting {
        Posting {
            posting_id: id.into(),
            title: format!("{id} Intern"),
            organization: org.into(),
            location: "Bengaluru".into(),
            sector: "data".into(),
            skills_required: skills.iter().map(|s| s.to_string()).collect(),
            ..Posting::default()
        }
    }

    fn catalog() -> Vec<Posting> {
        vec![
            posting("P1", "OrgA", &["python", "sql"]),
            posting("P2", "OrgB", &["writing", "research"]),
            posting("P3", "OrgC", &["excel", "data analysis"]),
        ]
    }

    #[test]
    fn ranks_best_matches_first() {
        let engine = MatchingEngine::with_builtin_tables();
        let results = engine.rank_postings(&base_candidate(), &catalog());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].posting_id, "P3");
        assert!(results
            .windows(2)
            .all(|w| w[0].match_score >= w[1].match_score));
    }

    #[test]
    fn ranking_is_idempotent() {
        let engine = MatchingEngine::with_builtin_tables();
        let candidate = base_candidate();
        let postings = catalog();

        let first = engine.rank_postings(&candidate, &postings);
        for _ in 0..5 {
            assert_eq!(engine.rank_postings(&candidate, &postings), first);
        }
    }

    #[test]
    fn ties_break_by_ascending_posting_id() {
        let engine = MatchingEngine::with_builtin_tables();
        let postings = vec![
            posting("P9", "OrgX", &["python"]),
            posting("P2", "OrgY", &["python"]),
        ];

        let results = engine.rank_postings(&base_candidate(), &postings);
        assert_eq!(results[0].match_score, results[1].match_score);
        assert_eq!(results[0].posting_id, "P2");
        assert_eq!(results[1].posting_id, "P9");
    }

    #[test]
    fn duplicate_organizations_keep_only_the_best() {
        let engine = MatchingEngine::with_builtin_tables();
        let postings = vec![
            posting("P1", "OrgA", &["python", "excel"]),
            posting("P2", " orga ", &["writing"]),
            posting("P3", "OrgB", &["research"]),
        ];

        let results = engine.rank_postings(&base_candidate(), &postings);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].posting_id, "P1");
        assert!(results.iter().all(|r| r.posting_id != "P2"));
    }

    #[test]
    fn top_n_bounds_hold() {
        let engine = MatchingEngine::with_builtin_tables();
        let candidate = base_candidate();
        let postings = catalog();

        for n in 0..5 {
            assert!(engine.rank_top_n(&candidate, &postings, n).len() <= n);
        }
        assert!(engine.rank_top_n(&candidate, &postings, 0).is_empty());
    }

    #[test]
    fn empty_posting_list_yields_empty_result() {
        let engine = MatchingEngine::with_builtin_tables();
        assert!(engine.rank_postings(&base_candidate(), &[]).is_empty());
    }

    #[test]
    fn candidate_with_no_skills_still_ranks_by_other_factors() {
        let engine = MatchingEngine::with_builtin_tables();
        let mut candidate = base_candidate();
        candidate.skills_possessed.clear();

        let results = engine.rank_postings(&candidate, &catalog());
        assert_eq!(results.len(), 3);
        assert!(results[0].match_score > 0.0);
    }

    #[test]
    fn similar_postings_excludes_the_reference() {
        let engine = MatchingEngine::with_builtin_tables();
        let postings = catalog();

        let results = engine.similar_postings(&postings[0], &postings, 10);
        assert!(results.iter().all(|r| r.posting_id != "P1"));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn similar_postings_prefers_skill_overlap() {
        let engine = MatchingEngine::with_builtin_tables();
        let reference = posting("R1", "OrgR", &["python", "sql"]);
        let postings = vec![
            reference.clone(),
            posting("P1", "OrgA", &["python", "sql"]),
            posting("P2", "OrgB", &["writing"]),
        ];

        let results = engine.similar_postings(&reference, &postings, 10);
        assert_eq!(results[0].posting_id, "P1");
        assert!(results[0].match_score > results[1].match_score);
    }
}
