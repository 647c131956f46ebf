use crate::{Candidate, Posting};

/// Build a pseudo-candidate from a reference posting so the same ranking
/// pipeline answers "similar postings" queries: possessed skills are the
/// posting's requirements, the sector interest is its sector and the
/// location preference is its location.
pub fn reference_candidate(posting: &Posting) -> Candidate {
    Candidate {
        candidate_id: format!("ref:{}", posting.posting_id),
        name: posting.title.clone(),
        skills_possessed: posting.skills_required.clone(),
        location_preference: posting.location.clone(),
        sector_interests: vec![posting.sector.clone()],
        ..Candidate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrors_posting_attributes() {
        let posting = Posting {
            posting_id: "P7".into(),
            title: "Research Intern".into(),
            organization: "OrgB".into(),
            location: "Mysuru".into(),
            sector: "Governance".into(),
            skills_required: vec!["writing".into(), "research".into()],
            ..Posting::default()
        };

        let candidate = reference_candidate(&posting);
        assert_eq!(candidate.candidate_id, "ref:P7");
        assert_eq!(candidate.skills_possessed, vec!["writing", "research"]);
        assert_eq!(candidate.location_preference, "Mysuru");
        assert_eq!(candidate.sector_interests, vec!["Governance"]);
        assert_eq!(candidate.no_experience, None);
    }
}
