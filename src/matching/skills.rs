use std::collections::BTreeSet;

/// Jaccard overlap at or above this on word-token sets counts as a match.
const TOKEN_JACCARD_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillSimilarity {
    /// Fraction of posting requirements covered, in [0, 1].
    pub coverage: f64,
    /// Candidate skills that matched, sorted for reproducible reasons.
    pub matched_skills: Vec<String>,
}

impl SkillSimilarity {
    pub fn none() -> Self {
        Self {
            coverage: 0.0,
            matched_skills: Vec::new(),
        }
    }
}

/// Coverage score between a candidate's skill set and a posting's
/// required-skill set. Both sides must already be normalized and
/// synonym-resolved.
///
/// A candidate skill matches when it equals a posting skill exactly, its
/// fuzzy partial-ratio to any posting skill reaches `fuzzy_threshold`
/// (0–100), or its word-token Jaccard overlap with any posting skill is at
/// least 0.5. The three tiers trade precision for recall so reworded skill
/// phrases still register.
pub fn score_skills(
    candidate_skills: &BTreeSet<String>,
    posting_skills: &BTreeSet<String>,
    fuzzy_threshold: f64,
) -> SkillSimilarity {
    if posting_skills.is_empty() {
        return SkillSimilarity::none();
    }

    let mut matched = Vec::new();
    for skill in candidate_skills {
        if posting_skills.contains(skill) {
            matched.push(skill.clone());
            continue;
        }
        let fuzzy_hit = posting_skills.iter().any(|required| {
            partial_ratio(skill, required) >= fuzzy_threshold
                || token_jaccard(skill, required) >= TOKEN_JACCARD_THRESHOLD
        });
        if fuzzy_hit {
            matched.push(skill.clone());
        }
    }

    let coverage = (matched.len() as f64 / posting_skills.len() as f64).min(1.0);
    SkillSimilarity {
        coverage,
        matched_skills: matched,
    }
}

/// Best similarity (0–100) of the shorter string against every equal-length
/// window of the longer one, using normalized Levenshtein per window.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };
    let needle: String = short.iter().collect();

    let mut best = 0.0_f64;
    for window in long.windows(short.len()) {
        let haystack: String = window.iter().collect();
        let sim = strsim::normalized_levenshtein(&needle, &haystack);
        if sim > best {
            best = sim;
        }
        if best >= 1.0 {
            break;
        }
    }
    best * 100.0
}

/// Jaccard overlap between word-token sets. Tokens split on non-alphanumeric
/// boundaries; single-character tokens are ignored.
pub fn token_jaccard(a: &str, b: &str) -> f64 {
    let set_a = word_tokens(a);
    let set_b = word_tokens(b);
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count() as f64;
    let union = set_a.union(&set_b).count() as f64;
    intersection / union
}

fn word_tokens(value: &str) -> BTreeSet<String> {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() > 1)
        .map(|token| token.to_string())
        .collect()
}
