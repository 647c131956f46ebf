/// Default ranking weights (candidate → posting fit).
/// Skill coverage dominates; location and sector interest refine; the misc
/// component carries the weak education/field signals.
pub const DEFAULT_WEIGHTS: Weights = Weights {
    skill: 0.50,
    location: 0.25,
    sector: 0.15,
    misc: 0.10,
};

/// Weights for "similar postings" queries (posting → posting).
/// Content overlap matters more than personal-fit signals, so skill and
/// sector are tilted up at the expense of location and misc.
pub const SIMILAR_POSTING_WEIGHTS: Weights = Weights {
    skill: 0.60,
    location: 0.15,
    sector: 0.20,
    misc: 0.05,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub skill: f64,
    pub location: f64,
    pub sector: f64,
    pub misc: f64,
}

impl Weights {
    pub fn sum(&self) -> f64 {
        self.skill + self.location + self.sector + self.misc
    }
}

impl Default for Weights {
    fn default() -> Self {
        DEFAULT_WEIGHTS
    }
}
