pub mod location;
pub mod pipeline;
pub mod scoring;
pub mod similar;
pub mod skills;
pub mod weights;

pub use pipeline::MatchingEngine;
pub use scoring::{MatchingConfig, RankedPosting};
pub use weights::Weights;
