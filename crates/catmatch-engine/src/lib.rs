//! Cross-catalog matching engine.
//!
//! Normalizes vendor references and names, scores candidate pairs with a
//! containment-then-edit-distance heuristic, fuses the two scores, and builds
//! the ranked match, duplicate, anomaly and search views over catalog entries.
//! Everything here is pure and synchronous; storage lives in `catmatch-db`.

pub mod duplicates;
pub mod error;
pub mod fuse;
pub mod normalize;
pub mod pairs;
pub mod price;
pub mod rank;
pub mod rescore;
pub mod search;
pub mod similarity;
pub mod summary;

pub use duplicates::find_duplicates;
pub use error::{check_fraction, check_percentage, EngineError};
pub use fuse::fuse;
pub use normalize::{normalize, normalize_opt};
pub use pairs::{entry_match, top_pairs};
pub use price::{compare_price, find_price_anomalies};
pub use rank::{check_source, rank_matches, score_candidates, score_pair, Scoring};
pub use rescore::{needs_rescore, rescore};
pub use search::{check_query, search_by_reference};
pub use similarity::similarity;
pub use summary::{summarize, BestDealCounts, MatchSummary};
