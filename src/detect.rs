// src/detect.rs
//! Change detection: which candidates has this section not dispatched yet?

use crate::extract::CandidateItem;
use crate::state::SeenSet;

/// Order-preserving subset of candidates whose token is absent from `seen`.
///
/// Pure — committing tokens is the dispatcher's job, gated on sink success,
/// so a failed dispatch leaves its item "new" for the next run.
pub fn detect<'a>(candidates: &'a [CandidateItem], seen: &SeenSet) -> Vec<&'a CandidateItem> {
    candidates
        .iter()
        .filter(|c| !seen.contains(&c.token))
        .collect()
}
