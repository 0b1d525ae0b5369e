//! Frequency voting over noisy field candidates.
//!
//! Each OCR pass produces its own reading of a field, and the readings
//! disagree whenever a character is misrecognised. Agreement across passes
//! is the signal: the value seen most often wins.
//!
//! Ties go to the value that appeared first in collection order (pages in
//! order, then passes in configured order), so the page profile's reading
//! wins when every pass disagrees.

use std::collections::HashMap;

/// The winner of a vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub value: String,
    pub votes: usize,
    pub total: usize,
}

/// Pick the most frequent non-empty candidate.
///
/// Candidates are compared after trimming; empty or whitespace-only
/// candidates never count. Returns `None` when nothing is left.
pub fn majority_vote<I, S>(candidates: I) -> Option<Vote>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // value → (count, first index)
    let mut tally: HashMap<String, (usize, usize)> = HashMap::new();
    let mut total = 0;

    for candidate in candidates {
        let value = candidate.as_ref().trim();
        if value.is_empty() {
            continue;
        }
        let order = total;
        total += 1;
        tally
            .entry(value.to_string())
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, order));
    }

    tally
        .into_iter()
        .max_by(|(_, (ca, fa)), (_, (cb, fb))| ca.cmp(cb).then(fb.cmp(fa)))
        .map(|(value, (votes, _))| Vote {
            value,
            votes,
            total,
        })
}
