//! Update-range resolution.
//!
//! Given a line's candidate tags and its checkpoint, compute the ordered
//! sequence of tags to replay: strictly after the checkpoint (or from the
//! global minimum when no checkpoint exists) through the catalog maximum.
//!
//! Uniqueness and total order are enforced on entry (sort + dedup by key);
//! the postcondition checks remain only as a last-line safety net.

use crate::error::RangeError;
use crate::types::Tag;

/// Resolve the update range for one release line.
///
/// Returns an empty range when the line is already current (checkpoint equals
/// the maximum candidate) or when `candidates` is empty. The result is
/// recomputed fresh every run — never cached — because new upstream tags may
/// have appeared since the last run.
pub fn resolve(candidates: &[Tag], checkpoint: Option<&Tag>) -> Result<Vec<Tag>, RangeError> {
    let mut sorted = candidates.to_vec();
    sorted.sort();
    sorted.dedup_by(|a, b| a.key() == b.key());

    let Some(stop) = sorted.last().cloned() else {
        return Ok(Vec::new());
    };

    let start_idx = match checkpoint {
        None => 0,
        Some(cp) => {
            let idx = sorted
                .iter()
                .position(|t| t.key() == cp.key())
                .ok_or_else(|| RangeError::UnknownCheckpoint {
                    tag: cp.token().to_string(),
                })?;
            idx + 1
        }
    };

    let stop_idx = sorted
        .iter()
        .position(|t| t.key() == stop.key())
        .ok_or_else(|| RangeError::UnknownStopTag {
            tag: stop.token().to_string(),
        })?;

    if start_idx > stop_idx {
        // Checkpoint is the maximum: already current.
        return Ok(Vec::new());
    }

    let range = sorted[start_idx..=stop_idx].to_vec();

    // Postcondition: first element immediately follows the checkpoint (or is
    // the global minimum), last element is the stop. Trivially true after the
    // slice above; a violation means duplicate or unsorted tags survived
    // ingestion.
    if let (Some(first), Some(last)) = (range.first(), range.last()) {
        if first.key() != sorted[start_idx].key() {
            return Err(RangeError::Invariant {
                detail: format!("range starts at {first}, expected {}", sorted[start_idx]),
            });
        }
        if last.key() != stop.key() {
            return Err(RangeError::Invariant {
                detail: format!("range ends at {last}, expected {stop}"),
            });
        }
    }

    Ok(range)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(tokens: &[&str]) -> Vec<Tag> {
        tokens.iter().map(|t| Tag::parse(t).unwrap()).collect()
    }

    #[test]
    fn no_checkpoint_starts_at_global_minimum() {
        let candidates = tags(&["v5.4.10", "v5.4.9", "v5.4.11"]);
        let range = resolve(&candidates, None).unwrap();
        let tokens: Vec<_> = range.iter().map(Tag::token).collect();
        assert_eq!(tokens, vec!["v5.4.9", "v5.4.10", "v5.4.11"]);
    }

    #[test]
    fn checkpoint_excluded_from_range() {
        let candidates = tags(&["v5.4.9", "v5.4.10", "v5.4.11"]);
        let cp = Tag::parse("v5.4.9").unwrap();
        let range = resolve(&candidates, Some(&cp)).unwrap();
        let tokens: Vec<_> = range.iter().map(Tag::token).collect();
        assert_eq!(tokens, vec!["v5.4.10", "v5.4.11"]);
    }

    #[test]
    fn checkpoint_at_maximum_yields_empty_range() {
        let candidates = tags(&["v5.4.9", "v5.4.10"]);
        let cp = Tag::parse("v5.4.10").unwrap();
        let range = resolve(&candidates, Some(&cp)).unwrap();
        assert!(range.is_empty());
    }

    #[test]
    fn unknown_checkpoint_is_an_error() {
        let candidates = tags(&["v5.4.9", "v5.4.10"]);
        let cp = Tag::parse("v5.4.7").unwrap();
        let err = resolve(&candidates, Some(&cp)).unwrap_err();
        assert!(matches!(err, RangeError::UnknownCheckpoint { .. }));
    }

    #[test]
    fn empty_candidates_yield_empty_range() {
        let range = resolve(&[], None).unwrap();
        assert!(range.is_empty());
    }

    #[test]
    fn single_candidate_no_checkpoint() {
        let candidates = tags(&["v6.6.1"]);
        let range = resolve(&candidates, None).unwrap();
        assert_eq!(range.len(), 1);
        assert_eq!(range[0].token(), "v6.6.1");
    }

    #[test]
    fn duplicates_in_input_do_not_inflate_the_range() {
        let candidates = tags(&["v5.4.9", "v5.4.9", "v5.4.10"]);
        let cp = Tag::parse("v5.4.9").unwrap();
        let range = resolve(&candidates, Some(&cp)).unwrap();
        let tokens: Vec<_> = range.iter().map(Tag::token).collect();
        assert_eq!(tokens, vec!["v5.4.10"]);
    }
}
