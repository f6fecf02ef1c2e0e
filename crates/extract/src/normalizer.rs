use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::patterns::PatternLibrary;
use crate::schema::{Refinement, RejectReason, Skipped};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinerConfig {
    /// Shortest accepted candidate, in characters.
    pub min_length: usize,
    /// Similarity at or above which two candidates are the same organization.
    pub fuzzy_cutoff: f64,
}

impl Default for RefinerConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            fuzzy_cutoff: 0.95,
        }
    }
}

/// Trim, collapse line breaks, and close a guillemet the regex cut off.
pub fn normalize_org(candidate: &str) -> String {
    let mut cleaned = candidate
        .trim()
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ");
    if cleaned.contains('«') && !cleaned.contains('»') {
        cleaned.push('»');
    }
    cleaned
}

/// Comparison key for exact duplicates: quotes and case don't matter.
fn exact_key(candidate: &str) -> String {
    normalize_org(candidate)
        .to_lowercase()
        .replace(['«', '»'], "")
}

/// Trimmed, non-empty items in first-seen order.
pub fn unique_order<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut result = Vec::new();

    for item in items {
        let stripped = item.as_ref().trim();
        if stripped.is_empty() {
            tracing::debug!("unique_order skipping empty item");
            continue;
        }
        if seen.insert(stripped.to_string()) {
            result.push(stripped.to_string());
        }
    }

    result
}

/// Filters, normalizes and deduplicates organization candidates.
pub struct CandidateRefiner {
    patterns: Arc<PatternLibrary>,
    config: RefinerConfig,
}

impl CandidateRefiner {
    pub fn new(patterns: Arc<PatternLibrary>, config: RefinerConfig) -> Self {
        Self { patterns, config }
    }

    /// Normalized candidate if it looks like an organization name.
    pub fn validate(&self, candidate: &str) -> Result<String, RejectReason> {
        let cleaned = normalize_org(candidate);
        if cleaned.is_empty() {
            return Err(RejectReason::Empty);
        }

        let chars = cleaned.chars().count();
        if chars < self.config.min_length {
            return Err(RejectReason::TooShort { chars });
        }
        if !self.patterns.has_letter(&cleaned) {
            return Err(RejectReason::NoLetters);
        }

        let lower = cleaned.to_lowercase();
        let words: Vec<&str> = cleaned.split_whitespace().collect();

        if let Some(word) = words.iter().find(|w| self.patterns.is_stopword(w)) {
            return Err(RejectReason::Stopword {
                word: word.to_lowercase(),
            });
        }

        // Substring match also covers the phrase padded at either end.
        if let Some(phrase) = self.patterns.excluded_phrase_in(&lower) {
            return Err(RejectReason::ExcludedPhrase {
                phrase: phrase.to_string(),
            });
        }

        if let Some(word) = self.patterns.clause_indicator_in(&lower) {
            return Err(RejectReason::ClauseIndicator {
                word: word.to_string(),
            });
        }

        let capitalized = words
            .iter()
            .filter(|w| {
                w.chars().next().is_some_and(char::is_uppercase)
                    && w.chars().all(char::is_alphabetic)
            })
            .count();
        let is_proper_noun = words.len() >= 2 && capitalized >= 2;

        if !(self.patterns.has_legal_suffix(&cleaned) || is_proper_noun) {
            return Err(RejectReason::NotAnOrganization);
        }

        Ok(cleaned)
    }

    pub fn is_valid_org(&self, candidate: &str) -> bool {
        self.validate(candidate).is_ok()
    }

    /// Full refinement: validate, drop exact duplicates, collapse near
    /// duplicates, keep first-appearance order.
    pub fn refine<S: AsRef<str>>(&self, candidates: &[S]) -> Refinement {
        let mut valid = Vec::new();
        let mut skipped = Vec::new();

        for candidate in candidates {
            let candidate = candidate.as_ref();
            match self.validate(candidate) {
                Ok(cleaned) => valid.push(cleaned),
                Err(reason) => skipped.push(Skipped {
                    candidate: candidate.to_string(),
                    reason,
                }),
            }
        }

        let unique = self.deduplicate_exact(valid);
        let kept = unique_order(self.group_near_duplicates(unique));

        tracing::debug!(
            input = candidates.len(),
            kept = kept.len(),
            skipped = skipped.len(),
            "Refined org candidates"
        );

        Refinement { kept, skipped }
    }

    pub fn deduplicate_exact(&self, candidates: Vec<String>) -> Vec<String> {
        let mut seen = HashSet::new();
        candidates
            .into_iter()
            .filter(|c| seen.insert(exact_key(c)))
            .collect()
    }

    /// Clusters candidates whose similarity reaches the cutoff (transitively)
    /// and keeps the longest member of each cluster, earliest on ties, at the
    /// position of the cluster's first member.
    pub fn group_near_duplicates(&self, candidates: Vec<String>) -> Vec<String> {
        let n = candidates.len();
        let cutoff = self.config.fuzzy_cutoff;
        let lengths: Vec<usize> = candidates.iter().map(|c| c.chars().count()).collect();

        let mut by_length: Vec<usize> = (0..n).collect();
        by_length.sort_by_key(|&i| lengths[i]);

        let mut parent: Vec<usize> = (0..n).collect();

        for (pos, &i) in by_length.iter().enumerate() {
            for &j in &by_length[pos + 1..] {
                // Edit distance is at least the length gap, so once the
                // shorter/longer ratio falls under the cutoff no longer
                // candidate can match.
                if (lengths[i] as f64) < cutoff * lengths[j] as f64 {
                    break;
                }
                if strsim::normalized_levenshtein(&candidates[i], &candidates[j]) >= cutoff {
                    union(&mut parent, i, j);
                }
            }
        }

        // root -> (first member, best member)
        let mut clusters: HashMap<usize, (usize, usize)> = HashMap::new();
        for i in 0..n {
            let root = find(&mut parent, i);
            let entry = clusters.entry(root).or_insert((i, i));
            if lengths[i] > lengths[entry.1] {
                entry.1 = i;
            }
        }

        let mut resolved: Vec<(usize, usize)> = clusters.into_values().collect();
        resolved.sort_by_key(|&(first, _)| first);

        resolved
            .into_iter()
            .map(|(_, best)| candidates[best].clone())
            .collect()
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refiner() -> CandidateRefiner {
        CandidateRefiner::new(Arc::new(PatternLibrary::builtin()), RefinerConfig::default())
    }

    #[test]
    fn test_guillemet_repair() {
        assert_eq!(normalize_org("«Baltic Trading"), "«Baltic Trading»");
        assert_eq!(normalize_org("  «Baltic\nTrading»  "), "«Baltic Trading»");
    }

    #[test]
    fn test_suffix_and_proper_noun_acceptance() {
        let r = refiner();
        assert!(r.is_valid_org("Baltic Wood Agency Ltd"));
        assert!(r.is_valid_org("John Henry Smith"));
        assert!(r.is_valid_org("ООО «Ромашка»"));
        assert_eq!(r.validate("the quick fox"), Err(RejectReason::NotAnOrganization));
    }

    #[test]
    fn test_min_length_boundary() {
        let r = refiner();
        assert_eq!(r.validate("ABC Co"), Err(RejectReason::TooShort { chars: 6 }));
        assert_eq!(r.validate("Abc Def"), Err(RejectReason::TooShort { chars: 7 }));
        assert!(r.is_valid_org("Abc Defg"));
    }

    #[test]
    fn test_stopwords_phrases_and_clauses() {
        let r = refiner();
        assert_eq!(
            r.validate("Party Parties"),
            Err(RejectReason::Stopword { word: "party".into() })
        );
        assert!(matches!(
            r.validate("Hong Kong International Arbitration Centre"),
            Err(RejectReason::ExcludedPhrase { .. })
        ));
        assert_eq!(
            r.validate("Курсы Валюты Определяются Банком"),
            Err(RejectReason::ClauseIndicator { word: "курсы".into() })
        );
        assert_eq!(r.validate("12345678 90"), Err(RejectReason::NoLetters));
    }

    #[test]
    fn test_near_duplicates_collapse_to_first_of_equal_length() {
        let refined = refiner().refine(&["Baltic Wood Agency Ltd", "Baltic Wood Agensy Ltd"]);
        assert_eq!(refined.kept, vec!["Baltic Wood Agency Ltd"]);
    }

    #[test]
    fn test_longest_member_wins() {
        let refined = refiner().refine(&[
            "Nordic Timber Trading Ltd",
            "Some Other Company LLC",
            "Nordic Timber Trading Ltd.",
        ]);
        assert_eq!(
            refined.kept,
            vec!["Nordic Timber Trading Ltd.", "Some Other Company LLC"]
        );
    }

    #[test]
    fn test_exact_duplicates_ignore_case_and_quotes() {
        let refined = refiner().refine(&["ООО «Ромашка Плюс»", "ооо ромашка плюс", "ООО «Ромашка Плюс»"]);
        assert_eq!(refined.kept, vec!["ООО «Ромашка Плюс»"]);
    }

    #[test]
    fn test_refine_is_idempotent() {
        let input = [
            "Baltic Wood Agency Ltd",
            "Party Parties",
            "John Henry Smith",
            "«Nordic Timber Trading",
            "Baltic Wood Agensy Ltd",
            "Nordic Timber Trading Ltd",
            "the quick fox",
        ];
        let r = refiner();
        let once = r.refine(&input);
        let twice = r.refine(&once.kept);
        assert_eq!(once.kept, twice.kept);
        assert!(twice.skipped.is_empty());
    }

    #[test]
    fn test_rejections_are_reported() {
        let refined = refiner().refine(&["", "Party Parties", "John Henry Smith"]);
        assert_eq!(refined.kept, vec!["John Henry Smith"]);
        assert_eq!(refined.skipped.len(), 2);
        assert_eq!(refined.skipped[0].reason, RejectReason::Empty);
    }

    #[test]
    fn test_unique_order() {
        let items = vec![" a ", "b", "", "a", "c", "b"];
        assert_eq!(unique_order(items), vec!["a", "b", "c"]);
    }
}
