use regex::Regex;
use std::collections::HashSet;

use crate::lexicon::{self, LEGAL_PREFIXES, LEGAL_SUFFIXES, Lexicon};

const UPPER: &str = "A-ZА-ЯЁ";
const LETTERS: &str = "A-Za-zА-Яа-яЁё";

/// Compiled, locale-keyed recognition data: date and organization regexes
/// plus the stoplists the refiner filters with.
///
/// Built from a set of [`Lexicon`]s so adding a locale never touches the
/// recognizer or refiner.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    date: Regex,
    orgs: Vec<Regex>,
    letter: Regex,
    clause_indicator: Option<Regex>,
    stopwords: HashSet<String>,
    excluded_phrases: Vec<String>,
    word_suffixes: HashSet<String>,
    phrase_suffixes: Vec<String>,
    roles: Vec<&'static [&'static str]>,
}

impl PatternLibrary {
    /// English + Russian contract vocabulary.
    pub fn builtin() -> Self {
        Self::from_lexicons(&[&lexicon::EN, &lexicon::RU])
            .expect("built-in patterns are valid regexes")
    }

    pub fn from_lexicons(lexicons: &[&Lexicon]) -> Result<Self, regex::Error> {
        let months = alternation(lexicons.iter().flat_map(|l| l.months.iter().copied()));
        let date = Regex::new(&format!(
            r"(?i)\b\d{{1,2}}[./-]\d{{1,2}}[./-]\d{{2,4}}\b|\b\d{{4}}[-/]\d{{1,2}}[-/]\d{{1,2}}\b|(?:«\d{{1,2}}»|\b\d{{1,2}})\s+(?:{months})\s+\d{{4}}\b|\b(?:{months})\s+\d{{1,2}},\s+\d{{4}}\b"
        ))?;

        let suffix = suffix_alternation(LEGAL_SUFFIXES);
        let prefix = alternation(LEGAL_PREFIXES.iter().copied());

        // Three or more capitalized words, optional legal form around them.
        let shape = Regex::new(&format!(
            r"(?:\b(?:{prefix})[ \t]+)?«?[{UPPER}][{LETTERS}]+(?:[ \t]+[{UPPER}][{LETTERS}]*){{2,}}»?(?:,?[ \t]*(?:{suffix}))?(?:[ \t]*\([^)\n]+\))?"
        ))?;
        // Shortest capitalized run that ends in a legal suffix.
        let suffix_anchored = Regex::new(&format!(
            r"(?:\bООО[ \t]+)?«?[{UPPER}][{LETTERS} \t«»]+?[ \t](?:{suffix})(?:[ \t]*\([^)\n]+\))?"
        ))?;
        // ООО «Ромашка»
        let quoted = Regex::new(&format!(r"\b(?:{prefix})[ \t]+«[^»\n]+»?"))?;

        let indicators: Vec<&str> = lexicons
            .iter()
            .flat_map(|l| l.clause_indicators.iter().copied())
            .collect();
        let clause_indicator = if indicators.is_empty() {
            None
        } else {
            Some(Regex::new(&format!(
                r"\b(?:{})\b",
                alternation(indicators.into_iter())
            ))?)
        };

        let mut word_suffixes = HashSet::new();
        let mut phrase_suffixes = Vec::new();
        for s in LEGAL_SUFFIXES {
            let lower = s.to_lowercase();
            if lower.contains(' ') {
                phrase_suffixes.push(lower);
            } else {
                word_suffixes.insert(lower.trim_end_matches('.').to_string());
            }
        }

        tracing::debug!(
            locales = ?lexicons.iter().map(|l| l.locale).collect::<Vec<_>>(),
            "Compiled pattern library"
        );

        Ok(Self {
            date,
            orgs: vec![shape, suffix_anchored, quoted],
            letter: Regex::new(&format!("[{LETTERS}]"))?,
            clause_indicator,
            stopwords: lexicons
                .iter()
                .flat_map(|l| l.stopwords.iter())
                .map(|w| w.to_lowercase())
                .collect(),
            excluded_phrases: lexicons
                .iter()
                .flat_map(|l| l.excluded_phrases.iter())
                .map(|p| p.to_lowercase())
                .collect(),
            word_suffixes,
            phrase_suffixes,
            roles: lexicons.iter().map(|l| l.roles).collect(),
        })
    }

    pub fn date_pattern(&self) -> &Regex {
        &self.date
    }

    pub fn org_patterns(&self) -> &[Regex] {
        &self.orgs
    }

    pub fn has_letter(&self, text: &str) -> bool {
        self.letter.is_match(text)
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(&word.to_lowercase())
    }

    /// First excluded phrase occurring in the lowercased candidate.
    pub fn excluded_phrase_in(&self, lower: &str) -> Option<&str> {
        self.excluded_phrases
            .iter()
            .find(|phrase| lower.contains(phrase.as_str()))
            .map(|p| p.as_str())
    }

    /// First clause-indicator word (whole word) in the lowercased candidate.
    pub fn clause_indicator_in<'t>(&self, lower: &'t str) -> Option<&'t str> {
        self.clause_indicator
            .as_ref()
            .and_then(|re| re.find(lower))
            .map(|m| m.as_str())
    }

    /// A legal form appears as its own token (`Ltd`, `Ltd.`, `«Ромашка» ООО`)
    /// or, for multi-word forms, anywhere in the candidate.
    pub fn has_legal_suffix(&self, candidate: &str) -> bool {
        let lower = candidate.to_lowercase();
        if self.phrase_suffixes.iter().any(|s| lower.contains(s.as_str())) {
            return true;
        }
        lower
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
            .any(|t| self.word_suffixes.contains(t))
    }

    /// Role keywords in lookup order, locale by locale.
    pub fn role_keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.roles.iter().flat_map(|roles| roles.iter().copied())
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Longest alternatives first so a short form never shadows a longer one.
fn alternation<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let mut words: Vec<&str> = words.collect();
    words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    words.dedup();
    words
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

fn suffix_alternation(suffixes: &[&str]) -> String {
    let mut suffixes: Vec<&str> = suffixes.to_vec();
    suffixes.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    suffixes
        .iter()
        .map(|s| {
            let mut pattern = regex::escape(s).replace(' ', r"\s*");
            if s.chars().last().is_some_and(char::is_alphanumeric) {
                pattern.push_str(r"\b");
            }
            pattern
        })
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(text: &str) -> Vec<String> {
        PatternLibrary::builtin()
            .date_pattern()
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_numeric_dates() {
        assert_eq!(dates("signed 05.03.2024 and 2024-03-05"), vec!["05.03.2024", "2024-03-05"]);
        assert_eq!(dates("on 1/2/24"), vec!["1/2/24"]);
    }

    #[test]
    fn test_month_name_dates() {
        assert_eq!(dates("dated 5 March 2024"), vec!["5 March 2024"]);
        assert_eq!(dates("dated Mar 5, 2024"), vec!["Mar 5, 2024"]);
        assert_eq!(dates("от 15 января 2024 г."), vec!["15 января 2024"]);
        assert_eq!(dates("от «15» января 2024 г."), vec!["«15» января 2024"]);
        assert_eq!(dates("1 МАЙ 2023"), vec!["1 МАЙ 2023"]);
    }

    #[test]
    fn test_org_shapes() {
        let lib = PatternLibrary::builtin();
        let first = |text: &str| -> Vec<String> {
            lib.org_patterns()
                .iter()
                .filter_map(|re| re.find(text).map(|m| m.as_str().to_string()))
                .collect()
        };

        let found = first("Supplier: Baltic Wood Agency Ltd. (Latvia)");
        assert!(found.contains(&"Baltic Wood Agency Ltd. (Latvia)".to_string()));

        let found = first("Поставщик ООО «Ромашка» в лице директора");
        assert!(found.contains(&"ООО «Ромашка»".to_string()));
    }

    #[test]
    fn test_legal_suffix_is_token_based() {
        let lib = PatternLibrary::builtin();
        assert!(lib.has_legal_suffix("Baltic Wood Agency Ltd"));
        assert!(lib.has_legal_suffix("«Ромашка» ООО"));
        assert!(lib.has_legal_suffix("Shenzhen Light Co., Ltd."));
        assert!(!lib.has_legal_suffix("Филипп Типов"));
    }

    #[test]
    fn test_clause_indicator_whole_word() {
        let lib = PatternLibrary::builtin();
        assert_eq!(lib.clause_indicator_in("поставка по договору"), Some("по"));
        assert_eq!(lib.clause_indicator_in("порт находка"), None);
    }

    #[test]
    fn test_excluded_phrases_are_lowercase() {
        let lib = PatternLibrary::builtin();
        assert_eq!(
            lib.excluded_phrase_in("chamber of commerce of latvia"),
            Some("chamber of commerce")
        );
    }
}
