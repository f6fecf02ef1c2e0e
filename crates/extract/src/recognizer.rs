use std::sync::Arc;

use crate::normalizer::normalize_org;
use crate::patterns::PatternLibrary;
use crate::schema::{OrgCandidate, OrgDetails, RawCandidates};
use crate::tagger::TaggedDoc;

/// Applies the pattern library line by line and produces raw, unfiltered
/// organization and date candidates.
pub struct CandidateRecognizer {
    patterns: Arc<PatternLibrary>,
}

impl CandidateRecognizer {
    pub fn new(patterns: Arc<PatternLibrary>) -> Self {
        Self { patterns }
    }

    pub fn recognize(&self, text: &str) -> RawCandidates {
        let mut candidates = RawCandidates::default();

        for (line_no, line) in text.split('\n').enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            for pattern in self.patterns.org_patterns() {
                for m in pattern.find_iter(line) {
                    candidates.orgs.push(OrgCandidate {
                        text: normalize_org(m.as_str()),
                        line: line_no,
                        line_text: line.to_string(),
                    });
                }
            }

            for m in self.patterns.date_pattern().find_iter(line) {
                candidates.dates.push(m.as_str().to_string());
            }
        }

        tracing::debug!(
            orgs = candidates.orgs.len(),
            dates = candidates.dates.len(),
            "Recognized raw candidates"
        );
        candidates
    }

    /// Role and context for `org` from the first tagger token containing it.
    /// Both stay empty when no token contains the name.
    pub fn annotate(&self, doc: &TaggedDoc, org: &str) -> OrgDetails {
        let mut details = OrgDetails::bare(org);

        let Some(index) = doc.tokens().iter().position(|t| t.text.contains(org)) else {
            tracing::debug!(org = %org, "No tagger token contains org");
            return details;
        };

        let sentence = doc.sentence_text(index);
        if let Some(role) = self.patterns.role_keywords().find(|k| sentence.contains(k)) {
            details.role = role.to_string();
        }

        details.context = doc
            .subtree(index)
            .iter()
            .filter(|t| t.start != doc.tokens()[index].start && t.text != org)
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();

        tracing::debug!(org = %org, role = %details.role, "Annotated org");
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::{EntityTagger, RuleTagger, TaggerModel};

    fn recognizer() -> CandidateRecognizer {
        CandidateRecognizer::new(Arc::new(PatternLibrary::builtin()))
    }

    #[test]
    fn test_candidates_per_line() {
        let text = "CONTRACT No. 12 dated 05.03.2024\n\
                    Baltic Wood Agency Ltd. (Latvia), hereinafter the Supplier\n\
                    ООО «Ромашка», именуемое Покупатель, от 15 января 2024 г.";
        let raw = recognizer().recognize(text);

        let names = raw.org_names();
        assert!(names.contains(&"Baltic Wood Agency Ltd".to_string()));
        assert!(names.contains(&"Baltic Wood Agency Ltd. (Latvia)".to_string()));
        assert!(names.contains(&"ООО «Ромашка»".to_string()));
        assert_eq!(raw.dates, vec!["05.03.2024", "15 января 2024"]);

        let baltic = raw.orgs.iter().find(|c| c.text.starts_with("Baltic")).unwrap();
        assert_eq!(baltic.line, 1);
    }

    #[test]
    fn test_unterminated_quote_is_repaired() {
        let raw = recognizer().recognize("АО «Северная Лесная Компания");
        assert!(raw.org_names().contains(&"АО «Северная Лесная Компания»".to_string()));
    }

    #[test]
    fn test_annotate_role_and_context() {
        let text = "Baltic Wood Agency Ltd, hereinafter the Supplier, agrees to deliver.";
        let doc = RuleTagger::new(TaggerModel::builtin()).unwrap().tag(text);

        let details = recognizer().annotate(&doc, "Baltic Wood Agency Ltd");
        assert_eq!(details.role, "Supplier");
        assert!(details.context.starts_with(", hereinafter the Supplier"));
        assert!(!details.context.contains("Baltic"));
    }

    #[test]
    fn test_role_survives_parenthesised_country() {
        let line = "Baltic Wood Agency Ltd. (Latvia), hereinafter the Supplier, agrees.";
        let raw = recognizer().recognize(line);
        let doc = RuleTagger::new(TaggerModel::builtin()).unwrap().tag(line);

        for name in ["Baltic Wood Agency Ltd", "Baltic Wood Agency Ltd. (Latvia)"] {
            assert!(raw.org_names().contains(&name.to_string()));
            let details = recognizer().annotate(&doc, name);
            assert_eq!(details.role, "Supplier", "role for {}", name);
            assert!(details.context.contains("hereinafter"));
        }
    }

    #[test]
    fn test_annotate_without_anchor() {
        let doc = RuleTagger::new(TaggerModel::builtin()).unwrap().tag("nothing relevant here");
        let details = recognizer().annotate(&doc, "Baltic Wood Agency Ltd");
        assert_eq!(details, OrgDetails::bare("Baltic Wood Agency Ltd"));
    }
}
