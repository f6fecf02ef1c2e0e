use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::FieldExtractionError;
use crate::normalizer::{CandidateRefiner, unique_order};
use crate::placeholder::PlaceholderScanner;
use crate::recognizer::CandidateRecognizer;
use crate::schema::{FieldSet, OrganizationReport};
use crate::tagger::EntityTagger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// `{field}` tokens in the template text.
    Placeholders,
    /// Organization names with role/context, plus dates.
    Organizations,
}

/// One way of turning document text into fields.
pub trait FieldStrategy: Send + Sync {
    fn extract(&self, text: &str) -> Result<FieldSet, FieldExtractionError>;
}

#[derive(Default)]
pub struct PlaceholderStrategy {
    scanner: PlaceholderScanner,
}

impl FieldStrategy for PlaceholderStrategy {
    fn extract(&self, text: &str) -> Result<FieldSet, FieldExtractionError> {
        Ok(FieldSet::Placeholders {
            fields: self.scanner.scan(text),
        })
    }
}

pub struct OrganizationStrategy {
    recognizer: CandidateRecognizer,
    refiner: CandidateRefiner,
    tagger: Arc<dyn EntityTagger>,
}

impl OrganizationStrategy {
    pub fn new(
        recognizer: CandidateRecognizer,
        refiner: CandidateRefiner,
        tagger: Arc<dyn EntityTagger>,
    ) -> Self {
        Self {
            recognizer,
            refiner,
            tagger,
        }
    }

    pub fn extract_report(&self, text: &str) -> OrganizationReport {
        // Step 1: raw candidates, line by line
        let raw = self.recognizer.recognize(text);

        // Step 2: filter + dedupe
        let refined = self.refiner.refine(&raw.org_names());
        for skipped in &refined.skipped {
            if let Some(source) = raw.orgs.iter().find(|c| c.text == skipped.candidate) {
                tracing::debug!(
                    candidate = %skipped.candidate,
                    line = source.line,
                    line_text = %source.line_text,
                    reason = ?skipped.reason,
                    "Org candidate skipped"
                );
            }
        }

        // Step 3: role/context from the tagger
        let doc = self.tagger.tag(text);
        let organizations = refined
            .kept
            .iter()
            .map(|org| self.recognizer.annotate(&doc, org))
            .collect();

        OrganizationReport {
            organizations,
            dates: unique_order(&raw.dates),
            skipped: refined.skipped,
        }
    }
}

impl FieldStrategy for OrganizationStrategy {
    fn extract(&self, text: &str) -> Result<FieldSet, FieldExtractionError> {
        Ok(FieldSet::Organizations(self.extract_report(text)))
    }
}
