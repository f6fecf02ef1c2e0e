pub mod error;
pub mod lexicon;
pub mod normalizer;
pub mod patterns;
pub mod placeholder;
pub mod recognizer;
pub mod schema;
pub mod strategy;
pub mod tagger;

pub use error::{ExtractError, FieldExtractionError, StartupDependencyError};
pub use normalizer::{CandidateRefiner, RefinerConfig, normalize_org, unique_order};
pub use patterns::PatternLibrary;
pub use placeholder::PlaceholderScanner;
pub use recognizer::CandidateRecognizer;
pub use schema::{
    FieldSet, OrgCandidate, OrgDetails, OrganizationReport, RawCandidates, Refinement,
    RejectReason, Skipped,
};
pub use strategy::{FieldStrategy, OrganizationStrategy, PlaceholderStrategy, StrategyKind};
pub use tagger::{
    EntityTagger, EntityTaggerMut, RuleTagger, SerializedTagger, TaggedDoc, TaggerConfig,
    TaggerModel,
};

use ingest::{ContentType, RawDocument, TextOrder};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::io::{Read, Seek, SeekFrom};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub text_order: TextOrder,
    pub refiner: RefinerConfig,
    pub tagger: TaggerConfig,
}

/// An uploaded file: a readable, rewindable stream plus what the client said
/// it is.
pub struct Upload<R> {
    pub filename: String,
    pub content_type: Option<String>,
    pub reader: R,
}

impl<R: Read + Seek> Upload<R> {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, reader: R) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            reader,
        }
    }
}

/// Field extraction entry point. Built once at startup with the loaded tagger
/// and pattern library, then shared by every request.
pub struct ExtractionService {
    text_order: TextOrder,
    placeholders: PlaceholderStrategy,
    organizations: OrganizationStrategy,
}

impl ExtractionService {
    pub fn new(
        patterns: Arc<PatternLibrary>,
        tagger: Arc<dyn EntityTagger>,
        config: &ExtractionConfig,
    ) -> Self {
        let organizations = OrganizationStrategy::new(
            CandidateRecognizer::new(patterns.clone()),
            CandidateRefiner::new(patterns, config.refiner.clone()),
            tagger,
        );

        Self {
            text_order: config.text_order,
            placeholders: PlaceholderStrategy::default(),
            organizations,
        }
    }

    /// Builtin patterns and the tagger named in `config`.
    pub fn load(config: &ExtractionConfig) -> Result<Self, StartupDependencyError> {
        let tagger = RuleTagger::load(&config.tagger)?;
        Ok(Self::new(
            Arc::new(PatternLibrary::builtin()),
            Arc::new(tagger),
            config,
        ))
    }

    pub fn strategy(&self, kind: StrategyKind) -> &dyn FieldStrategy {
        match kind {
            StrategyKind::Placeholders => &self.placeholders,
            StrategyKind::Organizations => &self.organizations,
        }
    }

    /// Placeholder names found in the upload.
    pub fn extract_dynamic_fields<R: Read + Seek>(
        &self,
        upload: &mut Upload<R>,
    ) -> Result<Vec<String>, ExtractError> {
        match self.extract(StrategyKind::Placeholders, upload)? {
            FieldSet::Placeholders { fields } => Ok(fields),
            FieldSet::Organizations(_) => Err(FieldExtractionError::new(
                "placeholder strategy returned organizations",
            )
            .into()),
        }
    }

    pub fn extract_organizations<R: Read + Seek>(
        &self,
        upload: &mut Upload<R>,
    ) -> Result<OrganizationReport, ExtractError> {
        match self.extract(StrategyKind::Organizations, upload)? {
            FieldSet::Organizations(report) => Ok(report),
            FieldSet::Placeholders { .. } => Err(FieldExtractionError::new(
                "organization strategy returned placeholders",
            )
            .into()),
        }
    }

    /// Run one strategy over an upload. The upload is rewound to offset 0
    /// afterwards whether extraction succeeded, failed or panicked.
    pub fn extract<R: Read + Seek>(
        &self,
        kind: StrategyKind,
        upload: &mut Upload<R>,
    ) -> Result<FieldSet, ExtractError> {
        let started = Instant::now();
        tracing::debug!(
            filename = %upload.filename,
            content_type = ?upload.content_type,
            strategy = ?kind,
            "Starting field extraction"
        );

        let mut size = 0;
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.read_and_extract(kind, upload, &mut size)
        }))
        .unwrap_or_else(|panic| Err(FieldExtractionError::new(panic_message(panic.as_ref())).into()));
        let rewind = upload.reader.seek(SeekFrom::Start(0));

        match (result, rewind) {
            (Ok(fields), Ok(_)) => {
                tracing::info!(
                    filename = %upload.filename,
                    bytes = size,
                    fields = fields.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Extracted fields from document"
                );
                Ok(fields)
            }
            (Ok(_), Err(e)) => {
                tracing::error!(filename = %upload.filename, error = %e, "Failed to rewind upload");
                Err(FieldExtractionError::new(format!("failed to rewind upload: {}", e)).into())
            }
            (Err(e), _) => {
                tracing::error!(
                    filename = %upload.filename,
                    bytes = size,
                    error = %e,
                    "Error during field extraction"
                );
                Err(e)
            }
        }
    }

    /// Run one strategy over text that has already been extracted.
    pub fn extract_from_text(
        &self,
        kind: StrategyKind,
        text: &str,
    ) -> Result<FieldSet, FieldExtractionError> {
        let strategy = self.strategy(kind);
        catch_unwind(AssertUnwindSafe(|| strategy.extract(text)))
            .unwrap_or_else(|panic| Err(FieldExtractionError::new(panic_message(panic.as_ref()))))
    }

    fn read_and_extract<R: Read + Seek>(
        &self,
        kind: StrategyKind,
        upload: &mut Upload<R>,
        size: &mut usize,
    ) -> Result<FieldSet, ExtractError> {
        let mut bytes = Vec::new();
        upload.reader.seek(SeekFrom::Start(0))?;
        upload.reader.read_to_end(&mut bytes)?;
        *size = bytes.len();
        tracing::debug!(filename = %upload.filename, bytes = bytes.len(), "Upload read");

        let content_type = ContentType::detect(upload.content_type.as_deref(), &upload.filename);
        let document = RawDocument::new(upload.filename.clone(), content_type, bytes);
        let text = ingest::extract_text(&document, self.text_order)?.text();
        tracing::debug!(chars = text.chars().count(), "Text extracted from document");

        Ok(self.strategy(kind).extract(&text)?)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "extraction panicked".to_string())
}
