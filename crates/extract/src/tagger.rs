//! Contract with the multilingual entity tagger, plus the rule-based tagger
//! shipped with the crate.
//!
//! The recognizer only needs tokenization, sentence boundaries, entity labels
//! and a head-of-token relation to walk subtrees; any tagger that can produce
//! a [`TaggedDoc`] plugs in behind [`EntityTagger`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;
use std::sync::Mutex;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::StartupDependencyError;
use crate::lexicon::LEGAL_SUFFIXES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Org,
    Misc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    /// Byte span in the tagged text.
    pub start: usize,
    pub end: usize,
    pub sentence: usize,
    /// Index of the governing token; a sentence root points at itself.
    pub head: usize,
    pub label: Option<EntityLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sentence {
    pub start: usize,
    pub end: usize,
    pub tokens: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default)]
pub struct TaggedDoc {
    text: String,
    tokens: Vec<Token>,
    sentences: Vec<Sentence>,
}

impl TaggedDoc {
    pub fn new(text: impl Into<String>, tokens: Vec<Token>, sentences: Vec<Sentence>) -> Self {
        Self {
            text: text.into(),
            tokens,
            sentences,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Text of the sentence governing `token`.
    pub fn sentence_text(&self, token: usize) -> &str {
        let sentence = &self.sentences[self.tokens[token].sentence];
        &self.text[sentence.start..sentence.end]
    }

    /// `token` and everything it governs, in text order.
    pub fn subtree(&self, token: usize) -> Vec<&Token> {
        let sentence = &self.sentences[self.tokens[token].sentence];
        sentence
            .tokens
            .clone()
            .filter(|&j| self.descends_from(j, token))
            .map(|j| &self.tokens[j])
            .collect()
    }

    pub fn entities(&self) -> Vec<Entity> {
        self.tokens
            .iter()
            .filter_map(|t| {
                t.label.map(|label| Entity {
                    text: t.text.clone(),
                    label,
                    start: t.start,
                    end: t.end,
                })
            })
            .collect()
    }

    fn descends_from(&self, mut j: usize, ancestor: usize) -> bool {
        // Bounded walk: a malformed head chain must not loop forever.
        for _ in 0..=self.tokens.len() {
            if j == ancestor {
                return true;
            }
            let head = self.tokens[j].head;
            if head == j {
                return false;
            }
            j = head;
        }
        false
    }
}

/// Shared, read-only tagger. Implementations must be safe for concurrent
/// inference; wrap anything that is not in [`SerializedTagger`].
pub trait EntityTagger: Send + Sync {
    fn model_id(&self) -> &str;
    fn tag(&self, text: &str) -> TaggedDoc;
}

/// A tagger that needs exclusive access while tagging.
pub trait EntityTaggerMut: Send {
    fn model_id(&self) -> &str;
    fn tag_mut(&mut self, text: &str) -> TaggedDoc;
}

/// Serializes calls into a non-thread-safe tagger through a mutex.
pub struct SerializedTagger<T> {
    model_id: String,
    inner: Mutex<T>,
}

impl<T: EntityTaggerMut> SerializedTagger<T> {
    pub fn new(tagger: T) -> Self {
        Self {
            model_id: tagger.model_id().to_string(),
            inner: Mutex::new(tagger),
        }
    }
}

impl<T: EntityTaggerMut> EntityTagger for SerializedTagger<T> {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn tag(&self, text: &str) -> TaggedDoc {
        // A panic in a previous call leaves the tagger itself usable.
        let mut tagger = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        tagger.tag_mut(text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// `"builtin"` or a path to a JSON model file.
    pub model: String,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            model: "builtin".to_string(),
        }
    }
}

/// Data the rule tagger runs on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaggerModel {
    pub id: String,
    pub legal_forms: Vec<String>,
    /// Tokens that end a clause inside a sentence.
    pub clause_breaks: Vec<String>,
}

impl TaggerModel {
    pub const BUILTIN_ID: &'static str = "xx_rules";

    pub fn builtin() -> Self {
        Self {
            id: Self::BUILTIN_ID.to_string(),
            legal_forms: LEGAL_SUFFIXES.iter().map(|s| s.to_string()).collect(),
            clause_breaks: [",", ";", ":", "(", ")", "—", "–"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn load(model: &str) -> Result<Self, StartupDependencyError> {
        if model == "builtin" || model == Self::BUILTIN_ID {
            return Ok(Self::builtin());
        }

        let missing = |reason: String| StartupDependencyError {
            model: model.to_string(),
            reason,
            hint: format!(
                "Install the tagger model file at '{}' or set tagger.model = \"builtin\"",
                model
            ),
        };

        let raw = std::fs::read_to_string(Path::new(model)).map_err(|e| missing(e.to_string()))?;
        let parsed: TaggerModel =
            serde_json::from_str(&raw).map_err(|e| missing(format!("invalid model file: {}", e)))?;

        if parsed.legal_forms.is_empty() {
            return Err(missing("model declares no legal forms".to_string()));
        }
        Ok(parsed)
    }
}

/// Regex and Unicode-segmentation tagger.
///
/// Entity spans (capitalized runs, legal forms, guillemet-quoted names) are
/// merged into single tokens. Each sentence is split into clauses at
/// punctuation; the clause's first entity (or first word) heads the clause,
/// and clause heads hang off the sentence root.
pub struct RuleTagger {
    model: TaggerModel,
    entity: Regex,
    legal_forms: HashSet<String>,
    clause_breaks: HashSet<String>,
    /// Legal forms ending in a dot (`Ltd.`), after which no sentence ends.
    abbreviations: Vec<String>,
}

impl RuleTagger {
    pub fn new(model: TaggerModel) -> Result<Self, StartupDependencyError> {
        let forms = model
            .legal_forms
            .iter()
            .map(|f| regex::escape(f).replace(' ', r"\s*"))
            .collect::<Vec<_>>()
            .join("|");
        let word = r"\p{Lu}[\p{L}\-]*\.?";
        let pattern = format!(
            r"(?:(?:\b(?:{forms})[ \t]+)?«[^»\n]{{1,200}}»|{word}(?:[ \t]+(?:{word}|&)|,[ \t]*(?:{forms}))+)(?:[ \t]*\([^)\n]{{1,200}}\))?"
        );

        let entity = Regex::new(&pattern).map_err(|e| StartupDependencyError {
            model: model.id.clone(),
            reason: e.to_string(),
            hint: "Check the legal_forms entries of the tagger model".to_string(),
        })?;

        let legal_forms = model
            .legal_forms
            .iter()
            .map(|f| f.to_lowercase().trim_end_matches('.').to_string())
            .collect();
        let clause_breaks = model.clause_breaks.iter().cloned().collect();
        let abbreviations = model
            .legal_forms
            .iter()
            .filter(|f| f.ends_with('.'))
            .cloned()
            .collect();

        tracing::info!(model = %model.id, "Entity tagger loaded");

        Ok(Self {
            model,
            entity,
            legal_forms,
            clause_breaks,
            abbreviations,
        })
    }

    pub fn load(config: &TaggerConfig) -> Result<Self, StartupDependencyError> {
        Self::new(TaggerModel::load(&config.model)?)
    }

    fn label_for(&self, span: &str) -> EntityLabel {
        let lower = span.to_lowercase();
        let has_form = self.legal_forms.iter().any(|f| f.contains(' ') && lower.contains(f.as_str()))
            || lower
                .split_whitespace()
                .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
                .any(|t| self.legal_forms.contains(t));

        if has_form || span.contains('«') {
            EntityLabel::Org
        } else {
            EntityLabel::Misc
        }
    }

    /// Sentence spans, with segments that end on a legal-form abbreviation
    /// joined to the segment that follows (`Ltd. (Latvia), hereinafter ...`).
    fn sentence_spans<'t>(&self, text: &'t str) -> Vec<(usize, &'t str)> {
        let mut spans = Vec::new();
        let mut pending: Option<usize> = None;

        for (start, segment) in text.split_sentence_bound_indices() {
            let begin = pending.take().unwrap_or(start);
            if self.ends_with_abbreviation(segment) {
                pending = Some(begin);
                continue;
            }
            spans.push((begin, &text[begin..start + segment.len()]));
        }
        if let Some(begin) = pending {
            spans.push((begin, &text[begin..]));
        }
        spans
    }

    fn ends_with_abbreviation(&self, segment: &str) -> bool {
        // A line break still ends the sentence.
        let trimmed = segment.trim_end_matches([' ', '\t']);
        self.abbreviations.iter().any(|form| {
            trimmed
                .strip_suffix(form.as_str())
                .is_some_and(|head| !head.chars().next_back().is_some_and(char::is_alphanumeric))
        })
    }

    fn tag_sentence(&self, base: usize, sentence: &str, index: usize, tokens: &mut Vec<Token>) {
        let spans: Vec<(usize, usize)> = self
            .entity
            .find_iter(sentence)
            .map(|m| (m.start(), m.end()))
            .collect();

        let mut next_span = 0;
        let mut skip_until = 0;

        for (offset, word) in sentence.split_word_bound_indices() {
            if word.trim().is_empty() || offset < skip_until {
                continue;
            }
            while next_span < spans.len() && spans[next_span].1 <= offset {
                next_span += 1;
            }

            if next_span < spans.len() && spans[next_span].0 <= offset {
                let (start, end) = spans[next_span];
                let text = &sentence[start..end];
                tokens.push(Token {
                    text: text.to_string(),
                    start: base + start,
                    end: base + end,
                    sentence: index,
                    head: tokens.len(),
                    label: Some(self.label_for(text)),
                });
                skip_until = end;
                next_span += 1;
            } else {
                tokens.push(Token {
                    text: word.to_string(),
                    start: base + offset,
                    end: base + offset + word.len(),
                    sentence: index,
                    head: tokens.len(),
                    label: None,
                });
            }
        }
    }

    fn attach_heads(&self, tokens: &mut [Token], range: Range<usize>) {
        let mut clauses: Vec<Range<usize>> = Vec::new();
        let mut start = range.start;
        for k in range.clone() {
            if self.clause_breaks.contains(&tokens[k].text) {
                clauses.push(start..k + 1);
                start = k + 1;
            }
        }
        if start < range.end {
            clauses.push(start..range.end);
        }

        let heads: Vec<usize> = clauses
            .iter()
            .map(|clause| {
                clause
                    .clone()
                    .find(|&k| tokens[k].label.is_some())
                    .or_else(|| {
                        clause
                            .clone()
                            .find(|&k| !self.clause_breaks.contains(&tokens[k].text))
                    })
                    .unwrap_or(clause.start)
            })
            .collect();

        let root_clause = clauses
            .iter()
            .position(|clause| clause.clone().any(|k| tokens[k].label.is_some()))
            .unwrap_or(0);
        let root = heads[root_clause];

        for (clause, &head) in clauses.iter().zip(&heads) {
            for k in clause.clone() {
                tokens[k].head = head;
            }
            tokens[head].head = root;
        }
    }
}

impl EntityTagger for RuleTagger {
    fn model_id(&self) -> &str {
        &self.model.id
    }

    fn tag(&self, text: &str) -> TaggedDoc {
        let mut tokens = Vec::new();
        let mut sentences = Vec::new();

        for (base, sentence) in self.sentence_spans(text) {
            let first = tokens.len();
            self.tag_sentence(base, sentence, sentences.len(), &mut tokens);
            if tokens.len() == first {
                continue;
            }

            let range = first..tokens.len();
            self.attach_heads(&mut tokens, range.clone());
            sentences.push(Sentence {
                start: tokens[first].start,
                end: tokens[range.end - 1].end,
                tokens: range,
            });
        }

        TaggedDoc::new(text, tokens, sentences)
    }
}
