use serde::{Deserialize, Serialize};

/// A raw organization-name match and the line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgCandidate {
    pub text: String,
    pub line: usize,
    pub line_text: String,
}

/// Unfiltered recognizer output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCandidates {
    pub orgs: Vec<OrgCandidate>,
    pub dates: Vec<String>,
}

impl RawCandidates {
    pub fn org_names(&self) -> Vec<String> {
        self.orgs.iter().map(|c| c.text.clone()).collect()
    }
}

/// Organization name with its role and sentence context, either of which may
/// be empty when the tagger found no anchor for the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgDetails {
    pub name: String,
    pub role: String,
    pub context: String,
}

impl OrgDetails {
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: String::new(),
            context: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    Empty,
    TooShort { chars: usize },
    NoLetters,
    Stopword { word: String },
    ExcludedPhrase { phrase: String },
    ClauseIndicator { word: String },
    NotAnOrganization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skipped {
    pub candidate: String,
    pub reason: RejectReason,
}

/// Refiner output: the clean list plus what was dropped and why.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refinement {
    pub kept: Vec<String>,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationReport {
    pub organizations: Vec<OrgDetails>,
    pub dates: Vec<String>,
    pub skipped: Vec<Skipped>,
}

/// Result of one extraction strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum FieldSet {
    Placeholders { fields: Vec<String> },
    Organizations(OrganizationReport),
}

impl FieldSet {
    /// Number of extracted items, for logging and metrics.
    pub fn len(&self) -> usize {
        match self {
            FieldSet::Placeholders { fields } => fields.len(),
            FieldSet::Organizations(report) => report.organizations.len() + report.dates.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn skipped(&self) -> usize {
        match self {
            FieldSet::Placeholders { .. } => 0,
            FieldSet::Organizations(report) => report.skipped.len(),
        }
    }
}
