//! Investigation-level metadata read from an IDF.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A value drawn from a controlled vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlledTerm {
    /// Term value, e.g. "journal_article".
    pub value: String,
    /// Term source the value comes from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_source: Option<String>,
    /// Accession of the term within its source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accession: Option<String>,
}

impl ControlledTerm {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            term_source: None,
            accession: None,
        }
    }

    pub fn with_term_source(mut self, source: impl Into<String>) -> Self {
        self.term_source = Some(source.into());
        self
    }

    pub fn with_accession(mut self, accession: impl Into<String>) -> Self {
        self.accession = Some(accession.into());
        self
    }
}

/// A `Comment[name]` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub name: String,
    pub value: String,
}

impl Comment {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A publication describing the experiment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pubmed_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ControlledTerm>,
}

/// A sample sheet (SDRF) named by the IDF.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleSheetReference {
    /// Path or URI exactly as written in the IDF.
    pub path: PathBuf,
}

impl SampleSheetReference {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// One submission's investigation-level metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigation {
    pub title: Option<String>,
    pub description: Option<String>,
    pub experimental_factors: Vec<String>,
    pub comments: Vec<Comment>,
    pub publications: Vec<Publication>,
    pub sample_sheets: Vec<SampleSheetReference>,
}

impl Investigation {
    /// First value of the named comment.
    pub fn comment(&self, name: &str) -> Option<&str> {
        self.comments
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// All values of the named comment.
    pub fn comments_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.comments
            .iter()
            .filter(move |c| c.name == name)
            .map(|c| c.value.as_str())
    }

    /// Set a comment, replacing the value of an existing comment with that name.
    pub fn set_comment(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.comments.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.value = value,
            None => self.comments.push(Comment::new(name, value)),
        }
    }
}
