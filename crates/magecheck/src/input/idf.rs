//! Naive IDF reader.
//!
//! Extracts the investigation fields the pipeline needs (title, description,
//! factors, comments, publications and SDRF references) without building the
//! full model. Tags are matched case-insensitively, ignoring whitespace.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{MagetabError, Result};
use crate::model::{Comment, ControlledTerm, Investigation, Publication, SampleSheetReference};

use super::parser::{bracket_qualifier, tag_key, Parser};

/// Tags that are valid in an IDF but not extracted here.
const OTHER_IDF_TAGS: &[&str] = &[
    "mage-tabversion",
    "dateofexperiment",
    "publicreleasedate",
    "experimentaldesign",
    "experimentaldesigntermsourceref",
    "experimentaldesigntermaccessionnumber",
    "experimentalfactortype",
    "experimentalfactortypetermsourceref",
    "experimentalfactortypetermaccessionnumber",
    "personlastname",
    "personfirstname",
    "personmidinitials",
    "personemail",
    "personphone",
    "personfax",
    "personaddress",
    "personaffiliation",
    "personroles",
    "personrolestermsourceref",
    "personrolestermaccessionnumber",
    "qualitycontroltype",
    "replicatetype",
    "normalizationtype",
    "protocolname",
    "protocoltype",
    "protocoltypetermsourceref",
    "protocoltypetermaccessionnumber",
    "protocoldescription",
    "protocolparameters",
    "protocolhardware",
    "protocolsoftware",
    "protocolcontact",
    "termsourcename",
    "termsourcefile",
    "termsourceversion",
];

/// Raw publication fields from one IDF column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicationFields {
    pub title: Option<String>,
    pub pubmed_id: Option<String>,
    pub doi: Option<String>,
    pub author_list: Option<String>,
    pub status: Option<String>,
    pub status_term_source: Option<String>,
    pub status_accession: Option<String>,
}

impl PublicationFields {
    /// Whether any field carries a value.
    pub fn is_populated(&self) -> bool {
        [
            &self.title,
            &self.pubmed_id,
            &self.doi,
            &self.author_list,
            &self.status,
            &self.status_term_source,
            &self.status_accession,
        ]
        .iter()
        .any(|f| f.is_some())
    }
}

/// Strategy turning publication fields into a [`Publication`].
pub trait PublicationBuilder {
    /// Build the publication in 1-based column `index`, or `None` to drop it.
    fn build(&self, fields: PublicationFields, index: usize) -> Option<Publication>;
}

/// Keeps every populated publication.
///
/// A publication without a title gets `"unknown <index>"`, so that later
/// required-field checks complain about the missing title rather than about
/// a missing publication.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPublicationBuilder;

impl PublicationBuilder for DefaultPublicationBuilder {
    fn build(&self, fields: PublicationFields, index: usize) -> Option<Publication> {
        if !fields.is_populated() {
            return None;
        }

        let status = fields.status.map(|value| ControlledTerm {
            value,
            term_source: fields.status_term_source,
            accession: fields.status_accession,
        });

        Some(Publication {
            title: fields.title.unwrap_or_else(|| format!("unknown {}", index)),
            pubmed_id: fields.pubmed_id,
            doi: fields.doi,
            author_list: fields.author_list,
            status,
        })
    }
}

/// Reads an IDF into an [`Investigation`].
pub struct IdfReader {
    parser: Parser,
    publications: Box<dyn PublicationBuilder>,
}

impl IdfReader {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            publications: Box::new(DefaultPublicationBuilder),
        }
    }

    /// Use a different publication strategy.
    pub fn with_publication_builder(mut self, builder: impl PublicationBuilder + 'static) -> Self {
        self.publications = Box::new(builder);
        self
    }

    /// Read the IDF at `path`.
    pub fn read(&self, path: &Path) -> Result<Investigation> {
        let rows = self.parser.read_rows(path)?;
        if rows.is_empty() {
            return Err(MagetabError::parse(path, "file contains no rows"));
        }

        let mut investigation = Investigation::default();
        let mut publication_rows: HashMap<String, Vec<Option<String>>> = HashMap::new();
        let mut recognised = 0usize;

        for row in &rows {
            let tag = row[0].as_str();
            let values: Vec<Option<String>> = row[1..].iter().map(|v| non_empty(v)).collect();
            let present = || values.iter().flatten().cloned();

            if let Some(name) = bracket_qualifier(tag, "comment") {
                recognised += 1;
                for value in present() {
                    investigation.comments.push(Comment::new(name, value));
                }
                continue;
            }

            let key = tag_key(tag);
            match key.as_str() {
                "investigationtitle" => {
                    recognised += 1;
                    set_once(path, &mut investigation.title, tag, present().next())?;
                }
                "experimentdescription" => {
                    recognised += 1;
                    set_once(path, &mut investigation.description, tag, present().next())?;
                }
                "experimentalfactorname" => {
                    recognised += 1;
                    investigation.experimental_factors.extend(present());
                }
                "sdrffile" => {
                    recognised += 1;
                    investigation
                        .sample_sheets
                        .extend(present().map(SampleSheetReference::new));
                }
                "pubmedid"
                | "publicationdoi"
                | "publicationauthorlist"
                | "publicationtitle"
                | "publicationstatus"
                | "publicationstatustermsourceref"
                | "publicationstatustermaccessionnumber" => {
                    recognised += 1;
                    if publication_rows.insert(key.clone(), values.clone()).is_some() {
                        return Err(MagetabError::parse(path, format!("duplicate tag '{}'", tag)));
                    }
                }
                k if OTHER_IDF_TAGS.contains(&k) => recognised += 1,
                _ => log::debug!("Ignoring unrecognised IDF tag '{}'", tag),
            }
        }

        if recognised == 0 {
            return Err(MagetabError::parse(path, "no IDF tags found"));
        }

        investigation.publications = self.build_publications(publication_rows);
        Ok(investigation)
    }

    fn build_publications(&self, rows: HashMap<String, Vec<Option<String>>>) -> Vec<Publication> {
        let count = rows.values().map(|v| v.len()).max().unwrap_or(0);
        let field = |key: &str, i: usize| rows.get(key).and_then(|v| v.get(i)).cloned().flatten();

        (0..count)
            .filter_map(|i| {
                let fields = PublicationFields {
                    title: field("publicationtitle", i),
                    pubmed_id: field("pubmedid", i),
                    doi: field("publicationdoi", i),
                    author_list: field("publicationauthorlist", i),
                    status: field("publicationstatus", i),
                    status_term_source: field("publicationstatustermsourceref", i),
                    status_accession: field("publicationstatustermaccessionnumber", i),
                };
                self.publications.build(fields, i + 1)
            })
            .collect()
    }
}

impl Default for IdfReader {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn set_once(path: &Path, slot: &mut Option<String>, tag: &str, value: Option<String>) -> Result<()> {
    if slot.is_some() && value.is_some() {
        return Err(MagetabError::parse(path, format!("duplicate tag '{}'", tag)));
    }
    if value.is_some() {
        *slot = value;
    }
    Ok(())
}
