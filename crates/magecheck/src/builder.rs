//! Default full-model builder.

use std::path::Path;

use indexmap::{IndexMap, IndexSet};

use crate::error::{MagetabError, Result};
use crate::input::{normalize_brackets, tag_key, IdfReader, Parser};
use crate::model::{ControlledTerm, FullAssay, FullModel, Investigation, ModelBuilder};

/// Builds a [`FullModel`] by re-reading the IDF and its sample sheets.
///
/// Sample sheet paths are resolved against the working directory, which the
/// pipeline points at the data directory for the duration of the call.
/// Unlike the naive reader, a sample sheet without an assay column is an error.
#[derive(Default)]
pub struct TabularModelBuilder {
    parser: Parser,
    idf: IdfReader,
}

impl TabularModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_assays(
        &self,
        path: &Path,
        assays: &mut IndexMap<String, Option<ControlledTerm>>,
    ) -> Result<()> {
        let mut rows = self.parser.read_rows(path)?.into_iter();
        let header = rows
            .next()
            .ok_or_else(|| MagetabError::parse(path, "file contains no header row"))?;

        let keys: Vec<String> = header.iter().map(|h| tag_key(&normalize_brackets(h))).collect();
        let assay_cols: Vec<usize> = keys
            .iter()
            .enumerate()
            .filter(|(_, k)| *k == "assayname" || *k == "hybridizationname")
            .map(|(i, _)| i)
            .collect();
        if assay_cols.is_empty() {
            return Err(MagetabError::parse(path, "no Assay Name column"));
        }
        let technology_col = keys.iter().position(|k| k == "technologytype");

        for row in rows {
            let technology = technology_col
                .and_then(|i| row.get(i))
                .map(|v| v.trim())
                .filter(|v| !v.is_empty());

            for &col in &assay_cols {
                let Some(name) = row.get(col).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
                    continue;
                };
                let term = assays.entry(name.to_string()).or_default();
                if term.is_none() {
                    *term = technology.map(ControlledTerm::new);
                }
            }
        }

        Ok(())
    }
}

impl ModelBuilder for TabularModelBuilder {
    fn build(&mut self, idf: &Path, investigation: &Investigation) -> Result<FullModel> {
        let parsed = self.idf.read(idf).map_err(full_parse)?;
        if parsed.sample_sheets.is_empty() {
            return Err(MagetabError::FullParse(format!(
                "{} names no SDRF file",
                idf.display()
            )));
        }

        let mut assays = IndexMap::new();
        for sheet in &parsed.sample_sheets {
            self.read_assays(&sheet.path, &mut assays).map_err(full_parse)?;
        }

        let terms: IndexSet<ControlledTerm> = assays.values().flatten().cloned().collect();
        log::debug!(
            "Full model: {} assay(s), {} technology term(s)",
            assays.len(),
            terms.len()
        );

        Ok(FullModel {
            investigation: investigation.clone(),
            assays: assays
                .into_iter()
                .map(|(name, technology_type)| FullAssay {
                    name,
                    technology_type,
                })
                .collect(),
            terms: terms.into_iter().collect(),
        })
    }
}

fn full_parse(e: MagetabError) -> MagetabError {
    match e {
        MagetabError::FullParse(_) => e,
        other => MagetabError::FullParse(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_build_from_sheets() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = dir.path().join("exp.sdrf.txt");
        fs::write(
            &sheet,
            "Source Name\tAssay Name\tTechnology Type\n\
             s1\ta1\tarray assay\n\
             s2\ta1\tarray assay\n\
             s3\ta2\t\n",
        )
        .unwrap();
        let idf = dir.path().join("exp.idf.txt");
        fs::write(
            &idf,
            format!("Investigation Title\tT\nSDRF File\t{}\n", sheet.display()),
        )
        .unwrap();

        let model = TabularModelBuilder::new()
            .build(&idf, &Investigation::default())
            .unwrap();

        assert_eq!(model.assays.len(), 2);
        assert_eq!(
            model.assays[0].technology_type,
            Some(ControlledTerm::new("array assay"))
        );
        assert_eq!(model.assays[1].technology_type, None);
        assert_eq!(model.terms, vec![ControlledTerm::new("array assay")]);
    }

    #[test]
    fn test_missing_assay_column() {
        let dir = tempfile::tempdir().unwrap();
        let sheet = dir.path().join("exp.sdrf.txt");
        fs::write(&sheet, "Source Name\tCharacteristics[organism]\ns1\tHomo sapiens\n").unwrap();
        let idf = dir.path().join("exp.idf.txt");
        fs::write(&idf, format!("SDRF File\t{}\n", sheet.display())).unwrap();

        let result = TabularModelBuilder::new().build(&idf, &Investigation::default());
        assert!(matches!(result, Err(MagetabError::FullParse(_))));
    }
}
