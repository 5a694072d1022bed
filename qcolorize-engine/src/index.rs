// Copyright 2025 Qcolorize (https://github.com/qcolorize)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Phrase index: the on-disk table of classifiable phrases and its loaded,
//! searchable form.
//!
//! The index is a prebuilt artifact. Building it here is a plain table
//! ingest from configured source files; linguistic index construction is
//! the engine vendor's concern, not this crate's.

use crate::config::XmlConfig;
use qcolorize_core::{ColorizeError, ColorizeResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Index format version; an index written by a different version refuses
/// to load.
pub const INDEX_VERSION: u32 = 10;

/// Prefix of configuration sections describing phrase classes.
pub const CLASS_SECTION_PREFIX: &str = "QC";

/// On-disk phrase index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseIndex {
    /// Format version, always [`INDEX_VERSION`] for indexes we write
    pub version: u32,
    /// Phrase classes
    pub classes: Vec<PhraseClass>,
}

/// One phrase class of the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseClass {
    /// Class name
    pub name: String,
    /// Markup format for phrases of this class without their own user data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Phrases of this class
    pub phrases: Vec<PhraseEntry>,
}

/// One phrase of a class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseEntry {
    /// Origin phrase text
    pub text: String,
    /// Per-phrase user data (markup format or substitution value)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub udata: Option<String>,
    /// Phrase rank
    #[serde(default)]
    pub rank: u32,
}

impl PhraseIndex {
    /// Empty index at the current format version.
    pub fn new() -> Self {
        Self {
            version: INDEX_VERSION,
            classes: Vec::new(),
        }
    }

    /// Load an index file.
    pub fn load(path: &Path) -> ColorizeResult<Self> {
        let data = fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ColorizeError::missing_file(path)
            } else {
                ColorizeError::Io(err)
            }
        })?;
        let index: Self = serde_json::from_str(&data).map_err(|err| {
            ColorizeError::InvalidConfig(format!("malformed phrase index: {err}"))
        })?;
        if index.version != INDEX_VERSION {
            return Err(ColorizeError::InvalidConfig(format!(
                "phrase index version {} unsupported, expected {INDEX_VERSION}",
                index.version
            )));
        }
        Ok(index)
    }

    /// Write the index to `path`.
    pub fn save(&self, path: &Path) -> ColorizeResult<()> {
        let data = serde_json::to_string_pretty(self).map_err(|err| {
            ColorizeError::InvalidConfig(format!("unserializable phrase index: {err}"))
        })?;
        fs::write(path, data)?;
        Ok(())
    }

    /// Build an index from the `QC*` class sections of a configuration:
    /// each section names a `Phrases` source file of
    /// `phrase[TAB]udata[TAB]rank` lines, plus optional `Format` and
    /// default `Rank` values.
    pub fn build_by_config(cfg: &XmlConfig) -> ColorizeResult<Self> {
        let mut index = Self::new();

        for section in cfg.sections_with_prefix(CLASS_SECTION_PREFIX) {
            let name = section[CLASS_SECTION_PREFIX.len()..].to_owned();
            let source = cfg.get_str(section, "Phrases").ok_or_else(|| {
                ColorizeError::InvalidConfig(format!(
                    "class section {section} has no Phrases source"
                ))
            })?;
            let default_rank = cfg.get_int(section, "Rank", 0).max(0) as u32;
            let format = cfg.get_str(section, "Format").map(str::to_owned);

            let mut class = PhraseClass {
                name,
                format,
                phrases: Vec::new(),
            };
            let lines = fs::read_to_string(source).map_err(|err| {
                if err.kind() == std::io::ErrorKind::NotFound {
                    ColorizeError::missing_file(source)
                } else {
                    ColorizeError::Io(err)
                }
            })?;
            for line in lines.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                let mut fields = line.split('\t');
                let text = fields.next().unwrap_or_default().trim().to_owned();
                let udata = fields
                    .next()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(str::to_owned);
                let rank = fields
                    .next()
                    .and_then(|r| r.trim().parse().ok())
                    .unwrap_or(default_rank);
                class.phrases.push(PhraseEntry { text, udata, rank });
            }
            index.classes.push(class);
        }

        Ok(index)
    }
}

impl Default for PhraseIndex {
    fn default() -> Self {
        Self::new()
    }
}

/// Class metadata of a loaded table.
#[derive(Debug, Clone)]
pub struct ClassInfo {
    /// Class name
    pub name: String,
    /// Class-level markup format
    pub format: Option<String>,
}

/// One searchable entry of a loaded table.
#[derive(Debug, Clone)]
pub struct TableEntry {
    /// Index of the owning class
    pub class: usize,
    /// Origin phrase text as it appeared in the index
    pub origin: String,
    /// Per-phrase user data
    pub udata: Option<String>,
    /// Phrase rank
    pub rank: u32,
}

/// Loaded, searchable phrase table.
#[derive(Debug)]
pub struct PhraseTable {
    classes: Vec<ClassInfo>,
    entries: Vec<TableEntry>,
    by_key: HashMap<String, Vec<usize>>,
    max_words: usize,
}

impl PhraseTable {
    /// Build the searchable table from an index.
    pub fn from_index(index: &PhraseIndex) -> Self {
        let mut table = Self {
            classes: Vec::with_capacity(index.classes.len()),
            entries: Vec::new(),
            by_key: HashMap::new(),
            max_words: 0,
        };

        for class in &index.classes {
            let class_id = table.classes.len();
            table.classes.push(ClassInfo {
                name: class.name.clone(),
                format: class.format.clone(),
            });
            for phrase in &class.phrases {
                let key = Self::normalize(&phrase.text);
                if key.is_empty() {
                    continue;
                }
                let entry_id = table.entries.len();
                table.entries.push(TableEntry {
                    class: class_id,
                    origin: phrase.text.clone(),
                    udata: phrase.udata.clone(),
                    rank: phrase.rank,
                });
                table.max_words = table.max_words.max(key.split(' ').count());
                table.by_key.entry(key).or_default().push(entry_id);
            }
        }

        table
    }

    /// Canonical lookup key: case-folded, whitespace-collapsed.
    pub fn normalize(text: &str) -> String {
        text.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Entry ids matching a normalized key.
    pub fn lookup(&self, key: &str) -> &[usize] {
        self.by_key.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Entry by id.
    pub fn entry(&self, id: usize) -> &TableEntry {
        &self.entries[id]
    }

    /// Class metadata by id.
    pub fn class_info(&self, id: usize) -> &ClassInfo {
        &self.classes[id]
    }

    /// Longest phrase length in words.
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table holds no phrases.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_index() -> PhraseIndex {
        PhraseIndex {
            version: INDEX_VERSION,
            classes: vec![PhraseClass {
                name: "A06".into(),
                format: None,
                phrases: vec![PhraseEntry {
                    text: "Слабительное".into(),
                    udata: Some("<a href=\"/drug/rubric/A06/\">%P</a>".into()),
                    rank: 100,
                }],
            }],
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phrases.idx");
        sample_index().save(&path).unwrap();

        let loaded = PhraseIndex::load(&path).unwrap();
        assert_eq!(loaded.version, INDEX_VERSION);
        assert_eq!(loaded.classes.len(), 1);
        assert_eq!(loaded.classes[0].phrases[0].rank, 100);
    }

    #[test]
    fn test_load_missing_index() {
        let err = PhraseIndex::load(Path::new("/nonexistent/phrases.idx")).unwrap_err();
        assert!(matches!(err, ColorizeError::MissingFile { .. }));
    }

    #[test]
    fn test_version_gate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("phrases.idx");
        let mut index = sample_index();
        index.version = 9;
        std::fs::write(&path, serde_json::to_string(&index).unwrap()).unwrap();

        let err = PhraseIndex::load(&path).unwrap_err();
        assert!(matches!(err, ColorizeError::InvalidConfig(_)));
    }

    #[test]
    fn test_build_by_config() {
        let dir = tempfile::tempdir().unwrap();
        let phrases = dir.path().join("drugs.txt");
        let mut f = std::fs::File::create(&phrases).unwrap();
        writeln!(f, "# comment").unwrap();
        writeln!(f, "слабительное\t<a href=\"/drug/rubric/A06/\">%P</a>\t100").unwrap();
        writeln!(f, "аспирин").unwrap();
        drop(f);

        let cfg = XmlConfig::parse(&format!(
            "<Config><QCdrugs><Phrases>{}</Phrases><Rank>5</Rank></QCdrugs></Config>",
            phrases.display()
        ))
        .unwrap();
        let index = PhraseIndex::build_by_config(&cfg).unwrap();
        assert_eq!(index.classes.len(), 1);
        assert_eq!(index.classes[0].name, "drugs");
        assert_eq!(index.classes[0].phrases.len(), 2);
        assert_eq!(index.classes[0].phrases[0].rank, 100);
        // default rank from the section
        assert_eq!(index.classes[0].phrases[1].rank, 5);
    }

    #[test]
    fn test_build_requires_phrase_source() {
        let cfg = XmlConfig::parse("<Config><QCdrugs><Rank>5</Rank></QCdrugs></Config>").unwrap();
        assert!(matches!(
            PhraseIndex::build_by_config(&cfg).unwrap_err(),
            ColorizeError::InvalidConfig(_)
        ));
    }

    #[test]
    fn test_table_lookup_is_case_folded() {
        let table = PhraseTable::from_index(&sample_index());
        assert_eq!(table.lookup(&PhraseTable::normalize("СЛАБИТЕЛЬНОЕ")).len(), 1);
        assert_eq!(table.lookup("слабительное").len(), 1);
        assert!(table.lookup("аспирин").is_empty());
        assert_eq!(table.max_words(), 1);
    }
}
