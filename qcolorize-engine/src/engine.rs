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

//! In-process phrase-table engine
//!
//! Reference implementation of the classification capability contract. It
//! recognizes phrases by exact (case-folded) table lookup; linguistic
//! normalization beyond case folding is a vendor engine's concern.

use crate::config::XmlConfig;
use crate::index::{PhraseIndex, PhraseTable, INDEX_VERSION};
use crate::marker::HtmlMarker;
use crate::settings::MarkupSettings;
use parking_lot::RwLock;
use qcolorize_core::{
    encoding, ClassificationCapability, ColorizeError, ColorizeResult, PhraseMatch,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Index file used when the configuration names none.
const DEFAULT_INDEX_FILE: &str = "phrases.idx";

/// Working encoding of the engine's byte interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// Legacy single-byte encoding; foreign content arrives escaped
    #[default]
    Windows1251,
    /// 8-bit-clean UTF-8
    Utf8,
}

impl Charset {
    fn from_config(cfg: &XmlConfig) -> ColorizeResult<Self> {
        match cfg.get_str("QueryQualifier", "Charset") {
            None => Ok(Self::default()),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "windows-1251" | "cp1251" => Ok(Self::Windows1251),
                "utf-8" | "utf8" => Ok(Self::Utf8),
                other => Err(ColorizeError::InvalidConfig(format!(
                    "unknown charset: {other}"
                ))),
            },
        }
    }
}

/// Phrase-table classification engine.
///
/// The searcher is loaded lazily: classification works right after
/// [`load_config`](ClassificationCapability::load_config) provided the
/// index file exists, while
/// [`init_markup`](ClassificationCapability::init_markup) loads it
/// eagerly.
pub struct PhraseTableEngine {
    config: Option<XmlConfig>,
    charset: Charset,
    settings: MarkupSettings,
    searcher: RwLock<Option<Arc<PhraseTable>>>,
}

impl PhraseTableEngine {
    pub fn new() -> Self {
        Self {
            config: None,
            charset: Charset::default(),
            settings: MarkupSettings::default(),
            searcher: RwLock::new(None),
        }
    }

    /// Working encoding of the byte interface.
    pub fn charset(&self) -> Charset {
        self.charset
    }

    fn searcher(&self) -> ColorizeResult<Arc<PhraseTable>> {
        if let Some(table) = self.searcher.read().as_ref() {
            return Ok(Arc::clone(table));
        }
        let mut slot = self.searcher.write();
        if let Some(table) = slot.as_ref() {
            return Ok(Arc::clone(table));
        }
        if self.config.is_none() {
            return Err(ColorizeError::NotConfigured);
        }
        let index = PhraseIndex::load(Path::new(&self.index_file_name()))?;
        let table = Arc::new(PhraseTable::from_index(&index));
        debug!(phrases = table.len(), "phrase table loaded");
        *slot = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Input the engine can do nothing with: foreign-script content with
    /// not a single processable letter around it.
    fn check_supported(&self, text: &str) -> ColorizeResult<()> {
        let mut has_native = false;
        let mut has_foreign = false;
        for ch in text.chars() {
            if ch.is_alphabetic() {
                if encoding::is_representable(ch) {
                    has_native = true;
                } else {
                    has_foreign = true;
                }
            }
        }
        if !has_foreign {
            has_foreign = encoding::has_unrepresentable_references(text);
        }
        if has_foreign && !has_native {
            return Err(ColorizeError::UnsupportedText(
                "input contains no text in the engine charset".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PhraseTableEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassificationCapability for PhraseTableEngine {
    fn version(&self) -> u32 {
        INDEX_VERSION
    }

    fn index_file_name(&self) -> String {
        self.config
            .as_ref()
            .map(|cfg| cfg.get_str_or("QueryQualifier", "IndexFile", DEFAULT_INDEX_FILE))
            .unwrap_or_else(|| DEFAULT_INDEX_FILE.to_owned())
    }

    fn load_config(&mut self, path: &Path) -> ColorizeResult<()> {
        let cfg = XmlConfig::load(path)?;
        self.charset = Charset::from_config(&cfg)?;
        self.settings = MarkupSettings::from_config(&cfg)?;
        // a new configuration invalidates any loaded searcher
        *self.searcher.get_mut() = None;
        self.config = Some(cfg);
        debug!(path = %path.display(), "engine configuration loaded");
        Ok(())
    }

    fn init_markup(&mut self) -> ColorizeResult<()> {
        if self.config.is_none() {
            return Err(ColorizeError::NotConfigured);
        }
        let index = PhraseIndex::load(Path::new(&self.index_file_name()))?;
        let table = Arc::new(PhraseTable::from_index(&index));
        debug!(phrases = table.len(), "markup initialized");
        *self.searcher.get_mut() = Some(table);
        Ok(())
    }

    fn markup(&self, input: &[u8]) -> ColorizeResult<Vec<u8>> {
        let table = self.searcher()?;
        let text = match self.charset {
            Charset::Windows1251 => encoding::legacy_to_unicode(input),
            Charset::Utf8 => std::str::from_utf8(input)
                .map_err(|_| ColorizeError::UnsupportedText("input is not valid UTF-8".into()))?
                .to_owned(),
        };
        self.check_supported(&text)?;

        let marker = HtmlMarker::new(&table, &self.settings);
        let (out, marked) = marker.markup(&text);
        debug!(marked, "markup complete");

        Ok(match self.charset {
            Charset::Windows1251 => encoding::encode(&out),
            Charset::Utf8 => out.into_bytes(),
        })
    }

    fn classify_phrase(&self, phrase: &str) -> ColorizeResult<Vec<PhraseMatch>> {
        let table = self.searcher()?;
        let key = PhraseTable::normalize(phrase);

        let mut ranks: HashMap<&str, u32> = HashMap::new();
        for &entry in table.lookup(&key) {
            let entry = table.entry(entry);
            let class = table.class_info(entry.class);
            let rank = ranks.entry(class.name.as_str()).or_default();
            *rank = (*rank).max(entry.rank);
        }

        let mut matches: Vec<PhraseMatch> = ranks
            .into_iter()
            .map(|(class_name, rank)| PhraseMatch {
                class_name: class_name.to_owned(),
                rank,
            })
            .collect();
        matches.sort_by(|a, b| b.rank.cmp(&a.rank).then(a.class_name.cmp(&b.class_name)));
        Ok(matches)
    }

    fn first_form(&self, word: &str) -> ColorizeResult<String> {
        // canonical form without morphology: case-folded, trimmed
        Ok(word.trim().to_lowercase())
    }

    fn index_to_file(&self) -> ColorizeResult<()> {
        let Some(cfg) = self.config.as_ref() else {
            return Err(ColorizeError::NotConfigured);
        };
        let index = PhraseIndex::build_by_config(cfg)?;
        index.save(Path::new(&self.index_file_name()))?;
        *self.searcher.write() = Some(Arc::new(PhraseTable::from_index(&index)));
        debug!(classes = index.classes.len(), "index written");
        Ok(())
    }
}
