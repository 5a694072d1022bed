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

//! Classification capability contract
//!
//! The classification/markup engine is an external collaborator with a
//! fixed method set; the facade composes a capability handle rather than
//! inheriting from an engine type, so test doubles and alternative engines
//! plug in freely.

use crate::error::ColorizeResult;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A single phrase classification: qualifier class name and match rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseMatch {
    /// Name of the matching phrase class
    pub class_name: String,
    /// Rank of the match within that class
    pub rank: u32,
}

/// Contract of the classification/markup engine.
///
/// `markup` consumes and produces bytes in the engine's working encoding
/// (legacy windows-1251 or UTF-8, depending on engine configuration);
/// translating caller text into that encoding is the facade's job, never
/// the caller's.
pub trait ClassificationCapability {
    /// Engine/index format version.
    fn version(&self) -> u32;

    /// Path of the phrase index file the current configuration refers to.
    fn index_file_name(&self) -> String;

    /// Load and validate the configuration document at `path`.
    fn load_config(&mut self, path: &Path) -> ColorizeResult<()>;

    /// Heavyweight initialization: load the phrase index and markup
    /// settings into memory.
    fn init_markup(&mut self) -> ColorizeResult<()>;

    /// Mark up `input`, returning bytes in the same encoding.
    fn markup(&self, input: &[u8]) -> ColorizeResult<Vec<u8>>;

    /// Classify a phrase against the loaded index.
    fn classify_phrase(&self, phrase: &str) -> ColorizeResult<Vec<PhraseMatch>>;

    /// Canonical form of a single word.
    fn first_form(&self, word: &str) -> ColorizeResult<String>;

    /// Build the phrase index from configured sources and write it to the
    /// index file.
    fn index_to_file(&self) -> ColorizeResult<()>;
}

/// Shared-capability deployment shape.
///
/// A single engine instance (its index can be large) may back several
/// facades through `Arc<Mutex<_>>`; the lock serializes capability calls,
/// which is the caller's opt-in — facades themselves never lock.
impl<C: ClassificationCapability> ClassificationCapability for Arc<Mutex<C>> {
    fn version(&self) -> u32 {
        self.lock().version()
    }

    fn index_file_name(&self) -> String {
        self.lock().index_file_name()
    }

    fn load_config(&mut self, path: &Path) -> ColorizeResult<()> {
        self.lock().load_config(path)
    }

    fn init_markup(&mut self) -> ColorizeResult<()> {
        self.lock().init_markup()
    }

    fn markup(&self, input: &[u8]) -> ColorizeResult<Vec<u8>> {
        self.lock().markup(input)
    }

    fn classify_phrase(&self, phrase: &str) -> ColorizeResult<Vec<PhraseMatch>> {
        self.lock().classify_phrase(phrase)
    }

    fn first_form(&self, word: &str) -> ColorizeResult<String> {
        self.lock().first_form(word)
    }

    fn index_to_file(&self) -> ColorizeResult<()> {
        self.lock().index_to_file()
    }
}
