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

//! Qcolorize reference engine
//!
//! In-process implementation of the classification capability contract:
//!
//! - **XmlConfig**: section/name configuration document ([`config`])
//! - **Phrase index**: on-disk table plus its loaded searchable form
//!   ([`index`])
//! - **HtmlMarker**: link-style markup of recognized phrases ([`marker`])
//! - **PhraseTableEngine**: the capability gluing them together
//!   ([`engine`])
//!
//! Vendor engines with real linguistics plug into the same contract; this
//! one exists so the facade is exercisable end-to-end out of the box.

pub mod config;
pub mod engine;
pub mod index;
pub mod marker;
pub mod settings;

// Re-exports
pub use config::XmlConfig;
pub use engine::{Charset, PhraseTableEngine};
pub use index::{PhraseClass, PhraseEntry, PhraseIndex, PhraseTable, INDEX_VERSION};
pub use marker::HtmlMarker;
pub use settings::{MarkupSettings, SortOrder};
