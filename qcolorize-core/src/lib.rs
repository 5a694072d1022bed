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

//! Qcolorize core types
//!
//! Leaf crate shared by the colorizer facade and engine implementations:
//!
//! - **Error taxonomy**: typed error kinds callers pattern-match instead of
//!   catching broadly ([`ColorizeError`])
//! - **Encoding bridge**: total transcoding between Unicode text and the
//!   windows-1251 legacy bytes the engine consumes ([`encoding`])
//! - **Capability contract**: the fixed method set of the classification
//!   engine, held by composition ([`ClassificationCapability`])
//! - **Markup policy**: construction-time choice between strict,
//!   degrading and passthrough failure handling ([`MarkupPolicy`])

pub mod capability;
pub mod encoding;
pub mod error;
pub mod policy;

// Re-exports
pub use capability::{ClassificationCapability, PhraseMatch};
pub use error::{ColorizeError, ColorizeResult};
pub use policy::MarkupPolicy;
