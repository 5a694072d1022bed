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

//! Qcolorize agent
//!
//! The public surface of the colorizer: a stateful facade that owns a
//! classification capability and gates every operation on the lifecycle
//! it enforces.
//!
//! ```text
//! Unconfigured --load_config--> Configured --init_markup--> Ready
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use qcolorize_agent::ColorizerAgent;
//! use qcolorize_core::MarkupPolicy;
//! use qcolorize_engine::PhraseTableEngine;
//!
//! let mut colorizer =
//!     ColorizerAgent::with_policy(PhraseTableEngine::new(), MarkupPolicy::Degrading);
//! colorizer.load_config("data/config.xml")?;
//! colorizer.init_markup()?;
//! let html = colorizer.markup("Слабительное")?;
//! # Ok::<(), qcolorize_core::ColorizeError>(())
//! ```
//!
//! All operations are blocking; call them from a context that tolerates
//! file and CPU work proportional to the index size and the input length.

pub mod agent;

// Re-exports
pub use agent::{ColorizerAgent, ColorizerState};
pub use qcolorize_core::{
    ClassificationCapability, ColorizeError, ColorizeResult, MarkupPolicy, PhraseMatch,
};
