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

//! Markup failure policy

use serde::{Deserialize, Serialize};

/// How a facade handles classification failures during markup.
///
/// Fixed at facade construction; it never varies per call within one
/// facade instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkupPolicy {
    /// Legacy escaping bridge; classification failures propagate to the
    /// caller.
    #[default]
    Strict,
    /// Legacy escaping bridge; classification-content failures are logged
    /// and the original input is returned unchanged. Filesystem and state
    /// errors still propagate.
    Degrading,
    /// No escaping: UTF-8 text goes to the engine as-is, relying on the
    /// engine being configured for UTF-8. Failures propagate as in
    /// [`MarkupPolicy::Strict`].
    Passthrough,
}

impl MarkupPolicy {
    /// Whether this policy routes text through the windows-1251 escaping
    /// bridge.
    pub fn uses_legacy_bridge(&self) -> bool {
        matches!(self, Self::Strict | Self::Degrading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bridge_selection() {
        assert!(MarkupPolicy::Strict.uses_legacy_bridge());
        assert!(MarkupPolicy::Degrading.uses_legacy_bridge());
        assert!(!MarkupPolicy::Passthrough.uses_legacy_bridge());
    }
}
