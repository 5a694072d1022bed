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

//! Marker settings loaded from the `HtmlMarker` configuration section.

use crate::config::XmlConfig;
use qcolorize_core::{ColorizeError, ColorizeResult};
use serde::{Deserialize, Serialize};

/// Order in which matched phrases are considered for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    /// Text order
    #[default]
    Native,
    /// Ascending phrase rank
    RankAsc,
    /// Descending phrase rank
    RankDesc,
    /// Ascending occurrence count
    FreqAsc,
    /// Descending occurrence count
    FreqDesc,
}

impl SortOrder {
    /// Parse the one-letter configuration code.
    pub fn from_code(code: &str) -> ColorizeResult<Self> {
        match code.chars().next() {
            Some('N') => Ok(Self::Native),
            Some('r') => Ok(Self::RankAsc),
            Some('R') => Ok(Self::RankDesc),
            Some('f') => Ok(Self::FreqAsc),
            Some('F') => Ok(Self::FreqDesc),
            _ => Err(ColorizeError::InvalidConfig(format!(
                "unknown sort order value: {code:?}"
            ))),
        }
    }
}

/// Markup behavior knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkupSettings {
    /// Selection order
    pub order: SortOrder,
    /// Search phrases of 1..=range words
    pub range: usize,
    /// Preserve this many words between selections
    pub gap: usize,
    /// Limit of phrases to mark, 0 = unlimited
    pub limit: usize,
    /// Mark each distinct phrase only once
    pub uniq: bool,
    /// Never mark a phrase starting at the first word of a sentence
    pub skip_first_word: bool,
    /// Use a phrase's user data as its markup format string
    pub use_udata_as_format: bool,
}

impl Default for MarkupSettings {
    fn default() -> Self {
        Self {
            order: SortOrder::Native,
            range: 5,
            gap: 0,
            limit: 0,
            uniq: false,
            skip_first_word: false,
            use_udata_as_format: true,
        }
    }
}

impl MarkupSettings {
    /// Read settings from the `HtmlMarker` section, falling back to the
    /// defaults for absent values.
    pub fn from_config(cfg: &XmlConfig) -> ColorizeResult<Self> {
        let def = Self::default();
        let sec = "HtmlMarker";

        let order = match cfg.get_str(sec, "SortOrder") {
            Some(code) => SortOrder::from_code(code)?,
            None => def.order,
        };

        Ok(Self {
            order,
            range: cfg.get_int(sec, "MaxPhraseSize", def.range as i64).max(1) as usize,
            gap: cfg.get_int(sec, "Gap", def.gap as i64).max(0) as usize,
            limit: cfg.get_int(sec, "Limit", def.limit as i64).max(0) as usize,
            uniq: cfg.get_bool(sec, "Uniq", def.uniq),
            skip_first_word: cfg.get_bool(sec, "SkipFirstWord", def.skip_first_word),
            use_udata_as_format: cfg.get_bool(sec, "UseUdataAsFormat", def.use_udata_as_format),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let st = MarkupSettings::default();
        assert_eq!(st.order, SortOrder::Native);
        assert_eq!(st.range, 5);
        assert_eq!(st.gap, 0);
        assert_eq!(st.limit, 0);
        assert!(!st.uniq);
        assert!(!st.skip_first_word);
        assert!(st.use_udata_as_format);
    }

    #[test]
    fn test_from_config() {
        let cfg = XmlConfig::parse(
            "<Config><HtmlMarker>\
             <MaxPhraseSize>2</MaxPhraseSize>\
             <Gap>1</Gap>\
             <Limit>10</Limit>\
             <Uniq>yes</Uniq>\
             <SortOrder>R</SortOrder>\
             </HtmlMarker></Config>",
        )
        .unwrap();
        let st = MarkupSettings::from_config(&cfg).unwrap();
        assert_eq!(st.range, 2);
        assert_eq!(st.gap, 1);
        assert_eq!(st.limit, 10);
        assert!(st.uniq);
        assert_eq!(st.order, SortOrder::RankDesc);
    }

    #[test]
    fn test_bad_sort_order() {
        let cfg = XmlConfig::parse(
            "<Config><HtmlMarker><SortOrder>X</SortOrder></HtmlMarker></Config>",
        )
        .unwrap();
        assert!(MarkupSettings::from_config(&cfg).is_err());
    }

    #[test]
    fn test_missing_section_yields_defaults() {
        let cfg = XmlConfig::parse("<Config><QueryQualifier><Quiet>no</Quiet></QueryQualifier></Config>").unwrap();
        let st = MarkupSettings::from_config(&cfg).unwrap();
        assert_eq!(st.range, MarkupSettings::default().range);
    }
}
