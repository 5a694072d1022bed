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

//! HTML marker: wraps recognized phrases of a text in link-style markup.
//!
//! Matching is window-based over the word sequence of the text. Words
//! inside tags and inside existing `<a>` anchors never participate, so
//! already-linked content is not linked twice.

use crate::index::PhraseTable;
use crate::settings::{MarkupSettings, SortOrder};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Markup format used when a phrase has neither user data nor a class
/// format.
const DEFAULT_MARKUP_FORMAT: &str = "<a href=\"/search?q=%O\">%P</a>";

#[derive(Debug, Clone, Copy)]
struct Word {
    start: usize,
    end: usize,
    sentence_start: bool,
}

#[derive(Debug, Clone, Copy)]
struct MatchInfo {
    offset: usize,
    len: usize,
    entry: usize,
    first_word: usize,
    nwords: usize,
    rank: u32,
    freq: u32,
}

/// Phrase marker over a loaded table.
pub struct HtmlMarker<'t> {
    table: &'t PhraseTable,
    settings: &'t MarkupSettings,
}

impl<'t> HtmlMarker<'t> {
    pub fn new(table: &'t PhraseTable, settings: &'t MarkupSettings) -> Self {
        Self { table, settings }
    }

    /// Mark up `text`, returning the annotated text and the number of
    /// marked blocks.
    pub fn markup(&self, text: &str) -> (String, usize) {
        if self.table.is_empty() {
            return (text.to_owned(), 0);
        }

        let words = scan_words(text);
        let mut matches = self.find_matches(text, &words);
        self.reorder(&mut matches);
        let selected = self.select(&matches, words.len());
        debug!(
            words = words.len(),
            matched = matches.len(),
            marked = selected.len(),
            "phrase selection done"
        );
        self.assemble(text, selected)
    }

    fn find_matches(&self, text: &str, words: &[Word]) -> Vec<MatchInfo> {
        let range = self.settings.range.min(self.table.max_words()).max(1);
        let mut matches = Vec::new();

        for first in 0..words.len() {
            if self.settings.skip_first_word && words[first].sentence_start {
                continue;
            }
            let mut key = String::new();
            for nwords in 1..=range {
                let Some(last) = words.get(first + nwords - 1) else {
                    break;
                };
                if nwords > 1 {
                    key.push(' ');
                }
                key.push_str(&text[last.start..last.end].to_lowercase());

                for &entry in self.table.lookup(&key) {
                    matches.push(MatchInfo {
                        offset: words[first].start,
                        len: last.end - words[first].start,
                        entry,
                        first_word: first,
                        nwords,
                        rank: self.table.entry(entry).rank,
                        freq: 0,
                    });
                }
            }
        }

        matches
    }

    fn reorder(&self, matches: &mut [MatchInfo]) {
        match self.settings.order {
            SortOrder::Native => {}
            SortOrder::RankAsc => matches.sort_by_key(|m| m.rank),
            SortOrder::RankDesc => matches.sort_by_key(|m| std::cmp::Reverse(m.rank)),
            SortOrder::FreqAsc | SortOrder::FreqDesc => {
                let mut counts: HashMap<usize, u32> = HashMap::new();
                for m in matches.iter() {
                    *counts.entry(m.entry).or_default() += 1;
                }
                for m in matches.iter_mut() {
                    m.freq = counts[&m.entry];
                }
                if self.settings.order == SortOrder::FreqAsc {
                    matches.sort_by_key(|m| m.freq);
                } else {
                    matches.sort_by_key(|m| std::cmp::Reverse(m.freq));
                }
            }
        }
    }

    fn select(&self, matches: &[MatchInfo], nwords: usize) -> Vec<MatchInfo> {
        let mut marked = vec![false; nwords];
        let mut seen: HashSet<usize> = HashSet::new();
        let mut selected: Vec<MatchInfo> = Vec::new();

        for m in matches {
            if self.settings.limit > 0 && selected.len() >= self.settings.limit {
                break;
            }
            if self.settings.uniq && seen.contains(&m.entry) {
                continue;
            }
            let span = m.first_word..m.first_word + m.nwords;
            if marked[span.clone()].iter().any(|&w| w) {
                continue;
            }
            if self.settings.gap > 0 && self.too_close(m, &selected) {
                continue;
            }

            for w in &mut marked[span] {
                *w = true;
            }
            if self.settings.uniq {
                seen.insert(m.entry);
            }
            selected.push(*m);
        }

        selected
    }

    fn too_close(&self, m: &MatchInfo, selected: &[MatchInfo]) -> bool {
        let first = m.first_word;
        let last = m.first_word + m.nwords - 1;
        selected.iter().any(|s| {
            let s_first = s.first_word;
            let s_last = s.first_word + s.nwords - 1;
            if s_last < first {
                first - s_last <= self.settings.gap
            } else if s_first > last {
                s_first - last <= self.settings.gap
            } else {
                true
            }
        })
    }

    fn assemble(&self, text: &str, mut selected: Vec<MatchInfo>) -> (String, usize) {
        selected.sort_by_key(|m| m.offset);

        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        let mut count = 0;
        for m in &selected {
            let Some(wrapped) = self.expand_format(text, m) else {
                continue;
            };
            out.push_str(&text[pos..m.offset]);
            out.push_str(&wrapped);
            pos = m.offset + m.len;
            count += 1;
        }
        out.push_str(&text[pos..]);
        (out, count)
    }

    /// Expand the markup format for a match. `%P` is the matched text,
    /// `%O` the origin phrase, `%U` the user data; any other `%x` stays
    /// literal. `None` means the format cannot be satisfied and the match
    /// is left unwrapped.
    fn expand_format(&self, text: &str, m: &MatchInfo) -> Option<String> {
        let entry = self.table.entry(m.entry);
        let class = self.table.class_info(entry.class);
        let matched = &text[m.offset..m.offset + m.len];
        let udata = entry.udata.as_deref();

        let udata_is_format = self.settings.use_udata_as_format && udata.is_some();
        let format = if udata_is_format {
            udata.unwrap_or(DEFAULT_MARKUP_FORMAT)
        } else {
            class.format.as_deref().unwrap_or(DEFAULT_MARKUP_FORMAT)
        };

        let mut out = String::with_capacity(format.len() + matched.len());
        let mut chars = format.chars();
        while let Some(ch) = chars.next() {
            if ch != '%' {
                out.push(ch);
                continue;
            }
            match chars.next() {
                Some('P') => out.push_str(matched),
                Some('O') => out.push_str(&entry.origin),
                Some('U') => {
                    // the format cannot refer to itself
                    if udata_is_format {
                        return None;
                    }
                    out.push_str(udata?);
                }
                Some(other) => {
                    out.push('%');
                    out.push(other);
                }
                None => out.push('%'),
            }
        }
        Some(out)
    }
}

/// Extract markable words: maximal alphanumeric runs outside tags and
/// outside existing anchors, with sentence-start tracking.
fn scan_words(text: &str) -> Vec<Word> {
    let mut words = Vec::new();
    let mut in_tag = false;
    let mut in_anchor = false;
    let mut sentence_start = true;
    let mut current: Option<usize> = None;

    let mut flush = |current: &mut Option<usize>, end: usize, sentence_start: &mut bool| {
        if let Some(start) = current.take() {
            words.push(Word {
                start,
                end,
                sentence_start: *sentence_start,
            });
            *sentence_start = false;
        }
    };

    for (i, ch) in text.char_indices() {
        if in_tag {
            if ch == '>' {
                in_tag = false;
            }
            continue;
        }
        if ch == '<' {
            flush(&mut current, i, &mut sentence_start);
            in_tag = true;

            let rest = &text[i + ch.len_utf8()..];
            let closer = rest.starts_with('/');
            let name: String = rest
                .trim_start_matches('/')
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric())
                .collect();
            if name.eq_ignore_ascii_case("a") {
                in_anchor = !closer;
            }
            continue;
        }
        if in_anchor {
            continue;
        }
        if ch.is_alphanumeric() {
            if current.is_none() {
                current = Some(i);
            }
        } else {
            flush(&mut current, i, &mut sentence_start);
            if matches!(ch, '.' | '!' | '?') {
                sentence_start = true;
            }
        }
    }
    flush(&mut current, text.len(), &mut sentence_start);

    words
}
