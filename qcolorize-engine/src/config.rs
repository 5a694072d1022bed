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

//! XML configuration document
//!
//! The schema is strictly section → name → text: a root `Config` element,
//! one level of section elements, one level of named values. Tag pairing
//! is the parser's problem; depth beyond two is a configuration error.

use qcolorize_core::{ColorizeError, ColorizeResult};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

type Section = HashMap<String, String>;

/// Parsed configuration document.
#[derive(Debug, Clone, Default)]
pub struct XmlConfig {
    sections: HashMap<String, Section>,
}

impl XmlConfig {
    /// Load and parse the configuration document at `path`.
    pub fn load(path: &Path) -> ColorizeResult<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                ColorizeError::missing_file(path)
            } else {
                ColorizeError::Io(err)
            }
        })?;
        Self::parse(&text)
    }

    /// Parse a configuration document from a string.
    pub fn parse(xml: &str) -> ColorizeResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().check_end_names = true;
        let mut sections: HashMap<String, Section> = HashMap::new();
        let mut stack: Vec<String> = Vec::new();
        let mut root_found = false;
        let mut cur_text = String::new();

        loop {
            match reader.read_event() {
                Err(err) => {
                    return Err(ColorizeError::InvalidConfig(format!(
                        "error parsing xml config: {err}"
                    )))
                }
                Ok(Event::Eof) => break,
                Ok(Event::Start(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match stack.len() {
                        0 => {
                            if !name.eq_ignore_ascii_case("config") {
                                return Err(ColorizeError::InvalidConfig(
                                    "root config-section must be called `Config'".into(),
                                ));
                            }
                            root_found = true;
                        }
                        1 => {
                            sections.entry(name.clone()).or_default();
                        }
                        2 => cur_text.clear(),
                        _ => {
                            return Err(ColorizeError::InvalidConfig(
                                "only section:name schema is supported (max depth 2)".into(),
                            ))
                        }
                    }
                    stack.push(name);
                }
                Ok(Event::Empty(e)) => {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    match stack.len() {
                        0 => {
                            if !name.eq_ignore_ascii_case("config") {
                                return Err(ColorizeError::InvalidConfig(
                                    "root config-section must be called `Config'".into(),
                                ));
                            }
                            root_found = true;
                        }
                        1 => {
                            sections.entry(name).or_default();
                        }
                        2 => {
                            sections
                                .entry(stack[1].clone())
                                .or_default()
                                .insert(name, String::new());
                        }
                        _ => {}
                    }
                }
                Ok(Event::Text(e)) => {
                    if stack.len() == 3 {
                        let text = e.unescape().map_err(|err| {
                            ColorizeError::InvalidConfig(format!(
                                "error parsing xml config: {err}"
                            ))
                        })?;
                        cur_text.push_str(&text);
                    }
                }
                Ok(Event::End(_)) => {
                    if stack.len() == 3 {
                        let name = stack.pop().unwrap_or_default();
                        sections
                            .entry(stack[1].clone())
                            .or_default()
                            .insert(name, cur_text.trim().to_owned());
                        cur_text.clear();
                    } else {
                        stack.pop();
                    }
                }
                Ok(_) => {}
            }
        }

        if !root_found {
            return Err(ColorizeError::InvalidConfig(
                "root config-section must be called `Config'".into(),
            ));
        }

        Ok(Self { sections })
    }

    /// String value, if present.
    pub fn get_str(&self, section: &str, name: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(name))
            .map(String::as_str)
    }

    /// String value with a default.
    pub fn get_str_or(&self, section: &str, name: &str, default: &str) -> String {
        self.get_str(section, name).unwrap_or(default).to_owned()
    }

    /// Integer value; missing or unparsable values yield the default.
    pub fn get_int(&self, section: &str, name: &str, default: i64) -> i64 {
        self.get_str(section, name)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Floating point value; missing or unparsable values yield the default.
    pub fn get_double(&self, section: &str, name: &str, default: f64) -> f64 {
        self.get_str(section, name)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Boolean value; accepts yes/no, true/false, on/off, 1/0 in any case.
    pub fn get_bool(&self, section: &str, name: &str, default: bool) -> bool {
        match self.get_str(section, name) {
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "yes" | "true" | "on" | "1" => true,
                "no" | "false" | "off" | "0" => false,
                _ => default,
            },
            None => default,
        }
    }

    /// Names of sections starting with `prefix`, sorted.
    pub fn sections_with_prefix(&self, prefix: &str) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .sections
            .keys()
            .filter(|name| name.starts_with(prefix))
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}
