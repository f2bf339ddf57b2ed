//! Ordered reader for the `[Section]` / `key=value` text that map files are
//! written in. Only what map decoding needs: no escapes, no inheritance.

use indexmap::IndexMap;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct IniSection {
    name: String,
    entries: IndexMap<String, String>,
}

impl IniSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Value of `key`, or a config error naming this section.
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| Error::config(&self.name, key, "missing key"))
    }

    pub fn read_bool(&self, key: &str, default: bool) -> bool {
        self.get(key).and_then(parse_bool).unwrap_or(default)
    }

    /// Entries in declaration order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All values joined in declaration order (how packs are split over lines)
    pub fn concatenated_values(&self) -> String {
        self.entries.values().map(String::as_str).collect()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

#[derive(Debug, Clone, Default)]
pub struct IniFile {
    sections: IndexMap<String, IniSection>,
}

impl IniFile {
    pub fn parse(text: &str) -> Self {
        let mut sections: IndexMap<String, IniSection> = IndexMap::new();
        let mut current: Option<String> = None;

        for raw in text.lines() {
            let line = match raw.find(';') {
                Some(i) => &raw[..i],
                None => raw,
            }
            .trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix('[') {
                let name = rest.split(']').next().unwrap_or(rest).trim().to_string();
                sections
                    .entry(name.clone())
                    .or_insert_with(|| IniSection::new(name.clone()));
                current = Some(name);
                continue;
            }

            let Some(section) = current.as_ref().and_then(|n| sections.get_mut(n)) else {
                continue;
            };
            if let Some((key, value)) = line.split_once('=') {
                section.insert(key.trim(), value.trim());
            }
        }

        Self { sections }
    }

    /// Map files are not guaranteed to be UTF-8; invalid sequences are replaced.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(data))
    }

    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.get(name)
    }

    pub fn require_section(&self, name: &str) -> Result<&IniSection> {
        self.section(name)
            .ok_or_else(|| Error::config(name, "*", "missing section"))
    }

    pub fn read_string(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key)
    }

    pub fn read_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.section(section)
            .map(|s| s.read_bool(key, default))
            .unwrap_or(default)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn insert_section(&mut self, section: IniSection) {
        self.sections.insert(section.name.clone(), section);
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" => Some(true),
        "no" | "false" | "0" => Some(false),
        _ => None,
    }
}
