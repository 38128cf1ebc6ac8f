//! Line-preserving env file store
//!
//! The demo keeps its state in a `KEY="VALUE"` env file next to the working directory.
//! [`EnvStore`] loads it once, serves reads from memory and writes the whole file back
//! on every change. Lines it does not touch (comments, blank lines, other entries) are
//! written back byte-for-byte; updated entries are written as `KEY="VALUE"`.

use crate::domain::errors::OrderflowError;
use crate::domain::result::Result;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    /// Comment, blank or unparseable line, kept verbatim
    Verbatim(String),
    Entry {
        key: String,
        value: String,
        raw: String,
    },
}

impl Line {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Line::Verbatim(raw.to_string());
        }
        match trimmed.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Line::Entry {
                key: key.trim().to_string(),
                value: unquote(value.trim()).to_string(),
                raw: raw.to_string(),
            },
            _ => Line::Verbatim(raw.to_string()),
        }
    }

    fn raw(&self) -> &str {
        match self {
            Line::Verbatim(raw) | Line::Entry { raw, .. } => raw,
        }
    }
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn render_entry(key: &str, value: &str) -> String {
    format!("{key}=\"{value}\"")
}

/// Split off the line terminator, `""` for a final line without one
fn split_ending(segment: &str) -> (&str, &'static str) {
    if let Some(content) = segment.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = segment.strip_suffix('\n') {
        (content, "\n")
    } else {
        (segment, "")
    }
}

/// In-memory view of the env file with write-through persistence
#[derive(Debug, Clone)]
pub struct EnvStore {
    path: PathBuf,
    /// Each line with its own terminator
    lines: Vec<(Line, &'static str)>,
    /// Terminator for appended lines, taken from the first line of the file
    line_ending: &'static str,
}

impl EnvStore {
    /// Load the env file, creating it from `template` when it does not exist yet
    ///
    /// When created from the template, comment and blank lines are copied verbatim and
    /// every entry is written with an empty value.
    pub fn load_or_create(path: impl AsRef<Path>, template: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let template = template.as_ref();

        if path.exists() {
            return Self::load(path);
        }

        if !template.exists() {
            return Err(OrderflowError::Configuration(format!(
                "Neither {} nor the template {} exists",
                path.display(),
                template.display()
            )));
        }

        let contents = fs::read_to_string(template).map_err(|e| {
            OrderflowError::Configuration(format!(
                "Failed to read env template {}: {e}",
                template.display()
            ))
        })?;

        let mut store = Self::parse(path, &contents);
        for (line, _) in &mut store.lines {
            if let Line::Entry { key, value, raw } = line {
                value.clear();
                *raw = render_entry(key, "");
            }
        }
        store.save()?;

        tracing::info!(
            path = %path.display(),
            template = %template.display(),
            "Created env file from template"
        );

        Ok(store)
    }

    /// Load an existing env file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            OrderflowError::Configuration(format!(
                "Failed to read env file {}: {e}",
                path.display()
            ))
        })?;
        Ok(Self::parse(path, &contents))
    }

    fn parse(path: &Path, contents: &str) -> Self {
        let lines: Vec<(Line, &'static str)> = contents
            .split_inclusive('\n')
            .map(|segment| {
                let (content, ending) = split_ending(segment);
                (Line::parse(content), ending)
            })
            .collect();
        let line_ending = match lines.first() {
            Some((_, "\r\n")) => "\r\n",
            _ => "\n",
        };

        Self {
            path: path.to_path_buf(),
            lines,
            line_ending,
        }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw value of a variable, if it has an entry
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|(line, _)| match line {
            Line::Entry { key: k, value, .. } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Non-blank value of a variable
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// Whether a variable has a non-blank value
    pub fn is_set(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Non-blank value or a configuration error naming the variable
    pub fn require(&self, key: &str) -> Result<&str> {
        self.value(key).ok_or_else(|| {
            OrderflowError::Configuration(format!(
                "{key} is not set in {}",
                self.path.display()
            ))
        })
    }

    /// Update (or append) a variable and write the file immediately
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let rendered = render_entry(key, value);
        let existing = self.lines.iter_mut().find_map(|(line, _)| match line {
            Line::Entry {
                key: k,
                value: v,
                raw,
            } if k == key => Some((v, raw)),
            _ => None,
        });

        match existing {
            Some((v, raw)) => {
                *v = value.to_string();
                *raw = rendered;
            }
            None => {
                if let Some((_, ending)) = self.lines.last_mut() {
                    if ending.is_empty() {
                        *ending = self.line_ending;
                    }
                }
                let entry = Line::Entry {
                    key: key.to_string(),
                    value: value.to_string(),
                    raw: rendered,
                };
                self.lines.push((entry, self.line_ending));
            }
        }

        self.save()?;
        tracing::debug!(key = %key, path = %self.path.display(), "Updated env file");
        Ok(())
    }

    /// File contents as they would be written
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .flat_map(|(line, ending)| [line.raw(), *ending])
            .collect()
    }

    /// Write the file back
    pub fn save(&self) -> Result<()> {
        fs::write(&self.path, self.render()).map_err(|e| {
            OrderflowError::Io(format!(
                "Failed to write env file {}: {e}",
                self.path.display()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(contents: &str) -> EnvStore {
        EnvStore::parse(Path::new("unused.env"), contents)
    }

    #[test]
    fn test_unquote_variants() {
        assert_eq!(unquote("\"a b\""), "a b");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    fn test_parse_reads_values() {
        let store = parsed("# comment\nA=\"1\"\nB = 'two'\n\nC=3\n");
        assert_eq!(store.get("A"), Some("1"));
        assert_eq!(store.get("B"), Some("two"));
        assert_eq!(store.get("C"), Some("3"));
        assert_eq!(store.get("D"), None);
    }

    #[test]
    fn test_blank_values_are_not_set() {
        let store = parsed("A=\"\"\nB=\"  \"\n");
        assert!(!store.is_set("A"));
        assert!(!store.is_set("B"));
        assert!(store.require("A").is_err());
    }

    #[test]
    fn test_render_reproduces_input() {
        for input in [
            "# header\n\nA=\"1\"\nB=2\n",
            "A=1",
            "A=1\r\nB='2'\r\n",
            "A=\"1\"\nB=\"2\"\r\n",
            "# crlf\r\nA=1\nB=2",
            "",
            "\n",
            "\n\n# only comments\n",
        ] {
            assert_eq!(parsed(input).render(), input);
        }
    }

    #[test]
    fn test_mixed_line_endings_keep_entries_apart() {
        let store = parsed("A=\"1\"\nB=\"2\"\r\nC=3\n");
        assert_eq!(store.get("A"), Some("1"));
        assert_eq!(store.get("B"), Some("2"));
        assert_eq!(store.get("C"), Some("3"));
    }
}
