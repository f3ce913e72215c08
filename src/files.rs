//! Project file classification and the ordered file mapping.
//!
//! Classification is by case-sensitive filename suffix only — no content
//! sniffing. Both the pipeline and the assembler dispatch through the one
//! [`classify`] function so the two stages can never disagree about what a
//! file is.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Extension carried by component files that need transpilation.
pub const COMPONENT_EXT: &str = ".jsx";

/// Extension of the directly-executable counterpart.
pub const PLAIN_SCRIPT_EXT: &str = ".js";

/// Closed classification of a project file, decided by filename suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    /// Entry document shell (`.html`).
    Markup,
    /// Stylesheet (`.css`), inlined into the bundle head.
    Style,
    /// JSX component source (`.jsx`), must be transpiled before assembly.
    Component,
    /// Already-runnable script (`.js`).
    PlainScript,
    /// Anything else; carried in the raw mapping, ignored by assembly.
    Other,
}

/// Classify a filename. Exact, case-sensitive suffix match.
pub fn classify(name: &str) -> FileClass {
    if name.ends_with(".html") {
        FileClass::Markup
    } else if name.ends_with(".css") {
        FileClass::Style
    } else if name.ends_with(COMPONENT_EXT) {
        FileClass::Component
    } else if name.ends_with(PLAIN_SCRIPT_EXT) {
        FileClass::PlainScript
    } else {
        FileClass::Other
    }
}

/// Replace a component filename's extension with the plain-script one.
/// `App.jsx` → `App.js`. Non-component names pass through unchanged.
pub fn transpiled_name(name: &str) -> String {
    match name.strip_suffix(COMPONENT_EXT) {
        Some(stem) => format!("{}{}", stem, PLAIN_SCRIPT_EXT),
        None => name.to_string(),
    }
}

/// Insertion-ordered `filename → content` mapping with unique names.
///
/// Re-inserting an existing name overwrites the content but keeps the
/// original position, so iteration order is stable across edits. The
/// project is small (a handful of files), so lookup is a linear scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMap {
    entries: Vec<(String, String)>,
}

impl FileMap {
    pub fn new() -> Self {
        FileMap::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        let name = name.into();
        let content = content.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = content,
            None => self.entries.push((name, content)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), c.as_str()))
    }
}

impl<N: Into<String>, C: Into<String>> FromIterator<(N, C)> for FileMap {
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut map = FileMap::new();
        for (name, content) in iter {
            map.insert(name, content);
        }
        map
    }
}

impl Serialize for FileMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, content) in &self.entries {
            map.serialize_entry(name, content)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FileMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FileMapVisitor;

        impl<'de> Visitor<'de> for FileMapVisitor {
            type Value = FileMap;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a filename → content object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FileMap, A::Error> {
                let mut map = FileMap::new();
                while let Some((name, content)) = access.next_entry::<String, String>()? {
                    map.insert(name, content);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(FileMapVisitor)
    }
}
