//! File-based public content.
//!
//! News items and competition pages are Markdown files with an optional YAML
//! front matter block:
//!
//! ```text
//! ---
//! title: National Cup 2026
//! date: 2026-05-01
//! ---
//! Body text...
//! ```
//!
//! Each file parses into a [`ContentEntry`] holding the metadata mapping and
//! the body. The slug is the file stem.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::api::types::Record;
use crate::table::compare_values;

/// Front matter delimiter line.
const DELIMITER: &str = "---";

/// Errors raised while loading content files.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The file or directory could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("failed to list content directory: {0}")]
    Walk(#[from] walkdir::Error),

    /// The front matter block is malformed.
    #[error("invalid front matter in {path}: {message}")]
    FrontMatter { path: PathBuf, message: String },
}

/// Result type for content operations.
pub type Result<T> = std::result::Result<T, ContentError>;

/// The two content categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    News,
    Competitions,
}

impl Category {
    /// Both categories.
    pub const ALL: [Category; 2] = [Category::News, Category::Competitions];

    /// Directory name under the content root, also the public route prefix.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::News => "news",
            Category::Competitions => "competitions",
        }
    }

    /// Parse a category name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "news" => Some(Category::News),
            "competitions" | "competition" => Some(Category::Competitions),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}

/// One parsed content file.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentEntry {
    pub category: Category,
    pub slug: String,
    pub metadata: Map<String, Value>,
    pub body: String,
}

impl ContentEntry {
    /// The `title` metadata, falling back to the slug.
    pub fn title(&self) -> &str {
        self.metadata
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(self.slug.as_str())
    }

    /// The `date` metadata as text, if present.
    pub fn date(&self) -> Option<&str> {
        self.metadata.get("date").and_then(Value::as_str)
    }

    /// Public route of this entry, e.g. `/news/cup-final`.
    pub fn route(&self) -> String {
        format!("/{}/{}", self.category.dir_name(), self.slug)
    }

    /// The entry as a table row: `slug` followed by the metadata fields.
    pub fn as_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("slug".to_string(), Value::String(self.slug.clone()));
        for (key, value) in &self.metadata {
            if key != "slug" {
                record.insert(key.clone(), value.clone());
            }
        }
        record
    }
}

/// Split a document into its front matter text and body.
///
/// Returns `Ok((None, text))` when the document has no front matter.
fn split_front_matter(text: &str) -> std::result::Result<(Option<&str>, &str), String> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(rest) = text
        .strip_prefix(DELIMITER)
        .and_then(|r| r.strip_prefix("\r\n").or_else(|| r.strip_prefix('\n')))
    else {
        return Ok((None, text));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let front = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((Some(front), body));
        }
        offset += line.len();
    }

    Err("front matter is not terminated by '---'".to_string())
}

/// Parse one document's text.
pub fn parse_document(
    category: Category,
    slug: &str,
    text: &str,
    path: &Path,
) -> Result<ContentEntry> {
    let front_matter_error = |message: String| ContentError::FrontMatter {
        path: path.to_path_buf(),
        message,
    };

    let (front, body) = split_front_matter(text).map_err(front_matter_error)?;

    let metadata = match front {
        None => Map::new(),
        Some(front) if front.trim().is_empty() => Map::new(),
        Some(front) => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(front).map_err(|e| front_matter_error(e.to_string()))?;
            yaml_to_metadata(yaml).map_err(front_matter_error)?
        }
    };

    Ok(ContentEntry {
        category,
        slug: slug.to_string(),
        metadata,
        body: body.trim_start_matches(['\r', '\n']).to_string(),
    })
}

/// Convert the YAML front matter mapping into a JSON metadata map.
///
/// Keys are stringified; nested values are kept as JSON.
fn yaml_to_metadata(yaml: serde_yaml::Value) -> std::result::Result<Map<String, Value>, String> {
    let serde_yaml::Value::Mapping(mapping) = yaml else {
        return Err("front matter must be a mapping".to_string());
    };

    let mut metadata = Map::new();
    for (key, value) in mapping {
        let key = match key {
            serde_yaml::Value::String(s) => s,
            serde_yaml::Value::Number(n) => n.to_string(),
            serde_yaml::Value::Bool(b) => b.to_string(),
            other => return Err(format!("unsupported front matter key: {:?}", other)),
        };
        let value = serde_json::to_value(&value).map_err(|e| e.to_string())?;
        metadata.insert(key, value);
    }
    Ok(metadata)
}

/// Load every entry of a category from `root/<category>/*.md`.
///
/// Entries are ordered newest first by `date`, then by slug. A missing
/// category directory yields no entries.
pub fn load_category(root: &Path, category: Category) -> Result<Vec<ContentEntry>> {
    let dir = root.join(category.dir_name());
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "Content directory missing");
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("md")
        {
            continue;
        }

        let Some(slug) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let text = fs::read_to_string(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        entries.push(parse_document(category, slug, &text, path)?);
    }

    entries.sort_by(|a, b| {
        compare_values(b.metadata.get("date"), a.metadata.get("date"))
            .then_with(|| a.slug.cmp(&b.slug))
    });

    debug!(category = %category, count = entries.len(), "Loaded content");
    Ok(entries)
}

/// Load both categories.
pub fn load_all(root: &Path) -> Result<Vec<ContentEntry>> {
    let mut all = Vec::new();
    for category in Category::ALL {
        all.extend(load_category(root, category)?);
    }
    Ok(all)
}
