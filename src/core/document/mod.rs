//! core::document
//!
//! Front matter documents: an HTML file whose first bytes are a YAML block.
//!
//! # Format
//!
//! ```text
//! ---
//! layout: page
//! images:
//! - image_path: /images/albums/beach/a.jpg
//! ---
//! <body, kept byte-for-byte>
//! ```
//!
//! # Parsing
//!
//! Parsing is two-stage. Delimiters are found by exact line match (a line
//! that is `---` plus optional trailing whitespace), then the span between
//! the first two delimiters goes to a data-only decoder:
//!
//! - YAML tags (`!ruby/object`, `!!python/...`) are rejected
//! - anchors, aliases and merge keys are rejected
//! - the block must be a mapping (or empty)
//!
//! Blank lines and a UTF-8 BOM may precede the first delimiter; anything
//! else there is an error.
//!
//! # Round Trips
//!
//! [`FrontMatterDocument::serialize`] re-emits the metadata through
//! `serde_yaml`, so a round trip is semantic rather than byte-identical.
//! The body is always reproduced exactly, and a trailing newline is
//! guaranteed.
//!
//! # Example
//!
//! ```
//! use gallerist::core::document::FrontMatterDocument;
//!
//! let raw = "---\ntitle: Beach\n---\n<div>gallery</div>\n";
//! let doc = FrontMatterDocument::parse(raw.as_bytes()).unwrap();
//! assert_eq!(doc.metadata.title.as_deref(), Some("Beach"));
//! assert_eq!(doc.body, "\n<div>gallery</div>\n");
//!
//! let again = FrontMatterDocument::parse(doc.serialize().unwrap().as_bytes()).unwrap();
//! assert_eq!(again.metadata, doc.metadata);
//! ```

pub mod schema;

pub use schema::{ImageEntry, IndexMetadata};

use serde_yaml::Value;
use thiserror::Error;

use crate::core::types::Revision;

/// Delimiter line content.
const DELIMITER: &str = "---";

/// Errors from parsing or serializing a front matter document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// Fewer than two delimiter lines.
    #[error("no front matter block found")]
    MissingFrontMatter,

    /// Non-blank content before the opening delimiter.
    #[error("unexpected content before front matter on line {line}")]
    LeadingContent { line: usize },

    #[error("document is not valid UTF-8")]
    InvalidUtf8,

    /// A tag, anchor, alias, or merge key in the metadata block.
    #[error("unsupported YAML construct '{0}' in front matter")]
    UnsafeNode(String),

    #[error("front matter must be a mapping")]
    NotAMapping,

    #[error("invalid front matter: {0}")]
    Yaml(String),

    #[error("failed to encode front matter: {0}")]
    Encode(String),
}

/// A parsed front matter document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatterDocument {
    /// Structured metadata block.
    pub metadata: IndexMetadata,
    /// Everything after the closing delimiter's dashes.
    pub body: String,
    /// Store revision this document was read at, if it came from a store.
    ///
    /// `None` means the document has never been written; saving it is a create.
    pub revision: Option<Revision>,
}

impl FrontMatterDocument {
    /// Create an unsaved document.
    pub fn new(metadata: IndexMetadata, body: impl Into<String>) -> Self {
        Self {
            metadata,
            body: body.into(),
            revision: None,
        }
    }

    /// Parse raw document bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentError`] when the delimiters are missing, the
    /// metadata block is not a plain-data mapping, or the bytes are not UTF-8.
    pub fn parse(raw: &[u8]) -> Result<Self, DocumentError> {
        let text = std::str::from_utf8(raw).map_err(|_| DocumentError::InvalidUtf8)?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let (block, body) = split_front_matter(text)?;
        let metadata = decode_metadata(block)?;

        Ok(Self {
            metadata,
            body: body.to_string(),
            revision: None,
        })
    }

    /// Attach the store revision this document was read at.
    pub fn with_revision(mut self, revision: Revision) -> Self {
        self.revision = Some(revision);
        self
    }

    /// Serialize to `---\n<yaml>---<body>` with a trailing newline.
    pub fn serialize(&self) -> Result<String, DocumentError> {
        let yaml = serde_yaml::to_string(&self.metadata)
            .map_err(|e| DocumentError::Encode(e.to_string()))?;

        let mut out = String::with_capacity(yaml.len() + self.body.len() + 8);
        out.push_str(DELIMITER);
        out.push('\n');
        // An empty mapping encodes as `{}`; emit an empty block instead.
        if yaml.trim() != "{}" {
            out.push_str(&yaml);
            if !yaml.ends_with('\n') {
                out.push('\n');
            }
        }
        out.push_str(DELIMITER);
        out.push_str(&self.body);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }
}

/// Split text into the metadata block and the body.
fn split_front_matter(text: &str) -> Result<(&str, &str), DocumentError> {
    let mut offset = 0;
    let mut block_start: Option<usize> = None;

    for (index, line) in text.split_inclusive('\n').enumerate() {
        let line_start = offset;
        offset += line.len();

        if is_delimiter(line) {
            match block_start {
                None => block_start = Some(offset),
                Some(start) => {
                    let block = &text[start..line_start];
                    let body = &text[line_start + DELIMITER.len()..];
                    return Ok((block, body));
                }
            }
        } else if block_start.is_none() && !line.trim().is_empty() {
            return Err(DocumentError::LeadingContent { line: index + 1 });
        }
    }

    Err(DocumentError::MissingFrontMatter)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == DELIMITER
}

/// Decode the metadata block with data-only semantics.
fn decode_metadata(block: &str) -> Result<IndexMetadata, DocumentError> {
    let has_content = block.lines().any(|line| {
        let line = line.trim();
        !line.is_empty() && !line.starts_with('#')
    });
    if !has_content {
        return Ok(IndexMetadata::default());
    }

    reject_references(block)?;

    let value: Value =
        serde_yaml::from_str(block).map_err(|e| DocumentError::Yaml(e.to_string()))?;
    reject_tags(&value)?;

    match value {
        Value::Null => Ok(IndexMetadata::default()),
        Value::Mapping(_) => {
            serde_yaml::from_value(value).map_err(|e| DocumentError::Yaml(e.to_string()))
        }
        _ => Err(DocumentError::NotAMapping),
    }
}

/// Reject any tagged node anywhere in the tree.
fn reject_tags(value: &Value) -> Result<(), DocumentError> {
    match value {
        Value::Tagged(tagged) => Err(DocumentError::UnsafeNode(tagged.tag.to_string())),
        Value::Sequence(items) => items.iter().try_for_each(reject_tags),
        Value::Mapping(map) => map.iter().try_for_each(|(key, value)| {
            reject_tags(key)?;
            reject_tags(value)
        }),
        _ => Ok(()),
    }
}

/// Reject anchors (`&a`), aliases (`*a`) and merge keys (`<<`).
///
/// `serde_yaml` expands aliases silently, so they are caught on the raw
/// text. Only node positions are checked: the start of a line, after a
/// sequence dash, after a `key:`, or inside flow brackets. Quoted scalars
/// and block scalar contents are skipped.
fn reject_references(block: &str) -> Result<(), DocumentError> {
    let mut block_scalar_indent: Option<usize> = None;

    for line in block.lines() {
        let trimmed = line.trim();
        let indent = line.len() - line.trim_start().len();

        if let Some(parent) = block_scalar_indent {
            if trimmed.is_empty() || indent > parent {
                continue;
            }
            block_scalar_indent = None;
        }
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(token) = reference_token(trimmed) {
            return Err(DocumentError::UnsafeNode(token.to_string()));
        }
        if opens_block_scalar(trimmed) {
            block_scalar_indent = Some(indent);
        }
    }

    Ok(())
}

/// First anchor, alias or merge key at a node position of `line`.
///
/// A node starts the line, follows a sequence dash or a `key:`, or sits
/// inside a flow collection opened at a node position. A comma is a
/// separator only inside such a collection; in a plain scalar it is text.
fn reference_token(line: &str) -> Option<&str> {
    let mut at_node = true;
    let mut only_dashes = true;
    let mut flow_depth = 0usize;

    for token in line.split_whitespace() {
        if token.starts_with('#') {
            return None;
        }

        let mut bare = token;
        if at_node || flow_depth > 0 {
            while let Some(rest) = bare.strip_prefix(['[', '{']) {
                flow_depth += 1;
                bare = rest;
                at_node = true;
            }
        }

        if at_node {
            if bare.starts_with('"') || bare.starts_with('\'') {
                return None;
            }
            if bare == "<<" || bare.starts_with("<<:") {
                return Some(token);
            }
            if bare.len() > 1 && (bare.starts_with('&') || bare.starts_with('*')) {
                return Some(token);
            }
        }

        if flow_depth > 0 {
            let closing = bare
                .chars()
                .rev()
                .take_while(|c| matches!(c, ']' | '}' | ','))
                .filter(|c| matches!(c, ']' | '}'))
                .count();
            flow_depth = flow_depth.saturating_sub(closing);
        }

        only_dashes &= token == "-";
        at_node = only_dashes
            || token.ends_with(':')
            || (flow_depth > 0 && (token.ends_with(',') || bare.is_empty()));
    }

    None
}

fn opens_block_scalar(line: &str) -> bool {
    line.split_whitespace().last().is_some_and(|token| {
        let mut chars = token.chars();
        matches!(chars.next(), Some('|') | Some('>'))
            && chars.all(|c| matches!(c, '-' | '+') || c.is_ascii_digit())
    })
}
