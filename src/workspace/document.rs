use std::collections::HashMap;

use crate::lsp::types::{Position, TextDocumentItem};
use crate::workspace::uri_to_path;

/// In-memory buffer for one open document. The text is the full content
/// sent with didOpen; incremental edits are not applied here.
#[derive(Debug, Clone)]
pub struct TextDocument {
    uri: String,
    language_id: String,
    version: i32,
    text: String,
}

impl TextDocument {
    pub fn new(item: TextDocumentItem) -> Self {
        Self {
            uri: item.uri,
            language_id: item.language_id,
            version: item.version,
            text: item.text,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Local filesystem path of the document.
    pub fn path(&self) -> &str {
        uri_to_path(&self.uri)
    }

    /// Flat character offset for a zero-based line/character position,
    /// computed by summing preceding line lengths. Counts Unicode scalar
    /// values, not UTF-16 code units, so surrogate pairs are not accounted
    /// for. The character is clamped to the line, a past-the-end line
    /// clamps to the document end.
    pub fn offset_at(&self, position: Position) -> usize {
        let mut offset = 0usize;
        for (index, line) in self.text.split('\n').enumerate() {
            let line_len = line.chars().count();
            if index as u32 == position.line {
                return offset + (position.character as usize).min(line_len);
            }
            offset += line_len + 1;
        }
        self.text.chars().count()
    }
}

/// Open documents keyed by URI. Mutated only by the dispatch loop.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, TextDocument>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an opened document. Returns false (and stores nothing) when
    /// the uri is already open.
    pub fn open(&mut self, document: TextDocument) -> bool {
        if self.documents.contains_key(document.uri()) {
            return false;
        }
        self.documents.insert(document.uri().to_string(), document);
        true
    }

    /// Removes an open document. Idempotent for unknown uris.
    pub fn close(&mut self, uri: &str) -> bool {
        self.documents.remove(uri).is_some()
    }

    pub fn get(&self, uri: &str) -> Option<&TextDocument> {
        self.documents.get(uri)
    }

    pub fn is_open(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }
}
