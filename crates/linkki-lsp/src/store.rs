//! In-memory document store
//!
//! The store is the single source of truth for document text. Files that are
//! not open in the editor are read from disk on demand and never cached.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use url::Url;

/// URI to text for every open document
#[derive(Debug, Default, Clone)]
pub struct DocumentStore {
    documents: HashMap<String, String>,
}

impl DocumentStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an opened document
    pub fn open(&mut self, uri: impl Into<String>, text: impl Into<String>) {
        let uri = uri.into();
        debug!("Opening document: {}", uri);
        self.documents.insert(uri, text.into());
    }

    /// Replace the full text of a document
    pub fn update(&mut self, uri: impl Into<String>, text: impl Into<String>) {
        let uri = uri.into();
        debug!("Updating document: {}", uri);
        self.documents.insert(uri, text.into());
    }

    /// Forget a closed document
    pub fn close(&mut self, uri: &str) {
        debug!("Closing document: {}", uri);
        self.documents.remove(uri);
    }

    /// Text of an open document
    pub fn get(&self, uri: &str) -> Option<&str> {
        self.documents.get(uri).map(String::as_str)
    }

    /// Whether a document is open
    pub fn is_open(&self, uri: &str) -> bool {
        self.documents.contains_key(uri)
    }

    /// Number of open documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether no document is open
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Text for a URI: the open document, else the file behind a `file:` URI
    pub fn read_uri(&self, uri: &str) -> Option<String> {
        if let Some(text) = self.get(uri) {
            return Some(text.to_string());
        }
        uri_to_path(uri).and_then(|path| read_from_disk(&path))
    }

    /// Text for a filesystem path, preferring an open document for that path
    pub fn read_path(&self, path: &Path) -> Option<String> {
        if let Some(text) = self.open_text_for_path(path) {
            return Some(text.to_string());
        }
        read_from_disk(path)
    }

    /// URI to report for a path: the open document's URI if there is one
    pub fn uri_for_path(&self, path: &Path) -> Option<String> {
        self.open_entry_for_path(path)
            .map(|(uri, _)| uri.to_string())
            .or_else(|| path_to_uri(path))
    }

    fn open_text_for_path(&self, path: &Path) -> Option<&str> {
        self.open_entry_for_path(path).map(|(_, text)| text)
    }

    fn open_entry_for_path(&self, path: &Path) -> Option<(&str, &str)> {
        self.documents.iter().find_map(|(uri, text)| {
            let open_path = uri_to_path(uri)?;
            if same_path(&open_path, path) {
                Some((uri.as_str(), text.as_str()))
            } else {
                None
            }
        })
    }
}

/// Filesystem path of a `file:` URI
pub fn uri_to_path(uri: &str) -> Option<PathBuf> {
    let url = Url::parse(uri).ok()?;
    if url.scheme() != "file" {
        return None;
    }
    url.to_file_path().ok()
}

/// `file:` URI for an absolute filesystem path
pub fn path_to_uri(path: &Path) -> Option<String> {
    Url::from_file_path(path).ok().map(|url| url.to_string())
}

/// Whether two paths name the same file
pub fn same_path(left: &Path, right: &Path) -> bool {
    if left == right {
        return true;
    }
    match (left.canonicalize(), right.canonicalize()) {
        (Ok(left), Ok(right)) => left == right,
        _ => false,
    }
}

/// Read a file as UTF-8, falling back to ISO-8859-1
pub fn read_from_disk(path: &Path) -> Option<String> {
    match std::fs::read(path) {
        Ok(bytes) => Some(decode(bytes)),
        Err(e) => {
            warn!("Skipping unreadable file {}: {}", path.display(), e);
            None
        }
    }
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        // ISO-8859-1 maps every byte to the code point of the same value
        Err(e) => e.into_bytes().into_iter().map(char::from).collect(),
    }
}
