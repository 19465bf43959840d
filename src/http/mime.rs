//! Extension to content-type mapping.

use std::collections::HashMap;
use std::path::Path;

/// Content type used when the extension is missing or unmapped.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

const BUILTIN_TYPES: &[(&str, &str)] = &[
    (".html", "text/html"),
    (".htm", "text/html"),
    (".css", "text/css"),
    (".js", "application/javascript"),
    (".json", "application/json"),
    (".txt", "text/plain"),
    (".xml", "text/xml"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".svg", "image/svg+xml"),
    (".ico", "image/x-icon"),
    (".pdf", "application/pdf"),
    (".zip", "application/zip"),
    (".gz", "application/gzip"),
    (".tar", "application/x-tar"),
    (".mp3", "audio/mpeg"),
    (".mp4", "video/mp4"),
    (".wasm", "application/wasm"),
    (".woff", "font/woff"),
    (".woff2", "font/woff2"),
];

/// Read-only lookup table keyed by extension including the leading dot
/// (`.html`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeTable {
    types: HashMap<String, String>,
}

impl MimeTable {
    /// An empty table: every lookup yields [`DEFAULT_MIME_TYPE`].
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Adds or replaces one mapping. A key without a leading dot gets one.
    pub fn insert(&mut self, extension: impl Into<String>, content_type: impl Into<String>) {
        let mut extension = extension.into();
        if !extension.starts_with('.') {
            extension.insert(0, '.');
        }
        self.types.insert(extension, content_type.into());
    }

    /// Content type for the extension of `path`.
    pub fn lookup(&self, path: &Path) -> &str {
        extension_key(path)
            .and_then(|key| self.types.get(&key))
            .map_or(DEFAULT_MIME_TYPE, String::as_str)
    }

    pub fn get(&self, extension: &str) -> Option<&str> {
        self.types.get(extension).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for MimeTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for (extension, content_type) in BUILTIN_TYPES {
            table.insert(*extension, *content_type);
        }
        table
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for MimeTable {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (extension, content_type) in iter {
            self.insert(extension, content_type);
        }
    }
}

fn extension_key(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
}
