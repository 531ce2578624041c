//! Content type resolution
//!
//! Returns the Content-Type for a file based on its extension. Extensions are
//! stored with their leading dot and compared case-insensitively.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Maps a request subpath to a MIME type
pub trait ContentTypeProvider: Send + Sync + fmt::Debug {
    /// `None` means the provider does not know the type
    fn content_type(&self, subpath: &str) -> Option<&str>;
}

/// Extension lookup table
#[derive(Debug, Clone)]
pub struct ContentTypeTable {
    mappings: HashMap<String, String>,
}

impl ContentTypeTable {
    /// A table with no mappings at all
    pub fn empty() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    /// Register `extension` unless it is already mapped
    ///
    /// Returns `false` and leaves the existing entry untouched when the
    /// extension is taken.
    pub fn try_add(&mut self, extension: &str, mime_type: &str) -> bool {
        let key = normalize_extension(extension);
        if self.mappings.contains_key(&key) {
            return false;
        }
        self.mappings.insert(key, mime_type.to_string());
        true
    }

    /// Shared copy of the standard table
    pub fn standard() -> &'static Self {
        static STANDARD: OnceLock<ContentTypeTable> = OnceLock::new();
        STANDARD.get_or_init(Self::default)
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.mappings.contains_key(&normalize_extension(extension))
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl Default for ContentTypeTable {
    /// Standard web asset mappings
    fn default() -> Self {
        const BASE: &[(&str, &str)] = &[
            // Text
            (".html", "text/html; charset=utf-8"),
            (".htm", "text/html; charset=utf-8"),
            (".css", "text/css"),
            (".txt", "text/plain; charset=utf-8"),
            (".md", "text/plain; charset=utf-8"),
            (".xml", "application/xml"),
            // JavaScript/WASM
            (".js", "application/javascript"),
            (".mjs", "application/javascript"),
            (".json", "application/json"),
            (".map", "application/json"),
            (".wasm", "application/wasm"),
            // Images
            (".png", "image/png"),
            (".jpg", "image/jpeg"),
            (".jpeg", "image/jpeg"),
            (".gif", "image/gif"),
            (".svg", "image/svg+xml"),
            (".ico", "image/x-icon"),
            (".webp", "image/webp"),
            // Video
            (".mp4", "video/mp4"),
            (".webm", "video/webm"),
            (".ogg", "video/ogg"),
            // Audio
            (".mp3", "audio/mpeg"),
            (".wav", "audio/wav"),
            // Fonts
            (".woff", "font/woff"),
            (".woff2", "font/woff2"),
            (".ttf", "font/ttf"),
            (".otf", "font/otf"),
            (".eot", "application/vnd.ms-fontobject"),
            // Documents
            (".pdf", "application/pdf"),
            (".zip", "application/zip"),
            (".gz", "application/gzip"),
        ];

        let mut table = Self::empty();
        for (extension, mime_type) in BASE {
            table.try_add(extension, mime_type);
        }
        table
    }
}

impl ContentTypeProvider for ContentTypeTable {
    fn content_type(&self, subpath: &str) -> Option<&str> {
        let extension = extension_of(subpath)?;
        self.mappings
            .get(&extension.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// Tries each provider in order until one knows the type
#[derive(Debug, Clone)]
pub struct DelegatingContentTypeProvider {
    providers: Vec<Arc<dyn ContentTypeProvider>>,
}

impl DelegatingContentTypeProvider {
    pub fn new(providers: Vec<Arc<dyn ContentTypeProvider>>) -> Self {
        Self { providers }
    }
}

impl ContentTypeProvider for DelegatingContentTypeProvider {
    fn content_type(&self, subpath: &str) -> Option<&str> {
        self.providers.iter().find_map(|p| p.content_type(subpath))
    }
}

/// Extension of the last path segment, including the dot
fn extension_of(subpath: &str) -> Option<&str> {
    let name = subpath.rsplit('/').next().unwrap_or(subpath);
    let dot = name.rfind('.')?;
    Some(&name[dot..])
}

fn normalize_extension(extension: &str) -> String {
    let lower = extension.to_ascii_lowercase();
    if lower.starts_with('.') {
        lower
    } else {
        format!(".{lower}")
    }
}
