//! Filename resolution for downloaded documents.
//!
//! The catalog serves files whose authentic names matter to the archive, so
//! resolution is first-match-wins over three strategies: the server's
//! Content-Disposition header, the URL's last path segment, and a name
//! generated from regulation metadata. Sanitization is deliberately
//! minimal: only path separators and control characters are stripped, so
//! punctuation, parentheses and diacritics survive intact.

use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::catalog::DOCUMENT_EXTENSIONS;
use crate::extract::DocumentRef;

/// Longest generated filename, extension included.
const MAX_GENERATED_LEN: usize = 150;

/// Name used when every strategy comes up empty after sanitization.
const LAST_RESORT_NAME: &str = "dokumen.pdf";

/// Which strategy produced a resolved filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameSource {
    /// Taken from the Content-Disposition response header.
    ServerHeader,
    /// Taken from the last URL path segment.
    UrlSegment,
    /// Generated from regulation metadata.
    GeneratedFromTitle,
}

/// A filename chosen for a document, with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFilename {
    /// The final filename. Non-empty, carries a recognized extension, and
    /// contains no path separators or control characters.
    pub name: String,
    /// The strategy that produced it.
    pub source: FilenameSource,
}

/// Resolves the filename for a document, first match wins.
///
/// 1. Content-Disposition (`filename*=` RFC 5987 form, then `filename=`);
/// 2. last URL path segment, percent-decoded, only when it already carries
///    a recognized document extension;
/// 3. generated from the document's kind/number/year/title metadata.
#[must_use]
pub fn resolve_filename(
    content_disposition: Option<&str>,
    url: &Url,
    fallback: &DocumentRef,
) -> ResolvedFilename {
    if let Some(header) = content_disposition
        && let Some(name) = parse_content_disposition(header)
    {
        let name = sanitize_filename(&name);
        if !name.is_empty() {
            return ResolvedFilename {
                name: ensure_document_extension(name),
                source: FilenameSource::ServerHeader,
            };
        }
    }

    if let Some(name) = url_segment_filename(url) {
        return ResolvedFilename {
            name,
            source: FilenameSource::UrlSegment,
        };
    }

    ResolvedFilename {
        name: generated_filename(fallback),
        source: FilenameSource::GeneratedFromTitle,
    }
}

/// Parses a Content-Disposition header value into a filename.
///
/// Handles the RFC 5987 `filename*=UTF-8''...` form (preferred when both
/// are present), quoted and unquoted `filename=` forms.
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    if let Some(pos) = header.find("filename*=") {
        let value = header[pos + 10..].trim();
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            let encoded_name = encoded[..end].trim();
            if let Ok(decoded) = urlencoding::decode(encoded_name)
                && !decoded.is_empty()
            {
                return Some(decoded.into_owned());
            }
        }
    }

    if let Some(pos) = header.find("filename=") {
        let value = header[pos + 9..].trim();
        if let Some(stripped) = value.strip_prefix('"') {
            if let Some(end) = stripped.find('"') {
                let name = &stripped[..end];
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        } else {
            let end = value.find(';').unwrap_or(value.len());
            let name = value[..end].trim();
            if !name.is_empty() {
                return Some(name.to_string());
            }
        }
    }

    None
}

/// Strips path separators and control characters, nothing more.
///
/// Returns an empty string when nothing legible remains, letting the
/// caller fall through to the next strategy.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().to_string();
    if cleaned.chars().all(|c| c == '.' || c == '_') {
        return String::new();
    }
    cleaned
}

/// The last URL path segment, percent-decoded, when it already names a
/// document file.
fn url_segment_filename(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(segment).ok()?;
    let name = sanitize_filename(&decoded);
    let lower = name.to_ascii_lowercase();
    DOCUMENT_EXTENSIONS
        .iter()
        .any(|ext| lower.ends_with(ext))
        .then_some(name)
}

/// Builds a display name from regulation metadata:
/// `UU No. 2 Tahun 2024 tentang Cipta Kerja.pdf`.
fn generated_filename(document: &DocumentRef) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(kind) = document.kind {
        parts.push(kind.code().to_string());
    }
    if let Some(number) = document.number {
        parts.push(format!("No. {number}"));
    }
    if let Some(year) = document.year {
        parts.push(format!("Tahun {year}"));
    }
    if let Some(title) = document.title.as_deref() {
        let title = sanitize_filename(title);
        if !title.is_empty() {
            if parts.is_empty() {
                parts.push(title);
            } else {
                parts.push(format!("tentang {title}"));
            }
        }
    }

    let stem = parts.join(" ");
    if stem.is_empty() {
        return LAST_RESORT_NAME.to_string();
    }
    let name = ensure_document_extension(stem);
    truncate_preserving_extension(&name, MAX_GENERATED_LEN)
}

/// Appends `.pdf` when the name lacks a recognized document extension.
fn ensure_document_extension(name: String) -> String {
    let lower = name.to_ascii_lowercase();
    if DOCUMENT_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        name
    } else {
        format!("{name}.pdf")
    }
}

/// Shortens an over-long name from the stem side, keeping the extension.
fn truncate_preserving_extension(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos..]),
        None => (name, ""),
    };
    let keep = max_len.saturating_sub(ext.chars().count()).max(1);
    let stem: String = stem.chars().take(keep).collect();
    format!("{}{ext}", stem.trim_end())
}

/// Appends a numeric suffix before the extension: `x.pdf` → `x_2.pdf`.
#[must_use]
pub fn disambiguate(name: &str, counter: usize) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos..]),
        None => (name, ""),
    };
    format!("{stem}_{counter}{ext}")
}

/// Claims a path under `dir` that does not collide with an existing
/// file, suffixing `_2`, `_3`… as needed.
///
/// Each candidate is reserved by atomically creating an empty file, so
/// two workers resolving the same name against the same directory always
/// claim distinct paths. The caller owns the placeholder and must remove
/// it when the download fails.
///
/// Traversal-hostile names (dot segments, leftover separators) collapse to
/// a fixed fallback so the result always stays under `dir`.
pub(crate) async fn claim_unique_path(dir: &Path, filename: &str) -> std::io::Result<PathBuf> {
    let filename = {
        let sanitized = sanitize_filename(filename);
        if sanitized.is_empty() || !is_safe_filename_segment(&sanitized) {
            LAST_RESORT_NAME.to_string()
        } else {
            sanitized
        }
    };

    if let Some(path) = try_claim(dir.join(&filename)).await? {
        return Ok(path);
    }
    for counter in 2..1000 {
        if let Some(path) = try_claim(dir.join(disambiguate(&filename, counter))).await? {
            return Ok(path);
        }
    }

    // Practically unreachable; keyed by wall clock to stay unique.
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let candidate = dir.join(disambiguate(&filename, timestamp as usize));
    tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&candidate)
        .await?;
    Ok(candidate)
}

/// Creates `candidate` if and only if nothing sits there yet.
async fn try_claim(candidate: PathBuf) -> std::io::Result<Option<PathBuf>> {
    match tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&candidate)
        .await
    {
        Ok(_) => Ok(Some(candidate)),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(e),
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
