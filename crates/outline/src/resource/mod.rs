// ABOUTME: Input loading and image asset handling around the outline pipeline.
// ABOUTME: Decodes export bytes by declared or detected charset and relocates images into img/.

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, info};

use crate::error::OutlineError;

/// Extensions of image files the exporter leaves next to the HTML.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "tiff", "x-emf"];
/// Directory images are moved into, relative to the staging directory.
pub const IMAGE_DIR: &str = "img";

/// Bytes scanned for a charset declaration.
const SNIFF_LEN: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([A-Za-z0-9_.:\-]+)"#).unwrap()
});
static IMG_SRC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)(<img\b[^>]*?\bsrc\s*=\s*)(["'])([^"']*)(["'])"#).unwrap()
});
static URL_SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").unwrap());

/// Charset named by a `<meta>` tag near the start of the document.
fn sniff_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let head = String::from_utf8_lossy(head);
    META_CHARSET_RE
        .captures(&head)
        .map(|caps| caps[1].to_lowercase())
}

/// Decode export bytes using the declared charset, or a detected one.
pub fn decode_html(bytes: &[u8]) -> String {
    if let Some(charset) = sniff_charset(bytes) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
            let (decoded, _, _) = encoding.decode(bytes);
            return decoded.into_owned();
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(bytes);
    decoded.into_owned()
}

/// Read and decode an export file.
pub fn load_html(path: &Path) -> Result<String, OutlineError> {
    let bytes = fs::read(path).map_err(|e| {
        OutlineError::io(path.display().to_string(), "load_html", Some(e.into()))
    })?;
    Ok(decode_html(&bytes))
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Move image files from `staging` into `staging/img`, returning the moved names sorted.
pub fn relocate_images(staging: &Path) -> Result<Vec<String>, OutlineError> {
    let assets_err = |op: &str, path: &Path, e: std::io::Error| {
        OutlineError::assets(path.display().to_string(), op, Some(e.into()))
    };

    let entries = fs::read_dir(staging).map_err(|e| assets_err("read_dir", staging, e))?;
    let mut images = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| assets_err("read_dir", staging, e))?;
        let path = entry.path();
        if path.is_file() && is_image(&path) {
            images.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    images.sort();

    let destination = staging.join(IMAGE_DIR);
    fs::create_dir_all(&destination).map_err(|e| assets_err("create_dir", &destination, e))?;
    for name in &images {
        let from = staging.join(name);
        let to = destination.join(name);
        fs::rename(&from, &to).map_err(|e| assets_err("rename", &from, e))?;
        debug!(file = %name, "relocated image");
    }
    info!(count = images.len(), dir = %destination.display(), "relocated images");
    Ok(images)
}

/// Point every relative `<img src>` at `{prefix}/img/`.
///
/// Rooted paths, URLs with a scheme and `data:` URIs are left alone.
pub fn rewrite_image_sources(html: &str, prefix: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    IMG_SRC_RE
        .replace_all(html, |caps: &Captures| {
            let src = &caps[3];
            if src.is_empty() || src.starts_with('/') || URL_SCHEME_RE.is_match(src) {
                return caps[0].to_string();
            }
            format!(
                "{}{}{}/{}/{}{}",
                &caps[1], &caps[2], prefix, IMAGE_DIR, src, &caps[4]
            )
        })
        .into_owned()
}
