//! Small string and path helpers shared by the renderers and the verifier.

use std::borrow::Cow;
use std::path::Path;

/// Escape XML special characters.
///
/// The core expects titles and metadata to arrive escaped already; this is
/// the helper callers use to get them into that state.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Decode bytes to a string, handling a BOM and legacy encodings.
///
/// Tries UTF-8 first, then the hint encoding (from `<?xml encoding="..."?>`),
/// and finally falls back to Windows-1252. Uses `Cow<str>` to avoid
/// allocation when the input is valid UTF-8.
pub fn decode_text<'a>(bytes: &'a [u8], hint_encoding: Option<&str>) -> Cow<'a, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    if let Some(name) = hint_encoding
        && let Some(encoding) = encoding_rs::Encoding::for_label(name.as_bytes())
    {
        let (result, _, _) = encoding.decode(bytes);
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Strip a `#fragment` from a link target.
pub fn strip_fragment(href: &str) -> &str {
    match memchr::memchr(b'#', href.as_bytes()) {
        Some(pos) => &href[..pos],
        None => href,
    }
}

/// Sanitize a path for use in ZIP (remove leading slashes, normalize).
pub fn sanitize_path(path: &str) -> String {
    path.trim_start_matches('/')
        .replace('\\', "/")
        .replace("//", "/")
}

/// Join an archive directory and a relative href.
pub fn join_archive_path(dir: &str, href: &str) -> String {
    let href = sanitize_path(href);
    let dir = dir.trim_matches('/');
    if dir.is_empty() {
        href
    } else {
        format!("{}/{}", dir, href)
    }
}

/// Whether `s` can be used as an XML `id` attribute value.
///
/// Accepts the ASCII subset of NCName plus any non-ASCII character, which is
/// enough to reject the empty string, leading digits, whitespace, and colons.
pub fn is_xml_id(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let start_ok = first.is_ascii_alphabetic() || first == '_' || !first.is_ascii();
    start_ok
        && chars.all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') || !c.is_ascii()
        })
}

/// Guess media type from file extension.
pub fn media_type_for(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "xhtml" | "html" | "htm" => "application/xhtml+xml",
        "css" => "text/css",
        "js" => "application/javascript",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ncx" => "application/x-dtbncx+xml",
        "opf" => "application/oebps-package+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("Hello & World"), "Hello &amp; World");
        assert_eq!(escape_xml("<tag>"), "&lt;tag&gt;");
        assert_eq!(escape_xml("\"quoted\""), "&quot;quoted&quot;");
    }

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/path/to/file.xhtml"), "path/to/file.xhtml");
        assert_eq!(sanitize_path("path\\to\\file.xhtml"), "path/to/file.xhtml");
    }

    #[test]
    fn test_join_archive_path() {
        assert_eq!(join_archive_path("OEBPS", "a.xhtml"), "OEBPS/a.xhtml");
        assert_eq!(join_archive_path("", "/a.xhtml"), "a.xhtml");
        assert_eq!(join_archive_path("OEBPS/", "img/c.png"), "OEBPS/img/c.png");
    }

    #[test]
    fn test_strip_fragment() {
        assert_eq!(strip_fragment("a.xhtml#s1"), "a.xhtml");
        assert_eq!(strip_fragment("a.xhtml"), "a.xhtml");
        assert_eq!(strip_fragment("#top"), "");
    }

    #[test]
    fn test_is_xml_id() {
        assert!(is_xml_id("BookId"));
        assert!(is_xml_id("_x-1.2"));
        assert!(!is_xml_id(""));
        assert!(!is_xml_id("1abc"));
        assert!(!is_xml_id("book id"));
        assert!(!is_xml_id("dc:id"));
    }

    #[test]
    fn test_media_type_for() {
        assert_eq!(media_type_for("file.xhtml"), "application/xhtml+xml");
        assert_eq!(media_type_for("style.css"), "text/css");
        assert_eq!(media_type_for("image.JPG"), "image/jpeg");
        assert_eq!(media_type_for("font.woff2"), "font/woff2");
        assert_eq!(media_type_for("README"), "application/octet-stream");
    }

    #[test]
    fn test_decode_text_utf8_bom() {
        let bytes = b"\xEF\xBB\xBF<a/>";
        assert_eq!(decode_text(bytes, None), "<a/>");
    }

    #[test]
    fn test_decode_text_fallback() {
        // 0xE9 is 'é' in Windows-1252 and invalid UTF-8 on its own
        assert_eq!(decode_text(b"caf\xE9", None), "café");
    }
}
