//! Deterministic object keys for stored mockups
//!
//! ```text
//! {variant}_style-{style}_{color}_{placements}_{type}-{title}.{ext}
//! 4016_style-301_black_front_back_flat-flat-front.png
//! ```

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left unescaped in public URL segments (URI component rules)
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Lowercase, collapse non-alphanumeric runs to `-`, trim dashes
///
/// Empty results become `unknown`.
pub fn sanitize_segment(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }

    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Sanitized placements joined with `_`, or `no-placement`
pub fn placements_segment(placements: &[String]) -> String {
    if placements.is_empty() {
        return "no-placement".to_string();
    }
    placements
        .iter()
        .map(|p| sanitize_segment(p))
        .collect::<Vec<_>>()
        .join("_")
}

/// File extension from a URL: 3-4 alphanumerics after a dot, at the end of
/// the string or right before `?`. Defaults to `png`.
pub fn guess_extension(url: &str) -> String {
    let bytes = url.as_bytes();
    for (dot, _) in url.match_indices('.') {
        let start = dot + 1;
        let len = bytes[start..].iter().take_while(|b| b.is_ascii_alphanumeric()).count();
        let end = start + len;
        let terminated = end == bytes.len() || bytes[end] == b'?';
        if (3..=4).contains(&len) && terminated {
            return url[start..end].to_lowercase();
        }
    }
    "png".to_string()
}

/// Content type for a file extension
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        _ => "image/png",
    }
}

/// Public HTTPS URL of an object in a bucket
pub fn public_url(bucket: &str, key: &str) -> String {
    let encoded = key
        .split('/')
        .map(|part| utf8_percent_encode(part, URI_COMPONENT).to_string())
        .collect::<Vec<_>>()
        .join("/");
    format!("https://{}.s3.amazonaws.com/{}", bucket, encoded)
}

/// Attributes a stored mockup is named by
#[derive(Debug, Clone, Copy)]
pub struct ObjectName<'a> {
    pub variant_id: &'a str,
    pub style_id: &'a str,
    pub color: Option<&'a str>,
    pub placements: &'a [String],
    pub style_type: &'a str,
    pub title: &'a str,
}

impl ObjectName<'_> {
    /// Object key with the given extension
    pub fn object_key(&self, extension: &str) -> String {
        let style_type = non_empty(self.style_type).unwrap_or("style");
        let title = non_empty(self.title)
            .or_else(|| non_empty(self.style_id))
            .unwrap_or("mockup");
        let extension = non_empty(extension).unwrap_or("png");

        format!(
            "{}_style-{}_{}_{}_{}-{}.{}",
            sanitize_segment(self.variant_id),
            sanitize_segment(self.style_id),
            sanitize_segment(self.color.unwrap_or("")),
            placements_segment(self.placements),
            sanitize_segment(style_type),
            sanitize_segment(title),
            sanitize_segment(extension),
        )
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment(" Hello World! "), "hello-world");
        assert_eq!(sanitize_segment(""), "unknown");
        assert_eq!(sanitize_segment("--"), "unknown");
        assert_eq!(sanitize_segment("Heather / Navy"), "heather-navy");
    }

    #[test]
    fn test_placements_segment() {
        let placements = vec!["Front".to_string(), "Back".to_string()];
        assert_eq!(placements_segment(&placements), "front_back");
        assert_eq!(placements_segment(&[]), "no-placement");
    }

    #[test]
    fn test_guess_extension() {
        assert_eq!(guess_extension("https://example.com/file.PNG?foo=bar"), "png");
        assert_eq!(guess_extension("https://example.com/file"), "png");
        assert_eq!(guess_extension("https://cdn.example.com/mockups/abc.jpeg"), "jpeg");
        assert_eq!(guess_extension("https://cdn.example.com/mockups/abc.webpx"), "png");
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for_extension("jpg"), "image/jpeg");
        assert_eq!(content_type_for_extension("jpeg"), "image/jpeg");
        assert_eq!(content_type_for_extension("webp"), "image/png");
    }

    #[test]
    fn test_object_key() {
        let placements = vec!["Front".to_string(), "Back".to_string()];
        let name = ObjectName {
            variant_id: "12345",
            style_id: "12",
            color: Some("Black"),
            placements: &placements,
            style_type: "Template",
            title: "Main Mockup",
        };

        assert_eq!(
            name.object_key("png"),
            "12345_style-12_black_front_back_template-main-mockup.png"
        );
    }

    #[test]
    fn test_object_key_defaults() {
        let name = ObjectName {
            variant_id: "4016",
            style_id: "7",
            color: None,
            placements: &[],
            style_type: "",
            title: "",
        };

        assert_eq!(name.object_key(""), "4016_style-7_unknown_no-placement_style-7.png");
    }

    #[test]
    fn test_public_url_encodes_segments() {
        assert_eq!(
            public_url("mockups", "a b/c+d.png"),
            "https://mockups.s3.amazonaws.com/a%20b/c%2Bd.png"
        );
    }
}
