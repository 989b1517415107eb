//! Format registry for content negotiation.
//!
//! A [`Format`] pairs a short name (`json`, `xml`, ...) with the MIME types it
//! accepts on a response and the MIME type used when sending a payload in that
//! format. The registry is a fixed table; every format name used elsewhere in
//! the crate resolves here, and unrecognized names silently fall back to
//! `json` so that resolution is total.
//!
//! # Examples
//!
//! ```
//! use restwire::format;
//!
//! let json = format::resolve("json");
//! assert_eq!(json.send, "application/json");
//!
//! // Unknown names never fail, they resolve to json.
//! assert_eq!(format::resolve("yaml").name, "json");
//!
//! // Substring matching tolerates content-type parameters.
//! assert_eq!(format::match_content_type("application/json; charset=utf-8"), Some("json"));
//! ```

/// A named wire format: accepted MIME types plus the MIME type used to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    /// Short registry name, e.g. `json`.
    pub name: &'static str,
    /// MIME types recognized as this format on a response, in preference order.
    pub accepts: &'static [&'static str],
    /// MIME type declared in `Content-Type` when sending this format.
    pub send: &'static str,
}

/// The format table, in declaration order. First match wins during
/// content-type negotiation.
pub const FORMATS: &[Format] = &[
    Format {
        name: "json",
        accepts: &["application/json", "application/x-json"],
        send: "application/json",
    },
    Format {
        name: "xml",
        accepts: &["text/xml", "application/xml", "application/x-xml"],
        send: "application/xml",
    },
    Format {
        name: "txt",
        accepts: &["text/plain"],
        send: "application/x-www-form-urlencoded",
    },
    Format {
        name: "html",
        accepts: &["text/html", "application/xhtml+xml"],
        send: "application/x-www-form-urlencoded",
    },
    Format {
        name: "png",
        accepts: &["image/png"],
        send: "image/png",
    },
    Format {
        name: "any",
        accepts: &["*/*"],
        send: "application/x-www-form-urlencoded",
    },
    Format {
        name: "js",
        accepts: &[
            "application/javascript",
            "application/x-javascript",
            "text/javascript",
        ],
        send: "application/javascript",
    },
    Format {
        name: "css",
        accepts: &["text/css"],
        send: "text/css",
    },
    Format {
        name: "rdf",
        accepts: &["application/rdf+xml"],
        send: "application/rdf+xml",
    },
    Format {
        name: "atom",
        accepts: &["application/atom+xml"],
        send: "application/atom+xml",
    },
    Format {
        name: "rss",
        accepts: &["application/rss+xml"],
        send: "application/rss+xml",
    },
];

/// Resolve a format name to its descriptor.
///
/// Total: unrecognized names resolve to the `json` descriptor.
pub fn resolve(name: &str) -> &'static Format {
    FORMATS
        .iter()
        .find(|format| format.name == name)
        .unwrap_or(&FORMATS[0])
}

/// Whether a name is present in the registry.
pub fn is_known(name: &str) -> bool {
    FORMATS.iter().any(|format| format.name == name)
}

/// Match a declared `Content-Type` header value against the registry.
///
/// Case-insensitive substring scan: a format matches when the header value
/// *contains* one of its accepted MIME types, so parameterized values like
/// `application/json; charset=utf-8` still negotiate to `json`. The table is
/// scanned in declaration order and the first match wins. `None` marks an
/// unknown content type, in which case the body is left as a raw string.
pub fn match_content_type(header_value: &str) -> Option<&'static str> {
    let declared = header_value.to_ascii_lowercase();
    for format in FORMATS {
        for mime in format.accepts {
            if declared.contains(mime) {
                return Some(format.name);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_formats() {
        assert_eq!(resolve("xml").send, "application/xml");
        assert_eq!(resolve("txt").send, "application/x-www-form-urlencoded");
        assert_eq!(resolve("png").accepts, &["image/png"]);
    }

    #[test]
    fn test_resolve_falls_back_to_json() {
        assert_eq!(resolve("yaml").name, "json");
        assert_eq!(resolve("").name, "json");
        assert_eq!(resolve("JSON").name, "json");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let first = resolve("atom");
        let second = resolve(first.name);
        assert_eq!(first, second);
    }

    #[test]
    fn test_every_format_is_known() {
        for format in FORMATS {
            assert!(is_known(format.name));
        }
        assert!(!is_known("yaml"));
    }

    #[test]
    fn test_match_exact_mime() {
        assert_eq!(match_content_type("application/json"), Some("json"));
        assert_eq!(match_content_type("text/xml"), Some("xml"));
        assert_eq!(match_content_type("image/png"), Some("png"));
    }

    #[test]
    fn test_match_is_substring_based() {
        assert_eq!(
            match_content_type("application/json; charset=utf-8"),
            Some("json")
        );
        assert_eq!(
            match_content_type("Application/XML;q=0.9"),
            Some("xml")
        );
    }

    #[test]
    fn test_match_unknown_content_type() {
        assert_eq!(match_content_type("application/octet-stream"), None);
        assert_eq!(match_content_type(""), None);
    }

    #[test]
    fn test_match_first_declared_format_wins() {
        // application/x-json carries "application/x-j..." but json is declared
        // first and its second accepted MIME matches.
        assert_eq!(match_content_type("application/x-json"), Some("json"));
    }
}
