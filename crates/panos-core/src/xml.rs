//! XML documents and fragments exchanged with the device
//!
//! [`ConfigDocument`] wraps the raw text of one XML API response and answers
//! the two questions the modules ask of it: is there an element with this
//! tag anywhere below the root, and what text does it hold. Fragments sent
//! back to the device are built with [`element`].

use std::borrow::Cow;

use crate::error::Result;

/// One XML API response, validated as well-formed XML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    xml: String,
}

impl ConfigDocument {
    /// Parse a response body
    ///
    /// Fails with [`crate::Error::Xml`] when the text is not well-formed.
    pub fn parse(xml: impl Into<String>) -> Result<Self> {
        let xml = xml.into();
        roxmltree::Document::parse(&xml)?;
        Ok(Self { xml })
    }

    /// Whether any element below the root has the given tag name
    pub fn contains_element(&self, tag: &str) -> bool {
        self.with_document(|doc| {
            doc.root_element()
                .descendants()
                .skip(1)
                .any(|node| node.is_element() && node.has_tag_name(tag))
        })
        .unwrap_or(false)
    }

    /// Text of the first element below the root with the given tag name
    ///
    /// Returns `None` when no such element exists and when the element has
    /// no text content.
    pub fn element_text(&self, tag: &str) -> Option<String> {
        self.with_document(|doc| {
            doc.root_element()
                .descendants()
                .skip(1)
                .find(|node| node.is_element() && node.has_tag_name(tag))
                .and_then(|node| node.text())
                .map(str::to_string)
        })
        .flatten()
    }

    fn with_document<T>(&self, f: impl FnOnce(&roxmltree::Document<'_>) -> T) -> Option<T> {
        // Validated in `parse`, so this only fails if the invariant is broken.
        roxmltree::Document::parse(&self.xml).ok().map(|doc| f(&doc))
    }
}

/// Escape character data for embedding in an element body
///
/// Only `&`, `<` and `>` are replaced; quotes pass through untouched so that
/// filter expressions keep their literal form.
pub fn escape_text(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// Build `<tag>value</tag>` with the value escaped
pub fn element(tag: &str, value: &str) -> String {
    format!("<{tag}>{}</{tag}>", escape_text(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DNS_PRIMARY: &str = r#"<response status="success"><result total-count="1" count="1"><primary>1.1.1.1</primary></result></response>"#;
    const EMPTY: &str = r#"<response status="success"><result total-count="0" count="0"/></response>"#;

    #[test]
    fn test_parse_rejects_malformed_xml() {
        let err = ConfigDocument::parse("<response><result>").unwrap_err();
        assert!(matches!(err, crate::Error::Xml(_)));
    }

    #[test]
    fn test_element_text_found() {
        let doc = ConfigDocument::parse(DNS_PRIMARY).unwrap();
        assert_eq!(doc.element_text("primary"), Some("1.1.1.1".to_string()));
        assert!(doc.contains_element("primary"));
    }

    #[test]
    fn test_element_text_absent() {
        let doc = ConfigDocument::parse(EMPTY).unwrap();
        assert_eq!(doc.element_text("primary"), None);
        assert!(!doc.contains_element("entry"));
    }

    #[test]
    fn test_empty_element_has_no_text() {
        let doc = ConfigDocument::parse(
            r#"<response status="success"><result><panorama-server/></result></response>"#,
        )
        .unwrap();
        assert!(doc.contains_element("panorama-server"));
        assert_eq!(doc.element_text("panorama-server"), None);
    }

    #[test]
    fn test_root_element_is_not_searched() {
        let doc = ConfigDocument::parse("<entry/>").unwrap();
        assert!(!doc.contains_element("entry"));
    }

    #[test]
    fn test_nested_entry_is_found() {
        let doc = ConfigDocument::parse(
            r#"<response status="success"><result><entry name="dag-1"><dynamic><filter>'a'</filter></dynamic></entry></result></response>"#,
        )
        .unwrap();
        assert!(doc.contains_element("entry"));
        assert_eq!(doc.element_text("filter"), Some("'a'".to_string()));
    }

    #[test]
    fn test_escape_keeps_quotes() {
        assert_eq!(
            escape_text("'tag.x' and 'running'"),
            "'tag.x' and 'running'"
        );
        assert!(matches!(escape_text("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_markup_characters() {
        assert_eq!(escape_text("a<b & c>d"), "a&lt;b &amp; c&gt;d");
    }

    #[test]
    fn test_element_builder() {
        assert_eq!(element("primary", "1.1.1.1"), "<primary>1.1.1.1</primary>");
    }
}
