//! Extraction of flat `<name>...</name>` fields from free text.
//!
//! This is the contract boundary between structured values embedded in
//! natural-language agent output (run configuration, final answers) and the
//! typed data the orchestrator needs. It is intentionally lenient: malformed
//! or tag-free input yields an empty map, never an error.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Extract every top-level `<name>content</name>` pair from `text`.
///
/// Matching is flat, not recursive: the first closing tag matching an
/// opening tag's name terminates the match, and content consumed by a match
/// is not re-scanned for further tags. If the same tag name occurs more than
/// once at the top level, the last occurrence wins. Inner content is
/// whitespace-trimmed. An opening tag with no matching close is skipped.
pub fn extract_tags(text: &str) -> HashMap<String, String> {
    static OPEN_TAG: OnceLock<Regex> = OnceLock::new();
    let open_tag = OPEN_TAG.get_or_init(|| {
        Regex::new(r"<([A-Za-z0-9_]+)>").expect("opening tag pattern is valid")
    });

    let mut tags = HashMap::new();
    let mut cursor = 0;

    while let Some(caps) = open_tag.captures(&text[cursor..]) {
        let whole = caps.get(0).expect("group 0 always present");
        let name = caps.get(1).expect("tag name group").as_str();
        let content_start = cursor + whole.end();

        let closing = format!("</{name}>");
        match text[content_start..].find(&closing) {
            Some(offset) => {
                let content = &text[content_start..content_start + offset];
                tags.insert(name.to_string(), content.trim().to_string());
                cursor = content_start + offset + closing.len();
            }
            None => {
                // Unterminated tag: skip past the opener and keep scanning.
                cursor = content_start;
            }
        }
    }

    tags
}
