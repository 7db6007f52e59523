//! Tag allow-list, block tags and link safety

use serde::{Deserialize, Serialize};

/// Decides whether a link target may be emitted verbatim.
///
/// Unsafe targets stay stored in the document; they are replaced by
/// [`LinkPolicy::placeholder`] at render time.
pub trait LinkPolicy {
    fn is_safe(&self, href: &str) -> bool;

    fn placeholder(&self) -> &str {
        "#"
    }
}

/// Which tags the reconstructor may emit and which of them are blocks.
///
/// Deserializes from camelCase JSON with every field optional, so a config
/// file only needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    /// Element names allowed on output. Anchors are always allowed.
    pub allowed_tags: Vec<String>,

    /// Elements subject to forced reopening between adjacent instances
    pub block_tags: Vec<String>,

    /// Lowercase URL scheme prefixes that are never emitted
    pub blocked_schemes: Vec<String>,

    /// Replacement for a blocked href
    pub placeholder_href: String,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            allowed_tags: ["a", "strong", "u", "em", "strike", "p", "br", "hr", "blockquote", "div"]
                .into_iter()
                .map(String::from)
                .collect(),
            block_tags: vec!["p".to_string(), "blockquote".to_string()],
            blocked_schemes: vec!["javascript:".to_string(), "vbscript:".to_string()],
            placeholder_href: "#".to_string(),
        }
    }
}

impl Schema {
    pub fn allows(&self, name: &str) -> bool {
        self.allowed_tags.iter().any(|tag| tag == name)
    }

    pub fn is_block(&self, name: &str) -> bool {
        self.block_tags.iter().any(|tag| tag == name)
    }
}

impl LinkPolicy for Schema {
    fn is_safe(&self, href: &str) -> bool {
        // Browsers ignore leading whitespace/control characters and embedded
        // tabs or newlines when resolving the scheme.
        let normalized: String = href
            .trim_start_matches(|c: char| c <= ' ')
            .chars()
            .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
            .take(32)
            .collect::<String>()
            .to_ascii_lowercase();

        !self
            .blocked_schemes
            .iter()
            .any(|scheme| normalized.starts_with(scheme.as_str()))
    }

    fn placeholder(&self) -> &str {
        &self.placeholder_href
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_allow_list() {
        let schema = Schema::default();
        for tag in ["a", "strong", "u", "em", "strike", "p", "br", "hr", "blockquote", "div"] {
            assert!(schema.allows(tag), "{tag} should be allowed");
        }
        assert!(!schema.allows("script"));
        assert!(!schema.allows("span"));
    }

    #[test]
    fn test_block_tags() {
        let schema = Schema::default();
        assert!(schema.is_block("p"));
        assert!(schema.is_block("blockquote"));
        assert!(!schema.is_block("div"));
    }

    #[test]
    fn test_script_hrefs_rejected() {
        let schema = Schema::default();
        assert!(!schema.is_safe("javascript:alert(1)"));
        assert!(!schema.is_safe("  JavaScript:alert(1)"));
        assert!(!schema.is_safe("java\tscript:alert(1)"));
        assert!(!schema.is_safe("vbscript:msgbox"));
        assert!(schema.is_safe("https://example.com/javascript:"));
        assert!(schema.is_safe("/relative"));
        assert_eq!(schema.placeholder(), "#");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let schema: Schema = serde_json::from_str(r#"{ "blockTags": ["p", "div"] }"#).unwrap();
        assert!(schema.is_block("div"));
        assert!(schema.allows("strong"));
        assert_eq!(schema.placeholder_href, "#");
    }
}
