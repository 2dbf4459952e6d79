use crate::dom::{Dom, Element, NodeId};
use regex::Regex;
use std::fmt;

/// The handful of selector shapes the simplifier needs.
#[derive(Debug, Clone)]
pub enum Selector {
    /// `tag`
    Tag(String),
    /// `.class` (single class token)
    Class(String),
    /// `tag.class`
    TagClass { tag: String, class: String },
    /// `tag[class*="needle"]`: substring of the raw class attribute.
    TagClassContains { tag: String, needle: String },
    /// Any of `tags` (or any element when empty) with a class token that the
    /// pattern finds a match in.
    ClassPattern { tags: Vec<String>, pattern: Regex },
    /// Any of the listed tags.
    AnyTag(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorError(String);

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported selector {:?} (expected `tag`, `.class`, `tag.class` or `tag[class*=\"text\"]`)",
            self.0
        )
    }
}

impl std::error::Error for SelectorError {}

impl Selector {
    /// Parse the textual forms `tag`, `.class`, `tag.class` and
    /// `tag[class*="text"]`.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let err = || SelectorError(text.to_string());
        let text = text.trim();

        if let Some((tag, attr)) = text.split_once('[') {
            let inner = attr.strip_suffix(']').ok_or_else(err)?;
            let needle = inner.strip_prefix("class*=").ok_or_else(err)?;
            let needle = needle.trim_matches(|c| c == '"' || c == '\'');
            if !is_ident(tag) || needle.is_empty() {
                return Err(err());
            }
            return Ok(Selector::TagClassContains {
                tag: tag.to_ascii_lowercase(),
                needle: needle.to_string(),
            });
        }

        match text.split_once('.') {
            Some(("", class)) if is_ident(class) => Ok(Selector::Class(class.to_string())),
            Some((tag, class)) if is_ident(tag) && is_ident(class) => Ok(Selector::TagClass {
                tag: tag.to_ascii_lowercase(),
                class: class.to_string(),
            }),
            None if is_ident(text) => Ok(Selector::Tag(text.to_ascii_lowercase())),
            _ => Err(err()),
        }
    }

    pub fn class_pattern(tags: &[&str], pattern: Regex) -> Self {
        Selector::ClassPattern {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            pattern,
        }
    }

    pub fn any_tag(tags: &[&str]) -> Self {
        Selector::AnyTag(tags.iter().map(|t| t.to_string()).collect())
    }

    pub fn matches(&self, element: &Element) -> bool {
        match self {
            Selector::Tag(tag) => element.is(tag),
            Selector::Class(class) => element.has_class(class),
            Selector::TagClass { tag, class } => element.is(tag) && element.has_class(class),
            Selector::TagClassContains { tag, needle } => {
                element.is(tag) && element.class_attr().contains(needle.as_str())
            }
            Selector::ClassPattern { tags, pattern } => {
                (tags.is_empty() || tags.iter().any(|t| element.is(t)))
                    && element
                        .class_attr()
                        .split_ascii_whitespace()
                        .any(|token| pattern.is_match(token))
            }
            Selector::AnyTag(tags) => tags.iter().any(|t| element.is(t)),
        }
    }

    /// Matching descendants of `scope` in document order.
    pub fn select(&self, dom: &Dom, scope: NodeId) -> Vec<NodeId> {
        dom.find_all(scope, |e| self.matches(e))
    }

    pub fn select_first(&self, dom: &Dom, scope: NodeId) -> Option<NodeId> {
        dom.find_first(scope, |e| self.matches(e))
    }

    /// Nearest strict ancestor of `node` that matches.
    pub fn closest(&self, dom: &Dom, node: NodeId) -> Option<NodeId> {
        dom.closest_ancestor(node, |e| self.matches(e))
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse;

    fn element(html: &str) -> Element {
        let dom = parse(html);
        let id = dom.children(dom.root())[0];
        dom.element(id).unwrap().clone()
    }

    #[test]
    fn parses_supported_forms() {
        assert!(matches!(Selector::parse("message-actions"), Ok(Selector::Tag(t)) if t == "message-actions"));
        assert!(matches!(Selector::parse(".response-footer"), Ok(Selector::Class(c)) if c == "response-footer"));
        assert!(matches!(
            Selector::parse("div.table-footer"),
            Ok(Selector::TagClass { tag, class }) if tag == "div" && class == "table-footer"
        ));
        assert!(matches!(
            Selector::parse(r#"span[class*="bubble"]"#),
            Ok(Selector::TagClassContains { tag, needle }) if tag == "span" && needle == "bubble"
        ));
    }

    #[test]
    fn rejects_everything_else() {
        for bad in ["", ".", "div > p", "a.b.c", "#id", "span[id=x]", "p[class*=]"] {
            assert!(Selector::parse(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn class_matches_whole_tokens_only() {
        let sel = Selector::parse(".footer").unwrap();
        assert!(sel.matches(&element(r#"<div class="a footer"></div>"#)));
        assert!(!sel.matches(&element(r#"<div class="footer-x"></div>"#)));
    }

    #[test]
    fn class_contains_matches_substrings() {
        let sel = Selector::parse(r#"span[class*="bubble"]"#).unwrap();
        assert!(sel.matches(&element(r#"<span class="user-bubble-x"></span>"#)));
        assert!(!sel.matches(&element(r#"<div class="user-bubble-x"></div>"#)));
    }

    #[test]
    fn class_pattern_searches_each_token() {
        let sel = Selector::class_pattern(&["span"], Regex::new("ripple|focus").unwrap());
        assert!(sel.matches(&element(r#"<span class="mat-ripple x"></span>"#)));
        assert!(!sel.matches(&element(r#"<span class="plain"></span>"#)));
        assert!(!sel.matches(&element(r#"<div class="mat-ripple"></div>"#)));

        let any = Selector::class_pattern(&[], Regex::new("thought").unwrap());
        assert!(any.matches(&element(r#"<section class="thoughts-wrapper"></section>"#)));
    }

    #[test]
    fn closest_finds_nearest_matching_ancestor() {
        let dom = parse(r#"<pre id="p"><div class="code"><button id="b"></button></div></pre>"#);
        let button = dom
            .find_first(dom.root(), |e| e.is("button"))
            .unwrap();
        let div = Selector::any_tag(&["pre", "div"]).closest(&dom, button).unwrap();
        assert_eq!(dom.tag_name(div), Some("div"));
        assert!(Selector::Tag("table".into()).closest(&dom, button).is_none());
    }
}
