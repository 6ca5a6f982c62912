use std::fmt;
use std::ops::Range;

use url::Url;

use crate::{Component, Error, Result};

/// A template of literal text and `{component}` placeholders.
///
/// Placeholders are recognized once, when the template is built. Unknown keys,
/// unpaired braces and extra braces stay in the template as literal text.
#[derive(Clone)]
pub struct ExpandTemplate {
    source: String,
    parts: Vec<Part>,
}
impl fmt::Debug for ExpandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.source)
    }
}
impl fmt::Display for ExpandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[derive(Debug, Clone)]
enum Part {
    Literal(Range<usize>),
    Component(Component),
}

impl ExpandTemplate {
    pub fn new(s: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal_start = 0;
        let mut cursor = 0;

        // Every `{` is paired with the nearest `}` after it. A pair that names a
        // component is replaced and scanning resumes after it; otherwise the `{`
        // is literal and scanning resumes at the next byte.
        while let Some(offset) = s[cursor..].find('{') {
            let open = cursor + offset;
            let Some(len) = s[open..].find('}') else {
                break;
            };
            let close = open + len;
            match Component::from_key(&s[open + 1..close]) {
                Some(component) => {
                    tracing::trace!(%component, at = open, "placeholder");
                    if literal_start < open {
                        parts.push(Part::Literal(literal_start..open));
                    }
                    parts.push(Part::Component(component));
                    literal_start = close + 1;
                    cursor = close + 1;
                }
                None => cursor = open + 1,
            }
        }
        if literal_start < s.len() {
            parts.push(Part::Literal(literal_start..s.len()));
        }
        Self {
            source: s.to_string(),
            parts,
        }
    }

    /// Parses `rawurl` and expands the template against it.
    pub fn expand(&self, rawurl: &str) -> Result<String> {
        let url = Url::parse(rawurl).map_err(|e| Error::parse(rawurl, e))?;
        Ok(self.expand_url(&url))
    }

    pub fn expand_url(&self, url: &Url) -> String {
        let mut out = String::with_capacity(self.source.len());
        for part in &self.parts {
            match part {
                Part::Literal(range) => out.push_str(&self.source[range.clone()]),
                Part::Component(component) => component.expand(url, &mut out),
            }
        }
        out
    }

    /// The recognized placeholders, in template order.
    pub fn components(&self) -> impl Iterator<Item = Component> + '_ {
        self.parts.iter().filter_map(|part| match part {
            Part::Component(c) => Some(*c),
            Part::Literal(_) => None,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literals(t: &ExpandTemplate) -> Vec<&str> {
        t.parts
            .iter()
            .filter_map(|part| match part {
                Part::Literal(range) => Some(&t.source[range.clone()]),
                Part::Component(_) => None,
            })
            .collect()
    }

    #[test]
    fn splits_literals_around_placeholders() {
        let t = ExpandTemplate::new("a{scheme}b{bogus}c{port}");
        assert_eq!(literals(&t), ["a", "b{bogus}c"]);
        assert_eq!(
            t.components().collect::<Vec<_>>(),
            [Component::Scheme, Component::Port]
        );
    }

    #[test]
    fn unpaired_open_brace_is_literal() {
        let t = ExpandTemplate::new("{{{bogus}{hostname}{bogus}");
        assert_eq!(literals(&t), ["{{{bogus}", "{bogus}"]);
        assert_eq!(t.components().collect::<Vec<_>>(), [Component::Hostname]);
    }

    #[test]
    fn no_braces() {
        let t = ExpandTemplate::new("plain text");
        assert_eq!(literals(&t), ["plain text"]);
        assert_eq!(t.components().count(), 0);
        assert!(ExpandTemplate::new("").parts.is_empty());
    }
}
