use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, ErrorKind, Result};

/// Variables extracted from a URL path, keyed by name.
pub type Bindings = BTreeMap<String, String>;

/// How a [`PathTemplate`] treats a URL whose path has a different number of
/// segments than the template.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// Only the overlapping segments are matched; the rest are ignored.
    #[default]
    Lenient,
    /// Segment counts must be equal, or matching fails with
    /// [`ErrorKind::LengthMismatch`].
    Exact,
}

/// A URL whose path segments name variables with a `:` prefix, such as
/// `https://www.example.com/:root/:dir/:file`.
#[derive(Clone)]
pub struct PathTemplate {
    source: String,
    path: String,
    segments: Vec<Segment>,
    policy: LengthPolicy,
}
impl fmt::Debug for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.source)
    }
}
impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[derive(Debug, Clone)]
struct Segment {
    /// Byte range of the whole segment in the template path, `:` included.
    range: Range<usize>,
    kind: SegmentKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentKind {
    Literal,
    Binding,
}
impl SegmentKind {
    fn of(text: &str) -> Self {
        if text.len() > 1 && text.starts_with(':') {
            Self::Binding
        } else {
            Self::Literal
        }
    }
}

/// The path of `input` as written, without the parser's percent-encoding or
/// dot-segment removal. `input` must already have parsed as a URL.
fn raw_path(input: &str) -> &str {
    let input = input.trim_matches(|c: char| c <= ' ');
    let Some((_scheme, rest)) = input.split_once(':') else {
        return "";
    };
    let rest = match rest.strip_prefix("//") {
        Some(authority) => {
            let end = authority.find(['/', '?', '#']).unwrap_or(authority.len());
            &authority[end..]
        }
        None => rest,
    };
    &rest[..rest.find(['?', '#']).unwrap_or(rest.len())]
}

/// Segments after the leading `/`. An absent or relative path has none.
fn split_path(path: &str) -> Vec<&str> {
    path.strip_prefix('/')
        .map(|rest| rest.split('/').collect())
        .unwrap_or_default()
}

impl PathTemplate {
    pub fn new(s: &str) -> Result<Self> {
        Url::parse(s).map_err(|e| Error::parse(s, e))?;
        Self::from_parsed(s)
    }

    /// Builds a template from a string that has already parsed as a URL.
    pub(crate) fn from_parsed(source: &str) -> Result<Self> {
        let path = raw_path(source).to_string();
        let mut segments = Vec::new();
        let mut start = 1;
        for text in split_path(&path) {
            segments.push(Segment {
                range: start..start + text.len(),
                kind: SegmentKind::of(text),
            });
            start += text.len() + 1;
        }
        if segments.is_empty() {
            return Err(Error::new(source, ErrorKind::InvalidTemplate));
        }
        Ok(Self {
            source: source.to_string(),
            path,
            segments,
            policy: LengthPolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: LengthPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> LengthPolicy {
        self.policy
    }

    /// Parses `rawurl` and binds its path segments to the template's variables.
    pub fn captures(&self, rawurl: &str) -> Result<Bindings> {
        Url::parse(rawurl).map_err(|e| Error::parse(rawurl, e))?;
        self.match_segments(rawurl)
    }

    /// Matches the serialized form of `url`, in which the parser has already
    /// percent-encoded the path and removed dot segments.
    pub fn captures_url(&self, url: &Url) -> Result<Bindings> {
        self.match_segments(url.as_str())
    }

    /// Matches a string that has already parsed as a URL.
    pub(crate) fn match_segments(&self, input: &str) -> Result<Bindings> {
        let subject = split_path(raw_path(input));

        if self.policy == LengthPolicy::Exact && subject.len() != self.segments.len() {
            tracing::debug!(
                template = self.segments.len(),
                subject = subject.len(),
                "segment count mismatch"
            );
            return Err(Error::new(
                input,
                ErrorKind::LengthMismatch {
                    template: self.segments.len(),
                    subject: subject.len(),
                },
            ));
        }

        let mut bindings = Bindings::new();
        for (segment, value) in self.segments.iter().zip(subject) {
            if segment.kind != SegmentKind::Binding {
                continue;
            }
            let text = &self.path[segment.range.clone()];
            if text == value {
                continue;
            }
            let name = &text[1..];
            if bindings.contains_key(name) {
                tracing::debug!(name, "duplicate key");
                return Err(Error::new(input, ErrorKind::DuplicateKey(name.to_string())));
            }
            tracing::trace!(name, value, "bound");
            bindings.insert(name.to_string(), value.to_string());
        }
        Ok(bindings)
    }

    /// Variable names in template order, repeats included.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.segments
            .iter()
            .filter(|segment| segment.kind == SegmentKind::Binding)
            .map(|segment| &self.path[segment.range.start + 1..segment.range.end])
    }

    /// Number of path segments in the template.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    #[cfg(test)]
    fn segment_texts(&self) -> Vec<&str> {
        self.segments
            .iter()
            .map(|segment| &self.path[segment.range.clone()])
            .collect()
    }
}
