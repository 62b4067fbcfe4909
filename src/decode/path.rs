//! Decode paths and path patterns.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::fmt;
use smallvec::SmallVec;
use crate::value::Data;


//------------ PathSegment ---------------------------------------------------

/// A single step of a decode path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSegment {
    /// A named field of a SEQUENCE or SET or the chosen alternative of a
    /// CHOICE.
    Name(String),

    /// An item of a SEQUENCE OF or SET OF.
    Index(usize),

    /// The value defined for the parent by the given source value.
    DefinedBy(Data),
}

impl PathSegment {
    /// Creates a name segment.
    pub fn name(name: &str) -> Self {
        PathSegment::Name(name.into())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            PathSegment::Name(ref name) => f.write_str(name),
            PathSegment::Index(idx) => write!(f, "{}", idx),
            PathSegment::DefinedBy(ref data) => {
                write!(f, "DEFINED BY {}", data)
            }
        }
    }
}


//------------ DecodePath ----------------------------------------------------

/// The location of a value within a decoded tree.
///
/// The path is the sequence of segments leading from the root of the
/// decoded value to a value. When displayed, the segments are joined by
/// colons.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DecodePath(SmallVec<[PathSegment; 8]>);

impl DecodePath {
    /// Creates a new, empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a segment to the end of the path.
    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment)
    }

    /// Removes the last segment from the path.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// Returns a new path with the given segment appended.
    pub fn join(&self, segment: PathSegment) -> Self {
        let mut res = self.clone();
        res.push(segment);
        res
    }

    /// Returns the number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the path is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the segments of the path.
    pub fn segments(&self) -> &[PathSegment] {
        self.0.as_slice()
    }

    /// Returns the last segment.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Returns the remainder of `self` if it starts with `prefix`.
    pub fn strip_prefix(&self, prefix: &DecodePath) -> Option<&[PathSegment]> {
        self.0.strip_prefix(prefix.segments())
    }
}

impl From<Vec<PathSegment>> for DecodePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        DecodePath(segments.into())
    }
}

impl fmt::Display for DecodePath {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut segments = self.0.iter();
        if let Some(first) = segments.next() {
            write!(f, "{}", first)?;
        }
        for segment in segments {
            write!(f, ":{}", segment)?;
        }
        Ok(())
    }
}


//------------ PatternSegment ------------------------------------------------

/// A single step of a path pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PatternSegment {
    /// Move to the parent.
    Up,

    /// Start at the root of the decoded tree.
    Root,

    /// A named field or alternative.
    Name(String),

    /// A specific item of a repetition.
    Index(usize),

    /// Every item of a repetition.
    Any,

    /// The value defined by the given source value.
    DefinedBy(Data),
}


//------------ PathPattern ---------------------------------------------------

/// A pattern describing one or more locations in a decoded tree.
///
/// Patterns are used by defined-by rules for addressing both the value
/// that selects a schema and the value whose content is decoded with it.
/// They can be relative or, if they start with [`PatternSegment::Root`],
/// absolute.
///
/// Patterns can be parsed from strings. The string is split at slashes,
/// a leading slash makes the pattern absolute, `..` moves to the parent,
/// `*` matches every item of a repetition, and a sequence of digits is an
/// index. Everything else is a field name. Since the source values of
/// defined-by segments can’t be expressed as strings, they need to be
/// added via [`defined_by`][Self::defined_by].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathPattern(Vec<PatternSegment>);

impl PathPattern {
    /// Creates a new, empty relative pattern.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a pattern from its string representation.
    pub fn parse(s: &str) -> Self {
        let mut res = Self::new();
        let s = match s.strip_prefix('/') {
            Some(s) => {
                res.0.push(PatternSegment::Root);
                s
            }
            None => s
        };
        for part in s.split('/').filter(|part| !part.is_empty()) {
            res.0.push(match part {
                ".." => PatternSegment::Up,
                "*" => PatternSegment::Any,
                part if part.bytes().all(|ch| ch.is_ascii_digit()) => {
                    match part.parse() {
                        Ok(idx) => PatternSegment::Index(idx),
                        Err(_) => PatternSegment::Name(part.into()),
                    }
                }
                part => PatternSegment::Name(part.into()),
            })
        }
        res
    }

    /// Appends a step to the parent.
    pub fn up(mut self) -> Self {
        self.0.push(PatternSegment::Up);
        self
    }

    /// Appends a named field.
    pub fn name(mut self, name: &str) -> Self {
        self.0.push(PatternSegment::Name(name.into()));
        self
    }

    /// Appends an item index.
    pub fn index(mut self, idx: usize) -> Self {
        self.0.push(PatternSegment::Index(idx));
        self
    }

    /// Appends a wildcard matching every item of a repetition.
    pub fn any(mut self) -> Self {
        self.0.push(PatternSegment::Any);
        self
    }

    /// Appends a step into the value defined by `data`.
    pub fn defined_by(mut self, data: impl Into<Data>) -> Self {
        self.0.push(PatternSegment::DefinedBy(data.into()));
        self
    }

    /// Returns the segments of the pattern.
    pub fn segments(&self) -> &[PatternSegment] {
        &self.0
    }

    /// Returns whether an absolute path matches the pattern.
    ///
    /// The pattern is taken as starting at the root whether or not it
    /// starts with [`PatternSegment::Root`]. Patterns containing
    /// [`PatternSegment::Up`] never match.
    pub fn matches(&self, path: &[PathSegment]) -> bool {
        let pattern = match self.0.split_first() {
            Some((PatternSegment::Root, tail)) => tail,
            _ => self.0.as_slice(),
        };
        pattern.len() == path.len()
            && pattern.iter().zip(path).all(|(pattern, segment)| {
                match (pattern, segment) {
                    (PatternSegment::Name(left), PathSegment::Name(right)) => {
                        left == right
                    }
                    (
                        PatternSegment::Index(left),
                        PathSegment::Index(right)
                    ) => {
                        left == right
                    }
                    (PatternSegment::Any, PathSegment::Index(_)) => true,
                    (
                        PatternSegment::DefinedBy(left),
                        PathSegment::DefinedBy(right)
                    ) => {
                        left == right
                    }
                    _ => false
                }
            })
    }

    /// Resolves the pattern relative to a base path.
    ///
    /// Returns a pattern that only consists of name, index, wildcard, and
    /// defined-by segments and is relative to `root`, the path of the root
    /// of the decoded tree. Returns `None` if the pattern moves up past the
    /// root.
    pub fn resolve(
        &self, root: &DecodePath, base: &DecodePath,
    ) -> Option<Vec<PatternSegment>> {
        let mut res: Vec<PatternSegment> = Vec::new();
        let mut segments = self.0.iter().peekable();
        if segments.peek() == Some(&&PatternSegment::Root) {
            segments.next();
        }
        else {
            let rel = base.strip_prefix(root)?;
            res.extend(rel.iter().map(|segment| match segment {
                PathSegment::Name(name) => PatternSegment::Name(name.clone()),
                PathSegment::Index(idx) => PatternSegment::Index(*idx),
                PathSegment::DefinedBy(data) => {
                    PatternSegment::DefinedBy(data.clone())
                }
            }));
        }
        for segment in segments {
            match segment {
                PatternSegment::Up => {
                    res.pop()?;
                }
                PatternSegment::Root => return None,
                other => res.push(other.clone()),
            }
        }
        Some(res)
    }
}

impl From<&str> for PathPattern {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn path(segments: &[PathSegment]) -> DecodePath {
        DecodePath::from(segments.to_vec())
    }

    #[test]
    fn display() {
        let p = path(&[
            PathSegment::name("tbs"), PathSegment::Index(2),
            PathSegment::name("value"),
        ]);
        assert_eq!(p.to_string(), "tbs:2:value");
        assert_eq!(DecodePath::new().to_string(), "");
    }

    #[test]
    fn parse() {
        assert_eq!(
            PathPattern::parse("/a/*/3").segments(),
            &[
                PatternSegment::Root, PatternSegment::Name("a".into()),
                PatternSegment::Any, PatternSegment::Index(3),
            ]
        );
        assert_eq!(
            PathPattern::parse("../b").segments(),
            &[PatternSegment::Up, PatternSegment::Name("b".into())]
        );
        assert_eq!(PathPattern::parse("..").up(), PathPattern::new().up().up());
    }

    #[test]
    fn matches() {
        let pattern = PathPattern::parse("/exts/*/id");
        assert!(pattern.matches(&[
            PathSegment::name("exts"), PathSegment::Index(4),
            PathSegment::name("id"),
        ]));
        assert!(!pattern.matches(&[
            PathSegment::name("exts"), PathSegment::name("x"),
            PathSegment::name("id"),
        ]));
        assert!(!pattern.matches(&[PathSegment::name("exts")]));
        assert!(!PathPattern::parse("../a").matches(&[
            PathSegment::name("a")
        ]));
    }

    #[test]
    fn resolve() {
        let root = path(&[PathSegment::name("outer")]);
        let base = path(&[
            PathSegment::name("outer"), PathSegment::name("alg"),
            PathSegment::name("id"),
        ]);
        assert_eq!(
            PathPattern::parse("../params").resolve(&root, &base),
            Some(vec![
                PatternSegment::Name("alg".into()),
                PatternSegment::Name("params".into()),
            ])
        );
        assert_eq!(
            PathPattern::parse("/x").resolve(&root, &base),
            Some(vec![PatternSegment::Name("x".into())])
        );
        assert_eq!(
            PathPattern::parse("../../../x").resolve(&root, &base),
            None
        );
        assert_eq!(
            PathPattern::parse("a").resolve(&base, &root), None
        );
    }
}
