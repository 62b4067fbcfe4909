//! Error handling.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::fmt;
use std::borrow::Cow;
use crate::decode::DecodePath;


//------------ ErrorKind -----------------------------------------------------

/// The kind of an error.
///
/// Decoding errors are reported as one of the first five kinds, the
/// remaining ones are produced when building schemas or values.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// The data ended before a declared or implied length.
    ///
    /// This can only be cured by supplying more data.
    #[error("not enough data")]
    NotEnoughData,

    /// The data violates the encoding rules.
    #[error("decode error")]
    Decode,

    /// A tag was found where a different one was expected.
    #[error("tag mismatch")]
    TagMismatch,

    /// A value or length is outside the bounds declared by the schema.
    #[error("bounds error")]
    Bounds,

    /// A fixed size type had content of a different length.
    #[error("invalid length")]
    InvalidLength,

    /// An object identifier is malformed.
    #[error("invalid object identifier")]
    InvalidOid,

    /// A value of the wrong type was used.
    #[error("invalid value type")]
    InvalidValueType,

    /// A name is not known to the schema.
    #[error("unknown object")]
    ObjUnknown,

    /// A value was encoded while a required part of it is missing.
    #[error("object is not ready")]
    ObjNotReady,
}


//------------ Error ---------------------------------------------------------

/// An error happened while building, encoding, or decoding a value.
///
/// Errors happening during decoding carry the offset of the offending
/// octet from the start of the data and the decode path of the value
/// that was being decoded. Errors raised while constructing values lack
/// both.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind}: {msg}{}", Location::new(.offset, .path))]
pub struct Error {
    /// What kind of error this is.
    kind: ErrorKind,

    /// A description of what went wrong.
    msg: Cow<'static, str>,

    /// The offset of the octet that caused the error.
    offset: Option<usize>,

    /// The decode path of the value that caused the error.
    path: Option<DecodePath>,
}

impl Error {
    /// Creates a new error of the given kind without a location.
    pub fn new(kind: ErrorKind, msg: impl Into<Cow<'static, str>>) -> Self {
        xerr!(Error { kind, msg: msg.into(), offset: None, path: None })
    }

    /// Creates a new decoding error.
    pub fn decode(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Decode, msg)
    }

    /// Creates an error for data ending early.
    pub fn not_enough_data() -> Self {
        Self::new(ErrorKind::NotEnoughData, "unexpected end of data")
    }

    /// Creates a tag mismatch error.
    pub fn tag_mismatch(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::TagMismatch, msg)
    }

    /// Adds the offset of the error.
    ///
    /// If the error already has an offset, it is kept.
    pub fn at(mut self, offset: usize) -> Self {
        if self.offset.is_none() {
            self.offset = Some(offset)
        }
        self
    }

    /// Adds the decode path of the error.
    ///
    /// If the error already has a path, it is kept. Errors are created
    /// deepest first, so the first path attached is the most precise one.
    pub fn in_path(mut self, path: &DecodePath) -> Self {
        if self.path.is_none() {
            self.path = Some(path.clone())
        }
        self
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn msg(&self) -> &str {
        self.msg.as_ref()
    }

    /// Returns the offset of the error if it happened during decoding.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Returns the decode path if the error happened during decoding.
    pub fn path(&self) -> Option<&DecodePath> {
        self.path.as_ref()
    }
}


//------------ Location ------------------------------------------------------

/// Helper for displaying the location part of an error.
struct Location<'a> {
    offset: &'a Option<usize>,
    path: &'a Option<DecodePath>,
}

impl<'a> Location<'a> {
    fn new(
        offset: &'a Option<usize>, path: &'a Option<DecodePath>
    ) -> Self {
        Location { offset, path }
    }
}

impl<'a> fmt::Display for Location<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.offset, self.path) {
            (Some(offset), Some(path)) => {
                write!(f, " (offset {}, path {})", offset, path)
            }
            (Some(offset), None) => write!(f, " (offset {})", offset),
            (None, Some(path)) => write!(f, " (path {})", path),
            (None, None) => Ok(())
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::decode::PathSegment;

    #[test]
    fn location_is_kept() {
        let mut path = DecodePath::new();
        path.push(PathSegment::name("inner"));
        let err = Error::decode("bad").at(7).in_path(&path);
        let outer = DecodePath::new();
        let err = err.at(2).in_path(&outer);
        assert_eq!(err.offset(), Some(7));
        assert_eq!(err.path(), Some(&path));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn display() {
        assert_eq!(
            Error::decode("bad").to_string(),
            "decode error: bad"
        );
        let mut path = DecodePath::new();
        path.push(PathSegment::name("a"));
        path.push(PathSegment::Index(1));
        assert_eq!(
            Error::not_enough_data().at(3).in_path(&path).to_string(),
            "not enough data: unexpected end of data (offset 3, path a:1)"
        );
    }
}
