//! The identifier and length octets of an encoded value.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use log::debug;
use crate::error::Error;
use crate::length::Length;
use crate::tag::Tag;
use super::source::SliceSource;


//------------ Header --------------------------------------------------------

/// The header of an encoded value.
///
/// The header consists of the identifier octets, i.e., the tag and the
/// constructed flag, and the length octets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
    /// The tag of the value.
    pub tag: Tag,

    /// Whether the value is in constructed form.
    pub constructed: bool,

    /// The length of the content.
    pub length: Length,

    /// The offset of the first identifier octet.
    pub offset: usize,

    /// The number of identifier octets.
    pub tlen: usize,

    /// The number of length octets.
    pub llen: usize,
}

impl Header {
    /// Takes a header from the beginning of a source.
    ///
    /// The indefinite length form is only accepted for constructed values
    /// and only if `bered` is true.
    pub fn take_from(
        source: &mut SliceSource, bered: bool
    ) -> Result<Self, Error> {
        let offset = source.pos();
        let (tag, constructed) = Tag::take_from(source)?;
        let tlen = source.pos() - offset;
        let lstart = source.pos();
        let length = Length::take_from(source)?;
        let llen = source.pos() - lstart;
        if length.is_indefinite() {
            if !constructed {
                return Err(Error::decode(
                    "indefinite length for primitive encoding"
                ).at(lstart))
            }
            if !bered {
                return Err(Error::decode(
                    "unallowed indefinite length encoding"
                ).at(lstart))
            }
            debug!("indefinite length value at offset {}", offset);
        }
        Ok(Header { tag, constructed, length, offset, tlen, llen })
    }

    /// Returns the tag and constructed flag of the next value in a source.
    ///
    /// The source is not advanced.
    pub fn peek(source: &SliceSource) -> Result<(Tag, bool), Error> {
        let mut source = *source;
        Tag::take_from(&mut source)
    }

    /// Returns the content of the value.
    ///
    /// For a definite length, the content is split off from `source`
    /// right away. For an indefinite length, the content continues until
    /// the end-of-contents octets and `source` is only advanced past them
    /// by [`Content::finish`].
    pub fn content<'s>(
        &self, source: &mut SliceSource<'s>
    ) -> Result<Content<'s>, Error> {
        match self.length {
            Length::Definite(len) => {
                let start = source.pos();
                let content = source.split_off(len).map_err(|_| {
                    Error::not_enough_data().at(start)
                })?;
                Ok(Content { source: content, start, indefinite: false })
            }
            Length::Indefinite => {
                Ok(Content {
                    source: *source, start: source.pos(), indefinite: true
                })
            }
        }
    }
}


//------------ Content -------------------------------------------------------

/// The content octets of a value.
#[derive(Clone, Copy, Debug)]
pub struct Content<'s> {
    /// The source of the content.
    ///
    /// For the indefinite form this extends until the end of the parent.
    source: SliceSource<'s>,

    /// The offset of the first content octet.
    start: usize,

    /// Whether the content ends with end-of-contents octets.
    indefinite: bool,
}

impl<'s> Content<'s> {
    /// Returns the offset of the first content octet.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the offset of the next octet of the content.
    pub fn pos(&self) -> usize {
        self.source.pos()
    }

    /// Returns whether the content has the indefinite length form.
    pub fn is_indefinite(&self) -> bool {
        self.indefinite
    }

    /// Returns whether all of the content has been consumed.
    pub fn at_end(&self) -> bool {
        if self.indefinite {
            self.source.at_end_of_contents() || self.source.is_empty()
        }
        else {
            self.source.is_empty()
        }
    }

    /// Returns a mutable reference to the content’s source.
    pub fn source(&mut self) -> &mut SliceSource<'s> {
        &mut self.source
    }

    /// Takes all of a definite length content.
    pub fn take_all(&mut self) -> &'s [u8] {
        self.source.take_all()
    }

    /// Finishes the content, returning the length of the content octets.
    ///
    /// For a definite length, fails if there is content left. For the
    /// indefinite form, takes the end-of-contents octets and advances
    /// `parent` past them.
    pub fn finish(
        mut self, parent: &mut SliceSource<'s>
    ) -> Result<usize, Error> {
        if self.indefinite {
            let vlen = self.source.pos() - self.start;
            self.source.take_end_of_contents()?;
            parent.advance_to(&self.source);
            Ok(vlen)
        }
        else if !self.source.is_empty() {
            Err(Error::decode("remaining data in content").at(
                self.source.pos()
            ))
        }
        else {
            Ok(self.source.pos() - self.start)
        }
    }

    /// Skips over the rest of a definite length content.
    pub fn skip_rest(&mut self) {
        if !self.indefinite {
            self.source.take_all();
        }
    }
}


//------------ skip_value ----------------------------------------------------

/// The maximum nesting of constructed values that are walked octet-wise.
///
/// This applies to the chunks of constructed strings and to indefinite
/// length values captured by ANY. The nesting of everything else follows
/// the schema.
pub const MAX_NESTING: usize = 100;

/// Skips over a complete encoded value.
///
/// Values of indefinite length are skipped including all their nested
/// values and the end-of-contents octets.
pub fn skip_value(source: &mut SliceSource, bered: bool) -> Result<(), Error> {
    skip_nested(source, bered, 0)
}

fn skip_nested(
    source: &mut SliceSource, bered: bool, depth: usize
) -> Result<(), Error> {
    let offset = source.pos();
    let header = Header::take_from(source, bered)?;
    match header.length {
        Length::Definite(len) => {
            let start = source.pos();
            source.take(len).map_err(|_| {
                Error::not_enough_data().at(start)
            })?;
        }
        Length::Indefinite => {
            if depth >= MAX_NESTING {
                return Err(Error::decode("too deeply nested").at(offset))
            }
            while !source.at_end_of_contents() {
                skip_nested(source, bered, depth + 1)?;
            }
            source.take_end_of_contents()?;
        }
    }
    Ok(())
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn definite() {
        let mut source = SliceSource::new(b"\x30\x03\x02\x01\x05\xff");
        let header = Header::take_from(&mut source, false).unwrap();
        assert_eq!(header.tag, Tag::SEQUENCE);
        assert!(header.constructed);
        assert_eq!(header.length, Length::Definite(3));
        assert_eq!((header.offset, header.tlen, header.llen), (0, 1, 1));
        let mut content = header.content(&mut source).unwrap();
        assert_eq!(content.start(), 2);
        assert_eq!(source.remaining(), b"\xff");
        assert_eq!(content.take_all(), b"\x02\x01\x05");
        assert_eq!(content.finish(&mut source).unwrap(), 3);
    }

    #[test]
    fn indefinite() {
        let data = b"\x30\x80\x05\x00\x00\x00\x01";
        assert_eq!(
            Header::take_from(&mut SliceSource::new(data), false)
                .unwrap_err().kind(),
            ErrorKind::Decode
        );
        let mut source = SliceSource::new(data);
        let header = Header::take_from(&mut source, true).unwrap();
        let mut content = header.content(&mut source).unwrap();
        assert!(!content.at_end());
        skip_value(content.source(), true).unwrap();
        assert!(content.at_end());
        assert_eq!(content.finish(&mut source).unwrap(), 2);
        assert_eq!(source.remaining(), b"\x01");
    }

    #[test]
    fn primitive_indefinite() {
        let err = Header::take_from(
            &mut SliceSource::new(b"\x04\x80"), true
        ).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.offset(), Some(1));
    }

    #[test]
    fn short_content() {
        let mut source = SliceSource::new(b"\x04\x05\x01");
        let header = Header::take_from(&mut source, false).unwrap();
        let err = header.content(&mut source).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEnoughData);
        assert_eq!(err.offset(), Some(2));
    }

    #[test]
    fn skip_indefinite() {
        let mut source = SliceSource::new(
            b"\x30\x80\x30\x80\x02\x01\x01\x00\x00\x00\x00\x05"
        );
        skip_value(&mut source, true).unwrap();
        assert_eq!(source.remaining(), b"\x05");
    }

    #[test]
    fn skip_depth_limit() {
        let mut data = b"\x30\x80".repeat(MAX_NESTING);
        data.extend_from_slice(&b"\x00\x00".repeat(MAX_NESTING));
        data.push(0x05);
        let mut source = SliceSource::new(&data);
        skip_value(&mut source, true).unwrap();
        assert_eq!(source.remaining(), b"\x05");

        let mut data = b"\x30\x80".repeat(MAX_NESTING + 1);
        data.extend_from_slice(&b"\x00\x00".repeat(MAX_NESTING + 1));
        let err = skip_value(&mut SliceSource::new(&data), true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.offset(), Some(2 * MAX_NESTING));
    }
}
