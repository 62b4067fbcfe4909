//! The source of data to decode.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use crate::error::Error;


//------------ SliceSource ---------------------------------------------------

/// A cursor over a bytes slice to decode.
///
/// The source keeps track of its position relative to the start of the
/// overall data so that errors can report the offset of the offending
/// octet. Splitting off a part of the source for the content of a value
/// creates a new source that continues counting from where the parent
/// was.
#[derive(Clone, Copy, Debug)]
pub struct SliceSource<'s> {
    /// The remaining data.
    data: &'s [u8],

    /// The offset of the first octet of `data`.
    pos: usize,
}

impl<'s> SliceSource<'s> {
    /// Creates a new source starting at offset zero.
    pub fn new(data: &'s [u8]) -> Self {
        Self::with_offset(data, 0)
    }

    /// Creates a new source whose first octet is at the given offset.
    pub fn with_offset(data: &'s [u8], pos: usize) -> Self {
        SliceSource { data, pos }
    }

    /// Returns the offset of the next octet.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the remaining data.
    pub fn remaining(&self) -> &'s [u8] {
        self.data
    }

    /// Returns the number of remaining octets.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the source has been exhausted.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the n-th octet if that many octets are available.
    pub fn peek_nth(&self, n: usize) -> Option<u8> {
        self.data.get(n).copied()
    }

    /// Takes a single octet from the source.
    ///
    /// If there aren’t any more octets available from the source, returns
    /// a not-enough-data error.
    pub fn take_u8(&mut self) -> Result<u8, Error> {
        match self.data.split_first() {
            Some((&first, tail)) => {
                self.data = tail;
                self.pos += 1;
                Ok(first)
            }
            None => Err(Error::not_enough_data().at(self.pos))
        }
    }

    /// Takes the next `len` octets from the source.
    pub fn take(&mut self, len: usize) -> Result<&'s [u8], Error> {
        match self.data.split_at_checked(len) {
            Some((head, tail)) => {
                self.data = tail;
                self.pos += len;
                Ok(head)
            }
            None => Err(Error::not_enough_data().at(self.pos))
        }
    }

    /// Takes all remaining octets.
    pub fn take_all(&mut self) -> &'s [u8] {
        let res = self.data;
        self.pos += res.len();
        self.data = b"";
        res
    }

    /// Splits off a source for the next `len` octets.
    ///
    /// The returned source starts at the current position, `self` is
    /// advanced past the split off part.
    pub fn split_off(&mut self, len: usize) -> Result<Self, Error> {
        let pos = self.pos;
        let data = self.take(len)?;
        Ok(SliceSource::with_offset(data, pos))
    }

    /// Advances `self` to where the given source derived from it is.
    ///
    /// This is used when decoding indefinite length values which work on
    /// a copy of the source and only learn how far they went at the end.
    pub fn advance_to(&mut self, other: &Self) {
        debug_assert!(other.pos >= self.pos);
        let len = other.pos - self.pos;
        self.data = &self.data[len..];
        self.pos = other.pos;
    }

    /// Returns whether the source starts with the end-of-contents octets.
    pub fn at_end_of_contents(&self) -> bool {
        self.data.starts_with(b"\0\0")
    }

    /// Takes the end-of-contents octets.
    ///
    /// Returns an error if the source is exhausted or doesn’t start with
    /// them.
    pub fn take_end_of_contents(&mut self) -> Result<(), Error> {
        if self.data.len() < 2 {
            return Err(Error::not_enough_data().at(self.pos))
        }
        if !self.at_end_of_contents() {
            return Err(Error::decode("no end-of-contents octets").at(self.pos))
        }
        self.data = &self.data[2..];
        self.pos += 2;
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn take_and_split() {
        let mut src = SliceSource::with_offset(b"\x01\x02\x03\x04", 10);
        assert_eq!(src.take_u8().unwrap(), 1);
        assert_eq!(src.pos(), 11);
        let mut sub = src.split_off(2).unwrap();
        assert_eq!(sub.pos(), 11);
        assert_eq!(sub.take_all(), b"\x02\x03");
        assert_eq!(sub.pos(), 13);
        assert_eq!(src.pos(), 13);
        let err = src.take(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotEnoughData);
        assert_eq!(err.offset(), Some(13));
    }

    #[test]
    fn end_of_contents() {
        let mut src = SliceSource::new(b"\x00\x00\x05");
        let mut copy = src;
        assert!(copy.at_end_of_contents());
        copy.take_end_of_contents().unwrap();
        src.advance_to(&copy);
        assert_eq!(src.remaining(), b"\x05");
        assert_eq!(
            src.take_end_of_contents().unwrap_err().kind(),
            ErrorKind::NotEnoughData
        );
    }
}
