//! ASN.1 Object Identifiers.
//!
//! This module contains the [`Oid`] type that implements object identifiers,
//! a construct used by ASN.1 to uniquely identify all sorts of things. The
//! type is also re-exported at the top-level.

use std::{fmt, ops, str};
use smallvec::SmallVec;
use crate::encode::{PrimitiveContent, Target};
use crate::error::{Error, ErrorKind};
use crate::tag::Tag;


//------------ Oid -----------------------------------------------------------

/// An object identifer.
///
/// Object identifiers are globally unique, hierarchical values that are used
/// to identify objects or their type. When written, they are presented as a
/// sequence of integers separated by dots such as ‘1.3.6.1.5.5.7.1’.
///
/// Values of this type keep the arcs of the identifier as `u64`s. A value
/// always has at least two arcs, the first arc is 0, 1, or 2 and, if it is
/// 0 or 1, the second arc is at most 39. These rules are checked when
/// creating a value from arcs, from a string, or from encoded content.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Oid(SmallVec<[u64; 10]>);

impl Oid {
    /// Creates an object identifier from its arcs.
    pub fn from_arcs(arcs: &[u64]) -> Result<Self, Error> {
        Self::check_arcs(arcs)?;
        Ok(Oid(arcs.into()))
    }

    fn check_arcs(arcs: &[u64]) -> Result<(), Error> {
        match *arcs {
            [] | [_] => Err(Error::new(
                ErrorKind::InvalidOid, "less than two arcs"
            )),
            [first, _, ..] if first > 2 => Err(Error::new(
                ErrorKind::InvalidOid, "unacceptable first arc"
            )),
            [first, second, ..] if first < 2 && second > 39 => {
                Err(Error::new(
                    ErrorKind::InvalidOid, "unacceptable second arc"
                ))
            }
            [2, second, ..] if second > u64::MAX - 80 => {
                Err(Error::new(
                    ErrorKind::InvalidOid, "too big second arc"
                ))
            }
            _ => Ok(())
        }
    }

    /// Returns the arcs of the object identifier.
    pub fn arcs(&self) -> &[u64] {
        self.0.as_slice()
    }

    /// Returns an iterator over the subidentifiers to be encoded.
    ///
    /// The first two arcs are combined into the first subidentifier.
    fn subidentifiers(&self) -> impl Iterator<Item = u64> + '_ {
        let first = self.0[0] * 40 + self.0[1];
        std::iter::once(first).chain(self.0[2..].iter().copied())
    }
}

/// # Decoding and Encoding
///
impl Oid {
    /// Decodes the content octets of an OBJECT IDENTIFIER.
    ///
    /// Every subidentifier must be minimally encoded, i.e., must not start
    /// with an octet of 0x80. The content must not be empty and must not
    /// end in the middle of a subidentifier.
    pub fn decode_content(content: &[u8]) -> Result<Self, Error> {
        if content.is_empty() {
            return Err(Error::decode("zero length OID"))
        }
        let mut arcs = SmallVec::new();
        let mut iter = content.iter();
        while let Some(&first) = iter.next() {
            if first == 0x80 {
                return Err(Error::decode("non normalized arc encoding"))
            }
            let mut arc = u64::from(first & 0x7F);
            let mut octet = first;
            while octet & 0x80 != 0 {
                octet = match iter.next() {
                    Some(&octet) => octet,
                    None => return Err(Error::decode("unfinished OID"))
                };
                if arc > u64::MAX >> 7 {
                    return Err(Error::decode("too big OID arc"))
                }
                arc = arc << 7 | u64::from(octet & 0x7F);
            }
            if arcs.is_empty() {
                match arc {
                    0..=39 => arcs.extend([0, arc]),
                    40..=79 => arcs.extend([1, arc - 40]),
                    _ => arcs.extend([2, arc - 80]),
                }
            }
            else {
                arcs.push(arc)
            }
        }
        Ok(Oid(arcs))
    }

    /// Returns the content octets of the object identifier.
    pub fn encode_content(&self) -> Vec<u8> {
        let mut res = Vec::new();
        for arc in self.subidentifiers() {
            append_subidentifier(arc, &mut res)
        }
        res
    }
}

fn append_subidentifier(arc: u64, target: &mut Vec<u8>) {
    let digits = subidentifier_len(arc);
    for i in (0..digits).rev() {
        let digit = ((arc >> (7 * i)) & 0x7F) as u8;
        if i == 0 {
            target.push(digit)
        }
        else {
            target.push(digit | 0x80)
        }
    }
}

fn subidentifier_len(arc: u64) -> usize {
    let bits = (u64::BITS - arc.leading_zeros()) as usize;
    bits.div_ceil(7).max(1)
}


//--- FromStr

impl str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let arcs = s.split('.').map(|arc| {
            if arc.is_empty() || !arc.bytes().all(|ch| ch.is_ascii_digit()) {
                return Err(Error::new(
                    ErrorKind::InvalidOid, format!("invalid arc '{}'", arc)
                ))
            }
            arc.parse::<u64>().map_err(|_| Error::new(
                ErrorKind::InvalidOid, format!("too big arc '{}'", arc)
            ))
        }).collect::<Result<SmallVec<[u64; 10]>, _>>()?;
        Self::check_arcs(&arcs)?;
        Ok(Oid(arcs))
    }
}


//--- Deref and AsRef

impl ops::Deref for Oid {
    type Target = [u64];

    fn deref(&self) -> &[u64] {
        self.arcs()
    }
}

impl AsRef<[u64]> for Oid {
    fn as_ref(&self) -> &[u64] {
        self.arcs()
    }
}


//--- Display

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut arcs = self.0.iter();
        if let Some(first) = arcs.next() {
            write!(f, "{}", first)?;
        }
        for arc in arcs {
            write!(f, ".{}", arc)?;
        }
        Ok(())
    }
}


//--- PrimitiveContent

impl PrimitiveContent for &'_ Oid {
    const TAG: Tag = Tag::OID;

    fn encoded_len(self) -> usize {
        self.subidentifiers().map(subidentifier_len).sum()
    }

    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(&self.encode_content())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::Values;

    fn oid(s: &str) -> Oid {
        s.parse().unwrap()
    }

    #[test]
    fn decode_scenario() {
        let oid = Oid::decode_content(b"\x55\x02\xc0\x00").unwrap();
        assert_eq!(oid.arcs(), &[2, 5, 2, 8192]);
        assert_eq!(oid.to_string(), "2.5.2.8192");
    }

    #[test]
    fn first_subidentifier() {
        assert_eq!(Oid::decode_content(b"\x27").unwrap().arcs(), &[0, 39]);
        assert_eq!(Oid::decode_content(b"\x28").unwrap().arcs(), &[1, 0]);
        assert_eq!(Oid::decode_content(b"\x50").unwrap().arcs(), &[2, 0]);
        assert_eq!(
            Oid::decode_content(b"\x88\x37").unwrap().arcs(), &[2, 999]
        );
    }

    #[test]
    fn encode() {
        assert_eq!(
            oid("1.2.840.113549.1.1.11").encode().to_vec(),
            b"\x06\x09\x2a\x86\x48\x86\xf7\x0d\x01\x01\x0b"
        );
        assert_eq!(oid("2.999").encode_content(), b"\x88\x37");
        assert_eq!(oid("0.0").encode_content(), b"\x00");
        for s in ["1.2.840.113549.1.1.11", "2.5.2.8192", "0.0"] {
            let o = oid(s);
            assert_eq!((&o).encoded_len(), o.encode_content().len());
            assert_eq!(Oid::decode_content(&o.encode_content()).unwrap(), o);
        }
    }

    #[test]
    fn decode_failures() {
        assert_eq!(
            Oid::decode_content(b"").unwrap_err().msg(), "zero length OID"
        );
        assert_eq!(
            Oid::decode_content(b"\x2a\x80\x01").unwrap_err().msg(),
            "non normalized arc encoding"
        );
        assert_eq!(
            Oid::decode_content(b"\x2a\x86").unwrap_err().msg(),
            "unfinished OID"
        );
        assert_eq!(
            Oid::decode_content(
                b"\x2a\x81\x80\x80\x80\x80\x80\x80\x80\x80\x80\x00"
            ).unwrap_err().msg(),
            "too big OID arc"
        );
    }

    #[test]
    fn from_str_failures() {
        for s in ["", "1", "3.1", "0.40", "1.2.", "1..2", "1.a", "-1.2"] {
            assert_eq!(
                s.parse::<Oid>().unwrap_err().kind(), ErrorKind::InvalidOid,
                "{}", s
            );
        }
        assert!(Oid::from_arcs(&[2, 40]).is_ok());
        assert!(Oid::from_arcs(&[1, 40]).is_err());
    }
}
