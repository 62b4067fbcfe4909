//! The identifier octets of an encoded value.
//!
//! This is a private module. Its public items are re-exported by the parent.

use std::fmt;
use crate::decode::SliceSource;
use crate::encode::Target;
use crate::error::Error;


//------------ Class ---------------------------------------------------------

/// The class of a tag.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    const fn from_u8(octet: u8) -> Self {
        match octet {
            0x00..=0x3F => Self::Universal,
            0x40..=0x7F => Self::Application,
            0x80..=0xBF => Self::Context,
            0xC0..=0xFF => Self::Private
        }
    }

    const fn into_u8(self) -> u8 {
        match self {
            Self::Universal => 0x00,
            Self::Application => 0x40,
            Self::Context => 0x80,
            Self::Private => 0xC0,
        }
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a value.
///
/// In ASN.1, tags are used to identify the type of a value. Tags consist of
/// one of four classes, represented by the [`Class`] enum, and a number
/// within this class. The number is an unsigned integer.
///
/// In BER encoding, the tag becomes part of the identifier octets by
/// combining it with a bit indicating whether a value is primitive or
/// constructed. The `Tag` type represents the tag only, the form is
/// passed along separately where needed.
///
/// # Limitations
///
/// We only support tag numbers that fit into a `u32`. This should be more
/// than enough in practice.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tag {
    class: Class,
    number: u32,
}

impl Tag {
    /// The mask for the constructed bit in the first identifier octet.
    const CONSTRUCTED_MASK: u8 = 0x20;

    /// The value of the lower five bits marking a multi-octet tag number.
    const SINGLEBYTE_DATA_MASK: u8 = 0x1f;

    /// The mask for the seven data bits of subsequent octets.
    const MULTIBYTE_DATA_MASK: u8 = 0x7f;

    /// The mask for the bit signalling that more octets follow.
    const LAST_OCTET_MASK: u8 = 0x80;

    /// Creates a tag from a class and number.
    pub const fn new(class: Class, number: u32) -> Self {
        Tag { class, number }
    }

    /// Creates a new tag in the universal class with the given number.
    pub const fn universal(number: u32) -> Self {
        Self::new(Class::Universal, number)
    }

    /// Creates a new tag in the application class with the given number.
    pub const fn application(number: u32) -> Self {
        Self::new(Class::Application, number)
    }

    /// Creates a new tag in class “context specific” with the given number.
    pub const fn ctx(number: u32) -> Self {
        Self::new(Class::Context, number)
    }

    /// Creates a new tag in the private class with the given number.
    pub const fn private(number: u32) -> Self {
        Self::new(Class::Private, number)
    }

    /// Returns the class of the tag.
    pub const fn class(self) -> Class {
        self.class
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        self.number
    }

    /// Returns whether the tag is of the universal class.
    pub fn is_universal(self) -> bool {
        self.class == Class::Universal
    }

    /// Returns whether the tag is of the context specific class.
    pub fn is_context_specific(self) -> bool {
        self.class == Class::Context
    }
}

/// # Constants for universal tags.
///
/// See clause 8.4 of ITU Recommendation X.690.
///
impl Tag {
    /// The tag marking the end-of-contents in an indefinite length value.
    pub const END_OF_CONTENTS: Self = Self::universal(0);

    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Self::universal(1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Self::universal(2);

    /// The tag for the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Self::universal(3);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Self::universal(4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Self::universal(5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Self::universal(6);

    /// The tag for the ObjectDescriptor type, UNIVERSAL 7.
    pub const OBJECT_DESCRIPTOR: Self = Self::universal(7);

    /// The tag for the ENUMERATED type, UNIVERSAL 10.
    pub const ENUMERATED: Self = Self::universal(10);

    /// The tag for the UTF8String type, UNIVERSAL 12
    pub const UTF8_STRING: Self = Self::universal(12);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Self::universal(16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Self::universal(17);

    /// The tag for the NumericString type, UNIVERSAL 18.
    pub const NUMERIC_STRING: Self = Self::universal(18);

    /// The tag for the PrintableString type, UNIVERSAL 19.
    pub const PRINTABLE_STRING: Self = Self::universal(19);

    /// The tag for the TeletexString type, UNIVERSAL 20.
    pub const TELETEX_STRING: Self = Self::universal(20);

    /// The tag for the VideotexString type, UNIVERSAL 21.
    pub const VIDEOTEX_STRING: Self = Self::universal(21);

    /// The tag for the IA5String type, UNIVERSAL 22.
    pub const IA5_STRING: Self = Self::universal(22);

    /// The tag for the UTCTime type, UNIVERSAL 23.
    pub const UTC_TIME: Self = Self::universal(23);

    /// The tag for the GeneralizedType type, UNIVERSAL 24.
    pub const GENERALIZED_TIME: Self = Self::universal(24);

    /// The tag for the GraphicString type, UNIVERSAL 25.
    pub const GRAPHIC_STRING: Self = Self::universal(25);

    /// The tag for the VisibleString type, UNIVERSAL 26.
    pub const VISIBLE_STRING: Self = Self::universal(26);

    /// The tag for the GeneralString type, UNIVERSAL 27.
    pub const GENERAL_STRING: Self = Self::universal(27);

    /// The tag for the UniversalString type, UNIVERSAL 28.
    pub const UNIVERSAL_STRING: Self = Self::universal(28);

    /// The tag for the BMPString type, UNIVERSAL 30.
    pub const BMP_STRING: Self = Self::universal(30);
}

/// # Encoding and Decoding
///
impl Tag {
    /// Returns the number of octets of the encoded form of the tag.
    pub fn encoded_len(self) -> usize {
        if self.number < u32::from(Self::SINGLEBYTE_DATA_MASK) {
            1
        }
        else {
            let bits = (u32::BITS - self.number.leading_zeros()) as usize;
            1 + bits.div_ceil(7)
        }
    }

    /// Appends the identifier octets for this tag to a vec.
    ///
    /// If `constructed` is `true`, the encoded tag will signal a value in
    /// constructed encoding and primitive encoding otherwise.
    ///
    /// Tag numbers below 31 are encoded in the first octet together with
    /// class and form. Larger numbers set the lower five bits of the first
    /// octet and follow with the number in base 128, most significant
    /// digit first, with bit 8 set in all but the last octet.
    pub fn append_encoded(self, constructed: bool, target: &mut Vec<u8>) {
        let mut first = self.class.into_u8();
        if constructed {
            first |= Self::CONSTRUCTED_MASK
        }
        if self.number < u32::from(Self::SINGLEBYTE_DATA_MASK) {
            target.push(first | self.number as u8);
            return
        }
        target.push(first | Self::SINGLEBYTE_DATA_MASK);
        let digits = self.encoded_len() - 1;
        for i in (0..digits).rev() {
            let digit = (
                (self.number >> (7 * i)) as u8
            ) & Self::MULTIBYTE_DATA_MASK;
            if i == 0 {
                target.push(digit)
            }
            else {
                target.push(digit | Self::LAST_OCTET_MASK)
            }
        }
    }

    /// Returns the identifier octets for this tag.
    pub fn encode(self, constructed: bool) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.encoded_len());
        self.append_encoded(constructed, &mut res);
        res
    }

    /// Writes the identifier octets to a target.
    pub fn write_encoded<T: Target>(
        self, constructed: bool, target: &mut T
    ) -> Result<(), T::Error> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.append_encoded(constructed, &mut buf);
        target.write_all(&buf)
    }

    /// Takes a tag from the beginning of a source.
    ///
    /// Upon success, returns both the tag and whether the value is
    /// constructed.
    pub fn take_from(
        source: &mut SliceSource,
    ) -> Result<(Self, bool), Error> {
        let start = source.pos();
        let first = source.take_u8()?;
        let class = Class::from_u8(first);
        let constructed = first & Self::CONSTRUCTED_MASK != 0;
        if first & Self::SINGLEBYTE_DATA_MASK != Self::SINGLEBYTE_DATA_MASK {
            let number = u32::from(first & Self::SINGLEBYTE_DATA_MASK);
            return Ok((Tag::new(class, number), constructed))
        }

        let mut number = 0u32;
        let mut idx = 0;
        loop {
            let octet = match source.take_u8() {
                Ok(octet) => octet,
                Err(_) => {
                    return Err(Error::decode("unfinished tag").at(start))
                }
            };
            if idx == 0 && octet == Self::LAST_OCTET_MASK {
                return Err(
                    Error::decode("leading zero octet in tag number")
                        .at(start)
                )
            }
            if number > u32::MAX >> 7 {
                return Err(Error::decode("too big tag number").at(start))
            }
            number = number << 7
                | u32::from(octet & Self::MULTIBYTE_DATA_MASK);
            if octet & Self::LAST_OCTET_MASK == 0 {
                break
            }
            idx += 1;
        }
        if number < u32::from(Self::SINGLEBYTE_DATA_MASK) {
            return Err(
                Error::decode("multi-octet form of a low tag number")
                    .at(start)
            )
        }
        Ok((Tag::new(class, number), constructed))
    }

    /// Decodes the tag at the start of a bytes slice.
    ///
    /// Returns the tag, whether the value is constructed, and the
    /// remaining data.
    pub fn decode(data: &[u8]) -> Result<(Self, bool, &[u8]), Error> {
        let mut source = SliceSource::new(data);
        let (tag, constructed) = Self::take_from(&mut source)?;
        Ok((tag, constructed, source.remaining()))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::BOOLEAN => write!(f, "BOOLEAN"),
            Tag::INTEGER => write!(f, "INTEGER"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::NULL => write!(f, "NULL"),
            Tag::OID => write!(f, "OBJECT IDENTIFIER"),
            Tag::OBJECT_DESCRIPTOR => write!(f, "ObjectDescriptor"),
            Tag::ENUMERATED => write!(f, "ENUMERATED"),
            Tag::UTF8_STRING => write!(f, "UTF8String"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag::SET => write!(f, "SET"),
            Tag::NUMERIC_STRING => write!(f, "NumericString"),
            Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
            Tag::TELETEX_STRING => write!(f, "TeletexString"),
            Tag::VIDEOTEX_STRING => write!(f, "VideotexString"),
            Tag::IA5_STRING => write!(f, "IA5String"),
            Tag::UTC_TIME => write!(f, "UTCTime"),
            Tag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            Tag::GRAPHIC_STRING => write!(f, "GraphicString"),
            Tag::VISIBLE_STRING => write!(f, "VisibleString"),
            Tag::GENERAL_STRING => write!(f, "GeneralString"),
            Tag::UNIVERSAL_STRING => write!(f, "UniversalString"),
            Tag::BMP_STRING => write!(f, "BMPString"),
            tag => {
                match tag.class() {
                    Class::Universal => write!(f, "[UNIVERSAL ")?,
                    Class::Application => write!(f, "[APPLICATION ")?,
                    Class::Context => write!(f, "[")?,
                    Class::Private => write!(f, "[PRIVATE ")?,
                }
                write!(f, "{}]", tag.number())
            }
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    const CLASSES: &[Class] = &[
        Class::Universal, Class::Application, Class::Context, Class::Private
    ];

    #[test]
    fn round_trip() {
        let numbers = (0..40).chain(
            [0x7e, 0x7f, 0x80, 0x3fff, 0x4000, 0x1f_ffff, 0x20_0000]
        ).chain([u32::MAX - 1, u32::MAX]);
        for &class in CLASSES {
            for number in numbers.clone() {
                for constructed in [false, true] {
                    let tag = Tag::new(class, number);
                    let encoded = tag.encode(constructed);
                    assert_eq!(encoded.len(), tag.encoded_len());
                    let (decoded, cons, tail) = Tag::decode(
                        &encoded
                    ).unwrap();
                    assert_eq!(decoded, tag);
                    assert_eq!(cons, constructed);
                    assert!(tail.is_empty());
                }
            }
        }
    }

    #[test]
    fn single_octet_tags() {
        assert_eq!(Tag::SEQUENCE.encode(true), b"\x30");
        assert_eq!(Tag::INTEGER.encode(false), b"\x02");
        assert_eq!(Tag::ctx(0).encode(true), b"\xa0");
        assert_eq!(Tag::private(30).encode(false), b"\xde");
        assert_eq!(Tag::application(3).encode(true), b"\x63");
    }

    #[test]
    fn multi_octet_tags() {
        assert_eq!(Tag::ctx(31).encode(false), b"\x9f\x1f");
        assert_eq!(Tag::ctx(0x7f).encode(false), b"\x9f\x7f");
        assert_eq!(Tag::ctx(0x80).encode(false), b"\x9f\x81\x00");
        assert_eq!(Tag::universal(0x4000).encode(true), b"\x3f\x81\x80\x00");
    }

    #[test]
    fn largest_number() {
        let tag = Tag::ctx(u32::MAX);
        assert_eq!(tag.encode(false), b"\x9f\x8f\xff\xff\xff\x7f");
        let (decoded, _, tail) = Tag::decode(
            b"\x9f\x8f\xff\xff\xff\x7f\x00"
        ).unwrap();
        assert_eq!(decoded.number(), u32::MAX);
        assert_eq!(tail, b"\x00");
    }

    #[test]
    fn tags_failures() {
        let err = Tag::decode(b"\x1f\x81\x80").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.msg(), "unfinished tag");
        assert_eq!(
            Tag::decode(b"\x1f\x80\x01").unwrap_err().msg(),
            "leading zero octet in tag number"
        );
        assert_eq!(
            Tag::decode(b"\x1f\x1e").unwrap_err().msg(),
            "multi-octet form of a low tag number"
        );
        assert_eq!(
            Tag::decode(b"\x1f\x90\x80\x80\x80\x00").unwrap_err().msg(),
            "too big tag number"
        );
        assert_eq!(
            Tag::decode(b"").unwrap_err().kind(),
            ErrorKind::NotEnoughData
        );
    }

    #[test]
    fn display() {
        assert_eq!(Tag::SEQUENCE.to_string(), "SEQUENCE");
        assert_eq!(Tag::ctx(3).to_string(), "[3]");
        assert_eq!(Tag::application(1).to_string(), "[APPLICATION 1]");
    }
}
