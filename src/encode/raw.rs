//! Encoding raw data.
//!
//! The functions in this module produce encoders for hand-assembled BER.
//! Unlike the encoding of a [`Value`][crate::Value], nothing here is
//! checked against a schema, which allows producing constructed string
//! encodings, indefinite lengths, and the like.

use crate::tag::Tag;
use super::primitive::PrimitiveContent;
use super::target::Target;
use super::values::{
    Values, total_indefinite_len, total_len, write_end_of_contents,
    write_header, write_indefinite_header,
};


/// Encodes the given data as the content of a primitive value.
pub fn primitive<'s>(
    tag: Tag, data: &'s (impl AsRef<[u8]> + ?Sized),
) -> impl Values + 's {
    data.as_ref().encode_as(tag)
}

pub use self::primitive as prim;


/// Encodes the given values as the content of a definite length
/// constructed value.
pub fn definite_constructed<V: Values>(
    tag: Tag, content: V
) -> impl Values {
    DefiniteConstructed { tag, content }
}

pub use self::definite_constructed as dcons;


struct DefiniteConstructed<V> {
    tag: Tag,
    content: V,
}

impl<V: Values> Values for DefiniteConstructed<V> {
    fn encoded_len(&self) -> usize {
        total_len(self.tag, self.content.encoded_len())
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        write_header(target, self.tag, true, self.content.encoded_len())?;
        self.content.write_encoded(target)
    }
}


/// Encodes the given values as the content of an indefinite length
/// constructed value.
pub fn indefinite_constructed<V: Values>(
    tag: Tag, content: V
) -> impl Values {
    IndefiniteConstructed { tag, content }
}

pub use self::indefinite_constructed as icons;


struct IndefiniteConstructed<V> {
    tag: Tag,
    content: V,
}

impl<V: Values> Values for IndefiniteConstructed<V> {
    fn encoded_len(&self) -> usize {
        total_indefinite_len(self.tag, self.content.encoded_len())
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        write_indefinite_header(target, self.tag)?;
        self.content.write_encoded(target)?;
        write_end_of_contents(target)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nested_constructed() {
        let v = icons(Tag::OCTET_STRING, (
            prim(Tag::OCTET_STRING, b"ab"),
            dcons(Tag::OCTET_STRING, prim(Tag::OCTET_STRING, b"c")),
        ));
        let encoded = v.to_vec();
        assert_eq!(
            encoded,
            b"\x24\x80\x04\x02ab\x24\x03\x04\x01c\x00\x00"
        );
        assert_eq!(encoded.len(), v.encoded_len());
    }
}
