//! PrimitiveContent and related types.
//!
//! This is an internal module. The relevant items are re-exported by the
//! parent.

use crate::tag::Tag;
use super::target::{Target, infallible};
use super::values::{Values, total_len, write_header};


//------------ PrimitiveContent ----------------------------------------------

/// A type that is encoded as a primitive value.
///
/// This trait should be implemented for types that use primitive encoding.
/// It defines, how the content octets of a single primitive value containing
/// a value of the type are to be created. As a consequence, these types
/// gain the [`encode`] and [`encode_as`] methods from their implementation
/// of this trait.
///
/// Note that the trait requires implementing types to be `Copy` to
/// avoid unnecessary lifetime parameters on the encoder type. For types that
/// aren’t `Copy`, `PrimitiveContent` should be implemented on a reference to
/// the type instead.
///
/// [`encode`]: #method.encode
/// [`encode_as`]: #method.encode_as
pub trait PrimitiveContent: Copy {
    /// The natural tag of an encoded value of this type.
    const TAG: Tag;

    /// Returns the length of the encoded content of this type.
    fn encoded_len(self) -> usize;

    /// Writes the encoded content to a target.
    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error>;


    //--- Provided methods

    /// Returns a value encoder for this content using the natural tag.
    ///
    /// This is identical to `self.encode_as(Self::TAG)`
    fn encode(self) -> Primitive<Self> {
        self.encode_as(Self::TAG)
    }

    /// Returns a value encoder for this content using the given tag.
    ///
    /// The returned value is a content encoder that produces a single
    /// primitive encoded value. The tag for this value is explicitely
    /// given via the `tag` argument.
    fn encode_as(self, tag: Tag) -> Primitive<Self> {
        Primitive::new(tag, self)
    }

    /// Writes the encoded content into a new vec.
    fn encode_to_vec(self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.encoded_len());
        infallible(self.write_encoded(&mut res));
        res
    }
}

//--- impl for built-in types
//
// See crate::int, crate::oid, and crate::string::bit for the impls of
// the remaining content types.

impl PrimitiveContent for () {
    const TAG: Tag = Tag::NULL;

    fn encoded_len(self) -> usize {
        0
    }

    fn write_encoded<T: Target>(
        self,
        _: &mut T
    ) -> Result<(), T::Error> {
        Ok(())
    }
}

impl PrimitiveContent for bool {
    const TAG: Tag = Tag::BOOLEAN;

    fn encoded_len(self) -> usize {
        1
    }

    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error> {
        if self {
            target.write_all(&[0xff])
        }
        else {
            target.write_all(&[0])
        }
    }
}

impl PrimitiveContent for &'_ [u8] {
    const TAG: Tag = Tag::OCTET_STRING;

    fn encoded_len(self) -> usize {
        self.len()
    }

    fn write_encoded<T: Target>(
        self,
        target: &mut T
    ) -> Result<(), T::Error> {
        target.write_all(self)
    }
}


//------------ Primitive -----------------------------------------------------

/// A value encoder for primitively encoded types.
///
/// This type is returned by [`PrimitiveContent::encode`] and
/// [`PrimitiveContent::encode_as`].
pub struct Primitive<P> {
    /// The tag of the value
    tag: Tag,

    /// The primitive content.
    prim: P,
}

impl<P> Primitive<P> {
    fn new(tag: Tag, prim: P) -> Self {
        Self { tag, prim }
    }
}

impl<P: PrimitiveContent> Values for Primitive<P> {
    fn encoded_len(&self) -> usize {
        total_len(self.tag, self.prim.encoded_len())
    }

    fn write_encoded<T: Target>(
        &self,
        target: &mut T
    ) -> Result<(), T::Error> {
        write_header(target, self.tag, false, self.prim.encoded_len())?;
        self.prim.write_encoded(target)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builtin_content() {
        assert_eq!(().encode().to_vec(), b"\x05\x00");
        assert_eq!(true.encode_to_vec(), b"\xff");
        assert_eq!(
            b"ab".as_ref().encode_as(Tag::ctx(1)).to_vec(),
            b"\x81\x02ab"
        );
    }
}
