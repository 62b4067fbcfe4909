//! Everything related to the `Values` trait.
//!
//! This is an internal module. The relevant items are re-exported by the
//! parent.

use crate::length::Length;
use crate::tag::Tag;
use super::target::{Target, infallible};


//------------ Values --------------------------------------------------------

/// A type that is a value encoder.
///
/// Value encoders know how to encode themselves into a sequence of encoded
/// values. That is, the type becomes the content or part of the content
/// of a constructed value.
pub trait Values {
    /// Returns the length of the encoded values.
    fn encoded_len(&self) -> usize;

    /// Encodes the values and writes them to `target`.
    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error>;


    //--- Provided methods

    /// Writes the encoded values into a new vec.
    fn to_vec(&self) -> Vec<u8> {
        let mut target = Vec::with_capacity(self.encoded_len());
        infallible(self.write_encoded(&mut target));
        target
    }
}


//--- Blanket impls

impl<V: Values + ?Sized> Values for &'_ V {
    fn encoded_len(&self) -> usize {
        (*self).encoded_len()
    }

    fn write_encoded<T: Target>(
        &self,
        target: &mut T
    ) -> Result<(), T::Error> {
        (*self).write_encoded(target)
    }
}


//--- Impls for Tuples

/// Macro for implementing `Values` for tuples.
///
/// This macro implements `Values` for all tuples up to a certain degree.
/// It needs to be invoked as below. All the `Tx`s are the type parameters
/// of the elements the tuple, the numbers are the tuple element numbers.
/// The number need to be provided backwards ending in 0.
///
/// The `tuple` bit of the macro does the actual impl and invokes itself with
/// one less tuple element. The `write` bit below is to implement
/// `write_encoded` backwards (i.e., starting with the smallest number).
macro_rules! tupl_impl {
    // Termination: empty lists, do nothing.
    ( tuple > ) => { };

    // Impl values for the complete lists, then recurse to the lists without
    // their heads.
    ( tuple $t:ident $( $ttail:ident )* > $i:tt $( $itail:tt )* ) => {
        impl<$t: Values, $( $ttail: Values ),*> Values
                for ($t, $( $ttail ),*) {
            fn encoded_len(&self) -> usize {
                self.$i.encoded_len()
                $(
                    + self.$itail.encoded_len()
                )*
            }

            fn write_encoded<T: Target>(
                &self,
                target: &mut T
            ) -> Result<(), T::Error> {
                tupl_impl!( write self, target, $i $( $itail )* );
                Ok(())
            }
        }

        tupl_impl!(
             tuple $($ttail)* > $($itail)*
        );
    };

    // Termination: empty lists, do nothing.
    ( write $self:expr, $target:expr, ) => { };

    // Write all elements of tuple $self to $target in order.
    ( write $self:expr, $target:expr, $i:tt $($itail:tt)*) => {
        tupl_impl!( write $self, $target, $($itail)* );
        $self.$i.write_encoded($target)?
    }
}

tupl_impl!(
    tuple T11 T10 T9 T8 T7 T6 T5 T4 T3 T2 T1 T0 > 11 10 9 8 7 6 5 4 3 2 1 0
);


//--- Impl for Option

/// Encoding of an optional value.
///
/// This implementation encodes `None` as nothing, i.e., as an OPTIONAL
/// in ASN.1 parlance.
impl<V: Values> Values for Option<V> {
    fn encoded_len(&self) -> usize {
        match self {
            Some(v) => v.encoded_len(),
            None => 0,
        }
    }

    fn write_encoded<T: Target>(
        &self,
        target: &mut T
    ) -> Result<(), T::Error> {
        match self {
            Some(v) => v.write_encoded(target),
            None => Ok(())
        }
    }
}


//--- Impl for slice and Vec

impl<V: Values> Values for [V] {
    fn encoded_len(&self) -> usize {
        self.iter().map(Values::encoded_len).sum()
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        self.iter().try_for_each(|v| v.write_encoded(target))
    }
}

impl<V: Values> Values for Vec<V> {
    fn encoded_len(&self) -> usize {
        self.as_slice().encoded_len()
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        self.as_slice().write_encoded(target)
    }
}


//============ Standard Functions ============================================

/// Returns the length for a structure based on the tag and content length.
///
/// This is necessary because the length octets have a different length
/// depending on the content length.
pub fn total_len(tag: Tag, content_l: usize) -> usize {
    tag.encoded_len()
        + Length::Definite(content_l).encoded_len()
        + content_l
}

/// Returns the length of a indefinite-form constructed.
///
/// This includes the end-of-contents octets.
pub fn total_indefinite_len(tag: Tag, content_l: usize) -> usize {
    tag.encoded_len()
        + Length::Indefinite.encoded_len()
        + content_l
        + 2 // End-of-contents is two bytes.
}

/// Writes the header for a value.
///
/// The header in the sense of this function is the identifier octets and the
/// length octets.
pub fn write_header<T: Target>(
    target: &mut T,
    tag: Tag,
    constructed: bool,
    content_length: usize,
) -> Result<(), T::Error> {
    tag.write_encoded(constructed, target)?;
    Length::Definite(content_length).write_encoded(target)?;
    Ok(())
}

/// Writes the header for an indefinite-length constructed.
pub fn write_indefinite_header<T: Target>(
    target: &mut T,
    tag: Tag,
) -> Result<(), T::Error> {
    tag.write_encoded(true, target)?;
    Length::Indefinite.write_encoded(target)?;
    Ok(())
}

/// Writes the end-of-contents octets.
pub fn write_end_of_contents<T: Target>(
    target: &mut T,
) -> Result<(), T::Error> {
    target.write_all(b"\0\0")
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::encode::{Primitive, PrimitiveContent};

    #[test]
    fn tuples_and_options() {
        let v = (true.encode(), None::<Primitive<bool>>, ().encode());
        assert_eq!(v.encoded_len(), 5);
        assert_eq!(v.to_vec(), b"\x01\x01\xff\x05\x00");
    }

    #[test]
    fn long_header() {
        let mut target = Vec::new();
        infallible(write_header(&mut target, Tag::SEQUENCE, true, 300));
        assert_eq!(target, b"\x30\x82\x01\x2c");
        assert_eq!(total_len(Tag::SEQUENCE, 300), 304);
        assert_eq!(total_indefinite_len(Tag::SEQUENCE, 10), 14);
    }
}
