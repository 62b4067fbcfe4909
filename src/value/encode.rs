//! Encoding values in DER.

use std::io;
use chrono::NaiveDateTime;
use crate::encode::{self, IoTarget, PrimitiveContent, Target, Values};
use crate::error::{Error, ErrorKind};
use crate::schema::Kind;
use crate::time;
use super::{Data, Value};


//------------ Value ---------------------------------------------------------

impl Value {
    /// Encodes the value in DER.
    ///
    /// Returns an error if the value isn’t [ready][Self::is_ready].
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        self.check_ready()?;
        Ok(self.to_vec())
    }

    /// Writes the DER encoding of the value to a writer.
    pub fn write_der<W: io::Write>(&self, writer: W) -> Result<W, io::Error> {
        self.check_ready().map_err(|err| {
            io::Error::new(io::ErrorKind::InvalidInput, err)
        })?;
        let mut target = IoTarget::new(writer);
        self.write_encoded(&mut target)?;
        Ok(target.into_writer())
    }

    fn check_ready(&self) -> Result<(), Error> {
        if self.is_ready() {
            Ok(())
        }
        else {
            Err(Error::new(
                ErrorKind::ObjNotReady,
                format!("{} value is not ready", self.schema().type_name())
            ))
        }
    }

    /// Returns the length of the encoding without the explicit tag.
    fn inner_len(&self) -> usize {
        match (self.data(), self.schema().tag()) {
            (None, _) => 0,
            (Some(Data::Any(raw)), _) => raw.len(),
            (Some(Data::Choice(chosen)), _) => chosen.value.encoded_len(),
            (Some(data), Some(tag)) => {
                encode::total_len(tag, self.content_len(data))
            }
            (Some(_), None) => 0,
        }
    }

    fn content_len(&self, data: &Data) -> usize {
        match data {
            Data::Boolean(value) => PrimitiveContent::encoded_len(*value),
            Data::Integer(value) => PrimitiveContent::encoded_len(value),
            Data::BitString(value) => PrimitiveContent::encoded_len(value),
            Data::Octets(value) => value.len(),
            Data::Null => 0,
            Data::Oid(value) => PrimitiveContent::encoded_len(value),
            Data::Time(value) => self.time_content(value).len(),
            Data::Fields(values) => {
                values.iter().flatten().map(Values::encoded_len).sum()
            }
            Data::Items(items) => items.iter().map(Values::encoded_len).sum(),
            Data::Any(_) | Data::Choice(_) => 0,
        }
    }

    fn write_content<T: Target>(
        &self, data: &Data, target: &mut T
    ) -> Result<(), T::Error> {
        match data {
            Data::Boolean(value) => {
                PrimitiveContent::write_encoded(*value, target)
            }
            Data::Integer(value) => {
                PrimitiveContent::write_encoded(value, target)
            }
            Data::BitString(value) => {
                PrimitiveContent::write_encoded(value, target)
            }
            Data::Octets(value) => target.write_all(value),
            Data::Null => Ok(()),
            Data::Oid(value) => PrimitiveContent::write_encoded(value, target),
            Data::Time(value) => target.write_all(&self.time_content(value)),
            Data::Fields(values) => {
                let values = values.iter().flatten();
                if matches!(self.schema().kind(), Kind::Set(_)) {
                    write_sorted(values, target)
                }
                else {
                    values.map(|value| value.write_encoded(target)).collect()
                }
            }
            Data::Items(items) => {
                if matches!(self.schema().kind(), Kind::SetOf { .. }) {
                    write_sorted(items.iter(), target)
                }
                else {
                    items.iter().map(|item| {
                        item.write_encoded(target)
                    }).collect()
                }
            }
            Data::Any(_) | Data::Choice(_) => Ok(()),
        }
    }

    fn time_content(&self, time: &NaiveDateTime) -> Vec<u8> {
        match self.schema().kind() {
            Kind::UtcTime => time::encode_utc_time(time),
            _ => time::encode_generalized_time(time),
        }
    }
}

/// Writes the encodings of the values in ascending order.
fn write_sorted<'a, T: Target>(
    values: impl Iterator<Item = &'a Value>, target: &mut T
) -> Result<(), T::Error> {
    let mut encoded: Vec<_> = values.map(|value| value.to_vec()).collect();
    encoded.sort();
    for item in encoded {
        target.write_all(&item)?;
    }
    Ok(())
}


//--- Values

impl Values for Value {
    fn encoded_len(&self) -> usize {
        let inner = self.inner_len();
        match self.schema().expl() {
            Some(tag) if self.data().is_some() => encode::total_len(tag, inner),
            _ => inner
        }
    }

    fn write_encoded<T: Target>(
        &self, target: &mut T
    ) -> Result<(), T::Error> {
        let data = match self.data() {
            Some(data) => data,
            None => return Ok(())
        };
        if let Some(expl) = self.schema().expl() {
            encode::write_header(target, expl, true, self.inner_len())?;
        }
        match (data, self.schema().tag()) {
            (Data::Any(raw), _) => target.write_all(raw),
            (Data::Choice(chosen), _) => chosen.value.write_encoded(target),
            (data, Some(tag)) => {
                encode::write_header(
                    target, tag, self.schema().kind().is_constructed(),
                    self.content_len(data)
                )?;
                self.write_content(data, target)
            }
            (_, None) => Ok(())
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use chrono::NaiveDate;
    use crate::oid::Oid;
    use crate::schema::{Field, Schema};
    use crate::tag::Tag;
    use super::*;

    #[test]
    fn sequence() {
        let schema = Schema::sequence(vec![
            Field::new("erste", Schema::integer()),
            Field::new("zweite", Schema::integer().optional()),
        ]);
        let mut value = schema.empty();
        value.set("erste", 64).unwrap();
        assert_eq!(value.encode().unwrap(), b"\x30\x03\x02\x01\x40");
        value.set("zweite", 1).unwrap();
        assert_eq!(
            value.encode().unwrap(),
            b"\x30\x06\x02\x01\x40\x02\x01\x01"
        );
    }

    #[test]
    fn not_ready() {
        let schema = Schema::sequence(vec![
            Field::new("erste", Schema::integer()),
        ]);
        assert_eq!(
            schema.empty().encode().unwrap_err().kind(),
            ErrorKind::ObjNotReady
        );
        assert_eq!(
            Schema::boolean().empty().encode().unwrap_err().kind(),
            ErrorKind::ObjNotReady
        );
    }

    #[test]
    fn scalars() {
        assert_eq!(
            Schema::boolean().value(true.into()).unwrap().encode().unwrap(),
            b"\x01\x01\xff"
        );
        assert_eq!(
            Schema::null().value(Data::Null).unwrap().encode().unwrap(),
            b"\x05\x00"
        );
        assert_eq!(
            Schema::integer().value((-129).into()).unwrap().encode().unwrap(),
            b"\x02\x02\xff\x7f"
        );
        assert_eq!(
            Schema::object_identifier().value(
                Oid::from_arcs(&[2, 5, 2, 8192]).unwrap().into()
            ).unwrap().encode().unwrap(),
            b"\x06\x04\x55\x02\xc0\x00"
        );
        assert_eq!(
            Schema::ia5_string().text_value("hi").unwrap().encode().unwrap(),
            b"\x16\x02hi"
        );
        let time = NaiveDate::from_ymd_opt(2019, 5, 1).unwrap()
            .and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(
            Schema::utc_time().value(time.into()).unwrap().encode().unwrap(),
            b"\x17\x0d190501120000Z"
        );
        assert_eq!(
            Schema::generalized_time().value(
                time.into()
            ).unwrap().encode().unwrap(),
            b"\x18\x0f20190501120000Z"
        );
    }

    #[test]
    fn tagging() {
        let implicit = Schema::integer().implicit(Tag::ctx(1));
        assert_eq!(
            implicit.value(5.into()).unwrap().encode().unwrap(),
            b"\x81\x01\x05"
        );
        let explicit = Schema::integer().explicit(Tag::ctx(1));
        assert_eq!(
            explicit.value(5.into()).unwrap().encode().unwrap(),
            b"\xa1\x03\x02\x01\x05"
        );
        let seq = Schema::sequence(vec![]).implicit(Tag::application(2));
        assert_eq!(seq.empty().encode().unwrap(), b"\x62\x00");
    }

    #[test]
    fn choice_and_any() {
        let schema = Schema::choice(vec![
            Field::new("num", Schema::integer()),
            Field::new("raw", Schema::any()),
        ]).explicit(Tag::ctx(0));
        let mut value = schema.empty();
        value.choose("num", 3).unwrap();
        assert_eq!(value.encode().unwrap(), b"\xa0\x03\x02\x01\x03");
        value.choose(
            "raw", Data::Any(Bytes::from_static(b"\x05\x00"))
        ).unwrap();
        assert_eq!(value.encode().unwrap(), b"\xa0\x02\x05\x00");
    }

    #[test]
    fn set_is_sorted() {
        let schema = Schema::set(vec![
            Field::new("b", Schema::boolean().implicit(Tag::ctx(5))),
            Field::new("a", Schema::integer().implicit(Tag::ctx(2))),
        ]);
        let mut value = schema.empty();
        value.set("b", true).unwrap();
        value.set("a", 1).unwrap();
        assert_eq!(
            value.encode().unwrap(),
            b"\x31\x06\x82\x01\x01\x85\x01\xff"
        );

        let mut value = Schema::set_of(Schema::octet_string()).empty();
        value.push(&b"\x02"[..]).unwrap();
        value.push(&b"\x01\x00"[..]).unwrap();
        value.push(&b"\x01"[..]).unwrap();
        assert_eq!(
            value.encode().unwrap(),
            b"\x31\x0a\x04\x01\x01\x04\x01\x02\x04\x02\x01\x00"
        );
    }

    #[test]
    fn write_der() {
        let value = Schema::null().value(Data::Null).unwrap();
        assert_eq!(value.write_der(Vec::new()).unwrap(), b"\x05\x00");
        assert!(Schema::null().empty().write_der(Vec::new()).is_err());
    }
}
