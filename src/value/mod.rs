//! Values described by a schema.
//!
//! A [`Value`] combines a [`Schema`] with the actual data of the value, if
//! any. Values are either built by the user for encoding or produced by
//! decoding. In the latter case, they also carry [`DecodeInfo`] describing
//! where and how the value was encoded.

use std::fmt;
use bytes::Bytes;
use chrono::NaiveDateTime;
use num_bigint::BigInt;
use crate::decode::PathSegment;
use crate::error::{Error, ErrorKind};
use crate::oid::Oid;
use crate::schema::{Kind, Schema};
use crate::string::BitString;

mod encode;


//------------ Data ----------------------------------------------------------

/// The data of a value.
///
/// Which variant is used depends on the kind of the value’s schema. The
/// character string types keep their data in its encoded form as
/// [`Octets`][Data::Octets], ENUMERATED values as
/// [`Integer`][Data::Integer].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Data {
    /// A BOOLEAN value.
    Boolean(bool),

    /// An INTEGER or ENUMERATED value.
    Integer(BigInt),

    /// A BIT STRING value.
    BitString(BitString),

    /// The octets of an OCTET STRING or a character string.
    Octets(Bytes),

    /// NULL.
    Null,

    /// An OBJECT IDENTIFIER.
    Oid(Oid),

    /// A UTCTime or GeneralizedTime in UTC.
    Time(NaiveDateTime),

    /// The complete encoding of an ANY value.
    Any(Bytes),

    /// The chosen alternative of a CHOICE.
    Choice(Box<Chosen>),

    /// The fields of a SEQUENCE or SET in schema order.
    ///
    /// Absent fields and fields with their default value are `None`.
    Fields(Vec<Option<Value>>),

    /// The items of a SEQUENCE OF or SET OF.
    Items(Vec<Value>),
}

impl Data {
    /// Returns a short description of the variant.
    pub fn variant_name(&self) -> &'static str {
        match *self {
            Data::Boolean(_) => "boolean",
            Data::Integer(_) => "integer",
            Data::BitString(_) => "bit string",
            Data::Octets(_) => "octets",
            Data::Null => "null",
            Data::Oid(_) => "object identifier",
            Data::Time(_) => "time",
            Data::Any(_) => "any",
            Data::Choice(_) => "choice",
            Data::Fields(_) => "fields",
            Data::Items(_) => "items",
        }
    }
}


//--- From

impl From<bool> for Data {
    fn from(value: bool) -> Self {
        Data::Boolean(value)
    }
}

macro_rules! from_int {
    ( $( $type:ty ),* ) => {
        $(
            impl From<$type> for Data {
                fn from(value: $type) -> Self {
                    Data::Integer(value.into())
                }
            }
        )*
    }
}

from_int!(i8, i16, i32, i64, u8, u16, u32, u64, BigInt);

impl From<BitString> for Data {
    fn from(value: BitString) -> Self {
        Data::BitString(value)
    }
}

impl From<Bytes> for Data {
    fn from(value: Bytes) -> Self {
        Data::Octets(value)
    }
}

impl From<&'_ [u8]> for Data {
    fn from(value: &[u8]) -> Self {
        Data::Octets(Bytes::copy_from_slice(value))
    }
}

impl From<Vec<u8>> for Data {
    fn from(value: Vec<u8>) -> Self {
        Data::Octets(value.into())
    }
}

impl From<()> for Data {
    fn from(_: ()) -> Self {
        Data::Null
    }
}

impl From<Oid> for Data {
    fn from(value: Oid) -> Self {
        Data::Oid(value)
    }
}

impl From<NaiveDateTime> for Data {
    fn from(value: NaiveDateTime) -> Self {
        Data::Time(value)
    }
}


//--- Display

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Data::Boolean(true) => f.write_str("TRUE"),
            Data::Boolean(false) => f.write_str("FALSE"),
            Data::Integer(ref value) => write!(f, "{}", value),
            Data::BitString(ref value) => write!(f, "{}", value),
            Data::Octets(ref value) | Data::Any(ref value) => {
                for octet in value.iter() {
                    write!(f, "{:02X}", octet)?;
                }
                Ok(())
            }
            Data::Null => f.write_str("NULL"),
            Data::Oid(ref value) => write!(f, "{}", value),
            Data::Time(ref value) => write!(f, "{}", value),
            Data::Choice(ref chosen) => {
                write!(f, "[{}] {}", chosen.index, chosen.value)
            }
            Data::Fields(ref fields) => {
                write!(f, "{} fields", fields.iter().flatten().count())
            }
            Data::Items(ref items) => write!(f, "{} items", items.len()),
        }
    }
}


//------------ Chosen --------------------------------------------------------

/// The selected alternative of a CHOICE.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Chosen {
    /// The index of the alternative in the schema.
    pub index: usize,

    /// The value of the alternative.
    pub value: Value,
}


//------------ DecodeInfo ----------------------------------------------------

/// Information about how a value was encoded.
///
/// This is only available for decoded values. All lengths are in octets.
/// The offset is that of the value’s own tag. For an explicitly tagged
/// value, the explicit tag starts at [`expl_offset`][Self::expl_offset].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DecodeInfo {
    /// The offset of the first octet of the value.
    pub offset: usize,

    /// The length of the identifier octets.
    pub tlen: usize,

    /// The length of the length octets.
    pub llen: usize,

    /// The length of the content octets.
    ///
    /// For indefinite length values, this does not include the
    /// end-of-contents octets.
    pub vlen: usize,

    /// Whether the value used the indefinite length form.
    pub lenindef: bool,

    /// Whether the value deviated from DER in some other way.
    pub ber_encoded: bool,

    /// The information for the explicit tag if there is one.
    pub expl: Option<ExplInfo>,
}

impl DecodeInfo {
    /// Returns the length of the complete encoding sans explicit tag.
    pub fn tlvlen(&self) -> usize {
        self.tlen + self.llen + self.vlen + if self.lenindef { 2 } else { 0 }
    }

    /// Returns the offset of the content octets.
    pub fn content_offset(&self) -> usize {
        self.offset + self.tlen + self.llen
    }

    /// Returns the offset of the explicit tag or the value itself.
    pub fn expl_offset(&self) -> usize {
        match self.expl {
            Some(expl) => self.offset - expl.tlen - expl.llen,
            None => self.offset
        }
    }

    /// Returns the length of the complete encoding.
    pub fn total_len(&self) -> usize {
        match self.expl {
            Some(expl) => {
                expl.tlen + expl.llen + expl.vlen
                    + if expl.lenindef { 2 } else { 0 }
            }
            None => self.tlvlen()
        }
    }

    /// Returns whether the value itself deviated from DER.
    pub fn bered(&self) -> bool {
        self.ber_encoded || self.lenindef
            || self.expl.map(|expl| expl.lenindef).unwrap_or(false)
    }
}


//------------ ExplInfo ------------------------------------------------------

/// Information about the explicit tag of a decoded value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ExplInfo {
    /// The length of the identifier octets of the explicit tag.
    pub tlen: usize,

    /// The length of the length octets of the explicit tag.
    pub llen: usize,

    /// The length of the content of the explicit tag.
    pub vlen: usize,

    /// Whether the explicit tag used the indefinite length form.
    pub lenindef: bool,
}


//------------ Defined -------------------------------------------------------

/// A value decoded from the content of another value.
///
/// This is the result of applying a defined-by rule.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Defined {
    /// The data of the source value that selected the schema.
    by: Data,

    /// The decoded value.
    value: Value,
}

impl Defined {
    pub(crate) fn new(by: Data, value: Value) -> Self {
        Defined { by, value }
    }

    /// Returns the data of the value that selected the schema.
    pub fn by(&self) -> &Data {
        &self.by
    }

    /// Returns the decoded value.
    pub fn value(&self) -> &Value {
        &self.value
    }
}


//------------ Value ---------------------------------------------------------

/// A value of a schema.
///
/// The value may be unset, in which case it can’t be encoded. Container
/// values provide methods to assign their fields, alternatives, or items
/// which check that the assigned data is acceptable for the schema.
/// Scalar values are never changed but replaced with a new value created
/// via [`Schema::value`].
#[derive(Clone, Debug)]
pub struct Value {
    schema: Schema,
    data: Option<Data>,
    info: Option<DecodeInfo>,
    defined: Option<Box<Defined>>,
}

impl Value {
    /// Creates a value from already checked data.
    pub(crate) fn new(schema: Schema, data: Option<Data>) -> Self {
        Value { schema, data, info: None, defined: None }
    }

    /// Creates a decoded value.
    pub(crate) fn decoded(
        schema: Schema, data: Data, info: DecodeInfo
    ) -> Self {
        Value { schema, data: Some(data), info: Some(info), defined: None }
    }

    /// Moves the value over to a different but compatible schema.
    pub(crate) fn with_schema(self, schema: Schema, data: Option<Data>) -> Self {
        Value { schema, data, info: self.info, defined: self.defined }
    }

    pub(crate) fn info_mut(&mut self) -> Option<&mut DecodeInfo> {
        self.info.as_mut()
    }

    pub(crate) fn set_defined(&mut self, defined: Defined) {
        self.defined = Some(Box::new(defined))
    }

    /// Returns the schema of the value.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the data of the value if it is set.
    pub fn data(&self) -> Option<&Data> {
        self.data.as_ref()
    }

    /// Returns the information about the encoding of a decoded value.
    pub fn info(&self) -> Option<&DecodeInfo> {
        self.info.as_ref()
    }

    /// Returns the value defined by a defined-by rule.
    pub fn defined(&self) -> Option<&Defined> {
        self.defined.as_deref()
    }

    /// Returns whether the value can be encoded.
    ///
    /// This is the case if the value and all its required fields,
    /// alternatives, and items are set and all repetitions have an
    /// acceptable number of items.
    pub fn is_ready(&self) -> bool {
        match self.data {
            None => false,
            Some(Data::Fields(ref values)) => {
                self.schema.fields().iter().zip(values).all(|(field, value)| {
                    match value {
                        Some(value) => value.is_ready(),
                        None => field.schema().is_optional(),
                    }
                })
            }
            Some(Data::Items(ref items)) => {
                self.schema.size_bounds_of().map(|bounds| {
                    bounds.contains(&items.len())
                }).unwrap_or(true)
                && items.iter().all(Value::is_ready)
            }
            Some(Data::Choice(ref chosen)) => chosen.value.is_ready(),
            Some(_) => true,
        }
    }

    /// Returns whether the value or any of its descendants deviated from
    /// DER when decoded.
    pub fn bered(&self) -> bool {
        if self.info.map(|info| info.bered()).unwrap_or(false) {
            return true
        }
        match self.data {
            Some(Data::Fields(ref values)) => {
                values.iter().flatten().any(Value::bered)
            }
            Some(Data::Items(ref items)) => items.iter().any(Value::bered),
            Some(Data::Choice(ref chosen)) => chosen.value.bered(),
            _ => false
        }
    }
}

/// # Access to scalar data
///
impl Value {
    /// Returns the value of a BOOLEAN.
    pub fn as_bool(&self) -> Option<bool> {
        match self.data {
            Some(Data::Boolean(value)) => Some(value),
            _ => None
        }
    }

    /// Returns the value of an INTEGER or ENUMERATED.
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self.data {
            Some(Data::Integer(ref value)) => Some(value),
            _ => None
        }
    }

    /// Returns the name of a named INTEGER or an ENUMERATED value.
    pub fn as_name(&self) -> Option<&str> {
        self.as_integer().and_then(|value| self.schema.value_name(value))
    }

    /// Returns the value of an OBJECT IDENTIFIER.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self.data {
            Some(Data::Oid(ref value)) => Some(value),
            _ => None
        }
    }

    /// Returns the octets of an OCTET STRING, character string, or ANY.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self.data {
            Some(Data::Octets(ref value)) | Some(Data::Any(ref value)) => {
                Some(value)
            }
            _ => None
        }
    }

    /// Returns the text of a character string.
    pub fn as_str(&self) -> Option<String> {
        match (self.schema.kind(), self.data.as_ref()) {
            (Kind::String { charset, .. }, Some(Data::Octets(value))) => {
                charset.decode_slice(value).ok()
            }
            _ => None
        }
    }

    /// Returns the value of a BIT STRING.
    pub fn as_bit_string(&self) -> Option<&BitString> {
        match self.data {
            Some(Data::BitString(ref value)) => Some(value),
            _ => None
        }
    }

    /// Returns the names of the set bits of a BIT STRING with named bits.
    pub fn bit_names(&self) -> Vec<&str> {
        match self.as_bit_string() {
            Some(bits) => {
                bits.set_bits().filter_map(|bit| {
                    self.schema.bit_name(bit)
                }).collect()
            }
            None => Vec::new()
        }
    }

    /// Returns the value of a UTCTime or GeneralizedTime.
    pub fn as_time(&self) -> Option<&NaiveDateTime> {
        match self.data {
            Some(Data::Time(ref value)) => Some(value),
            _ => None
        }
    }
}

/// # Access to fields, alternatives, and items
///
impl Value {
    /// Returns the value of a field of a SEQUENCE or SET.
    ///
    /// For a CHOICE, returns the value of the alternative if it has been
    /// chosen. Returns `Ok(None)` if the field or alternative isn’t set and
    /// an error if the schema doesn’t have a field or alternative of this
    /// name.
    pub fn get(&self, name: &str) -> Result<Option<&Value>, Error> {
        let idx = self.schema.field_index(name).ok_or_else(|| {
            unknown_field(name)
        })?;
        match self.data {
            Some(Data::Fields(ref values)) => Ok(values[idx].as_ref()),
            Some(Data::Choice(ref chosen)) if chosen.index == idx => {
                Ok(Some(&chosen.value))
            }
            _ => Ok(None)
        }
    }

    /// Returns the value of a field or its default value.
    pub fn get_or_default(&self, name: &str) -> Result<Option<Value>, Error> {
        if let Some(value) = self.get(name)? {
            return Ok(Some(value.clone()))
        }
        let idx = self.schema.field_index(name).ok_or_else(|| {
            unknown_field(name)
        })?;
        let schema = self.schema.fields()[idx].schema();
        match schema.default_data() {
            Some(default) => schema.value(default.clone()).map(Some),
            None => Ok(None)
        }
    }

    /// Returns the name and value of the chosen alternative of a CHOICE.
    pub fn choice(&self) -> Option<(&str, &Value)> {
        match self.data {
            Some(Data::Choice(ref chosen)) => {
                self.schema.fields().get(chosen.index).map(|field| {
                    (field.name(), &chosen.value)
                })
            }
            _ => None
        }
    }

    /// Returns the items of a SEQUENCE OF or SET OF.
    ///
    /// For all other values, the slice is empty.
    pub fn items(&self) -> &[Value] {
        match self.data {
            Some(Data::Items(ref items)) => items,
            _ => &[]
        }
    }

    /// Returns the direct child of the value for a path segment.
    pub fn child(&self, segment: &PathSegment) -> Option<&Value> {
        match (segment, self.data.as_ref()) {
            (PathSegment::Name(name), _) => self.get(name).ok().flatten(),
            (PathSegment::Index(idx), Some(Data::Items(items))) => {
                items.get(*idx)
            }
            (PathSegment::DefinedBy(by), _) => {
                self.defined.as_ref().and_then(|defined| {
                    (defined.by == *by).then_some(&defined.value)
                })
            }
            _ => None
        }
    }

    fn child_mut(&mut self, segment: &PathSegment) -> Option<&mut Value> {
        match (segment, self.data.as_mut()) {
            (PathSegment::Name(name), Some(Data::Fields(values))) => {
                let idx = self.schema.field_index(name)?;
                values[idx].as_mut()
            }
            (PathSegment::Name(name), Some(Data::Choice(chosen))) => {
                let idx = self.schema.field_index(name)?;
                (chosen.index == idx).then_some(&mut chosen.value)
            }
            (PathSegment::Index(idx), Some(Data::Items(items))) => {
                items.get_mut(*idx)
            }
            (PathSegment::DefinedBy(by), _) => {
                self.defined.as_mut().and_then(|defined| {
                    (defined.by == *by).then_some(&mut defined.value)
                })
            }
            _ => None
        }
    }

    /// Returns all direct children with their path segments.
    ///
    /// This includes a value defined by a defined-by rule.
    pub fn children(&self) -> Vec<(PathSegment, &Value)> {
        let mut res = Vec::new();
        match self.data {
            Some(Data::Fields(ref values)) => {
                for (field, value) in self.schema.fields().iter().zip(values) {
                    if let Some(value) = value {
                        res.push((PathSegment::name(field.name()), value))
                    }
                }
            }
            Some(Data::Choice(_)) => {
                if let Some((name, value)) = self.choice() {
                    res.push((PathSegment::name(name), value))
                }
            }
            Some(Data::Items(ref items)) => {
                for (idx, item) in items.iter().enumerate() {
                    res.push((PathSegment::Index(idx), item))
                }
            }
            _ => { }
        }
        if let Some(defined) = self.defined.as_ref() {
            res.push((
                PathSegment::DefinedBy(defined.by.clone()), &defined.value
            ))
        }
        res
    }

    /// Returns the descendant at the given relative path.
    pub fn lookup(&self, path: &[PathSegment]) -> Option<&Value> {
        match path.split_first() {
            Some((head, tail)) => self.child(head)?.lookup(tail),
            None => Some(self)
        }
    }

    pub(crate) fn lookup_mut(
        &mut self, path: &[PathSegment]
    ) -> Option<&mut Value> {
        match path.split_first() {
            Some((head, tail)) => self.child_mut(head)?.lookup_mut(tail),
            None => Some(self)
        }
    }
}

/// # Assignment
///
impl Value {
    /// Sets a field of a SEQUENCE or SET to the given data.
    ///
    /// If the data is equal to the field’s default value, the field is
    /// cleared instead.
    pub fn set(
        &mut self, name: &str, data: impl Into<Data>
    ) -> Result<(), Error> {
        let idx = self.field_index_of(name, false)?;
        let value = self.schema.fields()[idx].schema().value(data.into())?;
        self.put_field(idx, Some(value));
        Ok(())
    }

    /// Sets a field of a SEQUENCE or SET to the given value.
    ///
    /// The value must be of a schema compatible with that of the field,
    /// i.e., it must be of the same kind and have the same tags.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), Error> {
        let idx = self.field_index_of(name, false)?;
        let value = self.schema.fields()[idx].schema().adopt(value)?;
        self.put_field(idx, Some(value));
        Ok(())
    }

    /// Clears a field of a SEQUENCE or SET.
    pub fn unset(&mut self, name: &str) -> Result<(), Error> {
        let idx = self.field_index_of(name, false)?;
        self.put_field(idx, None);
        Ok(())
    }

    fn put_field(&mut self, idx: usize, value: Option<Value>) {
        let value = value.filter(|value| {
            match value.schema.default_data() {
                Some(default) => value.data.as_ref() != Some(default),
                None => true
            }
        });
        let len = self.schema.fields().len();
        if !matches!(self.data, Some(Data::Fields(_))) {
            self.data = Some(Data::Fields(vec![None; len]));
        }
        if let Some(Data::Fields(ref mut values)) = self.data {
            values[idx] = value;
        }
    }

    /// Chooses an alternative of a CHOICE with the given data.
    pub fn choose(
        &mut self, name: &str, data: impl Into<Data>
    ) -> Result<(), Error> {
        let index = self.field_index_of(name, true)?;
        let value = self.schema.fields()[index].schema().value(data.into())?;
        self.data = Some(Data::Choice(Box::new(Chosen { index, value })));
        Ok(())
    }

    /// Chooses an alternative of a CHOICE with the given value.
    pub fn choose_value(
        &mut self, name: &str, value: Value
    ) -> Result<(), Error> {
        let index = self.field_index_of(name, true)?;
        let value = self.schema.fields()[index].schema().adopt(value)?;
        self.data = Some(Data::Choice(Box::new(Chosen { index, value })));
        Ok(())
    }

    /// Appends an item with the given data to a SEQUENCE OF or SET OF.
    pub fn push(&mut self, data: impl Into<Data>) -> Result<(), Error> {
        let item = self.item_schema()?.value(data.into())?;
        self.push_item(item)
    }

    /// Appends an item to a SEQUENCE OF or SET OF.
    pub fn push_value(&mut self, value: Value) -> Result<(), Error> {
        let item = self.item_schema()?.adopt(value)?;
        self.push_item(item)
    }

    fn item_schema(&self) -> Result<&Schema, Error> {
        self.schema.item().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidValueType,
                format!("{} has no items", self.schema.type_name())
            )
        })
    }

    fn push_item(&mut self, item: Value) -> Result<(), Error> {
        let len = self.items().len() + 1;
        if let Some(bounds) = self.schema.size_bounds_of() {
            if len > *bounds.max() {
                return Err(Error::new(ErrorKind::Bounds, format!(
                    "{} items exceed bounds {}", len, bounds
                )))
            }
        }
        match self.data {
            Some(Data::Items(ref mut items)) => items.push(item),
            _ => self.data = Some(Data::Items(vec![item])),
        }
        Ok(())
    }

    /// Returns the index of a field or alternative.
    fn field_index_of(&self, name: &str, choice: bool) -> Result<usize, Error> {
        let is_choice = matches!(self.schema.kind(), Kind::Choice(_));
        let is_fields = matches!(
            self.schema.kind(), Kind::Sequence(_) | Kind::Set(_)
        );
        if (choice && !is_choice) || (!choice && !is_fields) {
            return Err(Error::new(
                ErrorKind::InvalidValueType,
                format!(
                    "{} has no {}", self.schema.type_name(),
                    if choice { "alternatives" } else { "fields" }
                )
            ))
        }
        self.schema.field_index(name).ok_or_else(|| unknown_field(name))
    }
}

fn unknown_field(name: &str) -> Error {
    Error::new(ErrorKind::ObjUnknown, format!("unknown field '{}'", name))
}


//--- PartialEq and Eq

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.schema.tag() == other.schema.tag()
            && self.schema.expl() == other.schema.expl()
            && self.data == other.data
    }
}

impl Eq for Value { }


//--- Display

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.data {
            Some(ref data) => write!(f, "{}", data),
            None => f.write_str("unset"),
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::Field;

    fn pair() -> Schema {
        Schema::sequence(vec![
            Field::new("erste", Schema::integer()),
            Field::new("zweite", Schema::integer().optional()),
            Field::new(
                "dritte", Schema::boolean().default(false.into()).unwrap()
            ),
        ])
    }

    #[test]
    fn fields() {
        let mut value = pair().empty();
        assert!(!value.is_ready());
        value.set("erste", 64).unwrap();
        assert!(value.is_ready());
        assert_eq!(
            value.get("erste").unwrap().unwrap().as_integer(),
            Some(&BigInt::from(64))
        );
        assert!(value.get("zweite").unwrap().is_none());
        assert_eq!(
            value.get("nope").unwrap_err().kind(), ErrorKind::ObjUnknown
        );
        assert_eq!(
            value.set("nope", 1).unwrap_err().kind(), ErrorKind::ObjUnknown
        );
        assert_eq!(
            value.set("erste", true).unwrap_err().kind(),
            ErrorKind::InvalidValueType
        );
    }

    #[test]
    fn default_clears_field() {
        let mut value = pair().empty();
        value.set("dritte", true).unwrap();
        assert!(value.get("dritte").unwrap().is_some());
        value.set("dritte", false).unwrap();
        assert!(value.get("dritte").unwrap().is_none());
        assert_eq!(
            value.get_or_default("dritte").unwrap().unwrap().as_bool(),
            Some(false)
        );
        assert!(value.get_or_default("zweite").unwrap().is_none());
    }

    #[test]
    fn set_value_checks_schema() {
        let mut value = pair().empty();
        let tagged = Schema::integer().implicit(crate::Tag::ctx(0));
        assert_eq!(
            value.set_value(
                "erste", tagged.value(1.into()).unwrap()
            ).unwrap_err().kind(),
            ErrorKind::InvalidValueType
        );
        value.set_value(
            "erste", Schema::integer().value(7.into()).unwrap()
        ).unwrap();
        assert_eq!(
            value.get("erste").unwrap().unwrap().as_integer(),
            Some(&BigInt::from(7))
        );
    }

    #[test]
    fn choice() {
        let schema = Schema::choice(vec![
            Field::new("num", Schema::integer()),
            Field::new("flag", Schema::boolean()),
        ]);
        let mut value = schema.empty();
        assert!(!value.is_ready());
        assert!(value.choice().is_none());
        value.choose("flag", true).unwrap();
        assert_eq!(value.choice().unwrap().0, "flag");
        assert!(value.get("num").unwrap().is_none());
        assert_eq!(
            value.choose("other", 1).unwrap_err().kind(),
            ErrorKind::ObjUnknown
        );
        assert_eq!(
            value.set("num", 1).unwrap_err().kind(),
            ErrorKind::InvalidValueType
        );
    }

    #[test]
    fn items() {
        let schema = Schema::sequence_of(Schema::integer()).size_bounds(1, 2);
        let mut value = schema.empty();
        assert!(!value.is_ready());
        value.push(1).unwrap();
        assert!(value.is_ready());
        value.push(2).unwrap();
        let err = value.push(3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Bounds);
        assert_eq!(err.offset(), None);
        assert_eq!(value.items().len(), 2);
        assert_eq!(
            schema.value(Data::Items(Vec::new())).unwrap_err().kind(),
            ErrorKind::Bounds
        );
    }

    #[test]
    fn lookup() {
        let inner = Schema::sequence(vec![
            Field::new("x", Schema::sequence_of(Schema::boolean())),
        ]);
        let schema = Schema::sequence(vec![Field::new("in", inner.clone())]);
        let mut list = inner.fields()[0].schema().empty();
        list.push(false).unwrap();
        list.push(true).unwrap();
        let mut in_value = inner.empty();
        in_value.set_value("x", list).unwrap();
        let mut value = schema.empty();
        value.set_value("in", in_value).unwrap();
        let found = value.lookup(&[
            PathSegment::name("in"), PathSegment::name("x"),
            PathSegment::Index(1),
        ]).unwrap();
        assert_eq!(found.as_bool(), Some(true));
        assert!(value.lookup(&[PathSegment::Index(0)]).is_none());
        assert_eq!(value.children().len(), 1);
    }
}
