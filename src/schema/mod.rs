//! Schemas describing ASN.1 types.
//!
//! A [`Schema`] describes a single ASN.1 type together with its tagging
//! and, when used as a field, whether the field is optional or has a
//! default value. Schemas are built at runtime from the constructor
//! functions for the various kinds and then modified through builder
//! methods:
//!
//! ```
//! use derschema::{Field, Schema, Tag};
//!
//! let schema = Schema::sequence(vec![
//!     Field::new("version", Schema::integer().explicit(Tag::ctx(0))
//!         .default(0.into()).unwrap()
//!     ),
//!     Field::new("serial", Schema::integer()),
//! ]);
//! assert_eq!(schema.fields().len(), 2);
//! ```
//!
//! Schemas are cheap to clone as they share their content. Each builder
//! method returns a modified copy leaving the original untouched, so a
//! schema can be used as the base for any number of variations.

use std::fmt;
use std::mem;
use std::sync::Arc;
use bytes::Bytes;
use num_bigint::BigInt;
use crate::decode::{self, DecodeContext, DecodePath};
use crate::error::{Error, ErrorKind};
use crate::string::{BitString, CharSet};
use crate::tag::Tag;
use crate::time;
use crate::value::{Chosen, Data, Value};

pub use self::bounds::Bounds;
pub use self::define::Define;

mod bounds;
mod define;


//------------ Field ---------------------------------------------------------

/// A named component of a SEQUENCE, SET, or CHOICE.
#[derive(Clone, Debug)]
pub struct Field {
    name: String,
    schema: Schema,
}

impl Field {
    /// Creates a new field.
    pub fn new(name: &str, schema: Schema) -> Self {
        Field { name: name.into(), schema }
    }

    /// Returns the name of the field.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the schema of the field.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}


//------------ Kind ----------------------------------------------------------

/// The kind of a schema.
///
/// This determines the universal type and thus the encoding of values.
#[derive(Clone, Debug)]
pub enum Kind {
    /// BOOLEAN.
    Boolean,

    /// INTEGER with optional bounds and named values.
    Integer {
        bounds: Option<Bounds<BigInt>>,
        named: Vec<(String, BigInt)>,
    },

    /// ENUMERATED with its permitted values.
    Enumerated {
        named: Vec<(String, BigInt)>,
    },

    /// BIT STRING with optional named bits.
    BitString {
        named: Vec<(String, usize)>,
    },

    /// OCTET STRING with optional size bounds.
    OctetString {
        bounds: Option<Bounds<usize>>,
    },

    /// NULL.
    Null,

    /// OBJECT IDENTIFIER.
    Oid,

    /// One of the character string types.
    ///
    /// The bounds apply to the number of encoded octets.
    String {
        charset: CharSet,
        bounds: Option<Bounds<usize>>,
    },

    /// UTCTime.
    UtcTime,

    /// GeneralizedTime.
    GeneralizedTime,

    /// ANY, i.e., an arbitrary complete encoding.
    Any,

    /// CHOICE between the given alternatives.
    Choice(Vec<Field>),

    /// SEQUENCE of the given fields.
    Sequence(Vec<Field>),

    /// SET of the given fields.
    Set(Vec<Field>),

    /// SEQUENCE OF values of the given item schema.
    SequenceOf {
        item: Schema,
        bounds: Option<Bounds<usize>>,
    },

    /// SET OF values of the given item schema.
    SetOf {
        item: Schema,
        bounds: Option<Bounds<usize>>,
    },
}

impl Kind {
    /// Returns the ASN.1 name of the kind.
    pub fn name(&self) -> &'static str {
        match *self {
            Kind::Boolean => "BOOLEAN",
            Kind::Integer { .. } => "INTEGER",
            Kind::Enumerated { .. } => "ENUMERATED",
            Kind::BitString { .. } => "BIT STRING",
            Kind::OctetString { .. } => "OCTET STRING",
            Kind::Null => "NULL",
            Kind::Oid => "OBJECT IDENTIFIER",
            Kind::String { charset, .. } => charset.name(),
            Kind::UtcTime => "UTCTime",
            Kind::GeneralizedTime => "GeneralizedTime",
            Kind::Any => "ANY",
            Kind::Choice(_) => "CHOICE",
            Kind::Sequence(_) => "SEQUENCE",
            Kind::Set(_) => "SET",
            Kind::SequenceOf { .. } => "SEQUENCE OF",
            Kind::SetOf { .. } => "SET OF",
        }
    }

    /// Returns the universal tag of the kind.
    ///
    /// CHOICE and ANY don’t have a tag of their own.
    pub fn natural_tag(&self) -> Option<Tag> {
        match *self {
            Kind::Boolean => Some(Tag::BOOLEAN),
            Kind::Integer { .. } => Some(Tag::INTEGER),
            Kind::Enumerated { .. } => Some(Tag::ENUMERATED),
            Kind::BitString { .. } => Some(Tag::BIT_STRING),
            Kind::OctetString { .. } => Some(Tag::OCTET_STRING),
            Kind::Null => Some(Tag::NULL),
            Kind::Oid => Some(Tag::OID),
            Kind::String { charset, .. } => Some(charset.tag()),
            Kind::UtcTime => Some(Tag::UTC_TIME),
            Kind::GeneralizedTime => Some(Tag::GENERALIZED_TIME),
            Kind::Any | Kind::Choice(_) => None,
            Kind::Sequence(_) | Kind::SequenceOf { .. } => Some(Tag::SEQUENCE),
            Kind::Set(_) | Kind::SetOf { .. } => Some(Tag::SET),
        }
    }

    /// Returns whether values are encoded in constructed form.
    pub fn is_constructed(&self) -> bool {
        matches!(
            *self,
            Kind::Sequence(_) | Kind::Set(_)
            | Kind::SequenceOf { .. } | Kind::SetOf { .. }
        )
    }

    /// Returns whether two kinds describe the same type.
    ///
    /// Bounds, named values, and the components of containers are not
    /// compared.
    fn same_as(&self, other: &Kind) -> bool {
        match (self, other) {
            (
                Kind::String { charset: left, .. },
                Kind::String { charset: right, .. }
            ) => left == right,
            _ => mem::discriminant(self) == mem::discriminant(other)
        }
    }
}


//------------ Schema --------------------------------------------------------

/// The description of an ASN.1 type.
#[derive(Clone, Debug)]
pub struct Schema(Arc<SchemaInner>);

#[derive(Clone, Debug)]
struct SchemaInner {
    kind: Kind,

    /// The implicit tag replacing the natural tag.
    tag: Option<Tag>,

    /// The explicit tag wrapping the value.
    expl: Option<Tag>,

    /// The value used when the field is absent.
    default: Option<Data>,

    /// Whether the field may be absent.
    optional: bool,

    /// Defined-by rules with this value as the source.
    defines: Vec<Define>,

    /// A name for the type to use when printing.
    name: Option<String>,
}

impl Schema {
    fn new(kind: Kind) -> Self {
        Schema(Arc::new(SchemaInner {
            kind,
            tag: None,
            expl: None,
            default: None,
            optional: false,
            defines: Vec::new(),
            name: None,
        }))
    }

    fn update(mut self, op: impl FnOnce(&mut SchemaInner)) -> Self {
        op(Arc::make_mut(&mut self.0));
        self
    }
}

/// # Constructors
///
impl Schema {
    pub fn boolean() -> Self {
        Self::new(Kind::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(Kind::Integer { bounds: None, named: Vec::new() })
    }

    /// Creates an ENUMERATED with the given permitted values.
    ///
    /// # Panics
    ///
    /// The function panics if `named` is empty.
    pub fn enumerated(named: &[(&str, i64)]) -> Self {
        assert!(!named.is_empty(), "ENUMERATED needs at least one value");
        Self::new(Kind::Enumerated { named: named_values(named) })
    }

    pub fn bit_string() -> Self {
        Self::new(Kind::BitString { named: Vec::new() })
    }

    pub fn octet_string() -> Self {
        Self::new(Kind::OctetString { bounds: None })
    }

    pub fn null() -> Self {
        Self::new(Kind::Null)
    }

    pub fn object_identifier() -> Self {
        Self::new(Kind::Oid)
    }

    /// Creates a character string of the given character set.
    pub fn string(charset: CharSet) -> Self {
        Self::new(Kind::String { charset, bounds: None })
    }

    pub fn utf8_string() -> Self {
        Self::string(CharSet::Utf8)
    }

    pub fn numeric_string() -> Self {
        Self::string(CharSet::Numeric)
    }

    pub fn printable_string() -> Self {
        Self::string(CharSet::Printable)
    }

    pub fn teletex_string() -> Self {
        Self::string(CharSet::Teletex)
    }

    pub fn videotex_string() -> Self {
        Self::string(CharSet::Videotex)
    }

    pub fn ia5_string() -> Self {
        Self::string(CharSet::Ia5)
    }

    pub fn graphic_string() -> Self {
        Self::string(CharSet::Graphic)
    }

    pub fn visible_string() -> Self {
        Self::string(CharSet::Visible)
    }

    pub fn general_string() -> Self {
        Self::string(CharSet::General)
    }

    pub fn universal_string() -> Self {
        Self::string(CharSet::Universal)
    }

    pub fn bmp_string() -> Self {
        Self::string(CharSet::Bmp)
    }

    pub fn utc_time() -> Self {
        Self::new(Kind::UtcTime)
    }

    pub fn generalized_time() -> Self {
        Self::new(Kind::GeneralizedTime)
    }

    pub fn any() -> Self {
        Self::new(Kind::Any)
    }

    /// Creates a CHOICE between the given alternatives.
    ///
    /// # Panics
    ///
    /// The function panics if there are no alternatives, if two of them
    /// share a name, or if an alternative is optional or has a default.
    pub fn choice(alternatives: Vec<Field>) -> Self {
        assert!(!alternatives.is_empty(), "CHOICE needs alternatives");
        check_names(&alternatives);
        for alt in &alternatives {
            assert!(
                !alt.schema.is_optional(),
                "CHOICE alternative '{}' can’t be optional", alt.name
            );
        }
        Self::new(Kind::Choice(alternatives))
    }

    /// Creates a SEQUENCE of the given fields.
    ///
    /// # Panics
    ///
    /// The function panics if two fields share a name.
    pub fn sequence(fields: Vec<Field>) -> Self {
        check_names(&fields);
        Self::new(Kind::Sequence(fields))
    }

    /// Creates a SET of the given fields.
    ///
    /// # Panics
    ///
    /// The function panics if two fields share a name.
    pub fn set(fields: Vec<Field>) -> Self {
        check_names(&fields);
        Self::new(Kind::Set(fields))
    }

    pub fn sequence_of(item: Schema) -> Self {
        Self::new(Kind::SequenceOf { item, bounds: None })
    }

    pub fn set_of(item: Schema) -> Self {
        Self::new(Kind::SetOf { item, bounds: None })
    }
}

fn named_values(named: &[(&str, i64)]) -> Vec<(String, BigInt)> {
    named.iter().map(|&(name, value)| {
        (name.into(), BigInt::from(value))
    }).collect()
}

fn check_names(fields: &[Field]) {
    for (idx, field) in fields.iter().enumerate() {
        assert!(
            !fields[..idx].iter().any(|other| other.name == field.name),
            "duplicate field name '{}'", field.name
        );
    }
}

/// # Modifiers
///
impl Schema {
    /// Replaces the natural tag with the given tag.
    ///
    /// # Panics
    ///
    /// The function panics for a CHOICE or ANY as these can only be
    /// tagged explicitly.
    pub fn implicit(self, tag: Tag) -> Self {
        assert!(
            self.0.kind.natural_tag().is_some(),
            "{} can’t be tagged implicitly", self.0.kind.name()
        );
        self.update(|inner| inner.tag = Some(tag))
    }

    /// Wraps the value in an explicit tag.
    pub fn explicit(self, tag: Tag) -> Self {
        self.update(|inner| inner.expl = Some(tag))
    }

    /// Marks the field as optional.
    pub fn optional(self) -> Self {
        self.update(|inner| inner.optional = true)
    }

    /// Sets the default value of the field.
    ///
    /// Returns an error if the data isn’t acceptable for the schema.
    pub fn default(self, data: Data) -> Result<Self, Error> {
        let data = self.check_data(data)?;
        Ok(self.update(|inner| inner.default = Some(data)))
    }

    /// Restricts an INTEGER to the given range.
    ///
    /// # Panics
    ///
    /// The function panics if the schema isn’t an INTEGER or if `min` is
    /// greater than `max`.
    pub fn value_bounds(
        self, min: impl Into<BigInt>, max: impl Into<BigInt>
    ) -> Self {
        let new: Bounds<BigInt> = Bounds::new(min.into(), max.into());
        self.update(|inner| match inner.kind {
            Kind::Integer { ref mut bounds, .. } => *bounds = Some(new),
            ref kind => panic!("{} can’t have value bounds", kind.name()),
        })
    }

    /// Restricts the size of a string or repetition.
    ///
    /// For strings, the size is the number of content octets, for
    /// repetitions the number of items.
    ///
    /// # Panics
    ///
    /// The function panics if the schema is of a different kind or if
    /// `min` is greater than `max`.
    pub fn size_bounds(self, min: usize, max: usize) -> Self {
        let new = Bounds::new(min, max);
        self.update(|inner| match inner.kind {
            Kind::OctetString { ref mut bounds }
            | Kind::String { ref mut bounds, .. }
            | Kind::SequenceOf { ref mut bounds, .. }
            | Kind::SetOf { ref mut bounds, .. } => *bounds = Some(new),
            ref kind => panic!("{} can’t have size bounds", kind.name()),
        })
    }

    /// Adds names for INTEGER values.
    ///
    /// # Panics
    ///
    /// The function panics if the schema isn’t an INTEGER.
    pub fn named(self, values: &[(&str, i64)]) -> Self {
        let values = named_values(values);
        self.update(|inner| match inner.kind {
            Kind::Integer { ref mut named, .. } => named.extend(values),
            ref kind => panic!("{} can’t have named values", kind.name()),
        })
    }

    /// Adds names for bits of a BIT STRING.
    ///
    /// # Panics
    ///
    /// The function panics if the schema isn’t a BIT STRING.
    pub fn named_bits(self, bits: &[(&str, usize)]) -> Self {
        self.update(|inner| match inner.kind {
            Kind::BitString { ref mut named } => {
                named.extend(bits.iter().map(|&(name, bit)| {
                    (String::from(name), bit)
                }))
            }
            ref kind => panic!("{} can’t have named bits", kind.name()),
        })
    }

    /// Adds a defined-by rule with values of this schema as the source.
    pub fn defines(self, define: Define) -> Self {
        self.update(|inner| inner.defines.push(define))
    }

    /// Sets the name of the type used when printing values.
    pub fn with_name(self, name: &str) -> Self {
        self.update(|inner| inner.name = Some(name.into()))
    }
}

/// # Queries
///
impl Schema {
    /// Returns the kind of the schema.
    pub fn kind(&self) -> &Kind {
        &self.0.kind
    }

    /// Returns the tag of values.
    ///
    /// This is the implicit tag if there is one or the natural tag of the
    /// kind otherwise. CHOICE and ANY don’t have a tag.
    pub fn tag(&self) -> Option<Tag> {
        self.0.tag.or_else(|| self.0.kind.natural_tag())
    }

    /// Returns the explicit tag if there is one.
    pub fn expl(&self) -> Option<Tag> {
        self.0.expl
    }

    /// Returns the default value if there is one.
    pub fn default_data(&self) -> Option<&Data> {
        self.0.default.as_ref()
    }

    /// Returns whether a field of this schema may be absent.
    ///
    /// This is true for both optional fields and fields with a default.
    pub fn is_optional(&self) -> bool {
        self.0.optional || self.0.default.is_some()
    }

    /// Returns the defined-by rules declared for this schema.
    pub fn defines_rules(&self) -> &[Define] {
        &self.0.defines
    }

    /// Returns the name of the type.
    ///
    /// This is the name given via [`with_name`][Self::with_name] or the
    /// name of the kind.
    pub fn type_name(&self) -> &str {
        match self.0.name {
            Some(ref name) => name,
            None => self.0.kind.name(),
        }
    }

    /// Returns the fields of a SEQUENCE or SET or the alternatives of a
    /// CHOICE.
    ///
    /// All other schemas have no fields.
    pub fn fields(&self) -> &[Field] {
        match self.0.kind {
            Kind::Choice(ref fields)
            | Kind::Sequence(ref fields)
            | Kind::Set(ref fields) => fields,
            _ => &[]
        }
    }

    /// Returns the index of the field with the given name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|field| field.name == name)
    }

    /// Returns the item schema of a SEQUENCE OF or SET OF.
    pub fn item(&self) -> Option<&Schema> {
        match self.0.kind {
            Kind::SequenceOf { ref item, .. }
            | Kind::SetOf { ref item, .. } => Some(item),
            _ => None
        }
    }

    /// Returns the size bounds of a string or repetition.
    pub fn size_bounds_of(&self) -> Option<&Bounds<usize>> {
        match self.0.kind {
            Kind::OctetString { ref bounds }
            | Kind::String { ref bounds, .. }
            | Kind::SequenceOf { ref bounds, .. }
            | Kind::SetOf { ref bounds, .. } => bounds.as_ref(),
            _ => None
        }
    }

    /// Returns whether an encoded value starting with `tag` can be a value.
    ///
    /// This takes the explicit tag into account. A CHOICE accepts the
    /// tags of all its alternatives and ANY accepts every tag.
    pub fn can_start_with(&self, tag: Tag) -> bool {
        if let Some(expl) = self.0.expl {
            return expl == tag
        }
        match self.0.kind {
            Kind::Choice(ref alts) => {
                alts.iter().any(|alt| alt.schema.can_start_with(tag))
            }
            Kind::Any => true,
            _ => self.tag() == Some(tag)
        }
    }

    /// Returns the name of an INTEGER or ENUMERATED value.
    pub fn value_name(&self, value: &BigInt) -> Option<&str> {
        match self.0.kind {
            Kind::Integer { ref named, .. } | Kind::Enumerated { ref named } => {
                named.iter().find_map(|(name, item)| {
                    (item == value).then_some(name.as_str())
                })
            }
            _ => None
        }
    }

    /// Returns the name of a bit of a BIT STRING.
    pub fn bit_name(&self, bit: usize) -> Option<&str> {
        match self.0.kind {
            Kind::BitString { ref named } => {
                named.iter().find_map(|(name, item)| {
                    (*item == bit).then_some(name.as_str())
                })
            }
            _ => None
        }
    }

    /// Returns whether `other` describes the same encoding.
    ///
    /// This requires the same kind and the same tags.
    pub fn is_compatible(&self, other: &Schema) -> bool {
        self.0.kind.same_as(&other.0.kind)
            && self.tag() == other.tag()
            && self.expl() == other.expl()
    }
}

/// # Values
///
impl Schema {
    /// Creates a value of the schema with the given data.
    ///
    /// Returns an error if the data isn’t acceptable.
    pub fn value(&self, data: Data) -> Result<Value, Error> {
        let data = self.check_data(data)?;
        Ok(Value::new(self.clone(), Some(data)))
    }

    /// Creates an empty value.
    ///
    /// SEQUENCE and SET values start out with all fields absent, SEQUENCE
    /// OF and SET OF values without items. All other values are unset.
    pub fn empty(&self) -> Value {
        let data = match self.0.kind {
            Kind::Sequence(ref fields) | Kind::Set(ref fields) => {
                Some(Data::Fields(vec![None; fields.len()]))
            }
            Kind::SequenceOf { .. } | Kind::SetOf { .. } => {
                Some(Data::Items(Vec::new()))
            }
            _ => None
        };
        Value::new(self.clone(), data)
    }

    /// Creates a value of an INTEGER or ENUMERATED from a value name.
    pub fn named_value(&self, name: &str) -> Result<Value, Error> {
        let value = match self.0.kind {
            Kind::Integer { ref named, .. } | Kind::Enumerated { ref named } => {
                named.iter().find_map(|(item, value)| {
                    (item == name).then(|| value.clone())
                })
            }
            _ => return Err(self.unacceptable("named value"))
        };
        match value {
            Some(value) => self.value(Data::Integer(value)),
            None => Err(Error::new(
                ErrorKind::ObjUnknown,
                format!("unknown value name '{}'", name)
            ))
        }
    }

    /// Creates a BIT STRING value with the given named bits set.
    pub fn bits_value(&self, names: &[&str]) -> Result<Value, Error> {
        let mut bits = Vec::with_capacity(names.len());
        for name in names {
            let bit = match self.0.kind {
                Kind::BitString { ref named } => {
                    named.iter().find_map(|(item, bit)| {
                        (item == name).then_some(*bit)
                    })
                }
                _ => return Err(self.unacceptable("named bits"))
            };
            match bit {
                Some(bit) => bits.push(bit),
                None => {
                    return Err(Error::new(
                        ErrorKind::ObjUnknown,
                        format!("unknown bit name '{}'", name)
                    ))
                }
            }
        }
        self.value(Data::BitString(BitString::from_set_bits(bits)))
    }

    /// Creates a character string value from text.
    pub fn text_value(&self, text: &str) -> Result<Value, Error> {
        match self.0.kind {
            Kind::String { charset, .. } => {
                let octets = charset.encode_str(text)?;
                self.value(Data::Octets(octets.into()))
            }
            Kind::OctetString { .. } => {
                self.value(Data::Octets(Bytes::copy_from_slice(
                    text.as_bytes()
                )))
            }
            _ => Err(self.unacceptable("text"))
        }
    }

    /// Moves a value of a compatible schema over to this schema.
    ///
    /// The data is checked against the constraints of this schema.
    pub(crate) fn adopt(&self, value: Value) -> Result<Value, Error> {
        if !self.is_compatible(value.schema()) {
            return Err(Error::new(
                ErrorKind::InvalidValueType,
                format!(
                    "{} value is not acceptable for {}",
                    value.schema().type_name(), self.type_name()
                )
            ))
        }
        let data = match value.data() {
            Some(data) => Some(self.check_data(data.clone())?),
            None => None
        };
        Ok(value.with_schema(self.clone(), data))
    }

    /// Checks that data is acceptable for the schema.
    ///
    /// Returns the data in normalized form.
    pub(crate) fn check_data(&self, data: Data) -> Result<Data, Error> {
        match (&self.0.kind, data) {
            (Kind::Boolean, data @ Data::Boolean(_)) => Ok(data),
            (Kind::Integer { bounds, .. }, Data::Integer(value)) => {
                if let Some(bounds) = bounds {
                    bounds.check(&value)?;
                }
                Ok(Data::Integer(value))
            }
            (Kind::Enumerated { named }, Data::Integer(value)) => {
                if named.iter().any(|(_, item)| *item == value) {
                    Ok(Data::Integer(value))
                }
                else {
                    Err(Error::new(
                        ErrorKind::ObjUnknown,
                        format!("unknown ENUMERATED value {}", value)
                    ))
                }
            }
            (Kind::BitString { named }, Data::BitString(bits)) => {
                if named.is_empty() {
                    Ok(Data::BitString(bits))
                }
                else {
                    Ok(Data::BitString(bits.trim_trailing_zeros()))
                }
            }
            (Kind::OctetString { bounds }, Data::Octets(octets)) => {
                if let Some(bounds) = bounds {
                    bounds.check(&octets.len())?;
                }
                Ok(Data::Octets(octets))
            }
            (Kind::Null, Data::Null) => Ok(Data::Null),
            (Kind::Oid, data @ Data::Oid(_)) => Ok(data),
            (Kind::String { charset, bounds }, Data::Octets(octets)) => {
                charset.check_slice(&octets)?;
                if let Some(bounds) = bounds {
                    bounds.check(&octets.len())?;
                }
                Ok(Data::Octets(octets))
            }
            (Kind::UtcTime, Data::Time(value)) => {
                time::check_utc_time(&value)?;
                Ok(Data::Time(value))
            }
            (Kind::GeneralizedTime, Data::Time(value)) => {
                time::check_generalized_time(&value)?;
                Ok(Data::Time(value))
            }
            (Kind::Any, Data::Any(octets)) => {
                if octets.is_empty() {
                    Err(Error::new(
                        ErrorKind::InvalidValueType,
                        "empty ANY value"
                    ))
                }
                else {
                    Ok(Data::Any(octets))
                }
            }
            (Kind::Choice(alts), Data::Choice(chosen)) => {
                let Chosen { index, value } = *chosen;
                let alt = alts.get(index).ok_or_else(|| {
                    Error::new(
                        ErrorKind::ObjUnknown,
                        format!("unknown CHOICE alternative {}", index)
                    )
                })?;
                let value = alt.schema.adopt(value)?;
                Ok(Data::Choice(Box::new(Chosen { index, value })))
            }
            (Kind::Sequence(fields) | Kind::Set(fields), Data::Fields(values)) => {
                if fields.len() != values.len() {
                    return Err(Error::new(
                        ErrorKind::InvalidValueType,
                        format!(
                            "expected {} fields, got {}",
                            fields.len(), values.len()
                        )
                    ))
                }
                let mut res = Vec::with_capacity(values.len());
                for (field, value) in fields.iter().zip(values) {
                    let value = match value {
                        Some(value) => Some(field.schema.adopt(value)?),
                        None => None
                    };
                    res.push(value.filter(|value| {
                        match field.schema.default_data() {
                            Some(default) => value.data() != Some(default),
                            None => true
                        }
                    }));
                }
                Ok(Data::Fields(res))
            }
            (
                Kind::SequenceOf { item, bounds } | Kind::SetOf { item, bounds },
                Data::Items(items)
            ) => {
                if let Some(bounds) = bounds {
                    bounds.check(&items.len())?;
                }
                items.into_iter().map(|value| {
                    item.adopt(value)
                }).collect::<Result<_, _>>().map(Data::Items)
            }
            (_, data) => Err(self.unacceptable(data.variant_name()))
        }
    }

    fn unacceptable(&self, what: &str) -> Error {
        Error::new(
            ErrorKind::InvalidValueType,
            format!("{} is not acceptable for {}", what, self.type_name())
        )
    }
}

/// # Decoding
///
impl Schema {
    /// Decodes a value from the beginning of `data`.
    ///
    /// Returns the value and the data following it. Offsets in the value
    /// and in errors are relative to the start of `data`.
    pub fn decode<'a>(
        &self, data: &'a [u8], ctx: &DecodeContext
    ) -> Result<(Value, &'a [u8]), Error> {
        self.decode_at(data, 0, &DecodePath::new(), ctx)
    }

    /// Decodes a value located somewhere within a larger piece of data.
    ///
    /// The first octet of `data` is assumed to be at `offset` and the
    /// decoded value at `path`. Both are used in the decoded value and
    /// errors only.
    pub fn decode_at<'a>(
        &self, data: &'a [u8], offset: usize, path: &DecodePath,
        ctx: &DecodeContext,
    ) -> Result<(Value, &'a [u8]), Error> {
        decode::decode_root(self, data, offset, path, ctx)
    }

    /// Decodes a value that has to span all of `data`.
    pub fn decode_all(
        &self, data: &[u8], ctx: &DecodeContext
    ) -> Result<Value, Error> {
        let (value, tail) = self.decode(data, ctx)?;
        if !tail.is_empty() {
            return Err(Error::decode("trailing data after value").at(
                data.len() - tail.len()
            ))
        }
        Ok(value)
    }
}


//--- Display

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(expl) = self.0.expl {
            write!(f, "{} EXPLICIT ", expl)?;
        }
        if let Some(tag) = self.0.tag {
            write!(f, "{} IMPLICIT ", tag)?;
        }
        f.write_str(self.type_name())?;
        if self.0.optional {
            f.write_str(" OPTIONAL")?;
        }
        if let Some(ref default) = self.0.default {
            write!(f, " DEFAULT {}", default)?;
        }
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::oid::Oid;

    #[test]
    fn tags() {
        assert_eq!(Schema::integer().tag(), Some(Tag::INTEGER));
        assert_eq!(
            Schema::integer().implicit(Tag::ctx(1)).tag(), Some(Tag::ctx(1))
        );
        assert_eq!(Schema::any().tag(), None);
        let choice = Schema::choice(vec![
            Field::new("a", Schema::integer()),
            Field::new("b", Schema::boolean().implicit(Tag::ctx(3))),
        ]);
        assert!(choice.can_start_with(Tag::INTEGER));
        assert!(choice.can_start_with(Tag::ctx(3)));
        assert!(!choice.can_start_with(Tag::BOOLEAN));
        let tagged = choice.explicit(Tag::ctx(0));
        assert!(tagged.can_start_with(Tag::ctx(0)));
        assert!(!tagged.can_start_with(Tag::INTEGER));
        assert!(Schema::any().can_start_with(Tag::ctx(7)));
    }

    #[test]
    #[should_panic]
    fn implicit_choice() {
        let _ = Schema::choice(vec![
            Field::new("a", Schema::integer()),
        ]).implicit(Tag::ctx(0));
    }

    #[test]
    #[should_panic]
    fn empty_enumerated() {
        let _ = Schema::enumerated(&[]);
    }

    #[test]
    #[should_panic]
    fn duplicate_fields() {
        let _ = Schema::sequence(vec![
            Field::new("a", Schema::integer()),
            Field::new("a", Schema::boolean()),
        ]);
    }

    #[test]
    fn check_data() {
        let int = Schema::integer().value_bounds(0, 10);
        assert!(int.value(5.into()).is_ok());
        assert_eq!(
            int.value(11.into()).unwrap_err().kind(), ErrorKind::Bounds
        );
        assert_eq!(
            int.value(true.into()).unwrap_err().kind(),
            ErrorKind::InvalidValueType
        );
        let en = Schema::enumerated(&[("a", 1), ("b", 5)]);
        assert!(en.value(5.into()).is_ok());
        assert_eq!(
            en.value(2.into()).unwrap_err().kind(), ErrorKind::ObjUnknown
        );
        assert_eq!(en.named_value("b").unwrap().as_integer(),
            Some(&BigInt::from(5))
        );
        assert_eq!(
            Schema::printable_string().value(
                Data::Octets(Bytes::from_static(b"a@b"))
            ).unwrap_err().kind(),
            ErrorKind::Decode
        );
        assert_eq!(
            Schema::octet_string().size_bounds(1, 2).value(
                Data::Octets(Bytes::from_static(b"abc"))
            ).unwrap_err().kind(),
            ErrorKind::Bounds
        );
        assert!(Schema::object_identifier().value(
            Oid::from_arcs(&[1, 2, 3]).unwrap().into()
        ).is_ok());
        assert_eq!(
            Schema::any().value(Data::Any(Bytes::new())).unwrap_err().kind(),
            ErrorKind::InvalidValueType
        );
    }

    #[test]
    fn named_bits() {
        let schema = Schema::bit_string().named_bits(&[
            ("a", 0), ("b", 1), ("c", 5)
        ]);
        let value = schema.bits_value(&["a", "c"]).unwrap();
        let bits = value.as_bit_string().unwrap();
        assert_eq!(bits.bit_len(), 6);
        assert_eq!(value.bit_names(), vec!["a", "c"]);
        let trimmed = schema.value(
            BitString::from_bits(16, b"\x80\x00").into()
        ).unwrap();
        assert_eq!(trimmed.as_bit_string().unwrap().bit_len(), 1);
        assert_eq!(
            schema.bits_value(&["x"]).unwrap_err().kind(),
            ErrorKind::ObjUnknown
        );
    }

    #[test]
    fn text() {
        let value = Schema::ia5_string().text_value("hello").unwrap();
        assert_eq!(value.as_str().as_deref(), Some("hello"));
        assert!(Schema::numeric_string().text_value("12a").is_err());
        assert_eq!(
            Schema::integer().text_value("1").unwrap_err().kind(),
            ErrorKind::InvalidValueType
        );
    }

    #[test]
    fn default_checked() {
        assert!(Schema::integer().value_bounds(1, 2).default(
            5.into()
        ).is_err());
        let schema = Schema::integer().default(3.into()).unwrap();
        assert!(schema.is_optional());
        assert_eq!(schema.default_data(), Some(&Data::from(3)));
    }

    #[test]
    fn builders_share() {
        let base = Schema::integer();
        let tagged = base.clone().implicit(Tag::ctx(2));
        assert_eq!(base.tag(), Some(Tag::INTEGER));
        assert_eq!(tagged.tag(), Some(Tag::ctx(2)));
        assert!(!base.is_compatible(&tagged));
        assert!(base.is_compatible(&Schema::integer().value_bounds(0, 1)));
    }

    #[test]
    fn display() {
        let schema = Schema::integer().explicit(Tag::ctx(0)).optional();
        assert_eq!(schema.to_string(), "[0] EXPLICIT INTEGER OPTIONAL");
    }
}
