//! Self-describing (schema-carrying) serialization.
//!
//! Fields travel as (name, value) pairs, so a consumer decodes them
//! generically with no concrete type in hand, and two independently
//! compiled producers agree on object identity purely structurally.

use crate::error::{GridError, Result};
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use super::data_serializable::{DataSerializable, ObjectReader, ObjectWriter};
use super::registry::TypeId;

/// Reserved system type id for the self-describing container.
pub const STRUCT_TYPE_ID: TypeId = -3;

/// A typed value carried by a named field.
///
/// Deliberately excludes floating point so that equality and hashing stay
/// total; the variant set matches what the wire protocol guarantees both
/// sides can represent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    /// Boolean.
    Bool(bool),
    /// Signed 8-bit integer.
    Byte(i8),
    /// Signed 16-bit integer.
    Short(i16),
    /// Signed 32-bit integer.
    Int(i32),
    /// Signed 64-bit integer.
    Long(i64),
    /// Text in any of the four wire string forms.
    String(String),
    /// Timestamp as milliseconds since the Unix epoch.
    Date(i64),
    /// Nested self-describing instance.
    Instance(StructInstance),
    /// Ordered sequence of values.
    List(Vec<FieldValue>),
}

// Wire tags for FieldValue variants. Fixed contract, never renumber.
const TAG_BOOL: i8 = 1;
const TAG_BYTE: i8 = 2;
const TAG_SHORT: i8 = 3;
const TAG_INT: i8 = 4;
const TAG_LONG: i8 = 5;
const TAG_STRING: i8 = 6;
const TAG_DATE: i8 = 7;
const TAG_INSTANCE: i8 = 8;
const TAG_LIST: i8 = 9;

impl FieldValue {
    fn write_to(&self, output: &mut ObjectWriter<'_>) -> Result<()> {
        match self {
            Self::Bool(v) => {
                output.write_byte(TAG_BOOL)?;
                output.write_bool(*v)
            }
            Self::Byte(v) => {
                output.write_byte(TAG_BYTE)?;
                output.write_byte(*v)
            }
            Self::Short(v) => {
                output.write_byte(TAG_SHORT)?;
                output.write_short(*v)
            }
            Self::Int(v) => {
                output.write_byte(TAG_INT)?;
                output.write_int(*v)
            }
            Self::Long(v) => {
                output.write_byte(TAG_LONG)?;
                output.write_long(*v)
            }
            Self::String(v) => {
                output.write_byte(TAG_STRING)?;
                output.write_string(v)
            }
            Self::Date(v) => {
                output.write_byte(TAG_DATE)?;
                output.write_long(*v)
            }
            Self::Instance(v) => {
                output.write_byte(TAG_INSTANCE)?;
                v.write_fields(output)
            }
            Self::List(items) => {
                output.write_byte(TAG_LIST)?;
                output.write_int(items.len() as i32)?;
                for item in items {
                    item.write_to(output)?;
                }
                Ok(())
            }
        }
    }

    fn read_from(input: &mut ObjectReader<'_, '_>) -> Result<Self> {
        let tag = input.read_byte()?;
        match tag {
            TAG_BOOL => Ok(Self::Bool(input.read_bool()?)),
            TAG_BYTE => Ok(Self::Byte(input.read_byte()?)),
            TAG_SHORT => Ok(Self::Short(input.read_short()?)),
            TAG_INT => Ok(Self::Int(input.read_int()?)),
            TAG_LONG => Ok(Self::Long(input.read_long()?)),
            TAG_STRING => Ok(Self::String(input.read_string()?)),
            TAG_DATE => Ok(Self::Date(input.read_long()?)),
            TAG_INSTANCE => {
                let mut instance = StructInstance::default();
                instance.read_fields(input)?;
                Ok(Self::Instance(instance))
            }
            TAG_LIST => {
                let count = input.read_int()?;
                if count < 0 {
                    return Err(GridError::Serialization(format!(
                        "invalid list length: {}",
                        count
                    )));
                }
                let cap = (count as usize).min(input.remaining());
                let mut items = Vec::with_capacity(cap);
                for _ in 0..count {
                    items.push(Self::read_from(input)?);
                }
                Ok(Self::List(items))
            }
            _ => Err(GridError::Serialization(format!(
                "unknown field value tag: {}",
                tag
            ))),
        }
    }
}

/// Builder assembling a [`StructInstance`] one named field at a time.
#[derive(Debug, Default)]
pub struct StructBuilder {
    fields: Vec<(String, FieldValue)>,
    index: HashMap<String, usize>,
}

impl StructBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a named field.
    ///
    /// Writing the same name twice fails with
    /// [`GridError::DuplicateField`].
    pub fn write(&mut self, name: impl Into<String>, value: FieldValue) -> Result<&mut Self> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(GridError::DuplicateField(name));
        }
        self.index.insert(name.clone(), self.fields.len());
        self.fields.push((name, value));
        Ok(self)
    }

    /// Appends a boolean field.
    pub fn write_bool(&mut self, name: impl Into<String>, v: bool) -> Result<&mut Self> {
        self.write(name, FieldValue::Bool(v))
    }

    /// Appends a byte field.
    pub fn write_byte(&mut self, name: impl Into<String>, v: i8) -> Result<&mut Self> {
        self.write(name, FieldValue::Byte(v))
    }

    /// Appends a short field.
    pub fn write_short(&mut self, name: impl Into<String>, v: i16) -> Result<&mut Self> {
        self.write(name, FieldValue::Short(v))
    }

    /// Appends an int field.
    pub fn write_int(&mut self, name: impl Into<String>, v: i32) -> Result<&mut Self> {
        self.write(name, FieldValue::Int(v))
    }

    /// Appends a long field.
    pub fn write_long(&mut self, name: impl Into<String>, v: i64) -> Result<&mut Self> {
        self.write(name, FieldValue::Long(v))
    }

    /// Appends a string field.
    pub fn write_string(&mut self, name: impl Into<String>, v: impl Into<String>) -> Result<&mut Self> {
        self.write(name, FieldValue::String(v.into()))
    }

    /// Appends a timestamp field (milliseconds since the Unix epoch).
    pub fn write_date(&mut self, name: impl Into<String>, epoch_millis: i64) -> Result<&mut Self> {
        self.write(name, FieldValue::Date(epoch_millis))
    }

    /// Appends a nested instance field.
    pub fn write_instance(
        &mut self,
        name: impl Into<String>,
        v: StructInstance,
    ) -> Result<&mut Self> {
        self.write(name, FieldValue::Instance(v))
    }

    /// Appends an ordered list field.
    pub fn write_list(
        &mut self,
        name: impl Into<String>,
        items: Vec<FieldValue>,
    ) -> Result<&mut Self> {
        self.write(name, FieldValue::List(items))
    }

    /// Finalizes the builder into an immutable, field-addressable instance.
    pub fn create(self) -> StructInstance {
        StructInstance {
            fields: self.fields,
            index: self.index,
        }
    }
}

/// An immutable, field-addressable collection of (name, value) pairs.
///
/// Insertion order is preserved on the wire but carries no meaning:
/// reads go by name, and two instances are equal iff they hold the same
/// field-name set with equal values per name, regardless of which
/// concrete producer built them or in what order. Hashing follows the
/// same rule, so equal instances always hash identically.
#[derive(Debug, Clone, Default)]
pub struct StructInstance {
    fields: Vec<(String, FieldValue)>,
    index: HashMap<String, usize>,
}

impl StructInstance {
    /// Starts building a new instance.
    pub fn builder() -> StructBuilder {
        StructBuilder::new()
    }

    /// Retrieves a field by name. Absence is an error, not a default.
    pub fn read(&self, name: &str) -> Result<&FieldValue> {
        self.index
            .get(name)
            .map(|&i| &self.fields[i].1)
            .ok_or_else(|| GridError::UnknownField(name.to_string()))
    }

    /// Returns `true` if a field with the given name exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns field names in insertion order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// Returns the number of fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the instance carries no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn write_fields(&self, output: &mut ObjectWriter<'_>) -> Result<()> {
        output.write_int(self.fields.len() as i32)?;
        for (name, value) in &self.fields {
            output.write_string(name)?;
            value.write_to(output)?;
        }
        Ok(())
    }

    fn read_fields(&mut self, input: &mut ObjectReader<'_, '_>) -> Result<()> {
        let count = input.read_int()?;
        if count < 0 {
            return Err(GridError::Serialization(format!(
                "invalid field count: {}",
                count
            )));
        }
        // capacity hint only: a hostile count must not allocate past what
        // the buffer could possibly hold
        let cap = (count as usize).min(input.remaining());
        let mut fields = Vec::with_capacity(cap);
        let mut index = HashMap::with_capacity(cap);
        for _ in 0..count {
            let name = input.read_string()?;
            if index.contains_key(&name) {
                return Err(GridError::DuplicateField(name));
            }
            let value = FieldValue::read_from(input)?;
            index.insert(name.clone(), fields.len());
            fields.push((name, value));
        }
        self.fields = fields;
        self.index = index;
        Ok(())
    }
}

impl PartialEq for StructInstance {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .all(|(name, value)| other.read(name).map_or(false, |v| v == value))
    }
}

impl Eq for StructInstance {}

impl Hash for StructInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // sorted by name so insertion order cannot leak into the hash
        let mut names: Vec<&str> = self.field_names().collect();
        names.sort_unstable();
        for name in names {
            name.hash(state);
            self.fields[self.index[name]].1.hash(state);
        }
    }
}

impl DataSerializable for StructInstance {
    fn type_id(&self) -> TypeId {
        STRUCT_TYPE_ID
    }

    fn type_name(&self) -> &'static str {
        "StructInstance"
    }

    fn write_data(&self, output: &mut ObjectWriter<'_>) -> Result<()> {
        self.write_fields(output)
    }

    fn read_data(&mut self, input: &mut ObjectReader<'_, '_>) -> Result<()> {
        self.read_fields(input)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
        self
    }
}
