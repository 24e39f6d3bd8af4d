//! Fixed-layout serialization contract.

use crate::error::{GridError, Result};
use std::any::Any;
use std::fmt;

use super::codec::InstantiationFailure;
use super::instance::StructInstance;
use super::registry::{TypeId, TypeRegistry};
use super::{DataInput, DataOutput, ObjectDataInput, ObjectDataOutput, STRUCT_TYPE_ID};

/// Trait for types serialized in a fixed, type-specific field order.
///
/// The order of writes inside [`write_data`](Self::write_data) is the wire
/// schema for this type's id and must never change without a new
/// [`TypeId`]. Equality and hash for implementing types must be defined
/// over exactly the serialized field set, so a value round-tripped through
/// the codec compares and hashes the same as the original.
pub trait DataSerializable: fmt::Debug + Send + Sync {
    /// Returns the wire type id for this type.
    fn type_id(&self) -> TypeId;

    /// Returns a short human-readable name for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Writes this object's fields in declared order.
    fn write_data(&self, output: &mut ObjectWriter<'_>) -> Result<()>;

    /// Reads this object's fields in declared order, populating `self`.
    fn read_data(&mut self, input: &mut ObjectReader<'_, '_>) -> Result<()>;

    /// Upcast seam for structural inspection.
    fn as_any(&self) -> &dyn Any;

    /// Consuming upcast seam for typed downcasts.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Writer handed to [`DataSerializable::write_data`].
///
/// Delegates primitives to the cursor and adds nested-object slots:
/// a nested object is written as its own type id followed by its fields,
/// and a list as an element count followed by each element in order.
#[derive(Debug)]
pub struct ObjectWriter<'a> {
    output: &'a mut ObjectDataOutput,
}

impl<'a> ObjectWriter<'a> {
    /// Creates a writer over the given cursor.
    pub fn new(output: &'a mut ObjectDataOutput) -> Self {
        Self { output }
    }

    /// Writes a single byte (i8).
    pub fn write_byte(&mut self, v: i8) -> Result<()> {
        self.output.write_byte(v)
    }

    /// Writes a boolean.
    pub fn write_bool(&mut self, v: bool) -> Result<()> {
        self.output.write_bool(v)
    }

    /// Writes a 16-bit signed integer.
    pub fn write_short(&mut self, v: i16) -> Result<()> {
        self.output.write_short(v)
    }

    /// Writes a 32-bit signed integer.
    pub fn write_int(&mut self, v: i32) -> Result<()> {
        self.output.write_int(v)
    }

    /// Writes a 64-bit signed integer.
    pub fn write_long(&mut self, v: i64) -> Result<()> {
        self.output.write_long(v)
    }

    /// Writes a 32-bit floating point.
    pub fn write_float(&mut self, v: f32) -> Result<()> {
        self.output.write_float(v)
    }

    /// Writes a 64-bit floating point.
    pub fn write_double(&mut self, v: f64) -> Result<()> {
        self.output.write_double(v)
    }

    /// Writes raw bytes without a length prefix.
    pub fn write_bytes(&mut self, v: &[u8]) -> Result<()> {
        self.output.write_bytes(v)
    }

    /// Writes a tagged string.
    pub fn write_string(&mut self, v: &str) -> Result<()> {
        self.output.write_string(v)
    }

    /// Writes a nested object: its type id, then its fields.
    pub fn write_object(&mut self, obj: &dyn DataSerializable) -> Result<()> {
        self.output.write_int(obj.type_id())?;
        obj.write_data(self)
    }

    /// Writes an ordered list: element count, then each element as a
    /// nested object carrying its own type id.
    pub fn write_object_list<T: DataSerializable>(&mut self, items: &[T]) -> Result<()> {
        self.output.write_int(items.len() as i32)?;
        for item in items {
            self.write_object(item)?;
        }
        Ok(())
    }
}

/// Reader handed to [`DataSerializable::read_data`].
///
/// Carries the registry so nested type ids can be resolved mid-decode.
/// A nested id with no registry entry surfaces as
/// [`GridError::Instantiation`] scoped to that slot.
#[derive(Debug)]
pub struct ObjectReader<'a, 'buf> {
    input: &'a mut ObjectDataInput<'buf>,
    registry: &'a TypeRegistry,
}

impl<'a, 'buf> ObjectReader<'a, 'buf> {
    /// Creates a reader over the given cursor, resolving nested types
    /// through `registry`.
    pub fn new(input: &'a mut ObjectDataInput<'buf>, registry: &'a TypeRegistry) -> Self {
        Self { input, registry }
    }

    /// Returns the registry backing nested-object resolution.
    pub fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    /// Returns the number of bytes remaining to be read.
    pub fn remaining(&self) -> usize {
        self.input.remaining()
    }

    /// Reads a single byte (i8).
    pub fn read_byte(&mut self) -> Result<i8> {
        self.input.read_byte()
    }

    /// Reads a boolean.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.input.read_bool()
    }

    /// Reads a 16-bit signed integer.
    pub fn read_short(&mut self) -> Result<i16> {
        self.input.read_short()
    }

    /// Reads a 32-bit signed integer.
    pub fn read_int(&mut self) -> Result<i32> {
        self.input.read_int()
    }

    /// Reads a 64-bit signed integer.
    pub fn read_long(&mut self) -> Result<i64> {
        self.input.read_long()
    }

    /// Reads a 32-bit floating point.
    pub fn read_float(&mut self) -> Result<f32> {
        self.input.read_float()
    }

    /// Reads a 64-bit floating point.
    pub fn read_double(&mut self) -> Result<f64> {
        self.input.read_double()
    }

    /// Reads the specified number of raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.input.read_bytes(len)
    }

    /// Reads a tagged string.
    pub fn read_string(&mut self) -> Result<String> {
        self.input.read_string()
    }

    /// Reads a nested object: type id, registry resolution, then fields.
    ///
    /// An unregistered id fails with [`GridError::Instantiation`] carrying
    /// the id and the unconsumed bytes of the stream; the format is not
    /// self-synchronizing, so nothing after the failed slot is decodable.
    pub fn read_object(&mut self) -> Result<Box<dyn DataSerializable>> {
        let type_id = self.input.read_int()?;
        if type_id == STRUCT_TYPE_ID {
            let mut instance = StructInstance::default();
            instance.read_data(self)?;
            return Ok(Box::new(instance));
        }
        match self.registry.resolve(type_id) {
            Some(factory) => {
                let mut obj = factory();
                obj.read_data(self)?;
                Ok(obj)
            }
            None => Err(GridError::Instantiation(InstantiationFailure {
                type_id,
                raw_bytes: self.input.take_remaining(),
                declaring_type: None,
                partial: None,
            })),
        }
    }

    /// Reads a nested object and downcasts it to `T`.
    pub fn read_object_as<T>(&mut self) -> Result<T>
    where
        T: DataSerializable + 'static,
    {
        let obj = self.read_object()?;
        let name = obj.type_name();
        obj.into_any()
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| {
                GridError::Serialization(format!(
                    "nested object decoded as {} where {} was expected",
                    name,
                    std::any::type_name::<T>()
                ))
            })
    }

    /// Reads an ordered list of nested objects of type `T`.
    pub fn read_object_list_as<T>(&mut self) -> Result<Vec<T>>
    where
        T: DataSerializable + 'static,
    {
        let count = self.input.read_int()?;
        if count < 0 {
            return Err(GridError::Serialization(format!(
                "invalid list length: {}",
                count
            )));
        }
        // capacity hint capped by the buffer, so a hostile count cannot
        // force a giant allocation before the element reads fail
        let cap = (count as usize).min(self.input.remaining());
        let mut items = Vec::with_capacity(cap);
        for _ in 0..count {
            items.push(self.read_object_as::<T>()?);
        }
        Ok(items)
    }
}
