//! Top-level object encode/decode and the instantiation failure path.

use crate::error::{GridError, Result};
use tracing::debug;

use super::data_serializable::{DataSerializable, ObjectReader, ObjectWriter};
use super::instance::StructInstance;
use super::registry::{TypeId, TypeRegistry};
use super::{DataInput, ObjectDataInput, ObjectDataOutput, STRUCT_TYPE_ID};

/// Terminal outcome of a decode pass.
///
/// Decode runs `AwaitingTypeId -> TypeResolved -> Decoded` on success, or
/// `AwaitingTypeId -> TypeUnresolved -> Failed` when the received type id
/// has no locally constructible type. The failed path is an expected,
/// testable condition surfaced as a value, never a panic, a null, or a
/// default instance.
#[derive(Debug)]
pub enum DecodeOutcome {
    /// The type id resolved and the instance was fully populated.
    Decoded(Box<dyn DataSerializable>),
    /// No usable factory existed for a received type id.
    Unresolved(InstantiationFailure),
}

impl DecodeOutcome {
    /// Returns `true` for the success arm.
    pub fn is_decoded(&self) -> bool {
        matches!(self, Self::Decoded(_))
    }

    /// Returns the decoded object, if any.
    pub fn decoded(self) -> Option<Box<dyn DataSerializable>> {
        match self {
            Self::Decoded(obj) => Some(obj),
            Self::Unresolved(_) => None,
        }
    }

    /// Returns the failure context, if any.
    pub fn unresolved(self) -> Option<InstantiationFailure> {
        match self {
            Self::Decoded(_) => None,
            Self::Unresolved(failure) => Some(failure),
        }
    }
}

/// Context carried by the "cannot construct" decode outcome.
///
/// The raw type id and unconsumed bytes travel with the failure so the
/// remote caller can report or forward them. When a nested slot inside a
/// larger object fails, the enclosing instance is preserved here with
/// every field decoded before the failing slot still populated; it is
/// only ever surfaced inside the failure, never as a success.
#[derive(Debug)]
pub struct InstantiationFailure {
    /// The type id that had no registered factory.
    pub type_id: TypeId,
    /// The bytes left unconsumed when resolution failed.
    pub raw_bytes: Vec<u8>,
    /// Name of the enclosing type whose nested slot failed, if any.
    pub declaring_type: Option<&'static str>,
    /// The enclosing instance with its already-decoded fields, if any.
    pub partial: Option<Box<dyn DataSerializable>>,
}

impl InstantiationFailure {
    /// Downcasts the partially decoded enclosing instance to `T`.
    pub fn partial_as<T: 'static>(&self) -> Option<&T> {
        self.partial
            .as_deref()
            .and_then(|p| p.as_any().downcast_ref::<T>())
    }
}

/// Encodes and decodes objects against a type registry.
///
/// One stream, one decode pass, one owner: the codec is a synchronous,
/// CPU-bound transformation over in-memory buffers and holds no state
/// between calls.
#[derive(Debug)]
pub struct ObjectCodec<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> ObjectCodec<'a> {
    /// Creates a codec resolving type ids through `registry`.
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Creates a codec over the process-wide registry.
    pub fn with_global_registry() -> ObjectCodec<'static> {
        ObjectCodec {
            registry: TypeRegistry::global(),
        }
    }

    /// Encodes an object: type id (i32), then its fields in declared order.
    ///
    /// A [`StructInstance`] encodes under [`STRUCT_TYPE_ID`] with its
    /// self-describing layout; everything else uses its fixed layout.
    pub fn encode(&self, obj: &dyn DataSerializable) -> Result<Vec<u8>> {
        let mut output = ObjectDataOutput::new();
        let mut writer = ObjectWriter::new(&mut output);
        writer.write_object(obj)?;
        Ok(output.into_bytes())
    }

    /// Decodes one object from `bytes`.
    ///
    /// Truncated input is `Err(UnexpectedEndOfStream)`. An unknown type
    /// id, at the top level or in a nested slot, is
    /// `Ok(DecodeOutcome::Unresolved(_))`.
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodeOutcome> {
        let mut input = ObjectDataInput::new(bytes);
        let type_id = input.read_int()?;

        if type_id == STRUCT_TYPE_ID {
            let mut instance = StructInstance::default();
            let mut reader = ObjectReader::new(&mut input, self.registry);
            instance.read_data(&mut reader)?;
            return Ok(DecodeOutcome::Decoded(Box::new(instance)));
        }

        let Some(factory) = self.registry.resolve(type_id) else {
            debug!(type_id, "received type id has no registered factory");
            return Ok(DecodeOutcome::Unresolved(InstantiationFailure {
                type_id,
                raw_bytes: input.take_remaining(),
                declaring_type: None,
                partial: None,
            }));
        };

        let mut obj = factory();
        let mut reader = ObjectReader::new(&mut input, self.registry);
        match obj.read_data(&mut reader) {
            Ok(()) => Ok(DecodeOutcome::Decoded(obj)),
            Err(GridError::Instantiation(mut failure)) => {
                debug!(
                    type_id = failure.type_id,
                    declaring_type = obj.type_name(),
                    "nested slot failed to resolve during decode"
                );
                failure.declaring_type = Some(obj.type_name());
                failure.partial = Some(obj);
                Ok(DecodeOutcome::Unresolved(failure))
            }
            Err(e) => Err(e),
        }
    }

    /// Convenience: decodes and downcasts to `T`, treating both an
    /// unresolved id and a type mismatch as errors.
    pub fn decode_as<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DataSerializable + 'static,
    {
        match self.decode(bytes)? {
            DecodeOutcome::Decoded(obj) => {
                let name = obj.type_name();
                obj.into_any().downcast::<T>().map(|b| *b).map_err(|_| {
                    GridError::Serialization(format!(
                        "decoded {} where {} was expected",
                        name,
                        std::any::type_name::<T>()
                    ))
                })
            }
            DecodeOutcome::Unresolved(failure) => Err(GridError::Instantiation(failure)),
        }
    }
}
