//! Process-wide registry mapping wire type ids to instance factories.

use crate::error::{GridError, Result};
use std::any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::debug;

use super::DataSerializable;

/// Small integer identifying a registered type on the wire, decoupled
/// from any in-process type name. Negative ids are reserved for system
/// types (see [`super::STRUCT_TYPE_ID`]).
pub type TypeId = i32;

/// Zero-argument constructor producing an empty instance ready for
/// [`DataSerializable::read_data`].
pub type Factory = Arc<dyn Fn() -> Box<dyn DataSerializable> + Send + Sync>;

struct FactoryEntry {
    type_name: &'static str,
    rust_type: any::TypeId,
    make: Factory,
}

/// Registry of wire type ids to factories.
///
/// Registration is append-only for the process lifetime and may happen at
/// any time, including lazily from concurrently executing request
/// handlers, so lookups and inserts are safe to interleave. Readers never
/// observe a partially constructed entry.
#[derive(Default)]
pub struct TypeRegistry {
    entries: RwLock<HashMap<TypeId, FactoryEntry>>,
}

// Factories are opaque closures, so only the table shape is printable.
impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl TypeRegistry {
    /// Creates a new empty registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static TypeRegistry {
        static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TypeRegistry::new)
    }

    /// Registers `T` under the given wire type id.
    ///
    /// Re-registering the same Rust type under the same id is idempotent
    /// and succeeds; binding a different type to an id already in use
    /// fails with [`GridError::DuplicateTypeId`].
    pub fn register<T>(&self, type_id: TypeId) -> Result<()>
    where
        T: DataSerializable + Default + 'static,
    {
        self.register_factory(
            type_id,
            any::type_name::<T>(),
            any::TypeId::of::<T>(),
            Arc::new(|| Box::new(T::default()) as Box<dyn DataSerializable>),
        )
    }

    fn register_factory(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        rust_type: any::TypeId,
        make: Factory,
    ) -> Result<()> {
        if type_id < 0 {
            return Err(GridError::Serialization(format!(
                "type id {} is in the reserved system range",
                type_id
            )));
        }
        let mut entries = self.entries.write().expect("type registry poisoned");
        if let Some(existing) = entries.get(&type_id) {
            if existing.rust_type == rust_type {
                return Ok(());
            }
            return Err(GridError::DuplicateTypeId {
                type_id,
                existing: existing.type_name,
                attempted: type_name,
            });
        }
        entries.insert(
            type_id,
            FactoryEntry {
                type_name,
                rust_type,
                make,
            },
        );
        debug!(type_id, type_name, "registered serializable type");
        Ok(())
    }

    /// Returns the factory for the given type id, if registered.
    pub fn resolve(&self, type_id: TypeId) -> Option<Factory> {
        self.entries
            .read()
            .expect("type registry poisoned")
            .get(&type_id)
            .map(|e| Arc::clone(&e.make))
    }

    /// Returns the registered type name for the given type id, if any.
    pub fn type_name(&self, type_id: TypeId) -> Option<&'static str> {
        self.entries
            .read()
            .expect("type registry poisoned")
            .get(&type_id)
            .map(|e| e.type_name)
    }

    /// Returns `true` if a factory is registered for the given type id.
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries
            .read()
            .expect("type registry poisoned")
            .contains_key(&type_id)
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.entries.read().expect("type registry poisoned").len()
    }

    /// Returns `true` if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.entries
            .read()
            .expect("type registry poisoned")
            .is_empty()
    }
}
