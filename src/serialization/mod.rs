//! Serialization framework for the GridCache binary format.

mod codec;
mod data_input;
mod data_output;
mod data_serializable;
mod instance;
mod key;
mod registry;

pub use codec::{DecodeOutcome, InstantiationFailure, ObjectCodec};
pub use data_input::{DataInput, ObjectDataInput};
pub use data_output::{DataOutput, ObjectDataOutput};
pub use data_serializable::{DataSerializable, ObjectReader, ObjectWriter};
pub use instance::{FieldValue, StructBuilder, StructInstance, STRUCT_TYPE_ID};
pub use key::{key_hash, partition_for, CacheKey};
pub use registry::{Factory, TypeId, TypeRegistry};
