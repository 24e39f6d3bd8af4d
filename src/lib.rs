//! Object serialization core for the GridCache client protocol.
//!
//! A server process and heterogeneous-language clients exchange typed
//! objects over a byte stream. Both sides agree, without shared source
//! code, on which concrete type a byte sequence decodes to, the exact
//! field layout used, and what equality and hashing mean for objects
//! used as lookup keys.
//!
//! Two encoding modes exist, chosen explicitly by the producer:
//!
//! - **Fixed-layout** ([`serialization::DataSerializable`]): the type's
//!   declared field order is the wire schema, keyed by a registered
//!   [`serialization::TypeId`].
//! - **Self-describing** ([`serialization::StructInstance`]): fields
//!   travel as (name, value) pairs and compare structurally, so two
//!   independently compiled producers agree on identity without sharing
//!   a type definition.
//!
//! Decoding a type id with no registered factory yields a
//! [`serialization::DecodeOutcome::Unresolved`] value carrying the raw
//! id and bytes. It is an expected, catchable outcome, never a panic.

#![warn(missing_docs)]

pub mod error;
pub mod serialization;

pub use error::{GridError, Result};
pub use serialization::{
    DataInput, DataOutput, DataSerializable, DecodeOutcome, InstantiationFailure, ObjectCodec,
    ObjectDataInput, ObjectDataOutput, TypeId, TypeRegistry,
};
