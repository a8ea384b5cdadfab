//! A compact binary record codec with the schema moved out of the payload.
//!
//! Every encoded value starts with nothing but a `compact_id`: an integer
//! alias for a schema that lives in a side-channel [`store::SchemaStore`],
//! keyed by a SHA-1 fingerprint of the record's field names and types. The
//! payload that follows carries only field values, in the order the stored
//! schema says they were written in — not the order the current Rust struct
//! declares them in. A reader decodes against whatever schema the writer
//! actually used, so a struct can gain fields, lose fields, or reorder them
//! between the two ends of a pipe without either end needing to agree on a
//! single version up front.
//!
//! `#[derive(Record)]` is the normal way to make a struct encodable; see
//! [`record::Record`] for the trait it implements and
//! [`serializer::Serializer`] for the read/write entry point.

pub mod bitio;
pub mod codec;
mod do_if_err;
mod error;
pub mod field_type;
pub mod record;
pub mod registry;
pub mod schema;
pub mod serializer;
pub mod store;

#[cfg(feature = "redb-store")]
pub mod store_redb;

pub use error::{Error, ErrorKind, Result};
pub use field_type::{Decimal, Instant};
pub use record::Record;
pub use registry::SchemaRegistry;
pub use schema::{ClassMetaData, FieldInfo};
pub use serializer::Serializer;
pub use store::{MemStore, SchemaStore};

#[cfg(feature = "redb-store")]
pub use store_redb::RedbStore;

pub use schema_codec_derive::Record;
