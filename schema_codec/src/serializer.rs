//! Top-level entry point (spec.md §4.G): wires a `Record` type to a
//! `SchemaRegistry` and turns values into compact binary payloads and back.

use crate::{
    bitio::{BitReader, BitWriter},
    codec::{FieldReader, FieldWriter},
    error::{ensure, Error, ErrorKind, Result},
    record::Record,
    registry::SchemaRegistry,
    store::SchemaStore,
};

pub struct Serializer<S> {
    registry: SchemaRegistry<S>,
}

impl<S: SchemaStore> Serializer<S> {
    pub fn new(store: S) -> Self {
        Serializer { registry: SchemaRegistry::new(store) }
    }

    /// Build a `Serializer` on top of a registry that may already have seen
    /// writes from an earlier version of a type (spec.md §5 evolution
    /// scenarios reuse one store's registry across struct shapes).
    pub fn from_registry(registry: SchemaRegistry<S>) -> Self {
        Serializer { registry }
    }

    pub fn into_registry(self) -> SchemaRegistry<S> {
        self.registry
    }

    pub fn registry(&self) -> &SchemaRegistry<S> {
        &self.registry
    }

    /// Write `compact_id` then each field in schema order (spec.md §4.G,
    /// write path).
    pub fn serialize<T: Record>(&self, value: &T) -> Result<Vec<u8>> {
        write_record(value, &self.registry)
    }

    /// Read `compact_id`, resolve its schema, and decode `T` field-by-field
    /// driven by the *stored* schema's field list, not `T::field_infos()`
    /// (spec.md §4.G, read path / evolution tolerance).
    pub fn deserialize<T: Record>(&self, bytes: &[u8]) -> Result<T> {
        read_record(bytes, &self.registry)
    }
}

pub(crate) fn write_record<T: Record, S: SchemaStore>(
    value: &T,
    registry: &SchemaRegistry<S>,
) -> Result<Vec<u8>> {
    let (_, compact_id) = registry.resolve_for_write::<T>()?;
    let mut buf = Vec::new();
    {
        let mut bits = BitWriter::new(&mut buf);
        bits.write_dynamic_number(compact_id as i64)?;
        let mut fw = FieldWriter { bits, registry };
        value.encode_fields(&mut fw)?;
        fw.bits.finish()?;
    }
    Ok(buf)
}

pub(crate) fn read_record<T: Record, S: SchemaStore>(
    bytes: &[u8],
    registry: &SchemaRegistry<S>,
) -> Result<T> {
    let mut bits = BitReader::new(bytes);
    let compact_id = bits.read_dynamic_number()?;
    let compact_id = u64::try_from(compact_id)
        .map_err(|_| Error::new(ErrorKind::CorruptStream, "negative compact id"))?;

    let meta = registry.resolve_for_read(compact_id)?;
    ensure!(
        meta.class_name == T::TYPE_NAME,
        UnknownClass,
        "stored class `{}` does not match requested `{}`",
        meta.class_name,
        T::TYPE_NAME,
    );

    let mut value = T::default_instance();
    let mut fr = FieldReader { bits, registry };
    value.decode_fields(&mut fr, &meta.fields)?;
    Ok(value)
}
