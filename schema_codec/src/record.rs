//! The `Record` trait (spec.md §4.A/§4.F "type descriptor provider"): the
//! static interface every serializable struct implements, ordinarily via
//! `#[derive(Record)]`. Rust's static typing does the job the source
//! system's runtime reflection does: the compiler, not a lookup at encode
//! time, picks which codec branch a field goes through.

use crate::{
    codec::{FieldReader, FieldWriter},
    error::Result,
    schema::FieldInfo,
    store::SchemaStore,
};
use std::io::{Read, Write};

pub trait Record: Sized {
    /// The name written into the schema's `class_name` (spec.md §4.C).
    /// `#[derive(Record)]` fills this in with the struct's name.
    const TYPE_NAME: &'static str;

    /// Field name/type pairs in canonical (lexicographic-by-name) order.
    /// Computed once, at macro-expansion time, not per call.
    fn field_infos() -> &'static [FieldInfo];

    /// A value with every field at its `Default`, used as the base instance
    /// evolution-tolerant decoding fills in from a stored schema's fields.
    fn default_instance() -> Self;

    fn encode_fields<W: Write, S: SchemaStore>(&self, w: &mut FieldWriter<'_, W, S>) -> Result<()>;

    /// Populate `self` from `r`, one stored field at a time. `stored_fields`
    /// is the *stored* schema's field list, not `Self::field_infos()`: a
    /// field present in storage but absent (or retyped) in the current
    /// struct must still have its bytes consumed, just discarded rather
    /// than assigned (spec.md §4.G, evolution tolerance).
    fn decode_fields<R: Read, S: SchemaStore>(
        &mut self,
        r: &mut FieldReader<'_, R, S>,
        stored_fields: &[FieldInfo],
    ) -> Result<()>;
}
