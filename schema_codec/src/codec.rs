//! The value codec (spec.md §4.F): the branch table that encodes/decodes a
//! value given its *static* type, never the runtime type. `FieldWriter`/
//! `FieldReader` are the per-value-call handles the derive-generated
//! `Record::encode_fields`/`decode_fields` use; `skip_value` implements
//! evolution-skip for a stored field whose current-type counterpart doesn't
//! match, driven purely by the stored type name string.

use crate::{
    bitio::{read_dynamic_len, read_utf, write_dynamic_len, write_utf, BitReader, BitWriter},
    error::{Error, ErrorKind, Result},
    field_type::{self, Decimal, Instant},
    record::Record,
    registry::SchemaRegistry,
    store::SchemaStore,
};
use std::io::{Read, Write};

pub struct FieldWriter<'r, W, S> {
    pub(crate) bits: BitWriter<W>,
    pub(crate) registry: &'r SchemaRegistry<S>,
}

macro_rules! primitive_dynamic {
    ($($m:ident($t:ty)),* $(,)?) => {$(
        pub fn $m(&mut self, v: $t) -> Result<()> {
            self.bits.write_dynamic_number(v as i64)
        }
    )*};
}

macro_rules! primitive_aligned {
    ($($m:ident($t:ty)),* $(,)?) => {$(
        pub fn $m(&mut self, v: $t) -> Result<()> {
            self.bits.write_aligned_bytes(&v.to_be_bytes())
        }
    )*};
}

impl<'r, W: Write, S: SchemaStore> FieldWriter<'r, W, S> {
    pub fn encode_bool(&mut self, v: bool) -> Result<()> {
        self.bits.write_bit(v)
    }

    primitive_dynamic!(encode_i8(i8), encode_i16(i16), encode_i32(i32));

    pub fn encode_i64(&mut self, v: i64) -> Result<()> {
        self.bits.write_aligned_bytes(&v.to_be_bytes())
    }

    pub fn encode_f32(&mut self, v: f32) -> Result<()> {
        self.bits.write_aligned_bytes(&v.to_be_bytes())
    }

    pub fn encode_f64(&mut self, v: f64) -> Result<()> {
        self.bits.write_aligned_bytes(&v.to_be_bytes())
    }

    fn write_null_tag(&mut self, is_none: bool) -> Result<()> {
        // bit = 1 => null (spec.md §4.F, polarity fixed per §9 open question 1)
        self.bits.write_bit(is_none)
    }

    pub fn encode_boxed_bool(&mut self, v: Option<bool>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(v) = v {
            self.bits.write_bit(v)?;
        }
        Ok(())
    }

    pub fn encode_boxed_i8(&mut self, v: Option<i8>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(v) = v {
            self.bits.write_dynamic_number(v as i64)?;
        }
        Ok(())
    }

    pub fn encode_boxed_i16(&mut self, v: Option<i16>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(v) = v {
            self.bits.write_dynamic_number(v as i64)?;
        }
        Ok(())
    }

    pub fn encode_boxed_i32(&mut self, v: Option<i32>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(v) = v {
            self.bits.write_dynamic_number(v as i64)?;
        }
        Ok(())
    }

    pub fn encode_boxed_i64(&mut self, v: Option<i64>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(v) = v {
            self.bits.write_aligned_bytes(&v.to_be_bytes())?;
        }
        Ok(())
    }

    pub fn encode_boxed_f32(&mut self, v: Option<f32>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(v) = v {
            self.bits.write_aligned_bytes(&v.to_be_bytes())?;
        }
        Ok(())
    }

    pub fn encode_boxed_f64(&mut self, v: Option<f64>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(v) = v {
            self.bits.write_aligned_bytes(&v.to_be_bytes())?;
        }
        Ok(())
    }

    pub fn encode_array_bool(&mut self, v: Option<&[bool]>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(elems) = v {
            write_dynamic_len(&mut self.bits, elems.len())?;
            for &e in elems {
                self.bits.write_bit(e)?;
            }
        }
        Ok(())
    }

    pub fn encode_array_i8(&mut self, v: Option<&[i8]>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(elems) = v {
            write_dynamic_len(&mut self.bits, elems.len())?;
            for &e in elems {
                self.bits.write_dynamic_number(e as i64)?;
            }
        }
        Ok(())
    }

    pub fn encode_array_i16(&mut self, v: Option<&[i16]>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(elems) = v {
            write_dynamic_len(&mut self.bits, elems.len())?;
            for &e in elems {
                self.bits.write_dynamic_number(e as i64)?;
            }
        }
        Ok(())
    }

    pub fn encode_array_i32(&mut self, v: Option<&[i32]>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(elems) = v {
            write_dynamic_len(&mut self.bits, elems.len())?;
            for &e in elems {
                self.bits.write_dynamic_number(e as i64)?;
            }
        }
        Ok(())
    }

    pub fn encode_array_i64(&mut self, v: Option<&[i64]>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(elems) = v {
            write_dynamic_len(&mut self.bits, elems.len())?;
            for &e in elems {
                self.bits.write_aligned_bytes(&e.to_be_bytes())?;
            }
        }
        Ok(())
    }

    pub fn encode_array_f32(&mut self, v: Option<&[f32]>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(elems) = v {
            write_dynamic_len(&mut self.bits, elems.len())?;
            for &e in elems {
                self.bits.write_aligned_bytes(&e.to_be_bytes())?;
            }
        }
        Ok(())
    }

    pub fn encode_array_f64(&mut self, v: Option<&[f64]>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(elems) = v {
            write_dynamic_len(&mut self.bits, elems.len())?;
            for &e in elems {
                self.bits.write_aligned_bytes(&e.to_be_bytes())?;
            }
        }
        Ok(())
    }

    pub fn encode_str(&mut self, v: Option<&str>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(s) = v {
            write_utf(&mut self.bits, s)?;
        }
        Ok(())
    }

    pub fn encode_instant(&mut self, v: Option<Instant>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(instant) = v {
            self.bits.write_aligned_bytes(&instant.millis().to_be_bytes())?;
        }
        Ok(())
    }

    pub fn encode_decimal(&mut self, v: Option<&Decimal>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(d) = v {
            let bytes = d.to_signed_bytes_be();
            write_dynamic_len(&mut self.bits, bytes.len())?;
            self.bits.write_aligned_bytes(&bytes)?;
            self.bits.write_dynamic_number(d.scale as i64)?;
        }
        Ok(())
    }

    pub fn encode_record<T: Record>(&mut self, v: Option<&T>) -> Result<()> {
        self.write_null_tag(v.is_none())?;
        if let Some(value) = v {
            let nested = crate::serializer::write_record(value, self.registry)?;
            write_dynamic_len(&mut self.bits, nested.len())?;
            self.bits.write_aligned_bytes(&nested)?;
        }
        Ok(())
    }
}

pub struct FieldReader<'r, R, S> {
    pub(crate) bits: BitReader<R>,
    pub(crate) registry: &'r SchemaRegistry<S>,
}

macro_rules! decode_dynamic {
    ($($m:ident($t:ty)),* $(,)?) => {$(
        pub fn $m(&mut self) -> Result<$t> {
            let n = self.bits.read_dynamic_number()?;
            <$t>::try_from(n).map_err(|_| Error::new(
                ErrorKind::CorruptStream,
                format!("{} out of range for {}", n, stringify!($t)),
            ))
        }
    )*};
}

macro_rules! decode_aligned {
    ($($m:ident($t:ty, $n:literal)),* $(,)?) => {$(
        pub fn $m(&mut self) -> Result<$t> {
            let mut buf = [0u8; $n];
            self.bits.read_aligned_bytes(&mut buf)?;
            Ok(<$t>::from_be_bytes(buf))
        }
    )*};
}

impl<'r, R: Read, S: SchemaStore> FieldReader<'r, R, S> {
    pub fn decode_bool(&mut self) -> Result<bool> {
        self.bits.read_bit()
    }

    decode_dynamic!(decode_i8(i8), decode_i16(i16), decode_i32(i32));
    decode_aligned!(decode_i64(i64, 8), decode_f32(f32, 4), decode_f64(f64, 8));

    fn read_null_tag(&mut self) -> Result<bool> {
        self.bits.read_bit()
    }

    pub fn decode_boxed_bool(&mut self) -> Result<Option<bool>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        Ok(Some(self.bits.read_bit()?))
    }

    pub fn decode_boxed_i8(&mut self) -> Result<Option<i8>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        Ok(Some(self.decode_i8()?))
    }

    pub fn decode_boxed_i16(&mut self) -> Result<Option<i16>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        Ok(Some(self.decode_i16()?))
    }

    pub fn decode_boxed_i32(&mut self) -> Result<Option<i32>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        Ok(Some(self.decode_i32()?))
    }

    pub fn decode_boxed_i64(&mut self) -> Result<Option<i64>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        Ok(Some(self.decode_i64()?))
    }

    pub fn decode_boxed_f32(&mut self) -> Result<Option<f32>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        Ok(Some(self.decode_f32()?))
    }

    pub fn decode_boxed_f64(&mut self) -> Result<Option<f64>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        Ok(Some(self.decode_f64()?))
    }

    pub fn decode_array_bool(&mut self) -> Result<Option<Vec<bool>>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        let len = read_dynamic_len(&mut self.bits)?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.bits.read_bit()?);
        }
        Ok(Some(out))
    }

    pub fn decode_array_i8(&mut self) -> Result<Option<Vec<i8>>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        let len = read_dynamic_len(&mut self.bits)?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.decode_i8()?);
        }
        Ok(Some(out))
    }

    pub fn decode_array_i16(&mut self) -> Result<Option<Vec<i16>>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        let len = read_dynamic_len(&mut self.bits)?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.decode_i16()?);
        }
        Ok(Some(out))
    }

    pub fn decode_array_i32(&mut self) -> Result<Option<Vec<i32>>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        let len = read_dynamic_len(&mut self.bits)?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.decode_i32()?);
        }
        Ok(Some(out))
    }

    pub fn decode_array_i64(&mut self) -> Result<Option<Vec<i64>>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        let len = read_dynamic_len(&mut self.bits)?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.decode_i64()?);
        }
        Ok(Some(out))
    }

    pub fn decode_array_f32(&mut self) -> Result<Option<Vec<f32>>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        let len = read_dynamic_len(&mut self.bits)?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.decode_f32()?);
        }
        Ok(Some(out))
    }

    pub fn decode_array_f64(&mut self) -> Result<Option<Vec<f64>>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        let len = read_dynamic_len(&mut self.bits)?;
        let mut out = Vec::with_capacity(len);
        for _ in 0..len {
            out.push(self.decode_f64()?);
        }
        Ok(Some(out))
    }

    pub fn decode_str(&mut self) -> Result<Option<String>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        Ok(Some(read_utf(&mut self.bits)?))
    }

    pub fn decode_instant(&mut self) -> Result<Option<Instant>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        let mut buf = [0u8; 8];
        self.bits.read_aligned_bytes(&mut buf)?;
        Ok(Some(Instant::from_millis(i64::from_be_bytes(buf))))
    }

    pub fn decode_decimal(&mut self) -> Result<Option<Decimal>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        let len = read_dynamic_len(&mut self.bits)?;
        let mut bytes = vec![0u8; len];
        self.bits.read_aligned_bytes(&mut bytes)?;
        let scale = self.decode_i32()?;
        Ok(Some(Decimal::from_signed_bytes_be(&bytes, scale)))
    }

    pub fn decode_record<T: Record>(&mut self) -> Result<Option<T>> {
        if self.read_null_tag()? {
            return Ok(None);
        }
        let len = read_dynamic_len(&mut self.bits)?;
        let mut bytes = vec![0u8; len];
        self.bits.read_aligned_bytes(&mut bytes)?;
        Ok(Some(crate::serializer::read_record::<T, S>(&bytes, self.registry)?))
    }

    /// Consume exactly the bytes a stored field of `type_name` occupies,
    /// without attempting to interpret them further. This is what makes
    /// evolution-skip possible when the current record has no field with a
    /// matching name+type (spec.md §4.G step 5, §8 property 6).
    pub fn skip(&mut self, type_name: &str) -> Result<()> {
        match type_name {
            field_type::BOOL => {
                self.decode_bool()?;
            }
            field_type::I8 => {
                self.decode_i8()?;
            }
            field_type::I16 => {
                self.decode_i16()?;
            }
            field_type::I32 => {
                self.decode_i32()?;
            }
            field_type::I64 => {
                self.decode_i64()?;
            }
            field_type::F32 => {
                self.decode_f32()?;
            }
            field_type::F64 => {
                self.decode_f64()?;
            }
            t if t == field_type::boxed(field_type::BOOL) => {
                self.decode_boxed_bool()?;
            }
            t if t == field_type::boxed(field_type::I8) => {
                self.decode_boxed_i8()?;
            }
            t if t == field_type::boxed(field_type::I16) => {
                self.decode_boxed_i16()?;
            }
            t if t == field_type::boxed(field_type::I32) => {
                self.decode_boxed_i32()?;
            }
            t if t == field_type::boxed(field_type::I64) => {
                self.decode_boxed_i64()?;
            }
            t if t == field_type::boxed(field_type::F32) => {
                self.decode_boxed_f32()?;
            }
            t if t == field_type::boxed(field_type::F64) => {
                self.decode_boxed_f64()?;
            }
            t if t == field_type::array(field_type::BOOL) => {
                self.decode_array_bool()?;
            }
            t if t == field_type::array(field_type::I8) => {
                self.decode_array_i8()?;
            }
            t if t == field_type::array(field_type::I16) => {
                self.decode_array_i16()?;
            }
            t if t == field_type::array(field_type::I32) => {
                self.decode_array_i32()?;
            }
            t if t == field_type::array(field_type::I64) => {
                self.decode_array_i64()?;
            }
            t if t == field_type::array(field_type::F32) => {
                self.decode_array_f32()?;
            }
            t if t == field_type::array(field_type::F64) => {
                self.decode_array_f64()?;
            }
            field_type::STR => {
                self.decode_str()?;
            }
            field_type::INSTANT => {
                self.decode_instant()?;
            }
            field_type::DECIMAL => {
                self.decode_decimal()?;
            }
            _ => {
                // nested record: its payload is a self-describing,
                // length-prefixed blob, so it can be skipped without
                // knowing anything about its schema.
                if self.read_null_tag()? {
                    return Ok(());
                }
                let len = read_dynamic_len(&mut self.bits)?;
                let mut discard = vec![0u8; len];
                self.bits.read_aligned_bytes(&mut discard)?;
            }
        }
        Ok(())
    }
}

/// Fit a decoded variable-length sequence into a fixed-size array. A stored
/// length that doesn't match the current struct's array size is itself a
/// form of evolution drift; fall back to an all-default array instead of
/// failing the whole record.
pub fn array_into_fixed<T: Default + Copy, const N: usize>(v: Vec<T>) -> [T; N] {
    v.try_into().unwrap_or_else(|_| [T::default(); N])
}
