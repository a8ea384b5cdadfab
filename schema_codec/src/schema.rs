//! `ClassMetaData`: a record type's normalized schema — name, ordered field
//! list, fingerprint, and store key (spec.md §3, §4.C).

use crate::{
    bitio::{read_dynamic_len, read_utf, write_dynamic_len, write_utf, BitReader, BitWriter},
    error::{ensure, Result},
    record::Record,
};
use sha1::{Digest, Sha1};
use std::io::{Read, Write};

/// One field's name and canonical type tag, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub type_name: String,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        FieldInfo { name: name.into(), type_name: type_name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetaData {
    pub class_name: String,
    pub fields: Vec<FieldInfo>,
}

impl ClassMetaData {
    pub fn of<T: Record>() -> Self {
        ClassMetaData { class_name: T::TYPE_NAME.to_string(), fields: T::field_infos() }
    }

    /// SHA-1 over `name + "\0" + type_name + "\0"` for each field in order.
    /// Independent of `class_name`, so renaming a type alone does not change
    /// the fingerprint (spec.md §4.C).
    pub fn fingerprint(&self) -> [u8; 20] {
        let mut hasher = Sha1::new();
        for field in &self.fields {
            hasher.update(field.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(field.type_name.as_bytes());
            hasher.update([0u8]);
        }
        hasher.finalize().into()
    }

    pub fn key(&self) -> String {
        let fp = self.fingerprint();
        let mut hex = String::with_capacity(fp.len() * 2);
        for byte in fp {
            hex.push_str(&format!("{:02x}", byte));
        }
        format!("{}/{}", self.class_name, hex)
    }

    /// Wire format of spec.md §6: `utf8_lp(class_name) dynamic_number(count)
    /// (utf8_lp(name) utf8_lp(type_name))*`.
    pub fn encode<W: Write>(&self, out: &mut W) -> Result<()> {
        let mut w = BitWriter::new(out);
        write_utf(&mut w, &self.class_name)?;
        write_dynamic_len(&mut w, self.fields.len())?;
        for field in &self.fields {
            write_utf(&mut w, &field.name)?;
            write_utf(&mut w, &field.type_name)?;
        }
        w.finish()?;
        Ok(())
    }

    pub fn decode<R: Read>(input: &mut R) -> Result<Self> {
        let mut r = BitReader::new(input);
        let class_name = read_utf(&mut r)?;
        let count = read_dynamic_len(&mut r)?;
        ensure!(count < (1 << 24), CorruptStream, "implausible field count {} in stored schema", count);
        let mut fields = Vec::with_capacity(count);
        for _ in 0..count {
            let name = read_utf(&mut r)?;
            let type_name = read_utf(&mut r)?;
            fields.push(FieldInfo::new(name, type_name));
        }
        Ok(ClassMetaData { class_name, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_stable_for_identical_fields() {
        let a = ClassMetaData {
            class_name: "Foo".into(),
            fields: vec![FieldInfo::new("a", "i32"), FieldInfo::new("b", "str")],
        };
        let b = ClassMetaData {
            class_name: "Foo".into(),
            fields: vec![FieldInfo::new("a", "i32"), FieldInfo::new("b", "str")],
        };
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn fingerprint_sensitive_to_rename_and_retype() {
        let base = ClassMetaData {
            class_name: "Foo".into(),
            fields: vec![FieldInfo::new("a", "i32")],
        };
        let renamed = ClassMetaData {
            class_name: "Foo".into(),
            fields: vec![FieldInfo::new("b", "i32")],
        };
        let retyped = ClassMetaData {
            class_name: "Foo".into(),
            fields: vec![FieldInfo::new("a", "i64")],
        };
        assert_ne!(base.fingerprint(), renamed.fingerprint());
        assert_ne!(base.fingerprint(), retyped.fingerprint());
    }

    #[test]
    fn fingerprint_delimiter_disambiguates_split() {
        // ("ab", "c") must not collide with ("a", "bc")
        let a = ClassMetaData {
            class_name: "X".into(),
            fields: vec![FieldInfo::new("ab", "c")],
        };
        let b = ClassMetaData {
            class_name: "X".into(),
            fields: vec![FieldInfo::new("a", "bc")],
        };
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn schema_wire_roundtrip() {
        let meta = ClassMetaData {
            class_name: "demo::Thing".into(),
            fields: vec![FieldInfo::new("a", "i32"), FieldInfo::new("b", "str")],
        };
        let mut buf = Vec::new();
        meta.encode(&mut buf).unwrap();
        let decoded = ClassMetaData::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(meta, decoded);
    }
}
