//! `#[derive(Record)]`: generates the static field table and the
//! encode/decode dispatch `schema_codec::Record` needs, so that which codec
//! branch a field goes through is a compile-time fact rather than something
//! looked up at encode time.
//!
//! Field types recognized:
//! - primitives `bool`, `i8`, `i16`, `i32`, `i64`, `f32`, `f64` (required)
//! - `Option<primitive>` (boxed/nullable primitive)
//! - `[primitive; N]` and `Option<[primitive; N]>` (fixed-length array)
//! - `String` and `Option<String>`
//! - `schema_codec::Instant`/`Decimal` and their `Option<...>` forms
//! - any other type and its `Option<...>` form, treated as a nested record
//!   (must itself implement `Record`)

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Data, DeriveInput, Fields, GenericArgument, PathArguments, Type};

#[proc_macro_derive(Record)]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident.clone();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return syn::Error::new_spanned(&input, "Record can only be derived for structs with named fields")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Record can only be derived for structs")
                .to_compile_error()
                .into()
        }
    };

    let mut metas: Vec<FieldMeta> = fields
        .iter()
        .map(|f| FieldMeta {
            ident: f.ident.clone().expect("named field"),
            kind: classify(&f.ty),
        })
        .collect();
    // Schema field order is lexicographic by name, fixed once here rather
    // than following struct declaration order (spec.md §9 open question on
    // field ordering).
    metas.sort_by(|a, b| a.ident.to_string().cmp(&b.ident.to_string()));

    let field_info_entries: Vec<TokenStream2> = metas
        .iter()
        .map(|m| {
            let name_str = m.ident.to_string();
            let type_name = m.kind.type_name_expr();
            quote! { schema_codec::schema::FieldInfo::new(#name_str, #type_name) }
        })
        .collect();

    let encode_stmts: Vec<TokenStream2> = metas.iter().map(|m| m.kind.encode_stmt(&m.ident)).collect();

    let decode_arms: Vec<TokenStream2> = metas
        .iter()
        .map(|m| {
            let name_str = m.ident.to_string();
            let ident = &m.ident;
            let type_name = m.kind.type_name_expr();
            let decode_expr = m.kind.decode_expr();
            quote! {
                #name_str => {
                    if stored.type_name == #type_name {
                        self.#ident = #decode_expr;
                    } else {
                        r.skip(&stored.type_name)?;
                    }
                }
            }
        })
        .collect();

    let type_name_str = name.to_string();

    let expanded = quote! {
        impl schema_codec::record::Record for #name {
            const TYPE_NAME: &'static str = #type_name_str;

            fn field_infos() -> &'static [schema_codec::schema::FieldInfo] {
                static INFOS: std::sync::OnceLock<Vec<schema_codec::schema::FieldInfo>> =
                    std::sync::OnceLock::new();
                INFOS.get_or_init(|| vec![#(#field_info_entries),*])
            }

            fn default_instance() -> Self {
                <Self as std::default::Default>::default()
            }

            fn encode_fields<W: std::io::Write, S: schema_codec::store::SchemaStore>(
                &self,
                w: &mut schema_codec::codec::FieldWriter<'_, W, S>,
            ) -> schema_codec::Result<()> {
                #(#encode_stmts)*
                Ok(())
            }

            fn decode_fields<R: std::io::Read, S: schema_codec::store::SchemaStore>(
                &mut self,
                r: &mut schema_codec::codec::FieldReader<'_, R, S>,
                stored_fields: &[schema_codec::schema::FieldInfo],
            ) -> schema_codec::Result<()> {
                for stored in stored_fields {
                    match stored.name.as_str() {
                        #(#decode_arms)*
                        _ => r.skip(&stored.type_name)?,
                    }
                }
                Ok(())
            }
        }
    };

    expanded.into()
}

struct FieldMeta {
    ident: syn::Ident,
    kind: Kind,
}

enum Prim {
    Bool,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
}

impl Prim {
    fn from_ident(s: &str) -> Option<Prim> {
        Some(match s {
            "bool" => Prim::Bool,
            "i8" => Prim::I8,
            "i16" => Prim::I16,
            "i32" => Prim::I32,
            "i64" => Prim::I64,
            "f32" => Prim::F32,
            "f64" => Prim::F64,
            _ => return None,
        })
    }

    fn tag(&self) -> &'static str {
        match self {
            Prim::Bool => "bool",
            Prim::I8 => "i8",
            Prim::I16 => "i16",
            Prim::I32 => "i32",
            Prim::I64 => "i64",
            Prim::F32 => "f32",
            Prim::F64 => "f64",
        }
    }

    fn suffix(&self) -> syn::Ident {
        format_ident!("{}", self.tag())
    }

    fn const_path(&self) -> TokenStream2 {
        let tag = self.tag().to_uppercase();
        let ident = format_ident!("{}", tag);
        quote! { schema_codec::field_type::#ident }
    }
}

enum Kind {
    Scalar(Prim),
    Boxed(Prim),
    Array { prim: Prim, required: bool },
    Str { required: bool },
    Instant { required: bool },
    Decimal { required: bool },
    Nested { ty: Type, required: bool },
}

impl Kind {
    fn type_name_expr(&self) -> TokenStream2 {
        match self {
            Kind::Scalar(p) => p.const_path(),
            Kind::Boxed(p) => {
                let c = p.const_path();
                quote! { schema_codec::field_type::boxed(#c) }
            }
            Kind::Array { prim, .. } => {
                let c = prim.const_path();
                quote! { schema_codec::field_type::array(#c) }
            }
            Kind::Str { .. } => quote! { schema_codec::field_type::STR },
            Kind::Instant { .. } => quote! { schema_codec::field_type::INSTANT },
            Kind::Decimal { .. } => quote! { schema_codec::field_type::DECIMAL },
            Kind::Nested { ty, .. } => quote! { <#ty as schema_codec::record::Record>::TYPE_NAME },
        }
    }

    fn encode_stmt(&self, ident: &syn::Ident) -> TokenStream2 {
        match self {
            Kind::Scalar(p) => {
                let m = format_ident!("encode_{}", p.suffix());
                quote! { w.#m(self.#ident)?; }
            }
            Kind::Boxed(p) => {
                let m = format_ident!("encode_boxed_{}", p.suffix());
                quote! { w.#m(self.#ident)?; }
            }
            Kind::Array { prim, required: true } => {
                let m = format_ident!("encode_array_{}", prim.suffix());
                quote! { w.#m(Some(&self.#ident[..]))?; }
            }
            Kind::Array { prim, required: false } => {
                let m = format_ident!("encode_array_{}", prim.suffix());
                quote! { w.#m(self.#ident.as_ref().map(|a| &a[..]))?; }
            }
            Kind::Str { required: true } => quote! { w.encode_str(Some(self.#ident.as_str()))?; },
            Kind::Str { required: false } => quote! { w.encode_str(self.#ident.as_deref())?; },
            Kind::Instant { required: true } => quote! { w.encode_instant(Some(self.#ident))?; },
            Kind::Instant { required: false } => quote! { w.encode_instant(self.#ident)?; },
            Kind::Decimal { required: true } => quote! { w.encode_decimal(Some(&self.#ident))?; },
            Kind::Decimal { required: false } => quote! { w.encode_decimal(self.#ident.as_ref())?; },
            Kind::Nested { required: true, .. } => quote! { w.encode_record(Some(&self.#ident))?; },
            Kind::Nested { required: false, .. } => quote! { w.encode_record(self.#ident.as_ref())?; },
        }
    }

    fn decode_expr(&self) -> TokenStream2 {
        match self {
            Kind::Scalar(p) => {
                let m = format_ident!("decode_{}", p.suffix());
                quote! { r.#m()? }
            }
            Kind::Boxed(p) => {
                let m = format_ident!("decode_boxed_{}", p.suffix());
                quote! { r.#m()? }
            }
            Kind::Array { prim, required: true } => {
                let m = format_ident!("decode_array_{}", prim.suffix());
                quote! { schema_codec::codec::array_into_fixed(r.#m()?.unwrap_or_default()) }
            }
            Kind::Array { prim, required: false } => {
                let m = format_ident!("decode_array_{}", prim.suffix());
                quote! { r.#m()?.map(schema_codec::codec::array_into_fixed) }
            }
            Kind::Str { required: true } => quote! { r.decode_str()?.unwrap_or_default() },
            Kind::Str { required: false } => quote! { r.decode_str()? },
            Kind::Instant { required: true } => quote! { r.decode_instant()?.unwrap_or_default() },
            Kind::Instant { required: false } => quote! { r.decode_instant()? },
            Kind::Decimal { required: true } => quote! { r.decode_decimal()?.unwrap_or_default() },
            Kind::Decimal { required: false } => quote! { r.decode_decimal()? },
            Kind::Nested { ty, required: true } => {
                quote! { r.decode_record::<#ty>()?.unwrap_or_else(<#ty as schema_codec::record::Record>::default_instance) }
            }
            Kind::Nested { ty, required: false } => quote! { r.decode_record::<#ty>()? },
        }
    }
}

fn classify(ty: &Type) -> Kind {
    if let Some(inner) = option_inner(ty) {
        return classify_inner(inner, false);
    }
    classify_inner(ty, true)
}

fn classify_inner(ty: &Type, required: bool) -> Kind {
    if let Type::Array(arr) = ty {
        if let Type::Path(p) = &*arr.elem {
            if let Some(prim) = p.path.get_ident().and_then(|i| Prim::from_ident(&i.to_string())) {
                return Kind::Array { prim, required };
            }
        }
    }

    if let Type::Path(p) = ty {
        if let Some(ident) = p.path.get_ident() {
            let name = ident.to_string();
            if let Some(prim) = Prim::from_ident(&name) {
                return if required { Kind::Scalar(prim) } else { Kind::Boxed(prim) };
            }
            if name == "String" {
                return Kind::Str { required };
            }
        }
        if let Some(last) = p.path.segments.last() {
            let seg = last.ident.to_string();
            if seg == "Instant" {
                return Kind::Instant { required };
            }
            if seg == "Decimal" {
                return Kind::Decimal { required };
            }
        }
    }

    Kind::Nested { ty: ty.clone(), required }
}

/// If `ty` is syntactically `Option<T>`, return `T`.
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(p) = ty else { return None };
    let last = p.path.segments.last()?;
    if last.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &last.arguments else { return None };
    args.args.iter().find_map(|a| match a {
        GenericArgument::Type(t) => Some(t),
        _ => None,
    })
}
