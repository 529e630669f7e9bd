//! A derive macro for implementing `Bindable`, `Record` and `RecordMut` on structs.
use convert_case::{Case, Casing};
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    Data, DeriveInput, Field, Fields, GenericArgument, LitStr, PathArguments, Type, TypePath,
    parse_macro_input,
};

pub(super) fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(expanded) => expanded.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let unsupported_error_msg = "`Bind` can only be derived for structs with named fields \
        or for tuple structs with a single field. Consider implementing `qbind::Bindable` manually.";

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "`Bind` can't be derived for generic types.",
        ));
    }
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(name, unsupported_error_msg));
    };
    match &data.fields {
        Fields::Named(fields) => {
            let rename_all = parse_container_attrs(input)?;
            expand_record(name, fields.named.iter(), rename_all.as_deref())
        }
        Fields::Unnamed(fields) if fields.unnamed.len() == 1 => {
            Ok(expand_alias(name, &fields.unnamed[0].ty))
        }
        _ => Err(syn::Error::new_spanned(name, unsupported_error_msg)),
    }
}

/// A tuple struct with a single field binds like the type it wraps.
fn expand_alias(name: &syn::Ident, inner: &Type) -> TokenStream2 {
    quote! {
        #[automatically_derived]
        impl qbind::Bindable for #name {
            fn descriptor() -> qbind::TypeDescriptor {
                <#inner as qbind::Bindable>::descriptor().alias::<Self>()
            }

            fn from_value(value: qbind::Value) -> Option<Self> {
                <#inner as qbind::Bindable>::from_value(value).map(Self)
            }
        }
    }
}

fn expand_record<'a>(
    name: &syn::Ident,
    fields: impl Iterator<Item = &'a Field>,
    rename_all: Option<&str>,
) -> syn::Result<TokenStream2> {
    let mut descriptors = Vec::new();
    let mut assign_arms = Vec::new();
    let mut embedded_arms = Vec::new();

    for field in fields {
        let attrs = FieldAttrs::parse(field)?;
        if attrs.skip || attrs.rename.as_deref() == Some("-") {
            // Skipped fields have no descriptor: their type doesn't have to be bindable.
            continue;
        }
        let Some(ident) = &field.ident else {
            continue;
        };
        let index = descriptors.len();
        let field_name = ident.unraw().to_string();
        let ty = &field.ty;

        if attrs.flatten {
            if attrs.rename.is_some() {
                return Err(syn::Error::new_spanned(
                    ident,
                    "A `flatten` field has no name of its own, it can't be renamed.",
                ));
            }
            if let Some(inner) = boxed_option_inner(ty) {
                descriptors.push(quote! {
                    qbind::FieldDescriptor::new(#field_name, <#inner as qbind::Bindable>::descriptor)
                        .embed(qbind::Embedding::Pointer)
                });
                assign_arms.push(quote! {
                    #index => qbind::record::assign_boxed(&mut self.#ident, value)
                });
                embedded_arms.push(quote! {
                    #index => qbind::record::descend_pointer(&mut self.#ident, visited)
                });
            } else {
                descriptors.push(quote! {
                    qbind::FieldDescriptor::new(#field_name, <#ty as qbind::Bindable>::descriptor)
                        .embed(qbind::Embedding::Inline)
                });
                assign_arms.push(quote! {
                    #index => qbind::record::assign(&mut self.#ident, value)
                });
                embedded_arms.push(quote! {
                    #index => Some(&mut self.#ident as &mut dyn qbind::RecordMut)
                });
            }
            continue;
        }

        let wire_name = match (&attrs.rename, rename_all) {
            (Some(rename), _) => Some(rename.clone()),
            (None, Some(rule)) => Some(apply_rename_rule(rule, &field_name)),
            (None, None) => None,
        }
        .filter(|wire_name| wire_name != &field_name);
        let rename = wire_name.map(|wire_name| quote! { .rename(#wire_name) });
        descriptors.push(quote! {
            qbind::FieldDescriptor::new(#field_name, <#ty as qbind::Bindable>::descriptor) #rename
        });
        assign_arms.push(quote! {
            #index => qbind::record::assign(&mut self.#ident, value)
        });
    }

    Ok(quote! {
        #[automatically_derived]
        impl qbind::Record for #name {
            const FIELDS: &'static [qbind::FieldDescriptor] = &[#(#descriptors),*];
        }

        #[automatically_derived]
        impl qbind::Bindable for #name {
            fn descriptor() -> qbind::TypeDescriptor {
                qbind::TypeDescriptor::of::<Self>(
                    qbind::Shape::Record(<Self as qbind::Record>::FIELDS)
                )
            }

            fn from_value(value: qbind::Value) -> Option<Self> {
                qbind::record::from_record_value(value)
            }
        }

        #[automatically_derived]
        impl qbind::RecordMut for #name {
            fn fields(&self) -> &'static [qbind::FieldDescriptor] {
                <Self as qbind::Record>::FIELDS
            }

            fn type_name(&self) -> &'static str {
                std::any::type_name::<Self>()
            }

            fn assign(&mut self, index: usize, value: qbind::Value) -> bool {
                match index {
                    #(#assign_arms,)*
                    _ => {
                        let _ = value;
                        false
                    }
                }
            }

            fn embedded<'a>(
                &'a mut self,
                index: usize,
                visited: &mut qbind::VisitedSet,
            ) -> Option<&'a mut dyn qbind::RecordMut> {
                let _ = &visited;
                match index {
                    #(#embedded_arms,)*
                    _ => None,
                }
            }
        }
    })
}

static RENAME_RULES: [&str; 6] = [
    "snake_case",
    "camelCase",
    "PascalCase",
    "kebab-case",
    "SCREAMING_SNAKE_CASE",
    "lowercase",
];

fn parse_container_attrs(input: &DeriveInput) -> syn::Result<Option<String>> {
    let mut rename_all = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("bind") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if !meta.path.is_ident("rename_all") {
                return Err(meta.error(
                    "Invalid `bind` attribute. Expected `#[bind(rename_all = \"...\")]`",
                ));
            }
            let rule: LitStr = meta.value()?.parse()?;
            if !RENAME_RULES.contains(&rule.value().as_str()) {
                let expected = RENAME_RULES
                    .iter()
                    .map(|r| format!("`{r}`"))
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(syn::Error::new_spanned(
                    &rule,
                    format!("Unknown naming convention. Valid options are: {expected}"),
                ));
            }
            rename_all = Some(rule.value());
            Ok(())
        })?;
    }
    Ok(rename_all)
}

fn apply_rename_rule(rule: &str, field_name: &str) -> String {
    let case = match rule {
        "camelCase" => Case::Camel,
        "PascalCase" => Case::Pascal,
        "kebab-case" => Case::Kebab,
        "SCREAMING_SNAKE_CASE" => Case::Constant,
        "lowercase" => return field_name.to_lowercase(),
        _ => Case::Snake,
    };
    field_name.from_case(Case::Snake).to_case(case)
}

#[derive(Default)]
struct FieldAttrs {
    rename: Option<String>,
    skip: bool,
    flatten: bool,
}

impl FieldAttrs {
    fn parse(field: &Field) -> syn::Result<Self> {
        let mut attrs = FieldAttrs::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("bind") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let rename: LitStr = meta.value()?.parse()?;
                    if rename.value().is_empty() {
                        return Err(syn::Error::new_spanned(&rename, "A field name can't be empty."));
                    }
                    attrs.rename = Some(rename.value());
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                } else if meta.path.is_ident("flatten") {
                    attrs.flatten = true;
                } else {
                    return Err(meta.error(
                        "Invalid `bind` attribute. Expected `rename = \"...\"`, `skip` or `flatten`",
                    ));
                }
                Ok(())
            })?;
        }
        Ok(attrs)
    }
}

/// `T`, if `ty` is spelled `Option<Box<T>>`.
fn boxed_option_inner(ty: &Type) -> Option<&Type> {
    let boxed = single_type_argument(ty, "Option")?;
    single_type_argument(boxed, "Box")
}

fn single_type_argument<'t>(ty: &'t Type, wrapper: &str) -> Option<&'t Type> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let segment = path.segments.last()?;
    if segment.ident != wrapper {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    match arguments.args.first() {
        Some(GenericArgument::Type(inner)) if arguments.args.len() == 1 => Some(inner),
        _ => None,
    }
}
