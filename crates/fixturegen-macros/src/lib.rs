//! Marker attributes for fixturegen.
//!
//! `#[fixture]` marks a struct with named fields as a fixture and
//! `#[fixture_adapter]` marks a zero-argument function as the supplier of its
//! return type. Both pass the item through unchanged; the generator finds the
//! markers by reading the source. Misuse is reported at compile time with the
//! same rules the generator enforces:
//!
//! ```compile_fail
//! use fixturegen_macros::fixture;
//!
//! #[fixture]
//! pub enum Mode { Fast, Slow }
//! ```
//!
//! ```compile_fail
//! use fixturegen_macros::fixture_adapter;
//!
//! #[fixture_adapter]
//! pub fn seeded(seed: u64) -> u64 { seed }
//! ```

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use syn::{parse2, Error, Fields, Item, ReturnType, Type};

const NOT_A_RECORD: &str = "#[fixture] can be used only on a struct with named fields";

/// Mark a struct with named fields as a fixture.
#[proc_macro_attribute]
pub fn fixture(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = TokenStream2::from(item);
    keep_item(item.clone(), expand_fixture(attr.into(), item)).into()
}

/// Mark a free function with no parameters as the supplier of its return type.
#[proc_macro_attribute]
pub fn fixture_adapter(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = TokenStream2::from(item);
    keep_item(item.clone(), expand_fixture_adapter(attr.into(), item)).into()
}

/// On error, emit the original item next to the error so the only diagnostic
/// is the marker's own.
fn keep_item(item: TokenStream2, result: syn::Result<TokenStream2>) -> TokenStream2 {
    result.unwrap_or_else(|err| {
        let mut tokens = err.to_compile_error();
        tokens.extend(item);
        tokens
    })
}

fn expand_fixture(attr: TokenStream2, item: TokenStream2) -> syn::Result<TokenStream2> {
    reject_arguments("fixture", attr)?;
    match parse2::<Item>(item.clone())? {
        Item::Struct(item_struct) => match item_struct.fields {
            Fields::Named(_) => Ok(item),
            _ => Err(Error::new_spanned(
                &item_struct.ident,
                format!("{}: {}", NOT_A_RECORD, item_struct.ident),
            )),
        },
        Item::Enum(item_enum) => Err(Error::new_spanned(
            &item_enum.ident,
            format!("{}: {}", NOT_A_RECORD, item_enum.ident),
        )),
        other => Err(Error::new_spanned(other, NOT_A_RECORD)),
    }
}

fn expand_fixture_adapter(attr: TokenStream2, item: TokenStream2) -> syn::Result<TokenStream2> {
    reject_arguments("fixture_adapter", attr)?;
    let function = match parse2::<Item>(item.clone())? {
        Item::Fn(function) => function,
        other => {
            return Err(Error::new_spanned(
                other,
                "#[fixture_adapter] can only be used on a function",
            ))
        }
    };
    let name = &function.sig.ident;
    if !function.sig.inputs.is_empty() {
        return Err(Error::new_spanned(
            &function.sig.inputs,
            format!("{} should not contain parameters", name),
        ));
    }
    let returns_value = match &function.sig.output {
        ReturnType::Default => false,
        ReturnType::Type(_, ty) => !matches!(&**ty, Type::Tuple(tuple) if tuple.elems.is_empty()),
    };
    if !returns_value {
        return Err(Error::new_spanned(
            name,
            format!("{} should return something", name),
        ));
    }
    Ok(item)
}

fn reject_arguments(marker: &str, attr: TokenStream2) -> syn::Result<()> {
    if attr.is_empty() {
        Ok(())
    } else {
        Err(Error::new_spanned(
            attr,
            format!("#[{}] takes no arguments", marker),
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================
