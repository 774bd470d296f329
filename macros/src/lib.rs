//! Procedural macro implementation behind the `genmock` crate. Use `genmock`
//! itself; the generated code refers back to its runtime support and this
//! crate is not usable on its own.

extern crate proc_macro;

mod expand;
mod extract;
mod input;
mod print;
mod signature;

use self::proc_macro::TokenStream;

/// Expand a closure-struct declaration into the struct, its `<Name>Mock`
/// companion, and the `<Name>::mock` factory.
///
/// See the `genmock` crate documentation for the declaration grammar and the
/// shape of the generated code.
#[proc_macro]
pub fn generate_mock(input: TokenStream) -> TokenStream {
    expand::expand(input.into())
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
