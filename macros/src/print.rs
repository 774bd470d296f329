use crate::signature::{HistoryShape, Parameter};

use proc_macro2::TokenStream;
use quote::{quote, ToTokens, TokenStreamExt};
use ref_cast::RefCast;

#[derive(RefCast)]
#[repr(C)]
pub(crate) struct Print<T>(T);

impl ToTokens for Print<Parameter> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        let name = &self.0.display_name;
        let ty = &self.0.ty;
        tokens.append_all(quote!(#name: #ty));
    }
}

impl ToTokens for Print<HistoryShape> {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        tokens.append_all(match &self.0 {
            HistoryShape::Unit => quote!(()),
            HistoryShape::Single(ty) => quote!(#ty),
            HistoryShape::Tuple(tys) => quote!((#(#tys),*)),
            HistoryShape::Record(ident) => quote!(#ident),
        });
    }
}
