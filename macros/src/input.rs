use proc_macro2::{TokenStream, TokenTree};
use syn::parse::{Parse, ParseStream, Result};
use syn::punctuated::Punctuated;
use syn::{braced, parenthesized, token, Attribute, Ident, ReturnType, Token, Type, Visibility};

/// One `generate_mock!` invocation: a struct-like declaration whose fields
/// may use the callable grammar.
pub struct MockInput {
    pub vis: Visibility,
    pub ident: Ident,
    pub fields: Vec<MockField>,
}

/// A declared field. The type is kept as raw tokens here; classification
/// into callable vs. opaque happens in `extract`.
pub struct MockField {
    pub vis: Visibility,
    pub ident: Ident,
    pub ty: TokenStream,
}

/// A callable-signature type: `#[attr]* async? try? fn(args) -> Ret`.
///
/// The attribute list is the single qualifying wrapper the grammar admits;
/// it is captured verbatim and re-emitted on the generated trampoline.
pub struct CallableTy {
    pub attrs: Vec<Attribute>,
    pub asyncness: Option<Token![async]>,
    pub tryness: Option<Token![try]>,
    pub params: Punctuated<CallableArg, Token![,]>,
    pub output: ReturnType,
}

/// One parameter slot: `label: Type`, `_: Type`, or a bare `Type`.
pub struct CallableArg {
    pub label: Option<Ident>,
    pub ty: Type,
}

impl Parse for MockInput {
    fn parse(input: ParseStream) -> Result<Self> {
        let vis: Visibility = input.parse()?;
        if !input.peek(Token![struct]) {
            return Err(input.error("generate_mock! expects a struct declaration"));
        }
        input.parse::<Token![struct]>()?;
        let ident: Ident = input.parse()?;
        if input.peek(Token![<]) {
            return Err(input.error("generic mock targets are not supported"));
        }
        if input.peek(token::Paren) {
            return Err(input.error("tuple structs are not supported; declare named fields"));
        }
        let content;
        braced!(content in input);
        let mut fields = Vec::new();
        while !content.is_empty() {
            fields.push(content.parse()?);
        }
        if !input.is_empty() {
            return Err(input.error("unexpected tokens after struct declaration"));
        }
        Ok(MockInput { vis, ident, fields })
    }
}

impl Parse for MockField {
    fn parse(input: ParseStream) -> Result<Self> {
        let vis: Visibility = input.parse()?;
        let ident: Ident = input.parse()?;
        input.parse::<Token![:]>()?;
        let mut ty = TokenStream::new();
        while !input.is_empty() && !input.peek(Token![,]) {
            let tt: TokenTree = input.parse()?;
            ty.extend(std::iter::once(tt));
        }
        if ty.is_empty() {
            return Err(input.error("expected a type for this field"));
        }
        if input.peek(Token![,]) {
            input.parse::<Token![,]>()?;
        }
        Ok(MockField { vis, ident, ty })
    }
}

impl Parse for CallableTy {
    fn parse(input: ParseStream) -> Result<Self> {
        let attrs = input.call(Attribute::parse_outer)?;
        let asyncness: Option<Token![async]> = input.parse()?;
        let tryness: Option<Token![try]> = input.parse()?;
        input.parse::<Token![fn]>()?;
        let content;
        parenthesized!(content in input);
        let params = content.parse_terminated(CallableArg::parse, Token![,])?;
        let output: ReturnType = input.parse()?;
        if !input.is_empty() {
            return Err(input.error("unexpected tokens after callable signature"));
        }
        Ok(CallableTy {
            attrs,
            asyncness,
            tryness,
            params,
            output,
        })
    }
}

impl Parse for CallableArg {
    fn parse(input: ParseStream) -> Result<Self> {
        if input.peek(Token![_]) && input.peek2(Token![:]) {
            input.parse::<Token![_]>()?;
            input.parse::<Token![:]>()?;
            Ok(CallableArg {
                label: None,
                ty: input.parse()?,
            })
        } else if input.peek(Ident) && input.peek2(Token![:]) && !input.peek2(Token![::]) {
            let label: Ident = input.parse()?;
            input.parse::<Token![:]>()?;
            Ok(CallableArg {
                label: Some(label),
                ty: input.parse()?,
            })
        } else {
            Ok(CallableArg {
                label: None,
                ty: input.parse()?,
            })
        }
    }
}
