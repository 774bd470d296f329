use crate::extract::{classify_fields, ClosureDescriptor, FieldKind};
use crate::input::{CallableTy, MockInput};
use crate::print::Print;
use crate::signature::{history_shape, parameters, HistoryShape, Parameter};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use ref_cast::RefCast;
use syn::{Ident, Result, Type, Visibility};

/// Whole-declaration expansion. The only failure is the structural one
/// raised while parsing `MockInput`; everything past that point is total.
pub fn expand(input: TokenStream) -> Result<TokenStream> {
    let input: MockInput = syn::parse2(input)?;
    let fields = classify_fields(&input);
    let closures: Vec<&ClosureDescriptor> = fields
        .iter()
        .filter_map(|kind| match kind {
            FieldKind::Closure(c) => Some(c),
            FieldKind::Plain(_) => None,
        })
        .collect();

    let lowered = lowered_struct(&input, &fields);
    let records: Vec<TokenStream> = closures
        .iter()
        .filter_map(|c| record_struct(&input, c))
        .collect();
    let factory = factory_impl(&input, &closures);
    let mock = mock_struct(&input, &closures);
    let methods = mock_impl(&input, &closures);
    let default = default_impl(&input);

    Ok(quote! {
        #lowered
        #(#records)*
        #factory
        #mock
        #methods
        #default
    })
}

fn mock_ident(input: &MockInput) -> Ident {
    format_ident!("{}Mock", input.ident)
}

/// The narrower of the declaring struct's visibility and the field's own:
/// a non-`pub` struct makes every generated member private; a `pub` struct
/// lets each member copy its field's declared visibility verbatim.
fn narrowed_vis(struct_vis: &Visibility, field_vis: &Visibility) -> Visibility {
    if matches!(struct_vis, Visibility::Public(_)) {
        field_vis.clone()
    } else {
        Visibility::Inherited
    }
}

/// Result type of the boxed handler: the declared return, wrapped per the
/// `try` and `async` qualifiers.
fn handler_result_ty(callable: &CallableTy) -> TokenStream {
    let result = sync_result_ty(callable);
    if callable.is_async() {
        quote!(::genmock::BoxFuture<#result>)
    } else {
        result
    }
}

/// Result type as seen by the trampoline's caller (the future's output for
/// `async` signatures).
fn sync_result_ty(callable: &CallableTy) -> TokenStream {
    let ret = callable.return_ty();
    if callable.is_try() {
        quote!(::core::result::Result<#ret, ::genmock::BoxError>)
    } else {
        quote!(#ret)
    }
}

fn handler_dyn_ty(callable: &CallableTy) -> TokenStream {
    let tys = callable.params.iter().map(|arg| &arg.ty);
    let result = handler_result_ty(callable);
    quote!(dyn Fn(#(#tys),*) -> #result + Send + Sync)
}

fn history_ty(c: &ClosureDescriptor) -> TokenStream {
    let params = parameters(&c.callable);
    let shape = history_shape(c.ident, &params);
    let history = Print::ref_cast(&shape);
    quote!(#history)
}

fn lowered_struct(input: &MockInput, fields: &[FieldKind]) -> TokenStream {
    let vis = &input.vis;
    let ident = &input.ident;
    let fields = fields.iter().map(|kind| match kind {
        FieldKind::Closure(c) => {
            let vis = &c.vis;
            let ident = c.ident;
            let dyn_ty = handler_dyn_ty(&c.callable);
            quote!(#vis #ident: ::std::boxed::Box<#dyn_ty>)
        }
        FieldKind::Plain(field) => {
            let vis = &field.vis;
            let ident = &field.ident;
            let ty = &field.ty;
            quote!(#vis #ident: #ty)
        }
    });
    quote! {
        #vis struct #ident {
            #(#fields,)*
        }
    }
}

fn record_struct(input: &MockInput, c: &ClosureDescriptor) -> Option<TokenStream> {
    let params = parameters(&c.callable);
    let HistoryShape::Record(record) = history_shape(c.ident, &params) else {
        return None;
    };
    let vis = narrowed_vis(&input.vis, &c.vis);
    let fields = params.iter().map(|p| {
        let name = &p.display_name;
        let ty = &p.ty;
        quote!(pub #name: #ty)
    });
    Some(quote! {
        #[derive(Clone, Debug, PartialEq)]
        #vis struct #record {
            #(#fields,)*
        }
    })
}

fn factory_impl(input: &MockInput, closures: &[&ClosureDescriptor]) -> TokenStream {
    let ident = &input.ident;
    let vis = &input.vis;
    let mock = mock_ident(input);
    let fields = closures.iter().map(|c| factory_field(c));
    quote! {
        impl #ident {
            #vis fn mock(__mock: ::std::sync::Arc<#mock>) -> Self {
                Self {
                    #(#fields,)*
                }
            }
        }
    }
}

fn factory_field(c: &ClosureDescriptor) -> TokenStream {
    let ident = c.ident;
    let params = parameters(&c.callable);
    let names: Vec<&Ident> = params.iter().map(|p| &p.display_name).collect();
    if c.callable.is_async() {
        quote! {
            #ident: {
                let __mock = ::std::sync::Arc::clone(&__mock);
                ::std::boxed::Box::new(move |#(#names),*| {
                    let __mock = ::std::sync::Arc::clone(&__mock);
                    ::std::boxed::Box::pin(async move { __mock.#ident(#(#names),*).await })
                })
            }
        }
    } else {
        quote! {
            #ident: {
                let __mock = ::std::sync::Arc::clone(&__mock);
                ::std::boxed::Box::new(move |#(#names),*| __mock.#ident(#(#names),*))
            }
        }
    }
}

fn mock_struct(input: &MockInput, closures: &[&ClosureDescriptor]) -> TokenStream {
    let vis = &input.vis;
    let mock = mock_ident(input);
    let fields = closures.iter().flat_map(|c| {
        let count = format_ident!("{}_call_count", c.ident);
        let log = format_ident!("{}_arg_values", c.ident);
        let handler = format_ident!("{}_handler", c.ident);
        let history = history_ty(c);
        let dyn_ty = handler_dyn_ty(&c.callable);
        [
            quote!(#count: ::core::sync::atomic::AtomicUsize),
            quote!(#log: ::genmock::runtime::ArgLog<#history>),
            quote!(#handler: ::genmock::runtime::HandlerCell<#dyn_ty>),
        ]
    });
    quote! {
        #vis struct #mock {
            #(#fields,)*
        }
    }
}

fn mock_impl(input: &MockInput, closures: &[&ClosureDescriptor]) -> TokenStream {
    let mock = mock_ident(input);
    let new = mock_new(input, closures);
    let members = closures.iter().map(|c| mock_members(input, c));
    quote! {
        impl #mock {
            #new

            #(#members)*
        }
    }
}

fn mock_new(input: &MockInput, closures: &[&ClosureDescriptor]) -> TokenStream {
    let vis = &input.vis;
    let inits = closures.iter().flat_map(|c| {
        let count = format_ident!("{}_call_count", c.ident);
        let log = format_ident!("{}_arg_values", c.ident);
        let handler = format_ident!("{}_handler", c.ident);
        let placeholder = placeholder_handler(input, c);
        [
            quote!(#count: ::core::sync::atomic::AtomicUsize::new(0)),
            quote!(#log: ::genmock::runtime::ArgLog::new()),
            quote!(#handler: ::genmock::runtime::HandlerCell::new(#placeholder)),
        ]
    });
    quote! {
        #vis fn new() -> Self {
            Self {
                #(#inits,)*
            }
        }
    }
}

fn placeholder_handler(input: &MockInput, c: &ClosureDescriptor) -> TokenStream {
    let tag = format!("{}Mock::{}_handler", input.ident, c.ident);
    let blanks = c.callable.params.iter().map(|_| quote!(_));
    if c.callable.is_async() {
        quote! {
            ::std::boxed::Box::new(|#(#blanks),*| {
                ::std::boxed::Box::pin(async { ::genmock::unimplemented(#tag) })
            })
        }
    } else {
        quote!(::std::boxed::Box::new(|#(#blanks),*| ::genmock::unimplemented(#tag)))
    }
}

/// The four per-field members (count accessor, history accessor, handler
/// mutator plus its chaining form, trampoline), contiguous per field.
fn mock_members(input: &MockInput, c: &ClosureDescriptor) -> TokenStream {
    let vis = narrowed_vis(&input.vis, &c.vis);
    let count = format_ident!("{}_call_count", c.ident);
    let log = format_ident!("{}_arg_values", c.ident);
    let history = history_ty(c);
    let set = set_handler_method(c, &vis);
    let with = with_handler_method(c, &vis);
    let trampoline = trampoline(c);
    quote! {
        #vis fn #count(&self) -> usize {
            self.#count.load(::core::sync::atomic::Ordering::SeqCst)
        }

        #vis fn #log(&self) -> ::std::vec::Vec<#history> {
            self.#log.snapshot()
        }

        #set

        #with

        #trampoline
    }
}

fn set_handler_method(c: &ClosureDescriptor, vis: &Visibility) -> TokenStream {
    let set = format_ident!("set_{}_handler", c.ident);
    let handler = format_ident!("{}_handler", c.ident);
    let tys: Vec<&Type> = c.callable.params.iter().map(|arg| &arg.ty).collect();
    let result = sync_result_ty(&c.callable);
    if c.callable.is_async() {
        let params = parameters(&c.callable);
        let names: Vec<&Ident> = params.iter().map(|p| &p.display_name).collect();
        quote! {
            #vis fn #set<F, Fut>(&self, __handler: F)
            where
                F: Fn(#(#tys),*) -> Fut + Send + Sync + 'static,
                Fut: ::core::future::Future<Output = #result> + Send + 'static,
            {
                self.#handler.replace(::std::boxed::Box::new(move |#(#names),*| {
                    ::std::boxed::Box::pin(__handler(#(#names),*))
                }));
            }
        }
    } else {
        quote! {
            #vis fn #set<F>(&self, __handler: F)
            where
                F: Fn(#(#tys),*) -> #result + Send + Sync + 'static,
            {
                self.#handler.replace(::std::boxed::Box::new(__handler));
            }
        }
    }
}

fn with_handler_method(c: &ClosureDescriptor, vis: &Visibility) -> TokenStream {
    let with = format_ident!("with_{}_handler", c.ident);
    let set = format_ident!("set_{}_handler", c.ident);
    let tys: Vec<&Type> = c.callable.params.iter().map(|arg| &arg.ty).collect();
    let result = sync_result_ty(&c.callable);
    if c.callable.is_async() {
        quote! {
            #vis fn #with<F, Fut>(self, __handler: F) -> Self
            where
                F: Fn(#(#tys),*) -> Fut + Send + Sync + 'static,
                Fut: ::core::future::Future<Output = #result> + Send + 'static,
            {
                self.#set(__handler);
                self
            }
        }
    } else {
        quote! {
            #vis fn #with<F>(self, __handler: F) -> Self
            where
                F: Fn(#(#tys),*) -> #result + Send + Sync + 'static,
            {
                self.#set(__handler);
                self
            }
        }
    }
}

/// The forwarding function that carries the original field's name. Counting
/// and history run before dispatch so that accounting records attempts, not
/// successes. Always private: the factory's closures are its only callers.
fn trampoline(c: &ClosureDescriptor) -> TokenStream {
    let attrs = &c.callable.attrs;
    let ident = c.ident;
    let count = format_ident!("{}_call_count", c.ident);
    let log = format_ident!("{}_arg_values", c.ident);
    let handler = format_ident!("{}_handler", c.ident);
    let params = parameters(&c.callable);
    let printed = params.iter().map(Print::ref_cast);
    let names: Vec<&Ident> = params.iter().map(|p| &p.display_name).collect();
    let entry = history_entry(c, &params);
    let result = sync_result_ty(&c.callable);
    let record = quote! {
        self.#count.fetch_add(1, ::core::sync::atomic::Ordering::SeqCst);
        self.#log.push(#entry);
    };
    if c.callable.is_async() {
        quote! {
            #(#attrs)*
            async fn #ident(&self #(, #printed)*) -> #result {
                #record
                let __handler_future = self.#handler.with(|__handler| __handler(#(#names),*));
                __handler_future.await
            }
        }
    } else {
        quote! {
            #(#attrs)*
            fn #ident(&self #(, #printed)*) -> #result {
                #record
                self.#handler.with(|__handler| __handler(#(#names),*))
            }
        }
    }
}

fn history_entry(c: &ClosureDescriptor, params: &[Parameter]) -> TokenStream {
    match history_shape(c.ident, params) {
        HistoryShape::Unit => quote!(()),
        HistoryShape::Single(_) => {
            let name = &params[0].display_name;
            quote!(#name.clone())
        }
        HistoryShape::Tuple(_) => {
            let names = params.iter().map(|p| &p.display_name);
            quote!((#(#names.clone()),*))
        }
        HistoryShape::Record(record) => {
            let fields = params.iter().map(|p| {
                let name = &p.display_name;
                quote!(#name: #name.clone())
            });
            quote!(#record { #(#fields),* })
        }
    }
}

fn default_impl(input: &MockInput) -> TokenStream {
    let mock = mock_ident(input);
    quote! {
        impl ::core::default::Default for #mock {
            fn default() -> Self {
                Self::new()
            }
        }
    }
}
