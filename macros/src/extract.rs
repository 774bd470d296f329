use crate::input::{CallableTy, MockField, MockInput};
use syn::{Ident, Visibility};

/// Classification of one declared field. Unrecognized shapes are carried, not
/// errored, so value types may freely mix closure fields with ordinary data.
pub enum FieldKind<'a> {
    Closure(ClosureDescriptor<'a>),
    Plain(&'a MockField),
}

/// The extracted unit of work for one closure field. Created once during
/// extraction, immutable afterwards.
pub struct ClosureDescriptor<'a> {
    pub ident: &'a Ident,
    pub vis: Visibility,
    pub callable: CallableTy,
}

pub fn classify(field: &MockField) -> FieldKind<'_> {
    match syn::parse2::<CallableTy>(field.ty.clone()) {
        Ok(callable) => FieldKind::Closure(ClosureDescriptor {
            ident: &field.ident,
            vis: field.vis.clone(),
            callable,
        }),
        Err(_) => FieldKind::Plain(field),
    }
}

/// Classify every field, preserving declaration order.
pub fn classify_fields(input: &MockInput) -> Vec<FieldKind<'_>> {
    input.fields.iter().map(classify).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn fields_of(tokens: proc_macro2::TokenStream) -> MockInput {
        syn::parse2(tokens).unwrap()
    }

    #[test]
    fn recognizes_bare_and_attributed_callables() {
        let input = fields_of(quote! {
            struct Deps {
                plain: fn(i64) -> i64,
                wrapped: #[must_use] fn() -> bool,
            }
        });
        let kinds = classify_fields(&input);
        assert!(matches!(&kinds[0], FieldKind::Closure(_)));
        match &kinds[1] {
            FieldKind::Closure(c) => {
                assert_eq!(c.callable.attrs.len(), 1);
                assert!(c.callable.attrs[0].path().is_ident("must_use"));
            }
            FieldKind::Plain(_) => panic!("attributed callable not recognized"),
        }
    }

    #[test]
    fn skips_unrecognized_shapes_silently() {
        let input = fields_of(quote! {
            struct Deps {
                retries: u32,
                boxed: Box<fn() -> i64>,
                pair: (fn(), fn()),
                attributed_data: #[serde(skip)] u32,
            }
        });
        for kind in classify_fields(&input) {
            assert!(matches!(kind, FieldKind::Plain(_)));
        }
    }

    #[test]
    fn preserves_declaration_order_across_skips() {
        let input = fields_of(quote! {
            struct Deps {
                first: fn(),
                gap: u32,
                second: async fn() -> i64,
            }
        });
        let closures: Vec<String> = classify_fields(&input)
            .iter()
            .filter_map(|kind| match kind {
                FieldKind::Closure(c) => Some(c.ident.to_string()),
                FieldKind::Plain(_) => None,
            })
            .collect();
        assert_eq!(closures, vec!["first", "second"]);
    }

    #[test]
    fn copies_field_visibility_onto_the_descriptor() {
        let input = fields_of(quote! {
            pub struct Deps {
                pub exported: fn(),
                hidden: fn(),
            }
        });
        let kinds = classify_fields(&input);
        match (&kinds[0], &kinds[1]) {
            (FieldKind::Closure(a), FieldKind::Closure(b)) => {
                assert!(matches!(a.vis, Visibility::Public(_)));
                assert!(matches!(b.vis, Visibility::Inherited));
            }
            _ => panic!("both fields should be closures"),
        }
    }
}
