use crate::input::CallableTy;
use quote::format_ident;
use syn::{parse_quote, Ident, ReturnType, Type};

/// One analyzed parameter slot of a callable signature.
#[derive(Clone)]
pub struct Parameter {
    /// The explicit label, or `arg{i}` where `i` is the zero-based position
    /// in the full parameter list.
    pub display_name: Ident,
    /// Present only when the slot carried an explicit label and the signature
    /// has two or more parameters; governs labeled history entries.
    pub tuple_label: Option<Ident>,
    pub ty: Type,
    pub has_trailing_comma: bool,
}

/// Shape of one argument-history entry.
pub enum HistoryShape {
    /// Zero parameters.
    Unit,
    /// One parameter; recorded as the bare value.
    Single(Type),
    /// Two or more parameters, none labeled.
    Tuple(Vec<Type>),
    /// Two or more parameters, at least one labeled; recorded as a generated
    /// record struct with the given name.
    Record(Ident),
}

impl CallableTy {
    pub fn is_async(&self) -> bool {
        self.asyncness.is_some()
    }

    pub fn is_try(&self) -> bool {
        self.tryness.is_some()
    }

    /// Declared return type, with an absent return carried as `()` like any
    /// other type token.
    pub fn return_ty(&self) -> Type {
        match &self.output {
            ReturnType::Default => parse_quote!(()),
            ReturnType::Type(_, ty) => Type::clone(ty),
        }
    }
}

/// Decompose a callable signature into its ordered parameter list.
///
/// The positional fallback name is computed from the slot's index in the full
/// list, never renumbered around labeled neighbors: `fn(i64, flag: bool, i64)`
/// analyzes to `arg0`, `flag`, `arg2`.
pub fn parameters(callable: &CallableTy) -> Vec<Parameter> {
    let count = callable.params.len();
    callable
        .params
        .iter()
        .enumerate()
        .map(|(index, arg)| {
            let display_name = match &arg.label {
                Some(label) => label.clone(),
                None => format_ident!("arg{}", index),
            };
            Parameter {
                tuple_label: if count >= 2 { arg.label.clone() } else { None },
                display_name,
                ty: arg.ty.clone(),
                has_trailing_comma: index + 1 < count,
            }
        })
        .collect()
}

/// Decide how history entries for this field are recorded.
pub fn history_shape(field_ident: &Ident, params: &[Parameter]) -> HistoryShape {
    if params.iter().any(|p| p.tuple_label.is_some()) {
        return HistoryShape::Record(format_ident!("{}Args", pascal_case(field_ident)));
    }
    match params {
        [] => HistoryShape::Unit,
        [only] => HistoryShape::Single(only.ty.clone()),
        many => HistoryShape::Tuple(many.iter().map(|p| p.ty.clone()).collect()),
    }
}

fn pascal_case(ident: &Ident) -> String {
    let mut out = String::new();
    let mut upper = true;
    for ch in ident.to_string().chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn analyze(tokens: proc_macro2::TokenStream) -> Vec<Parameter> {
        parameters(&syn::parse2(tokens).unwrap())
    }

    fn names(params: &[Parameter]) -> Vec<String> {
        params.iter().map(|p| p.display_name.to_string()).collect()
    }

    #[test]
    fn positional_fallback_counts_from_zero() {
        let params = analyze(quote!(fn(i64, bool, String)));
        assert_eq!(names(&params), vec!["arg0", "arg1", "arg2"]);
    }

    #[test]
    fn fallback_uses_the_global_index_around_labels() {
        let params = analyze(quote!(fn(i64, flag: bool, i64)));
        assert_eq!(names(&params), vec!["arg0", "flag", "arg2"]);
    }

    #[test]
    fn single_labeled_parameter_gets_no_tuple_label() {
        let params = analyze(quote!(fn(user_id: i64)));
        assert_eq!(names(&params), vec!["user_id"]);
        assert!(params[0].tuple_label.is_none());
    }

    #[test]
    fn tuple_labels_follow_their_own_slot_only() {
        let params = analyze(quote!(fn(i64, flag: bool)));
        assert!(params[0].tuple_label.is_none());
        assert_eq!(params[1].tuple_label.as_ref().unwrap().to_string(), "flag");
    }

    #[test]
    fn trailing_comma_set_for_all_but_the_last() {
        let params = analyze(quote!(fn(i64, bool, String)));
        let flags: Vec<bool> = params.iter().map(|p| p.has_trailing_comma).collect();
        assert_eq!(flags, vec![true, true, false]);
    }

    #[test]
    fn underscore_slot_is_unlabeled() {
        let params = analyze(quote!(fn(_: i64, flag: bool)));
        assert_eq!(names(&params), vec!["arg0", "flag"]);
        assert!(params[0].tuple_label.is_none());
    }

    #[test]
    fn absent_return_is_unit() {
        use quote::ToTokens;
        let callable: CallableTy = syn::parse2(quote!(fn())).unwrap();
        let ret = callable.return_ty();
        assert_eq!(ret.to_token_stream().to_string(), "()");
    }

    #[test]
    fn history_shape_by_parameter_count_and_labels() {
        let ident: Ident = parse_quote!(set_user_flag);

        let shape = history_shape(&ident, &analyze(quote!(fn())));
        assert!(matches!(shape, HistoryShape::Unit));

        let shape = history_shape(&ident, &analyze(quote!(fn(name: String))));
        assert!(matches!(shape, HistoryShape::Single(_)));

        let shape = history_shape(&ident, &analyze(quote!(fn(i64, bool))));
        assert!(matches!(shape, HistoryShape::Tuple(ref tys) if tys.len() == 2));

        match history_shape(&ident, &analyze(quote!(fn(i64, flag: bool)))) {
            HistoryShape::Record(name) => assert_eq!(name.to_string(), "SetUserFlagArgs"),
            _ => panic!("labeled multi-parameter history should be a record"),
        }
    }
}
