//! Generated recording mocks for closure-struct dependencies
//! =========================================================
//!
//! *This crate generates the boring half of every test double: a companion
//! mock type that counts calls, records arguments, and forwards to a
//! replaceable handler.*
//!
//! # Motivation
//!
//! A lightweight alternative to trait-based dependency injection is the
//! "struct of closures" pattern: a dependency is a plain value type whose
//! fields are callables, and a test swaps the whole value for one built from
//! closures. The pattern needs no traits, no generics at the call site, and
//! composes well -- but hand-writing the mock for each such struct is pure
//! ceremony: a counter per field, an argument log per field, a settable
//! handler per field, and a trampoline wiring them together.
//!
//! [`generate_mock!`] performs that expansion mechanically. Given one struct
//! declaration whose fields are callable signatures, it emits the struct
//! itself plus a `<Name>Mock` companion and a `<Name>::mock` factory. The
//! expansion is a pure function of the declaration: the same input tokens
//! always produce the same output tokens.
//!
//! # Declaring a dependency
//!
//! The declaration lives inside the macro because its field types use a small
//! callable grammar that is not expressible as ordinary Rust struct fields:
//!
//! ```text
//! generate_mock! {
//!     pub struct ApiClient {
//!         pub fetch_user_name: async try fn(user_id: i64) -> String,
//!         pub set_user_flag: async try fn(user_id: i64, flag: bool) -> (),
//!         pub retries: u32,
//!     }
//! }
//! ```
//!
//! - `async` marks a handler that may suspend; the field is lowered to a
//!   boxed closure returning [`BoxFuture`].
//! - `try` marks a handler that may fail; the result is wrapped in
//!   `Result<_, `[`BoxError`]`>`.
//! - Parameters may be labeled (`user_id: i64`), explicitly unlabeled
//!   (`_: i64`), or bare (`i64`). Unlabeled parameters are named `arg0`,
//!   `arg1`, ... by their position in the full parameter list.
//! - A field whose type is not a callable signature (`retries` above) is
//!   carried through verbatim and ignored by the mock machinery.
//!
//! # What gets generated
//!
//! Per closure field `fetch_user_name`, the companion mock carries four
//! members plus two configuration points:
//!
//! - `fetch_user_name_call_count()` -- how many times the trampoline ran,
//!   counting attempts, not successes;
//! - `fetch_user_name_arg_values()` -- every argument list the trampoline
//!   saw, in call order (labeled multi-parameter signatures record entries
//!   of a generated `FetchUserNameArgs` record struct, unlabeled ones a
//!   plain tuple);
//! - `set_fetch_user_name_handler(f)` -- replace the active handler; the
//!   trampoline reads the handler at the moment of each invocation, so a
//!   test can script "first call fails, second succeeds" by swapping
//!   between calls;
//! - `with_fetch_user_name_handler(f)` -- chaining form for construction;
//! - a private trampoline named `fetch_user_name` that increments the
//!   counter, appends the arguments, and forwards -- in that fixed order --
//!   plus the private handler storage it dispatches through.
//!
//! `<Name>Mock::new()` leaves every handler set to a placeholder that panics
//! with a stable tag (`"ApiClientMock::fetch_user_name_handler"`) naming the
//! handler a test forgot to configure.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use genmock::generate_mock;
//!
//! generate_mock! {
//!     pub struct ApiClient {
//!         pub fetch_user_name: try fn(user_id: i64) -> String,
//!     }
//! }
//!
//! let mock = Arc::new(ApiClientMock::new());
//! mock.set_fetch_user_name_handler(|user_id| Ok(format!("user {}", user_id)));
//!
//! let client = ApiClient::mock(Arc::clone(&mock));
//! let name = (client.fetch_user_name)(1234).unwrap();
//!
//! assert_eq!(name, "user 1234");
//! assert_eq!(mock.fetch_user_name_call_count(), 1);
//! assert_eq!(mock.fetch_user_name_arg_values(), vec![1234]);
//! ```
//!
//! # Visibility
//!
//! Generated members never widen what the declaration exposed: if the struct
//! is not `pub`, nothing generated is `pub`; if it is, each field's members
//! follow that field's own visibility. Trampolines are always private -- the
//! factory's closures are their only callers.
//!
//! # Limitations
//!
//! Handler argument types must be `Clone` (the log stores them while the
//! handler consumes them). Generic structs, tuple structs, enums and unions
//! are rejected; callables nested inside other type constructors
//! (`Box<fn()>`, tuples of callables) are ignored as ordinary data fields.

pub mod runtime;

pub use genmock_internal::generate_mock;

pub use crate::runtime::{unimplemented, BoxError, BoxFuture};
