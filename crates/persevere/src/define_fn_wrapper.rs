// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Generates a named, clonable wrapper around a shared `Fn`.
///
/// User-provided callbacks (validity predicates, error classifiers, retry hooks) are
/// stored in an `Arc<dyn Fn ... + Send + Sync>` so that the invoker stays cheap to clone
/// and can be shared across threads.
///
/// ```rust,ignore
/// define_fn_wrapper!(Validate<T>(Fn(payload: &T) -> bool));
/// ```
///
/// generates `Validate<T>` with `new`, `call`, `Clone` and an opaque `Debug`.
///
/// Only the named-parameter form is accepted: every parameter is written as
/// `name: Type`, and the return type may be omitted for `()`. Bare parameter types and
/// lifetime generics are not supported.
macro_rules! define_fn_wrapper {
    ($name:ident<$($generics:ident),*>(Fn($($param_name:ident: $param_ty:ty),*) -> $return_ty:ty)) => {
        pub(crate) struct $name<$($generics),*>(std::sync::Arc<dyn Fn($($param_ty),*) -> $return_ty + Send + Sync>);

        impl<$($generics),*> $name<$($generics),*> {
            pub(crate) fn new<F>(f: F) -> Self
            where
                F: Fn($($param_ty),*) -> $return_ty + Send + Sync + 'static,
            {
                Self(std::sync::Arc::new(f))
            }

            pub(crate) fn call(&self, $($param_name: $param_ty),*) -> $return_ty {
                (self.0)($($param_name),*)
            }
        }

        impl<$($generics),*> Clone for $name<$($generics),*> {
            fn clone(&self) -> Self {
                Self(std::sync::Arc::clone(&self.0))
            }
        }

        impl<$($generics),*> std::fmt::Debug for $name<$($generics),*> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($name)).finish()
            }
        }
    };

    ($name:ident<$($generics:ident),*>(Fn($($param_name:ident: $param_ty:ty),*))) => {
        $crate::define_fn_wrapper!($name<$($generics),*>(Fn($($param_name: $param_ty),*) -> ()));
    };
}

pub(crate) use define_fn_wrapper;
