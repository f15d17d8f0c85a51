// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use crate::{AttemptOutcome, ErrorArgs, OnRetryArgs};

crate::define_fn_wrapper!(Validate<T>(Fn(payload: &T) -> bool));
crate::define_fn_wrapper!(RetryErrorIf<E>(Fn(error: &E, args: ErrorArgs) -> bool));
crate::define_fn_wrapper!(OnRetry<T, E>(Fn(outcome: &AttemptOutcome<T, E>, args: OnRetryArgs)));

impl<T> Validate<T> {
    pub(crate) fn accept_all() -> Self {
        Self::new(|_| true)
    }
}

impl<E> RetryErrorIf<E> {
    pub(crate) fn always() -> Self {
        Self::new(|_, _| true)
    }
}
