// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Page logic that sits between the [`ForecastClient`][crate::ForecastClient] and whatever
//! renders the pages.
//!
//! Controllers never render anything. Each operation returns an outcome value carrying a
//! [`Notice`][crate::Notice] and, where the page should change, a
//! [`Navigation`][crate::Navigation].

mod auth;
mod predict;
mod statistics;

pub use auth::{AuthController, AuthOutcome, MIN_PASSWORD_LEN};
pub use predict::{PredictController, SubmitOutcome, TrainOutcome};
pub use statistics::{HistoryView, OverviewView, StatisticsController};
