// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::sync::Arc;

use crate::notice::messages;
use crate::{ForecastClient, HttpTransport, Navigation, Notice, Route, SessionGuard, TopProducts, UserStatistics};

/// What the history page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum HistoryView {
    /// No session; go to the given page instead.
    Redirect(Route),
    /// The user has made no predictions yet.
    Empty,
    /// The prediction history.
    Loaded(UserStatistics),
    /// The history could not be loaded.
    Failed(Notice),
}

/// What the market overview page shows.
#[derive(Debug, Clone, PartialEq)]
pub enum OverviewView {
    /// No session; go to the given page instead.
    Redirect(Route),
    /// The top products. Both lists are empty when they could not be loaded.
    Loaded(TopProducts),
}

/// Drives the prediction history page and the market overview.
pub struct StatisticsController<T> {
    client: Arc<ForecastClient<T>>,
    guard: Arc<dyn SessionGuard>,
}

impl<T: std::fmt::Debug> std::fmt::Debug for StatisticsController<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticsController")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl<T: HttpTransport> StatisticsController<T> {
    /// Creates a controller.
    pub fn new(client: Arc<ForecastClient<T>>, guard: Arc<dyn SessionGuard>) -> Self {
        Self { client, guard }
    }

    /// Loads the prediction history of the signed-in user.
    pub async fn load_history(&self) -> HistoryView {
        if let Navigation::Redirect(route) = self.guard.require_authenticated() {
            return HistoryView::Redirect(route);
        }

        match self.client.user_statistics().await {
            Ok(statistics) if statistics.predictions.is_empty() => HistoryView::Empty,
            Ok(statistics) => HistoryView::Loaded(statistics),
            Err(error) => {
                tracing::warn!(%error, "failed to load prediction history");
                HistoryView::Failed(Notice::error(messages::STATISTICS_FAILED))
            }
        }
    }

    /// Loads the market overview for the signed-in user. A failed load is logged and
    /// shown as empty lists rather than an error.
    pub async fn top_products(&self) -> OverviewView {
        if let Navigation::Redirect(route) = self.guard.require_authenticated() {
            return OverviewView::Redirect(route);
        }

        match self.client.top_products().await {
            Ok(products) => OverviewView::Loaded(products),
            Err(error) => {
                tracing::warn!(%error, "failed to load top products");
                OverviewView::Loaded(TopProducts::default())
            }
        }
    }
}
