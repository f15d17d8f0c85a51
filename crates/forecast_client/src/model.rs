// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Wire types exchanged with the forecasting service.

#![expect(missing_docs, reason = "field names match the service's JSON keys")]

use serde::{Deserialize, Serialize};

/// Every feature the extended prediction form collects.
///
/// Defaults match an empty form: blank strings, zero numbers, `false` flags and
/// January of the first quarter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[expect(clippy::struct_excessive_bools, reason = "mirrors the service's feature set")]
pub struct FullFields {
    pub product_name: String,
    pub brand: String,
    pub category: String,
    pub region: String,
    pub seller: String,
    pub price: f64,
    pub original_price: f64,
    pub discount_percentage: f64,
    pub stock_level: f64,
    pub customer_rating: f64,
    pub review_count: f64,
    pub delivery_days: f64,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub day_of_week: u8,
    pub month: u8,
    pub quarter: u8,
    pub sales_quantity_lag_1: f64,
    pub price_lag_1: f64,
    pub sales_quantity_lag_3: f64,
    pub price_lag_3: f64,
    pub sales_quantity_lag_7: f64,
    pub price_lag_7: f64,
    pub sales_quantity_rolling_mean_3: f64,
    pub price_rolling_mean_3: f64,
    pub sales_quantity_rolling_mean_7: f64,
    pub price_rolling_mean_7: f64,
}

impl Default for FullFields {
    fn default() -> Self {
        Self {
            product_name: String::new(),
            brand: String::new(),
            category: String::new(),
            region: String::new(),
            seller: String::new(),
            price: 0.0,
            original_price: 0.0,
            discount_percentage: 0.0,
            stock_level: 0.0,
            customer_rating: 0.0,
            review_count: 0.0,
            delivery_days: 0.0,
            is_weekend: false,
            is_holiday: false,
            day_of_week: 0,
            month: 1,
            quarter: 1,
            sales_quantity_lag_1: 0.0,
            price_lag_1: 0.0,
            sales_quantity_lag_3: 0.0,
            price_lag_3: 0.0,
            sales_quantity_lag_7: 0.0,
            price_lag_7: 0.0,
            sales_quantity_rolling_mean_3: 0.0,
            price_rolling_mean_3: 0.0,
            sales_quantity_rolling_mean_7: 0.0,
            price_rolling_mean_7: 0.0,
        }
    }
}

/// The simplified form: three identifying fields plus a handful of optional hints.
///
/// Absent optional values are omitted from the request body so that the service can
/// fill them from its own data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinimalFields {
    pub product_name: String,
    pub region: String,
    pub seller: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_days: Option<f64>,
}

impl MinimalFields {
    /// Creates a request with the required fields and no optional hints.
    #[must_use]
    pub fn new(product_name: impl Into<String>, region: impl Into<String>, seller: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            region: region.into(),
            seller: seller.into(),
            ..Self::default()
        }
    }
}

/// A prediction request in one of the two shapes the service accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionRequest {
    /// Sent to `/predict`.
    Full(FullFields),
    /// Sent to `/predict/minimal`.
    Minimal(MinimalFields),
}

impl PredictionRequest {
    /// The endpoint path, relative to the API base URL.
    #[must_use]
    pub fn path(&self) -> &'static str {
        match self {
            Self::Full(_) => "/predict",
            Self::Minimal(_) => "/predict/minimal",
        }
    }

    /// Whether this is the simplified shape.
    #[must_use]
    pub fn is_minimal(&self) -> bool {
        matches!(self, Self::Minimal(_))
    }

    /// Names of required fields that are blank.
    ///
    /// The minimal shape requires a product name, region and seller. The full shape
    /// additionally requires a brand, a category and a positive price.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let mut require = |name: &'static str, value: &str| {
            if value.trim().is_empty() {
                missing.push(name);
            }
        };

        match self {
            Self::Minimal(fields) => {
                require("product_name", &fields.product_name);
                require("region", &fields.region);
                require("seller", &fields.seller);
            }
            Self::Full(fields) => {
                require("product_name", &fields.product_name);
                require("brand", &fields.brand);
                require("category", &fields.category);
                require("region", &fields.region);
                require("seller", &fields.seller);
                if fields.price <= 0.0 {
                    missing.push("price");
                }
            }
        }

        missing
    }
}

impl Serialize for PredictionRequest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Full(fields) => fields.serialize(serializer),
            Self::Minimal(fields) => fields.serialize(serializer),
        }
    }
}

impl From<FullFields> for PredictionRequest {
    fn from(fields: FullFields) -> Self {
        Self::Full(fields)
    }
}

impl From<MinimalFields> for PredictionRequest {
    fn from(fields: MinimalFields) -> Self {
        Self::Minimal(fields)
    }
}

/// A forecast returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_price: f64,
    /// Predicted sales or demand growth. Older service versions name it
    /// `demand_growth_percentage`.
    #[serde(alias = "demand_growth_percentage")]
    pub predicted_sales: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_interval: Option<(f64, f64)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<String>,
}

impl PredictionResult {
    /// Creates a result with only the two forecast figures.
    #[must_use]
    pub fn new(predicted_price: f64, predicted_sales: f64) -> Self {
        Self {
            predicted_price,
            predicted_sales,
            confidence_interval: None,
            recommendations: None,
        }
    }

    /// Whether both forecast figures are exactly zero.
    ///
    /// The service answers this way while it lacks data for the product. A real forecast
    /// of zero price and zero sales is indistinguishable from that answer and is treated
    /// the same way.
    #[must_use]
    #[expect(clippy::float_cmp, reason = "only an exact zero marks an empty forecast")]
    pub fn is_degenerate(&self) -> bool {
        self.predicted_price == 0.0 && self.predicted_sales == 0.0
    }
}

/// Whether the forecasting models are ready to serve predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStatus {
    pub models_trained: bool,
}

/// Training summary for one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub best_iteration: u32,
    pub best_score: f64,
}

/// Training summary for both models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    pub price_model: ModelScore,
    pub sales_model: ModelScore,
}

/// Email and password, used for both registration and login.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

impl UserCredentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCredentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Tokens and identity returned after registration or login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Unix timestamp, in seconds, after which the access token is rejected.
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

/// One past prediction of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionHistory {
    pub id: String,
    pub user_id: String,
    /// The request as the service stored it; its shape depends on [`minimal`][Self::minimal].
    pub request: serde_json::Value,
    pub result: PredictionResult,
    pub created_at: String,
    #[serde(default)]
    pub minimal: bool,
}

/// The prediction history of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStatistics {
    pub user_id: String,
    #[serde(default)]
    pub predictions: Vec<PredictionHistory>,
}

/// A product highlighted on the market overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub demand_growth_percentage: f64,
}

impl TopProduct {
    /// Predicted price change relative to the current price, in percent.
    ///
    /// Returns `None` when the current price is zero.
    #[must_use]
    pub fn price_change_percent(&self) -> Option<f64> {
        (self.current_price != 0.0)
            .then(|| (self.predicted_price - self.current_price) / self.current_price * 100.0)
    }
}

/// Products with the highest predicted demand growth and price increase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopProducts {
    #[serde(default)]
    pub top_demand_growth: Vec<TopProduct>,
    #[serde(default)]
    pub top_price_increase: Vec<TopProduct>,
}
