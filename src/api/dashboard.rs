//! Dashboard data endpoint.
//!
//! The widgets are fed from fixed sample figures; the endpoint exists so the
//! dashboard only ever receives data together with a verified identity.

use axum::{
    Json, Router, http::Method, middleware, response::IntoResponse, routing::any,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::ApiError;
use crate::auth::{CurrentUser, Identity, protect_api};
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::TokenCodec;

#[derive(Clone)]
pub struct DashboardState {
    pub db: Database,
    pub tokens: Arc<TokenCodec>,
    pub secure_cookies: bool,
}

impl_has_auth_backend!(DashboardState);

pub fn router(state: DashboardState) -> Router {
    Router::new()
        .route("/dashboard", any(dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            protect_api::<DashboardState>,
        ))
        .with_state(state)
}

#[derive(Serialize)]
struct Kpi {
    key: &'static str,
    label: &'static str,
    value: f64,
    /// Change versus the previous period, in percent
    change: f64,
}

#[derive(Serialize)]
struct Notification {
    id: u32,
    level: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct Anomaly {
    account: &'static str,
    description: &'static str,
    amount: f64,
    severity: &'static str,
}

#[derive(Serialize)]
struct DashboardResponse {
    kpis: &'static [Kpi],
    notifications: &'static [Notification],
    anomalies: &'static [Anomaly],
    user: Identity,
}

const KPIS: &[Kpi] = &[
    Kpi {
        key: "revenue",
        label: "Revenue",
        value: 1_284_500.0,
        change: 8.2,
    },
    Kpi {
        key: "expenses",
        label: "Operating expenses",
        value: 742_310.0,
        change: -3.1,
    },
    Kpi {
        key: "net_income",
        label: "Net income",
        value: 542_190.0,
        change: 12.6,
    },
    Kpi {
        key: "cash",
        label: "Cash on hand",
        value: 2_105_000.0,
        change: 1.4,
    },
];

const NOTIFICATIONS: &[Notification] = &[
    Notification {
        id: 1,
        level: "info",
        message: "Quarterly close is scheduled for the last business day",
    },
    Notification {
        id: 2,
        level: "warning",
        message: "Three invoices are more than 30 days overdue",
    },
];

const ANOMALIES: &[Anomaly] = &[
    Anomaly {
        account: "Travel & Entertainment",
        description: "Spend 3.4x above the trailing 90-day average",
        amount: 18_420.0,
        severity: "high",
    },
    Anomaly {
        account: "Software subscriptions",
        description: "Duplicate charge from the same vendor",
        amount: 1_199.0,
        severity: "medium",
    },
];

async fn dashboard(
    method: Method,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    if method != Method::GET {
        return Err(ApiError::method_not_allowed("GET"));
    }

    Ok(Json(DashboardResponse {
        kpis: KPIS,
        notifications: NOTIFICATIONS,
        anomalies: ANOMALIES,
        user,
    }))
}
