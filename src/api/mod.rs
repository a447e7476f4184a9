//! JSON-over-HTTP surface of the back office.
//!
//! Handlers are thin: they pull the database handle from [`AppState`], call
//! into [`crate::core`], and wrap the result in the response envelope.

pub mod error;
pub mod health;
pub mod members;
pub mod payments;
pub mod plans;
pub mod setup;
pub mod state;

pub use state::AppState;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Routes served under `/api`.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/membership-plans", get(plans::list_plans))
        .route("/members", get(members::list_members))
        .route("/members/:id", get(members::get_member))
        .route("/payments", get(payments::list_payments))
        .route("/payments/summary", get(payments::payment_summary))
        .route("/payments/history", get(payments::payment_history))
        .route("/payments/add", post(payments::add_payment))
        .route("/payments/:id", put(payments::update_payment))
        .route(
            "/memberships/:id/transactions",
            get(payments::membership_transactions),
        )
        .route(
            "/auth/setup",
            get(setup::setup_status).post(setup::create_first_admin),
        )
        .with_state(state)
}

/// Full application: the API nested under `/api` with CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{errors::Result, test_utils::*};
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use crate::money::Money;
    use sea_orm::DatabaseConnection;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_app(db: DatabaseConnection) -> Router {
        build_router(AppState::new(db))
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() -> Result<()> {
        let db = setup_test_db().await?;
        let (status, body) = send(test_app(db), get_req("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "ok");
        Ok(())
    }

    #[tokio::test]
    async fn test_plans_and_members() -> Result<()> {
        let (db, fixture) = setup_with_payment(Money::from_major(6000)).await?;
        let app = test_app(db);

        let (status, body) = send(app.clone(), get_req("/api/membership-plans")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["plans"][0]["plan_name"], "Test Plan");

        let (status, body) = send(app.clone(), get_req("/api/members")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["members"][0]["full_name"], "Test Member");
        assert_eq!(body["members"][0]["payment"]["payment_status"], "pending");

        let uri = format!("/api/members/{}", fixture.member.id);
        let (status, body) = send(app.clone(), get_req(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["member"]["id"], fixture.member.id);

        let (status, body) = send(app, get_req("/api/members/999")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_payment_flow() -> Result<()> {
        let (db, fixture) = setup_with_payment(Money::from_major(6000)).await?;
        let app = test_app(db);
        let posting = |amount: f64| {
            json!({
                "member_id": fixture.member.id,
                "membership_id": fixture.membership.id,
                "amount": amount,
                "payment_mode": "UPI",
                "payment_date": "2025-01-05",
                "reference_number": "TXN-1",
            })
        };

        let (status, body) =
            send(app.clone(), json_req("POST", "/api/payments/add", &posting(2000.0))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["payment"]["paid_amount"], 2000.0);
        assert_eq!(body["payment"]["payment_status"], "partial");
        assert_eq!(body["payment"]["payment_mode"], "UPI");

        let (status, body) =
            send(app.clone(), json_req("POST", "/api/payments/add", &posting(7000.0))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Amount 7000 exceeds pending balance 4000");

        let (status, body) = send(app.clone(), get_req("/api/payments/history")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
        assert_eq!(body["transactions"][0]["reference_number"], "TXN-1");

        let uri = format!("/api/memberships/{}/transactions", fixture.membership.id);
        let (status, body) = send(app.clone(), get_req(&uri)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transactions"][0]["amount"], 2000.0);

        let (status, body) = send(app.clone(), get_req("/api/payments")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payments"][0]["pending_amount"], 4000.0);
        assert_eq!(body["payments"][0]["full_name"], "Test Member");

        let (status, body) = send(app, get_req("/api/payments/summary")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["total_revenue"], 2000.0);
        assert_eq!(body["summary"]["total_payments"], 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_fractional_amounts_settle_over_http() -> Result<()> {
        let (db, fixture) = setup_with_payment("1969.37".parse()?).await?;
        let app = test_app(db);
        let posting = |amount: f64| {
            json!({
                "member_id": fixture.member.id,
                "membership_id": fixture.membership.id,
                "amount": amount,
                "payment_mode": "Cash",
                "payment_date": "2025-01-05",
            })
        };

        let (status, body) =
            send(app.clone(), json_req("POST", "/api/payments/add", &posting(1278.89))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payment"]["payment_status"], "partial");

        let (status, body) =
            send(app.clone(), json_req("POST", "/api/payments/add", &posting(690.48))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payment"]["payment_status"], "full");
        assert_eq!(body["payment"]["paid_amount"], 1969.37);

        let (_, body) = send(app, get_req("/api/payments")).await;
        assert_eq!(body["payments"][0]["pending_amount"], 0.0);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() -> Result<()> {
        let db = setup_test_db().await?;
        let app = test_app(db);

        let body = json!({ "member_id": 1, "amount": "lots" });
        let (status, body) = send(app, json_req("POST", "/api/payments/add", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_payment_refund() -> Result<()> {
        let (db, fixture) = setup_with_payment(Money::from_major(6000)).await?;
        let app = test_app(db);
        let uri = format!("/api/payments/{}", fixture.payment.id);

        let refund = json!({
            "paid_amount": 0.0,
            "payment_mode": "Card",
            "payment_status": "refunded",
        });
        let (status, body) = send(app.clone(), json_req("PUT", &uri, &refund)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["payment"]["payment_status"], "refunded");

        let too_much = json!({ "paid_amount": 9000.0, "payment_mode": "Cash" });
        let (status, _) = send(app.clone(), json_req("PUT", &uri, &too_much)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app, json_req("PUT", "/api/payments/999", &too_much)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_admin_setup_flow() -> Result<()> {
        let db = setup_test_db().await?;
        let app = test_app(db);

        let (status, body) = send(app.clone(), get_req("/api/auth/setup")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "adminExists": false, "needsSetup": true }));

        let weak = json!({ "name": "Owner", "email": "owner@gym.in", "password": "1234567" });
        let (status, body) = send(app.clone(), json_req("POST", "/api/auth/setup", &weak)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Password must be at least 8 characters long");

        let good = json!({ "name": "Owner", "email": "owner@gym.in", "password": "12345678" });
        let (status, body) = send(app.clone(), json_req("POST", "/api/auth/setup", &good)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Admin created successfully");
        assert_eq!(body["user"]["role"], "admin");
        assert!(body["user"].get("password_hash").is_none());

        let (status, body) = send(app.clone(), json_req("POST", "/api/auth/setup", &good)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());

        // Once set up, even invalid input is answered with the conflict
        let (status, _) = send(app.clone(), json_req("POST", "/api/auth/setup", &weak)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, body) = send(app, get_req("/api/auth/setup")).await;
        assert_eq!(body, json!({ "adminExists": true, "needsSetup": false }));
        Ok(())
    }
}
