//! End-to-end checks of the API client and network actor against an
//! in-process fake of the marketplace service.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use mandados_tui::financials;
use mandados_tui::messages::{ApiCall, ApiReply, NetworkCommand, NetworkResponse};
use mandados_tui::models::{CommissionConfig, Credentials, NewOrder, OrderStatus};
use mandados_tui::{ApiClient, ApiError, NetworkActor};

const TOKEN: &str = "tok-123";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn order_json(id: &str, price: f64) -> Value {
    let service_fee = 15.0;
    let iva_amount = service_fee * 0.16;
    let commission = price * 0.15;
    json!({
        "id": id,
        "client_id": "c1",
        "title": "Groceries",
        "description": "Milk and bread",
        "pickup_address": "Av. Reforma 1",
        "delivery_address": "Calle 5 #20",
        "price": price,
        "status": "pending",
        "payment_status": "pending",
        "created_at": "2024-05-01T12:30:00.123456",
        "financials": {
            "subtotal": price,
            "service_fee": service_fee,
            "iva_amount": iva_amount,
            "commission_rate": 0.15,
            "commission_amount": commission,
            "driver_earnings": price - commission,
            "owner_earnings": commission + service_fee,
            "total_amount": price + service_fee + iva_amount
        }
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "ana@example.com" && body["password"] == "secret" {
        Json(json!({
            "access_token": TOKEN,
            "token_type": "bearer",
            "user": {"id": "u1", "name": "Ana", "email": "ana@example.com", "user_type": "client"}
        }))
        .into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Incorrect email or password")
    }
}

async fn list_orders(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    Json(json!([order_json("o1", 300.0)])).into_response()
}

async fn create_order(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");
    }
    let price = body["price"].as_f64().unwrap_or_default();
    Json(order_json("o2", price)).into_response()
}

async fn accept_order(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "taken" => detail(StatusCode::BAD_REQUEST, "Order is not available"),
        _ => detail(StatusCode::FORBIDDEN, "Driver verification incomplete"),
    }
}

async fn update_status(Path(_id): Path<String>, Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("status").map(String::as_str) {
        Some("in_progress") => Json(json!({"message": "ok"})).into_response(),
        _ => detail(StatusCode::BAD_REQUEST, "Invalid status transition"),
    }
}

async fn process_payout(Path(_id): Path<String>) -> Response {
    detail(StatusCode::BAD_REQUEST, "Payout already processed")
}

async fn commission_config() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

async fn slow() -> Response {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!([])).into_response()
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/driver", get(slow))
        .route("/api/orders/:id/accept", put(accept_order))
        .route("/api/orders/:id/status", put(update_status))
        .route("/api/admin/process-driver-payout/:id", post(process_payout))
        .route("/api/admin/commission-config", get(commission_config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base: &str) -> ApiClient {
    ApiClient::new(base, Duration::from_secs(5))
}

#[tokio::test]
async fn login_returns_token_and_rejects_bad_password() {
    let base = spawn_server().await;
    let api = client(&base);

    let auth = api
        .login(&Credentials {
            email: "ana@example.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(auth.access_token, TOKEN);
    assert_eq!(auth.user.name, "Ana");

    let err = api
        .login(&Credentials {
            email: "ana@example.com".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::InvalidCredentials);
}

#[tokio::test]
async fn bearer_token_is_sent_and_expired_token_is_unauthenticated() {
    let base = spawn_server().await;
    let api = client(&base);

    let orders = api.list_orders(Some(TOKEN)).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert!(orders[0].created_at.is_some());

    let err = api.list_orders(Some("expired")).await.unwrap_err();
    assert_eq!(err, ApiError::Unauthenticated);
    assert!(err.ends_session());
}

#[tokio::test]
async fn created_order_matches_preview() {
    let base = spawn_server().await;
    let api = client(&base);

    let new_order = NewOrder {
        title: "Groceries".into(),
        description: "Milk and bread".into(),
        pickup_address: "Av. Reforma 1".into(),
        delivery_address: "Calle 5 #20".into(),
        price: 300.0,
    };
    let created = api.create_order(&new_order, Some(TOKEN)).await.unwrap();
    let preview = financials::preview(300.0, &CommissionConfig::default());
    assert!(created.financials.unwrap().matches(&preview));
    assert!((preview.total_amount - 317.40).abs() < 1e-9);
}

#[tokio::test]
async fn out_of_range_price_is_refused_locally() {
    let api = client("http://127.0.0.1:9");
    let new_order = NewOrder {
        title: "Too cheap".into(),
        description: "x".into(),
        pickup_address: "a".into(),
        delivery_address: "b".into(),
        price: 20.0,
    };
    let err = api.create_order(&new_order, Some(TOKEN)).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}

#[tokio::test]
async fn refusals_keep_server_detail() {
    let base = spawn_server().await;
    let api = client(&base);

    let err = api.accept_order("o1", Some(TOKEN)).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Forbidden {
            detail: Some("Driver verification incomplete".into())
        }
    );

    let err = api.accept_order("taken", Some(TOKEN)).await.unwrap_err();
    assert_eq!(err.user_message("Could not accept the order"), "Order is not available");

    let err = api.process_payout("p1", Some(TOKEN)).await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 400,
            detail: Some("Payout already processed".into())
        }
    );
}

#[tokio::test]
async fn status_update_goes_in_query_string() {
    let base = spawn_server().await;
    let api = client(&base);

    api.update_order_status("o1", OrderStatus::InProgress, Some(TOKEN))
        .await
        .unwrap();
    let err = api
        .update_order_status("o1", OrderStatus::Delivered, Some(TOKEN))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Rejected { status: 400, .. }));
}

#[tokio::test]
async fn server_error_hides_body() {
    let base = spawn_server().await;
    let err = client(&base).commission_config(Some(TOKEN)).await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, detail: None }));
    assert_eq!(err.user_message("Could not load the commission settings"), "Could not load the commission settings");
}

fn spawn_actor(
    base: &str,
    timeout: Duration,
) -> (
    mpsc::UnboundedSender<NetworkCommand>,
    mpsc::UnboundedReceiver<NetworkResponse>,
) {
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (resp_tx, resp_rx) = mpsc::unbounded_channel();
    let actor = NetworkActor::new(client(base), timeout, resp_tx);
    tokio::spawn(actor.run(cmd_rx));
    (cmd_tx, resp_rx)
}

#[tokio::test]
async fn actor_reports_completed_calls() {
    let base = spawn_server().await;
    let (cmd_tx, mut resp_rx) = spawn_actor(&base, Duration::from_secs(5));

    cmd_tx
        .send(NetworkCommand::Execute {
            id: 1,
            call: ApiCall::ListOrders,
            token: Some(TOKEN.into()),
        })
        .unwrap();
    match resp_rx.recv().await.unwrap() {
        NetworkResponse::Completed {
            id: 1,
            result: Ok(ApiReply::Orders(orders)),
            ..
        } => assert_eq!(orders[0].id, "o1"),
        other => panic!("unexpected response: {:?}", other),
    }
    cmd_tx.send(NetworkCommand::Shutdown).unwrap();
}

#[tokio::test]
async fn actor_times_out_slow_calls() {
    let base = spawn_server().await;
    let (cmd_tx, mut resp_rx) = spawn_actor(&base, Duration::from_millis(200));

    cmd_tx
        .send(NetworkCommand::Execute {
            id: 7,
            call: ApiCall::DriverOrders,
            token: Some(TOKEN.into()),
        })
        .unwrap();
    match resp_rx.recv().await.unwrap() {
        NetworkResponse::Completed { id, result, .. } => {
            assert_eq!(id, 7);
            assert_eq!(result.unwrap_err(), ApiError::Timeout);
        }
        other => panic!("unexpected response: {:?}", other),
    }
}

#[tokio::test]
async fn actor_cancels_on_request() {
    let base = spawn_server().await;
    let (cmd_tx, mut resp_rx) = spawn_actor(&base, Duration::from_secs(5));

    cmd_tx
        .send(NetworkCommand::Execute {
            id: 3,
            call: ApiCall::DriverOrders,
            token: Some(TOKEN.into()),
        })
        .unwrap();
    cmd_tx.send(NetworkCommand::CancelRequest(3)).unwrap();

    let response = tokio::time::timeout(Duration::from_secs(2), resp_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(matches!(response, NetworkResponse::Cancelled { id: 3 }));
}

#[tokio::test]
async fn actor_refuses_protected_call_without_token() {
    let base = spawn_server().await;
    let (cmd_tx, mut resp_rx) = spawn_actor(&base, Duration::from_secs(5));

    cmd_tx
        .send(NetworkCommand::Execute {
            id: 9,
            call: ApiCall::ListOrders,
            token: None,
        })
        .unwrap();
    match resp_rx.recv().await.unwrap() {
        NetworkResponse::Completed { id: 9, result, .. } => {
            assert_eq!(result.unwrap_err(), ApiError::Unauthenticated)
        }
        other => panic!("unexpected response: {:?}", other),
    }
}
