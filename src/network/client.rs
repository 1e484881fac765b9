//! HTTP client for the marketplace API
//!
//! One typed method per endpoint. The bearer token is passed in by the
//! caller on every call rather than stored in the client.

use std::path::Path;
use std::time::Duration;

use base64::Engine;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::constants::MAX_DOCUMENT_BYTES;
use crate::error::ApiError;
use crate::financials;
use crate::messages::network::{ApiCall, ApiReply};
use crate::models::{
    AdminStats, AuthResponse, CashCollection, CommissionConfig, Credentials, Document, DocumentKind,
    DocumentUpload, DriverPayout, DriverVerification, NewOrder, Order, OrderStatus, PaymentTransaction,
    Registration, User,
};

/// Typed client over a shared `reqwest::Client`
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        ApiClient {
            http: create_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Build a request, attaching the bearer token when the endpoint needs one
    fn request(&self, method: Method, path: &str, token: Option<&str>) -> Result<RequestBuilder, ApiError> {
        let builder = self
            .http
            .request(method, self.url(path))
            .header("Accept", "application/json");
        match token {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Err(ApiError::Unauthenticated),
        }
    }

    fn public_request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header("Accept", "application/json")
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder, is_login: bool) -> Result<T, ApiError> {
        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body, is_login));
        }
        serde_json::from_str::<T>(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::from_status(status, &body, false))
    }

    // ========================
    // Auth
    // ========================

    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, ApiError> {
        let builder = self.public_request(Method::POST, "/auth/login").json(credentials);
        self.send_json(builder, true).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        let builder = self.public_request(Method::POST, "/auth/register").json(registration);
        self.send_json(builder, false).await
    }

    pub async fn me(&self, token: Option<&str>) -> Result<User, ApiError> {
        let builder = self.request(Method::GET, "/auth/me", token)?;
        self.send_json(builder, false).await
    }

    // ========================
    // Orders
    // ========================

    /// Role-scoped: the client's own orders, available ones for drivers, all for admin
    pub async fn list_orders(&self, token: Option<&str>) -> Result<Vec<Order>, ApiError> {
        let builder = self.request(Method::GET, "/orders", token)?;
        self.send_json(builder, false).await
    }

    pub async fn driver_orders(&self, token: Option<&str>) -> Result<Vec<Order>, ApiError> {
        let builder = self.request(Method::GET, "/orders/driver", token)?;
        self.send_json(builder, false).await
    }

    pub async fn create_order(&self, order: &NewOrder, token: Option<&str>) -> Result<Order, ApiError> {
        financials::validate_price(order.price).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
        let builder = self.request(Method::POST, "/orders", token)?.json(order);
        self.send_json(builder, false).await
    }

    pub async fn accept_order(&self, order_id: &str, token: Option<&str>) -> Result<(), ApiError> {
        let builder = self.request(Method::PUT, &format!("/orders/{}/accept", order_id), token)?;
        self.send_unit(builder).await
    }

    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: OrderStatus,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::PUT, &format!("/orders/{}/status", order_id), token)?
            .query(&[("status", status.as_str())]);
        self.send_unit(builder).await
    }

    // ========================
    // Payments
    // ========================

    pub async fn pay_cash(&self, order_id: &str, token: Option<&str>) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "/payment/cash", token)?
            .json(&json!({ "order_id": order_id }));
        self.send_unit(builder).await
    }

    pub async fn complete_cash(&self, order_id: &str, token: Option<&str>) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, &format!("/payment/cash/complete/{}", order_id), token)?;
        self.send_unit(builder).await
    }

    pub async fn transactions(&self, token: Option<&str>) -> Result<Vec<PaymentTransaction>, ApiError> {
        let builder = self.request(Method::GET, "/payments/transactions", token)?;
        self.send_json(builder, false).await
    }

    // ========================
    // Driver verification
    // ========================

    pub async fn verification_status(&self, token: Option<&str>) -> Result<DriverVerification, ApiError> {
        let builder = self.request(Method::GET, "/verification/status", token)?;
        self.send_json(builder, false).await
    }

    pub async fn verification_documents(&self, token: Option<&str>) -> Result<Vec<Document>, ApiError> {
        let builder = self.request(Method::GET, "/verification/documents", token)?;
        self.send_json(builder, false).await
    }

    pub async fn send_email_code(&self, token: Option<&str>) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, "/verification/send-email", token)?;
        self.send_unit(builder).await
    }

    pub async fn verify_email(&self, code: &str, token: Option<&str>) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "/verification/verify-email", token)?
            .json(&json!({ "verification_code": code }));
        self.send_unit(builder).await
    }

    pub async fn upload_document(&self, upload: &DocumentUpload, token: Option<&str>) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, "/verification/upload-document", token)?
            .json(upload);
        self.send_unit(builder).await
    }

    /// Read a local file and submit it as `kind`
    pub async fn upload_document_file(
        &self,
        kind: DocumentKind,
        path: &Path,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        let upload = read_document(kind, path).await?;
        tracing::info!(kind = kind.as_str(), file = %upload.file_name, "Uploading document");
        self.upload_document(&upload, token).await
    }

    // ========================
    // Admin
    // ========================

    pub async fn admin_stats(&self, token: Option<&str>) -> Result<AdminStats, ApiError> {
        let builder = self.request(Method::GET, "/admin/stats", token)?;
        self.send_json(builder, false).await
    }

    pub async fn admin_users(&self, token: Option<&str>) -> Result<Vec<User>, ApiError> {
        let builder = self.request(Method::GET, "/admin/users", token)?;
        self.send_json(builder, false).await
    }

    pub async fn toggle_user_status(&self, user_id: &str, token: Option<&str>) -> Result<(), ApiError> {
        let builder = self.request(Method::PUT, &format!("/admin/users/{}/toggle-status", user_id), token)?;
        self.send_unit(builder).await
    }

    pub async fn pending_drivers(&self, token: Option<&str>) -> Result<Vec<User>, ApiError> {
        let builder = self.request(Method::GET, "/admin/pending-drivers", token)?;
        self.send_json(builder, false).await
    }

    pub async fn approve_driver(
        &self,
        driver_id: &str,
        approved: bool,
        comments: Option<&str>,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        let builder = self
            .request(Method::POST, &format!("/admin/approve-driver/{}", driver_id), token)?
            .json(&json!({ "approved": approved, "comments": comments }));
        self.send_unit(builder).await
    }

    pub async fn commission_config(&self, token: Option<&str>) -> Result<CommissionConfig, ApiError> {
        let builder = self.request(Method::GET, "/admin/commission-config", token)?;
        self.send_json(builder, false).await
    }

    /// Replaces the whole config; partial updates are not supported
    pub async fn update_commission_config(
        &self,
        config: &CommissionConfig,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        config.validate().map_err(ApiError::InvalidInput)?;
        let builder = self.request(Method::PUT, "/admin/commission-config", token)?.json(config);
        self.send_unit(builder).await
    }

    pub async fn driver_payouts(&self, token: Option<&str>) -> Result<Vec<DriverPayout>, ApiError> {
        let builder = self.request(Method::GET, "/admin/driver-payouts", token)?;
        self.send_json(builder, false).await
    }

    pub async fn process_payout(&self, payout_id: &str, token: Option<&str>) -> Result<(), ApiError> {
        let builder = self.request(Method::POST, &format!("/admin/process-driver-payout/{}", payout_id), token)?;
        self.send_unit(builder).await
    }

    pub async fn cash_collections(&self, token: Option<&str>) -> Result<Vec<CashCollection>, ApiError> {
        let builder = self.request(Method::GET, "/admin/cash-collections", token)?;
        self.send_json(builder, false).await
    }

    pub async fn mark_commission_paid(&self, collection_id: &str, token: Option<&str>) -> Result<(), ApiError> {
        let builder = self.request(
            Method::POST,
            &format!("/admin/mark-commission-paid/{}", collection_id),
            token,
        )?;
        self.send_unit(builder).await
    }

    // ========================
    // Dispatch
    // ========================

    /// Run any [`ApiCall`] and wrap its result
    pub async fn execute(&self, call: ApiCall, token: Option<&str>) -> Result<ApiReply, ApiError> {
        let reply = match call {
            ApiCall::Login(credentials) => ApiReply::Auth(self.login(&credentials).await?),
            ApiCall::Register(registration) => ApiReply::Auth(self.register(&registration).await?),
            ApiCall::Me => ApiReply::Me(self.me(token).await?),
            ApiCall::ListOrders => ApiReply::Orders(self.list_orders(token).await?),
            ApiCall::DriverOrders => ApiReply::DriverOrders(self.driver_orders(token).await?),
            ApiCall::CreateOrder(order) => ApiReply::OrderCreated(self.create_order(&order, token).await?),
            ApiCall::AcceptOrder(id) => {
                self.accept_order(&id, token).await?;
                ApiReply::Done
            }
            ApiCall::UpdateOrderStatus { order_id, status } => {
                self.update_order_status(&order_id, status, token).await?;
                ApiReply::Done
            }
            ApiCall::PayCash(id) => {
                self.pay_cash(&id, token).await?;
                ApiReply::Done
            }
            ApiCall::CompleteCash(id) => {
                self.complete_cash(&id, token).await?;
                ApiReply::Done
            }
            ApiCall::VerificationStatus => ApiReply::Verification(self.verification_status(token).await?),
            ApiCall::VerificationDocuments => ApiReply::Documents(self.verification_documents(token).await?),
            ApiCall::SendEmailCode => {
                self.send_email_code(token).await?;
                ApiReply::Done
            }
            ApiCall::VerifyEmail(code) => {
                self.verify_email(&code, token).await?;
                ApiReply::Done
            }
            ApiCall::UploadDocument { kind, path } => {
                self.upload_document_file(kind, &path, token).await?;
                ApiReply::Done
            }
            ApiCall::AdminStats => ApiReply::Stats(self.admin_stats(token).await?),
            ApiCall::AdminUsers => ApiReply::Users(self.admin_users(token).await?),
            ApiCall::ToggleUserStatus(id) => {
                self.toggle_user_status(&id, token).await?;
                ApiReply::Done
            }
            ApiCall::PendingDrivers => ApiReply::PendingDrivers(self.pending_drivers(token).await?),
            ApiCall::ApproveDriver { driver_id, approved, comments } => {
                self.approve_driver(&driver_id, approved, comments.as_deref(), token).await?;
                ApiReply::Done
            }
            ApiCall::CommissionConfig => ApiReply::Commission(self.commission_config(token).await?),
            ApiCall::UpdateCommissionConfig(config) => {
                self.update_commission_config(&config, token).await?;
                ApiReply::Done
            }
            ApiCall::DriverPayouts => ApiReply::Payouts(self.driver_payouts(token).await?),
            ApiCall::ProcessPayout(id) => {
                self.process_payout(&id, token).await?;
                ApiReply::Done
            }
            ApiCall::CashCollections => ApiReply::Collections(self.cash_collections(token).await?),
            ApiCall::MarkCommissionPaid(id) => {
                self.mark_commission_paid(&id, token).await?;
                ApiReply::Done
            }
            ApiCall::Transactions => ApiReply::Transactions(self.transactions(token).await?),
        };
        Ok(reply)
    }
}

/// Load and base64-encode a document from disk
pub async fn read_document(kind: DocumentKind, path: &Path) -> Result<DocumentUpload, ApiError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| ApiError::InvalidInput(format!("Cannot read {}: {}", path.display(), e)))?;
    if !metadata.is_file() {
        return Err(ApiError::InvalidInput(format!("{} is not a file", path.display())));
    }
    if metadata.len() == 0 {
        return Err(ApiError::InvalidInput("The selected file is empty".to_string()));
    }
    if metadata.len() > MAX_DOCUMENT_BYTES {
        return Err(ApiError::InvalidInput(format!(
            "Documents must be at most {} MiB",
            MAX_DOCUMENT_BYTES / (1024 * 1024)
        )));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::InvalidInput(format!("Cannot read {}: {}", path.display(), e)))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| kind.as_str().to_string());

    Ok(DocumentUpload {
        document_type: kind,
        file_name,
        file_data: base64::engine::general_purpose::STANDARD.encode(bytes),
    })
}

/// Create an HTTP client with the configured timeout
pub fn create_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_read_document_encodes_base64() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"hello").unwrap();

        let upload = read_document(DocumentKind::Ine, file.path()).await.unwrap();
        assert_eq!(upload.file_data, "aGVsbG8=");
        assert_eq!(upload.document_type, DocumentKind::Ine);
        assert!(!upload.file_name.is_empty());
    }

    #[tokio::test]
    async fn test_read_document_rejects_empty_and_missing() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = read_document(DocumentKind::DriversLicense, file.path()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));

        let err = read_document(DocumentKind::Ine, Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_missing_token_fails_without_request() {
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1));
        assert_eq!(client.list_orders(None).await.unwrap_err(), ApiError::Unauthenticated);
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new("http://localhost:8001/", Duration::from_secs(1));
        assert_eq!(client.url("/orders"), "http://localhost:8001/api/orders");
    }
}
