//! Network messages - communication between App and Network layers

use std::path::PathBuf;

use crate::error::ApiError;
use crate::models::{
    AdminStats, AuthResponse, CashCollection, CommissionConfig, Credentials, Document, DocumentKind,
    DriverPayout, DriverVerification, NewOrder, Order, OrderStatus, PaymentTransaction, Registration,
    User,
};

/// One remote operation of the marketplace API
#[derive(Debug, Clone)]
pub enum ApiCall {
    // Auth
    Login(Credentials),
    Register(Registration),
    Me,

    // Orders
    ListOrders,
    DriverOrders,
    CreateOrder(NewOrder),
    AcceptOrder(String),
    UpdateOrderStatus { order_id: String, status: OrderStatus },

    // Payments
    PayCash(String),
    CompleteCash(String),

    // Driver verification
    VerificationStatus,
    VerificationDocuments,
    SendEmailCode,
    VerifyEmail(String),
    UploadDocument { kind: DocumentKind, path: PathBuf },

    // Admin
    AdminStats,
    AdminUsers,
    ToggleUserStatus(String),
    PendingDrivers,
    ApproveDriver {
        driver_id: String,
        approved: bool,
        comments: Option<String>,
    },
    CommissionConfig,
    UpdateCommissionConfig(CommissionConfig),
    DriverPayouts,
    ProcessPayout(String),
    CashCollections,
    MarkCommissionPaid(String),
    Transactions,
}

impl ApiCall {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            ApiCall::Login(_) => "login",
            ApiCall::Register(_) => "register",
            ApiCall::Me => "me",
            ApiCall::ListOrders => "list_orders",
            ApiCall::DriverOrders => "driver_orders",
            ApiCall::CreateOrder(_) => "create_order",
            ApiCall::AcceptOrder(_) => "accept_order",
            ApiCall::UpdateOrderStatus { .. } => "update_order_status",
            ApiCall::PayCash(_) => "pay_cash",
            ApiCall::CompleteCash(_) => "complete_cash",
            ApiCall::VerificationStatus => "verification_status",
            ApiCall::VerificationDocuments => "verification_documents",
            ApiCall::SendEmailCode => "send_email_code",
            ApiCall::VerifyEmail(_) => "verify_email",
            ApiCall::UploadDocument { .. } => "upload_document",
            ApiCall::AdminStats => "admin_stats",
            ApiCall::AdminUsers => "admin_users",
            ApiCall::ToggleUserStatus(_) => "toggle_user_status",
            ApiCall::PendingDrivers => "pending_drivers",
            ApiCall::ApproveDriver { .. } => "approve_driver",
            ApiCall::CommissionConfig => "commission_config",
            ApiCall::UpdateCommissionConfig(_) => "update_commission_config",
            ApiCall::DriverPayouts => "driver_payouts",
            ApiCall::ProcessPayout(_) => "process_payout",
            ApiCall::CashCollections => "cash_collections",
            ApiCall::MarkCommissionPaid(_) => "mark_commission_paid",
            ApiCall::Transactions => "transactions",
        }
    }

    /// Calls that change server state. These are single-flight and trigger a re-fetch.
    pub fn is_mutation(&self) -> bool {
        !matches!(
            self,
            ApiCall::Me
                | ApiCall::ListOrders
                | ApiCall::DriverOrders
                | ApiCall::VerificationStatus
                | ApiCall::VerificationDocuments
                | ApiCall::AdminStats
                | ApiCall::AdminUsers
                | ApiCall::PendingDrivers
                | ApiCall::CommissionConfig
                | ApiCall::DriverPayouts
                | ApiCall::CashCollections
                | ApiCall::Transactions
        )
    }

    /// Generic line shown when the call fails without a usable server detail
    pub fn failure_message(&self) -> &'static str {
        match self {
            ApiCall::Login(_) => "Invalid credentials",
            ApiCall::Register(_) => "Could not register",
            ApiCall::Me => "Could not load your profile",
            ApiCall::ListOrders | ApiCall::DriverOrders => "Could not load orders",
            ApiCall::CreateOrder(_) => "Could not create the order",
            ApiCall::AcceptOrder(_) => "Could not accept the order",
            ApiCall::UpdateOrderStatus { .. } => "Could not update the order status",
            ApiCall::PayCash(_) => "Could not set up cash payment, please try again",
            ApiCall::CompleteCash(_) => "Could not complete the cash payment",
            ApiCall::VerificationStatus => "Could not load verification status",
            ApiCall::VerificationDocuments => "Could not load documents",
            ApiCall::SendEmailCode => "Could not send the verification code",
            ApiCall::VerifyEmail(_) => "Invalid verification code",
            ApiCall::UploadDocument { .. } => "Could not upload the document",
            ApiCall::AdminStats => "Could not load statistics",
            ApiCall::AdminUsers => "Could not load users",
            ApiCall::ToggleUserStatus(_) => "Could not change the user status",
            ApiCall::PendingDrivers => "Could not load pending drivers",
            ApiCall::ApproveDriver { .. } => "Could not process the approval",
            ApiCall::CommissionConfig => "Could not load the commission settings",
            ApiCall::UpdateCommissionConfig(_) => "Could not update the commission settings",
            ApiCall::DriverPayouts => "Could not load driver payouts",
            ApiCall::ProcessPayout(_) => "Could not process the driver payout",
            ApiCall::CashCollections => "Could not load cash collections",
            ApiCall::MarkCommissionPaid(_) => "Could not mark the commission as paid",
            ApiCall::Transactions => "Could not load payments",
        }
    }

    /// Line shown once a mutation and its re-fetch have completed
    pub fn success_message(&self) -> Option<String> {
        let msg = match self {
            ApiCall::CreateOrder(_) => "Order created".to_string(),
            ApiCall::AcceptOrder(_) => "Order accepted".to_string(),
            ApiCall::UpdateOrderStatus { status, .. } => format!("Order is now: {}", status.label()),
            ApiCall::PayCash(_) => "Cash payment set. The driver collects on delivery.".to_string(),
            ApiCall::CompleteCash(_) => "Cash payment completed".to_string(),
            ApiCall::SendEmailCode => "Verification code sent to your email".to_string(),
            ApiCall::VerifyEmail(_) => "Email verified".to_string(),
            ApiCall::UploadDocument { kind, .. } => format!("{} submitted for review", kind.label()),
            ApiCall::ToggleUserStatus(_) => "User status changed".to_string(),
            ApiCall::ApproveDriver { approved: true, .. } => "Driver approved".to_string(),
            ApiCall::ApproveDriver { approved: false, .. } => "Driver rejected".to_string(),
            ApiCall::UpdateCommissionConfig(_) => "Commission settings updated".to_string(),
            ApiCall::ProcessPayout(_) => "Driver payout processed".to_string(),
            ApiCall::MarkCommissionPaid(_) => "Commission marked as paid".to_string(),
            _ => return None,
        };
        Some(msg)
    }
}

/// Typed result of a successful call
#[derive(Debug, Clone)]
pub enum ApiReply {
    Auth(AuthResponse),
    Me(User),
    Orders(Vec<Order>),
    DriverOrders(Vec<Order>),
    OrderCreated(Order),
    Verification(DriverVerification),
    Documents(Vec<Document>),
    Stats(AdminStats),
    Users(Vec<User>),
    PendingDrivers(Vec<User>),
    Commission(CommissionConfig),
    Payouts(Vec<DriverPayout>),
    Collections(Vec<CashCollection>),
    Transactions(Vec<PaymentTransaction>),
    /// Mutation acknowledged; body ignored
    Done,
}

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Execute one call with the caller's bearer token
    Execute {
        id: u64,
        call: ApiCall,
        token: Option<String>,
    },
    /// Cancel a pending request
    CancelRequest(u64),
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// Call finished, successfully or not
    Completed {
        id: u64,
        result: Result<ApiReply, ApiError>,
        time_ms: u64,
    },
    /// Request was cancelled
    Cancelled { id: u64 },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::Completed { id, .. } => *id,
            NetworkResponse::Cancelled { id } => *id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_are_not_mutations() {
        assert!(!ApiCall::ListOrders.is_mutation());
        assert!(!ApiCall::VerificationStatus.is_mutation());
        assert!(ApiCall::AcceptOrder("o1".into()).is_mutation());
        assert!(ApiCall::ProcessPayout("p1".into()).is_mutation());
        assert!(ApiCall::Me.success_message().is_none());
    }
}
