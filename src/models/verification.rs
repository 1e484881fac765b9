use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// Document types the service stores. Only [`DocumentKind::REQUIRED`] count
/// towards the acceptance gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Ine,
    DriversLicense,
    VehicleRegistration,
    ProofOfAddress,
    /// A type added on the service after this client was built
    #[serde(other)]
    Other,
}

impl DocumentKind {
    pub const REQUIRED: [DocumentKind; 2] = [DocumentKind::Ine, DocumentKind::DriversLicense];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Ine => "ine",
            DocumentKind::DriversLicense => "drivers_license",
            DocumentKind::VehicleRegistration => "vehicle_registration",
            DocumentKind::ProofOfAddress => "proof_of_address",
            DocumentKind::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Ine => "INE (identity card)",
            DocumentKind::DriversLicense => "Driver's license",
            DocumentKind::VehicleRegistration => "Vehicle registration",
            DocumentKind::ProofOfAddress => "Proof of address",
            DocumentKind::Other => "Other document",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "Pending review",
            DocumentStatus::Approved => "Approved",
            DocumentStatus::Rejected => "Rejected",
        }
    }
}

/// Per-kind document state as reported by the status endpoint
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentsStatus {
    #[serde(default)]
    pub ine: DocumentStatus,
    #[serde(default)]
    pub drivers_license: DocumentStatus,
}

impl DocumentsStatus {
    /// Status of a required kind; other kinds are never tracked here
    pub fn get(&self, kind: DocumentKind) -> DocumentStatus {
        match kind {
            DocumentKind::Ine => self.ine,
            DocumentKind::DriversLicense => self.drivers_license,
            _ => DocumentStatus::Pending,
        }
    }
}

/// Driver verification view from `/api/verification/status`.
///
/// The status endpoint does not report the phone flag; it lives on the
/// signed-in [`User`](super::User) and is passed into the gate checks.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverVerification {
    #[serde(default, alias = "is_email_verified")]
    pub email_verified: bool,
    #[serde(default)]
    pub documents_status: DocumentsStatus,
    #[serde(default)]
    pub overall_verification_complete: bool,
    /// What the service reported. Not trusted on its own, see [`Self::may_accept_orders`].
    #[serde(default, rename = "can_accept_orders")]
    pub reported_can_accept: bool,
    #[serde(default)]
    pub pending_actions: Vec<String>,
}

impl DriverVerification {
    pub fn documents_approved(&self) -> bool {
        DocumentKind::REQUIRED
            .iter()
            .all(|kind| self.documents_status.get(*kind) == DocumentStatus::Approved)
    }

    /// The acceptance gate, recomputed from its four conditions on every call
    pub fn may_accept_orders(&self, phone_verified: bool) -> bool {
        phone_verified && self.email_verified && self.documents_approved()
    }

    /// Steps left before the gate opens
    pub fn missing_steps(&self, phone_verified: bool) -> Vec<String> {
        let mut steps = Vec::new();
        if !phone_verified {
            steps.push("Verify phone number".to_string());
        }
        if !self.email_verified {
            steps.push("Verify email".to_string());
        }
        for kind in DocumentKind::REQUIRED {
            match self.documents_status.get(kind) {
                DocumentStatus::Approved => {}
                DocumentStatus::Pending => steps.push(format!("Upload or await review: {}", kind.label())),
                DocumentStatus::Rejected => steps.push(format!("Upload again: {}", kind.label())),
            }
        }
        steps
    }
}

/// Uploaded document record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub document_type: DocumentKind,
    #[serde(default)]
    pub file_name: String,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub upload_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub admin_comments: Option<String>,
}

/// Body of `POST /api/verification/upload-document`
#[derive(Clone, Debug, Serialize)]
pub struct DocumentUpload {
    pub document_type: DocumentKind,
    pub file_name: String,
    /// Standard base64 of the file contents
    pub file_data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verified() -> DriverVerification {
        DriverVerification {
            email_verified: true,
            documents_status: DocumentsStatus {
                ine: DocumentStatus::Approved,
                drivers_license: DocumentStatus::Approved,
            },
            overall_verification_complete: true,
            reported_can_accept: true,
            pending_actions: Vec::new(),
        }
    }

    #[test]
    fn test_gate_open_only_when_all_four_hold() {
        assert!(verified().may_accept_orders(true));
        assert!(!verified().may_accept_orders(false));

        let mut v = verified();
        v.email_verified = false;
        assert!(!v.may_accept_orders(true));

        let mut v = verified();
        v.documents_status.ine = DocumentStatus::Pending;
        assert!(!v.may_accept_orders(true));

        let mut v = verified();
        v.documents_status.drivers_license = DocumentStatus::Rejected;
        assert!(!v.may_accept_orders(true));
    }

    #[test]
    fn test_reported_flag_does_not_open_gate() {
        let mut v = verified();
        v.documents_status.ine = DocumentStatus::Pending;
        v.reported_can_accept = true;
        assert!(!v.may_accept_orders(true));
        assert_eq!(v.missing_steps(true).len(), 1);
    }

    #[test]
    fn test_missing_documents_default_to_pending() {
        let json = r#"{
            "email_verified": true,
            "documents_status": {"ine": "approved"},
            "overall_verification_complete": false,
            "can_accept_orders": false,
            "pending_actions": ["Subir documento: drivers_license"]
        }"#;
        let v: DriverVerification = serde_json::from_str(json).unwrap();
        assert_eq!(v.documents_status.drivers_license, DocumentStatus::Pending);
        assert!(!v.may_accept_orders(true));
    }

    #[test]
    fn test_approved_driver_payload_opens_gate_with_phone_from_user() {
        // Exact shape of the status endpoint: no phone flag at all
        let json = r#"{
            "email_verified": true,
            "documents_status": {"ine": "approved", "drivers_license": "approved"},
            "overall_verification_complete": true,
            "can_accept_orders": true,
            "pending_actions": []
        }"#;
        let v: DriverVerification = serde_json::from_str(json).unwrap();
        assert!(v.may_accept_orders(true));
        assert!(v.missing_steps(true).is_empty());

        assert!(!v.may_accept_orders(false));
        assert_eq!(v.missing_steps(false), vec!["Verify phone number".to_string()]);
    }

    #[test]
    fn test_documents_list_with_extra_kinds_decodes() {
        let json = r#"[
            {"id": "d1", "document_type": "ine", "file_name": "ine.png", "status": "approved"},
            {"id": "d2", "document_type": "proof_of_address", "file_name": "cfe.pdf", "status": "pending"},
            {"id": "d3", "document_type": "vehicle_registration", "file_name": "tarjeta.jpg"},
            {"id": "d4", "document_type": "insurance_policy", "file_name": "poliza.pdf"}
        ]"#;
        let docs: Vec<Document> = serde_json::from_str(json).unwrap();
        let kinds: Vec<DocumentKind> = docs.iter().map(|d| d.document_type).collect();
        assert_eq!(
            kinds,
            vec![
                DocumentKind::Ine,
                DocumentKind::ProofOfAddress,
                DocumentKind::VehicleRegistration,
                DocumentKind::Other
            ]
        );
        assert_eq!(DocumentKind::REQUIRED.len(), 2);
    }
}
