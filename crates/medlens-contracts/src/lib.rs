//! # medlens-contracts
//!
//! Shared types and contracts for the MedLens clinical-document client.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod document;
pub mod entity;
pub mod error;
pub mod http;
pub mod session;

#[cfg(test)]
mod tests {
    use super::*;
    use document::NormalizedDocument;
    use entity::{Category, DiseaseEntity, LabMatch, SpanRange};
    use error::MedlensError;
    use http::ApiResponse;
    use serde_json::json;
    use session::{AuthResponse, Role, User};

    // ── Role ─────────────────────────────────────────────────────────────────

    #[test]
    fn role_known_values_parse() {
        assert_eq!(Role::from("doctor"), Role::Doctor);
        assert_eq!(Role::from("patient"), Role::Patient);
        assert_eq!(Role::from("admin"), Role::Admin);
    }

    #[test]
    fn role_unknown_value_is_kept_verbatim() {
        let role: Role = serde_json::from_value(json!("nurse")).unwrap();
        assert_eq!(role, Role::Other("nurse".to_string()));
        assert_eq!(serde_json::to_value(&role).unwrap(), json!("nurse"));
    }

    // ── User / AuthResponse ──────────────────────────────────────────────────

    #[test]
    fn auth_response_parses_server_shape() {
        let body = json!({
            "access_token": "tok-123",
            "token_type": "bearer",
            "user": {
                "id": "u-1",
                "username": "drsmith",
                "email": "smith@clinic.test",
                "role": "doctor",
                "full_name": "Dana Smith",
                "created_at": "2026-01-01T00:00:00",
                "is_active": true
            }
        });
        let auth: AuthResponse = serde_json::from_value(body).unwrap();
        assert_eq!(auth.access_token, "tok-123");
        assert_eq!(auth.user.role, Role::Doctor);
        assert_eq!(auth.user.display_name(), "Dana Smith");
    }

    #[test]
    fn user_display_name_falls_back_to_username() {
        let user = User {
            id: "u-2".to_string(),
            username: "pat".to_string(),
            full_name: Some(String::new()),
            email: String::new(),
            role: Role::Patient,
        };
        assert_eq!(user.display_name(), "pat");
    }

    // ── Entities ─────────────────────────────────────────────────────────────

    #[test]
    fn disease_default_label() {
        let d = DiseaseEntity::new("asthma");
        assert_eq!(d.display_label(), "DISEASE");
        let d = d.with_label("CONDITION");
        assert_eq!(d.display_label(), "CONDITION");
    }

    #[test]
    fn lab_default_label_when_name_empty() {
        assert_eq!(LabMatch::new("").display_label(), "LAB");
        assert_eq!(LabMatch::new("HbA1c").display_label(), "HbA1c");
    }

    #[test]
    fn lab_serializes_value_under_value_extracted() {
        let lab = LabMatch::new("Glucose").with_value("140 mg/dL");
        let v = serde_json::to_value(&lab).unwrap();
        assert_eq!(v["value_extracted"], json!("140 mg/dL"));
        assert!(v.get("unit").is_none());
    }

    #[test]
    fn category_css_classes() {
        assert_eq!(Category::Disease.css_class(), "highlight-disease");
        assert_eq!(Category::Lab.css_class(), "highlight-lab");
    }

    #[test]
    fn unresolved_sentinel_is_not_resolved() {
        assert!(!SpanRange::UNRESOLVED.is_resolved());
        assert!(SpanRange::new(3, 7).is_resolved());
        assert_eq!(SpanRange::new(3, 7).len(), 4);
    }

    // ── NormalizedDocument ───────────────────────────────────────────────────

    #[test]
    fn normalized_document_uses_camel_case_source_text() {
        let doc = NormalizedDocument {
            source_text: "abc".to_string(),
            ..NormalizedDocument::default()
        };
        let v = serde_json::to_value(&doc).unwrap();
        assert_eq!(v["sourceText"], json!("abc"));
    }

    #[test]
    fn original_filename_ignores_empty_value() {
        let mut doc = NormalizedDocument::default();
        assert_eq!(doc.original_filename(), None);
        doc.metadata
            .insert("original_filename".to_string(), "labs.pdf".to_string());
        assert_eq!(doc.original_filename(), Some("labs.pdf"));
    }

    // ── ApiResponse ──────────────────────────────────────────────────────────

    #[test]
    fn api_response_success_range() {
        assert!(ApiResponse::new(200, "").is_success());
        assert!(ApiResponse::new(204, "").is_success());
        assert!(!ApiResponse::new(401, "").is_success());
        assert!(!ApiResponse::new(500, "").is_success());
    }

    // ── MedlensError display messages ────────────────────────────────────────

    #[test]
    fn error_http_display_carries_status_and_body() {
        let err = MedlensError::Http {
            status: 422,
            body: "text field required".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 422: text field required");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn error_validation_display() {
        let err = MedlensError::Validation {
            field: "username".to_string(),
            reason: "Username is required".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("username"));
        assert!(msg.contains("Username is required"));
        assert_eq!(err.status(), None);
    }

    #[test]
    fn error_forbidden_display() {
        let err = MedlensError::Forbidden {
            role: "patient".to_string(),
        };
        assert!(err.to_string().contains("patient"));
    }
}
