// --- File: crates/slotbook_booking/src/auth.rs ---

use axum::{
    body::Body as AxumBody,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use constant_time_eq::constant_time_eq;
use slotbook_common::error::SlotbookError;
use slotbook_config::AdminConfig;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::logic::MSG_INVALID_CREDENTIALS;

const BASIC_PREFIX: &str = "Basic ";

/// Operations behind the admin gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    Export,
    Clear,
}

impl AdminAction {
    pub fn dialog_title(&self) -> &'static str {
        match self {
            AdminAction::Export => "Authenticate to export",
            AdminAction::Clear => "Authenticate to clear bookings",
        }
    }
}

/// A username / password pair as typed by an operator.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl AdminCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value for an `Authorization` header.
    pub fn basic_header(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("{}{}", BASIC_PREFIX, token)
    }

    /// Reads `Authorization: Basic ...`. The password may itself contain `:`.
    pub fn from_basic_header(value: &str) -> Option<Self> {
        let token = value.strip_prefix(BASIC_PREFIX)?.trim();
        let decoded = STANDARD.decode(token).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some(Self::new(username, password))
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(Self::from_basic_header)
    }
}

/// Compares presented credentials with the configured pair.
#[derive(Clone)]
pub struct AdminGate {
    expected: AdminCredentials,
}

impl AdminGate {
    pub fn new(expected: AdminCredentials) -> Self {
        Self { expected }
    }

    pub fn from_config(admin: &AdminConfig) -> Self {
        Self::new(AdminCredentials::new(&admin.username, &admin.password))
    }

    /// Both fields must match exactly. Both comparisons always run.
    pub fn verify(&self, presented: &AdminCredentials) -> bool {
        let username_ok = constant_time_eq(
            presented.username.as_bytes(),
            self.expected.username.as_bytes(),
        );
        let password_ok = constant_time_eq(
            presented.password.as_bytes(),
            self.expected.password.as_bytes(),
        );
        username_ok & password_ok
    }
}

fn unauthorized_response() -> Response {
    let mut response = SlotbookError::AuthError(MSG_INVALID_CREDENTIALS.to_string()).into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"slotbook-admin\""),
    );
    response
}

/// Axum middleware guarding the `/admin` routes with HTTP Basic credentials.
pub async fn admin_auth_middleware(
    State(gate): State<Arc<AdminGate>>,
    req: Request<AxumBody>,
    next: Next,
) -> Response {
    match AdminCredentials::from_headers(req.headers()) {
        Some(credentials) if gate.verify(&credentials) => {
            info!(path = %req.uri().path(), "Admin request authenticated");
            next.run(req).await
        }
        Some(_) => {
            warn!(path = %req.uri().path(), "Admin request with invalid credentials");
            unauthorized_response()
        }
        None => {
            warn!(path = %req.uri().path(), "Admin request without Basic credentials");
            unauthorized_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> AdminGate {
        AdminGate::from_config(&AdminConfig::default())
    }

    #[test]
    fn default_credentials_are_accepted() {
        assert!(gate().verify(&AdminCredentials::new("admin", "Dgp@2025")));
    }

    #[test]
    fn any_mismatch_is_rejected() {
        let gate = gate();
        assert!(!gate.verify(&AdminCredentials::new("admin", "dgp@2025")));
        assert!(!gate.verify(&AdminCredentials::new("Admin", "Dgp@2025")));
        assert!(!gate.verify(&AdminCredentials::new("admin", "")));
        assert!(!gate.verify(&AdminCredentials::new("", "")));
        assert!(!gate.verify(&AdminCredentials::new(" admin", "Dgp@2025")));
    }

    #[test]
    fn basic_header_round_trip_keeps_colons_in_password() {
        let credentials = AdminCredentials::new("admin", "a:b:c");
        let header = credentials.basic_header();
        assert!(header.starts_with("Basic "));
        assert_eq!(AdminCredentials::from_basic_header(&header), Some(credentials));
    }

    #[test]
    fn malformed_headers_are_ignored() {
        assert_eq!(AdminCredentials::from_basic_header("Bearer abc"), None);
        assert_eq!(AdminCredentials::from_basic_header("Basic !!!"), None);
        // "nocolon" base64 encoded
        assert_eq!(AdminCredentials::from_basic_header("Basic bm9jb2xvbg=="), None);
    }

    #[test]
    fn debug_output_hides_password() {
        let rendered = format!("{:?}", AdminCredentials::new("admin", "Dgp@2025"));
        assert!(!rendered.contains("Dgp@2025"));
    }

    #[test]
    fn dialog_titles() {
        assert_eq!(AdminAction::Export.dialog_title(), "Authenticate to export");
        assert_eq!(AdminAction::Clear.dialog_title(), "Authenticate to clear bookings");
    }
}
