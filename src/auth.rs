use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    Manager,
    Employee,
}

impl UserRole {
    pub fn label(self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Employee => "employee",
        }
    }
}

/// Immutable session context, decoded once at login. The token is never
/// re-read or re-decoded after this value exists.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub role: UserRole,
    pub employee_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    employee_id: Option<u64>,
    #[serde(default)]
    sub: Option<String>,
}

impl Session {
    /// Decodes the claims segment of a JWT-shaped bearer token. No signature
    /// verification happens here; the backend rejects forged tokens on every
    /// call. A token that does not decode is a malformed credential.
    pub fn from_token(token: &str) -> Result<Self, String> {
        let token = token.trim();
        if token.is_empty() {
            return Err("Empty token".to_string());
        }

        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next()) {
            (Some(_), Some(payload)) => payload,
            _ => return Err("Malformed token: expected header.payload.signature".to_string()),
        };

        let decoded = URL_SAFE_NO_PAD
            .decode(payload.as_bytes())
            .map_err(|_| "Malformed token: payload is not base64url".to_string())?;
        let claims: Claims = serde_json::from_slice(&decoded)
            .map_err(|_| "Malformed token: payload is not valid JSON".to_string())?;

        let role = match claims.role.as_deref() {
            Some("admin") => UserRole::Admin,
            Some("manager") => UserRole::Manager,
            Some("employee") | None => UserRole::Employee,
            Some(other) => return Err(format!("Unknown role '{other}' in token")),
        };

        let employee_id = claims
            .employee_id
            .or_else(|| claims.sub.as_deref().and_then(|sub| sub.parse().ok()));

        Ok(Session {
            token: token.to_string(),
            role,
            employee_id,
        })
    }

    pub fn can_manage_projects(&self) -> bool {
        matches!(self.role, UserRole::Admin | UserRole::Manager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_with_claims(claims: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(b"{\"alg\":\"HS256\"}");
        let payload = URL_SAFE_NO_PAD.encode(claims.as_bytes());
        format!("{header}.{payload}.sig")
    }

    #[test]
    fn decodes_role_and_employee_id() {
        let token = token_with_claims(r#"{"role":"manager","employee_id":42}"#);
        let session = Session::from_token(&token).unwrap();
        assert_eq!(session.role, UserRole::Manager);
        assert_eq!(session.employee_id, Some(42));
        assert!(session.can_manage_projects());
    }

    #[test]
    fn missing_role_defaults_to_employee() {
        let token = token_with_claims(r#"{"sub":"7"}"#);
        let session = Session::from_token(&token).unwrap();
        assert_eq!(session.role, UserRole::Employee);
        assert_eq!(session.employee_id, Some(7));
        assert!(!session.can_manage_projects());
    }

    #[test]
    fn rejects_unknown_role() {
        let token = token_with_claims(r#"{"role":"superuser"}"#);
        assert!(Session::from_token(&token).is_err());
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert!(Session::from_token("").is_err());
        assert!(Session::from_token("not-a-jwt").is_err());
        assert!(Session::from_token("a.!!!.c").is_err());
    }
}
