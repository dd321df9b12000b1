use crate::{ApiErrorBody, ProfileUpdate, RegisterPayload};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Per-field messages for the registration form. Empty means the form may
/// be submitted; populated fields block submission and never reach the
/// network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterErrors {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
    pub non_field: Option<String>,
}

impl RegisterErrors {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password.is_none()
            && self.password_confirm.is_none()
            && self.non_field.is_none()
    }

    /// Overlay server-side field errors onto the form after a rejected
    /// submit. Unknown fields fall through to the non-field message.
    pub fn apply_server_errors(&mut self, body: &ApiErrorBody) {
        if let Some(message) = body.field_message("username") {
            self.username = Some(message);
        }
        if let Some(message) = body.field_message("email") {
            self.email = Some(message);
        }
        if let Some(message) = body.field_message("password") {
            self.password = Some(message);
        }
        if let Some(message) = body.field_message("non_field_errors") {
            self.non_field = Some(message);
        }
        if self.is_empty() {
            self.non_field = Some(body.summary().to_string());
        }
    }
}

pub fn validate_registration(payload: &RegisterPayload) -> RegisterErrors {
    let mut errors = RegisterErrors::default();

    if payload.username.trim().is_empty() {
        errors.username = Some("Username is required".to_string());
    }

    if !plausible_email(&payload.email) {
        errors.email = Some("Invalid email address".to_string());
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        errors.password = Some(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }

    if payload.password != payload.password_confirm {
        errors.password_confirm = Some("Passwords do not match".to_string());
    }

    errors
}

/// Shallow shape check: something before the `@`, a dot somewhere in the
/// domain, no whitespace. Real validation belongs to the backend.
pub fn plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

/// Profile edits reuse the email rule; names and bio are free-form.
pub fn validate_profile(update: &ProfileUpdate) -> Option<String> {
    match update.email.as_deref() {
        Some(email) if !plausible_email(email) => Some("Invalid email address".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod validate_tests {
    use super::*;

    fn payload() -> RegisterPayload {
        RegisterPayload {
            username: "dana".to_string(),
            email: "dana@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            password: "correct horse".to_string(),
            password_confirm: "correct horse".to_string(),
        }
    }

    #[test]
    fn a_complete_payload_passes() {
        assert!(validate_registration(&payload()).is_empty());
    }

    #[test]
    fn blank_username_is_required() {
        let mut bad = payload();
        bad.username = "   ".to_string();
        let errors = validate_registration(&bad);
        assert_eq!(errors.username.as_deref(), Some("Username is required"));
    }

    #[test]
    fn short_passwords_are_rejected() {
        let mut bad = payload();
        bad.password = "short".to_string();
        bad.password_confirm = "short".to_string();
        let errors = validate_registration(&bad);
        assert_eq!(
            errors.password.as_deref(),
            Some("Password must be at least 8 characters")
        );
        assert!(errors.password_confirm.is_none());
    }

    #[test]
    fn mismatched_confirmation_is_flagged() {
        let mut bad = payload();
        bad.password_confirm = "different horse".to_string();
        let errors = validate_registration(&bad);
        assert_eq!(
            errors.password_confirm.as_deref(),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn email_shapes() {
        assert!(plausible_email("a@b.co"));
        assert!(plausible_email(" padded@example.com "));
        assert!(!plausible_email("no-at-sign"));
        assert!(!plausible_email("@example.com"));
        assert!(!plausible_email("a@"));
        assert!(!plausible_email("a@nodot"));
        assert!(!plausible_email("a b@example.com"));
        assert!(!plausible_email("a@example.c"));
    }

    #[test]
    fn server_field_errors_land_on_their_fields() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"username": ["A user with that username already exists."],
                "email": ["Enter a valid email address."]}"#,
        )
        .expect("server error body");

        let mut errors = RegisterErrors::default();
        errors.apply_server_errors(&body);
        assert_eq!(
            errors.username.as_deref(),
            Some("A user with that username already exists.")
        );
        assert_eq!(errors.email.as_deref(), Some("Enter a valid email address."));
        assert!(errors.non_field.is_none());
    }

    #[test]
    fn unrecognized_server_errors_become_the_non_field_message() {
        let body = ApiErrorBody::from_message("Registration failed");
        let mut errors = RegisterErrors::default();
        errors.apply_server_errors(&body);
        assert_eq!(errors.non_field.as_deref(), Some("Registration failed"));
    }
}
