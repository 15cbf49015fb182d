use crate::field::FieldValidator;

/// What validation said about each field on one sign-in attempt. Fields that
/// passed have no message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Why the username was rejected, if it was.
    pub username: Option<String>,

    /// Why the password was rejected, if it was.
    pub password: Option<String>,
}

impl ValidationErrors {
    /// Validate both fields and collect their messages. Both fields are
    /// always validated, even if the first one fails, so the view can show
    /// every problem at once.
    pub fn check(username: &mut FieldValidator, password: &mut FieldValidator) -> Self {
        let username_ok = username.validate();
        let password_ok = password.validate();

        Self {
            username: message_unless(username_ok, username),
            password: message_unless(password_ok, password),
        }
    }

    /// Did every field pass?
    pub fn is_valid(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

fn message_unless(ok: bool, field: &FieldValidator) -> Option<String> {
    if ok {
        None
    } else {
        Some(field.error_message().unwrap_or_default().to_string())
    }
}
