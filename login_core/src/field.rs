use core::fmt::{self, Debug, Formatter};
use tokio::sync::watch;

/// A check that a field's text has to pass before we'll try to sign in.
pub trait Rule: Send + Sync + 'static {
    /// `Ok` if the value is acceptable, otherwise a message to show next to
    /// the field.
    ///
    /// ## Errors
    ///
    /// A human-readable explanation of what's wrong with `value`.
    fn check(&self, value: &str) -> Result<(), String>;
}

/// Usernames just have to have something in them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Username;

impl Rule for Username {
    fn check(&self, value: &str) -> Result<(), String> {
        if value.trim().is_empty() {
            Err("Please enter your username".to_string())
        } else {
            Ok(())
        }
    }
}

/// Passwords have to be at least `min_len` characters long.
#[derive(Debug, Clone, Copy)]
pub struct Password {
    /// Fewest characters we'll accept.
    pub min_len: usize,
}

impl Default for Password {
    fn default() -> Self {
        Self { min_len: 6 }
    }
}

impl Rule for Password {
    fn check(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Err("Please enter your password".to_string())
        } else if value.chars().count() < self.min_len {
            Err(format!(
                "Password must be at least {} characters",
                self.min_len
            ))
        } else {
            Ok(())
        }
    }
}

/// One text field: its live value, the rule it has to pass, and whatever the
/// rule said the last time we asked.
pub struct FieldValidator {
    /// Current text. Subscribers always see the latest value.
    value: watch::Sender<String>,

    /// What makes the text acceptable.
    rule: Box<dyn Rule>,

    /// Set by `validate`. `None` until the first validation, and after any
    /// validation that passed.
    error: Option<String>,
}

impl FieldValidator {
    /// Create an empty field checked by `rule`.
    pub fn new(rule: impl Rule) -> Self {
        let (value, _) = watch::channel(String::new());

        Self {
            value,
            rule: Box::new(rule),
            error: None,
        }
    }

    /// Replace the field's text.
    pub fn set_value(&self, text: impl Into<String>) {
        self.value.send_replace(text.into());
    }

    /// A copy of the field's current text.
    pub fn value(&self) -> String {
        self.value.borrow().clone()
    }

    /// Follow the field's text as it changes. The receiver starts out holding
    /// the current value.
    pub fn watch(&self) -> watch::Receiver<String> {
        self.value.subscribe()
    }

    /// Check the current text against the rule, remembering the message if it
    /// fails and forgetting any old one if it passes.
    pub fn validate(&mut self) -> bool {
        let checked = self.rule.check(&self.value.borrow());

        match checked {
            Ok(()) => {
                self.error = None;
                true
            }
            Err(message) => {
                self.error = Some(message);
                false
            }
        }
    }

    /// What the rule said last time `validate` failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Debug for FieldValidator {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::proptest;

    #[test]
    fn no_message_before_validating() {
        let field = FieldValidator::new(Username);

        assert_eq!(field.error_message(), None);
    }

    #[test]
    fn failing_validation_sets_message() {
        let mut field = FieldValidator::new(Username);

        assert!(!field.validate());
        assert_eq!(field.error_message(), Some("Please enter your username"));
    }

    #[test]
    fn passing_validation_clears_message() {
        let mut field = FieldValidator::new(Username);
        field.validate();

        field.set_value("alice");

        assert!(field.validate());
        assert_eq!(field.error_message(), None);
    }

    #[test]
    fn setting_value_does_not_revalidate() {
        let mut field = FieldValidator::new(Username);
        field.validate();

        field.set_value("alice");

        assert_eq!(field.error_message(), Some("Please enter your username"));
    }

    #[test]
    fn short_password_says_how_long() {
        let mut field = FieldValidator::new(Password { min_len: 8 });
        field.set_value("abc");

        assert!(!field.validate());
        assert_eq!(
            field.error_message(),
            Some("Password must be at least 8 characters")
        );
    }

    #[test]
    fn empty_password_asks_for_one() {
        let mut field = FieldValidator::new(Password::default());

        assert!(!field.validate());
        assert_eq!(field.error_message(), Some("Please enter your password"));
    }

    #[test]
    fn watchers_see_latest_value() {
        let field = FieldValidator::new(Username);
        let mut watcher = field.watch();

        field.set_value("a");
        field.set_value("al");

        assert!(watcher.has_changed().unwrap());
        assert_eq!(*watcher.borrow_and_update(), "al");
        assert!(!watcher.has_changed().unwrap());
    }

    #[test]
    fn late_watchers_start_with_current_value() {
        let field = FieldValidator::new(Username);
        field.set_value("alice");

        let watcher = field.watch();

        assert_eq!(*watcher.borrow(), "alice");
    }

    proptest! {
        #[test]
        fn usernames_with_content_pass(name in "\\s*\\S+\\s*") {
            assert!(Username.check(&name).is_ok());
        }

        #[test]
        fn blank_usernames_fail(name in "\\s*") {
            assert!(Username.check(&name).is_err());
        }

        #[test]
        fn password_length_decides(password in "\\PC{0,20}", min_len in 1usize..12) {
            let rule = Password { min_len };

            assert_eq!(
                rule.check(&password).is_ok(),
                password.chars().count() >= min_len
            );
        }
    }
}
