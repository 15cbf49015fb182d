use crate::auth::User;
use core::fmt::Display;

/// How a finished sign-in attempt turned out, from the view's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The server accepted the credentials and gave us a token.
    LoggedIn(User),

    /// The server answered but didn't give us a token. Holds the server's
    /// message, or an empty string if it didn't send one.
    Rejected(String),

    /// We never got an answer. Holds the failure's description.
    Failed(String),
}

impl Outcome {
    /// Sort the result of `Authenticator::sign_in` into an outcome. A user
    /// record without a token counts as a rejection even though the call
    /// itself succeeded.
    pub fn from_result<E: Display>(result: Result<User, E>) -> Self {
        match result {
            Ok(user) if user.token().is_some() => Self::LoggedIn(user),
            Ok(user) => Self::Rejected(user.message.unwrap_or_default()),
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}
