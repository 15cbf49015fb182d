use core::fmt::{self, Debug, Display, Formatter};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// What we send to an `Authenticator` when someone taps "sign in".
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    /// Who is signing in?
    pub username: String,

    /// Plaintext password. Never shows up in `Debug` output.
    pub password: String,
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The user record an `Authenticator` hands back. A record only means we're
/// signed in if it carries a token; otherwise `message` says why not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    /// Auth token to use for future requests.
    #[serde(default)]
    pub token: Option<String>,

    /// Human-readable explanation, usually present when `token` is not.
    #[serde(default)]
    pub message: Option<String>,

    /// Display name, if the server knows one.
    #[serde(default)]
    pub name: Option<String>,

    /// Contact email, if the server knows one.
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// The token, if there is a non-empty one.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Something that can check credentials. The view model doesn't care whether
/// this goes over the network or is a fake in a test.
pub trait Authenticator: Send + Sync + 'static {
    /// Whatever can go wrong before we get a user record back. The `Display`
    /// text is shown to the user as-is.
    type Error: Display + Send + 'static;

    /// Try to sign in. Resolves exactly once.
    fn sign_in(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<User, Self::Error>> + Send;
}
