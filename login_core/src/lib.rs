//! Presentation logic for a login screen, shared by every front end. Views
//! push keystrokes and taps into a `LoginViewModel` and render the signals it
//! publishes.

/// Checking credentials with whoever is in charge of them.
pub mod auth;
pub use auth::{Authenticator, Credentials, User};

/// A single text field and the rule it has to pass.
pub mod field;
pub use field::{FieldValidator, Password, Rule, Username};

/// Signing in over HTTP.
pub mod http;
pub use http::HttpAuthenticator;

/// What a finished sign-in means for the view.
pub mod outcome;
pub use outcome::Outcome;

/// Live values with any number of subscribers.
pub mod signal;
pub use signal::Signal;

/// Per-field validation results.
pub mod validation;
pub use validation::ValidationErrors;

/// The view model itself.
pub mod view_model;
pub use view_model::{Input, LoginViewModel, Output};
