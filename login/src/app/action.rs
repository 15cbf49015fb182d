use crossterm::event::KeyEvent;
use login_core::{User, ValidationErrors};

/// Things that can happen to this app
#[derive(Debug)]
pub enum Action {
    /// The user did something on the keyboard
    Key(KeyEvent),

    /// A sign-in call started (`true`) or finished (`false`)
    Loading(bool),

    /// The server let us in
    LoggedIn(User),

    /// The server turned us away, or we couldn't reach it
    ServerError(String),

    /// The fields were checked after a tap on "sign in"
    Validated(ValidationErrors),

    /// Something bad happened; display it to the user
    Problem(String),
}
