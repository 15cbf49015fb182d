use login_core::Input;

/// Things the view model needs to hear about as a result of user input.
#[derive(Debug, PartialEq, Eq)]
pub enum Effect {
    /// The username field changed
    UserName(String),

    /// The password field changed
    Password(String),

    /// Try to sign in with whatever is in the fields
    SignIn,
}

impl Effect {
    /// Forward this effect to the view model.
    pub fn run(self, input: &Input) {
        match self {
            Self::UserName(text) => input.user_name(text),
            Self::Password(text) => input.password(text),
            Self::SignIn => {
                tracing::debug!("sign in requested");
                input.sign_in_did_tap();
            }
        }
    }
}
