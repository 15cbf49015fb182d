use crate::auth::{Authenticator, Credentials, User};
use crate::field::{FieldValidator, Password, Username};
use crate::outcome::Outcome;
use crate::signal::Signal;
use crate::validation::ValidationErrors;
use std::{collections::HashMap, sync::Arc};
use tokio::{
    sync::{
        broadcast,
        mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    },
    task::{self, JoinHandle, JoinSet},
};

/// Where the view sends what the user did. Cloning is cheap; every clone feeds
/// the same view model.
#[derive(Debug, Clone)]
pub struct Input {
    tx: UnboundedSender<Action>,
}

impl Input {
    /// The username field now contains `text`.
    pub fn user_name(&self, text: impl Into<String>) {
        self.send(Action::UserName(text.into()));
    }

    /// The password field now contains `text`.
    pub fn password(&self, text: impl Into<String>) {
        self.send(Action::Password(text.into()));
    }

    /// The user asked to sign in.
    pub fn sign_in_did_tap(&self) {
        self.send(Action::SignInDidTap);
    }

    fn send(&self, action: Action) {
        // If the pipeline is gone, the view model was torn down and there's
        // nobody left to care.
        if self.tx.send(action).is_err() {
            tracing::debug!("view model is gone; dropping input");
        }
    }
}

/// What the view can listen to. Every signal supports any number of
/// subscribers, who see values published after they subscribe. A subscriber
/// that falls too far behind gets `RecvError::Lagged` and misses values; use
/// `loading_now` to get back in sync with the loading flag.
#[derive(Debug, Clone, Default)]
pub struct Output {
    is_loading: Signal<bool>,
    login_result: Signal<User>,
    server_error: Signal<String>,
    validation_errors: Signal<ValidationErrors>,
}

impl Output {
    /// `true` when a sign-in call starts, `false` when it finishes.
    pub fn is_loading(&self) -> broadcast::Receiver<bool> {
        self.is_loading.subscribe()
    }

    /// Whether a sign-in call is in flight right now.
    pub fn loading_now(&self) -> bool {
        self.is_loading.latest().unwrap_or(false)
    }

    /// The user record, whenever the server accepts the credentials.
    pub fn login_result(&self) -> broadcast::Receiver<User> {
        self.login_result.subscribe()
    }

    /// Something to show the user when the server turns them away or can't be
    /// reached.
    pub fn server_error(&self) -> broadcast::Receiver<String> {
        self.server_error.subscribe()
    }

    /// Per-field validation results, once for every tap on "sign in".
    pub fn validation_errors(&self) -> broadcast::Receiver<ValidationErrors> {
        self.validation_errors.subscribe()
    }
}

/// Presentation logic for a login screen. Feed it keystrokes and taps through
/// `input`, render what comes out of `output`.
///
/// Everything runs in one background task, one event at a time. Dropping the
/// view model stops that task and abandons any sign-in in flight; nothing is
/// published after that.
#[derive(Debug)]
pub struct LoginViewModel {
    input: Input,
    output: Output,
    pipeline: JoinHandle<()>,
}

impl LoginViewModel {
    /// Create a view model with the standard username and password rules.
    ///
    /// ## Panics
    ///
    /// If called outside of a tokio runtime.
    pub fn new<A: Authenticator>(authenticator: A) -> Self {
        Self::with_fields(
            authenticator,
            FieldValidator::new(Username),
            FieldValidator::new(Password::default()),
        )
    }

    /// Create a view model with custom fields, e.g. for different password
    /// requirements.
    ///
    /// ## Panics
    ///
    /// If called outside of a tokio runtime.
    pub fn with_fields<A: Authenticator>(
        authenticator: A,
        username: FieldValidator,
        password: FieldValidator,
    ) -> Self {
        let (tx, rx) = unbounded_channel();
        let output = Output::default();
        let core = Core::new(username, password, output.clone());

        let pipeline = tokio::spawn(run(core, Arc::new(authenticator), rx));

        Self {
            input: Input { tx },
            output,
            pipeline,
        }
    }

    /// Where the view sends user input.
    pub fn input(&self) -> &Input {
        &self.input
    }

    /// What the view renders.
    pub fn output(&self) -> &Output {
        &self.output
    }
}

impl Drop for LoginViewModel {
    fn drop(&mut self) {
        self.pipeline.abort();
    }
}

/// Things that can happen to the pipeline
#[derive(Debug)]
enum Action {
    /// New text in the username field
    UserName(String),

    /// New text in the password field
    Password(String),

    /// The user tapped "sign in"
    SignInDidTap,

    /// A sign-in call finished
    SignInFinished { attempt: u64, outcome: Outcome },
}

/// Work the pipeline needs done outside of `Core::handle`.
#[derive(Debug, PartialEq, Eq)]
enum Effect {
    /// Call the authenticator. The result comes back as
    /// `Action::SignInFinished` with the same `attempt`.
    SignIn {
        attempt: u64,
        credentials: Credentials,
    },
}

/// The synchronous heart of the view model: field state, the attempt counter,
/// and what to publish when.
#[derive(Debug)]
struct Core {
    username: FieldValidator,
    password: FieldValidator,

    /// Bumped on every valid tap. Only results for the latest attempt get
    /// published.
    attempt: u64,

    /// The attempt we're waiting on, if any.
    pending: Option<u64>,

    output: Output,
}

impl Core {
    fn new(username: FieldValidator, password: FieldValidator, output: Output) -> Self {
        Self {
            username,
            password,
            attempt: 0,
            pending: None,
            output,
        }
    }

    /// Handle an `Action`, publishing whatever it causes and returning any
    /// sign-in that should start.
    fn handle(&mut self, action: Action) -> Option<Effect> {
        match action {
            Action::UserName(text) => {
                self.username.set_value(text);

                None
            }

            Action::Password(text) => {
                self.password.set_value(text);

                None
            }

            Action::SignInDidTap => {
                let errors = ValidationErrors::check(&mut self.username, &mut self.password);
                let valid = errors.is_valid();
                self.output.validation_errors.publish(errors);

                if !valid {
                    tracing::debug!("not signing in; fields did not validate");
                    return None;
                }

                if let Some(superseded) = self.pending {
                    tracing::debug!(superseded, "superseding sign-in in flight");
                }

                self.attempt += 1;
                self.pending = Some(self.attempt);

                let credentials = Credentials {
                    username: self.username.value(),
                    password: self.password.value(),
                };

                self.output.is_loading.publish(true);

                Some(Effect::SignIn {
                    attempt: self.attempt,
                    credentials,
                })
            }

            Action::SignInFinished { attempt, outcome } => {
                if self.pending != Some(attempt) {
                    tracing::warn!(attempt, current = self.attempt, "dropping stale sign-in result");
                    return None;
                }

                self.pending = None;
                self.output.is_loading.publish(false);

                match outcome {
                    Outcome::LoggedIn(user) => {
                        tracing::info!(attempt, "signed in");
                        self.output.login_result.publish(user);
                    }
                    Outcome::Rejected(message) | Outcome::Failed(message) => {
                        tracing::info!(attempt, %message, "sign-in did not succeed");
                        self.output.server_error.publish(message);
                    }
                }

                None
            }
        }
    }
}

/// Drive a `Core` until every `Input` is gone (or the task is aborted.)
async fn run<A: Authenticator>(
    mut core: Core,
    authenticator: Arc<A>,
    mut input_rx: UnboundedReceiver<Action>,
) {
    // Sign-in calls run in their own tasks so that keystrokes and taps keep
    // flowing while we wait on the network. Dropping the set (including when
    // this task is aborted) aborts whatever is still running.
    let mut in_flight = JoinSet::new();

    // Which attempt each task is working on, so a task that panics can still
    // finish its attempt.
    let mut attempts: HashMap<task::Id, u64> = HashMap::new();

    loop {
        let action = tokio::select! {
            action_opt = input_rx.recv() => match action_opt {
                Some(action) => action,
                None => break,
            },

            Some(joined) = in_flight.join_next_with_id() => match joined {
                Ok((id, finished)) => {
                    attempts.remove(&id);
                    finished
                }
                Err(err) => {
                    let attempt = attempts.remove(&err.id());

                    match attempt {
                        Some(attempt) if err.is_panic() => {
                            tracing::error!(?err, attempt, "sign-in task panicked");

                            Action::SignInFinished {
                                attempt,
                                outcome: Outcome::Failed(err.to_string()),
                            }
                        }
                        _ => continue,
                    }
                }
            },
        };

        if let Some(Effect::SignIn {
            attempt,
            credentials,
        }) = core.handle(action)
        {
            // Whatever was in flight can't be published anymore, so there's
            // no point letting it finish.
            in_flight.abort_all();

            let handle = in_flight.spawn(sign_in(Arc::clone(&authenticator), attempt, credentials));
            attempts.insert(handle.id(), attempt);
        }
    }

    tracing::debug!("all inputs dropped; stopping pipeline");
}

/// Call the authenticator and wrap the outcome up for the pipeline.
async fn sign_in<A: Authenticator>(
    authenticator: Arc<A>,
    attempt: u64,
    credentials: Credentials,
) -> Action {
    tracing::info!(attempt, username = %credentials.username, "signing in");

    let outcome = Outcome::from_result(authenticator.sign_in(&credentials).await);

    Action::SignInFinished { attempt, outcome }
}
