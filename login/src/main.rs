//! Sign in to a server from the terminal

/// The "functional core" to the main module's "imperative shell"
mod app;

/// Configuration and argument parsing
mod config;

/// Tab-through form fields
mod form_fields;

use app::{Action, App};
use clap::Parser;
use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use login_core::{FieldValidator, HttpAuthenticator, LoginViewModel, Password, Username};
use ratatui::DefaultTerminal;
use std::{fs, io, process::ExitCode};
use tokio::sync::broadcast::error::RecvError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> io::Result<ExitCode> {
    let config = config::Config::parse();

    // The terminal belongs to the UI, so logs go to a file instead.
    let _log_guard = init_tracing(&config)?;

    let view_model = LoginViewModel::with_fields(
        HttpAuthenticator::new(config.server.clone()),
        FieldValidator::new(Username),
        FieldValidator::new(Password {
            min_len: config.min_password_length,
        }),
    );
    tracing::info!(server = %config.server, "starting");

    let mut terminal = ratatui::init();
    terminal.clear()?;
    let res = run(terminal, &view_model).await;
    ratatui::restore();
    res
}

/// Send logs to `login.log` in the data directory, filtered by `RUST_LOG`
/// (default `info`.) Logs are flushed when the returned guard is dropped.
fn init_tracing(config: &config::Config) -> io::Result<WorkerGuard> {
    let dir = config.data_dir();
    fs::create_dir_all(&dir)?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &dir,
        "login.log",
    ));

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}

/// Manage the lifecycle of the app
async fn run(mut terminal: DefaultTerminal, view_model: &LoginViewModel) -> io::Result<ExitCode> {
    let mut app = App::new();

    // Subscribe before anything can happen so we don't miss the first values.
    let output = view_model.output();
    let mut is_loading = output.is_loading();
    let mut login_result = output.login_result();
    let mut server_error = output.server_error();
    let mut validation_errors = output.validation_errors();

    terminal.draw(|frame| app.render(frame))?;

    let mut event_stream = EventStream::new();

    // Start our event loop!
    loop {
        // Wait for either keyboard input or something from the view model.
        // This is an `Option<_>` because we don't need to pay attention to
        // every single piece of external input.
        let next_action_opt = tokio::select! {
            event_opt = event_stream.next() => {
                match event_opt {
                    Some(Ok(Event::Key(key_event))) => Some(Action::Key(key_event)),
                    Some(Err(err)) => Some(Action::Problem(err.to_string())),
                    _ => None,
                }
            },

            loading = is_loading.recv() => match loading {
                // We missed some flips of the loading flag; catch up on where
                // it stands now.
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "fell behind on loading state");
                    Some(Action::Loading(output.loading_now()))
                }
                other => received(other, Action::Loading),
            },

            user = login_result.recv() => received(user, Action::LoggedIn),

            message = server_error.recv() => received(message, Action::ServerError),

            errors = validation_errors.recv() => received(errors, Action::Validated),
        };

        // Anything the app wants to tell the view model goes straight to its
        // inputs; results come back around through the signals above.
        if let Some(action) = next_action_opt {
            for effect in app.handle(action) {
                effect.run(view_model.input());
            }
        }

        terminal.draw(|frame| app.render(frame))?;

        if let Some(code) = app.should_exit() {
            return Ok(code);
        }
    }
}

/// Turn a value from one of the view model's signals into an `Action`.
fn received<T>(res: Result<T, RecvError>, wrap: impl FnOnce(T) -> Action) -> Option<Action> {
    match res {
        Ok(value) => Some(wrap(value)),
        Err(RecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "fell behind the view model");
            None
        }
        Err(RecvError::Closed) => Some(Action::Problem("The view model stopped".to_string())),
    }
}
