/// Things that can happen to this app
mod action;
pub use action::Action;

/// The username/password form
mod auth_form;
use auth_form::AuthForm;

/// What the app asks the view model to do
mod effect;
pub use effect::Effect;

use crossterm::event::{KeyCode, KeyEventKind};
use login_core::{User, ValidationErrors};
use ratatui::{
    layout::{Constraint, Layout},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};
use std::process::ExitCode;

/// The "functional core" of the app.
#[derive(Debug, Default)]
pub struct App {
    /// What the user has typed so far
    form: AuthForm,

    /// Are we waiting to hear back from the server?
    loading: bool,

    /// What validation said after the last tap on "sign in"
    validation: ValidationErrors,

    /// Why the last sign-in didn't work, if it didn't
    server_error: Option<String>,

    /// Who we're signed in as, once we are
    signed_in: Option<User>,

    /// Status to display (visible at the bottom of the screen)
    status_line: Option<String>,

    /// Set once the user asks to leave
    exiting: bool,
}

impl App {
    /// Create a new instance of the app
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the app's UI to the screen
    pub fn render(&self, frame: &mut Frame) {
        let vertical = Layout::vertical([Constraint::Min(0), Constraint::Length(1)]);
        let [body_area, status_area] = vertical.areas(frame.area());

        self.form
            .render(body_area, frame, &self.validation, self.form_status());

        let status = Paragraph::new(match &self.status_line {
            Some(line) => line.as_str(),
            None => "tab: switch field · enter: sign in · esc: quit",
        });

        frame.render_widget(status, status_area);
    }

    /// The line under the form: what's going on with signing in.
    fn form_status(&self) -> Line<'_> {
        if self.loading {
            Line::styled("Signing in…", Style::default().fg(Color::Yellow))
        } else if let Some(message) = &self.server_error {
            Line::styled(message.as_str(), Style::default().fg(Color::Red))
        } else if let Some(user) = &self.signed_in {
            let who = user
                .name
                .as_deref()
                .or(user.email.as_deref())
                .unwrap_or("you");

            Line::styled(format!("Signed in as {who}"), Style::default().fg(Color::Green))
        } else {
            Line::default()
        }
    }

    /// Handle an `Action`, updating the app's state and producing whatever the
    /// view model needs to hear about
    pub fn handle(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    return vec![];
                }

                match key.code {
                    KeyCode::Esc => {
                        self.exiting = true;

                        vec![]
                    }
                    KeyCode::Enter => vec![Effect::SignIn],
                    _ => self.form.handle_event(key).into_iter().collect(),
                }
            }
            Action::Loading(loading) => {
                self.loading = loading;
                if loading {
                    self.server_error = None;
                }

                vec![]
            }
            Action::LoggedIn(user) => {
                tracing::info!(name = ?user.name, "signed in");
                self.server_error = None;
                self.signed_in = Some(user);

                vec![]
            }
            Action::ServerError(message) => {
                self.server_error = Some(message);

                vec![]
            }
            Action::Validated(errors) => {
                self.validation = errors;

                vec![]
            }
            Action::Problem(problem) => {
                tracing::error!(%problem, "problem");
                self.status_line = Some(problem);

                vec![]
            }
        }
    }

    /// Let the TUI manager know whether we're all wrapped up and can exit.
    pub fn should_exit(&self) -> Option<ExitCode> {
        if self.exiting {
            Some(ExitCode::SUCCESS)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn key(code: KeyCode) -> Action {
        Action::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn enter_signs_in() {
        let mut app = App::new();

        assert_eq!(app.handle(key(KeyCode::Enter)), vec![Effect::SignIn]);
    }

    #[test]
    fn typing_reaches_the_form() {
        let mut app = App::new();

        assert_eq!(
            app.handle(key(KeyCode::Char('a'))),
            vec![Effect::UserName("a".to_string())]
        );
    }

    #[test]
    fn escape_exits() {
        let mut app = App::new();
        assert_eq!(app.should_exit(), None);

        app.handle(key(KeyCode::Esc));

        assert_eq!(app.should_exit(), Some(ExitCode::SUCCESS));
    }

    #[test]
    fn key_releases_are_ignored() {
        let mut app = App::new();
        let mut release = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;

        assert_eq!(app.handle(Action::Key(release)), vec![]);
    }

    #[test]
    fn new_attempt_clears_old_server_error() {
        let mut app = App::new();
        app.handle(Action::ServerError("Invalid password".to_string()));

        app.handle(Action::Loading(true));

        assert!(app.loading);
        assert_eq!(app.server_error, None);
    }

    #[test]
    fn shows_who_signed_in() {
        let mut app = App::new();
        app.handle(Action::Loading(true));
        app.handle(Action::Loading(false));

        app.handle(Action::LoggedIn(User {
            token: Some("abc".to_string()),
            name: Some("Alice".to_string()),
            ..User::default()
        }));

        assert_eq!(app.form_status().to_string(), "Signed in as Alice");
    }

    #[test]
    fn shows_server_error() {
        let mut app = App::new();

        app.handle(Action::ServerError("Connection lost".to_string()));

        assert_eq!(app.form_status().to_string(), "Connection lost");
    }

    #[test]
    fn keeps_latest_validation() {
        let mut app = App::new();
        let errors = ValidationErrors {
            username: Some("Please enter your username".to_string()),
            password: None,
        };

        app.handle(Action::Validated(errors.clone()));

        assert_eq!(app.validation, errors);
    }
}
