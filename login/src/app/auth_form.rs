use super::Effect;
use crate::form_fields;
use crossterm::event::{Event, KeyCode, KeyEvent};
use login_core::ValidationErrors;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

/// A form for entering a username and password
#[derive(Debug)]
pub struct AuthForm {
    /// Which field we're editing
    active: Field,

    /// Who are you?
    username: Input,

    /// What's your password? (Will be masked)
    password: Input,
}

form_fields!(Field, Username, Password);

impl AuthForm {
    /// Draw the form in the middle of `body_area`, with any validation
    /// messages under their fields and `status` at the bottom.
    #[allow(clippy::cast_possible_truncation)]
    pub fn render(
        &self,
        body_area: Rect,
        frame: &mut Frame<'_>,
        errors: &ValidationErrors,
        status: Line<'_>,
    ) {
        let popup_vert = Layout::vertical([Constraint::Length(9)]).flex(Flex::Center);
        let popup_horiz = Layout::horizontal([Constraint::Percentage(50)]).flex(Flex::Center);

        let [popup_area] = popup_vert.areas(body_area);
        let [popup_area] = popup_horiz.areas(popup_area);
        frame.render_widget(Clear, popup_area);

        let width = popup_area.width.saturating_sub(2 + 1); // -2 for the border, -1 for the cursor

        let rows = Layout::vertical(Constraint::from_lengths([3, 1, 3, 1, 1]));
        let [username_area, username_error_area, password_area, password_error_area, status_area] =
            rows.areas(popup_area);

        let border_style = Style::default().fg(Color::Blue);
        let error_style = Style::default().fg(Color::Red);

        // USERNAME
        {
            let username_input_scroll = self.username.visual_scroll(width as usize);

            let username_field = Paragraph::new(self.username.value())
                .scroll((0, username_input_scroll as u16))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Username")
                        .border_style(border_style),
                );

            frame.render_widget(username_field, username_area);

            if let Some(message) = &errors.username {
                frame.render_widget(
                    Paragraph::new(message.as_str()).style(error_style),
                    username_error_area,
                );
            }

            if self.active == Field::Username {
                frame.set_cursor_position((
                    popup_area.x
                        + (self.username.visual_cursor().max(username_input_scroll) - username_input_scroll) as u16 // current end of text
                        + 1, // just past the end of the text
                    username_area.y + 1, // +1 row for the border/title
                ));
            }
        }

        // PASSWORD
        {
            let password_input_scroll = self.password.visual_scroll(width as usize);

            let password_field = Paragraph::new("*".repeat(self.password.value().chars().count()))
                .scroll((0, password_input_scroll as u16))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title("Password")
                        .border_style(border_style),
                );

            frame.render_widget(password_field, password_area);

            if let Some(message) = &errors.password {
                frame.render_widget(
                    Paragraph::new(message.as_str()).style(error_style),
                    password_error_area,
                );
            }

            if self.active == Field::Password {
                frame.set_cursor_position((
                    popup_area.x
                        + (self.password.visual_cursor().max(password_input_scroll) - password_input_scroll) as u16 // current end of text
                        + 1, // just past the end of the text
                    password_area.y + 1, // +1 row for the border/title
                ));
            }
        }

        frame.render_widget(Paragraph::new(status), status_area);
    }

    /// Move between fields or edit the active one. Edits produce an effect
    /// carrying the field's whole new value.
    pub fn handle_event(&mut self, key: KeyEvent) -> Option<Effect> {
        match key.code {
            KeyCode::Tab => {
                self.active = self.active.next();

                None
            }
            KeyCode::BackTab => {
                self.active = self.active.prev();

                None
            }
            _ => {
                let event = Event::Key(key);

                match self.active {
                    Field::Username => self
                        .username
                        .handle_event(&event)
                        .filter(|changed| changed.value)
                        .map(|_| Effect::UserName(self.username.value().to_string())),
                    Field::Password => self
                        .password
                        .handle_event(&event)
                        .filter(|changed| changed.value)
                        .map(|_| Effect::Password(self.password.value().to_string())),
                }
            }
        }
    }
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            active: Field::Username,
            username: Input::default(),
            password: Input::default(),
        }
    }
}
