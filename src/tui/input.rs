use super::state::{FormRow, LoginField, UiState};
use crate::model::Credentials;
use crate::orchestrator::{FieldInput, Intent, Modal};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What the event loop should do after a key press.
#[derive(Debug)]
pub enum Action {
    None,
    Quit,
    Send(Intent),
}

pub fn handle_key(state: &mut UiState, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    if state.show_help {
        state.show_help = false;
        return Action::None;
    }
    if !state.app.authenticated {
        return login_key(state, key);
    }
    match state.app.modal {
        Modal::Closed => list_key(state, key),
        Modal::CreateEdit => form_key(state, key),
        Modal::Delete => match key.code {
            KeyCode::Char('y') | KeyCode::Enter => Action::Send(Intent::ConfirmDelete),
            KeyCode::Char('n') | KeyCode::Esc => Action::Send(Intent::CloseModal),
            _ => Action::None,
        },
    }
}

fn login_key(state: &mut UiState, key: KeyEvent) -> Action {
    let form = &mut state.login;
    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            form.toggle_focus();
            Action::None
        }
        KeyCode::Enter => {
            if form.username.trim().is_empty() {
                form.focus = LoginField::Username;
                return Action::None;
            }
            if form.focus == LoginField::Username {
                form.focus = LoginField::Password;
                if form.password.is_empty() {
                    return Action::None;
                }
            }
            Action::Send(Intent::Login(Credentials {
                username: form.username.trim().to_string(),
                password: form.password.clone(),
            }))
        }
        KeyCode::Backspace => {
            form.focused_mut().pop();
            Action::None
        }
        KeyCode::Char(c) => {
            form.focused_mut().push(c);
            Action::None
        }
        _ => Action::None,
    }
}

fn list_key(state: &mut UiState, key: KeyEvent) -> Action {
    if let Some(buf) = state.page_input.as_mut() {
        match key.code {
            KeyCode::Char(c) if c.is_ascii_digit() => buf.push(c),
            KeyCode::Backspace => {
                buf.pop();
            }
            KeyCode::Enter => {
                let page = buf.parse::<u32>().ok().filter(|p| *p > 0);
                state.page_input = None;
                if let Some(page) = page {
                    return Action::Send(Intent::FetchPage(page));
                }
            }
            KeyCode::Esc => state.page_input = None,
            _ => {}
        }
        return Action::None;
    }

    let info = &state.app.page_info;
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('?') => {
            state.show_help = true;
            Action::None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            state.selected = state.selected.saturating_sub(1);
            Action::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            if state.selected + 1 < state.app.products.len() {
                state.selected += 1;
            }
            Action::None
        }
        KeyCode::Left | KeyCode::Char('h') => match info.prev_page() {
            Some(page) => Action::Send(Intent::FetchPage(page)),
            None => Action::None,
        },
        KeyCode::Right | KeyCode::Char('l') => match info.next_page() {
            Some(page) => Action::Send(Intent::FetchPage(page)),
            None => Action::None,
        },
        KeyCode::Char('r') => Action::Send(Intent::FetchPage(info.refresh_page())),
        KeyCode::Char('g') => {
            state.page_input = Some(String::new());
            Action::None
        }
        KeyCode::Char('n') => {
            state.form_focus = 0;
            Action::Send(Intent::OpenCreate)
        }
        KeyCode::Char('e') | KeyCode::Enter => match state.selected_product() {
            Some(p) => {
                let product = p.clone();
                state.form_focus = 0;
                Action::Send(Intent::OpenEdit(product))
            }
            None => Action::None,
        },
        KeyCode::Char('d') | KeyCode::Delete => match state.selected_product() {
            Some(p) => Action::Send(Intent::OpenDelete(p.clone())),
            None => Action::None,
        },
        KeyCode::Char('L') => Action::Send(Intent::Logout),
        KeyCode::Esc if state.app.notice.is_some() => Action::Send(Intent::DismissNotice),
        _ => Action::None,
    }
}

fn form_key(state: &mut UiState, key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return Action::Send(Intent::CloseModal),
        KeyCode::Enter => return Action::Send(Intent::Submit),
        KeyCode::Char('s') if ctrl => return Action::Send(Intent::Submit),
        KeyCode::Char('a') if ctrl => return Action::Send(Intent::AddImage),
        KeyCode::Char('d') if ctrl => return Action::Send(Intent::RemoveImage),
        KeyCode::Tab | KeyCode::Down => {
            state.move_form_focus(true);
            return Action::None;
        }
        KeyCode::BackTab | KeyCode::Up => {
            state.move_form_focus(false);
            return Action::None;
        }
        _ => {}
    }

    let Some(row) = state.focused_row() else {
        return Action::None;
    };
    let staged = &state.app.staged;
    match row {
        FormRow::Field(field) if field.is_checkbox() => match key.code {
            KeyCode::Char(' ') => Action::Send(Intent::EditField {
                field,
                input: FieldInput::Checked(!staged.is_enabled),
            }),
            _ => Action::None,
        },
        FormRow::Field(field) => match edited(staged.text(field), key) {
            Some(value) => Action::Send(Intent::EditField {
                field,
                input: FieldInput::Text(value),
            }),
            None => Action::None,
        },
        FormRow::Image(index) => {
            let current = staged.images_url.get(index).map(String::as_str).unwrap_or("");
            match edited(current, key) {
                Some(url) => Action::Send(Intent::SetImage { index, url }),
                None => Action::None,
            }
        }
    }
}

/// Text after applying a typing key, if the key edits text.
fn edited(current: &str, key: KeyEvent) -> Option<String> {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut s = current.to_string();
            s.push(c);
            Some(s)
        }
        KeyCode::Backspace => {
            let mut s = current.to_string();
            s.pop();
            Some(s)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Locale, PageInfo, Product};
    use crate::orchestrator::ProductField;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Feed keys the way the event loop does, recording sent intents locally.
    fn type_keys(state: &mut UiState, keys: &[KeyEvent]) -> Vec<Intent> {
        let mut sent = Vec::new();
        for key in keys {
            if let Action::Send(intent) = handle_key(state, *key) {
                state.record(&intent);
                sent.push(intent);
            }
        }
        sent
    }

    fn signed_in() -> UiState {
        let mut ui = UiState::new(Locale::En);
        ui.app.authenticated = true;
        ui.app.products = vec![
            Product {
                id: Some("a".into()),
                title: "A".into(),
                ..Default::default()
            },
            Product {
                id: Some("b".into()),
                title: "B".into(),
                ..Default::default()
            },
        ];
        ui.app.page_info = PageInfo {
            current_page: 2,
            total_pages: 3,
            has_pre: true,
            has_next: true,
            category: String::new(),
        };
        ui
    }

    #[test]
    fn login_form_submits_credentials() {
        let mut ui = UiState::new(Locale::En);
        let mut keys: Vec<KeyEvent> = "admin".chars().map(|c| press(KeyCode::Char(c))).collect();
        keys.push(press(KeyCode::Tab));
        keys.extend("pw".chars().map(|c| press(KeyCode::Char(c))));
        type_keys(&mut ui, &keys);

        match handle_key(&mut ui, press(KeyCode::Enter)) {
            Action::Send(Intent::Login(c)) => {
                assert_eq!(c.username, "admin");
                assert_eq!(c.password, "pw");
            }
            other => panic!("unexpected action: {other:?}"),
        }
    }

    #[test]
    fn login_with_empty_username_does_not_submit() {
        let mut ui = UiState::new(Locale::En);
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Enter)),
            Action::None
        ));
    }

    #[test]
    fn q_types_into_login_but_quits_list() {
        let mut ui = UiState::new(Locale::En);
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Char('q'))),
            Action::None
        ));
        assert_eq!(ui.login.username, "q");

        let mut ui = signed_in();
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Char('q'))),
            Action::Quit
        ));
    }

    #[test]
    fn paging_keys_follow_page_info() {
        let mut ui = signed_in();
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Left)),
            Action::Send(Intent::FetchPage(1))
        ));
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Char('l'))),
            Action::Send(Intent::FetchPage(3))
        ));
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Char('r'))),
            Action::Send(Intent::FetchPage(2))
        ));

        ui.app.page_info.has_next = false;
        ui.app.page_info.current_page = 3;
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Right)),
            Action::None
        ));
    }

    #[test]
    fn goto_page_takes_digits() {
        let mut ui = signed_in();
        let keys = [
            press(KeyCode::Char('g')),
            press(KeyCode::Char('1')),
            press(KeyCode::Char('x')),
            press(KeyCode::Char('2')),
        ];
        type_keys(&mut ui, &keys);
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Enter)),
            Action::Send(Intent::FetchPage(12))
        ));
        assert_eq!(ui.page_input, None);
    }

    #[test]
    fn edit_selected_row_and_type_into_title() {
        let mut ui = signed_in();
        let sent = type_keys(
            &mut ui,
            &[
                press(KeyCode::Down),
                press(KeyCode::Char('e')),
                press(KeyCode::Char('!')),
            ],
        );
        assert!(matches!(&sent[0], Intent::OpenEdit(p) if p.title == "B"));
        assert_eq!(ui.app.modal, Modal::CreateEdit);
        assert_eq!(ui.app.staged.title, "B!");
        assert_eq!(ui.app.staged.id.as_deref(), Some("b"));
    }

    #[test]
    fn form_toggles_checkbox_and_edits_images() {
        let mut ui = signed_in();
        type_keys(&mut ui, &[press(KeyCode::Char('n'))]);
        assert!(ui.app.staged.is_enabled);

        // Walk focus to the enabled checkbox.
        while ui.focused_row() != Some(FormRow::Field(ProductField::IsEnabled)) {
            handle_key(&mut ui, press(KeyCode::Tab));
        }
        type_keys(&mut ui, &[press(KeyCode::Char(' '))]);
        assert!(!ui.app.staged.is_enabled);

        type_keys(&mut ui, &[ctrl('a')]);
        assert_eq!(ui.app.staged.images_url, vec![String::new()]);
        while ui.focused_row() != Some(FormRow::Image(0)) {
            handle_key(&mut ui, press(KeyCode::Down));
        }
        type_keys(&mut ui, &[press(KeyCode::Char('u'))]);
        assert_eq!(ui.app.staged.images_url, vec!["u".to_string()]);

        type_keys(&mut ui, &[ctrl('d')]);
        assert!(ui.app.staged.images_url.is_empty());
        assert!(ui.focused_row().is_some());
    }

    #[test]
    fn delete_dialog_confirms_with_y() {
        let mut ui = signed_in();
        let sent = type_keys(&mut ui, &[press(KeyCode::Char('d'))]);
        assert!(matches!(&sent[0], Intent::OpenDelete(p) if p.title == "A"));
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Char('y'))),
            Action::Send(Intent::ConfirmDelete)
        ));
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Esc)),
            Action::Send(Intent::CloseModal)
        ));
    }

    #[test]
    fn help_overlay_swallows_next_key() {
        let mut ui = signed_in();
        handle_key(&mut ui, press(KeyCode::Char('?')));
        assert!(ui.show_help);
        assert!(matches!(
            handle_key(&mut ui, press(KeyCode::Char('q'))),
            Action::None
        ));
        assert!(!ui.show_help);
        assert!(matches!(handle_key(&mut ui, ctrl('c')), Action::Quit));
    }
}
