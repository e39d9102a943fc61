//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::editor::Cursor;
use crate::orchestration::{is_blank, parse_document, OrchestrationDefinition};
use crate::{mlog, mlog_debug, mlog_warn};

use super::command::Command;
use super::message::Message;
use super::model::{Focus, Model, NotificationLevel};

/// Rows moved per PgUp/PgDn in the result panel.
const RESULT_SCROLL_STEP: u16 = 5;

/// Page-level operations. Keys map onto these; so can anything else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Select a saved orchestration, or the placeholder with `None`
    SelectSaved(Option<String>),
    LoadExample,
    Save,
    DeleteSelected,
    ClearAll,
    Execute,
    ToggleProvider,
}

/// Helper to set an error notification and mark model as dirty.
fn set_error(model: &mut Model, message: String) {
    mlog_warn!("UI Error: {}", message);
    model.notify(NotificationLevel::Error, message);
}

fn set_warning(model: &mut Model, message: &str) {
    mlog_debug!("UI Warning: {}", message);
    model.notify(NotificationLevel::Warning, message);
}

/// Pure update function: Model + Message → Commands
///
/// All I/O happens via the returned Commands.
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.dirty = true;
            if is_quit(&key) {
                cmds.push(Command::Quit);
            } else if model.busy() {
                mlog_debug!("Key ignored while busy: {:?}", key.code);
            } else {
                model.notification = None; // Clear notification on any key press
                update_key(model, key, &mut cmds);
            }
        }

        Message::Resize(_, _) => {
            model.dirty = true;
        }

        Message::Action(action) => {
            if model.busy() {
                mlog_debug!("Action ignored while busy: {:?}", action);
            } else {
                apply(model, action, &mut cmds);
            }
        }

        Message::CatalogLoaded {
            orchestrations,
            error,
        } => {
            mlog_debug!(
                "Message::CatalogLoaded count={} error={:?}",
                orchestrations.len(),
                error
            );
            let highlighted = model.highlighted_name().cloned();
            model.orchestrations = orchestrations;
            model.highlight(highlighted.as_deref());
            model.dirty = true;
            if error.is_some() {
                let message = format!(
                    "Error reading {}. Please check its JSON format.",
                    model.store_path.display()
                );
                set_error(model, message);
            }
        }

        Message::OrchestrationSaved {
            name,
            orchestrations,
        } => {
            mlog!("Message::OrchestrationSaved name={}", name);
            model.store_pending = false;
            model.orchestrations = orchestrations;
            model.session.editing_name = name.clone();
            model.session.selected = Some(name.clone());
            model.highlight(Some(name.as_str()));
            model.notify(
                NotificationLevel::Info,
                format!("Orchestration '{}' saved successfully!", name),
            );
        }

        Message::OrchestrationSaveFailed(err) => {
            model.store_pending = false;
            set_error(model, format!("Failed to save orchestration: {}", err));
        }

        Message::OrchestrationDeleted {
            name,
            orchestrations,
        } => {
            mlog!("Message::OrchestrationDeleted name={}", name);
            model.store_pending = false;
            model.orchestrations = orchestrations;
            reset_to_example(model);
            model.notify(
                NotificationLevel::Info,
                format!("Orchestration '{}' deleted.", name),
            );
        }

        Message::OrchestrationDeleteFailed {
            name,
            not_found,
            error,
        } => {
            mlog_warn!(
                "Message::OrchestrationDeleteFailed name={} err={}",
                name,
                error
            );
            model.store_pending = false;
            if not_found {
                set_warning(model, "Selected orchestration not found.");
                cmds.push(Command::ReloadCatalog);
            } else {
                set_error(model, format!("Failed to delete orchestration: {}", error));
            }
        }

        Message::RunLogged(entry) => {
            model.session.log.push(entry);
            model.dirty = true;
        }

        Message::RunFinished(result) => {
            mlog!("Message::RunFinished");
            model.running = false;
            model.session.result = Some(result.to_pretty());
            model.result_scroll = 0;
            model.notify(
                NotificationLevel::Info,
                "Orchestration completed successfully!",
            );
        }

        Message::RunFailed(err) => {
            model.running = false;
            model.session.result = None;
            let message = if err.is_configuration() {
                format!(
                    "Configuration Error: {}. Please check your API key or task definitions.",
                    err
                )
            } else {
                format!("Execution Failed: An unexpected error occurred: {}", err)
            };
            set_error(model, message);
        }
    }

    cmds
}

fn is_quit(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
}

fn update_key(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        let action = match key.code {
            KeyCode::Char('s') => Some(Action::Save),
            KeyCode::Char('d') => Some(Action::DeleteSelected),
            KeyCode::Char('e') => Some(Action::LoadExample),
            KeyCode::Char('k') => Some(Action::ClearAll),
            KeyCode::Char('r') => Some(Action::Execute),
            KeyCode::Char('p') => Some(Action::ToggleProvider),
            _ => None,
        };
        if let Some(action) = action {
            apply(model, action, cmds);
        }
        return;
    }

    match key.code {
        KeyCode::Tab => {
            model.focus = model.focus.next();
            return;
        }
        KeyCode::BackTab => {
            model.focus = model.focus.prev();
            return;
        }
        KeyCode::PageDown => {
            let limit = model
                .session
                .result
                .as_deref()
                .map_or(0, |r| r.chars().count());
            let next = model.result_scroll.saturating_add(RESULT_SCROLL_STEP);
            model.result_scroll = next.min(u16::try_from(limit).unwrap_or(u16::MAX));
            return;
        }
        KeyCode::PageUp => {
            model.result_scroll = model.result_scroll.saturating_sub(RESULT_SCROLL_STEP);
            return;
        }
        _ => {}
    }

    match model.focus {
        Focus::Catalog => update_catalog(model, key, cmds),
        Focus::Name => update_name(model, key, cmds),
        Focus::Editor => update_editor(model, key),
    }
}

fn update_catalog(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    let rows = model.orchestrations.len() + 1;
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            model.catalog_cursor = (model.catalog_cursor + 1) % rows;
        }

        KeyCode::Char('k') | KeyCode::Up => {
            model.catalog_cursor = model.catalog_cursor.checked_sub(1).unwrap_or(rows - 1);
        }

        KeyCode::Enter => {
            let name = model.highlighted_name().cloned();
            apply(model, Action::SelectSaved(name), cmds);
        }

        KeyCode::Char('s') => apply(model, Action::Save, cmds),
        KeyCode::Char('d') => apply(model, Action::DeleteSelected, cmds),
        KeyCode::Char('e') => apply(model, Action::LoadExample, cmds),
        KeyCode::Char('c') => apply(model, Action::ClearAll, cmds),
        KeyCode::Char('r') => apply(model, Action::Execute, cmds),
        KeyCode::Char('p') => apply(model, Action::ToggleProvider, cmds),

        KeyCode::Char('q') | KeyCode::Esc => {
            cmds.push(Command::Quit);
        }

        KeyCode::Char('?') => {
            model.show_keymap = !model.show_keymap;
        }

        _ => {}
    }
}

fn update_name(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Enter => apply(model, Action::Save, cmds),
        KeyCode::Esc => model.focus = Focus::Catalog,
        KeyCode::Backspace => {
            model.session.editing_name.pop();
        }
        KeyCode::Char(c) => model.session.editing_name.push(c),
        _ => {}
    }
}

fn update_editor(model: &mut Model, key: KeyEvent) {
    let text = &mut model.session.definition_text;
    let cursor = &mut model.cursor;
    match key.code {
        KeyCode::Esc => model.focus = Focus::Catalog,
        KeyCode::Char(c) => cursor.insert(text, c),
        KeyCode::Enter => cursor.insert(text, '\n'),
        KeyCode::Backspace => cursor.backspace(text),
        KeyCode::Delete => cursor.delete(text),
        KeyCode::Left => cursor.left(text),
        KeyCode::Right => cursor.right(text),
        KeyCode::Up => cursor.up(text),
        KeyCode::Down => cursor.down(text),
        KeyCode::Home => cursor.home(text),
        KeyCode::End => cursor.end(text),
        _ => {}
    }
}

fn reset_to_example(model: &mut Model) {
    model.session.reset_to_example();
    model.result_scroll = 0;
    model.highlight(None);
    model.cursor = Cursor::default();
    model.dirty = true;
}

fn apply(model: &mut Model, action: Action, cmds: &mut Vec<Command>) {
    mlog_debug!("apply {:?}", action);
    model.dirty = true;

    match action {
        Action::SelectSaved(None) | Action::LoadExample | Action::ClearAll => {
            reset_to_example(model);
        }

        Action::SelectSaved(Some(name)) => match model.orchestrations.get(&name).cloned() {
            Some(definition) => {
                model.session.load_saved(&name, &definition);
                model.result_scroll = 0;
                model.highlight(Some(name.as_str()));
                model.cursor = Cursor::default();
            }
            None => {
                set_warning(model, "Selected orchestration not found.");
                cmds.push(Command::ReloadCatalog);
            }
        },

        Action::Save => {
            let name = model.session.editing_name.clone();
            if name.trim().is_empty() {
                set_warning(model, "Please enter a name to save the orchestration.");
                return;
            }
            match parse_document(&model.session.definition_text) {
                Ok(definition) => {
                    model.store_pending = true;
                    cmds.push(Command::SaveOrchestration { name, definition });
                }
                Err(_) => set_error(
                    model,
                    "Cannot save: Invalid JSON format in Orchestration Definition.".to_string(),
                ),
            }
        }

        Action::DeleteSelected => match model.session.selected.clone() {
            None => set_warning(model, "Please select an orchestration to delete."),
            Some(name) if !model.orchestrations.contains_key(&name) => {
                set_warning(model, "Selected orchestration not found.");
            }
            Some(name) => {
                model.store_pending = true;
                cmds.push(Command::DeleteOrchestration { name });
            }
        },

        Action::Execute => {
            model.session.clear_run();
            model.result_scroll = 0;
            let document = match parse_document(&model.session.definition_text) {
                Ok(document) => document,
                Err(_) => {
                    set_error(
                        model,
                        "Invalid JSON format in Orchestration Definition. Please check your syntax."
                            .to_string(),
                    );
                    return;
                }
            };
            if is_blank(&document) {
                set_warning(
                    model,
                    "Cannot execute with an invalid or empty orchestration definition.",
                );
                return;
            }
            match OrchestrationDefinition::from_value(&document) {
                Ok(definition) => {
                    mlog!(
                        "Execute orchestration={:?} provider={}",
                        definition.display_name(),
                        model.session.provider
                    );
                    model.running = true;
                    model.notify(
                        NotificationLevel::Info,
                        "Executing orchestration... Please wait.",
                    );
                    cmds.push(Command::Execute {
                        definition,
                        provider: model.session.provider,
                    });
                }
                Err(e) => set_error(
                    model,
                    format!("Execution Failed: An unexpected error occurred: {}", e),
                ),
            }
        }

        Action::ToggleProvider => {
            model.session.provider = model.session.provider.toggle();
            let message = format!("Provider: {}", model.session.provider);
            model.notify(NotificationLevel::Info, message);
        }
    }
}
