//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    // Session controls
    StartCamera,
    StopCamera,

    // Data
    RefreshPredictions,
    RefreshStatistics,
    RequestClear,
    ConfirmClear,
    CancelClear,

    // Predictions list
    ScrollUp,
    ScrollDown,

    // Popups
    ShowDiagnostics,
    CloseDiagnostics,
    DismissNotice,
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Which popup currently owns the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overlay {
    #[default]
    None,
    Notice,
    ConfirmClear,
    Diagnostics,
    Help,
}

/// Convert a key event to a UiEvent based on the active overlay
pub fn key_to_ui_event(key: KeyEvent, overlay: Overlay) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    match overlay {
        // A notice blocks until acknowledged, any key does it
        Overlay::Notice => Some(UiEvent::DismissNotice),
        Overlay::ConfirmClear => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(UiEvent::ConfirmClear),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(UiEvent::CancelClear),
            _ => None,
        },
        Overlay::Diagnostics => match key.code {
            KeyCode::Char('d') => Some(UiEvent::ShowDiagnostics),
            _ => Some(UiEvent::CloseDiagnostics),
        },
        Overlay::Help => Some(UiEvent::CloseHelp),
        Overlay::None => match key.code {
            KeyCode::Char('s') => Some(UiEvent::StartCamera),
            KeyCode::Char('x') => Some(UiEvent::StopCamera),
            KeyCode::Char('c') => Some(UiEvent::RequestClear),
            KeyCode::Char('p') => Some(UiEvent::RefreshPredictions),
            KeyCode::Char('t') => Some(UiEvent::RefreshStatistics),
            KeyCode::Char('d') => Some(UiEvent::ShowDiagnostics),
            KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
            KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::ScrollUp),
            KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::ScrollDown),
            KeyCode::Char('q') => Some(UiEvent::Quit),
            _ => None,
        },
    }
}
