//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::models::DocumentKind;

/// Client dashboard tabs
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ClientTab {
    #[default]
    Orders,
    NewOrder,
}

impl ClientTab {
    pub const ALL: [ClientTab; 2] = [ClientTab::Orders, ClientTab::NewOrder];

    pub fn title(&self) -> &'static str {
        match self {
            ClientTab::Orders => "My orders",
            ClientTab::NewOrder => "New order",
        }
    }
}

/// Driver dashboard tabs
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DriverTab {
    #[default]
    Available,
    Mine,
    Verification,
}

impl DriverTab {
    pub const ALL: [DriverTab; 3] = [DriverTab::Available, DriverTab::Mine, DriverTab::Verification];

    pub fn title(&self) -> &'static str {
        match self {
            DriverTab::Available => "Available",
            DriverTab::Mine => "My deliveries",
            DriverTab::Verification => "Verification",
        }
    }
}

/// Admin console tabs
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum AdminTab {
    #[default]
    Overview,
    Users,
    Orders,
    Drivers,
    Payments,
    Payouts,
    Collections,
    Commission,
}

impl AdminTab {
    pub const ALL: [AdminTab; 8] = [
        AdminTab::Overview,
        AdminTab::Users,
        AdminTab::Orders,
        AdminTab::Drivers,
        AdminTab::Payments,
        AdminTab::Payouts,
        AdminTab::Collections,
        AdminTab::Commission,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            AdminTab::Overview => "Overview",
            AdminTab::Users => "Users",
            AdminTab::Orders => "Orders",
            AdminTab::Drivers => "Drivers",
            AdminTab::Payments => "Payments",
            AdminTab::Payouts => "Payouts",
            AdminTab::Collections => "Collections",
            AdminTab::Commission => "Commission",
        }
    }
}

/// Position of `item` in `all`, moved by `delta` with wrap-around
pub fn cycle<T: Copy + PartialEq>(all: &[T], item: T, delta: isize) -> T {
    let len = all.len() as isize;
    let idx = all.iter().position(|t| *t == item).unwrap_or(0) as isize;
    all[(idx + delta).rem_euclid(len) as usize]
}

/// What is on screen, used for context-aware key mapping and rendering
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum View {
    /// Persisted token being resolved
    Loading,
    Landing,
    Client(ClientTab),
    Driver(DriverTab),
    Admin(AdminTab),
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Navigation
    NextTab,
    PrevTab,
    SwitchTab(usize),
    SelectNext,
    SelectPrev,
    Refresh,

    // Form editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Backspace,
    CursorLeft,
    CursorRight,
    NextField,
    PrevField,
    Submit,

    // Landing
    ToggleAuthMode,
    CycleRole,

    // Orders
    PriceUp,
    PriceDown,
    NewOrder,
    AcceptOrder,
    AdvanceOrder,
    PayCash,
    CompleteCash,

    // Verification
    SendEmailCode,
    EnterCode,
    UploadDocument(DocumentKind),

    // Admin
    ToggleUser,
    ApproveDriver,
    RejectDriver,
    ProcessPayout,
    MarkCommissionPaid,

    // Prompt popup
    PromptChar(char),
    PromptBackspace,
    PromptSubmit,
    PromptCancel,

    // Requests
    CancelRequests,

    // Popups
    ToggleHelp,
    CloseHelp,
    DismissNotice,

    // System
    Logout,
    Quit,
}

/// UI context needed to interpret a key
#[derive(Clone, Copy, Debug)]
pub struct KeyContext {
    pub view: View,
    pub input_mode: InputMode,
    pub show_help: bool,
    pub prompt_open: bool,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(key: KeyEvent, ctx: KeyContext) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('x') => return Some(UiEvent::CancelRequests),
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            _ => {}
        }
    }

    if ctx.show_help {
        return Some(UiEvent::CloseHelp);
    }

    if ctx.prompt_open {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::PromptCancel),
            KeyCode::Enter => Some(UiEvent::PromptSubmit),
            KeyCode::Backspace => Some(UiEvent::PromptBackspace),
            KeyCode::Char(c) => Some(UiEvent::PromptChar(c)),
            _ => None,
        };
    }

    match ctx.input_mode {
        InputMode::Editing => editing_keys(key),
        InputMode::Normal => normal_keys(key, ctx.view),
    }
}

fn editing_keys(key: KeyEvent) -> Option<UiEvent> {
    match key.code {
        KeyCode::Esc => Some(UiEvent::StopEditing),
        KeyCode::Tab | KeyCode::Down => Some(UiEvent::NextField),
        KeyCode::BackTab | KeyCode::Up => Some(UiEvent::PrevField),
        KeyCode::Enter => Some(UiEvent::Submit),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::PageUp => Some(UiEvent::PriceUp),
        KeyCode::PageDown => Some(UiEvent::PriceDown),
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

fn normal_keys(key: KeyEvent, view: View) -> Option<UiEvent> {
    // Keys shared by every view
    match key.code {
        KeyCode::Char('q') => return Some(UiEvent::Quit),
        KeyCode::Char('?') => return Some(UiEvent::ToggleHelp),
        KeyCode::Esc => return Some(UiEvent::DismissNotice),
        _ => {}
    }

    match view {
        View::Loading => None,
        View::Landing => match key.code {
            KeyCode::Char('e') | KeyCode::Enter => Some(UiEvent::StartEditing),
            KeyCode::Char('m') | KeyCode::Tab => Some(UiEvent::ToggleAuthMode),
            KeyCode::Char('o') => Some(UiEvent::CycleRole),
            KeyCode::Char('s') => Some(UiEvent::Submit),
            _ => None,
        },
        _ => dashboard_keys(key, view),
    }
}

fn dashboard_keys(key: KeyEvent, view: View) -> Option<UiEvent> {
    match key.code {
        KeyCode::Tab => return Some(UiEvent::NextTab),
        KeyCode::BackTab => return Some(UiEvent::PrevTab),
        KeyCode::Up | KeyCode::Char('k') => return Some(UiEvent::SelectPrev),
        KeyCode::Down | KeyCode::Char('j') => return Some(UiEvent::SelectNext),
        KeyCode::Char('r') => return Some(UiEvent::Refresh),
        KeyCode::Char('L') => return Some(UiEvent::Logout),
        KeyCode::Char(c @ '1'..='9') => return Some(UiEvent::SwitchTab(c as usize - '1' as usize)),
        _ => {}
    }

    match (view, key.code) {
        (View::Client(ClientTab::Orders), KeyCode::Char('n')) => Some(UiEvent::NewOrder),
        (View::Client(ClientTab::Orders), KeyCode::Char('c')) => Some(UiEvent::PayCash),

        (View::Client(ClientTab::NewOrder), KeyCode::Char('e') | KeyCode::Enter) => Some(UiEvent::StartEditing),
        (View::Client(ClientTab::NewOrder), KeyCode::Char('+') | KeyCode::Char('=')) => Some(UiEvent::PriceUp),
        (View::Client(ClientTab::NewOrder), KeyCode::Char('-')) => Some(UiEvent::PriceDown),
        (View::Client(ClientTab::NewOrder), KeyCode::Char('s')) => Some(UiEvent::Submit),

        (View::Driver(DriverTab::Available), KeyCode::Char('a') | KeyCode::Enter) => Some(UiEvent::AcceptOrder),

        (View::Driver(DriverTab::Mine), KeyCode::Char('n') | KeyCode::Enter) => Some(UiEvent::AdvanceOrder),
        (View::Driver(DriverTab::Mine), KeyCode::Char('c')) => Some(UiEvent::CompleteCash),

        (View::Driver(DriverTab::Verification), KeyCode::Char('s')) => Some(UiEvent::SendEmailCode),
        (View::Driver(DriverTab::Verification), KeyCode::Char('v')) => Some(UiEvent::EnterCode),
        (View::Driver(DriverTab::Verification), KeyCode::Char('i')) => {
            Some(UiEvent::UploadDocument(DocumentKind::Ine))
        }
        (View::Driver(DriverTab::Verification), KeyCode::Char('l')) => {
            Some(UiEvent::UploadDocument(DocumentKind::DriversLicense))
        }

        (View::Admin(AdminTab::Users), KeyCode::Char('t') | KeyCode::Enter) => Some(UiEvent::ToggleUser),
        (View::Admin(AdminTab::Drivers), KeyCode::Char('a')) => Some(UiEvent::ApproveDriver),
        (View::Admin(AdminTab::Drivers), KeyCode::Char('x')) => Some(UiEvent::RejectDriver),
        (View::Admin(AdminTab::Payouts), KeyCode::Char('p') | KeyCode::Enter) => Some(UiEvent::ProcessPayout),
        (View::Admin(AdminTab::Collections), KeyCode::Char('p') | KeyCode::Enter) => {
            Some(UiEvent::MarkCommissionPaid)
        }
        (View::Admin(AdminTab::Commission), KeyCode::Char('e') | KeyCode::Enter) => Some(UiEvent::StartEditing),
        (View::Admin(AdminTab::Commission), KeyCode::Char('s')) => Some(UiEvent::Submit),

        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctx(view: View) -> KeyContext {
        KeyContext {
            view,
            input_mode: InputMode::Normal,
            show_help: false,
            prompt_open: false,
        }
    }

    #[test]
    fn test_view_specific_keys() {
        let available = ctx(View::Driver(DriverTab::Available));
        assert_eq!(key_to_ui_event(press(KeyCode::Char('a')), available), Some(UiEvent::AcceptOrder));

        let drivers = ctx(View::Admin(AdminTab::Drivers));
        assert_eq!(key_to_ui_event(press(KeyCode::Char('a')), drivers), Some(UiEvent::ApproveDriver));

        // 'a' means nothing on the client order list
        assert_eq!(key_to_ui_event(press(KeyCode::Char('a')), ctx(View::Client(ClientTab::Orders))), None);
    }

    #[test]
    fn test_editing_mode_captures_characters() {
        let mut c = ctx(View::Client(ClientTab::NewOrder));
        c.input_mode = InputMode::Editing;
        assert_eq!(key_to_ui_event(press(KeyCode::Char('q')), c), Some(UiEvent::CharInput('q')));
        assert_eq!(key_to_ui_event(press(KeyCode::Enter), c), Some(UiEvent::Submit));
    }

    #[test]
    fn test_ctrl_x_cancels_even_while_editing() {
        let mut c = ctx(View::Landing);
        c.input_mode = InputMode::Editing;
        let key = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(key_to_ui_event(key, c), Some(UiEvent::CancelRequests));
    }

    #[test]
    fn test_prompt_and_help_take_precedence() {
        let mut c = ctx(View::Admin(AdminTab::Drivers));
        c.prompt_open = true;
        assert_eq!(key_to_ui_event(press(KeyCode::Char('x')), c), Some(UiEvent::PromptChar('x')));

        c.prompt_open = false;
        c.show_help = true;
        assert_eq!(key_to_ui_event(press(KeyCode::Char('x')), c), Some(UiEvent::CloseHelp));
    }

    #[test]
    fn test_number_keys_switch_tabs() {
        let c = ctx(View::Admin(AdminTab::Overview));
        assert_eq!(key_to_ui_event(press(KeyCode::Char('3')), c), Some(UiEvent::SwitchTab(2)));
        assert_eq!(cycle(&AdminTab::ALL, AdminTab::Overview, -1), AdminTab::Commission);
        assert_eq!(cycle(&DriverTab::ALL, DriverTab::Verification, 1), DriverTab::Available);
    }
}
