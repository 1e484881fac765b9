//! Terminal rendering
//!
//! Every function here draws from a [`RenderState`] snapshot and never
//! touches app state directly.

mod admin;
mod client;
mod driver;
mod landing;

use chrono::{DateTime, Local, Utc};
use ratatui::{prelude::*, widgets::*};

use crate::app::forms::Form;
use crate::app::state::NoticeLevel;
use crate::constants::{APP_NAME, APP_VERSION};
use crate::financials::format_currency;
use crate::messages::ui_events::{InputMode, View};
use crate::messages::RenderState;
use crate::models::{DocumentStatus, Financials, Order, OrderStatus, PaymentStatus, TransferStatus};

pub fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Notice
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    draw_header(f, state, chunks[0]);

    match state.view {
        View::Loading => draw_loading(f, chunks[1]),
        View::Landing => landing::draw(f, state, chunks[1]),
        View::Client(tab) => client::draw(f, state, tab, chunks[1]),
        View::Driver(tab) => driver::draw(f, state, tab, chunks[1]),
        View::Admin(tab) => admin::draw(f, state, tab, chunks[1]),
    }

    draw_notice(f, state, chunks[2]);
    draw_hints(f, state, chunks[3]);

    if let Some(prompt) = &state.prompt {
        draw_prompt(f, &prompt.kind.title(), &prompt.input.value, prompt.input.display_cursor(), area);
    }
    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_header(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(" {} v{} ", APP_NAME, APP_VERSION),
        Style::default().fg(Color::Black).bg(Color::Cyan).bold(),
    )];
    if let Some(user) = &state.user {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!("{} ({})", user.name, user.user_type.label()),
            Style::default().fg(Color::White).bold(),
        ));
    }
    spans.push(Span::styled(format!("  {}", state.api_url), Style::default().fg(Color::DarkGray)));
    if state.is_loading {
        spans.push(Span::styled(
            format!("  [{} loading...]", state.in_flight),
            Style::default().fg(Color::Yellow),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_loading(f: &mut Frame, area: Rect) {
    let text = Paragraph::new("Restoring your session...")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(text, centered_rect(50, 20, area));
}

fn draw_notice(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(notice) = &state.notice else {
        return;
    };
    let color = match notice.level {
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Error => Color::Red,
    };
    let line = Paragraph::new(format!(" {}", notice.text)).style(Style::default().fg(color));
    f.render_widget(line, area);
}

fn draw_hints(f: &mut Frame, state: &RenderState, area: Rect) {
    use crate::messages::ui_events::{AdminTab, ClientTab, DriverTab};

    let hints = if state.prompt.is_some() {
        " Enter:confirm | Esc:cancel "
    } else if state.input_mode == InputMode::Editing {
        " Esc:stop editing | Tab/↑↓:field | Enter:submit | ←→:move "
    } else {
        match state.view {
            View::Loading => " Ctrl+X:cancel | q:quit ",
            View::Landing => " e:edit | m:login/register | o:role | s:submit | ?:help | q:quit ",
            View::Client(ClientTab::Orders) => " ↑↓:select | n:new order | c:pay cash | r:refresh | L:logout | ?:help ",
            View::Client(ClientTab::NewOrder) => " e:edit | +/-:price | s:submit | Tab:tabs | ?:help ",
            View::Driver(DriverTab::Available) => " ↑↓:select | a:accept | r:refresh | L:logout | ?:help ",
            View::Driver(DriverTab::Mine) => " ↑↓:select | n:next step | c:cash received | r:refresh | ?:help ",
            View::Driver(DriverTab::Verification) => " s:send code | v:enter code | i:INE | l:license | ?:help ",
            View::Admin(AdminTab::Users) => " ↑↓:select | t:toggle active | r:refresh | ?:help ",
            View::Admin(AdminTab::Drivers) => " ↑↓:select | a:approve | x:reject | r:refresh | ?:help ",
            View::Admin(AdminTab::Payouts) => " ↑↓:select | p:process payout | r:refresh | ?:help ",
            View::Admin(AdminTab::Collections) => " ↑↓:select | p:mark paid | r:refresh | ?:help ",
            View::Admin(AdminTab::Commission) => " e:edit | s:save | r:reload | ?:help ",
            View::Admin(_) => " Tab/1-8:tabs | ↑↓:select | r:refresh | L:logout | ?:help ",
        }
    };
    f.render_widget(Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)), area);
}

fn draw_prompt(f: &mut Frame, title: &str, value: &str, cursor: usize, area: Rect) {
    let popup_area = centered_rect(60, 20, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} (Enter to confirm, Esc to cancel) ", title))
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let input = Paragraph::new(value).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(input, popup_area);

    let max_x = popup_area.x + popup_area.width.saturating_sub(2);
    let cursor_x = (popup_area.x + cursor as u16 + 1).min(max_x);
    f.set_cursor_position(Position::new(cursor_x, popup_area.y + 1));
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 80, area);

    let help_text = r#"
 MANDADOS - Keyboard Shortcuts

 NAVIGATION
   Tab / Shift+Tab    Switch tabs
   1-8                Jump to tab
   ↑ / ↓  (j / k)     Select row
   r                  Refresh
   L                  Log out

 FORMS
   e / Enter          Edit fields
   Tab / ↑ / ↓        Next / previous field
   Enter              Submit
   + / -  (PgUp/PgDn) Change order price by $10

 ORDERS
   n                  New order (client) / next step (driver)
   c                  Pay cash (client) / cash received (driver)
   a                  Accept order (driver)

 VERIFICATION (driver)
   s                  Send email code
   v                  Enter code
   i / l              Upload INE / driver's license

 ADMIN
   t                  Toggle user active
   a / x              Approve / reject driver
   p                  Process payout / mark commission paid

 GENERAL
   Ctrl+X             Cancel running requests
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text).block(block).wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

// ============================================================================
// Shared widgets
// ============================================================================

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{}:{}", i + 1, t)))
        .collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// Split an area into a one-line tab bar and the content below
pub fn tab_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Draw every field of a form, one bordered line each
pub fn draw_form(f: &mut Frame, form: &Form, editing: bool, area: Rect) {
    let constraints: Vec<Constraint> = form
        .fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let border_style = if focused && editing {
            Style::default().fg(Color::Yellow)
        } else if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", field.label));
        let rect = chunks[i];
        f.render_widget(Paragraph::new(field.display()).block(block), rect);

        if focused && editing {
            let max_x = rect.x + rect.width.saturating_sub(2);
            let cursor_x = (rect.x + field.display_cursor() as u16 + 1).min(max_x);
            f.set_cursor_position(Position::new(cursor_x, rect.y + 1));
        }
    }
}

/// Breakdown lines for a Financials record
pub fn financial_lines(fin: &Financials) -> Vec<Line<'static>> {
    let row = |label: &str, amount: f64, style: Style| {
        Line::from(vec![
            Span::raw(format!("{:<18}", label)),
            Span::styled(format!("{:>12}", format_currency(amount)), style),
        ])
    };
    let rate = fin
        .commission_rate
        .map(|r| format!("Commission ({:.0}%)", r * 100.0))
        .unwrap_or_else(|| "Commission".to_string());

    vec![
        row("Subtotal", fin.subtotal, Style::default()),
        row("Service fee", fin.service_fee, Style::default()),
        row("IVA (16%)", fin.iva_amount, Style::default()),
        row("Total", fin.total_amount, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        row(&rate, fin.commission_amount, Style::default().fg(Color::DarkGray)),
        row("Driver earns", fin.driver_earnings, Style::default().fg(Color::Green)),
        row("Platform earns", fin.owner_earnings, Style::default().fg(Color::Cyan)),
    ]
}

/// Table of orders with the selected row highlighted
pub fn orders_table<'a>(orders: &'a [Order], title: String, show_people: bool) -> Table<'a> {
    let header = Row::new(if show_people {
        vec!["Title", "Status", "Payment", "Total", "Client", "Driver", "Created"]
    } else {
        vec!["Title", "Status", "Payment", "Total", "Pickup", "Delivery", "Created"]
    })
    .style(Style::default().fg(Color::Cyan).bold());

    let rows = orders.iter().map(|o| {
        let payment = match o.payment_method {
            Some(method) => format!("{} ({})", o.payment_status.label(), method.label()),
            None => o.payment_status.label().to_string(),
        };
        let (c5, c6) = if show_people {
            (
                o.client_name.clone().unwrap_or_else(|| "-".to_string()),
                o.driver_name.clone().unwrap_or_else(|| "-".to_string()),
            )
        } else {
            (o.pickup_address.clone(), o.delivery_address.clone())
        };
        Row::new(vec![
            Cell::from(o.title.clone()),
            Cell::from(o.status.label()).style(Style::default().fg(order_status_color(o.status))),
            Cell::from(payment).style(Style::default().fg(payment_status_color(o.payment_status))),
            Cell::from(format_currency(o.amount_due())),
            Cell::from(c5),
            Cell::from(c6),
            Cell::from(format_date(o.created_at)),
        ])
    });

    Table::new(
        rows,
        [
            Constraint::Percentage(20),
            Constraint::Length(11),
            Constraint::Length(20),
            Constraint::Length(11),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
            Constraint::Length(16),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .row_highlight_style(Style::default().fg(Color::Yellow).bold())
    .highlight_symbol("> ")
}

/// Render a table with `selected` highlighted
pub fn render_selectable(f: &mut Frame, table: Table, selected: usize, len: usize, area: Rect) {
    let mut table_state = TableState::default();
    if len > 0 {
        table_state.select(Some(selected.min(len - 1)));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}

/// Paragraph shown when a list has nothing to show
pub fn empty_block<'a>(title: String, text: &'a str) -> Paragraph<'a> {
    Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(title))
}

// ============================================================================
// Formatting
// ============================================================================

/// Local date and time, `dd/mm/yyyy hh:mm`
pub fn format_date(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub fn order_status_color(status: OrderStatus) -> Color {
    match status {
        OrderStatus::Pending => Color::Yellow,
        OrderStatus::Accepted => Color::Blue,
        OrderStatus::InProgress => Color::Magenta,
        OrderStatus::Delivered => Color::Green,
        OrderStatus::Cancelled => Color::Red,
    }
}

pub fn payment_status_color(status: PaymentStatus) -> Color {
    match status {
        PaymentStatus::Pending => Color::Yellow,
        PaymentStatus::Paid => Color::Green,
        PaymentStatus::Cancelled => Color::Red,
        PaymentStatus::Expired => Color::DarkGray,
    }
}

pub fn document_status_color(status: DocumentStatus) -> Color {
    match status {
        DocumentStatus::Pending => Color::Yellow,
        DocumentStatus::Approved => Color::Green,
        DocumentStatus::Rejected => Color::Red,
    }
}

pub fn transfer_status_color(status: TransferStatus) -> Color {
    match status {
        TransferStatus::Pending => Color::Yellow,
        TransferStatus::Completed => Color::Green,
        TransferStatus::Failed => Color::Red,
    }
}

/// Helper to create a centered rect
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
