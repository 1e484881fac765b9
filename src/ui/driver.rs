//! Driver dashboard: available orders, own deliveries and verification

use ratatui::{prelude::*, widgets::*};

use crate::financials::format_currency;
use crate::messages::ui_events::DriverTab;
use crate::messages::RenderState;
use crate::models::{DocumentKind, DocumentStatus};
use crate::ui::{
    document_status_color, empty_block, financial_lines, format_date, orders_table, render_selectable, render_tabs,
    tab_layout,
};

pub fn draw(f: &mut Frame, state: &RenderState, tab: DriverTab, area: Rect) {
    let (tabs_area, content) = tab_layout(area);
    let titles: Vec<&str> = DriverTab::ALL.iter().map(|t| t.title()).collect();
    let selected = DriverTab::ALL.iter().position(|t| *t == tab).unwrap_or(0);
    f.render_widget(render_tabs(&titles, selected), tabs_area);

    match tab {
        DriverTab::Available => draw_available(f, state, content),
        DriverTab::Mine => draw_mine(f, state, content),
        DriverTab::Verification => draw_verification(f, state, content),
    }
}

/// One-line gate banner above the order lists
fn gate_banner(state: &RenderState) -> Paragraph<'static> {
    let phone = state.phone_verified();
    match &state.driver.verification {
        Some(v) if v.may_accept_orders(phone) => Paragraph::new(" Verified: you can accept orders")
            .style(Style::default().fg(Color::Green)),
        Some(v) => Paragraph::new(format!(
            " Verification incomplete: {}",
            v.missing_steps(phone).join(", ")
        ))
        .style(Style::default().fg(Color::Yellow)),
        None => Paragraph::new(" Checking verification...").style(Style::default().fg(Color::DarkGray)),
    }
}

fn draw_available(f: &mut Frame, state: &RenderState, area: Rect) {
    let driver = &state.driver;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    f.render_widget(gate_banner(state), chunks[0]);

    let title = format!(" Available orders ({}) ", driver.available.len());
    if driver.available.is_empty() {
        f.render_widget(empty_block(title, "No orders waiting for a driver."), chunks[1]);
        return;
    }
    let table = orders_table(&driver.available, title, false);
    render_selectable(f, table, driver.selected, driver.available.len(), chunks[1]);
}

fn draw_mine(f: &mut Frame, state: &RenderState, area: Rect) {
    let driver = &state.driver;
    let title = format!(" My deliveries ({}) ", driver.mine.len());
    if driver.mine.is_empty() {
        f.render_widget(empty_block(title, "You have no deliveries yet."), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(12)])
        .split(area);

    let table = orders_table(&driver.mine, title, false);
    render_selectable(f, table, driver.selected, driver.mine.len(), chunks[0]);

    let Some(order) = driver.mine.get(driver.selected) else {
        return;
    };
    let driver_id = state.user.as_ref().map(|u| u.id.as_str()).unwrap_or("");
    let mut lines = vec![
        Line::from(Span::styled(order.title.clone(), Style::default().bold())),
        Line::raw(format!("Client: {}", order.client_name.as_deref().unwrap_or("-"))),
        Line::raw(format!("{}  ->  {}", order.pickup_address, order.delivery_address)),
    ];
    if let Some(next) = order.next_driver_step(driver_id) {
        lines.push(Line::styled(
            format!("n: mark as {}", next.label()),
            Style::default().fg(Color::Cyan),
        ));
    }
    if order.can_complete_cash(driver_id) {
        lines.push(Line::styled(
            format!("c: confirm {} received in cash", format_currency(order.amount_due())),
            Style::default().fg(Color::Cyan),
        ));
    }
    lines.push(Line::raw(""));
    if let Some(fin) = &order.financials {
        lines.extend(financial_lines(fin));
    }
    let detail = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Details "))
        .wrap(Wrap { trim: false });
    f.render_widget(detail, chunks[1]);
}

fn check(done: bool) -> Span<'static> {
    if done {
        Span::styled("[x] ", Style::default().fg(Color::Green))
    } else {
        Span::styled("[ ] ", Style::default().fg(Color::Yellow))
    }
}

fn draw_verification(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(area);

    let Some(v) = &state.driver.verification else {
        f.render_widget(empty_block(" Verification ".to_string(), "Loading verification status..."), area);
        return;
    };

    let phone = state.phone_verified();
    let mut lines = vec![
        Line::from(vec![check(phone), Span::raw("Phone number")]),
        Line::from(vec![check(v.email_verified), Span::raw("Email (s: send code, v: enter code)")]),
    ];
    for kind in DocumentKind::REQUIRED {
        let status = v.documents_status.get(kind);
        let key = match kind {
            DocumentKind::Ine => 'i',
            DocumentKind::DriversLicense => 'l',
            _ => continue,
        };
        lines.push(Line::from(vec![
            check(status == DocumentStatus::Approved),
            Span::raw(format!("{} ", kind.label())),
            Span::styled(status.label(), Style::default().fg(document_status_color(status))),
            Span::styled(format!("  ({}: upload)", key), Style::default().fg(Color::DarkGray)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(if v.may_accept_orders(phone) {
        Line::styled("You can accept orders", Style::default().fg(Color::Green).bold())
    } else {
        Line::styled(
            "Complete every step to start accepting orders",
            Style::default().fg(Color::Yellow).bold(),
        )
    });
    let status = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Verification "));
    f.render_widget(status, chunks[0]);

    let documents = &state.driver.documents;
    let title = format!(" Documents ({}) ", documents.len());
    if documents.is_empty() {
        f.render_widget(empty_block(title, "No documents uploaded yet."), chunks[1]);
        return;
    }
    let header = Row::new(vec!["Type", "File", "Uploaded", "Status", "Comments"])
        .style(Style::default().fg(Color::Cyan).bold());
    let rows = documents.iter().map(|d| {
        Row::new(vec![
            Cell::from(d.document_type.label()),
            Cell::from(d.file_name.clone()),
            Cell::from(format_date(d.upload_date)),
            Cell::from(d.status.label()).style(Style::default().fg(document_status_color(d.status))),
            Cell::from(d.admin_comments.clone().unwrap_or_default()),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(18),
            Constraint::Percentage(25),
            Constraint::Length(16),
            Constraint::Length(10),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(table, chunks[1]);
}
