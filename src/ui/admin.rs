//! Admin dashboard

use ratatui::{prelude::*, widgets::*};

use crate::constants::COMMISSION_PREVIEW_PRICE;
use crate::financials::format_currency;
use crate::messages::ui_events::{AdminTab, InputMode};
use crate::messages::RenderState;
use crate::ui::{
    draw_form, empty_block, financial_lines, format_date, orders_table, payment_status_color, render_selectable,
    render_tabs, tab_layout, transfer_status_color,
};

pub fn draw(f: &mut Frame, state: &RenderState, tab: AdminTab, area: Rect) {
    let (tabs_area, content) = tab_layout(area);
    let titles: Vec<&str> = AdminTab::ALL.iter().map(|t| t.title()).collect();
    let selected = AdminTab::ALL.iter().position(|t| *t == tab).unwrap_or(0);
    f.render_widget(render_tabs(&titles, selected), tabs_area);

    match tab {
        AdminTab::Overview => draw_overview(f, state, content),
        AdminTab::Users => draw_users(f, state, content),
        AdminTab::Orders => draw_orders(f, state, content),
        AdminTab::Drivers => draw_drivers(f, state, content),
        AdminTab::Payments => draw_payments(f, state, content),
        AdminTab::Payouts => draw_payouts(f, state, content),
        AdminTab::Collections => draw_collections(f, state, content),
        AdminTab::Commission => draw_commission(f, state, content),
    }
}

fn header(cols: Vec<&'static str>) -> Row<'static> {
    Row::new(cols).style(Style::default().fg(Color::Cyan).bold())
}

fn bordered(title: String) -> Block<'static> {
    Block::default().borders(Borders::ALL).title(title)
}

fn highlight() -> Style {
    Style::default().fg(Color::Yellow).bold()
}

fn draw_overview(f: &mut Frame, state: &RenderState, area: Rect) {
    let Some(stats) = &state.admin.stats else {
        f.render_widget(empty_block(" Overview ".to_string(), "Loading statistics..."), area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let stat = |label: &str, value: String| {
        Line::from(vec![
            Span::raw(format!("{:<22}", label)),
            Span::styled(value, Style::default().fg(Color::Yellow).bold()),
        ])
    };

    let activity = vec![
        stat("Total orders", stats.total_orders.to_string()),
        stat("Pending orders", stats.pending_orders.to_string()),
        stat("Completed orders", stats.completed_orders.to_string()),
        stat("Active users", stats.active_users.to_string()),
        stat("Active drivers", stats.active_drivers.to_string()),
    ];
    f.render_widget(Paragraph::new(activity).block(bordered(" Activity ".to_string())), chunks[0]);

    let money = vec![
        stat("Total revenue", format_currency(stats.total_revenue)),
        stat("Commission earned", format_currency(stats.total_commission_earned)),
        stat("Revenue this month", format_currency(stats.monthly_revenue)),
        stat("Commission this month", format_currency(stats.monthly_commission)),
        stat("Average order", format_currency(stats.average_order_value)),
    ];
    f.render_widget(Paragraph::new(money).block(bordered(" Revenue ".to_string())), chunks[1]);
}

fn draw_users(f: &mut Frame, state: &RenderState, area: Rect) {
    let users = &state.admin.users;
    let title = format!(" Users ({}) ", users.len());
    if users.is_empty() {
        f.render_widget(empty_block(title, "No users found."), area);
        return;
    }

    let flag = |on: bool| if on { "yes" } else { "no" };
    let rows = users.iter().map(|u| {
        let active_color = if u.is_active { Color::Green } else { Color::Red };
        Row::new(vec![
            Cell::from(u.name.clone()),
            Cell::from(u.email.clone()),
            Cell::from(u.user_type.label()),
            Cell::from(u.active_label()).style(Style::default().fg(active_color)),
            Cell::from(flag(u.is_email_verified)),
            Cell::from(flag(u.is_phone_verified)),
            Cell::from(u.total_orders.to_string()),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(20),
            Constraint::Percentage(25),
            Constraint::Length(8),
            Constraint::Length(9),
            Constraint::Length(7),
            Constraint::Length(7),
            Constraint::Length(7),
        ],
    )
    .header(header(vec!["Name", "Email", "Role", "Status", "Email", "Phone", "Orders"]))
    .block(bordered(title))
    .row_highlight_style(highlight())
    .highlight_symbol("> ");
    render_selectable(f, table, state.admin.selected, users.len(), area);
}

fn draw_orders(f: &mut Frame, state: &RenderState, area: Rect) {
    let orders = &state.admin.orders;
    let title = format!(" All orders ({}) ", orders.len());
    if orders.is_empty() {
        f.render_widget(empty_block(title, "No orders on the platform yet."), area);
        return;
    }
    let table = orders_table(orders, title, true);
    render_selectable(f, table, state.admin.selected, orders.len(), area);
}

fn draw_drivers(f: &mut Frame, state: &RenderState, area: Rect) {
    let drivers = &state.admin.pending_drivers;
    let title = format!(" Drivers awaiting approval ({}) ", drivers.len());
    if drivers.is_empty() {
        f.render_widget(empty_block(title, "No drivers waiting for review."), area);
        return;
    }

    let rows = drivers.iter().map(|d| {
        Row::new(vec![
            Cell::from(d.name.clone()),
            Cell::from(d.email.clone()),
            Cell::from(d.phone.clone()),
            Cell::from(d.status.clone().unwrap_or_else(|| "-".to_string())),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(35),
            Constraint::Length(16),
            Constraint::Min(10),
        ],
    )
    .header(header(vec!["Name", "Email", "Phone", "Status"]))
    .block(bordered(title))
    .row_highlight_style(highlight())
    .highlight_symbol("> ");
    render_selectable(f, table, state.admin.selected, drivers.len(), area);
}

fn draw_payments(f: &mut Frame, state: &RenderState, area: Rect) {
    let transactions = &state.admin.transactions;
    let title = format!(" Payment transactions ({}) ", transactions.len());
    if transactions.is_empty() {
        f.render_widget(empty_block(title, "No payments recorded."), area);
        return;
    }

    let rows = transactions.iter().map(|t| {
        Row::new(vec![
            Cell::from(t.order_id.clone().unwrap_or_else(|| "-".to_string())),
            Cell::from(format!("{} {}", format_currency(t.amount), t.currency.to_uppercase())),
            Cell::from(t.payment_method.map(|m| m.label()).unwrap_or("-")),
            Cell::from(t.payment_status.label()).style(Style::default().fg(payment_status_color(t.payment_status))),
            Cell::from(format_date(t.created_at)),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Length(16),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(16),
        ],
    )
    .header(header(vec!["Order", "Amount", "Method", "Status", "Date"]))
    .block(bordered(title))
    .row_highlight_style(highlight())
    .highlight_symbol("> ");
    render_selectable(f, table, state.admin.selected, transactions.len(), area);
}

fn draw_payouts(f: &mut Frame, state: &RenderState, area: Rect) {
    let payouts = &state.admin.payouts;
    let title = format!(" Driver payouts ({}) ", payouts.len());
    if payouts.is_empty() {
        f.render_widget(empty_block(title, "No payouts to show."), area);
        return;
    }

    let rows = payouts.iter().map(|p| {
        Row::new(vec![
            Cell::from(p.driver_name.clone().unwrap_or_else(|| p.driver_id.clone())),
            Cell::from(p.order_title.clone().unwrap_or_else(|| p.order_id.clone())),
            Cell::from(format_currency(p.amount)),
            Cell::from(p.transfer_status.label()).style(Style::default().fg(transfer_status_color(p.transfer_status))),
            Cell::from(format_date(p.created_at)),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(30),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(16),
        ],
    )
    .header(header(vec!["Driver", "Order", "Amount", "Transfer", "Created"]))
    .block(bordered(title))
    .row_highlight_style(highlight())
    .highlight_symbol("> ");
    render_selectable(f, table, state.admin.selected, payouts.len(), area);
}

fn draw_collections(f: &mut Frame, state: &RenderState, area: Rect) {
    let collections = &state.admin.collections;
    let outstanding: f64 = collections
        .iter()
        .filter(|c| c.is_outstanding())
        .map(|c| c.commission_owed)
        .sum();
    let title = format!(
        " Cash collections ({}) - owed to platform: {} ",
        collections.len(),
        format_currency(outstanding)
    );
    if collections.is_empty() {
        f.render_widget(empty_block(title, "No cash orders collected."), area);
        return;
    }

    let rows = collections.iter().map(|c| {
        Row::new(vec![
            Cell::from(c.driver_name.clone().unwrap_or_else(|| c.driver_id.clone())),
            Cell::from(c.order_title.clone().unwrap_or_else(|| c.order_id.clone())),
            Cell::from(format_currency(c.amount_collected)),
            Cell::from(format_currency(c.commission_owed)),
            Cell::from(c.payment_status.label()).style(Style::default().fg(payment_status_color(c.payment_status))),
            Cell::from(format_date(c.collection_date)),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(20),
            Constraint::Percentage(25),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(16),
        ],
    )
    .header(header(vec!["Driver", "Order", "Collected", "Commission", "Status", "Date"]))
    .block(bordered(title))
    .row_highlight_style(highlight())
    .highlight_symbol("> ");
    render_selectable(f, table, state.admin.selected, collections.len(), area);
}

fn draw_commission(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(10), Constraint::Min(0)])
        .split(chunks[0]);
    draw_form(f, &state.admin.config_form, state.input_mode == InputMode::Editing, left[0]);

    let current = match &state.admin.config {
        Some(c) => vec![
            Line::raw(format!("Commission rate     {:.1}%", c.commission_rate * 100.0)),
            Line::raw(format!("Service fee         {}", format_currency(c.service_fee))),
            Line::raw(format!(
                "Premium monthly     {}",
                format_currency(c.premium_subscription_monthly)
            )),
        ],
        None => vec![Line::styled("Loading current config...", Style::default().fg(Color::DarkGray))],
    };
    f.render_widget(Paragraph::new(current).block(bordered(" Current ".to_string())), left[1]);

    let preview_title = format!(" Preview for a {} order ", format_currency(COMMISSION_PREVIEW_PRICE));
    let lines = match &state.commission_preview {
        Some(preview) => financial_lines(preview),
        None => vec![Line::styled(
            "Enter valid values to see the breakdown",
            Style::default().fg(Color::Red),
        )],
    };
    let block = bordered(preview_title).border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(lines).block(block), chunks[1]);
}
