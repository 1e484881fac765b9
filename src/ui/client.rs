//! Client dashboard: own orders and the order form with its live preview

use ratatui::{prelude::*, widgets::*};

use crate::messages::ui_events::{ClientTab, InputMode};
use crate::messages::RenderState;
use crate::ui::{draw_form, empty_block, financial_lines, orders_table, render_selectable, render_tabs, tab_layout};

pub fn draw(f: &mut Frame, state: &RenderState, tab: ClientTab, area: Rect) {
    let (tabs_area, content) = tab_layout(area);
    let titles: Vec<&str> = ClientTab::ALL.iter().map(|t| t.title()).collect();
    let selected = ClientTab::ALL.iter().position(|t| *t == tab).unwrap_or(0);
    f.render_widget(render_tabs(&titles, selected), tabs_area);

    match tab {
        ClientTab::Orders => draw_orders(f, state, content),
        ClientTab::NewOrder => draw_new_order(f, state, content),
    }
}

fn draw_orders(f: &mut Frame, state: &RenderState, area: Rect) {
    let client = &state.client;
    let title = format!(" My orders ({}) ", client.orders.len());
    if client.orders.is_empty() {
        f.render_widget(empty_block(title, "No orders yet. Press n to create one."), area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(12)])
        .split(area);

    let table = orders_table(&client.orders, title, false);
    render_selectable(f, table, client.selected, client.orders.len(), chunks[0]);

    if let Some(order) = client.orders.get(client.selected) {
        let mut lines = vec![
            Line::from(Span::styled(order.title.clone(), Style::default().bold())),
            Line::raw(order.description.clone()),
            Line::raw(format!("Driver: {}", order.driver_name.as_deref().unwrap_or("not assigned yet"))),
            Line::raw(""),
        ];
        match &order.financials {
            Some(fin) => lines.extend(financial_lines(fin)),
            None => lines.push(Line::raw("No breakdown available")),
        }
        if order.can_choose_cash() {
            lines.push(Line::styled("c: pay cash on delivery", Style::default().fg(Color::DarkGray)));
        }
        let detail = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title(" Details "))
            .wrap(Wrap { trim: false });
        f.render_widget(detail, chunks[1]);
    }
}

fn draw_new_order(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    draw_form(f, &state.client.form, state.input_mode == InputMode::Editing, chunks[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Preview ")
        .border_style(Style::default().fg(Color::Cyan));
    let lines = match (&state.order_preview, &state.order_price_error) {
        (Some(preview), _) => {
            let mut lines = financial_lines(preview);
            lines.push(Line::raw(""));
            lines.push(Line::styled(
                "Price moves in $10 steps between $50 and $5,000",
                Style::default().fg(Color::DarkGray),
            ));
            lines
        }
        (None, Some(err)) => vec![Line::styled(err.clone(), Style::default().fg(Color::Red))],
        (None, None) => Vec::new(),
    };
    f.render_widget(Paragraph::new(lines).block(block), chunks[1]);
}
