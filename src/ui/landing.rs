use ratatui::{prelude::*, widgets::*};

use crate::app::state::LandingMode;
use crate::messages::ui_events::InputMode;
use crate::messages::RenderState;
use crate::ui::{centered_rect, draw_form};

pub fn draw(f: &mut Frame, state: &RenderState, area: Rect) {
    let landing = &state.landing;
    let height = match landing.mode {
        LandingMode::Login => 50,
        LandingMode::Register => 80,
    };
    let card = centered_rect(60, height, area);

    let title = match landing.mode {
        LandingMode::Login => " Log in ".to_string(),
        LandingMode::Register => format!(" Create account as {} (o: change) ", landing.role.label()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(title)
        .title_bottom(Line::from(" m: switch between log in and register ").right_aligned());
    let inner = block.inner(card);
    f.render_widget(Clear, card);
    f.render_widget(block, card);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(inner);

    let tagline = Paragraph::new("Deliveries across Mexico, paid in MXN")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(tagline, chunks[0]);

    draw_form(f, landing.active_form(), state.input_mode == InputMode::Editing, chunks[1]);
}
