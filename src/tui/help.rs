use crate::model::Locale;
use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn bind(keys: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{keys:<12}"), Style::default().fg(Color::Magenta)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame, locale: Locale) {
    let title = match locale {
        Locale::ZhTw => "說明",
        Locale::En => "Help",
    };
    let p = Paragraph::new(vec![
        Line::from("Product list:"),
        bind("↑/↓ j/k", "Select product"),
        bind("←/→ h/l", "Previous / next page"),
        bind("g", "Go to page (type number, Enter)"),
        bind("r", "Reload current page"),
        bind("n", "New product"),
        bind("e / Enter", "Edit selected"),
        bind("d / Del", "Delete selected"),
        bind("L", "Log out"),
        bind("Esc", "Dismiss message"),
        bind("q / Ctrl-C", "Quit"),
        Line::from(""),
        Line::from("Product dialog:"),
        bind("Tab ↑/↓", "Move between fields"),
        bind("Space", "Toggle enabled"),
        bind("Ctrl-A", "Add image row"),
        bind("Ctrl-D", "Remove last image row"),
        bind("Enter", "Save"),
        bind("Esc", "Cancel"),
        Line::from(""),
        Line::from("Delete dialog:"),
        bind("y / Enter", "Confirm"),
        bind("n / Esc", "Cancel"),
        Line::from(""),
        Line::from("Press any key to close"),
    ])
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
