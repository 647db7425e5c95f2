use super::help::draw_help;
use super::state::{field_label, form_rows, FormRow, LoginField, UiState};
use crate::listing::{headers, page_label, row_cells};
use crate::model::{enabled_label, Locale};
use crate::orchestrator::{Modal, ProductField};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

const KEY: Style = Style::new().fg(Color::Magenta);
const FOCUS: Style = Style::new().fg(Color::Yellow);
const MUTED: Style = Style::new().fg(Color::DarkGray);

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

pub fn draw(area: Rect, f: &mut Frame, state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    draw_header(chunks[0], f, state);
    if state.app.authenticated {
        draw_products(chunks[1], f, state);
        draw_pager(chunks[2], f, state);
    } else {
        draw_login(chunks[1], f, state);
    }
    draw_status(chunks[3], f, state);

    if state.app.authenticated {
        match state.app.modal {
            Modal::CreateEdit => draw_form(area, f, state),
            Modal::Delete => draw_confirm(area, f, state),
            Modal::Closed => {}
        }
    }
    if state.show_help {
        draw_help(centered(area, 60, 28), f, state.locale);
    }
}

fn draw_header(area: Rect, f: &mut Frame, state: &UiState) {
    let session = match (state.locale, state.app.authenticated) {
        (Locale::ZhTw, true) => "已登入",
        (Locale::ZhTw, false) => "未登入",
        (Locale::En, true) => "signed in",
        (Locale::En, false) => "signed out",
    };
    let mut spans = vec![Span::raw(session)];
    if state.app.authenticated {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("?", KEY));
        spans.push(Span::raw(" help"));
    }
    let p = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("catalog-admin"));
    f.render_widget(p, area);
}

fn draw_login(area: Rect, f: &mut Frame, state: &UiState) {
    let (title, user_label, pass_label, hint) = match state.locale {
        Locale::ZhTw => ("登入", "帳號", "密碼", "Enter 登入 / Esc 離開"),
        Locale::En => ("Sign in", "Username", "Password", "Enter to sign in, Esc to quit"),
    };
    let form = &state.login;
    let masked = "*".repeat(form.password.chars().count());
    let field = |label: &str, value: String, focused: bool| {
        let style = if focused { FOCUS } else { Style::default() };
        let cursor = if focused { "_" } else { "" };
        Line::from(vec![
            Span::styled(format!("{label:<10}"), style),
            Span::raw(value),
            Span::styled(cursor.to_string(), FOCUS),
        ])
    };

    let p = Paragraph::new(vec![
        field(
            user_label,
            form.username.clone(),
            form.focus == LoginField::Username,
        ),
        field(pass_label, masked, form.focus == LoginField::Password),
        Line::from(""),
        Line::from(Span::styled(hint, MUTED)),
    ])
    .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, centered(area, 50, 6));
}

fn draw_products(area: Rect, f: &mut Frame, state: &UiState) {
    let locale = state.locale;
    let header = Row::new(headers(locale).iter().map(|h| Cell::from(*h)))
        .style(FOCUS.add_modifier(Modifier::BOLD));
    let rows = state.app.products.iter().map(|p| {
        let style = if p.is_enabled {
            Style::default()
        } else {
            MUTED
        };
        Row::new(row_cells(p, locale).into_iter().map(Cell::from)).style(style)
    });
    let widths = [
        Constraint::Percentage(15),
        Constraint::Percentage(35),
        Constraint::Percentage(15),
        Constraint::Percentage(15),
        Constraint::Percentage(20),
    ];
    let title = match locale {
        Locale::ZhTw => format!("產品列表 ({})", state.app.products.len()),
        Locale::En => format!("Products ({})", state.app.products.len()),
    };
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut table_state = TableState::default();
    if !state.app.products.is_empty() {
        table_state.select(Some(state.selected));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_pager(area: Rect, f: &mut Frame, state: &UiState) {
    let info = &state.app.page_info;
    let arrow = |text: &'static str, enabled: bool| {
        Span::styled(text, if enabled { KEY } else { MUTED })
    };
    let mut spans = vec![
        Span::raw(" "),
        arrow("« h", info.prev_page().is_some()),
        Span::raw("  "),
        Span::raw(page_label(info, state.locale)),
        Span::raw("  "),
        arrow("l »", info.next_page().is_some()),
    ];
    if let Some(buf) = &state.page_input {
        let prompt = match state.locale {
            Locale::ZhTw => "    跳至頁數: ",
            Locale::En => "    Go to page: ",
        };
        spans.push(Span::raw(prompt));
        spans.push(Span::styled(format!("{buf}_"), FOCUS));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status(area: Rect, f: &mut Frame, state: &UiState) {
    let line = if let Some(notice) = state.app.notice {
        let color = if notice.is_failure() {
            Color::Red
        } else {
            Color::Green
        };
        Line::from(Span::styled(
            format!(" {}", notice.to_message(state.locale)),
            Style::default().fg(color),
        ))
    } else if state.app.busy {
        let working = match state.locale {
            Locale::ZhTw => " 處理中…",
            Locale::En => " Working…",
        };
        Line::from(Span::styled(working, MUTED))
    } else {
        Line::from("")
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_form(area: Rect, f: &mut Frame, state: &UiState) {
    let locale = state.locale;
    let staged = &state.app.staged;
    let rows = form_rows(staged);

    let mut lines: Vec<Line> = Vec::with_capacity(rows.len() + 2);
    for (i, row) in rows.iter().enumerate() {
        let focused = i == state.form_focus;
        let marker = if focused { "> " } else { "  " };
        let style = if focused { FOCUS } else { Style::default() };
        let (label, value) = match *row {
            FormRow::Field(ProductField::IsEnabled) => {
                let boxed = if staged.is_enabled { "[x]" } else { "[ ]" };
                (
                    field_label(ProductField::IsEnabled, locale).to_string(),
                    format!("{boxed} {}", enabled_label(staged.is_enabled, locale)),
                )
            }
            FormRow::Field(field) => (
                field_label(field, locale).to_string(),
                staged.text(field).to_string(),
            ),
            FormRow::Image(index) => {
                let label = match locale {
                    Locale::ZhTw => format!("圖片 {}", index + 1),
                    Locale::En => format!("Image {}", index + 1),
                };
                (label, staged.images_url[index].clone())
            }
        };
        lines.push(Line::from(vec![
            Span::styled(marker, FOCUS),
            Span::styled(format!("{label:<12}"), style),
            Span::raw(value),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("Enter", KEY),
        Span::raw(" save  "),
        Span::styled("Esc", KEY),
        Span::raw(" cancel  "),
        Span::styled("Ctrl-A/D", KEY),
        Span::raw(" add/remove image"),
    ]));

    let title = match (locale, state.app.is_new) {
        (Locale::ZhTw, true) => "新增產品",
        (Locale::ZhTw, false) => "編輯產品",
        (Locale::En, true) => "New product",
        (Locale::En, false) => "Edit product",
    };
    let height = (lines.len() as u16).saturating_add(2);
    let rect = centered(area, 76, height);
    let visible = rect.height.saturating_sub(2) as usize;
    let scroll = (state.form_focus + 1).saturating_sub(visible) as u16;

    let p = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

fn draw_confirm(area: Rect, f: &mut Frame, state: &UiState) {
    let name = &state.app.staged.title;
    let (title, question) = match state.locale {
        Locale::ZhTw => ("刪除產品", format!("是否刪除 {name} 產品？")),
        Locale::En => ("Delete product", format!("Delete {name}?")),
    };
    let p = Paragraph::new(vec![
        Line::from(question),
        Line::from(""),
        Line::from(vec![
            Span::styled("y", KEY),
            Span::raw(" confirm  "),
            Span::styled("n", KEY),
            Span::raw(" cancel"),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(title),
    );
    let rect = centered(area, 50, 5);
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
