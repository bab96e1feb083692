//! Rendering of the forecast screen.
//!
//! Left column: area selector and status line. Right column: result text.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::App;

/// Color palette
pub mod colors {
    use ratatui::style::Color;

    pub const PRIMARY: Color = Color::Rgb(78, 205, 196); // #4ECDC4
    pub const WARNING: Color = Color::Rgb(255, 217, 61); // #FFD93D
    pub const DIMMED: Color = Color::Rgb(136, 136, 136); // #888
    pub const TEXT: Color = Color::Rgb(204, 204, 204); // #CCC
    pub const BORDER: Color = Color::Rgb(68, 68, 68); // #444
}

const LEFT_PANEL_WIDTH: u16 = 40;

pub fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(5),    // Panels
            Constraint::Length(1), // Hints
        ])
        .split(area);

    render_header(f, app, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LEFT_PANEL_WIDTH), Constraint::Min(20)])
        .split(chunks[1]);

    render_selector(f, app, columns[0]);
    render_result(f, app, columns[1]);
    render_hints(f, chunks[2]);
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let header = Line::from(vec![
        Span::styled(
            format!(" {} ", app.title),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(colors::DIMMED),
        ),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(colors::BORDER))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        ))
}

fn render_selector(f: &mut Frame, app: &App, area: Rect) {
    let status_height = 4;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(status_height)])
        .split(area);

    let items: Vec<ListItem> = app
        .model
        .areas()
        .iter()
        .map(|a| ListItem::new(a.label()))
        .collect();

    let list = List::new(items)
        .block(panel("地域選択"))
        .style(Style::default().fg(colors::TEXT))
        .highlight_style(
            Style::default()
                .fg(colors::PRIMARY)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.model.selected_index());
    f.render_stateful_widget(list, chunks[0], &mut state);

    let status_style = if app.model.is_loading() {
        Style::default().fg(colors::WARNING)
    } else {
        Style::default().fg(colors::DIMMED)
    };
    let status = Paragraph::new(app.model.status())
        .style(status_style)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(colors::BORDER)),
        );
    f.render_widget(status, chunks[1]);
}

fn render_result(f: &mut Frame, app: &App, area: Rect) {
    let result = Paragraph::new(app.model.result_text())
        .style(Style::default().fg(colors::TEXT))
        .wrap(Wrap { trim: false })
        .block(panel("結果"));
    f.render_widget(result, area);
}

fn render_hints(f: &mut Frame, area: Rect) {
    let hints = Line::from(vec![
        Span::styled(" ↑/↓", Style::default().fg(colors::PRIMARY)),
        Span::styled(" 選択  ", Style::default().fg(colors::DIMMED)),
        Span::styled("Enter", Style::default().fg(colors::PRIMARY)),
        Span::styled(" 表示  ", Style::default().fg(colors::DIMMED)),
        Span::styled("q", Style::default().fg(colors::PRIMARY)),
        Span::styled(" 終了", Style::default().fg(colors::DIMMED)),
    ]);
    f.render_widget(Paragraph::new(hints), area);
}
