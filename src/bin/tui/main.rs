mod app;

use std::io;
use std::time::Duration;

use app::{format_value, hit_rate, short_date, truncate, AppState, Field, RequestStatus};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame, Terminal,
};

const OVER_COLOR: Color = Color::Rgb(0, 229, 160);
const UNDER_COLOR: Color = Color::Rgb(255, 69, 96);

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> io::Result<()> {
    let base_url = std::env::var("API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(io::Error::other)?;

    let mut app = AppState::new(base_url);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &client).await;

    // Restore terminal regardless of result
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    client: &reqwest::Client,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Tab => app.form.focus = app.form.focus.next(),
            KeyCode::BackTab => app.form.focus = app.form.focus.prev(),
            KeyCode::Left => app.form.cycle(-1),
            KeyCode::Right => app.form.cycle(1),
            KeyCode::Backspace => app.form.backspace(),
            KeyCode::Enter => {
                app.status = RequestStatus::Loading;
                terminal.draw(|f| render(f, app))?;
                app.analyze(client).await;
            }
            KeyCode::Char(c) => app.form.input_char(c),
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(f: &mut Frame, app: &AppState) {
    let area = f.area();

    // Outer vertical split: header | form | body | footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header
            Constraint::Length(3), // form
            Constraint::Min(0),    // body
            Constraint::Length(1), // footer
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    render_form(f, app, chunks[1]);
    render_body(f, app, chunks[2]);
    render_footer(f, chunks[3]);
}

fn render_header(f: &mut Frame, app: &AppState, area: Rect) {
    let (status_text, status_color) = match &app.status {
        RequestStatus::Idle => ("○ idle".to_string(), Color::DarkGray),
        RequestStatus::Loading => ("◌ analyzing".to_string(), Color::Yellow),
        RequestStatus::Ready => ("● ready".to_string(), Color::Green),
        RequestStatus::Error(e) => (format!("✗ {}", truncate(e, 60)), Color::Red),
    };

    let mut spans = vec![
        Span::styled(
            " Prop Analyzer  ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(status_text, Style::default().fg(status_color)),
    ];
    if let Some(r) = &app.result {
        let team = r.team.as_deref().unwrap_or("—");
        spans.push(Span::raw("  │  "));
        spans.push(Span::styled(
            format!("{} ({team})", r.player_name),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
        if let Some(pos) = &r.position {
            spans.push(Span::styled(format!("  {pos}"), Style::default().fg(Color::DarkGray)));
        }
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_form(f: &mut Frame, app: &AppState, area: Rect) {
    let form = &app.form;
    let field = |label: &str, value: String, which: Field| -> Vec<Span<'static>> {
        let focused = form.focus == which;
        let value_style = if focused {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::White)
        };
        vec![
            Span::styled(format!(" {label}: "), Style::default().fg(Color::Yellow)),
            Span::styled(format!(" {value} "), value_style),
            Span::raw(" "),
        ]
    };

    let mut spans = Vec::new();
    spans.extend(field("Player", form.player.clone(), Field::Player));
    spans.extend(field("Stat", format!("‹ {} ›", form.stat_label()), Field::Stat));
    spans.extend(field("Line", form.line.clone(), Field::Line));
    spans.extend(field("Last", format!("‹ {} games ›", form.lookback()), Field::Lookback));

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(paragraph, area);
}

fn render_body(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(result) = &app.result else {
        let hint = Paragraph::new("Enter a player and a line, then press Enter.")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::DarkGray)));
        f.render_widget(hint, area);
        return;
    };

    // Horizontal split: chart (65%) | summary + games (35%)
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    render_chart(f, result, halves[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(halves[1]);
    render_summary(f, result, right[0]);
    render_games_table(f, result, right[1]);
}

fn render_chart(f: &mut Frame, result: &app::AnalysisResponse, area: Rect) {
    let bars: Vec<Bar> = result
        .games
        .iter()
        .map(|g| {
            let color = if g.value > result.input_line { OVER_COLOR } else { UNDER_COLOR };
            Bar::default()
                .value(g.value.max(0.0).round() as u64)
                .text_value(format_value(g.value))
                .label(Line::from(short_date(&g.date).to_string()))
                .style(Style::default().fg(color))
        })
        .collect();

    let n = result.games.len().max(1) as u16;
    let bar_width = (area.width.saturating_sub(2) / n).saturating_sub(1).clamp(3, 9);

    let title = format!(
        " {} · line {} · last {} ",
        result.stat.to_uppercase(),
        format_value(result.input_line),
        result.games.len()
    );
    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(title, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1);

    f.render_widget(chart, area);
}

fn render_summary(f: &mut Frame, result: &app::AnalysisResponse, area: Rect) {
    let total = result.games.len();
    let rate = hit_rate(result.over_count, total);
    let lines = vec![
        Line::from(vec![
            Span::styled("Avg      ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{:.1}", result.last_n_avg), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("Over     ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{} / {total}", result.over_count), Style::default().fg(OVER_COLOR)),
        ]),
        Line::from(vec![
            Span::styled("Under    ", Style::default().fg(Color::DarkGray)),
            Span::styled(format!("{} / {total}", result.under_count), Style::default().fg(UNDER_COLOR)),
        ]),
        Line::from(vec![
            Span::styled("Hit rate ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{rate}%"),
                Style::default().fg(if rate >= 50 { OVER_COLOR } else { UNDER_COLOR }),
            ),
        ]),
    ];
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(" SUMMARY ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))),
    );
    f.render_widget(paragraph, area);
}

fn render_games_table(f: &mut Frame, result: &app::AnalysisResponse, area: Rect) {
    let header_cells = ["Date", "Opp", "Val", "W/L"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));
    let header = Row::new(header_cells).height(1);

    // Newest first, like a box-score list.
    let rows: Vec<Row> = result
        .games
        .iter()
        .rev()
        .map(|g| {
            let color = if g.value > result.input_line { OVER_COLOR } else { UNDER_COLOR };
            Row::new(vec![
                Cell::from(g.date.clone()).style(Style::default().fg(Color::DarkGray)),
                Cell::from(truncate(&g.opponent, 12)),
                Cell::from(format_value(g.value)).style(Style::default().fg(color)),
                Cell::from(g.winlose.clone().unwrap_or_else(|| "—".to_string())),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Min(6),
            Constraint::Length(5),
            Constraint::Length(3),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                " GAMES ",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}

fn render_footer(f: &mut Frame, area: Rect) {
    let line = Line::from(vec![
        Span::styled(" [Tab] ", Style::default().fg(Color::Yellow)),
        Span::raw("next field  "),
        Span::styled("[←→] ", Style::default().fg(Color::Yellow)),
        Span::raw("change stat / games  "),
        Span::styled("[Enter] ", Style::default().fg(Color::Yellow)),
        Span::raw("analyze  "),
        Span::styled("[Esc] ", Style::default().fg(Color::Yellow)),
        Span::raw("quit"),
    ]);
    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}
