use anyhow::Result;
use club_registry::{Club, Registration, RegistrationStore};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

const PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browse,
    Search,
}

pub struct App {
    store: RegistrationStore,
    /// Current search box contents
    pub query: String,
    /// (insertion number, registration) pairs matching `query`
    pub visible: Vec<(usize, Registration)>,
    pub state: TableState,
    pub mode: Mode,
}

impl App {
    pub fn new(store: RegistrationStore) -> Self {
        let mut app = Self {
            store,
            query: String::new(),
            visible: Vec::new(),
            state: TableState::default(),
            mode: Mode::Browse,
        };
        app.refresh();
        app
    }

    /// Re-run the search and keep the selection in range
    pub fn refresh(&mut self) {
        self.visible = self
            .store
            .search_numbered(&self.query)
            .into_iter()
            .map(|(id, reg)| (id, reg.clone()))
            .collect();

        let selected = match self.state.selected() {
            _ if self.visible.is_empty() => None,
            Some(i) if i < self.visible.len() => Some(i),
            _ => Some(0),
        };
        self.state.select(selected);
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.refresh();
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.refresh();
    }

    pub fn clear_search(&mut self) {
        self.query.clear();
        self.refresh();
    }

    pub fn total(&self) -> usize {
        self.store.len()
    }

    /// Registrations per club, over the whole store
    pub fn club_counts(&self) -> Vec<(Club, usize)> {
        Club::ALL
            .iter()
            .map(|club| {
                let count = self.store.all().iter().filter(|r| r.club == *club).count();
                (*club, count)
            })
            .collect()
    }

    pub fn next(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) => len - 1,
            Some(i) => i - 1,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.visible.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + PAGE_SIZE).min(len - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = self.state.selected().map(|i| i.saturating_sub(PAGE_SIZE)).unwrap_or(0);
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.mode {
            Mode::Search => match key.code {
                KeyCode::Esc | KeyCode::Enter => app.mode = Mode::Browse,
                KeyCode::Backspace => app.pop_char(),
                KeyCode::Down => app.next(),
                KeyCode::Up => app.previous(),
                KeyCode::Char(c) => app.push_char(c),
                _ => {}
            },
            Mode::Browse => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('/') => app.mode = Mode::Search,
                KeyCode::Char('c') => app.clear_search(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home if !app.visible.is_empty() => app.state.select(Some(0)),
                KeyCode::End if !app.visible.is_empty() => {
                    app.state.select(Some(app.visible.len() - 1))
                }
                _ => {}
            },
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Club totals
            Constraint::Length(3), // Search box
            Constraint::Min(0),    // Registrations
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_search(f, chunks[1], app);
    render_table(f, chunks[2], app);
    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        format!("Total: {}", app.total()),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];

    for (club, count) in app.club_counts() {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!("{} {}", club.label(), count),
            Style::default().fg(Color::Cyan),
        ));
    }

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Club Registrations "),
    );

    f.render_widget(header, area);
}

fn render_search(f: &mut Frame, area: Rect, app: &App) {
    let border = if app.mode == Mode::Search {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let text = if app.query.is_empty() && app.mode == Mode::Browse {
        Span::styled("press / to search", Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(app.query.clone())
    };

    let search = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Search "),
    );

    f.render_widget(search, area);
}

fn render_table(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["#", "Name", "Email", "Club", "Registered"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = app.visible.iter().map(|(id, reg)| {
        Row::new(vec![
            Cell::from(format!("#{}", id)),
            Cell::from(truncate(&reg.name, 30)),
            Cell::from(truncate(&reg.email, 34)),
            Cell::from(reg.club.label()).style(Style::default().fg(Color::Green)),
            Cell::from(reg.date_string()),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(32),
            Constraint::Length(36),
            Constraint::Length(18),
            Constraint::Length(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} shown ", app.visible.len())),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.visible.len()),
        Style::default().fg(Color::Cyan),
    )];

    let keys: &[(&str, &str)] = match app.mode {
        Mode::Search => &[("Esc/Enter", " Done"), ("Backspace", " Delete")],
        Mode::Browse => &[
            ("/", " Search"),
            ("c", " Clear"),
            ("↑/↓", " Nav"),
            ("PgUp/PgDn", " Fast"),
        ],
    };
    for (key, action) in keys {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(*action));
    }
    if app.mode == Mode::Browse {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        spans.push(Span::raw(" Quit"));
    }

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
