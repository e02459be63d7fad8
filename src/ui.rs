use anyhow::Result;
use chart_of_accounts::{ChartOfAccounts, ChildForm, ClassForm, MutationOutcome, NodeKind, Status, TreeRow};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    /// Typing the title of a new node
    AddTitle,
    /// Typing the manual code of a new node
    AddCode,
}

pub struct App {
    pub chart: ChartOfAccounts,
    pub query: String,
    pub mode: InputMode,
    pub input: String,
    pub draft_title: String,
    pub state: ListState,
    pub message: Option<String>,
}

impl App {
    pub fn new(chart: ChartOfAccounts) -> Self {
        let mut state = ListState::default();
        state.select(Some(0));

        Self {
            chart,
            query: String::new(),
            mode: InputMode::Normal,
            input: String::new(),
            draft_title: String::new(),
            state,
            message: None,
        }
    }

    pub fn rows(&self) -> Vec<TreeRow> {
        self.chart.visible_rows(&self.query)
    }

    pub fn selected_row(&self) -> Option<TreeRow> {
        let rows = self.rows();
        self.state.selected().and_then(|i| rows.get(i).cloned())
    }

    fn clamp_selection(&mut self) {
        let len = self.rows().len();
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    pub fn next(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.rows().len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    /// Toggle the selected node. Ignored during a search, where everything is open.
    pub fn toggle_selected(&mut self) {
        if !self.query.trim().is_empty() {
            return;
        }
        if let Some(row) = self.selected_row() {
            if row.key.kind.is_leaf() {
                return;
            }
            self.chart.toggle(&row.key);
            self.clamp_selection();
        }
    }

    /// Flip Active/Inactive on the selected node, keeping its title
    pub fn toggle_status(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let status = match row.status {
            Status::Active => Status::Inactive,
            Status::Inactive => Status::Active,
        };

        let outcome = if row.key.kind == NodeKind::Class {
            let Some(class) = self.chart.store().get(&row.key).cloned() else {
                return;
            };
            self.chart.create_or_update_class(ClassForm {
                id: Some(class.id),
                title: class.title,
                manual_code: class.manual_code,
                status,
            })
        } else {
            self.chart.create_or_update(
                row.key.kind,
                ChildForm {
                    id: Some(row.key.id.clone()),
                    title: row.title.clone(),
                    status,
                    ..ChildForm::default()
                },
            )
        };
        self.report(outcome, &row.title);
    }

    /// Level the next "add" creates: a child of the selection, or a Class
    pub fn add_target(&self) -> (NodeKind, Option<String>) {
        match self.selected_row() {
            Some(row) => match row.key.kind.child_kind() {
                Some(child) => (child, Some(row.key.id)),
                None => (NodeKind::GlAccount, self.parent_of_leaf(&row)),
            },
            None => (NodeKind::Class, None),
        }
    }

    fn parent_of_leaf(&self, row: &TreeRow) -> Option<String> {
        self.chart
            .store()
            .get(&row.key)
            .and_then(|node| node.parent_id.clone())
    }

    fn submit_new_node(&mut self, manual_code: String) {
        let title = std::mem::take(&mut self.draft_title);
        let (kind, parent_id) = self.add_target();
        let form = ChildForm {
            id: None,
            parent_id: parent_id.unwrap_or_default(),
            title: title.clone(),
            manual_code,
            status: Status::Active,
        };

        let outcome = self.chart.create_or_update(kind, form);
        if outcome.is_applied() {
            if let Some(row) = self.selected_row() {
                if !row.expanded && !row.key.kind.is_leaf() {
                    self.chart.toggle(&row.key);
                }
            }
        }
        self.report(outcome, &title);
    }

    fn report(&mut self, outcome: MutationOutcome, title: &str) {
        self.message = Some(match outcome {
            MutationOutcome::Created(_) => format!("Created \"{}\"", title),
            MutationOutcome::Updated(_) => format!("Updated \"{}\"", title),
            MutationOutcome::Rejected(errors) => errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        });
    }

    /// Handle one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Esc => {
                    if self.query.is_empty() {
                        return true;
                    }
                    self.query.clear();
                    self.clamp_selection();
                }
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.previous(),
                KeyCode::Home => self.state.select(Some(0)),
                KeyCode::End => {
                    let len = self.rows().len();
                    if len > 0 {
                        self.state.select(Some(len - 1));
                    }
                }
                KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
                KeyCode::Char('e') => self.chart.expand_all(),
                KeyCode::Char('c') => {
                    self.chart.collapse_all();
                    self.clamp_selection();
                }
                KeyCode::Char('x') => self.toggle_status(),
                KeyCode::Char('/') => {
                    self.mode = InputMode::Search;
                    self.input = self.query.clone();
                }
                KeyCode::Char('a') => {
                    self.mode = InputMode::AddTitle;
                    self.input.clear();
                    self.message = None;
                }
                _ => {}
            },
            InputMode::Search => match key.code {
                KeyCode::Esc => {
                    self.mode = InputMode::Normal;
                    self.query.clear();
                    self.input.clear();
                    self.clamp_selection();
                }
                KeyCode::Enter => self.mode = InputMode::Normal,
                KeyCode::Backspace => {
                    self.input.pop();
                    self.query = self.input.clone();
                    self.state.select(Some(0));
                    self.clamp_selection();
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    self.query = self.input.clone();
                    self.state.select(Some(0));
                    self.clamp_selection();
                }
                _ => {}
            },
            InputMode::AddTitle | InputMode::AddCode => match key.code {
                KeyCode::Esc => {
                    self.mode = InputMode::Normal;
                    self.input.clear();
                    self.draft_title.clear();
                }
                KeyCode::Backspace => {
                    self.input.pop();
                }
                KeyCode::Enter if self.mode == InputMode::AddTitle => {
                    self.draft_title = std::mem::take(&mut self.input);
                    self.mode = InputMode::AddCode;
                }
                KeyCode::Enter => {
                    let code = std::mem::take(&mut self.input);
                    self.mode = InputMode::Normal;
                    self.submit_new_node(code);
                }
                KeyCode::Char(c) => self.input.push(c),
                _ => {}
            },
        }
        false
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "terminal browser failed");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search bar
            Constraint::Min(0),    // Tree
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_search(f, chunks[0], app);
    render_tree(f, chunks[1], app);
    render_status_bar(f, chunks[2], app);
}

fn render_search(f: &mut Frame, area: Rect, app: &App) {
    let (label, text, color) = match app.mode {
        InputMode::Search => ("Search", app.input.as_str(), Color::Yellow),
        InputMode::AddTitle => ("New title", app.input.as_str(), Color::Green),
        InputMode::AddCode => ("New code", app.input.as_str(), Color::Green),
        InputMode::Normal => ("Search", app.query.as_str(), Color::DarkGray),
    };

    let mut spans = vec![
        Span::styled(format!("{}: ", label), Style::default().fg(color)),
        Span::raw(text.to_string()),
    ];
    if matches!(app.mode, InputMode::AddTitle | InputMode::AddCode) {
        let (kind, _) = app.add_target();
        spans.push(Span::styled(
            format!("   ({})", kind.label()),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let bar = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(bar, area);
}

fn render_tree(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.rows();

    let items: Vec<ListItem> = rows
        .iter()
        .map(|row| {
            let marker = if row.key.kind.is_leaf() {
                "  "
            } else if row.expanded {
                "▾ "
            } else {
                "▸ "
            };
            let title_style = if row.status.is_active() {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
            };

            ListItem::new(Line::from(vec![
                Span::raw("  ".repeat(row.depth)),
                Span::styled(marker, Style::default().fg(Color::Cyan)),
                Span::styled(format!("{:<18}", row.code), Style::default().fg(Color::Yellow)),
                Span::styled(row.title.clone(), title_style),
                Span::styled(
                    format!("  {}", row.key.kind.label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let title = if app.query.trim().is_empty() {
        " Chart of Accounts ".to_string()
    } else {
        format!(" Chart of Accounts - {} match rows ", rows.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(title),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(list, area, &mut app.state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = Vec::new();

    if let Some(message) = &app.message {
        status_spans.push(Span::styled(format!(" {} ", message), Style::default().fg(Color::Green)));
        status_spans.push(Span::raw(" | "));
    }

    for (key, label) in [
        ("Enter", " Toggle | "),
        ("e/c", " Expand/Collapse all | "),
        ("/", " Search | "),
        ("a", " Add | "),
        ("x", " Status | "),
    ] {
        status_spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(label));
    }
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn app() -> App {
        App::new(ChartOfAccounts::with_defaults().unwrap())
    }

    #[test]
    fn test_search_then_escape_restores_rows() {
        let mut app = app();
        let before = app.rows().len();

        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "payroll");
        assert_eq!(app.rows().last().unwrap().title, "Payroll Account");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(app.rows().len(), before);
    }

    #[test]
    fn test_toggle_selected_opens_group() {
        let mut app = app();
        // Row 0 is Assets (open), row 1 Current Assets (closed)
        press(&mut app, KeyCode::Down);
        let before = app.rows().len();
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.rows().len(), before + 2);
    }

    #[test]
    fn test_add_child_under_selection() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "Prepaid Assets");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "3");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.message.as_deref(), Some("Created \"Prepaid Assets\""));
        assert_eq!(app.chart.store().count_kind(NodeKind::Group), 7);
    }

    #[test]
    fn test_add_with_blank_title_is_rejected() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);

        assert!(app.message.as_deref().unwrap().contains("title"));
        assert_eq!(app.chart.store().count_kind(NodeKind::Group), 6);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert!(!press(&mut app, KeyCode::Char('j')));
        assert!(press(&mut app, KeyCode::Char('q')));
    }
}
