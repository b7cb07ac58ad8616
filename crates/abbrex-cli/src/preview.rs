//! Live preview: the abbreviation on the top line, its expansion below.

use std::io::{Stdout, stdout};

use abbrex_config::ConfigLayers;
use abbrex_engine::{Expander, Syntax};
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::Cli;

struct App<'a> {
    cli: &'a Cli,
    layers: ConfigLayers,
    syntax: Syntax,
    expander: Expander,
    input: String,
    output: Result<String, String>,
}

impl<'a> App<'a> {
    fn new(cli: &'a Cli, layers: ConfigLayers) -> Result<Self> {
        let expander = cli.expander(&layers, cli.syntax)?;
        Ok(Self {
            cli,
            layers,
            syntax: cli.syntax,
            expander,
            input: String::new(),
            output: Ok(String::new()),
        })
    }

    fn refresh(&mut self) {
        self.output = if self.input.is_empty() {
            Ok(String::new())
        } else {
            self.expander.expand(&self.input).map_err(|e| e.to_string())
        };
    }

    fn next_syntax(&mut self) {
        let position = Syntax::ALL
            .iter()
            .position(|&syntax| syntax == self.syntax)
            .unwrap_or_default();
        let syntax = Syntax::ALL[(position + 1) % Syntax::ALL.len()];
        match self.cli.expander(&self.layers, syntax) {
            Ok(expander) => {
                self.syntax = syntax;
                self.expander = expander;
            }
            Err(e) => self.output = Err(e.to_string()),
        }
        self.refresh();
    }

    fn type_char(&mut self, c: char) {
        self.input.push(c);
        self.refresh();
    }

    fn backspace(&mut self) {
        self.input.pop();
        self.refresh();
    }
}

pub(crate) fn run(cli: &Cli, layers: ConfigLayers) -> Result<()> {
    let mut app = App::new(cli, layers)?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Ok(output) = &app.output
        && !output.is_empty()
    {
        println!("{output}");
    }
    res
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App<'_>) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Enter => return Ok(()),
                KeyCode::Esc => {
                    app.output = Ok(String::new());
                    return Ok(());
                }
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    app.output = Ok(String::new());
                    return Ok(());
                }
                KeyCode::Tab => app.next_syntax(),
                KeyCode::Backspace => app.backspace(),
                KeyCode::Char(c) => app.type_char(c),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Abbreviation ({})", app.syntax)),
    );
    f.render_widget(input, chunks[0]);
    f.set_cursor_position((
        chunks[0].x + 1 + app.input.chars().count() as u16,
        chunks[0].y + 1,
    ));

    let (lines, style): (Vec<Line>, Style) = match &app.output {
        Ok(text) => (
            text.lines().map(|line| Line::from(line.to_string())).collect(),
            Style::default(),
        ),
        Err(message) => (vec![Line::from(message.clone())], Style::default().fg(Color::Red)),
    };
    let output = Paragraph::new(lines)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Expansion"))
        .wrap(Wrap { trim: false });
    f.render_widget(output, chunks[1]);

    let help = Line::from(vec![
        Span::raw("Enter: Print and quit | "),
        Span::raw("Esc: Quit | "),
        Span::raw("Tab: Next syntax"),
    ]);
    f.render_widget(Paragraph::new(help), chunks[2]);
}
