mod ui;
mod widgets;

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use quiztrace::models::{Snapshot, TopicSummary};
use quiztrace::quiz::{AnswerOutcome, Question, QuizSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Quiz,
    Topics,
    Dashboard,
}

impl View {
    fn next(&self) -> Self {
        match self {
            View::Quiz => View::Topics,
            View::Topics => View::Dashboard,
            View::Dashboard => View::Quiz,
        }
    }

    fn prev(&self) -> Self {
        match self {
            View::Quiz => View::Dashboard,
            View::Topics => View::Quiz,
            View::Dashboard => View::Topics,
        }
    }
}

pub struct StatefulList<T> {
    pub items: Vec<T>,
    pub selected: Option<usize>,
}

impl<T> StatefulList<T> {
    fn with_items(items: Vec<T>) -> Self {
        let selected = if items.is_empty() { None } else { Some(0) };
        Self { items, selected }
    }

    fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.selected = Some(i);
    }

    fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.selected = Some(i);
    }
}

pub struct App {
    session: QuizSession,
    pub view: View,
    /// Index of the question on screen
    pub current: usize,
    /// Highlighted option of the current question
    pub option_cursor: usize,
    /// One slot per queued question; filled once it is answered
    pub outcomes: Vec<Option<AnswerOutcome>>,
    pub topics: StatefulList<TopicSummary>,
    pub snapshot: Snapshot,
    pub recommended: Option<String>,
    rng: StdRng,
    pub should_quit: bool,
}

impl App {
    pub fn new(session: QuizSession) -> Self {
        Self::with_rng(session, StdRng::from_entropy())
    }

    fn with_rng(session: QuizSession, rng: StdRng) -> Self {
        let snapshot = session.snapshot();
        let outcomes = vec![None; session.questions().len()];
        let mut app = Self {
            session,
            view: View::Quiz,
            current: 0,
            option_cursor: 0,
            outcomes,
            topics: StatefulList::with_items(snapshot.per_topic.clone()),
            snapshot,
            recommended: None,
            rng,
            should_quit: false,
        };
        app.refresh_data();
        app
    }

    pub fn questions(&self) -> &[Question] {
        self.session.questions()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.questions().get(self.current)
    }

    pub fn current_outcome(&self) -> Option<&AnswerOutcome> {
        self.outcomes.get(self.current).and_then(|o| o.as_ref())
    }

    pub fn answered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_some()).count()
    }

    pub fn skipped(&self) -> usize {
        self.session.skipped()
    }

    pub fn started_at(&self) -> chrono::DateTime<chrono::Utc> {
        self.session.store().started_at()
    }

    fn refresh_data(&mut self) {
        self.snapshot = self.session.snapshot();
        let selected = self.topics.selected;
        self.topics = StatefulList::with_items(self.snapshot.per_topic.clone());
        if let Some(i) = selected {
            if i < self.topics.items.len() {
                self.topics.selected = Some(i);
            }
        }
        self.recommended = self
            .session
            .store()
            .recommend_topic(&mut self.rng)
            .map(|r| r.topic.clone());
    }

    fn option_letters(&self) -> Vec<String> {
        self.current_question()
            .map(|q| q.options.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn is_open_option(&self, c: char) -> bool {
        self.view == View::Quiz
            && self.current_outcome().is_none()
            && c.is_ascii_alphabetic()
            && self
                .option_letters()
                .contains(&c.to_ascii_uppercase().to_string())
    }

    // Each question takes one answer; later presses are ignored
    fn answer(&mut self, choice: &str) {
        if self.current_outcome().is_some() {
            return;
        }
        if let Some(outcome) = self.session.answer_at(self.current, choice) {
            info!(
                topic = %outcome.topic,
                correct = outcome.is_correct,
                mastery = outcome.mastery,
                "question answered"
            );
            self.outcomes[self.current] = Some(outcome);
            self.refresh_data();
        }
    }

    fn answer_selected(&mut self) {
        if let Some(letter) = self.option_letters().get(self.option_cursor).cloned() {
            self.answer(&letter);
        }
    }

    fn move_question(&mut self, forward: bool) {
        let len = self.questions().len();
        if len == 0 {
            return;
        }
        self.current = if forward {
            (self.current + 1).min(len - 1)
        } else {
            self.current.saturating_sub(1)
        };
        self.option_cursor = 0;
    }

    fn move_option(&mut self, forward: bool) {
        let len = self.option_letters().len();
        if len == 0 {
            return;
        }
        self.option_cursor = if forward {
            (self.option_cursor + 1) % len
        } else {
            (self.option_cursor + len - 1) % len
        };
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        match key {
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            // Option letters win over navigation keys while a question is open
            KeyCode::Char(c) if self.is_open_option(c) => {
                self.answer(&c.to_ascii_uppercase().to_string());
            }

            KeyCode::Char('q') => self.should_quit = true,

            KeyCode::Char('h') | KeyCode::Left => self.view = self.view.prev(),
            KeyCode::Char('l') | KeyCode::Right => self.view = self.view.next(),
            KeyCode::Tab => self.view = self.view.next(),
            KeyCode::BackTab => self.view = self.view.prev(),

            KeyCode::Char('j') | KeyCode::Down => match self.view {
                View::Quiz => self.move_option(true),
                View::Topics => self.topics.next(),
                View::Dashboard => {}
            },
            KeyCode::Char('k') | KeyCode::Up => match self.view {
                View::Quiz => self.move_option(false),
                View::Topics => self.topics.previous(),
                View::Dashboard => {}
            },

            KeyCode::Char('n') if self.view == View::Quiz => self.move_question(true),
            KeyCode::Char('p') if self.view == View::Quiz => self.move_question(false),

            KeyCode::Enter if self.view == View::Quiz => self.answer_selected(),

            _ => {}
        }
    }
}

pub fn run(session: QuizSession) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key.code, key.modifiers);
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
