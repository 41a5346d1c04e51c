use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::{create_mastery_bar, level_color, truncate};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .topics
        .items
        .iter()
        .map(|t| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<24}", truncate(&t.topic, 22)),
                    Style::default().fg(Color::White),
                ),
                Span::styled(
                    create_mastery_bar(t.mastery_percent),
                    Style::default().fg(Color::Green),
                ),
                Span::styled(
                    format!(" {:>3}% ", t.mastery_percent),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(
                    format!("{:<14}", t.level.label()),
                    Style::default().fg(level_color(t.level)),
                ),
                Span::raw(format!("{:<10}", t.attempts)),
                Span::raw(format!("{:>3}%", t.success_percent)),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Topics ")
        .title_style(Style::default().fg(Color::Cyan));

    let header_style = Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::BOLD);
    // Indented past the list's highlight symbol
    let header = Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{:<24}", "Topic"), header_style),
        Span::styled(format!("{:<16}", "Mastery"), header_style),
        Span::styled(format!("{:<14}", "Level"), header_style),
        Span::styled(format!("{:<10}", "Attempts"), header_style),
        Span::styled("Correct", header_style),
    ]);

    // Border around everything; header on the first inner row, list below it
    let inner = block.inner(area);
    f.render_widget(block, area);

    let header_area = Rect {
        height: inner.height.min(1),
        ..inner
    };
    f.render_widget(Paragraph::new(header), header_area);

    let list_area = Rect {
        y: inner.y + header_area.height,
        height: inner.height.saturating_sub(header_area.height),
        ..inner
    };

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(app.topics.selected);
    f.render_stateful_widget(list, list_area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use quiztrace::bkt::BktParameters;
    use quiztrace::quiz::{QuizSession, RawQuestion};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::{backend::TestBackend, Terminal};

    fn row(terminal: &Terminal<TestBackend>, y: u16) -> String {
        let buffer = terminal.backend().buffer();
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    #[test]
    fn header_and_rows_are_visible() {
        let mut session = QuizSession::new(BktParameters::default()).unwrap();
        session.load(vec![RawQuestion {
            question: Some("What is recursion in programming?".to_string()),
            correct: Some("A".to_string()),
            ..RawQuestion::default()
        }]);
        let mut app = App::with_rng(session, StdRng::seed_from_u64(3));
        app.handle_key(KeyCode::Char('a'), KeyModifiers::NONE);

        let mut terminal = Terminal::new(TestBackend::new(100, 8)).unwrap();
        terminal.draw(|f| draw(f, &app, f.area())).unwrap();

        assert!(row(&terminal, 0).contains("Topics"));
        let header = row(&terminal, 1);
        assert!(header.contains("Topic"));
        assert!(header.contains("Attempts"));
        assert!(header.contains("Correct"));
        let first = row(&terminal, 2);
        assert!(first.contains("recursion"));
        assert!(first.contains("100%"));
    }
}
