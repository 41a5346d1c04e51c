use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::{create_mastery_bar, level_color};
use crate::tui::App;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let Some(question) = app.current_question() else {
        let empty = Paragraph::new("No questions loaded.")
            .block(Block::default().borders(Borders::ALL).title(" Quiz "));
        f.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Question text
            Constraint::Min(6),    // Options
            Constraint::Length(5), // Feedback
        ])
        .split(area);

    let title = format!(
        " Question {}/{}  [{}] ",
        app.current + 1,
        app.questions().len(),
        question.topic
    );
    let text = Paragraph::new(question.text.as_str())
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(text, chunks[0]);

    let outcome = app.current_outcome();
    let items: Vec<ListItem> = question
        .options
        .iter()
        .map(|(letter, option)| {
            // Reveal the right answer once the question is graded
            let style = match outcome {
                Some(_) if *letter == question.correct => Style::default().fg(Color::Green),
                _ => Style::default().fg(Color::White),
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}: ", letter), Style::default().fg(Color::Yellow)),
                Span::styled(option.as_str(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Options "))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.option_cursor));
    f.render_stateful_widget(list, chunks[1], &mut state);

    draw_feedback(f, app, chunks[2]);
}

fn draw_feedback(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Feedback ");

    let Some(outcome) = app.current_outcome() else {
        let waiting = Paragraph::new(Span::styled(
            "Pick an answer.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(waiting, area);
        return;
    };

    let feedback_color = if outcome.is_correct {
        Color::Green
    } else {
        Color::Red
    };
    let percent = (outcome.mastery * 100.0).round() as u32;

    let text = vec![
        Line::from(Span::styled(
            outcome.feedback.as_str(),
            Style::default().fg(feedback_color),
        )),
        Line::from(vec![
            Span::styled(
                format!("{}: ", outcome.topic),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(create_mastery_bar(percent), Style::default().fg(Color::Green)),
            Span::raw(format!(" {}% ", percent)),
            Span::styled(
                outcome.level.label(),
                Style::default().fg(level_color(outcome.level)),
            ),
        ]),
    ];

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: true }).block(block);
    f.render_widget(paragraph, area);
}
