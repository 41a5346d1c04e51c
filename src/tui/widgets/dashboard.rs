use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::{create_mastery_bar, level_color, truncate};
use crate::tui::App;

const WEAKEST_SHOWN: usize = 5;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Stats + recommendation row
            Constraint::Min(0),    // Weakest topics
        ])
        .split(area);

    let top_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    draw_stats(f, app, top_chunks[0]);
    draw_recommendation(f, app, top_chunks[1]);
    draw_weakest_topics(f, app, chunks[1]);
}

fn stat_line(label: &'static str, value: String, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(color)),
    ])
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let snap = &app.snapshot;

    let text = vec![
        Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{}%", snap.overall_percent),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        stat_line(
            "Answered: ",
            format!("{} ({} correct)", snap.total_questions, snap.answered_correctly),
            Color::White,
        ),
        stat_line(
            "Avg Mastery: ",
            format!("{}%", snap.overall_mastery_percent),
            Color::Cyan,
        ),
        stat_line("Topics: ", format!("{}", snap.per_topic.len()), Color::White),
        stat_line(
            "Skipped: ",
            format!("{}", app.skipped()),
            if app.skipped() > 0 {
                Color::Yellow
            } else {
                Color::White
            },
        ),
        stat_line(
            "Started: ",
            app.started_at().format("%H:%M").to_string(),
            Color::DarkGray,
        ),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Session ")
        .title_style(Style::default().fg(Color::Cyan));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_recommendation(f: &mut Frame, app: &App, area: Rect) {
    let text = match &app.recommended {
        Some(topic) => vec![
            Line::from(Span::styled(
                "Worth another look:",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                topic.clone(),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
        ],
        None => vec![Line::from(Span::styled(
            "Answer a question to get started.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Next Up ")
        .title_style(Style::default().fg(Color::Yellow));

    f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_weakest_topics(f: &mut Frame, app: &App, area: Rect) {
    // per_topic is strongest first
    let items: Vec<ListItem> = app
        .snapshot
        .per_topic
        .iter()
        .rev()
        .take(WEAKEST_SHOWN)
        .enumerate()
        .map(|(i, t)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}. ", i + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(
                    format!("{:<22}", truncate(&t.topic, 20)),
                    Style::default().fg(level_color(t.level)),
                ),
                Span::styled(
                    create_mastery_bar(t.mastery_percent),
                    Style::default().fg(Color::Green),
                ),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Weakest Topics ")
        .title_style(Style::default().fg(Color::Magenta));

    f.render_widget(List::new(items).block(block), area);
}
