use std::time::Duration;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use quizbit::session::{Phase, RoundResult};

use crate::{App, Results};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Whole seconds, zero padded, like a countdown clock
fn clock(d: Duration) -> String {
    format!("{:02}", d.as_secs())
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // status
                Constraint::Length(1),
                Constraint::Min(0), // body
                Constraint::Length(1), // help
            ])
            .split(area);

        let session = &self.session;
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().add_modifier(Modifier::DIM);

        let round = (session.rounds_completed()
            + usize::from(session.phase() == Phase::AnswerPending))
        .min(session.total_rounds());
        Paragraph::new(Line::from(vec![
            Span::styled(format!("Round {}/{}", round, session.total_rounds()), bold),
            Span::raw("   "),
            Span::styled(format!("Score: {}", session.score().cumulative), bold),
        ]))
        .render(chunks[0], buf);

        match session.phase() {
            Phase::AwaitingQuestion | Phase::Evaluating => {
                Paragraph::new(Span::styled("Get ready...", dim))
                    .alignment(Alignment::Center)
                    .render(chunks[2], buf);
            }
            Phase::AnswerPending => render_question(self, chunks[2], buf),
            Phase::Delay => render_feedback(self, chunks[2], buf),
            Phase::Completed => {
                if let Some(results) = &self.results {
                    render_results(results, chunks[2], buf);
                }
            }
        }

        let help = match session.phase() {
            Phase::AnswerPending => "a-d / 1-4 answer · esc quit",
            Phase::Completed => "(n)ew game · (q)uit",
            _ => "esc quit",
        };
        Paragraph::new(Span::styled(help, Style::default().add_modifier(Modifier::ITALIC)))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}

fn render_question(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(question) = app.session.current_question() else {
        return;
    };
    let remaining = app.session.response_remaining();
    let time_style = if remaining < Duration::from_secs(10) {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let mut lines = vec![
        Line::from(Span::styled(format!("Time: {}", clock(remaining)), time_style)),
        Line::default(),
        Line::from(Span::styled(
            question.prompt.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
    ];
    lines.extend(question.options.iter().map(|(letter, text)| {
        Line::from(vec![
            Span::styled(format!("[{letter}] "), Style::default().fg(Color::Magenta)),
            Span::raw(text.to_string()),
        ])
    }));

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn round_lines(result: &RoundResult) -> Vec<Line<'static>> {
    if !result.correct {
        return vec![
            Line::from("Score: 0"),
            Line::from("Time: 0s"),
            Line::from("Time bonus: 0"),
            Line::from("Round total: 0"),
        ];
    }
    vec![
        Line::from(format!("Score: {}", result.base)),
        Line::from(format!("Time: {}s", clock(Duration::from_secs_f64(result.elapsed_secs)))),
        Line::from(format!("Time bonus: {}", result.bonus)),
        Line::from(format!("Round total: {}", result.round_score)),
    ]
}

fn render_feedback(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(result) = app.session.last_round() else {
        return;
    };
    let status_style = if result.correct {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![
        Line::from(Span::styled(app.feedback.unwrap_or_default(), status_style)),
        Line::default(),
    ];
    lines.extend(round_lines(result));

    if !result.correct {
        if let Some(question) = app.session.current_question() {
            lines.push(Line::default());
            lines.push(Line::from(format!(
                "Answer: [{}] {}",
                result.correct_option,
                question.options.get(result.correct_option)
            )));
        }
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        format!("Next question in: {}", clock(app.session.delay_remaining())),
        Style::default().add_modifier(Modifier::DIM),
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_results(results: &Results, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let summary = &results.summary;
    let mut lines = vec![
        Line::from(Span::styled(
            format!("Final score: {}", results.record.score),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!(
            "{}/{} correct ({}%) · best round {}",
            summary.correct,
            summary.rounds,
            summary.accuracy(),
            summary.best_round
        )),
    ];
    if let Some(secs) = summary.mean_answer_secs {
        lines.push(Line::from(format!("average answer time {secs:.1}s")));
    }
    match (results.rank, &results.save_error) {
        (_, Some(err)) => lines.push(Line::from(Span::styled(
            format!("result not saved: {err}"),
            Style::default().fg(Color::Red),
        ))),
        (Some(rank), None) => lines.push(Line::from(format!("You placed #{rank}!"))),
        (None, None) => lines.push(Line::from("Not enough for the top 10 this time.")),
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[0], buf);

    let rows = results.board.entries().iter().enumerate().map(|(i, entry)| {
        let row = Row::new(vec![
            Cell::from(format!("{}", i + 1)),
            Cell::from(entry.name.clone()),
            Cell::from(entry.score.to_string()),
        ]);
        if results.rank == Some(i + 1) {
            row.style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        } else {
            row
        }
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["#", "Name", "Score"])
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title("Leaderboard"));

    table.render(chunks[1], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use quizbit::question::OptionLetter;

    fn result(correct: bool, elapsed_secs: f64, bonus: u32) -> RoundResult {
        RoundResult {
            round: 1,
            question_index: 0,
            chosen: Some(if correct { OptionLetter::A } else { OptionLetter::B }),
            correct_option: OptionLetter::A,
            correct,
            elapsed_secs,
            base: 0,
            bonus,
            round_score: bonus,
        }
    }

    #[test]
    fn slow_correct_answer_with_no_base_points_is_not_a_miss() {
        let lines = round_lines(&result(true, 25.0, 0));
        assert_eq!(lines[1], Line::from("Time: 25s"));
    }

    #[test]
    fn miss_shows_zeroes() {
        let lines = round_lines(&result(false, 3.0, 0));
        assert_eq!(lines[1], Line::from("Time: 0s"));
        assert_eq!(lines[3], Line::from("Round total: 0"));
    }

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(clock(Duration::from_millis(7_900)), "07");
        assert_eq!(clock(Duration::from_secs(46)), "46");
    }
}
