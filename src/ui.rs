use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};

use crate::{
    game::{Phase, RoundOutcome},
    mode::GameMode,
    timing::PerformanceTier,
    App,
};

const HORIZONTAL_MARGIN: u16 = 5;

fn tier_color(tier: PerformanceTier) -> Color {
    let (r, g, b) = tier.rgb();
    Color::Rgb(r, g, b)
}

fn ms(value: f64) -> String {
    format!("{:.0}ms", value)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let yellow_style = Style::default().fg(Color::Yellow);
        let magenta_style = Style::default().fg(Color::Magenta);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(1)
            .constraints(
                [
                    Constraint::Length(2), // header
                    Constraint::Min(3),    // body
                    Constraint::Length(2), // hints
                ]
                .as_ref(),
            )
            .split(area);

        // header: mode and round progress
        let header = match self.game.phase() {
            Phase::Idle => Line::from(Span::styled(
                format!("reflx · {}", self.game.mode()),
                dim_bold_style,
            )),
            Phase::SessionComplete => Line::from(Span::styled(
                format!("{} · session complete", self.game.mode()),
                dim_bold_style,
            )),
            _ => Line::from(Span::styled(
                format!(
                    "{} · round {}/{}",
                    self.game.mode(),
                    self.game.current_round(),
                    self.game.mode().rounds()
                ),
                dim_bold_style,
            )),
        };
        Paragraph::new(header)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        // body
        let body: Vec<Line> = match self.game.phase() {
            Phase::Idle => {
                let mut lines = vec![
                    Line::from(Span::styled("REFLX", bold_style)),
                    Line::from(Span::styled(
                        "press space or click to start",
                        yellow_style.add_modifier(Modifier::ITALIC),
                    )),
                    Line::default(),
                ];

                for (i, mode) in GameMode::ALL.iter().enumerate() {
                    let marker = if *mode == self.game.mode() { "▸" } else { " " };
                    let style = if *mode == self.game.mode() {
                        green_bold_style
                    } else {
                        dim_style
                    };
                    lines.push(Line::from(Span::styled(
                        format!("{} [{}] {} — {}", marker, i + 1, mode, mode.description()),
                        style,
                    )));
                }

                lines.push(Line::default());
                if let Some(pb) = self.profile.personal_best_ms {
                    lines.push(Line::from(Span::styled(
                        format!(
                            "personal best {} · {} sessions played",
                            ms(pb),
                            self.profile.total_sessions
                        ),
                        magenta_style,
                    )));
                }
                lines
            }
            Phase::Countdown => vec![
                Line::default(),
                Line::from(Span::styled("wait for it...", red_bold_style)),
            ],
            Phase::FalseStart => vec![
                Line::default(),
                Line::from(Span::styled("TOO SOON!", red_bold_style)),
                Line::from(Span::styled(
                    "wait for the green signal — retrying this round",
                    dim_style,
                )),
            ],
            Phase::Stimulus { .. } => vec![
                Line::default(),
                Line::from(Span::styled("GO!", green_bold_style)),
            ],
            Phase::RoundEnd => round_end_lines(self.game.last_round(), dim_style),
            Phase::SessionComplete => summary_lines(self, bold_style, dim_style, magenta_style),
        };

        Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);

        // hints
        let hints = match self.game.phase() {
            Phase::Idle => "1-4 mode · space start · q quit",
            Phase::SessionComplete => "space again · 1-4 mode · r reset · q quit",
            _ => "r reset · esc quit",
        };
        Paragraph::new(Span::styled(hints, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[2], buf);
    }
}

fn round_end_lines(last: Option<&RoundOutcome>, dim_style: Style) -> Vec<Line<'static>> {
    let Some(round) = last else {
        return vec![Line::default()];
    };

    if round.timed_out {
        return vec![
            Line::default(),
            Line::from(Span::styled(
                "too slow — no response",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("capped at {}", ms(round.reaction_time_ms as f64)),
                dim_style,
            )),
        ];
    }

    let tier = PerformanceTier::for_time(round.reaction_time_ms);
    vec![
        Line::default(),
        Line::from(Span::styled(
            ms(round.reaction_time_ms as f64),
            Style::default()
                .fg(tier_color(tier))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} — {}", tier, tier.description()),
            dim_style,
        )),
    ]
}

fn summary_lines(
    app: &App,
    bold_style: Style,
    dim_style: Style,
    magenta_style: Style,
) -> Vec<Line<'static>> {
    let stats = app.game.session_stats();
    let mut lines = Vec::new();

    if app.new_personal_best {
        lines.push(Line::from(Span::styled(
            "★ new personal best ★",
            magenta_style.add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::default());
    }

    if stats.valid_rounds == 0 {
        lines.push(Line::from(Span::styled(
            "no valid rounds — all false starts",
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(Span::styled(
            format!("{} false starts", stats.false_starts),
            dim_style,
        )));
        return lines;
    }

    let tier = PerformanceTier::for_time(stats.average as u64);
    lines.push(Line::from(vec![
        Span::styled(format!("average {}", ms(stats.average)), bold_style),
        Span::styled(
            format!("  ({} — {})", tier, tier.description()),
            Style::default().fg(tier_color(tier)),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        format!(
            "best {} · worst {} · median {}",
            ms(stats.best),
            ms(stats.worst),
            ms(stats.median)
        ),
        dim_style,
    )));
    lines.push(Line::from(Span::styled(
        format!(
            "σ {:.1}ms · consistency {:.0}/100",
            stats.standard_deviation, stats.consistency_score
        ),
        dim_style,
    )));
    lines.push(Line::from(Span::styled(
        format!(
            "{} rounds · {} false starts",
            stats.valid_rounds, stats.false_starts
        ),
        dim_style,
    )));

    if let Some(pb) = app.profile.personal_best_ms {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("personal best {}", ms(pb)),
            magenta_style,
        )));
    }

    lines
}
