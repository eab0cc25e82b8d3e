use chrono::{DateTime, Utc};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::agentic::AgenticPhase;
use crate::analyses::format_age;

use super::app::{App, InputMode};
use super::keymap::Action;

const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, app: &App) {
    let size = frame.area();

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(size);

    draw_title(frame, app, outer[0]);

    // Main area: agentic panel | cached analyses
    let main = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(outer[1]);

    draw_agentic(frame, app, main[0]);

    if app.opened.is_some() {
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(main[1]);
        draw_analyses(frame, app, right[0]);
        draw_analysis_detail(frame, app, right[1]);
    } else {
        draw_analyses(frame, app, main[1]);
    }

    draw_status_bar(frame, app, outer[2]);

    match app.input_mode {
        InputMode::Help => draw_help(frame, app),
        InputMode::ConfirmDelete => draw_confirm_delete(frame, app),
        InputMode::Normal | InputMode::EditSession => {}
    }
}

fn draw_title(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let mut spans = vec![
        Span::styled(
            " triagist ",
            Style::default()
                .fg(theme.text_accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("{} ", crate::VERSION),
            Style::default().fg(theme.text_secondary),
        ),
    ];

    match app.agentic.session() {
        Some(session) => {
            spans.push(Span::styled(" session ", Style::default().fg(theme.text_secondary)));
            spans.push(Span::styled(
                session.to_string(),
                Style::default().fg(theme.text_primary),
            ));
        }
        None => spans.push(Span::styled(
            " no session",
            Style::default().fg(theme.text_secondary),
        )),
    }

    if let Some(repo) = app.analyses.as_ref().and_then(|s| s.repository()) {
        spans.push(Span::styled("  repo ", Style::default().fg(theme.text_secondary)));
        spans.push(Span::styled(repo, Style::default().fg(theme.text_primary)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn spinner_frame() -> &'static str {
    let tick = (Utc::now().timestamp_millis() / 100).unsigned_abs() as usize;
    SPINNER[tick % SPINNER.len()]
}

fn draw_agentic(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .title(" Agentic Mode ")
        .borders(Borders::ALL)
        .border_style(theme.unfocused_border());

    let snapshot = app.agentic.snapshot();
    if snapshot.session.is_none() {
        let hint = app.hint(Action::EditSession).unwrap_or_default();
        let msg = Paragraph::new(format!("  No session selected.\n  Press {hint} to choose one."))
            .style(Style::default().fg(theme.text_secondary))
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let phase = snapshot.phase;
    let busy = matches!(
        phase,
        AgenticPhase::Loading | AgenticPhase::Initializing | AgenticPhase::Enabled { initialized: false }
    );

    let mut status_line = vec![Span::styled(
        " Status: ",
        Style::default().fg(theme.text_secondary),
    )];
    if busy {
        status_line.push(Span::styled(
            format!("{} ", spinner_frame()),
            Style::default().fg(theme.spinner),
        ));
    }
    status_line.push(Span::styled(phase.label(), theme.phase_style(phase)));

    let mut lines = vec![Line::from(status_line), Line::from("")];

    let tools = snapshot
        .status
        .as_ref()
        .map(|s| s.available_tools().to_vec())
        .unwrap_or_default();
    if tools.is_empty() {
        if phase.is_enabled() {
            lines.push(Line::from(Span::styled(
                " No tools available yet",
                Style::default().fg(theme.text_secondary),
            )));
        }
    } else {
        lines.push(Line::from(Span::styled(
            format!(" Tools ({})", tools.len()),
            Style::default().fg(theme.text_secondary),
        )));
        for tool in tools {
            lines.push(Line::from(vec![
                Span::styled("   • ", Style::default().fg(theme.text_secondary)),
                Span::styled(tool, Style::default().fg(theme.text_primary)),
            ]));
        }
    }

    if snapshot.resetting {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} ", spinner_frame()),
                Style::default().fg(theme.spinner),
            ),
            Span::styled("Resetting memory…", Style::default().fg(theme.text_secondary)),
        ]));
    }

    lines.push(Line::from(""));
    let mut hints = Vec::new();
    if !phase.is_enabled()
        && phase != AgenticPhase::Initializing
        && let Some(key) = app.hint(Action::EnableAgentic)
    {
        hints.push(format!("{key}:enable"));
    }
    if let Some(key) = app.hint(Action::ResetMemory) {
        hints.push(format!("{key}:reset memory"));
    }
    lines.push(Line::from(Span::styled(
        format!(" {}", hints.join("  ")),
        Style::default().fg(theme.text_secondary),
    )));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_analyses(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .title(" Cached Analyses ")
        .borders(Borders::ALL)
        .border_style(theme.focused_border());

    let Some(store) = &app.analyses else {
        frame.render_widget(block, area);
        return;
    };

    if !store.is_loaded() {
        let msg = Paragraph::new("  Loading…")
            .style(Style::default().fg(theme.text_secondary))
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let items = store.items();
    if items.is_empty() {
        let msg = Paragraph::new("  No cached analyses for this session")
            .style(Style::default().fg(theme.text_secondary))
            .block(block);
        frame.render_widget(msg, area);
        return;
    }

    let now = Utc::now();
    let rows: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let selected = i == app.selected;
            let display = item.display();

            let mut spans = vec![if selected {
                Span::styled("▸ ", theme.selected_style())
            } else {
                Span::raw("  ")
            }];

            let status_style = theme.analysis_status_style(&item.status);
            spans.push(Span::styled(item.status.symbol(), status_style));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                display.label.clone(),
                if selected {
                    Style::default()
                        .fg(theme.text_primary)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.text_primary)
                },
            ));

            // The label already is the title for non-issue URLs.
            if let Some(title) = display.title.filter(|t| *t != display.label) {
                spans.push(Span::styled(
                    format!("  {title}"),
                    Style::default().fg(theme.text_secondary),
                ));
            }

            spans.push(Span::styled(
                format!("  {}", format_age(item.cached_at, now)),
                Style::default().fg(theme.text_secondary),
            ));

            ListItem::new(Line::from(spans))
        })
        .collect();

    frame.render_widget(List::new(rows).block(block), area);
}

fn draw_analysis_detail(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .title(" Analysis ")
        .borders(Borders::ALL)
        .border_style(theme.unfocused_border());

    let Some(item) = &app.opened else {
        frame.render_widget(block, area);
        return;
    };
    let display = item.display();
    let cached_at = DateTime::<Utc>::from_timestamp(item.cached_at, 0)
        .map_or_else(|| "?".to_string(), |t| t.format("%Y-%m-%d %H:%M UTC").to_string());

    let field = |name: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!(" {name:<8}"), Style::default().fg(theme.text_secondary)),
            Span::styled(value, Style::default().fg(theme.text_primary)),
        ])
    };

    let lines = vec![
        field("Issue", format!("{} ({})", display.label, display.number)),
        field("Title", display.title.unwrap_or_else(|| "-".into())),
        Line::from(vec![
            Span::styled(" Status  ", Style::default().fg(theme.text_secondary)),
            Span::styled(
                format!("{} {}", item.status.symbol(), item.status.as_str()),
                theme.analysis_status_style(&item.status),
            ),
        ]),
        field("Cached", cached_at),
        field("URL", item.issue_url.clone()),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;

    let status = if app.input_mode == InputMode::EditSession {
        Line::from(vec![
            Span::styled(" Session id: ", Style::default().fg(theme.text_accent)),
            Span::raw(&app.input_buffer),
            Span::styled("█", Style::default().fg(theme.text_accent)),
            Span::styled(
                "  (Enter to switch, Esc to cancel)",
                Style::default().fg(theme.text_secondary),
            ),
        ])
    } else if let Some(toast) = &app.toast {
        Line::from(Span::styled(
            format!(" {}", toast.message),
            theme.toast_style(toast.style),
        ))
    } else {
        let hints: Vec<String> = [
            (Action::ShowHelp, "help"),
            (Action::EditSession, "session"),
            (Action::Refresh, "refresh"),
            (Action::DeleteAnalysis, "delete"),
            (Action::Quit, "quit"),
        ]
        .into_iter()
        .filter_map(|(action, label)| app.hint(action).map(|key| format!("{key}:{label}")))
        .collect();
        Line::from(Span::styled(
            format!(" {}", hints.join("  ")),
            Style::default().fg(theme.text_secondary),
        ))
    };
    frame.render_widget(Paragraph::new(status), area);
}

/// A `width` x `height` rect centered in `area`, clipped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn draw_help(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let sections = app.keys.help_entries();

    let mut lines = Vec::new();
    for (category, entries) in &sections {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            format!(" {category}"),
            Style::default()
                .fg(theme.text_accent)
                .add_modifier(Modifier::BOLD),
        )));
        for entry in entries {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("   {:<14}", entry.label),
                    Style::default().fg(theme.text_primary),
                ),
                Span::styled(entry.description, Style::default().fg(theme.text_secondary)),
            ]));
        }
    }

    let height = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_add(2);
    let area = centered(frame.area(), 52, height);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Keys (Esc to close) ")
        .borders(Borders::ALL)
        .border_style(theme.focused_border());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_confirm_delete(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let Some(url) = &app.confirm_target else {
        return;
    };
    let label = app
        .analyses
        .as_ref()
        .and_then(|s| s.select(url))
        .map_or_else(|| url.clone(), |item| item.display().label);

    let area = centered(frame.area(), 56, 5);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(" Delete cached analysis ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.toast_error));

    let lines = vec![
        Line::from(vec![
            Span::styled(" Delete analysis for ", Style::default().fg(theme.text_primary)),
            Span::styled(
                label,
                Style::default()
                    .fg(theme.text_primary)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled("?", Style::default().fg(theme.text_primary)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            " y:delete  n/Esc:cancel",
            Style::default().fg(theme.text_secondary),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{MockApi, Op, settle};
    use crate::api::{AgenticStatus, AnalysisStatus, CachedAnalysisItem, CachedAnalysisList};
    use crate::config::Config;
    use ratatui::{Terminal, backend::TestBackend};

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|frame| draw(frame, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn centered_rect_is_clipped() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered(area, 80, 30);
        assert_eq!(rect, Rect::new(2, 1, 36, 8));
    }

    #[tokio::test]
    async fn renders_status_and_issue_labels() {
        let api = MockApi::new();
        api.push_status(Ok(AgenticStatus::new(true, true, vec!["list_files".into()])));
        api.push_list(Ok(CachedAnalysisList {
            repository: "octo/widgets".into(),
            cached_analyses: vec![
                CachedAnalysisItem {
                    issue_url: "https://github.com/octo/widgets/issues/42".into(),
                    cached_at: 1_700_000_000,
                    status: AnalysisStatus::Completed,
                    issue_title: Some("Crash on start".into()),
                    issue_number: Some(42),
                },
                CachedAnalysisItem {
                    issue_url: "not a url".into(),
                    cached_at: 1_700_000_000,
                    status: AnalysisStatus::Failed,
                    issue_title: None,
                    issue_number: None,
                },
            ],
        }));
        let app = App::new(&Config::default(), api.clone(), Some("s1".into()));
        settle(|| api.calls(Op::List) == 1 && app.items().len() == 2).await;
        settle(|| app.agentic.phase().is_enabled()).await;

        let screen = render(&app);
        assert!(screen.contains("octo/widgets#42"));
        assert!(screen.contains("Crash on start"));
        assert!(screen.contains("Unknown Issue"));
        assert!(screen.contains("list_files"));
        assert!(screen.contains("repo octo/widgets"));
    }

    #[tokio::test]
    async fn renders_prompt_without_session() {
        let api = MockApi::new();
        let app = App::new(&Config::default(), api, None);
        let screen = render(&app);
        assert!(screen.contains("No session selected"));
        assert!(screen.contains("?:help"));
    }
}
