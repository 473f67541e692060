//! UI rendering with Ratatui.

use crate::app::{App, InputMode, SecurityFocus, TreeItemKind, View};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;
use sweeprs_core::{
    generator::{options_strength, MAX_LENGTH, MIN_LENGTH},
    password_strength, site_url, Entry, Status, StatusCounts, StrengthLabel,
};

const SELECTED_BG: Color = Color::Rgb(60, 60, 80);

/// Main render function.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    render_header(frame, app, chunks[0]);
    match app.view {
        View::Review => render_review(frame, app, chunks[1]),
        View::Security => render_security(frame, app, chunks[1]),
        View::Generator => render_generator(frame, app, chunks[1]),
    }
    render_footer(frame, app, chunks[2]);

    match app.input_mode {
        InputMode::Confirm => render_confirm(frame, app, area),
        InputMode::Help => render_help(frame, area),
        InputMode::Normal | InputMode::Search => {}
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(" sweeprs ", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))];
    for view in [View::Review, View::Security, View::Generator] {
        let style = if view == app.view {
            Style::default().fg(Color::White).bg(SELECTED_BG).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", view.title()), style));
    }

    let progress = app.session.review_progress();
    spans.push(Span::styled(
        format!(
            "   Reviewed {}/{} ({:.0}%)",
            progress.reviewed(),
            progress.total(),
            progress.progress() * 100.0
        ),
        Style::default().fg(Color::Green),
    ));
    spans.push(Span::styled(
        format!("   {}", app.source_path.display()),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.input_mode == InputMode::Search {
        Line::from(vec![
            Span::styled("Filter ▸ ", Style::default().fg(Color::Magenta)),
            Span::styled(&app.filter, Style::default().fg(Color::White)),
            Span::styled("_", Style::default().fg(Color::White).add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else if let Some(ref message) = app.status_message {
        Line::from(Span::styled(message.as_str(), Style::default().fg(Color::Yellow)))
    } else {
        let help = match app.view {
            View::Review => "1 keep | 2 delete | 3 later | p reveal | y copy | / filter | s sort | e export | Tab view | ? help | q quit",
            View::Security => match app.security_focus {
                SecurityFocus::Clusters => "j/k cluster | l entries | 1 keep all | 2 delete all | e export | Tab view | ? help | q quit",
                SecurityFocus::Entries => "j/k entry | h clusters | 1 keep | 2 delete | 3 later | p reveal | y copy | Tab view | q quit",
            },
            View::Generator => "h/l length | 1-4 sets | g generate | y copy | Tab view | ? help | q quit",
        };
        Line::from(Span::styled(help, Style::default().fg(Color::DarkGray)))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Keep => Color::Green,
        Status::Delete => Color::Red,
        Status::Review => Color::Yellow,
    }
}

fn status_marker(status: Status) -> &'static str {
    match status {
        Status::Keep => "✓",
        Status::Delete => "✗",
        Status::Review => "?",
    }
}

fn strength_color(label: StrengthLabel) -> Color {
    match label.color_tag() {
        "red" => Color::Red,
        "orange" => Color::Rgb(255, 165, 0),
        "yellow" => Color::Yellow,
        "green" => Color::Green,
        "emerald" => Color::Rgb(80, 200, 120),
        _ => Color::DarkGray,
    }
}

fn counts_spans(counts: StatusCounts) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!(" ✓{}", counts.keep), Style::default().fg(Color::Green)),
        Span::styled(format!(" ✗{}", counts.delete), Style::default().fg(Color::Red)),
        Span::styled(format!(" ?{}", counts.review), Style::default().fg(Color::Yellow)),
    ]
}

/// Render the group list and entry detail.
fn render_review(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_group_list(frame, app, chunks[0]);
    render_entry_view(frame, app, chunks[1]);
}

fn render_group_list(frame: &mut Frame, app: &App, area: Rect) {
    let mut title = format!(" Sites · by {} ", app.sort.label());
    if !app.filter.is_empty() {
        title = format!(" Sites · by {} · \"{}\" ", app.sort.label(), app.filter);
    }
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let items: Vec<ListItem> = app
        .tree_items
        .iter()
        .map(|item| {
            let arrow = if item.is_expanded { "▾" } else { "▸" };
            let line = match &item.kind {
                TreeItemKind::Group(domain) => {
                    let counts = app.session.group_progress(domain).unwrap_or_default();
                    group_line(arrow, domain, counts)
                }
                TreeItemKind::Unresolved => {
                    let counts = app.session.status_counts(app.session.unresolved());
                    group_line(arrow, "(no site)", counts)
                }
                TreeItemKind::Entry(id) => match app.session.entry(*id) {
                    Some(entry) => entry_line(app, entry),
                    None => Line::from("    ?"),
                },
            };
            ListItem::new(line)
        })
        .collect();

    if items.is_empty() {
        let message = Paragraph::new("No matching sites")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(message, centered_rect(30, 1, inner));
        return;
    }

    let list = List::new(items).highlight_style(
        Style::default()
            .bg(SELECTED_BG)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );
    let mut state = ratatui::widgets::ListState::default().with_selected(Some(app.selected_index));
    frame.render_stateful_widget(list, inner, &mut state);
}

fn group_line(arrow: &str, label: &str, counts: StatusCounts) -> Line<'static> {
    let mut spans = vec![
        Span::styled(format!("{arrow} {label}"), Style::default().fg(Color::Yellow)),
        Span::styled(
            format!(" ({}) {:.0}%", counts.total(), counts.progress() * 100.0),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    spans.extend(counts_spans(counts));
    Line::from(spans)
}

fn entry_line<'a>(app: &App, entry: &'a Entry) -> Line<'a> {
    let label = if entry.name.is_empty() { &entry.url } else { &entry.name };
    let mut spans = vec![
        Span::styled(
            format!("    {} ", status_marker(entry.status)),
            Style::default().fg(status_color(entry.status)),
        ),
        Span::styled(label.as_str(), Style::default().fg(Color::White)),
        Span::styled(format!(" · {}", entry.username), Style::default().fg(Color::DarkGray)),
    ];
    if app.analysis.cluster_of(entry.id).is_some() {
        spans.push(Span::styled(" reused", Style::default().fg(Color::Red)));
    }
    if app.analysis.is_weak(entry.id) {
        spans.push(Span::styled(" weak", Style::default().fg(Color::Rgb(255, 165, 0))));
    }
    Line::from(spans)
}

/// Render the entry detail view.
fn render_entry_view(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Entry Details ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(entry) = app.selected_entry() else {
        let message = Paragraph::new("Select an entry (Enter expands a site)")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(message, centered_rect(40, 1, inner));
        return;
    };

    let strength = password_strength(&entry.password);
    let password = if app.is_revealed(entry.id) {
        let remaining = app
            .revealed
            .map(|r| r.expires.saturating_duration_since(Instant::now()).as_secs())
            .unwrap_or_default();
        format!("{}  (hides in {}s)", entry.password, remaining)
    } else {
        "••••••••••••".to_string()
    };
    let last_used = local_time(entry.last_used()).unwrap_or_else(|| "never".to_string());
    let created = local_time(entry.created()).unwrap_or_else(|| "unknown".to_string());
    let password_changed =
        local_time(entry.password_changed()).unwrap_or_else(|| "never".to_string());

    let mut lines = vec![
        field("Name", &entry.name, Color::White),
        field("URL", &entry.url, Color::Blue),
        field("Site", &site_url(&entry.domain()), Color::Blue),
        field("Username", &entry.username, Color::Green),
        field("Password", &password, Color::Yellow),
        Line::from(vec![
            Span::styled("Strength: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{} ({:.1})", strength.label, strength.score),
                Style::default().fg(strength_color(strength.label)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Status: ", Style::default().fg(Color::DarkGray)),
            Span::styled(entry.status.label(), Style::default().fg(status_color(entry.status))),
        ]),
        field("Created", &created, Color::White),
        field("Last used", &last_used, Color::White),
        field("Password changed", &password_changed, Color::White),
    ];

    if let Some(cluster) = app.analysis.cluster_of(entry.id) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Password shared with {} other entries", cluster.len() - 1),
            Style::default().fg(Color::Red),
        )));
    }
    if let Some(note) = entry.note.as_deref().filter(|n| !n.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Note", Style::default().fg(Color::DarkGray))));
        lines.push(Line::from(note));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, inner.inner(Margin::new(1, 1)));
}

fn local_time(time: Option<chrono::DateTime<chrono::Utc>>) -> Option<String> {
    time.map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M").to_string())
}

fn field<'a>(label: &'a str, value: &str, color: Color) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value.to_string(), Style::default().fg(color)),
    ])
}

/// Render the security dashboard.
fn render_security(frame: &mut Frame, app: &App, area: Rect) {
    let analysis = &app.analysis;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let reused = analysis.reused_entry_count();
    let weak = analysis.weak.len();
    let summary = vec![
        Line::from(vec![
            Span::styled(format!("Total: {}", analysis.total), Style::default().fg(Color::White)),
            Span::styled(
                format!("   Unique passwords: {}", analysis.unique_passwords),
                Style::default().fg(Color::Green),
            ),
        ]),
        Line::from(vec![
            Span::styled(
                format!("Reused: {} ({}%)", reused, analysis.percent_of_total(reused)),
                Style::default().fg(Color::Red),
            ),
            Span::styled(
                format!("   Weak: {} ({}%)", weak, analysis.percent_of_total(weak)),
                Style::default().fg(Color::Rgb(255, 165, 0)),
            ),
        ]),
    ];
    let block = Block::default().title(" Security ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(summary).block(block), chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    let clusters: Vec<ListItem> = analysis
        .reused
        .iter()
        .map(|cluster| {
            let domains: Vec<String> = app
                .session
                .resolve(&cluster.entries)
                .map(Entry::domain)
                .collect();
            let mut spans = vec![Span::raw(format!("{} · {}", cluster.len(), domains.join(", ")))];
            spans.extend(counts_spans(app.session.status_counts(&cluster.entries)));
            ListItem::new(Line::from(spans))
        })
        .collect();
    let clusters_color = match app.security_focus {
        SecurityFocus::Clusters => Color::Cyan,
        SecurityFocus::Entries => Color::DarkGray,
    };
    let cluster_block = Block::default()
        .title(" Reused passwords ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(clusters_color));
    if clusters.is_empty() {
        let message = Paragraph::new("No reused passwords").block(cluster_block);
        frame.render_widget(message, columns[0]);
    } else {
        let list = List::new(clusters)
            .block(cluster_block)
            .highlight_style(Style::default().bg(SELECTED_BG).add_modifier(Modifier::BOLD));
        let mut state = ratatui::widgets::ListState::default().with_selected(Some(app.cluster_index));
        frame.render_stateful_widget(list, columns[0], &mut state);
    }

    let member_count = analysis.reused.get(app.cluster_index).map_or(0, |c| c.len());
    let mut right: Vec<ListItem> = Vec::new();
    let mut selected = None;
    for (i, id) in app.security_rows().into_iter().enumerate() {
        if i == member_count {
            if i > 0 {
                right.push(ListItem::new(""));
            }
            right.push(ListItem::new(Span::styled(
                "Weak passwords",
                Style::default().fg(Color::DarkGray),
            )));
        }
        if i == app.security_index {
            selected = Some(right.len());
        }
        let Some(entry) = app.session.entry(id) else {
            continue;
        };
        let mut spans = vec![
            Span::styled(
                format!("{} ", status_marker(entry.status)),
                Style::default().fg(status_color(entry.status)),
            ),
            Span::raw(format!("{} · {}", entry.domain(), entry.username)),
        ];
        if app.is_revealed(id) {
            spans.push(Span::styled(
                format!("  {}", entry.password),
                Style::default().fg(Color::Yellow),
            ));
        }
        right.push(ListItem::new(Line::from(spans)));
    }

    let entries_focused = app.security_focus == SecurityFocus::Entries;
    let border_color = if entries_focused { Color::Cyan } else { Color::DarkGray };
    let detail = List::new(right)
        .block(
            Block::default()
                .title(" Entries ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color)),
        )
        .highlight_style(Style::default().bg(SELECTED_BG).add_modifier(Modifier::BOLD));
    let mut state = ratatui::widgets::ListState::default()
        .with_selected(if entries_focused { selected } else { None });
    frame.render_stateful_widget(detail, columns[1], &mut state);
}

/// Render the password generator.
fn render_generator(frame: &mut Frame, app: &App, area: Rect) {
    let options = &app.config.generator;
    let block = Block::default()
        .title(" Password Generator ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Length
            Constraint::Length(5), // Character sets
            Constraint::Length(1), // Meter
            Constraint::Length(1),
            Constraint::Min(2), // Output
        ])
        .split(inner);

    frame.render_widget(
        Paragraph::new(format!(
            "Length: {} ({}-{})",
            options.clamped_length(),
            MIN_LENGTH,
            MAX_LENGTH
        )),
        chunks[0],
    );

    let check = |on: bool| if on { "[x]" } else { "[ ]" };
    let sets = vec![
        Line::from(format!("1 {} Uppercase (A-Z)", check(options.uppercase))),
        Line::from(format!("2 {} Lowercase (a-z)", check(options.lowercase))),
        Line::from(format!("3 {} Numbers (0-9)", check(options.digits))),
        Line::from(format!("4 {} Symbols (!@#$%^&*)", check(options.symbols))),
    ];
    frame.render_widget(Paragraph::new(sets), chunks[1]);

    let meter = options_strength(options);
    let color = if meter.percent >= 80.0 {
        Color::Green
    } else if meter.percent >= 60.0 {
        Color::Blue
    } else if meter.percent >= 40.0 {
        Color::Yellow
    } else {
        Color::Red
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio((meter.percent / 100.0).clamp(0.0, 1.0))
        .label(format!("{} ({:.0}%)", meter.label, meter.percent));
    frame.render_widget(gauge, chunks[2]);

    let output = match app.generated {
        Some(ref password) => {
            let strength = password_strength(password);
            vec![
                Line::from(Span::styled(password.as_str(), Style::default().fg(Color::Yellow))),
                Line::from(Span::styled(
                    strength.label.to_string(),
                    Style::default().fg(strength_color(strength.label)),
                )),
            ]
        }
        None => vec![Line::from(Span::styled(
            "Press g to generate",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    frame.render_widget(Paragraph::new(output), chunks[4]);
}

fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref pending) = app.pending else {
        return;
    };
    let dialog_area = centered_rect(56.min(area.width.saturating_sub(2)), 5, area);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Confirm ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    let text = vec![
        Line::from(format!(
            "Mark {} entries ({}) as {}?",
            pending.ids.len(),
            pending.target,
            pending.status.label()
        )),
        Line::from(Span::styled("y: confirm  n: cancel", Style::default().fg(Color::DarkGray))),
    ];
    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, dialog_area);
}

const HELP: &[&str] = &[
    "Review",
    "  j/k move   h/l collapse/expand   Enter toggle site",
    "  1 keep   2 delete   3 review later (on a site: whole site)",
    "  p reveal password   y copy password   / filter   s change sort",
    "Security",
    "  j/k select cluster   1 keep all   2 delete all",
    "  l/Enter entries: 1/2/3 set status   p reveal   y copy   h back",
    "Generator",
    "  h/l length   1-4 character sets   g generate   y copy",
    "Everywhere",
    "  Tab next view   e export cleaned CSV   q quit",
    "",
    "Exporting passwords from your browser",
    "  Chrome: Settings > Autofill > Password Manager,",
    "          ⋮ next to Saved Passwords > Export passwords",
    "  Brave:  Settings > Autofill > Password manager,",
    "          ⋮ next to Saved passwords > Export passwords",
    "  Edge:   Settings > Passwords,",
    "          ⋯ next to Saved passwords > Export passwords",
    "  Your browser may ask for your system password first.",
    "",
    "Press any key to close",
];

fn render_help(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(62.min(area.width), (HELP.len() as u16 + 2).min(area.height), area);
    frame.render_widget(Clear, dialog_area);

    let lines: Vec<Line> = HELP.iter().map(|l| Line::from(*l)).collect();
    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(Paragraph::new(lines).block(block), dialog_area);
}

/// Helper to create a centered rectangle.
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}
