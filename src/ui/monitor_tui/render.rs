use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap},
};

use super::app::{DashboardView, StatusLevel};
use super::widgets::{caution_level, format_reading, limit_color};
use crate::core::rig_monitor::{is_valid, AlertConfig, AlertState, Channel};

/// Readouts shown in large type; everything else goes in the sensor table
const CRITICAL_CHANNELS: [Channel; 3] = [
    Channel::ScrewjackSpeed,
    Channel::DrillSpeed,
    Channel::HpuPressure,
];

/// Main render function
pub fn render_ui(frame: &mut Frame, view: &DashboardView) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // Header
            Constraint::Percentage(35), // Critical readouts
            Constraint::Min(8),         // Sensor table
            Constraint::Length(1),      // Status line
            Constraint::Length(1),      // Footer
        ])
        .split(area);

    render_header(frame, chunks[0], view);
    render_critical_section(frame, chunks[1], view);
    render_sensor_table(frame, chunks[2], view);
    render_status_line(frame, chunks[3], view);
    render_footer(frame, chunks[4]);

    if let Some(ref notice) = view.notice {
        render_alert_popup(frame, area, notice.kind.title(), &notice.message, view);
    }

    // Help goes on top of everything
    if view.show_help {
        render_help_overlay(frame, area);
    }
}

fn render_header(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let snapshot = &view.snapshot;

    let (link, link_color) = if !view.reading {
        ("stopped", Color::DarkGray)
    } else if snapshot.store_ok {
        ("connected", Color::Green)
    } else {
        ("READ FAILED", Color::Red)
    };

    let logging = if view.logging { "● LOGGING" } else { "○ not logging" };

    let alert = match view.alert_state {
        AlertState::NoCondition if view.sounding => "alarm unacknowledged".to_string(),
        AlertState::NoCondition => "no condition".to_string(),
        AlertState::ConditionActive(kind) => format!("⚠ {}", kind),
    };

    let title = format!(
        " Rig Monitor │ {} ({}) │ Poll: {}ms │ {} │ {} │ cycle {} ",
        view.store, link, view.interval_ms, logging, alert, snapshot.cycle
    );

    let border_color = if view.alert_state != AlertState::NoCondition {
        Color::Red
    } else {
        link_color
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let updated = Paragraph::new(format!(
        " last sample {} UTC",
        snapshot.timestamp.format("%H:%M:%S%.3f")
    ))
    .style(Style::default().fg(Color::DarkGray))
    .block(block);

    frame.render_widget(updated, area);
}

fn render_critical_section(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (i, channel) in CRITICAL_CHANNELS.iter().enumerate() {
        let value = view.snapshot.get(*channel);
        let color = channel_color(*channel, value, &view.limits);
        render_readout(
            frame,
            columns[i],
            &format!("{} ({})", channel.label(), channel.unit()),
            &format_reading(value),
            color,
        );
    }

    // Position is shown compensated; the raw value lives in the table
    let position = view.snapshot.screwjack_position_compensated;
    let travel = view.limits.max_screwjack_travel;
    render_readout(
        frame,
        columns[3],
        &format!(
            "{} ({})",
            Channel::ScrewjackPosition.label(),
            Channel::ScrewjackPosition.unit()
        ),
        &format_reading(position),
        limit_color(position, caution_level(travel), travel),
    );
}

fn render_readout(frame: &mut Frame, area: Rect, title: &str, value: &str, color: Color) {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Vertically center the value
    let top = inner.height.saturating_sub(1) / 2;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(top),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let text = Paragraph::new(value.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    frame.render_widget(text, rows[1]);
}

fn render_sensor_table(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let snapshot = &view.snapshot;

    let mut rows: Vec<Row> = snapshot
        .sample
        .iter()
        .map(|(channel, value)| {
            let color = channel_color(channel, value, &view.limits);
            Row::new(vec![
                Cell::from(channel.label()),
                Cell::from(format_reading(value)).style(Style::default().fg(color)),
                Cell::from(channel.unit()),
                Cell::from(channel.key()).style(Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let travel = view.limits.max_screwjack_travel;
    let position = snapshot.screwjack_position_compensated;
    rows.push(Row::new(vec![
        Cell::from("ScrewJack Position (zeroed)"),
        Cell::from(format_reading(position))
            .style(Style::default().fg(limit_color(position, caution_level(travel), travel))),
        Cell::from(Channel::ScrewjackPosition.unit()),
        Cell::from(format!("offset {}", view.position_offset))
            .style(Style::default().fg(Color::DarkGray)),
    ]));

    let max_temp = view.limits.max_temperature;
    rows.push(Row::new(vec![
        Cell::from("Max Bearing Temperature"),
        Cell::from(format_reading(snapshot.max_bearing_temp)).style(Style::default().fg(
            limit_color(snapshot.max_bearing_temp, caution_level(max_temp), max_temp),
        )),
        Cell::from(Channel::FrontBearingTemp.unit()),
        Cell::from("derived").style(Style::default().fg(Color::DarkGray)),
    ]));

    let header = Row::new(vec!["Sensor", "Value", "Unit", "Key"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [
            Constraint::Length(28),
            Constraint::Length(8),
            Constraint::Length(7),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(Block::default().title(" Sensors ").borders(Borders::ALL));

    frame.render_widget(table, area);
}

fn channel_color(channel: Channel, value: i64, limits: &AlertConfig) -> Color {
    match channel {
        Channel::HpuPressure => limit_color(
            value,
            caution_level(limits.max_pressure),
            limits.max_pressure,
        ),
        Channel::FrontBearingTemp | Channel::RearBearingTemp => limit_color(
            value,
            caution_level(limits.max_temperature),
            limits.max_temperature,
        ),
        _ if !is_valid(value) => Color::DarkGray,
        _ => Color::White,
    }
}

fn render_status_line(frame: &mut Frame, area: Rect, view: &DashboardView) {
    let Some(ref status) = view.status else {
        return;
    };

    let color = match status.level {
        StatusLevel::Info => Color::Green,
        StatusLevel::Warning => Color::Yellow,
        StatusLevel::Error => Color::Red,
    };

    let text = Paragraph::new(format!(" {}", status.text))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
    frame.render_widget(text, area);
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let text = Paragraph::new(
        " l: logging │ z: zero position │ a/Enter: acknowledge │ ?: help │ q: quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

fn render_alert_popup(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    message: &str,
    view: &DashboardView,
) {
    let popup_area = centered_rect(60, 40, area);

    let status = match view.alert_state {
        AlertState::ConditionActive(_) => "Condition still active.",
        AlertState::NoCondition => "Condition has cleared.",
    };

    let text = vec![
        Line::from(""),
        Line::from(message.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from(status.to_string()),
        Line::from(""),
        Line::from("Press [a] or [Enter] to acknowledge and silence the alarm")
            .style(Style::default().fg(Color::Yellow)),
    ];

    let block = Block::default()
        .title(format!(" ⚠ {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .style(Style::default().bg(Color::Black));

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_text = r#"
    Rig Monitor - Help

    Keyboard Shortcuts:
    ─────────────────────────────────────
    l           Start / stop logging
    z           Zero the screwjack position
    a / Enter   Acknowledge the alert
    q / Esc     Quit (stop logging first)
    ? / h       Toggle this help screen

    Press any key to close this help
    "#;

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::DarkGray));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    // Center the help popup
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(paragraph, popup_area);
}

/// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
