use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::Frame;
use stepkit::shared::{DisplayState, DrumType, PlaybackState, NUM_DRUMS};

use super::grid;

const HELP: &str = "space play/pause  s stop  arrows move  enter step  a accent  ,/. bar  \
                    n add  c dup  x del  bksp clear  y copy  p paste  </> move  \
                    [/] bpm  -/= swing  k kit  1/2/3 dist  R reset  w save  esc quit";

pub fn render(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                    // transport + song
            Constraint::Length(NUM_DRUMS as u16 + 3), // step grid
            Constraint::Length(3),                    // groove
            Constraint::Length(1),                    // status line
            Constraint::Min(1),                       // key help
        ])
        .split(area);

    draw_transport(frame, sections[0], state);
    grid::draw_step_grid(frame, sections[1], state);
    draw_groove(frame, sections[2], state);
    frame.render_widget(
        Paragraph::new(state.status.as_str()).style(Style::default().fg(Color::Yellow)),
        sections[3],
    );
    let help = Paragraph::new(HELP)
        .style(Style::default().fg(Color::DarkGray))
        .wrap(Wrap { trim: true });
    frame.render_widget(help, sections[4]);
}

fn draw_transport(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let (label, color) = match state.playback {
        PlaybackState::Playing => ("PLAYING", Color::Green),
        PlaybackState::Paused => ("PAUSED", Color::Yellow),
        PlaybackState::Stopped => ("STOPPED", Color::DarkGray),
    };
    let name = if state.song_name.is_empty() { "untitled" } else { state.song_name.as_str() };
    let line = Line::from(vec![
        Span::styled(format!(" {label} "), Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "  bar {} step {}  ",
            state.position.bar + 1,
            state.position.beat + 1
        )),
        Span::styled(name.to_string(), Style::default().fg(Color::White)),
    ]);
    frame.render_widget(Paragraph::new(line).block(Block::bordered().title(" stepkit ")), area);
}

fn draw_groove(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let mut spans = vec![Span::raw(format!(
        " {:.0} bpm   swing {:.0}%   kit {}   dist ",
        state.bpm,
        state.swing,
        state.kit.label()
    ))];
    for (drum, on) in DrumType::DISTORTABLE.iter().zip(state.distortion) {
        let style = if on {
            Style::default().fg(Color::LightRed).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{} ", drum.label()), style));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).block(Block::bordered()), area);
}
