use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use ratatui::Frame;
use stepkit::shared::{DisplayState, DrumType, STEPS_PER_BAR};

const LABEL_WIDTH: usize = 9;

// one row per drum in grid order, one cell per step; accented snares show as [#]
pub fn draw_step_grid(frame: &mut Frame, area: Rect, state: &DisplayState) {
    let mut lines: Vec<Line> = Vec::with_capacity(DrumType::GRID_ORDER.len() + 2);
    lines.push(step_numbers(state));

    for (row, drum) in DrumType::GRID_ORDER.iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!("{:<width$}", drum.label(), width = LABEL_WIDTH),
            Style::default().fg(Color::Gray),
        )];
        for step in 0..STEPS_PER_BAR {
            let on = state.grid[row][step];
            let accented = *drum == DrumType::Snare && state.accents[step];
            spans.push(cell(state, row, step, on, accented));
        }
        lines.push(Line::from(spans));
    }

    let title = format!(" bar {}/{} ", state.shown_bar + 1, state.bar_count);
    frame.render_widget(Paragraph::new(lines).block(Block::bordered().title(title)), area);
}

fn step_numbers(state: &DisplayState) -> Line<'static> {
    let mut spans = vec![Span::raw(" ".repeat(LABEL_WIDTH))];
    for step in 0..STEPS_PER_BAR {
        let style = if state.playhead == Some(step) {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if step % 4 == 0 {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("{:<3}", step + 1), style));
    }
    Line::from(spans)
}

fn cell(state: &DisplayState, row: usize, step: usize, on: bool, accented: bool) -> Span<'static> {
    let glyph = match (on, accented) {
        (true, true) => "[#]",
        (true, false) => "[x]",
        (false, _) => "[ ]",
    };
    let mut style = if accented {
        Style::default().fg(Color::LightRed)
    } else if on {
        Style::default().fg(Color::LightMagenta)
    } else if step / 4 % 2 == 0 {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Gray)
    };
    if state.playhead == Some(step) {
        style = style.bg(Color::Magenta);
    }
    if state.cursor == (row, step) {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(glyph, style)
}
