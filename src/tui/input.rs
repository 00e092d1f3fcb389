use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use stepkit::shared::{DrumType, InputEvent};

const BPM_STEP: f32 = 1.0;
const SWING_STEP: f32 = 5.0;

// poll for a key press, translate it into input events for the middle layer
pub fn poll_input(timeout: Duration) -> anyhow::Result<Vec<InputEvent>> {
    if !event::poll(timeout)? {
        return Ok(vec![]);
    }

    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(vec![]);
        }
        return Ok(handle_key(key.code).into_iter().collect());
    }
    Ok(vec![])
}

fn handle_key(code: KeyCode) -> Option<InputEvent> {
    let event = match code {
        KeyCode::Esc => InputEvent::Quit,
        KeyCode::Char(' ') => InputEvent::PlayPause,
        KeyCode::Char('s') => InputEvent::Stop,

        // edit cursor
        KeyCode::Up => InputEvent::CursorUp,
        KeyCode::Down => InputEvent::CursorDown,
        KeyCode::Left => InputEvent::CursorLeft,
        KeyCode::Right => InputEvent::CursorRight,
        KeyCode::Enter => InputEvent::ToggleStep,
        KeyCode::Char('a') => InputEvent::ToggleAccent,

        // bars
        KeyCode::PageUp | KeyCode::Char(',') => InputEvent::PrevBar,
        KeyCode::PageDown | KeyCode::Char('.') => InputEvent::NextBar,
        KeyCode::Char('n') => InputEvent::AddBar,
        KeyCode::Char('x') => InputEvent::DeleteBar,
        KeyCode::Char('c') => InputEvent::DuplicateBar,
        KeyCode::Backspace => InputEvent::ClearBar,
        KeyCode::Char('y') => InputEvent::CopyBar,
        KeyCode::Char('p') => InputEvent::PasteBar,
        KeyCode::Char('<') => InputEvent::MoveBar(-1),
        KeyCode::Char('>') => InputEvent::MoveBar(1),

        // groove
        KeyCode::Char('[') => InputEvent::AdjustBpm(-BPM_STEP),
        KeyCode::Char(']') => InputEvent::AdjustBpm(BPM_STEP),
        KeyCode::Char('-') => InputEvent::AdjustSwing(-SWING_STEP),
        KeyCode::Char('=') => InputEvent::AdjustSwing(SWING_STEP),
        KeyCode::Char('k') => InputEvent::NextKit,
        KeyCode::Char('1') => InputEvent::ToggleDistortion(DrumType::Kick),
        KeyCode::Char('2') => InputEvent::ToggleDistortion(DrumType::Snare),
        KeyCode::Char('3') => InputEvent::ToggleDistortion(DrumType::Clap),

        KeyCode::Char('R') => InputEvent::ResetAll,
        KeyCode::Char('w') => InputEvent::Save,
        _ => return None,
    };
    Some(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_events() {
        assert_eq!(handle_key(KeyCode::Char(' ')), Some(InputEvent::PlayPause));
        assert_eq!(handle_key(KeyCode::Enter), Some(InputEvent::ToggleStep));
        assert_eq!(handle_key(KeyCode::Char(']')), Some(InputEvent::AdjustBpm(1.0)));
        assert_eq!(handle_key(KeyCode::Char('-')), Some(InputEvent::AdjustSwing(-5.0)));
        assert_eq!(
            handle_key(KeyCode::Char('3')),
            Some(InputEvent::ToggleDistortion(DrumType::Clap))
        );
        assert_eq!(handle_key(KeyCode::Char('y')), Some(InputEvent::CopyBar));
        assert_eq!(handle_key(KeyCode::Char('p')), Some(InputEvent::PasteBar));
        assert_eq!(handle_key(KeyCode::Char('<')), Some(InputEvent::MoveBar(-1)));
        assert_eq!(handle_key(KeyCode::Char('>')), Some(InputEvent::MoveBar(1)));
        assert_eq!(handle_key(KeyCode::Char('R')), Some(InputEvent::ResetAll));
        assert_eq!(handle_key(KeyCode::Char('r')), None);
        assert_eq!(handle_key(KeyCode::Esc), Some(InputEvent::Quit));
        assert_eq!(handle_key(KeyCode::Char('z')), None);
    }
}
