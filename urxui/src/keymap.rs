//! Keyboard to [`UiEvent`] translation.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::intent::{EditEvent, UiEvent};
use crate::jog::{Axis, Direction, JogButton};

/// `(positive, negative)` key pairs in axis order. Lowercase jogs the
/// linear axes X..RZ, uppercase the joints J0..J5.
pub const JOG_KEYS: [(char, char); 6] = [('q', 'a'), ('w', 's'), ('e', 'd'), ('r', 'f'), ('t', 'g'), ('y', 'h')];

pub fn jog_button(key: char) -> Option<JogButton> {
    let lower = key.to_ascii_lowercase();
    let (index, direction) = JOG_KEYS.iter().enumerate().find_map(|(i, (plus, minus))| {
        if lower == *plus {
            Some((i, Direction::Positive))
        } else if lower == *minus {
            Some((i, Direction::Negative))
        } else {
            None
        }
    })?;
    let axis = if key.is_ascii_uppercase() {
        Axis::JOINTS[index]
    } else {
        Axis::LINEAR[index]
    };
    Some(JogButton::new(axis, direction))
}

/// Translates one key event.
///
/// `releases` tells whether the terminal reports key releases. Without them
/// every jog key press is a click. Jog key releases are reported even while
/// a field is being edited, so a press that started before focus moved
/// still ends.
pub fn translate(key: &KeyEvent, editing: bool, releases: bool) -> Vec<UiEvent> {
    if is_quit(key) {
        return vec![UiEvent::Quit];
    }
    let code = normalize(key);
    if key.kind == KeyEventKind::Release {
        return match code {
            KeyCode::Char(c) => jog_releases(c),
            _ => Vec::new(),
        };
    }
    if editing {
        return translate_edit(key).map(UiEvent::Edit).into_iter().collect();
    }

    if let KeyCode::Char(c) = code {
        if let Some(button) = jog_button(c) {
            return match key.kind {
                KeyEventKind::Press if releases => vec![UiEvent::JogPress(button)],
                KeyEventKind::Press => vec![UiEvent::JogClick(button)],
                _ => Vec::new(),
            };
        }
    }

    if key.kind != KeyEventKind::Press {
        return Vec::new();
    }
    let event = match code {
        KeyCode::Char(c @ '1'..='8') => UiEvent::ToggleOutput(c as u8 - b'1'),
        KeyCode::Char(' ') => UiEvent::Stop,
        KeyCode::Char('c') => UiEvent::Connect,
        KeyCode::Char('x') => UiEvent::Disconnect,
        KeyCode::Char('v') => UiEvent::ApplyCsys,
        KeyCode::Char('m') => UiEvent::ToggleToolFrame,
        KeyCode::Tab => UiEvent::Edit(EditEvent::FocusNext),
        _ => return Vec::new(),
    };
    vec![event]
}

fn normalize(key: &KeyEvent) -> KeyCode {
    match key.code {
        // some terminals report shifted letters lowercase with the modifier set
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::SHIFT) => KeyCode::Char(c.to_ascii_uppercase()),
        code => code,
    }
}

/// Shift may be let go before the letter, so both cases are released.
fn jog_releases(c: char) -> Vec<UiEvent> {
    jog_button(c)
        .into_iter()
        .chain(jog_button(toggle_case(c)))
        .map(UiEvent::JogRelease)
        .collect()
}

fn translate_edit(key: &KeyEvent) -> Option<EditEvent> {
    let edit = match key.code {
        KeyCode::Esc => EditEvent::Leave,
        KeyCode::Tab => EditEvent::FocusNext,
        KeyCode::Enter => EditEvent::Submit,
        KeyCode::Backspace => EditEvent::Backspace,
        KeyCode::Up => EditEvent::HistoryOlder,
        KeyCode::Down => EditEvent::HistoryNewer,
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::SHIFT) => EditEvent::Insert(c.to_ascii_uppercase()),
        KeyCode::Char(c) => EditEvent::Insert(c),
        _ => return None,
    };
    Some(edit)
}

fn is_quit(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::F(10) => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

fn toggle_case(c: char) -> char {
    if c.is_ascii_uppercase() {
        c.to_ascii_lowercase()
    } else {
        c.to_ascii_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn press(c: char) -> KeyEvent {
        key(KeyCode::Char(c), KeyEventKind::Press)
    }

    #[test]
    fn every_axis_has_both_directions() {
        let mut buttons = Vec::new();
        for (plus, minus) in JOG_KEYS {
            for c in [plus, minus, plus.to_ascii_uppercase(), minus.to_ascii_uppercase()] {
                buttons.push(jog_button(c).unwrap());
            }
        }
        for axis in Axis::LINEAR.into_iter().chain(Axis::JOINTS) {
            assert!(buttons.contains(&JogButton::new(axis, Direction::Positive)));
            assert!(buttons.contains(&JogButton::new(axis, Direction::Negative)));
        }
        assert_eq!(jog_button('d'), Some(JogButton::new(Axis::Z, Direction::Negative)));
        assert_eq!(jog_button('Y'), Some(JogButton::new(Axis::J5, Direction::Positive)));
        assert_eq!(jog_button('z'), None);
    }

    #[test]
    fn press_is_a_click_without_release_reporting() {
        let plus_x = JogButton::new(Axis::X, Direction::Positive);
        assert_eq!(translate(&press('q'), false, false), vec![UiEvent::JogClick(plus_x)]);
        assert_eq!(translate(&press('q'), false, true), vec![UiEvent::JogPress(plus_x)]);
        assert!(translate(&key(KeyCode::Char('q'), KeyEventKind::Repeat), false, true).is_empty());
    }

    #[test]
    fn release_covers_both_cases() {
        let events = translate(&key(KeyCode::Char('w'), KeyEventKind::Release), false, true);
        assert_eq!(
            events,
            vec![
                UiEvent::JogRelease(JogButton::new(Axis::Y, Direction::Positive)),
                UiEvent::JogRelease(JogButton::new(Axis::J1, Direction::Positive)),
            ]
        );
    }

    #[test]
    fn shift_modifier_selects_joints() {
        let mut event = press('e');
        event.modifiers = KeyModifiers::SHIFT;
        assert_eq!(
            translate(&event, false, false),
            vec![UiEvent::JogClick(JogButton::new(Axis::J2, Direction::Positive))]
        );
    }

    #[test]
    fn controls_map_to_events() {
        assert_eq!(translate(&press('1'), false, false), vec![UiEvent::ToggleOutput(0)]);
        assert_eq!(translate(&press('8'), false, false), vec![UiEvent::ToggleOutput(7)]);
        assert!(translate(&press('9'), false, false).is_empty());
        assert_eq!(translate(&press(' '), false, false), vec![UiEvent::Stop]);
        assert_eq!(translate(&press('c'), false, false), vec![UiEvent::Connect]);
        assert_eq!(translate(&press('x'), false, false), vec![UiEvent::Disconnect]);
        assert_eq!(translate(&press('v'), false, false), vec![UiEvent::ApplyCsys]);
        assert_eq!(translate(&press('m'), false, false), vec![UiEvent::ToggleToolFrame]);
        assert!(translate(&key(KeyCode::Char('c'), KeyEventKind::Release), false, true).is_empty());
    }

    #[test]
    fn editing_captures_letters() {
        assert_eq!(translate(&press('q'), true, true), vec![UiEvent::Edit(EditEvent::Insert('q'))]);
        assert_eq!(
            translate(&key(KeyCode::Esc, KeyEventKind::Press), true, false),
            vec![UiEvent::Edit(EditEvent::Leave)]
        );
        assert_eq!(
            translate(&key(KeyCode::Up, KeyEventKind::Press), true, false),
            vec![UiEvent::Edit(EditEvent::HistoryOlder)]
        );
    }

    #[test]
    fn jog_release_gets_through_while_editing() {
        let release = key(KeyCode::Char('q'), KeyEventKind::Release);
        assert_eq!(
            translate(&release, true, true),
            vec![
                UiEvent::JogRelease(JogButton::new(Axis::X, Direction::Positive)),
                UiEvent::JogRelease(JogButton::new(Axis::J0, Direction::Positive)),
            ]
        );
        assert!(translate(&key(KeyCode::Char('z'), KeyEventKind::Release), true, true).is_empty());
        assert!(translate(&key(KeyCode::Tab, KeyEventKind::Release), true, true).is_empty());
    }

    #[test]
    fn quit_works_while_editing() {
        let mut ctrl_c = press('c');
        ctrl_c.modifiers = KeyModifiers::CONTROL;
        assert_eq!(translate(&ctrl_c, true, false), vec![UiEvent::Quit]);
        assert_eq!(translate(&key(KeyCode::F(10), KeyEventKind::Press), false, false), vec![UiEvent::Quit]);
    }
}
