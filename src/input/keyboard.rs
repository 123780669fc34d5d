//! Keyboard Module - key bindings
//!
//! # Bindings
//!
//! | Key | Command |
//! |---|---|
//! | `q`, `Esc`, `Ctrl-C` | quit |
//! | `space` | advance one frame (manual mode) |
//! | `p` | pause / resume |
//! | `r` | restart the input |
//! | `o` | reset the orientation |
//! | `x` `y` `z` | rotate +1° (Alt: +10°) |
//! | `X` `Y` `Z` | rotate -1° (Alt: -10°) |
//! | `c` `m` `v` | cycle palette, draw mode, size variation |
//! | `s` `t` `e` `w` | toggle sort, types, erase, background |
//! | `+` `-` | radius |
//! | `>` `<` | faster / slower |

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::orientation::Axis;
use crate::pipeline::session::Command;

/// Step of a rotation key, and of the same key with Alt held.
pub const ROTATE_STEP: f64 = 1.0;
pub const ROTATE_STEP_ALT: f64 = 10.0;

/// The command bound to a key press, if any. Releases are ignored.
pub fn command_for_key(event: KeyEvent) -> Option<Command> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let alt = event.modifiers.contains(KeyModifiers::ALT);
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

    let command = match event.code {
        KeyCode::Esc => Command::Quit,
        KeyCode::Char('c') if ctrl => Command::Quit,
        KeyCode::Char(c) if matches!(c, 'x' | 'y' | 'z' | 'X' | 'Y' | 'Z') => rotation(c, alt),
        KeyCode::Char(c) => match c {
            'q' => Command::Quit,
            ' ' => Command::Advance,
            'p' => Command::TogglePause,
            'r' => Command::Restart,
            'o' => Command::ResetOrientation,
            'c' => Command::CyclePalette,
            'm' => Command::CycleDrawMode,
            'v' => Command::CycleSizeVariation,
            's' => Command::ToggleSort,
            't' => Command::ToggleTypes,
            'e' => Command::ToggleErase,
            'w' => Command::ToggleBackground,
            '+' | '=' => Command::Radius(1),
            '-' => Command::Radius(-1),
            '>' => Command::Faster,
            '<' => Command::Slower,
            _ => return None,
        },
        _ => return None,
    };
    Some(command)
}

fn rotation(c: char, alt: bool) -> Command {
    let axis = match c.to_ascii_lowercase() {
        'x' => Axis::X,
        'y' => Axis::Y,
        _ => Axis::Z,
    };
    let step = if alt { ROTATE_STEP_ALT } else { ROTATE_STEP };
    let degrees = if c.is_ascii_uppercase() { -step } else { step };
    Command::Rotate { axis, degrees }
}

// =============================================================================
// TESTS
// =============================================================================
