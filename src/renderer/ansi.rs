//! Escape sequences the viewer writes.
//!
//! Positions are 0-based here and 1-based on the wire. Colors are always
//! 24-bit; the terminal default color maps to SGR 39/49.

use std::io::{self, Write};

use crate::types::{Attr, Rgba};

const CSI: &str = "\x1b[";

/// SGR codes for the attributes the panel uses, in emission order.
const ATTR_CODES: [(Attr, u8); 5] = [
    (Attr::BOLD, 1),
    (Attr::DIM, 2),
    (Attr::ITALIC, 3),
    (Attr::UNDERLINE, 4),
    (Attr::INVERSE, 7),
];

fn private_mode<W: Write>(w: &mut W, modes: &[u16], on: bool) -> io::Result<()> {
    let suffix = if on { 'h' } else { 'l' };
    for mode in modes {
        write!(w, "{CSI}?{mode}{suffix}")?;
    }
    Ok(())
}

// =============================================================================
// Cursor and screen
// =============================================================================

pub fn cursor_to<W: Write>(w: &mut W, x: u16, y: u16) -> io::Result<()> {
    write!(w, "{CSI}{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    private_mode(w, &[25], false)
}

pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    private_mode(w, &[25], true)
}

/// Erase the screen and the scrollback, then home the cursor.
pub fn clear_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "{CSI}2J{CSI}3J{CSI}H")
}

pub fn enter_alt_screen<W: Write>(w: &mut W) -> io::Result<()> {
    private_mode(w, &[1049], true)
}

pub fn exit_alt_screen<W: Write>(w: &mut W) -> io::Result<()> {
    private_mode(w, &[1049], false)
}

/// Terminals that support mode 2026 hold the screen until `end_sync`.
pub fn begin_sync<W: Write>(w: &mut W) -> io::Result<()> {
    private_mode(w, &[2026], true)
}

pub fn end_sync<W: Write>(w: &mut W) -> io::Result<()> {
    private_mode(w, &[2026], false)
}

pub fn set_title<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    write!(w, "\x1b]0;{title}\x07")
}

// =============================================================================
// Style
// =============================================================================

pub fn reset<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "{CSI}0m")
}

fn color<W: Write>(w: &mut W, base: u8, color: Rgba) -> io::Result<()> {
    if color.is_terminal_default() {
        write!(w, "{CSI}{}m", base + 1)
    } else {
        write!(w, "{CSI}{base};2;{};{};{}m", color.r, color.g, color.b)
    }
}

pub fn fg<W: Write>(w: &mut W, rgba: Rgba) -> io::Result<()> {
    color(w, 38, rgba)
}

pub fn bg<W: Write>(w: &mut W, rgba: Rgba) -> io::Result<()> {
    color(w, 48, rgba)
}

/// One SGR sequence for every set flag; nothing for `Attr::NONE`.
pub fn attrs<W: Write>(w: &mut W, attr: Attr) -> io::Result<()> {
    let codes: Vec<String> = ATTR_CODES
        .iter()
        .filter(|(flag, _)| attr.contains(*flag))
        .map(|(_, code)| code.to_string())
        .collect();
    if codes.is_empty() {
        return Ok(());
    }
    write!(w, "{CSI}{}m", codes.join(";"))
}

// =============================================================================
// Mouse
// =============================================================================

/// Button, drag and any-motion tracking, SGR encoded.
const MOUSE_MODES: [u16; 4] = [1000, 1002, 1003, 1006];

pub fn enable_mouse<W: Write>(w: &mut W) -> io::Result<()> {
    private_mode(w, &MOUSE_MODES, true)
}

pub fn disable_mouse<W: Write>(w: &mut W) -> io::Result<()> {
    let mut modes = MOUSE_MODES;
    modes.reverse();
    private_mode(w, &modes, false)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn emit(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_cursor_is_one_based() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(emit(|w| cursor_to(w, 5, 10)), "\x1b[11;6H");
        assert_eq!(emit(|w| cursor_to(w, u16::MAX, 0)), "\x1b[1;65536H");
    }

    #[test]
    fn test_private_modes() {
        assert_eq!(emit(enter_alt_screen), "\x1b[?1049h");
        assert_eq!(emit(exit_alt_screen), "\x1b[?1049l");
        assert_eq!(emit(begin_sync), "\x1b[?2026h");
        assert_eq!(emit(cursor_hide), "\x1b[?25l");
        assert_eq!(emit(enable_mouse), "\x1b[?1000h\x1b[?1002h\x1b[?1003h\x1b[?1006h");
        assert_eq!(emit(disable_mouse), "\x1b[?1006l\x1b[?1003l\x1b[?1002l\x1b[?1000l");
    }

    #[test]
    fn test_colors() {
        assert_eq!(emit(|w| fg(w, Rgba::TERMINAL_DEFAULT)), "\x1b[39m");
        assert_eq!(emit(|w| bg(w, Rgba::TERMINAL_DEFAULT)), "\x1b[49m");
        assert_eq!(emit(|w| fg(w, Rgba::rgb(255, 128, 0))), "\x1b[38;2;255;128;0m");
        assert_eq!(emit(|w| bg(w, Rgba::BLACK)), "\x1b[48;2;0;0;0m");
    }

    #[test]
    fn test_attrs() {
        assert_eq!(emit(|w| attrs(w, Attr::NONE)), "");
        assert_eq!(emit(|w| attrs(w, Attr::DIM)), "\x1b[2m");
        assert_eq!(emit(|w| attrs(w, Attr::BOLD | Attr::INVERSE)), "\x1b[1;7m");
    }
}
