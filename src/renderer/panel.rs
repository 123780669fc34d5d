//! Status panel under the view area.

use crate::config::Configuration;
use crate::pipeline::session::Status;
use crate::renderer::buffer::FrameBuffer;
use crate::types::{Attr, ClipRect, Rgba, MISSING_TIME};

/// Rows the panel occupies.
pub const PANEL_ROWS: u16 = 3;

pub const HELP: &str = "q quit  spc step  p pause  r restart  o reset  x/y/z rotate (X/Y/Z back, alt x10)  \
c palette  m mode  v vary  s sort  t types  e erase  w bg  +/- radius  </> speed";

/// Frame, time, angles and state flags.
pub fn status_line(status: &Status) -> String {
    let time = match status.time {
        Some(t) if t != MISSING_TIME => format!("{t:10.3}"),
        Some(_) => format!("{:>10}", "-"),
        None => format!("{:>10}", "waiting"),
    };
    let frame = status.sequence.map_or_else(|| "-".to_string(), |s| s.to_string());
    let mut line = format!(
        "t {time}  frame {frame:>6}  atoms {:>6}  X {:7.1}  Y {:7.1}  Z {:7.1}",
        status.atoms, status.angles.x, status.angles.y, status.angles.z
    );
    if status.paused {
        line.push_str("  [paused]");
    }
    if status.manual {
        line.push_str("  [step]");
    }
    if status.at_end {
        line.push_str("  [end]");
    }
    line
}

/// Cursor readout, bounds and the active display options.
pub fn detail_line(status: &Status, config: &Configuration) -> String {
    let cursor = match status.cursor {
        Some((x, y)) => format!("x {x:9.3} y {y:9.3}"),
        None => format!("{:21}", ""),
    };
    let bounds = match status.bounds {
        Some(b) => format!(
            "[{:.2}, {:.2}] [{:.2}, {:.2}] [{:.2}, {:.2}]",
            b.xmin, b.xmax, b.ymin, b.ymax, b.zmin, b.zmax
        ),
        None => "-".to_string(),
    };
    format!(
        "{cursor}  bounds {bounds}  {} r{} {} {}",
        config.mode.name(),
        config.radius,
        config.palette.name(),
        config.vary.name()
    )
}

/// Draw the panel into `rect` (at most `PANEL_ROWS` rows are used).
pub fn draw(buffer: &mut FrameBuffer, rect: ClipRect, status: &Status, config: &Configuration) {
    let bg = Rgba::TERMINAL_DEFAULT;
    buffer.fill_rect(rect, bg, None);

    let lines = [
        (status_line(status), Attr::BOLD),
        (detail_line(status, config), Attr::NONE),
        (HELP.to_string(), Attr::DIM),
    ];
    for (row, (text, attrs)) in lines.iter().enumerate().take(rect.height as usize) {
        buffer.draw_text(
            rect.x,
            rect.y + row as u16,
            text,
            Rgba::TERMINAL_DEFAULT,
            Some(bg),
            *attrs,
            Some(&rect),
        );
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orientation::EulerAngles;
    use crate::types::Bounds;

    fn status() -> Status {
        Status {
            time: Some(1.5),
            sequence: Some(3),
            atoms: 42,
            angles: EulerAngles {
                x: 10.0,
                y: 0.0,
                z: 270.0,
            },
            bounds: Some(Bounds {
                xmin: -1.0,
                xmax: 1.0,
                ymin: -2.0,
                ymax: 2.0,
                zmin: 0.0,
                zmax: 5.0,
            }),
            cursor: Some((0.25, -1.0)),
            paused: true,
            manual: false,
            at_end: true,
        }
    }

    #[test]
    fn test_status_line() {
        let line = status_line(&status());
        assert!(line.contains("1.500"));
        assert!(line.contains("frame      3"));
        assert!(line.contains("Z   270.0"));
        assert!(line.contains("[paused]"));
        assert!(line.contains("[end]"));
        assert!(!line.contains("[step]"));
    }

    #[test]
    fn test_status_line_without_frame() {
        let empty = Status {
            time: None,
            sequence: None,
            atoms: 0,
            bounds: None,
            cursor: None,
            paused: false,
            at_end: false,
            ..status()
        };
        assert!(status_line(&empty).contains("waiting"));
        assert!(detail_line(&empty, &Configuration::default()).contains("bounds -"));
    }

    #[test]
    fn test_detail_line() {
        let line = detail_line(&status(), &Configuration::default());
        assert!(line.contains("x     0.250"));
        assert!(line.contains("[-1.00, 1.00] [-2.00, 2.00] [0.00, 5.00]"));
    }

    #[test]
    fn test_draw_clips_to_rect() {
        let mut buffer = FrameBuffer::new(30, 5);
        let rect = ClipRect::new(0, 2, 30, 2);
        draw(&mut buffer, rect, &status(), &Configuration::default());
        assert_eq!(buffer.get(0, 2).unwrap().char, 't' as u32);
        assert_eq!(buffer.get(0, 2).unwrap().attrs, Attr::BOLD);
        assert_eq!(buffer.get(0, 4).unwrap().char, ' ' as u32);
        assert_eq!(buffer.get(0, 1).unwrap().char, ' ' as u32);
    }
}
