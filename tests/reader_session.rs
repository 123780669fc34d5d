//! Reader thread, session and headless viewer against real files.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use trajview::config::{Configuration, DumpNaming, DumpTarget, InputFormat, InputSpec};
use trajview::error::TrajectoryError;
use trajview::pipeline::{FileSwap, FrameStore, InputReader, ReaderMessage, Session, TickOutcome};
use trajview::renderer::Canvas;
use trajview::trajectory::{open_source, ParseOptions};
use trajview::Viewer;

const COLUMNAR: &str = "\
0 0 0 0
1 1 1 0
2 2 2 0
0 0 0 1
1 1.5 1 1
2 2 2 1
0 0 0 2
1 1 1.5 2
2 2 2 2
";

static NEXT_FILE: AtomicUsize = AtomicUsize::new(0);

fn temp_path(ext: &str) -> PathBuf {
    let n = NEXT_FILE.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!("trajview-it-{}-{n}.{ext}", std::process::id()))
}

fn write_input(text: &str) -> PathBuf {
    let path = temp_path("dat");
    fs::write(&path, text).unwrap();
    path
}

fn config_for(path: &PathBuf) -> Configuration {
    Configuration {
        input: InputSpec::Path(path.clone()),
        capacity: 4,
        ..Configuration::default()
    }
}

struct Pipeline {
    session: Session,
    reader: InputReader,
    messages: Receiver<ReaderMessage>,
}

fn start(config: Configuration) -> Pipeline {
    let source = open_source(&config.input, &ParseOptions::from_config(&config)).unwrap();
    let store = Arc::new(FrameStore::new(config.capacity));
    let swap = Arc::new(FileSwap::new());
    let (reader, messages) = InputReader::spawn(source, Arc::clone(&store), Arc::clone(&swap)).unwrap();
    Pipeline {
        session: Session::new(config, store, swap),
        reader,
        messages,
    }
}

/// Tick until the session reaches the last frame; returns the shown sequences.
fn play_to_end(session: &mut Session) -> Vec<u64> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut shown = Vec::new();
    while !session.status().at_end {
        assert!(Instant::now() < deadline, "timed out after {shown:?}");
        match session.tick(Instant::now()) {
            TickOutcome::Rendered => shown.push(session.current().unwrap().seq),
            TickOutcome::Idle => thread::sleep(Duration::from_millis(1)),
            TickOutcome::Quit => break,
        }
    }
    shown
}

fn wait_message(messages: &Receiver<ReaderMessage>, mut want: impl FnMut(&ReaderMessage) -> bool) -> ReaderMessage {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        let message = messages.recv_timeout(left).expect("reader message");
        if want(&message) {
            return message;
        }
    }
}

// =============================================================================
// Reader and session
// =============================================================================

#[test]
fn test_columnar_file_plays_every_frame() {
    let path = write_input(COLUMNAR);
    let mut p = start(config_for(&path));

    assert_eq!(play_to_end(&mut p.session), vec![0, 1, 2]);
    let current = p.session.current().unwrap();
    assert_eq!(current.frame.time, 2.0);
    assert_eq!(current.frame.atoms.len(), 3);

    match wait_message(&p.messages, |m| matches!(m, ReaderMessage::EndOfInput { .. })) {
        ReaderMessage::EndOfInput { frames } => assert_eq!(frames, 3),
        other => panic!("unexpected {other:?}"),
    }

    // holding at the end does not consume anything further
    assert_eq!(p.session.tick(Instant::now()), TickOutcome::Idle);
    assert_eq!(p.session.current().unwrap().seq, 2);

    p.reader.stop();
    assert!(!p.reader.is_running());
    fs::remove_file(path).ok();
}

#[test]
fn test_once_mode_quits_after_last_frame() {
    let path = write_input(COLUMNAR);
    let mut p = start(Configuration {
        once: true,
        ..config_for(&path)
    });

    assert_eq!(play_to_end(&mut p.session), vec![0, 1, 2]);
    assert_eq!(p.session.tick(Instant::now()), TickOutcome::Quit);
    assert!(p.session.should_quit());
    fs::remove_file(path).ok();
}

#[test]
fn test_restart_replays_from_first_frame() {
    let path = write_input(COLUMNAR);
    let mut p = start(config_for(&path));

    assert_eq!(play_to_end(&mut p.session), vec![0, 1, 2]);
    wait_message(&p.messages, |m| matches!(m, ReaderMessage::EndOfInput { .. }));

    p.session.restart();
    assert!(p.session.current().is_none());
    match wait_message(&p.messages, |m| matches!(m, ReaderMessage::Opened(_))) {
        ReaderMessage::Opened(label) => assert!(label.contains("trajview-it-")),
        other => panic!("unexpected {other:?}"),
    }

    assert_eq!(play_to_end(&mut p.session), vec![0, 1, 2]);
    fs::remove_file(path).ok();
}

#[test]
fn test_pause_holds_the_current_frame() {
    let path = write_input(COLUMNAR);
    let mut p = start(config_for(&path));

    let deadline = Instant::now() + Duration::from_secs(5);
    while p.session.tick(Instant::now()) != TickOutcome::Rendered {
        assert!(Instant::now() < deadline);
        thread::sleep(Duration::from_millis(1));
    }
    p.session.handle(trajview::pipeline::Command::TogglePause);
    thread::sleep(Duration::from_millis(20));
    for _ in 0..10 {
        assert_eq!(p.session.tick(Instant::now()), TickOutcome::Idle);
    }
    assert_eq!(p.session.current().unwrap().seq, 0);
    assert!(p.session.status().paused);

    p.session.handle(trajview::pipeline::Command::TogglePause);
    assert_eq!(play_to_end(&mut p.session), vec![1, 2]);
    fs::remove_file(path).ok();
}

#[test]
fn test_xyz_file_reaches_end_after_last_frame() {
    let path = write_input("2\nt = 0 fs\nSi 0 0 0\nGe 1 1 1\n2\nt = 0.5 fs\nSi 0 1 0\nGe 1 2 1\n");
    let mut config = config_for(&path);
    config.format = InputFormat::Xyz;
    config.columns.x = 2;
    config.columns.y = 3;
    config.columns.z = 4;
    let mut p = start(config);

    // the parser never flags these frames; the end comes from the reader
    assert_eq!(play_to_end(&mut p.session), vec![0, 1]);
    let current = p.session.current().unwrap();
    assert!(!current.frame.is_last);
    assert_eq!(current.frame.time, 0.5);
    assert!(p.session.status().at_end);

    match wait_message(&p.messages, |m| matches!(m, ReaderMessage::EndOfInput { .. })) {
        ReaderMessage::EndOfInput { frames } => assert_eq!(frames, 2),
        other => panic!("unexpected {other:?}"),
    }
    p.reader.stop();
    fs::remove_file(path).ok();
}

#[test]
fn test_malformed_xyz_header_is_fatal() {
    let path = write_input("2\nt = 0 fs\nSi 0 0 0\nGe 1 1 1\nnot-a-count\nt = 1 fs\n");
    let mut config = config_for(&path);
    config.format = InputFormat::Xyz;
    config.columns.x = 2;
    config.columns.y = 3;
    config.columns.z = 4;
    let mut p = start(config);

    match wait_message(&p.messages, |m| matches!(m, ReaderMessage::Fatal(_))) {
        ReaderMessage::Fatal(TrajectoryError::MalformedHeader { line, text }) => {
            assert_eq!(line, 5);
            assert_eq!(text, "not-a-count");
        }
        other => panic!("unexpected {other:?}"),
    }

    // the frame read before the bad header is still shown
    let deadline = Instant::now() + Duration::from_secs(5);
    while p.session.current().is_none() {
        assert!(Instant::now() < deadline);
        p.session.tick(Instant::now());
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(p.session.current().unwrap().frame.atoms.len(), 2);
    fs::remove_file(path).ok();
}

// =============================================================================
// Headless viewer
// =============================================================================

#[test]
fn test_viewer_paints_and_dumps_frames() {
    let path = write_input(COLUMNAR);
    let dump_base = temp_path("snap");
    let config = Configuration {
        area: Some((30, 15)),
        radius: 4,
        dump: Some(DumpTarget {
            name: dump_base.display().to_string(),
            naming: DumpNaming::BySequence,
        }),
        ..config_for(&path)
    };
    let mut viewer = Viewer::new(config).unwrap();
    assert_eq!((viewer.layout().area.width, viewer.layout().area.height), (30, 15));

    let deadline = Instant::now() + Duration::from_secs(5);
    while !viewer.session().status().at_end {
        assert!(Instant::now() < deadline);
        if viewer.step(Instant::now()).unwrap() == TickOutcome::Idle {
            thread::sleep(Duration::from_millis(1));
        }
    }

    let area = viewer.layout().area;
    let background = Canvas::background(false);
    let painted = (area.y..area.y + area.height)
        .flat_map(|y| (area.x..area.x + area.width).map(move |x| (x, y)))
        .filter(|&(x, y)| viewer.buffer().get(x, y).is_some_and(|c| c.bg != background))
        .count();
    assert!(painted > 0);

    // the box corner sits just outside the area
    assert_eq!(viewer.buffer().get(0, 0).unwrap().char, '┌' as u32);

    for seq in 0..3 {
        let snapshot = PathBuf::from(format!("{}-{seq}.ans", dump_base.display()));
        let text = fs::read_to_string(&snapshot).unwrap();
        assert!(text.contains('\u{250c}'));
        fs::remove_file(snapshot).ok();
    }
    fs::remove_file(path).ok();
}

#[test]
fn test_viewer_reports_missing_file() {
    let config = config_for(&temp_path("missing"));
    assert!(matches!(
        Viewer::new(config),
        Err(trajview::ViewerError::Trajectory(TrajectoryError::Open { .. }))
    ));
}
