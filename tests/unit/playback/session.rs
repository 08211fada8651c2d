use super::*;
use crate::foundation::error::MotiongramError;
use crate::playback::host::{SystemClock, VirtualClock};

/// Renderer that records where every element was when it was drawn.
#[derive(Default)]
struct Recorder {
    positions: Vec<Vec<(f64, f64)>>,
}

impl ShapeRenderer for Recorder {
    fn render(
        &mut self,
        canvas: Canvas,
        _background: Rgba8,
        elements: &[Element],
    ) -> MotiongramResult<FrameRGBA> {
        self.positions
            .push(elements.iter().map(Element::position).collect());
        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba8_len()],
            premultiplied: true,
        })
    }
}

/// Renderer that cancels the run while its frame is being drawn.
struct StopsMidFrame {
    handle: Option<StopHandle>,
}

impl ShapeRenderer for StopsMidFrame {
    fn render(
        &mut self,
        canvas: Canvas,
        _background: Rgba8,
        _elements: &[Element],
    ) -> MotiongramResult<FrameRGBA> {
        if let Some(handle) = &self.handle {
            handle.stop();
        }
        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba8_len()],
            premultiplied: true,
        })
    }
}

const SLIDE: &str = r#"
objects:
  - name: A
    startX: 0
    startY: 0
    shape:
      premade: rectangle
movements:
  - name: A
    timeStart: 0
    timeEnd: 1000
    endX: 100
    strategy: linear
"#;

fn opts(duration_ms: Millis) -> SessionOpts {
    SessionOpts {
        canvas: Canvas::new(2, 2).unwrap(),
        duration_ms,
        ..SessionOpts::default()
    }
}

fn session(duration_ms: Millis, doc: &str) -> Session<Recorder, VirtualClock> {
    let mut s = Session::new(opts(duration_ms), Recorder::default(), VirtualClock::new()).unwrap();
    s.load_str(doc, DocumentFormat::Yaml).unwrap();
    s
}

#[test]
fn run_captures_one_frame_per_tick_until_duration() {
    let mut s = session(100.0, SLIDE);
    let outcome = s.run_to_completion().unwrap();
    assert_eq!(outcome, TickOutcome::Finished { frames: 6 });
    let elapsed: Vec<Millis> = s.frames().iter().map(|f| f.elapsed_ms).collect();
    assert_eq!(elapsed, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    assert_eq!(s.state(), ClockState::Idle);
    assert_eq!(s.host().now_ms(), 100.0);
}

#[test]
fn linear_slide_reaches_the_halfway_point() {
    let mut s = session(1000.0, SLIDE);
    s.run_to_completion().unwrap();
    let idx = s
        .frames()
        .iter()
        .position(|f| f.elapsed_ms == 500.0)
        .unwrap();
    let positions = &s.renderer_mut().positions;
    assert_eq!(positions[idx], vec![(50.0, 0.0)]);
    assert_eq!(positions.last().unwrap(), &vec![(100.0, 0.0)]);
    assert_eq!(s.elements()[0].position(), (100.0, 0.0));
}

#[test]
fn early_tickets_wait_for_their_due_time() {
    let mut s = session(1000.0, SLIDE);
    let first = s.start();
    let TickOutcome::Continue(next) = s.tick(first).unwrap() else {
        panic!("run ended early");
    };
    assert_eq!(next.due_ms(), 20.0);
    assert_eq!(s.host().now_ms(), 0.0);
    s.tick(next).unwrap();
    assert_eq!(s.host().now_ms(), 20.0);
    assert_eq!(s.frames().len(), 2);
}

#[test]
fn restart_mid_run_discards_the_old_run() {
    let mut s = session(1000.0, SLIDE);
    let mut ticket = s.start();
    for _ in 0..3 {
        match s.tick(ticket).unwrap() {
            TickOutcome::Continue(next) => ticket = next,
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(s.frames().len(), 3);
    let old_run = ticket.run();

    let fresh = s.start();
    assert!(s.frames().is_empty());
    assert_eq!(s.tick(ticket).unwrap(), TickOutcome::Cancelled);
    assert!(s.frames().is_empty());

    s.drive(fresh).unwrap();
    assert!(s.frames().iter().all(|f| f.run == fresh.run()));
    assert!(s.frames().iter().all(|f| f.run != old_run));
    assert_eq!(s.frames().as_slice()[0].elapsed_ms, 0.0);
}

#[test]
fn start_rewinds_elements() {
    let mut s = session(100.0, SLIDE);
    s.run_to_completion().unwrap();
    assert_ne!(s.elements()[0].position(), (0.0, 0.0));
    s.start();
    assert_eq!(s.elements()[0].position(), (0.0, 0.0));
}

#[test]
fn stop_keeps_frames_and_stales_the_ticket() {
    let mut s = session(1000.0, SLIDE);
    let first = s.start();
    let TickOutcome::Continue(next) = s.tick(first).unwrap() else {
        panic!("run ended early");
    };
    s.stop();
    assert_eq!(s.tick(next).unwrap(), TickOutcome::Cancelled);
    assert_eq!(s.frames().len(), 1);
    assert_eq!(s.state(), ClockState::Idle);
}

#[test]
fn unsupported_strategy_halts_and_keeps_earlier_frames() {
    let doc = r#"
objects:
  - name: A
    startX: 0
    startY: 0
    shape:
      premade: star
movements:
  - name: A
    timeStart: 40
    timeEnd: 100
    endY: 10
    strategy: bounce
"#;
    let mut s = session(1000.0, doc);
    let err = s.run_to_completion().unwrap_err();
    assert!(matches!(
        err,
        MotiongramError::UnsupportedStrategy { movement: 0, .. }
    ));
    assert_eq!(s.state(), ClockState::Idle);
    let elapsed: Vec<Millis> = s.frames().iter().map(|f| f.elapsed_ms).collect();
    assert_eq!(elapsed, vec![0.0, 20.0]);
}

#[test]
fn failed_load_leaves_the_session_untouched() {
    let mut s = session(100.0, SLIDE);
    let err = s
        .load_str("objects: [ {name: B} ]", DocumentFormat::Yaml)
        .unwrap_err();
    assert!(matches!(err, MotiongramError::Validation(_)));
    assert_eq!(s.elements().len(), 1);
    assert_eq!(s.elements()[0].name, "A");
    assert_eq!(s.movements().len(), 1);
}

#[test]
fn loading_cancels_an_active_run() {
    let mut s = session(1000.0, SLIDE);
    let ticket = s.start();
    s.load_str("objects: []", DocumentFormat::Yaml).unwrap();
    assert_eq!(s.state(), ClockState::Idle);
    assert_eq!(s.tick(ticket).unwrap(), TickOutcome::Cancelled);
    assert!(s.elements().is_empty());
}

#[test]
fn draw_does_not_capture() {
    let mut s = session(100.0, SLIDE);
    let frame = s.draw().unwrap();
    assert_eq!((frame.width, frame.height), (2, 2));
    assert!(s.frames().is_empty());
}

#[test]
fn export_hands_frames_to_the_sink() {
    let mut s = session(40.0, SLIDE);
    s.run_to_completion().unwrap();
    let mut sink = crate::encode::sink::InMemorySink::new();
    s.export(&mut sink).unwrap();
    assert_eq!(sink.frames.len(), 3);
    assert_eq!(s.frames().len(), 3);
}

#[test]
fn invalid_timing_is_rejected_up_front() {
    let bad = SessionOpts {
        tick_interval_ms: 0.0,
        ..SessionOpts::default()
    };
    assert!(Session::new(bad, Recorder::default(), VirtualClock::new()).is_err());
}

#[test]
fn stop_handle_cancels_from_another_thread() {
    let mut s = Session::new(opts(10_000.0), Recorder::default(), SystemClock::new()).unwrap();
    s.load_str(SLIDE, DocumentFormat::Yaml).unwrap();
    let handle = s.stop_handle();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(60));
        handle.stop();
    });
    let outcome = s.run_to_completion().unwrap();
    stopper.join().unwrap();
    assert_eq!(outcome, TickOutcome::Cancelled);
    assert!(!s.frames().is_empty());
    assert!(s.frames().len() < 100);
}

#[test]
fn stop_during_render_captures_nothing() {
    let renderer = StopsMidFrame { handle: None };
    let mut s = Session::new(opts(1000.0), renderer, VirtualClock::new()).unwrap();
    s.load_str(SLIDE, DocumentFormat::Yaml).unwrap();
    let handle = s.stop_handle();
    s.renderer_mut().handle = Some(handle);

    assert_eq!(s.run_to_completion().unwrap(), TickOutcome::Cancelled);
    assert!(s.frames().is_empty());
    assert_eq!(s.state(), ClockState::Idle);
}
