use crate::{
    animation::resolver::{RunState, resolve_all},
    document::load::{Document, DocumentFormat},
    document::model::{Element, Movement, OverlapWarning},
    encode::sink::{FrameSink, export_frames},
    foundation::core::{Canvas, Millis, Rgba8},
    foundation::error::MotiongramResult,
    playback::clock::{AnimationClock, ClockState, StopHandle, TickTicket},
    playback::frames::{CapturedFrame, FrameBuffer},
    playback::host::HostClock,
    render::backend::{FrameRGBA, ShapeRenderer},
};

/// Session-wide options.
#[derive(Clone, Copy, Debug)]
pub struct SessionOpts {
    /// Output raster size.
    pub canvas: Canvas,
    /// Color every frame starts from.
    pub background: Rgba8,
    /// Run length; ticks continue while elapsed time is below it.
    pub duration_ms: Millis,
    /// Minimum spacing between ticks.
    pub tick_interval_ms: Millis,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            background: Rgba8::WHITE,
            duration_ms: AnimationClock::DEFAULT_DURATION_MS,
            tick_interval_ms: AnimationClock::DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

/// What a tick did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// A frame was captured and the run goes on; present this ticket next.
    Continue(TickTicket),
    /// A frame was captured and the run reached its duration.
    Finished {
        /// Frames captured by the run.
        frames: usize,
    },
    /// The ticket was stale; nothing ran.
    Cancelled,
}

/// Everything one animated diagram needs: the loaded elements, per-run movement state, the
/// clock, the frame buffer, and the renderer that fills it.
///
/// A session is driven from one thread. Only [`StopHandle`] crosses threads.
pub struct Session<R: ShapeRenderer, C: HostClock> {
    opts: SessionOpts,
    renderer: R,
    host: C,
    clock: AnimationClock,
    elements: Vec<Element>,
    movements: Vec<Movement>,
    overlaps: Vec<OverlapWarning>,
    run: RunState,
    frames: FrameBuffer,
}

impl<R: ShapeRenderer, C: HostClock> Session<R, C> {
    /// Empty session; load a document before starting a run.
    pub fn new(opts: SessionOpts, renderer: R, host: C) -> MotiongramResult<Self> {
        let canvas = Canvas::new(opts.canvas.width, opts.canvas.height)?;
        Ok(Self {
            opts: SessionOpts { canvas, ..opts },
            renderer,
            host,
            clock: AnimationClock::new(opts.duration_ms, opts.tick_interval_ms)?,
            elements: Vec::new(),
            movements: Vec::new(),
            overlaps: Vec::new(),
            run: RunState::default(),
            frames: FrameBuffer::new(),
        })
    }

    /// Replace the diagram. An active run is cancelled first.
    pub fn load(&mut self, doc: Document) {
        if self.clock.state() != ClockState::Idle {
            tracing::info!("loading a document cancels the active run");
            self.clock.stop();
        }
        self.run = RunState::new(doc.movements.len());
        self.elements = doc.elements;
        self.movements = doc.movements;
        self.overlaps = doc.overlaps;
        tracing::debug!(
            elements = self.elements.len(),
            movements = self.movements.len(),
            "document loaded"
        );
    }

    /// Parse `text` and load it. On failure the session is left exactly as it was.
    pub fn load_str(&mut self, text: &str, format: DocumentFormat) -> MotiongramResult<()> {
        let doc = Document::parse(text, format)?;
        self.load(doc);
        Ok(())
    }

    /// Options in effect.
    pub fn opts(&self) -> &SessionOpts {
        &self.opts
    }

    /// Elements at their current positions.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Loaded movements in document order.
    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    /// Overlapping same-axis movements found at load.
    pub fn overlaps(&self) -> &[OverlapWarning] {
        &self.overlaps
    }

    /// Render the elements where they currently are, without capturing a frame.
    pub fn draw(&mut self) -> MotiongramResult<FrameRGBA> {
        self.renderer
            .render(self.opts.canvas, self.opts.background, &self.elements)
    }

    /// Begin a run from the declared start positions, cancelling any run in progress.
    ///
    /// Clears the frame buffer. The returned ticket is due immediately.
    pub fn start(&mut self) -> TickTicket {
        for el in &mut self.elements {
            el.rewind();
        }
        self.run.reset();
        self.frames.clear();
        let ticket = self.clock.start(self.host.now_ms());
        tracing::info!(
            run = ticket.run().get(),
            duration_ms = self.opts.duration_ms,
            tick_interval_ms = self.opts.tick_interval_ms,
            "run started"
        );
        ticket
    }

    /// Cancel the run in progress. Frames captured so far stay in the buffer.
    pub fn stop(&mut self) {
        self.clock.stop();
    }

    /// Handle that cancels runs of this session from another thread.
    pub fn stop_handle(&self) -> StopHandle {
        self.clock.stop_handle()
    }

    /// Clock state.
    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    /// Execute the tick `ticket` stands for: wait for its due time, resolve every element,
    /// render, capture, and schedule the next tick.
    ///
    /// A stale ticket does nothing, and a run cancelled while the frame renders captures nothing.
    /// Any error halts the run; frames captured so far are kept.
    pub fn tick(&mut self, ticket: TickTicket) -> MotiongramResult<TickOutcome> {
        if !self.clock.is_current(&ticket) {
            return Ok(TickOutcome::Cancelled);
        }
        self.host.yield_until(ticket.due_ms());
        if !self.clock.is_current(&ticket) {
            return Ok(TickOutcome::Cancelled);
        }

        let now = self.host.now_ms();
        let elapsed = self.clock.elapsed(now);
        let image = match self.resolve_and_render(elapsed) {
            Ok(image) => image,
            Err(e) => {
                self.clock.stop();
                tracing::warn!(
                    run = ticket.run().get(),
                    elapsed_ms = elapsed,
                    frames = self.frames.len(),
                    error = %e,
                    "run halted"
                );
                return Err(e);
            }
        };
        // Stopped from another thread while this tick was rendering: nothing is captured.
        if !self.clock.is_current(&ticket) {
            return Ok(TickOutcome::Cancelled);
        }
        self.frames.push(CapturedFrame {
            run: ticket.run(),
            elapsed_ms: elapsed,
            image,
        });
        tracing::trace!(run = ticket.run().get(), elapsed_ms = elapsed, "tick");

        Ok(match self.clock.advance(&ticket, now) {
            Some(next) => TickOutcome::Continue(next),
            // Stopped after the capture but before the run reached its duration.
            None if elapsed < self.clock.duration_ms() => TickOutcome::Cancelled,
            None => {
                tracing::info!(
                    run = ticket.run().get(),
                    frames = self.frames.len(),
                    "run finished"
                );
                TickOutcome::Finished {
                    frames: self.frames.len(),
                }
            }
        })
    }

    fn resolve_and_render(&mut self, elapsed: Millis) -> MotiongramResult<FrameRGBA> {
        resolve_all(&mut self.elements, &self.movements, &mut self.run, elapsed)?;
        self.renderer
            .render(self.opts.canvas, self.opts.background, &self.elements)
    }

    /// Keep presenting tickets, starting from `ticket`, until the run finishes or is cancelled.
    pub fn drive(&mut self, mut ticket: TickTicket) -> MotiongramResult<TickOutcome> {
        loop {
            match self.tick(ticket)? {
                TickOutcome::Continue(next) => ticket = next,
                done => return Ok(done),
            }
        }
    }

    /// Start a run and drive it to the end.
    pub fn run_to_completion(&mut self) -> MotiongramResult<TickOutcome> {
        let first = self.start();
        self.drive(first)
    }

    /// Frames of the current or most recent run.
    pub fn frames(&self) -> &FrameBuffer {
        &self.frames
    }

    /// Stream the captured frames into `sink`. The buffer is left untouched.
    pub fn export<S: FrameSink + ?Sized>(&self, sink: &mut S) -> MotiongramResult<()> {
        export_frames(&self.frames, sink)
    }

    /// The host clock.
    pub fn host(&self) -> &C {
        &self.host
    }

    /// The renderer.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/session.rs"]
mod tests;
