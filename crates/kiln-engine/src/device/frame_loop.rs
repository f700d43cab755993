/// Control directive returned by a frame-loop body.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopControl {
    Continue,
    Stop,
}

/// Explicit, cancellable frame-production loop.
///
/// The render path repeats encode→submit every refresh tick with no
/// termination condition of its own; `FrameLoop` makes that an ordinary
/// iteration construct instead of a self-scheduling callback. Termination
/// comes from the body ([`LoopControl::Stop`]), from an error, or from an
/// external [`stop`](FrameLoop::stop) request between steps.
///
/// The loop is restartable: after stopping, `run` or `step` may be called
/// again and the frame counter keeps advancing monotonically.
#[derive(Debug, Default)]
pub struct FrameLoop {
    frame_index: u64,
    stop_requested: bool,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation; the next `step` or `run` iteration returns
    /// without invoking the body.
    pub fn stop(&mut self) {
        self.stop_requested = true;
    }

    /// Total frames produced so far, across runs.
    pub fn frames_produced(&self) -> u64 {
        self.frame_index
    }

    /// Drives one frame. Returns the body's directive, or `Stop` without
    /// invoking the body if cancellation was requested.
    ///
    /// Suits hosts that own the tick (e.g. a window event loop driving
    /// redraws).
    pub fn step<E>(
        &mut self,
        mut body: impl FnMut(u64) -> Result<LoopControl, E>,
    ) -> Result<LoopControl, E> {
        if self.stop_requested {
            self.stop_requested = false;
            return Ok(LoopControl::Stop);
        }

        let control = body(self.frame_index)?;
        self.frame_index += 1;
        Ok(control)
    }

    /// Drives frames until the body returns [`LoopControl::Stop`], the
    /// body fails, or cancellation is requested.
    pub fn run<E>(
        &mut self,
        mut body: impl FnMut(u64) -> Result<LoopControl, E>,
    ) -> Result<(), E> {
        loop {
            match self.step(&mut body)? {
                LoopControl::Continue => {}
                LoopControl::Stop => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_stops_when_body_says_stop() {
        let mut frames = FrameLoop::new();
        let mut produced = 0u64;

        frames
            .run(|_| {
                produced += 1;
                if produced == 1000 {
                    Ok::<_, ()>(LoopControl::Stop)
                } else {
                    Ok(LoopControl::Continue)
                }
            })
            .unwrap();

        assert_eq!(produced, 1000);
        assert_eq!(frames.frames_produced(), 1000);
    }

    #[test]
    fn loop_is_restartable_after_stop() {
        let mut frames = FrameLoop::new();

        frames
            .run(|i| Ok::<_, ()>(if i < 9 { LoopControl::Continue } else { LoopControl::Stop }))
            .unwrap();
        assert_eq!(frames.frames_produced(), 10);

        // Second run continues the monotonic frame counter.
        frames
            .run(|i| Ok::<_, ()>(if i < 14 { LoopControl::Continue } else { LoopControl::Stop }))
            .unwrap();
        assert_eq!(frames.frames_produced(), 15);
    }

    #[test]
    fn external_stop_skips_the_body() {
        let mut frames = FrameLoop::new();
        frames.stop();

        let control = frames
            .step(|_| -> Result<LoopControl, ()> {
                panic!("body must not run after stop()");
            })
            .unwrap();

        assert_eq!(control, LoopControl::Stop);
        assert_eq!(frames.frames_produced(), 0);

        // Cancellation is consumed; stepping again runs the body.
        let control = frames.step(|_| Ok::<_, ()>(LoopControl::Continue)).unwrap();
        assert_eq!(control, LoopControl::Continue);
        assert_eq!(frames.frames_produced(), 1);
    }

    #[test]
    fn body_error_propagates() {
        let mut frames = FrameLoop::new();
        let err = frames.run(|_| Err::<LoopControl, _>("lost surface")).unwrap_err();
        assert_eq!(err, "lost surface");
    }
}
