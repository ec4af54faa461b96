use dutem_frame::CanFrame;

use crate::error::Result;

/// A bus that accepts one frame at a time.
///
/// From the emulator's point of view a send is fire-and-forget: a returned
/// error is logged and counted, never retried. Implementations must not block
/// for long; the emulator calls `send` from its background task.
pub trait FrameSink: Send {
    /// Submit one frame to the bus.
    fn send(&mut self, frame: &CanFrame) -> Result<()>;
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn send(&mut self, frame: &CanFrame) -> Result<()> {
        (**self).send(frame)
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn send(&mut self, frame: &CanFrame) -> Result<()> {
        (**self).send(frame)
    }
}

/// [`FrameSink`] backed by a closure. Built with [`sink_fn`].
pub struct FnSink<F> {
    f: F,
}

impl<F> FrameSink for FnSink<F>
where
    F: FnMut(&CanFrame) -> Result<()> + Send,
{
    fn send(&mut self, frame: &CanFrame) -> Result<()> {
        (self.f)(frame)
    }
}

impl<F> std::fmt::Debug for FnSink<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnSink").finish_non_exhaustive()
    }
}

/// Wrap a closure as a [`FrameSink`].
pub fn sink_fn<F>(f: F) -> FnSink<F>
where
    F: FnMut(&CanFrame) -> Result<()> + Send,
{
    FnSink { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BusError;

    #[test]
    fn closure_sink_sees_every_frame() {
        let mut ids = Vec::new();
        {
            let mut sink = sink_fn(|frame: &CanFrame| {
                ids.push(frame.id);
                Ok(())
            });
            sink.send(&CanFrame::new(1, &[]).unwrap()).unwrap();
            sink.send(&CanFrame::new(2, &[]).unwrap()).unwrap();
        }
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn boxed_sink_forwards_errors() {
        let mut sink: Box<dyn FrameSink> = Box::new(sink_fn(|_: &CanFrame| Err(BusError::Closed)));
        let err = sink.send(&CanFrame::new(1, &[]).unwrap()).unwrap_err();
        assert!(matches!(err, BusError::Closed));
    }
}
