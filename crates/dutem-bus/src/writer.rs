use std::fmt::Write as _;
use std::io::{ErrorKind, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use dutem_frame::CanFrame;

use crate::error::{BusError, Result};
use crate::traits::FrameSink;

const INITIAL_LINE_CAPACITY: usize = 64;

/// Configuration for [`LineWriter`].
#[derive(Debug, Clone, Default)]
pub struct LineWriterConfig {
    /// Interface name written before each frame (e.g. `can0`).
    pub interface: Option<String>,
    /// Prefix each line with a `(seconds.micros)` wall-clock timestamp,
    /// matching `candump -L` log files.
    pub timestamps: bool,
}

/// Writes one text line per frame to any `Write` stream.
///
/// Line format: `[(timestamp) ][interface ]ID#DATA`, e.g.
/// `(1697500000.123456) can0 0CF60665#C409000000001E00`.
pub struct LineWriter<T> {
    inner: T,
    line: String,
    config: LineWriterConfig,
}

impl<T: Write> LineWriter<T> {
    /// Create a new line writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineWriterConfig::default())
    }

    /// Create a new line writer with explicit configuration.
    pub fn with_config(inner: T, config: LineWriterConfig) -> Self {
        Self {
            inner,
            line: String::with_capacity(INITIAL_LINE_CAPACITY),
            config,
        }
    }

    /// Format and write one frame, then flush.
    pub fn write_frame(&mut self, frame: &CanFrame) -> Result<()> {
        self.line.clear();
        if self.config.timestamps {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            let _ = write!(self.line, "({}.{:06}) ", now.as_secs(), now.subsec_micros());
        }
        if let Some(interface) = &self.config.interface {
            self.line.push_str(interface);
            self.line.push(' ');
        }
        let _ = writeln!(self.line, "{frame}");

        let bytes = self.line.as_bytes();
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => {
                    tracing::debug!(id = frame.id, "frame sink closed mid-line");
                    return Err(BusError::Closed);
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(BusError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(BusError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &LineWriterConfig {
        &self.config
    }
}

impl<T: Write + Send> FrameSink for LineWriter<T> {
    fn send(&mut self, frame: &CanFrame) -> Result<()> {
        self.write_frame(frame)
    }
}

impl<T> std::fmt::Debug for LineWriter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineWriter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use dutem_frame::{encode_reading, SensorReading};

    use super::*;

    fn sample_frame() -> CanFrame {
        encode_reading(0x0CF6_0665, &SensorReading::new(0.25, -10))
    }

    fn written(writer: LineWriter<Cursor<Vec<u8>>>) -> String {
        String::from_utf8(writer.into_inner().into_inner()).unwrap()
    }

    #[test]
    fn writes_bare_frame_line() {
        let mut writer = LineWriter::new(Cursor::new(Vec::new()));
        writer.write_frame(&sample_frame()).unwrap();
        assert_eq!(written(writer), "0CF60665#C409000000001E00\n");
    }

    #[test]
    fn prefixes_interface_name() {
        let config = LineWriterConfig {
            interface: Some("vcan0".to_string()),
            ..LineWriterConfig::default()
        };
        let mut writer = LineWriter::with_config(Cursor::new(Vec::new()), config);
        writer.send(&sample_frame()).unwrap();
        writer.send(&sample_frame()).unwrap();
        assert_eq!(
            written(writer),
            "vcan0 0CF60665#C409000000001E00\nvcan0 0CF60665#C409000000001E00\n"
        );
    }

    #[test]
    fn timestamped_lines_follow_candump_log_shape() {
        let config = LineWriterConfig {
            interface: Some("can0".to_string()),
            timestamps: true,
        };
        let mut writer = LineWriter::with_config(Cursor::new(Vec::new()), config);
        writer.write_frame(&sample_frame()).unwrap();

        let line = written(writer);
        assert!(line.starts_with('('));
        let (stamp, rest) = line.split_once(") ").unwrap();
        let (secs, micros) = stamp.trim_start_matches('(').split_once('.').unwrap();
        assert!(secs.parse::<u64>().is_ok());
        assert_eq!(micros.len(), 6);
        assert_eq!(rest, "can0 0CF60665#C409000000001E00\n");
    }

    #[test]
    fn zero_length_write_reports_closed() {
        struct ClosedWriter;
        impl Write for ClosedWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Ok(0)
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = LineWriter::new(ClosedWriter);
        let err = writer.write_frame(&sample_frame()).unwrap_err();
        assert!(matches!(err, BusError::Closed));
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = LineWriter::new(sink);

        writer.write_frame(&sample_frame()).unwrap();
        assert!(flag.load(Ordering::SeqCst));
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        data: Vec<u8>,
        flushed: Arc<AtomicBool>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }
}
