//! Collaborator interfaces
//!
//! The advisor never talks to hardware directly. Telemetry arrives through
//! [`SentenceSource`] implementations and decisions leave through an
//! [`Actuator`]. Any blocking or timeout policy lives behind these traits.

use crate::types::ActuatorOutputs;
use std::io::{self, BufRead};

/// A producer of raw sentence text (position/velocity sensor, broadcast receiver)
pub trait SentenceSource {
    /// True when a read would return data without blocking
    fn has_data(&mut self) -> bool;

    /// Read the next chunk of sentence text, at most `max_bytes` long
    ///
    /// Blocks until data is available. `Ok(None)` means the source is closed
    /// and will produce nothing further.
    fn read_sentence(&mut self, max_bytes: usize) -> io::Result<Option<String>>;
}

/// Three-line speed actuator (increase / maintain / decrease)
pub trait Actuator {
    fn apply(&mut self, outputs: ActuatorOutputs) -> io::Result<()>;
}

impl<S: SentenceSource + ?Sized> SentenceSource for &mut S {
    fn has_data(&mut self) -> bool {
        (**self).has_data()
    }

    fn read_sentence(&mut self, max_bytes: usize) -> io::Result<Option<String>> {
        (**self).read_sentence(max_bytes)
    }
}

impl<A: Actuator + ?Sized> Actuator for &mut A {
    fn apply(&mut self, outputs: ActuatorOutputs) -> io::Result<()> {
        (**self).apply(outputs)
    }
}

/// A source that never has data, for runs without a broadcast receiver
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSource;

impl SentenceSource for SilentSource {
    fn has_data(&mut self) -> bool {
        false
    }

    fn read_sentence(&mut self, _max_bytes: usize) -> io::Result<Option<String>> {
        Ok(None)
    }
}

/// Replays line-oriented sentence text from any buffered reader
///
/// Every read yields one line (terminator included). A line longer than
/// `max_bytes` is handed out in pieces cut on character boundaries; the rest
/// of the line comes back on the following reads.
pub struct LineReplaySource<R> {
    reader: R,
    peeked: Option<String>,
    exhausted: bool,
    lines_read: usize,
}

impl<R: BufRead> LineReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            peeked: None,
            exhausted: false,
            lines_read: 0,
        }
    }

    /// Number of lines handed out so far
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    fn fill(&mut self) -> io::Result<()> {
        if self.peeked.is_some() || self.exhausted {
            return Ok(());
        }

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            self.exhausted = true;
        } else {
            self.peeked = Some(line);
        }
        Ok(())
    }
}

impl<R: BufRead> SentenceSource for LineReplaySource<R> {
    fn has_data(&mut self) -> bool {
        match self.fill() {
            Ok(()) => self.peeked.is_some(),
            Err(e) => {
                log::warn!("Replay source read failed: {}", e);
                false
            }
        }
    }

    fn read_sentence(&mut self, max_bytes: usize) -> io::Result<Option<String>> {
        self.fill()?;
        let Some(mut line) = self.peeked.take() else {
            return Ok(None);
        };

        if line.len() > max_bytes {
            let mut cut = max_bytes;
            while !line.is_char_boundary(cut) {
                cut -= 1;
            }
            if cut == 0 {
                // Always make progress, even when the first char exceeds the limit
                cut = line.chars().next().map_or(line.len(), char::len_utf8);
            }
            self.peeked = Some(line.split_off(cut));
            return Ok(Some(line));
        }

        self.lines_read += 1;
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_replay_yields_lines_then_closes() {
        let mut source = LineReplaySource::new(Cursor::new("$GPGGA,1\n$GPVTG,2\n"));

        assert!(source.has_data());
        assert_eq!(source.read_sentence(512).unwrap().as_deref(), Some("$GPGGA,1\n"));
        assert_eq!(source.read_sentence(512).unwrap().as_deref(), Some("$GPVTG,2\n"));
        assert!(!source.has_data());
        assert_eq!(source.read_sentence(512).unwrap(), None);
        assert_eq!(source.lines_read(), 2);
    }

    #[test]
    fn test_replay_splits_long_line_across_reads() {
        let mut source = LineReplaySource::new(Cursor::new("$$,1,2,3,4\n$GPVTG\n"));
        assert_eq!(source.read_sentence(5).unwrap().as_deref(), Some("$$,1,"));
        assert!(source.has_data());
        assert_eq!(source.read_sentence(5).unwrap().as_deref(), Some("2,3,4"));
        assert_eq!(source.read_sentence(5).unwrap().as_deref(), Some("\n"));
        assert_eq!(source.read_sentence(512).unwrap().as_deref(), Some("$GPVTG\n"));
        assert_eq!(source.lines_read(), 2);
    }

    #[test]
    fn test_replay_splits_on_char_boundary() {
        let mut source = LineReplaySource::new(Cursor::new("ab\u{e9}cd\n"));
        // 'é' is two bytes starting at offset 2
        assert_eq!(source.read_sentence(3).unwrap().as_deref(), Some("ab"));
        assert_eq!(source.read_sentence(3).unwrap().as_deref(), Some("\u{e9}c"));
        assert_eq!(source.read_sentence(3).unwrap().as_deref(), Some("d\n"));
    }

    #[test]
    fn test_replay_always_makes_progress() {
        let mut source = LineReplaySource::new(Cursor::new("\u{e9}\n"));
        assert_eq!(source.read_sentence(1).unwrap().as_deref(), Some("\u{e9}"));
        assert_eq!(source.read_sentence(1).unwrap().as_deref(), Some("\n"));
    }

    #[test]
    fn test_empty_source() {
        let mut source = LineReplaySource::new(Cursor::new(""));
        assert!(!source.has_data());
        assert_eq!(source.read_sentence(512).unwrap(), None);
    }
}
