use std::io::{self, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{Error, Result};

/// Shared flag raised by [`Destination`] on its first failed write or seek.
#[derive(Clone, Debug, Default)]
pub(crate) struct Tripwire(Arc<AtomicBool>);

impl Tripwire {
    pub(crate) fn tripped(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Refuse further records once the destination has failed.
    pub(crate) fn check(&self, path: &str) -> Result<()> {
        if self.tripped() {
            return Err(Error::Write {
                path: path.to_string(),
                source: io::Error::other("archive destination failed on an earlier record"),
            });
        }
        Ok(())
    }

    fn trip(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Archive destination that remembers its first I/O failure.
///
/// After that failure nothing more reaches the inner writer: writes and seeks
/// succeed against a virtual cursor. Encoders that finalize on drop (the zip
/// writer does) then finish quietly instead of failing a second time.
pub(crate) struct Destination<W> {
    inner: W,
    tripwire: Tripwire,
    position: u64,
    end: u64,
}

impl<W> Destination<W> {
    pub(crate) fn new(inner: W) -> (Self, Tripwire) {
        let tripwire = Tripwire::default();
        let destination = Self {
            inner,
            tripwire: tripwire.clone(),
            position: 0,
            end: 0,
        };
        (destination, tripwire)
    }

    pub(crate) fn into_inner(self) -> W {
        self.inner
    }

    fn advance(&mut self, written: usize) {
        self.position = self.position.saturating_add(written as u64);
        self.end = self.end.max(self.position);
    }

    fn observe<T>(&self, result: io::Result<T>) -> io::Result<T> {
        result.inspect_err(|err| {
            if err.kind() != io::ErrorKind::Interrupted {
                self.tripwire.trip();
            }
        })
    }
}

impl<W: Write> Write for Destination<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.tripwire.tripped() {
            self.advance(buf.len());
            return Ok(buf.len());
        }
        let result = self.inner.write(buf);
        let written = self.observe(result)?;
        self.advance(written);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.tripwire.tripped() {
            return Ok(());
        }
        let result = self.inner.flush();
        self.observe(result)
    }
}

impl<W: Seek> Seek for Destination<W> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let position = if self.tripwire.tripped() {
            let target = match pos {
                SeekFrom::Start(offset) => Some(offset),
                SeekFrom::Current(delta) => self.position.checked_add_signed(delta),
                SeekFrom::End(delta) => self.end.checked_add_signed(delta),
            };
            target.ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "seek before start of archive")
            })?
        } else {
            let result = self.inner.seek(pos);
            self.observe(result)?
        };
        self.position = position;
        self.end = self.end.max(position);
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Accepts `budget` bytes, then fails every call.
    struct Full {
        inner: Cursor<Vec<u8>>,
        budget: usize,
    }

    impl Write for Full {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.len() > self.budget {
                return Err(io::Error::other("disk full"));
            }
            self.budget -= buf.len();
            self.inner.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for Full {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn passes_through_until_failure() {
        let (mut dest, tripwire) = Destination::new(Cursor::new(Vec::new()));
        dest.write_all(b"hello").unwrap();
        assert_eq!(dest.seek(SeekFrom::Current(0)).unwrap(), 5);
        assert!(!tripwire.tripped());
        assert_eq!(dest.into_inner().into_inner(), b"hello");
    }

    #[test]
    fn first_failure_trips_and_later_calls_are_swallowed() {
        let full = Full {
            inner: Cursor::new(Vec::new()),
            budget: 4,
        };
        let (mut dest, tripwire) = Destination::new(full);
        dest.write_all(b"abcd").unwrap();

        let err = dest.write_all(b"efgh").unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert!(tripwire.tripped());
        assert!(tripwire.check("sub/").is_err());

        dest.write_all(b"ijkl").unwrap();
        dest.flush().unwrap();
        assert_eq!(dest.seek(SeekFrom::Start(2)).unwrap(), 2);
        assert_eq!(dest.seek(SeekFrom::End(0)).unwrap(), 8);
        assert!(dest.seek(SeekFrom::Current(-20)).is_err());

        assert_eq!(dest.into_inner().inner.into_inner(), b"abcd");
    }
}
