//! The 32 KiB LZ77 sliding window / back-reference engine.

use crate::error::{Error, Result};

/// DEFLATE caps back-reference distances at 32 KiB (RFC 1951 §3.2.5).
const WINDOW_SIZE: usize = 32 * 1024;

/// A circular history buffer used to resolve length/distance back-references.
///
/// `copy_out` appends one byte at a time and immediately makes it available
/// as a source for the *next* byte of the same copy. This is required, not
/// an optimization detail: a back-reference with `distance < length` (e.g.
/// distance 1, length 20) is a run-length encoding of a single repeated
/// byte, and a bulk `memcpy` of the source range before any bytes are
/// written would read stale data instead of the bytes the copy itself just
/// produced.
pub struct SlidingWindow {
    buffer: Vec<u8>,
    /// Index the next appended byte will occupy.
    pos: usize,
    /// Number of valid bytes currently held, capped at `WINDOW_SIZE`.
    filled: usize,
}

impl SlidingWindow {
    pub fn new() -> Self {
        Self {
            buffer: vec![0u8; WINDOW_SIZE],
            pos: 0,
            filled: 0,
        }
    }

    /// Appends a single decoded byte to the history (used for literals).
    pub fn append(&mut self, byte: u8) {
        self.buffer[self.pos] = byte;
        self.pos = (self.pos + 1) % WINDOW_SIZE;
        if self.filled < WINDOW_SIZE {
            self.filled += 1;
        }
    }

    /// Replays `length` bytes starting `distance` bytes behind the current
    /// write position, writing each byte to `out` and feeding it back into
    /// the window as it goes.
    pub fn copy_out<W: std::io::Write>(
        &mut self,
        distance: usize,
        length: usize,
        out: &mut W,
    ) -> Result<()> {
        if distance == 0 || distance > self.filled {
            return Err(Error::InvalidDistance { distance, window_len: self.filled });
        }
        for _ in 0..length {
            let src_pos = (self.pos + WINDOW_SIZE - distance) % WINDOW_SIZE;
            let byte = self.buffer[src_pos];
            self.append(byte);
            out.write_all(&[byte])?;
        }
        Ok(())
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SlidingWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindow")
            .field("pos", &self.pos)
            .field("filled", &self.filled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_out_matches_plain_append_for_non_overlapping_copy() {
        let mut w = SlidingWindow::new();
        for b in b"abcdef" {
            w.append(*b);
        }
        let mut out = Vec::new();
        // distance 6 covers the whole history, length 3 < distance: no overlap.
        w.copy_out(6, 3, &mut out).unwrap();
        assert_eq!(out, b"abc");
    }

    #[test]
    fn copy_out_handles_self_referential_run_length_case() {
        let mut w = SlidingWindow::new();
        w.append(b'x');
        let mut out = Vec::new();
        // distance 1, length 5: classic RLE back-reference, repeats the last byte.
        w.copy_out(1, 5, &mut out).unwrap();
        assert_eq!(out, b"xxxxx");
    }

    #[test]
    fn copy_out_rejects_distance_beyond_history() {
        let mut w = SlidingWindow::new();
        w.append(b'a');
        let mut out = Vec::new();
        assert!(matches!(
            w.copy_out(2, 1, &mut out),
            Err(Error::InvalidDistance { distance: 2, window_len: 1 })
        ));
    }

    #[test]
    fn copy_out_rejects_zero_distance() {
        let mut w = SlidingWindow::new();
        w.append(b'a');
        let mut out = Vec::new();
        assert!(matches!(w.copy_out(0, 1, &mut out), Err(Error::InvalidDistance { .. })));
    }
}
