use std::io::{self, ErrorKind, Read, Seek, SeekFrom};

use crate::log_warn;

// End-of-image marker served once when a truncated span runs dry.
const EOI_MARKER: [u8; 2] = [0xFF, 0xD9];

/// Byte source over a borrowed memory span.
///
/// When the span is exhausted the source does not fail: it serves a synthetic
/// end-of-image marker so the entropy decoder of a truncated stream
/// terminates cleanly, then reports end of stream. Seeking past the end of
/// the span is rejected, a stream is never allowed to skip beyond what was
/// buffered. All position state lives on the instance.
pub struct MemSource<'a> {
    data: &'a [u8],
    pos: usize,
    eoi_served: usize,
}

impl<'a> MemSource<'a> {
    pub fn new(data: &'a [u8]) -> MemSource<'a> {
        MemSource {
            data,
            pos: 0,
            eoi_served: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

impl Read for MemSource<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.pos < self.data.len() {
            let count = (self.data.len() - self.pos).min(buf.len());
            buf[..count].copy_from_slice(&self.data[self.pos..self.pos + count]);
            self.pos += count;

            return Ok(count);
        }

        // Span exhausted, serve the synthetic end-of-image marker once.
        if self.eoi_served < EOI_MARKER.len() {
            if self.eoi_served == 0 {
                log_warn!("Input exhausted at {} bytes, serving synthetic EOI marker", self.data.len());
            }

            let count = (EOI_MARKER.len() - self.eoi_served).min(buf.len());
            buf[..count].copy_from_slice(&EOI_MARKER[self.eoi_served..self.eoi_served + count]);
            self.eoi_served += count;

            return Ok(count);
        }

        Ok(0)
    }
}

impl Seek for MemSource<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => offset,
            SeekFrom::End(offset) => {
                let target = self.data.len() as i64 + offset;

                if target < 0 {
                    return Err(io::Error::new(ErrorKind::InvalidInput, "Seek before start of source"));
                }

                target as u64
            }
            SeekFrom::Current(offset) => {
                let target = self.pos as i64 + offset;

                if target < 0 {
                    return Err(io::Error::new(ErrorKind::InvalidInput, "Seek before start of source"));
                }

                target as u64
            }
        };

        // Skipping past the buffered span is a hard error. Truncation is
        // handled on the read side with the synthetic marker instead.
        if target > self.data.len() as u64 {
            return Err(io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("Cannot seek to {} in a {} byte source", target, self.data.len()),
            ));
        }

        self.pos = target as usize;
        self.eoi_served = 0;

        Ok(target)
    }
}
