//! Guest file objects over random-access resources.
//!
//! A [`Stream`] owns exactly one [`RandomAccessFile`] and layers guest file semantics on it:
//! text or binary units, line reads, buffered writes, `seek`/`tell`/`truncate` and the scoped
//! resource protocol. Reads go through a read-ahead buffer and writes through a write buffer;
//! at most one of the two holds data at any time, and `tell()` accounts for whichever does.
//!
//! Once closed, the read family returns empty data while every other operation raises
//! `ValueError: I/O operation on closed file.`

mod handle;
mod options;

use std::{
    fs::File,
    io::{self, Cursor, Read, Seek, SeekFrom, Write},
    mem,
    path::Path,
};

use tracing::{debug, trace};

pub use self::{
    handle::RandomAccessFile,
    options::{DEFAULT_BUFFER_SIZE, Encoding, OpenMode, SEEK_CUR, SEEK_END, SEEK_SET, StreamOptions, Whence},
};
use crate::{
    exception::{ExcType, RunError, RunResult, SimpleException},
    value::Value,
};

/// A guest file object.
#[derive(Debug)]
pub struct Stream<F: RandomAccessFile = File> {
    /// `None` once closed.
    handle: Option<F>,
    name: String,
    mode: OpenMode,
    options: StreamOptions,
    /// Bytes fetched from the resource but not yet consumed; `read_pos` indexes the next one.
    read_buf: Vec<u8>,
    read_pos: usize,
    /// Bytes accepted by `write` but not yet handed to the resource.
    write_buf: Vec<u8>,
}

fn io_err(name: &str, op: &str, err: &io::Error) -> RunError {
    ExcType::os_error_from_io(err, op, Path::new(name))
}

fn unsupported(what: &str) -> RunError {
    SimpleException::new_msg(ExcType::OSError, what).into()
}

fn is_empty_data(value: &Value) -> bool {
    match value {
        Value::Str(s) => s.is_empty(),
        Value::Bytes(b) => b.is_empty(),
        _ => false,
    }
}

impl<F: RandomAccessFile> Stream<F> {
    /// Wraps an open resource. `name` is reported by `name()` and in error messages.
    pub fn new(handle: F, name: impl Into<String>, mode: OpenMode, options: StreamOptions) -> Self {
        let mut options = options;
        // the public field can bypass the builder's floor
        options.buffer_size = options.buffer_size.max(1);
        Self {
            handle: Some(handle),
            name: name.into(),
            mode,
            options,
            read_buf: Vec::new(),
            read_pos: 0,
            write_buf: Vec::new(),
        }
    }

    #[must_use]
    pub fn closed(&self) -> bool {
        self.handle.is_none()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Text encoding; binary streams have none.
    #[must_use]
    pub fn encoding(&self) -> Option<Encoding> {
        (!self.mode.is_binary()).then_some(self.options.encoding)
    }

    /// Error handling scheme for encoding and decoding. Always strict.
    #[must_use]
    pub fn errors(&self) -> &'static str {
        "strict"
    }

    #[must_use]
    pub fn line_buffering(&self) -> bool {
        self.options.line_buffering
    }

    #[must_use]
    pub fn isatty(&self) -> bool {
        false
    }

    #[must_use]
    pub fn readable(&self) -> bool {
        self.mode.readable()
    }

    #[must_use]
    pub fn writable(&self) -> bool {
        self.mode.writable()
    }

    #[must_use]
    pub fn seekable(&self) -> bool {
        true
    }

    /// Reads up to `size` units (characters in text mode, bytes in binary mode).
    ///
    /// A negative `size` reads to the end. Returns empty data at end of resource and on a
    /// closed stream.
    pub fn read(&mut self, size: i64) -> RunResult<Value> {
        if self.closed() {
            debug!(name = %self.name, op = "read", "read on closed stream returns no data");
            return Ok(self.empty());
        }
        self.check_readable()?;
        let limit = usize::try_from(size).ok();
        let mut raw = Vec::new();
        match limit {
            Some(limit) if !self.mode.is_binary() => {
                let mut units = 0;
                while units < limit && self.read_unit(&mut raw)? {
                    units += 1;
                }
            }
            _ => {
                while limit.is_none_or(|limit| raw.len() < limit) && self.fill()? {
                    let available = &self.read_buf[self.read_pos..];
                    let take = limit.map_or(available.len(), |limit| (limit - raw.len()).min(available.len()));
                    raw.extend_from_slice(&available[..take]);
                    self.read_pos += take;
                }
            }
        }
        trace!(name = %self.name, bytes = raw.len(), "read");
        self.finish(raw)
    }

    /// Reads one line including its `\n` terminator.
    ///
    /// A non-negative `limit` caps the units read, which may truncate the line.
    pub fn readline(&mut self, limit: i64) -> RunResult<Value> {
        if self.closed() {
            debug!(name = %self.name, op = "readline", "read on closed stream returns no data");
            return Ok(self.empty());
        }
        self.check_readable()?;
        let limit = usize::try_from(limit).ok();
        let mut raw = Vec::new();
        let mut units = 0;
        while limit.is_none_or(|limit| units < limit) {
            let start = raw.len();
            if !self.read_unit(&mut raw)? {
                break;
            }
            units += 1;
            if raw[start] == b'\n' {
                break;
            }
        }
        self.finish(raw)
    }

    /// Lazily yields the remaining lines.
    ///
    /// A positive `hint` bounds the number of lines produced.
    pub fn readlines(&mut self, hint: i64) -> Lines<'_, F> {
        Lines {
            stream: self,
            remaining: usize::try_from(hint).ok().filter(|&n| n > 0),
            done: false,
        }
    }

    /// Writes a `str` (text mode) or `bytes` (binary mode) value, returning the units written.
    pub fn write(&mut self, data: &Value) -> RunResult<usize> {
        self.ensure_open()?;
        match (data, self.mode.is_binary()) {
            (Value::Str(s), false) => self.write_str(s),
            (Value::Bytes(b), true) => self.write_bytes(b),
            (other, false) => Err(ExcType::type_error(format!(
                "write() argument must be str, not {}",
                other.type_name()
            ))),
            (other, true) => Err(ExcType::type_error(format!(
                "a bytes-like object is required, not '{}'",
                other.type_name()
            ))),
        }
    }

    /// Encodes and writes text, returning the number of characters written.
    pub fn write_str(&mut self, text: &str) -> RunResult<usize> {
        self.ensure_open()?;
        self.check_writable()?;
        if self.mode.is_binary() {
            return Err(ExcType::type_error("a bytes-like object is required, not 'str'"));
        }
        let encoded = self.options.encoding.encode(text)?;
        let flush_line = self.options.line_buffering && text.contains('\n');
        self.buffer_write(&encoded, flush_line)?;
        Ok(text.chars().count())
    }

    /// Writes raw bytes, returning the number of bytes written.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> RunResult<usize> {
        self.ensure_open()?;
        self.check_writable()?;
        if !self.mode.is_binary() {
            return Err(ExcType::type_error("write() argument must be str, not bytes"));
        }
        self.buffer_write(bytes, false)?;
        Ok(bytes.len())
    }

    /// Moves the logical position and returns it.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> RunResult<u64> {
        let current = self.tell()?;
        self.discard_read_ahead()?;
        let name = &self.name;
        let handle = self.handle.as_mut().ok_or_else(ExcType::value_error_closed_file)?;
        let base = match whence {
            Whence::Set => 0,
            Whence::Cur => i128::from(current),
            Whence::End => i128::from(handle.seek(SeekFrom::End(0)).map_err(|e| io_err(name, "seek", &e))?),
        };
        let target = base + i128::from(offset);
        let Ok(target) = u64::try_from(target) else {
            handle
                .seek(SeekFrom::Start(current))
                .map_err(|e| io_err(name, "seek", &e))?;
            return Err(ExcType::value_error(format!("negative seek position {target}")));
        };
        handle
            .seek(SeekFrom::Start(target))
            .map_err(|e| io_err(name, "seek", &e))?;
        trace!(name = %self.name, position = target, "seek");
        Ok(target)
    }

    /// Absolute logical position, accounting for buffered data.
    pub fn tell(&mut self) -> RunResult<u64> {
        self.ensure_open()?;
        self.flush_writes()?;
        let unread = (self.read_buf.len() - self.read_pos) as u64;
        let name = &self.name;
        let handle = self.handle.as_mut().ok_or_else(ExcType::value_error_closed_file)?;
        let position = handle.stream_position().map_err(|e| io_err(name, "tell", &e))?;
        Ok(position.saturating_sub(unread))
    }

    /// Sets the resource length to `size`, or to the current position when `None`.
    ///
    /// The position does not move. Returns the new length.
    pub fn truncate(&mut self, size: Option<u64>) -> RunResult<u64> {
        let current = self.tell()?;
        self.check_writable()?;
        self.discard_read_ahead()?;
        let size = size.unwrap_or(current);
        let name = &self.name;
        let handle = self.handle.as_mut().ok_or_else(ExcType::value_error_closed_file)?;
        handle.set_len(size).map_err(|e| io_err(name, "truncate", &e))?;
        debug!(name = %self.name, size, "truncated");
        Ok(size)
    }

    /// Hands buffered writes to the resource, then syncs it to durable storage.
    pub fn flush(&mut self) -> RunResult<()> {
        self.ensure_open()?;
        self.flush_writes()?;
        let sync = self.mode.writable();
        let name = &self.name;
        let handle = self.handle.as_mut().ok_or_else(ExcType::value_error_closed_file)?;
        handle.flush().map_err(|e| io_err(name, "flush", &e))?;
        if sync {
            handle.sync().map_err(|e| io_err(name, "flush", &e))?;
        }
        trace!(name = %self.name, "flushed");
        Ok(())
    }

    /// Flushes pending writes and releases the resource.
    ///
    /// Idempotent: closing a closed stream does nothing. The resource is released even when the
    /// final flush fails; the flush error is still returned.
    pub fn close(&mut self) -> RunResult<()> {
        if self.closed() {
            trace!(name = %self.name, "close on closed stream");
            return Ok(());
        }
        let flushed = self.flush_writes();
        self.read_buf.clear();
        self.read_pos = 0;
        self.write_buf.clear();
        self.handle = None;
        debug!(name = %self.name, "stream closed");
        flushed
    }

    /// Guest `__enter__`.
    pub fn enter(&mut self) -> RunResult<&mut Self> {
        self.ensure_open()?;
        Ok(self)
    }

    /// Guest `__exit__`: closes the stream.
    pub fn exit(&mut self) -> RunResult<()> {
        self.close()
    }

    /// Runs `body` with the stream and closes it on every exit path.
    ///
    /// An error from `body` takes precedence over an error from closing.
    pub fn scoped<T>(mut self, body: impl FnOnce(&mut Self) -> RunResult<T>) -> RunResult<T> {
        let result = body(&mut self);
        let closed = self.close();
        let value = result?;
        closed?;
        Ok(value)
    }

    /// Flushes pending writes and returns the resource, leaving the stream closed.
    pub fn into_inner(mut self) -> RunResult<Option<F>> {
        self.flush_writes()?;
        self.discard_read_ahead()?;
        Ok(self.handle.take())
    }

    /// Erases the resource type, carrying buffered state over unchanged.
    pub fn boxed(mut self) -> Stream<Box<dyn RandomAccessFile>>
    where
        F: 'static,
    {
        Stream {
            handle: self.handle.take().map(|handle| Box::new(handle) as Box<dyn RandomAccessFile>),
            name: mem::take(&mut self.name),
            mode: self.mode,
            options: self.options,
            read_buf: mem::take(&mut self.read_buf),
            read_pos: mem::replace(&mut self.read_pos, 0),
            write_buf: mem::take(&mut self.write_buf),
        }
    }

    /// Guest class name: `TextIOWrapper` for text, a `Buffered*` class for binary.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        if !self.mode.is_binary() {
            "TextIOWrapper"
        } else if self.mode.readable() && self.mode.writable() {
            "BufferedRandom"
        } else if self.mode.writable() {
            "BufferedWriter"
        } else {
            "BufferedReader"
        }
    }

    /// Guest `repr()`, e.g. `<_io.TextIOWrapper name='out.txt' mode='w' encoding='utf-8'>`.
    #[must_use]
    pub fn repr(&self) -> String {
        match self.encoding() {
            Some(encoding) => format!(
                "<_io.{} name='{}' mode='{}' encoding='{encoding}'>",
                self.type_name(),
                self.name,
                self.mode
            ),
            None => format!("<_io.{} name='{}'>", self.type_name(), self.name),
        }
    }

    fn ensure_open(&self) -> RunResult<()> {
        if self.closed() {
            Err(ExcType::value_error_closed_file())
        } else {
            Ok(())
        }
    }

    fn check_readable(&self) -> RunResult<()> {
        if self.mode.readable() { Ok(()) } else { Err(unsupported("not readable")) }
    }

    fn check_writable(&self) -> RunResult<()> {
        if self.mode.writable() { Ok(()) } else { Err(unsupported("not writable")) }
    }

    fn empty(&self) -> Value {
        if self.mode.is_binary() {
            Value::Bytes(Vec::new())
        } else {
            Value::Str(String::new())
        }
    }

    fn finish(&self, raw: Vec<u8>) -> RunResult<Value> {
        if self.mode.is_binary() {
            Ok(Value::Bytes(raw))
        } else {
            self.options.encoding.decode(&raw).map(Value::Str)
        }
    }

    fn buffer_write(&mut self, bytes: &[u8], flush_line: bool) -> RunResult<()> {
        self.discard_read_ahead()?;
        self.write_buf.extend_from_slice(bytes);
        trace!(name = %self.name, bytes = bytes.len(), pending = self.write_buf.len(), "buffered write");
        if flush_line || self.write_buf.len() >= self.options.buffer_size {
            self.flush_writes()?;
        }
        Ok(())
    }

    /// Hands the write buffer to the resource. In append mode every write lands at the end.
    fn flush_writes(&mut self) -> RunResult<()> {
        if self.write_buf.is_empty() {
            return Ok(());
        }
        let name = &self.name;
        let handle = self.handle.as_mut().ok_or_else(ExcType::value_error_closed_file)?;
        if self.mode.is_append() {
            handle.seek(SeekFrom::End(0)).map_err(|e| io_err(name, "write", &e))?;
        }
        handle.write_all(&self.write_buf).map_err(|e| io_err(name, "write", &e))?;
        self.write_buf.clear();
        Ok(())
    }

    /// Rewinds the resource over unconsumed read-ahead so its position equals the logical one.
    fn discard_read_ahead(&mut self) -> RunResult<()> {
        let unread = self.read_buf.len() - self.read_pos;
        self.read_buf.clear();
        self.read_pos = 0;
        if unread == 0 {
            return Ok(());
        }
        let offset = i64::try_from(unread).map_err(|_| RunError::Internal("read buffer exceeds i64".into()))?;
        let name = &self.name;
        let handle = self.handle.as_mut().ok_or_else(ExcType::value_error_closed_file)?;
        handle
            .seek(SeekFrom::Current(-offset))
            .map_err(|e| io_err(name, "seek", &e))?;
        Ok(())
    }

    /// Makes sure at least one unread byte is buffered. Returns false at end of resource.
    fn fill(&mut self) -> RunResult<bool> {
        if self.read_pos < self.read_buf.len() {
            return Ok(true);
        }
        self.flush_writes()?;
        let name = &self.name;
        let handle = self.handle.as_mut().ok_or_else(ExcType::value_error_closed_file)?;
        self.read_buf.resize(self.options.buffer_size, 0);
        self.read_pos = 0;
        let read = loop {
            match handle.read(&mut self.read_buf) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                other => break other,
            }
        };
        match read {
            Ok(n) => {
                self.read_buf.truncate(n);
                Ok(n > 0)
            }
            Err(err) => {
                self.read_buf.clear();
                Err(io_err(name, "read", &err))
            }
        }
    }

    fn next_byte(&mut self) -> RunResult<Option<u8>> {
        if !self.fill()? {
            return Ok(None);
        }
        let byte = self.read_buf[self.read_pos];
        self.read_pos += 1;
        Ok(Some(byte))
    }

    /// Appends one unit (a byte, or one encoded character in text mode) to `out`.
    fn read_unit(&mut self, out: &mut Vec<u8>) -> RunResult<bool> {
        let Some(lead) = self.next_byte()? else {
            return Ok(false);
        };
        out.push(lead);
        let width = if self.mode.is_binary() {
            1
        } else {
            self.options.encoding.char_width(lead)
        };
        for _ in 1..width {
            match self.next_byte()? {
                Some(byte) => out.push(byte),
                None => break,
            }
        }
        Ok(true)
    }
}

impl Stream<Cursor<Vec<u8>>> {
    /// A stream over an in-memory buffer holding `data`, positioned at its start.
    #[must_use]
    pub fn in_memory(data: Vec<u8>, mode: OpenMode, options: StreamOptions) -> Self {
        Self::new(Cursor::new(data), "<memory>", mode, options)
    }
}

impl<F: RandomAccessFile> Drop for Stream<F> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            debug!(name = %self.name, %err, "close on drop failed");
        }
    }
}

/// Lazy, single-pass line iterator returned by [`Stream::readlines`].
pub struct Lines<'a, F: RandomAccessFile> {
    stream: &'a mut Stream<F>,
    remaining: Option<usize>,
    done: bool,
}

impl<F: RandomAccessFile> Iterator for Lines<'_, F> {
    type Item = RunResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.remaining == Some(0) {
            return None;
        }
        match self.stream.readline(-1) {
            Ok(line) if is_empty_data(&line) => {
                self.done = true;
                None
            }
            Ok(line) => {
                if let Some(remaining) = &mut self.remaining {
                    *remaining -= 1;
                }
                Some(Ok(line))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
