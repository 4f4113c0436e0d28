/// Tests for guest file objects over in-memory and on-disk resources.
use std::fs;

use pretty_assertions::assert_eq;
use pylib::{Encoding, ExcType, FsContext, OpenMode, Stream, StreamOptions, Value, Whence};

fn mode(s: &str) -> OpenMode {
    OpenMode::parse(s).unwrap()
}

fn memory(data: &[u8], m: &str) -> Stream<std::io::Cursor<Vec<u8>>> {
    Stream::in_memory(data.to_vec(), mode(m), StreamOptions::default())
}

/// Collects every line produced by `readlines`.
fn lines<F: pylib::RandomAccessFile>(stream: &mut Stream<F>, hint: i64) -> Vec<Value> {
    stream.readlines(hint).collect::<Result<Vec<_>, _>>().unwrap()
}

/// Write, flush, seek to the start, read: the bytes come back unchanged.
#[test]
fn write_flush_seek_read_round_trip() {
    let mut stream = memory(b"", "wb+");
    let payload = b"\x00binary\xffdata\n".to_vec();
    assert_eq!(stream.write(&Value::bytes(payload.clone())).unwrap(), payload.len());
    stream.flush().unwrap();
    assert_eq!(stream.seek(0, Whence::Set).unwrap(), 0);
    assert_eq!(stream.read(-1).unwrap(), Value::bytes(payload));
}

/// The same round trip through a real file opened by the filesystem context.
#[test]
fn file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let fs_ctx = FsContext::new(dir.path());
    let mut stream = fs_ctx.open("notes.txt", "w+", StreamOptions::default()).unwrap();
    stream.write(&Value::str("première ligne\n")).unwrap();
    stream.flush().unwrap();
    stream.seek(0, Whence::Set).unwrap();
    assert_eq!(stream.read(-1).unwrap(), Value::str("première ligne\n"));
    stream.close().unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("notes.txt")).unwrap(), "première ligne\n");
}

/// Text reads count characters, binary reads count bytes.
#[test]
fn read_counts_units() {
    let mut text = memory("héllo".as_bytes(), "r");
    assert_eq!(text.read(2).unwrap(), Value::str("hé"));
    assert_eq!(text.read(0).unwrap(), Value::str(""));
    assert_eq!(text.read(100).unwrap(), Value::str("llo"));
    assert_eq!(text.read(1).unwrap(), Value::str(""));

    let mut binary = memory("héllo".as_bytes(), "rb");
    assert_eq!(binary.read(2).unwrap(), Value::bytes(b"h\xc3".to_vec()));
}

/// readline keeps the terminator and honors a limit.
#[test]
fn readline_with_limit() {
    let mut stream = memory(b"first line\nsecond\n", "r");
    assert_eq!(stream.readline(5).unwrap(), Value::str("first"));
    assert_eq!(stream.readline(-1).unwrap(), Value::str(" line\n"));
    assert_eq!(stream.readline(-1).unwrap(), Value::str("second\n"));
    assert_eq!(stream.readline(-1).unwrap(), Value::str(""));
}

/// readlines is finite, and a positive hint bounds the number of lines.
#[test]
fn readlines_hint_bounds_lines() {
    let mut stream = memory(b"a\nb\nc", "r");
    assert_eq!(lines(&mut stream, 2), vec![Value::str("a\n"), Value::str("b\n")]);
    assert_eq!(lines(&mut stream, -1), vec![Value::str("c")]);
    assert!(lines(&mut stream, -1).is_empty());
}

/// tell accounts for read-ahead and pending writes.
#[test]
fn tell_tracks_logical_position() {
    let mut stream = memory(b"hello\nworld", "r");
    stream.readline(-1).unwrap();
    assert_eq!(stream.tell().unwrap(), 6);

    let mut writer = memory(b"", "w");
    writer.write(&Value::str("abc")).unwrap();
    assert_eq!(writer.tell().unwrap(), 3);
}

/// Writing after a partial read lands at the logical position.
#[test]
fn write_after_read_overwrites_in_place() {
    let mut stream = memory(b"abcdef", "r+");
    assert_eq!(stream.read(2).unwrap(), Value::str("ab"));
    stream.write(&Value::str("XY")).unwrap();
    let data = stream.into_inner().unwrap().unwrap().into_inner();
    assert_eq!(data, b"abXYef".to_vec());
}

/// seek supports all three reference points; a negative result fails and keeps the position.
#[test]
fn seek_whence_and_negative_target() {
    let mut stream = memory(b"0123456789", "rb");
    assert_eq!(stream.seek(4, Whence::Set).unwrap(), 4);
    assert_eq!(stream.seek(2, Whence::Cur).unwrap(), 6);
    assert_eq!(stream.seek(-3, Whence::End).unwrap(), 7);
    assert_eq!(stream.read(1).unwrap(), Value::bytes(b"7".to_vec()));

    let err = stream.seek(-100, Whence::Cur).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::ValueError);
    assert_eq!(stream.tell().unwrap(), 8);
}

/// Unknown whence values are rejected.
#[test]
fn whence_from_int() {
    assert_eq!(Whence::try_from(pylib::SEEK_END).unwrap(), Whence::End);
    let err = Whence::try_from(3_i64).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::ValueError);
}

/// truncate shortens to the given size without moving the position.
#[test]
fn truncate_keeps_position() {
    let mut stream = memory(b"0123456789", "rb+");
    stream.seek(8, Whence::Set).unwrap();
    assert_eq!(stream.truncate(Some(4)).unwrap(), 4);
    assert_eq!(stream.tell().unwrap(), 8);
    stream.seek(0, Whence::Set).unwrap();
    assert_eq!(stream.read(-1).unwrap(), Value::bytes(b"0123".to_vec()));
}

/// truncate without a size cuts at the current position.
#[test]
fn truncate_at_position() {
    let mut stream = memory(b"0123456789", "rb+");
    stream.read(3).unwrap();
    assert_eq!(stream.truncate(None).unwrap(), 3);
    let data = stream.into_inner().unwrap().unwrap().into_inner();
    assert_eq!(data, b"012".to_vec());
}

/// Closing twice is fine; reads after close return no data; everything else raises.
#[test]
fn closed_stream_policy() {
    let mut stream = memory(b"data", "r+");
    stream.close().unwrap();
    stream.close().unwrap();
    assert!(stream.closed());

    assert_eq!(stream.read(-1).unwrap(), Value::str(""));
    assert_eq!(stream.readline(-1).unwrap(), Value::str(""));
    assert!(lines(&mut stream, -1).is_empty());

    for err in [
        stream.write(&Value::str("x")).unwrap_err(),
        stream.seek(0, Whence::Set).unwrap_err(),
        stream.tell().unwrap_err(),
        stream.truncate(None).unwrap_err(),
        stream.flush().unwrap_err(),
    ] {
        assert_eq!(err.exc_type(), ExcType::ValueError);
        assert_eq!(err.message(), Some("I/O operation on closed file."));
    }
}

/// Closing flushes pending writes first.
#[test]
fn close_flushes_pending_writes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.bin");
    let fs_ctx = FsContext::new(dir.path());
    let mut stream = fs_ctx.open(&path, "wb", StreamOptions::default()).unwrap();
    stream.write(&Value::bytes(b"pending".to_vec())).unwrap();
    assert_eq!(fs::read(&path).unwrap(), Vec::<u8>::new());
    stream.close().unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"pending".to_vec());
}

/// Scoped use closes the stream on every exit path, including errors.
#[test]
fn scoped_closes_on_error() {
    let dir = tempfile::tempdir().unwrap();
    let fs_ctx = FsContext::new(dir.path());
    let stream = fs_ctx.open("log.txt", "w", StreamOptions::default()).unwrap();
    let err = stream
        .scoped(|s| {
            s.write(&Value::str("kept\n"))?;
            s.write(&Value::bytes(b"wrong type".to_vec()))
        })
        .unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
    assert_eq!(fs::read_to_string(dir.path().join("log.txt")).unwrap(), "kept\n");
}

/// enter/exit mirror the guest context manager protocol.
#[test]
fn enter_exit_protocol() {
    let mut stream = memory(b"abc", "r");
    let inner = stream.enter().unwrap();
    assert_eq!(inner.read(1).unwrap(), Value::str("a"));
    stream.exit().unwrap();
    assert!(stream.closed());
    assert!(stream.enter().is_err());
}

/// Type mismatches between the data and the stream mode raise TypeError.
#[test]
fn write_type_mismatch() {
    let mut text = memory(b"", "w");
    let err = text.write(&Value::bytes(b"x".to_vec())).unwrap_err();
    assert_eq!(err.message(), Some("write() argument must be str, not bytes"));

    let mut binary = memory(b"", "wb");
    let err = binary.write(&Value::str("x")).unwrap_err();
    assert_eq!(err.message(), Some("a bytes-like object is required, not 'str'"));
}

/// Reading a write-only stream or writing a read-only one raises OSError.
#[test]
fn mode_violations() {
    let mut read_only = memory(b"abc", "r");
    let err = read_only.write(&Value::str("x")).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::OSError);
    assert_eq!(err.message(), Some("not writable"));

    let mut write_only = memory(b"", "w");
    let err = write_only.read(-1).unwrap_err();
    assert_eq!(err.message(), Some("not readable"));
}

/// Append mode writes at the end regardless of the position.
#[test]
fn append_mode_writes_at_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("append.txt");
    fs::write(&path, "start\n").unwrap();
    let fs_ctx = FsContext::new(dir.path());

    let mut stream = fs_ctx.open("append.txt", "a+", StreamOptions::default()).unwrap();
    stream.seek(0, Whence::Set).unwrap();
    assert_eq!(stream.readline(-1).unwrap(), Value::str("start\n"));
    stream.seek(0, Whence::Set).unwrap();
    stream.write(&Value::str("end\n")).unwrap();
    stream.close().unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "start\nend\n");
}

/// Line buffering flushes as soon as a newline is written.
#[test]
fn line_buffering_flushes_on_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lines.txt");
    let fs_ctx = FsContext::new(dir.path());
    let options = StreamOptions::default().line_buffering(true);
    let mut stream = fs_ctx.open(&path, "w", options).unwrap();
    assert!(stream.line_buffering());

    stream.write(&Value::str("partial")).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    stream.write(&Value::str(" line\n")).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "partial line\n");
}

/// A small buffer spills writes to the resource once full.
#[test]
fn small_buffer_spills() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spill.bin");
    let fs_ctx = FsContext::new(dir.path());
    let mut stream = fs_ctx
        .open(&path, "wb", StreamOptions::default().buffer_size(4))
        .unwrap();
    stream.write(&Value::bytes(b"abcdef".to_vec())).unwrap();
    assert_eq!(fs::read(&path).unwrap(), b"abcdef".to_vec());
}

/// A zero buffer size set through the public field still buffers one byte at a time.
#[test]
fn zero_buffer_size_is_clamped() {
    let mut options = StreamOptions::default();
    options.buffer_size = 0;
    let mut stream = Stream::in_memory(Vec::new(), mode("w+"), options);
    stream.write(&Value::str("abc")).unwrap();
    stream.seek(0, Whence::Set).unwrap();
    assert_eq!(stream.read(2).unwrap(), Value::str("ab"));
    assert_eq!(stream.read(-1).unwrap(), Value::str("c"));
}

/// Wrapping a stream as a guest value keeps its buffered state and reports a file type.
#[test]
fn stream_as_guest_value() {
    let mut stream = memory(b"", "w+");
    stream.write(&Value::str("kept")).unwrap();
    let value = Value::from(stream);
    assert_eq!(value.type_name(), "TextIOWrapper");
    assert_eq!(value.py_repr(), "<_io.TextIOWrapper name='<memory>' mode='w+' encoding='utf-8'>");
    assert!(value.py_bool().unwrap());
    assert_eq!(value, value.clone());

    let Value::File(file) = &value else { panic!("expected a file value") };
    let mut stream = file.borrow_mut();
    stream.seek(0, Whence::Set).unwrap();
    assert_eq!(stream.read(-1).unwrap(), Value::str("kept"));

    assert_eq!(Value::from(memory(b"", "rb")).type_name(), "BufferedReader");
    assert_eq!(Value::from(memory(b"", "wb")).py_repr(), "<_io.BufferedWriter name='<memory>'>");
}

/// Latin-1 and ASCII encode strictly; invalid UTF-8 fails to decode.
#[test]
fn encodings() {
    let latin1 = StreamOptions::default().encoding(Encoding::lookup("Latin_1").unwrap());
    let mut stream = Stream::in_memory(Vec::new(), mode("w+"), latin1);
    assert_eq!(stream.encoding(), Some(Encoding::Latin1));
    stream.write(&Value::str("é")).unwrap();
    stream.seek(0, Whence::Set).unwrap();
    assert_eq!(stream.read(-1).unwrap(), Value::str("é"));
    assert_eq!(stream.into_inner().unwrap().unwrap().into_inner(), vec![0xe9]);

    let ascii = StreamOptions::default().encoding(Encoding::Ascii);
    let mut stream = Stream::in_memory(Vec::new(), mode("w"), ascii);
    let err = stream.write(&Value::str("é")).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::UnicodeEncodeError);
    assert!(err.matches(ExcType::ValueError));

    let mut broken = memory(b"ok\xff", "r");
    let err = broken.read(-1).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::UnicodeDecodeError);

    let err = Encoding::lookup("klingon").unwrap_err();
    assert_eq!(err.exc_type(), ExcType::LookupError);
}

/// Stream metadata mirrors the guest file object attributes.
#[test]
fn stream_metadata() {
    let stream = memory(b"", "rb+");
    assert_eq!(stream.name(), "<memory>");
    assert_eq!(stream.mode().to_string(), "rb+");
    assert_eq!(stream.encoding(), None);
    assert_eq!(stream.errors(), "strict");
    assert!(stream.readable() && stream.writable() && stream.seekable());
    assert!(!stream.isatty());
}

/// Guest mode strings parse strictly.
#[test]
fn open_mode_parsing() {
    assert!(mode("r").readable() && !mode("r").writable());
    assert!(mode("x").writable() && !mode("x").readable());
    assert!(mode("ab").is_append() && mode("ab").is_binary());
    assert_eq!(mode("b+r").to_string(), "rb+");
    for bad in ["", "rw", "rr", "q", "rbt", "r++"] {
        let err = OpenMode::parse(bad).unwrap_err();
        assert_eq!(err.exc_type(), ExcType::ValueError, "mode {bad:?}");
    }
}
