use std::{fmt, fs::OpenOptions};

use serde::{Deserialize, Serialize};
use strum::{Display, IntoStaticStr};

use crate::exception::{ExcType, RunError, RunResult, SimpleException};

pub const SEEK_SET: i64 = 0;
pub const SEEK_CUR: i64 = 1;
pub const SEEK_END: i64 = 2;

/// Default size of the read-ahead and write buffers. Matches CPython's `io.DEFAULT_BUFFER_SIZE`.
pub const DEFAULT_BUFFER_SIZE: usize = 131_072;

/// Reference point for [`Stream::seek`](super::Stream::seek).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Whence {
    /// Absolute position (`SEEK_SET`).
    Set,
    /// Relative to the current position (`SEEK_CUR`).
    Cur,
    /// Relative to the end of the resource (`SEEK_END`).
    End,
}

impl TryFrom<i64> for Whence {
    type Error = RunError;

    fn try_from(whence: i64) -> RunResult<Self> {
        match whence {
            SEEK_SET => Ok(Self::Set),
            SEEK_CUR => Ok(Self::Cur),
            SEEK_END => Ok(Self::End),
            other => Err(ExcType::value_error(format!(
                "invalid whence ({other}, should be {SEEK_SET}, {SEEK_CUR} or {SEEK_END})"
            ))),
        }
    }
}

/// Text encodings supported by text-mode streams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, IntoStaticStr, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[strum(serialize = "utf-8")]
    Utf8,
    #[strum(serialize = "latin-1")]
    Latin1,
    #[strum(serialize = "ascii")]
    Ascii,
}

impl Encoding {
    /// Resolves an encoding name the way codec lookup does: case-insensitive, `_` equals `-`.
    pub fn lookup(name: &str) -> RunResult<Self> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" | "u8" => Ok(Self::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            _ => Err(SimpleException::new_msg(ExcType::LookupError, format!("unknown encoding: {name}")).into()),
        }
    }

    /// Encodes text, failing on characters the encoding cannot represent.
    pub fn encode(self, text: &str) -> RunResult<Vec<u8>> {
        let limit = match self {
            Self::Utf8 => return Ok(text.as_bytes().to_vec()),
            Self::Latin1 => 0x100,
            Self::Ascii => 0x80,
        };
        text.chars()
            .enumerate()
            .map(|(position, c)| {
                u8::try_from(u32::from(c))
                    .ok()
                    .filter(|_| u32::from(c) < limit)
                    .ok_or_else(|| {
                        RunError::from(SimpleException::new_msg(
                            ExcType::UnicodeEncodeError,
                            format!(
                                "'{self}' codec can't encode character '\\u{:04x}' in position {position}: ordinal not in range({limit})",
                                u32::from(c)
                            ),
                        ))
                    })
            })
            .collect()
    }

    /// Decodes bytes strictly.
    pub fn decode(self, bytes: &[u8]) -> RunResult<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).map(str::to_owned).map_err(|err| {
                let position = err.valid_up_to();
                RunError::from(SimpleException::new_msg(
                    ExcType::UnicodeDecodeError,
                    format!(
                        "'utf-8' codec can't decode byte 0x{:02x} in position {position}: invalid utf-8 sequence",
                        bytes[position]
                    ),
                ))
            }),
            Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
                Some(position) => Err(SimpleException::new_msg(
                    ExcType::UnicodeDecodeError,
                    format!(
                        "'ascii' codec can't decode byte 0x{:02x} in position {position}: ordinal not in range(128)",
                        bytes[position]
                    ),
                )
                .into()),
                None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            },
        }
    }

    /// Byte length of the character introduced by `lead`.
    pub(crate) fn char_width(self, lead: u8) -> usize {
        match self {
            Self::Utf8 => match lead {
                0xf0..=0xf7 => 4,
                0xe0..=0xef => 3,
                0xc0..=0xdf => 2,
                _ => 1,
            },
            Self::Latin1 | Self::Ascii => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
enum OpenKind {
    Read,
    Write,
    Append,
    Exclusive,
}

/// A parsed guest `open()` mode such as `"r"`, `"wb"` or `"a+"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpenMode {
    kind: OpenKind,
    update: bool,
    binary: bool,
}

impl OpenMode {
    /// Parses a mode string: exactly one of `r`/`w`/`a`/`x`, optionally `+`, optionally one
    /// of `b`/`t`, each at most once.
    pub fn parse(mode: &str) -> RunResult<Self> {
        let invalid = || ExcType::value_error(format!("invalid mode: '{mode}'"));
        let mut kind = None;
        let (mut update, mut binary, mut text) = (false, false, false);
        for c in mode.chars() {
            let seen = match c {
                'r' | 'w' | 'a' | 'x' => {
                    let next = match c {
                        'r' => OpenKind::Read,
                        'w' => OpenKind::Write,
                        'a' => OpenKind::Append,
                        _ => OpenKind::Exclusive,
                    };
                    kind.replace(next).is_some()
                }
                '+' => std::mem::replace(&mut update, true),
                'b' => std::mem::replace(&mut binary, true),
                't' => std::mem::replace(&mut text, true),
                _ => return Err(invalid()),
            };
            if seen {
                return Err(invalid());
            }
        }
        if binary && text {
            return Err(ExcType::value_error("can't have text and binary mode at once"));
        }
        let Some(kind) = kind else {
            return Err(ExcType::value_error(
                "Must have exactly one of create/read/write/append mode and at most one plus",
            ));
        };
        Ok(Self { kind, update, binary })
    }

    #[must_use]
    pub fn readable(&self) -> bool {
        self.kind == OpenKind::Read || self.update
    }

    #[must_use]
    pub fn writable(&self) -> bool {
        self.kind != OpenKind::Read || self.update
    }

    /// Every write lands at end-of-resource.
    #[must_use]
    pub fn is_append(&self) -> bool {
        self.kind == OpenKind::Append
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.binary
    }

    /// Host open options that realize this mode.
    #[must_use]
    pub fn open_options(&self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options.read(self.readable());
        match self.kind {
            OpenKind::Read => options.write(self.update),
            OpenKind::Write => options.write(true).create(true).truncate(true),
            OpenKind::Append => options.append(true).create(true),
            OpenKind::Exclusive => options.write(true).create_new(true),
        };
        options
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self.kind {
            OpenKind::Read => "r",
            OpenKind::Write => "w",
            OpenKind::Append => "a",
            OpenKind::Exclusive => "x",
        })?;
        if self.binary {
            f.write_str("b")?;
        }
        if self.update {
            f.write_str("+")?;
        }
        Ok(())
    }
}

/// Stream configuration.
///
/// Build custom options with the builder methods, starting from `StreamOptions::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOptions {
    /// Text encoding; ignored in binary mode.
    pub encoding: Encoding,
    /// Capacity of the read-ahead and write buffers, at least 1.
    pub buffer_size: usize,
    /// Flush after every text write containing a newline.
    pub line_buffering: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            line_buffering: false,
        }
    }
}

impl StreamOptions {
    /// Sets the text encoding.
    #[must_use]
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Sets the buffer capacity in bytes.
    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Enables or disables line buffering.
    #[must_use]
    pub fn line_buffering(mut self, enabled: bool) -> Self {
        self.line_buffering = enabled;
        self
    }
}
