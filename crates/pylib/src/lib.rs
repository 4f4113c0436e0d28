#![doc = include_str!("../../../README.md")]

mod args;
pub mod builtins;
mod exception;
mod function;
pub mod os;
pub mod stream;
pub mod sys;
pub mod types;
mod value;

pub use crate::{
    args::{ArgValues, KwargsValues},
    builtins::BuiltinsFunctions,
    exception::{ExcType, RunError, RunResult, SimpleException},
    function::Function,
    os::{AccessMode, FsContext, Mode, PosixPermission, StatResult},
    stream::{
        DEFAULT_BUFFER_SIZE, Encoding, Lines, OpenMode, RandomAccessFile, SEEK_CUR, SEEK_END, SEEK_SET, Stream,
        StreamOptions, Whence,
    },
    types::{
        DictPairs, FallbackHook, Getter, Instance, InstanceRef, Member, PyIter, Range, Slice, TypeInfo, TypeInfoBuilder,
    },
    value::{DictRef, FileRef, IterRef, ListRef, Value},
};
