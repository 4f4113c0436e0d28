//! Guest builtin functions.
//!
//! Each builtin has its own submodule. Submodules expose a typed Rust function for embedders plus
//! a `builtin_*` entry point that unpacks [`ArgValues`]; [`BuiltinsFunctions`] names every
//! builtin and dispatches guest calls to those entry points.

mod all;
mod any;
mod attr;
mod dir;
mod enumerate;
mod eval;
mod filter;
mod iter;
mod len;
mod list;
mod map;
mod min_max;
mod next;
mod ord_chr;
mod print;
mod radix;
mod range;
mod repr;
mod reversed;
mod slice;
mod sorted;
mod sum;
mod zip;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

pub use self::{
    all::all,
    any::any,
    attr::{delattr, getattr, hasattr, setattr},
    dir::dir,
    enumerate::enumerate,
    filter::filter,
    iter::iter,
    len::len,
    list::list,
    map::map,
    min_max::{max, min},
    next::next,
    ord_chr::{chr, ord},
    print::print,
    radix::{bin, hex, oct},
    range::range,
    repr::repr,
    reversed::reversed,
    slice::slice,
    sorted::sorted,
    sum::sum,
    zip::zip,
};
use crate::{args::ArgValues, exception::RunResult, function::Function, value::Value};

/// Enumerates every builtin function the runtime recognizes.
///
/// Uses strum derives so the guest-visible name is the lowercase variant name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum BuiltinsFunctions {
    All,
    Any,
    Bin,
    Chr,
    Delattr,
    Dir,
    Enumerate,
    /// Recognized but unsupported.
    Eval,
    /// Recognized but unsupported.
    Exec,
    Filter,
    Getattr,
    Hasattr,
    Hex,
    Iter,
    Len,
    List,
    Map,
    Max,
    Min,
    Next,
    Oct,
    Ord,
    Print,
    Range,
    Repr,
    Reversed,
    Setattr,
    Slice,
    Sorted,
    Sum,
    Zip,
}

impl BuiltinsFunctions {
    /// Calls the builtin with guest arguments.
    pub fn call(self, args: ArgValues) -> RunResult<Value> {
        match self {
            Self::All => all::builtin_all(args),
            Self::Any => any::builtin_any(args),
            Self::Bin => radix::builtin_bin(args),
            Self::Chr => ord_chr::builtin_chr(args),
            Self::Delattr => attr::builtin_delattr(args),
            Self::Dir => dir::builtin_dir(args),
            Self::Enumerate => enumerate::builtin_enumerate(args),
            Self::Eval => eval::builtin_eval(args),
            Self::Exec => eval::builtin_exec(args),
            Self::Filter => filter::builtin_filter(args),
            Self::Getattr => attr::builtin_getattr(args),
            Self::Hasattr => attr::builtin_hasattr(args),
            Self::Hex => radix::builtin_hex(args),
            Self::Iter => iter::builtin_iter(args),
            Self::Len => len::builtin_len(args),
            Self::List => list::builtin_list(args),
            Self::Map => map::builtin_map(args),
            Self::Max => min_max::builtin_max(args),
            Self::Min => min_max::builtin_min(args),
            Self::Next => next::builtin_next(args),
            Self::Oct => radix::builtin_oct(args),
            Self::Ord => ord_chr::builtin_ord(args),
            Self::Print => print::builtin_print(args),
            Self::Range => range::builtin_range(args),
            Self::Repr => repr::builtin_repr(args),
            Self::Reversed => reversed::builtin_reversed(args),
            Self::Setattr => attr::builtin_setattr(args),
            Self::Slice => slice::builtin_slice(args),
            Self::Sorted => sorted::builtin_sorted(args),
            Self::Sum => sum::builtin_sum(args),
            Self::Zip => zip::builtin_zip(args),
        }
    }
}

/// Makes a builtin a first-class guest callable, e.g. `map(len, words)`.
impl From<BuiltinsFunctions> for Function {
    fn from(builtin: BuiltinsFunctions) -> Self {
        Self::new_builtin(builtin.into(), move |args| builtin.call(ArgValues::new(args.to_vec())))
    }
}

impl From<BuiltinsFunctions> for Value {
    fn from(builtin: BuiltinsFunctions) -> Self {
        Self::Callable(builtin.into())
    }
}
