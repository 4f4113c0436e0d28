//! Guest object types: dicts, instances with dynamic attributes, ranges, slices and iterators.

pub mod dict;
pub mod instance;
pub mod iter;
pub mod range;
pub mod slice;

pub use dict::DictPairs;
pub use instance::{FallbackHook, Getter, Instance, InstanceRef, Member, TypeInfo, TypeInfoBuilder};
pub use iter::PyIter;
pub use range::Range;
pub use slice::Slice;
