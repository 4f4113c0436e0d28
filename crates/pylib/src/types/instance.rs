//! Attribute protocol for guest instances.
//!
//! An [`Instance`] pairs a [`TypeInfo`] capability table with its own attribute mapping.
//! Lookup order for `get` is: own attributes, declared members of the type, then the type's
//! optional fallback hook. Only the own mapping is ever written or deleted.

use std::{cell::RefCell, fmt, rc::Rc};

use ahash::AHashMap;
use indexmap::IndexMap;

use crate::{
    exception::{ExcType, RunResult},
    function::Function,
    value::Value,
};

/// Computes an attribute from the instance it is read on.
pub type Getter = Rc<dyn Fn(&InstanceRef) -> RunResult<Value>>;

/// Consulted after own attributes and declared members miss. `None` means "no such attribute".
pub type FallbackHook = Rc<dyn Fn(&InstanceRef, &str) -> Option<Value>>;

/// A member declared on a type.
#[derive(Clone)]
pub enum Member {
    /// Class-level value shared by every instance.
    Constant(Value),
    /// Bound to the receiving instance on lookup; the instance arrives as the first argument.
    Method(Function),
    /// Evaluated against the instance on every lookup.
    Property(Getter),
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            Self::Method(function) => f.debug_tuple("Method").field(function).finish(),
            Self::Property(_) => f.write_str("Property"),
        }
    }
}

/// Per-type capability table, built once and shared by all instances of the type.
pub struct TypeInfo {
    name: String,
    members: IndexMap<String, Member>,
    fallback: Option<FallbackHook>,
}

impl TypeInfo {
    pub fn builder(name: impl Into<String>) -> TypeInfoBuilder {
        TypeInfoBuilder {
            info: Self {
                name: name.into(),
                members: IndexMap::new(),
                fallback: None,
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    /// Declared member names in declaration order.
    pub fn member_names(&self) -> impl Iterator<Item = &str> {
        self.members.keys().map(String::as_str)
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeInfo")
            .field("name", &self.name)
            .field("members", &self.members)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Builder for [`TypeInfo`]. Later declarations of the same name replace earlier ones.
pub struct TypeInfoBuilder {
    info: TypeInfo,
}

impl TypeInfoBuilder {
    #[must_use]
    pub fn constant(mut self, name: &str, value: Value) -> Self {
        self.info.members.insert(name.to_owned(), Member::Constant(value));
        self
    }

    #[must_use]
    pub fn method(mut self, name: &str, func: impl Fn(&[Value]) -> RunResult<Value> + 'static) -> Self {
        let qualified = format!("{}.{name}", self.info.name);
        self.info
            .members
            .insert(name.to_owned(), Member::Method(Function::new(qualified, func)));
        self
    }

    #[must_use]
    pub fn property(mut self, name: &str, getter: impl Fn(&InstanceRef) -> RunResult<Value> + 'static) -> Self {
        self.info.members.insert(name.to_owned(), Member::Property(Rc::new(getter)));
        self
    }

    #[must_use]
    pub fn fallback(mut self, hook: impl Fn(&InstanceRef, &str) -> Option<Value> + 'static) -> Self {
        self.info.fallback = Some(Rc::new(hook));
        self
    }

    #[must_use]
    pub fn build(self) -> Rc<TypeInfo> {
        Rc::new(self.info)
    }
}

/// Instance state: the type plus the own attribute mapping.
///
/// The mapping starts empty and is never shared with another instance.
#[derive(Debug)]
pub struct Instance {
    type_info: Rc<TypeInfo>,
    attrs: AHashMap<String, Value>,
}

/// Shared handle to an [`Instance`]. Clones alias the same instance.
#[derive(Clone)]
pub struct InstanceRef(Rc<RefCell<Instance>>);

impl InstanceRef {
    #[must_use]
    pub fn new(type_info: &Rc<TypeInfo>) -> Self {
        Self(Rc::new(RefCell::new(Instance {
            type_info: Rc::clone(type_info),
            attrs: AHashMap::new(),
        })))
    }

    #[must_use]
    pub fn type_info(&self) -> Rc<TypeInfo> {
        Rc::clone(&self.0.borrow().type_info)
    }

    #[must_use]
    pub fn type_name(&self) -> String {
        self.0.borrow().type_info.name.clone()
    }

    /// Reads an attribute, raising `AttributeError` when it is absent everywhere.
    pub fn get_attr(&self, name: &str) -> RunResult<Value> {
        self.lookup(name)?
            .ok_or_else(|| ExcType::attribute_error(self.type_name(), name))
    }

    /// Like [`get_attr`](Self::get_attr), but absence is `Ok(None)` rather than an error.
    ///
    /// Errors only come from property getters.
    pub fn lookup(&self, name: &str) -> RunResult<Option<Value>> {
        let type_info = {
            let inner = self.0.borrow();
            if let Some(value) = inner.attrs.get(name) {
                return Ok(Some(value.clone()));
            }
            Rc::clone(&inner.type_info)
        };
        if let Some(member) = type_info.member(name) {
            return self.resolve_member(member).map(Some);
        }
        Ok(type_info.fallback.as_ref().and_then(|hook| hook(self, name)))
    }

    /// Inserts or overwrites an own attribute.
    pub fn set_attr(&self, name: &str, value: Value) {
        self.0.borrow_mut().attrs.insert(name.to_owned(), value);
    }

    /// Removes an own attribute; declared members cannot be deleted through an instance.
    pub fn del_attr(&self, name: &str) -> RunResult<()> {
        let removed = self.0.borrow_mut().attrs.remove(name);
        match removed {
            Some(_) => Ok(()),
            None => Err(ExcType::attribute_error(self.type_name(), name)),
        }
    }

    /// Whether `get_attr` would find the attribute.
    ///
    /// Never raises. Properties count as present without running their getter.
    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        let type_info = {
            let inner = self.0.borrow();
            if inner.attrs.contains_key(name) {
                return true;
            }
            Rc::clone(&inner.type_info)
        };
        type_info.member(name).is_some() || type_info.fallback.as_ref().is_some_and(|hook| hook(self, name).is_some())
    }

    /// Sorted, de-duplicated union of own attribute names and declared member names.
    #[must_use]
    pub fn dir(&self) -> Vec<String> {
        let inner = self.0.borrow();
        let mut names: Vec<String> = inner
            .attrs
            .keys()
            .cloned()
            .chain(inner.type_info.member_names().map(str::to_owned))
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> *const () {
        Rc::as_ptr(&self.0).cast::<()>()
    }

    /// Whether the type declares a special method such as `__len__`.
    pub(crate) fn has_special(&self, name: &str) -> bool {
        self.0.borrow().type_info.member(name).is_some()
    }

    /// Calls a special method declared on the type, skipping own attributes like CPython does.
    ///
    /// Returns `Ok(None)` when the type does not declare it.
    pub(crate) fn call_special(&self, name: &str, args: &[Value]) -> RunResult<Option<Value>> {
        let type_info = self.type_info();
        let Some(member) = type_info.member(name) else {
            return Ok(None);
        };
        let callable = self.resolve_member(member)?;
        callable.call(args).map(Some)
    }

    fn resolve_member(&self, member: &Member) -> RunResult<Value> {
        match member {
            Member::Constant(value) => Ok(value.clone()),
            Member::Method(function) => Ok(Value::Callable(function.bind(Value::Instance(self.clone())))),
            Member::Property(getter) => getter(self),
        }
    }
}

impl fmt::Debug for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(inner) => f
                .debug_struct("InstanceRef")
                .field("type", &inner.type_info.name)
                .field("attrs", &inner.attrs.len())
                .finish(),
            Err(_) => f.write_str("InstanceRef(<borrowed>)"),
        }
    }
}
