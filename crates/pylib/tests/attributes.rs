/// Tests for the attribute protocol on guest instances.
///
/// Lookup order is own attributes, then declared members, then the type's fallback hook.
/// Writes and deletes only ever touch the own mapping.
use std::rc::Rc;

use pretty_assertions::assert_eq;
use pylib::{
    ArgValues, BuiltinsFunctions, ExcType, InstanceRef, SimpleException, TypeInfo, Value,
    builtins::{delattr, dir, getattr, hasattr, setattr},
};

/// A small `Point` type with a constant, a method and a property.
fn point_type() -> Rc<TypeInfo> {
    TypeInfo::builder("Point")
        .constant("dims", Value::Int(2))
        .method("norm1", |args| {
            let Value::Instance(this) = &args[0] else {
                unreachable!("methods are bound to their instance");
            };
            let x = this.get_attr("x")?.as_int()?;
            let y = this.get_attr("y")?.as_int()?;
            Ok(Value::Int(x.abs() + y.abs()))
        })
        .property("label", |this| {
            Ok(Value::str(format!("Point({}, {})", this.get_attr("x")?, this.get_attr("y")?)))
        })
        .build()
}

fn point(x: i64, y: i64) -> Value {
    let instance = InstanceRef::new(&point_type());
    instance.set_attr("x", Value::Int(x));
    instance.set_attr("y", Value::Int(y));
    Value::Instance(instance)
}

/// Setting then reading an attribute returns the stored value.
#[test]
fn set_then_get_returns_value() {
    let p = point(1, 2);
    setattr(&p, "z", Value::str("depth")).unwrap();
    assert_eq!(getattr(&p, "z", None).unwrap(), Value::str("depth"));
}

/// Setting an existing attribute overwrites it.
#[test]
fn set_overwrites_previous_value() {
    let p = point(1, 2);
    setattr(&p, "x", Value::Int(10)).unwrap();
    assert_eq!(getattr(&p, "x", None).unwrap(), Value::Int(10));
}

/// Deleting an attribute makes later reads raise AttributeError.
#[test]
fn delete_then_get_raises_attribute_error() {
    let p = point(1, 2);
    delattr(&p, "x").unwrap();
    let err = getattr(&p, "x", None).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::AttributeError);
    assert_eq!(err.message(), Some("'Point' object has no attribute 'x'"));
}

/// Deleting a missing attribute raises AttributeError.
#[test]
fn delete_missing_raises_attribute_error() {
    let p = point(1, 2);
    let err = delattr(&p, "nope").unwrap_err();
    assert!(err.matches(ExcType::AttributeError));
}

/// Declared members live on the type, so instances cannot delete them.
#[test]
fn declared_member_cannot_be_deleted() {
    let p = point(1, 2);
    assert!(delattr(&p, "dims").is_err());
    assert_eq!(getattr(&p, "dims", None).unwrap(), Value::Int(2));
}

/// An own attribute shadows a declared member of the same name.
#[test]
fn own_attribute_shadows_member() {
    let p = point(1, 2);
    setattr(&p, "dims", Value::Int(3)).unwrap();
    assert_eq!(getattr(&p, "dims", None).unwrap(), Value::Int(3));
    delattr(&p, "dims").unwrap();
    assert_eq!(getattr(&p, "dims", None).unwrap(), Value::Int(2));
}

/// Methods come back bound to the instance they were read from.
#[test]
fn method_is_bound_to_instance() {
    let p = point(3, -4);
    let norm = getattr(&p, "norm1", None).unwrap();
    assert!(norm.is_callable());
    assert_eq!(norm.call(&[]).unwrap(), Value::Int(7));
}

/// Properties are computed on every read.
#[test]
fn property_sees_current_state() {
    let p = point(1, 2);
    assert_eq!(getattr(&p, "label", None).unwrap(), Value::str("Point(1, 2)"));
    setattr(&p, "x", Value::Int(5)).unwrap();
    assert_eq!(getattr(&p, "label", None).unwrap(), Value::str("Point(5, 2)"));
}

/// A default suppresses AttributeError but not other errors.
#[test]
fn getattr_default_only_covers_missing() {
    let p = point(1, 2);
    assert_eq!(getattr(&p, "missing", Some(Value::Int(0))).unwrap(), Value::Int(0));

    delattr(&p, "y").unwrap();
    // the property reads `y`, which is now gone: that AttributeError is also covered
    assert_eq!(getattr(&p, "label", Some(Value::None)).unwrap(), Value::None);

    let broken = TypeInfo::builder("Broken")
        .property("value", |_| Err(SimpleException::new_msg(ExcType::ValueError, "bad state").into()))
        .build();
    let b = Value::Instance(InstanceRef::new(&broken));
    let err = getattr(&b, "value", Some(Value::None)).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::ValueError);
}

/// hasattr never raises and reports declared members, own attributes and fallbacks.
#[test]
fn hasattr_reports_every_source() {
    let with_fallback = TypeInfo::builder("Dynamic")
        .fallback(|_, name| name.starts_with("dyn_").then(|| Value::str(name)))
        .build();
    let d = Value::Instance(InstanceRef::new(&with_fallback));
    assert!(hasattr(&d, "dyn_anything"));
    assert!(!hasattr(&d, "static"));
    assert_eq!(getattr(&d, "dyn_x", None).unwrap(), Value::str("dyn_x"));

    let p = point(0, 0);
    assert!(hasattr(&p, "x"));
    assert!(hasattr(&p, "dims"));
    assert!(hasattr(&p, "label"));
    assert!(!hasattr(&p, "w"));
    assert!(!hasattr(&Value::Int(1), "real"));
}

/// dir() is the sorted union of own attributes and declared members.
#[test]
fn dir_is_sorted_union() {
    let p = point(1, 2);
    setattr(&p, "dims", Value::Int(9)).unwrap();
    assert_eq!(dir(&p), vec!["dims", "label", "norm1", "x", "y"]);
}

/// Values without an attribute mapping reject writes.
#[test]
fn setattr_on_plain_value_fails() {
    let err = setattr(&Value::Int(1), "x", Value::None).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::AttributeError);
}

/// Two instances of one type never share their own attributes.
#[test]
fn instances_do_not_share_attributes() {
    let ty = point_type();
    let a = InstanceRef::new(&ty);
    let b = InstanceRef::new(&ty);
    a.set_attr("x", Value::Int(1));
    assert!(!b.has_attr("x"));
    assert!(Rc::ptr_eq(&a.type_info(), &b.type_info()));
}

/// The guest-facing builtins check that the attribute name is a string.
#[test]
fn builtin_attribute_name_must_be_str() {
    let p = point(1, 2);
    let err = BuiltinsFunctions::Getattr
        .call(ArgValues::new(vec![p.clone(), Value::Int(1)]))
        .unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);

    let found = BuiltinsFunctions::Hasattr
        .call(ArgValues::new(vec![p, Value::str("x")]))
        .unwrap();
    assert_eq!(found, Value::Bool(true));
}
