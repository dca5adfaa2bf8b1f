//! Indexing, slicing and selectors over slices, maps, host structs and
//! packages.

use super::{eval, eval2_with, eval_with, fails, fails_with, run};
use crate::StructKeyCache;
use proptest::prelude::*;
use quill_value::{
    HostPackage, HostStruct, IntKind, MapKey, MapValue, Native, SliceValue, StructType, Value,
};
use std::sync::Arc;

struct Product {
    name: String,
    price: i64,
    stock: Option<i64>,
}

fn product_type() -> Arc<StructType> {
    StructType::of::<Product>("Product")
        .tagged_field("Name", "name", |p| Native::from(p.name.clone()))
        .field("Price", |p| Native::from(p.price))
        .tagged_field("Stock", "stock,v2", |p| {
            p.stock.map_or(Native::Nil, Native::from)
        })
        .build()
}

fn pen() -> Value {
    let product = Product {
        name: "Pen".to_owned(),
        price: 3,
        stock: Some(12),
    };
    Value::Struct(HostStruct::new(&product_type(), product).unwrap())
}

mod slices {
    use super::*;
    use pretty_assertions::assert_eq;

    fn numbers() -> Value {
        Value::Slice(SliceValue::ints(IntKind::Int, vec![10, 20, 30]))
    }

    #[test]
    fn indexing() {
        assert_eq!(eval_with("s[1]", vec![("s", numbers())]).unwrap(), Value::int(20));
        assert_eq!(eval_with("s[2.0]", vec![("s", numbers())]).unwrap(), Value::int(30));
        assert_eq!(
            fails_with("s[3]", vec![("s", numbers())]),
            "index out of range [3] with length 3"
        );
        assert_eq!(eval(r#"["a", "b"][1]"#).unwrap(), Value::string("b"));
    }

    #[test]
    fn slicing_shares_storage() {
        let s = numbers();
        let Value::Slice(original) = &s else {
            unreachable!()
        };
        let Value::Slice(part) = eval_with("s[1:]", vec![("s", s.clone())]).unwrap() else {
            panic!("expected a slice");
        };
        assert_eq!(part.len(), 2);
        assert!(part.same_backing(original));
        assert_eq!(part.index(0).unwrap(), Value::int(20));
    }

    #[test]
    fn slicing_bounds() {
        assert_eq!(
            eval_with("s[:]", vec![("s", numbers())]).unwrap(),
            numbers()
        );
        assert_eq!(
            fails_with("s[1:4]", vec![("s", numbers())]),
            "slice bounds out of range [:4] with length 3"
        );
        assert_eq!(
            fails_with("s[4:]", vec![("s", numbers())]),
            "slice bounds out of range [4:3]"
        );
        assert_eq!(
            fails_with("s[-1:]", vec![("s", numbers())]),
            "invalid slice index -1 (index must be non-negative)"
        );
        assert_eq!(fails("1[0:1]"), "cannot slice 1 (type int)");
        assert_eq!(fails("true[0]"), "invalid operation: true[0] (type bool does not support indexing)");
    }
}

mod maps {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prices() -> Value {
        Value::map([
            (MapKey::string("pen"), Value::int(3)),
            (MapKey::string("ink"), Value::int(7)),
        ])
    }

    #[test]
    fn numeric_keys_follow_equality() {
        let m = || Value::map([(MapKey::Int(1), Value::string("one"))]);
        assert_eq!(eval_with("m[0.5 * 2]", vec![("m", m())]).unwrap(), Value::string("one"));
        assert_eq!(eval_with("m[1.0]", vec![("m", m())]).unwrap(), Value::string("one"));
        assert_eq!(eval_with("m[1.5]", vec![("m", m())]).unwrap(), Value::Nil);
    }

    #[test]
    fn missing_keys() {
        assert_eq!(
            eval2_with(r#"m["pencil"]"#, vec![("m", prices())]).unwrap(),
            (Value::Nil, Value::Bool(false))
        );
        assert_eq!(
            eval2_with(r#"m["pen"]"#, vec![("m", prices())]).unwrap(),
            (Value::int(3), Value::Bool(true))
        );
        assert_eq!(
            fails_with("m[[1]]", vec![("m", prices())]),
            "hash of unhashable type slice"
        );
    }

    #[test]
    fn selectors() {
        assert_eq!(eval_with("m.ink", vec![("m", prices())]).unwrap(), Value::int(7));
        assert_eq!(
            fails_with("m.paper", vec![("m", prices())]),
            r#"field "paper" does not exist"#
        );
        assert_eq!(
            eval2_with("m.paper", vec![("m", prices())]).unwrap(),
            (Value::Nil, Value::Bool(false))
        );
        assert_eq!(
            fails_with("n.x", vec![("n", Value::int(1))]),
            "invalid operation: n (type int is not map)"
        );
    }

    #[test]
    fn host_maps_are_read_only() {
        let host = MapValue::host([(MapKey::string("a"), Value::int(1))]);
        assert_eq!(
            eval_with(r#"h["a"]"#, vec![("h", Value::Map(host))]).unwrap(),
            Value::int(1)
        );
    }

    proptest! {
        #[test]
        fn absent_keys_never_fail(key in "[a-z]{1,8}") {
            prop_assume!(key != "pen" && key != "ink");
            let source = format!("m[\"{key}\"]");
            let (value, ok) = eval2_with(&source, vec![("m", prices())]).unwrap();
            prop_assert_eq!(value, Value::Nil);
            prop_assert_eq!(ok, Value::Bool(false));
        }
    }
}

mod structs {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fields_by_tag_and_name() {
        assert_eq!(eval_with("p.name", vec![("p", pen())]).unwrap(), Value::string("Pen"));
        assert_eq!(eval_with("p.Price * 2", vec![("p", pen())]).unwrap(), Value::int(6));
        assert_eq!(
            fails_with("p.Name", vec![("p", pen())]),
            r#"field "Name" does not exist"#
        );
        assert_eq!(eval_with(r#"p["name"]"#, vec![("p", pen())]).unwrap(), Value::string("Pen"));
    }

    #[test]
    fn versioned_fields() {
        assert_eq!(
            fails_with("p.stock", vec![("p", pen())]),
            r#"field "stock" does not exist"#
        );
        let stock = run(
            "p.stock",
            |builder| builder.version("v2").global("p", pen()),
            |evaluator, root| evaluator.eval(root),
        );
        assert_eq!(stock.unwrap(), Value::int(12));
    }

    #[test]
    fn shared_cache_decides_version() {
        let cache = Arc::new(StructKeyCache::with_version("v2"));
        let stock = run(
            "p.stock",
            |builder| builder.version("v1").struct_keys(Arc::clone(&cache)).global("p", pen()),
            |evaluator, root| {
                assert_eq!(evaluator.config().version.as_deref(), Some("v2"));
                evaluator.eval(root)
            },
        );
        assert_eq!(stock.unwrap(), Value::int(12));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn nil_struct_pointer() {
        let nil = Value::Struct(HostStruct::nil(&product_type()));
        assert_eq!(
            fails_with("p.name", vec![("p", nil.clone())]),
            "invalid memory address or nil pointer dereference"
        );
        assert_eq!(eval_with("p == nil", vec![("p", nil)]).unwrap(), Value::Bool(true));
        assert_eq!(eval_with("p != nil", vec![("p", pen())]).unwrap(), Value::Bool(true));
    }
}

mod packages {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings_package() -> Value {
        Value::Package(HostPackage::new(
            "strings",
            [("Sep", Value::string(","))],
        ))
    }

    #[test]
    fn selectors_resolve_declarations() {
        assert_eq!(
            eval_with("strings.Sep", vec![("strings", strings_package())]).unwrap(),
            Value::string(",")
        );
        assert_eq!(
            fails_with("strings.Join", vec![("strings", strings_package())]),
            "undefined: strings.Join"
        );
    }
}
