//! Builtins, conversions and host function calls.

use super::{eval, eval2_with, eval_with, fails, fails_with, run};
use crate::Error;
use quill_value::{
    ErrorCategory, HostFunc, HostStruct, MapKey, MapValue, Native, ParamKind, Signature,
    StructType, Value,
};

fn int_arg(value: &Value) -> Result<i64, String> {
    match value {
        Value::Int(n) => Ok(*n),
        other => Err(format!("unexpected {}", other.type_name())),
    }
}

fn add() -> Value {
    Value::Func(HostFunc::new(
        "add",
        Signature::new([ParamKind::Int, ParamKind::Int], [ParamKind::Int]),
        |args| Ok(vec![Native::from(int_arg(&args[0])? + int_arg(&args[1])?)]),
    ))
}

fn join() -> Value {
    Value::Func(HostFunc::new(
        "join",
        Signature::new([ParamKind::String, ParamKind::String], [ParamKind::String]).variadic(),
        |args| {
            let (sep, parts) = args.split_first().ok_or("no separator")?;
            let parts: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
            Ok(vec![Native::from(parts.join(sep.as_str().unwrap_or_default()))])
        },
    ))
}

fn divmod() -> Value {
    Value::Func(HostFunc::new(
        "divmod",
        Signature::new([ParamKind::Int, ParamKind::Int], [ParamKind::Int, ParamKind::Int]),
        |args| {
            let (a, b) = (int_arg(&args[0])?, int_arg(&args[1])?);
            if b == 0 {
                return Err("divmod by zero".to_owned());
            }
            Ok(vec![Native::from(a / b), Native::from(a % b)])
        },
    ))
}

fn boom() -> Value {
    Value::Func(HostFunc::new(
        "boom",
        Signature {
            results: vec![ParamKind::Any],
            ..Signature::default()
        },
        |_| panic!("kaboom"),
    ))
}

fn noop() -> Value {
    Value::Func(HostFunc::new("noop", Signature::default(), |_| Ok(Vec::new())))
}

fn short() -> Value {
    Value::Func(HostFunc::new(
        "short",
        Signature {
            results: vec![ParamKind::Int],
            ..Signature::default()
        },
        |_| Ok(Vec::new()),
    ))
}

fn host_globals() -> Vec<(&'static str, Value)> {
    vec![
        ("add", add()),
        ("join", join()),
        ("divmod", divmod()),
        ("boom", boom()),
        ("noop", noop()),
        ("short", short()),
        ("s", Value::string("x")),
    ]
}

fn eval0_with(source: &str, globals: Vec<(&str, Value)>) -> Result<(), Error> {
    run(source, |builder| builder.globals(globals), |evaluator, root| evaluator.eval0(root))
}

mod builtins {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn len() {
        assert_eq!(eval(r#"len("héllo")"#).unwrap(), Value::int(5));
        assert_eq!(eval("len([1, 2, 3])").unwrap(), Value::int(3));
        assert_eq!(eval(r#"len({"a": 1})"#).unwrap(), Value::int(1));
        assert_eq!(fails("len(1)"), "invalid argument 1 (type int) for len");
        assert_eq!(fails("len(nil)"), "use of untyped nil");
        assert_eq!(fails("len()"), "missing argument to len: len()");
        assert_eq!(fails(r#"len("a", "b")"#), r#"too many arguments to len: len("a", "b")"#);
        assert_eq!(fails("len"), "use of builtin len not in function call");
    }

    #[test]
    fn len_is_not_a_statement() {
        let err = eval0_with("len(s)", vec![("s", Value::string("x"))]).unwrap_err();
        assert_eq!(err.message, "len(s) evaluated but not used");
    }

    #[test]
    fn delete() {
        let m = Value::map([
            (MapKey::string("a"), Value::int(1)),
            (MapKey::string("b"), Value::int(2)),
        ]);
        eval0_with(r#"delete(m, "a")"#, vec![("m", m.clone())]).unwrap();
        let Value::Map(map) = &m else { unreachable!() };
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&MapKey::string("a")), None);

        eval0_with(r#"delete(m, "missing")"#, vec![("m", m.clone())]).unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn delete_errors() {
        let host = Value::Map(MapValue::host([(MapKey::string("a"), Value::int(1))]));
        assert_eq!(
            eval0_with(r#"delete(h, "a")"#, vec![("h", host)]).unwrap_err().message,
            "cannot delete from non-mutable map"
        );
        assert_eq!(
            eval0_with(r#"delete(1, "a")"#, Vec::new()).unwrap_err().message,
            "first argument to delete must be map; have int"
        );
        assert_eq!(
            eval0_with("delete(m)", vec![("m", Value::map([]))]).unwrap_err().message,
            "missing argument to delete: delete(m)"
        );
        assert_eq!(
            fails_with(r#"delete(m, "a")"#, vec![("m", Value::map([]))]),
            r#"delete(m, "a") used as value"#
        );
        eval0_with(r#"delete(m, "a")"#, vec![("m", Value::Map(MapValue::nil()))]).unwrap();
    }

    #[test]
    fn conversion_arity() {
        assert_eq!(fails("int()"), "missing argument to conversion to int: int()");
        assert_eq!(fails("string(1, 2)"), "too many arguments to conversion to string: string(1, 2)");
    }
}

mod host {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn calls_with_coercion() {
        assert_eq!(eval_with("add(1, 2)", host_globals()).unwrap(), Value::int(3));
        assert_eq!(eval_with("add(1, 4.0)", host_globals()).unwrap(), Value::int(5));
        assert_eq!(
            fails_with("add(1, 2.5)", host_globals()),
            "number 2.5 truncated to integer"
        );
        assert_eq!(
            fails_with("add(1, s)", host_globals()),
            "cannot use s (type string) as type int in argument to add"
        );
        assert_eq!(
            fails_with("add(nil, 1)", host_globals()),
            "cannot use nil as type int in argument to add"
        );
    }

    #[test]
    fn arity() {
        assert_eq!(
            fails_with("add(1)", host_globals()),
            "not enough arguments in call to add\n\thave (int)\n\twant (int, int)"
        );
        assert_eq!(
            fails_with(r#"add(1, 2, "x")"#, host_globals()),
            "too many arguments in call to add\n\thave (int, int, string)\n\twant (int, int)"
        );
        assert_eq!(
            fails_with("join()", host_globals()),
            "not enough arguments in call to join\n\thave ()\n\twant (string, ...string)"
        );
    }

    #[test]
    fn variadic() {
        assert_eq!(
            eval_with(r#"join("-", "a", "b", "c")"#, host_globals()).unwrap(),
            Value::string("a-b-c")
        );
        assert_eq!(eval_with(r#"join("-")"#, host_globals()).unwrap(), Value::string(""));
        assert_eq!(
            fails_with(r#"join("-", "a", 1)"#, host_globals()),
            "cannot use 1 (type int) as type string in argument to join"
        );
    }

    #[test]
    fn result_counts() {
        assert_eq!(
            eval2_with("divmod(7, 2)", host_globals()).unwrap(),
            (Value::int(3), Value::int(1))
        );
        assert_eq!(
            fails_with("divmod(7, 2)", host_globals()),
            "multiple-value divmod(7, 2) in single-value context"
        );
        assert_eq!(fails_with("noop()", host_globals()), "noop() used as value");
        eval0_with("noop()", host_globals()).unwrap();
        assert_eq!(
            eval2_with("add(1, 2)", host_globals()).unwrap_err().message,
            "assignment mismatch: 2 variables but 1 values"
        );
    }

    #[test]
    fn result_count_is_checked_before_arguments() {
        assert_eq!(
            fails_with("noop(undefined_name)", host_globals()),
            "noop(undefined_name) used as value"
        );
    }

    #[test]
    fn host_failures() {
        let err = eval_with("divmod(1, 0)", host_globals()).unwrap_err();
        assert_eq!(err.message, "divmod by zero");
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert_eq!(err.position.column, 1);

        let err = eval_with("1 + boom()", host_globals()).unwrap_err();
        assert_eq!(err.message, "kaboom");
        assert_eq!(err.position.column, 5);
        assert!(!err.is_fatal());

        assert_eq!(
            fails_with("short()", host_globals()),
            "short returned 0 values, want 1"
        );
    }

    #[test]
    fn not_callable() {
        assert_eq!(
            fails_with("s(1)", host_globals()),
            "cannot call non-function s (type string)"
        );
    }
}

mod methods {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Counter {
        count: i64,
    }

    fn counter() -> Value {
        let ty = StructType::of::<Counter>("Counter")
            .field("Count", |c| Native::from(c.count))
            .method(
                "Plus",
                Signature::new([ParamKind::Int], [ParamKind::Int]),
                |c, args| Ok(vec![Native::from(c.count + int_arg(&args[0])?)]),
            )
            .build();
        Value::Struct(HostStruct::new(&ty, Counter { count: 40 }).unwrap())
    }

    #[test]
    fn bound_methods() {
        assert_eq!(eval_with("c.Plus(2)", vec![("c", counter())]).unwrap(), Value::int(42));
        assert_eq!(
            fails_with("c.Plus()", vec![("c", counter())]),
            "not enough arguments in call to c.Plus\n\thave ()\n\twant (int)"
        );
        let Value::Func(plus) = eval_with("c.Plus", vec![("c", counter())]).unwrap() else {
            panic!("expected a bound method");
        };
        assert_eq!(plus.name(), "Counter.Plus");
    }
}
