//! Host bindings: descriptor tables for host functions, struct types and
//! packages.
//!
//! Nothing here is discovered at run time. The embedding application
//! describes each function's parameter and result kinds and each struct's
//! fields and methods once, at bind time; call dispatch and field lookup
//! operate on these descriptors.

use crate::errors::{host_error, EvalError};
use crate::{Decimal, Native, Value};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Declared kind of a host parameter or result.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// Accepts any value unchanged.
    Any,
    Bool,
    /// Machine integer; exact decimals are narrowed.
    Int,
    /// Decimal; integers are widened.
    Number,
    /// Plain string; markup strings are unwrapped.
    String,
    Html,
    Map,
    Slice,
    Func,
    /// A host struct type, by name.
    Struct(&'static str),
}

impl ParamKind {
    pub const fn name(self) -> &'static str {
        match self {
            ParamKind::Any => "any",
            ParamKind::Bool => "bool",
            ParamKind::Int => "int",
            ParamKind::Number => "number",
            ParamKind::String => "string",
            ParamKind::Html => "html",
            ParamKind::Map => "map",
            ParamKind::Slice => "slice",
            ParamKind::Func => "func",
            ParamKind::Struct(name) => name,
        }
    }

    /// Kinds for which `nil` is not an acceptable argument.
    pub const fn rejects_nil(self) -> bool {
        matches!(
            self,
            ParamKind::Bool | ParamKind::Int | ParamKind::Number | ParamKind::String | ParamKind::Html
        )
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameter and result kinds of a host function.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Signature {
    pub params: Vec<ParamKind>,
    /// The last parameter repeats.
    pub variadic: bool,
    pub results: Vec<ParamKind>,
}

impl Signature {
    pub fn new(params: impl Into<Vec<ParamKind>>, results: impl Into<Vec<ParamKind>>) -> Self {
        Signature {
            params: params.into(),
            variadic: false,
            results: results.into(),
        }
    }

    /// Mark the last parameter as variadic.
    #[must_use]
    pub fn variadic(mut self) -> Self {
        self.variadic = !self.params.is_empty();
        self
    }

    /// Kind expected for argument `index`.
    pub fn param_for(&self, index: usize) -> Option<ParamKind> {
        match self.params.get(index) {
            Some(&kind) => Some(kind),
            None if self.variadic => self.params.last().copied(),
            None => None,
        }
    }

    /// Whether `count` arguments satisfy the arity.
    pub fn accepts_arg_count(&self, count: usize) -> bool {
        if self.variadic {
            count + 1 >= self.params.len()
        } else {
            count == self.params.len()
        }
    }

    /// `(int, ...string)`, the parameter list as shown in arity errors.
    pub fn want_list(&self) -> String {
        let last = self.params.len().saturating_sub(1);
        let params: Vec<String> = self
            .params
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                if self.variadic && i == last {
                    format!("...{kind}")
                } else {
                    kind.to_string()
                }
            })
            .collect();
        format!("({})", params.join(", "))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func{}", self.want_list())?;
        match self.results.as_slice() {
            [] => Ok(()),
            [one] => write!(f, " {one}"),
            many => {
                let names: Vec<&str> = many.iter().map(|k| k.name()).collect();
                write!(f, " ({})", names.join(", "))
            }
        }
    }
}

/// What a host function returns: its results, or an error message.
pub type HostResult = Result<Vec<Native>, String>;

type Thunk = dyn Fn(&[Value]) -> HostResult + Send + Sync;

struct FuncDecl {
    name: String,
    signature: Signature,
    thunk: Option<Arc<Thunk>>,
}

/// Callable host function. A function without a thunk is a typed nil.
#[derive(Clone)]
pub struct HostFunc(Arc<FuncDecl>);

impl HostFunc {
    /// Bind `thunk` under `name`. Arguments reach the thunk already
    /// coerced to the declared parameter kinds; variadic arguments are
    /// passed flat after the fixed ones.
    pub fn new<F>(name: impl Into<String>, signature: Signature, thunk: F) -> Self
    where
        F: Fn(&[Value]) -> HostResult + Send + Sync + 'static,
    {
        HostFunc(Arc::new(FuncDecl {
            name: name.into(),
            signature,
            thunk: Some(Arc::new(thunk)),
        }))
    }

    /// Nil function value of the given signature.
    pub fn nil(name: impl Into<String>, signature: Signature) -> Self {
        HostFunc(Arc::new(FuncDecl {
            name: name.into(),
            signature,
            thunk: None,
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn signature(&self) -> &Signature {
        &self.0.signature
    }

    pub fn is_nil(&self) -> bool {
        self.0.thunk.is_none()
    }

    /// Run the thunk. Panics inside it propagate to the caller.
    pub fn invoke(&self, args: &[Value]) -> HostResult {
        match &self.0.thunk {
            Some(thunk) => thunk(args),
            None => Err("call of nil function".to_owned()),
        }
    }

    pub fn ptr_eq(&self, other: &HostFunc) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0.name, self.0.signature)
    }
}

type Getter = dyn Fn(&dyn Any) -> Native + Send + Sync;
type MethodThunk = dyn Fn(&dyn Any, &[Value]) -> HostResult + Send + Sync;

/// One exported field of a host struct.
pub struct FieldDecl {
    pub name: String,
    /// `name` or `name,version` alias annotation.
    pub tag: Option<String>,
    getter: Arc<Getter>,
}

impl FieldDecl {
    pub fn get(&self, data: &dyn Any) -> Native {
        (self.getter)(data)
    }
}

/// One exported method of a host struct.
pub struct MethodDecl {
    pub name: String,
    pub signature: Signature,
    thunk: Arc<MethodThunk>,
}

/// Identity of one [`StructType`] descriptor. Two descriptors over the
/// same Rust type get different ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StructTypeId(u64);

impl StructTypeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        StructTypeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Descriptor of a host struct type.
pub struct StructType {
    id: StructTypeId,
    name: &'static str,
    type_id: TypeId,
    fields: Vec<FieldDecl>,
    methods: Vec<MethodDecl>,
    as_number: Option<Arc<dyn Fn(&dyn Any) -> Decimal + Send + Sync>>,
    as_string: Option<Arc<dyn Fn(&dyn Any) -> String + Send + Sync>>,
}

impl StructType {
    /// Start describing host type `T`.
    pub fn of<T: Any + Send + Sync>(name: &'static str) -> StructTypeBuilder<T> {
        StructTypeBuilder {
            ty: StructType {
                id: StructTypeId::next(),
                name,
                type_id: TypeId::of::<T>(),
                fields: Vec::new(),
                methods: Vec::new(),
                as_number: None,
                as_string: None,
            },
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Identity of this descriptor, used as the field-cache key.
    pub fn id(&self) -> StructTypeId {
        self.id
    }

    /// Identity of the described host type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }
}

/// Typed builder for [`StructType`].
pub struct StructTypeBuilder<T> {
    ty: StructType,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Any + Send + Sync> StructTypeBuilder<T> {
    #[must_use]
    pub fn field<F>(self, name: &str, getter: F) -> Self
    where
        F: Fn(&T) -> Native + Send + Sync + 'static,
    {
        self.push_field(name, None, getter)
    }

    /// Field exposed under the alias in `tag` (`name` or `name,version`).
    #[must_use]
    pub fn tagged_field<F>(self, name: &str, tag: &str, getter: F) -> Self
    where
        F: Fn(&T) -> Native + Send + Sync + 'static,
    {
        self.push_field(name, Some(tag.to_owned()), getter)
    }

    fn push_field<F>(mut self, name: &str, tag: Option<String>, getter: F) -> Self
    where
        F: Fn(&T) -> Native + Send + Sync + 'static,
    {
        self.ty.fields.push(FieldDecl {
            name: name.to_owned(),
            tag,
            getter: Arc::new(move |data: &dyn Any| {
                data.downcast_ref::<T>().map_or(Native::Nil, &getter)
            }),
        });
        self
    }

    #[must_use]
    pub fn method<F>(mut self, name: &str, signature: Signature, thunk: F) -> Self
    where
        F: Fn(&T, &[Value]) -> HostResult + Send + Sync + 'static,
    {
        let type_name = self.ty.name;
        self.ty.methods.push(MethodDecl {
            name: name.to_owned(),
            signature,
            thunk: Arc::new(move |data: &dyn Any, args: &[Value]| match data.downcast_ref::<T>() {
                Some(receiver) => thunk(receiver, args),
                None => Err(format!("receiver is not a {type_name}")),
            }),
        });
        self
    }

    /// Values of this type normalize to a number.
    #[must_use]
    pub fn number<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Decimal + Send + Sync + 'static,
    {
        self.ty.as_number = Some(Arc::new(move |data: &dyn Any| {
            data.downcast_ref::<T>().map_or_else(Decimal::zero, &f)
        }));
        self
    }

    /// Values of this type normalize to a string.
    #[must_use]
    pub fn string<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.ty.as_string = Some(Arc::new(move |data: &dyn Any| {
            data.downcast_ref::<T>().map_or_else(String::new, &f)
        }));
        self
    }

    pub fn build(self) -> Arc<StructType> {
        Arc::new(self.ty)
    }
}

/// A host struct value, or a typed nil pointer to one.
#[derive(Clone)]
pub struct HostStruct {
    ty: Arc<StructType>,
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl HostStruct {
    /// Wrap `value`, which must be of the type `ty` describes.
    pub fn new<T: Any + Send + Sync>(ty: &Arc<StructType>, value: T) -> Result<Self, EvalError> {
        if TypeId::of::<T>() != ty.type_id {
            return Err(host_error(&format!(
                "host value is not a {}",
                ty.name
            )));
        }
        Ok(HostStruct {
            ty: Arc::clone(ty),
            data: Some(Arc::new(value)),
        })
    }

    pub fn nil(ty: &Arc<StructType>) -> Self {
        HostStruct {
            ty: Arc::clone(ty),
            data: None,
        }
    }

    pub fn struct_type(&self) -> &Arc<StructType> {
        &self.ty
    }

    pub fn is_nil(&self) -> bool {
        self.data.is_none()
    }

    /// Field `index` of the descriptor, or `None` on a nil pointer.
    pub fn field(&self, index: usize) -> Option<Native> {
        let data = self.data.as_deref()?;
        let field = self.ty.fields.get(index)?;
        Some(field.get(data))
    }

    /// Method `index` bound to this receiver, or `None` on a nil pointer.
    pub fn bound_method(&self, index: usize) -> Option<HostFunc> {
        let data = Arc::clone(self.data.as_ref()?);
        let method = self.ty.methods.get(index)?;
        let thunk = Arc::clone(&method.thunk);
        Some(HostFunc::new(
            format!("{}.{}", self.ty.name, method.name),
            method.signature.clone(),
            move |args| thunk(data.as_ref(), args),
        ))
    }

    /// Numeric view, if the type declares one.
    pub fn as_number(&self) -> Option<Decimal> {
        let data = self.data.as_deref()?;
        self.ty.as_number.as_ref().map(|f| f(data))
    }

    /// String view, if the type declares one.
    pub fn as_string(&self) -> Option<String> {
        let data = self.data.as_deref()?;
        self.ty.as_string.as_ref().map(|f| f(data))
    }

    pub fn ptr_eq(&self, other: &HostStruct) -> bool {
        match (&self.data, &other.data) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => Arc::ptr_eq(&self.ty, &other.ty),
            _ => false,
        }
    }
}

impl fmt::Debug for HostStruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nil() {
            write!(f, "(*{})(nil)", self.ty.name)
        } else {
            write!(f, "&{}{{..}}", self.ty.name)
        }
    }
}

/// Named set of host declarations reachable as `pkg.Name`.
#[derive(Clone)]
pub struct HostPackage(Arc<PackageDecl>);

struct PackageDecl {
    name: String,
    decls: FxHashMap<String, Value>,
}

impl HostPackage {
    pub fn new<I, K>(name: impl Into<String>, decls: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        HostPackage(Arc::new(PackageDecl {
            name: name.into(),
            decls: decls.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.0.decls.get(name).cloned()
    }

    pub fn ptr_eq(&self, other: &HostPackage) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HostPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "package {}", self.0.name)
    }
}
