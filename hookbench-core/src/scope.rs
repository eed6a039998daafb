//! Execution Scope
//!
//! The names a test body can reach, modelled as a registry of objects rather
//! than ambient variables. A test never holds a direct reference to the code
//! it wants measured; it calls through the scope by dotted path:
//!
//! ```text
//! Scope ── locals ──┬── "calc"  → Object(instance of Calculator)
//!       │           └── "input" → Value
//!       └── globals ─── "math"  → Object(namespace) ── "sqrt" → Callable
//!
//! Object(instance) ──parent──▶ Object(type "Calculator") ── "add" → Callable
//! ```
//!
//! Because every call goes through a name lookup, swapping one registry entry
//! is enough to redirect all callers. Lookups on an instance fall back to its
//! type, and report the type as the owner of the attribute found there.

use crate::error::BenchError;
use fxhash::FxHashMap;
use serde_json::Value;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

// ─── Arguments ───────────────────────────────────────────────────────────────

/// Positional and keyword arguments passed to a callable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    /// Positional arguments in call order
    pub positional: Vec<Value>,
    /// Keyword arguments
    pub keywords: serde_json::Map<String, Value>,
}

impl Args {
    /// No arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from positional values
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        Self {
            positional: values.into_iter().collect(),
            keywords: serde_json::Map::new(),
        }
    }

    /// Add a keyword argument
    pub fn with_keyword(mut self, name: impl Into<String>, value: Value) -> Self {
        self.keywords.insert(name.into(), value);
        self
    }

    /// Positional argument at `index`
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Keyword argument by name
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords.get(name)
    }

    /// Positional argument at `index` as a number
    pub fn f64(&self, index: usize) -> anyhow::Result<f64> {
        self.get(index)
            .and_then(Value::as_f64)
            .ok_or_else(|| anyhow::anyhow!("argument {} is missing or not a number", index))
    }
}

// ─── Callable ────────────────────────────────────────────────────────────────

type CallFn = dyn Fn(&Args) -> anyhow::Result<Value>;

/// Shared handle to a function stored in the scope.
///
/// Cloning shares the same function; identity is compared with [`Callable::ptr_eq`].
#[derive(Clone)]
pub struct Callable {
    func: Rc<CallFn>,
}

impl Callable {
    /// Wrap a closure
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<Value> + 'static,
    {
        Self {
            func: Rc::new(func),
        }
    }

    /// Invoke with the given arguments
    #[inline]
    pub fn call(&self, args: &Args) -> anyhow::Result<Value> {
        (self.func)(args)
    }

    /// Whether both handles share the same function
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({:p})", Rc::as_ptr(&self.func) as *const ())
    }
}

// ─── Members ─────────────────────────────────────────────────────────────────

/// A named attribute inside an object
#[derive(Debug, Clone)]
pub enum Member {
    /// Something that can be invoked
    Callable(Callable),
    /// A nested object
    Object(Object),
    /// Plain data
    Value(Value),
}

impl Member {
    /// Short description used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Member::Callable(_) => "callable",
            Member::Object(_) => "object",
            Member::Value(_) => "value",
        }
    }
}

impl From<Callable> for Member {
    fn from(callable: Callable) -> Self {
        Member::Callable(callable)
    }
}

impl From<Object> for Member {
    fn from(object: Object) -> Self {
        Member::Object(object)
    }
}

impl From<Value> for Member {
    fn from(value: Value) -> Self {
        Member::Value(value)
    }
}

/// Result of a member lookup: the member and the object that actually holds it
#[derive(Debug, Clone)]
pub struct Lookup {
    /// The member found
    pub member: Member,
    /// Object whose own attribute table contains the member
    pub owner: Object,
}

/// Errors from mutating an object
#[derive(Debug, Error)]
pub enum MemberError {
    /// The object refuses mutation
    #[error("object '{0}' is sealed")]
    Sealed(String),
}

/// Typed member access used by path resolution
pub trait Members {
    /// Look up `name`, following parent links when it is not an own attribute
    fn get_member(&self, name: &str) -> Option<Lookup>;
}

// ─── Object ──────────────────────────────────────────────────────────────────

/// What an object represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Plain namespace (module, locals, globals)
    Namespace,
    /// A type whose attributes are shared by its instances
    Type,
    /// An instance; lookups fall back to its type
    Instance,
}

struct ObjectData {
    name: String,
    kind: ObjectKind,
    parent: Option<Object>,
    sealed: bool,
    members: FxHashMap<String, Member>,
}

/// Shared, mutable attribute table
#[derive(Clone)]
pub struct Object {
    inner: Rc<RefCell<ObjectData>>,
}

impl Object {
    fn with_kind(name: impl Into<String>, kind: ObjectKind, parent: Option<Object>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObjectData {
                name: name.into(),
                kind,
                parent,
                sealed: false,
                members: FxHashMap::default(),
            })),
        }
    }

    /// Create an empty namespace
    pub fn namespace(name: impl Into<String>) -> Self {
        Self::with_kind(name, ObjectKind::Namespace, None)
    }

    /// Create a type
    pub fn class(name: impl Into<String>) -> Self {
        Self::with_kind(name, ObjectKind::Type, None)
    }

    /// Create a type that inherits attributes from `base`
    pub fn subclass(name: impl Into<String>, base: &Object) -> Self {
        Self::with_kind(name, ObjectKind::Type, Some(base.clone()))
    }

    /// Create an instance of `class`
    pub fn instance_of(class: &Object) -> Self {
        let name = format!("{} instance", class.name());
        Self::with_kind(name, ObjectKind::Instance, Some(class.clone()))
    }

    /// Builder: add an attribute
    pub fn with(self, name: impl Into<String>, member: impl Into<Member>) -> Self {
        self.inner
            .borrow_mut()
            .members
            .insert(name.into(), member.into());
        self
    }

    /// Builder: add a function attribute
    pub fn with_fn<F>(self, name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&Args) -> anyhow::Result<Value> + 'static,
    {
        self.with(name, Callable::new(func))
    }

    /// Object name
    pub fn name(&self) -> String {
        self.inner.borrow().name.clone()
    }

    /// Object kind
    pub fn kind(&self) -> ObjectKind {
        self.inner.borrow().kind
    }

    /// Type of an instance, or base of a type
    pub fn parent(&self) -> Option<Object> {
        self.inner.borrow().parent.clone()
    }

    /// Whether both handles refer to the same object
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Attribute stored directly on this object (no parent fallback)
    pub fn own_member(&self, name: &str) -> Option<Member> {
        self.inner.borrow().members.get(name).cloned()
    }

    /// Whether `name` is stored directly on this object
    pub fn has_own_member(&self, name: &str) -> bool {
        self.inner.borrow().members.contains_key(name)
    }

    /// Store an attribute, returning the previous own value
    pub fn set_member(
        &self,
        name: impl Into<String>,
        member: impl Into<Member>,
    ) -> Result<Option<Member>, MemberError> {
        let mut data = self.inner.borrow_mut();
        if data.sealed {
            return Err(MemberError::Sealed(data.name.clone()));
        }
        Ok(data.members.insert(name.into(), member.into()))
    }

    /// Remove an own attribute
    pub fn remove_member(&self, name: &str) -> Result<Option<Member>, MemberError> {
        let mut data = self.inner.borrow_mut();
        if data.sealed {
            return Err(MemberError::Sealed(data.name.clone()));
        }
        Ok(data.members.remove(name))
    }

    /// Forbid further mutation
    pub fn seal(&self) {
        self.inner.borrow_mut().sealed = true;
    }

    /// Whether mutation is forbidden
    pub fn is_sealed(&self) -> bool {
        self.inner.borrow().sealed
    }
}

impl Members for Object {
    fn get_member(&self, name: &str) -> Option<Lookup> {
        if let Some(member) = self.own_member(name) {
            return Some(Lookup {
                member,
                owner: self.clone(),
            });
        }
        self.parent()?.get_member(name)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.inner.borrow();
        let mut names: Vec<&str> = data.members.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Object")
            .field("name", &data.name)
            .field("kind", &data.kind)
            .field("members", &names)
            .finish()
    }
}

// ─── Target path ─────────────────────────────────────────────────────────────

/// Dotted path naming a member of a scope, e.g. `calc.add` or `sqrt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    segments: Vec<String>,
}

impl Target {
    /// Split and validate a dotted path
    pub fn parse(path: &str) -> Result<Self, BenchError> {
        let segments: Vec<String> = path.trim().split('.').map(str::to_string).collect();

        if let Some(empty) = segments.iter().position(|s| s.trim().is_empty()) {
            return Err(BenchError::Resolution {
                target: path.to_string(),
                reason: format!("empty path segment at position {}", empty),
            });
        }

        Ok(Self { segments })
    }

    /// Path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Last segment, the attribute that gets replaced
    pub fn attribute(&self) -> &str {
        // parse() never produces an empty segment list
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// First `len` segments joined back together
    fn prefix(&self, len: usize) -> String {
        self.segments[..len].join(".")
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// A resolved attribute location
#[derive(Debug, Clone)]
pub struct Slot {
    /// Object holding the attribute
    pub owner: Object,
    /// Attribute name on `owner`
    pub attribute: String,
    /// Current value of the attribute
    pub member: Member,
}

// ─── Scope ───────────────────────────────────────────────────────────────────

/// Names visible to a test body: bound locals first, then globals
#[derive(Debug, Clone)]
pub struct Scope {
    locals: Object,
    globals: Object,
}

impl Scope {
    /// Empty scope
    pub fn new() -> Self {
        Self {
            locals: Object::namespace("locals"),
            globals: Object::namespace("globals"),
        }
    }

    /// Scope sharing an existing globals namespace
    pub fn with_globals(globals: Object) -> Self {
        Self {
            locals: Object::namespace("locals"),
            globals,
        }
    }

    /// Builder: bind a local name
    pub fn with_local(self, name: impl Into<String>, member: impl Into<Member>) -> Self {
        self.locals
            .inner
            .borrow_mut()
            .members
            .insert(name.into(), member.into());
        self
    }

    /// Builder: define a global name
    pub fn with_global(self, name: impl Into<String>, member: impl Into<Member>) -> Self {
        self.globals
            .inner
            .borrow_mut()
            .members
            .insert(name.into(), member.into());
        self
    }

    /// Local namespace
    pub fn locals(&self) -> &Object {
        &self.locals
    }

    /// Global namespace
    pub fn globals(&self) -> &Object {
        &self.globals
    }

    /// Walk a dotted path to the slot holding its last segment.
    ///
    /// All but the last segment must resolve to objects. Nothing is mutated.
    pub fn locate(&self, target: &Target) -> Result<Slot, BenchError> {
        let resolution = |reason: String| BenchError::Resolution {
            target: target.to_string(),
            reason,
        };

        let segments = target.segments();
        let mut container: Option<Object> = None;

        for (depth, segment) in segments.iter().enumerate() {
            let members: &dyn Members = match &container {
                Some(object) => object,
                None => self,
            };

            let lookup = members
                .get_member(segment)
                .ok_or_else(|| resolution(format!("'{}' not found", target.prefix(depth + 1))))?;

            if depth + 1 == segments.len() {
                return Ok(Slot {
                    owner: lookup.owner,
                    attribute: segment.clone(),
                    member: lookup.member,
                });
            }

            match lookup.member {
                Member::Object(object) => container = Some(object),
                other => {
                    return Err(resolution(format!(
                        "'{}' is a {}, not an object",
                        target.prefix(depth + 1),
                        other.kind_name()
                    )));
                }
            }
        }

        Err(resolution("empty path".to_string()))
    }

    /// Resolve a dotted path to its current member
    pub fn resolve(&self, path: &str) -> Result<Member, BenchError> {
        let target = Target::parse(path)?;
        Ok(self.locate(&target)?.member)
    }

    /// Call the callable currently registered under `path`
    pub fn call(&self, path: &str, args: &Args) -> anyhow::Result<Value> {
        match self.resolve(path)? {
            Member::Callable(callable) => callable.call(args),
            other => Err(anyhow::anyhow!(
                "'{}' is a {}, not a callable",
                path,
                other.kind_name()
            )),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Members for Scope {
    fn get_member(&self, name: &str) -> Option<Lookup> {
        self.locals
            .get_member(name)
            .or_else(|| self.globals.get_member(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn calculator_scope() -> (Scope, Object, Object) {
        let class = Object::class("Calculator")
            .with_fn("add", |args| Ok(json!(args.f64(0)? + args.f64(1)?)))
            .with("precision", json!(2));
        let calc = Object::instance_of(&class);
        let scope = Scope::new().with_local("calc", calc.clone());
        (scope, class, calc)
    }

    #[test]
    fn test_call_through_scope() {
        let (scope, _, _) = calculator_scope();
        let result = scope
            .call("calc.add", &Args::from_values([json!(2), json!(3)]))
            .unwrap();
        assert_eq!(result, json!(5.0));
    }

    #[test]
    fn test_locals_shadow_globals() {
        let scope = Scope::new()
            .with_global("x", json!("global"))
            .with_local("x", json!("local"));

        match scope.resolve("x").unwrap() {
            Member::Value(v) => assert_eq!(v, json!("local")),
            other => panic!("unexpected member {:?}", other),
        }
    }

    #[test]
    fn test_bare_name_resolves_in_globals() {
        let scope = Scope::new().with_global("sqrt", Callable::new(|_| Ok(json!(1.0))));
        let slot = scope.locate(&Target::parse("sqrt").unwrap()).unwrap();

        assert!(slot.owner.ptr_eq(scope.globals()));
        assert_eq!(slot.attribute, "sqrt");
    }

    #[test]
    fn test_method_lookup_reports_type_as_owner() {
        let (scope, class, calc) = calculator_scope();
        let slot = scope.locate(&Target::parse("calc.add").unwrap()).unwrap();

        assert!(slot.owner.ptr_eq(&class));
        assert!(!slot.owner.ptr_eq(&calc));
        assert!(!calc.has_own_member("add"));
    }

    #[test]
    fn test_inherited_lookup() {
        let base = Object::class("Base").with_fn("ping", |_| Ok(json!("pong")));
        let derived = Object::subclass("Derived", &base);
        let scope = Scope::new().with_local("obj", Object::instance_of(&derived));

        let slot = scope.locate(&Target::parse("obj.ping").unwrap()).unwrap();
        assert!(slot.owner.ptr_eq(&base));
    }

    #[test]
    fn test_missing_segment() {
        let (scope, _, _) = calculator_scope();
        let err = scope.resolve("calc.sub").unwrap_err();
        assert!(err.to_string().contains("'calc.sub' not found"));

        let err = scope.resolve("nothing.add").unwrap_err();
        assert!(err.to_string().contains("'nothing' not found"));
    }

    #[test]
    fn test_value_in_middle_of_path() {
        let (scope, _, _) = calculator_scope();
        let err = scope.resolve("calc.precision.digits").unwrap_err();
        assert!(err.to_string().contains("is a value, not an object"));
    }

    #[test]
    fn test_target_parse_rejects_empty_segments() {
        assert!(Target::parse("").is_err());
        assert!(Target::parse("calc..add").is_err());
        assert!(Target::parse(".add").is_err());
        assert_eq!(Target::parse(" calc.add ").unwrap().attribute(), "add");
    }

    #[test]
    fn test_sealed_object_rejects_writes() {
        let object = Object::namespace("frozen");
        object.seal();

        assert!(object.is_sealed());
        assert!(object.set_member("x", json!(1)).is_err());
        assert!(object.remove_member("x").is_err());
    }

    #[test]
    fn test_callable_identity() {
        let a = Callable::new(|_| Ok(Value::Null));
        let b = a.clone();
        let c = Callable::new(|_| Ok(Value::Null));

        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&c));
    }

    #[test]
    fn test_args_helpers() {
        let args = Args::from_values([json!(1.5), json!("x")]).with_keyword("scale", json!(2));

        assert_eq!(args.f64(0).unwrap(), 1.5);
        assert!(args.f64(1).is_err());
        assert!(args.f64(7).is_err());
        assert_eq!(args.keyword("scale"), Some(&json!(2)));
    }
}
