//! Test Cases
//!
//! The slice of a test that benchmarking needs: who it is, its fixtures, its
//! scope and a way to invoke its body. Hosts implement [`TestCase`] for
//! whatever they run; [`RegisteredCase`] adapts a [`TestDef`] registered with
//! `#[hookbench::case]`.

use crate::scope::{Args, Scope};
use crate::{BenchmarkSpec, TestDef};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Identity of a test case: optional enclosing suite, function name, file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TestIdentity {
    /// Enclosing type / suite name
    pub suite: Option<String>,
    /// Test function name
    pub name: String,
    /// Source file
    pub file: PathBuf,
}

impl TestIdentity {
    /// Identity of a free test function
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            suite: None,
            name: name.into(),
            file: file.into(),
        }
    }

    /// Builder: set the enclosing suite
    pub fn with_suite(mut self, suite: impl Into<String>) -> Self {
        self.suite = Some(suite.into());
        self
    }

    /// `Suite.name`, or just `name` without a suite
    pub fn qualified_name(&self) -> String {
        match &self.suite {
            Some(suite) => format!("{}.{}", suite, self.name),
            None => self.name.clone(),
        }
    }

    /// File path relative to the working directory when it lies below it
    pub fn display_file(&self) -> String {
        let relative = std::env::current_dir()
            .ok()
            .and_then(|cwd| self.file.strip_prefix(&cwd).ok().map(Path::to_path_buf));
        relative.unwrap_or_else(|| self.file.clone()).display().to_string()
    }
}

/// A test case as seen by the iteration driver and the controller
pub trait TestCase {
    /// Who this test is
    fn identity(&self) -> &TestIdentity;

    /// Names visible to the body, including the benchmark target
    fn scope(&self) -> &Scope;

    /// Arguments the body is invoked with
    fn args(&self) -> &Args;

    /// Per-iteration fixture setup
    fn set_up(&mut self) -> anyhow::Result<()>;

    /// Per-iteration fixture teardown
    fn tear_down(&mut self) -> anyhow::Result<()>;

    /// Invoke the test body once
    fn call(&mut self, args: &Args) -> anyhow::Result<()>;
}

/// [`TestCase`] built from a registered [`TestDef`]
pub struct RegisteredCase {
    def: &'static TestDef,
    identity: TestIdentity,
    scope: Scope,
    args: Args,
}

impl RegisteredCase {
    /// Instantiate the definition, building a fresh scope
    pub fn new(def: &'static TestDef) -> Self {
        let mut identity = TestIdentity::new(def.name, def.file);
        if let Some(suite) = def.suite {
            identity = identity.with_suite(suite);
        }

        Self {
            def,
            identity,
            scope: (def.scope_fn)(),
            args: Args::new(),
        }
    }

    /// Builder: invoke the body with these arguments
    pub fn with_args(mut self, args: Args) -> Self {
        self.args = args;
        self
    }

    /// Underlying registration
    pub fn def(&self) -> &'static TestDef {
        self.def
    }

    /// Benchmark request carried by the definition, if any
    pub fn spec(&self, default_iterations: u64) -> Option<Result<BenchmarkSpec, crate::BenchError>> {
        self.def.spec(default_iterations)
    }
}

impl TestCase for RegisteredCase {
    fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn args(&self) -> &Args {
        &self.args
    }

    fn set_up(&mut self) -> anyhow::Result<()> {
        match self.def.setup_fn {
            Some(setup) => setup(&self.scope),
            None => Ok(()),
        }
    }

    fn tear_down(&mut self) -> anyhow::Result<()> {
        match self.def.teardown_fn {
            Some(teardown) => teardown(&self.scope),
            None => Ok(()),
        }
    }

    fn call(&mut self, args: &Args) -> anyhow::Result<()> {
        (self.def.body_fn)(&self.scope, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BenchMarker;
    use crate::scope::{Callable, Object};
    use serde_json::{Value, json};

    fn counter_scope() -> Scope {
        Scope::new().with_global("state", Object::namespace("state").with("count", json!(0)))
    }

    fn bump(scope: &Scope) -> anyhow::Result<()> {
        let Ok(crate::scope::Member::Object(state)) = scope.resolve("state") else {
            anyhow::bail!("state missing");
        };
        let count = match state.own_member("count") {
            Some(crate::scope::Member::Value(v)) => v.as_i64().unwrap_or(0),
            _ => 0,
        };
        state.set_member("count", json!(count + 1))?;
        Ok(())
    }

    fn body(scope: &Scope, _args: &Args) -> anyhow::Result<()> {
        scope.call("state_check", &Args::new()).map(|_| ())
    }

    fn checked_scope() -> Scope {
        counter_scope().with_global("state_check", Callable::new(|_| Ok(Value::Null)))
    }

    static DEF: TestDef = TestDef {
        name: "test_checked",
        suite: Some("CheckedTests"),
        file: "tests/checked.rs",
        line: 7,
        module_path: "checked",
        bench: Some(BenchMarker {
            target: "state_check",
            iterations: Some(3),
        }),
        scope_fn: checked_scope,
        setup_fn: Some(bump),
        teardown_fn: None,
        body_fn: body,
    };

    #[test]
    fn test_qualified_name() {
        let plain = TestIdentity::new("test_add", "tests/calc.rs");
        assert_eq!(plain.qualified_name(), "test_add");

        let nested = plain.with_suite("CalcTests");
        assert_eq!(nested.qualified_name(), "CalcTests.test_add");
    }

    #[test]
    fn test_display_file_relative_to_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let identity = TestIdentity::new("t", cwd.join("tests").join("calc.rs"));
        assert_eq!(
            identity.display_file(),
            Path::new("tests").join("calc.rs").display().to_string()
        );

        let outside = TestIdentity::new("t", "relative/calc.rs");
        assert_eq!(outside.display_file(), "relative/calc.rs");
    }

    #[test]
    fn test_registered_case_runs_fixtures() {
        let mut case = RegisteredCase::new(&DEF);
        assert_eq!(case.identity().qualified_name(), "CheckedTests.test_checked");

        case.set_up().unwrap();
        case.set_up().unwrap();
        case.tear_down().unwrap();
        let args = case.args().clone();
        case.call(&args).unwrap();

        let Ok(crate::scope::Member::Object(state)) = case.scope().resolve("state") else {
            panic!("state missing");
        };
        assert!(matches!(state.own_member("count"), Some(crate::scope::Member::Value(v)) if v == json!(2)));
    }

    #[test]
    fn test_registered_case_spec() {
        let case = RegisteredCase::new(&DEF);
        let spec = case.spec(100).unwrap().unwrap();
        assert_eq!(spec.target(), "state_check");
        assert_eq!(spec.iterations(), 3);
    }
}
