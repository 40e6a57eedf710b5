//! TypeScript → JavaScript transpilation with oxc.
//!
//! The transpiler is loaded once in the background and then shared. Until
//! the load finishes every caller sees [`LoadState::Loading`] and has to
//! handle it; there is no nullable handle to forget to check.
//!
//! Compilation only strips types and lowers syntax. Type errors are not
//! reported, so `let n: number = "x"` compiles fine.

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use oxc::allocator::Allocator;
use oxc::codegen::Codegen;
use oxc::diagnostics::OxcDiagnostic;
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{JsxRuntime, TransformOptions, Transformer};

use super::error::TranspileError;

/// Virtual file name handed to the transformer.
const SNIPPET_PATH: &str = "snippet.tsx";

/// Snippet compiled once during load so the first real run is not the
/// first time the pipeline executes.
const WARMUP_SOURCE: &str = "const ready: boolean = true;";

/// Default output target.
pub const DEFAULT_TARGET: &str = "es2017";

/// Loaded transpiler.
pub struct TypeScript {
    target: String,
    options: TransformOptions,
}

impl std::fmt::Debug for TypeScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeScript")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl TypeScript {
    /// Build a transpiler for `target` (e.g. `es2017`, `es2020`, `esnext`).
    pub fn new(target: &str) -> Result<Self, String> {
        let mut options = TransformOptions::from_target(target)?;
        options.jsx.runtime = JsxRuntime::Automatic;
        Ok(Self {
            target: target.to_string(),
            options,
        })
    }

    /// Transpile `source` to plain script.
    pub fn compile(&self, source: &str) -> Result<String, TranspileError> {
        let allocator = Allocator::default();
        let source_type = SourceType::tsx();

        let ret = Parser::new(&allocator, source, source_type).parse();
        if !ret.errors.is_empty() {
            return Err(TranspileError::Syntax(join_diagnostics(&ret.errors)));
        }
        let mut program = ret.program;

        let ret = SemanticBuilder::new()
            .with_check_syntax_error(true)
            .build(&program);
        if !ret.errors.is_empty() {
            return Err(TranspileError::Syntax(join_diagnostics(&ret.errors)));
        }
        let scoping = ret.semantic.into_scoping();

        let ret = Transformer::new(&allocator, Path::new(SNIPPET_PATH), &self.options)
            .build_with_scoping(scoping, &mut program);
        if !ret.errors.is_empty() {
            return Err(TranspileError::Syntax(join_diagnostics(&ret.errors)));
        }

        Ok(Codegen::new().build(&program).code)
    }
}

fn join_diagnostics(errors: &[OxcDiagnostic]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load state of the shared transpiler.
#[derive(Debug, Clone)]
pub enum LoadState {
    NotStarted,
    Loading,
    Ready(Arc<TypeScript>),
    Failed(String),
}

impl LoadState {
    /// Short name for status reporting.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::Loading => "loading",
            Self::Ready(_) => "ready",
            Self::Failed(_) => "failed",
        }
    }
}

/// Shared handle to the (possibly still loading) transpiler.
#[derive(Clone)]
pub struct Transpiler {
    state: Arc<ArcSwap<LoadState>>,
}

impl Transpiler {
    /// A transpiler whose load never started.
    pub fn not_started() -> Self {
        Self {
            state: Arc::new(ArcSwap::from_pointee(LoadState::NotStarted)),
        }
    }

    /// Start loading on a background thread and return immediately.
    pub fn spawn(target: &str) -> Self {
        let transpiler = Self::not_started();
        transpiler.state.store(Arc::new(LoadState::Loading));

        let state = Arc::clone(&transpiler.state);
        let target = target.to_string();
        std::thread::spawn(move || {
            let loaded = load(&target);
            match &loaded {
                LoadState::Ready(_) => {
                    crate::debug!("lab"; "typescript ready (target {})", target);
                }
                LoadState::Failed(reason) => {
                    crate::log!("lab"; "typescript unavailable: {}", reason);
                }
                _ => {}
            }
            state.store(Arc::new(loaded));
        });

        transpiler
    }

    /// Load synchronously on the calling thread.
    pub fn load_blocking(target: &str) -> Self {
        Self {
            state: Arc::new(ArcSwap::from_pointee(load(target))),
        }
    }

    pub fn state(&self) -> LoadState {
        LoadState::clone(&self.state.load())
    }

    pub fn is_ready(&self) -> bool {
        matches!(**self.state.load(), LoadState::Ready(_))
    }

    /// Transpile `source`, refusing while the load is incomplete.
    pub fn compile(&self, source: &str) -> Result<String, TranspileError> {
        match &**self.state.load() {
            LoadState::Ready(ts) => ts.compile(source),
            LoadState::Failed(reason) => Err(TranspileError::Unavailable(reason.clone())),
            LoadState::NotStarted | LoadState::Loading => Err(TranspileError::NotReady),
        }
    }

    /// Block until the load leaves `Loading`.
    #[cfg(test)]
    pub fn wait(&self) -> LoadState {
        loop {
            let state = self.state();
            if !matches!(state, LoadState::Loading) {
                return state;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }
}

fn load(target: &str) -> LoadState {
    let ts = match TypeScript::new(target) {
        Ok(ts) => ts,
        Err(reason) => return LoadState::Failed(reason),
    };
    match ts.compile(WARMUP_SOURCE) {
        Ok(_) => LoadState::Ready(Arc::new(ts)),
        Err(err) => LoadState::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> Transpiler {
        let t = Transpiler::load_blocking(DEFAULT_TARGET);
        assert!(t.is_ready(), "state: {:?}", t.state());
        t
    }

    #[test]
    fn test_strips_types() {
        let js = ready()
            .compile("const n: number = 1;\nconsole.log(n as number);")
            .unwrap();
        assert!(js.contains("console.log"));
        assert!(!js.contains(": number"));
        assert!(!js.contains(" as number"));
    }

    #[test]
    fn test_type_violation_still_compiles() {
        let js = ready().compile("let n: number = \"text\";\nconsole.log(n);").unwrap();
        assert!(js.contains("\"text\""));
    }

    #[test]
    fn test_interface_and_alias_erased() {
        let js = ready()
            .compile(concat!(
                "interface P { x: number }\n",
                "type Mood = \"a\" | \"b\";\n",
                "const p: P = { x: 1 };",
            ))
            .unwrap();
        assert!(!js.contains("interface"));
        assert!(!js.contains("Mood"));
        assert!(js.contains("x: 1"));
    }

    #[test]
    fn test_jsx_accepted() {
        let result = ready().compile("const el = <div className=\"a\">hi</div>;");
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn test_unmatched_brace_fails_with_message() {
        let err = ready().compile("function broken() {\n  console.log(1);\n").unwrap_err();
        match err {
            TranspileError::Syntax(msg) => assert!(!msg.is_empty()),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_not_started_rejects() {
        let t = Transpiler::not_started();
        assert!(!t.is_ready());
        assert_eq!(t.compile("let a = 1;"), Err(TranspileError::NotReady));
    }

    #[test]
    fn test_unknown_target_fails_load() {
        let t = Transpiler::load_blocking("es1999");
        assert!(matches!(t.state(), LoadState::Failed(_)));
        assert!(matches!(t.compile("1"), Err(TranspileError::Unavailable(_))));
    }

    #[test]
    fn test_spawn_becomes_ready() {
        let t = Transpiler::spawn(DEFAULT_TARGET);
        assert!(matches!(t.wait(), LoadState::Ready(_)));
        assert!(t.is_ready());
    }
}
