//! One-time initialization of the transpilation engine configuration.
//!
//! The original pipeline guarded its compiler setup with a bare module-scope
//! boolean, which races under concurrent generate calls. Here the state is a
//! process-wide memoized future: concurrent callers share exactly one
//! initialization attempt and all observe the same outcome. A failed
//! initialization is permanent for the process lifetime — there is no retry
//! and no teardown.

use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};
use tokio::sync::OnceCell;

/// Element factory invocation target for lowered JSX.
pub const FACTORY: &str = "React.createElement";

/// Factory argument used for JSX fragments.
pub const FRAGMENT: &str = "React.Fragment";

/// Module sources whose imports must not survive transpilation; the
/// execution target provides the corresponding globals instead.
pub const STRIPPED_SOURCES: [&str; 2] = ["react", "react-dom"];

/// Global bindings the assembled document guarantees at runtime. Default
/// imports binding one of these names are stripped regardless of source.
pub const RUNTIME_GLOBALS: [&str; 2] = ["React", "ReactDOM"];

/// Frozen, read-only engine configuration shared by all transpile calls.
#[derive(Debug, Clone)]
pub struct CompilerConfig {
    pub factory: &'static str,
    pub fragment: &'static str,
    pub stripped_sources: &'static [&'static str],
    pub runtime_globals: &'static [&'static str],
}

impl CompilerConfig {
    /// The factory path split into identifier segments
    /// (`React.createElement` → `["React", "createElement"]`).
    pub fn factory_path(&self) -> Vec<&'static str> {
        self.factory.split('.').collect()
    }

    /// The fragment path split into identifier segments.
    pub fn fragment_path(&self) -> Vec<&'static str> {
        self.fragment.split('.').collect()
    }
}

/// The engine failed to initialize. Fatal for every subsequent transpile
/// call in this process.
#[derive(Debug, Clone)]
pub struct CompilerInitError {
    pub message: String,
}

impl std::fmt::Display for CompilerInitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Compiler initialization failed: {}", self.message)
    }
}

impl std::error::Error for CompilerInitError {}

// The cell stores the outcome, not just the success: once initialization
// fails, every later caller observes the same error instead of retrying.
static COMPILER: OnceCell<Result<CompilerConfig, CompilerInitError>> = OnceCell::const_new();

/// Obtain the shared engine configuration, initializing it on first call.
///
/// Suspends while another caller is already initializing; never runs the
/// underlying initialization more than once.
pub async fn compiler_config() -> Result<&'static CompilerConfig, CompilerInitError> {
    COMPILER
        .get_or_init(|| async { initialize() })
        .await
        .as_ref()
        .map_err(Clone::clone)
}

fn initialize() -> Result<CompilerConfig, CompilerInitError> {
    let config = CompilerConfig {
        factory: FACTORY,
        fragment: FRAGMENT,
        stripped_sources: &STRIPPED_SOURCES,
        runtime_globals: &RUNTIME_GLOBALS,
    };

    // The factory and fragment targets are emitted verbatim into every
    // lowered call, so they must parse as plain expressions.
    validate_pragma(config.factory)?;
    validate_pragma(config.fragment)?;

    Ok(config)
}

fn validate_pragma(pragma: &str) -> Result<(), CompilerInitError> {
    let allocator = Allocator::default();
    let source_type = SourceType::default();
    // `parse_expression` stops at the first complete expression, so a
    // leading-valid string like `not a(...)` would pass a bare Ok check.
    // The pragma is only valid if the expression spans the whole input.
    match Parser::new(&allocator, pragma, source_type).parse_expression() {
        Ok(expression) if expression.span().end as usize == pragma.len() => Ok(()),
        Ok(expression) => Err(CompilerInitError {
            message: format!(
                "invalid factory pragma `{}`: trailing input after byte {}",
                pragma,
                expression.span().end
            ),
        }),
        Err(error) => Err(CompilerInitError {
            message: format!("invalid factory pragma `{}`: {:?}", pragma, error),
        }),
    }
}
