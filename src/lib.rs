//! # Preview Pipeline Ground Truth
//!
//! Turns model-generated web component files (escaped text, arbitrary and
//! untrusted) into one self-contained HTML document for a sandboxed preview
//! surface, with no server-side build toolchain at render time.
//!
//! ## Pipeline Invariants
//!
//! 1. **Escape ordering**: decode expands `\\` LAST, encode escapes `\`
//!    FIRST. Decode is idempotent; unrecognized sequences pass through.
//!
//! 2. **Classification**: filename suffix is the only source of truth
//!    (`.html` / `.css` / `.jsx` / `.js`), case-sensitive, no content
//!    sniffing, one classifier shared by pipeline and assembler.
//!
//! 3. **One compiler initialization**: the engine configuration is a
//!    process-wide memoized future. Concurrent transpiles share a single
//!    initialization attempt; a failure is permanent for the process.
//!
//! 4. **Module-free output**: transpiled scripts carry no import of the
//!    runtime modules and no export wrappers — the execution target is a
//!    bare script tag with React/ReactDOM as pre-existing globals.
//!
//! 5. **Auto-mount contract**: a transpiled file defining `function App(`
//!    publishes `window.App`; the assembler mounts it into `#root` —
//!    guarded when the project ships its own markup, unconditional when
//!    the document is synthesized.
//!
//! 6. **Atomic runs**: a parse failure in any file aborts the whole run.
//!    No partial document, no partial raw-file mapping.
//!
//! 7. **Pure assembly**: `compose` is a function of the processed mapping
//!    only; identical maps produce byte-identical documents.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod assemble;
mod engine;
mod escape;
mod files;
mod pipeline;
mod preview;
mod transpile;

pub use assemble::{compose, MARKUP_NAMES, MOUNT_ID};
pub use engine::{compiler_config, CompilerConfig, CompilerInitError};
pub use escape::{escape_literal, unescape_literal};
pub use files::{classify, transpiled_name, FileClass, FileMap};
pub use pipeline::{project_from_json, run, PipelineError, PipelineOutput};
pub use preview::{BundleHost, PreviewSlot};
pub use transpile::{transpile, TranspileError};

#[cfg(feature = "napi")]
pub use assemble::compose_bundle_native;
#[cfg(feature = "napi")]
pub use escape::{escape_literal_native, unescape_literal_native};
#[cfg(feature = "napi")]
pub use pipeline::run_pipeline_native;
#[cfg(feature = "napi")]
pub use transpile::transpile_jsx_native;

#[cfg(feature = "napi")]
#[napi]
pub fn compile_bridge() -> String {
    "Preview Native Bridge Connected".to_string()
}

#[cfg(test)]
mod pipeline_tests;
