//! End-to-end pipeline tests: escaped model output in, document out.

use pretty_assertions::assert_eq;

use crate::{run, FileMap, PipelineError};

const ESCAPED_APP: &str = "import React from 'react';\\nfunction App() {\\n  return <div className=\\\"card\\\">Hello</div>;\\n}";

fn project(entries: &[(&str, &str)]) -> FileMap {
    entries.iter().copied().collect()
}

#[tokio::test]
async fn full_run_with_markup() {
    let files = project(&[
        ("index.html", "<html><head></head><body></body></html>"),
        ("App.jsx", ESCAPED_APP),
        ("styles.css", ".card {\\n  color: red;\\n}"),
    ]);

    let output = run(&files).await.unwrap();

    // Raw mapping: decoded text under the original names, order preserved.
    let names: Vec<&str> = output.raw_files.iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["index.html", "App.jsx", "styles.css"]);
    let raw_app = output.raw_files.get("App.jsx").unwrap();
    assert!(raw_app.contains("import React from 'react';"));
    assert!(raw_app.contains("className=\"card\""));
    assert!(!raw_app.contains("\\n"));

    // Document: transpiled script, not the raw component source.
    assert!(output.document.contains("React.createElement("));
    assert!(output.document.contains("window.App = App;"));
    assert!(!output.document.contains("import React"));
    // Markup case: guarded mount and decoded style block.
    assert!(output.document.contains("typeof App !== 'undefined'"));
    assert!(output.document.contains("<style>.card {\n  color: red;\n}</style>"));
}

#[tokio::test]
async fn full_run_without_markup_synthesizes_document() {
    let files = project(&[("App.jsx", ESCAPED_APP)]);
    let output = run(&files).await.unwrap();

    assert!(output.document.contains("<!DOCTYPE html>"));
    assert!(output.document.contains("react.development.js"));
    assert!(output.document.contains("react-dom.development.js"));
    assert!(output.document.contains("root.render(React.createElement(App));"));
    // Unconditional mount in the synthesized case.
    assert!(!output.document.contains("typeof App"));
}

#[tokio::test]
async fn transpile_failure_aborts_the_whole_run() {
    let files = project(&[
        ("good.js", "let ok = 1;"),
        ("Broken.jsx", "function App( { return <div>; }"),
        ("later.css", ".x{}"),
    ]);

    let err = run(&files).await.unwrap_err();
    let PipelineError::Transpile { file, .. } = err;
    assert_eq!(file, "Broken.jsx");
    // `run` returned Err: the caller holds no document and no mapping,
    // including for files processed before the failure.
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    let files = project(&[("App.jsx", ESCAPED_APP), ("styles.css", "body {}")]);
    let first = run(&files).await.unwrap();
    let second = run(&files).await.unwrap();
    assert_eq!(first.document, second.document);
    assert_eq!(first.raw_files, second.raw_files);
}

#[tokio::test]
async fn unclassified_files_reach_raw_but_not_the_document() {
    let files = project(&[
        ("notes.md", "# remember\\nthis"),
        ("App.jsx", ESCAPED_APP),
    ]);
    let output = run(&files).await.unwrap();
    assert_eq!(output.raw_files.get("notes.md"), Some("# remember\nthis"));
    assert!(!output.document.contains("remember"));
}

#[tokio::test]
async fn plain_scripts_get_second_decode_pass() {
    // Upstream sometimes double-escapes non-component files; the second
    // decode pass is a no-op on clean input and repairs this case.
    let files = project(&[("util.js", "const s = 'a';\\nconst t = 'b';")]);
    let output = run(&files).await.unwrap();
    assert!(output.document.contains("const s = 'a';\nconst t = 'b';"));
}

#[tokio::test]
async fn concurrent_runs_share_the_engine() {
    let files = project(&[("App.jsx", ESCAPED_APP)]);
    let (a, b) = tokio::join!(run(&files), run(&files));
    assert_eq!(a.unwrap().document, b.unwrap().document);
}
