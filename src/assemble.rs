//! Bundle assembly: processed files → one self-contained HTML document.
//!
//! By the time files reach this stage every component file has already been
//! transpiled to plain-script form; the assembler only ever sees markup,
//! style, and plain-script entries (everything else is ignored).
//!
//! Two cases:
//! - **existing markup**: the author's document is respected — assets are
//!   injected at the `</head>` / `</body>` anchors and the mount snippet is
//!   guarded, since the markup may carry its own rendering logic;
//! - **no markup**: a full minimal document is synthesized and the
//!   assembler owns rendering outright, mounting unconditionally.
//!
//! `compose` is a pure function of its input map: same map (including
//! iteration order) → byte-identical output.

use lazy_static::lazy_static;
use regex::Regex;

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::files::{classify, FileClass, FileMap};

/// Conventional markup entry names, in lookup priority order.
pub const MARKUP_NAMES: [&str; 2] = ["index.html", "app.html"];

/// Id of the element the mount snippet renders into.
pub const MOUNT_ID: &str = "root";

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";
const REACT_CDN: &str = "https://unpkg.com/react@18/umd/react.development.js";
const REACT_DOM_CDN: &str = "https://unpkg.com/react-dom@18/umd/react-dom.development.js";

lazy_static! {
    /// Script tags that still source a component-extension file. The
    /// generated markup sometimes references `App.jsx` directly; those tags
    /// would 404 (or load un-transpiled source) and must not survive.
    static ref JSX_SCRIPT_TAG_RE: Regex =
        Regex::new(r#"<script\s+src=['"][^'"]*\.jsx['"][^>]*></script>"#).unwrap();
}

/// Compose the processed file mapping into one HTML document.
pub fn compose(files: &FileMap) -> String {
    // An empty markup entry counts as absent: there is nothing to inject
    // into, so the synthesized shell takes over.
    let markup = MARKUP_NAMES
        .iter()
        .filter_map(|name| files.get(name))
        .find(|content| !content.is_empty())
        .map(|content| content.to_string());

    let styles = concat_blocks(files, FileClass::Style, "<style>", "</style>");
    let scripts = concat_blocks(files, FileClass::PlainScript, "<script>", "</script>");

    match markup {
        Some(html) => compose_into_markup(html, &styles, &scripts),
        None => synthesize_document(&styles, &scripts),
    }
}

/// Wrap every file of `class_wanted` in the given tag, in map order.
fn concat_blocks(files: &FileMap, class_wanted: FileClass, open: &str, close: &str) -> String {
    files
        .iter()
        .filter(|(name, _)| classify(name) == class_wanted)
        .map(|(_, content)| format!("{}{}{}", open, content, close))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Case A — the project brought its own document shell.
fn compose_into_markup(mut html: String, styles: &str, scripts: &str) -> String {
    if !html.contains("tailwindcss") {
        inject_before(&mut html, "</head>", &format!("<script src=\"{}\"></script>\n", TAILWIND_CDN));
    }

    html = JSX_SCRIPT_TAG_RE.replace_all(&html, "").into_owned();

    if !styles.is_empty() {
        inject_before(&mut html, "</head>", &format!("{}\n", styles));
    }

    let mut body_injection = String::new();
    if !scripts.is_empty() {
        body_injection.push_str(scripts);
        body_injection.push('\n');
    }
    body_injection.push_str(&guarded_mount_snippet());
    body_injection.push('\n');
    inject_before(&mut html, "</body>", &body_injection);

    html
}

/// Case B — no markup file: synthesize the whole document.
fn synthesize_document(styles: &str, scripts: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <script src="{tailwind}"></script>
    {styles}
  </head>
  <body>
    <div id="{mount_id}"></div>
    <script src="{react}"></script>
    <script src="{react_dom}"></script>
    {scripts}
    <script defer>
      const root = ReactDOM.createRoot(document.getElementById('{mount_id}'));
      root.render(React.createElement(App));
    </script>
  </body>
</html>
"#,
        tailwind = TAILWIND_CDN,
        react = REACT_CDN,
        react_dom = REACT_DOM_CDN,
        mount_id = MOUNT_ID,
        styles = styles,
        scripts = scripts,
    )
}

/// Mount snippet for Case A. Guarded: the author's markup may already
/// render itself, so mounting is opt-in on a published global `App`.
fn guarded_mount_snippet() -> String {
    format!(
        r#"<script>
  if (typeof App !== 'undefined') {{
    const root = ReactDOM.createRoot(document.getElementById('{mount_id}'));
    root.render(React.createElement(App));
  }}
</script>"#,
        mount_id = MOUNT_ID,
    )
}

/// Insert `content` immediately before the first occurrence of `anchor`.
/// Missing anchors degrade to a silent no-op.
fn inject_before(html: &mut String, anchor: &str, content: &str) {
    if let Some(pos) = html.find(anchor) {
        html.insert_str(pos, content);
    }
}

#[cfg(feature = "napi")]
#[napi]
pub fn compose_bundle_native(files_json: String) -> napi::Result<String> {
    let files: FileMap = serde_json::from_str(&files_json)
        .map_err(|e| napi::Error::from_reason(format!("Files parse error: {}", e)))?;
    Ok(compose(&files))
}
