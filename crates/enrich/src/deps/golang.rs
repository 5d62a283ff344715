//! Go import scanning.
//!
//! Handles both single imports and parenthesized import blocks:
//!
//! ```go
//! import "os"
//! import (
//!     "fmt"
//!     alias "net/http"
//! )
//! ```

/// Extract imported packages from Go source.
pub fn parse(contents: &str) -> Vec<String> {
    let mut dependencies = Vec::new();
    let mut in_block = false;

    for line in contents.lines() {
        let line = line.trim();

        if in_block {
            if line.starts_with(')') {
                in_block = false;
                continue;
            }
            if let Some(import) = quoted_value(line) {
                dependencies.push(import);
            }
            continue;
        }

        let Some(rest) = line.strip_prefix("import") else {
            continue;
        };
        let rest = rest.trim_start();

        if rest.starts_with('(') {
            in_block = true;
            // imports may follow on the same line as the paren
            if let Some(import) = quoted_value(rest) {
                dependencies.push(import);
            }
        } else if let Some(import) = quoted_value(rest) {
            dependencies.push(import);
        }
    }

    dependencies
}

/// The first double-quoted string on a line, if any.
fn quoted_value(line: &str) -> Option<String> {
    let start = line.find('"')?;
    let rest = &line[start + 1..];
    let end = rest.find('"')?;
    let value = rest[..end].trim();

    (!value.is_empty()).then(|| value.to_string())
}
