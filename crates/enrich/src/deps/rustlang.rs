//! Rust import scanning.

/// Extract referenced crates from Rust source.
///
/// `use` declarations and `extern crate` items both count; paths rooted in
/// `crate`, `self`, or `super` reference the current crate and are skipped.
pub fn parse(contents: &str) -> Vec<String> {
    let mut dependencies = Vec::new();

    for line in contents.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("use ") {
            push_crate(&mut dependencies, rest);
            continue;
        }

        if let Some(rest) = line.strip_prefix("pub use ") {
            push_crate(&mut dependencies, rest);
            continue;
        }

        if let Some(rest) = line.strip_prefix("extern crate ") {
            let name = rest
                .trim_end_matches(';')
                .split_whitespace()
                .next()
                .unwrap_or("");
            push_crate(&mut dependencies, name);
        }
    }

    dependencies
}

fn push_crate(dependencies: &mut Vec<String>, path: &str) {
    let root = path
        .trim_start_matches("::")
        .split("::")
        .next()
        .unwrap_or("")
        .trim_end_matches(';')
        .trim();

    if root.is_empty() || matches!(root, "crate" | "self" | "super") {
        return;
    }

    // `use {a, b}` style groups are rare at the root level; skip them
    if root.contains('{') || root.contains('}') {
        return;
    }

    dependencies.push(root.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_use_declarations() {
        let source = "use std::fmt;\nuse serde::Deserialize;\nuse crate::model;\n";
        assert_eq!(parse(source), vec!["std", "serde"]);
    }

    #[test]
    fn parses_extern_crate() {
        assert_eq!(parse("extern crate alloc;\n"), vec!["alloc"]);
    }

    #[test]
    fn skips_relative_paths() {
        assert!(parse("use self::inner;\nuse super::parent;\n").is_empty());
    }
}
