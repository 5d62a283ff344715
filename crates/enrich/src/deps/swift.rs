//! Swift import scanning.

/// Extract imported modules from Swift source.
///
/// Recognizes plain imports, attributed imports (`@testable import`), and
/// kind-qualified imports (`import struct Foo.Bar`, keeping the module).
pub fn parse(contents: &str) -> Vec<String> {
    let mut dependencies = Vec::new();

    for line in contents.lines() {
        let mut line = line.trim();

        // strip attributes such as @testable or @_exported
        while line.starts_with('@') {
            match line.split_once(char::is_whitespace) {
                Some((_, rest)) => line = rest.trim_start(),
                None => break,
            }
        }

        let Some(rest) = line.strip_prefix("import ") else {
            continue;
        };

        let mut tokens = rest.split_whitespace();
        let Some(mut module) = tokens.next() else {
            continue;
        };

        // import kinds: class, enum, func, protocol, struct, typealias, var
        if matches!(
            module,
            "class" | "enum" | "func" | "let" | "protocol" | "struct" | "typealias" | "var"
        ) {
            match tokens.next() {
                Some(next) => module = next,
                None => continue,
            }
        }

        let module = module.split('.').next().unwrap_or(module);
        if !module.is_empty() {
            dependencies.push(module.to_string());
        }
    }

    dependencies
}
