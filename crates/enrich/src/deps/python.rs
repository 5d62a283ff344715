//! Python import scanning.

/// Extract imported top-level modules from Python source.
///
/// `import a.b, c` yields `a` and `c`; `from x.y import z` yields `x`.
/// Relative imports are skipped.
pub fn parse(contents: &str) -> Vec<String> {
    let mut dependencies = Vec::new();

    for line in contents.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("from ") {
            if let Some((module, _)) = rest.split_once(" import ") {
                push_module(&mut dependencies, module.trim());
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("import ") {
            for part in rest.split(',') {
                // drop "as alias" suffixes
                let module = part.trim().split_whitespace().next().unwrap_or("");
                push_module(&mut dependencies, module);
            }
        }
    }

    dependencies
}

fn push_module(dependencies: &mut Vec<String>, module: &str) {
    // relative imports reference the package itself
    if module.is_empty() || module.starts_with('.') {
        return;
    }

    let top_level = module.split('.').next().unwrap_or(module);
    dependencies.push(top_level.to_string());
}
