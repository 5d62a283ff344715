//! Language detection from file extensions.

use std::path::Path;

use pulse_heartbeat::{EntityType, Heartbeat};

/// Fill in the language for file heartbeats that lack one.
///
/// An explicit language always wins. Detection maps the entity extension
/// through a fixed table; when that finds nothing the plugin's alternate
/// language is used.
pub fn detect_language(mut h: Heartbeat) -> Heartbeat {
    if h.language.is_some() {
        return h;
    }

    if h.entity_type == EntityType::File {
        let entity = h.local_file.as_deref().unwrap_or(&h.entity);
        h.language = from_extension(entity).map(str::to_string);
    }

    if h.language.is_none() {
        h.language = h.language_alternate.clone();
    }

    h
}

/// Map a file path to a language by its extension.
pub fn from_extension(path: &str) -> Option<&'static str> {
    let path = Path::new(path);

    // extension-less special cases
    match path.file_name().and_then(|n| n.to_str()) {
        Some("Makefile" | "makefile" | "GNUmakefile") => return Some("Makefile"),
        Some("Dockerfile") => return Some("Docker"),
        Some("CMakeLists.txt") => return Some("CMake"),
        _ => {}
    }

    let extension = path.extension()?.to_str()?.to_lowercase();

    let language = match extension.as_str() {
        "asm" | "s" => "Assembly",
        "c" | "h" => "C",
        "cpp" | "cxx" | "cc" | "hpp" | "hxx" => "C++",
        "cs" => "C#",
        "clj" | "cljs" => "Clojure",
        "css" => "CSS",
        "dart" => "Dart",
        "ex" | "exs" => "Elixir",
        "elm" => "Elm",
        "erl" => "Erlang",
        "fs" | "fsx" => "F#",
        "go" => "Go",
        "gradle" => "Groovy",
        "hs" => "Haskell",
        "html" | "htm" => "HTML",
        "java" => "Java",
        "js" | "mjs" | "cjs" => "JavaScript",
        "json" => "JSON",
        "jsx" => "JSX",
        "kt" | "kts" => "Kotlin",
        "lua" => "Lua",
        "md" | "markdown" => "Markdown",
        "m" => "Objective-C",
        "ml" | "mli" => "OCaml",
        "pl" | "pm" => "Perl",
        "php" => "PHP",
        "proto" => "Protocol Buffer",
        "py" | "pyi" => "Python",
        "r" => "R",
        "rb" => "Ruby",
        "rs" => "Rust",
        "scala" => "Scala",
        "sh" | "bash" | "zsh" => "Shell",
        "sql" => "SQL",
        "swift" => "Swift",
        "tex" => "TeX",
        "tf" => "Terraform",
        "toml" => "TOML",
        "ts" | "mts" | "cts" => "TypeScript",
        "tsx" => "TSX",
        "vim" => "Vim script",
        "vue" => "Vue.js",
        "xml" => "XML",
        "yaml" | "yml" => "YAML",
        "zig" => "Zig",
        _ => return None,
    };

    Some(language)
}

#[cfg(test)]
#[path = "language_test.rs"]
mod tests;
