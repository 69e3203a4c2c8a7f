//! File URIs and language identifiers sent to language servers

use std::path::Path;

/// Convert a filesystem path to a percent-encoded `file://` URI
pub fn path_to_uri(path: &Path) -> String {
    let abs_path = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir().unwrap_or_default().join(path)
    };

    let path_str = abs_path.to_string_lossy();
    let encoded: String = path_str
        .chars()
        .map(|c| match c {
            '/' | '.' | '-' | '_' | '~' => c.to_string(),
            c if c.is_ascii_alphanumeric() => c.to_string(),
            c => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{:02X}", b))
                    .collect()
            }
        })
        .collect();

    format!("file://{encoded}")
}

/// `languageId` for `textDocument/didOpen`, detected from the file extension
pub fn language_id_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        // Systems
        "rs" => "rust",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" | "hxx" => "cpp",
        "zig" => "zig",

        // JVM
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "scala" | "sc" => "scala",
        "clj" | "cljs" | "cljc" | "edn" => "clojure",

        // .NET
        "cs" => "csharp",
        "fs" | "fsx" | "fsi" => "fsharp",

        // Web
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "typescriptreact",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "javascriptreact",
        "vue" => "vue",

        // Scripting
        "py" | "pyi" => "python",
        "rb" | "rake" | "gemspec" => "ruby",
        "php" => "php",
        "pl" | "pm" => "perl",
        "lua" => "lua",
        "sh" | "bash" | "zsh" => "shellscript",
        "ps1" | "psm1" | "psd1" => "powershell",

        // Functional
        "hs" | "lhs" => "haskell",
        "ex" | "exs" => "elixir",
        "erl" | "hrl" => "erlang",
        "elm" => "elm",
        "ml" | "mli" => "ocaml",

        "go" => "go",
        "swift" => "swift",
        "dart" => "dart",

        // Config
        "tf" | "tfvars" | "hcl" => "terraform",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "json" => "json",
        "nix" => "nix",

        "r" | "rmd" => "r",
        "jl" => "julia",
        "md" | "markdown" => "markdown",

        _ => "plaintext",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_absolute_path_uri() {
        assert_eq!(
            path_to_uri(Path::new("/src/main.rs")),
            "file:///src/main.rs"
        );
    }

    #[test]
    fn test_uri_with_spaces() {
        let uri = path_to_uri(&PathBuf::from("/path with spaces/file.rs"));
        assert_eq!(uri, "file:///path%20with%20spaces/file.rs");
    }

    #[test]
    fn test_uri_with_unicode() {
        let uri = path_to_uri(&PathBuf::from("/tmp/é.rs"));
        assert_eq!(uri, "file:///tmp/%C3%A9.rs");
    }

    #[test]
    fn test_relative_path_is_absolutized() {
        let uri = path_to_uri(Path::new("lib.rs"));
        assert!(uri.starts_with("file:///"));
        assert!(uri.ends_with("/lib.rs"));
    }

    #[test]
    fn test_language_ids() {
        assert_eq!(language_id_for(Path::new("a/main.rs")), "rust");
        assert_eq!(language_id_for(Path::new("App.TSX")), "typescriptreact");
        assert_eq!(language_id_for(Path::new("init.lua")), "lua");
        assert_eq!(language_id_for(Path::new("Makefile")), "plaintext");
    }
}
