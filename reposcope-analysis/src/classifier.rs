//! File classification by extension

use reposcope_core::{path_extension, path_file_name, FileEntry};
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Label returned for paths the language table does not cover
pub const UNKNOWN_LANGUAGE: &str = "unknown";

const LANGUAGE_TABLE: &[(&str, &str)] = &[
    ("py", "Python"),
    ("pyw", "Python"),
    ("pyi", "Python"),
    ("ipynb", "Jupyter Notebook"),
    ("js", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    ("jsx", "JavaScript"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("mts", "TypeScript"),
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("kts", "Kotlin"),
    ("scala", "Scala"),
    ("groovy", "Groovy"),
    ("c", "C"),
    ("h", "C"),
    ("cc", "C++"),
    ("cpp", "C++"),
    ("cxx", "C++"),
    ("hh", "C++"),
    ("hpp", "C++"),
    ("hxx", "C++"),
    ("cs", "C#"),
    ("fs", "F#"),
    ("vb", "Visual Basic"),
    ("go", "Go"),
    ("rs", "Rust"),
    ("rb", "Ruby"),
    ("erb", "Ruby"),
    ("php", "PHP"),
    ("swift", "Swift"),
    ("m", "Objective-C"),
    ("mm", "Objective-C"),
    ("dart", "Dart"),
    ("lua", "Lua"),
    ("pl", "Perl"),
    ("pm", "Perl"),
    ("r", "R"),
    ("jl", "Julia"),
    ("ex", "Elixir"),
    ("exs", "Elixir"),
    ("erl", "Erlang"),
    ("hs", "Haskell"),
    ("clj", "Clojure"),
    ("elm", "Elm"),
    ("ml", "OCaml"),
    ("zig", "Zig"),
    ("nim", "Nim"),
    ("sol", "Solidity"),
    ("sh", "Shell"),
    ("bash", "Shell"),
    ("zsh", "Shell"),
    ("ps1", "PowerShell"),
    ("bat", "Batchfile"),
    ("sql", "SQL"),
    ("html", "HTML"),
    ("htm", "HTML"),
    ("css", "CSS"),
    ("scss", "SCSS"),
    ("sass", "Sass"),
    ("less", "Less"),
    ("vue", "Vue"),
    ("svelte", "Svelte"),
    ("tex", "TeX"),
];

/// Binary and generated artifacts: counted per extension, never classified or read
const IGNORED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "icns", "svg", "webp", "tiff", "psd", "pdf",
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "jar", "war", "ear", "class", "pyc",
    "pyo", "o", "obj", "a", "lib", "so", "dll", "dylib", "exe", "bin", "wasm", "woff", "woff2",
    "ttf", "otf", "eot", "mp3", "mp4", "wav", "ogg", "mov", "avi", "webm", "db", "sqlite",
    "lock", "map", "log",
];

const LOCKFILE_NAMES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "poetry.lock",
    "Pipfile.lock",
    "Gemfile.lock",
    "composer.lock",
    "Cargo.lock",
    "go.sum",
];

static LANGUAGES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| LANGUAGE_TABLE.iter().copied().collect());

static IGNORED: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| IGNORED_EXTENSIONS.iter().copied().collect());

/// Whether a path is a binary, minified or lockfile artifact
pub fn is_ignored(path: &str) -> bool {
    let name = path_file_name(path);
    if LOCKFILE_NAMES.contains(&name) {
        return true;
    }
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".min.js") || lower.ends_with(".min.css") {
        return true;
    }
    path_extension(name).is_some_and(|ext| IGNORED.contains(ext.as_str()))
}

/// Language label for a path, or [`UNKNOWN_LANGUAGE`]
pub fn classify(path: &str) -> &'static str {
    if is_ignored(path) {
        return UNKNOWN_LANGUAGE;
    }
    path_extension(path)
        .and_then(|ext| LANGUAGES.get(ext.as_str()).copied())
        .unwrap_or(UNKNOWN_LANGUAGE)
}

/// File counts per language for one repository
#[derive(Debug, Clone, Default)]
pub struct LanguageTally {
    counts: HashMap<&'static str, usize>,
}

impl LanguageTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one file. Returns the language it was tallied under, if any.
    pub fn record(&mut self, path: &str) -> Option<&'static str> {
        let language = classify(path);
        if language == UNKNOWN_LANGUAGE {
            return None;
        }
        *self.counts.entry(language).or_insert(0) += 1;
        Some(language)
    }

    pub fn count(&self, language: &str) -> usize {
        self.counts.get(language).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Distinct languages, most files first, ties alphabetical
    pub fn languages(&self) -> Vec<String> {
        let mut ranked: Vec<(&'static str, usize)> =
            self.counts.iter().map(|(lang, count)| (*lang, *count)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.into_iter().map(|(lang, _)| lang.to_string()).collect()
    }
}

/// Languages of a listing; directories are not counted
pub fn detect_languages(entries: &[FileEntry]) -> Vec<String> {
    let mut tally = LanguageTally::new();
    for entry in entries.iter().filter(|entry| !entry.is_dir) {
        tally.record(&entry.path);
    }
    tally.languages()
}
