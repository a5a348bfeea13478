//! The language feature registry: an immutable lookup built once from a
//! static embedded dataset (extension/filename -> candidate languages,
//! language name -> lexical feature record), lazily hydrated per-language on
//! first reference to amortise startup.
//!
//! [`LanguageDef`] is the raw compile-time record. [`LanguageFeature`] is
//! what a definition hydrates into on first use: delimiter lists sorted
//! longest-first (for the longest-match rule the Counter relies on) and the
//! complexity keyword set collected into a hash set for O(1) lookups.

use ahash::AHashSet;
use dashmap::DashMap;
use regex::Regex;
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// One string/char-literal delimiter pair and its lexing policy.
#[derive(Debug, Clone, Copy)]
pub struct StringDelim {
    pub open: &'static str,
    pub close: &'static str,
    /// `\` escapes the next byte without ending the string.
    pub escape: bool,
    /// Raw strings ignore escapes entirely even if `escape` is set.
    pub raw: bool,
}

impl StringDelim {
    const fn quote(q: &'static str) -> Self {
        Self { open: q, close: q, escape: true, raw: false }
    }

    const fn delim(open: &'static str, close: &'static str, escape: bool) -> Self {
        Self { open, close, escape, raw: false }
    }
}

/// The declarative, compile-time record for one language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageDef {
    pub name: &'static str,
    pub line_comments: &'static [&'static str],
    pub multi_line_comments: &'static [(&'static str, &'static str)],
    pub nested: bool,
    pub strings: &'static [StringDelim],
    /// Treated like a block comment for line classification but closed with
    /// string-style escape semantics (the spec's "doc-strings").
    pub doc_strings: &'static [(&'static str, &'static str)],
    /// Keyword tokens that increment complexity at a code word boundary.
    pub complexity_checks: &'static [&'static str],
    /// Tokens used only for content-based disambiguation key-phrase counts.
    pub keywords: &'static [&'static str],
    /// Interpreter names that may appear on a `#!` shebang line.
    pub shebangs: &'static [&'static str],
    /// A first-line regex that, if it matches, settles disambiguation.
    pub first_line_pattern: Option<&'static str>,
}

const QUOTE_PAIR: &[StringDelim] = &[StringDelim::quote("\""), StringDelim::quote("'")];
const DQUOTE_ONLY: &[StringDelim] = &[StringDelim::quote("\"")];
const C_COMPLEXITY: &[&str] = &["if", "else", "for", "while", "case", "catch", "&&", "||", "?"];

impl LanguageDef {
    const fn new(name: &'static str) -> Self {
        Self {
            name,
            line_comments: &[],
            multi_line_comments: &[],
            nested: false,
            strings: QUOTE_PAIR,
            doc_strings: &[],
            complexity_checks: &[],
            keywords: &[],
            shebangs: &[],
            first_line_pattern: None,
        }
    }

    const fn c_style(name: &'static str) -> Self {
        Self {
            name,
            line_comments: &["//"],
            multi_line_comments: &[("/*", "*/")],
            nested: false,
            strings: QUOTE_PAIR,
            doc_strings: &[],
            complexity_checks: C_COMPLEXITY,
            keywords: &[],
            shebangs: &[],
            first_line_pattern: None,
        }
    }

    const fn shell_style(name: &'static str) -> Self {
        Self {
            name,
            line_comments: &["#"],
            multi_line_comments: &[],
            nested: false,
            strings: QUOTE_PAIR,
            doc_strings: &[],
            complexity_checks: &["if", "elif", "for", "while", "case"],
            keywords: &[],
            shebangs: &[],
            first_line_pattern: None,
        }
    }

    const fn html_style(name: &'static str) -> Self {
        Self {
            name,
            line_comments: &[],
            multi_line_comments: &[("<!--", "-->")],
            nested: false,
            strings: QUOTE_PAIR,
            doc_strings: &[],
            complexity_checks: &[],
            keywords: &[],
            shebangs: &[],
            first_line_pattern: None,
        }
    }

    const fn with_complexity(mut self, checks: &'static [&'static str]) -> Self {
        self.complexity_checks = checks;
        self
    }

    const fn with_strings(mut self, strings: &'static [StringDelim]) -> Self {
        self.strings = strings;
        self
    }

    const fn with_nested(mut self) -> Self {
        self.nested = true;
        self
    }

    const fn with_shebangs(mut self, shebangs: &'static [&'static str]) -> Self {
        self.shebangs = shebangs;
        self
    }

    const fn with_keywords(mut self, keywords: &'static [&'static str]) -> Self {
        self.keywords = keywords;
        self
    }

    const fn with_line_comments(mut self, comments: &'static [&'static str]) -> Self {
        self.line_comments = comments;
        self
    }

    const fn with_multi_line_comments(mut self, pairs: &'static [(&'static str, &'static str)]) -> Self {
        self.multi_line_comments = pairs;
        self
    }
}

pub static LANGUAGES: phf::Map<&'static str, LanguageDef> = phf::phf_map! {
    "Rust" => LanguageDef::c_style("Rust")
        .with_nested()
        .with_complexity(&["if", "else", "for", "while", "loop", "match", "&&", "||", "?"]),
    "C" => LanguageDef::c_style("C"),
    "C Header" => LanguageDef::c_style("C Header"),
    "C++" => LanguageDef::c_style("C++"),
    "C++ Header" => LanguageDef::c_style("C++ Header"),
    "Objective-C" => LanguageDef::c_style("Objective-C")
        .with_keywords(&["@interface", "@implementation", "@property", "#import"]),
    "Go" => LanguageDef::c_style("Go").with_complexity(&["if", "else", "for", "case", "&&", "||"]),
    "Swift" => LanguageDef::c_style("Swift").with_nested(),
    "Zig" => LanguageDef::c_style("Zig").with_strings(DQUOTE_ONLY),
    "D" => LanguageDef::c_style("D").with_nested(),

    "Java" => LanguageDef::c_style("Java"),
    "Kotlin" => LanguageDef::c_style("Kotlin").with_nested(),
    "Scala" => LanguageDef::c_style("Scala").with_nested(),

    "C#" => LanguageDef::c_style("C#"),
    "F#" => LanguageDef {
        name: "F#",
        line_comments: &["//"],
        multi_line_comments: &[("(*", "*)")],
        nested: true,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["if", "elif", "for", "while", "match", "&&", "||"],
        keywords: &["let ", "module ", "open ", "match "],
        shebangs: &[],
        first_line_pattern: None,
    },

    "JavaScript" => LanguageDef::c_style("JavaScript"),
    "TypeScript" => LanguageDef::c_style("TypeScript"),
    "JSX" => LanguageDef::c_style("JSX"),
    "TSX" => LanguageDef::c_style("TSX"),
    "HTML" => LanguageDef::html_style("HTML"),
    "CSS" => LanguageDef {
        name: "CSS",
        line_comments: &[],
        multi_line_comments: &[("/*", "*/")],
        nested: false,
        strings: QUOTE_PAIR,
        doc_strings: &[],
        complexity_checks: &[],
        keywords: &[],
        shebangs: &[],
        first_line_pattern: None,
    },
    "SCSS" => LanguageDef::c_style("SCSS").with_complexity(&["if", "else", "for", "while", "&&", "||"]),
    "Vue" => LanguageDef::html_style("Vue"),

    "Python" => LanguageDef {
        name: "Python",
        line_comments: &["#"],
        multi_line_comments: &[],
        nested: false,
        strings: &[
            StringDelim::delim("\"\"\"", "\"\"\"", true),
            StringDelim::delim("'''", "'''", true),
            StringDelim::quote("\""),
            StringDelim::quote("'"),
        ],
        doc_strings: &[("\"\"\"", "\"\"\"")],
        complexity_checks: &["if", "elif", "for", "while", "except", "and", "or"],
        keywords: &["def ", "import ", "self", "elif "],
        shebangs: &["python", "python3"],
        first_line_pattern: None,
    },
    "Ruby" => LanguageDef {
        name: "Ruby",
        line_comments: &["#"],
        multi_line_comments: &[("=begin", "=end")],
        nested: false,
        strings: QUOTE_PAIR,
        doc_strings: &[],
        complexity_checks: &["if", "elsif", "unless", "for", "while", "case", "and", "or", "rescue"],
        keywords: &["def ", "end", "require ", "elsif "],
        shebangs: &["ruby"],
        first_line_pattern: None,
    },
    "PHP" => LanguageDef::c_style("PHP")
        .with_line_comments(&["//", "#"])
        .with_complexity(&["if", "elseif", "else", "for", "foreach", "while", "case", "&&", "||"])
        .with_shebangs(&["php"]),
    "Lua" => LanguageDef {
        name: "Lua",
        line_comments: &["--"],
        multi_line_comments: &[("--[[", "]]")],
        nested: false,
        strings: QUOTE_PAIR,
        doc_strings: &[],
        complexity_checks: &["if", "elseif", "for", "while", "repeat", "and", "or"],
        keywords: &["local ", "function ", "end"],
        shebangs: &["lua"],
        first_line_pattern: None,
    },
    "Perl" => LanguageDef::shell_style("Perl")
        .with_multi_line_comments(&[("=pod", "=cut")])
        .with_complexity(&["if", "elsif", "unless", "for", "foreach", "while", "&&", "||"])
        .with_keywords(&["use strict", "my $", "sub "])
        .with_shebangs(&["perl"]),
    "Prolog" => LanguageDef {
        name: "Prolog",
        line_comments: &["%"],
        multi_line_comments: &[("/*", "*/")],
        nested: false,
        strings: QUOTE_PAIR,
        doc_strings: &[],
        complexity_checks: &[],
        keywords: &[":-", "?-"],
        shebangs: &["swipl", "prolog"],
        first_line_pattern: None,
    },

    "Shell" => LanguageDef::shell_style("Shell").with_shebangs(&["sh"]),
    "Bash" => LanguageDef::shell_style("Bash").with_shebangs(&["bash"]),
    "Zsh" => LanguageDef::shell_style("Zsh").with_shebangs(&["zsh"]),
    "Fish" => LanguageDef::shell_style("Fish").with_shebangs(&["fish"]),
    "PowerShell" => LanguageDef {
        name: "PowerShell",
        line_comments: &["#"],
        multi_line_comments: &[("<#", "#>")],
        nested: false,
        strings: QUOTE_PAIR,
        doc_strings: &[],
        complexity_checks: &["if", "elseif", "for", "foreach", "while", "switch", "-and", "-or"],
        keywords: &[],
        shebangs: &[],
        first_line_pattern: None,
    },
    "Batch" => LanguageDef {
        name: "Batch",
        line_comments: &["REM", "rem", "::"],
        multi_line_comments: &[],
        nested: false,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["if", "for"],
        keywords: &[],
        shebangs: &[],
        first_line_pattern: None,
    },

    "Haskell" => LanguageDef {
        name: "Haskell",
        line_comments: &["--"],
        multi_line_comments: &[("{-", "-}")],
        nested: true,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["if", "then", "else", "case", "&&", "||"],
        keywords: &["module ", "import ", "where"],
        shebangs: &["runhaskell"],
        first_line_pattern: None,
    },
    "OCaml" => LanguageDef {
        name: "OCaml",
        line_comments: &[],
        multi_line_comments: &[("(*", "*)")],
        nested: true,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["if", "else", "match", "&&", "||"],
        keywords: &["let ", "module ", "match "],
        shebangs: &[],
        first_line_pattern: None,
    },
    "Lisp" => LanguageDef {
        name: "Lisp",
        line_comments: &[";"],
        multi_line_comments: &[("#|", "|#")],
        nested: true,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["cond", "if", "when", "unless"],
        keywords: &["defun ", "defvar "],
        shebangs: &[],
        first_line_pattern: None,
    },
    "Scheme" => LanguageDef {
        name: "Scheme",
        line_comments: &[";"],
        multi_line_comments: &[("#|", "|#")],
        nested: true,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["cond", "if", "when", "unless"],
        keywords: &["define ", "lambda "],
        shebangs: &["scheme", "guile"],
        first_line_pattern: None,
    },
    "Racket" => LanguageDef {
        name: "Racket",
        line_comments: &[";"],
        multi_line_comments: &[("#|", "|#")],
        nested: true,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["cond", "if", "when", "unless"],
        keywords: &["#lang racket"],
        shebangs: &["racket"],
        first_line_pattern: None,
    },
    "Clojure" => LanguageDef {
        name: "Clojure",
        line_comments: &[";"],
        multi_line_comments: &[],
        nested: false,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["cond", "if", "when", "case"],
        keywords: &["defn ", "ns "],
        shebangs: &["clojure", "bb"],
        first_line_pattern: None,
    },
    "Erlang" => LanguageDef {
        name: "Erlang",
        line_comments: &["%"],
        multi_line_comments: &[],
        nested: false,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["case", "if", "when"],
        keywords: &["-module", "-export"],
        shebangs: &["escript"],
        first_line_pattern: None,
    },
    "Elixir" => LanguageDef::shell_style("Elixir")
        .with_multi_line_comments(&[("@doc \"\"\"", "\"\"\"")])
        .with_complexity(&["if", "unless", "case", "cond", "for", "and", "or"])
        .with_keywords(&["defmodule ", "def "])
        .with_shebangs(&["elixir"]),

    "SQL" => LanguageDef {
        name: "SQL",
        line_comments: &["--"],
        multi_line_comments: &[("/*", "*/")],
        nested: false,
        strings: &[StringDelim::quote("'")],
        doc_strings: &[],
        complexity_checks: &["case", "when", "join", "and", "or"],
        keywords: &["select ", "SELECT "],
        shebangs: &[],
        first_line_pattern: None,
    },

    "JSON" => LanguageDef::new("JSON").with_strings(DQUOTE_ONLY),
    "YAML" => LanguageDef::shell_style("YAML"),
    "TOML" => LanguageDef::shell_style("TOML"),
    "XML" => LanguageDef::html_style("XML"),
    "INI" => LanguageDef {
        name: "INI",
        line_comments: &[";", "#"],
        multi_line_comments: &[],
        nested: false,
        strings: QUOTE_PAIR,
        doc_strings: &[],
        complexity_checks: &[],
        keywords: &[],
        shebangs: &[],
        first_line_pattern: None,
    },

    "Markdown" => LanguageDef::html_style("Markdown"),
    "Makefile" => LanguageDef::shell_style("Makefile"),
    "CMake" => LanguageDef::shell_style("CMake"),
    "Dockerfile" => LanguageDef::shell_style("Dockerfile"),
    "Terraform" => LanguageDef::c_style("Terraform")
        .with_line_comments(&["//", "#"])
        .with_complexity(&["if", "for", "for_each"]),
    "HCL" => LanguageDef::c_style("HCL").with_line_comments(&["//", "#"]),

    "R" => LanguageDef::shell_style("R")
        .with_complexity(&["if", "else", "for", "while", "repeat", "&&", "||"])
        .with_keywords(&["<-", "function("]),
    "Rebol" => LanguageDef {
        name: "Rebol",
        line_comments: &[";"],
        multi_line_comments: &[],
        nested: false,
        strings: &[StringDelim::quote("\""), StringDelim::delim("{", "}", false)],
        doc_strings: &[],
        complexity_checks: &["if", "either", "while", "case"],
        keywords: &["REBOL ["],
        shebangs: &["rebol"],
        first_line_pattern: Some(r"^\s*REBOL\s*\["),
    },
    "MATLAB" => LanguageDef {
        name: "MATLAB",
        line_comments: &["%"],
        multi_line_comments: &[("%{", "%}")],
        nested: false,
        strings: &[StringDelim::quote("'"), StringDelim::quote("\"")],
        doc_strings: &[],
        complexity_checks: &["if", "elseif", "for", "while", "switch", "case", "&&", "||"],
        keywords: &["function ", "endfunction", "classdef"],
        shebangs: &[],
        first_line_pattern: None,
    },

    "Forth" => LanguageDef {
        name: "Forth",
        line_comments: &["\\"],
        multi_line_comments: &[("(", ")")],
        nested: false,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["IF", "if", "WHILE", "while"],
        keywords: &[": ", ";"],
        shebangs: &["gforth"],
        first_line_pattern: None,
    },

    "Visual Basic" => LanguageDef {
        name: "Visual Basic",
        line_comments: &["'"],
        multi_line_comments: &[],
        nested: false,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["If", "ElseIf", "For", "While", "Select Case", "And", "Or"],
        keywords: &["Sub ", "End Sub"],
        shebangs: &[],
        first_line_pattern: None,
    },

    "Assembly" => LanguageDef {
        name: "Assembly",
        line_comments: &[";", "#", "//"],
        multi_line_comments: &[("/*", "*/")],
        nested: false,
        strings: QUOTE_PAIR,
        doc_strings: &[],
        complexity_checks: &[],
        keywords: &[],
        shebangs: &[],
        first_line_pattern: None,
    },
    "WebAssembly" => LanguageDef {
        name: "WebAssembly",
        line_comments: &[";;"],
        multi_line_comments: &[("(;", ";)")],
        nested: true,
        strings: DQUOTE_ONLY,
        doc_strings: &[],
        complexity_checks: &["if", "br_if"],
        keywords: &[],
        shebangs: &[],
        first_line_pattern: None,
    },

    "Dart" => LanguageDef::c_style("Dart"),
    "Nix" => LanguageDef::shell_style("Nix").with_multi_line_comments(&[("/*", "*/")]),
};

/// Extension (lowercased, without leading dot) -> candidate language names,
/// in disambiguation order. Most entries have exactly one candidate; a few
/// genuinely ambiguous extensions carry more than one.
pub static EXTENSION_MAP: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "rs" => &["Rust"],
    "c" => &["C"],
    "h" => &["C Header"],
    "cc" => &["C++"],
    "cpp" => &["C++"],
    "cxx" => &["C++"],
    "hh" => &["C++ Header"],
    "hpp" => &["C++ Header"],
    "go" => &["Go"],
    "swift" => &["Swift"],
    "zig" => &["Zig"],
    "d" => &["D"],
    "java" => &["Java"],
    "kt" => &["Kotlin"],
    "kts" => &["Kotlin"],
    "scala" => &["Scala"],
    "cs" => &["C#"],
    "fs" => &["F#", "Forth"],
    "fsi" => &["F#"],
    "fsx" => &["F#"],
    "js" => &["JavaScript"],
    "mjs" => &["JavaScript"],
    "cjs" => &["JavaScript"],
    "ts" => &["TypeScript"],
    "jsx" => &["JSX"],
    "tsx" => &["TSX"],
    "html" => &["HTML"],
    "htm" => &["HTML"],
    "css" => &["CSS"],
    "scss" => &["SCSS"],
    "vue" => &["Vue"],
    "py" => &["Python"],
    "pyw" => &["Python"],
    "rb" => &["Ruby"],
    "php" => &["PHP"],
    "php3" => &["PHP"],
    "lua" => &["Lua"],
    "pl" => &["Perl", "Prolog"],
    "pro" => &["Prolog"],
    "sh" => &["Shell"],
    "bash" => &["Bash"],
    "zsh" => &["Zsh"],
    "fish" => &["Fish"],
    "ps1" => &["PowerShell"],
    "psm1" => &["PowerShell"],
    "bat" => &["Batch"],
    "cmd" => &["Batch"],
    "hs" => &["Haskell"],
    "lhs" => &["Haskell"],
    "ml" => &["OCaml"],
    "mli" => &["OCaml"],
    "lisp" => &["Lisp"],
    "lsp" => &["Lisp"],
    "scm" => &["Scheme"],
    "rkt" => &["Racket"],
    "clj" => &["Clojure"],
    "cljs" => &["Clojure"],
    "erl" => &["Erlang"],
    "hrl" => &["Erlang"],
    "ex" => &["Elixir"],
    "exs" => &["Elixir"],
    "sql" => &["SQL"],
    "mysql" => &["SQL"],
    "json" => &["JSON"],
    "yaml" => &["YAML"],
    "yml" => &["YAML"],
    "toml" => &["TOML"],
    "xml" => &["XML"],
    "xsd" => &["XML"],
    "ini" => &["INI"],
    "cfg" => &["INI"],
    "md" => &["Markdown"],
    "markdown" => &["Markdown"],
    "mk" => &["Makefile"],
    "cmake" => &["CMake"],
    "tf" => &["Terraform"],
    "tfvars" => &["Terraform"],
    "hcl" => &["HCL"],
    "r" => &["R", "Rebol"],
    "m" => &["Objective-C", "MATLAB"],
    "mat" => &["MATLAB"],
    "4th" => &["Forth"],
    "fth" => &["Forth"],
    "vb" => &["Visual Basic"],
    "vbs" => &["Visual Basic"],
    "asm" => &["Assembly"],
    "s" => &["Assembly"],
    "wat" => &["WebAssembly"],
    "wast" => &["WebAssembly"],
    "dart" => &["Dart"],
    "nix" => &["Nix"],
    "vbhtml" => &["Visual Basic"],
};

/// Full-file-name -> candidate languages, checked before extension lookup
/// (handles `Makefile`, `Dockerfile`, and friends that have no extension).
pub static FILENAME_MAP: phf::Map<&'static str, &'static [&'static str]> = phf::phf_map! {
    "Makefile" => &["Makefile"],
    "makefile" => &["Makefile"],
    "GNUmakefile" => &["Makefile"],
    "CMakeLists.txt" => &["CMake"],
    "Dockerfile" => &["Dockerfile"],
    "dockerfile" => &["Dockerfile"],
    "Gemfile" => &["Ruby"],
    "Rakefile" => &["Ruby"],
    "Vagrantfile" => &["Ruby"],
    "Cargo.toml" => &["TOML"],
    "Cargo.lock" => &["TOML"],
    "package.json" => &["JSON"],
    "tsconfig.json" => &["JSON"],
    "flake.nix" => &["Nix"],
    "default.nix" => &["Nix"],
};

/// Resolve a path to its extension/filename key and candidate language list:
/// full-name lookup first, then extension, then one extra-extension strip
/// for names like `foo.d.ts`.
pub fn candidates_for(path: &Path) -> Option<(String, Vec<&'static str>)> {
    let filename = path.file_name()?.to_str()?;

    if let Some(&langs) = FILENAME_MAP.get(filename) {
        return Some((String::new(), langs.to_vec()));
    }
    let lower = filename.to_lowercase();
    if let Some(&langs) = FILENAME_MAP.get(lower.as_str()) {
        return Some((String::new(), langs.to_vec()));
    }

    let ext = cached_extension(&lower)?;
    if let Some(&langs) = EXTENSION_MAP.get(ext.as_str()) {
        return Some((ext, langs.to_vec()));
    }

    let stem = lower.strip_suffix(&format!(".{ext}"))?;
    let inner_ext = extract_extension(stem)?;
    EXTENSION_MAP.get(inner_ext.as_str()).map(|&langs| (inner_ext, langs.to_vec()))
}

fn extract_extension(name: &str) -> Option<String> {
    let dot = name.rfind('.')?;
    if dot == 0 {
        return None;
    }
    Some(name[dot + 1..].to_string())
}

/// Write-once-per-key cache from lowercase file name to its resolved
/// extension: a huge tree re-sees the same file names (`main.rs`, `mod.rs`,
/// `index.ts`, ...) over and over, so this avoids re-splitting the same
/// string on every visit. `DashMap::entry` gives the same tolerate-
/// concurrent-insertion-of-the-same-key semantics the feature registry's
/// single-flight hydration relies on, rather than a fresh heap allocation
/// leaked per file.
static EXTENSION_CACHE: OnceLock<DashMap<String, String>> = OnceLock::new();

fn extension_cache() -> &'static DashMap<String, String> {
    EXTENSION_CACHE.get_or_init(DashMap::new)
}

fn cached_extension(lower_name: &str) -> Option<String> {
    let cached = extension_cache()
        .entry(lower_name.to_string())
        .or_insert_with(|| extract_extension(lower_name).unwrap_or_default());
    if cached.is_empty() { None } else { Some(cached.clone()) }
}

/// The hydrated, per-language compiled feature record the Counter drives
/// against. Delimiters are sorted longest-first so the state machine can
/// apply the longest-match rule without backtracking.
#[derive(Debug)]
pub struct LanguageFeature {
    pub name: &'static str,
    pub line_comments: Vec<&'static str>,
    pub multi_line_comments: Vec<(&'static str, &'static str)>,
    pub nested: bool,
    pub strings: Vec<StringDelim>,
    pub doc_strings: Vec<(&'static str, &'static str)>,
    pub complexity_checks: AHashSet<&'static str>,
    pub keywords: &'static [&'static str],
    pub shebangs: &'static [&'static str],
    pub first_line_pattern: Option<Arc<Regex>>,
    pub has_comments: bool,
}

impl LanguageFeature {
    fn hydrate(def: &LanguageDef) -> Self {
        let mut line_comments = def.line_comments.to_vec();
        line_comments.sort_unstable_by_key(|s| std::cmp::Reverse(s.len()));

        let mut multi_line_comments = def.multi_line_comments.to_vec();
        multi_line_comments.sort_unstable_by_key(|(o, _)| std::cmp::Reverse(o.len()));

        let mut strings = def.strings.to_vec();
        strings.sort_unstable_by_key(|d| std::cmp::Reverse(d.open.len()));

        let first_line_pattern = def
            .first_line_pattern
            .and_then(|p| Regex::new(p).ok())
            .map(Arc::new);

        Self {
            name: def.name,
            has_comments: !line_comments.is_empty() || !multi_line_comments.is_empty(),
            line_comments,
            multi_line_comments,
            nested: def.nested,
            strings,
            doc_strings: def.doc_strings.to_vec(),
            complexity_checks: def.complexity_checks.iter().copied().collect(),
            keywords: def.keywords,
            shebangs: def.shebangs,
            first_line_pattern,
        }
    }
}

/// Single-flight, lazily-hydrated cache from language name to its compiled
/// feature record. First lookup for a language computes and installs the
/// entry (the `DashMap` shard lock serialises concurrent first-lookups);
/// subsequent lookups are lock-free reads.
pub mod registry {
    use super::*;

    static CACHE: OnceLock<DashMap<&'static str, &'static LanguageFeature>> = OnceLock::new();

    fn cache() -> &'static DashMap<&'static str, &'static LanguageFeature> {
        CACHE.get_or_init(DashMap::new)
    }

    pub fn get(name: &str) -> Option<&'static LanguageFeature> {
        let def = LANGUAGES.get(name)?;
        let feature = *cache()
            .entry(def.name)
            .or_insert_with(|| Box::leak(Box::new(LanguageFeature::hydrate(def))));
        Some(feature)
    }
}

pub fn list_languages() -> impl Iterator<Item = (&'static str, &'static LanguageDef)> {
    LANGUAGES.entries().map(|(k, v)| (*k, v))
}

pub fn list_extensions() -> impl Iterator<Item = (&'static str, &'static [&'static str])> {
    EXTENSION_MAP.entries().map(|(k, v)| (*k, *v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn resolves_single_candidate() {
        let (_, langs) = candidates_for(Path::new("main.rs")).unwrap();
        assert_eq!(langs, vec!["Rust"]);
    }

    #[test]
    fn resolves_full_name_before_extension() {
        let (_, langs) = candidates_for(Path::new("Makefile")).unwrap();
        assert_eq!(langs, vec!["Makefile"]);
    }

    #[test]
    fn resolves_ambiguous_extension_with_multiple_candidates() {
        let (_, langs) = candidates_for(Path::new("script.m")).unwrap();
        assert_eq!(langs, vec!["Objective-C", "MATLAB"]);
    }

    #[test]
    fn strips_one_extra_extension_for_double_dotted_names() {
        let (_, langs) = candidates_for(Path::new("foo.d.ts")).unwrap();
        assert_eq!(langs, vec!["TypeScript"]);
    }

    #[test]
    fn extension_lookup_is_cached_and_repeatable() {
        let path = Path::new("repeat_me.rs");
        let (first, _) = candidates_for(path).unwrap();
        let (second, _) = candidates_for(path).unwrap();
        assert_eq!(first, "rs");
        assert_eq!(second, "rs");
    }

    #[test]
    fn registry_hydrates_with_sorted_delimiters() {
        let feature = registry::get("Forth").unwrap();
        assert!(feature.shebangs.contains(&"gforth"));
        assert!(!feature.line_comments.is_empty());
    }

    #[test]
    fn registry_is_idempotent() {
        let a = registry::get("Rust").unwrap() as *const LanguageFeature;
        let b = registry::get("Rust").unwrap() as *const LanguageFeature;
        assert_eq!(a, b, "second lookup should return the cached hydration");
    }
}
