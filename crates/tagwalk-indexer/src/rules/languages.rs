//! Built-in language rule tables.
//!
//! Every language is plain data: the extensions it owns and an ordered list
//! of `(regex, capture group)` pairs. Earlier patterns win, so specific
//! patterns go first. Adding a language means adding a table here.

/// Rule table for one language.
#[derive(Debug, Clone, Copy)]
pub struct LanguageRules {
    /// Display name
    pub name: &'static str,
    /// Normalised extensions (with leading dot)
    pub extensions: &'static [&'static str],
    /// Ordered `(regex, name capture group)` pairs
    pub patterns: &'static [(&'static str, usize)],
    /// Names never recorded as tags (keywords a loose pattern can pick up)
    pub reserved: &'static [&'static str],
}

pub const BUILTIN_LANGUAGES: &[LanguageRules] = &[
    RUBY, GO, RUST, PYTHON, JAVASCRIPT, TYPESCRIPT, ELIXIR, CLOJURE,
];

const RUBY: LanguageRules = LanguageRules {
    name: "Ruby",
    extensions: &[".rb"],
    patterns: &[
        (r"^\s*(?:class|module)\s+(?:[A-Z]\w*::)*([A-Z]\w*)", 1),
        (
            r"^\s*def\s+(?:self\.|[A-Z]\w*\.)?(\w+[?!=]?|\[\]=?|[-+*/%<>=!~^&|]+)",
            1,
        ),
        (r"^\s*([A-Z][A-Z0-9_]*)\s*=[^=~]", 1),
    ],
    reserved: &[],
};

const GO: LanguageRules = LanguageRules {
    name: "Go",
    extensions: &[".go"],
    patterns: &[
        (r"^func\s+\([^)]*\)\s*(\w+)", 1),
        (r"^func\s+(\w+)", 1),
        (r"^type\s+(\w+)", 1),
        (r"^\t(\w+)\s+(?:struct|interface)\s*\{", 1),
        (r"^(?:var|const)\s+(\w+)", 1),
    ],
    reserved: &[],
};

const RUST: LanguageRules = LanguageRules {
    name: "Rust",
    extensions: &[".rs"],
    patterns: &[
        (
            r#"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:(?:default|const|async|unsafe|extern(?:\s+"[^"]*")?)\s+)*fn\s+(\w+)"#,
            1,
        ),
        (
            r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:unsafe\s+)?(?:struct|enum|union|trait|type|mod)\s+(\w+)",
            1,
        ),
        (
            r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:const|static)\s+(?:mut\s+)?(\w+)\s*:",
            1,
        ),
        (r"^\s*macro_rules!\s*(\w+)", 1),
    ],
    reserved: &["_"],
};

const PYTHON: LanguageRules = LanguageRules {
    name: "Python",
    extensions: &[".py", ".pyw"],
    patterns: &[
        (r"^\s*(?:async\s+)?def\s+(\w+)", 1),
        (r"^\s*class\s+(\w+)", 1),
    ],
    reserved: &[],
};

const JS_FUNCTION: (&str, usize) = (
    r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*([\w$]+)",
    1,
);
const JS_CLASS: (&str, usize) = (
    r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([\w$]+)",
    1,
);
const JS_BOUND_FUNCTION: (&str, usize) = (
    r"^\s*(?:export\s+)?(?:const|let|var)\s+([\w$]+)\s*(?::[^=]+)?=\s*(?:async\s+)?(?:function\b|\([^)]*\)\s*(?::[^=]+)?=>|[\w$]+\s*=>)",
    1,
);
const JS_METHOD: (&str, usize) = (
    r"^\s+(?:(?:static|async|get|set|public|private|protected|readonly|override)\s+)*\*?([\w$]+)\s*\([^)]*\)\s*(?::[^{]+)?\{",
    1,
);
const JS_RESERVED: &[&str] = &[
    "if", "for", "while", "switch", "catch", "with", "function", "return", "else",
];

const JAVASCRIPT: LanguageRules = LanguageRules {
    name: "JavaScript",
    extensions: &[".js", ".jsx", ".mjs", ".cjs"],
    patterns: &[JS_FUNCTION, JS_CLASS, JS_BOUND_FUNCTION, JS_METHOD],
    reserved: JS_RESERVED,
};

const TYPESCRIPT: LanguageRules = LanguageRules {
    name: "TypeScript",
    extensions: &[".ts", ".tsx"],
    patterns: &[
        JS_FUNCTION,
        JS_CLASS,
        (
            r"^\s*(?:export\s+)?(?:declare\s+)?interface\s+([\w$]+)",
            1,
        ),
        (
            r"^\s*(?:export\s+)?(?:declare\s+)?type\s+([\w$]+)\s*(?:<[^=]*>)?\s*=",
            1,
        ),
        (
            r"^\s*(?:export\s+)?(?:declare\s+)?(?:const\s+)?enum\s+([\w$]+)",
            1,
        ),
        JS_BOUND_FUNCTION,
        JS_METHOD,
    ],
    reserved: JS_RESERVED,
};

const ELIXIR: LanguageRules = LanguageRules {
    name: "Elixir",
    extensions: &[".ex", ".exs"],
    patterns: &[
        (r"^\s*(?:defmodule|defprotocol|defimpl)\s+([\w.]+)", 1),
        (
            r"^\s*(?:def|defp|defmacro|defmacrop|defguard|defguardp|defdelegate)\s+([\w?!]+)",
            1,
        ),
    ],
    reserved: &[],
};

const CLOJURE: LanguageRules = LanguageRules {
    name: "Clojure",
    extensions: &[".clj", ".cljs", ".cljc"],
    patterns: &[
        (r"^\s*\(ns\s+([^\s()\[\]]+)", 1),
        (
            r"^\s*\(def(?:n-?|macro|multi|protocol|record|type|once|struct)?\s+(?:\^\S+\s+)?([^\s()\[\]]+)",
            1,
        ),
    ],
    reserved: &[],
};
