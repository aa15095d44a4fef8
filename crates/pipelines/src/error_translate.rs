//! Error translation: parse a pasted error, classify it, and build a
//! targeted search query plus a result ranking policy.
//!
//! Language detection is ordered: JS/TS evidence is checked before Python
//! because a bare `File …` line is ambiguous between the two. Error-type
//! extraction is two-pass: the language-agnostic web-error table wins over
//! language-specific tables.

use std::collections::HashSet;

use regex::Regex;

use research_clients::SearchHit;

const MESSAGE_MAX_CHARS: usize = 200;
const QUERY_TERM_LIMIT: usize = 8;

/// Terms always harvested when present anywhere in the input. `undefined`
/// and `null` stay in deliberately: they carry search value.
const IMPORTANT_TERMS: &[&str] = &[
    "CORS",
    "cors",
    "fetch",
    "async",
    "await",
    "Promise",
    "undefined",
    "null",
    "map",
    "filter",
    "reduce",
    "Access-Control-Allow-Origin",
    "XMLHttpRequest",
    "module",
    "import",
    "export",
    "require",
];

/// Hosts that never answer "why is my code broken" questions.
const IRRELEVANT_DOMAINS: &[&str] = &[
    "hub.docker.com",
    "crates.io",
    "npmjs.com",
    "pypi.org",
    "pkg.go.dev",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Java,
    Go,
    Unknown,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Rust => "rust",
            Self::Java => "java",
            Self::Go => "go",
            Self::Unknown => "unknown",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Some(Self::Python),
            "javascript" | "js" => Some(Self::JavaScript),
            "typescript" | "ts" => Some(Self::TypeScript),
            "rust" => Some(Self::Rust),
            "java" => Some(Self::Java),
            "go" | "golang" => Some(Self::Go),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    React,
    Vue,
    Angular,
    Django,
    Flask,
    FastApi,
    Express,
    Next,
}

impl Framework {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::React => "react",
            Self::Vue => "vue",
            Self::Angular => "angular",
            Self::Django => "django",
            Self::Flask => "flask",
            Self::FastApi => "fastapi",
            Self::Express => "express",
            Self::Next => "next.js",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "react" => Some(Self::React),
            "vue" => Some(Self::Vue),
            "angular" => Some(Self::Angular),
            "django" => Some(Self::Django),
            "flask" => Some(Self::Flask),
            "fastapi" => Some(Self::FastApi),
            "express" => Some(Self::Express),
            "next" | "next.js" | "nextjs" => Some(Self::Next),
            _ => None,
        }
    }
}

/// Structured view of one pasted error.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ParsedError {
    pub language: Language,
    pub framework: Option<Framework>,
    pub error_type: String,
    pub message: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    /// Insertion-ordered set: whitelist hits, then quoted substrings, then
    /// identifiers. Never contains `error_type`.
    pub key_terms: Vec<String>,
}

pub struct ErrorParser {
    web_errors: Vec<(Regex, &'static str)>,
    ts_code: Regex,
    js_error_names: Regex,
    python_error_names: Regex,
    rust_error_code: Regex,
    java_error_names: Regex,
    go_panic: Regex,
    quoted: Regex,
    camel_case: Regex,
    snake_case: Regex,
    python_file_line: Regex,
    rust_file_line: Regex,
    js_file_line: Regex,
    generic_file_line: Regex,
    js_frame: Regex,
}

impl Default for ErrorParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorParser {
    pub fn new() -> Self {
        let re = |pattern: &str| Regex::new(pattern).expect("static regex");
        Self {
            web_errors: vec![
                (
                    re(r"(?i)CORS policy|Access-Control-Allow-Origin|No.*Access-Control"),
                    "CORS Error",
                ),
                (
                    re(r"(?i)fetch.*failed|Failed to fetch|NetworkError"),
                    "Fetch Error",
                ),
                (
                    re(r#"Cannot read propert(?:y|ies) ['"].+?['"] of"#),
                    "Cannot read property",
                ),
            ],
            ts_code: re(r"\berror TS(\d+)"),
            js_error_names: re(
                r"\b(TypeError|ReferenceError|SyntaxError|RangeError|EvalError|URIError)\b",
            ),
            python_error_names: re(r"\b([A-Z][A-Za-z]*(?:Error|Exception|Warning))\b"),
            rust_error_code: re(r"error\[(E\d{4})\]"),
            java_error_names: re(r"\b([A-Z][A-Za-z]*(?:Exception|Error))\b"),
            go_panic: re(r"panic: (.+)"),
            quoted: re(r#"'([^']+)'|"([^"]+)"|`([^`]+)`"#),
            camel_case: re(r"\b[A-Z][a-z0-9]+(?:[A-Z][a-z0-9]+)+\b"),
            snake_case: re(r"\b[a-z][a-z0-9]*(?:_[a-z0-9]+)+\b"),
            python_file_line: re(r#"File "([^"]+)", line (\d+)"#),
            rust_file_line: re(r"-->\s*([^:\s]+):(\d+)"),
            js_file_line: re(r"at .*?\(?([^\s()]+?):(\d+):\d+\)?"),
            generic_file_line: re(r"([\w./\\-]+\.(?:py|jsx?|tsx?|rs|java|go)):(\d+)"),
            js_frame: re(r"at \S+ \(.+:\d+:\d+\)|at .+:\d+:\d+"),
        }
    }

    /// Parse `input` with optional caller-provided language/framework
    /// overrides (overrides win over detection).
    pub fn parse(
        &self,
        input: &str,
        language_hint: Option<Language>,
        framework_hint: Option<Framework>,
    ) -> ParsedError {
        let language = language_hint.unwrap_or_else(|| self.detect_language(input));
        let framework = framework_hint.or_else(|| detect_framework(input));
        let error_type = self.extract_error_type(input, language);
        let (file, line) = self.extract_location(input, language);
        let key_terms = self.extract_key_terms(input, &error_type);

        let message = input
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("")
            .chars()
            .take(MESSAGE_MAX_CHARS)
            .collect();

        ParsedError {
            language,
            framework,
            error_type,
            message,
            file,
            line,
            key_terms,
        }
    }

    /// Ordered detection; JS/TS evidence is consulted before Python.
    fn detect_language(&self, input: &str) -> Language {
        // TypeScript: its extensions or a TS error code.
        if input.contains(".tsx") || input.contains(".ts:") || self.ts_code.is_match(input) {
            return Language::TypeScript;
        }
        // JavaScript: extensions, stack-frame shapes, or browser-only APIs.
        if input.contains(".jsx")
            || input.contains(".js:")
            || input.contains(".mjs")
            || self.js_frame.is_match(input)
            || input.contains("XMLHttpRequest")
            || input.contains("node_modules")
        {
            return Language::JavaScript;
        }
        if input.contains("Traceback (most recent call last)")
            || self.python_file_line.is_match(input)
            || input.contains(".py")
        {
            return Language::Python;
        }
        if self.rust_error_code.is_match(input)
            || input.contains(".rs:")
            || input.contains("-->")
            || input.contains("thread 'main' panicked")
        {
            return Language::Rust;
        }
        if input.contains("Exception in thread")
            || input.contains(".java:")
            || input.contains("Caused by:")
        {
            return Language::Java;
        }
        if input.contains("goroutine")
            || input.contains(".go:")
            || self.go_panic.is_match(input)
        {
            return Language::Go;
        }
        // Plain JS error names with no other evidence still read as JS.
        if self.js_error_names.is_match(input) {
            return Language::JavaScript;
        }
        Language::Unknown
    }

    /// Two-pass extraction: the web-error table is checked first so CORS
    /// and fetch failures classify the same way in every language.
    fn extract_error_type(&self, input: &str, language: Language) -> String {
        for (pattern, label) in &self.web_errors {
            if pattern.is_match(input) {
                return (*label).to_string();
            }
        }

        match language {
            Language::Rust => {
                if let Some(caps) = self.rust_error_code.captures(input) {
                    return rust_error_label(&caps[1]);
                }
                if input.contains("borrow of moved value") || input.contains("cannot borrow") {
                    return "borrow error".to_string();
                }
                if input.contains("mismatched types") {
                    return "type mismatch".to_string();
                }
            }
            Language::TypeScript => {
                if let Some(caps) = self.ts_code.captures(input) {
                    return format!("TS{}", &caps[1]);
                }
                if let Some(caps) = self.js_error_names.captures(input) {
                    return caps[1].to_string();
                }
            }
            Language::JavaScript => {
                if let Some(caps) = self.js_error_names.captures(input) {
                    return caps[1].to_string();
                }
            }
            Language::Python => {
                if let Some(caps) = self.python_error_names.captures(input) {
                    return caps[1].to_string();
                }
            }
            Language::Java => {
                if let Some(caps) = self.java_error_names.captures(input) {
                    return caps[1].to_string();
                }
            }
            Language::Go => {
                if let Some(caps) = self.go_panic.captures(input) {
                    let detail = caps[1].trim();
                    return format!(
                        "panic: {}",
                        detail.chars().take(60).collect::<String>()
                    );
                }
            }
            Language::Unknown => {
                // No language table; still try the common exception shapes.
                if let Some(caps) = self.js_error_names.captures(input) {
                    return caps[1].to_string();
                }
                if let Some(caps) = self.python_error_names.captures(input) {
                    return caps[1].to_string();
                }
            }
        }

        "Unknown Error".to_string()
    }

    fn extract_location(&self, input: &str, language: Language) -> (Option<String>, Option<u32>) {
        let ordered: &[&Regex] = match language {
            Language::Python => &[&self.python_file_line, &self.generic_file_line],
            Language::Rust => &[&self.rust_file_line, &self.generic_file_line],
            Language::JavaScript | Language::TypeScript => {
                &[&self.js_file_line, &self.generic_file_line]
            }
            _ => &[&self.generic_file_line],
        };
        for pattern in ordered {
            if let Some(caps) = pattern.captures(input) {
                let file = caps[1].to_string();
                let line = caps[2].parse().ok();
                return (Some(file), line);
            }
        }
        (None, None)
    }

    /// Ordered-set key terms: whitelist hits, then quoted substrings, then
    /// CamelCase/snake_case identifiers; the error type itself is removed.
    fn extract_key_terms(&self, input: &str, error_type: &str) -> Vec<String> {
        let mut terms = Vec::new();
        let mut seen = HashSet::new();
        let mut push = |term: &str| {
            let term = term.trim();
            if term.is_empty() || term == error_type {
                return;
            }
            if seen.insert(term.to_string()) {
                terms.push(term.to_string());
            }
        };

        for term in IMPORTANT_TERMS {
            if contains_term(input, term) {
                push(term);
            }
        }

        for caps in self.quoted.captures_iter(input) {
            let inner = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or("");
            // Quoted file paths and URLs are location noise, not search terms.
            if inner.len() < 60 && !inner.contains('/') && !inner.contains(' ') {
                push(inner);
            }
        }

        for caps in self.camel_case.find_iter(input) {
            if caps.as_str().len() >= 3 {
                push(caps.as_str());
            }
        }
        for caps in self.snake_case.find_iter(input) {
            if caps.as_str().len() >= 3 {
                push(caps.as_str());
            }
        }

        terms
    }

    /// `"{language} {framework} {errorType} {keyTerms} site:stackoverflow.com"`,
    /// empty fields omitted.
    pub fn build_search_query(&self, parsed: &ParsedError) -> String {
        let mut parts: Vec<String> = Vec::new();
        if parsed.language != Language::Unknown {
            parts.push(parsed.language.as_str().to_string());
        }
        if let Some(framework) = parsed.framework {
            parts.push(framework.as_str().to_string());
        }
        if parsed.error_type != "Unknown Error" {
            parts.push(parsed.error_type.clone());
        }
        parts.extend(parsed.key_terms.iter().take(QUERY_TERM_LIMIT).cloned());
        parts.push("site:stackoverflow.com".to_string());
        parts.join(" ")
    }
}

/// Framework signatures scanned over the whole input.
fn detect_framework(input: &str) -> Option<Framework> {
    let lowered = input.to_lowercase();
    const SIGNATURES: &[(Framework, &[&str])] = &[
        (Framework::Next, &["next.js", "nextjs", "next/router", "next/link"]),
        (Framework::React, &["react", "jsx", "usestate", "useeffect"]),
        (Framework::Vue, &["vue", "nuxt"]),
        (Framework::Angular, &["angular", "ngmodule", "ng serve"]),
        (Framework::Django, &["django"]),
        (Framework::Flask, &["flask", "werkzeug"]),
        (Framework::FastApi, &["fastapi", "uvicorn", "starlette"]),
        (Framework::Express, &["express", "middleware"]),
    ];
    for (framework, tokens) in SIGNATURES {
        if tokens.iter().any(|t| lowered.contains(t)) {
            return Some(*framework);
        }
    }
    None
}

fn rust_error_label(code: &str) -> String {
    match code {
        "E0382" | "E0502" | "E0499" | "E0505" => "borrow error".to_string(),
        "E0308" => "type mismatch".to_string(),
        other => format!("compiler error {other}"),
    }
}

/// Case-insensitive word-boundary containment that tolerates hyphenated
/// terms. Case-insensitivity lets an input containing `CORS` satisfy both
/// the `CORS` and `cors` whitelist entries.
fn contains_term(raw_input: &str, raw_term: &str) -> bool {
    let input = raw_input.to_lowercase();
    let term = raw_term.to_lowercase();
    let (input, term) = (input.as_str(), term.as_str());
    let bytes = input.as_bytes();
    let mut start = 0;
    while let Some(pos) = input[start..].find(term) {
        let begin = start + pos;
        let end = begin + term.len();
        let left_ok = begin == 0 || !is_word_byte(bytes[begin - 1]);
        let right_ok = end >= bytes.len() || !is_word_byte(bytes[end]);
        if left_ok && right_ok {
            return true;
        }
        start = begin + 1;
    }
    false
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Drop hits from irrelevant hosts and move Stack Overflow answers to the
/// front, preserving upstream order within each group.
pub fn filter_and_rank_hits(hits: Vec<SearchHit>, max_results: usize) -> Vec<SearchHit> {
    let relevant: Vec<SearchHit> = hits
        .into_iter()
        .filter(|hit| {
            hit_host(hit)
                .map(|host| !IRRELEVANT_DOMAINS.iter().any(|d| host == *d))
                .unwrap_or(true)
        })
        .collect();

    let (stack_overflow, rest): (Vec<SearchHit>, Vec<SearchHit>) = relevant
        .into_iter()
        .partition(|hit| hit_host(hit).is_some_and(|host| host == "stackoverflow.com"));

    stack_overflow
        .into_iter()
        .chain(rest)
        .take(max_results)
        .collect()
}

fn hit_host(hit: &SearchHit) -> Option<String> {
    let parsed = url::Url::parse(&hit.url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}
