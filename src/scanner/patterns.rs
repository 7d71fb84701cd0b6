//! Detection pattern catalog.
//!
//! Contains the fixed, ordered set of case-insensitive patterns the
//! classifier runs against every payload:
//! - Cross-site scripting
//! - SQL injection
//! - Generic dangerous content (command execution, traversal, RCE)
//!
//! Patterns are compiled once on first use. The `regex` crate matches with
//! finite automata and never backtracks, so each pattern runs in time linear
//! in the payload length regardless of input.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Pattern name of the opening `<script` tag matcher. Low sensitivity
/// escalates it alongside injection hits.
pub const SCRIPT_OPEN: &str = "script_open";

/// Threat categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    CrossSiteScripting,
    Injection,
    GenericDangerous,
}

impl Category {
    /// Prefix used in hit labels.
    pub fn label(&self) -> &'static str {
        match self {
            Category::CrossSiteScripting => "XSS",
            Category::Injection => "SQLi",
            Category::GenericDangerous => "GENERIC",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A threat detection pattern
#[derive(Debug, Clone)]
pub struct ThreatPattern {
    /// Pattern name
    pub name: &'static str,
    /// Regex source, also used as the hit signature
    pub pattern: &'static str,
    /// Threat category
    pub category: Category,
}

/// Cross-site scripting patterns
pub static XSS_PATTERNS: &[ThreatPattern] = &[
    ThreatPattern {
        name: SCRIPT_OPEN,
        pattern: r"<\s*script\b",
        category: Category::CrossSiteScripting,
    },
    ThreatPattern {
        name: "event_handler",
        pattern: r#"on\w+\s*=\s*\\?"?[^\s>]+"#,
        category: Category::CrossSiteScripting,
    },
    ThreatPattern {
        name: "javascript_uri",
        pattern: r"javascript:\s*",
        category: Category::CrossSiteScripting,
    },
    ThreatPattern {
        name: "img_src",
        pattern: r"<\s*img\b[^>]*src\s*=",
        category: Category::CrossSiteScripting,
    },
];

/// SQL injection patterns
pub static SQLI_PATTERNS: &[ThreatPattern] = &[
    ThreatPattern {
        name: "union_select",
        pattern: r"\bUNION\s+SELECT\b",
        category: Category::Injection,
    },
    ThreatPattern {
        name: "drop_table",
        pattern: r"\bDROP\s+TABLE\b",
        category: Category::Injection,
    },
    ThreatPattern {
        name: "or_tautology",
        pattern: r"\bOR\s+1=1\b",
        category: Category::Injection,
    },
    ThreatPattern {
        name: "comment_truncation",
        pattern: r"\b--\s",
        category: Category::Injection,
    },
    ThreatPattern {
        name: "shutdown",
        pattern: r";\s*SHUTDOWN\b",
        category: Category::Injection,
    },
];

/// Command execution, downloaders, URLs, traversal and server-side script patterns
pub static GENERIC_PATTERNS: &[ThreatPattern] = &[
    ThreatPattern {
        name: "iframe_tag",
        pattern: r"<\s*/?\s*iframe\b",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "svg_tag",
        pattern: r"<\s*svg\b",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "command_exec",
        pattern: r"\bexec\b|\bxp_cmdshell\b",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "curl",
        pattern: r"\bcurl\b",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "wget",
        pattern: r"\bwget\b",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "bare_url",
        pattern: r"http[s]?://[\w\.-]+",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "exploit_param",
        pattern: r"exploit=\d+",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "path_traversal",
        pattern: r"\.\./+",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "etc_passwd",
        pattern: r"/etc/passwd",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "pipe_rm_rf",
        pattern: r"\|\s*rm\s+-rf\s+/",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "chain_rm_rf",
        pattern: r";\s*rm\s+-rf\s+/",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "php_system",
        pattern: r"<\?php.*system\s*\(",
        category: Category::GenericDangerous,
    },
    ThreatPattern {
        name: "get_cmd_param",
        pattern: r#"\$_GET\s*\[\s*['"]cmd['"]\s*\]"#,
        category: Category::GenericDangerous,
    },
];

/// A catalog entry with its compiled matcher.
#[derive(Debug)]
pub struct CompiledPattern {
    def: &'static ThreatPattern,
    regex: Regex,
}

impl CompiledPattern {
    fn compile(def: &'static ThreatPattern) -> Self {
        let regex = RegexBuilder::new(def.pattern)
            .case_insensitive(true)
            .build()
            .unwrap_or_else(|e| panic!("built-in pattern {} failed to compile: {e}", def.name));
        Self { def, regex }
    }

    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn category(&self) -> Category {
        self.def.category
    }

    /// Regex source text.
    pub fn signature(&self) -> &'static str {
        self.def.pattern
    }

    pub fn matches(&self, payload: &str) -> bool {
        self.regex.is_match(payload)
    }

    /// `"<category label>:<signature>"`, as recorded in a hit list.
    pub fn hit_label(&self) -> String {
        format!("{}:{}", self.def.category.label(), self.def.pattern)
    }
}

static CATALOG: Lazy<Vec<CompiledPattern>> = Lazy::new(|| {
    XSS_PATTERNS
        .iter()
        .chain(SQLI_PATTERNS)
        .chain(GENERIC_PATTERNS)
        .map(CompiledPattern::compile)
        .collect()
});

/// The full catalog in scan order: XSS, then SQLi, then generic.
pub fn catalog() -> &'static [CompiledPattern] {
    &CATALOG
}
