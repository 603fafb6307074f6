use thiserror::Error;

use crate::models::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Print,
    Variable,
    If,
    ForLoop,
    Function,
    Return,
    Add,
}

/// A palette entry: one statement template with `%name%` placeholders.
#[derive(Debug, Clone)]
pub struct BlockTemplate {
    pub kind: BlockKind,
    pub label: &'static str,
    pub template: &'static str,
    pub params: &'static [&'static str],
}

pub fn templates(language: Language) -> &'static [BlockTemplate] {
    match language {
        Language::JavaScript => JAVASCRIPT_TEMPLATES,
        Language::Python => PYTHON_TEMPLATES,
    }
}

const JAVASCRIPT_TEMPLATES: &[BlockTemplate] = &[
    BlockTemplate {
        kind: BlockKind::Print,
        label: "Print",
        template: "console.log(%text%);",
        params: &["text"],
    },
    BlockTemplate {
        kind: BlockKind::Variable,
        label: "Declare Variable",
        template: "let %var% = %value%;",
        params: &["var", "value"],
    },
    BlockTemplate {
        kind: BlockKind::If,
        label: "If Statement",
        template: "if (%condition%) {\n  %body%\n}",
        params: &["condition", "body"],
    },
    BlockTemplate {
        kind: BlockKind::ForLoop,
        label: "For Loop",
        template: "for (let i = 0; i < %count%; i++) {\n  %body%\n}",
        params: &["count", "body"],
    },
    BlockTemplate {
        kind: BlockKind::Function,
        label: "Function",
        template: "function %name%(%params%) {\n  %body%\n}",
        params: &["name", "params", "body"],
    },
    BlockTemplate {
        kind: BlockKind::Return,
        label: "Return",
        template: "return %value%;",
        params: &["value"],
    },
    BlockTemplate {
        kind: BlockKind::Add,
        label: "Add",
        template: "%a% + %b%",
        params: &["a", "b"],
    },
];

const PYTHON_TEMPLATES: &[BlockTemplate] = &[
    BlockTemplate {
        kind: BlockKind::Print,
        label: "Print",
        template: "print(%text%)",
        params: &["text"],
    },
    BlockTemplate {
        kind: BlockKind::Variable,
        label: "Declare Variable",
        template: "%var% = %value%",
        params: &["var", "value"],
    },
    BlockTemplate {
        kind: BlockKind::If,
        label: "If Statement",
        template: "if %condition%:\n    %body%",
        params: &["condition", "body"],
    },
    BlockTemplate {
        kind: BlockKind::ForLoop,
        label: "For Loop",
        template: "for i in range(%count%):\n    %body%",
        params: &["count", "body"],
    },
    BlockTemplate {
        kind: BlockKind::Function,
        label: "Function",
        template: "def %name%(%params%):\n    %body%",
        params: &["name", "params", "body"],
    },
    BlockTemplate {
        kind: BlockKind::Return,
        label: "Return",
        template: "return %value%",
        params: &["value"],
    },
    BlockTemplate {
        kind: BlockKind::Add,
        label: "Add",
        template: "%a% + %b%",
        params: &["a", "b"],
    },
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("parameter {0:?} does not name a placeholder in the template")]
    UnknownParam(String),
    #[error("placeholder %{0}% has no parameter value")]
    MissingParam(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    kind: BlockKind,
    template: String,
    params: Vec<(String, String)>,
}

impl Block {
    /// Checks parameter names against the template's placeholders, so
    /// substitution itself never fails.
    pub fn new(
        kind: BlockKind,
        template: impl Into<String>,
        params: Vec<(String, String)>,
    ) -> Result<Self, BlockError> {
        let template = template.into();
        let names = placeholder_names(&template);
        for (name, _) in &params {
            if !names.iter().any(|n| n == name) {
                return Err(BlockError::UnknownParam(name.clone()));
            }
        }
        let mut ordered = Vec::with_capacity(names.len());
        for name in names {
            let (_, value) = params
                .iter()
                .find(|(n, _)| n == name)
                .ok_or_else(|| BlockError::MissingParam(name.to_string()))?;
            ordered.push((name.to_string(), value.clone()));
        }
        Ok(Self {
            kind,
            template,
            params: ordered,
        })
    }

    pub fn from_template(template: &BlockTemplate) -> Self {
        Self {
            kind: template.kind,
            template: template.template.to_string(),
            params: template
                .params
                .iter()
                .map(|name| (name.to_string(), String::new()))
                .collect(),
        }
    }

    pub fn set_param(&mut self, name: &str, value: impl Into<String>) -> Result<(), BlockError> {
        match self.params.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => {
                entry.1 = value.into();
                Ok(())
            }
            None => Err(BlockError::UnknownParam(name.to_string())),
        }
    }

    pub fn kind(&self) -> BlockKind {
        self.kind
    }
}

/// One block per line; multi-line templates keep their internal breaks.
pub fn generate_source(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_block(block: &Block) -> String {
    let mut code = block.template.clone();
    for (name, raw) in &block.params {
        let resolved = resolve_param(block.kind, name, raw);
        code = code.replace(&format!("%{name}%"), &resolved);
    }
    code
}

fn resolve_param(kind: BlockKind, name: &str, raw: &str) -> String {
    if kind == BlockKind::Print && name == "text" {
        return quote_print_argument(raw);
    }
    if raw.is_empty() {
        // keep incomplete programs inspectable
        format!("<{name}>")
    } else {
        raw.to_string()
    }
}

/// Empty input becomes an empty string literal, already-quoted and numeric
/// input passes through, anything else is encoded as a JSON string literal.
fn quote_print_argument(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "\"\"".to_string();
    }
    let quoted = trimmed.len() >= 2
        && ((trimmed.starts_with('"') && trimmed.ends_with('"'))
            || (trimmed.starts_with('\'') && trimmed.ends_with('\'')));
    if quoted || is_numeric_literal(trimmed) {
        return trimmed.to_string();
    }
    serde_json::to_string(trimmed).unwrap_or_else(|_| format!("\"{trimmed}\""))
}

// finite decimal literals only: hex, NaN, and infinity render as quoted text
fn is_numeric_literal(input: &str) -> bool {
    input.parse::<f64>().is_ok_and(f64::is_finite)
}

fn placeholder_names(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('%') else { break };
        let name = &after[..end];
        if !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        rest = &after[end + 1..];
    }
    names
}
