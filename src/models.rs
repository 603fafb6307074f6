use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Python,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "javascript" => Ok(Self::JavaScript),
            "python" => Ok(Self::Python),
            _ => Err(format!("unsupported language: {s}")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JavaScript => f.write_str("javascript"),
            Self::Python => f.write_str("python"),
        }
    }
}

/// Wire body for `POST /execute`. Both fields arrive loosely typed so a
/// non-string `code` or unknown `language` maps to its taxonomy failure
/// instead of a decode rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub code: serde_json::Value,
    #[serde(default = "default_language")]
    pub language: String,
}

impl ExecuteRequest {
    /// The submitted source, when it is a non-empty string.
    pub fn code_text(&self) -> Option<&str> {
        self.code.as_str().filter(|code| !code.is_empty())
    }
}

fn default_language() -> String {
    "javascript".to_string()
}

#[derive(Debug, Clone, Serialize)]
pub struct ExecuteResponse {
    pub success: bool,
    pub output: String,
}
