use crate::{config::Config, models::Language};

/// Binary, one-shot eval flags, and wall-clock budget for one language.
#[derive(Debug, Clone)]
pub struct LanguageSpec {
    pub language: Language,
    pub binary: String,
    pub eval_args: &'static [&'static str],
    pub timeout_ms: u64,
}

impl LanguageSpec {
    pub fn for_language(language: Language, config: &Config) -> Self {
        match language {
            Language::JavaScript => Self {
                language,
                binary: config.node_binary.clone(),
                eval_args: &["-e"],
                timeout_ms: config.javascript_timeout_ms,
            },
            // -I keeps site-packages and PYTHON* env vars out of the child.
            Language::Python => Self {
                language,
                binary: config.python_binary.clone(),
                eval_args: &["-I", "-c"],
                timeout_ms: config.python_timeout_ms,
            },
        }
    }
}
