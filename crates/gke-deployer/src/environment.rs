use std::sync::OnceLock;

use regex::Regex;

use crate::error::DeployerError;

/// Literal endpoints must contain a match for this pattern (unanchored).
pub const URL_PATTERN: &str = "https://.*/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Test,
    Staging,
    Staging2,
    Prod,
    Custom(String),
}

impl Environment {
    /// Reserved names win over the URL pattern; matching is case-sensitive.
    pub fn parse(value: &str) -> Result<Self, DeployerError> {
        let env = match value {
            "test" => Self::Test,
            "staging" => Self::Staging,
            "staging2" => Self::Staging2,
            "prod" => Self::Prod,
            other if url_regex().is_match(other) => Self::Custom(other.to_string()),
            other => {
                return Err(DeployerError::InvalidEnvironment {
                    value: other.to_string(),
                    pattern: URL_PATTERN,
                })
            }
        };
        Ok(env)
    }

    pub fn endpoint(&self) -> &str {
        match self {
            Self::Test => "https://test-container.sandbox.googleapis.com/",
            Self::Staging => "https://staging-container.sandbox.googleapis.com/",
            Self::Staging2 => "https://staging2-container.sandbox.googleapis.com/",
            Self::Prod => "https://container.googleapis.com/",
            Self::Custom(url) => url,
        }
    }
}

pub fn resolve_endpoint(value: &str) -> Result<String, DeployerError> {
    Environment::parse(value).map(|env| env.endpoint().to_string())
}

fn url_regex() -> &'static Regex {
    static URL_RE: OnceLock<Regex> = OnceLock::new();
    URL_RE.get_or_init(|| Regex::new(URL_PATTERN).expect("URL_PATTERN is a valid regex"))
}
