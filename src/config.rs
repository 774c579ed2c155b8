use crate::error::ConfigError;
use serde::Deserialize;
use std::time::Duration;
use std::{fs, io, path::Path};
use time::UtcOffset;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportSection,
    #[serde(rename = "google_oauth")]
    pub google: GoogleSection,
    pub llm: LlmSection,
    pub slack: SlackSection,
}

/// Everything the runner needs for one report. Built once per run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSection {
    pub spreadsheet_id: String,
    pub sheet_range: String,
    pub slack_channel: String,
    /// Reference timezone as whole hours east of UTC.
    pub utc_offset_hours: i8,
    pub page_size: u32,
    pub page_delay_ms: u64,
    pub summary_max_length: usize,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            spreadsheet_id: "1QQ8bZUodwLTs_lc8Vxry_EoPIhdGb8kaHtQN19ScfAc".to_string(),
            sheet_range: "Sheet1!A:B".to_string(),
            slack_channel: "#mydaily-report".to_string(),
            utc_offset_hours: 6,
            page_size: 100,
            page_delay_ms: 1000,
            summary_max_length: 130,
        }
    }
}

impl ReportSection {
    pub fn utc_offset(&self) -> Result<UtcOffset, ConfigError> {
        UtcOffset::from_hms(self.utc_offset_hours, 0, 0)
            .map_err(|_| ConfigError::InvalidOffset(self.utc_offset_hours))
    }

    /// Gmail rejects `maxResults` above 500.
    pub fn clamped_page_size(&self) -> u32 {
        self.page_size.clamp(1, 500)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleSection {
    pub credentials_path: String,
    pub token_cache_path: String,
}

impl Default for GoogleSection {
    fn default() -> Self {
        Self {
            credentials_path: "credentials.json".to_string(),
            token_cache_path: "token.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "meta-llama/llama-4-scout-17b-16e-instruct".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SlackSection {
    pub base_url: String,
}

impl Default for SlackSection {
    fn default() -> Self {
        Self {
            base_url: "https://slack.com/api".to_string(),
        }
    }
}

impl Config {
    /// Load the TOML config. A missing file yields the built-in defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// API keys that must be present before the run touches the network.
pub struct Secrets {
    pub slack_bot_token: String,
    pub llm_api_key: String,
}

impl Secrets {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            slack_bot_token: required(&lookup, "SLACK_BOT_TOKEN")?,
            llm_api_key: required(&lookup, "GROQ_API_KEY")?,
        })
    }
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    match lookup(name) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingSecret(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::parse("").unwrap();
        assert_eq!(cfg.report.sheet_range, "Sheet1!A:B");
        assert_eq!(cfg.report.page_size, 100);
        assert_eq!(cfg.report.summary_max_length, 130);
        assert_eq!(cfg.google.token_cache_path, "token.json");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::parse(
            r##"
            [report]
            slack_channel = "#ops"
            page_size = 900

            [llm]
            model = "llama3"
            "##,
        )
        .unwrap();
        assert_eq!(cfg.report.slack_channel, "#ops");
        assert_eq!(cfg.report.clamped_page_size(), 500);
        assert_eq!(cfg.report.utc_offset_hours, 6);
        assert_eq!(cfg.llm.model, "llama3");
        assert_eq!(cfg.llm.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn example_config_parses() {
        let cfg = Config::parse(include_str!("../daily_digest.example.toml")).unwrap();
        assert_eq!(cfg.report.slack_channel, "#mydaily-report");
        assert_eq!(cfg.report.page_delay(), Duration::from_secs(1));
        assert_eq!(cfg.google.credentials_path, "credentials.json");
        assert_eq!(cfg.slack.base_url, "https://slack.com/api");
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let cfg = Config::load("/nonexistent/daily_digest.toml").unwrap();
        assert_eq!(cfg.report.utc_offset_hours, 6);
    }

    fn secrets_from(pairs: &[(&str, &str)]) -> Result<Secrets, ConfigError> {
        let vars: std::collections::HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Secrets::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn absent_secret_is_fatal() {
        let err = secrets_from(&[("GROQ_API_KEY", "gsk")]).err().unwrap();
        assert!(matches!(err, ConfigError::MissingSecret("SLACK_BOT_TOKEN")));
    }

    #[test]
    fn blank_secret_is_fatal() {
        let err = secrets_from(&[("SLACK_BOT_TOKEN", "xoxb"), ("GROQ_API_KEY", "  \t")])
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::MissingSecret("GROQ_API_KEY")));
    }

    #[test]
    fn both_secrets_present() {
        let secrets = secrets_from(&[("SLACK_BOT_TOKEN", "xoxb"), ("GROQ_API_KEY", "gsk")]).unwrap();
        assert_eq!(secrets.slack_bot_token, "xoxb");
        assert_eq!(secrets.llm_api_key, "gsk");
    }

    #[test]
    fn rejects_out_of_range_offset() {
        let section = ReportSection {
            utc_offset_hours: 30,
            ..ReportSection::default()
        };
        assert!(matches!(
            section.utc_offset(),
            Err(ConfigError::InvalidOffset(30))
        ));
    }
}
