use crate::core::seeder::DormitoryLayout;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range, validate_url,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const API_KEY_ENV: &str = "API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub institution: InstitutionConfig,
    #[serde(default = "DormitoryLayout::defaults")]
    pub dormitories: Vec<DormitoryLayout>,
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstitutionConfig {
    pub name: String,
    pub short_name: String,
    pub academic_year: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_path: String,
    pub image_timeout_seconds: u64,
}

impl Default for InstitutionConfig {
    fn default() -> Self {
        Self {
            name: "Guliston davlat pedagogika instituti".to_string(),
            short_name: "GDPI".to_string(),
            academic_year: "2025-2026".to_string(),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: std::env::var(API_KEY_ENV).ok(),
            timeout_seconds: 60,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_path: "./output".to_string(),
            image_timeout_seconds: 10,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            institution: InstitutionConfig::default(),
            dormitories: DormitoryLayout::defaults(),
            assistant: AssistantConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashboardError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        if config.assistant.api_key.is_none() {
            config.assistant.api_key = std::env::var(API_KEY_ENV).ok();
        }
        Ok(config)
    }

    /// Replaces `${VAR}` with the value of the environment variable; unknown
    /// variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashboardError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("assistant.endpoint", &self.assistant.endpoint)?;
        validate_non_empty_string("assistant.model", &self.assistant.model)?;
        validate_positive_number(
            "assistant.timeout_seconds",
            self.assistant.timeout_seconds as usize,
            1,
        )?;
        validate_path("export.output_path", &self.export.output_path)?;
        validate_range(
            "export.image_timeout_seconds",
            self.export.image_timeout_seconds,
            1,
            300,
        )?;

        let mut ids = HashSet::new();
        for layout in &self.dormitories {
            validate_non_empty_string("dormitories.name", &layout.name)?;
            validate_positive_number("dormitories.total_rooms", layout.total_rooms, 1)?;
            if !ids.insert(layout.id) {
                return Err(DashboardError::InvalidConfigValueError {
                    field: "dormitories.id".to_string(),
                    value: layout.id.to_string(),
                    reason: "Dormitory ids must be unique".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for DashboardConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
