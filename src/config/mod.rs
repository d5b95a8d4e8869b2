use crate::core::classifier::{InterfaceClassifier, DEFAULT_IGNORE_ATTRIBUTE};
use crate::domain::model::{Attribute, RUNTIME_ORIGIN};
use crate::domain::ports::ProxyTypeBuilder;
use crate::utils::error::{ProxyError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_required_field, validate_type_name, validate_type_names,
    Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuilderConfig {
    #[serde(default)]
    pub proxy: ProxyConfig,
    pub classifier: Option<ClassifierConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub target_type: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    pub base_type: Option<String>,
    pub name: Option<String>,
    pub proxy_target_attributes: Option<bool>,
    #[serde(default)]
    pub type_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub ignore_attribute: Option<String>,
    pub framework_origins: Option<Vec<String>>,
}

impl BuilderConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProxyError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ProxyError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn classifier(&self) -> InterfaceClassifier {
        match &self.classifier {
            Some(section) => InterfaceClassifier::new(
                section
                    .ignore_attribute
                    .clone()
                    .unwrap_or_else(|| DEFAULT_IGNORE_ATTRIBUTE.to_string()),
                section
                    .framework_origins
                    .clone()
                    .unwrap_or_else(|| vec![RUNTIME_ORIGIN.to_string()]),
            ),
            None => InterfaceClassifier::default(),
        }
    }

    /// Copies the `[proxy]` section onto a builder; unset fields keep the builder's values.
    pub fn apply_to<B: ProxyTypeBuilder + ?Sized>(&self, builder: &mut B) {
        let settings = builder.settings_mut();
        if let Some(target) = &self.proxy.target_type {
            settings.target_type = Some(target.clone());
        }
        if !self.proxy.interfaces.is_empty() {
            settings.interfaces = self.proxy.interfaces.clone();
        }
        if let Some(base) = &self.proxy.base_type {
            settings.base_type = base.clone();
        }
        if let Some(name) = &self.proxy.name {
            settings.name = Some(name.clone());
        }
        if let Some(enabled) = self.proxy.proxy_target_attributes {
            settings.proxy_target_attributes = enabled;
        }
        if !self.proxy.type_attributes.is_empty() {
            settings.type_attributes = self.proxy.type_attributes.clone();
        }
    }
}

impl Validate for BuilderConfig {
    fn validate(&self) -> Result<()> {
        let target = validate_required_field("proxy.target_type", &self.proxy.target_type)?;
        validate_type_name("proxy.target_type", target)?;
        validate_type_names("proxy.interfaces", &self.proxy.interfaces)?;

        if let Some(base) = &self.proxy.base_type {
            validate_type_name("proxy.base_type", base)?;
        }
        if let Some(name) = &self.proxy.name {
            validate_type_name("proxy.name", name)?;
        }
        for attribute in &self.proxy.type_attributes {
            validate_non_empty_string("proxy.type_attributes", &attribute.name)?;
        }

        if let Some(classifier) = &self.classifier {
            if let Some(attribute) = &classifier.ignore_attribute {
                validate_non_empty_string("classifier.ignore_attribute", attribute)?;
            }
            for origin in classifier.framework_origins.iter().flatten() {
                validate_non_empty_string("classifier.framework_origins", origin)?;
            }
        }

        Ok(())
    }
}

/// 替換環境變數 (例如 ${TARGET_TYPE})
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ProxyError::ConfigValidationError {
        field: "env_substitution".to_string(),
        message: e.to_string(),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}
