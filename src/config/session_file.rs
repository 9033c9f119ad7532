use crate::domain::model::{Endpoint, Session};
use crate::utils::error::{OcpiError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_party_id, validate_required_field, validate_url, Validate,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFormat {
    Json,
    Toml,
}

impl SessionFormat {
    /// `.json` 以外的副檔名一律當作 TOML
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SessionFormat::Json,
            _ => SessionFormat::Toml,
        }
    }
}

/// 本機保存的 session 描述檔
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionFile {
    pub token: Option<String>,
    pub version: Option<String>,
    pub party_id: Option<String>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl SessionFile {
    /// 從檔案載入 session
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OcpiError::IoError)?;
        Self::parse(&content, SessionFormat::from_path(&path))
    }

    pub fn parse(content: &str, format: SessionFormat) -> Result<Self> {
        let processed = substitute_env_vars(content);
        let file = match format {
            SessionFormat::Json => serde_json::from_str(&processed)?,
            SessionFormat::Toml => toml::from_str(&processed)?,
        };
        Ok(file)
    }

    pub fn into_session(self) -> Result<Session> {
        self.validate()?;
        let SessionFile {
            token,
            version,
            party_id,
            endpoints,
        } = self;

        Ok(Session {
            token: token.unwrap_or_default(),
            version: version.unwrap_or_default(),
            party_id: party_id.unwrap_or_default(),
            endpoints,
        })
    }
}

impl Validate for SessionFile {
    fn validate(&self) -> Result<()> {
        let token = validate_required_field("token", &self.token)?;
        validate_non_empty_string("token", token)?;

        let version = validate_required_field("version", &self.version)?;
        validate_non_empty_string("version", version)?;

        let party_id = validate_required_field("party_id", &self.party_id)?;
        validate_party_id("party_id", party_id)?;

        for (index, endpoint) in self.endpoints.iter().enumerate() {
            validate_non_empty_string(&format!("endpoints[{}].identifier", index), &endpoint.identifier)?;
            validate_url(&format!("endpoints[{}].url", index), &endpoint.url)?;
        }

        Ok(())
    }
}

/// 替換 `${VAR}`；找不到的變數保留原樣
fn substitute_env_vars(content: &str) -> String {
    ENV_VAR_PATTERN
        .replace_all(content, |caps: &Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
}
