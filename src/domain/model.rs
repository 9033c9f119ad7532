use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// 模組資料不做 schema 驗證，原樣傳遞
pub type Record = serde_json::Value;

static PARTY_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{3}$").expect("party id pattern is valid"));

/// Country code (two upper-case letters) followed by a three character party id.
pub fn is_valid_party_id(value: &str) -> bool {
    PARTY_ID_PATTERN.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ModuleId {
    Cdrs,
    #[cfg_attr(feature = "cli", value(name = "chargingprofiles"))]
    ChargingProfiles,
    Locations,
    Sessions,
    Tariffs,
    Tokens,
}

impl ModuleId {
    pub const ALL: [ModuleId; 6] = [
        ModuleId::Cdrs,
        ModuleId::ChargingProfiles,
        ModuleId::Locations,
        ModuleId::Sessions,
        ModuleId::Tariffs,
        ModuleId::Tokens,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleId::Cdrs => "cdrs",
            ModuleId::ChargingProfiles => "chargingprofiles",
            ModuleId::Locations => "locations",
            ModuleId::Sessions => "sessions",
            ModuleId::Tariffs => "tariffs",
            ModuleId::Tokens => "tokens",
        }
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ModuleId::ALL
            .into_iter()
            .find(|module| module.as_str() == s)
            .ok_or_else(|| format!("unknown OCPI module: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterfaceRole {
    Sender,
    Receiver,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub identifier: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<InterfaceRole>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub version: String,
    pub party_id: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

impl Session {
    /// 找出服務該模組的端點；RECEIVER 端點只接收資料，不提供資料
    pub fn endpoint_for(&self, module: ModuleId) -> Option<&Endpoint> {
        self.endpoints.iter().find(|endpoint| {
            endpoint.identifier == module.as_str() && endpoint.role != Some(InterfaceRole::Receiver)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartySide {
    Sender,
    Receiver,
}

impl fmt::Display for PartySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartySide::Sender => f.write_str("sender"),
            PartySide::Receiver => f.write_str("receiver"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageCursor {
    pub offset: u64,
    pub limit: u32,
}

impl PageCursor {
    pub fn first(limit: u32) -> Self {
        Self { offset: 0, limit }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcpiResponse<T = Record> {
    #[serde(default)]
    pub data: T,
    pub status_code: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default)]
    pub timestamp: String,

    // 以下欄位來自回應標頭，不在 body 裡
    #[serde(skip)]
    pub next: Option<PageCursor>,
    #[serde(skip)]
    pub total_count: Option<u64>,
    #[serde(skip)]
    pub limit: Option<u32>,
}

impl<T> OcpiResponse<T> {
    pub fn is_success(&self) -> bool {
        (1000..2000).contains(&self.status_code)
    }

    /// OCPI 2.1.1 時間戳可能不帶時區，視為 UTC
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&self.timestamp) {
            return Some(ts.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

impl OcpiResponse<Record> {
    /// 陣列逐筆展開；單一物件視為一筆；null 沒有資料
    pub fn into_items(self) -> Vec<Record> {
        match self.data {
            Record::Array(items) => items,
            Record::Null => Vec::new(),
            other => vec![other],
        }
    }

    pub fn into_typed<U: DeserializeOwned>(self) -> serde_json::Result<OcpiResponse<U>> {
        Ok(OcpiResponse {
            data: serde_json::from_value(self.data)?,
            status_code: self.status_code,
            status_message: self.status_message,
            timestamp: self.timestamp,
            next: self.next,
            total_count: self.total_count,
            limit: self.limit,
        })
    }
}
