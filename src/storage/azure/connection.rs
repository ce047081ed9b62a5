//! Storage account connection string parsing.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::ConfigError;

/// Account name of the local development storage emulator.
pub const DEV_ACCOUNT: &str = "devstoreaccount1";

/// Account key of the local development storage emulator (base64 encoded).
pub const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

/// Blob endpoint of the local development storage emulator.
pub const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Table endpoint of the local development storage emulator.
pub const DEV_TABLE_ENDPOINT: &str = "http://127.0.0.1:10002/devstoreaccount1";

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Parsed `Key=Value;...` storage connection string.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    pub account_name: String,
    account_key: String,
    pub blob_endpoint: Url,
    pub table_endpoint: Url,
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("account_name", &self.account_name)
            .field("account_key", &"[REDACTED]")
            .field("blob_endpoint", &self.blob_endpoint.as_str())
            .field("table_endpoint", &self.table_endpoint.as_str())
            .finish()
    }
}

impl ConnectionString {
    /// Returns the settings of the local development storage emulator.
    pub fn development() -> Self {
        Self {
            account_name: DEV_ACCOUNT.to_string(),
            account_key: DEV_ACCOUNT_KEY.to_string(),
            blob_endpoint: parse_endpoint(DEV_BLOB_ENDPOINT).expect("static endpoint"),
            table_endpoint: parse_endpoint(DEV_TABLE_ENDPOINT).expect("static endpoint"),
        }
    }

    /// Returns the base64 account key.
    pub fn account_key(&self) -> &str {
        &self.account_key
    }
}

impl FromStr for ConnectionString {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut settings = HashMap::new();
        for segment in s.split(';').map(str::trim).filter(|seg| !seg.is_empty()) {
            let (key, value) = segment
                .split_once('=')
                .ok_or_else(|| ConfigError::MalformedSegment(segment.to_string()))?;
            settings.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        if settings
            .get("usedevelopmentstorage")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
        {
            return Ok(Self::development());
        }

        let account_name = settings
            .remove("accountname")
            .ok_or(ConfigError::MissingSetting("AccountName"))?;
        let account_key = settings
            .remove("accountkey")
            .ok_or(ConfigError::MissingSetting("AccountKey"))?;
        BASE64
            .decode(&account_key)
            .map_err(|_| ConfigError::InvalidAccountKey)?;

        let protocol = settings
            .remove("defaultendpointsprotocol")
            .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string());
        let suffix = settings
            .remove("endpointsuffix")
            .unwrap_or_else(|| DEFAULT_ENDPOINT_SUFFIX.to_string());

        let blob_endpoint = settings
            .remove("blobendpoint")
            .unwrap_or_else(|| format!("{}://{}.blob.{}", protocol, account_name, suffix));
        let table_endpoint = settings
            .remove("tableendpoint")
            .unwrap_or_else(|| format!("{}://{}.table.{}", protocol, account_name, suffix));

        Ok(Self {
            account_name,
            account_key,
            blob_endpoint: parse_endpoint(&blob_endpoint)?,
            table_endpoint: parse_endpoint(&table_endpoint)?,
        })
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ConfigError> {
    Url::parse(endpoint.trim_end_matches('/'))
        .map_err(|e| ConfigError::InvalidEndpoint(endpoint.to_string(), e.to_string()))
}
