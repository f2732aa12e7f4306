use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::models::file::UploadPolicy;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum MetadataBackend {
    #[serde(rename = "postgrest")]
    PostgRest,
    #[serde(rename = "postgres")]
    Postgres,
}

impl FromStr for MetadataBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgrest" => Ok(MetadataBackend::PostgRest),
            "postgres" => Ok(MetadataBackend::Postgres),
            other => Err(ConfigError::Invalid {
                key: "METADATA_BACKEND",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SupabaseSettings {
    pub url: String,
    pub anon_key: String,
    pub jwt_secret: String,
    pub bucket_name: String,
    pub table_name: String,
}

#[derive(Debug, Clone)]
pub struct VaultConfig {
    pub supabase: SupabaseSettings,
    pub metadata_backend: MetadataBackend,
    pub database_url: Option<String>,
    pub port: u16,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub access_reference_ttl_secs: u64,
    pub upload_policy: UploadPolicy,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {key}")]
    Invalid { key: &'static str, value: String },
}

impl VaultConfig {
    pub const DEFAULT_ACCESS_REFERENCE_TTL_SECS: u64 = 60;
    pub const MAX_ACCESS_REFERENCE_TTL_SECS: u64 = 7 * 24 * 60 * 60;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let supabase = SupabaseSettings {
            url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
            anon_key: required("SUPABASE_ANON_KEY")?,
            jwt_secret: required("SUPABASE_JWT_SECRET")?,
            bucket_name: lookup("VAULT_BUCKET").unwrap_or_else(|| "documents".to_string()),
            table_name: lookup("VAULT_TABLE").unwrap_or_else(|| "documents".to_string()),
        };

        let metadata_backend = match lookup("METADATA_BACKEND") {
            Some(value) => value.parse()?,
            None => MetadataBackend::PostgRest,
        };

        let database_url = lookup("DATABASE_URL");
        if metadata_backend == MetadataBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let port = parse_or("PORT", lookup("PORT"), 8080u16)?;
        let access_reference_ttl_secs = parse_or(
            "ACCESS_REFERENCE_TTL_SECS",
            lookup("ACCESS_REFERENCE_TTL_SECS"),
            Self::DEFAULT_ACCESS_REFERENCE_TTL_SECS,
        )?;
        if !(1..=Self::MAX_ACCESS_REFERENCE_TTL_SECS).contains(&access_reference_ttl_secs) {
            return Err(ConfigError::Invalid {
                key: "ACCESS_REFERENCE_TTL_SECS",
                value: access_reference_ttl_secs.to_string(),
            });
        }

        let mut upload_policy = UploadPolicy::default();
        upload_policy.max_size = parse_or(
            "MAX_FILE_SIZE",
            lookup("MAX_FILE_SIZE"),
            UploadPolicy::DEFAULT_MAX_SIZE,
        )?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS").map(|origins| {
            origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Ok(Self {
            supabase,
            metadata_backend,
            database_url,
            port,
            cors_allowed_origins,
            access_reference_ttl_secs,
            upload_policy,
        })
    }
}

fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    let Some(value) = raw else {
        return Ok(default);
    };
    match value.trim().parse() {
        Ok(parsed) => Ok(parsed),
        Err(_) => Err(ConfigError::Invalid { key, value }),
    }
}
