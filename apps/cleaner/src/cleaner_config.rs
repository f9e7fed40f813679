use std::env;
use std::fmt::Display;
use std::num::NonZeroU32;
use std::str::FromStr;
use std::time::Duration;

use sweeper_application::{FilterMode, RetirementOptions};
use sweeper_core::{AppError, AppResult, NonEmptyString};
use sweeper_domain::{JobId, ProjectName, RetentionWindow};
use sweeper_infrastructure::{ExecutionApiSettings, RetrySettings};
use url::Url;

const MIN_PORT: u16 = 1024;
const MIN_API_VERSION: u16 = 14;
const MAX_API_VERSION: u16 = 20;

/// Configuration values as read from the environment, before validation.
#[derive(Debug, Clone)]
pub struct RawCleanupConfig {
    pub auth_token: String,
    pub host: String,
    pub port: u16,
    pub ssl_enabled: bool,
    pub insecure_tls: bool,
    pub api_version: u16,
    pub search_timeout_seconds: u64,
    pub delete_timeout_seconds: u64,
    pub keep_time: String,
    pub chunk_size: u32,
    pub retries: u32,
    pub retry_delay_seconds: u64,
    pub retry_transient: bool,
    pub executions_by_project: bool,
    pub filtered_project: Option<String>,
    pub filtered_job: Option<String>,
    pub exclude_running: bool,
    pub debug: bool,
    pub interval_seconds: Option<u64>,
}

/// Validated, immutable cleanup configuration.
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    pub base_url: Url,
    pub auth_token: NonEmptyString,
    pub insecure_tls: bool,
    pub search_timeout: Duration,
    pub delete_timeout: Duration,
    pub retention: RetentionWindow,
    pub chunk_size: NonZeroU32,
    pub retry: RetrySettings,
    pub retry_transient: bool,
    pub mode: FilterMode,
    pub filtered_project: Option<ProjectName>,
    pub filtered_job: Option<JobId>,
    pub exclude_running: bool,
    pub debug: bool,
    pub interval: Option<Duration>,
}

impl RawCleanupConfig {
    /// Returns defaults for every optional setting.
    pub fn with_token(auth_token: impl Into<String>) -> Self {
        Self {
            auth_token: auth_token.into(),
            host: "localhost".to_owned(),
            port: 4440,
            ssl_enabled: false,
            insecure_tls: false,
            api_version: 19,
            search_timeout_seconds: 60,
            delete_timeout_seconds: 300,
            keep_time: "30d".to_owned(),
            chunk_size: 200,
            retries: 5,
            retry_delay_seconds: 5,
            retry_transient: false,
            executions_by_project: true,
            filtered_project: None,
            filtered_job: None,
            exclude_running: true,
            debug: false,
            interval_seconds: None,
        }
    }

    /// Reads settings through `lookup`, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_token = lookup("CLEANUP_AUTH_TOKEN").ok_or_else(|| {
            AppError::Configuration("CLEANUP_AUTH_TOKEN is required".to_owned())
        })?;
        let defaults = Self::with_token(auth_token);

        Ok(Self {
            host: lookup("CLEANUP_HOST").unwrap_or_else(|| defaults.host.clone()),
            port: parse_value(&lookup, "CLEANUP_PORT", defaults.port)?,
            ssl_enabled: parse_flag(&lookup, "CLEANUP_SSL_ENABLED", defaults.ssl_enabled)?,
            insecure_tls: parse_flag(&lookup, "CLEANUP_INSECURE_TLS", defaults.insecure_tls)?,
            api_version: parse_value(&lookup, "CLEANUP_API_VERSION", defaults.api_version)?,
            search_timeout_seconds: parse_value(
                &lookup,
                "CLEANUP_SEARCH_TIMEOUT_SECONDS",
                defaults.search_timeout_seconds,
            )?,
            delete_timeout_seconds: parse_value(
                &lookup,
                "CLEANUP_DELETE_TIMEOUT_SECONDS",
                defaults.delete_timeout_seconds,
            )?,
            keep_time: lookup("CLEANUP_KEEP_TIME").unwrap_or_else(|| defaults.keep_time.clone()),
            chunk_size: parse_value(&lookup, "CLEANUP_CHUNK_SIZE", defaults.chunk_size)?,
            retries: parse_value(&lookup, "CLEANUP_RETRIES", defaults.retries)?,
            retry_delay_seconds: parse_value(
                &lookup,
                "CLEANUP_RETRY_DELAY_SECONDS",
                defaults.retry_delay_seconds,
            )?,
            retry_transient: parse_flag(
                &lookup,
                "CLEANUP_RETRY_TRANSIENT",
                defaults.retry_transient,
            )?,
            executions_by_project: parse_flag(
                &lookup,
                "CLEANUP_EXECUTIONS_BY_PROJECT",
                defaults.executions_by_project,
            )?,
            filtered_project: optional(&lookup, "CLEANUP_FILTERED_PROJECT"),
            filtered_job: optional(&lookup, "CLEANUP_FILTERED_JOB"),
            exclude_running: parse_flag(
                &lookup,
                "CLEANUP_EXCLUDE_RUNNING",
                defaults.exclude_running,
            )?,
            debug: parse_flag(&lookup, "CLEANUP_DEBUG", defaults.debug)?,
            interval_seconds: optional(&lookup, "CLEANUP_INTERVAL_SECONDS")
                .map(|value| parse_str("CLEANUP_INTERVAL_SECONDS", value.as_str()))
                .transpose()?,
            auth_token: defaults.auth_token,
        })
    }

    /// Checks every setting once and produces the validated configuration.
    pub fn validate(self) -> AppResult<CleanupConfig> {
        let auth_token = NonEmptyString::new(self.auth_token).map_err(|_| {
            AppError::Configuration("CLEANUP_AUTH_TOKEN must not be empty".to_owned())
        })?;

        let host = self.host.trim();
        if host.is_empty() {
            return Err(AppError::Configuration(
                "CLEANUP_HOST must not be empty".to_owned(),
            ));
        }

        if self.port < MIN_PORT {
            return Err(AppError::Configuration(format!(
                "invalid port number {}, expected {MIN_PORT}-65535",
                self.port
            )));
        }

        if !(MIN_API_VERSION..=MAX_API_VERSION).contains(&self.api_version) {
            return Err(AppError::Configuration(format!(
                "unsupported API version {}, expected {MIN_API_VERSION}-{MAX_API_VERSION}",
                self.api_version
            )));
        }

        if self.search_timeout_seconds == 0 {
            return Err(AppError::Configuration(
                "CLEANUP_SEARCH_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        if self.delete_timeout_seconds == 0 {
            return Err(AppError::Configuration(
                "CLEANUP_DELETE_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        let chunk_size = NonZeroU32::new(self.chunk_size).ok_or_else(|| {
            AppError::Configuration("CLEANUP_CHUNK_SIZE must be greater than zero".to_owned())
        })?;

        let retention = RetentionWindow::parse(self.keep_time.trim())?;

        let mode = if self.executions_by_project {
            FilterMode::ByProject
        } else {
            FilterMode::ByJob
        };

        let filtered_project = self
            .filtered_project
            .map(|value| {
                ProjectName::new(value).map_err(|error| {
                    AppError::Configuration(format!("invalid CLEANUP_FILTERED_PROJECT: {error}"))
                })
            })
            .transpose()?;

        let filtered_job = self
            .filtered_job
            .map(|value| {
                JobId::new(value).map_err(|error| {
                    AppError::Configuration(format!("invalid CLEANUP_FILTERED_JOB: {error}"))
                })
            })
            .transpose()?;

        if filtered_job.is_some() && mode == FilterMode::ByProject {
            return Err(AppError::Configuration(
                "CLEANUP_FILTERED_JOB requires CLEANUP_EXECUTIONS_BY_PROJECT=false".to_owned(),
            ));
        }

        let interval = match self.interval_seconds {
            Some(0) => {
                return Err(AppError::Configuration(
                    "CLEANUP_INTERVAL_SECONDS must be greater than zero".to_owned(),
                ));
            }
            Some(seconds) => Some(Duration::from_secs(seconds)),
            None => None,
        };

        let protocol = if self.ssl_enabled { "https" } else { "http" };
        let base_url = Url::parse(
            format!(
                "{protocol}://{host}:{}/api/{}/",
                self.port, self.api_version
            )
            .as_str(),
        )
        .map_err(|error| {
            AppError::Configuration(format!("invalid server address '{host}': {error}"))
        })?;

        Ok(CleanupConfig {
            base_url,
            auth_token,
            insecure_tls: self.insecure_tls,
            search_timeout: Duration::from_secs(self.search_timeout_seconds),
            delete_timeout: Duration::from_secs(self.delete_timeout_seconds),
            retention,
            chunk_size,
            retry: RetrySettings {
                retries: self.retries,
                delay: Duration::from_secs(self.retry_delay_seconds),
            },
            retry_transient: self.retry_transient,
            mode,
            filtered_project,
            filtered_job,
            exclude_running: self.exclude_running,
            debug: self.debug,
            interval,
        })
    }
}

impl CleanupConfig {
    /// Loads and validates configuration from the process environment.
    pub fn load() -> AppResult<Self> {
        RawCleanupConfig::from_lookup(|name| env::var(name).ok())?.validate()
    }

    /// Settings for the HTTP execution API client.
    pub fn execution_api_settings(&self) -> ExecutionApiSettings {
        ExecutionApiSettings {
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.as_str().to_owned(),
            search_timeout: self.search_timeout,
            delete_timeout: self.delete_timeout,
            accept_invalid_certs: self.insecure_tls,
            retry: self.retry_transient.then_some(self.retry),
        }
    }

    /// Options for the retirement service.
    pub fn retirement_options(&self) -> RetirementOptions {
        RetirementOptions {
            mode: self.mode,
            retention: self.retention,
            page_size: self.chunk_size,
            exclude_running: self.exclude_running,
            filtered_project: self.filtered_project.clone(),
            filtered_job: self.filtered_job.clone(),
        }
    }
}

/// Reads `CLEANUP_DEBUG` leniently so logging can start before validation.
pub fn debug_requested() -> bool {
    env::var("CLEANUP_DEBUG")
        .ok()
        .and_then(|value| parse_bool(value.as_str()))
        .unwrap_or(false)
}

fn optional<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_value<F, T>(lookup: &F, name: &str, default: T) -> AppResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(name) {
        Some(value) => parse_str(name, value.as_str()),
        None => Ok(default),
    }
}

fn parse_str<T>(name: &str, value: &str) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse::<T>().map_err(|error| {
        AppError::Configuration(format!("invalid {name} value '{value}': {error}"))
    })
}

fn parse_flag<F>(lookup: &F, name: &str, default: bool) -> AppResult<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(value) => parse_bool(value.as_str()).ok_or_else(|| {
            AppError::Configuration(format!("invalid {name} value '{value}', expected a boolean"))
        }),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}
