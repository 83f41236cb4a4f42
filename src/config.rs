//! Configuration loading from the environment.
//!
//! [`load`] snapshots the process environment (merging a dotenv file first),
//! then hands the map to [`load_from`], which is pure: same map in, same
//! `Config` out. The record is built once at startup and never mutated.
//!
//! Settings live under a key prefix, `MICROPUB_` by default, overridable via
//! `MICROPUB_PREFIX`. The generic `NODE_ENV`, `PORT`, and `DOTENV_FILE` keys
//! are read unprefixed.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::env::EnvMap;
use crate::error::AppError;
use crate::sites::SiteMap;

const DEFAULT_PREFIX: &str = "MICROPUB_";

/// Fully-resolved service configuration. Constructed once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Crate version, from Cargo package metadata.
    pub version: String,
    /// Deployment environment name (`NODE_ENV`, default `"production"`).
    pub env: String,
    /// Listen port, kept verbatim as a string (default `"8080"`).
    /// The loader performs no integer coercion; the consumer parses.
    pub port: String,
    pub host: Option<String>,
    pub github: GithubConfig,
    /// Legacy single-site block; [`crate::sites::derive`] folds it into the
    /// multi-site registry under the `main` key.
    pub site: SiteConfig,
    /// Preconfigured multi-site entries. The loader leaves this empty; the
    /// registry derivation preserves whatever it holds.
    pub sites: SiteMap,
    pub token: Vec<TokenEndpoint>,
    pub handler_options: HandlerOptions,
    /// `"{name}/{version} ({homepage})"`, sent on outbound GitHub requests.
    pub user_agent: String,
}

/// GitHub credentials for the backing content repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GithubConfig {
    pub user: Option<String>,
    pub token: Option<String>,
    pub branch: Option<String>,
}

/// The legacy single-site configuration block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub url: Option<String>,
    pub repo: Option<String>,
    pub syndicate_to_uid: Option<String>,
    pub syndicate_to_name: Option<String>,
    pub syndicate_to: Vec<Value>,
    pub media_endpoint: Option<String>,
}

/// IndieAuth token endpoint descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenEndpoint {
    pub endpoint: String,
    /// Identity URL the endpoint vouches for; falls back to the site URL.
    pub me: Option<String>,
}

/// Content-handling toggles passed through to the publishing handlers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerOptions {
    pub no_auto_configure: bool,
    /// JSON-valued; `false` when unset or unparseable.
    pub derive_category: Value,
    pub derive_languages: Vec<String>,
    pub layout_name: Option<Value>,
    pub filename_style: Option<Value>,
    pub media_files_style: Option<Value>,
    pub permalink_style: Option<Value>,
    #[serde(rename = "encodeHTML")]
    pub encode_html: Option<Value>,
}

/// Load the configuration from the process environment.
///
/// If `DOTENV_FILE` names a dotenv file, it is merged first and any load
/// failure is fatal. Otherwise the default `./.env` location is tried and
/// failures are ignored — file absence is the normal case.
pub fn load() -> Result<Config, AppError> {
    let mut env = EnvMap::from_process();
    match env.get_non_empty("DOTENV_FILE").map(str::to_string) {
        Some(path) => env.merge_dotenv_file(&path)?,
        None => env.merge_default_dotenv(),
    }
    load_from(&env)
}

/// Build a [`Config`] from an explicit environment map. Pure: reads only
/// the map, mutates nothing.
pub fn load_from(env: &EnvMap) -> Result<Config, AppError> {
    let prefix = env
        .get_non_empty(&format!("{DEFAULT_PREFIX}PREFIX"))
        .unwrap_or(DEFAULT_PREFIX)
        .to_string();

    let var = |suffix: &str| env.get(&format!("{prefix}{suffix}")).map(str::to_string);
    let var_set = |suffix: &str| {
        env.get_non_empty(&format!("{prefix}{suffix}"))
            .map(str::to_string)
    };

    let site_url = var("SITE_URL");

    let token = match var_set("TOKEN_ENDPOINT") {
        Some(endpoint) => vec![TokenEndpoint {
            endpoint,
            me: var_set("TOKEN_ME").or_else(|| var_set("SITE_URL")),
        }],
        None => Vec::new(),
    };

    let config = Config {
        version: env!("CARGO_PKG_VERSION").to_string(),
        env: env
            .get_non_empty("NODE_ENV")
            .unwrap_or("production")
            .to_string(),
        port: env.get_non_empty("PORT").unwrap_or("8080").to_string(),
        host: var("HOST"),
        github: GithubConfig {
            user: var("GITHUB_USER"),
            token: var("GITHUB_TOKEN"),
            branch: var("GITHUB_BRANCH"),
        },
        site: SiteConfig {
            url: site_url,
            repo: var("SITE_GITHUB_REPO"),
            syndicate_to_uid: var("SITE_SYNDICATE_TO_UID"),
            syndicate_to_name: var("SITE_SYNDICATE_TO_NAME"),
            syndicate_to: parse_syndicate_to(env, &prefix)?,
            media_endpoint: var("MEDIA_ENDPOINT_URL"),
        },
        sites: SiteMap::new(),
        token,
        handler_options: HandlerOptions {
            no_auto_configure: env
                .get_non_empty(&format!("{prefix}OPTION_NO_AUTO_CONFIGURE"))
                .is_some(),
            derive_category: parse_json(env, &format!("{prefix}OPTION_DERIVE_CATEGORY"), false)
                .unwrap_or(Value::Bool(false)),
            derive_languages: var("OPTION_DERIVE_LANGUAGES")
                .unwrap_or_default()
                .split(',')
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
            layout_name: parse_json(env, &format!("{prefix}LAYOUT_NAME"), true),
            filename_style: parse_json(env, &format!("{prefix}FILENAME_STYLE"), true),
            media_files_style: parse_json(env, &format!("{prefix}MEDIA_FILES_STYLE"), true),
            permalink_style: parse_json(env, &format!("{prefix}PERMALINK_STYLE"), true),
            encode_html: parse_json(env, &format!("{prefix}ENCODE_HTML"), false),
        },
        user_agent: format!(
            "{}/{} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_HOMEPAGE")
        ),
    };

    Ok(config)
}

// ── parsing helpers ──────────────────────────────────────────────────────────

/// Parse a JSON-valued setting. Malformed values are logged at debug and
/// treated as absent. Parsing yields nothing on a failure or a falsy JSON
/// value; with `default_to_value`, the raw string stands in for nothing.
fn parse_json(env: &EnvMap, key: &str, default_to_value: bool) -> Option<Value> {
    let raw = env.get_non_empty(key)?;
    let parsed = match serde_json::from_str::<Value>(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            debug!(key, error = %err, "ignoring malformed JSON setting");
            None
        }
    };
    match parsed {
        Some(value) if !is_falsy(&value) => Some(value),
        _ => default_to_value.then(|| Value::String(raw.to_string())),
    }
}

/// JSON values that count as "nothing" for settings with a raw-string
/// fallback: `null`, `false`, zero, and the empty string.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Coerce a parsed JSON value into a list: arrays pass through, scalars
/// become a one-element list, absence becomes empty.
fn into_list(value: Option<Value>) -> Vec<Value> {
    match value {
        Some(Value::Array(items)) => items,
        Some(value) => vec![value],
        None => Vec::new(),
    }
}

/// `SITE_SYNDICATE_TO` is the one JSON setting without graceful degradation:
/// a malformed value aborts startup. Absence yields an empty list.
fn parse_syndicate_to(env: &EnvMap, prefix: &str) -> Result<Vec<Value>, AppError> {
    let key = format!("{prefix}SITE_SYNDICATE_TO");
    match env.get(&key) {
        Some(raw) => {
            let value: Value = serde_json::from_str(raw)
                .map_err(|e| AppError::Config(format!("{key} is not valid JSON: {e}")))?;
            Ok(into_list(Some(value)))
        }
        None => Ok(Vec::new()),
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
