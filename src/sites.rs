//! Sites registry — multi-site view over the loaded configuration.
//!
//! Callers expecting a name-keyed sites mapping get one derived from the
//! legacy single-site block: when `site.url` is set, its fields appear under
//! the `main` key. Preconfigured entries in `config.sites` are preserved.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::Config;

/// Mapping from site name to descriptor. `main` is the only key ever
/// populated from the legacy block.
pub type SiteMap = BTreeMap<String, Site>;

/// A single publishing target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub url: String,
    pub github: SiteGithub,
    pub syndicate_to: Vec<Value>,
    pub media_endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteGithub {
    pub repo: Option<String>,
}

/// Derive the sites registry from a loaded [`Config`].
///
/// When a legacy single-target syndication uid is configured, it overrides
/// the `main` entry's `syndicate_to` with one synthesized `{uid, name}`
/// target (`name` omitted when unset). Absent legacy fields simply omit the
/// corresponding descriptor fields; there are no error conditions.
pub fn derive(config: &Config) -> SiteMap {
    let mut sites = config.sites.clone();

    let Some(url) = config.site.url.as_deref().filter(|u| !u.is_empty()) else {
        return sites;
    };

    let mut syndicate_to = config.site.syndicate_to.clone();
    if let Some(uid) = config
        .site
        .syndicate_to_uid
        .as_deref()
        .filter(|u| !u.is_empty())
    {
        let mut target = Map::new();
        target.insert("uid".into(), Value::String(uid.to_string()));
        if let Some(name) = &config.site.syndicate_to_name {
            target.insert("name".into(), Value::String(name.clone()));
        }
        syndicate_to = vec![Value::Object(target)];
    }

    sites.insert(
        "main".to_string(),
        Site {
            url: url.to_string(),
            github: SiteGithub {
                repo: config.site.repo.clone(),
            },
            syndicate_to,
            media_endpoint: config.site.media_endpoint.clone(),
        },
    );

    sites
}

// ── tests ─────────────────────────────────────────────────────────────────────
