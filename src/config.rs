//! Settings, read once at startup from `configuration.toml` (optional) with
//! `APP__`-prefixed environment overrides, e.g.
//! `APP__APPLICATION__DISCORD=<token>`.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_option_number_from_string,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSettings {
    /// Bot token.
    pub discord: Secret<String>,
    pub owners: Vec<String>,
    /// Shown in sanction notices ("You've been banned from **{name}**").
    pub guild_name: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub guild_id: u64,
    /// Boost roles are created at this role's position in the list.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub boost_anchor_role_id: u64,
    #[serde(default = "default_tags_dir")]
    pub tags_dir: String,
    #[serde(default)]
    pub forums: ForumSettings,
}

/// Forum plumbing is optional; handlers no-op for whatever is unset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForumSettings {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub bug_reports_channel_id: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub bug_reports_triage_tag_id: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub bug_reports_access_role_id: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub feature_requests_channel_id: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub feature_requests_triage_tag_id: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    pub feature_requests_access_role_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port,
            self.database_name
        )
    }
}

fn default_tags_dir() -> String {
    "tags".to_owned()
}

pub fn get_configuration() -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}
