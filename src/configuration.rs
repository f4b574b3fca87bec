use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;

/// Provider-named variables the deployment platform exposes. They win over anything found in the
/// configuration files or in `APP_`-prefixed variables.
pub const API_KEY_VARIABLE: &str = "RESEND_API_KEY";
pub const TO_EMAIL_VARIABLE: &str = "CONTACT_TO_EMAIL";
pub const FROM_EMAIL_VARIABLE: &str = "CONTACT_FROM_EMAIL";

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    #[serde(default)]
    pub contact: ContactSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct EmailClientSettings {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

/// Everything the contact handler needs to relay a message. Each value is optional at load time:
/// a missing value is a fault of the running server and is reported per request, never at start-up.
#[derive(serde::Deserialize, Clone, Debug, Default)]
pub struct ContactSettings {
    pub api_key: Option<Secret<String>>,
    pub to_email: Option<String>,
    pub from_email: Option<String>,
}

/// Contact settings with every value present.
#[derive(Clone, Debug)]
pub struct ResolvedContactSettings {
    pub api_key: Secret<String>,
    pub to_email: String,
    pub from_email: String,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingConfiguration {
    #[error("Server not configured: RESEND_API_KEY missing")]
    ApiKey,
    #[error("Server not configured: CONTACT_TO_EMAIL or CONTACT_FROM_EMAIL missing")]
    Addresses,
}

impl ContactSettings {
    /// Blank values count as missing. The API key is checked before the addresses.
    pub fn require(&self) -> Result<ResolvedContactSettings, MissingConfiguration> {
        let api_key = self
            .api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(MissingConfiguration::ApiKey)?;

        match (non_blank(&self.to_email), non_blank(&self.from_email)) {
            (Some(to_email), Some(from_email)) => Ok(ResolvedContactSettings {
                api_key: api_key.clone(),
                to_email: to_email.to_owned(),
                from_email: from_email.to_owned(),
            }),
            _ => Err(MissingConfiguration::Addresses),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.require().is_ok()
    }

    /// Overlay the provider-named variables. `lookup` is `std::env::var` in production and a plain
    /// map in tests, so the process environment never needs to be mutated.
    pub fn apply_provider_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup(API_KEY_VARIABLE) {
            self.api_key = Some(Secret::new(api_key));
        }
        if let Some(to_email) = lookup(TO_EMAIL_VARIABLE) {
            self.to_email = Some(to_email);
        }
        if let Some(from_email) = lookup(FROM_EMAIL_VARIABLE) {
            self.from_email = Some(from_email);
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// The possible runtime environment for our application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. Use either `local` or `production`."
            )),
        }
    }
}

/// Settings are layered: `base.yaml`, then the environment specific file picked by
/// `APP_ENVIRONMENT`, then `APP_`-prefixed variables (`APP_APPLICATION__PORT=5001` sets
/// `Settings.application.port`), then the provider-named variables.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path =
        std::env::current_dir().map_err(|e| config::ConfigError::Foreign(Box::new(e)))?;
    let configuration_directory = base_path.join("configuration");

    // Detect the running environment. Default to `local` if unspecified.
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    let mut settings = settings.try_deserialize::<Settings>()?;
    settings
        .contact
        .apply_provider_overrides(|key| std::env::var(key).ok());
    Ok(settings)
}
