use std::env;

use log::*;
use payu_tools::PayuConfig;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use tog_common::{parse_boolean_flag, Secret};

use crate::errors::ServerError;

const DEFAULT_TOG_HOST: &str = "127.0.0.1";
const DEFAULT_TOG_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/trattoria.db";
const MIN_AUTH_SECRET_LENGTH: usize = 32;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the `for=` field of the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    /// Run the embedded database migrations when the server starts.
    pub run_migrations: bool,
    /// PayU credentials and merchant settings
    pub payu: PayuConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_TOG_HOST.to_string(),
            port: DEFAULT_TOG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            run_migrations: true,
            payu: PayuConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("TOG_HOST").ok().unwrap_or_else(|| DEFAULT_TOG_HOST.into());
        let port = env::var("TOG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for TOG_PORT. {e} Using the default, {DEFAULT_TOG_PORT}, instead."
                    );
                    DEFAULT_TOG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_TOG_PORT);
        let database_url = env::var("TOG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ TOG_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let use_x_forwarded_for = parse_boolean_flag(env::var("TOG_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("TOG_USE_FORWARDED").ok(), false);
        let run_migrations = parse_boolean_flag(env::var("TOG_RUN_MIGRATIONS").ok(), true);
        let payu = PayuConfig::new_from_env_or_default();
        Self { host, port, database_url, auth, use_x_forwarded_for, use_forwarded, run_migrations, payu }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The shared secret used to sign and verify access tokens.
    pub token_secret: Secret<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The access token signing secret has not been set. I'm using a random value for this session. DO \
             NOT operate on production like this, since every token becomes invalid when the server restarts. Set \
             TOG_AUTH_SECRET instead. 🚨️🚨️🚨️"
        );
        let secret: String = thread_rng().sample_iter(&Alphanumeric).take(64).map(char::from).collect();
        Self { token_secret: Secret::new(secret) }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self { token_secret: Secret::new(secret.into()) }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret =
            env::var("TOG_AUTH_SECRET").map_err(|e| ServerError::ConfigurationError(format!("{e} [TOG_AUTH_SECRET]")))?;
        if secret.len() < MIN_AUTH_SECRET_LENGTH {
            return Err(ServerError::ConfigurationError(format!(
                "TOG_AUTH_SECRET must be at least {MIN_AUTH_SECRET_LENGTH} characters long"
            )));
        }
        Ok(Self::new(secret))
    }
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used to configure the server's behaviour. Generally we try to keep this
/// as small as possible, and exclude secrets to avoid passing sensitive information around the system.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
