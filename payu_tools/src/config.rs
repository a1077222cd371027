use log::*;
use tog_common::{Secret, DEFAULT_CURRENCY_CODE};

const DEFAULT_PAYU_OAUTH_URL: &str = "https://secure.snd.payu.com/pl/standard/user/oauth/authorize";
const DEFAULT_PAYU_ORDER_URL: &str = "https://secure.snd.payu.com/api/v2_1/orders";
const DEFAULT_PAYU_API_URL: &str = "https://secure.snd.payu.com/api/v2_1";
const DEFAULT_FRONT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_LANGUAGE: &str = "pl";

#[derive(Debug, Clone)]
pub struct PayuConfig {
    pub oauth_url: String,
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub merchant_pos_id: String,
    pub order_url: String,
    pub api_url: String,
    /// The storefront base URL. Buyers are sent to `{front_base_url}/payment-redirect/{order_id}` after paying.
    pub front_base_url: String,
    pub default_currency: String,
    pub language: String,
}

impl Default for PayuConfig {
    fn default() -> Self {
        Self {
            oauth_url: DEFAULT_PAYU_OAUTH_URL.to_string(),
            client_id: String::default(),
            client_secret: Secret::default(),
            merchant_pos_id: String::default(),
            order_url: DEFAULT_PAYU_ORDER_URL.to_string(),
            api_url: DEFAULT_PAYU_API_URL.to_string(),
            front_base_url: DEFAULT_FRONT_BASE_URL.to_string(),
            default_currency: DEFAULT_CURRENCY_CODE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        info!("🪛️ {key} is not set. Using the default, {default}");
        default.to_string()
    })
}

fn env_or_useless(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        warn!("🪛️ {key} is not set. PayU calls will fail until it is configured.");
        String::default()
    })
}

impl PayuConfig {
    pub fn new_from_env_or_default() -> Self {
        let oauth_url = env_or("TOG_PAYU_OAUTH_URL", DEFAULT_PAYU_OAUTH_URL);
        let client_id = env_or_useless("TOG_PAYU_CLIENT_ID");
        let client_secret = Secret::new(env_or_useless("TOG_PAYU_CLIENT_SECRET"));
        let merchant_pos_id = env_or_useless("TOG_PAYU_POS_ID");
        let order_url = env_or("TOG_PAYU_ORDER_URL", DEFAULT_PAYU_ORDER_URL);
        let api_url = env_or("TOG_PAYU_API_URL", DEFAULT_PAYU_API_URL);
        let front_base_url = env_or("TOG_FRONT_BASE_URL", DEFAULT_FRONT_BASE_URL);
        let default_currency = env_or("TOG_DEFAULT_CURRENCY", DEFAULT_CURRENCY_CODE);
        let language = env_or("TOG_PAYU_LANGUAGE", DEFAULT_LANGUAGE);
        Self {
            oauth_url,
            client_id,
            client_secret,
            merchant_pos_id,
            order_url,
            api_url,
            front_base_url: front_base_url.trim_end_matches('/').to_string(),
            default_currency,
            language,
        }
    }
}
