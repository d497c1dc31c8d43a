use std::env;
use std::fmt;

use crate::error::{ AppError, Result };

pub const DEFAULT_MIN_SCORE: f64 = 0.5;

pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_RAYDIUM_API: &str = "https://api.raydium.io/v2";
pub const DEFAULT_ORCA_API: &str = "https://api.orca.so";
pub const DEFAULT_JUPITER_API: &str = "https://quote-api.jup.ag/v6";
pub const DEFAULT_PUMPFUN_API: &str = "https://api.pump.fun";
pub const DEFAULT_MOONSHOT_API: &str = "https://api.moonshot.exchange";

/// Variables that must be present before a database connection is attempted.
pub const REQUIRED_DB_VARS: [&str; 5] = [
    "DB_HOST",
    "DB_PORT",
    "DB_USERNAME",
    "DB_PASSWORD",
    "DB_DATABASE",
];

/// `captcha` namespace.
#[derive(Clone, PartialEq)]
pub struct CaptchaConfig {
    pub secret_key: String,
    pub min_score: f64,
}

impl CaptchaConfig {
    pub fn from_lookup<F>(lookup: F) -> Self where F: Fn(&str) -> Option<String> {
        let secret_key = non_empty(lookup("RECAPTCHA_SECRET_KEY")).unwrap_or_default();

        let raw_score = lookup("RECAPTCHA_MIN_SCORE").unwrap_or_else(|| "0.5".to_string());
        let min_score = parse_float_prefix(&raw_score)
            .filter(|score| !score.is_nan() && *score != 0.0)
            .unwrap_or(DEFAULT_MIN_SCORE);

        Self { secret_key, min_score }
    }
}

impl fmt::Debug for CaptchaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secret_key = if self.secret_key.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("CaptchaConfig")
            .field("secret_key", &secret_key)
            .field("min_score", &self.min_score)
            .finish()
    }
}

/// `blockchain` namespace: public endpoints used by the discovery workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockchainConfig {
    pub solana_rpc_url: String,
    pub raydium_api: String,
    pub orca_api: String,
    pub jupiter_api: String,
    pub pump_fun_api: String,
    pub moonshot_api: String,
}

impl BlockchainConfig {
    pub fn from_lookup<F>(lookup: F) -> Self where F: Fn(&str) -> Option<String> {
        let endpoint = |key: &str, default: &str| {
            non_empty(lookup(key)).unwrap_or_else(|| default.to_string())
        };

        Self {
            solana_rpc_url: endpoint("SOLANA_RPC_URL", DEFAULT_SOLANA_RPC_URL),
            raydium_api: endpoint("RAYDIUM_API", DEFAULT_RAYDIUM_API),
            orca_api: endpoint("ORCA_API", DEFAULT_ORCA_API),
            jupiter_api: endpoint("JUPITER_API", DEFAULT_JUPITER_API),
            pump_fun_api: endpoint("PUMPFUN_API", DEFAULT_PUMPFUN_API),
            moonshot_api: endpoint("MOONSHOT_API", DEFAULT_MOONSHOT_API),
        }
    }
}

/// Connection parameters for the Postgres database.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub database: String,
}

impl DatabaseConfig {
    /// Fails if any of [`REQUIRED_DB_VARS`] is absent or empty. The error lists
    /// every missing variable, not just the first one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self> where F: Fn(&str) -> Option<String> {
        let values: Vec<Option<String>> = REQUIRED_DB_VARS.iter()
            .map(|key| non_empty(lookup(key)))
            .collect();

        let missing: Vec<&str> = REQUIRED_DB_VARS.iter()
            .zip(&values)
            .filter(|(_, value)| value.is_none())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(
                AppError::Config(
                    format!("Missing required environment variables: {}", missing.join(", "))
                )
            );
        }

        let mut values = values.into_iter().flatten();
        let mut next = || values.next().unwrap_or_default();
        let (host, port, username, password, database) = (next(), next(), next(), next(), next());

        let port = parse_port_prefix(&port).ok_or_else(||
            AppError::Config(format!("DB_PORT must be a valid port number, got '{}'", port))
        )?;

        Ok(Self { host, port, username, password, database })
    }

    pub fn connection_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            urlencoding::encode(&self.username),
            urlencoding::encode(&self.password),
            self.host,
            self.port,
            self.database
        )
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub captcha: CaptchaConfig,
    pub blockchain: BlockchainConfig,
    pub server_host: String,
    pub server_port: u16,
    pub auto_migrate: bool,
}

impl Config {
    /// Loads `.env` (if present) and resolves the configuration from the
    /// process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self> where F: Fn(&str) -> Option<String> {
        let database = DatabaseConfig::from_lookup(&lookup)?;
        let captcha = CaptchaConfig::from_lookup(&lookup);
        let blockchain = BlockchainConfig::from_lookup(&lookup);

        let server_host = non_empty(lookup("SERVER_HOST")).unwrap_or_else(|| "0.0.0.0".to_string());
        let server_port = non_empty(lookup("SERVER_PORT"))
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| AppError::Config("SERVER_PORT must be a valid port number".to_string()))?;

        let auto_migrate = lookup("DB_AUTO_MIGRATE")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        Ok(Config {
            database,
            captcha,
            blockchain,
            server_host,
            server_port,
            auto_migrate,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Reads the leading base-10 digits of `input` (`"5432abc"` and `"5432.0"` are
/// both 5432), rejecting input without digits or outside the port range.
fn parse_port_prefix(input: &str) -> Option<u16> {
    let s = trim_leading_space(input);
    let digits: &str = &s[..s.bytes().take_while(|b| b.is_ascii_digit()).count()];
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u16>().ok()
}

/// Strips leading whitespace, including a byte order mark left by editors in `.env` files.
fn trim_leading_space(input: &str) -> &str {
    input.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}

/// Parses the longest leading decimal literal of `input`, ignoring leading
/// whitespace and any trailing garbage. `"0.7abc"` yields 0.7, `"abc"` yields None.
fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = trim_leading_space(input);
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        return s[..end + "Infinity".len()].parse::<f64>().ok();
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // exponent only counts when followed by at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
