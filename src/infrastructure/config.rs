use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub otp: OtpSettings,
    pub jwt: JwtSettings,
    /// ISO code used when formatting money in responses
    pub currency: String,
    pub seed_demo: bool,
    /// Admin account created by the seeder, when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// Signing key and lifetime for session tokens
#[derive(Clone, Debug)]
pub struct JwtSettings {
    /// Empty when `JWT_SECRET` is missing in a release build
    pub secret: String,
    pub expiry_hours: i64,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: default_jwt_secret(),
            expiry_hours: 24,
        }
    }
}

fn default_jwt_secret() -> String {
    if cfg!(debug_assertions) {
        "secret".to_string()
    } else {
        String::new()
    }
}

/// Lifetime and throttling rules for one-time passwords
#[derive(Clone, Debug)]
pub struct OtpSettings {
    pub ttl_minutes: i64,
    pub max_attempts: i32,
    pub resend_cooldown_secs: i64,
}

impl Default for OtpSettings {
    fn default() -> Self {
        Self {
            ttl_minutes: 10,
            max_attempts: 5,
            resend_cooldown_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Seeder admin credentials when both are configured
    pub fn seed_admin(&self) -> Option<(String, String)> {
        self.admin_email.clone().zip(self.admin_password.clone())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<i64>().ok());
        let defaults = OtpSettings::default();
        let jwt_defaults = JwtSettings::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://invest_hub.db?mode=rwc".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            otp: OtpSettings {
                ttl_minutes: parsed("OTP_TTL_MINUTES")
                    .filter(|m| *m > 0)
                    .unwrap_or(defaults.ttl_minutes),
                max_attempts: parsed("OTP_MAX_ATTEMPTS")
                    .filter(|a| *a > 0)
                    .map(|a| a as i32)
                    .unwrap_or(defaults.max_attempts),
                resend_cooldown_secs: parsed("OTP_RESEND_COOLDOWN_SECS")
                    .filter(|s| *s >= 0)
                    .unwrap_or(defaults.resend_cooldown_secs),
            },
            jwt: JwtSettings {
                secret: non_empty("JWT_SECRET").unwrap_or(jwt_defaults.secret),
                expiry_hours: parsed("JWT_EXPIRY_HOURS")
                    .filter(|h| *h > 0)
                    .unwrap_or(jwt_defaults.expiry_hours),
            },
            currency: lookup("CURRENCY")
                .map(|c| c.trim().to_uppercase())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "INR".to_string()),
            seed_demo: lookup("SEED_DEMO").is_some(),
            admin_email: non_empty("ADMIN_EMAIL"),
            admin_password: non_empty("ADMIN_PASSWORD"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
