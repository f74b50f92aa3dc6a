use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub db: DbConfig,
    pub redis: RedisConfig,
    pub donation: DonationConfig,
    pub stripe: StripeConfig,
}

#[derive(Clone, Debug)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub pool_min: u32,
    pub pool_max: u32,
}

#[derive(Clone, Debug)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: u8,
    pub key_prefix: String,
}

#[derive(Clone, Debug)]
pub struct DonationConfig {
    /// Minimum accepted donation in minor units (cents).
    pub min_amount: i64,
    pub currency: String,
    /// Default and maximum page size for the recent-donations feed.
    pub feed_default_limit: i64,
    pub feed_max_limit: i64,
    /// TTL for the cached aggregate totals.
    pub totals_cache_secs: u64,
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub publishable_key: String,
    pub webhook_secret: String,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env_or_parse("PORT", 3000),
            // Permissive by default; set CORS_ORIGINS to a comma-separated
            // allowlist to restrict.
            cors_origins: env_or("CORS_ORIGINS", "*")
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            db: DbConfig {
                host: env_or("DB_HOST", "localhost"),
                port: env_or_parse("DB_PORT", 5432),
                database: env_or("DB_NAME", "team_donations"),
                user: env_or("DB_USER", "donations_admin"),
                password: env_or("DB_PASSWORD", ""),
                pool_min: env_or_parse("DB_POOL_MIN", 2),
                pool_max: env_or_parse("DB_POOL_MAX", 20),
            },
            redis: RedisConfig {
                host: env_or("REDIS_HOST", "localhost"),
                port: env_or_parse("REDIS_PORT", 6379),
                password: env::var("REDIS_PASSWORD").ok().filter(|s| !s.is_empty()),
                db: env_or_parse("REDIS_DB", 0),
                key_prefix: "donate:".to_string(),
            },
            donation: DonationConfig {
                min_amount: env_or_parse("DONATION_MIN_AMOUNT", 500),
                currency: env_or("DONATION_CURRENCY", "usd"),
                feed_default_limit: 10,
                feed_max_limit: env_or_parse("DONATION_FEED_MAX", 50),
                totals_cache_secs: env_or_parse("DONATION_TOTALS_CACHE_SEC", 30),
            },
            stripe: StripeConfig {
                secret_key: env_or("STRIPE_SECRET_KEY", ""),
                publishable_key: env_or("STRIPE_PUBLISHABLE_KEY", ""),
                webhook_secret: env_or("STRIPE_WEBHOOK_SECRET", ""),
            },
        }
    }

    pub fn database_url(&self) -> String {
        if let Ok(url) = env::var("DATABASE_URL") {
            return url;
        }
        if let Ok(url) = env::var("POSTGRES_URL") {
            return url;
        }
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.db.user, self.db.password, self.db.host, self.db.port, self.db.database
        )
    }

    pub fn redis_url(&self) -> String {
        if let Ok(url) = env::var("REDIS_URL") {
            return url;
        }
        match &self.redis.password {
            Some(pw) if !pw.is_empty() => format!(
                "redis://:{}@{}:{}/{}",
                pw, self.redis.host, self.redis.port, self.redis.db
            ),
            _ => format!(
                "redis://{}:{}/{}",
                self.redis.host, self.redis.port, self.redis.db
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Process env is shared across the test runner's threads, so all
    // env manipulation lives in a single test.
    #[test]
    fn defaults_overrides_and_url_fallbacks() {
        for key in [
            "PORT",
            "CORS_ORIGINS",
            "DB_HOST",
            "DB_PORT",
            "DB_NAME",
            "DB_USER",
            "DB_PASSWORD",
            "REDIS_HOST",
            "REDIS_PORT",
            "REDIS_PASSWORD",
            "REDIS_DB",
            "DONATION_MIN_AMOUNT",
            "DONATION_CURRENCY",
            "DATABASE_URL",
            "POSTGRES_URL",
            "REDIS_URL",
        ] {
            env::remove_var(key);
        }

        let config = Config::from_env();
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["*".to_string()]);
        assert_eq!(config.donation.min_amount, 500);
        assert_eq!(config.donation.currency, "usd");
        assert_eq!(config.donation.feed_default_limit, 10);
        assert_eq!(config.donation.feed_max_limit, 50);
        assert_eq!(
            config.database_url(),
            "postgres://donations_admin:@localhost:5432/team_donations"
        );
        assert_eq!(config.redis_url(), "redis://localhost:6379/0");

        // A full connection URL wins over the host/port parts.
        env::set_var("DATABASE_URL", "postgres://u:p@db.internal:6432/donations");
        env::set_var("REDIS_URL", "redis://cache.internal:6380/1");
        assert_eq!(
            config.database_url(),
            "postgres://u:p@db.internal:6432/donations"
        );
        assert_eq!(config.redis_url(), "redis://cache.internal:6380/1");
        env::remove_var("DATABASE_URL");
        env::remove_var("REDIS_URL");

        env::set_var("REDIS_PASSWORD", "hunter2");
        let config = Config::from_env();
        assert_eq!(config.redis_url(), "redis://:hunter2@localhost:6379/0");
        env::remove_var("REDIS_PASSWORD");

        env::set_var("DONATION_MIN_AMOUNT", "1000");
        env::set_var("CORS_ORIGINS", "https://donate.example.com, https://admin.example.com");
        let config = Config::from_env();
        assert_eq!(config.donation.min_amount, 1000);
        assert_eq!(
            config.cors_origins,
            vec![
                "https://donate.example.com".to_string(),
                "https://admin.example.com".to_string()
            ]
        );
        env::remove_var("DONATION_MIN_AMOUNT");
        env::remove_var("CORS_ORIGINS");

        // Unparseable values fall back to the default.
        env::set_var("PORT", "not-a-port");
        assert_eq!(Config::from_env().port, 3000);
        env::remove_var("PORT");
    }
}
