use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_days: i64,
    pub presence_window_minutes: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    /// Registration secret; `None` disables the check.
    pub invite_code: Option<String>,
    pub company_email_domain: String,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let invite_code = std::env::var("INVITE_CODE")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let company_email_domain = std::env::var("COMPANY_EMAIL_DOMAIN")
            .unwrap_or_else(|_| "company.com".into())
            .trim()
            .to_lowercase();
        let session = SessionConfig {
            ttl_days: std::env::var("SESSION_TTL_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(7),
            presence_window_minutes: std::env::var("PRESENCE_WINDOW_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(5),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        };
        Ok(Self {
            database_url,
            invite_code,
            company_email_domain,
            session,
        })
    }

    pub fn session_ttl(&self) -> time::Duration {
        time::Duration::days(self.session.ttl_days)
    }

    pub fn presence_window(&self) -> time::Duration {
        time::Duration::minutes(self.session.presence_window_minutes)
    }
}
