use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Fee charged for publishing a listing, paid off-platform in crypto.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingFeeConfig {
    pub amount: f64,
    pub currency: String,
    pub network: String,
    pub address: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub listing_fee: ListingFeeConfig,
    /// Base URL used in verification/reset links sent by email.
    pub public_base_url: String,
    /// None disables SMTP; outgoing mail is logged instead.
    pub smtp: Option<SmtpConfig>,
    /// When set, an admin cannot approve a listing whose payment
    /// has not been verified.
    pub approval_requires_verified_payment: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "anonimax".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "anonimax-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: std::env::var("JWT_REFRESH_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let listing_fee = ListingFeeConfig {
            amount: std::env::var("LISTING_FEE_AMOUNT")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(10.0),
            currency: std::env::var("LISTING_FEE_CURRENCY").unwrap_or_else(|_| "BRZ".into()),
            network: std::env::var("LISTING_FEE_NETWORK").unwrap_or_else(|_| "Polygon".into()),
            address: std::env::var("LISTING_FEE_ADDRESS")
                .unwrap_or_else(|_| "0xda9811524aec92900905e5352be766ea84ddbf24".into()),
        };
        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|v| v.parse::<u16>().ok())
                    .unwrap_or(587),
                username: std::env::var("SMTP_USERNAME")?,
                password: std::env::var("SMTP_PASSWORD")?,
                from: std::env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "Anonimax <noreply@anonimax.com>".into()),
            }),
            Err(_) => None,
        };
        Ok(Self {
            database_url,
            jwt,
            listing_fee,
            public_base_url: std::env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            smtp,
            approval_requires_verified_payment: std::env::var(
                "ADMIN_APPROVAL_REQUIRES_VERIFIED_PAYMENT",
            )
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false),
        })
    }
}
