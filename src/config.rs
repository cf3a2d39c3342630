use std::env;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    /// Argon2 hash of the operator password. The plaintext is read from the
    /// environment at startup and discarded.
    pub admin_password_hash: String,
    pub mail: MailConfig,
}

#[derive(Clone)]
pub enum MailConfig {
    /// Log messages instead of sending them.
    Console,
    Smtp(SmtpConfig),
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_password = env::var("ADMIN_PASSWORD")
            .expect("ADMIN_PASSWORD must be set");

        let mail = match env::var("MAIL_DRIVER")
            .unwrap_or_else(|_| "console".to_string())
            .as_str()
        {
            "smtp" => MailConfig::Smtp(SmtpConfig {
                host: env::var("SMTP_HOST")
                    .expect("SMTP_HOST must be set when MAIL_DRIVER=smtp"),
                port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "465".to_string())
                    .parse()
                    .expect("SMTP_PORT must be a number"),
                username: env::var("SMTP_USERNAME")
                    .expect("SMTP_USERNAME must be set when MAIL_DRIVER=smtp"),
                password: env::var("SMTP_PASSWORD")
                    .expect("SMTP_PASSWORD must be set when MAIL_DRIVER=smtp"),
                from_email: env::var("MAIL_FROM_EMAIL")
                    .expect("MAIL_FROM_EMAIL must be set when MAIL_DRIVER=smtp"),
                from_name: env::var("MAIL_FROM_NAME")
                    .unwrap_or_else(|_| "Immanuel Travels".to_string()),
            }),
            _ => MailConfig::Console,
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://travels.db?mode=rwc".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRATION_HOURS must be a number"),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            admin_password_hash: hash_admin_password(&admin_password),
            mail,
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

pub fn hash_admin_password(password: &str) -> String {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .expect("Failed to hash admin password")
        .to_string()
}
