use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

/// Command line and environment configuration of the signing server.
#[derive(Debug, Clone, Parser)]
#[command(name = "signer", about = "Signs tax documents with taxpayer certificates")]
pub struct Args {
    #[clap(long, env = "APP_SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[clap(long, env = "APP_SERVER_PORT", default_value = "8113")]
    pub port: u16,
    #[clap(long, env = "APP_SERVER_SIGNERROUTE", default_value = "/signer")]
    pub signer_route: String,
    #[clap(long, env = "APP_SERVER_HEALTHROUTE", default_value = "/health")]
    pub health_route: String,
    /// Per-request timeout in seconds.
    #[clap(long, env = "APP_SERVER_TIMEOUT", default_value = "15")]
    pub request_timeout: u64,

    #[clap(long, env = "APP_LOCALE_DEFAULTLOCALE", default_value = "es")]
    pub default_locale: String,
    #[clap(long, env = "APP_LOCALE_LOCALESDIR", default_value = "./configs/locales")]
    pub locales_dir: PathBuf,

    #[clap(long, env = "APP_FILESYSTEM_CERTIFICATESDIR", default_value = "./uploads/test/")]
    pub certificates_dir: PathBuf,

    /// Log filter used when RUST_LOG is unset (e.g. "info", "debug").
    #[clap(long, env = "APP_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Checks the configuration and creates the certificates directory if
    /// it does not exist yet.
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            bail!("server port is required");
        }
        for (name, route) in [
            ("signer route", &self.signer_route),
            ("health route", &self.health_route),
        ] {
            if !route.starts_with('/') {
                bail!("{name} must start with '/': {route:?}");
            }
        }
        if self.signer_route == self.health_route {
            bail!("signer and health routes must differ");
        }
        if self.request_timeout == 0 {
            bail!("request timeout must be at least one second");
        }
        if self.default_locale.trim().is_empty() {
            bail!("default locale is required");
        }
        if !self.locales_dir.is_dir() {
            bail!(
                "locales directory does not exist: {}",
                self.locales_dir.display()
            );
        }
        if self.certificates_dir.as_os_str().is_empty() {
            bail!("certificates directory is required");
        }
        std::fs::create_dir_all(&self.certificates_dir).with_context(|| {
            format!(
                "creating certificates directory {}",
                self.certificates_dir.display()
            )
        })?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
