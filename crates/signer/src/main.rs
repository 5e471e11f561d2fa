use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dte_signer::{
    AppState, DocumentSigner, FileCertificateStore, RsaJwsSigner, ServerConfig, TracingEvents,
    Translator, config::Args, run,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "dte_signer={level},tower_http={level},info",
                level = args.log_level
            ))
        }))
        .init();

    args.validate().context("invalid configuration")?;

    let translator = Translator::load(&args.locales_dir, &args.default_locale)
        .context("loading message catalogs")?;
    let store = FileCertificateStore::new(&args.certificates_dir);
    let signer = DocumentSigner::new(Arc::new(store), Arc::new(RsaJwsSigner))
        .with_events(Arc::new(TracingEvents));

    tracing::info!(
        certificates_dir = %args.certificates_dir.display(),
        default_locale = %translator.default_locale(),
        "starting signer"
    );

    let config = ServerConfig::from(&args);
    run(&args.bind_address(), &config, AppState::new(signer, translator)).await
}
