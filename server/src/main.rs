//! Fluesterpost Server – Einstiegspunkt
//!
//! Laedt die Konfiguration, initialisiert das Logging und startet den Server.

use anyhow::Result;
use fluesterpost_server::config::{LoggingEinstellungen, ServerConfig};
use fluesterpost_server::Server;

#[tokio::main]
async fn main() -> Result<()> {
    // Konfigurationsdatei-Pfad aus Umgebungsvariable oder Standard
    let config_pfad =
        std::env::var("FLUESTERPOST_CONFIG").unwrap_or_else(|_| "config.toml".into());

    // Konfiguration laden (Standardwerte falls Datei fehlt)
    let config = ServerConfig::laden(&config_pfad)?;
    logging_initialisieren(&config.logging);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_pfad,
        "Fluesterpost Server wird initialisiert"
    );

    Server::neu(config).starten().await
}

/// Initialisiert tracing-subscriber aus den Logging-Einstellungen
///
/// `RUST_LOG` gewinnt gegen das konfigurierte Level; das Format
/// ("json" oder Text) kommt immer aus der Konfiguration.
fn logging_initialisieren(einstellungen: &LoggingEinstellungen) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&einstellungen.level));
    let aufbau = fmt().with_env_filter(filter).with_target(true);

    if einstellungen.format == "json" {
        aufbau.json().with_thread_ids(true).init();
    } else {
        aufbau.init();
    }
}
