//! fluesterpost-server – Bibliotheks-Root
//!
//! Deklariert die Server-Module und stellt den oeffentlichen
//! Einstiegspunkt fuer Integrationstests bereit.

pub mod config;

use anyhow::{Context, Result};
use tokio::sync::watch;

use fluesterpost_relay::{RelayServer, RelayState};

use config::ServerConfig;

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet das Relay und laeuft bis zum Shutdown-Signal
    ///
    /// Reihenfolge:
    /// 1. Relay-Zustand aufbauen (Registry, Limits)
    /// 2. TCP-Listener binden und Accept-Loop starten
    /// 3. Auf Ctrl-C warten, dann Shutdown an alle Tasks signalisieren
    pub async fn starten(self) -> Result<()> {
        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %self.config.tcp_bind_adresse(),
            "Server startet"
        );

        let state = RelayState::neu(self.config.relay_config());

        let bind_addr = self
            .config
            .tcp_bind_adresse()
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse '{}'", self.config.tcp_bind_adresse()))?;
        let relay = RelayServer::binden(state, bind_addr)
            .await
            .context("TCP-Listener konnte nicht gebunden werden")?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let relay_task = tokio::spawn(relay.starten(shutdown_rx));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        tokio::signal::ctrl_c()
            .await
            .context("Warten auf Ctrl-C fehlgeschlagen")?;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        let _ = shutdown_tx.send(true);
        relay_task
            .await
            .context("Relay-Task abgebrochen")?
            .context("Relay-Server-Fehler")?;

        Ok(())
    }
}
