//! Gemeinsamer Server-Zustand fuer das Relay
//!
//! Haelt Konfiguration und Registry als Arc-Referenzen, die sicher
//! zwischen tokio-Tasks geteilt werden koennen.

use std::sync::Arc;
use std::time::Instant;

use fluesterpost_protocol::wire::DEFAULT_MAX_FRAME_SIZE;

use crate::registry::RoomRegistry;

/// Konfiguration fuer das Relay
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Maximale gleichzeitige Verbindungen
    pub max_verbindungen: u32,
    /// Maximale Frame-Groesse in Bytes
    pub max_frame_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_verbindungen: 512,
            max_frame_bytes: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Gemeinsamer Relay-Zustand (thread-safe, Arc-geteilt)
pub struct RelayState {
    /// Relay-Konfiguration
    pub config: Arc<RelayConfig>,
    /// Raum-Registry (Mitgliedschaft + Send-Queues)
    pub registry: RoomRegistry,
    /// Startzeitpunkt des Relays (fuer Uptime-Berechnung)
    pub start_time: Instant,
}

impl RelayState {
    /// Erstellt einen neuen RelayState
    pub fn neu(config: RelayConfig) -> Arc<Self> {
        Arc::new(Self {
            config: Arc::new(config),
            registry: RoomRegistry::neu(),
            start_time: Instant::now(),
        })
    }

    /// Sekunden seit dem Start (landet im Shutdown-Log)
    pub fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
