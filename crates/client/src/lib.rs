//! fluesterpost-client – Clientseitige Session- und Transport-Schicht
//!
//! Dieses Crate haelt den expliziten Client-Zustand den die Oberflaeche
//! braucht: einen `TransportLink` (persistente, frame-basierte Duplex-
//! Verbindung zum Relay) und eine `RoomSession` (abgeleiteter Schluessel,
//! Raum-Mitgliedschaft, Versiegeln/Oeffnen). Keine globalen Variablen –
//! die Anwendungs-Shell besitzt die Session und reicht sie explizit an
//! die Darstellung weiter.

pub mod error;
pub mod session;
pub mod transport;

// Bequeme Re-Exporte
pub use error::ClientError;
pub use session::{RoomSession, SessionEreignis, MAX_DATEI_BYTES};
pub use transport::{TransportLink, VerbindungsStatus};
