//! fluesterpost-relay – TCP-Raum-Relay
//!
//! Dieses Crate implementiert die Serverseite von Fluesterpost: Es nimmt
//! TCP-Verbindungen an, haelt pro Verbindung eine `RelaySession` und
//! faechert eingereichte Envelopes an alle anderen Raum-Mitglieder auf.
//!
//! Das Relay ist ein Zero-Knowledge-Vermittler: Es haelt weder Schluessel
//! noch Klartext (es haengt nicht einmal vom Krypto-Crate ab), speichert
//! nichts auf Platte und vergisst Raeume sobald das letzte Mitglied geht.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (RelayServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task)
//!     |  State Machine: Verbunden -> Beigetreten(raum) -> Geschlossen
//!     |
//!     v
//! RoomRegistry – Raum-Mitgliedschaft + Send-Queues, Fan-out an alle
//!                Mitglieder ausser dem Absender
//! ```

pub mod connection;
pub mod registry;
pub mod session;
pub mod state;
pub mod tcp;

// Bequeme Re-Exporte
pub use connection::ClientConnection;
pub use registry::RoomRegistry;
pub use session::{RelaySession, SessionZustand};
pub use state::{RelayConfig, RelayState};
pub use tcp::RelayServer;
