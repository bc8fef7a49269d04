//! fluesterpost-protocol – Netzwerkprotokoll-Definitionen
//!
//! Dieses Crate definiert alle Nachrichtentypen die zwischen Client und
//! Relay ausgetauscht werden, sowie das Frame-Format fuer TCP.
//!
//! Das Relay-Protokoll kennt genau vier Nachrichtentypen:
//! `join` und `submit` (Client -> Relay), `peer_joined` und `deliver`
//! (Relay -> Client). Der `Envelope` darin ist fuer das Relay opak –
//! es gibt bewusst keine Nachricht, mit der das Relay Inhalte einsehen
//! oder bestaetigen koennte.

pub mod encoding;
pub mod payload;
pub mod relay;
pub mod wire;

pub use payload::PlaintextPayload;
pub use relay::{Envelope, RelayMessage, RelayPayload};
pub use wire::FrameCodec;
