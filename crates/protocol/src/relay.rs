//! Relay-Protokoll (TCP)
//!
//! Definiert die Nachrichten die zwischen Client und Relay ausgetauscht
//! werden. Das Relay routet ausschliesslich opake `Envelope`-Werte – es
//! existiert kein Nachrichtentyp der Klartext transportieren koennte.
//!
//! ## Design
//! - Jede Nachricht traegt eine `request_id: u32` zur Log-Korrelation;
//!   das Relay kopiert sie bei `submit` in die ausgefaecherten
//!   `deliver`-Nachrichten. Antworten im Request/Response-Sinn gibt es
//!   nicht, das Protokoll ist fire-and-forget.
//! - JSON-Serialisierung via serde, Tagged Enum fuer typsichere
//!   Nachrichtentypen.

use serde::{Deserialize, Serialize};

use fluesterpost_core::types::{RoomId, SessionId};

use crate::encoding;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// Verschluesselter Umschlag – das einzige Artefakt das die Leitung kreuzt
///
/// Ciphertext (inkl. AEAD-Auth-Tag) plus die pro Nachricht frische
/// 12-Byte-Nonce. Beide Felder gehen als Base64 ueber den Draht. Das Relay
/// besitzt keinen Schluessel und kann den Inhalt weder lesen noch pruefen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// AEAD-Ciphertext mit angehaengtem Auth-Tag
    #[serde(with = "encoding::base64_bytes")]
    pub ciphertext: Vec<u8>,
    /// Pro Nachricht frisch gewuerfelte Nonce
    #[serde(with = "encoding::base64_nonce")]
    pub nonce: [u8; 12],
}

impl Envelope {
    /// Erstellt einen Envelope aus Ciphertext und Nonce
    pub fn neu(ciphertext: Vec<u8>, nonce: [u8; 12]) -> Self {
        Self { ciphertext, nonce }
    }
}

// ---------------------------------------------------------------------------
// Nachrichten Client -> Relay
// ---------------------------------------------------------------------------

/// Raum beitreten
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    /// Rendezvous-Kennung des Raums
    pub room_id: RoomId,
}

/// Envelope zur Weiterleitung einreichen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Raum in den weitergeleitet werden soll
    pub room_id: RoomId,
    /// Der opake verschluesselte Umschlag
    pub envelope: Envelope,
}

// ---------------------------------------------------------------------------
// Nachrichten Relay -> Client
// ---------------------------------------------------------------------------

/// Ein Peer ist dem Raum beigetreten (reine Mitgliedschafts-Information)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerJoinedNotice {
    /// Opakes Handle des beigetretenen Peers
    pub sender: SessionId,
}

/// Weitergeleiteter Envelope eines anderen Raum-Mitglieds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverNotice {
    /// Opakes Handle des Absenders
    pub sender: SessionId,
    /// Der unveraenderte Envelope des Absenders
    pub envelope: Envelope,
}

// ---------------------------------------------------------------------------
// Haupt-Enum: RelayPayload
// ---------------------------------------------------------------------------

/// Alle Relay-Nachrichten (typsicher via Tagged Enum)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayPayload {
    // Client -> Relay
    Join(JoinRequest),
    Submit(SubmitRequest),

    // Relay -> Client
    PeerJoined(PeerJoinedNotice),
    Deliver(DeliverNotice),
}

// ---------------------------------------------------------------------------
// Relay-Frame (Umschlag fuer alle Nachrichten)
// ---------------------------------------------------------------------------

/// Relay-Protokoll-Nachricht mit Korrelations-ID
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayMessage {
    /// Vom Absender vergebene ID, dient nur der Log-Korrelation
    pub request_id: u32,
    /// Inhalt der Nachricht
    pub payload: RelayPayload,
}

impl RelayMessage {
    /// Erstellt eine neue Relay-Nachricht
    pub fn new(request_id: u32, payload: RelayPayload) -> Self {
        Self {
            request_id,
            payload,
        }
    }

    /// Erstellt eine Join-Nachricht
    pub fn join(request_id: u32, room_id: RoomId) -> Self {
        Self::new(request_id, RelayPayload::Join(JoinRequest { room_id }))
    }

    /// Erstellt eine Submit-Nachricht
    pub fn submit(request_id: u32, room_id: RoomId, envelope: Envelope) -> Self {
        Self::new(
            request_id,
            RelayPayload::Submit(SubmitRequest { room_id, envelope }),
        )
    }

    /// Erstellt eine PeerJoined-Benachrichtigung
    pub fn peer_joined(request_id: u32, sender: SessionId) -> Self {
        Self::new(
            request_id,
            RelayPayload::PeerJoined(PeerJoinedNotice { sender }),
        )
    }

    /// Erstellt eine Deliver-Benachrichtigung
    pub fn deliver(request_id: u32, sender: SessionId, envelope: Envelope) -> Self {
        Self::new(
            request_id,
            RelayPayload::Deliver(DeliverNotice { sender, envelope }),
        )
    }

    /// Serialisiert die Nachricht als JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Deserialisiert eine Nachricht aus JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
