//! Gemeinsame Identifikationstypen fuer Fluesterpost
//!
//! Alle IDs verwenden das Newtype-Pattern um Verwechslungen zwischen
//! verschiedenen ID-Arten zur Compilezeit auszuschliessen.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Eindeutige Session-ID einer Relay-Verbindung
///
/// Wird beim Verbindungsaufbau zufaellig vergeben und dient als opakes
/// Absender-Handle in `peer_joined`- und `deliver`-Nachrichten. Traegt
/// bewusst keine Identitaetsinformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Erstellt eine neue zufaellige SessionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Gibt die innere UUID zurueck
    pub fn inner(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Raum-Kennung – oeffentliches Rendezvous-Label
///
/// Wird vom Raum-Ersteller gewaehlt und ausserhalb des Systems geteilt.
/// Nicht geheim; dient clientseitig zusaetzlich als Salt-Quelle fuer die
/// Schluesselableitung.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomId(pub String);

impl RoomId {
    /// Erstellt eine RoomId aus einem beliebigen String
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Gibt die Kennung als &str zurueck
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prueft ob die Kennung leer ist (und damit ungueltig)
    pub fn ist_leer(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "raum:{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
