//! Klartext-Payload – nur clientseitig sichtbar
//!
//! Das ist die Struktur die *innerhalb* eines Envelope steckt. Sie wird
//! vor dem Versiegeln zu JSON-Bytes serialisiert und nach dem Oeffnen
//! wieder deserialisiert. Das Relay bekommt sie nie zu sehen.
//!
//! ## Wire-Format (innerhalb des Ciphertext)
//! ```json
//! { "kind": "text", "body": "hallo" }
//! { "kind": "file", "name": "a.png", "mimeType": "image/png", "data": "<base64>" }
//! ```

use serde::{Deserialize, Serialize};

use crate::encoding;

/// Klartext-Inhalt einer Nachricht: Text oder Datei
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaintextPayload {
    /// Einfache Textnachricht
    Text {
        /// Der Nachrichtentext
        body: String,
    },
    /// Datei-Anhang (rohe Bytes, Base64-kodiert im JSON)
    #[serde(rename_all = "camelCase")]
    File {
        /// Dateiname
        name: String,
        /// MIME-Typ, z.B. "image/png"
        mime_type: String,
        /// Rohe Datei-Bytes
        #[serde(with = "encoding::base64_bytes")]
        data: Vec<u8>,
    },
}

impl PlaintextPayload {
    /// Erstellt eine Textnachricht
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    /// Erstellt einen Datei-Anhang
    pub fn datei(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self::File {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Serialisiert den Payload zu Bytes (Vorbereitung fuers Versiegeln)
    pub fn zu_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Deserialisiert einen Payload aus Bytes (nach dem Oeffnen)
    pub fn aus_bytes(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }
}
