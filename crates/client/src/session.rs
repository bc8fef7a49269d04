//! RoomSession – Clientseitiger Raum-Zustand
//!
//! Buendelt abgeleiteten Schluessel, Raum-Kennung und den TransportLink.
//! Ausgehende Nutzlasten werden hier versiegelt, eingehende Envelopes
//! geoeffnet – das Relay sieht nur die versiegelte Form.

use chrono::{DateTime, Utc};

use fluesterpost_core::{RoomId, SessionId};
use fluesterpost_crypto::envelope::{oeffnen, versiegeln};
use fluesterpost_crypto::kdf::schluessel_ableiten;
use fluesterpost_crypto::types::DerivedKey;
use fluesterpost_protocol::payload::PlaintextPayload;
use fluesterpost_protocol::relay::{RelayMessage, RelayPayload};

use crate::error::{ClientError, ClientResult};
use crate::transport::TransportLink;

/// Maximale Dateigroesse vor dem Versiegeln (5 MiB)
pub const MAX_DATEI_BYTES: usize = 5 * 1024 * 1024;

/// Ereignis aus Sicht der Session
#[derive(Debug)]
pub enum SessionEreignis {
    /// Ein weiterer Teilnehmer ist dem Raum beigetreten
    PeerBeigetreten { sender: SessionId },
    /// Eine Nachricht wurde zugestellt und erfolgreich geoeffnet
    Nachricht {
        sender: SessionId,
        payload: PlaintextPayload,
        empfangen_um: DateTime<Utc>,
    },
    /// Ein Envelope konnte nicht geoeffnet werden (falsche Passphrase
    /// oder manipulierter Inhalt) – die Session lebt weiter
    Unlesbar { sender: SessionId },
    /// Die Verbindung zum Relay wurde getrennt
    Getrennt,
}

/// Clientseitige Session fuer genau einen Raum
pub struct RoomSession {
    link: TransportLink,
    raum_id: RoomId,
    schluessel: DerivedKey,
}

impl RoomSession {
    /// Verbindet sich mit dem Relay und tritt dem Raum bei
    ///
    /// Leitet den Schluessel lokal aus Passphrase und Raum-Kennung ab,
    /// bevor irgendetwas ueber die Leitung geht. Die Passphrase verlaesst
    /// diesen Aufruf nie.
    pub async fn beitreten(
        adresse: &str,
        raum_id: RoomId,
        passphrase: &str,
    ) -> ClientResult<Self> {
        if raum_id.ist_leer() {
            return Err(ClientError::EingabeFehlt("Raum-Kennung"));
        }
        if passphrase.is_empty() {
            return Err(ClientError::EingabeFehlt("Passphrase"));
        }

        // PBKDF2 ist absichtlich teuer – weg vom Runtime-Thread damit
        let passphrase_kopie = passphrase.to_owned();
        let raum_kopie = raum_id.clone();
        let schluessel = tokio::task::spawn_blocking(move || {
            schluessel_ableiten(&passphrase_kopie, &raum_kopie)
        })
        .await
        .map_err(|e| ClientError::Intern(e.to_string()))?;

        let mut link = TransportLink::verbinden(adresse).await?;
        let request_id = link.naechste_id();
        link.senden(RelayMessage::join(request_id, raum_id.clone()))
            .await?;

        tracing::info!(raum = %raum_id, "Raum beigetreten");

        Ok(Self {
            link,
            raum_id,
            schluessel,
        })
    }

    /// Raum-Kennung dieser Session
    pub fn raum_id(&self) -> &RoomId {
        &self.raum_id
    }

    /// Versiegelt und sendet eine Textnachricht
    pub async fn text_senden(&mut self, text: &str) -> ClientResult<()> {
        self.payload_senden(PlaintextPayload::text(text)).await
    }

    /// Versiegelt und sendet eine Datei
    ///
    /// Die Groesse wird vor dem Versiegeln geprueft, nicht erst am Relay.
    pub async fn datei_senden(
        &mut self,
        name: &str,
        mime_type: &str,
        daten: Vec<u8>,
    ) -> ClientResult<()> {
        if daten.len() > MAX_DATEI_BYTES {
            return Err(ClientError::DateiZuGross {
                groesse: daten.len(),
                maximum: MAX_DATEI_BYTES,
            });
        }
        self.payload_senden(PlaintextPayload::datei(name, mime_type, daten))
            .await
    }

    /// Serialisiert, versiegelt und reicht eine Nutzlast beim Relay ein
    async fn payload_senden(&mut self, payload: PlaintextPayload) -> ClientResult<()> {
        let klartext = payload
            .zu_bytes()
            .map_err(|e| ClientError::Protokoll(e.to_string()))?;
        let envelope = versiegeln(&self.schluessel, &klartext)?;

        let request_id = self.link.naechste_id();
        self.link
            .senden(RelayMessage::submit(
                request_id,
                self.raum_id.clone(),
                envelope,
            ))
            .await
    }

    /// Wartet auf das naechste Session-Ereignis
    ///
    /// Zugestellte Envelopes werden hier geoeffnet; schlaegt das fehl,
    /// kommt `Unlesbar` statt eines Fehlers – ein einzelner Teilnehmer
    /// mit falscher Passphrase bringt die Session nicht zu Fall.
    pub async fn naechstes_ereignis(&mut self) -> SessionEreignis {
        loop {
            let nachricht = match self.link.naechste_nachricht().await {
                Some(n) => n,
                None => return SessionEreignis::Getrennt,
            };

            match nachricht.payload {
                RelayPayload::PeerJoined(notice) => {
                    return SessionEreignis::PeerBeigetreten {
                        sender: notice.sender,
                    };
                }
                RelayPayload::Deliver(notice) => {
                    let geoeffnet = oeffnen(&self.schluessel, &notice.envelope)
                        .ok()
                        .and_then(|bytes| PlaintextPayload::aus_bytes(&bytes).ok());
                    match geoeffnet {
                        Some(payload) => {
                            return SessionEreignis::Nachricht {
                                sender: notice.sender,
                                payload,
                                empfangen_um: Utc::now(),
                            };
                        }
                        None => {
                            tracing::warn!(
                                sender = %notice.sender,
                                "Envelope konnte nicht geoeffnet werden"
                            );
                            return SessionEreignis::Unlesbar {
                                sender: notice.sender,
                            };
                        }
                    }
                }
                // Client-seitige Nachrichtentypen vom Relay sind Rauschen
                RelayPayload::Join(_) | RelayPayload::Submit(_) => {
                    tracing::debug!("Client-seitigen Nachrichtentyp vom Relay ignoriert");
                }
            }
        }
    }
}

// --- Tests ---------------------------------------------------------------
