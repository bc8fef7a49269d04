//! ClientConnection – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Die Session-Zustandsmaschine lebt hier; das Routing macht
//! die `RoomRegistry`.
//!
//! Eingehende `submit`-Frames werden synchron in Einreichungs-Reihenfolge
//! aufgefaechert – damit bleibt die Reihenfolge pro Absender-Empfaenger-
//! Paar erhalten, obwohl Envelopes selbst keine Sequenznummern tragen.

use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio_util::codec::Framed;

use fluesterpost_protocol::relay::{RelayMessage, RelayPayload};
use fluesterpost_protocol::wire::FrameCodec;

use crate::session::RelaySession;
use crate::state::RelayState;

/// Verarbeitet eine einzelne TCP-Verbindung
///
/// Liest Frames via `FrameCodec`, wendet die Session-Zustandsmaschine an
/// und sendet Fan-out-Nachrichten aus der Registry-Queue zurueck.
pub struct ClientConnection {
    state: Arc<RelayState>,
    peer_addr: SocketAddr,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection
    pub fn neu(state: Arc<RelayState>, peer_addr: SocketAddr) -> Self {
        Self { state, peer_addr }
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis die Verbindung getrennt wird oder ein Shutdown-Signal
    /// eingeht. Raeumt die Registry beim Verlassen in jedem Fall auf.
    pub async fn verarbeiten(
        self,
        stream: TcpStream,
        mut shutdown_rx: tokio::sync::watch::Receiver<bool>,
    ) {
        let peer_addr = self.peer_addr;
        let mut framed = Framed::new(
            stream,
            FrameCodec::with_max_size(self.state.config.max_frame_bytes),
        );

        let mut session = RelaySession::neu();
        let session_id = session.session_id();
        let mut empfangs_queue = self.state.registry.session_registrieren(session_id);

        tracing::info!(peer = %peer_addr, session_id = %session_id, "Neue Verbindung");

        loop {
            tokio::select! {
                // Eingehende Nachricht vom Client
                frame = framed.next() => {
                    match frame {
                        Some(Ok(nachricht)) => {
                            self.nachricht_verarbeiten(&mut session, nachricht);
                        }
                        Some(Err(e)) => {
                            tracing::warn!(peer = %peer_addr, fehler = %e, "Frame-Lesefehler");
                            break;
                        }
                        None => {
                            tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                // Ausgehende Nachricht aus der Registry (Fan-out anderer Sessions)
                Some(ausgehend) = empfangs_queue.recv() => {
                    if let Err(e) = framed.send(ausgehend).await {
                        tracing::warn!(peer = %peer_addr, fehler = %e, "Senden fehlgeschlagen");
                        break;
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(peer = %peer_addr, "Shutdown-Signal – Verbindung wird getrennt");
                        break;
                    }
                }
            }
        }

        // Cleanup beim Verbindungsende: Zustand schliessen, Registry aufraeumen
        let verlassener_raum = session.schliessen();
        self.state.registry.session_entfernen(&session_id);
        if let Some(raum) = verlassener_raum {
            tracing::debug!(session_id = %session_id, raum = %raum, "Raum beim Trennen verlassen");
        }

        tracing::info!(peer = %peer_addr, session_id = %session_id, "Verbindungs-Task beendet");
    }

    /// Wendet eine eingehende Nachricht auf die Session an
    ///
    /// Das Relay inspiziert dabei nie den Envelope-Inhalt – nur
    /// Raum-Kennung und Absender-Handle werden angefasst.
    fn nachricht_verarbeiten(&self, session: &mut RelaySession, nachricht: RelayMessage) {
        let session_id = session.session_id();
        let registry = &self.state.registry;

        match nachricht.payload {
            RelayPayload::Join(req) => {
                if let Some(alter_raum) = session.beitreten(req.room_id.clone()) {
                    tracing::debug!(
                        session_id = %session_id,
                        von = %alter_raum,
                        zu = %req.room_id,
                        "Implizites Verlassen vor erneutem Beitritt"
                    );
                }
                registry.raum_beitreten(session_id, req.room_id.clone());

                // Bestehende Mitglieder informieren (nur Mitgliedschaft, kein Inhalt)
                let informiert = registry.an_raum_ausser_senden(
                    &req.room_id,
                    &session_id,
                    RelayMessage::peer_joined(nachricht.request_id, session_id),
                );
                tracing::info!(
                    session_id = %session_id,
                    raum = %req.room_id,
                    peers = informiert,
                    "Raum beigetreten"
                );
            }

            RelayPayload::Submit(req) => {
                // Nur im beigetretenen Raum darf weitergeleitet werden
                match session.beigetretener_raum() {
                    Some(raum) if *raum == req.room_id => {
                        let zugestellt = registry.an_raum_ausser_senden(
                            raum,
                            &session_id,
                            RelayMessage::deliver(
                                nachricht.request_id,
                                session_id,
                                req.envelope,
                            ),
                        );
                        tracing::debug!(
                            session_id = %session_id,
                            raum = %req.room_id,
                            zugestellt = zugestellt,
                            "Envelope weitergeleitet"
                        );
                    }
                    _ => {
                        // Routing-Noop: kein Fehler, Session lebt weiter
                        tracing::debug!(
                            session_id = %session_id,
                            raum = %req.room_id,
                            "Submit ohne passende Raum-Mitgliedschaft ignoriert"
                        );
                    }
                }
            }

            // Server-seitige Nachrichtentypen von Clients sind Protokollrauschen
            RelayPayload::PeerJoined(_) | RelayPayload::Deliver(_) => {
                tracing::debug!(
                    session_id = %session_id,
                    "Relay-seitigen Nachrichtentyp vom Client ignoriert"
                );
            }
        }
    }
}
