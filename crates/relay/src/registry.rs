//! RoomRegistry – Raum-Mitgliedschaft und Envelope-Fan-out
//!
//! Die Registry verwaltet die Send-Queues aller verbundenen Sessions und
//! die Zuordnung Raum -> Mitglieder. Sie ist der einzige prozessweite
//! Zustand des Relays: nichts davon wird persistiert, nach einem Neustart
//! ist sie leer.
//!
//! ## Konsistenz
//! Raum-Eintraege werden lazy beim ersten Beitritt angelegt und entfernt
//! sobald das letzte Mitglied geht (keine Geister-Raeume). Die Mitglieder-
//! Schnappschuesse fuer den Fan-out entstehen unter dem Lock des
//! jeweiligen DashMap-Eintrags – ein Broadcast sieht nie eine halb
//! mutierte Mitgliederliste. Die Reihenfolge pro Absender-Empfaenger-Paar
//! bleibt erhalten, weil jeder Verbindungs-Task seine Submits sequenziell
//! auffaechert und jede Session genau eine FIFO-Queue hat.

use dashmap::DashMap;
use fluesterpost_core::types::{RoomId, SessionId};
use fluesterpost_protocol::relay::RelayMessage;
use std::sync::Arc;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Konfiguration
// ---------------------------------------------------------------------------

/// Kapazitaet der Zustell-Queue pro Session
///
/// Laeuft eine Queue voll (Empfaenger liest nicht schnell genug), werden
/// weitere Zustellungen an diese Session verworfen statt den Absender
/// zu blockieren.
const SEND_QUEUE_GROESSE: usize = 64;

// ---------------------------------------------------------------------------
// ClientSender
// ---------------------------------------------------------------------------

/// Schreibende Seite der Zustell-Queue einer Session
#[derive(Clone, Debug)]
pub struct ClientSender {
    pub session_id: SessionId,
    pub tx: mpsc::Sender<RelayMessage>,
}

impl ClientSender {
    /// Reiht eine Zustellung nicht-blockierend ein
    ///
    /// `false` heisst: nicht zugestellt (Queue voll oder Session schon
    /// weg). Mehr als dieses Signal gibt es nicht, das Protokoll kennt
    /// keine Empfangsbestaetigungen.
    pub fn senden(&self, nachricht: RelayMessage) -> bool {
        let Err(fehler) = self.tx.try_send(nachricht) else {
            return true;
        };
        match fehler {
            mpsc::error::TrySendError::Full(_) => {
                tracing::warn!(session_id = %self.session_id, "Zustell-Queue voll – Nachricht verworfen");
            }
            mpsc::error::TrySendError::Closed(_) => {
                tracing::debug!(session_id = %self.session_id, "Zustell-Queue geschlossen (Session getrennt)");
            }
        }
        false
    }
}

// ---------------------------------------------------------------------------
// RoomRegistry
// ---------------------------------------------------------------------------

/// Prozessweite Tabelle: Raum-Kennung -> verbundene Sessions
///
/// `Clone` ist billig und teilt den inneren Zustand; jede
/// Verbindungs-Task haelt denselben Registry-Inhalt ueber `Arc`.
#[derive(Clone)]
pub struct RoomRegistry {
    inner: Arc<RoomRegistryInner>,
}

struct RoomRegistryInner {
    /// Zustell-Queues, indiziert nach SessionId
    sessions: DashMap<SessionId, ClientSender>,
    /// Raum-Mitgliedschaft: raum -> Vec<SessionId>
    raum_mitglieder: DashMap<RoomId, Vec<SessionId>>,
}

impl RoomRegistry {
    /// Erstellt eine neue, leere RoomRegistry
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(RoomRegistryInner {
                sessions: DashMap::new(),
                raum_mitglieder: DashMap::new(),
            }),
        }
    }

    /// Legt fuer eine neue Session eine Zustell-Queue an
    ///
    /// Das zurueckgegebene Empfangsende gehoert dem Verbindungs-Task,
    /// der die eingereihten Nachrichten auf die TCP-Verbindung schreibt.
    pub fn session_registrieren(&self, session_id: SessionId) -> mpsc::Receiver<RelayMessage> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_GROESSE);
        self.inner
            .sessions
            .insert(session_id, ClientSender { session_id, tx });
        tracing::debug!(session_id = %session_id, "Session registriert");
        rx
    }

    /// Vergisst eine Session vollstaendig (Verbindung getrennt)
    pub fn session_entfernen(&self, session_id: &SessionId) {
        self.inner.sessions.remove(session_id);
        self.aus_allen_raeumen_loesen(session_id);
        tracing::debug!(session_id = %session_id, "Session entfernt");
    }

    /// Traegt eine Session in einen Raum ein
    ///
    /// Hoechstens ein Raum pro Session: eine bestehende Mitgliedschaft
    /// wird vorher geloest (implizites Verlassen-dann-Beitreten). Der
    /// Raum-Eintrag entsteht lazy mit dem ersten Mitglied.
    pub fn raum_beitreten(&self, session_id: SessionId, raum_id: RoomId) {
        self.aus_allen_raeumen_loesen(&session_id);
        self.inner
            .raum_mitglieder
            .entry(raum_id)
            .or_default()
            .push(session_id);
    }

    /// Loest eine Session aus ihrem Raum (Session bleibt verbunden)
    pub fn raum_verlassen(&self, session_id: &SessionId) {
        self.aus_allen_raeumen_loesen(session_id);
    }

    /// Streicht die Session aus jeder Mitgliederliste und wirft dabei
    /// leer gewordene Raum-Eintraege weg (keine Geister-Raeume)
    fn aus_allen_raeumen_loesen(&self, session_id: &SessionId) {
        self.inner.raum_mitglieder.iter_mut().for_each(|mut eintrag| {
            eintrag.value_mut().retain(|sid| sid != session_id);
        });
        self.inner
            .raum_mitglieder
            .retain(|_, mitglieder| !mitglieder.is_empty());
    }

    /// Sendet eine Nachricht an alle Raum-Mitglieder ausser einem
    ///
    /// Das ist der Fan-out-Pfad fuer `submit` und `join`: Der Ausloeser
    /// selbst bekommt nichts. Gibt die Anzahl der eingereihten
    /// Zustellungen zurueck.
    pub fn an_raum_ausser_senden(
        &self,
        raum_id: &RoomId,
        ausgeschlossen: &SessionId,
        nachricht: RelayMessage,
    ) -> usize {
        // Schnappschuss unter dem Eintrags-Lock
        let mitglieder = match self.inner.raum_mitglieder.get(raum_id) {
            Some(ids) => ids.clone(),
            None => return 0,
        };

        let mut gesendet = 0;
        for session_id in &mitglieder {
            if session_id == ausgeschlossen {
                continue;
            }
            if let Some(sender) = self.inner.sessions.get(session_id) {
                if sender.senden(nachricht.clone()) {
                    gesendet += 1;
                }
            }
        }
        gesendet
    }

    /// Gibt alle Session-IDs in einem Raum zurueck
    pub fn raum_mitglieder(&self, raum_id: &RoomId) -> Vec<SessionId> {
        self.inner
            .raum_mitglieder
            .get(raum_id)
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }

    /// Prueft ob eine Session registriert ist
    pub fn ist_registriert(&self, session_id: &SessionId) -> bool {
        self.inner.sessions.contains_key(session_id)
    }

    /// Gibt die Anzahl der registrierten Sessions zurueck
    pub fn session_anzahl(&self) -> usize {
        self.inner.sessions.len()
    }

    /// Listet alle aktiven Raum-Kennungen (Introspektion/Debugging)
    ///
    /// Nach dem letzten Verlassen taucht ein Raum hier nicht mehr auf.
    pub fn aktive_raeume(&self) -> Vec<RoomId> {
        self.inner
            .raum_mitglieder
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::neu()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
