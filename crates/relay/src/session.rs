//! RelaySession – Zustandsmaschine einer Relay-Verbindung
//!
//! ```text
//! Verbunden -> Beigetreten(raum) -> Geschlossen
//!     |              ^    |
//!     |              +----+  (erneutes Join = implizit verlassen,
//!     |                       dann neuem Raum beitreten)
//!     +------------> Geschlossen
//! ```
//!
//! Die Session kennt nur ihre eigene Mitgliedschaft; das Routing macht
//! die `RoomRegistry`. Eine Session wird nie zwischen Raeumen "migriert" –
//! ein Raumwechsel ist Verlassen plus Beitreten.

use fluesterpost_core::types::{RoomId, SessionId};

/// Zustand einer Relay-Session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionZustand {
    /// Verbunden, noch keinem Raum beigetreten
    Verbunden,
    /// Mitglied genau eines Raums
    Beigetreten(RoomId),
    /// Verbindung beendet (Endzustand)
    Geschlossen,
}

/// Serverseitige Repraesentation einer verbundenen Teilnehmer-Verbindung
#[derive(Debug)]
pub struct RelaySession {
    session_id: SessionId,
    zustand: SessionZustand,
}

impl RelaySession {
    /// Erstellt eine neue Session im Zustand `Verbunden`
    pub fn neu() -> Self {
        Self {
            session_id: SessionId::new(),
            zustand: SessionZustand::Verbunden,
        }
    }

    /// Gibt das opake Handle dieser Session zurueck
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Gibt den aktuellen Zustand zurueck
    pub fn zustand(&self) -> &SessionZustand {
        &self.zustand
    }

    /// Gibt den beigetretenen Raum zurueck, falls vorhanden
    pub fn beigetretener_raum(&self) -> Option<&RoomId> {
        match &self.zustand {
            SessionZustand::Beigetreten(raum) => Some(raum),
            _ => None,
        }
    }

    /// Tritt einem Raum bei
    ///
    /// Bei bestehender Mitgliedschaft wird der alte Raum implizit
    /// verlassen; er wird als `Some(alter_raum)` zurueckgegeben. Auf einer
    /// geschlossenen Session ist der Beitritt ein No-op (`None`).
    pub fn beitreten(&mut self, raum_id: RoomId) -> Option<RoomId> {
        if self.zustand == SessionZustand::Geschlossen {
            tracing::debug!(session_id = %self.session_id, "Join auf geschlossener Session ignoriert");
            return None;
        }
        let vorheriger = self.beigetretener_raum().cloned();
        self.zustand = SessionZustand::Beigetreten(raum_id);
        vorheriger
    }

    /// Schliesst die Session (Endzustand, aus jedem Zustand erreichbar)
    ///
    /// Gibt den Raum zurueck der dabei verlassen wurde, falls vorhanden.
    pub fn schliessen(&mut self) -> Option<RoomId> {
        let verlassener = self.beigetretener_raum().cloned();
        self.zustand = SessionZustand::Geschlossen;
        verlassener
    }
}

impl Default for RelaySession {
    fn default() -> Self {
        Self::neu()
    }
}
