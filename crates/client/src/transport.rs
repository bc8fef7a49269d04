//! TransportLink – Persistente Frame-Verbindung zum Relay
//!
//! Der Link besitzt die Schreibhaelfte der Framed-Verbindung direkt;
//! die Lesehaelfte laeuft in einem Hintergrund-Task, der eingehende
//! Frames in eine mpsc-Queue legt. Ein watch-Kanal publiziert den
//! Verbindungsstatus, damit die Oberflaeche Trennungen sofort sieht.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_util::codec::Framed;

use fluesterpost_protocol::relay::RelayMessage;
use fluesterpost_protocol::wire::FrameCodec;

use crate::error::{ClientError, ClientResult};

/// Groesse der Eingangs-Queue fuer Frames vom Relay
const EINGANGS_QUEUE_GROESSE: usize = 64;

/// Liveness-Status der Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbindungsStatus {
    /// Verbindung steht
    Verbunden,
    /// Verbindung wurde getrennt (vom Relay oder durch Fehler)
    Getrennt,
}

/// Persistente, frame-basierte Duplex-Verbindung zum Relay
pub struct TransportLink {
    schreiber: SplitSink<Framed<TcpStream, FrameCodec>, RelayMessage>,
    eingang: mpsc::Receiver<RelayMessage>,
    status_rx: watch::Receiver<VerbindungsStatus>,
    naechste_request_id: AtomicU32,
}

impl TransportLink {
    /// Verbindet sich mit dem Relay und startet den Lese-Task
    pub async fn verbinden(adresse: &str) -> ClientResult<Self> {
        let stream = TcpStream::connect(adresse).await?;
        let framed = Framed::new(stream, FrameCodec::new());
        let (schreiber, leser) = framed.split();

        let (eingang_tx, eingang) = mpsc::channel(EINGANGS_QUEUE_GROESSE);
        let (status_tx, status_rx) = watch::channel(VerbindungsStatus::Verbunden);

        tokio::spawn(lese_task(leser, eingang_tx, status_tx));

        tracing::info!(adresse = %adresse, "Mit Relay verbunden");

        Ok(Self {
            schreiber,
            eingang,
            status_rx,
            naechste_request_id: AtomicU32::new(1),
        })
    }

    /// Vergibt die naechste Request-Kennung (monoton pro Verbindung)
    pub fn naechste_id(&self) -> u32 {
        self.naechste_request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Sendet eine Nachricht an das Relay
    pub async fn senden(&mut self, nachricht: RelayMessage) -> ClientResult<()> {
        if self.status() == VerbindungsStatus::Getrennt {
            return Err(ClientError::Getrennt);
        }
        self.schreiber.send(nachricht).await?;
        Ok(())
    }

    /// Wartet auf die naechste Nachricht vom Relay
    ///
    /// `None` bedeutet: die Verbindung ist beendet und die Queue leer.
    pub async fn naechste_nachricht(&mut self) -> Option<RelayMessage> {
        self.eingang.recv().await
    }

    /// Aktueller Verbindungsstatus
    pub fn status(&self) -> VerbindungsStatus {
        *self.status_rx.borrow()
    }

    /// Gibt einen watch-Receiver fuer Statusaenderungen zurueck
    pub fn status_beobachten(&self) -> watch::Receiver<VerbindungsStatus> {
        self.status_rx.clone()
    }
}

/// Hintergrund-Task: liest Frames und legt sie in die Eingangs-Queue
async fn lese_task(
    mut leser: SplitStream<Framed<TcpStream, FrameCodec>>,
    eingang_tx: mpsc::Sender<RelayMessage>,
    status_tx: watch::Sender<VerbindungsStatus>,
) {
    loop {
        match leser.next().await {
            Some(Ok(nachricht)) => {
                if eingang_tx.send(nachricht).await.is_err() {
                    // Link wurde fallengelassen, Task beenden
                    break;
                }
            }
            Some(Err(e)) => {
                tracing::warn!(fehler = %e, "Frame-Lesefehler vom Relay");
                break;
            }
            None => {
                tracing::info!("Relay hat die Verbindung geschlossen");
                break;
            }
        }
    }
    let _ = status_tx.send(VerbindungsStatus::Getrennt);
}
