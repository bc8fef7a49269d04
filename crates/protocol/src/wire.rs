//! Frame-Schicht des Relay-Protokolls
//!
//! Jede `RelayMessage` reist als genau ein Frame: 4 Bytes Laenge
//! (u32 big-endian), danach der JSON-Koerper. Das Laengen-Praefix
//! uebernimmt `LengthDelimitedCodec`; dieser Codec setzt nur noch die
//! JSON-Schicht obendrauf.
//!
//! Das Frame-Maximum muss versiegelte Datei-Anhaenge durchlassen:
//! 5 MiB Rohdaten wachsen durch Base64 im Envelope und nochmal Base64
//! im JSON auf knapp das Doppelte, daher 16 MiB als Standard.

use bytes::{Bytes, BytesMut};
use std::io;
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

use crate::relay::RelayMessage;

/// Obergrenze fuer einen einzelnen Frame (16 MiB)
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Codec fuer `Framed<TcpStream, FrameCodec>`: Laengen-Praefix aussen,
/// JSON innen
///
/// Beide Seiten der Verbindung benutzen denselben Codec. Frames ueber
/// dem Limit werden in beide Richtungen abgelehnt, bevor dafuer Speicher
/// angefasst wird; ein Frame mit kaputtem JSON ist ein Lesefehler und
/// beendet die Verbindung des Absenders.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    rahmen: LengthDelimitedCodec,
}

impl FrameCodec {
    /// Codec mit dem Standard-Frame-Limit
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_FRAME_SIZE)
    }

    /// Codec mit eigenem Frame-Limit (z.B. aus der Server-Konfiguration)
    pub fn with_max_size(max_frame_size: usize) -> Self {
        let rahmen = LengthDelimitedCodec::builder()
            .max_frame_length(max_frame_size)
            .length_field_length(4)
            .big_endian()
            .new_codec();
        Self { rahmen }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = RelayMessage;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> io::Result<Option<RelayMessage>> {
        // Erst wenn der komplette Frame da ist, gibt die Rahmen-Schicht
        // den Koerper heraus; uebergrosse Laengen-Felder lehnt sie ab.
        let koerper = match self.rahmen.decode(src)? {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        let nachricht = serde_json::from_slice(&koerper).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Relay-Frame ist kein gueltiges JSON: {e}"),
            )
        })?;
        Ok(Some(nachricht))
    }
}

impl Encoder<RelayMessage> for FrameCodec {
    type Error = io::Error;

    fn encode(&mut self, nachricht: RelayMessage, dst: &mut BytesMut) -> io::Result<()> {
        let koerper = serde_json::to_vec(&nachricht).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("RelayMessage nicht serialisierbar: {e}"),
            )
        })?;
        // Die Rahmen-Schicht prueft das Limit und schreibt das Praefix
        self.rahmen.encode(Bytes::from(koerper), dst)
    }
}
