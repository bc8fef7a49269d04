//! Fehlertypen der Client-Schicht

use thiserror::Error;

use fluesterpost_crypto::CryptoError;

/// Fehler in der Client-Session oder im Transport
#[derive(Debug, Error)]
pub enum ClientError {
    /// Pflicht-Eingabe fehlt oder ist leer (Schluesselableitung verweigert)
    #[error("Eingabe fehlt: {0}")]
    EingabeFehlt(&'static str),

    /// IO-Fehler auf der TCP-Verbindung
    #[error("IO-Fehler: {0}")]
    Io(#[from] std::io::Error),

    /// Verbindung zum Relay ist nicht mehr aktiv
    #[error("Verbindung zum Relay getrennt")]
    Getrennt,

    /// Datei ueberschreitet die maximale Groesse
    #[error("Datei zu gross: {groesse} Bytes (Maximum: {maximum} Bytes)")]
    DateiZuGross { groesse: usize, maximum: usize },

    /// Nutzlast konnte nicht serialisiert werden
    #[error("Protokollfehler: {0}")]
    Protokoll(String),

    /// Fehler beim Versiegeln oder Oeffnen
    #[error("Kryptografie-Fehler: {0}")]
    Krypto(#[from] CryptoError),

    /// Interner Fehler (z.B. abgebrochener Hintergrund-Task)
    #[error("Interner Fehler: {0}")]
    Intern(String),
}

/// Result-Typ fuer Client-Operationen
pub type ClientResult<T> = Result<T, ClientError>;
