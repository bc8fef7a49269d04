//! Fehlertypen fuer das Kryptografie-Subsystem

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    /// AEAD-Authentifizierung fehlgeschlagen – das normale Signal fuer
    /// "falsches Passwort" oder "manipulierte/fremde Nachricht".
    /// Pro Nachricht behandelbar, nie fatal fuer die Session.
    #[error("Entschluesselung fehlgeschlagen: falscher Schluessel oder manipulierte Nachricht")]
    Entschluesselung,
}

pub type CryptoResult<T> = Result<T, CryptoError>;
