//! # fluesterpost-crypto
//!
//! Clientseitige Ende-zu-Ende-Verschluesselung fuer Fluesterpost.
//!
//! Alles hier laeuft ausschliesslich auf dem Client: Das Relay kennt
//! dieses Crate nicht und darf es per Abhaengigkeitsgraph auch nie kennen.
//!
//! ## Module
//! - `kdf` - Schluesselableitung aus (Passwort, Raum-Kennung) via PBKDF2
//! - `envelope` - Versiegeln/Oeffnen von Envelopes via AES-256-GCM
//! - `types` - Schluessel-Container (`DerivedKey`)
//! - `error` - Fehlertypen

pub mod envelope;
pub mod error;
pub mod kdf;
pub mod types;

// Bequeme Re-Exporte
pub use envelope::{oeffnen, versiegeln};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{salz_aus_raum_id, schluessel_ableiten};
pub use types::DerivedKey;
