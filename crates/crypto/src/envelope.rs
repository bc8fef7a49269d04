//! Envelope-Versiegelung via AES-256-GCM
//!
//! `versiegeln` erzeugt fuer jeden Aufruf eine frische 12-Byte-Nonce aus
//! dem OS-CSPRNG – Nonce-Wiederverwendung unter demselben Schluessel waere
//! ein Sicherheitsbruch. `oeffnen` liefert bei fehlgeschlagener
//! AEAD-Authentifizierung einen regulaeren Fehlerwert zurueck, nie
//! plausiblen Muell-Klartext und nie eine Panik.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce as AesNonce};
use rand::rngs::OsRng;
use rand::RngCore;

use fluesterpost_protocol::relay::Envelope;

use crate::error::{CryptoError, CryptoResult};
use crate::types::DerivedKey;

/// Versiegelt einen Klartext zu einem transportfaehigen Envelope
///
/// Jeder Aufruf wuerfelt eine neue Nonce – zwei Versiegelungen desselben
/// Klartexts ergeben unterschiedliche Envelopes.
pub fn versiegeln(schluessel: &DerivedKey, klartext: &[u8]) -> CryptoResult<Envelope> {
    let mut nonce = [0u8; 12];
    OsRng.fill_bytes(&mut nonce);

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(schluessel.as_bytes()));
    let ciphertext = cipher
        .encrypt(AesNonce::from_slice(&nonce), klartext)
        .map_err(|_| CryptoError::Verschluesselung("AES-256-GCM encrypt".into()))?;

    Ok(Envelope::neu(ciphertext, nonce))
}

/// Oeffnet einen Envelope mit dem eigenen abgeleiteten Schluessel
///
/// Gibt `CryptoError::Entschluesselung` zurueck wenn der Auth-Tag nicht
/// passt (falsches Passwort, manipulierter oder fremder Envelope). Der
/// Aufrufer zeigt dann einen Platzhalter an und macht weiter.
pub fn oeffnen(schluessel: &DerivedKey, envelope: &Envelope) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(schluessel.as_bytes()));
    cipher
        .decrypt(AesNonce::from_slice(&envelope.nonce), envelope.ciphertext.as_ref())
        .map_err(|_| CryptoError::Entschluesselung)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::schluessel_ableiten;
    use fluesterpost_core::types::RoomId;

    fn test_schluessel(passwort: &str) -> DerivedKey {
        schluessel_ableiten(passwort, &RoomId::new("test-raum"))
    }

    #[test]
    fn versiegeln_oeffnen_round_trip() {
        let schluessel = test_schluessel("pw");
        let faelle: Vec<Vec<u8>> = vec![
            b"hallo".to_vec(),
            vec![],
            vec![0u8; 1024],
            (0..=255u8).collect(),
        ];
        for klartext in faelle {
            let envelope = versiegeln(&schluessel, &klartext).unwrap();
            let geoeffnet = oeffnen(&schluessel, &envelope).unwrap();
            assert_eq!(klartext, geoeffnet);
        }
    }

    #[test]
    fn jede_versiegelung_frische_nonce() {
        let schluessel = test_schluessel("pw");
        let a = versiegeln(&schluessel, b"gleicher text").unwrap();
        let b = versiegeln(&schluessel, b"gleicher text").unwrap();
        assert_ne!(a.nonce, b.nonce, "Nonce muss pro Aufruf frisch sein");
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn falscher_schluessel_wird_erkannt() {
        let richtig = test_schluessel("correct-horse");
        let falsch = test_schluessel("wrong-password");

        let envelope = versiegeln(&richtig, b"geheim").unwrap();
        let ergebnis = oeffnen(&falsch, &envelope);
        assert_eq!(ergebnis, Err(CryptoError::Entschluesselung));
    }

    #[test]
    fn manipulation_wird_erkannt() {
        let schluessel = test_schluessel("pw");
        let mut envelope = versiegeln(&schluessel, b"geheim").unwrap();

        // Ein Bit im Ciphertext kippen
        envelope.ciphertext[0] ^= 0x01;
        assert_eq!(oeffnen(&schluessel, &envelope), Err(CryptoError::Entschluesselung));
    }

    #[test]
    fn manipulierte_nonce_wird_erkannt() {
        let schluessel = test_schluessel("pw");
        let mut envelope = versiegeln(&schluessel, b"geheim").unwrap();
        envelope.nonce[0] ^= 0x01;
        assert_eq!(oeffnen(&schluessel, &envelope), Err(CryptoError::Entschluesselung));
    }

    #[test]
    fn envelope_uebersteht_wire_serialisierung() {
        let schluessel = test_schluessel("pw");
        let envelope = versiegeln(&schluessel, b"ueber den draht").unwrap();

        let json = serde_json::to_string(&envelope).unwrap();
        let zurueck: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(oeffnen(&schluessel, &zurueck).unwrap(), b"ueber den draht");
    }
}
