//! Byte-zu-Text-Kodierung fuer binaere Felder
//!
//! Envelope-Felder (Ciphertext, Nonce) und Datei-Inhalte muessen den
//! text-sicheren JSON-Transport ueberleben. Standard-Base64 ohne Padding-
//! Tricks: Kodieren und Dekodieren sind exakte Inverse, jede Byte-Folge
//! uebersteht den Round-Trip bit-genau.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Kodiert beliebige Bytes als Base64-String
pub fn kodieren(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Dekodiert einen Base64-String zurueck in Bytes
pub fn dekodieren(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(text)
}

/// serde-Adapter: `Vec<u8>` als Base64-String serialisieren
///
/// Verwendung: `#[serde(with = "encoding::base64_bytes")]`
pub mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::kodieren(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        super::dekodieren(&text).map_err(serde::de::Error::custom)
    }
}

/// serde-Adapter: 12-Byte-Nonce als Base64-String serialisieren
///
/// Lehnt beim Dekodieren jede andere Laenge als 12 Bytes ab.
pub mod base64_nonce {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(nonce: &[u8; 12], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&super::kodieren(nonce))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<[u8; 12], D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        let bytes = super::dekodieren(&text).map_err(serde::de::Error::custom)?;
        bytes.try_into().map_err(|b: Vec<u8>| {
            serde::de::Error::custom(format!("Nonce muss 12 Bytes haben, erhalten: {}", b.len()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_beliebige_bytes() {
        let faelle: Vec<Vec<u8>> = vec![
            vec![],
            vec![0],
            vec![0xff; 33],
            (0..=255u8).collect(),
            vec![0x00, 0xfe, 0x01, 0x80, 0x7f],
        ];
        for bytes in faelle {
            let kodiert = kodieren(&bytes);
            let dekodiert = dekodieren(&kodiert).unwrap();
            assert_eq!(bytes, dekodiert, "Round-Trip muss bit-genau sein");
        }
    }

    #[test]
    fn dekodieren_lehnt_ungueltige_eingabe_ab() {
        assert!(dekodieren("kein base64 !!").is_err());
    }

    #[test]
    fn nonce_adapter_lehnt_falsche_laenge_ab() {
        #[derive(serde::Deserialize)]
        struct Probe {
            #[serde(with = "base64_nonce")]
            #[allow(dead_code)]
            nonce: [u8; 12],
        }

        // 8 Bytes statt 12
        let json = format!("{{\"nonce\":\"{}\"}}", kodieren(&[1u8; 8]));
        assert!(serde_json::from_str::<Probe>(&json).is_err());

        let json = format!("{{\"nonce\":\"{}\"}}", kodieren(&[1u8; 12]));
        assert!(serde_json::from_str::<Probe>(&json).is_ok());
    }
}
