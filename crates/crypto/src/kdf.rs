//! Schluesselableitung aus Passwort und Raum-Kennung
//!
//! PBKDF2-HMAC-SHA256 mit festem Work-Factor. Das Salz wird deterministisch
//! aus der oeffentlichen Raum-Kennung berechnet – beide Seiten koennen den
//! Schluessel damit unabhaengig voneinander ableiten, ohne jemals Salz oder
//! Schluessel auszutauschen. Dass beide dasselbe Passwort benutzt haben,
//! zeigt sich erst empirisch daran dass `oeffnen` gelingt.

use ring::pbkdf2;
use sha2::{Digest, Sha256};
use std::num::NonZeroU32;

use fluesterpost_core::types::RoomId;

use crate::types::{DerivedKey, SCHLUESSEL_LAENGE};

/// PBKDF2-Iterationszahl (fester, dokumentierter Work-Factor)
pub const PBKDF2_ITERATIONEN: u32 = 100_000;

/// Salz-Laenge in Bytes
///
/// Bewusst nur die ersten 16 der 32 SHA-256-Bytes – so macht es das
/// bestehende Wire-Format, und die Ableitung muss damit interoperabel
/// bleiben. Nicht aendern ohne Protokollversion.
pub const SALZ_LAENGE: usize = 16;

const ITERATIONEN: NonZeroU32 = match NonZeroU32::new(PBKDF2_ITERATIONEN) {
    Some(n) => n,
    None => panic!("PBKDF2_ITERATIONEN darf nicht 0 sein"),
};

/// Berechnet das PBKDF2-Salz deterministisch aus der Raum-Kennung
///
/// SHA-256 ueber die Kennung, auf 16 Bytes gekuerzt. Reproduzierbar aus
/// der oeffentlichen Kennung allein, aber dekorreliert vom rohen String.
pub fn salz_aus_raum_id(raum_id: &RoomId) -> [u8; SALZ_LAENGE] {
    let digest = Sha256::digest(raum_id.as_str().as_bytes());
    let mut salz = [0u8; SALZ_LAENGE];
    salz.copy_from_slice(&digest[..SALZ_LAENGE]);
    salz
}

/// Leitet den symmetrischen Schluessel aus Passwort und Raum-Kennung ab
///
/// Deterministisch: dieselben Eingaben liefern immer bit-identisches
/// Schluesselmaterial. Keine Staerke-Validierung – leere Eingaben weist
/// der Aufrufer vor dem Aufruf zurueck.
pub fn schluessel_ableiten(passwort: &str, raum_id: &RoomId) -> DerivedKey {
    let salz = salz_aus_raum_id(raum_id);
    let mut schluessel = [0u8; SCHLUESSEL_LAENGE];
    pbkdf2::derive(
        pbkdf2::PBKDF2_HMAC_SHA256,
        ITERATIONEN,
        &salz,
        passwort.as_bytes(),
        &mut schluessel,
    );
    DerivedKey::aus_bytes(schluessel)
}
