//! Gemeinsame Typen fuer das Kryptografie-Subsystem

/// Laenge des abgeleiteten Schluessels in Bytes (AES-256)
pub const SCHLUESSEL_LAENGE: usize = 32;

/// Abgeleiteter symmetrischer Schluessel (256 Bit)
///
/// Deterministische Funktion aus (Passwort, Raum-Kennung). Verlaesst den
/// Client-Prozess nie und wird bei jedem Raum-Beitritt frisch abgeleitet.
/// Wird beim Drop genullt; Debug gibt den Inhalt nicht preis.
#[derive(Clone)]
pub struct DerivedKey([u8; SCHLUESSEL_LAENGE]);

impl DerivedKey {
    /// Erstellt einen DerivedKey aus rohem Schluesselmaterial
    pub fn aus_bytes(bytes: [u8; SCHLUESSEL_LAENGE]) -> Self {
        Self(bytes)
    }

    /// Gibt das rohe Schluesselmaterial zurueck (nur lesend)
    pub fn as_bytes(&self) -> &[u8; SCHLUESSEL_LAENGE] {
        &self.0
    }
}

impl Drop for DerivedKey {
    fn drop(&mut self) {
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DerivedKey([REDACTED] {} bytes)", SCHLUESSEL_LAENGE)
    }
}
