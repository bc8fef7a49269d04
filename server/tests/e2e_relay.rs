//! End-to-End-Tests: Client-Sessions gegen ein echtes Relay
//!
//! Startet das Relay auf einem freien Port und verbindet echte
//! `RoomSession`-Clients. Verschluesselung, Framing und Routing laufen
//! dabei ueber den vollen Stack.

use std::sync::Arc;
use std::time::Duration;

use futures_util::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::timeout;
use tokio_util::codec::Framed;

use fluesterpost_client::{ClientError, RoomSession, SessionEreignis, MAX_DATEI_BYTES};
use fluesterpost_core::RoomId;
use fluesterpost_protocol::payload::PlaintextPayload;
use fluesterpost_protocol::relay::{Envelope, RelayMessage};
use fluesterpost_protocol::wire::FrameCodec;
use fluesterpost_relay::{RelayConfig, RelayServer, RelayState};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Startet ein Relay auf einem freien Port und gibt Adresse + Zustand zurueck
async fn relay_starten() -> (String, Arc<RelayState>, watch::Sender<bool>) {
    let state = RelayState::neu(RelayConfig::default());
    let server = RelayServer::binden(Arc::clone(&state), "127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let adresse = server.lokale_adresse().unwrap().to_string();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(server.starten(shutdown_rx));

    (adresse, state, shutdown_tx)
}

/// Wartet bis die Bedingung wahr wird (Registry-Aufraeumen ist asynchron)
async fn warte_bis(mut bedingung: impl FnMut() -> bool, beschreibung: &str) {
    for _ in 0..250 {
        if bedingung() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Bedingung nie erfuellt: {beschreibung}");
}

/// Wartet auf das naechste Ereignis, mit Timeout
async fn naechstes(session: &mut RoomSession) -> SessionEreignis {
    timeout(TEST_TIMEOUT, session.naechstes_ereignis())
        .await
        .expect("Kein Ereignis innerhalb des Timeouts")
}

#[tokio::test]
async fn text_nachricht_kommt_beim_anderen_mitglied_an() {
    let (adresse, _state, _shutdown) = relay_starten().await;
    let raum = RoomId::new("alpha-1");

    let mut alice = RoomSession::beitreten(&adresse, raum.clone(), "correct-horse")
        .await
        .unwrap();
    let mut bob = RoomSession::beitreten(&adresse, raum.clone(), "correct-horse")
        .await
        .unwrap();

    // Bobs Beitritt wird Alice gemeldet – ab da ist das Routing etabliert
    match naechstes(&mut alice).await {
        SessionEreignis::PeerBeigetreten { .. } => {}
        andere => panic!("PeerBeigetreten erwartet, bekam: {andere:?}"),
    }

    alice.text_senden("hallo bob").await.unwrap();

    match naechstes(&mut bob).await {
        SessionEreignis::Nachricht { payload, .. } => {
            assert_eq!(payload, PlaintextPayload::text("hallo bob"));
        }
        andere => panic!("Nachricht erwartet, bekam: {andere:?}"),
    }
}

#[tokio::test]
async fn datei_ueberlebt_den_vollen_stack() {
    let (adresse, _state, _shutdown) = relay_starten().await;
    let raum = RoomId::new("datei-raum");

    let mut alice = RoomSession::beitreten(&adresse, raum.clone(), "pw")
        .await
        .unwrap();
    let mut bob = RoomSession::beitreten(&adresse, raum.clone(), "pw")
        .await
        .unwrap();
    match naechstes(&mut alice).await {
        SessionEreignis::PeerBeigetreten { .. } => {}
        andere => panic!("PeerBeigetreten erwartet, bekam: {andere:?}"),
    }

    let daten: Vec<u8> = (0..1024u32).map(|i| (i % 251) as u8).collect();
    alice
        .datei_senden("messwerte.bin", "application/octet-stream", daten.clone())
        .await
        .unwrap();

    match naechstes(&mut bob).await {
        SessionEreignis::Nachricht { payload, .. } => match payload {
            PlaintextPayload::File {
                name,
                mime_type,
                data,
            } => {
                assert_eq!(name, "messwerte.bin");
                assert_eq!(mime_type, "application/octet-stream");
                assert_eq!(data, daten);
            }
            andere => panic!("File-Payload erwartet, bekam: {andere:?}"),
        },
        andere => panic!("Nachricht erwartet, bekam: {andere:?}"),
    }
}

#[tokio::test]
async fn falsche_passphrase_liefert_unlesbar_statt_absturz() {
    let (adresse, _state, _shutdown) = relay_starten().await;
    let raum = RoomId::new("beta-2");

    let mut alice = RoomSession::beitreten(&adresse, raum.clone(), "correct-horse")
        .await
        .unwrap();
    let mut mallory = RoomSession::beitreten(&adresse, raum.clone(), "wrong-password")
        .await
        .unwrap();
    match naechstes(&mut alice).await {
        SessionEreignis::PeerBeigetreten { .. } => {}
        andere => panic!("PeerBeigetreten erwartet, bekam: {andere:?}"),
    }

    alice.text_senden("geheim").await.unwrap();

    // Mallorys Schluessel passt nicht: Envelope kommt an, laesst sich aber
    // nicht oeffnen. Die Session lebt danach weiter.
    match naechstes(&mut mallory).await {
        SessionEreignis::Unlesbar { .. } => {}
        andere => panic!("Unlesbar erwartet, bekam: {andere:?}"),
    }
}

#[tokio::test]
async fn getrenntes_mitglied_bekommt_nichts_mehr() {
    let (adresse, state, _shutdown) = relay_starten().await;
    let raum = RoomId::new("gamma-3");

    let alice = RoomSession::beitreten(&adresse, raum.clone(), "pw")
        .await
        .unwrap();
    let mut bob = RoomSession::beitreten(&adresse, raum.clone(), "pw")
        .await
        .unwrap();

    warte_bis(
        || state.registry.raum_mitglieder(&raum).len() == 2,
        "beide Mitglieder im Raum",
    )
    .await;

    // Alice trennt die Verbindung; das Relay raeumt ihre Session auf
    drop(alice);
    warte_bis(
        || state.registry.raum_mitglieder(&raum).len() == 1,
        "Alice aus dem Raum entfernt",
    )
    .await;

    // Senden in den fast leeren Raum ist ein Noop, kein Fehler
    bob.text_senden("jemand da?").await.unwrap();
    assert_eq!(state.registry.session_anzahl(), 1);
}

#[tokio::test]
async fn leerer_raum_wird_vergessen() {
    let (adresse, state, _shutdown) = relay_starten().await;
    let raum = RoomId::new("delta-4");

    let alice = RoomSession::beitreten(&adresse, raum.clone(), "pw")
        .await
        .unwrap();
    warte_bis(
        || state.registry.aktive_raeume().contains(&raum),
        "Raum in der Registry",
    )
    .await;

    // Letztes Mitglied geht: der Raum verschwindet restlos
    drop(alice);
    warte_bis(
        || state.registry.aktive_raeume().is_empty(),
        "Registry vergisst den leeren Raum",
    )
    .await;
}

#[tokio::test]
async fn peer_beitritt_wird_gemeldet_ohne_inhalt() {
    let (adresse, state, _shutdown) = relay_starten().await;
    let raum = RoomId::new("epsilon-5");

    let mut alice = RoomSession::beitreten(&adresse, raum.clone(), "pw")
        .await
        .unwrap();
    let _bob = RoomSession::beitreten(&adresse, raum.clone(), "pw")
        .await
        .unwrap();

    match naechstes(&mut alice).await {
        SessionEreignis::PeerBeigetreten { sender } => {
            // Der gemeldete Peer ist ein registriertes Mitglied des Raums
            assert!(state.registry.raum_mitglieder(&raum).contains(&sender));
        }
        andere => panic!("PeerBeigetreten erwartet, bekam: {andere:?}"),
    }
}

#[tokio::test]
async fn raeume_sind_voneinander_isoliert() {
    let (adresse, _state, _shutdown) = relay_starten().await;

    let mut alice = RoomSession::beitreten(&adresse, RoomId::new("raum-a"), "pw")
        .await
        .unwrap();
    let mut bob = RoomSession::beitreten(&adresse, RoomId::new("raum-a"), "pw")
        .await
        .unwrap();
    let mut carol = RoomSession::beitreten(&adresse, RoomId::new("raum-b"), "pw")
        .await
        .unwrap();

    match naechstes(&mut alice).await {
        SessionEreignis::PeerBeigetreten { .. } => {}
        andere => panic!("PeerBeigetreten erwartet, bekam: {andere:?}"),
    }

    alice.text_senden("nur fuer raum-a").await.unwrap();

    // Bob bekommt die Nachricht, Carol nicht
    match naechstes(&mut bob).await {
        SessionEreignis::Nachricht { payload, .. } => {
            assert_eq!(payload, PlaintextPayload::text("nur fuer raum-a"));
        }
        andere => panic!("Nachricht erwartet, bekam: {andere:?}"),
    }
    let nichts = timeout(Duration::from_millis(300), carol.naechstes_ereignis()).await;
    assert!(nichts.is_err(), "Carol darf keine Nachricht aus raum-a sehen");
}

#[tokio::test]
async fn leere_eingaben_erreichen_das_relay_nie() {
    let (adresse, state, _shutdown) = relay_starten().await;

    let ergebnis = RoomSession::beitreten(&adresse, RoomId::new(""), "pw").await;
    assert!(matches!(ergebnis, Err(ClientError::EingabeFehlt(_))));

    let ergebnis = RoomSession::beitreten(&adresse, RoomId::new("raum"), "").await;
    assert!(matches!(ergebnis, Err(ClientError::EingabeFehlt(_))));

    // Keine der beiden Ablehnungen hat eine Session registriert
    assert_eq!(state.registry.session_anzahl(), 0);
}

#[tokio::test]
async fn submit_ohne_beitritt_wird_nicht_zugestellt() {
    let (adresse, state, _shutdown) = relay_starten().await;
    let raum = RoomId::new("eta-7");

    let mut bob = RoomSession::beitreten(&adresse, raum.clone(), "pw")
        .await
        .unwrap();

    // Rohe Verbindung, die nie einem Raum beitritt
    let stream = TcpStream::connect(&adresse).await.unwrap();
    let mut roh = Framed::new(stream, FrameCodec::new());
    roh.send(RelayMessage::submit(
        1,
        raum.clone(),
        Envelope::neu(vec![1, 2, 3], [0u8; 12]),
    ))
    .await
    .unwrap();

    // Routing-Noop: bei Bob kommt nichts an
    let nichts = timeout(Duration::from_millis(300), bob.naechstes_ereignis()).await;
    assert!(nichts.is_err(), "Submit ohne Beitritt darf nichts zustellen");

    // Die rohe Verbindung lebt weiter: ein nachgereichter Join wirkt noch
    roh.send(RelayMessage::join(2, raum.clone())).await.unwrap();
    match naechstes(&mut bob).await {
        SessionEreignis::PeerBeigetreten { sender } => {
            assert!(state.registry.raum_mitglieder(&raum).contains(&sender));
        }
        andere => panic!("PeerBeigetreten erwartet, bekam: {andere:?}"),
    }
}

#[tokio::test]
async fn submit_mit_fremder_raum_kennung_wird_ignoriert() {
    let (adresse, _state, _shutdown) = relay_starten().await;
    let eigener_raum = RoomId::new("theta-8");
    let fremder_raum = RoomId::new("iota-9");

    let mut bob = RoomSession::beitreten(&adresse, fremder_raum.clone(), "pw")
        .await
        .unwrap();

    // Verbindung tritt theta-8 bei, reicht aber unter iota-9 ein
    let stream = TcpStream::connect(&adresse).await.unwrap();
    let mut roh = Framed::new(stream, FrameCodec::new());
    roh.send(RelayMessage::join(1, eigener_raum)).await.unwrap();
    roh.send(RelayMessage::submit(
        2,
        fremder_raum,
        Envelope::neu(vec![9, 9, 9], [7u8; 12]),
    ))
    .await
    .unwrap();

    // Die Raum-Kennung im Submit zaehlt nur, wenn sie zur eigenen
    // Mitgliedschaft passt – Bob bekommt nichts
    let nichts = timeout(Duration::from_millis(300), bob.naechstes_ereignis()).await;
    assert!(nichts.is_err(), "Fremde Raum-Kennung darf nicht routen");
}

#[tokio::test]
async fn datei_limit_gilt_clientseitig() {
    let (adresse, _state, _shutdown) = relay_starten().await;

    let mut alice = RoomSession::beitreten(&adresse, RoomId::new("zeta-6"), "pw")
        .await
        .unwrap();

    let zu_gross = vec![0u8; MAX_DATEI_BYTES + 1];
    let ergebnis = alice.datei_senden("riesig.bin", "application/zip", zu_gross).await;
    assert!(matches!(ergebnis, Err(ClientError::DateiZuGross { .. })));
}
