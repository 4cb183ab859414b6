//! Presence feed: decodes "who is here" datagrams and reconciles particles.

use anyhow::Context;
use serde::Deserialize;
use std::net::UdpSocket;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use strip_core::{from_rgb8, hue_key, rgb_to_hue, SharedParticles};

/// One user's color, either as a hue in degrees or as an RGB byte triple.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserColor {
    Hue(f64),
    Rgb([u8; 3]),
}

impl UserColor {
    fn hue(&self) -> u16 {
        match *self {
            UserColor::Hue(h) => hue_key(h as f32),
            UserColor::Rgb(rgb) => rgb_to_hue(from_rgb8(rgb)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PresenceMessage {
    // Tried first so a bare array is never read as a positional `Users`.
    Bare(Vec<UserColor>),
    Users { users: Vec<UserColor> },
}

/// Decode a presence datagram into hue keys.
pub fn decode(bytes: &[u8]) -> anyhow::Result<Vec<u16>> {
    let message: PresenceMessage =
        serde_json::from_slice(bytes).context("decoding presence message")?;
    let users = match message {
        PresenceMessage::Users { users } => users,
        PresenceMessage::Bare(users) => users,
    };
    Ok(users.iter().map(UserColor::hue).collect())
}

/// Listen for presence datagrams on `bind` and reconcile `particles` against
/// each one. Hues of newly created particles are forwarded on `created`.
pub fn spawn_listener(
    bind: &str,
    particles: SharedParticles,
    created: Sender<Vec<u16>>,
) -> anyhow::Result<JoinHandle<()>> {
    let socket =
        UdpSocket::bind(bind).with_context(|| format!("binding presence listener on {bind}"))?;
    log::info!("listening for presence updates on {}", socket.local_addr()?);
    thread::Builder::new()
        .name("presence-listener".into())
        .spawn(move || listen(socket, particles, created))
        .context("spawning presence listener")
}

fn listen(socket: UdpSocket, particles: SharedParticles, created: Sender<Vec<u16>>) {
    let mut buf = [0u8; 4096];
    loop {
        let (n, peer) = match socket.recv_from(&mut buf) {
            Ok(received) => received,
            Err(e) => {
                log::warn!("presence receive failed: {e}");
                continue;
            }
        };
        let hues = match decode(&buf[..n]) {
            Ok(hues) => hues,
            Err(e) => {
                log::warn!("ignoring presence message from {peer}: {e:#}");
                continue;
            }
        };
        let report = particles.reconcile(&hues);
        if report.is_steady() {
            continue;
        }
        log::info!(
            "presence from {peer}: {} retained, {} new, {} gone",
            report.retained,
            report.created.len(),
            report.dropped
        );
        if !report.created.is_empty() && created.send(report.created).is_err() {
            log::debug!("frame loop gone, stopping presence listener");
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::time::Duration;
    use strip_core::ParticleSet;

    #[test]
    fn decodes_both_message_shapes() {
        assert_eq!(decode(br#"{"users": [10, 20, 20]}"#).expect("users"), vec![10, 20, 20]);
        assert_eq!(decode(b"[30, 370, -10]").expect("bare"), vec![30, 10, 350]);
    }

    #[test]
    fn decodes_rgb_triples() {
        let hues = decode(br#"{"users": [[255, 0, 0], [0, 0, 255], 45.4]}"#).expect("rgb");
        assert_eq!(hues, vec![0, 240, 45]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode(b"not json").is_err());
        assert!(decode(br#"{"users": ["red"]}"#).is_err());
        assert!(decode(br#"{"people": []}"#).is_err());
    }

    #[test]
    fn listener_reconciles_and_reports_new_hues() {
        let shared = SharedParticles::new(ParticleSet::new(Some(1)));
        let (tx, rx) = mpsc::channel();
        let probe = UdpSocket::bind("127.0.0.1:0").expect("probe");
        let addr = probe.local_addr().expect("addr");
        drop(probe);

        spawn_listener(&addr.to_string(), shared.clone(), tx).expect("listener");
        let sender = UdpSocket::bind("127.0.0.1:0").expect("sender");
        sender
            .send_to(br#"{"users": [120, 120]}"#, addr)
            .expect("send");

        let created = rx.recv_timeout(Duration::from_secs(2)).expect("created hues");
        assert_eq!(created, vec![120, 120]);
        assert_eq!(shared.len(), 2);
    }
}
