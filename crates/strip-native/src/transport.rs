//! Fire-and-forget UDP sender for frames.

use anyhow::Context;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, Instant};

/// Minimum gap between name lookups once one has failed or a send has.
const RESOLVE_BACKOFF: Duration = Duration::from_secs(1);

pub struct UdpTransport {
    socket: UdpSocket,
    host: String,
    port: u16,
    target: Option<SocketAddr>,
    /// When set, the next lookup is held off until this instant.
    resolve_after: Option<Instant>,
    lookups: u64,
    failing: bool,
    sent: u64,
    dropped: u64,
}

impl UdpTransport {
    pub fn new(host: &str, port: u16) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0").context("binding outbound UDP socket")?;
        Ok(Self {
            socket,
            host: host.to_string(),
            port,
            target: None,
            resolve_after: None,
            lookups: 0,
            failing: false,
            sent: 0,
            dropped: 0,
        })
    }

    /// Send one datagram. Failures drop the frame and are never retried.
    /// After a failure the destination is looked up again, at most once per
    /// [`RESOLVE_BACKOFF`]; in between, the last good address is reused.
    pub fn send(&mut self, payload: &[u8]) -> bool {
        let now = Instant::now();
        let due = match self.resolve_after {
            Some(at) => now >= at,
            None => self.target.is_none(),
        };
        if due {
            match self.resolve() {
                Ok(addr) => {
                    self.target = Some(addr);
                    self.resolve_after = None;
                }
                Err(e) => {
                    self.resolve_after = Some(Instant::now() + RESOLVE_BACKOFF);
                    if self.target.is_none() {
                        self.note_failure(&e);
                        return false;
                    }
                    log::debug!("keeping previous address: {e:#}");
                }
            }
        }
        let Some(target) = self.target else {
            self.dropped += 1;
            log::trace!("frame dropped, waiting to resolve {}:{}", self.host, self.port);
            return false;
        };
        match self.socket.send_to(payload, target) {
            Ok(_) => {
                if self.failing {
                    log::info!("LED controller {target} reachable again");
                    self.failing = false;
                }
                self.sent += 1;
                true
            }
            Err(e) => {
                if self.resolve_after.is_none() {
                    self.resolve_after = Some(now + RESOLVE_BACKOFF);
                }
                self.note_failure(&anyhow::Error::new(e).context(format!("sending to {target}")));
                false
            }
        }
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn resolve(&mut self) -> anyhow::Result<SocketAddr> {
        self.lookups += 1;
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .with_context(|| format!("resolving {}:{}", self.host, self.port))?
            .next()
            .with_context(|| format!("no address for {}:{}", self.host, self.port))
    }

    fn note_failure(&mut self, err: &anyhow::Error) {
        self.dropped += 1;
        if self.failing {
            log::debug!("frame dropped: {err:#}");
        } else {
            log::warn!("frame dropped: {err:#}");
            self.failing = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sends_whole_frame_to_local_socket() {
        let receiver = UdpSocket::bind("127.0.0.1:0").expect("bind receiver");
        receiver
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("timeout");
        let port = receiver.local_addr().expect("addr").port();

        let mut transport = UdpTransport::new("127.0.0.1", port).expect("transport");
        let frame = strip_core::FrameBuffer::new(5);
        assert!(transport.send(frame.as_bytes()));
        assert!(transport.send(frame.as_bytes()));

        let mut buf = [0u8; 64];
        let (n, _) = receiver.recv_from(&mut buf).expect("datagram");
        assert_eq!(n, strip_core::frame_len(5));
        assert_eq!(transport.sent(), 2);
        assert_eq!(transport.lookups, 1);
    }

    #[test]
    fn unresolvable_host_drops_without_error() {
        let mut transport = UdpTransport::new("host.invalid", 7777).expect("transport");
        assert!(!transport.send(&[0; 6]));
        assert!(!transport.send(&[0; 6]));
        assert_eq!(transport.dropped(), 2);
        assert_eq!(transport.sent(), 0);
    }

    #[test]
    fn failed_lookup_is_not_repeated_every_frame() {
        let mut transport = UdpTransport::new("host.invalid", 7777).expect("transport");
        for _ in 0..50 {
            assert!(!transport.send(&[0; 6]));
        }
        assert_eq!(transport.lookups, 1);
        assert_eq!(transport.dropped(), 50);

        // Once the backoff has passed the name is tried again.
        transport.resolve_after = Some(Instant::now() - Duration::from_millis(1));
        assert!(!transport.send(&[0; 6]));
        assert_eq!(transport.lookups, 2);
    }
}
