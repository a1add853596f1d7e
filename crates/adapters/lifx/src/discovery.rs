//! Device discovery via UDP broadcast.
//!
//! A single `GetService` broadcast is followed by a receive loop that runs
//! until the deadline. Each `StateService` reply is answered with a unicast
//! `GetLabel`, and `StateLabel` replies arriving in the same loop name the
//! device. Devices that never report a label are named after their MAC.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout};

use crate::error::LifxError;
use crate::protocol::{Mac, Message, Packet, SERVICE_UDP};

/// A bulb that answered discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredBulb {
    pub mac: Mac,
    pub addr: SocketAddr,
    pub label: Option<String>,
}

const RECV_TIMEOUT: Duration = Duration::from_millis(200);

/// Broadcast `GetService` to `broadcast` and collect replies until
/// `discovery_timeout` elapses.
///
/// # Errors
///
/// Returns [`LifxError::Discovery`] when the broadcast cannot be sent.
/// Malformed or foreign datagrams are skipped.
pub async fn discover_bulbs(
    socket: &UdpSocket,
    source: u32,
    broadcast: SocketAddr,
    discovery_timeout: Duration,
) -> Result<Vec<DiscoveredBulb>, LifxError> {
    socket
        .send_to(&Packet::broadcast(source, Message::GetService).encode(), broadcast)
        .await
        .map_err(LifxError::Discovery)?;

    let mut discovered: HashMap<Mac, DiscoveredBulb> = HashMap::new();
    let deadline = Instant::now() + discovery_timeout;
    let mut buffer = [0u8; 512];

    while Instant::now() < deadline {
        let wait = RECV_TIMEOUT.min(deadline.saturating_duration_since(Instant::now()));
        let Ok(Ok((size, from))) = timeout(wait, socket.recv_from(&mut buffer)).await else {
            continue;
        };
        let packet = match Packet::decode(&buffer[..size]) {
            Ok(packet) if packet.source == source => packet,
            Ok(_) => continue,
            Err(err) => {
                tracing::debug!(%err, %from, "ignoring datagram during LIFX discovery");
                continue;
            }
        };
        let Some(mac) = packet.target else {
            continue;
        };

        match packet.message {
            Message::StateService { service, port } if service == SERVICE_UDP => {
                let Ok(port) = u16::try_from(port) else {
                    continue;
                };
                let addr = SocketAddr::new(from.ip(), port);
                if discovered.contains_key(&mac) {
                    continue;
                }
                tracing::debug!(%mac, %addr, "LIFX bulb answered discovery");
                discovered.insert(
                    mac,
                    DiscoveredBulb {
                        mac,
                        addr,
                        label: None,
                    },
                );
                let mut get_label = Packet::to_device(source, mac, 0, Message::GetLabel);
                get_label.res_required = true;
                if let Err(err) = socket.send_to(&get_label.encode(), addr).await {
                    tracing::warn!(%err, %mac, "could not request LIFX label");
                }
            }
            Message::StateLabel { label } => {
                if let Some(bulb) = discovered.get_mut(&mac) {
                    bulb.label = Some(label);
                }
            }
            _ => {}
        }
    }

    let mut bulbs: Vec<DiscoveredBulb> = discovered.into_values().collect();
    bulbs.sort_by_key(|bulb| bulb.mac.0);
    Ok(bulbs)
}
