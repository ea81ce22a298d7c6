//! Room transport abstraction. The sync layer only needs "send state",
//! "send event", and poll-style receive; everything else about the hosted
//! pub/sub service stays behind these traits. The loopback hub is the
//! in-process implementation used by the netplay demo and the tests.

use log::{debug, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared::protocol::{EventMessage, StateMessage};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug)]
pub enum ChannelError {
    /// The channel was closed locally or the room went away.
    Closed,
    Codec(String),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::Closed => write!(f, "channel closed"),
            ChannelError::Codec(msg) => write!(f, "codec error: {}", msg),
        }
    }
}

impl std::error::Error for ChannelError {}

/// Per-room message bus as seen by one peer. Receivers are drained by
/// polling from the frame loop; there are no callbacks to race over.
pub trait RoomChannel {
    fn send_state(&mut self, msg: &StateMessage) -> Result<(), ChannelError>;
    fn send_event(&mut self, msg: &EventMessage) -> Result<(), ChannelError>;
    fn try_recv_state(&mut self) -> Option<StateMessage>;
    fn try_recv_event(&mut self) -> Option<EventMessage>;
    fn close(&mut self);
}

struct PeerSenders {
    state: UnboundedSender<Vec<u8>>,
    event: UnboundedSender<Vec<u8>>,
}

type PeerMap = Arc<Mutex<HashMap<String, PeerSenders>>>;

/// In-process pub/sub room: every message a peer sends is fanned out to
/// every other joined peer. Messages pass through the serialized form so
/// the loopback path exercises the same codec as a real transport would.
#[derive(Clone, Default)]
pub struct LoopbackHub {
    peers: PeerMap,
}

impl LoopbackHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn join(&self, peer_id: &str) -> LoopbackChannel {
        let (state_tx, state_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        if let Ok(mut peers) = self.peers.lock() {
            peers.insert(
                peer_id.to_string(),
                PeerSenders {
                    state: state_tx,
                    event: event_tx,
                },
            );
        }
        debug!("{} joined loopback room", peer_id);

        LoopbackChannel {
            peer_id: peer_id.to_string(),
            peers: Arc::clone(&self.peers),
            state_rx,
            event_rx,
            open: true,
        }
    }
}

pub struct LoopbackChannel {
    peer_id: String,
    peers: PeerMap,
    state_rx: UnboundedReceiver<Vec<u8>>,
    event_rx: UnboundedReceiver<Vec<u8>>,
    open: bool,
}

impl LoopbackChannel {
    fn broadcast(&self, bytes: Vec<u8>, pick: fn(&PeerSenders) -> &UnboundedSender<Vec<u8>>) {
        if let Ok(peers) = self.peers.lock() {
            for (id, senders) in peers.iter() {
                if id != &self.peer_id {
                    // A dropped receiver just means that peer already left.
                    let _ = pick(senders).send(bytes.clone());
                }
            }
        }
    }
}

impl RoomChannel for LoopbackChannel {
    fn send_state(&mut self, msg: &StateMessage) -> Result<(), ChannelError> {
        if !self.open {
            return Err(ChannelError::Closed);
        }
        let bytes = bincode::serialize(msg).map_err(|e| ChannelError::Codec(e.to_string()))?;
        self.broadcast(bytes, |p| &p.state);
        Ok(())
    }

    fn send_event(&mut self, msg: &EventMessage) -> Result<(), ChannelError> {
        if !self.open {
            return Err(ChannelError::Closed);
        }
        let bytes = bincode::serialize(msg).map_err(|e| ChannelError::Codec(e.to_string()))?;
        self.broadcast(bytes, |p| &p.event);
        Ok(())
    }

    fn try_recv_state(&mut self) -> Option<StateMessage> {
        while let Ok(bytes) = self.state_rx.try_recv() {
            match bincode::deserialize(&bytes) {
                Ok(msg) => return Some(msg),
                Err(e) => warn!("Dropping undecodable state message: {}", e),
            }
        }
        None
    }

    fn try_recv_event(&mut self) -> Option<EventMessage> {
        while let Ok(bytes) = self.event_rx.try_recv() {
            match bincode::deserialize(&bytes) {
                Ok(msg) => return Some(msg),
                Err(e) => warn!("Dropping undecodable event message: {}", e),
            }
        }
        None
    }

    fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Ok(mut peers) = self.peers.lock() {
            peers.remove(&self.peer_id);
        }
        debug!("{} left loopback room", self.peer_id);
    }
}

impl Drop for LoopbackChannel {
    fn drop(&mut self) {
        self.close();
    }
}

// --- room directory ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Waiting,
    Ready,
    Playing,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Room {
    pub id: String,
    pub code: String,
    pub host_id: String,
    pub guest_id: Option<String>,
    pub game_type: String,
    pub status: RoomStatus,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RoomError {
    UnknownRoom,
    UnknownCode,
    RoomFull,
}

impl fmt::Display for RoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomError::UnknownRoom => write!(f, "no such room"),
            RoomError::UnknownCode => write!(f, "no room with that code"),
            RoomError::RoomFull => write!(f, "room already has a guest"),
        }
    }
}

impl std::error::Error for RoomError {}

/// Room lifecycle as the core needs it; the hosted backend's matchmaking
/// tables sit behind this in a real deployment.
pub trait RoomDirectory {
    fn create_room(&mut self, host_id: &str, game_type: &str) -> Result<Room, RoomError>;
    fn join_room(&mut self, code: &str, guest_id: &str) -> Result<Room, RoomError>;
    fn get_room(&self, room_id: &str) -> Option<Room>;
    fn update_status(&mut self, room_id: &str, status: RoomStatus) -> Result<(), RoomError>;
}

const ROOM_CODE_LEN: usize = 6;
const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub struct LocalRooms {
    rooms: HashMap<String, Room>,
    next_id: u64,
    rng: StdRng,
}

impl LocalRooms {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rooms: HashMap::new(),
            next_id: 0,
            rng,
        }
    }

    fn make_code(&mut self) -> String {
        (0..ROOM_CODE_LEN)
            .map(|_| ROOM_CODE_CHARSET[self.rng.gen_range(0..ROOM_CODE_CHARSET.len())] as char)
            .collect()
    }
}

impl Default for LocalRooms {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomDirectory for LocalRooms {
    fn create_room(&mut self, host_id: &str, game_type: &str) -> Result<Room, RoomError> {
        let id = format!("room-{}", self.next_id);
        self.next_id += 1;
        let code = self.make_code();

        let room = Room {
            id: id.clone(),
            code,
            host_id: host_id.to_string(),
            guest_id: None,
            game_type: game_type.to_string(),
            status: RoomStatus::Waiting,
        };
        self.rooms.insert(id, room.clone());
        Ok(room)
    }

    fn join_room(&mut self, code: &str, guest_id: &str) -> Result<Room, RoomError> {
        let room = self
            .rooms
            .values_mut()
            .find(|r| r.code == code)
            .ok_or(RoomError::UnknownCode)?;

        if room.guest_id.is_some() {
            return Err(RoomError::RoomFull);
        }
        room.guest_id = Some(guest_id.to_string());
        room.status = RoomStatus::Ready;
        Ok(room.clone())
    }

    fn get_room(&self, room_id: &str) -> Option<Room> {
        self.rooms.get(room_id).cloned()
    }

    fn update_status(&mut self, room_id: &str, status: RoomStatus) -> Result<(), RoomError> {
        let room = self.rooms.get_mut(room_id).ok_or(RoomError::UnknownRoom)?;
        room.status = status;
        Ok(())
    }
}
