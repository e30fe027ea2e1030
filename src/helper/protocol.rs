use crate::MAX_FRAME_BYTES;
use crate::Score;
use crate::console::Input;
use crate::console::Snapshot;
use byteorder::BigEndian;
use byteorder::ByteOrder;
use bytes::Bytes;
use serde::Deserialize;
use serde::Serialize;
use std::fmt::Display;
use std::fmt::Formatter;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// segment-improvement local search flavors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    Random,
    Dualize,
    Ablate,
    Chop,
    Shuffle,
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let name = match self {
            Strategy::Random => "random",
            Strategy::Dualize => "dualize",
            Strategy::Ablate => "ablate",
            Strategy::Chop => "chop",
            Strategy::Shuffle => "shuffle",
        };
        write!(f, "{}", name)
    }
}

/// one unit of work shipped to a helper. exactly one kind per request;
/// every request carries the snapshots it needs, so helpers stay
/// stateless between connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// score a candidate next against the current futures pool
    ScoreNexts {
        state: Snapshot,
        next: Vec<Input>,
        futures: Vec<Vec<Input>>,
    },
    /// hill-climb a recent movie segment
    ImproveSegment {
        start_state: Snapshot,
        improveme: Vec<Input>,
        end_state: Snapshot,
        end_integral: Score,
        strategy: Strategy,
        seed: String,
        iters: usize,
        maxbest: usize,
    },
}

/// per-next scoring result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scored {
    pub immediate: Score,
    pub normalized: Score,
    pub best_future: Score,
    pub worst_future: Score,
    pub aggregate: Score,
    pub per_future_scalar: Vec<Score>,
}

/// candidate segments found by one improvement pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Improvement {
    pub inputs: Vec<Vec<Input>>,
    pub scores: Vec<Score>,
    pub iters_tried: usize,
    pub iters_better: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    ScoreNexts(Scored),
    ImproveSegment(Improvement),
}

/// encoding is canonical MessagePack: equal values produce equal bytes,
/// which the helper-side cache keys on
pub fn encode<T: Serialize>(message: &T) -> Bytes {
    Bytes::from(rmp_serde::to_vec(message).expect("encode message"))
}

pub fn decode<'a, T: Deserialize<'a>>(bytes: &'a [u8]) -> std::io::Result<T> {
    rmp_serde::from_slice(bytes)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// write a u32 big-endian length prefix then the payload
pub async fn write_frame(stream: &mut TcpStream, payload: &[u8]) -> std::io::Result<()> {
    assert!(payload.len() < MAX_FRAME_BYTES, "oversized frame");
    let mut prefix = [0u8; 4];
    BigEndian::write_u32(&mut prefix, payload.len() as u32);
    stream.write_all(&prefix).await?;
    stream.write_all(payload).await?;
    stream.flush().await
}

pub async fn read_frame(stream: &mut TcpStream) -> std::io::Result<Vec<u8>> {
    let mut prefix = [0u8; 4];
    stream.read_exact(&mut prefix).await?;
    let len = BigEndian::read_u32(&prefix) as usize;
    if len >= MAX_FRAME_BYTES {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("{} byte frame", len),
        ));
    }
    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await?;
    Ok(payload)
}
