//! The arm side of the robot: per-square servo angles and the packet sent to the microcontroller.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

use cozy_chess::{File as BoardFile, Rank, Square};
use log::{debug, info};

use crate::encoder::MoveDetails;
use crate::error::ActuatorError;

pub const PACKET_LEN: usize = 9;

/// Two servo angles for each of the 64 squares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AngleTable {
    angles: [[i32; 2]; 64],
}

impl AngleTable {
    /// Parses 64 `label = a, b` lines ordered a8, b8, ..., h8, a7, ..., h1. Blank lines are skipped; the label
    /// is informational only.
    pub fn parse(text: &str) -> Result<Self, ActuatorError> {
        let mut angles = [[0i32; 2]; 64];
        let mut count = 0usize;
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            let (_, values) = line
                .split_once('=')
                .ok_or_else(|| ActuatorError::Table { line: line_no, reason: "missing '='".into() })?;
            let parsed: Vec<i32> = values
                .split(',')
                .map(|v| v.trim().parse::<i32>())
                .collect::<Result<_, _>>()
                .map_err(|e| ActuatorError::Table { line: line_no, reason: e.to_string() })?;
            let [a, b] = parsed[..] else {
                return Err(ActuatorError::Table { line: line_no, reason: format!("expected 2 angles, found {}", parsed.len()) });
            };
            if count >= 64 {
                return Err(ActuatorError::TableSize(count + 1));
            }
            let sq = Square::new(BoardFile::index(count % 8), Rank::index(7 - count / 8));
            angles[sq as usize] = [a, b];
            count += 1;
        }
        if count != 64 {
            return Err(ActuatorError::TableSize(count));
        }
        Ok(Self { angles })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ActuatorError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    pub fn angles(&self, square: Square) -> [i32; 2] { self.angles[square as usize] }
}

fn parse_pair(text: &str) -> Result<(Square, Square), ActuatorError> {
    let bad = || ActuatorError::MoveText(text.to_string());
    if text.len() < 4 || !text.is_char_boundary(2) || !text.is_char_boundary(4) {
        return Err(bad());
    }
    let from = text[0..2].parse::<Square>().map_err(|_| bad())?;
    let to = text[2..4].parse::<Square>().map_err(|_| bad())?;
    Ok((from, to))
}

// The controller reads unsigned bytes: a negative angle is sent as its magnitude plus 200.
fn angle_byte(angle: i32) -> Result<u8, ActuatorError> {
    let wire = if angle < 0 { angle.abs() + 200 } else { angle };
    u8::try_from(wire).map_err(|_| ActuatorError::AngleRange(angle))
}

/// Flag byte, then from/to angles, then the rook's from/to angles for castling or four zero pads.
pub fn encode_packet(details: &MoveDetails, table: &AngleTable) -> Result<[u8; PACKET_LEN], ActuatorError> {
    let (from, to) = parse_pair(&details.move_string)?;
    let mut angles = Vec::with_capacity(PACKET_LEN - 1);
    angles.extend(table.angles(from));
    angles.extend(table.angles(to));
    match &details.rook_move_string {
        Some(rook) => {
            let (rf, rt) = parse_pair(rook)?;
            angles.extend(table.angles(rf));
            angles.extend(table.angles(rt));
        }
        None => angles.extend([0; 4]),
    }
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = details.flag();
    for (slot, &angle) in packet[1..].iter_mut().zip(&angles) {
        *slot = angle_byte(angle)?;
    }
    Ok(packet)
}

pub trait ActuatorSink {
    /// Carries out a robot move and returns the controller's acknowledgement byte.
    fn send(&mut self, details: &MoveDetails) -> Result<u8, ActuatorError>;
}

/// Packet link to the arm controller over any byte stream (a serial device file in production).
pub struct SerialActuator<T> {
    link: T,
    table: AngleTable,
}

impl<T: Read + Write> SerialActuator<T> {
    pub fn new(link: T, table: AngleTable) -> Self { Self { link, table } }

    pub fn into_inner(self) -> T { self.link }
}

impl SerialActuator<File> {
    /// Opens an already configured serial device (baud rate and framing are set outside the process).
    pub fn open(port: impl AsRef<Path>, table: AngleTable) -> Result<Self, ActuatorError> {
        let link = OpenOptions::new().read(true).write(true).open(port.as_ref())?;
        info!("actuator link open on {}", port.as_ref().display());
        Ok(Self::new(link, table))
    }
}

impl<T: Read + Write> ActuatorSink for SerialActuator<T> {
    fn send(&mut self, details: &MoveDetails) -> Result<u8, ActuatorError> {
        let packet = encode_packet(details, &self.table)?;
        debug!("actuator packet for {}: {:?}", details.move_string, packet);
        self.link.write_all(&packet)?;
        self.link.flush()?;
        let mut ack = [0u8; 1];
        if self.link.read(&mut ack)? == 0 {
            return Err(ActuatorError::NoAck);
        }
        Ok(ack[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::MoveKind;
    use std::io::Cursor;

    fn table() -> AngleTable {
        // square index i (a8 first) gets angles (i, -i)
        let text: String = (0..64).map(|i| format!("s{i} = {i}, -{i}\n")).collect();
        AngleTable::parse(&text).expect("table")
    }

    #[test]
    fn table_is_read_from_rank_eight_down() {
        let t = table();
        assert_eq!(t.angles(Square::A8), [0, 0]);
        assert_eq!(t.angles(Square::H8), [7, -7]);
        assert_eq!(t.angles(Square::A7), [8, -8]);
        assert_eq!(t.angles(Square::H1), [63, -63]);
    }

    #[test]
    fn table_needs_all_squares() {
        let text: String = (0..63).map(|i| format!("s{i} = 1, 2\n")).collect();
        assert!(matches!(AngleTable::parse(&text), Err(ActuatorError::TableSize(63))));
    }

    #[test]
    fn packet_pads_plain_moves_and_offsets_negatives() {
        let details = MoveDetails { move_string: "e2e4".into(), kind: MoveKind::Normal, rook_move_string: None };
        // e2 is entry 52, e4 is entry 36
        let packet = encode_packet(&details, &table()).expect("packet");
        assert_eq!(packet, [0, 52, 252, 36, 236, 0, 0, 0, 0]);
    }

    #[test]
    fn packet_carries_rook_angles_when_castling() {
        let details = MoveDetails {
            move_string: "e1g1".into(),
            kind: MoveKind::CastleKingside,
            rook_move_string: Some("h1f1".into()),
        };
        let text: String = (0..64).map(|_| "x = 10, 20\n".to_string()).collect();
        let packet = encode_packet(&details, &AngleTable::parse(&text).expect("table")).expect("packet");
        assert_eq!(packet, [2, 10, 20, 10, 20, 10, 20, 10, 20]);
    }

    #[test]
    fn serial_link_writes_packet_and_reads_ack() {
        struct Link {
            written: Vec<u8>,
            reply: Cursor<Vec<u8>>,
        }
        impl Read for Link {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> { self.reply.read(buf) }
        }
        impl Write for Link {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> { self.written.write(buf) }
            fn flush(&mut self) -> std::io::Result<()> { Ok(()) }
        }
        let link = Link { written: Vec::new(), reply: Cursor::new(vec![b'1']) };
        let mut arm = SerialActuator::new(link, table());
        let details = MoveDetails { move_string: "a8h1".into(), kind: MoveKind::Capture, rook_move_string: None };
        assert_eq!(arm.send(&details).expect("ack"), b'1');
        assert_eq!(arm.into_inner().written.len(), PACKET_LEN);
    }
}
