//! Beacon wire format
//!
//! A beacon is the waypoint index as an unsigned 32-bit big-endian integer,
//! sent once per completed move. The same framing is used on the robot to
//! playback path and on the controller acknowledgement path.

/// Size of one beacon frame in bytes
pub const BEACON_LEN: usize = 4;

/// Why a frame was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedFrame {
    /// Fewer than four bytes arrived before the stream ended
    Truncated {
        /// Bytes received
        received: usize,
    },
    /// Index outside the active trajectory
    OutOfRange {
        /// Received index
        index: u32,
        /// Waypoint count of the active trajectory
        len: usize,
    },
}

impl std::fmt::Display for MalformedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedFrame::Truncated { received } => {
                write!(f, "truncated beacon ({} of {} bytes)", received, BEACON_LEN)
            }
            MalformedFrame::OutOfRange { index, len } => {
                write!(f, "beacon index {} outside trajectory of {} waypoints", index, len)
            }
        }
    }
}

/// A decoded beacon frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeaconFrame {
    /// Waypoint `i` was physically reached
    MotionComplete(u32),
    /// Frame cannot be acted upon
    Malformed(MalformedFrame),
}

impl BeaconFrame {
    /// Decode raw bytes. Anything but exactly four bytes is malformed.
    pub fn decode(bytes: &[u8]) -> Self {
        match <[u8; BEACON_LEN]>::try_from(bytes) {
            Ok(raw) => BeaconFrame::MotionComplete(u32::from_be_bytes(raw)),
            Err(_) => BeaconFrame::Malformed(MalformedFrame::Truncated {
                received: bytes.len(),
            }),
        }
    }

    /// Reject indices outside `[0, len)`.
    pub fn within(self, len: usize) -> Self {
        match self {
            BeaconFrame::MotionComplete(index) if (index as usize) >= len => {
                BeaconFrame::Malformed(MalformedFrame::OutOfRange { index, len })
            }
            other => other,
        }
    }
}

/// Encode a waypoint index as a beacon frame
pub fn encode(index: u32) -> [u8; BEACON_LEN] {
    index.to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_big_endian() {
        assert_eq!(
            BeaconFrame::decode(&[0, 0, 1, 2]),
            BeaconFrame::MotionComplete(258)
        );
        assert_eq!(encode(258), [0, 0, 1, 2]);
    }

    #[test]
    fn test_short_frame_is_malformed() {
        assert_eq!(
            BeaconFrame::decode(&[0, 1]),
            BeaconFrame::Malformed(MalformedFrame::Truncated { received: 2 })
        );
        assert!(matches!(
            BeaconFrame::decode(&[0; 5]),
            BeaconFrame::Malformed(_)
        ));
    }

    #[test]
    fn test_range_check() {
        assert_eq!(
            BeaconFrame::MotionComplete(9).within(10),
            BeaconFrame::MotionComplete(9)
        );
        assert_eq!(
            BeaconFrame::MotionComplete(999).within(10),
            BeaconFrame::Malformed(MalformedFrame::OutOfRange {
                index: 999,
                len: 10
            })
        );
        assert!(matches!(
            BeaconFrame::MotionComplete(0).within(0),
            BeaconFrame::Malformed(_)
        ));
    }
}
