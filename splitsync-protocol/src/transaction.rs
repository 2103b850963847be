//! Transaction identifiers and frame direction

/// Identifies a request/response contract
///
/// Both halves must agree on the payload shapes behind an id; nothing is
/// negotiated on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransactionId(pub u8);

impl TransactionId {
    /// Raw HID data forwarded from the master to the slave
    pub const HID_SYNC: Self = Self(0x01);

    /// First id free for keyboard-specific transactions
    pub const USER_BASE: Self = Self(0x40);

    /// Create an id from its wire byte
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the id as a byte value
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    /// Id `offset` places after [`TransactionId::USER_BASE`]
    pub const fn user(offset: u8) -> Self {
        Self(Self::USER_BASE.0.wrapping_add(offset))
    }
}

impl From<u8> for TransactionId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

/// Direction of a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameKind {
    /// Master to slave
    Request,
    /// Slave to master
    Response,
}

// Wire format values
const KIND_REQUEST: u8 = 0x01;
const KIND_RESPONSE: u8 = 0x02;

impl FrameKind {
    /// Parse a kind from its wire format byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            KIND_REQUEST => Some(FrameKind::Request),
            KIND_RESPONSE => Some(FrameKind::Response),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            FrameKind::Request => KIND_REQUEST,
            FrameKind::Response => KIND_RESPONSE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_values() {
        assert_eq!(FrameKind::from_byte(0x01), Some(FrameKind::Request));
        assert_eq!(FrameKind::from_byte(0x02), Some(FrameKind::Response));
        assert_eq!(FrameKind::from_byte(0x00), None);
        assert_eq!(FrameKind::Response.to_byte(), 0x02);
    }

    #[test]
    fn test_user_ids() {
        assert_eq!(TransactionId::user(0), TransactionId::USER_BASE);
        assert_eq!(TransactionId::user(3).as_u8(), 0x43);
        assert_ne!(TransactionId::user(0), TransactionId::HID_SYNC);
    }
}
