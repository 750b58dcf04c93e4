use crate::LogError;
use derive_more::{Deref, Display, From};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use std::mem;

/// A stable numeric identifier of a field within one message type.
#[derive(From, Deref, Display, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub struct FieldId(u16);
impl FieldId {
    pub const fn new(id: u16) -> Self {
        Self(id)
    }
    pub fn from_le_bytes(buf: [u8; mem::size_of::<u16>()]) -> Self {
        Self(u16::from_le_bytes(buf))
    }
}

#[derive(From, Deref, Clone, Copy, Debug)]
pub struct WireKindInt(u8);
impl From<WireKind> for WireKindInt {
    fn from(kind: WireKind) -> Self {
        Self(kind as u8)
    }
}

/// We pin the discriminants because they are written to disk.
/// Zero is left unassigned so that a zeroed-out region never parses as a valid field.
#[repr(u8)]
#[derive(PartialEq, Eq, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum WireKind {
    Fixed32 = 1,
    Fixed64 = 2,
    LengthDelimited = 3,
}
impl TryFrom<WireKindInt> for WireKind {
    type Error = LogError;
    fn try_from(int: WireKindInt) -> Result<Self, LogError> {
        WireKind::from_u8(int.0)
            .ok_or_else(|| LogError::malformed(format!("Unknown wire kind {}.", int.0)))
    }
}
impl WireKind {
    /// The body length of a fixed-length wire kind.
    pub fn fixed_body_len(&self) -> Option<usize> {
        match self {
            WireKind::Fixed32 => Some(mem::size_of::<u32>()),
            WireKind::Fixed64 => Some(mem::size_of::<u64>()),
            WireKind::LengthDelimited => None,
        }
    }
}
