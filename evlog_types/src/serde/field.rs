use crate::serde::{FieldId, WireKind};
use crate::{LogError, Result};
use std::mem;

mod deser;
mod ser;
pub use deser::*;
pub use ser::*;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct FieldHeader {
    pub id: FieldId,
    pub kind: WireKind,
}

/// The body of one field, as found on the wire.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum FieldBody {
    Fixed32([u8; 4]),
    Fixed64([u8; 8]),
    LengthDelimited(Vec<u8>),
}

/* Interpretation of a body as a declared type. */
impl FieldBody {
    pub fn into_f32(self, id: FieldId) -> Result<f32> {
        match self {
            Self::Fixed32(buf) => Ok(f32::from_le_bytes(buf)),
            _ => Err(Self::unexpected_kind(id, WireKind::Fixed32)),
        }
    }

    pub fn into_f64(self, id: FieldId) -> Result<f64> {
        match self {
            Self::Fixed64(buf) => Ok(f64::from_le_bytes(buf)),
            _ => Err(Self::unexpected_kind(id, WireKind::Fixed64)),
        }
    }

    pub fn into_bytes(self, id: FieldId) -> Result<Vec<u8>> {
        match self {
            Self::LengthDelimited(buf) => Ok(buf),
            _ => Err(Self::unexpected_kind(id, WireKind::LengthDelimited)),
        }
    }

    /// Invalid UTF-8 is an error. It is never replaced by substitute characters.
    pub fn into_string(self, id: FieldId) -> Result<String> {
        let buf = self.into_bytes(id)?;
        String::from_utf8(buf).map_err(|e| LogError::EncodingError {
            field_id: *id,
            source: e.utf8_error(),
        })
    }

    pub fn into_packed_i64s(self, id: FieldId) -> Result<Vec<i64>> {
        let buf = self.into_bytes(id)?;
        const WIDTH: usize = mem::size_of::<i64>();
        if buf.len() % WIDTH != 0 {
            return Err(LogError::malformed(format!(
                "Field {id} holds {} bytes, which is not a whole number of i64s.",
                buf.len()
            )));
        }
        let ints = buf
            .chunks_exact(WIDTH)
            .map(|chunk| {
                let mut int_buf = [0u8; WIDTH];
                int_buf.copy_from_slice(chunk);
                i64::from_le_bytes(int_buf)
            })
            .collect();
        Ok(ints)
    }

    fn unexpected_kind(id: FieldId, expected: WireKind) -> LogError {
        LogError::malformed(format!("Field {id} is expected to be {expected:?}."))
    }
}
