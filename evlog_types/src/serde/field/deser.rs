use crate::serde::{
    BodyLen, FieldBody, FieldHeader, FieldId, WireKind, WireKindInt, FIELD_HEADER_LEN,
};
use crate::{LogError, Result};
use std::io::{self, Cursor, ErrorKind, Read, Seek, SeekFrom};
use std::mem;

/// Reads the fields of one message, bounded by the message's declared length.
///
/// Every read and skip is charged against the bound, so a body length that overruns
/// the message is detected no matter what follows the message in `R`.
pub struct FieldReader<R> {
    r: R,
    remaining: u64,
}

impl<'a> FieldReader<Cursor<&'a [u8]>> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self::new(Cursor::new(buf), buf.len() as u64)
    }
}

impl<R: Read + Seek> FieldReader<R> {
    pub fn new(r: R, msg_len: u64) -> Self {
        Self {
            r,
            remaining: msg_len,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// `None` at the end of the message.
    pub fn next_header(&mut self) -> Result<Option<FieldHeader>> {
        if self.remaining == 0 {
            return Ok(None);
        }

        let mut buf = [0u8; FIELD_HEADER_LEN];
        self.read_exact(&mut buf)?;

        let id = FieldId::from_le_bytes([buf[0], buf[1]]);
        let kind = WireKind::try_from(WireKindInt::from(buf[2]))?;
        Ok(Some(FieldHeader { id, kind }))
    }

    pub fn read_body(&mut self, kind: WireKind) -> Result<FieldBody> {
        match kind {
            WireKind::Fixed32 => {
                let mut buf = [0u8; 4];
                self.read_exact(&mut buf)?;
                Ok(FieldBody::Fixed32(buf))
            }
            WireKind::Fixed64 => {
                let mut buf = [0u8; 8];
                self.read_exact(&mut buf)?;
                Ok(FieldBody::Fixed64(buf))
            }
            WireKind::LengthDelimited => {
                let body_len = self.read_body_len()?;
                self.claim(body_len)?;
                let mut buf = vec![0u8; body_len as usize];
                self.r.read_exact(&mut buf).map_err(map_eof)?;
                Ok(FieldBody::LengthDelimited(buf))
            }
        }
    }

    /// Moves past the body without reading it.
    pub fn skip_body(&mut self, kind: WireKind) -> Result<()> {
        let body_len = match kind.fixed_body_len() {
            Some(len) => len as u64,
            None => self.read_body_len()?,
        };
        self.claim(body_len)?;
        self.r.seek(SeekFrom::Current(body_len as i64))?;
        Ok(())
    }

    pub fn next_field(&mut self) -> Result<Option<(FieldId, FieldBody)>> {
        match self.next_header()? {
            None => Ok(None),
            Some(FieldHeader { id, kind }) => {
                let body = self.read_body(kind)?;
                Ok(Some((id, body)))
            }
        }
    }

    fn read_body_len(&mut self) -> Result<u64> {
        let mut buf = [0u8; mem::size_of::<u32>()];
        self.read_exact(&mut buf)?;
        Ok(*BodyLen::from_le_bytes(buf) as u64)
    }

    fn claim(&mut self, len: u64) -> Result<()> {
        if len > self.remaining {
            return Err(LogError::malformed(format!(
                "A declared length of {len} bytes exceeds the {} bytes remaining in the message.",
                self.remaining
            )));
        }
        self.remaining -= len;
        Ok(())
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.claim(buf.len() as u64)?;
        self.r.read_exact(buf).map_err(map_eof)
    }
}

fn map_eof(e: io::Error) -> LogError {
    if e.kind() == ErrorKind::UnexpectedEof {
        LogError::malformed("The message ends before its declared length.")
    } else {
        LogError::Io(e)
    }
}
