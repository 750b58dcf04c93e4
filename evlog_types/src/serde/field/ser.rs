use crate::serde::{BodyLen, FieldId, WireKind, WireKindInt};
use crate::Result;
use derive_more::Deref;
use std::io::Write;

#[derive(Deref, Clone, Copy, Default, Debug)]
pub struct WriteLen(usize);
impl WriteLen {
    pub fn new_manual(i: usize) -> Self {
        Self(i)
    }
}

/// Writes the fields of one message, in the order they are put.
pub struct MessageWriter<W: Write> {
    w: W,
    w_len: WriteLen,
}

impl<W: Write> MessageWriter<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            w_len: WriteLen::default(),
        }
    }

    pub fn w_len(&self) -> WriteLen {
        self.w_len
    }

    pub fn into_inner(self) -> W {
        self.w
    }

    pub fn put_f32(&mut self, id: FieldId, f: f32) -> Result<()> {
        self.put_header(id, WireKind::Fixed32)?;
        self.w.write_all(&f.to_le_bytes())?;
        self.w_len.0 += 4;
        Ok(())
    }

    pub fn put_f64(&mut self, id: FieldId, f: f64) -> Result<()> {
        self.put_header(id, WireKind::Fixed64)?;
        self.w.write_all(&f.to_le_bytes())?;
        self.w_len.0 += 8;
        Ok(())
    }

    pub fn put_bytes(&mut self, id: FieldId, buf: &[u8]) -> Result<()> {
        let body_len = BodyLen::from_body(buf)?;
        self.put_header(id, WireKind::LengthDelimited)?;
        self.w.write_all(&body_len.to_le_bytes())?;
        self.w.write_all(buf)?;
        self.w_len.0 += BodyLen::ENCODED_LEN + buf.len();
        Ok(())
    }

    pub fn put_str(&mut self, id: FieldId, s: &str) -> Result<()> {
        self.put_bytes(id, s.as_bytes())
    }

    pub fn put_packed_i64s(&mut self, id: FieldId, ints: &[i64]) -> Result<()> {
        let buf = ints
            .iter()
            .flat_map(|int| int.to_le_bytes())
            .collect::<Vec<u8>>();
        self.put_bytes(id, &buf)
    }

    /// Serializes a nested message into its own buffer, then puts it as a length-delimited field.
    pub fn put_message(
        &mut self,
        id: FieldId,
        ser_nested: impl FnOnce(&mut MessageWriter<Vec<u8>>) -> Result<()>,
    ) -> Result<()> {
        let mut nested = MessageWriter::new(vec![]);
        ser_nested(&mut nested)?;
        self.put_bytes(id, &nested.into_inner())
    }

    fn put_header(&mut self, id: FieldId, kind: WireKind) -> Result<()> {
        self.w.write_all(&id.to_le_bytes())?;
        self.w.write_all(&WireKindInt::from(kind).to_le_bytes())?;
        self.w_len.0 += crate::serde::FIELD_HEADER_LEN;
        Ok(())
    }
}
