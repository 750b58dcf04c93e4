use crate::serde::{FieldId, FieldReader, MessageWriter};
use crate::types::value_field_ids::is_value_case;
use crate::types::Value;
use crate::{LogError, Result};
use std::io::{Read, Seek, Write};
use tracing::warn;


/// Field ids of the event header.
pub mod event_field_ids {
    use crate::serde::FieldId;

    pub const WALL_TIME: FieldId = FieldId::new(1);
    pub const TAG: FieldId = FieldId::new(2);
    pub const VALUE_TYPE: FieldId = FieldId::new(3);
}
use event_field_ids as ids;

/// One immutable measurement record.
///
/// Every field is optional on the wire. An absent field decodes as `None`,
/// never as a default that looks like real data.
#[derive(PartialEq, Clone, Default, Debug)]
pub struct Event {
    /// Unix seconds, as supplied by the producer. Not guaranteed to be monotonic.
    pub wall_time: Option<f64>,
    pub tag: Option<String>,
    /// Semantic type of the value, independent of which value case is present.
    pub value_type: Option<String>,
    pub value: Option<Value>,
}

impl Event {
    pub fn new(
        wall_time: f64,
        tag: impl Into<String>,
        value_type: impl Into<String>,
        value: Option<Value>,
    ) -> Self {
        Self {
            wall_time: Some(wall_time),
            tag: Some(tag.into()),
            value_type: Some(value_type.into()),
            value,
        }
    }

    /// The value, unless it is absent or of a case this reader does not know.
    pub fn recognized_value(&self) -> Option<&Value> {
        self.value.as_ref().filter(|val| val.is_recognized())
    }

    /// Producer-side checks, run before an event is appended.
    pub fn validate(&self) -> Result<()> {
        match self.tag.as_deref() {
            Some(tag) if !tag.is_empty() => {}
            _ => {
                return Err(LogError::InvalidEvent(String::from(
                    "An event must have a non-empty tag.",
                )))
            }
        }
        if let Some(val) = self.value.as_ref() {
            val.validate()?;
        }
        Ok(())
    }
}

/* Record schema. */
impl Event {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut w = MessageWriter::new(vec![]);
        self.ser(&mut w)?;
        Ok(w.into_inner())
    }

    pub fn ser<W: Write>(&self, w: &mut MessageWriter<W>) -> Result<()> {
        if let Some(wall_time) = self.wall_time {
            w.put_f64(ids::WALL_TIME, wall_time)?;
        }
        if let Some(tag) = self.tag.as_ref() {
            w.put_str(ids::TAG, tag)?;
        }
        if let Some(value_type) = self.value_type.as_ref() {
            w.put_str(ids::VALUE_TYPE, value_type)?;
        }
        if let Some(val) = self.value.as_ref() {
            val.ser(w)?;
        }
        Ok(())
    }

    /// Unknown fields are skipped.
    /// Header fields are last-wins. Value cases are first-wins; extra cases are logged and skipped.
    pub fn deserialize(buf: &[u8]) -> Result<Self> {
        let mut event = Self::default();
        let mut r = FieldReader::from_slice(buf);
        while let Some(header) = r.next_header()? {
            let id = header.id;
            match id {
                ids::WALL_TIME => event.wall_time = Some(r.read_body(header.kind)?.into_f64(id)?),
                ids::TAG => event.tag = Some(r.read_body(header.kind)?.into_string(id)?),
                ids::VALUE_TYPE => {
                    event.value_type = Some(r.read_body(header.kind)?.into_string(id)?)
                }
                _ if is_value_case(id) => match event.value.as_ref() {
                    None => event.value = Some(Value::deser(id, r.read_body(header.kind)?)?),
                    Some(kept) => {
                        warn!(
                            field_id = *id,
                            kept = kept.case_name(),
                            tag = event.tag.as_deref(),
                            "Ignoring an extra value case in one record."
                        );
                        r.skip_body(header.kind)?;
                    }
                },
                _ => r.skip_body(header.kind)?,
            }
        }
        Ok(event)
    }
}

/// The header fields of an event, decoded without reading the value body.
#[derive(PartialEq, Clone, Default, Debug)]
pub struct EventHeader {
    pub wall_time: Option<f64>,
    pub tag: Option<String>,
    pub value_type: Option<String>,
    /// The field id of the first value case present, if any.
    pub value_case: Option<FieldId>,
}

impl EventHeader {
    /// Reads exactly `payload_len` bytes' worth of fields from `r`, seeking over value bodies.
    pub fn deser<R: Read + Seek>(r: R, payload_len: u64) -> Result<Self> {
        let mut eh = Self::default();
        let mut r = FieldReader::new(r, payload_len);
        while let Some(header) = r.next_header()? {
            let id = header.id;
            match id {
                ids::WALL_TIME => eh.wall_time = Some(r.read_body(header.kind)?.into_f64(id)?),
                ids::TAG => eh.tag = Some(r.read_body(header.kind)?.into_string(id)?),
                ids::VALUE_TYPE => {
                    eh.value_type = Some(r.read_body(header.kind)?.into_string(id)?)
                }
                _ => {
                    if is_value_case(id) && eh.value_case.is_none() {
                        eh.value_case = Some(id);
                    }
                    r.skip_body(header.kind)?
                }
            }
        }
        Ok(eh)
    }
}
