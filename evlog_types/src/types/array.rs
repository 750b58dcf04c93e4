use crate::serde::{FieldReader, MessageWriter};
use crate::types::nd_array::element_count;
use crate::types::{ByteOrder, Element, ElementKind, ElementType, NdArray};
use crate::{LogError, Result};
use std::io::Write;


/// Field ids within an array message.
pub mod array_field_ids {
    use crate::serde::FieldId;

    pub const SHAPE: FieldId = FieldId::new(1);
    pub const ELEMENT_TYPE: FieldId = FieldId::new(2);
    pub const BYTE_ORDER: FieldId = FieldId::new(3);
    pub const DATA: FieldId = FieldId::new(4);
}
use array_field_ids as ids;

/// The encoded form of a multi-dimensional numeric array.
///
/// `data` holds the raw element bytes, row-major, in `byte_order`, without padding.
/// Its length always equals `product(shape) * element_type.byte_width()`;
/// every constructor checks this.
///
/// This is distinct from [`crate::types::Value::Scalar`], which is always an `f32`.
/// A 0-dimensional array carries one element of any supported width.
#[derive(PartialEq, Clone, Debug)]
pub struct ArrayValue {
    shape: Vec<u64>,
    element_type: ElementType,
    byte_order: ByteOrder,
    data: Vec<u8>,
}

/* Construction and validation. */
impl ArrayValue {
    pub fn from_raw(
        shape: Vec<u64>,
        element_type: ElementType,
        byte_order: ByteOrder,
        data: Vec<u8>,
    ) -> Result<Self> {
        let expected_len = element_count(shape.iter().copied())
            .and_then(|count| count.checked_mul(element_type.byte_width() as u64));
        if expected_len != Some(data.len() as u64) {
            return Err(LogError::ShapeMismatch {
                shape,
                expected: expected_len.unwrap_or(u64::MAX),
                actual: data.len() as u64,
                unit: "bytes",
            });
        }
        Ok(Self {
            shape,
            element_type,
            byte_order,
            data,
        })
    }

    pub fn encode<T: Element>(arr: &NdArray<T>, byte_order: ByteOrder) -> Self {
        let mut data = Vec::with_capacity(arr.len() * T::WIDTH);
        for elem in arr.elems() {
            elem.put_bytes(byte_order, &mut data);
        }
        Self {
            shape: arr.shape().iter().map(|dim| *dim as u64).collect(),
            element_type: T::ELEMENT_TYPE,
            byte_order,
            data,
        }
    }

    /// Decodes to `T`, swapping bytes if the recorded order differs from the native one.
    pub fn decode<T: Element>(&self) -> Result<NdArray<T>> {
        if self.element_type != T::ELEMENT_TYPE {
            return Err(LogError::ElementTypeMismatch {
                actual: self.element_type.to_string(),
                requested: T::ELEMENT_TYPE.to_string(),
            });
        }
        let shape = self
            .shape
            .iter()
            .map(|dim| usize::try_from(*dim))
            .collect::<Result<Vec<usize>, _>>()
            .map_err(|_| LogError::ShapeMismatch {
                shape: self.shape.clone(),
                expected: u64::MAX,
                actual: self.data.len() as u64,
                unit: "bytes (addressable)",
            })?;
        let elems = self
            .data
            .chunks_exact(T::WIDTH)
            .map(|chunk| T::from_bytes(chunk, self.byte_order))
            .collect();
        NdArray::new(shape, elems)
    }
}

/* Accessors. */
impl ArrayValue {
    pub fn shape(&self) -> &[u64] {
        &self.shape
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn element_count(&self) -> u64 {
        // Checked by every constructor.
        (self.data.len() / self.element_type.byte_width()) as u64
    }

    /// The same elements, re-encoded in `byte_order`.
    ///
    /// Complex elements are swapped per component.
    pub fn to_byte_order(&self, byte_order: ByteOrder) -> Self {
        let mut data = self.data.clone();
        if byte_order != self.byte_order {
            let unit = match self.element_type.kind() {
                ElementKind::Complex => self.element_type.byte_width() / 2,
                _ => self.element_type.byte_width(),
            };
            if unit > 1 {
                for chunk in data.chunks_exact_mut(unit) {
                    chunk.reverse();
                }
            }
        }
        Self {
            shape: self.shape.clone(),
            element_type: self.element_type,
            byte_order,
            data,
        }
    }
}

/* Wire format. */
impl ArrayValue {
    pub(crate) fn ser<W: Write>(&self, w: &mut MessageWriter<W>) -> Result<()> {
        let shape = self
            .shape
            .iter()
            .map(|dim| {
                i64::try_from(*dim).map_err(|_| {
                    LogError::InvalidEvent(format!("Dimension {dim} does not fit in i64."))
                })
            })
            .collect::<Result<Vec<i64>>>()?;
        w.put_packed_i64s(ids::SHAPE, &shape)?;
        w.put_str(ids::ELEMENT_TYPE, &self.element_type.to_string())?;
        w.put_str(ids::BYTE_ORDER, self.byte_order.as_str())?;
        w.put_bytes(ids::DATA, &self.data)?;
        Ok(())
    }

    pub(crate) fn deser(buf: &[u8]) -> Result<Self> {
        let mut shape: Vec<i64> = vec![];
        let mut element_type: Option<String> = None;
        let mut byte_order: Option<String> = None;
        let mut data: Vec<u8> = vec![];

        let mut r = FieldReader::from_slice(buf);
        while let Some(header) = r.next_header()? {
            match header.id {
                ids::SHAPE => shape = r.read_body(header.kind)?.into_packed_i64s(header.id)?,
                ids::ELEMENT_TYPE => {
                    element_type = Some(r.read_body(header.kind)?.into_string(header.id)?)
                }
                ids::BYTE_ORDER => {
                    byte_order = Some(r.read_body(header.kind)?.into_string(header.id)?)
                }
                ids::DATA => data = r.read_body(header.kind)?.into_bytes(header.id)?,
                _ => r.skip_body(header.kind)?,
            }
        }

        let shape = shape
            .into_iter()
            .map(|dim| {
                u64::try_from(dim)
                    .map_err(|_| LogError::malformed(format!("Negative dimension {dim}.")))
            })
            .collect::<Result<Vec<u64>>>()?;

        let element_type = element_type
            .ok_or_else(|| LogError::malformed("An array has no element type."))?;
        let (element_type, order_hint) = ElementType::parse(&element_type)?;

        let byte_order = match (byte_order, order_hint) {
            (Some(s), _) => ByteOrder::parse_for_width(&s, element_type.byte_width())?,
            (None, Some(hint)) => hint,
            (None, None) if element_type.byte_width() == 1 => ByteOrder::Little,
            (None, None) => {
                return Err(LogError::malformed(format!(
                    "An array of {element_type} has no byte order."
                )))
            }
        };

        Self::from_raw(shape, element_type, byte_order, data)
    }
}

impl<T: Element> From<&NdArray<T>> for ArrayValue {
    /// Encodes in the native byte order.
    fn from(arr: &NdArray<T>) -> Self {
        Self::encode(arr, ByteOrder::native())
    }
}
