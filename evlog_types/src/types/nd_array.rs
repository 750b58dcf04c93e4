use crate::types::{ByteOrder, ElementKind, ElementType};
use crate::{LogError, Result};
use std::fmt::Debug;
use std::mem;

/// A numeric type that the array codec can decode to and encode from.
pub trait Element: Copy + PartialEq + Debug {
    const ELEMENT_TYPE: ElementType;
    const WIDTH: usize;

    fn put_bytes(self, order: ByteOrder, out: &mut Vec<u8>);

    /// `bytes.len()` is exactly [`Self::WIDTH`].
    fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self;
}

macro_rules! impl_element {
    ($t:ty, $kind:expr) => {
        impl Element for $t {
            const ELEMENT_TYPE: ElementType =
                ElementType::new($kind, (mem::size_of::<$t>() * 8) as u16);
            const WIDTH: usize = mem::size_of::<$t>();

            fn put_bytes(self, order: ByteOrder, out: &mut Vec<u8>) {
                match order {
                    ByteOrder::Little => out.extend_from_slice(&self.to_le_bytes()),
                    ByteOrder::Big => out.extend_from_slice(&self.to_be_bytes()),
                }
            }

            fn from_bytes(bytes: &[u8], order: ByteOrder) -> Self {
                let mut buf = [0u8; mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                match order {
                    ByteOrder::Little => <$t>::from_le_bytes(buf),
                    ByteOrder::Big => <$t>::from_be_bytes(buf),
                }
            }
        }
    };
}

impl_element!(i8, ElementKind::Int);
impl_element!(i16, ElementKind::Int);
impl_element!(i32, ElementKind::Int);
impl_element!(i64, ElementKind::Int);
impl_element!(u8, ElementKind::UInt);
impl_element!(u16, ElementKind::UInt);
impl_element!(u32, ElementKind::UInt);
impl_element!(u64, ElementKind::UInt);
impl_element!(f32, ElementKind::Float);
impl_element!(f64, ElementKind::Float);

impl Element for bool {
    const ELEMENT_TYPE: ElementType = ElementType::new(ElementKind::Bool, 8);
    const WIDTH: usize = 1;

    fn put_bytes(self, _order: ByteOrder, out: &mut Vec<u8>) {
        out.push(self as u8);
    }

    fn from_bytes(bytes: &[u8], _order: ByteOrder) -> Self {
        bytes[0] != 0
    }
}

/// A typed, row-major (last axis fastest) multi-dimensional array.
///
/// The empty shape is 0-dimensional and holds exactly one element.
/// A shape containing a zero holds no elements.
#[derive(PartialEq, Clone, Debug)]
pub struct NdArray<T> {
    pub(crate) shape: Vec<usize>,
    pub(crate) elems: Vec<T>,
}

impl<T: Element> NdArray<T> {
    pub fn new(shape: Vec<usize>, elems: Vec<T>) -> Result<Self> {
        let expected = element_count(shape.iter().map(|dim| *dim as u64))
            .ok_or_else(|| shape_overflow(&shape))?;
        if expected != elems.len() as u64 {
            return Err(LogError::ShapeMismatch {
                shape: shape.iter().map(|dim| *dim as u64).collect(),
                expected,
                actual: elems.len() as u64,
                unit: "elements",
            });
        }
        Ok(Self { shape, elems })
    }

    pub fn scalar(elem: T) -> Self {
        Self {
            shape: vec![],
            elems: vec![elem],
        }
    }

    pub fn vector(elems: Vec<T>) -> Self {
        Self {
            shape: vec![elems.len()],
            elems,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn elems(&self) -> &[T] {
        &self.elems
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<T>) {
        (self.shape, self.elems)
    }
}

/// The product of dimensions. The empty product is 1. `None` on overflow.
pub(crate) fn element_count(dims: impl Iterator<Item = u64>) -> Option<u64> {
    dims.fold(Some(1u64), |acc, dim| acc.and_then(|acc| acc.checked_mul(dim)))
}

fn shape_overflow(shape: &[usize]) -> LogError {
    LogError::ShapeMismatch {
        shape: shape.iter().map(|dim| *dim as u64).collect(),
        expected: u64::MAX,
        actual: 0,
        unit: "elements (overflowing)",
    }
}
