use crate::types::{ArrayValue, ByteOrder, Element, NdArray};
use crate::{LogError, Result};
use ndarray::{ArrayD, IxDyn};

impl<T: Element> From<ArrayD<T>> for NdArray<T> {
    /// Elements are taken in logical row-major order, whatever the memory layout of `arr`.
    fn from(arr: ArrayD<T>) -> Self {
        Self {
            shape: arr.shape().to_vec(),
            elems: arr.iter().copied().collect(),
        }
    }
}

impl<T: Element> TryFrom<NdArray<T>> for ArrayD<T> {
    type Error = LogError;

    fn try_from(arr: NdArray<T>) -> Result<Self> {
        let (shape, elems) = arr.into_parts();
        ArrayD::from_shape_vec(IxDyn(&shape), elems)
            .map_err(|e| LogError::InvalidEvent(format!("Cannot build an ndarray. {e}")))
    }
}

impl ArrayValue {
    pub fn from_ndarray<T: Element>(arr: ArrayD<T>, byte_order: ByteOrder) -> Self {
        Self::encode(&NdArray::from(arr), byte_order)
    }

    pub fn to_ndarray<T: Element>(&self) -> Result<ArrayD<T>> {
        ArrayD::try_from(self.decode::<T>()?)
    }
}
