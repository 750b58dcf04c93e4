use crate::serde::{FieldBody, FieldId, FieldReader, MessageWriter};
use crate::types::ArrayValue;
use crate::{LogError, Result};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Field ids of the value cases, within an event message.
///
/// The cases share no ids with each other or with the event's header fields.
pub mod value_field_ids {
    use crate::serde::FieldId;
    use std::ops::RangeInclusive;

    pub const SCALAR: FieldId = FieldId::new(8);
    pub const ARRAY: FieldId = FieldId::new(9);
    pub const CURVE: FieldId = FieldId::new(10);
    pub const IMAGE: FieldId = FieldId::new(11);
    pub const EXTERNAL_FILE: FieldId = FieldId::new(12);

    /// Ids reserved for value cases, including ones added after this reader was built.
    pub const RESERVED: RangeInclusive<u16> = 8..=31;

    pub fn is_value_case(id: FieldId) -> bool {
        RESERVED.contains(&*id)
    }
}
use value_field_ids as ids;

/// The payload of one event.
///
/// The set of cases is closed per reader version, but open on the wire:
/// a case this reader does not know decodes as [`Value::Unrecognized`],
/// which callers treat as "value absent". The event's `value_type` stays meaningful either way.
#[derive(PartialEq, Clone, Debug)]
pub enum Value {
    Scalar(f32),
    Array(ArrayValue),
    Curve(Curve),
    Image(Image),
    ExternalFile(ExternalFile),
    Unrecognized { field_id: FieldId },
}

impl Value {
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Unrecognized { .. })
    }

    pub fn case_name(&self) -> &'static str {
        match self {
            Self::Scalar(_) => "scalar",
            Self::Array(_) => "array",
            Self::Curve(_) => "curve",
            Self::Image(_) => "image",
            Self::ExternalFile(_) => "external_file",
            Self::Unrecognized { .. } => "unrecognized",
        }
    }

    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Self::Array(arr) => Some(arr),
            _ => None,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Curve(curve) => Curve::check_counts(&curve.x, &curve.y),
            Self::ExternalFile(file) => ExternalFile::check_path(&file.path),
            Self::Scalar(_) | Self::Array(_) | Self::Image(_) | Self::Unrecognized { .. } => Ok(()),
        }
    }

    /// Puts this case as one field of the enclosing event.
    /// An unrecognized case has no body to put, so nothing is written.
    pub(crate) fn ser<W: Write>(&self, w: &mut MessageWriter<W>) -> Result<()> {
        match self {
            Self::Scalar(f) => w.put_f32(ids::SCALAR, *f),
            Self::Array(arr) => w.put_message(ids::ARRAY, |nested| arr.ser(nested)),
            Self::Curve(curve) => w.put_message(ids::CURVE, |nested| curve.ser(nested)),
            Self::Image(img) => w.put_message(ids::IMAGE, |nested| img.ser(nested)),
            Self::ExternalFile(file) => {
                w.put_message(ids::EXTERNAL_FILE, |nested| file.ser(nested))
            }
            Self::Unrecognized { .. } => Ok(()),
        }
    }

    /// `id` must be within [`value_field_ids::RESERVED`].
    pub(crate) fn deser(id: FieldId, body: FieldBody) -> Result<Self> {
        let val = match id {
            ids::SCALAR => Self::Scalar(body.into_f32(id)?),
            ids::ARRAY => Self::Array(ArrayValue::deser(&body.into_bytes(id)?)?),
            ids::CURVE => Self::Curve(Curve::deser(&body.into_bytes(id)?)?),
            ids::IMAGE => Self::Image(Image::deser(&body.into_bytes(id)?)?),
            ids::EXTERNAL_FILE => Self::ExternalFile(ExternalFile::deser(&body.into_bytes(id)?)?),
            _ => Self::Unrecognized { field_id: id },
        };
        Ok(val)
    }
}

/// A pair of index-aligned arrays.
///
/// Only the element counts must match; the shapes and element types may differ.
#[derive(PartialEq, Clone, Debug)]
pub struct Curve {
    x: ArrayValue,
    y: ArrayValue,
}

pub mod curve_field_ids {
    use crate::serde::FieldId;

    pub const X: FieldId = FieldId::new(1);
    pub const Y: FieldId = FieldId::new(2);
}

impl Curve {
    pub fn new(x: ArrayValue, y: ArrayValue) -> Result<Self> {
        Self::check_counts(&x, &y)?;
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &ArrayValue {
        &self.x
    }

    pub fn y(&self) -> &ArrayValue {
        &self.y
    }

    pub fn into_parts(self) -> (ArrayValue, ArrayValue) {
        (self.x, self.y)
    }

    fn check_counts(x: &ArrayValue, y: &ArrayValue) -> Result<()> {
        if x.element_count() != y.element_count() {
            return Err(LogError::ShapeMismatch {
                shape: y.shape().to_vec(),
                expected: x.element_count(),
                actual: y.element_count(),
                unit: "curve elements to match x",
            });
        }
        Ok(())
    }

    pub(crate) fn ser<W: Write>(&self, w: &mut MessageWriter<W>) -> Result<()> {
        w.put_message(curve_field_ids::X, |nested| self.x.ser(nested))?;
        w.put_message(curve_field_ids::Y, |nested| self.y.ser(nested))?;
        Ok(())
    }

    pub(crate) fn deser(buf: &[u8]) -> Result<Self> {
        let mut x = None;
        let mut y = None;
        let mut r = FieldReader::from_slice(buf);
        while let Some(header) = r.next_header()? {
            match header.id {
                curve_field_ids::X => {
                    let body = r.read_body(header.kind)?.into_bytes(header.id)?;
                    x = Some(ArrayValue::deser(&body)?);
                }
                curve_field_ids::Y => {
                    let body = r.read_body(header.kind)?.into_bytes(header.id)?;
                    y = Some(ArrayValue::deser(&body)?);
                }
                _ => r.skip_body(header.kind)?,
            }
        }
        match (x, y) {
            (Some(x), Some(y)) => Self::new(x, y),
            _ => Err(LogError::malformed("A curve lacks its x or y array.")),
        }
    }
}

/// An encoded raster image, carried verbatim.
///
/// The encoding is agreed between producer and consumer; `format` is only a hint, e.g. `"png"`.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Image {
    pub data: Vec<u8>,
    pub format: Option<String>,
}

pub mod image_field_ids {
    use crate::serde::FieldId;

    pub const DATA: FieldId = FieldId::new(1);
    pub const FORMAT: FieldId = FieldId::new(2);
}

impl Image {
    pub fn png(data: Vec<u8>) -> Self {
        Self {
            data,
            format: Some(String::from("png")),
        }
    }

    pub(crate) fn ser<W: Write>(&self, w: &mut MessageWriter<W>) -> Result<()> {
        w.put_bytes(image_field_ids::DATA, &self.data)?;
        if let Some(format) = self.format.as_ref() {
            w.put_str(image_field_ids::FORMAT, format)?;
        }
        Ok(())
    }

    pub(crate) fn deser(buf: &[u8]) -> Result<Self> {
        let mut img = Self {
            data: vec![],
            format: None,
        };
        let mut r = FieldReader::from_slice(buf);
        while let Some(header) = r.next_header()? {
            match header.id {
                image_field_ids::DATA => {
                    img.data = r.read_body(header.kind)?.into_bytes(header.id)?
                }
                image_field_ids::FORMAT => {
                    img.format = Some(r.read_body(header.kind)?.into_string(header.id)?)
                }
                _ => r.skip_body(header.kind)?,
            }
        }
        Ok(img)
    }
}

/// A reference to a file stored outside the stream, e.g. a large FITS cube.
///
/// The path is relative to a session base directory that the consumer supplies.
/// Nothing here touches the filesystem.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ExternalFile {
    path: String,
}

pub mod external_file_field_ids {
    use crate::serde::FieldId;

    pub const PATH: FieldId = FieldId::new(1);
}

impl ExternalFile {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        Self::check_path(&path)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path under `base_dir`. A decoded path that is absolute or climbs out of
    /// `base_dir` is refused rather than followed.
    pub fn resolve(&self, base_dir: &Path) -> Result<PathBuf> {
        if !Self::stays_within(&self.path) {
            return Err(LogError::OutsideBaseDir(self.path.clone()));
        }
        Ok(base_dir.join(&self.path))
    }

    fn check_path(path: &str) -> Result<()> {
        if !Self::stays_within(path) {
            return Err(LogError::InvalidEvent(format!(
                "External file path {path:?} is not a non-empty path within the base dir."
            )));
        }
        Ok(())
    }

    fn stays_within(path: &str) -> bool {
        let mut depth = 0usize;
        for comp in Path::new(path).components() {
            match comp {
                Component::Normal(_) => depth += 1,
                Component::CurDir => {}
                Component::ParentDir if depth > 0 => depth -= 1,
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
            }
        }
        depth > 0
    }

    pub(crate) fn ser<W: Write>(&self, w: &mut MessageWriter<W>) -> Result<()> {
        w.put_str(external_file_field_ids::PATH, &self.path)
    }

    /// Lenient: a path written by another producer is kept as is. [`Self::resolve`] checks it.
    pub(crate) fn deser(buf: &[u8]) -> Result<Self> {
        let mut path = None;
        let mut r = FieldReader::from_slice(buf);
        while let Some(header) = r.next_header()? {
            match header.id {
                external_file_field_ids::PATH => {
                    path = Some(r.read_body(header.kind)?.into_string(header.id)?)
                }
                _ => r.skip_body(header.kind)?,
            }
        }
        let path = path.ok_or_else(|| LogError::malformed("An external file has no path."))?;
        Ok(Self { path })
    }
}
