use crate::event_writer::EventWriter;
use crate::frame::RecordOffset;
use evlog_types::types::{ArrayValue, Curve, Event, ExternalFile, Image, Value};
use evlog_types::Result;

/// Conventional `value_type` strings, as stamped by the `log_*` helpers.
pub mod value_types {
    pub const SCALAR: &str = "scalar";
    pub const TENSOR: &str = "tensor";
    pub const CURVE: &str = "curve";
    pub const FIGURE: &str = "figure";
    pub const FITS_FILE: &str = "fits_file";
}

/* Producer helpers. The caller supplies wall time and tag. */
impl EventWriter {
    pub fn log_scalar(&mut self, wall_time: f64, tag: &str, f: f32) -> Result<RecordOffset> {
        self.log(wall_time, tag, value_types::SCALAR, Value::Scalar(f))
    }

    pub fn log_array(
        &mut self,
        wall_time: f64,
        tag: &str,
        arr: impl Into<ArrayValue>,
    ) -> Result<RecordOffset> {
        self.log(wall_time, tag, value_types::TENSOR, Value::Array(arr.into()))
    }

    pub fn log_curve(&mut self, wall_time: f64, tag: &str, curve: Curve) -> Result<RecordOffset> {
        self.log(wall_time, tag, value_types::CURVE, Value::Curve(curve))
    }

    pub fn log_image(&mut self, wall_time: f64, tag: &str, img: Image) -> Result<RecordOffset> {
        self.log(wall_time, tag, value_types::FIGURE, Value::Image(img))
    }

    /// Records a reference only. The file itself is the caller's to store under the session dir.
    pub fn log_external_file(
        &mut self,
        wall_time: f64,
        tag: &str,
        file: ExternalFile,
    ) -> Result<RecordOffset> {
        self.log(wall_time, tag, value_types::FITS_FILE, Value::ExternalFile(file))
    }

    /// A value-less event. `value_type` alone carries the meaning.
    pub fn log_metadata(
        &mut self,
        wall_time: f64,
        tag: &str,
        value_type: &str,
    ) -> Result<RecordOffset> {
        self.write(&Event::new(wall_time, tag, value_type, None))
    }

    fn log(
        &mut self,
        wall_time: f64,
        tag: &str,
        value_type: &str,
        val: Value,
    ) -> Result<RecordOffset> {
        self.write(&Event::new(wall_time, tag, value_type, Some(val)))
    }
}
