use anyhow::Result;
use evlog_engine::{EventReader, LogError, RecordOffset};
use evlog_types::types::{ArrayValue, ByteOrder, Curve, Event, Image, NdArray, Value};
use rand::Rng;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const TAGS: [&str; 5] = ["contrast", "dark_zone", "dark_zone_SNR", "dm_volts", "psf"];

/// The dir is removed when the returned `TempDir` is dropped.
pub fn scratch_log() -> Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("session.evlog");
    Ok((dir, path))
}

/// Every complete event, and the error that ended reading, if any.
pub fn read_all(path: &Path) -> Result<(Vec<(RecordOffset, Event)>, Option<LogError>)> {
    let mut reader = EventReader::open(path)?;
    let mut events = vec![];
    for res in reader.events() {
        match res {
            Ok(offset_event) => events.push(offset_event),
            Err(e) => return Ok((events, Some(e))),
        }
    }
    Ok((events, None))
}

pub fn gen_event(rng: &mut impl Rng, i: usize) -> Result<Event> {
    let tag = TAGS[rng.gen_range(0..TAGS.len())];
    let wall_time = 1700000000.0 + i as f64 * 0.25;
    let event = match rng.gen_range(0..5) {
        0 => Event::new(wall_time, tag, "scalar", Some(Value::Scalar(rng.gen()))),
        1 => {
            let rows = rng.gen_range(0..4);
            let cols = rng.gen_range(1..6);
            let elems = (0..rows * cols).map(|_| rng.gen::<f64>()).collect();
            let arr = NdArray::new(vec![rows, cols], elems)?;
            let order = if rng.gen() {
                ByteOrder::Little
            } else {
                ByteOrder::Big
            };
            let val = Value::Array(ArrayValue::encode(&arr, order));
            Event::new(wall_time, tag, "tensor", Some(val))
        }
        2 => {
            let len = rng.gen_range(0..10);
            let x = NdArray::vector((0..len).map(|j| j as f32).collect());
            let y = NdArray::vector((0..len).map(|_| rng.gen::<i32>()).collect());
            let curve = Curve::new(ArrayValue::from(&x), ArrayValue::from(&y))?;
            Event::new(wall_time, tag, "curve", Some(Value::Curve(curve)))
        }
        3 => {
            let data = (0..rng.gen_range(0..64)).map(|_| rng.gen()).collect();
            Event::new(wall_time, tag, "figure", Some(Value::Image(Image::png(data))))
        }
        _ => Event::new(wall_time, tag, "note", None),
    };
    Ok(event)
}
