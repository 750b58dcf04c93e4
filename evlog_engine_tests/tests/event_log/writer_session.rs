use super::helpers::{read_all, scratch_log};
use anyhow::Result;
use evlog_engine::{value_types, EventWriter, LogError, WriterOptions};
use evlog_types::types::{ArrayValue, Curve, Event, ExternalFile, Image, NdArray, Value};
use std::fs;

#[test]
fn second_writer_conflicts() -> Result<()> {
    let (_dir, path) = scratch_log()?;

    let mut writer_1 = EventWriter::open(&path, WriterOptions::default())?;
    writer_1.log_scalar(1.0, "contrast", 0.5)?;
    writer_1.flush()?;
    let len_before = fs::metadata(&path)?.len();

    for opts in [WriterOptions::default(), WriterOptions::truncate()] {
        match EventWriter::open(&path, opts) {
            Err(LogError::WriterConflict { path: conflict_path, .. }) => {
                assert_eq!(conflict_path, path)
            }
            other => panic!("{:?}", other.map(|_| ())),
        }
        assert_eq!(fs::metadata(&path)?.len(), len_before);
    }

    // The first writer is unaffected.
    writer_1.log_scalar(2.0, "contrast", 0.25)?;
    writer_1.close()?;

    // The lock is released on close, and on drop.
    let mut writer_2 = EventWriter::open(&path, WriterOptions::default())?;
    writer_2.log_scalar(3.0, "contrast", 0.125)?;
    drop(writer_2);
    let writer_3 = EventWriter::open(&path, WriterOptions::default())?;
    let stats = writer_3.close()?;
    assert_eq!(stats.records_written, 0);

    let (read, err) = read_all(&path)?;
    assert!(err.is_none());
    let values = read
        .iter()
        .map(|(_, event)| event.value.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        values,
        vec![
            Some(Value::Scalar(0.5)),
            Some(Value::Scalar(0.25)),
            Some(Value::Scalar(0.125))
        ]
    );
    Ok(())
}

#[test]
fn invalid_event_writes_nothing() -> Result<()> {
    let (_dir, path) = scratch_log()?;
    let mut writer = EventWriter::open(&path, WriterOptions::default())?;
    writer.log_scalar(1.0, "ok", 1.0)?;
    let end = *writer.stats().end_offset;

    let res = writer.write(&Event::new(2.0, "", "scalar", Some(Value::Scalar(2.0))));
    assert!(matches!(res, Err(LogError::InvalidEvent(_))));
    let res = writer.log_metadata(2.0, "", "marker");
    assert!(matches!(res, Err(LogError::InvalidEvent(_))));
    assert_eq!(*writer.stats().end_offset, end);

    writer.log_scalar(3.0, "ok", 3.0)?;
    let stats = writer.close()?;
    assert_eq!(stats.records_written, 2);
    assert_eq!(read_all(&path)?.0.len(), 2);
    Ok(())
}

#[test]
fn verify_after_write() -> Result<()> {
    let (_dir, path) = scratch_log()?;
    let opts = WriterOptions {
        verify_after_write: true,
        sync_on_flush: false,
        ..WriterOptions::default()
    };
    let mut writer = EventWriter::open(&path, opts)?;
    assert!(writer.options().verify_after_write);
    for i in 0..20 {
        let arr = NdArray::new(vec![i, 2], vec![i as u16; i * 2])?;
        writer.log_array(i as f64, "dm_volts", &arr)?;
    }
    let stats = writer.close()?;
    assert_eq!(stats.records_written, 20);

    let (read, err) = read_all(&path)?;
    assert!(err.is_none());
    assert_eq!(read.len(), 20);
    for (i, (_, event)) in read.iter().enumerate() {
        let arr = match event.recognized_value() {
            Some(Value::Array(arr)) => arr.decode::<u16>()?,
            other => panic!("{other:?}"),
        };
        assert_eq!(arr.shape(), &[i, 2]);
        assert!(arr.elems().iter().all(|elem| *elem == i as u16));
    }
    Ok(())
}

#[test]
fn helpers_stamp_value_types() -> Result<()> {
    let (_dir, path) = scratch_log()?;
    let x = ArrayValue::from(&NdArray::vector(vec![0.0f32, 1.0, 2.0]));
    let y = ArrayValue::from(&NdArray::vector(vec![4i8, 5, 6]));

    let mut writer = EventWriter::open(&path, WriterOptions::default())?;
    writer.log_scalar(1.0, "contrast", 1e-9)?;
    writer.log_array(2.0, "dark_zone", x.clone())?;
    writer.log_curve(3.0, "profile", Curve::new(x, y)?)?;
    writer.log_image(4.0, "psf", Image::png(vec![1, 2, 3]))?;
    writer.log_external_file(5.0, "cube", ExternalFile::new("cube.fits")?)?;
    writer.log_metadata(6.0, "session", "end_of_run")?;
    writer.close()?;

    let (read, _) = read_all(&path)?;
    let stamped = read
        .iter()
        .map(|(_, event)| event.value_type.clone().unwrap_or_default())
        .collect::<Vec<_>>();
    assert_eq!(
        stamped,
        vec![
            value_types::SCALAR,
            value_types::TENSOR,
            value_types::CURVE,
            value_types::FIGURE,
            value_types::FITS_FILE,
            "end_of_run",
        ]
    );
    assert_eq!(read[5].1.value, None);
    Ok(())
}
