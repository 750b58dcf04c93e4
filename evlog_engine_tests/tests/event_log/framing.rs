use super::helpers::{gen_event, read_all, scratch_log, TAGS};
use anyhow::Result;
use evlog_engine::{EventReader, EventWriter, WriterOptions, HEADER_LEN};
use std::fs;

fn write_then_read(record_count: usize) -> Result<()> {
    let (_dir, path) = scratch_log()?;
    let mut rng = rand::thread_rng();

    let mut written = vec![];
    let mut writer = EventWriter::open(&path, WriterOptions::default())?;
    for i in 0..record_count {
        let event = gen_event(&mut rng, i)?;
        let offset = writer.write(&event)?;
        written.push((offset, event));
    }
    let stats = writer.close()?;
    assert_eq!(stats.records_written, record_count as u64);
    assert_eq!(
        stats.bytes_written + HEADER_LEN,
        fs::metadata(&path)?.len()
    );

    let (read, err) = read_all(&path)?;
    assert!(err.is_none(), "{err:?}");
    assert_eq!(read.len(), record_count);
    assert_eq!(read, written);

    let mut reader = EventReader::open(&path)?;
    let index = reader.build_tag_index()?;
    assert_eq!(index.record_count(), record_count as u64);
    let indexed_count: usize = index.iter().map(|(_tag, offsets)| offsets.len()).sum();
    assert_eq!(indexed_count, record_count);
    for tag in TAGS {
        let expected = written
            .iter()
            .filter(|(_, event)| event.tag.as_deref() == Some(tag))
            .map(|(offset, _)| *offset)
            .collect::<Vec<_>>();
        assert_eq!(index.get(tag), expected.as_slice());

        let by_offset = reader.events_for_tag(&index, tag)?;
        assert_eq!(by_offset.len(), expected.len());
        assert!(by_offset.iter().all(|event| event.tag.as_deref() == Some(tag)));
    }
    Ok(())
}

#[test]
fn empty() -> Result<()> {
    write_then_read(0)
}

#[test]
fn one() -> Result<()> {
    write_then_read(1)
}

#[test]
fn thousand() -> Result<()> {
    write_then_read(1000)
}

#[test]
fn append_across_sessions() -> Result<()> {
    let (_dir, path) = scratch_log()?;
    let mut rng = rand::thread_rng();

    let mut written = vec![];
    for session in 0..3 {
        let mut writer = EventWriter::open(&path, WriterOptions::default())?;
        for i in 0..10 {
            let event = gen_event(&mut rng, session * 10 + i)?;
            written.push(writer.write(&event)?);
        }
        let stats = writer.close()?;
        assert_eq!(stats.records_written, 10);
    }

    let (read, err) = read_all(&path)?;
    assert!(err.is_none());
    let offsets = read.iter().map(|(offset, _)| *offset).collect::<Vec<_>>();
    assert_eq!(offsets, written);
    Ok(())
}

#[test]
fn non_append_starts_over() -> Result<()> {
    let (_dir, path) = scratch_log()?;

    let mut writer = EventWriter::open(&path, WriterOptions::default())?;
    writer.log_scalar(1.0, "old", 1.0)?;
    writer.log_scalar(2.0, "old", 2.0)?;
    writer.close()?;

    let mut writer = EventWriter::open(&path, WriterOptions::truncate())?;
    writer.log_scalar(3.0, "new", 3.0)?;
    writer.close()?;

    let (read, _) = read_all(&path)?;
    assert_eq!(read.len(), 1);
    assert_eq!(read[0].1.tag.as_deref(), Some("new"));
    Ok(())
}

#[test]
fn scalar_series() -> Result<()> {
    let (_dir, path) = scratch_log()?;

    let mut writer = EventWriter::open(&path, WriterOptions::default())?;
    writer.log_scalar(10.0, "contrast", 1e-8)?;
    writer.log_metadata(10.5, "contrast", "calibration_started")?;
    writer.log_scalar(11.0, "other", 5.0)?;
    writer.log_scalar(9.0, "contrast", 2e-8)?;
    writer.close()?;

    let mut reader = EventReader::open(&path)?;
    let series = reader.scalar_series("contrast")?;
    // Append order, even where wall time goes backwards.
    assert_eq!(series, vec![(10.0, 1e-8), (9.0, 2e-8)]);
    assert!(reader.scalar_series("absent")?.is_empty());
    Ok(())
}
