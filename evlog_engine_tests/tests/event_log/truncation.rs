use super::helpers::{read_all, scratch_log};
use anyhow::Result;
use evlog_engine::{
    EventReader, EventWriter, FrameLen, LogError, ReadResult, WriterOptions, HEADER_LEN,
};
use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write};

fn three_records(path: &std::path::Path) -> Result<Vec<u64>> {
    let mut writer = EventWriter::open(path, WriterOptions::default())?;
    let offsets = vec![
        *writer.log_scalar(1.0, "a", 1.0)?,
        *writer.log_metadata(2.0, "b", "marker")?,
        *writer.log_scalar(3.0, "c", 3.0)?,
    ];
    writer.close()?;
    Ok(offsets)
}

#[test]
fn partial_last_frame() -> Result<()> {
    let (_dir, path) = scratch_log()?;
    let offsets = three_records(&path)?;
    let full_len = fs::metadata(&path)?.len();

    // Shrinking only.
    for cut in ((offsets[2] + 1)..full_len).rev() {
        let file = OpenOptions::new().write(true).open(&path)?;
        file.set_len(cut)?;
        drop(file);

        let (read, err) = read_all(&path)?;
        assert_eq!(read.len(), 2, "cut {cut}");
        match err {
            Some(LogError::TruncatedTail {
                offset, available, ..
            }) => {
                assert_eq!(offset, offsets[2]);
                assert_eq!(available, cut - offsets[2]);
            }
            other => panic!("cut {cut}: {other:?}"),
        }

        let mut reader = EventReader::open(&path)?;
        let index = reader.build_tag_index()?;
        assert!(index.has_truncated_tail());
        assert_eq!(index.record_count(), 2);
        assert!(!index.contains("c"));
    }
    Ok(())
}

#[test]
fn truncated_tail_is_sticky() -> Result<()> {
    let (_dir, path) = scratch_log()?;
    let offsets = three_records(&path)?;
    let file = OpenOptions::new().write(true).open(&path)?;
    file.set_len(offsets[2] + 2)?;

    let mut reader = EventReader::open(&path)?;
    reader.next()?;
    reader.next()?;
    for _ in 0..3 {
        assert!(matches!(
            reader.next(),
            Err(LogError::TruncatedTail { .. })
        ));
        assert_eq!(*reader.position(), offsets[2]);
    }

    let mut events = reader.events();
    assert!(matches!(events.next(), Some(Err(LogError::TruncatedTail { .. }))));
    assert!(events.next().is_none());
    Ok(())
}

#[test]
fn append_onto_partial_frame_is_refused() -> Result<()> {
    let (_dir, path) = scratch_log()?;
    let offsets = three_records(&path)?;
    let cut = offsets[2] + 5;
    let file = OpenOptions::new().write(true).open(&path)?;
    file.set_len(cut)?;
    drop(file);

    match EventWriter::open(&path, WriterOptions::default()) {
        Err(LogError::CorruptTail { offset, .. }) => assert_eq!(offset, offsets[2]),
        other => panic!("{:?}", other.map(|_| ())),
    }
    // Nothing was written.
    assert_eq!(fs::metadata(&path)?.len(), cut);

    // Starting over is allowed.
    let mut writer = EventWriter::open(&path, WriterOptions::truncate())?;
    writer.log_scalar(4.0, "d", 4.0)?;
    writer.close()?;
    assert_eq!(read_all(&path)?.0.len(), 1);
    Ok(())
}

#[test]
fn corrupt_record_mid_stream() -> Result<()> {
    let (_dir, path) = scratch_log()?;
    let offsets = three_records(&path)?;

    // The wire kind of the second record's first field.
    let mut file = OpenOptions::new().write(true).open(&path)?;
    file.seek(SeekFrom::Start(offsets[1] + FrameLen::ENCODED_LEN + 2))?;
    file.write_all(&[0x7f])?;
    drop(file);

    let mut reader = EventReader::open(&path)?;
    let results = reader.events().collect::<Vec<_>>();
    assert_eq!(results.len(), 3);
    assert!(matches!(&results[0], Ok((_, event)) if event.tag.as_deref() == Some("a")));
    assert!(matches!(&results[1], Err(LogError::MalformedRecord(_))));
    assert!(matches!(&results[2], Ok((_, event)) if event.tag.as_deref() == Some("c")));

    reader.rewind();
    reader.next()?;
    assert!(reader.next().is_err());
    match reader.next()? {
        ReadResult::Some(offset, _) => assert_eq!(*offset, offsets[2]),
        ReadResult::EOF => panic!("Premature EOF"),
    }

    let index = reader.build_tag_index()?;
    assert_eq!(index.skipped(), 1);
    assert_eq!(index.record_count(), 3);
    assert!(!index.contains("b"));

    // Framing is intact, so appending is allowed.
    let mut writer = EventWriter::open(&path, WriterOptions::default())?;
    writer.log_scalar(4.0, "d", 4.0)?;
    writer.close()?;
    Ok(())
}

#[test]
fn corrupt_length_mid_stream() -> Result<()> {
    let (_dir, path) = scratch_log()?;
    let offsets = three_records(&path)?;

    // A length far past the end of the file, in the second record's prefix.
    let mut file = OpenOptions::new().write(true).open(&path)?;
    file.seek(SeekFrom::Start(offsets[1]))?;
    file.write_all(&0x7fff_ffffu32.to_le_bytes())?;
    drop(file);

    let mut reader = EventReader::open(&path)?;
    let results = reader.events().collect::<Vec<_>>();
    assert_eq!(results.len(), 3);
    assert!(matches!(&results[0], Ok((_, event)) if event.tag.as_deref() == Some("a")));
    assert!(matches!(&results[1], Err(LogError::MalformedRecord(_))));
    assert!(matches!(
        &results[2],
        Ok((offset, event)) if **offset == offsets[2] && event.tag.as_deref() == Some("c")
    ));

    let index = reader.build_tag_index()?;
    assert_eq!(index.skipped(), 1);
    assert!(!index.has_truncated_tail());
    assert_eq!(index.get("c").len(), 1);

    // The tail is intact, so appending is allowed.
    let mut writer = EventWriter::open(&path, WriterOptions::default())?;
    writer.log_scalar(4.0, "d", 4.0)?;
    writer.close()?;
    let (read, err) = read_all(&path)?;
    assert_eq!(read.len(), 1);
    assert!(matches!(err, Some(LogError::MalformedRecord(_))));
    let tags = EventReader::open(&path)?
        .events()
        .filter_map(|res| res.ok())
        .filter_map(|(_, event)| event.tag)
        .collect::<Vec<_>>();
    assert_eq!(tags, vec!["a", "c", "d"]);
    Ok(())
}

#[test]
fn bad_header() -> Result<()> {
    let (_dir, path) = scratch_log()?;
    fs::write(&path, b"not an event log")?;
    assert!(matches!(
        EventReader::open(&path),
        Err(LogError::BadHeader(_))
    ));
    assert!(matches!(
        EventWriter::open(&path, WriterOptions::default()),
        Err(LogError::BadHeader(_))
    ));

    fs::write(&path, b"EVX")?;
    assert!(matches!(
        EventReader::open(&path),
        Err(LogError::BadHeader(_))
    ));

    // An empty file is initialized.
    fs::write(&path, b"")?;
    let writer = EventWriter::open(&path, WriterOptions::default())?;
    writer.close()?;
    assert_eq!(fs::metadata(&path)?.len(), HEADER_LEN);
    let mut reader = EventReader::open(&path)?;
    assert_eq!(reader.next()?, ReadResult::EOF);
    Ok(())
}
