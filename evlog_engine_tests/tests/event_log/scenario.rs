use super::helpers::scratch_log;
use anyhow::Result;
use evlog_engine::{EventReader, EventWriter, ReadResult, WriterOptions, HEADER_LEN};
use evlog_types::types::{ArrayValue, ByteOrder, ElementType, Event, NdArray, Value};
use std::fs;

#[test]
fn contrast_then_dark_zone() -> Result<()> {
    let (_dir, path) = scratch_log()?;

    let contrast = Event::new(
        1700000000.0,
        "contrast",
        "scalar",
        Some(Value::Scalar(1.23e-8)),
    );
    let dark = NdArray::new(vec![2, 3], vec![1i64, 2, 3, 4, 5, 6])?;
    let dark_zone = Event::new(
        1700000000.0,
        "dark_zone",
        "tensor",
        Some(Value::Array(ArrayValue::encode(&dark, ByteOrder::Little))),
    );

    let mut writer = EventWriter::open(&path, WriterOptions::default())?;
    let offset_1 = writer.write(&contrast)?;
    let offset_2 = writer.write(&dark_zone)?;
    let stats = writer.close()?;
    assert_eq!(*offset_1, HEADER_LEN);
    assert!(offset_1 < offset_2);
    assert_eq!(stats.records_written, 2);
    assert_eq!(*stats.end_offset, fs::metadata(&path)?.len());

    /* Sequential. */
    let mut reader = EventReader::open(&path)?;

    let event_1 = match reader.next()? {
        ReadResult::Some(offset, event) => {
            assert_eq!(offset, offset_1);
            event
        }
        ReadResult::EOF => panic!("Premature EOF"),
    };
    assert_eq!(event_1, contrast);
    assert_eq!(event_1.wall_time, Some(1700000000.0));
    assert_eq!(event_1.value, Some(Value::Scalar(1.23e-8)));

    let event_2 = match reader.next()? {
        ReadResult::Some(offset, event) => {
            assert_eq!(offset, offset_2);
            event
        }
        ReadResult::EOF => panic!("Premature EOF"),
    };
    assert_eq!(event_2, dark_zone);
    let arr = match event_2.value.as_ref() {
        Some(Value::Array(arr)) => arr,
        other => panic!("{other:?}"),
    };
    assert_eq!(arr.shape(), &[2, 3]);
    assert_eq!(arr.element_type(), "int64".parse::<ElementType>()?);
    assert_eq!(arr.byte_order(), ByteOrder::Little);
    assert_eq!(&arr.data()[..16], &[1, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(arr.decode::<i64>()?, dark);

    assert_eq!(reader.next()?, ReadResult::EOF);

    /* Indexed. */
    let index = reader.build_tag_index()?;
    assert_eq!(index.tag_count(), 2);
    assert_eq!(index.get("contrast"), &[offset_1]);
    assert_eq!(index.get("dark_zone"), &[offset_2]);
    assert!(index.get("dark_zone_SNR").is_empty());
    assert_eq!(index.record_count(), 2);
    assert!(!index.has_truncated_tail());

    assert_eq!(reader.read_at(offset_2)?, event_2);
    assert_eq!(reader.read_at(offset_1)?, event_1);

    /* Restartable. Random access leaves the sequential position alone. */
    assert_eq!(reader.next()?, ReadResult::EOF);
    reader.rewind();
    assert_eq!(reader.next()?, ReadResult::Some(offset_1, event_1));
    reader.read_at(offset_1)?;
    assert_eq!(reader.next()?, ReadResult::Some(offset_2, event_2));

    Ok(())
}
