use crate::render;
use anyhow::{Context, Result};
use evlog_engine::{fs_utils, EventReader, LogError, ReadResult, ReaderOptions};
use std::io::Write;
use std::path::Path;
use std::thread;
use std::time::Duration;

pub fn open(log: &Path, base_dir: Option<&Path>) -> Result<EventReader> {
    let path = fs_utils::resolve_log_path(log);
    let opts = ReaderOptions {
        base_dir: base_dir.map(Path::to_path_buf),
    };
    EventReader::open_with(&path, opts).with_context(|| format!("open {path:?}"))
}

pub fn dump(reader: &mut EventReader, tag: Option<&str>, out: &mut impl Write) -> Result<()> {
    if let Some(tag) = tag {
        let index = reader.build_tag_index()?;
        for offset in index.get(tag) {
            let event = reader.read_at(*offset)?;
            writeln!(out, "{}", render::describe_event(*offset, &event, reader.base_dir()))?;
        }
        return Ok(());
    }

    let base_dir = reader.base_dir().to_path_buf();
    let mut bad = 0;
    for res in reader.events() {
        match res {
            Ok((offset, event)) => {
                writeln!(out, "{}", render::describe_event(offset, &event, &base_dir))?
            }
            Err(e) if e.is_record_local() => bad += 1,
            Err(LogError::TruncatedTail { offset, .. }) => {
                eprintln!("The log ends in a partial record at offset {offset}.")
            }
            Err(e) => return Err(e.into()),
        }
    }
    if bad > 0 {
        eprintln!("Skipped {bad} unreadable records.");
    }
    Ok(())
}

pub fn tags(reader: &mut EventReader, out: &mut impl Write) -> Result<()> {
    let index = reader.build_tag_index()?;
    for (tag, offsets) in index.iter() {
        writeln!(out, "{tag:<32}  {:>8}", offsets.len())?;
    }
    writeln!(
        out,
        "{} records, {} tags, {} untagged, {} unreadable{}",
        index.record_count(),
        index.tag_count(),
        index.untagged(),
        index.skipped(),
        if index.has_truncated_tail() {
            ", partial record at end"
        } else {
            ""
        }
    )?;
    Ok(())
}

pub struct TailOptions<'a> {
    pub tag: Option<&'a str>,
    pub interval: Duration,
    pub from_start: bool,
    /// Return after printing this many records. Otherwise follow forever.
    pub count: Option<usize>,
}

pub fn tail(reader: &mut EventReader, opts: TailOptions, out: &mut impl Write) -> Result<()> {
    if !opts.from_start {
        let index = reader.build_tag_index()?;
        reader.seek(index.scanned_to())?;
    }
    let mut printed = 0;
    while opts.count.map_or(true, |count| printed < count) {
        match reader.next() {
            Ok(ReadResult::Some(offset, event)) => {
                if opts.tag.is_none() || event.tag.as_deref() == opts.tag {
                    writeln!(out, "{}", render::describe_event(offset, &event, reader.base_dir()))?;
                    out.flush()?;
                    printed += 1;
                }
            }
            Ok(ReadResult::EOF) => thread::sleep(opts.interval),
            Err(e) if e.is_recoverable_tail() => thread::sleep(opts.interval),
            Err(e) if e.is_record_local() => tracing::warn!("Skipping a bad record. {e}"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
