use evlog_engine::RecordOffset;
use evlog_types::types::{ArrayValue, Event, Value};
use itertools::Itertools;
use std::path::Path;

fn describe_array(arr: &ArrayValue) -> String {
    format!(
        "{}[{}] {}",
        arr.element_type(),
        arr.shape().iter().join(", "),
        arr.byte_order()
    )
}

pub fn describe_value(val: Option<&Value>, base_dir: &Path) -> String {
    match val {
        None => String::from("-"),
        Some(Value::Scalar(f)) => format!("{f:e}"),
        Some(Value::Array(arr)) => describe_array(arr),
        Some(Value::Curve(curve)) => format!(
            "x: {}, y: {}",
            describe_array(curve.x()),
            describe_array(curve.y())
        ),
        Some(Value::Image(img)) => format!(
            "image {} ({} bytes)",
            img.format.as_deref().unwrap_or("?"),
            img.data.len()
        ),
        Some(Value::ExternalFile(file)) => match file.resolve(base_dir) {
            Ok(path) => format!("-> {}", path.display()),
            Err(_) => format!("-> {:?} (outside the base dir)", file.path()),
        },
        Some(Value::Unrecognized { field_id }) => format!("<unrecognized value case {field_id}>"),
    }
}

pub fn describe_event(offset: RecordOffset, event: &Event, base_dir: &Path) -> String {
    let wall_time = event
        .wall_time
        .map_or_else(|| String::from("-"), |t| format!("{t:.6}"));
    format!(
        "{:>10}  {wall_time:>18}  {:<24}  {:<12}  {}",
        *offset,
        event.tag.as_deref().unwrap_or("-"),
        event.value_type.as_deref().unwrap_or("-"),
        describe_value(event.value.as_ref(), base_dir)
    )
}
