/// Post-processors filled in when a row's path matches a common bundle field.
pub const AUTOFILL_TABLE: &[(&str, &str)] = &[
    ("time", "duration"),
    ("data_size", "size"),
    ("uuid", "[0:8]"),
    ("created", "date"),
    ("memory", "size"),
    ("memory_max", "size"),
    ("request_memory", "size"),
    ("request_disk", "size"),
    ("request_time", "duration"),
    ("time_preparing", "duration"),
    ("time_running", "duration"),
];

pub fn autofill_post_processor(path: &str) -> Option<&'static str> {
    let key = path.to_lowercase();
    AUTOFILL_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}
