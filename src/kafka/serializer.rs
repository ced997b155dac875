use crate::{event::Record, Result};

pub struct JsonSerializer;

impl JsonSerializer {
    /// Compact single-line JSON, UTF-8.
    pub fn serialize<T: Record>(record: &T) -> Result<String> {
        serde_json::to_string(record).map_err(Into::into)
    }
}
