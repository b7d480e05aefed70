//! Tab-separated field decoding
//!
//! Access-log payloads are tab-delimited records. Splitting is zero-copy:
//! the returned slices borrow from the payload. No trimming happens here;
//! whitespace is significant until a consumer decides otherwise.

/// Split a payload into its tab-separated fields
///
/// An empty payload yields an empty vector (not a single empty field), so
/// `fields.is_empty()` is the "blank line" check. A payload consisting
/// solely of separators yields one empty string per slot.
pub fn split_fields(payload: &str) -> Vec<&str> {
    if payload.is_empty() {
        return Vec::new();
    }

    payload.split('\t').collect()
}

#[cfg(test)]
#[path = "fields_test.rs"]
mod fields_test;
