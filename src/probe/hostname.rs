use tracing::{debug, warn};

/// Longest host name the platform hands out through `gethostname(2)`, without the trailing nul.
#[cfg(target_os = "linux")]
pub const HOST_NAME_MAX: usize = 64;
#[cfg(not(target_os = "linux"))]
pub const HOST_NAME_MAX: usize = 255;

/// Reads the name of the host this process runs on. Best effort: there is no error path, a name
/// that cannot be read comes back empty and non UTF-8 bytes are replaced.
pub fn read_hostname() -> String {
    let raw = gethostname::gethostname();
    let name = host_name_from_bytes(raw.as_encoded_bytes(), HOST_NAME_MAX);

    if name.is_empty() {
        warn!("Could not read a host name from the operating system.");
    }
    name
}

/// Turns the raw bytes of a host name into a string of at most `max_len` characters. Names that
/// are not UTF-8 are cut on the byte limit before invalid bytes get replaced, so every byte keeps
/// its own place in the result.
pub fn host_name_from_bytes(raw: &[u8], max_len: usize) -> String {
    match std::str::from_utf8(raw) {
        Ok(name) => truncate_host_name(name, max_len),
        Err(_) => String::from_utf8_lossy(&raw[..raw.len().min(max_len)]).into_owned(),
    }
}

/// Cuts `name` to at most `max_len` bytes. The cut happens on a char boundary, so a multi byte
/// character at the limit is dropped as a whole.
pub fn truncate_host_name(name: &str, max_len: usize) -> String {
    if name.len() <= max_len {
        return name.to_string();
    }

    let mut end = max_len;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    debug!(
        "Host name of {} bytes truncated to {} bytes.",
        name.len(),
        end
    );
    name[..end].to_string()
}
