// Linux-specific helper: /proc/meminfo with the `free` command's used/free
// accounting (used excludes buffers, page cache and reclaimable slab).

/// Read (total, used, free) in kB from /proc/meminfo (Linux).
pub(super) fn read_meminfo() -> Option<(u64, u64, u64)> {
    #[cfg(target_os = "linux")]
    {
        if let Ok(content) = std::fs::read_to_string("/proc/meminfo") {
            return parse_meminfo(&content);
        }
    }
    None
}

/// Parse /proc/meminfo text into a (total, used, free) kB triple.
/// used = MemTotal - MemFree - Buffers - Cached - SReclaimable.
pub fn parse_meminfo(content: &str) -> Option<(u64, u64, u64)> {
    let mut total = None;
    let mut free = None;
    let mut buffers = 0u64;
    let mut cached = 0u64;
    let mut sreclaimable = 0u64;

    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let value = rest
            .trim()
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok());
        let Some(value) = value else { continue };
        match key {
            "MemTotal" => total = Some(value),
            "MemFree" => free = Some(value),
            "Buffers" => buffers = value,
            "Cached" => cached = value,
            "SReclaimable" => sreclaimable = value,
            _ => {}
        }
    }

    let total = total?;
    let free = free?;
    let used = total
        .saturating_sub(free)
        .saturating_sub(buffers)
        .saturating_sub(cached)
        .saturating_sub(sreclaimable);
    Some((total, used, free))
}
