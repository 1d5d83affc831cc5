//! HTTP Range request parsing module
//!
//! Single `bytes=` ranges for resumable downloads (RFC 7233). Multi-range
//! requests are answered with the full body.

/// Inclusive byte span resolved against a known file length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value
    pub fn content_range(&self, total: u64) -> String {
        format!("bytes {}-{}/{total}", self.start, self.end)
    }
}

/// What a Range header asks for
#[derive(Debug, PartialEq, Eq)]
pub enum RangeOutcome {
    /// No Range header, or one we ignore; serve everything
    Full,
    /// A satisfiable single range
    Partial(ByteRange),
    /// Syntactically valid but outside the file - answer 416
    Unsatisfiable,
}

/// Parse a `Range` header against a file of `len` bytes
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
/// Anything malformed falls back to [`RangeOutcome::Full`].
pub fn parse(header: Option<&str>, len: u64) -> RangeOutcome {
    let Some(spec) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
        return RangeOutcome::Full;
    };

    if spec.contains(',') {
        return RangeOutcome::Full;
    }

    let Some((first, last)) = spec.split_once('-') else {
        return RangeOutcome::Full;
    };
    let (first, last) = (first.trim(), last.trim());

    if first.is_empty() {
        return suffix_range(last, len);
    }

    let Ok(start) = first.parse::<u64>() else {
        return RangeOutcome::Full;
    };
    let end = if last.is_empty() {
        None
    } else {
        match last.parse::<u64>() {
            Ok(e) => Some(e),
            Err(_) => return RangeOutcome::Full,
        }
    };

    if let Some(e) = end {
        if e < start {
            return RangeOutcome::Full;
        }
    }
    if start >= len {
        return RangeOutcome::Unsatisfiable;
    }

    let last_byte = len - 1;
    RangeOutcome::Partial(ByteRange {
        start,
        end: end.map_or(last_byte, |e| e.min(last_byte)),
    })
}

/// `bytes=-N`: the final N bytes
fn suffix_range(suffix: &str, len: u64) -> RangeOutcome {
    let Ok(n) = suffix.parse::<u64>() else {
        return RangeOutcome::Full;
    };
    if n == 0 || len == 0 {
        return RangeOutcome::Unsatisfiable;
    }
    RangeOutcome::Partial(ByteRange {
        start: len.saturating_sub(n),
        end: len - 1,
    })
}
