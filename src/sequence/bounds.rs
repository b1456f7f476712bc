//! Slice bound arithmetic. Negative offsets count from the end and can only
//! be resolved once the length is known.

/// Returns `true` when `[begin, end)` covers every entry.
pub(crate) fn is_whole(begin: isize, end: Option<isize>, length: Option<usize>) -> bool {
    let from_start =
        begin == 0 || (begin < 0 && length.is_some_and(|length| begin.unsigned_abs() >= length));
    let to_end = match end {
        None => true,
        Some(end) => {
            end >= 0 && length.is_some_and(|length| end.unsigned_abs() >= length)
        }
    };
    from_start && to_end
}

/// Resolves `begin` to an offset, or `None` if it needs an unknown length.
pub(crate) fn resolve_begin(begin: isize, length: Option<usize>) -> Option<usize> {
    match usize::try_from(begin) {
        Ok(offset) => Some(length.map_or(offset, |length| offset.min(length))),
        Err(_) => length.map(|length| length.saturating_sub(begin.unsigned_abs())),
    }
}

/// Resolves `end` to an exclusive offset. `Some(None)` is an open end on a
/// sequence of unknown length; `None` means the length is required.
pub(crate) fn resolve_end(end: Option<isize>, length: Option<usize>) -> Option<Option<usize>> {
    match end {
        None => Some(length),
        Some(end) => match usize::try_from(end) {
            Ok(offset) => Some(Some(length.map_or(offset, |length| offset.min(length)))),
            Err(_) => length.map(|length| Some(length.saturating_sub(end.unsigned_abs()))),
        },
    }
}

/// The length of a resolved slice over a source of known length.
pub(crate) fn resolved_length(begin: isize, end: Option<isize>, length: Option<usize>) -> Option<usize> {
    let length = length?;
    let begin = resolve_begin(begin, Some(length))?;
    let end = resolve_end(end, Some(length))?.unwrap_or(length);
    Some(end.saturating_sub(begin))
}

/// Converts a count to a slice offset.
pub(crate) fn offset(count: usize) -> isize {
    isize::try_from(count).unwrap_or(isize::MAX)
}
