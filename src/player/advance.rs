use rand::Rng;

/// Pick the index that follows `current` on an explicit "next" or a natural
/// end of track.
///
/// Shuffle draws uniformly from every index except `current` (a single track
/// replays itself). Otherwise the next index in order, wrapping to 0 only when
/// `repeat` is set. `None` means there is nothing left to play.
pub fn next_index<R: Rng + ?Sized>(
    current: usize,
    len: usize,
    shuffle: bool,
    repeat: bool,
    rng: &mut R,
) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if shuffle {
        if len == 1 {
            return Some(0);
        }
        let r = rng.random_range(0..len - 1);
        return Some(if r >= current { r + 1 } else { r });
    }
    let next = current + 1;
    if next < len {
        Some(next)
    } else if repeat {
        Some(0)
    } else {
        None
    }
}

/// Strictly one step back with wraparound; shuffle and repeat do not apply.
pub fn prev_index(current: usize, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some((current + len - 1) % len)
}
