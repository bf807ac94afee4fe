//! In-place column surgery on row-major packed arrays.
//!
//! A buffer holds `rows` rows of `width` elements each; its logical length is
//! `rows * width`. Capacity grows exactly and is never released.

/// Insert `count` columns at `at` in every row, filling each new cell with `fill(row, k)`.
pub(crate) fn insert_columns<T: Copy>(
    buf: &mut Vec<T>,
    rows: usize,
    width: usize,
    at: usize,
    count: usize,
    mut fill: impl FnMut(usize, usize) -> T,
) {
    debug_assert_eq!(buf.len(), rows * width);
    debug_assert!(at <= width);
    if count == 0 {
        return;
    }
    let new_width = width + count;
    let Some(&pad) = buf.first() else {
        // Zero rows or zero width: rebuild directly.
        grow_exact(buf, rows * new_width);
        for row in 0..rows {
            for k in 0..count {
                buf.push(fill(row, k));
            }
        }
        return;
    };

    grow_exact(buf, rows * new_width);
    buf.resize(rows * new_width, pad);

    // Walk rows backwards so every destination is at or past its unread source.
    for row in (0..rows).rev() {
        let src = row * width;
        let dst = row * new_width;
        buf.copy_within(src + at..src + width, dst + at + count);
        buf.copy_within(src..src + at, dst);
        for k in 0..count {
            buf[dst + at + k] = fill(row, k);
        }
    }
}

/// Remove `count` columns starting at `at` from every row.
pub(crate) fn remove_columns<T: Copy>(
    buf: &mut Vec<T>,
    rows: usize,
    width: usize,
    at: usize,
    count: usize,
) {
    debug_assert_eq!(buf.len(), rows * width);
    debug_assert!(at + count <= width);
    if count == 0 {
        return;
    }
    let new_width = width - count;
    for row in 0..rows {
        let src = row * width;
        let dst = row * new_width;
        buf.copy_within(src..src + at, dst);
        buf.copy_within(src + at + count..src + width, dst + at);
    }
    buf.truncate(rows * new_width);
}

/// Remove one row of `width` elements.
pub(crate) fn remove_row<T>(buf: &mut Vec<T>, row: usize, width: usize) {
    buf.drain(row * width..(row + 1) * width);
}

/// Reserve so that capacity is at least `len`, without amortized over-allocation.
pub(crate) fn grow_exact<T>(buf: &mut Vec<T>, len: usize) {
    if len > buf.capacity() {
        buf.reserve_exact(len - buf.len());
    }
}

#[cfg(test)]
#[path = "../../tests/unit/genome/columns.rs"]
mod tests;
