//! Continuation-row merging.
//!
//! The upstream file splits long town-area names over consecutive rows that
//! share a zip code. A fragment that opens a full-width bracket without
//! closing it continues on the next row; accumulation stops at the first
//! fragment that carries the closing bracket. Each logical address becomes
//! exactly one [`AddressRecord`], with ids assigned densely in emission order.

use crate::address::{AddressRecord, RawRow};
use crate::config::{CLOSE_BRACKET, OPEN_BRACKET};
use crate::error::{EngineError, Result};

/// Whether `current` continues on `next`.
///
/// True iff both rows share a zip code, a bracket is open (in the current
/// fragment or in what has been accumulated so far) and the current fragment
/// does not close it. A fragment holding both brackets never opens a
/// continuation by itself.
pub fn should_merge(current: &RawRow, next: &RawRow, current_detail2: &str, accumulator: &str) -> bool {
    current.zip_code == next.zip_code
        && (current_detail2.contains(OPEN_BRACKET) || accumulator.contains(OPEN_BRACKET))
        && !current_detail2.contains(CLOSE_BRACKET)
}

/// Id of the record emitted after `emitted` others. Ids start at 1.
pub fn next_id(emitted: usize) -> Result<u32> {
    u32::try_from(emitted)
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or(EngineError::RecordIdOverflow(emitted))
}

/// Merge rows, given in file order, into canonical records.
///
/// The last row is always emitted, whatever its bracket state. The emitted
/// record takes zip code, prefecture and first detail field from the row that
/// ends the continuation. Fails once the ids no longer fit in `u32`.
pub fn merge_rows<I>(rows: I) -> Result<Vec<AddressRecord>>
where
    I: IntoIterator<Item = RawRow>,
{
    let mut rows = rows.into_iter().peekable();
    let mut records = Vec::new();
    let mut accumulator = String::new();

    while let Some(current) = rows.next() {
        let merge = rows.peek().is_some_and(|next| {
            should_merge(&current, next, &current.detail_address2, &accumulator)
        });
        if merge {
            accumulator.push_str(&current.detail_address2);
            continue;
        }

        let mut detail_address2 = std::mem::take(&mut accumulator);
        detail_address2.push_str(&current.detail_address2);
        records.push(AddressRecord {
            id: next_id(records.len())?,
            zip_code: current.zip_code,
            prefecture: current.prefecture,
            detail_address1: current.detail_address1,
            detail_address2,
        });
    }

    Ok(records)
}
