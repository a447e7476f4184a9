//! Batched `IN (...)` lookups for the list views.
//!
//! `SQLite` caps the number of bound parameters per statement, so the ids are
//! deduplicated and queried in fixed-size chunks.

use crate::errors::Result;
use sea_orm::prelude::*;

/// Ids bound per query
pub const ID_BATCH: usize = 500;

/// Fetches every row of `E` whose `column` holds one of `ids`.
///
/// Row order is unspecified; callers index the result by key.
pub async fn find_all_by_ids<E, C, I>(db: &C, column: E::Column, ids: I) -> Result<Vec<E::Model>>
where
    E: EntityTrait,
    C: ConnectionTrait,
    I: IntoIterator<Item = i64>,
{
    let mut ids: Vec<i64> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let mut rows = Vec::with_capacity(ids.len());
    for chunk in ids.chunks(ID_BATCH) {
        let batch = E::find()
            .filter(column.is_in(chunk.iter().copied()))
            .all(db)
            .await?;
        rows.extend(batch);
    }
    Ok(rows)
}
