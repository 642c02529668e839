//! The metadata singleton: ID counter and capacity accounting.
//!
//! Everything here runs inside the caller's [`WriteTxn`], so an allocated ID
//! or a size adjustment only becomes durable if the whole operation commits.

use super::{Records, WriteTxn};
use crate::error::{JotzError, Result};
use crate::id::Id;
use crate::model::StoreMeta;

/// Seeds the metadata record on first open; afterwards only refreshes the
/// capacity from configuration. The counter and total are never reset.
pub fn init_meta(tx: &WriteTxn, capacity: u64) -> Result<StoreMeta> {
    let meta = match tx.meta()? {
        Some(existing) => StoreMeta {
            capacity,
            ..existing
        },
        None => StoreMeta {
            current_id: Id::first(),
            total_size: 0,
            capacity,
        },
    };
    tx.put_meta(&meta)?;
    Ok(meta)
}

pub fn load_meta<R: Records>(tx: &R) -> Result<StoreMeta> {
    tx.meta()?
        .ok_or_else(|| JotzError::corruption("store metadata record is missing"))
}

/// Allocates the next ID for any record kind.
pub fn next_id(tx: &WriteTxn) -> Result<Id> {
    let mut meta = load_meta(tx)?;
    let id = meta.current_id.next()?;
    meta.current_id = id.clone();
    tx.put_meta(&meta)?;
    Ok(id)
}

/// Fails with `CapacityExceeded` unless `additional` more bytes fit.
pub fn check_total_size<R: Records>(tx: &R, additional: u64) -> Result<()> {
    let meta = load_meta(tx)?;
    let fits = meta
        .total_size
        .checked_add(additional)
        .is_some_and(|total| total <= meta.capacity);
    if !fits {
        return Err(JotzError::CapacityExceeded {
            total: meta.total_size,
            additional,
            capacity: meta.capacity,
        });
    }
    Ok(())
}

/// Gate for a signed size change: growth is checked, shrinking is free.
pub fn check_delta<R: Records>(tx: &R, delta: i64) -> Result<()> {
    if delta <= 0 {
        return Ok(());
    }
    check_total_size(tx, delta.unsigned_abs())
}

/// Applies `delta` to the running total and returns the new total.
pub fn adjust_total_size(tx: &WriteTxn, delta: i64) -> Result<u64> {
    let mut meta = load_meta(tx)?;
    meta.total_size = meta.total_size.checked_add_signed(delta).ok_or_else(|| {
        JotzError::corruption(format!(
            "total size {} cannot absorb a change of {} bytes",
            meta.total_size, delta
        ))
    })?;
    tx.put_meta(&meta)?;
    Ok(meta.total_size)
}

/// Overwrites the running total, for repairs.
pub fn set_total_size(tx: &WriteTxn, total: u64) -> Result<()> {
    let mut meta = load_meta(tx)?;
    meta.total_size = total;
    tx.put_meta(&meta)
}

/// Signed difference `new - old` between two byte sizes.
pub fn size_delta(old: u64, new: u64) -> Result<i64> {
    let delta = i128::from(new) - i128::from(old);
    i64::try_from(delta).map_err(|_| JotzError::validation("size change is out of range"))
}
