//! Saved tag groups.
//!
//! A tag group is a remembered tag filter. Saving a set that already exists
//! refreshes its `updated_at` instead of creating a second group, and after
//! every save the unprotected groups beyond `tag_group_limit` are dropped,
//! least recently used first.

use crate::config::JotzConfig;
use crate::error::{JotzError, Result};
use crate::id::Id;
use crate::logging::TARGET;
use crate::model::TagGroup;
use crate::store::meta::next_id;
use crate::store::{Records, WriteTxn};
use crate::tags::require_tags;
use chrono::Utc;
use tracing::debug;

pub fn save<S: AsRef<str>>(tx: &WriteTxn, config: &JotzConfig, tags: &[S]) -> Result<TagGroup> {
    let tags = require_tags(tags)?;
    let group = match tx.tag_groups()?.into_iter().find(|g| g.tags == tags) {
        Some(mut existing) => {
            existing.updated_at = Utc::now();
            existing
        }
        None => TagGroup::new(next_id(tx)?, tags),
    };
    tx.put_tag_group(&group)?;
    prune(tx, config.tag_group_limit, &group.id)?;
    Ok(group)
}

// `keep` is the group just saved; it survives even a limit of zero.
fn prune(tx: &WriteTxn, limit: usize, keep: &Id) -> Result<()> {
    let mut unprotected: Vec<TagGroup> = tx
        .tag_groups()?
        .into_iter()
        .filter(|g| !g.protected && &g.id != keep)
        .collect();
    sort_recent_first(&mut unprotected);

    let room = limit.saturating_sub(1);
    for stale in unprotected.iter().skip(room) {
        tx.remove_tag_group(&stale.id)?;
        debug!(target: TARGET, tag_group_id = %stale.id, "tag group pruned");
    }
    Ok(())
}

/// Deletes a group. Protected groups have to be unprotected first.
pub fn delete(tx: &WriteTxn, id: &Id) -> Result<TagGroup> {
    let group = tx.require_tag_group(id)?;
    if group.protected {
        return Err(JotzError::validation(format!(
            "tag group {} is protected",
            id
        )));
    }
    tx.remove_tag_group(id)?;
    Ok(group)
}

pub fn set_protected(tx: &WriteTxn, id: &Id, protected: bool) -> Result<TagGroup> {
    let mut group = tx.require_tag_group(id)?;
    group.protected = protected;
    tx.put_tag_group(&group)?;
    Ok(group)
}

/// All groups, most recently used first.
pub fn list_all<R: Records>(tx: &R) -> Result<Vec<TagGroup>> {
    let mut groups = tx.tag_groups()?;
    sort_recent_first(&mut groups);
    Ok(groups)
}

fn sort_recent_first(groups: &mut [TagGroup]) {
    groups.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}
