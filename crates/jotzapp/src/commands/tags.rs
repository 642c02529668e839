//! The tag index and note search.
//!
//! There is no tag table. The index is derived on demand by scanning notes,
//! so it can never drift from the notes' own tag sets. Tags are looked up by
//! exact name ([`by_tag`]) or by prefix ([`by_tag_prefix`],
//! [`tags_with_prefix`]). Queries only look at
//! active notes. Rename and delete rewrite every note, soft-deleted ones
//! included, so a restored note comes back with the current tag names.

use super::newest_first;
use crate::config::TitleMatch;
use crate::error::{JotzError, Result};
use crate::logging::TARGET;
use crate::model::{Note, TagGroup};
use crate::store::{Records, WriteTxn};
use crate::tags::{require_tags, single_tag};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

fn active_notes<R: Records>(tx: &R) -> Result<Vec<Note>> {
    Ok(tx.notes()?.into_iter().filter(|n| !n.deleted).collect())
}

fn search<R, F>(tx: &R, keep: F) -> Result<Vec<Note>>
where
    R: Records,
    F: Fn(&Note) -> bool,
{
    let mut notes: Vec<Note> = active_notes(tx)?.into_iter().filter(|n| keep(n)).collect();
    newest_first(&mut notes);
    Ok(notes)
}

/// Active notes carrying `tag`, most recently modified first.
pub fn by_tag<R: Records>(tx: &R, tag: &str) -> Result<Vec<Note>> {
    let tag = single_tag(tag)?;
    search(tx, |n| n.has_tag(&tag))
}

/// Active notes carrying at least one tag that starts with `prefix`.
pub fn by_tag_prefix<R: Records>(tx: &R, prefix: &str) -> Result<Vec<Note>> {
    let prefix = single_tag(prefix)?;
    search(tx, |n| n.tags.iter().any(|t| t.starts_with(prefix.as_str())))
}

/// Distinct tags of active notes starting with `prefix`, by name.
pub fn tags_with_prefix<R: Records>(tx: &R, prefix: &str) -> Result<Vec<String>> {
    let prefix = single_tag(prefix)?;
    let mut tags = all_tags(tx)?;
    tags.retain(|t| t.starts_with(prefix.as_str()));
    Ok(tags)
}

/// Active notes carrying every one of `tags`.
pub fn search_tag_group<R: Records, S: AsRef<str>>(tx: &R, tags: &[S]) -> Result<Vec<Note>> {
    let wanted: Vec<String> = require_tags(tags)?.into_iter().collect();
    search(tx, |n| n.has_all_tags(wanted.as_slice()))
}

/// Active notes whose title contains `pattern`.
pub fn search_title<R: Records>(tx: &R, pattern: &str, policy: TitleMatch) -> Result<Vec<Note>> {
    if pattern.is_empty() {
        return Err(JotzError::validation("search pattern cannot be empty"));
    }
    search(tx, |n| policy.matches(&n.title, pattern))
}

/// Distinct tags of active notes, by name.
pub fn all_tags<R: Records>(tx: &R) -> Result<Vec<String>> {
    let tags: BTreeSet<String> = active_notes(tx)?
        .into_iter()
        .flat_map(|n| n.tags)
        .collect();
    Ok(tags.into_iter().collect())
}

/// Distinct tags of active notes, by the last modification of any note
/// carrying them, newest first. Ties go by name.
pub fn all_tags_by_date<R: Records>(tx: &R) -> Result<Vec<String>> {
    let mut latest: BTreeMap<String, DateTime<Utc>> = BTreeMap::new();
    for note in active_notes(tx)? {
        for tag in note.tags {
            let seen = latest.entry(tag).or_insert(note.updated_at);
            if note.updated_at > *seen {
                *seen = note.updated_at;
            }
        }
    }
    let mut tags: Vec<(String, DateTime<Utc>)> = latest.into_iter().collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    Ok(tags.into_iter().map(|(tag, _)| tag).collect())
}

/// Records touched by a tag rename or delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetagReport {
    pub notes: usize,
    pub tag_groups: usize,
    /// Groups folded into an identical group after the rename.
    pub merged_groups: usize,
}

/// Renames `old` to `new` on every note and saved tag group. A record that
/// already has `new` simply ends up with it once. A group whose tag set
/// becomes identical to another group's is merged into the older one.
pub fn rename_tag(tx: &WriteTxn, old: &str, new: &str) -> Result<RetagReport> {
    let old = single_tag(old)?;
    let new = single_tag(new)?;
    let mut report = RetagReport::default();
    if old == new {
        return Ok(report);
    }

    for mut note in tx.notes()? {
        if note.tags.remove(&old) {
            note.tags.insert(new.clone());
            tx.put_note(&note)?;
            report.notes += 1;
        }
    }
    let mut groups = tx.tag_groups()?;
    let mut dirty = vec![false; groups.len()];
    for (group, dirty) in groups.iter_mut().zip(dirty.iter_mut()) {
        if group.tags.remove(&old) {
            group.tags.insert(new.clone());
            *dirty = true;
            report.tag_groups += 1;
        }
    }
    report.merged_groups = write_merged_groups(tx, groups, dirty)?;

    debug!(
        target: TARGET,
        old = %old,
        new = %new,
        notes = report.notes,
        tag_groups = report.tag_groups,
        merged = report.merged_groups,
        "tag renamed"
    );
    Ok(report)
}

/// Stores rewritten groups, folding groups with equal tag sets into the one
/// with the lowest ID. The survivor is protected if any of them was and
/// keeps the latest `updated_at`. Returns how many groups were removed.
fn write_merged_groups(
    tx: &WriteTxn,
    groups: Vec<TagGroup>,
    dirty: Vec<bool>,
) -> Result<usize> {
    let mut kept: Vec<(TagGroup, bool)> = Vec::with_capacity(groups.len());
    let mut by_tags: BTreeMap<BTreeSet<String>, usize> = BTreeMap::new();
    let mut merged = 0;

    // groups arrive in ID order, so the first of a set is the oldest
    for (group, dirty) in groups.into_iter().zip(dirty) {
        match by_tags.get(&group.tags).copied() {
            Some(slot) => {
                let (survivor, survivor_dirty) = &mut kept[slot];
                survivor.protected |= group.protected;
                survivor.created_at = survivor.created_at.min(group.created_at);
                survivor.updated_at = survivor.updated_at.max(group.updated_at);
                *survivor_dirty = true;
                tx.remove_tag_group(&group.id)?;
                merged += 1;
            }
            None => {
                by_tags.insert(group.tags.clone(), kept.len());
                kept.push((group, dirty));
            }
        }
    }
    for (group, dirty) in &kept {
        if *dirty {
            tx.put_tag_group(group)?;
        }
    }
    Ok(merged)
}

/// Removes `name` from every note's tag set. Notes themselves stay.
pub fn delete_tag(tx: &WriteTxn, name: &str) -> Result<RetagReport> {
    let name = single_tag(name)?;
    let mut report = RetagReport::default();
    for mut note in tx.notes()? {
        if note.tags.remove(&name) {
            tx.put_note(&note)?;
            report.notes += 1;
        }
    }
    debug!(target: TARGET, tag = %name, notes = report.notes, "tag deleted");
    Ok(report)
}
