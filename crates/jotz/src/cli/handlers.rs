//! Command handlers: one engine call per command, result printed as JSON.
//!
//! Handlers read content from a caller-supplied reader (stdin in the binary)
//! and write to a caller-supplied writer, so tests drive them with buffers.

use super::setup::{Commands, GroupAction, ListArgs, SearchArgs};
use anyhow::{Context, Result};
use jotzapp::commands::export::to_json;
use jotzapp::commands::import::parse;
use jotzapp::{make_patch, Engine, Id, NewNote, Note, NoteStatus, Writer};
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

pub fn dispatch(
    engine: &Engine,
    command: Commands,
    input: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<()> {
    match command {
        Commands::New {
            tags,
            title,
            note_type,
            file,
        } => {
            let content = read_source(file.as_deref(), input)?;
            let note = engine.write().create_note(NewNote {
                note_type,
                patch: make_patch("", &content),
                title,
                tags,
            })?;
            print_json(out, &note)
        }
        Commands::Edit { id, title, file } => {
            let id = Id::from(id.as_str());
            let content = read_source(file.as_deref(), input)?;
            // hold the lock across read and append so the patch base is current
            let writer = engine.write();
            let current = engine.reconstruct(&id)?;
            let patch = make_patch(&current, &content);
            let history_count = writer.append_patch(&id, &patch, title.as_deref())?;
            print_json(out, &json!({ "id": id, "history_count": history_count }))
        }
        Commands::Show { id, raw } => {
            let id = Id::from(id.as_str());
            let content = engine.reconstruct(&id)?;
            if raw {
                out.write_all(content.as_bytes())?;
                return Ok(());
            }
            let note = engine.note(&id)?;
            print_json(out, &ShownNote { note, content })
        }
        Commands::List(args) => print_json(out, &engine.notes(list_status(&args))?),
        Commands::Retype { id, note_type } => {
            print_json(out, &engine.write().change_type(&id.as_str().into(), note_type)?)
        }
        Commands::Retag { id, tags } => {
            print_json(out, &engine.write().update_tags(&id.as_str().into(), &tags)?)
        }
        Commands::Delete { ids } => {
            let notes = each(engine, &ids, |w, id| w.set_deleted(id, true))?;
            print_json(out, &notes)
        }
        Commands::Restore { ids } => {
            let notes = each(engine, &ids, |w, id| w.set_deleted(id, false))?;
            print_json(out, &notes)
        }
        Commands::Purge { ids } => {
            let reports = each(engine, &ids, |w, id| w.delete_forever(id))?;
            print_json(out, &reports)
        }
        Commands::History { id, full } => {
            let entries = engine.note_histories(&id.as_str().into())?;
            let limit = engine.config().note_title_limit;
            let entries: Vec<_> = if full {
                entries
            } else {
                entries.iter().map(|h| h.shortened(limit)).collect()
            };
            print_json(out, &entries)
        }
        Commands::ForgetHistory { id, entry } => {
            let id = Id::from(id.as_str());
            if entry {
                print_json(out, &engine.write().delete_history(&id)?)
            } else {
                let removed = engine.write().delete_note_history(&id)?;
                print_json(out, &json!({ "id": id, "removed": removed }))
            }
        }
        Commands::ProtectHistory { id, off } => print_json(
            out,
            &engine
                .write()
                .set_history_protected(&id.as_str().into(), !off)?,
        ),
        Commands::Tags { by_date, prefix } => {
            let tags = match prefix {
                Some(prefix) => engine.tags_with_prefix(&prefix)?,
                None if by_date => engine.all_tags_by_date()?,
                None => engine.all_tags()?,
            };
            print_json(out, &tags)
        }
        Commands::Tagged { tag, prefix } => {
            let notes = if prefix {
                engine.by_tag_prefix(&tag)?
            } else {
                engine.by_tag(&tag)?
            };
            print_json(out, &notes)
        }
        Commands::RenameTag { old, new } => print_json(out, &engine.write().rename_tag(&old, &new)?),
        Commands::DeleteTag { name } => print_json(out, &engine.write().delete_tag(&name)?),
        Commands::Search(args) => print_json(out, &search(engine, args)?),
        Commands::Group { action } => group(engine, action, out),
        Commands::Status => print_json(out, &engine.status()?),
        Commands::Doctor => print_json(out, &engine.write().doctor()?),
        Commands::Export { file } => {
            let document = to_json(&engine.export()?)?;
            match file {
                Some(path) => {
                    fs::write(&path, document)
                        .with_context(|| format!("writing {}", path.display()))?;
                    print_json(out, &json!({ "exported_to": path }))
                }
                None => writeln!(out, "{}", document).map_err(Into::into),
            }
        }
        Commands::Import { file } => {
            let document = read_source(file.as_deref(), input)?;
            let imported = engine.write().import(parse(&document)?)?;
            print_json(out, &imported)
        }
    }
}

#[derive(Serialize)]
struct ShownNote {
    #[serde(flatten)]
    note: Note,
    content: String,
}

fn list_status(args: &ListArgs) -> NoteStatus {
    if args.all {
        NoteStatus::All
    } else if args.deleted {
        NoteStatus::Deleted
    } else {
        NoteStatus::Active
    }
}

fn search(engine: &Engine, args: SearchArgs) -> Result<Vec<Note>> {
    let notes = match (args.title, args.tags) {
        (Some(pattern), _) => engine.search_title(&pattern)?,
        (None, Some(tags)) => engine.search_tag_group(&tags)?,
        (None, None) => anyhow::bail!("search needs --title or --tags"),
    };
    Ok(notes)
}

fn group(engine: &Engine, action: GroupAction, out: &mut dyn Write) -> Result<()> {
    match action {
        GroupAction::Save { tags } => print_json(out, &engine.write().save_tag_group(&tags)?),
        GroupAction::List => print_json(out, &engine.tag_groups()?),
        GroupAction::Delete { id } => {
            print_json(out, &engine.write().delete_tag_group(&id.as_str().into())?)
        }
        GroupAction::Protect { id, off } => print_json(
            out,
            &engine
                .write()
                .set_tag_group_protected(&id.as_str().into(), !off)?,
        ),
    }
}

/// Runs `op` on each distinct ID under one write lock.
///
/// Every ID is resolved before the first change, so an unknown ID leaves the
/// store untouched. Should a later step still fail, the error names the IDs
/// already changed, since each step commits on its own.
fn each<T>(
    engine: &Engine,
    ids: &[String],
    op: impl Fn(&Writer<'_>, &Id) -> jotzapp::Result<T>,
) -> Result<Vec<T>> {
    let mut unique: Vec<Id> = Vec::with_capacity(ids.len());
    for id in ids.iter().map(|id| Id::from(id.as_str())) {
        if !unique.contains(&id) {
            unique.push(id);
        }
    }

    let writer = engine.write();
    for id in &unique {
        engine.note(id)?;
    }

    let mut results = Vec::with_capacity(unique.len());
    for (done, id) in unique.iter().enumerate() {
        match op(&writer, id) {
            Ok(value) => results.push(value),
            Err(err) if done == 0 => return Err(err.into()),
            Err(err) => {
                let applied: Vec<&str> = unique[..done].iter().map(Id::as_str).collect();
                return Err(anyhow::Error::new(err).context(format!(
                    "stopped at {}; already applied to {}",
                    id,
                    applied.join(", ")
                )));
            }
        }
    }
    Ok(results)
}

fn read_source(file: Option<&Path>, input: &mut dyn Read) -> Result<String> {
    match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut content = String::new();
            input
                .read_to_string(&mut content)
                .context("reading stdin")?;
            Ok(content)
        }
    }
}

fn print_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::setup::Cli;
    use clap::Parser;
    use jotzapp::test_utils::{memory_engine, note_input};
    use serde_json::Value;

    fn run(engine: &Engine, args: &[&str], stdin: &str) -> Result<Value> {
        let mut argv = vec!["jotz"];
        argv.extend_from_slice(args);
        let cli = Cli::try_parse_from(argv)?;
        let mut out = Vec::new();
        dispatch(engine, cli.command, &mut stdin.as_bytes(), &mut out)?;
        Ok(serde_json::from_slice(&out)?)
    }

    #[test]
    fn new_then_show() {
        let engine = memory_engine(1 << 20);
        let created = run(&engine, &["new", "-t", "cli,test"], "from stdin\n").unwrap();
        let id = created["id"].as_str().unwrap().to_string();
        assert_eq!(created["tags"], json!(["cli", "test"]));

        let shown = run(&engine, &["show", &id], "").unwrap();
        assert_eq!(shown["content"], "from stdin\n");
        assert_eq!(shown["title"], "from stdin");
    }

    #[test]
    fn edit_appends_a_patch() {
        let engine = memory_engine(1 << 20);
        let note = engine.write().create_note(note_input("one\n", &["t"])).unwrap();

        let result = run(&engine, &["edit", note.id.as_str()], "one\ntwo\n").unwrap();
        assert_eq!(result["history_count"], 2);
        assert_eq!(engine.reconstruct(&note.id).unwrap(), "one\ntwo\n");
        assert_eq!(engine.note(&note.id).unwrap().patches.len(), 2);
    }

    #[test]
    fn history_is_summarized_unless_full() {
        let engine = memory_engine(1 << 20);
        let long = "x".repeat(500);
        let note = engine.write().create_note(note_input(&long, &["t"])).unwrap();

        let summary = run(&engine, &["history", note.id.as_str()], "").unwrap();
        assert_eq!(summary[0]["contents"].as_str().unwrap().len(), 200);
        let full = run(&engine, &["history", note.id.as_str(), "--full"], "").unwrap();
        assert_eq!(full[0]["contents"].as_str().unwrap().len(), 500);
    }

    #[test]
    fn delete_restore_and_list() {
        let engine = memory_engine(1 << 20);
        let note = engine.write().create_note(note_input("bye", &["t"])).unwrap();

        run(&engine, &["delete", note.id.as_str()], "").unwrap();
        assert_eq!(run(&engine, &["list"], "").unwrap(), json!([]));
        assert_eq!(run(&engine, &["list", "--deleted"], "").unwrap().as_array().unwrap().len(), 1);

        run(&engine, &["restore", note.id.as_str()], "").unwrap();
        assert_eq!(run(&engine, &["list"], "").unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn purge_with_unknown_id_changes_nothing() {
        let engine = memory_engine(1 << 20);
        let a = engine.write().create_note(note_input("first", &["t"])).unwrap();
        let b = engine.write().create_note(note_input("second", &["t"])).unwrap();

        let err = run(&engine, &["purge", a.id.as_str(), "0000ZZZZ", b.id.as_str()], "")
            .unwrap_err();
        assert!(err.to_string().contains("Note not found: 0000ZZZZ"));
        assert_eq!(engine.notes(NoteStatus::All).unwrap().len(), 2);
        assert_eq!(engine.status().unwrap().total_size, 11);
    }

    #[test]
    fn repeated_ids_are_applied_once() {
        let engine = memory_engine(1 << 20);
        let a = engine.write().create_note(note_input("once", &["t"])).unwrap();

        let purged = run(&engine, &["purge", a.id.as_str(), a.id.as_str()], "").unwrap();
        assert_eq!(purged.as_array().unwrap().len(), 1);
    }

    #[test]
    fn tag_prefix_commands() {
        let engine = memory_engine(1 << 20);
        engine.write().create_note(note_input("a", &["work"])).unwrap();
        engine.write().create_note(note_input("b", &["world"])).unwrap();
        engine.write().create_note(note_input("c", &["two"])).unwrap();

        assert_eq!(
            run(&engine, &["tags", "--prefix", "wo"], "").unwrap(),
            json!(["work", "world"])
        );
        let notes = run(&engine, &["tagged", "wo", "--prefix"], "").unwrap();
        assert_eq!(notes.as_array().unwrap().len(), 2);
    }

    #[test]
    fn search_by_tags_and_title() {
        let engine = memory_engine(1 << 20);
        engine.write().create_note(note_input("Alpha", &["a", "b"])).unwrap();
        engine.write().create_note(note_input("Beta", &["a"])).unwrap();

        let by_tags = run(&engine, &["search", "--tags", "a", "b"], "").unwrap();
        assert_eq!(by_tags.as_array().unwrap().len(), 1);
        assert_eq!(by_tags[0]["title"], "Alpha");

        let by_title = run(&engine, &["search", "--title", "Beta"], "").unwrap();
        assert_eq!(by_title[0]["title"], "Beta");
    }

    #[test]
    fn group_round_trip() {
        let engine = memory_engine(1 << 20);
        let saved = run(&engine, &["group", "save", "x", "y"], "").unwrap();
        let id = saved["id"].as_str().unwrap().to_string();

        let protected = run(&engine, &["group", "protect", &id], "").unwrap();
        assert_eq!(protected["protected"], true);
        assert!(run(&engine, &["group", "delete", &id], "").is_err());

        run(&engine, &["group", "protect", &id, "--off"], "").unwrap();
        run(&engine, &["group", "delete", &id], "").unwrap();
        assert_eq!(run(&engine, &["group", "list"], "").unwrap(), json!([]));
    }

    #[test]
    fn export_to_stdout_imports_back() {
        let source = memory_engine(1 << 20);
        source.write().create_note(note_input("carried over\n", &["t"])).unwrap();
        let document = run(&source, &["export"], "").unwrap().to_string();

        let target = memory_engine(1 << 20);
        let imported = run(&target, &["import"], &document).unwrap();
        assert_eq!(imported.as_array().unwrap().len(), 1);
        assert_eq!(target.status().unwrap().total_size, 13);
    }

    #[test]
    fn engine_errors_surface() {
        let engine = memory_engine(4);
        let err = run(&engine, &["new", "-t", "t"], "too big").unwrap_err();
        assert!(err.to_string().contains("Capacity exceeded"));
        let err = run(&engine, &["show", "00000009"], "").unwrap_err();
        assert!(err.to_string().contains("Note not found"));
    }
}
