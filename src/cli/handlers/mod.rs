use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::dnd::{DragSession, DropOutcome};
use crate::io::config_io::{self, CONFIG_FILE, ConfigError};
use crate::io::tree_io;
use crate::model::config::Config;
use crate::model::node::{Payload, Tree};
use crate::ops::flatten::{flatten_tree, visible_items};
use crate::ops::tree_ops;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli, config: &Config) -> CmdResult {
    let Cli {
        command,
        json,
        file,
        ..
    } = cli;

    match command {
        // Read commands
        Commands::Show => cmd_show(&file, config, json),
        Commands::Flatten(args) => cmd_flatten(args, &file, config, json),
        Commands::Project(args) => cmd_project(args, &file, config, json),

        // Write commands
        Commands::Move(args) => cmd_move(args, &file, config, json),
        Commands::Remove(args) => cmd_remove(args, &file, config, json),
        Commands::Collapse(args) => cmd_collapse(args, &file, config, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// `--config` if given, else restack.toml in the tree file's directory.
pub fn config_path(cli: &Cli) -> PathBuf {
    match &cli.config {
        Some(path) => path.clone(),
        None => cli
            .file
            .parent()
            .unwrap_or(Path::new(""))
            .join(CONFIG_FILE),
    }
}

pub fn load_config(cli: &Cli) -> Result<Config, ConfigError> {
    config_io::read_config(&config_path(cli))
}

fn open_session(file: &Path, config: &Config) -> Result<DragSession, tree_io::TreeIoError> {
    let tree: Tree<Payload> = tree_io::read_tree(file)?;
    debug!(file = %file.display(), nodes = tree.len(), "tree loaded");
    Ok(DragSession::new(tree, config))
}

/// Replay a drag up to (not including) the drop.
fn start_gesture(session: &mut DragSession, args: &DragArgs) -> CmdResult {
    session.drag_start(&args.active)?;
    session.drag_over(Some(args.over.as_str()))?;
    session.drag_move(args.offset)?;
    for &key in &args.keys {
        if !session.key_move(key.into()) {
            debug!(over = ?session.over_id(), "key had no effect");
        }
    }
    Ok(())
}

fn outline_lines(tree: &Tree<Payload>, config: &Config) -> Vec<String> {
    visible_items(&flatten_tree(tree), None, config.view.collapsible)
        .iter()
        .map(|record| format_row_line(record, record.depth))
        .collect()
}

/// Save `tree` and print `summary`, or print the tree itself.
fn emit_tree(
    file: &Path,
    tree: &Tree<Payload>,
    config: &Config,
    write: bool,
    json: bool,
    summary: &str,
) -> CmdResult {
    if write {
        tree_io::write_tree(file, tree)?;
        println!("{}", summary);
    } else if json {
        print!("{}", tree_io::tree_to_json(tree)?);
    } else {
        for line in outline_lines(tree, config) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(file: &Path, config: &Config, json: bool) -> CmdResult {
    let session = open_session(file, config)?;
    let rows = session.rows();
    if json {
        let rows: Vec<RowJson> = rows.iter().map(row_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for line in format_outline(&rows) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_flatten(args: FlattenArgs, file: &Path, config: &Config, json: bool) -> CmdResult {
    let tree: Tree<Payload> = tree_io::read_tree(file)?;
    let mut records = flatten_tree(&tree);
    if args.visible {
        records = visible_items(&records, None, config.view.collapsible);
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for line in format_flat(&records) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_project(args: DragArgs, file: &Path, config: &Config, json: bool) -> CmdResult {
    let mut session = open_session(file, config)?;
    start_gesture(&mut session, &args)?;

    let projection = session
        .projection()
        .cloned()
        .ok_or_else(|| format!("no projection for {} over {}", args.active, args.over))?;
    let description = session.move_description();
    let over = session.over_id().unwrap_or(args.over.as_str()).to_string();
    session.drag_cancel();

    if json {
        let out = ProjectionJson {
            active: args.active,
            over,
            projection,
            description,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_projection(&projection, description.as_ref()) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_move(args: MoveArgs, file: &Path, config: &Config, json: bool) -> CmdResult {
    let mut session = open_session(file, config)?;
    start_gesture(&mut session, &args.drag)?;

    let description = session.move_description();
    let over = session.over_id().map(str::to_string);
    let active = args.drag.active;

    match session.drag_end(over.as_deref()) {
        DropOutcome::Moved(tree) => {
            let summary = match description {
                Some(d) => format!("moved {}: {}", active, d),
                None => format!("moved {}", active),
            };
            emit_tree(file, &tree, config, args.write, json, &summary)
        }
        DropOutcome::Unchanged => {
            eprintln!("{} dropped onto itself, nothing to do", active);
            if !args.write {
                emit_tree(file, session.tree(), config, false, json, "")?;
            }
            Ok(())
        }
        DropOutcome::Cancelled => Err(format!("drag of {} was cancelled", active).into()),
        DropOutcome::Rejected(err) => Err(err.into()),
    }
}

fn cmd_remove(args: IdArgs, file: &Path, config: &Config, json: bool) -> CmdResult {
    let mut session = open_session(file, config)?;
    let descendants = tree_ops::descendant_count(session.tree(), &args.id);
    let removed = session
        .remove(&args.id)
        .ok_or_else(|| format!("item not found: {}", args.id))?;
    let summary = format!("removed {} ({} descendants)", removed.id, descendants);
    emit_tree(file, session.tree(), config, args.write, json, &summary)
}

fn cmd_collapse(args: IdArgs, file: &Path, config: &Config, json: bool) -> CmdResult {
    let mut session = open_session(file, config)?;
    if !session.toggle_collapsed(&args.id) {
        return Err(format!("item not found: {}", args.id).into());
    }
    let collapsed = tree_ops::find_node(session.tree(), &args.id).is_some_and(|n| n.collapsed);
    let summary = format!(
        "{} {}",
        if collapsed { "collapsed" } else { "expanded" },
        args.id
    );
    emit_tree(file, session.tree(), config, args.write, json, &summary)
}
