use chrono::NaiveDate;
use clap::{Arg, ArgAction, Command};
use color_eyre::Result;
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{FileStorage, MemoryStorage};
use application::{FocusTimer, TaskStore};
use domain::{Category, DomainError, DomainResult, Filter, Priority, Task, TaskId, TaskMeta};
use ports::SnapshotStorage;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize color-eyre for better error reporting
    color_eyre::install()?;

    // Initialize logging to file
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("taskmaster.log")?;

    tracing_subscriber::fmt()
        .with_writer(Arc::new(log_file))
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Parse command line arguments
    let matches = Command::new("taskmaster")
        .version("0.1.0")
        .about("A local task manager with priorities, categories and due dates")
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .value_name("DIR")
                .help("Directory the task collection is persisted in")
                .global(true),
        )
        .subcommand(
            Command::new("add")
                .about("Add a new task")
                .arg(Arg::new("text").help("Task description").required(true).index(1))
                .arg(
                    Arg::new("priority")
                        .long("priority")
                        .short('p')
                        .value_name("PRIORITY")
                        .help("high, medium or low (default: high)"),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .short('c')
                        .value_name("CATEGORY")
                        .help("work, personal, shopping, health, finance or ideas"),
                )
                .arg(
                    Arg::new("due")
                        .long("due")
                        .value_name("YYYY-MM-DD")
                        .help("Due date"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List visible tasks")
                .arg(
                    Arg::new("filter")
                        .long("filter")
                        .short('f')
                        .value_name("FILTER")
                        .help("all, active, completed, high, today or a category name"),
                )
                .arg(
                    Arg::new("search")
                        .long("search")
                        .short('s')
                        .value_name("QUERY")
                        .help("Only show tasks whose text contains QUERY"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print tasks as JSON"),
                ),
        )
        .subcommand(
            Command::new("toggle")
                .about("Toggle a task between active and completed")
                .arg(Arg::new("id").help("Task id").required(true).index(1)),
        )
        .subcommand(
            Command::new("edit")
                .about("Replace the text of a task")
                .arg(Arg::new("id").help("Task id").required(true).index(1))
                .arg(Arg::new("text").help("New description").required(true).index(2)),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete a task")
                .arg(Arg::new("id").help("Task id").required(true).index(1)),
        )
        .subcommand(Command::new("clear-completed").about("Delete every completed task"))
        .subcommand(Command::new("stats").about("Show collection statistics"))
        .subcommand(
            Command::new("export")
                .about("Write the task collection as JSON")
                .arg(Arg::new("file").help("Output file (stdout if omitted)").index(1)),
        )
        .subcommand(
            Command::new("import")
                .about("Replace the task collection from a JSON export")
                .arg(Arg::new("file").help("Input file").required(true).index(1)),
        )
        .subcommand(
            Command::new("focus")
                .about("Run a focus countdown (25 minutes)")
                .arg(
                    Arg::new("short")
                        .long("short")
                        .action(ArgAction::SetTrue)
                        .help("Run a 5-minute break instead"),
                ),
        )
        .get_matches();

    // Wire up storage; fall back to an in-memory collection when no
    // data directory is available.
    let storage: Arc<dyn SnapshotStorage> = match matches.get_one::<String>("data-dir") {
        Some(dir) => Arc::new(FileStorage::with_dir(dir)),
        None => match FileStorage::new() {
            Ok(file_storage) => Arc::new(file_storage),
            Err(e) => {
                tracing::warn!("No data directory, tasks will not be persisted: {e}");
                Arc::new(MemoryStorage::new())
            }
        },
    };

    let mut store = TaskStore::load(storage).await;

    match matches.subcommand() {
        Some(("add", add_matches)) => {
            let text = add_matches
                .get_one::<String>("text")
                .map(String::as_str)
                .unwrap_or_default();
            let meta = TaskMeta {
                priority: add_matches
                    .get_one::<String>("priority")
                    .map(|p| Priority::from_str(p))
                    .transpose()?,
                category: add_matches
                    .get_one::<String>("category")
                    .map(|c| Category::from_str(c))
                    .transpose()?,
                due_date: add_matches
                    .get_one::<String>("due")
                    .map(|d| parse_due_date(d))
                    .transpose()?,
            };

            match store.add(text, meta).await {
                Some(task) => println!("Added {}", task.id),
                None => eprintln!("Nothing added: task text is empty"),
            }
        }
        Some(("list", list_matches)) => {
            if let Some(filter) = list_matches.get_one::<String>("filter") {
                store.set_filter(Filter::from_str(filter)?);
            }
            if let Some(query) = list_matches.get_one::<String>("search") {
                store.set_search(query.clone());
            }

            let visible = store.visible_tasks();
            if list_matches.get_flag("json") {
                let json = serde_json::to_string_pretty(&visible)?;
                println!("{json}");
            } else if visible.is_empty() {
                println!("No tasks");
            } else {
                for task in visible {
                    print_task(task);
                }
            }
        }
        Some(("toggle", toggle_matches)) => {
            let id = parse_id(toggle_matches)?;
            store.toggle_completed(id).await;
        }
        Some(("edit", edit_matches)) => {
            let id = parse_id(edit_matches)?;
            let text = edit_matches
                .get_one::<String>("text")
                .map(String::as_str)
                .unwrap_or_default();
            store.edit(id, text).await;
        }
        Some(("rm", rm_matches)) => {
            let id = parse_id(rm_matches)?;
            store.delete(id).await;
        }
        Some(("clear-completed", _)) => {
            store.clear_completed().await;
        }
        Some(("stats", _)) => {
            let json = serde_json::to_string_pretty(&store.stats())?;
            println!("{json}");
        }
        Some(("export", export_matches)) => {
            let snapshot = store.export_snapshot()?;
            match export_matches.get_one::<String>("file") {
                Some(path) => tokio::fs::write(path, snapshot).await?,
                None => println!("{snapshot}"),
            }
        }
        Some(("import", import_matches)) => {
            let Some(path) = import_matches.get_one::<String>("file") else {
                eprintln!("Missing import file");
                std::process::exit(1);
            };
            let blob = tokio::fs::read_to_string(path).await?;
            if let Err(e) = store.import_snapshot(&blob).await {
                eprintln!("Import failed: {e}");
                std::process::exit(1);
            }
            println!("Imported {} tasks", store.tasks().len());
        }
        Some(("focus", focus_matches)) => {
            run_focus_timer(focus_matches.get_flag("short")).await?;
        }
        None => {
            // Default behavior - list visible tasks
            let visible = store.visible_tasks();
            if visible.is_empty() {
                println!("No tasks");
            } else {
                for task in visible {
                    print_task(task);
                }
            }
        }
        _ => {
            eprintln!("Unknown command");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn parse_id(matches: &clap::ArgMatches) -> DomainResult<TaskId> {
    let raw = matches
        .get_one::<String>("id")
        .map(String::as_str)
        .unwrap_or_default();
    TaskId::from_str(raw)
}

fn parse_due_date(value: &str) -> DomainResult<chrono::DateTime<chrono::Utc>> {
    let date = NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::InvalidDate(value.to_string()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DomainError::InvalidDate(value.to_string()))?;
    Ok(midnight.and_utc())
}

fn print_task(task: &Task) {
    let marker = if task.completed { "[x]" } else { "[ ]" };
    let due = task
        .due_date
        .map(|d| format!(" due {}", d.format("%Y-%m-%d")))
        .unwrap_or_default();
    println!(
        "{marker} {} {} ({}/{}{due})",
        task.id, task.text, task.priority, task.category
    );
}

async fn run_focus_timer(short: bool) -> Result<()> {
    let mut timer = FocusTimer::new();
    if short {
        timer.start_break();
    } else {
        timer.start_work();
    }

    let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));
    interval.tick().await; // the first tick completes immediately

    let mut stdout = std::io::stdout();
    while timer.is_running() {
        write!(stdout, "\r{}  ", timer.display())?;
        stdout.flush()?;
        tokio::select! {
            _ = interval.tick() => timer.tick(),
            _ = tokio::signal::ctrl_c() => timer.cancel(),
        }
    }
    if timer.remaining() == 0 {
        println!("\rFocus session complete");
    } else {
        println!("\rFocus session cancelled");
    }
    Ok(())
}
