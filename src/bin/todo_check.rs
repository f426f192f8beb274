use std::path::PathBuf;

use todo_list::config::TodoConfig;
use todo_list::core::{SearchOutcome, SortDirection, SortKey};
use todo_list::TodoList;

/// Journal logger that lets this crate through at info/debug and everything
/// else only at warn.
struct FilteredJournal {
    inner: systemd_journal_logger::JournalLog,
}

impl log::Log for FilteredJournal {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        if metadata.target().starts_with("todo_list") || metadata.target().starts_with("todo_check") {
            let max = if todo_list::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
            metadata.level() <= max
        } else {
            metadata.level() <= log::LevelFilter::Warn
        }
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

fn init_logging(config: &TodoConfig) {
    todo_list::set_debug_logging(config.debug_logging);
    match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => {
            let journal = journal.with_syslog_identifier("todo-check".to_string());
            if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
                log::set_max_level(log::LevelFilter::Debug);
            }
        }
        Err(e) => eprintln!("journal unavailable, logging disabled: {e}"),
    }
}

fn arg_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let config_path = arg_value(&args, "--config")
        .map(PathBuf::from)
        .unwrap_or_else(TodoConfig::default_path);
    let config = TodoConfig::load(&config_path);
    init_logging(&config);

    let store = config.open_store()?;
    let list = TodoList::new(store);

    let direction = if args.iter().any(|a| a == "--desc") {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    let key = match arg_value(&args, "--sort") {
        Some(name) => SortKey::from_name(&name).ok_or_else(|| format!("unknown sort key: {name}"))?,
        None => SortKey::Id,
    };
    list.set_sort(key, direction);

    if let Some(text) = arg_value(&args, "--search") {
        match list.set_search_text(&text) {
            SearchOutcome::TooShort => println!("(search text too short, showing all)"),
            SearchOutcome::NoMatches => println!("(no matches for {text:?}, showing all)"),
            SearchOutcome::Cleared | SearchOutcome::Applied(_) => {}
        }
    }

    println!("=== {} ===\n", config.store_path().display());
    let view = list.view();
    for todo in &view {
        println!("{:>12}  [{}]  {}  {}", todo.id, todo.priority, todo.display_date(), todo.name);
    }
    println!("\n{} of {} to-dos", view.len(), list.store().len());

    Ok(())
}
