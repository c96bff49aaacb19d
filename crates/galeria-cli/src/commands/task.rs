use anyhow::{Result, bail};
use chrono::Datelike;
use clap::Subcommand;
use galeria_core::task::{NewTask, Task, TaskPatch, format_day};
use galeria_core::{EntityId, STATUS_ACTIVE};

use super::{Session, join_ids, parse_date, parse_day, print_history, report, status_marker};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Schedule a task
    Add {
        title: String,
        /// Day of the task (YYYY-MM-DD)
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = STATUS_ACTIVE)]
        status: String,
        /// Referenced image ids
        #[arg(long = "image")]
        images: Vec<EntityId>,
    },
    /// Edit a task's fields and image references in one change
    Edit {
        id: EntityId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(long = "add-image")]
        add_images: Vec<EntityId>,
        #[arg(long = "remove-image")]
        remove_images: Vec<EntityId>,
    },
    /// Move a task to the trash
    Delete { id: EntityId },
    /// Bring a task back from the trash
    Restore { id: EntityId },
    /// Remove a task permanently
    Destroy { id: EntityId },
    /// List tasks
    List {
        #[arg(long)]
        removed: bool,
    },
    /// Search tasks by title, description or status
    Search { query: String },
    /// Tasks scheduled on a day (YYYY-MM-DD)
    Day { date: String },
    /// Month grid of tasks
    Month {
        year: i32,
        /// Month number, 1-12
        month: u32,
    },
    /// Show the change log of a task
    History { id: EntityId },
}

pub async fn run(session: &Session, action: TaskAction) -> Result<()> {
    let board = &session.services.tasks;
    let store = board.store();

    match action {
        TaskAction::Add {
            title,
            date,
            description,
            status,
            images,
        } => {
            let author = session.require_edit()?;
            let draft = NewTask {
                title,
                description,
                status,
                date: parse_date(&date)?,
                images,
            };
            let task = store.create(draft, &author).await?;
            println!("Created task {} on {}", task.id, format_day(&task.date));
        }
        TaskAction::Edit {
            id,
            title,
            description,
            status,
            date,
            add_images,
            remove_images,
        } => {
            let author = session.require_edit()?;
            let patch = TaskPatch {
                title,
                description,
                status,
                date: date.as_deref().map(parse_date).transpose()?,
            };
            let mutation = store
                .update_selection(id, patch, &add_images, &remove_images, &author)
                .await?;
            report(mutation, "Updated");
        }
        TaskAction::Delete { id } => {
            let author = session.require_edit()?;
            report(store.soft_delete(id, &author).await?, "Removed");
        }
        TaskAction::Restore { id } => {
            let author = session.require_edit()?;
            report(store.restore(id, &author).await?, "Restored");
        }
        TaskAction::Destroy { id } => {
            session.require_destroy()?;
            store.hard_destroy(id).await?;
            println!("Destroyed task {}", id);
        }
        TaskAction::List { removed } => {
            let tasks = if removed {
                store.list_removed().await
            } else {
                store.list_active().await
            };
            print_tasks(&tasks);
        }
        TaskAction::Search { query } => print_tasks(&board.search(&query).await),
        TaskAction::Day { date } => {
            let day = parse_day(&date)?;
            let tasks = board.by_date(day.year(), day.month0(), day.day()).await;
            print_tasks(&tasks);
        }
        TaskAction::Month { year, month } => {
            if !(1..=12).contains(&month) {
                bail!("Month must be between 1 and 12, got {}", month);
            }
            for (day, tasks) in board.by_month(year, month - 1).await {
                println!("{:04}-{:02}-{:02}", year, month, day);
                for task in &tasks {
                    println!("    {:>5}  {} ({})", task.id, task.title, task.status);
                }
            }
        }
        TaskAction::History { id } => {
            let task = store.get(id).await?;
            println!("{} on {}", task.title, format_day(&task.date));
            print_history(&task.history);
        }
    }
    Ok(())
}

fn print_tasks(tasks: &[Task]) {
    for task in tasks {
        println!(
            "{} {:>5}  {}  {}  {}  [{}]",
            status_marker(task),
            task.id,
            format_day(&task.date),
            task.title,
            task.status,
            join_ids(&task.images)
        );
    }
}
