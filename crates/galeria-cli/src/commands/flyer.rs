use anyhow::Result;
use clap::Subcommand;
use galeria_core::EntityId;
use galeria_core::flyer::{Flyer, FlyerPatch, NewFlyer};

use super::{Session, join_ids, print_history, report, status_marker};

#[derive(Subcommand)]
pub enum FlyerAction {
    /// Create a flyer
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        campaign: String,
        #[arg(long = "image")]
        images: Vec<EntityId>,
    },
    /// Edit a flyer's fields
    Edit {
        id: EntityId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        campaign: Option<String>,
    },
    /// Reference more images from a flyer
    Attach {
        id: EntityId,
        #[arg(required = true)]
        images: Vec<EntityId>,
    },
    /// Drop image references from a flyer
    Detach {
        id: EntityId,
        #[arg(required = true)]
        images: Vec<EntityId>,
    },
    /// Move a flyer to the trash
    Delete { id: EntityId },
    /// Bring a flyer back from the trash
    Restore { id: EntityId },
    /// Remove a flyer permanently
    Destroy { id: EntityId },
    /// List flyers
    List {
        #[arg(long)]
        removed: bool,
    },
    /// Search flyers by name, description, campaign or author
    Search { query: String },
    /// Show the change log of a flyer
    History { id: EntityId },
}

pub async fn run(session: &Session, action: FlyerAction) -> Result<()> {
    let flyers = &session.services.flyers;

    match action {
        FlyerAction::Add {
            name,
            description,
            campaign,
            images,
        } => {
            let author = session.require_edit()?;
            let draft = NewFlyer {
                name,
                description,
                campaign,
                author: author.clone(),
                images,
            };
            let flyer = flyers.create(draft, &author).await?;
            println!("Created flyer {}", flyer.id);
        }
        FlyerAction::Edit {
            id,
            name,
            description,
            campaign,
        } => {
            let author = session.require_edit()?;
            let patch = FlyerPatch {
                name,
                description,
                campaign,
            };
            report(flyers.update(id, patch, &[], &[], &author).await?, "Updated");
        }
        FlyerAction::Attach { id, images } => {
            let author = session.require_edit()?;
            report(flyers.attach_images(id, &images, &author).await?, "Updated");
        }
        FlyerAction::Detach { id, images } => {
            let author = session.require_edit()?;
            report(flyers.detach_images(id, &images, &author).await?, "Updated");
        }
        FlyerAction::Delete { id } => {
            let author = session.require_edit()?;
            report(flyers.soft_delete(id, &author).await?, "Removed");
        }
        FlyerAction::Restore { id } => {
            let author = session.require_edit()?;
            report(flyers.restore(id, &author).await?, "Restored");
        }
        FlyerAction::Destroy { id } => {
            session.require_destroy()?;
            flyers.hard_destroy(id).await?;
            println!("Destroyed flyer {}", id);
        }
        FlyerAction::List { removed } => {
            let list = if removed {
                flyers.list_removed().await
            } else {
                flyers.list_active().await
            };
            print_flyers(&list);
        }
        FlyerAction::Search { query } => print_flyers(&flyers.search(&query).await),
        FlyerAction::History { id } => {
            let flyer = flyers.get(id).await?;
            println!("{}", flyer.name);
            print_history(&flyer.history);
        }
    }
    Ok(())
}

fn print_flyers(flyers: &[Flyer]) {
    for flyer in flyers {
        println!(
            "{} {:>5}  {}  {}  [{}]",
            status_marker(flyer),
            flyer.id,
            flyer.name,
            flyer.campaign,
            join_ids(&flyer.images)
        );
    }
}
