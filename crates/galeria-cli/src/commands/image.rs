use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;
use galeria_core::EntityId;
use galeria_core::image::{Image, ImagePatch, NewImage};

use super::{Session, print_history, read_upload, report, status_marker};

#[derive(Subcommand)]
pub enum ImageAction {
    /// Add an image, optionally uploading a file for it
    Add {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        campaign: String,
        /// Hosted URL, when no file is uploaded
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Edit an image; blank values are ignored
    Edit {
        id: EntityId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        campaign: Option<String>,
        /// Replacement file; becomes a new version of the image
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Move an image to the trash
    Delete { id: EntityId },
    /// Bring an image back from the trash
    Restore { id: EntityId },
    /// Remove an image and its hosted files permanently
    Destroy { id: EntityId },
    /// List images
    List {
        /// Show the trash instead of the library
        #[arg(long)]
        removed: bool,
    },
    /// Search active images by name, description, category or campaign
    Search { query: String },
    /// Show the change log of an image
    History { id: EntityId },
}

pub async fn run(session: &Session, action: ImageAction) -> Result<()> {
    let images = &session.services.images;

    match action {
        ImageAction::Add {
            name,
            description,
            category,
            campaign,
            url,
            file,
        } => {
            let author = session.require_edit()?;
            let upload = file.as_deref().map(read_upload).transpose()?;
            let form = NewImage {
                name,
                description,
                category,
                campaign,
                url,
                author: String::new(),
            };
            let image = images.add(form, upload.as_ref(), &author).await?;
            println!("Created image {} ({})", image.id, image.url);
        }
        ImageAction::Edit {
            id,
            name,
            description,
            category,
            campaign,
            file,
        } => {
            let author = session.require_edit()?;
            let upload = file.as_deref().map(read_upload).transpose()?;
            let patch = ImagePatch {
                name,
                description,
                category,
                campaign,
                url: None,
            };
            report(images.edit(id, patch, upload.as_ref(), &author).await?, "Updated");
        }
        ImageAction::Delete { id } => {
            let author = session.require_edit()?;
            report(images.delete(id, &author).await?, "Removed");
        }
        ImageAction::Restore { id } => {
            let author = session.require_edit()?;
            report(images.restore(id, &author).await?, "Restored");
        }
        ImageAction::Destroy { id } => {
            session.require_destroy()?;
            images.destroy(id).await?;
            println!("Destroyed image {}", id);
        }
        ImageAction::List { removed } => {
            let list = if removed {
                images.store().list_removed().await
            } else {
                images.store().list_active().await
            };
            print_images(&list);
        }
        ImageAction::Search { query } => print_images(&images.browse(&query).await),
        ImageAction::History { id } => {
            let image = images.store().get(id).await?;
            println!("{} ({})", image.name, image.url);
            print_history(&image.history);
        }
    }
    Ok(())
}

fn print_images(images: &[Image]) {
    for image in images {
        println!(
            "{} {:>5}  {}  [{}] {}",
            status_marker(image),
            image.id,
            image.name,
            image.category,
            image.campaign
        );
    }
}
