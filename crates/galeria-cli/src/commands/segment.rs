use anyhow::Result;
use clap::Subcommand;
use galeria_core::EntityId;
use galeria_core::segment::{Segment, SegmentPatch};

use super::{Session, join_ids, print_history, report, status_marker};

#[derive(Subcommand)]
pub enum SegmentAction {
    /// Add a segment to a campaign
    Add { campaign_id: EntityId, name: String },
    /// Edit a segment's targeting data
    Edit {
        id: EntityId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        places: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        targeting: Option<String>,
        #[arg(long)]
        investment: Option<String>,
        #[arg(long)]
        cost_per_sale: Option<String>,
        #[arg(long = "add-image")]
        add_images: Vec<EntityId>,
        #[arg(long = "remove-image")]
        remove_images: Vec<EntityId>,
    },
    /// Move a segment to the trash
    Delete { id: EntityId },
    /// Bring a segment back from the trash
    Restore { id: EntityId },
    /// Remove a segment permanently
    Destroy { id: EntityId },
    /// Search segments
    Search { query: String },
    /// Show the change log of a segment
    History { id: EntityId },
}

pub async fn run(session: &Session, action: SegmentAction) -> Result<()> {
    let segments = session.services.segments();

    match action {
        SegmentAction::Add { campaign_id, name } => {
            let author = session.require_edit()?;
            let segment = session
                .services
                .campaigns
                .add_segment(campaign_id, &name, &author)
                .await?;
            println!("Created segment {}", segment.id);
        }
        SegmentAction::Edit {
            id,
            name,
            places,
            age,
            targeting,
            investment,
            cost_per_sale,
            add_images,
            remove_images,
        } => {
            let author = session.require_edit()?;
            let patch = SegmentPatch {
                name,
                places,
                age,
                detailed_targeting: targeting,
                investment,
                cost_per_sale,
            };
            let mutation = segments
                .update_selection(id, patch, &add_images, &remove_images, &author)
                .await?;
            report(mutation, "Updated");
        }
        SegmentAction::Delete { id } => {
            let author = session.require_edit()?;
            report(segments.soft_delete(id, &author).await?, "Removed");
        }
        SegmentAction::Restore { id } => {
            let author = session.require_edit()?;
            report(segments.restore(id, &author).await?, "Restored");
        }
        SegmentAction::Destroy { id } => {
            session.require_destroy()?;
            segments.hard_destroy(id).await?;
            println!("Destroyed segment {}", id);
        }
        SegmentAction::Search { query } => print_segments(&segments.search(&query).await),
        SegmentAction::History { id } => {
            let segment = segments.get(id).await?;
            println!("{}", segment.name);
            print_history(&segment.history);
        }
    }
    Ok(())
}

pub fn print_segments(segments: &[Segment]) {
    for segment in segments {
        println!(
            "{} {:>5}  {}  campaign {}  {}  {}  [{}]",
            status_marker(segment),
            segment.id,
            segment.name,
            segment.campaign_id,
            segment.places,
            segment.investment,
            join_ids(&segment.images)
        );
    }
}
