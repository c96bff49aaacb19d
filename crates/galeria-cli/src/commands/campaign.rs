use anyhow::Result;
use clap::Subcommand;
use galeria_core::EntityId;

use super::Session;
use super::segment::print_segments;

#[derive(Subcommand)]
pub enum CampaignAction {
    /// Create a campaign
    Add { name: String },
    /// Rename a campaign
    Rename { id: EntityId, name: String },
    /// Delete a campaign together with its segments
    Delete { id: EntityId },
    /// List campaigns
    List,
    /// List the segments of a campaign
    Segments { id: EntityId },
}

pub async fn run(session: &Session, action: CampaignAction) -> Result<()> {
    let campaigns = &session.services.campaigns;

    match action {
        CampaignAction::Add { name } => {
            session.require_edit()?;
            let campaign = campaigns.add_campaign(&name).await?;
            println!("Created campaign {}", campaign.id);
        }
        CampaignAction::Rename { id, name } => {
            session.require_edit()?;
            let campaign = campaigns.rename(id, &name).await?;
            println!("Renamed campaign {} to {}", campaign.id, campaign.name);
        }
        CampaignAction::Delete { id } => {
            session.require_destroy()?;
            campaigns.delete_campaign(id).await?;
            println!("Deleted campaign {}", id);
        }
        CampaignAction::List => {
            for campaign in campaigns.list().await {
                let segments = campaigns.segments_of(campaign.id).await;
                println!(
                    "{:>5}  {}  ({} segments)",
                    campaign.id,
                    campaign.name,
                    segments.len()
                );
            }
        }
        CampaignAction::Segments { id } => {
            let campaign = campaigns.get(id).await?;
            println!("{}", campaign.name);
            print_segments(&campaigns.segments_of(id).await);
        }
    }
    Ok(())
}
