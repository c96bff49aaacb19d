//! `GaleriaServices`: every store wired together for a presentation layer.

use std::sync::Arc;

use galeria_core::calendar::CalendarIndex;
use galeria_core::flyer::Flyer;
use galeria_core::image::Image;
use galeria_core::repository::{DocumentStore, MediaStore};
use galeria_core::segment::Segment;
use galeria_core::task::Task;
use galeria_core::user::{Actor, AuthProvider};
use galeria_core::Result;
use tokio::task::JoinHandle;

use crate::campaign_directory::CampaignDirectory;
use crate::entity_store::EntityStore;
use crate::image_library::ImageLibrary;
use crate::observer::StoreObserver;
use crate::task_board::TaskBoard;

pub struct GaleriaServices {
    pub images: ImageLibrary,
    pub tasks: TaskBoard,
    pub flyers: Arc<EntityStore<Flyer>>,
    pub campaigns: Arc<CampaignDirectory>,
    auth: Arc<dyn AuthProvider>,
}

impl GaleriaServices {
    /// Opens every collection. Nothing is mutable until all have loaded.
    pub async fn open(
        documents: Arc<dyn DocumentStore>,
        media: Arc<dyn MediaStore>,
        auth: Arc<dyn AuthProvider>,
        calendar: CalendarIndex,
    ) -> Result<Self> {
        let images = EntityStore::<Image>::open(documents.clone(), media.clone()).await?;
        let tasks = EntityStore::<Task>::open(documents.clone(), media.clone()).await?;
        let flyers = EntityStore::<Flyer>::open(documents.clone(), media.clone()).await?;
        let segments = EntityStore::<Segment>::open(documents.clone(), media).await?;
        let campaigns = CampaignDirectory::open(documents, segments).await?;
        tracing::debug!("[GaleriaServices] All collections loaded");

        Ok(Self {
            images: ImageLibrary::new(images),
            tasks: TaskBoard::new(tasks, calendar),
            flyers,
            campaigns,
            auth,
        })
    }

    pub fn segments(&self) -> &Arc<EntityStore<Segment>> {
        self.campaigns.segments()
    }

    /// Starts one snapshot listener per collection.
    pub fn spawn_sync(&self) -> Vec<JoinHandle<()>> {
        vec![
            self.images.store().spawn_sync(),
            self.tasks.store().spawn_sync(),
            self.flyers.spawn_sync(),
            self.segments().spawn_sync(),
            self.campaigns.spawn_sync(),
        ]
    }

    /// Registers `observer` with every collection.
    pub fn subscribe(&self, observer: Arc<dyn StoreObserver>) {
        self.images.store().subscribe(observer.clone());
        self.tasks.store().subscribe(observer.clone());
        self.flyers.subscribe(observer.clone());
        self.segments().subscribe(observer.clone());
        self.campaigns.subscribe(observer);
    }

    pub fn actor(&self) -> Option<Actor> {
        self.auth.current_actor()
    }

    /// Author label recorded on history entries.
    pub fn author(&self) -> String {
        self.auth.author()
    }
}
