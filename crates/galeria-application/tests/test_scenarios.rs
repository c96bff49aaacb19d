mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::{AUTHOR, Harness, png};
use galeria_application::{ChangeKind, Mutation, StoreEvent};
use galeria_core::history::ChangeRecord;
use galeria_core::repository::CollectionDocument;
use galeria_core::image::{ImagePatch, NewImage};
use galeria_core::segment::SegmentPatch;
use galeria_core::task::NewTask;
use galeria_core::task::TaskPatch;
use galeria_infrastructure::InMemoryDocumentStore;
use serde_json::json;

fn banner() -> NewImage {
    NewImage {
        name: "Banner".to_string(),
        category: "web".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_image_records_creation() {
    let h = Harness::new().await;

    let image = h.services.images.add(banner(), None, AUTHOR).await.unwrap();

    assert_eq!(image.id, 1);
    assert_eq!(image.history.len(), 1);
    assert_eq!(image.history[0].title, "Imagen creada");
    assert_eq!(image.history[0].author, AUTHOR);
    assert_eq!(image.status, "activo");
    assert_eq!(image.author, AUTHOR);
    assert_eq!(image.created_at, image.modified_at);

    let stored = h.documents.document("images").expect("Should persist images");
    assert_eq!(stored.last_id, 1);
    assert_eq!(stored.items[0]["nombre"], "Banner");
    assert_eq!(stored.items[0]["historial"][0]["titulo"], "Imagen creada");
}

#[tokio::test]
async fn test_edit_name_then_repeat_edit() {
    let h = Harness::new().await;
    let library = &h.services.images;
    let image = library.add(banner(), None, AUTHOR).await.unwrap();

    let rename = ImagePatch {
        name: Some("Banner2".to_string()),
        ..Default::default()
    };
    let edited = library
        .edit(image.id, rename.clone(), None, AUTHOR)
        .await
        .unwrap()
        .applied()
        .unwrap();

    assert_eq!(edited.history.len(), 2);
    assert_eq!(edited.history[1].title, "Edición realizada");
    assert_eq!(edited.history[1].summary, "Nombre actualizado");
    assert_eq!(
        edited.history[1].changes,
        vec![ChangeRecord::field("nombre", "Banner", "Banner2")]
    );
    let stored = h.documents.document("images").unwrap();
    assert_eq!(
        stored.items[0]["historial"][1]["cambios"][0],
        serde_json::json!({ "campo": "nombre", "anterior": "Banner", "nuevo": "Banner2" })
    );

    // Same name again, no image changes
    let outcome = library.edit(image.id, rename, None, AUTHOR).await.unwrap();
    assert_eq!(outcome, Mutation::Unchanged);
    assert_eq!(library.store().get(image.id).await.unwrap().history.len(), 2);
}

#[tokio::test]
async fn test_task_image_recomputation() {
    let h = Harness::new().await;
    let store = h.services.tasks.store();
    let date = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
    let task = store
        .create(
            NewTask {
                title: "Campaña de verano".to_string(),
                images: vec![1, 2],
                ..NewTask::on(date)
            },
            AUTHOR,
        )
        .await
        .unwrap();
    assert_eq!(
        task.history[0].changes,
        vec![ChangeRecord::images_added(vec![1, 2])]
    );

    let updated = store
        .update(task.id, TaskPatch::default(), &[3], &[1], AUTHOR)
        .await
        .unwrap()
        .applied()
        .unwrap();

    assert_eq!(updated.images, vec![2, 3]);
    assert_eq!(
        updated.history[1].changes,
        vec![
            ChangeRecord::images_added(vec![3]),
            ChangeRecord::images_removed(vec![1]),
        ]
    );
}

#[tokio::test]
async fn test_selection_edit_without_real_change_is_unchanged() {
    let h = Harness::new().await;
    let store = h.services.tasks.store();
    let date = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
    let task = store
        .create(
            NewTask {
                title: "Post".to_string(),
                images: vec![1, 2],
                ..NewTask::on(date)
            },
            AUTHOR,
        )
        .await
        .unwrap();
    let writes = h.documents.write_count();

    let readded = store
        .update_selection(task.id, TaskPatch::default(), &[2], &[], AUTHOR)
        .await
        .unwrap();
    let unknown_removed = store
        .update_selection(task.id, TaskPatch::default(), &[], &[9], AUTHOR)
        .await
        .unwrap();

    assert!(matches!(readded, Mutation::Unchanged));
    assert!(matches!(unknown_removed, Mutation::Unchanged));
    assert_eq!(h.documents.write_count(), writes);
    let stored = store.get(task.id).await.unwrap();
    assert_eq!(stored.history.len(), 1);
    assert_eq!(stored.images, vec![1, 2]);
}

#[tokio::test]
async fn test_selection_edit_records_only_effective_ids() {
    let h = Harness::new().await;
    let store = h.services.tasks.store();
    let date = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
    let task = store
        .create(
            NewTask {
                images: vec![1, 2],
                ..NewTask::on(date)
            },
            AUTHOR,
        )
        .await
        .unwrap();

    let updated = store
        .update_selection(task.id, TaskPatch::default(), &[2, 3], &[1, 9], AUTHOR)
        .await
        .unwrap()
        .applied()
        .unwrap();

    assert_eq!(updated.images, vec![2, 3]);
    assert_eq!(
        updated.history[1].changes,
        vec![
            ChangeRecord::images_added(vec![3]),
            ChangeRecord::images_removed(vec![1]),
        ]
    );
}

#[tokio::test]
async fn test_null_timestamps_load_as_now() {
    let before = Utc::now();
    let documents = InMemoryDocumentStore::new().with_document(
        "tareas",
        CollectionDocument {
            items: vec![json!({
                "id": 1,
                "titulo": "Post",
                "fecha": "2025-06-10",
                "fechaCreacion": null,
                "fechaModificacion": null,
                "historial": []
            })],
            last_id: 1,
        },
    );
    let h = Harness::with_documents(Arc::new(documents)).await;

    let task = h.services.tasks.store().get(1).await.unwrap();
    assert!(task.created_at >= before);
    assert!(task.modified_at >= before);
    assert!(h.services.images.store().is_empty().await);
}

#[tokio::test]
async fn test_hard_destroy_after_soft_delete() {
    let h = Harness::new().await;
    let library = &h.services.images;
    let image = library.add(banner(), None, AUTHOR).await.unwrap();

    library.delete(image.id, AUTHOR).await.unwrap();
    library.destroy(image.id).await.expect("Destroy should not fail");

    assert!(library.store().find(image.id).await.is_none());
    assert_eq!(h.media.deletions(), vec!["app/1".to_string()]);
    let stored = h.documents.document("images").unwrap();
    assert!(stored.items.is_empty());
    assert_eq!(stored.last_id, 1);

    // Destroying an absent id is still fine and still persists.
    let writes = h.documents.write_count();
    library.destroy(image.id).await.unwrap();
    assert_eq!(h.documents.write_count(), writes + 1);
}

#[tokio::test]
async fn test_failed_asset_deletion_still_removes_record() {
    let h = Harness::new().await;
    let library = &h.services.images;
    let image = library.add(banner(), None, AUTHOR).await.unwrap();
    h.media.fail_deletes(true);

    library.destroy(image.id).await.unwrap();

    assert!(library.store().find(image.id).await.is_none());
    assert!(h.documents.document("images").unwrap().items.is_empty());
    assert!(h.events().iter().any(|e| matches!(
        e,
        StoreEvent::RemoteAssetFailed { collection: "images", id: 1, .. }
    )));
}

#[tokio::test]
async fn test_persist_failure_keeps_local_change() {
    let h = Harness::new().await;
    let store = h.services.images.store();
    let image = store.create(banner(), AUTHOR).await.unwrap();
    h.documents.set_fail_writes(true);

    let outcome = store
        .update(
            image.id,
            ImagePatch {
                description: Some("Portada".to_string()),
                ..Default::default()
            },
            &[],
            &[],
            AUTHOR,
        )
        .await
        .expect("Persistence failures are reported, not returned");

    let updated = outcome.applied().unwrap();
    assert_eq!(updated.description, "Portada");
    assert_eq!(
        updated.history[1].changes,
        vec![ChangeRecord::field("descripcion", "No especificado", "Portada")]
    );
    assert_eq!(store.get(image.id).await.unwrap().history.len(), 2);
    let stored = h.documents.document("images").unwrap();
    assert_eq!(stored.items[0]["historial"].as_array().unwrap().len(), 1);
    assert!(h.events().iter().any(|e| matches!(e, StoreEvent::PersistFailed { .. })));
}

#[tokio::test]
async fn test_upload_precedes_creation() {
    let h = Harness::new().await;
    let library = &h.services.images;

    let image = library
        .add(banner(), Some(&png("banner.png")), AUTHOR)
        .await
        .unwrap();

    assert_eq!(h.media.uploads(), vec!["app/1".to_string()]);
    assert_eq!(image.url, "https://media.example.com/app/1/image.png");
}

#[tokio::test]
async fn test_add_retries_when_id_is_taken_during_upload() {
    let h = Harness::new().await;
    let _sync = h.services.spawn_sync();
    let documents = h.documents.clone();
    h.media.during_next_upload(move || {
        documents.push_external(
            "images",
            CollectionDocument {
                items: vec![json!({ "id": 1, "nombre": "Remota", "historial": [] })],
                last_id: 1,
            },
        );
    });

    let image = h
        .services
        .images
        .add(banner(), Some(&png("banner.png")), AUTHOR)
        .await
        .unwrap();

    assert_eq!(image.id, 2);
    assert_eq!(image.url, "https://media.example.com/app/2/image.png");
    assert_eq!(h.media.uploads(), vec!["app/1".to_string(), "app/2".to_string()]);
    assert!(h.media.deletions().is_empty());
    assert_eq!(h.services.images.store().get(1).await.unwrap().name, "Remota");
}

#[tokio::test]
async fn test_add_discards_upload_no_record_owns() {
    let h = Harness::new().await;
    let _sync = h.services.spawn_sync();
    let documents = h.documents.clone();
    h.media.during_next_upload(move || {
        documents.push_external(
            "images",
            CollectionDocument {
                items: Vec::new(),
                last_id: 1,
            },
        );
    });

    let image = h
        .services
        .images
        .add(banner(), Some(&png("banner.png")), AUTHOR)
        .await
        .unwrap();

    assert_eq!(image.id, 2);
    assert_eq!(h.media.deletions(), vec!["app/1".to_string()]);
    assert_eq!(h.services.images.store().len().await, 1);
}

#[tokio::test]
async fn test_failed_upload_changes_nothing() {
    let h = Harness::new().await;
    let library = &h.services.images;
    let image = library.add(banner(), None, AUTHOR).await.unwrap();
    h.media.fail_uploads(true);
    let writes = h.documents.write_count();

    let err = library
        .add(banner(), Some(&png("other.png")), AUTHOR)
        .await
        .unwrap_err();
    assert!(err.is_remote_asset());

    let err = library
        .edit(image.id, ImagePatch::default(), Some(&png("new.png")), AUTHOR)
        .await
        .unwrap_err();
    assert!(err.is_remote_asset());

    assert_eq!(library.store().len().await, 1);
    assert_eq!(library.store().next_id().await, 2);
    assert_eq!(library.store().get(image.id).await.unwrap().history.len(), 1);
    assert_eq!(h.documents.write_count(), writes);
}

#[tokio::test]
async fn test_edit_with_file_records_versioned_url() {
    let h = Harness::new().await;
    let library = &h.services.images;
    let image = library.add(banner(), None, AUTHOR).await.unwrap();

    let edited = library
        .edit(image.id, ImagePatch::default(), Some(&png("v2.png")), AUTHOR)
        .await
        .unwrap()
        .applied()
        .unwrap();

    assert_eq!(h.media.uploads(), vec!["app/1/2".to_string()]);
    let url = "https://media.example.com/app/1/2/image.png";
    assert_eq!(edited.url, url);
    assert_eq!(edited.history[1].url.as_deref(), Some(url));
    assert_eq!(edited.history[1].summary, "Url actualizado");
}

#[tokio::test]
async fn test_segment_image_shortcuts() {
    let h = Harness::new().await;
    let campaigns = &h.services.campaigns;
    let campaign = campaigns.add_campaign("Verano").await.unwrap();
    let segment = campaigns
        .add_segment(campaign.id, "Jóvenes", AUTHOR)
        .await
        .unwrap();
    let segments = h.services.segments();

    let attached = segments
        .attach_images(segment.id, &[4, 5], AUTHOR)
        .await
        .unwrap()
        .applied()
        .unwrap();
    assert_eq!(attached.images, vec![4, 5]);
    assert_eq!(attached.history[1].title, "Imágenes agregadas");
    assert_eq!(attached.history[1].summary, "2 imagen(es) agregada(s)");

    // Already attached
    assert_eq!(
        segments.attach_images(segment.id, &[5], AUTHOR).await.unwrap(),
        Mutation::Unchanged
    );

    let detached = segments
        .detach_images(segment.id, &[5, 9], AUTHOR)
        .await
        .unwrap()
        .applied()
        .unwrap();
    assert_eq!(detached.images, vec![4]);
    assert_eq!(detached.history[2].title, "Imagen eliminada");
    assert_eq!(
        detached.history[2].changes,
        vec![ChangeRecord::images_removed(vec![5])]
    );

    let edited = segments
        .update(
            segment.id,
            SegmentPatch {
                places: Some("Lima".to_string()),
                ..Default::default()
            },
            &[],
            &[],
            AUTHOR,
        )
        .await
        .unwrap()
        .applied()
        .unwrap();
    assert_eq!(edited.history[3].title, "Datos actualizados");
    assert_eq!(edited.history[3].summary, "Lugares actualizado");
}

#[tokio::test]
async fn test_deleting_campaign_destroys_its_segments() {
    let h = Harness::new().await;
    let campaigns = &h.services.campaigns;
    let summer = campaigns.add_campaign("Verano").await.unwrap();
    let winter = campaigns.add_campaign("Invierno").await.unwrap();
    campaigns.add_segment(summer.id, "A", AUTHOR).await.unwrap();
    campaigns.add_segment(summer.id, "B", AUTHOR).await.unwrap();
    campaigns.add_segment(winter.id, "C", AUTHOR).await.unwrap();

    campaigns.delete_campaign(summer.id).await.unwrap();

    assert_eq!(campaigns.list().await, vec![winter.clone()]);
    assert!(campaigns.segments_of(summer.id).await.is_empty());
    assert_eq!(campaigns.segments_of(winter.id).await.len(), 1);
    assert!(
        campaigns
            .add_segment(summer.id, "D", AUTHOR)
            .await
            .unwrap_err()
            .is_not_found()
    );
    // Segments have no hosted assets.
    assert!(h.media.deletions().is_empty());
}

#[tokio::test]
async fn test_calendar_lookup_skips_removed_tasks() {
    let h = Harness::new().await;
    let board = &h.services.tasks;
    let on = |d: u32| NewTask {
        title: format!("Día {}", d),
        ..NewTask::on(Utc.with_ymd_and_hms(2025, 3, d, 15, 0, 0).unwrap())
    };
    let a = board.store().create(on(14), AUTHOR).await.unwrap();
    let b = board.store().create(on(14), AUTHOR).await.unwrap();
    board.store().create(on(20), AUTHOR).await.unwrap();
    board.store().soft_delete(b.id, AUTHOR).await.unwrap();

    let day = board.by_date(2025, 2, 14).await;
    assert_eq!(day.len(), 1);
    assert_eq!(day[0].id, a.id);

    let month = board.by_month(2025, 2).await;
    assert_eq!(month.keys().copied().collect::<Vec<_>>(), vec![14, 20]);
    assert_eq!(board.search("día 20").await.len(), 1);
}

#[tokio::test]
async fn test_observers_see_each_change() {
    let h = Harness::new().await;
    let library = &h.services.images;
    let image = library.add(banner(), None, AUTHOR).await.unwrap();
    library.delete(image.id, AUTHOR).await.unwrap();
    library.restore(image.id, AUTHOR).await.unwrap();
    library.destroy(image.id).await.unwrap();

    let changes: Vec<ChangeKind> = h
        .events()
        .into_iter()
        .filter_map(|e| match e {
            StoreEvent::Changed { change, .. } => Some(change),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            ChangeKind::Created,
            ChangeKind::SoftDeleted,
            ChangeKind::Restored,
            ChangeKind::Destroyed,
        ]
    );
}
