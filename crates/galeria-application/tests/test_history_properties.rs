mod common;

use chrono::{TimeZone, Utc};
use common::{AUTHOR, Harness};
use galeria_application::Mutation;
use galeria_core::image::{ImagePatch, NewImage};
use galeria_core::task::{NewTask, TaskPatch};
use galeria_core::{Entity, STATUS_ACTIVE, STATUS_REMOVED};

fn banner() -> NewImage {
    NewImage {
        name: "Banner".to_string(),
        category: "web".to_string(),
        ..Default::default()
    }
}

fn task_with_images(images: Vec<u64>) -> NewTask {
    let date = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
    NewTask {
        title: "Publicación".to_string(),
        images,
        ..NewTask::on(date)
    }
}

#[tokio::test]
async fn test_identical_update_is_a_no_op() {
    let h = Harness::new().await;
    let store = h.services.images.store();
    let image = store.create(banner(), AUTHOR).await.unwrap();
    let writes = h.documents.write_count();

    let outcome = store
        .update(
            image.id,
            ImagePatch {
                name: Some("Banner".to_string()),
                category: Some("web".to_string()),
                ..Default::default()
            },
            &[],
            &[],
            AUTHOR,
        )
        .await
        .unwrap();

    assert_eq!(outcome, Mutation::Unchanged);
    let stored = store.get(image.id).await.unwrap();
    assert_eq!(stored.history.len(), 1);
    assert_eq!(stored.modified_at, image.modified_at);
    assert_eq!(h.documents.write_count(), writes, "No-op must not persist");
}

#[tokio::test]
async fn test_history_ids_stay_contiguous() {
    let h = Harness::new().await;
    let store = h.services.tasks.store();
    let task = store.create(task_with_images(vec![1]), AUTHOR).await.unwrap();
    let id = task.id;

    let mut lengths = vec![1];
    store
        .update(
            id,
            TaskPatch {
                title: Some("Publicación final".to_string()),
                ..Default::default()
            },
            &[],
            &[],
            AUTHOR,
        )
        .await
        .unwrap();
    lengths.push(store.get(id).await.unwrap().history.len());

    // No-op in between
    store
        .update(id, TaskPatch::default(), &[], &[], AUTHOR)
        .await
        .unwrap();
    lengths.push(store.get(id).await.unwrap().history.len());

    store.attach_images(id, &[2, 3], AUTHOR).await.unwrap();
    lengths.push(store.get(id).await.unwrap().history.len());
    store.soft_delete(id, AUTHOR).await.unwrap();
    lengths.push(store.get(id).await.unwrap().history.len());
    store.restore(id, AUTHOR).await.unwrap();
    lengths.push(store.get(id).await.unwrap().history.len());

    assert!(lengths.windows(2).all(|w| w[0] <= w[1]));
    let history = store.get(id).await.unwrap().history;
    assert_eq!(history.len(), 5);
    for (i, entry) in history.iter().enumerate() {
        assert_eq!(entry.id as usize, i + 1);
    }
    assert_eq!(history[0].title, "Tarea creada");
    assert_eq!(history[2].title, "Imágenes agregadas");
}

#[tokio::test]
async fn test_removed_ids_win_over_added_ids() {
    let h = Harness::new().await;
    let store = h.services.tasks.store();
    let task = store
        .create(task_with_images(vec![1, 2, 4]), AUTHOR)
        .await
        .unwrap();

    let updated = store
        .update(task.id, TaskPatch::default(), &[5, 6], &[5], AUTHOR)
        .await
        .unwrap()
        .applied()
        .expect("Should record image changes");

    assert!(updated.images.contains(&6));
    assert!(!updated.images.contains(&5));
    for id in [1, 2, 4] {
        assert!(updated.images.contains(&id));
    }
    let last = updated.history.last().unwrap();
    assert_eq!(last.summary, "2 imagen(es) agregada(s), 1 imagen(es) eliminada(s)");
}

#[tokio::test]
async fn test_soft_delete_restore_round_trip() {
    let h = Harness::new().await;
    let library = &h.services.images;
    let image = library.add(banner(), None, AUTHOR).await.unwrap();

    let deleted = library.delete(image.id, AUTHOR).await.unwrap().applied().unwrap();
    assert_eq!(deleted.status, STATUS_REMOVED);
    assert_eq!(deleted.history.len(), 2);
    assert_eq!(deleted.history[1].title, "Se eliminó imagen");
    assert_eq!(library.store().list_removed().await.len(), 1);
    assert!(library.browse("").await.is_empty());

    let restored = library.restore(image.id, AUTHOR).await.unwrap().applied().unwrap();
    assert_eq!(restored.status, STATUS_ACTIVE);
    assert_eq!(restored.history.len(), 3);
    assert_eq!(restored.history[2].title, "Se restauró imagen");
    assert!(restored.history[2].changes.is_empty());

    // Restoring an active image records nothing.
    assert_eq!(
        library.restore(image.id, AUTHOR).await.unwrap(),
        Mutation::Unchanged
    );
}

#[tokio::test]
async fn test_ids_are_never_reused() {
    let h = Harness::new().await;
    let store = h.services.flyers.clone();
    let mut ids = Vec::new();

    for round in 0..3 {
        let flyer = store
            .create(
                galeria_core::flyer::NewFlyer {
                    name: format!("Volante {}", round),
                    ..Default::default()
                },
                AUTHOR,
            )
            .await
            .unwrap();
        ids.push(flyer.id);
        // Destroy the newest one every time.
        store.hard_destroy(flyer.id).await.unwrap();
    }

    assert_eq!(ids, vec![1, 2, 3]);
    assert!(store.is_empty().await);

    // The counter survives a reopen.
    let reopened = Harness::with_documents(h.documents.clone()).await;
    assert_eq!(reopened.services.flyers.next_id().await, 4);
}

#[tokio::test]
async fn test_missing_entity_is_not_found() {
    let h = Harness::new().await;
    let store = h.services.tasks.store();

    let err = store
        .update(42, TaskPatch::default(), &[1], &[], AUTHOR)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(store.soft_delete(42, AUTHOR).await.unwrap_err().is_not_found());
    assert_eq!(h.documents.write_count(), 0);
}

#[tokio::test]
async fn test_image_changes_are_ignored_for_images() {
    let h = Harness::new().await;
    let store = h.services.images.store();
    let image = store.create(banner(), AUTHOR).await.unwrap();

    let outcome = store
        .update(image.id, ImagePatch::default(), &[7], &[], AUTHOR)
        .await
        .unwrap();

    assert_eq!(outcome, Mutation::Unchanged);
    assert!(store.get(image.id).await.unwrap().image_refs().is_empty());
}
