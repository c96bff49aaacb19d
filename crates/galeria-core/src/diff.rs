//! Diff Engine.
//!
//! Compares an entity's stored field values with a proposed patch and
//! packages caller-computed image-set changes. Pure: no I/O, no mutation.

use crate::entity::{Entity, EntityId, EntityPatch};
use crate::history::{ChangeRecord, UNSPECIFIED};

/// Lists the field and image-set changes `proposed` would make to `current`.
///
/// Field records appear in the patch's field order, followed by the added and
/// then the removed image records. `added` and `removed` are taken as given:
/// the caller computes them against the current references. An empty result
/// means there is nothing to save.
pub fn diff<E: Entity>(
    current: &E,
    proposed: &E::Patch,
    added: &[EntityId],
    removed: &[EntityId],
) -> Vec<ChangeRecord> {
    let mut changes: Vec<ChangeRecord> = proposed
        .proposed()
        .into_iter()
        .filter_map(|(field, after)| {
            let before = current.field_value(field).unwrap_or_default();
            if before == after {
                return None;
            }
            let before = if before.is_empty() {
                UNSPECIFIED.to_string()
            } else {
                before
            };
            Some(ChangeRecord::field(field, before, after))
        })
        .collect();

    if !added.is_empty() {
        changes.push(ChangeRecord::images_added(added.to_vec()));
    }
    if !removed.is_empty() {
        changes.push(ChangeRecord::images_removed(removed.to_vec()));
    }
    changes
}

/// Recomputes an image reference set: `removed` wins over `added`, existing
/// order is kept and new ids are appended without duplicates.
pub fn merge_image_refs(
    current: &[EntityId],
    added: &[EntityId],
    removed: &[EntityId],
) -> Vec<EntityId> {
    let mut next: Vec<EntityId> = Vec::with_capacity(current.len() + added.len());
    for id in current.iter().chain(added) {
        if !removed.contains(id) && !next.contains(id) {
            next.push(*id);
        }
    }
    next
}

/// Narrows a requested selection change to what actually differs from
/// `current`: additions not referenced yet and removals that are referenced.
/// An id requested both ways counts only as a removal.
pub fn effective_image_changes(
    current: &[EntityId],
    added: &[EntityId],
    removed: &[EntityId],
) -> (Vec<EntityId>, Vec<EntityId>) {
    let mut effective_added: Vec<EntityId> = Vec::new();
    for id in added {
        if !current.contains(id) && !removed.contains(id) && !effective_added.contains(id) {
            effective_added.push(*id);
        }
    }
    let mut effective_removed: Vec<EntityId> = Vec::new();
    for id in removed {
        if current.contains(id) && !effective_removed.contains(id) {
            effective_removed.push(*id);
        }
    }
    (effective_added, effective_removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ImageChangeKind;
    use crate::image::{Image, ImagePatch, NewImage};
    use crate::task::{NewTask, Task, TaskPatch};
    use chrono::{TimeZone, Utc};

    fn banner() -> Image {
        Image::from_draft(
            1,
            NewImage {
                name: "Banner".to_string(),
                category: "web".to_string(),
                ..Default::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn test_identical_values_produce_no_changes() {
        let patch = ImagePatch {
            name: Some("Banner".to_string()),
            category: Some("web".to_string()),
            ..Default::default()
        };
        assert!(diff(&banner(), &patch, &[], &[]).is_empty());
    }

    #[test]
    fn test_changed_field_records_before_and_after() {
        let patch = ImagePatch {
            name: Some("Banner2".to_string()),
            ..Default::default()
        };
        let changes = diff(&banner(), &patch, &[], &[]);
        assert_eq!(changes, vec![ChangeRecord::field("nombre", "Banner", "Banner2")]);
    }

    #[test]
    fn test_empty_before_value_is_unspecified() {
        let patch = ImagePatch {
            description: Some("Hero image".to_string()),
            ..Default::default()
        };
        let changes = diff(&banner(), &patch, &[], &[]);
        assert_eq!(
            changes,
            vec![ChangeRecord::field("descripcion", "No especificado", "Hero image")]
        );
    }

    #[test]
    fn test_image_arrays_are_packaged_as_given() {
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 10, 0, 0).unwrap();
        let task = Task::from_draft(
            1,
            NewTask {
                title: "Post".to_string(),
                images: vec![1, 2],
                ..NewTask::on(now)
            },
            now,
        );
        let changes = diff(&task, &TaskPatch::default(), &[3], &[1]);
        assert_eq!(changes.len(), 2);
        assert!(matches!(
            &changes[0],
            ChangeRecord::Images { kind: ImageChangeKind::Added, image_ids } if image_ids == &vec![3]
        ));
        assert!(matches!(
            &changes[1],
            ChangeRecord::Images { kind: ImageChangeKind::Removed, image_ids } if image_ids == &vec![1]
        ));
    }

    #[test]
    fn test_task_date_diff_is_day_granular() {
        let now = Utc.with_ymd_and_hms(2025, 5, 2, 10, 0, 0).unwrap();
        let task = Task::from_draft(1, NewTask::on(now), now);

        let same_day = TaskPatch {
            date: Some(Utc.with_ymd_and_hms(2025, 5, 2, 23, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(diff(&task, &same_day, &[], &[]).is_empty());

        let next_day = TaskPatch {
            date: Some(Utc.with_ymd_and_hms(2025, 5, 3, 9, 0, 0).unwrap()),
            ..Default::default()
        };
        assert_eq!(
            diff(&task, &next_day, &[], &[]),
            vec![ChangeRecord::field("fecha", "2025-05-02", "2025-05-03")]
        );
    }

    #[test]
    fn test_merge_image_refs() {
        assert_eq!(merge_image_refs(&[1, 2], &[3], &[1]), vec![2, 3]);
        assert_eq!(merge_image_refs(&[4], &[5, 6], &[5]), vec![4, 6]);
        assert_eq!(merge_image_refs(&[1, 2], &[2, 2], &[]), vec![1, 2]);
    }

    #[test]
    fn test_effective_image_changes_drop_no_ops() {
        assert_eq!(
            effective_image_changes(&[1, 2], &[2], &[9]),
            (Vec::<EntityId>::new(), Vec::<EntityId>::new())
        );
        assert_eq!(effective_image_changes(&[1, 2], &[3, 3, 2], &[1]), (vec![3], vec![1]));
        assert_eq!(effective_image_changes(&[1], &[4], &[4]), (vec![], vec![]));
    }
}
