use super::test_util::prepare_db_and_test;
use crate::domain::DrivenPortError;
use crate::domain::task::driven_ports::{TaskReader, TaskWriter};
use crate::domain::task::{CreateTask, TaskFilter, TaskStatus, UpdateTask};
use crate::persistence::ExternalConnectivity;
use crate::persistence::db_task_driven_ports::{DbTaskReader, DbTaskWriter};
use speculoos::prelude::*;

fn new_task(title: &str, status: Option<&str>) -> CreateTask {
    CreateTask {
        title: title.to_owned(),
        description: None,
        status: status.map(str::to_owned),
        priority: 0,
    }
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn create_defaults_status_and_sets_timestamps() {
    prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db);

        let created = DbTaskWriter
            .create(&new_task("Write tests", None), &mut ext_cxn)
            .await
            .expect("create should succeed");

        assert_eq!(TaskStatus::Pending, created.status);
        assert_eq!(None, created.description);
        assert!(created.id > 0);
        assert_eq!(created.created_at, created.updated_at);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn sparse_update_touches_only_present_fields() {
    prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db);
        let mut original = new_task("Paint fence", Some("in_progress"));
        original.description = Some("Two coats".to_owned());
        let created = DbTaskWriter
            .create(&original, &mut ext_cxn)
            .await
            .expect("create should succeed");

        let updated = DbTaskWriter
            .update(
                created.id,
                &UpdateTask {
                    priority: Some(9),
                    ..UpdateTask::default()
                },
                &mut ext_cxn,
            )
            .await
            .expect("update should succeed");

        assert_eq!(9, updated.priority);
        assert_eq!("Paint fence", updated.title);
        assert_eq!(Some("Two coats".to_owned()), updated.description);
        assert_eq!(TaskStatus::InProgress, updated.status);
        assert!(updated.updated_at > created.updated_at);

        let cleared = DbTaskWriter
            .update(
                created.id,
                &UpdateTask {
                    description: Some(None),
                    ..UpdateTask::default()
                },
                &mut ext_cxn,
            )
            .await
            .expect("update should succeed");
        assert_eq!(None, cleared.description);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn empty_update_returns_row_unchanged() {
    prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db);
        let created = DbTaskWriter
            .create(&new_task("Leave me alone", None), &mut ext_cxn)
            .await
            .expect("create should succeed");

        let unchanged = DbTaskWriter
            .update(created.id, &UpdateTask::default(), &mut ext_cxn)
            .await
            .expect("empty update should succeed");

        assert_eq!(created, unchanged);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn missing_rows_are_reported() {
    prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db);
        let patch = UpdateTask {
            title: Some("Nope".to_owned()),
            ..UpdateTask::default()
        };

        let get_result = DbTaskReader.get_by_id(404, &mut ext_cxn).await;
        let update_result = DbTaskWriter.update(404, &patch, &mut ext_cxn).await;
        let delete_result = DbTaskWriter.delete(404, &mut ext_cxn).await;

        assert!(matches!(get_result, Err(DrivenPortError::DoesNotExist)));
        assert!(matches!(update_result, Err(DrivenPortError::DoesNotExist)));
        assert!(matches!(delete_result, Err(DrivenPortError::DoesNotExist)));
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn lists_newest_first_with_filter_and_paging() {
    prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db);
        for (title, status) in [
            ("first", "pending"),
            ("second", "completed"),
            ("third", "pending"),
        ] {
            DbTaskWriter
                .create(&new_task(title, Some(status)), &mut ext_cxn)
                .await
                .expect("create should succeed");
        }

        let everything = DbTaskReader
            .get_all(
                &TaskFilter {
                    status: None,
                    limit: 10,
                    offset: 0,
                },
                &mut ext_cxn,
            )
            .await
            .expect("listing should succeed");
        let titles: Vec<&str> = everything.iter().map(|task| task.title.as_str()).collect();
        assert_eq!(vec!["third", "second", "first"], titles);

        let pending_page = DbTaskReader
            .get_all(
                &TaskFilter {
                    status: Some(TaskStatus::Pending),
                    limit: 1,
                    offset: 1,
                },
                &mut ext_cxn,
            )
            .await
            .expect("listing should succeed");
        assert_that!(pending_page).has_length(1);
        assert_eq!("first", pending_page[0].title);
    });
}

#[test]
#[cfg_attr(not(feature = "integration_test"), ignore)]
fn deleted_task_is_gone() {
    prepare_db_and_test(|db| async move {
        let mut ext_cxn = ExternalConnectivity::new(db);
        let created = DbTaskWriter
            .create(&new_task("Short lived", None), &mut ext_cxn)
            .await
            .expect("create should succeed");

        DbTaskWriter
            .delete(created.id, &mut ext_cxn)
            .await
            .expect("delete should succeed");

        let fetch_result = DbTaskReader.get_by_id(created.id, &mut ext_cxn).await;
        assert!(matches!(fetch_result, Err(DrivenPortError::DoesNotExist)));
    });
}
