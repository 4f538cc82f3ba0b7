use feed_core::{toast_for, DetectionStatus, StatusEvent, SyncStatus, ToastLevel};

fn recovery(status: &str) -> StatusEvent {
    StatusEvent::Recovery {
        id: "claim-7".into(),
        status: status.into(),
    }
}

#[test]
fn detection_outcomes_toast() {
    let done = toast_for(&StatusEvent::Detection {
        id: "d1".into(),
        status: DetectionStatus::Complete,
    })
    .unwrap();
    assert_eq!(done.level, ToastLevel::Success);
    assert_eq!(done.title, "Detection completed");

    let failed = toast_for(&StatusEvent::Detection {
        id: "d1".into(),
        status: DetectionStatus::Failed,
    })
    .unwrap();
    assert_eq!(failed.level, ToastLevel::Error);
    assert_eq!(failed.title, "Detection failed");
}

#[test]
fn sync_progress_is_silent() {
    let progress = StatusEvent::Sync {
        id: "s1".into(),
        status: SyncStatus::InProgress,
        progress: Some(55),
    };
    assert_eq!(toast_for(&progress), None);

    let failed = toast_for(&StatusEvent::Sync {
        id: "s1".into(),
        status: SyncStatus::Failed,
        progress: None,
    })
    .unwrap();
    assert_eq!(failed.level, ToastLevel::Error);
    assert_eq!(failed.title, "Sync failed");
}

#[test]
fn recovery_labels_pick_level() {
    assert_eq!(toast_for(&recovery("Paid Out")).unwrap().level, ToastLevel::Success);
    assert_eq!(toast_for(&recovery(" approved ")).unwrap().level, ToastLevel::Success);
    assert_eq!(toast_for(&recovery("Denied")).unwrap().level, ToastLevel::Warning);
    let submitted = toast_for(&recovery("Submitted")).unwrap();
    assert_eq!(submitted.level, ToastLevel::Info);
    assert_eq!(submitted.body, "Claim claim-7: Submitted");
}
