//! Feedback lifecycle, tags, comments and notifications over the in-memory store

mod common;

use common::{register_employee, register_manager, team_of_one};
use feedbackhub_shared::models::feedback::{FeedbackChanges, Sentiment};
use feedbackhub_shared::models::user::UserIdentity;
use feedbackhub_shared::services::feedback::{
    acknowledge_feedback, add_comment, create_feedback, delete_feedback, export_report,
    get_feedback, list_comments, list_feedback, request_feedback, update_feedback, FeedbackInput,
};
use feedbackhub_shared::services::notifications::{list_notifications, mark_read};
use feedbackhub_shared::services::tags::{get_or_create, list_tags};
use feedbackhub_shared::services::teams::add_member_to_own_team;
use feedbackhub_shared::services::ServiceError;
use feedbackhub_shared::store::memory::MemoryStore;
use feedbackhub_shared::store::Store;
use uuid::Uuid;

async fn give_feedback(store: &MemoryStore, manager: &UserIdentity, employee: &UserIdentity) -> Uuid {
    create_feedback(
        store,
        manager,
        FeedbackInput {
            employee_id: employee.id,
            strengths: Some("Clear design docs".to_string()),
            areas_for_improvement: Some("Estimates".to_string()),
            sentiment: Some(Sentiment::Positive),
            ..Default::default()
        },
    )
    .await
    .expect("feedback creation failed")
    .id
}

#[tokio::test]
async fn test_create_feedback_notifies_employee() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;

    let feedback = create_feedback(
        &store,
        &manager,
        FeedbackInput {
            employee_id: employee.id,
            strengths: Some("Reliable".to_string()),
            tag_names: vec!["Teamwork".to_string()],
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(feedback.employee.id, employee.id);
    assert_eq!(feedback.manager.id, manager.id);
    assert!(!feedback.acknowledged);
    assert_eq!(feedback.tags.len(), 1);
    assert_eq!(feedback.tags[0].name, "Teamwork");

    let inbox = list_notifications(&store, &employee).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(
        inbox[0].message,
        format!("{} has given you new feedback.", manager.full_name)
    );
    assert!(!inbox[0].is_read);
}

#[tokio::test]
async fn test_feedback_outside_team_forbidden() {
    let store = MemoryStore::new();
    let manager = register_manager(&store, "boss@example.com", "Platform").await;
    let stranger = register_employee(&store, "stranger@example.com").await;

    let result = create_feedback(
        &store,
        &manager,
        FeedbackInput {
            employee_id: stranger.id,
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let result = create_feedback(
        &store,
        &manager,
        FeedbackInput {
            employee_id: Uuid::new_v4(),
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));

    let result = create_feedback(
        &store,
        &stranger,
        FeedbackInput {
            employee_id: stranger.id,
            ..Default::default()
        },
    )
    .await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn test_rejected_feedback_creates_no_tags() {
    let store = MemoryStore::new();
    let manager = register_manager(&store, "boss@example.com", "Platform").await;
    let other = register_manager(&store, "other@example.com", "Growth").await;
    let stranger = register_employee(&store, "stranger@example.com").await;
    add_member_to_own_team(&store, &other, stranger.id).await.unwrap();

    let result = create_feedback(
        &store,
        &manager,
        FeedbackInput {
            employee_id: stranger.id,
            tag_names: vec!["Ghost".to_string()],
            ..Default::default()
        },
    )
    .await;

    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    assert!(list_tags(&store).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_tag_id_rejected() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;

    let result = create_feedback(
        &store,
        &manager,
        FeedbackInput {
            employee_id: employee.id,
            tag_ids: vec![Uuid::new_v4()],
            ..Default::default()
        },
    )
    .await;

    assert!(matches!(result, Err(ServiceError::Validation(_))));
    assert!(list_feedback(&store, &manager).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_feedback_visible_to_parties_only() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;
    let outsider = register_employee(&store, "outsider@example.com").await;
    let feedback_id = give_feedback(&store, &manager, &employee).await;

    assert!(get_feedback(&store, &manager, feedback_id).await.is_ok());
    assert!(get_feedback(&store, &employee, feedback_id).await.is_ok());
    assert!(matches!(
        get_feedback(&store, &outsider, feedback_id).await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        get_feedback(&store, &manager, Uuid::new_v4()).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_list_scoped_by_role_newest_first() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;

    let first = give_feedback(&store, &manager, &employee).await;
    let second = give_feedback(&store, &manager, &employee).await;

    let written: Vec<Uuid> = list_feedback(&store, &manager)
        .await
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();
    let received: Vec<Uuid> = list_feedback(&store, &employee)
        .await
        .unwrap()
        .iter()
        .map(|f| f.id)
        .collect();

    assert_eq!(written, vec![second, first]);
    assert_eq!(received, written);

    let other = register_manager(&store, "other@example.com", "Growth").await;
    assert!(list_feedback(&store, &other).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_acknowledge_twice_notifies_twice() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;
    let feedback_id = give_feedback(&store, &manager, &employee).await;

    let first = acknowledge_feedback(&store, &employee, feedback_id).await.unwrap();
    let second = acknowledge_feedback(&store, &employee, feedback_id).await.unwrap();
    assert!(first.acknowledged);
    assert!(second.acknowledged);

    let inbox = list_notifications(&store, &manager).await.unwrap();
    let acks = inbox
        .iter()
        .filter(|n| n.message == format!("{} has acknowledged your feedback.", employee.full_name))
        .count();
    assert_eq!(acks, 2);
}

#[tokio::test]
async fn test_only_recipient_acknowledges() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;
    let feedback_id = give_feedback(&store, &manager, &employee).await;

    assert!(matches!(
        acknowledge_feedback(&store, &manager, feedback_id).await,
        Err(ServiceError::Forbidden(_))
    ));
    let feedback = get_feedback(&store, &employee, feedback_id).await.unwrap();
    assert!(!feedback.acknowledged);
}

#[tokio::test]
async fn test_get_or_create_tags_is_stable() {
    let store = MemoryStore::new();
    let request = vec![
        "Leadership".to_string(),
        "Leadership".to_string(),
        "Teamwork".to_string(),
    ];

    let first = get_or_create(&store, &request).await.unwrap();
    let second = get_or_create(&store, &request).await.unwrap();

    let mut first_ids: Vec<Uuid> = first.iter().map(|t| t.id).collect();
    let mut second_ids: Vec<Uuid> = second.iter().map(|t| t.id).collect();
    first_ids.sort();
    second_ids.sort();

    assert_eq!(first_ids.len(), 2);
    assert_eq!(first_ids, second_ids);
    assert_eq!(list_tags(&store).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_tag_ids_replace_or_keep() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;
    let tags = get_or_create(&store, &["Leadership".to_string(), "Teamwork".to_string()])
        .await
        .unwrap();

    let feedback = create_feedback(
        &store,
        &manager,
        FeedbackInput {
            employee_id: employee.id,
            tag_ids: tags.iter().map(|t| t.id).collect(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(feedback.tags.len(), 2);

    // Omitted tag_ids leave tags alone
    let updated = update_feedback(
        &store,
        &manager,
        feedback.id,
        FeedbackChanges {
            strengths: Some("Mentoring".to_string()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(updated.strengths.as_deref(), Some("Mentoring"));
    assert_eq!(updated.tags.len(), 2);

    // Empty tag_ids clear them
    let cleared = update_feedback(
        &store,
        &manager,
        feedback.id,
        FeedbackChanges {
            tag_ids: Some(Vec::new()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert!(cleared.tags.is_empty());
    assert_eq!(cleared.strengths.as_deref(), Some("Mentoring"));

    // Tags themselves survive
    assert_eq!(list_tags(&store).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_only_author_updates_or_deletes() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;
    let other = register_manager(&store, "other@example.com", "Growth").await;
    let feedback_id = give_feedback(&store, &manager, &employee).await;

    let result = update_feedback(&store, &other, feedback_id, FeedbackChanges::default()).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let result = update_feedback(&store, &employee, feedback_id, FeedbackChanges::default()).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));

    let result = delete_feedback(&store, &other, feedback_id).await;
    assert!(matches!(result, Err(ServiceError::Forbidden(_))));
}

#[tokio::test]
async fn test_delete_cascades_comments() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;
    let feedback_id = give_feedback(&store, &manager, &employee).await;
    add_comment(&store, &employee, feedback_id, "Thanks").await.unwrap();

    delete_feedback(&store, &manager, feedback_id).await.unwrap();

    assert!(store.find_feedback(feedback_id).await.unwrap().is_none());
    assert!(store.list_comments(feedback_id).await.unwrap().is_empty());
    assert!(matches!(
        delete_feedback(&store, &manager, feedback_id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_comments_notify_other_party() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;
    let outsider = register_employee(&store, "outsider@example.com").await;
    let feedback_id = give_feedback(&store, &manager, &employee).await;

    let comment = add_comment(&store, &employee, feedback_id, "  Thanks, noted.  ")
        .await
        .unwrap();
    assert_eq!(comment.content, "Thanks, noted.");
    assert_eq!(comment.user.id, employee.id);
    add_comment(&store, &manager, feedback_id, "Great").await.unwrap();

    let thread = list_comments(&store, &manager, feedback_id).await.unwrap();
    let contents: Vec<&str> = thread.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["Thanks, noted.", "Great"]);

    let manager_inbox = list_notifications(&store, &manager).await.unwrap();
    assert_eq!(
        manager_inbox[0].message,
        format!("{} commented on your feedback.", employee.full_name)
    );
    let employee_inbox = list_notifications(&store, &employee).await.unwrap();
    assert_eq!(
        employee_inbox[0].message,
        format!("{} commented on your feedback.", manager.full_name)
    );

    assert!(matches!(
        add_comment(&store, &outsider, feedback_id, "Hi").await,
        Err(ServiceError::Forbidden(_))
    ));
    assert!(matches!(
        add_comment(&store, &employee, feedback_id, "   ").await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        add_comment(&store, &employee, feedback_id, &"x".repeat(2001)).await,
        Err(ServiceError::Validation(_))
    ));
}

#[tokio::test]
async fn test_request_feedback() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;
    let loner = register_employee(&store, "loner@example.com").await;

    request_feedback(&store, &employee).await.unwrap();
    let inbox = list_notifications(&store, &manager).await.unwrap();
    assert_eq!(
        inbox[0].message,
        format!("{} has requested feedback.", employee.full_name)
    );

    assert!(matches!(
        request_feedback(&store, &loner).await,
        Err(ServiceError::Validation(_))
    ));
    assert!(matches!(
        request_feedback(&store, &manager).await,
        Err(ServiceError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_mark_read_requires_owner() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;
    give_feedback(&store, &manager, &employee).await;

    let notification = list_notifications(&store, &employee).await.unwrap().remove(0);

    assert!(matches!(
        mark_read(&store, &manager, notification.id).await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(!list_notifications(&store, &employee).await.unwrap()[0].is_read);

    let read = mark_read(&store, &employee, notification.id).await.unwrap();
    assert!(read.is_read);
}

#[tokio::test]
async fn test_export_report() {
    let store = MemoryStore::new();
    let (manager, employee) = team_of_one(&store).await;

    assert!(matches!(
        export_report(&store, &employee).await,
        Err(ServiceError::NotFound(_))
    ));

    give_feedback(&store, &manager, &employee).await;
    let pdf = export_report(&store, &employee).await.unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_full_feedback_cycle() {
    let store = MemoryStore::new();
    let manager = register_manager(&store, "maria@example.com", "Platform").await;
    let employee = register_employee(&store, "ed@example.com").await;

    feedbackhub_shared::services::teams::add_member_to_own_team(&store, &manager, employee.id)
        .await
        .unwrap();

    let feedback = create_feedback(
        &store,
        &manager,
        FeedbackInput {
            employee_id: employee.id,
            strengths: Some("Owns incidents end to end".to_string()),
            sentiment: Some(Sentiment::Positive),
            tag_names: vec!["Leadership".to_string()],
            ..Default::default()
        },
    )
    .await
    .unwrap();

    add_comment(&store, &employee, feedback.id, "Thank you!").await.unwrap();
    acknowledge_feedback(&store, &employee, feedback.id).await.unwrap();

    let received = list_feedback(&store, &employee).await.unwrap();
    assert_eq!(received.len(), 1);
    let view = &received[0];
    assert!(view.acknowledged);
    assert_eq!(view.comments.len(), 1);
    assert_eq!(view.comments[0].user.id, employee.id);
    assert_eq!(view.tags[0].name, "Leadership");
    assert_eq!(view.sentiment, Some(Sentiment::Positive));

    let manager_inbox = list_notifications(&store, &manager).await.unwrap();
    assert_eq!(manager_inbox.len(), 2);
    assert!(manager_inbox[0].message.contains("acknowledged"));
    assert!(manager_inbox[1].message.contains("commented"));
}
