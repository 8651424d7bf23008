//! Shared fixtures for service tests

#![allow(dead_code)]

use feedbackhub_shared::models::user::{Role, UserIdentity};
use feedbackhub_shared::services::registration::{register, Registration};
use feedbackhub_shared::services::teams::add_member_to_own_team;
use feedbackhub_shared::store::memory::MemoryStore;
use feedbackhub_shared::store::Store;
use uuid::Uuid;

pub const PASSWORD: &str = "correct-horse-battery";
pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long!!";

pub async fn register_manager(store: &dyn Store, email: &str, team_name: &str) -> UserIdentity {
    register(
        store,
        Registration {
            email: email.to_string(),
            full_name: format!("Manager {}", email),
            password: PASSWORD.to_string(),
            role: Role::Manager,
            team_name: Some(team_name.to_string()),
            team_id: None,
        },
    )
    .await
    .expect("manager registration failed")
}

pub async fn register_employee(store: &dyn Store, email: &str) -> UserIdentity {
    register(
        store,
        Registration {
            email: email.to_string(),
            full_name: format!("Employee {}", email),
            password: PASSWORD.to_string(),
            role: Role::Employee,
            team_name: None,
            team_id: None,
        },
    )
    .await
    .expect("employee registration failed")
}

/// Current state of a user, after team changes
pub async fn refresh(store: &dyn Store, user_id: Uuid) -> UserIdentity {
    store
        .find_user(user_id)
        .await
        .expect("store failed")
        .expect("user missing")
        .identity()
}

/// A manager with one employee already in their team
pub async fn team_of_one(store: &MemoryStore) -> (UserIdentity, UserIdentity) {
    let manager = register_manager(store, "boss@example.com", "Platform").await;
    let employee = register_employee(store, "dev@example.com").await;
    add_member_to_own_team(store, &manager, employee.id)
        .await
        .expect("assignment failed");

    let employee = refresh(store, employee.id).await;
    (manager, employee)
}
