//! Tag vocabulary

use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};
use crate::models::tag::Tag;
use crate::store::Store;

/// Maximum tag name length in characters
pub const MAX_TAG_LENGTH: usize = 100;

/// Trims names, drops blanks and duplicates, keeps first-seen order
pub fn normalize_names(names: &[String]) -> ServiceResult<Vec<String>> {
    let mut out: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim();
        if name.is_empty() || out.iter().any(|n| n == name) {
            continue;
        }
        if name.chars().count() > MAX_TAG_LENGTH {
            return Err(ServiceError::Validation(format!(
                "Tag names must be at most {} characters",
                MAX_TAG_LENGTH
            )));
        }
        out.push(name.to_string());
    }
    Ok(out)
}

/// Returns one tag per distinct name, creating the missing ones
///
/// Safe under concurrency: two callers introducing the same new name
/// receive the same tag.
pub async fn get_or_create(store: &dyn Store, names: &[String]) -> ServiceResult<Vec<Tag>> {
    let names = normalize_names(names)?;
    if names.is_empty() {
        return Ok(Vec::new());
    }

    Ok(store.get_or_create_tags(&names).await?)
}

pub async fn list_tags(store: &dyn Store) -> ServiceResult<Vec<Tag>> {
    Ok(store.list_tags().await?)
}

/// Checks that every id names an existing tag; returns the distinct ids
pub async fn resolve_ids(store: &dyn Store, ids: &[Uuid]) -> ServiceResult<Vec<Uuid>> {
    let mut unique: Vec<Uuid> = ids.to_vec();
    unique.sort();
    unique.dedup();

    if unique.is_empty() {
        return Ok(unique);
    }

    let found = store.find_tags(&unique).await?;
    if found.len() != unique.len() {
        let missing: Vec<String> = unique
            .iter()
            .filter(|id| !found.iter().any(|t| &t.id == *id))
            .map(|id| id.to_string())
            .collect();
        return Err(ServiceError::Validation(format!(
            "Unknown tag id(s): {}",
            missing.join(", ")
        )));
    }

    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_names() {
        let names = vec![
            " Leadership ".to_string(),
            "".to_string(),
            "Leadership".to_string(),
            "Teamwork".to_string(),
        ];
        assert_eq!(
            normalize_names(&names).unwrap(),
            vec!["Leadership".to_string(), "Teamwork".to_string()]
        );
    }

    #[test]
    fn test_normalize_rejects_long_names() {
        let names = vec!["x".repeat(MAX_TAG_LENGTH + 1)];
        assert!(matches!(
            normalize_names(&names),
            Err(ServiceError::Validation(_))
        ));
    }
}
