use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::{Entity, RawBusiness, RawRecord};

use super::SlotRegistry;

/// Flattens raw chat-response records into a deduplicated, summary-enriched,
/// rating-sorted entity list. Reservable entities get a memoized mock slot
/// list from `slots`.
pub fn normalize_entities(raw: &[RawRecord], slots: &SlotRegistry) -> Vec<Entity> {
    let mut flattened = Vec::new();

    for record in raw {
        let container = &record.record;
        if record.businesses.is_empty() {
            flattened.push(build_entity(container, container, slots));
        } else {
            for business in &record.businesses {
                flattened.push(build_entity(business, container, slots));
            }
        }
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut deduped: Vec<Entity> = Vec::new();
    for entity in flattened {
        let Some(key) = entity.identity_key() else {
            continue;
        };
        if seen.insert(key.to_string()) {
            deduped.push(entity);
        }
    }

    // Stable sort keeps input order among equal ratings
    deduped.sort_by(|a, b| {
        let left = b.rating.unwrap_or(0.0);
        let right = a.rating.unwrap_or(0.0);
        left.partial_cmp(&right).unwrap_or(Ordering::Equal)
    });

    deduped
}

fn build_entity(business: &RawBusiness, container: &RawBusiness, slots: &SlotRegistry) -> Entity {
    let summary = business
        .contextual_info
        .as_ref()
        .and_then(|info| info.summary.clone())
        .or_else(|| {
            business
                .summaries
                .as_ref()
                .and_then(|summaries| summaries.short.clone())
        })
        .or_else(|| {
            business
                .attributes
                .as_ref()
                .and_then(|attrs| attrs.biz_summary.as_ref())
                .and_then(|biz| biz.summary.clone())
        })
        .or_else(|| {
            container
                .contextual_info
                .as_ref()
                .and_then(|info| info.summary.clone())
        })
        .or_else(|| {
            container
                .summaries
                .as_ref()
                .and_then(|summaries| summaries.short.clone())
        });

    let mut entity = Entity {
        id: business.id.clone(),
        name: business.name.clone(),
        url: business.url.clone(),
        phone: business.phone.clone(),
        rating: business.rating,
        price: business.price.clone(),
        distance: business.distance,
        location: business.location.clone(),
        coordinates: business.coordinates,
        categories: business
            .categories
            .clone()
            .or_else(|| container.categories.clone())
            .unwrap_or_default(),
        reservation_url: business
            .reservation_url
            .clone()
            .or_else(|| container.reservation_url.clone()),
        actions: business
            .actions
            .clone()
            .or_else(|| container.actions.clone())
            .unwrap_or_default(),
        summary,
        mock_slots: None,
    };

    if entity.is_reservable() {
        // Slot cache is keyed by id, else name; anonymous entities get none
        if let Some(key) = entity.id.as_deref().or(entity.name.as_deref()) {
            entity.mock_slots = Some(slots.slots_for(key));
        }
    }

    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_records(value: serde_json::Value) -> Vec<RawRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_flattens_containers_and_flat_records() {
        let raw = parse_records(json!([
            {
                "businesses": [
                    { "id": "b1", "name": "Starlight Bar", "rating": 4.0 },
                    { "id": "b2", "name": "Moonrise Cafe", "rating": 4.5 }
                ]
            },
            { "id": "b3", "name": "Quiet Corner", "rating": 3.5 }
        ]));

        let entities = normalize_entities(&raw, &SlotRegistry::new());
        assert_eq!(entities.len(), 3);
        // Sorted by rating descending
        assert_eq!(entities[0].name.as_deref(), Some("Moonrise Cafe"));
        assert_eq!(entities[1].name.as_deref(), Some("Starlight Bar"));
        assert_eq!(entities[2].name.as_deref(), Some("Quiet Corner"));
    }

    #[test]
    fn test_dedup_keeps_first_seen_record_entirely() {
        // Same identifier across two differently-shaped records: the
        // first-seen record wins whole, including its rating.
        let raw = parse_records(json!([
            { "id": "b1", "name": "Starlight Bar", "rating": 3.0 },
            {
                "businesses": [
                    { "id": "b1", "name": "Starlight Bar", "rating": 5.0 },
                    { "id": "b2", "name": "Moonrise Cafe", "rating": 4.0 }
                ]
            }
        ]));

        let entities = normalize_entities(&raw, &SlotRegistry::new());
        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].name.as_deref(), Some("Moonrise Cafe"));
        let starlight = &entities[1];
        assert_eq!(starlight.id.as_deref(), Some("b1"));
        assert_eq!(starlight.rating, Some(3.0));
    }

    #[test]
    fn test_dedup_falls_back_to_name_then_url() {
        let raw = parse_records(json!([
            { "name": "Starlight Bar" },
            { "name": "Starlight Bar" },
            { "url": "https://example.com/a" },
            { "url": "https://example.com/a" },
            {}
        ]));

        let entities = normalize_entities(&raw, &SlotRegistry::new());
        // Anonymous record (no id/name/url) is dropped
        assert_eq!(entities.len(), 2);
    }

    #[test]
    fn test_summary_priority_with_container_fallback() {
        let raw = parse_records(json!([
            {
                "contextual_info": { "summary": "container summary" },
                "summaries": { "short": "container short" },
                "businesses": [
                    {
                        "id": "b1",
                        "name": "Starlight Bar",
                        "contextual_info": { "summary": "own summary" }
                    },
                    {
                        "id": "b2",
                        "name": "Moonrise Cafe",
                        "attributes": { "biz_summary": { "summary": "attr summary" } }
                    },
                    { "id": "b3", "name": "Quiet Corner" }
                ]
            }
        ]));

        let entities = normalize_entities(&raw, &SlotRegistry::new());
        let by_id = |id: &str| {
            entities
                .iter()
                .find(|e| e.id.as_deref() == Some(id))
                .unwrap()
        };
        assert_eq!(by_id("b1").summary.as_deref(), Some("own summary"));
        assert_eq!(by_id("b2").summary.as_deref(), Some("attr summary"));
        assert_eq!(by_id("b3").summary.as_deref(), Some("container summary"));
    }

    #[test]
    fn test_reservable_entities_get_stable_slots() {
        let slots = SlotRegistry::new();
        let raw = parse_records(json!([
            {
                "id": "b1",
                "name": "Starlight Bar",
                "reservation_url": "https://book.example.com/b1"
            },
            {
                "id": "b2",
                "name": "Moonrise Cafe",
                "actions": [ { "type": "reservation", "url": "https://book.example.com/b2" } ]
            },
            { "id": "b3", "name": "Quiet Corner" }
        ]));

        let first = normalize_entities(&raw, &slots);
        let reservable: Vec<_> = first.iter().filter(|e| e.mock_slots.is_some()).collect();
        assert_eq!(reservable.len(), 2);
        for entity in &reservable {
            assert!(!entity.mock_slots.as_ref().unwrap().is_empty());
        }
        let plain = first
            .iter()
            .find(|e| e.id.as_deref() == Some("b3"))
            .unwrap();
        assert!(plain.mock_slots.is_none());

        // Re-normalizing with the same registry reuses the same slot lists
        let second = normalize_entities(&raw, &slots);
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.mock_slots, b.mock_slots);
        }
    }

    #[test]
    fn test_container_reservation_fields_apply_to_nested_businesses() {
        let raw = parse_records(json!([
            {
                "reservation_url": "https://book.example.com/shared",
                "businesses": [ { "id": "b1", "name": "Starlight Bar" } ]
            }
        ]));

        let entities = normalize_entities(&raw, &SlotRegistry::new());
        assert_eq!(
            entities[0].reservation_url.as_deref(),
            Some("https://book.example.com/shared")
        );
        assert!(entities[0].mock_slots.is_some());
    }

    #[test]
    fn test_missing_rating_sorts_last_and_stably() {
        let raw = parse_records(json!([
            { "id": "b1", "name": "First Unrated" },
            { "id": "b2", "name": "Rated", "rating": 4.0 },
            { "id": "b3", "name": "Second Unrated" }
        ]));

        let entities = normalize_entities(&raw, &SlotRegistry::new());
        assert_eq!(entities[0].id.as_deref(), Some("b2"));
        assert_eq!(entities[1].id.as_deref(), Some("b1"));
        assert_eq!(entities[2].id.as_deref(), Some("b3"));
    }
}
