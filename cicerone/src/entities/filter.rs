use regex::Regex;

use crate::models::Entity;

/// How many top-rated entities to surface when the text mentions none.
const UNMATCHED_FALLBACK_LIMIT: usize = 5;

/// Selects the entities actually referenced in the persona-voiced text,
/// ordered by first mention. Three escalating match strategies per entity;
/// if nothing matches anywhere, falls back to the first five entities of
/// the input (assumed pre-sorted by rating).
pub fn filter_entities_by_text(text: &str, entities: Vec<Entity>) -> Vec<Entity> {
    if text.is_empty() {
        return entities;
    }
    let lowered = text.to_lowercase();
    let article = Regex::new(r"^(?:the|a|an)\s+").expect("static pattern");

    let mut matches: Vec<(usize, usize)> = Vec::new();

    for (position, entity) in entities.iter().enumerate() {
        let Some(name) = entity.name.as_deref() else {
            continue;
        };
        let name = name.to_lowercase();
        if name.is_empty() {
            continue;
        }

        // 1. Exact match
        let mut index = lowered.find(&name);

        // 2. Cleaned match: strip a leading article, drop any " - " suffix
        if index.is_none() {
            let cleaned = article.replace(&name, "");
            let cleaned = cleaned.split(" - ").next().unwrap_or("").trim();
            if cleaned.len() > 3 {
                index = lowered.find(cleaned);
            }
        }

        // 3. First word alone, when distinctive enough
        if index.is_none() {
            if let Some(first_word) = name.split(' ').next() {
                if first_word.len() >= 4 {
                    index = lowered.find(first_word);
                }
            }
        }

        if let Some(at) = index {
            matches.push((at, position));
        }
    }

    // Order of first mention; stable for entities sharing an index
    matches.sort_by_key(|(at, _)| *at);

    if !matches.is_empty() {
        return matches
            .into_iter()
            .map(|(_, position)| entities[position].clone())
            .collect();
    }

    entities
        .into_iter()
        .take(UNMATCHED_FALLBACK_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str) -> Entity {
        Entity {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_match_filters_to_mentioned_entity() {
        let entities = vec![entity("Starlight Bar"), entity("Moonrise Cafe")];
        let result =
            filter_entities_by_text("You should try Starlight Bar tonight.", entities);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name.as_deref(), Some("Starlight Bar"));
    }

    #[test]
    fn test_mention_order_wins_over_input_order() {
        let entities = vec![entity("Starlight Bar"), entity("Moonrise Cafe")];
        let result = filter_entities_by_text(
            "Start at Moonrise Cafe, then end the night at Starlight Bar.",
            entities,
        );
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name.as_deref(), Some("Moonrise Cafe"));
        assert_eq!(result[1].name.as_deref(), Some("Starlight Bar"));
    }

    #[test]
    fn test_cleaned_match_strips_article_and_suffix() {
        let entities = vec![entity("The Dutch - SoHo")];
        let result = filter_entities_by_text("brunch at dutch is worth it", entities);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_first_word_match_requires_four_chars() {
        let hit = filter_entities_by_text(
            "grab a kinwich on the way",
            vec![entity("Kinwich Sandwich Shop")],
        );
        assert_eq!(hit.len(), 1);

        // Two-letter first word never matches alone; with six candidates the
        // no-match fallback caps at five.
        let entities: Vec<Entity> = (0..6)
            .map(|i| entity(&format!("Bo Place {i}")))
            .collect();
        let result = filter_entities_by_text("nothing relevant here", entities);
        assert_eq!(result.len(), 5);
    }

    #[test]
    fn test_no_match_falls_back_to_first_five() {
        let entities: Vec<Entity> = (0..7)
            .map(|i| entity(&format!("Unmentioned Venue {i}")))
            .collect();
        let result = filter_entities_by_text("totally unrelated text", entities.clone());
        assert_eq!(result.len(), 5);
        assert_eq!(result[0], entities[0]);
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let result = filter_entities_by_text(
            "STARLIGHT BAR is calling",
            vec![entity("Starlight Bar")],
        );
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_empty_text_returns_input_unchanged() {
        let entities = vec![entity("Starlight Bar"), entity("Moonrise Cafe")];
        let result = filter_entities_by_text("", entities.clone());
        assert_eq!(result, entities);
    }
}
