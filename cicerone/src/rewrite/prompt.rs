use crate::personas::PersonaProfile;

/// Longest slice of the raw text the fallback template will carry.
const FALLBACK_CLIP_CHARS: usize = 480;

/// Assembles the persona-voice rewrite prompt.
pub fn build_rewrite_prompt(
    persona: &PersonaProfile,
    original_query: &str,
    raw_text: &str,
    has_reservable: bool,
) -> String {
    let reservation_hint = if has_reservable {
        "Mention that at least one spot is reservable with one tap."
    } else {
        ""
    };
    [
        persona.rewrite,
        reservation_hint,
        "",
        &format!("Original query: {original_query}"),
        &format!("Raw response: {raw_text}"),
        "",
        "Rewrite in character, keep business names and factual details intact. \
         Keep it short (2-3 sentences). Wrap business names in **double asterisks** for bolding.",
    ]
    .join("\n")
}

/// Deterministic persona framing used whenever generation fails: the raw
/// text clipped and prefixed, so the user always gets an in-character reply.
pub fn persona_fallback(persona: &PersonaProfile, raw_text: &str) -> String {
    let trimmed = raw_text.trim();
    let trimmed = if trimmed.is_empty() {
        "Lining up a few spots for you."
    } else {
        trimmed
    };
    let clipped: String = if trimmed.chars().count() > FALLBACK_CLIP_CHARS {
        let head: String = trimmed.chars().take(FALLBACK_CLIP_CHARS).collect();
        format!("{head}...")
    } else {
        trimmed.to_string()
    };
    format!("{} take: {clipped}", persona.name)
}
