//! System prompt rendering from the knowledge store.
//!
//! Both renderers are pure and deterministic: the same store always yields
//! byte-identical output. Rendering never fails; missing fields render as
//! empty text and an absent store degrades to [`FALLBACK_SYSTEM_PROMPT`].

use std::borrow::Cow;

use dostbot_core::knowledge::{Document, KnowledgeStore, MEDIA_COLLECTION, field_text};

/// Prompt used when no knowledge base is bundled.
pub const FALLBACK_SYSTEM_PROMPT: &str = "You are a helpful assistant for Dostbin Solutions.";

/// The product document whose description is the only source of pricing,
/// specification and delivery facts.
pub const AUTHORITATIVE_PRODUCT_ID: &str = "AUTHORITATIVE-PRODUCT-INFO-001";

/// Media summaries are cut to this many characters.
pub const SUMMARY_MAX_CHARS: usize = 150;

/// Bucket for media references without a category.
pub const FALLBACK_CATEGORY: &str = "Uncategorized";

const ROLE_AND_RULES: &str = "\
You are a helpful customer support assistant for Dostbin Solutions, India's first patented automatic compost bin company.

CRITICAL INSTRUCTIONS:
- Keep responses SHORT and CONCISE (2-3 sentences max for simple questions)
- Be friendly and professional
- Only answer questions about Dostbin products and services
- If asked about unrelated topics, politely redirect to Dostbin
- When relevant, suggest YouTube videos to help users learn more (don't force links on every response)
- Include YouTube links when users ask about: products, variants, composting process, setup, demos, or how things work

";

const AUTHORITY_DIRECTIVE: &str = "\
⚠️ IMPORTANT: For pricing, delivery time, and product specifications, ONLY use the information below. Ignore any conflicting information from other sources.

OFFICIAL DOSTBIN INFORMATION (USE THIS ONLY):

";

const CONTACT: &str = "\
Contact:
- Email: info@dostbin.com
- Phone: +918105868094, +919740374780
- Website: dostbin.com
- YouTube: https://www.youtube.com/@dostbin

";

const HOW_IT_WORKS: &str = "\
How it works:
1. Add kitchen waste daily with cocopeat powder
2. Bin automatically/manually mixes and aerates (depending on model)
3. Get compost in 20-30 days (two phases of 7-10 days each)
4. Leachate can be diluted 1:15 for liquid fertilizer

";

const FEATURES: &str = "\
Features:
- Odor-free operation with odor absorber
- Shred and digest buttons for easy operation (Premium model)
- Two-phase composting system
- Leachate collection for liquid fertilizer
- Made in India, Patented technology
- All variants: Up to 5 Kg/day waste capacity

";

const GUIDE_VIDEOS: &str = "\
COMPOSTING GUIDE VIDEOS:
- Composting basics: https://www.youtube.com/watch?v=b7jsXoghslQ
- Quick composting guide: https://www.youtube.com/shorts/yJSMnd9g2yo
";

const CLOSING_REMINDER: &str = "\
When users ask about tutorials, demos, setup, or how things work, ALWAYS provide specific YouTube video links.
Answer questions naturally and conversationally.";

/// Render the full system prompt.
pub fn render_system_prompt(store: Option<&KnowledgeStore>) -> String {
    let Some(store) = store else {
        return FALLBACK_SYSTEM_PROMPT.to_string();
    };

    let official_info = authoritative_description(store);
    let media = render_media_section(Some(store));

    let mut prompt = String::with_capacity(4096 + official_info.len() + media.len());
    prompt.push_str(ROLE_AND_RULES);
    prompt.push_str(AUTHORITY_DIRECTIVE);
    prompt.push_str(&official_info);
    prompt.push_str("\n\n");
    prompt.push_str(CONTACT);
    prompt.push_str(HOW_IT_WORKS);
    prompt.push_str(FEATURES);
    prompt.push_str(GUIDE_VIDEOS);
    prompt.push_str(&media);
    prompt.push_str("\n\n");
    prompt.push_str(CLOSING_REMINDER);
    prompt
}

/// Render the media references grouped by category.
///
/// Categories appear in first-seen order and items keep collection order
/// within their category. Empty when there is no media collection.
pub fn render_media_section(store: Option<&KnowledgeStore>) -> String {
    let Some(videos) = store.and_then(|s| s.collection(MEDIA_COLLECTION)) else {
        return String::new();
    };

    let mut out = String::from("\n\nAVAILABLE YOUTUBE VIDEOS:\n");

    for (category, items) in group_by_category(&videos) {
        out.push_str(&format!("\n{category}:\n"));
        for video in items {
            let summary = field_text(video, "content_summary");
            out.push_str(&format!(
                "- {}\n  URL: {}\n  Summary: {}...\n",
                field_text(video, "title"),
                field_text(video, "video_url"),
                truncate_chars(&summary, SUMMARY_MAX_CHARS),
            ));
        }
    }

    out
}

/// Description of the first product carrying the authoritative id.
pub fn authoritative_description(store: &KnowledgeStore) -> Cow<'_, str> {
    store
        .products()
        .into_iter()
        .find(|doc| doc.get("id").and_then(|v| v.as_str()) == Some(AUTHORITATIVE_PRODUCT_ID))
        .map(|doc| field_text(doc, "description"))
        .unwrap_or(Cow::Borrowed(""))
}

fn group_by_category<'a>(videos: &[&'a Document]) -> Vec<(Cow<'a, str>, Vec<&'a Document>)> {
    let mut groups: Vec<(Cow<'a, str>, Vec<&'a Document>)> = Vec::new();

    for &video in videos {
        let mut category = field_text(video, "category");
        if category.is_empty() {
            category = Cow::Borrowed(FALLBACK_CATEGORY);
        }

        match groups.iter().position(|(name, _)| *name == category) {
            Some(idx) => groups[idx].1.push(video),
            None => groups.push((category, vec![video])),
        }
    }

    groups
}

/// The first `max` characters of `s` (Unicode scalar values, not bytes).
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
