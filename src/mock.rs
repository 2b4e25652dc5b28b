//! Substitute content used when the remote API cannot answer.
//!
//! Tables are opaque presentation filler. Selection among several candidates
//! is uniform-random; callers must never depend on which one is picked.

use rand::seq::IndexedRandom;

use crate::remote::types::CulturalContext;

pub const MOCK_STORIES: &[&str] = &[
    "In the heart of Rajasthan's vibrant markets, Master Weaver Rajesh Singh creates intricate textiles that tell stories of generations past. Each thread woven with the wisdom of his ancestors, his handloom produces fabrics that connect tradition with modern elegance. From wedding saris that shimmer like desert stars to wall hangings that capture the essence of Indian heritage, Rajesh's work bridges the gap between cultural authenticity and contemporary design.",
    "Deep in the coastal villages of Kerala, potter Ammini crafts earthenware vessels that have served families for centuries. Her hands, shaped by years of working with clay from the backwaters, create pots that hold not just water but the stories of monsoon rains and harvest festivals. Each piece is a testament to sustainable craftsmanship, using local materials and traditional firing techniques that have been perfected over generations.",
    "In the mountainous regions of Himachal Pradesh, woodcarver Prem Sharma transforms cedar wood into intricate sculptures that adorn temples and homes across India. His workshop, filled with the scent of fresh wood and the sound of chisels meeting timber, produces pieces that range from devotional idols to decorative home accents. Each carving tells a story of devotion, skill, and the deep connection between artisan and material.",
];

pub const MOCK_MOCKUP_DESCRIPTION: &str = "Professional product mockup for artisan craft. The mockup would create a studio-quality product photograph with proper lighting, background, and presentation suitable for e-commerce and marketing use.";

pub const DEFAULT_TRANSCRIPTION_LANGUAGE: &str = "en";

pub const MOCK_TRANSCRIPTIONS: &[(&str, &str)] = &[
    (
        "en",
        "I am a skilled artisan who creates beautiful handcrafted items. My work tells stories of my culture and heritage.",
    ),
    (
        "hi",
        "मैं एक कुशल कारीगर हूं जो सुंदर हस्तनिर्मित वस्तुएं बनाता हूं। मेरा काम मेरी संस्कृति और विरासत की कहानियां सुनाता है।",
    ),
    (
        "te",
        "నేను అందమైన చేతితయారు వస్తువులను తయారు చేసే నైపుణ్యం ఉన్న కారిగరుడిని. నా పని నా సంస్కృతి మరియు వారసత్వం కథలను చెబుతుంది.",
    ),
    (
        "ta",
        "நான் அழகான கைவினைப் பொருட்களை உருவாக்கும் திறமையான கைவினைஞர். என் வேலை என் கலாச்சாரம் மற்றும் மரபின் கதைகளைச் சொல்கிறது.",
    ),
];

pub const MOCK_CHAT_REPLIES: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "I'd be happy to help you with that product!",
            "That's a great choice! Let me provide more details.",
            "Thank you for your interest. How can I assist you further?",
            "I understand your requirements. Let me check availability.",
        ],
    ),
    (
        "hi",
        &[
            "मैं आपकी मदद करने में खुशी होगी!",
            "यह एक बढ़िया चुनाव है! मैं और विवरण प्रदान करता हूं।",
            "आपकी रुचि के लिए धन्यवाद। मैं आपकी आगे कैसे मदद कर सकता हूं?",
            "मैं आपकी आवश्यकताओं को समझता हूं। उपलब्धता जांचने दें।",
        ],
    ),
    (
        "es",
        &[
            "¡Me encantaría ayudarte con ese producto!",
            "¡Esa es una gran elección! Déjame proporcionarte más detalles.",
            "Gracias por tu interés. ¿Cómo puedo ayudarte más?",
            "Entiendo tus requerimientos. Déjame verificar la disponibilidad.",
        ],
    ),
    (
        "fr",
        &[
            "Je serais ravi de vous aider avec ce produit !",
            "C'est un excellent choix ! Laissez-moi vous fournir plus de détails.",
            "Merci pour votre intérêt. Comment puis-je vous aider davantage ?",
            "Je comprends vos besoins. Laissez-moi vérifier la disponibilité.",
        ],
    ),
    (
        "de",
        &[
            "Ich würde mich freuen, Ihnen bei diesem Produkt zu helfen!",
            "Das ist eine großartige Wahl! Lassen Sie mich Ihnen mehr Details geben.",
            "Vielen Dank für Ihr Interesse. Wie kann ich Ihnen weiterhelfen?",
            "Ich verstehe Ihre Anforderungen. Lassen Sie mich die Verfügbarkeit prüfen.",
        ],
    ),
];

/// Exact-phrase buyer-chat translations.
pub const MOCK_PHRASES: &[(&str, &[(&str, &str)])] = &[
    (
        "hi",
        &[
            ("Hello", "नमस्ते"),
            ("How are you?", "आप कैसे हैं?"),
            ("Thank you", "धन्यवाद"),
            ("Please", "कृपया"),
            ("Yes", "हाँ"),
            ("No", "नहीं"),
        ],
    ),
    (
        "es",
        &[
            ("Hello", "Hola"),
            ("How are you?", "¿Cómo estás?"),
            ("Thank you", "Gracias"),
            ("Please", "Por favor"),
            ("Yes", "Sí"),
            ("No", "No"),
        ],
    ),
    (
        "fr",
        &[
            ("Hello", "Bonjour"),
            ("How are you?", "Comment allez-vous?"),
            ("Thank you", "Merci"),
            ("Please", "S'il vous plaît"),
            ("Yes", "Oui"),
            ("No", "Non"),
        ],
    ),
    (
        "de",
        &[
            ("Hello", "Hallo"),
            ("How are you?", "Wie geht es Ihnen?"),
            ("Thank you", "Danke"),
            ("Please", "Bitte"),
            ("Yes", "Ja"),
            ("No", "Nein"),
        ],
    ),
];

/// Uniform pick from a non-empty candidate set.
#[must_use]
pub fn pick<'a>(candidates: &[&'a str]) -> &'a str {
    candidates.choose(&mut rand::rng()).copied().unwrap_or_default()
}

#[must_use]
pub fn story() -> String {
    pick(MOCK_STORIES).to_string()
}

/// Context shown alongside a substituted story.
#[must_use]
pub fn story_context() -> CulturalContext {
    CulturalContext::new("north_india", "textiles", "traditional_craftsmanship")
}

/// Transcription for `language`, or the English one when absent.
#[must_use]
pub fn transcription(language: &str) -> String {
    lookup(MOCK_TRANSCRIPTIONS, language)
        .or_else(|| lookup(MOCK_TRANSCRIPTIONS, DEFAULT_TRANSCRIPTION_LANGUAGE))
        .unwrap_or_default()
        .to_string()
}

#[must_use]
pub fn chat_reply(language: &str) -> String {
    let replies = lookup(MOCK_CHAT_REPLIES, language)
        .or_else(|| lookup(MOCK_CHAT_REPLIES, "en"))
        .unwrap_or_default();
    pick(replies).to_string()
}

/// Phrase-table translation used by the buyer chat.
#[must_use]
pub fn phrase_translation(text: &str, from: &str, to: &str) -> String {
    if from == to {
        return text.to_string();
    }
    lookup(MOCK_PHRASES, to)
        .and_then(|phrases| lookup(phrases, text))
        .map_or_else(|| format!("[Translated to {to}]: {text}"), str::to_string)
}

/// Fallback for free-text translation.
#[must_use]
pub fn tagged_translation(text: &str, target: &str) -> String {
    format!("[{target}] {text}")
}

fn lookup<T: Copy>(table: &[(&str, T)], key: &str) -> Option<T> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

#[cfg(test)]
#[path = "mock_test.rs"]
mod tests;
