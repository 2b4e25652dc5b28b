//! Market navigator: pricing guidance and buyer chat.
//!
//! Pricing is a pure function of base price and target market. The buyer
//! chat is local: each message is echoed, phrase-translated, and answered
//! with a canned reply in the buyer's language.

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::mock;
use crate::status::{StatusMessage, StatusSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketTier {
    Local,
    National,
    International,
}

impl MarketTier {
    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Local => 1.3,
            Self::National => 1.8,
            Self::International => 2.5,
        }
    }

    /// Parse a tier name; anything unrecognized prices as local.
    #[must_use]
    pub fn parse_or_local(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "national" => Self::National,
            "international" => Self::International,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceQuote {
    pub suggested: f64,
    /// `[min, max]`
    pub range: [f64; 2],
}

/// `suggested = round(base * multiplier)`, range is `[round(s * 0.85), round(s * 1.4)]`.
#[must_use]
pub fn price(base: f64, tier: MarketTier) -> PriceQuote {
    let suggested = (base * tier.multiplier()).round();
    PriceQuote { suggested, range: [(suggested * 0.85).round(), (suggested * 1.4).round()] }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Competitor {
    pub name: &'static str,
    pub price: f64,
    pub position: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricingReport {
    pub product_name: String,
    pub base_price: f64,
    pub tier: MarketTier,
    pub quote: PriceQuote,
    pub reasoning: String,
    pub competitors: Vec<Competitor>,
}

fn reasoning(product: &str, tier: MarketTier) -> String {
    match tier {
        MarketTier::Local => format!(
            "{product} in local Indian markets typically commands a 30% premium due to direct artisan relationships, cultural authenticity, and immediate availability through local haats and markets."
        ),
        MarketTier::National => format!(
            "For national distribution across India, {product} pricing should account for interstate logistics, GST considerations, marketing through Indian e-commerce platforms, and competition from regional artisans."
        ),
        MarketTier::International => format!(
            "International pricing for {product} must consider INR to foreign currency conversion, export duties, shipping costs, and positioning as authentic Indian handicraft in global markets."
        ),
    }
}

fn competitors(suggested: f64) -> Vec<Competitor> {
    [
        ("Local Artisan Co-op", 0.9, "Budget option"),
        ("Premium Handicrafts India", 1.1, "Premium option"),
        ("Traditional Crafts Hub", 0.95, "Value competitor"),
    ]
    .into_iter()
    .map(|(name, factor, position)| Competitor { name, price: (suggested * factor).round(), position })
    .collect()
}

// =============================================================================
// CHAT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Translated,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub text: String,
    pub language: String,
    pub language_name: String,
}

impl ChatEntry {
    fn new(role: ChatRole, text: String, language: &str) -> Self {
        Self { role, text, language: language.to_string(), language_name: chat_language_name(language).to_string() }
    }
}

/// Display name for chat language tags.
#[must_use]
pub fn chat_language_name(code: &str) -> &str {
    match code {
        "en" => "English",
        "hi" => "हिंदी",
        "es" => "Español",
        "fr" => "Français",
        "de" => "Deutsch",
        other => other,
    }
}

// =============================================================================
// MODULE
// =============================================================================

pub struct MarketNavigator {
    ttl: Duration,
    status: StatusSlot,
    history: Mutex<Vec<PricingReport>>,
    chat: Mutex<Vec<ChatEntry>>,
}

impl MarketNavigator {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, status: StatusSlot::new(), history: Mutex::new(Vec::new()), chat: Mutex::new(Vec::new()) }
    }

    #[must_use]
    pub fn status(&self) -> &StatusSlot {
        &self.status
    }

    /// Validate inputs and produce a pricing report.
    ///
    /// # Errors
    ///
    /// Returns the error status when the product name is blank or the base
    /// price is not a positive number.
    pub fn calculate_price(&self, product_name: &str, base: f64, tier: &str) -> Result<PricingReport, StatusMessage> {
        let product_name = product_name.trim();
        if product_name.is_empty() || !base.is_finite() || base <= 0.0 {
            let message = StatusMessage::error("Please enter valid product name and base price.", self.ttl);
            self.status.post(message.clone());
            return Err(message);
        }
        let tier = MarketTier::parse_or_local(tier);
        let quote = price(base, tier);
        let report = PricingReport {
            product_name: product_name.to_string(),
            base_price: base,
            tier,
            quote,
            reasoning: reasoning(product_name, tier),
            competitors: competitors(quote.suggested),
        };
        info!(product = product_name, ?tier, suggested = quote.suggested, "market: price calculated");
        self.lock_history().push(report.clone());
        self.status
            .post(StatusMessage::success("Pricing calculated successfully!", self.ttl));
        Ok(report)
    }

    #[must_use]
    pub fn pricing_history(&self) -> Vec<PricingReport> {
        self.lock_history().clone()
    }

    /// Append the user message, its translation, and a reply. Blank input is
    /// ignored and returns nothing.
    pub fn send_chat_message(&self, message: &str, target_language: &str) -> Vec<ChatEntry> {
        let message = message.trim();
        if message.is_empty() {
            return Vec::new();
        }
        let entries = vec![
            ChatEntry::new(ChatRole::User, message.to_string(), "en"),
            ChatEntry::new(
                ChatRole::Translated,
                mock::phrase_translation(message, "en", target_language),
                target_language,
            ),
            ChatEntry::new(ChatRole::Ai, mock::chat_reply(target_language), target_language),
        ];
        self.lock_chat().extend(entries.iter().cloned());
        entries
    }

    #[must_use]
    pub fn chat_history(&self) -> Vec<ChatEntry> {
        self.lock_chat().clone()
    }

    fn lock_history(&self) -> std::sync::MutexGuard<'_, Vec<PricingReport>> {
        self.history.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn lock_chat(&self) -> std::sync::MutexGuard<'_, Vec<ChatEntry>> {
        self.chat.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "market_test.rs"]
mod tests;
