//! Trend weaver: a fixed catalog of color, design, and market insights.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use crate::status::{StatusMessage, StatusSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendCategory {
    Fashion,
    Home,
    Art,
}

impl TrendCategory {
    /// Unknown keys fall back to fashion.
    #[must_use]
    pub fn parse_or_default(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "home" => Self::Home,
            "art" => Self::Art,
            _ => Self::Fashion,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendColor {
    pub name: &'static str,
    pub hex: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrendReport {
    pub category: TrendCategory,
    pub colors: &'static [TrendColor],
    pub designs: &'static [&'static str],
    pub market: &'static [&'static str],
}

const fn color(name: &'static str, hex: &'static str, description: &'static str) -> TrendColor {
    TrendColor { name, hex, description }
}

const FASHION: TrendReport = TrendReport {
    category: TrendCategory::Fashion,
    colors: &[
        color("Sage Green", "#A8B5A0", "Calming and sustainable"),
        color("Warm Terracotta", "#D2691E", "Earthy and grounding"),
        color("Soft Lavender", "#E6E6FA", "Gentle and sophisticated"),
        color("Deep Indigo", "#4B0082", "Rich and versatile"),
    ],
    designs: &[
        "Sustainable fabrics with natural textures",
        "Layered silhouettes with fluid movement",
        "Handcrafted details and artisanal elements",
        "Cultural fusion patterns and motifs",
    ],
    market: &[
        "Growing demand for ethical fashion in Indian markets",
        "Rise of slow fashion movement with traditional Indian textiles",
        "Increased interest in cultural storytelling through Indian motifs",
        "Premium pricing for authentic Indian craftsmanship and handloom products",
    ],
};

const HOME: TrendReport = TrendReport {
    category: TrendCategory::Home,
    colors: &[
        color("Warm Beige", "#F5F5DC", "Cozy and inviting"),
        color("Forest Green", "#228B22", "Natural and calming"),
        color("Clay Brown", "#CD853F", "Rustic and warm"),
        color("Soft Blue", "#87CEEB", "Peaceful and serene"),
    ],
    designs: &[
        "Biophilic design with natural elements",
        "Multifunctional spaces with hidden storage",
        "Handcrafted furniture with organic shapes",
        "Sustainable materials and eco-friendly finishes",
    ],
    market: &[
        "Focus on wellness and mental health spaces in Indian homes",
        "Demand for sustainable home products made from Indian materials",
        "Interest in cultural and heritage-inspired Indian decor",
        "Smart home integration with traditional Indian aesthetics",
    ],
};

const ART: TrendReport = TrendReport {
    category: TrendCategory::Art,
    colors: &[
        color("Burnt Sienna", "#E97451", "Passionate and dynamic"),
        color("Ultramarine Blue", "#4169E1", "Deep and expressive"),
        color("Golden Yellow", "#FFD700", "Energetic and warm"),
        color("Crimson Red", "#DC143C", "Bold and striking"),
    ],
    designs: &[
        "Mixed media and experimental techniques",
        "Cultural narratives and storytelling",
        "Digital-physical art hybrids",
        "Sustainable art materials and practices",
    ],
    market: &[
        "Growing NFT and digital art market in India",
        "Interest in cultural preservation through Indian art forms",
        "Rise of socially conscious art movements in Indian context",
        "Demand for accessible art education in Indian languages",
    ],
};

#[must_use]
pub fn catalog(category: TrendCategory) -> &'static TrendReport {
    match category {
        TrendCategory::Fashion => &FASHION,
        TrendCategory::Home => &HOME,
        TrendCategory::Art => &ART,
    }
}

pub struct TrendWeaver {
    ttl: Duration,
    status: StatusSlot,
}

impl TrendWeaver {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, status: StatusSlot::new() }
    }

    #[must_use]
    pub fn status(&self) -> &StatusSlot {
        &self.status
    }

    /// Look up `category` (raw key from the caller) and post a success status.
    pub fn generate_trends(&self, category: &str) -> &'static TrendReport {
        let report = catalog(TrendCategory::parse_or_default(category));
        info!(requested = category, category = ?report.category, "trend: generated");
        self.status
            .post(StatusMessage::success("Trends generated successfully!", self.ttl));
        report
    }
}

#[cfg(test)]
#[path = "trend_test.rs"]
mod tests;
