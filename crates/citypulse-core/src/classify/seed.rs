//! Built-in subcategory table and keyword rules

use crate::taxonomy::Topic;

/// A predefined subcategory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedEntry {
    pub name: &'static str,
    pub description: &'static str,
}

const fn seed(name: &'static str, description: &'static str) -> SeedEntry {
    SeedEntry { name, description }
}

const TRAFFIC: &[SeedEntry] = &[
    seed("accident", "Vehicle accidents and collisions"),
    seed("congestion", "Traffic jams and slow movement"),
    seed("closure", "Road closures and blockages"),
    seed("construction", "Road work and maintenance"),
    seed("breakdown", "Vehicle breakdowns"),
    seed("signal_issue", "Traffic signal problems"),
];

const INFRASTRUCTURE: &[SeedEntry] = &[
    seed("power_outage", "Electricity supply disruption"),
    seed("water_supply", "Water availability issues"),
    seed("road_damage", "Damaged roads and potholes"),
    seed("maintenance", "Scheduled infrastructure work"),
    seed("network_issue", "Internet and telecom problems"),
    seed("waste_management", "Garbage collection issues"),
];

const WEATHER: &[SeedEntry] = &[
    seed("rain", "Rainfall and precipitation"),
    seed("flood", "Waterlogging and flooding"),
    seed("storm", "Severe weather conditions"),
    seed("heat", "High temperature conditions"),
    seed("wind", "Strong wind conditions"),
    seed("fog", "Low visibility due to fog"),
];

const EVENTS: &[SeedEntry] = &[
    seed("cultural", "Cultural festivals and celebrations"),
    seed("sports", "Sports events and competitions"),
    seed("tech", "Technology events and meetups"),
    seed("music", "Concerts and musical events"),
    seed("political", "Political rallies and meetings"),
    seed("religious", "Religious gatherings and festivals"),
];

const SAFETY: &[SeedEntry] = &[
    seed("fire", "Fire emergencies and incidents"),
    seed("emergency", "General emergency situations"),
    seed("security", "Security and safety concerns"),
    seed("medical", "Medical emergencies"),
    seed("crime", "Criminal activities"),
    seed("accident", "Safety-related accidents"),
];

/// Predefined subcategories of a topic, in table order
pub fn seed_entries(topic: Topic) -> &'static [SeedEntry] {
    match topic {
        Topic::Traffic => TRAFFIC,
        Topic::Infrastructure => INFRASTRUCTURE,
        Topic::Weather => WEATHER,
        Topic::Events => EVENTS,
        Topic::Safety => SAFETY,
    }
}

/// Description of a predefined subcategory, if `name` is one
pub fn seed_description(topic: Topic, name: &str) -> Option<&'static str> {
    seed_entries(topic)
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.description)
}

type KeywordRule = (&'static str, &'static [&'static str]);

const TRAFFIC_KEYWORDS: &[KeywordRule] = &[
    ("accident", &["accident", "collision", "crash"]),
    ("congestion", &["traffic", "jam", "congestion", "slow"]),
    ("closure", &["closed", "closure", "blocked"]),
    ("construction", &["construction", "work", "repair"]),
];

const INFRASTRUCTURE_KEYWORDS: &[KeywordRule] = &[
    ("power_outage", &["power", "electricity", "outage"]),
    ("water_supply", &["water", "supply", "pressure"]),
    ("road_damage", &["pothole", "damage", "road"]),
    ("maintenance", &["maintenance", "repair", "work"]),
];

const WEATHER_KEYWORDS: &[KeywordRule] = &[
    ("rain", &["rain", "rainfall", "drizzle"]),
    ("flood", &["flood", "waterlog", "water"]),
    ("storm", &["storm", "thunder", "lightning"]),
    ("heat", &["heat", "hot", "temperature"]),
];

/// Keyword rules used when a model completion can't be parsed.
///
/// Topics without rules return an empty slice.
pub fn keyword_rules(topic: Topic) -> &'static [KeywordRule] {
    match topic {
        Topic::Traffic => TRAFFIC_KEYWORDS,
        Topic::Infrastructure => INFRASTRUCTURE_KEYWORDS,
        Topic::Weather => WEATHER_KEYWORDS,
        Topic::Events | Topic::Safety => &[],
    }
}
