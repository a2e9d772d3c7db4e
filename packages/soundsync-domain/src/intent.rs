use std::sync::LazyLock;

use regex::Regex;

/// Genre keywords in match priority order.
pub const GENRES: [&str; 20] = [
	"rock",
	"pop",
	"hip hop",
	"rap",
	"country",
	"jazz",
	"blues",
	"electronic",
	"dance",
	"r&b",
	"indie",
	"folk",
	"classical",
	"metal",
	"punk",
	"soul",
	"reggae",
	"disco",
	"funk",
	"alternative",
];

pub const HIGH_ENERGY_KEYWORDS: [&str; 5] =
	["energetic", "high energy", "intense", "powerful", "strong"];
pub const LOW_ENERGY_KEYWORDS: [&str; 6] = ["calm", "chill", "relaxing", "soft", "slow", "mellow"];
pub const DANCEABLE_KEYWORDS: [&str; 5] = ["dance", "dancing", "danceable", "groovy", "rhythm"];
pub const ACOUSTIC_KEYWORDS: [&str; 3] = ["acoustic", "unplugged", "instrumental"];
pub const UPBEAT_KEYWORDS: [&str; 5] = ["happy", "upbeat", "joyful", "cheerful", "positive"];
pub const SAD_KEYWORDS: [&str; 5] = ["sad", "melancholy", "emotional", "heartbreak", "depressing"];
pub const POPULAR_KEYWORDS: [&str; 5] = ["popular", "hit", "trending", "top", "chart"];

static ARTIST_TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\b(?:by|from|like)\s+([\w][\w&'.\s-]*)").expect("artist trigger pattern")
});
static ARTIST_POSSESSIVE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"([\w][\w&.\s-]*?)'s\s+(?:music|songs|tracks)").expect("artist possessive pattern")
});

/// Structured reading of a free-text query.
///
/// Flags are evaluated independently, so contradictory pairs such as `high_energy` and
/// `low_energy` can both be set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryIntent {
	pub artist_filter: Option<String>,
	pub genre_filter: Option<String>,
	pub high_energy: bool,
	pub low_energy: bool,
	pub danceable: bool,
	pub acoustic: bool,
	pub upbeat: bool,
	pub sad: bool,
	pub popular: bool,
}
impl QueryIntent {
	pub fn has_mood(&self) -> bool {
		self.high_energy
			|| self.low_energy
			|| self.danceable
			|| self.acoustic
			|| self.upbeat
			|| self.sad
			|| self.popular
	}
}

pub fn analyze(query: &str) -> QueryIntent {
	let lowered = query.to_lowercase();

	QueryIntent {
		artist_filter: extract_artist(&lowered),
		genre_filter: extract_genre(&lowered),
		high_energy: contains_any(&lowered, &HIGH_ENERGY_KEYWORDS),
		low_energy: contains_any(&lowered, &LOW_ENERGY_KEYWORDS),
		danceable: contains_any(&lowered, &DANCEABLE_KEYWORDS),
		acoustic: contains_any(&lowered, &ACOUSTIC_KEYWORDS),
		upbeat: contains_any(&lowered, &UPBEAT_KEYWORDS),
		sad: contains_any(&lowered, &SAD_KEYWORDS),
		popular: contains_any(&lowered, &POPULAR_KEYWORDS),
	}
}

fn extract_artist(lowered: &str) -> Option<String> {
	for pattern in [&*ARTIST_TRIGGER, &*ARTIST_POSSESSIVE] {
		let Some(captures) = pattern.captures(lowered) else {
			continue;
		};
		let artist = captures.get(1).map(|m| m.as_str().trim()).unwrap_or_default();

		if artist.is_empty() {
			return None;
		}

		return Some(artist.to_string());
	}

	None
}

fn extract_genre(lowered: &str) -> Option<String> {
	GENRES.iter().find(|genre| lowered.contains(**genre)).map(|genre| genre.to_string())
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
	keywords.iter().any(|keyword| text.contains(keyword))
}
