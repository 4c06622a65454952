pub mod candidate;
pub mod collection;
pub mod rarity;
pub mod recommendation;
pub mod role;

pub use candidate::CardCandidate;
pub use collection::{CardLevelData, CardLevels, average_level, load_card_levels};
pub use rarity::{MAX_CARD_LEVEL, Rarity, RarityWeights};
pub use recommendation::{CardDetail, DECK_SIZE, DeckRecommendation};
pub use role::CardRole;
