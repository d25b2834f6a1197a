use serde::{Deserialize, Serialize};

/// One question/answer pair from a single user's form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerEntry {
    pub question: String,
    pub answer: String,
}

/// The full set of answers collected from a viewing party.
///
/// `answers` holds one ordered entry list per user. The question order of the
/// first user drives the order of statements in the composed profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyAnswers {
    pub party_size: usize,
    pub answers: Vec<Vec<AnswerEntry>>,
}

/// Aggregated mood/era preference weights.
///
/// Each group (era pair, mood quadruple) sums to 1.0 once at least one vote
/// was cast in it; otherwise the defaults below apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreferenceVector {
    pub era_new: f32,
    pub era_classic: f32,
    pub mood_fun: f32,
    pub mood_serious: f32,
    pub mood_inspiring: f32,
    pub mood_scary: f32,
}

impl Default for PreferenceVector {
    fn default() -> Self {
        Self {
            era_new: 0.5,
            era_classic: 0.5,
            mood_fun: 0.25,
            mood_serious: 0.25,
            mood_inspiring: 0.25,
            mood_scary: 0.25,
        }
    }
}

/// Profile synthesized from all users' answers.
///
/// `text` is the semantic query sent to the embedding model; favourite-movie
/// statements are substituted with catalog synopses when one was found.
/// `plain_text` keeps the titles verbatim so the mention extractor can still
/// see them. Mood/era answers appear in neither (captured numerically only).
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub text: String,
    pub plain_text: String,
    pub preferences: PreferenceVector,
}

/// Film metadata as stored in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilmMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
}

/// One catalog row: stored description plus metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilmDoc {
    pub id: i64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub metadata: Option<FilmMetadata>,
}

/// One similarity-search result
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilmMatch {
    pub id: i64,
    pub content: String,
    pub metadata: FilmMetadata,
    pub similarity: f32,
    #[serde(default)]
    pub boost: Option<f32>,
}

/// Parameters for one similarity search
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub embedding: Vec<f32>,
    pub exclude_ids: Vec<i64>,
    pub exclude_collection_ids: Vec<i64>,
    pub preferences: PreferenceVector,
}

/// Final pipeline output: parallel arrays aligned by candidate index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub candidates: Vec<FilmMatch>,
    pub rationales: Vec<String>,
    pub poster_urls: Vec<String>,
}

impl RecommendationSet {
    /// The valid "nothing cleared the similarity bar" outcome
    pub fn empty() -> Self {
        Self {
            candidates: Vec::new(),
            rationales: Vec::new(),
            poster_urls: Vec::new(),
        }
    }
}
