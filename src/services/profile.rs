/// Preference extraction: turns raw per-user form answers into a narrative
/// profile string plus a numeric mood/era preference vector.
///
/// Classification (which bucket a question or answer falls into) is kept
/// separate from aggregation (vote tallying and normalization) and from
/// statement formatting, so each piece is testable on its own.
use std::collections::HashMap;

use crate::models::{AnswerEntry, PreferenceVector, UserProfile};

/// Keyword buckets for preference voting. An answer votes a bucket when it
/// contains any of the bucket's keywords, case-insensitively. One user
/// contributes at most one vote per bucket.
const ERA_NEW_KEYWORDS: &[&str] = &["new", "recent", "modern"];
const ERA_CLASSIC_KEYWORDS: &[&str] = &["classic", "old", "retro"];
const MOOD_FUN_KEYWORDS: &[&str] = &["fun", "funny", "comedy"];
const MOOD_SERIOUS_KEYWORDS: &[&str] = &["serious", "drama"];
const MOOD_INSPIRING_KEYWORDS: &[&str] = &["inspiring", "inspirational", "uplifting"];
const MOOD_SCARY_KEYWORDS: &[&str] = &["scary", "horror", "creepy"];

/// Recognized question categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    FavouriteMovie,
    Era,
    Mood,
    FilmPerson,
    Other,
}

/// Classifies a question key by substring matching on its cleaned form.
///
/// The era check runs before the mood check: the era question key also
/// contains "mood for", so the precedence order matters.
pub fn classify_question(key: &str) -> QuestionKind {
    let clean = key.replace('-', " ").replace('?', "").to_lowercase();

    if clean.contains("favourite movie") {
        QuestionKind::FavouriteMovie
    } else if clean.contains("new or classic") {
        QuestionKind::Era
    } else if clean.contains("mood for") {
        QuestionKind::Mood
    } else if clean.contains("famous film person") {
        QuestionKind::FilmPerson
    } else {
        QuestionKind::Other
    }
}

fn contains_any(answer: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| answer.contains(keyword))
}

/// Tallies mood/era votes across all users' answers and normalizes each
/// group to sum to 1.0. Groups with zero votes keep the defaults.
pub fn tally_preferences(answers: &[Vec<AnswerEntry>]) -> PreferenceVector {
    let mut era_new = 0u32;
    let mut era_classic = 0u32;
    let mut fun = 0u32;
    let mut serious = 0u32;
    let mut inspiring = 0u32;
    let mut scary = 0u32;

    for user in answers {
        let mut voted = [false; 6];

        for entry in user {
            let answer = entry.answer.trim().to_lowercase();
            if answer.is_empty() {
                continue;
            }

            match classify_question(&entry.question) {
                QuestionKind::Era => {
                    voted[0] |= contains_any(&answer, ERA_NEW_KEYWORDS);
                    voted[1] |= contains_any(&answer, ERA_CLASSIC_KEYWORDS);
                }
                QuestionKind::Mood => {
                    voted[2] |= contains_any(&answer, MOOD_FUN_KEYWORDS);
                    voted[3] |= contains_any(&answer, MOOD_SERIOUS_KEYWORDS);
                    voted[4] |= contains_any(&answer, MOOD_INSPIRING_KEYWORDS);
                    voted[5] |= contains_any(&answer, MOOD_SCARY_KEYWORDS);
                }
                _ => {}
            }
        }

        era_new += voted[0] as u32;
        era_classic += voted[1] as u32;
        fun += voted[2] as u32;
        serious += voted[3] as u32;
        inspiring += voted[4] as u32;
        scary += voted[5] as u32;
    }

    let mut preferences = PreferenceVector::default();

    let era_total = era_new + era_classic;
    if era_total > 0 {
        preferences.era_new = era_new as f32 / era_total as f32;
        preferences.era_classic = era_classic as f32 / era_total as f32;
    }

    let mood_total = fun + serious + inspiring + scary;
    if mood_total > 0 {
        preferences.mood_fun = fun as f32 / mood_total as f32;
        preferences.mood_serious = serious as f32 / mood_total as f32;
        preferences.mood_inspiring = inspiring as f32 / mood_total as f32;
        preferences.mood_scary = scary as f32 / mood_total as f32;
    }

    preferences
}

/// Collects every user's favourite-movie answer from the raw entries, in
/// party order. This is its own lightweight scan over the question keys,
/// used by the synopsis enrichment pass before the profile is composed.
pub fn favourite_movie_answers(answers: &[Vec<AnswerEntry>]) -> Vec<String> {
    answers
        .iter()
        .flat_map(|user| user.iter())
        .filter(|entry| classify_question(&entry.question) == QuestionKind::FavouriteMovie)
        .map(|entry| entry.answer.trim().to_string())
        .filter(|answer| !answer.is_empty())
        .collect()
}

/// Composes the narrative profile from all users' answers.
///
/// Question order follows the first user's entry order. Mood/era answers are
/// captured numerically only and never appear in the text. Favourite-movie
/// statements are built per user so each can be substituted with its own
/// synopsis; all other questions get one statement from the composite answer
/// across users.
pub fn compose_profile(
    answers: &[Vec<AnswerEntry>],
    synopses: &HashMap<String, String>,
) -> UserProfile {
    let mut statements = Vec::new();
    let mut plain_statements = Vec::new();

    let questions: Vec<&str> = answers
        .first()
        .map(|user| user.iter().map(|entry| entry.question.as_str()).collect())
        .unwrap_or_default();

    for question in questions {
        match classify_question(question) {
            QuestionKind::Era | QuestionKind::Mood => continue,
            QuestionKind::FavouriteMovie => {
                for answer in answers_for(answers, question) {
                    let plain = format!("User's favourite movie is {}", answer);
                    let enriched = match synopses.get(&answer) {
                        Some(synopsis) => format!("User loves films like: {}", synopsis),
                        None => plain.clone(),
                    };
                    statements.push(enriched);
                    plain_statements.push(plain);
                }
            }
            QuestionKind::FilmPerson => {
                if let Some(composite) = composite_answer(answers, question) {
                    let statement = format!("User likes movies with {}", composite);
                    statements.push(statement.clone());
                    plain_statements.push(statement);
                }
            }
            QuestionKind::Other => {
                if let Some(composite) = composite_answer(answers, question) {
                    let statement = format!("User prefers {}", composite);
                    statements.push(statement.clone());
                    plain_statements.push(statement);
                }
            }
        }
    }

    UserProfile {
        text: statements.join(". "),
        plain_text: plain_statements.join(". "),
        preferences: tally_preferences(answers),
    }
}

/// All users' non-empty answers to one question, in party order
fn answers_for(answers: &[Vec<AnswerEntry>], question: &str) -> Vec<String> {
    answers
        .iter()
        .filter_map(|user| user.iter().find(|entry| entry.question == question))
        .map(|entry| entry.answer.trim().to_string())
        .filter(|answer| !answer.is_empty())
        .collect()
}

/// Non-empty answers to one question joined into a single composite answer
fn composite_answer(answers: &[Vec<AnswerEntry>], question: &str) -> Option<String> {
    let parts = answers_for(answers, question);
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(". "))
    }
}
