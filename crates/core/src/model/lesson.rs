use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::exercise::Exercise;
use crate::model::ids::{LessonId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("unknown subject: {0}")]
    UnknownSubject(String),
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// Subject area a lesson is filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Math,
    French,
    Science,
    History,
    English,
    Arts,
}

impl Subject {
    pub const ALL: [Subject; 6] = [
        Subject::Math,
        Subject::French,
        Subject::Science,
        Subject::History,
        Subject::English,
        Subject::Arts,
    ];

    /// Stable storage key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::French => "french",
            Subject::Science => "science",
            Subject::History => "history",
            Subject::English => "english",
            Subject::Arts => "arts",
        }
    }

    /// Label shown to students.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Math => "Mathématiques",
            Subject::French => "Français",
            Subject::Science => "Sciences",
            Subject::History => "Histoire-Géo",
            Subject::English => "Anglais",
            Subject::Arts => "Arts",
        }
    }

    /// Parses a storage key.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::UnknownSubject` for keys outside the known set.
    pub fn parse(raw: &str) -> Result<Self, LessonError> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == raw)
            .ok_or_else(|| LessonError::UnknownSubject(raw.to_owned()))
    }
}

//
// ─── SECTION ───────────────────────────────────────────────────────────────────
//

/// One narrated block of lesson content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub text: String,
}

impl Section {
    #[must_use]
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Narrative content plus the exercise set a quiz is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    tutor_id: UserId,
    title: String,
    description: String,
    subject: Subject,
    level: String,
    duration_minutes: u32,
    content: Vec<Section>,
    exercises: Vec<Exercise>,
    is_published: bool,
    created_at: DateTime<Utc>,
}

impl Lesson {
    /// Creates an unpublished lesson without content or exercises.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyTitle` if the title is blank.
    pub fn new(
        id: LessonId,
        tutor_id: UserId,
        title: impl Into<String>,
        description: impl Into<String>,
        subject: Subject,
        created_at: DateTime<Utc>,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }
        Ok(Self {
            id,
            tutor_id,
            title,
            description: description.into(),
            subject,
            level: String::new(),
            duration_minutes: 0,
            content: Vec::new(),
            exercises: Vec::new(),
            is_published: false,
            created_at,
        })
    }

    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    #[must_use]
    pub fn with_duration_minutes(mut self, minutes: u32) -> Self {
        self.duration_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: Vec<Section>) -> Self {
        self.content = content;
        self
    }

    #[must_use]
    pub fn with_exercises(mut self, exercises: Vec<Exercise>) -> Self {
        self.exercises = exercises;
        self
    }

    #[must_use]
    pub fn published(mut self, is_published: bool) -> Self {
        self.is_published = is_published;
        self
    }

    pub fn set_published(&mut self, is_published: bool) {
        self.is_published = is_published;
    }

    #[must_use]
    pub fn id(&self) -> LessonId {
        self.id
    }

    #[must_use]
    pub fn tutor_id(&self) -> UserId {
        self.tutor_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn level(&self) -> &str {
        &self.level
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn content(&self) -> &[Section] {
        &self.content
    }

    #[must_use]
    pub fn exercises(&self) -> &[Exercise] {
        &self.exercises
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.is_published
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the lesson view should offer a quiz.
    #[must_use]
    pub fn has_quiz(&self) -> bool {
        !self.exercises.is_empty()
    }

    /// Sum of every exercise's points, saturating.
    #[must_use]
    pub fn total_points(&self) -> u32 {
        crate::quiz::points_total(&self.exercises)
    }

    /// Text read aloud for a content section, or `None` if the index is out of range.
    #[must_use]
    pub fn narration_text(&self, section: usize) -> Option<String> {
        self.content
            .get(section)
            .map(|s| format!("{}. {}", s.title, s.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExerciseKind;
    use crate::time::fixed_now;

    fn lesson() -> Lesson {
        Lesson::new(
            LessonId::random(),
            UserId::random(),
            "Les fractions",
            "Introduction",
            Subject::Math,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_blank_title() {
        let err = Lesson::new(
            LessonId::random(),
            UserId::random(),
            "   ",
            "",
            Subject::Arts,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, LessonError::EmptyTitle);
    }

    #[test]
    fn new_lessons_are_unpublished_and_quizless() {
        let lesson = lesson();
        assert!(!lesson.is_published());
        assert!(!lesson.has_quiz());
        assert_eq!(lesson.total_points(), 0);
    }

    #[test]
    fn totals_points_across_exercises() {
        let ex = |points| {
            Exercise::new("Q", ExerciseKind::ShortAnswer, vec![], "a", "", points).unwrap()
        };
        let lesson = lesson().with_exercises(vec![ex(10), ex(5)]);
        assert!(lesson.has_quiz());
        assert_eq!(lesson.total_points(), 15);
    }

    #[test]
    fn total_points_saturates() {
        let ex = |points| {
            Exercise::new("Q", ExerciseKind::ShortAnswer, vec![], "a", "", points).unwrap()
        };
        let lesson = lesson().with_exercises(vec![ex(u32::MAX), ex(1)]);
        assert_eq!(lesson.total_points(), u32::MAX);
    }

    #[test]
    fn narration_text_joins_section_title_and_body() {
        let lesson = lesson().with_content(vec![Section::new("Définition", "Une fraction...")]);
        assert_eq!(
            lesson.narration_text(0).as_deref(),
            Some("Définition. Une fraction...")
        );
        assert_eq!(lesson.narration_text(1), None);
    }

    #[test]
    fn subject_keys_round_trip() {
        for subject in Subject::ALL {
            assert_eq!(Subject::parse(subject.as_str()).unwrap(), subject);
        }
        assert!(Subject::parse("geography").is_err());
        assert_eq!(Subject::History.display_name(), "Histoire-Géo");
    }
}
