//! Lesson and quiz catalog: typed reads and inserts over `lessons` and
//! `quiz_questions`. Points for completions are handled in [`crate::ledger::progress`].

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use std::fmt;

use crate::core::error::LedgerResult;
use crate::storage::db::DbConnection;

/// Difficulty level a lesson belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }

    pub fn parse(s: &str) -> Option<Level> {
        match s {
            "beginner" => Some(Level::Beginner),
            "intermediate" => Some(Level::Intermediate),
            "advanced" => Some(Level::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromSql for Level {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        Level::parse(s).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for Level {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

/// A lesson row
#[derive(Debug, Clone)]
pub struct Lesson {
    pub id: i64,
    pub title_ar: String,
    pub title_en: String,
    pub content_ar: String,
    pub content_en: String,
    pub level: Level,
    pub points_reward: i64,
    pub is_premium: bool,
}

/// Fields needed to insert a lesson (seeding, admin tooling)
#[derive(Debug, Clone)]
pub struct NewLesson {
    pub title_ar: String,
    pub title_en: String,
    pub content_ar: String,
    pub content_en: String,
    pub level: Level,
    pub points_reward: i64,
    pub is_premium: bool,
}

/// A quiz question row
#[derive(Debug, Clone)]
pub struct QuizQuestion {
    pub id: i64,
    pub lesson_id: i64,
    pub question_ar: String,
    pub question_en: String,
    /// Options A..D in Arabic
    pub options_ar: [String; 4],
    /// Options A..D in English
    pub options_en: [String; 4],
    /// 'A'..'D'
    pub correct_option: String,
    pub explanation_ar: Option<String>,
    pub explanation_en: Option<String>,
}

/// Fields needed to insert a quiz question
#[derive(Debug, Clone)]
pub struct NewQuizQuestion {
    pub lesson_id: i64,
    pub question_ar: String,
    pub question_en: String,
    pub options_ar: [String; 4],
    pub options_en: [String; 4],
    pub correct_option: String,
    pub explanation_ar: Option<String>,
    pub explanation_en: Option<String>,
}

fn lesson_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Lesson> {
    Ok(Lesson {
        id: row.get(0)?,
        title_ar: row.get(1)?,
        title_en: row.get(2)?,
        content_ar: row.get(3)?,
        content_en: row.get(4)?,
        level: row.get(5)?,
        points_reward: row.get(6)?,
        is_premium: row.get::<_, i64>(7)? != 0,
    })
}

const LESSON_COLUMNS: &str =
    "id, title_ar, title_en, content_ar, content_en, level, points_reward, is_premium";

/// Insert a lesson and return its id
pub fn insert_lesson(conn: &Connection, lesson: &NewLesson) -> LedgerResult<i64> {
    conn.execute(
        "INSERT INTO lessons (title_ar, title_en, content_ar, content_en, level, points_reward, is_premium)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            lesson.title_ar,
            lesson.title_en,
            lesson.content_ar,
            lesson.content_en,
            lesson.level,
            lesson.points_reward,
            lesson.is_premium as i64,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Fetch a lesson by id
pub fn get_lesson(conn: &DbConnection, lesson_id: i64) -> LedgerResult<Option<Lesson>> {
    let lesson = conn
        .query_row(
            &format!("SELECT {} FROM lessons WHERE id = ?1", LESSON_COLUMNS),
            params![lesson_id],
            lesson_from_row,
        )
        .optional()?;
    Ok(lesson)
}

/// List all lessons of a level, oldest first
pub fn lessons_by_level(conn: &DbConnection, level: Level) -> LedgerResult<Vec<Lesson>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM lessons WHERE level = ?1 ORDER BY id",
        LESSON_COLUMNS
    ))?;
    let rows = stmt.query_map(params![level], lesson_from_row)?;

    let mut lessons = Vec::new();
    for row in rows {
        lessons.push(row?);
    }
    Ok(lessons)
}

/// Total number of lessons in the catalog
pub fn lesson_count(conn: &Connection) -> LedgerResult<i64> {
    let count = conn.query_row("SELECT COUNT(*) FROM lessons", [], |row| row.get(0))?;
    Ok(count)
}

/// Insert a quiz question and return its id
pub fn insert_quiz_question(conn: &Connection, question: &NewQuizQuestion) -> LedgerResult<i64> {
    conn.execute(
        "INSERT INTO quiz_questions (
            lesson_id, question_ar, question_en,
            option_a_ar, option_a_en, option_b_ar, option_b_en,
            option_c_ar, option_c_en, option_d_ar, option_d_en,
            correct_option, explanation_ar, explanation_en
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            question.lesson_id,
            question.question_ar,
            question.question_en,
            question.options_ar[0],
            question.options_en[0],
            question.options_ar[1],
            question.options_en[1],
            question.options_ar[2],
            question.options_en[2],
            question.options_ar[3],
            question.options_en[3],
            question.correct_option,
            question.explanation_ar,
            question.explanation_en,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// List the quiz questions of a lesson, in insertion order
pub fn quiz_questions(conn: &DbConnection, lesson_id: i64) -> LedgerResult<Vec<QuizQuestion>> {
    let mut stmt = conn.prepare(
        "SELECT id, lesson_id, question_ar, question_en,
                option_a_ar, option_a_en, option_b_ar, option_b_en,
                option_c_ar, option_c_en, option_d_ar, option_d_en,
                correct_option, explanation_ar, explanation_en
         FROM quiz_questions WHERE lesson_id = ?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![lesson_id], |row| {
        Ok(QuizQuestion {
            id: row.get(0)?,
            lesson_id: row.get(1)?,
            question_ar: row.get(2)?,
            question_en: row.get(3)?,
            options_ar: [row.get(4)?, row.get(6)?, row.get(8)?, row.get(10)?],
            options_en: [row.get(5)?, row.get(7)?, row.get(9)?, row.get(11)?],
            correct_option: row.get(12)?,
            explanation_ar: row.get(13)?,
            explanation_en: row.get(14)?,
        })
    })?;

    let mut questions = Vec::new();
    for row in rows {
        questions.push(row?);
    }
    Ok(questions)
}
