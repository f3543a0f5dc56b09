//! Lesson completion and progress reads.
//!
//! Completion is monotonic: the UNIQUE(user_id, lesson_id) constraint plus
//! the completed-flag check mean a lesson pays out at most once, no matter
//! how often the quiz is retaken.

use rusqlite::{params, OptionalExtension};

use crate::core::config;
use crate::core::error::{LedgerError, LedgerResult};
use crate::ledger::lessons::Level;
use crate::ledger::points;
use crate::storage::db::DbConnection;

/// Result of a completion attempt. Completing the same lesson twice is a
/// benign no-op, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Completed { points_awarded: i64 },
    AlreadyCompleted,
}

/// A user's progress on one lesson
#[derive(Debug, Clone)]
pub struct Progress {
    pub lesson_id: i64,
    pub completed: bool,
    pub quiz_score: i64,
    pub completion_date: Option<String>,
}

/// Progress overview row for a level listing
#[derive(Debug, Clone)]
pub struct LessonProgress {
    pub lesson_id: i64,
    pub title_ar: String,
    pub title_en: String,
    pub completed: bool,
}

/// Record a lesson completion and pay out the reward
///
/// The reward is the lesson's base reward plus a per-correct-answer bonus
/// for the quiz score. Progress upsert, lesson counter bump and the points
/// award happen in one transaction.
///
/// # Errors
///
/// `LessonNotFound` / `UserNotFound` for unknown ids, `InvalidAmount` for a
/// negative quiz score.
pub fn complete_lesson(
    conn: &mut DbConnection,
    user_id: i64,
    lesson_id: i64,
    quiz_score: i64,
) -> LedgerResult<CompletionOutcome> {
    if quiz_score < 0 {
        return Err(LedgerError::InvalidAmount(quiz_score));
    }

    let tx = conn.transaction()?;

    let already_completed: Option<i64> = tx
        .query_row(
            "SELECT completed FROM user_progress WHERE user_id = ?1 AND lesson_id = ?2",
            params![user_id, lesson_id],
            |row| row.get(0),
        )
        .optional()?;
    if already_completed == Some(1) {
        return Ok(CompletionOutcome::AlreadyCompleted);
    }

    let base_reward: i64 = tx
        .query_row(
            "SELECT points_reward FROM lessons WHERE id = ?1",
            params![lesson_id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(LedgerError::LessonNotFound(lesson_id))?;

    let reward = base_reward + config::rewards::POINTS_PER_CORRECT_ANSWER * quiz_score;

    // Bump the counter first: zero affected rows identifies an unknown
    // user before the progress upsert trips the foreign key.
    let updated = tx.execute(
        "UPDATE users SET total_lessons_completed = total_lessons_completed + 1
         WHERE user_id = ?1",
        params![user_id],
    )?;
    if updated == 0 {
        return Err(LedgerError::UserNotFound(user_id));
    }

    tx.execute(
        "INSERT INTO user_progress (user_id, lesson_id, completed, quiz_score, completion_date)
         VALUES (?1, ?2, 1, ?3, CURRENT_TIMESTAMP)
         ON CONFLICT (user_id, lesson_id) DO UPDATE SET
            completed = 1,
            quiz_score = excluded.quiz_score,
            completion_date = CURRENT_TIMESTAMP",
        params![user_id, lesson_id, quiz_score],
    )?;

    points::credit(
        &tx,
        user_id,
        reward,
        &format!("Completed lesson {}", lesson_id),
    )?;

    tx.commit()?;

    log::info!(
        "User {} completed lesson {} (score {}, reward {})",
        user_id,
        lesson_id,
        quiz_score,
        reward
    );

    Ok(CompletionOutcome::Completed {
        points_awarded: reward,
    })
}

/// A user's progress row for one lesson, if any
pub fn get_progress(
    conn: &DbConnection,
    user_id: i64,
    lesson_id: i64,
) -> LedgerResult<Option<Progress>> {
    let progress = conn
        .query_row(
            "SELECT lesson_id, completed, quiz_score, completion_date FROM user_progress
             WHERE user_id = ?1 AND lesson_id = ?2",
            params![user_id, lesson_id],
            |row| {
                Ok(Progress {
                    lesson_id: row.get(0)?,
                    completed: row.get::<_, i64>(1)? != 0,
                    quiz_score: row.get(2)?,
                    completion_date: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(progress)
}

/// Every lesson of a level with the user's completion flag
pub fn progress_for_level(
    conn: &DbConnection,
    user_id: i64,
    level: Level,
) -> LedgerResult<Vec<LessonProgress>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.title_ar, l.title_en, COALESCE(p.completed, 0)
         FROM lessons l
         LEFT JOIN user_progress p ON p.lesson_id = l.id AND p.user_id = ?1
         WHERE l.level = ?2
         ORDER BY l.id",
    )?;
    let rows = stmt.query_map(params![user_id, level], |row| {
        Ok(LessonProgress {
            lesson_id: row.get(0)?,
            title_ar: row.get(1)?,
            title_en: row.get(2)?,
            completed: row.get::<_, i64>(3)? != 0,
        })
    })?;

    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}
