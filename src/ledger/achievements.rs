//! Achievements are a pure projection over existing counters; nothing is
//! stored for them.

use crate::core::error::{LedgerError, LedgerResult};
use crate::ledger::{referrals, users};
use crate::storage::db::DbConnection;

/// One achievement with its unlock state for a given user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub code: &'static str,
    pub title_ar: &'static str,
    pub title_en: &'static str,
    pub unlocked: bool,
}

/// Evaluate all achievements for a user
pub fn achievements(conn: &DbConnection, user_id: i64) -> LedgerResult<Vec<Achievement>> {
    let user = users::get_user(conn, user_id)?.ok_or(LedgerError::UserNotFound(user_id))?;
    let referral_stats = referrals::referral_stats(conn, user_id)?;

    Ok(vec![
        Achievement {
            code: "first_lesson",
            title_ar: "🎯 الدرس الأول",
            title_en: "🎯 First Lesson",
            unlocked: user.total_lessons_completed >= 1,
        },
        Achievement {
            code: "dedicated_learner",
            title_ar: "📚 متعلم مجتهد",
            title_en: "📚 Dedicated Learner",
            unlocked: user.total_lessons_completed >= 5,
        },
        Achievement {
            code: "first_referral",
            title_ar: "🤝 الإحالة الأولى",
            title_en: "🤝 First Referral",
            unlocked: referral_stats.total_referrals >= 1,
        },
        Achievement {
            code: "point_collector",
            title_ar: "💎 جامع النقاط",
            title_en: "💎 Point Collector",
            unlocked: user.points >= 100,
        },
    ])
}
