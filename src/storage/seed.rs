//! Default catalog inserted on first run: a starter lesson set with quiz
//! questions and the shop items. Runs only when the tables are empty, so
//! operator edits survive restarts.

use crate::core::error::LedgerResult;
use crate::ledger::lessons::{self, Level, NewLesson, NewQuizQuestion};
use crate::ledger::shop::{self, ItemEffect, NewShopItem};
use crate::storage::db::DbConnection;

/// Insert the default lessons, quizzes and shop items when their tables
/// are empty
pub fn seed_if_empty(conn: &DbConnection) -> LedgerResult<()> {
    if lessons::lesson_count(conn)? == 0 {
        seed_lessons(conn)?;
    }
    if shop::item_count(conn)? == 0 {
        seed_shop(conn)?;
    }
    Ok(())
}

fn seed_lessons(conn: &DbConnection) -> LedgerResult<()> {
    let lessons_seed = [
        NewLesson {
            title_ar: "مقدمة في الأمن السيبراني".to_string(),
            title_en: "Introduction to Cybersecurity".to_string(),
            content_ar: "الأمن السيبراني هو حماية الأنظمة والشبكات والبيانات من الهجمات الرقمية. \
                         في هذا الدرس نتعرف على المفاهيم الأساسية: السرية، السلامة، والتوافر."
                .to_string(),
            content_en: "Cybersecurity is the protection of systems, networks and data from \
                         digital attacks. This lesson covers the core concepts: confidentiality, \
                         integrity and availability."
                .to_string(),
            level: Level::Beginner,
            points_reward: 10,
            is_premium: false,
        },
        NewLesson {
            title_ar: "كلمات المرور القوية".to_string(),
            title_en: "Strong Passwords".to_string(),
            content_ar: "كلمة المرور القوية طويلة وفريدة وتجمع بين الأحرف والأرقام والرموز. \
                         استخدم مدير كلمات مرور وفعّل المصادقة الثنائية."
                .to_string(),
            content_en: "A strong password is long, unique and mixes letters, digits and \
                         symbols. Use a password manager and enable two-factor authentication."
                .to_string(),
            level: Level::Beginner,
            points_reward: 10,
            is_premium: false,
        },
        NewLesson {
            title_ar: "التصيد الإلكتروني".to_string(),
            title_en: "Phishing Attacks".to_string(),
            content_ar: "التصيد هو انتحال جهة موثوقة لسرقة بياناتك. تحقق من عنوان المرسل، \
                         ولا تضغط على روابط مشبوهة، ولا تشارك بياناتك عبر البريد."
                .to_string(),
            content_en: "Phishing impersonates a trusted party to steal your data. Check the \
                         sender address, avoid suspicious links and never share credentials \
                         over email."
                .to_string(),
            level: Level::Intermediate,
            points_reward: 15,
            is_premium: false,
        },
        NewLesson {
            title_ar: "أمان الشبكات اللاسلكية".to_string(),
            title_en: "Wireless Network Security".to_string(),
            content_ar: "احمِ شبكتك اللاسلكية بتشفير WPA3، وغيّر كلمة مرور الراوتر الافتراضية، \
                         وتجنب إجراء المعاملات الحساسة على الشبكات العامة."
                .to_string(),
            content_en: "Protect your wireless network with WPA3 encryption, change the \
                         router's default password and avoid sensitive transactions on public \
                         networks."
                .to_string(),
            level: Level::Intermediate,
            points_reward: 15,
            is_premium: false,
        },
        NewLesson {
            title_ar: "تحليل البرمجيات الخبيثة".to_string(),
            title_en: "Malware Analysis".to_string(),
            content_ar: "مدخل إلى تحليل البرمجيات الخبيثة: البيئات المعزولة، التحليل الساكن \
                         والديناميكي، ومؤشرات الاختراق."
                .to_string(),
            content_en: "An introduction to malware analysis: sandboxed environments, static \
                         and dynamic analysis, and indicators of compromise."
                .to_string(),
            level: Level::Advanced,
            points_reward: 25,
            is_premium: true,
        },
    ];

    let mut lesson_ids = Vec::new();
    for lesson in &lessons_seed {
        lesson_ids.push(lessons::insert_lesson(conn, lesson)?);
    }

    let questions = [
        NewQuizQuestion {
            lesson_id: lesson_ids[0],
            question_ar: "ما هي العناصر الثلاثة الأساسية للأمن السيبراني؟".to_string(),
            question_en: "What are the three core elements of cybersecurity?".to_string(),
            options_ar: [
                "السرية، السلامة، التوافر".to_string(),
                "السرعة، القوة، الحجم".to_string(),
                "البرمجة، التصميم، الاختبار".to_string(),
                "الشبكات، الخوادم، الحواسيب".to_string(),
            ],
            options_en: [
                "Confidentiality, integrity, availability".to_string(),
                "Speed, strength, size".to_string(),
                "Coding, design, testing".to_string(),
                "Networks, servers, computers".to_string(),
            ],
            correct_option: "A".to_string(),
            explanation_ar: Some("تُعرف بمثلث CIA وهي أساس أي نظام أمني.".to_string()),
            explanation_en: Some(
                "Known as the CIA triad, the foundation of any security model.".to_string(),
            ),
        },
        NewQuizQuestion {
            lesson_id: lesson_ids[1],
            question_ar: "أي كلمة مرور هي الأقوى؟".to_string(),
            question_en: "Which password is the strongest?".to_string(),
            options_ar: [
                "123456".to_string(),
                "password".to_string(),
                "Tr0ub4dor&3xplorer!".to_string(),
                "qwerty".to_string(),
            ],
            options_en: [
                "123456".to_string(),
                "password".to_string(),
                "Tr0ub4dor&3xplorer!".to_string(),
                "qwerty".to_string(),
            ],
            correct_option: "C".to_string(),
            explanation_ar: Some("طويلة وتجمع أحرفاً وأرقاماً ورموزاً.".to_string()),
            explanation_en: Some("Long and mixes letters, digits and symbols.".to_string()),
        },
        NewQuizQuestion {
            lesson_id: lesson_ids[2],
            question_ar: "وصلتك رسالة من \"بنكك\" تطلب كلمة المرور. ماذا تفعل؟".to_string(),
            question_en: "Your \"bank\" emails you asking for your password. What do you do?"
                .to_string(),
            options_ar: [
                "أرسل كلمة المرور فوراً".to_string(),
                "أتجاهلها وأبلغ البنك عبر قناة رسمية".to_string(),
                "أضغط على الرابط للتحقق".to_string(),
                "أعيد توجيهها لأصدقائي".to_string(),
            ],
            options_en: [
                "Send the password right away".to_string(),
                "Ignore it and report through an official channel".to_string(),
                "Click the link to verify".to_string(),
                "Forward it to friends".to_string(),
            ],
            correct_option: "B".to_string(),
            explanation_ar: Some("البنوك لا تطلب كلمات المرور عبر البريد أبداً.".to_string()),
            explanation_en: Some("Banks never ask for passwords over email.".to_string()),
        },
    ];

    for question in &questions {
        lessons::insert_quiz_question(conn, question)?;
    }

    log::info!(
        "Seeded {} lesson(s) and {} quiz question(s)",
        lessons_seed.len(),
        questions.len()
    );
    Ok(())
}

fn seed_shop(conn: &DbConnection) -> LedgerResult<()> {
    let items = [
        NewShopItem {
            name_ar: "💰 حزمة 100 نقطة".to_string(),
            name_en: "💰 100 Points Package".to_string(),
            description_ar: Some("احصل على 100 نقطة إضافية".to_string()),
            description_en: Some("Get 100 extra points".to_string()),
            price_points: 0,
            price_usd: 2.99,
            category: "points".to_string(),
            effect: ItemEffect::GrantPoints { amount: 100 },
        },
        NewShopItem {
            name_ar: "💰 حزمة 500 نقطة".to_string(),
            name_en: "💰 500 Points Package".to_string(),
            description_ar: Some("احصل على 500 نقطة إضافية".to_string()),
            description_en: Some("Get 500 extra points".to_string()),
            price_points: 0,
            price_usd: 9.99,
            category: "points".to_string(),
            effect: ItemEffect::GrantPoints { amount: 500 },
        },
        NewShopItem {
            name_ar: "⭐ عضوية VIP شهرية".to_string(),
            name_en: "⭐ Monthly VIP Membership".to_string(),
            description_ar: Some("وصول كامل للدروس المتقدمة لمدة شهر".to_string()),
            description_en: Some("Full access to premium lessons for one month".to_string()),
            price_points: 500,
            price_usd: 9.99,
            category: "vip".to_string(),
            effect: ItemEffect::GrantVip { days: 30 },
        },
        NewShopItem {
            name_ar: "⭐ عضوية VIP سنوية".to_string(),
            name_en: "⭐ Yearly VIP Membership".to_string(),
            description_ar: Some("وصول كامل للدروس المتقدمة لمدة سنة".to_string()),
            description_en: Some("Full access to premium lessons for one year".to_string()),
            price_points: 2000,
            price_usd: 59.99,
            category: "vip".to_string(),
            effect: ItemEffect::GrantVip { days: 365 },
        },
        NewShopItem {
            name_ar: "🎓 دورة الأمن السيبراني المتقدمة".to_string(),
            name_en: "🎓 Advanced Cybersecurity Course".to_string(),
            description_ar: Some("دورة شاملة مع متابعة شخصية".to_string()),
            description_en: Some("A complete course with personal mentoring".to_string()),
            price_points: 1000,
            price_usd: 49.99,
            category: "course".to_string(),
            effect: ItemEffect::None,
        },
        NewShopItem {
            name_ar: "📜 شهادة إتمام".to_string(),
            name_en: "📜 Certificate of Completion".to_string(),
            description_ar: Some("شهادة رسمية بإتمام المستوى".to_string()),
            description_en: Some("An official certificate for completing your level".to_string()),
            price_points: 200,
            price_usd: 19.99,
            category: "certificate".to_string(),
            effect: ItemEffect::None,
        },
    ];

    for item in &items {
        shop::insert_item(conn, item)?;
    }

    log::info!("Seeded {} shop item(s)", items.len());
    Ok(())
}
