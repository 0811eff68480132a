//! Chat assistant and occupancy report generation on top of a
//! [`TextGenerator`].
//!
//! Service failures never escape [`Conversation::send`] or
//! [`Assistant::report`]; they are turned into a message for the user,
//! with quota exhaustion told apart from everything else.

use crate::config::toml_config::InstitutionConfig;
use crate::core::aggregator::{AssistantSummary, OccupancyStats};
use crate::domain::ports::{GenerationRequest, TextGenerator};
use crate::utils::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};

pub const EMPTY_REPLY: &str = "Uzr, ma'lumot olishda xatolik yuz berdi.";
pub const EMPTY_REPORT: &str = "Tahlil natijasi bo'sh bo'ldi.";

pub const CHAT_QUOTA_MESSAGE: &str = "⚠️ **Limit Tugadi (Quota Exceeded).**\n\nHozirda foydalanuvchilar ko'pligi sababli Google Gemini serveri band. Iltimos, 1-2 daqiqadan so'ng qayta yozing.";
pub const CHAT_GENERIC_MESSAGE: &str =
    "Kechirasiz, tizimda vaqtinchalik nosozlik. Internet aloqasini tekshiring.";

pub const REPORT_QUOTA_MESSAGE: &str = "⚠️ AI xizmatidan foydalanish limiti vaqtinchalik tugadi (Quota Exceeded). \n\nIltimos, 1-2 daqiqadan so'ng qayta urinib ko'ring. Bepul versiyada so'rovlar soni cheklangan.";
pub const REPORT_API_KEY_MESSAGE: &str =
    "⚠️ API kaliti bilan muammo yuzaga keldi. Sozlamalarni tekshiring.";
pub const REPORT_GENERIC_MESSAGE: &str =
    "Tahlil jarayonida xatolik yuz berdi. Qayta urinib ko'ring.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    QuotaExceeded,
    InvalidApiKey,
    Generic,
}

/// Sorts a text-generation failure into the buckets the user sees.
pub fn classify(error: &DashboardError) -> FailureKind {
    let status = match error {
        DashboardError::ServiceError { status, .. } => *status,
        DashboardError::HttpError(e) => e.status().map(|s| s.as_u16()),
        _ => None,
    };
    let message = error.to_string();

    if status == Some(429)
        || message.contains("429")
        || message.contains("quota")
        || message.contains("RESOURCE_EXHAUSTED")
    {
        FailureKind::QuotaExceeded
    } else if message.contains("API key") {
        FailureKind::InvalidApiKey
    } else {
        FailureKind::Generic
    }
}

fn chat_failure_message(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::QuotaExceeded => CHAT_QUOTA_MESSAGE,
        FailureKind::InvalidApiKey | FailureKind::Generic => CHAT_GENERIC_MESSAGE,
    }
}

fn report_failure_message(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::QuotaExceeded => REPORT_QUOTA_MESSAGE,
        FailureKind::InvalidApiKey => REPORT_API_KEY_MESSAGE,
        FailureKind::Generic => REPORT_GENERIC_MESSAGE,
    }
}

pub fn greeting(institution: &InstitutionConfig) -> String {
    format!(
        "Assalomu alaykum! Men {} yotoqxonasi virtual yordamchisiman. Yotoqxonalar, bo'sh joylar yoki joylashish tartibi haqida so'rashingiz mumkin.",
        institution.short_name
    )
}

/// Fixed instruction context for the chat assistant, filled with live figures.
pub fn chat_system_prompt(
    institution: &InstitutionConfig,
    summary: &AssistantSummary,
    dormitory_count: usize,
    rooms_per_dormitory: usize,
) -> String {
    format!(
        "Sen {name} ({short}) yotoqxonasining aqlli yordamchisisan.\n\
         \n\
         Joriy statistika (Real vaqt rejimida):\n\
         - Jami yotoqxona: {dorms} ta.\n\
         - Har birida: {rooms} ta xona.\n\
         - Xona sig'imi: 4 kishi.\n\
         - Umumiy sig'im: {capacity} talaba.\n\
         - Hozirgi talabalar soni: {occupied}.\n\
         - Bo'sh o'rinlar: {free}.\n\
         - Bo'm-bo'sh xonalar soni: {empty}.\n\
         \n\
         Vazifang:\n\
         - Foydalanuvchi savollariga faqat o'zbek tilida, do'stona va professional javob berish.\n\
         - Agar joylashish uchun hujjatlar haqida so'rasa: \"Dekanatga ariza, pasport nusxasi va 2 ta rasm topshirish kerak\" deb ayt.\n\
         - Agar to'lov haqida so'rasa: \"To'lov kontrakt bo'limi orqali amalga oshiriladi\" deb javob ber.\n\
         - Statistikani so'rasa, yuqoridagi raqamlardan foydalan.\n",
        name = institution.name,
        short = institution.short_name,
        dorms = dormitory_count,
        rooms = rooms_per_dormitory,
        capacity = summary.capacity,
        occupied = summary.occupied,
        free = summary.free,
        empty = summary.empty_rooms,
    )
}

pub fn report_prompt(institution: &InstitutionConfig, stats: &OccupancyStats) -> Result<String> {
    let data = serde_json::to_string_pretty(&stats.analysis_payload())?;
    Ok(format!(
        "Sen universitet yotoqxonalari bo'yicha professional ma'lumotlar tahlilchisisan.\n\
         Quyidagi {year} o'quv yili statistik ma'lumotlarini tahlil qilib, {name} rahbariyati uchun qisqa, londa va foydali hisobot tayyorlab ber.\n\
         \n\
         MA'LUMOTLAR:\n\
         {data}\n\
         \n\
         TALABLAR:\n\
         1. Hisobot O'zbek tilida bo'lsin.\n\
         2. Formatlash uchun faqat oddiy matn va kerak bo'lsa sarlavhalardan foydalan.\n\
         3. Quyidagi tuzilmani saqla:\n\
         \x20  - 📊 Umumiy Holat: Bandlik darajasi va qisqacha xulosa.\n\
         \x20  - 🎓 Talabalar Tarkibi: Kurslar va fakultetlar bo'yicha asosiy tendensiyalar (qaysi kurs/fakultet ustunlik qilmoqda).\n\
         \x20  - ⚠️ E'tibor Talab Jihatlar: Masalan, bo'sh o'rinlar juda ko'pmi yoki ma'lum bir fakultet talabalari juda zich joylashganmi?\n\
         \x20  - 💡 Takliflar: Samaradorlikni oshirish uchun 2-3 ta aniq taklif.\n\
         \n\
         Javobing do'stona, ammo rasmiy uslubda bo'lsin.\n",
        year = institution.academic_year,
        name = institution.name,
        data = data
    ))
}

pub struct Assistant<G: TextGenerator> {
    generator: G,
    institution: InstitutionConfig,
}

impl<G: TextGenerator> Assistant<G> {
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            institution: InstitutionConfig::default(),
        }
    }

    pub fn with_institution(mut self, institution: InstitutionConfig) -> Self {
        self.institution = institution;
        self
    }

    pub fn institution(&self) -> &InstitutionConfig {
        &self.institution
    }

    /// A fresh transcript opened with this institution's greeting.
    pub fn conversation(&self) -> Conversation {
        Conversation::with_greeting(greeting(&self.institution))
    }

    /// Answers one question with the chat template; the service reply is
    /// returned unchanged.
    pub async fn ask(
        &self,
        question: &str,
        summary: &AssistantSummary,
        dormitory_count: usize,
        rooms_per_dormitory: usize,
    ) -> Result<String> {
        let request = GenerationRequest {
            system_instruction: Some(chat_system_prompt(
                &self.institution,
                summary,
                dormitory_count,
                rooms_per_dormitory,
            )),
            prompt: question.to_string(),
        };
        tracing::debug!("Sending chat question ({} chars)", question.chars().count());
        let reply = self.generator.generate(request).await?;
        Ok(if reply.trim().is_empty() {
            EMPTY_REPLY.to_string()
        } else {
            reply
        })
    }

    pub async fn analyze(&self, stats: &OccupancyStats) -> Result<String> {
        let request = GenerationRequest {
            system_instruction: None,
            prompt: report_prompt(&self.institution, stats)?,
        };
        tracing::info!("Requesting occupancy report for '{}'", stats.scope);
        let report = self.generator.generate(request).await?;
        Ok(if report.trim().is_empty() {
            EMPTY_REPORT.to_string()
        } else {
            report
        })
    }

    /// Like [`Assistant::analyze`], but a failure becomes the report text.
    pub async fn report(&self, stats: &OccupancyStats) -> Report {
        match self.analyze(stats).await {
            Ok(text) => Report { text, is_error: false },
            Err(e) => {
                let kind = classify(&e);
                tracing::error!("AI analysis failed ({:?}): {}", kind, e);
                Report {
                    text: report_failure_message(kind).to_string(),
                    is_error: true,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

/// A chat transcript. `send` takes `&mut self`, so a second question cannot
/// be submitted while one is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self::with_greeting(greeting(&InstitutionConfig::default()))
    }

    pub fn with_greeting(text: String) -> Self {
        Self {
            messages: vec![Message {
                role: Role::Model,
                text,
            }],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Records the question and the reply (or failure text). Blank input is
    /// ignored and returns `None`.
    pub async fn send<G: TextGenerator>(
        &mut self,
        assistant: &Assistant<G>,
        question: &str,
        stats: &OccupancyStats,
        dormitory_count: usize,
    ) -> Option<&Message> {
        if question.trim().is_empty() {
            return None;
        }
        self.messages.push(Message {
            role: Role::User,
            text: question.to_string(),
        });

        let rooms_per_dormitory = if dormitory_count == 0 {
            0
        } else {
            stats.total_rooms / dormitory_count
        };
        let text = match assistant
            .ask(question, &stats.summary(), dormitory_count, rooms_per_dormitory)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                let kind = classify(&e);
                tracing::error!("AI Error ({:?}): {}", kind, e);
                chat_failure_message(kind).to_string()
            }
        };

        self.messages.push(Message {
            role: Role::Model,
            text,
        });
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DormId, Dormitory, Roster, Room, Scope};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned outcomes and remembers what it was asked.
    struct ScriptedGenerator {
        outcome: fn() -> Result<String>,
        seen: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedGenerator {
        fn new(outcome: fn() -> Result<String>) -> Self {
            Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, request: GenerationRequest) -> Result<String> {
            self.seen.lock().unwrap().push(request);
            (self.outcome)()
        }
    }

    fn stats() -> OccupancyStats {
        let roster = Roster::new(vec![Dormitory::new(
            DormId(1),
            "1-Talabalar turar joyi",
            (1..=10).map(Room::new).collect(),
        )]);
        OccupancyStats::compute(&roster, Scope::All)
    }

    #[test]
    fn test_classify_quota_variants() {
        let by_status = DashboardError::ServiceError {
            status: Some(429),
            message: "Too many".to_string(),
        };
        let by_text = DashboardError::ServiceError {
            status: Some(400),
            message: "RESOURCE_EXHAUSTED: try later".to_string(),
        };
        let by_word = DashboardError::ProcessingError {
            message: "you exceeded your quota".to_string(),
        };
        assert_eq!(classify(&by_status), FailureKind::QuotaExceeded);
        assert_eq!(classify(&by_text), FailureKind::QuotaExceeded);
        assert_eq!(classify(&by_word), FailureKind::QuotaExceeded);
    }

    #[test]
    fn test_classify_other_failures() {
        let key = DashboardError::ServiceError {
            status: Some(400),
            message: "API key not valid. Please pass a valid API key.".to_string(),
        };
        let down = DashboardError::ServiceError {
            status: Some(503),
            message: "unavailable".to_string(),
        };
        assert_eq!(classify(&key), FailureKind::InvalidApiKey);
        assert_eq!(classify(&down), FailureKind::Generic);
    }

    #[test]
    fn test_chat_prompt_embeds_summary() {
        let summary = AssistantSummary {
            capacity: 800,
            occupied: 780,
            free: 20,
            empty_rooms: 3,
        };
        let prompt = chat_system_prompt(&InstitutionConfig::default(), &summary, 2, 100);
        assert!(prompt.contains("Umumiy sig'im: 800 talaba."));
        assert!(prompt.contains("Hozirgi talabalar soni: 780."));
        assert!(prompt.contains("Bo'sh o'rinlar: 20."));
        assert!(prompt.contains("Bo'm-bo'sh xonalar soni: 3."));
        assert!(prompt.contains("Har birida: 100 ta xona."));
    }

    #[test]
    fn test_report_prompt_contains_payload() {
        let prompt = report_prompt(&InstitutionConfig::default(), &stats()).unwrap();
        assert!(prompt.contains("\"totalCapacity\": 40"));
        assert!(prompt.contains("\"occupancyRate\": \"0%\""));
        assert!(prompt.contains("💡 Takliflar"));
    }

    #[tokio::test]
    async fn test_conversation_records_reply_verbatim() {
        let assistant = Assistant::new(ScriptedGenerator::new(|| Ok("  Salom!  ".to_string())));
        let mut chat = Conversation::new();

        let reply = chat.send(&assistant, "Bo'sh joy bormi?", &stats(), 1).await.unwrap();
        assert_eq!(reply.text, "  Salom!  ");
        assert_eq!(chat.messages().len(), 3);
        assert_eq!(chat.messages()[1].role, Role::User);

        let seen = assistant.generator.seen.lock().unwrap();
        assert_eq!(seen[0].prompt, "Bo'sh joy bormi?");
        assert!(seen[0]
            .system_instruction
            .as_deref()
            .unwrap()
            .contains("Umumiy sig'im: 40 talaba."));
    }

    #[tokio::test]
    async fn test_conversation_ignores_blank_input() {
        let assistant = Assistant::new(ScriptedGenerator::new(|| Ok("x".to_string())));
        let mut chat = Conversation::new();

        assert!(chat.send(&assistant, "   ", &stats(), 1).await.is_none());
        assert_eq!(chat.messages().len(), 1);
        assert!(assistant.generator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_conversation_turns_quota_error_into_message() {
        let assistant = Assistant::new(ScriptedGenerator::new(|| {
            Err(DashboardError::ServiceError {
                status: Some(429),
                message: "Resource has been exhausted".to_string(),
            })
        }));
        let mut chat = Conversation::new();

        let reply = chat.send(&assistant, "Salom", &stats(), 1).await.unwrap();
        assert_eq!(reply.text, CHAT_QUOTA_MESSAGE);
        assert_eq!(reply.role, Role::Model);
    }

    #[tokio::test]
    async fn test_empty_reply_falls_back() {
        let assistant = Assistant::new(ScriptedGenerator::new(|| Ok(String::new())));
        let summary = stats().summary();
        assert_eq!(assistant.ask("?", &summary, 1, 10).await.unwrap(), EMPTY_REPLY);
        assert_eq!(assistant.analyze(&stats()).await.unwrap(), EMPTY_REPORT);
    }

    #[tokio::test]
    async fn test_report_failures_are_classified() {
        let generic = Assistant::new(ScriptedGenerator::new(|| {
            Err(DashboardError::ServiceError {
                status: Some(500),
                message: "internal".to_string(),
            })
        }));
        let report = generic.report(&stats()).await;
        assert!(report.is_error);
        assert_eq!(report.text, REPORT_GENERIC_MESSAGE);

        let key = Assistant::new(ScriptedGenerator::new(|| {
            Err(DashboardError::ServiceError {
                status: Some(400),
                message: "API key not valid".to_string(),
            })
        }));
        assert_eq!(key.report(&stats()).await.text, REPORT_API_KEY_MESSAGE);
    }

    #[tokio::test]
    async fn test_prompts_name_the_configured_institution() {
        let institution = InstitutionConfig {
            name: "Termiz davlat universiteti".to_string(),
            short_name: "TerDU".to_string(),
            academic_year: "2026-2027".to_string(),
        };
        let assistant = Assistant::new(ScriptedGenerator::new(|| Ok("ok".to_string())))
            .with_institution(institution);

        let mut chat = assistant.conversation();
        assert!(chat.messages()[0].text.contains("Men TerDU yotoqxonasi"));
        chat.send(&assistant, "Salom", &stats(), 1).await.unwrap();
        assistant.analyze(&stats()).await.unwrap();

        let seen = assistant.generator.seen.lock().unwrap();
        let system = seen[0].system_instruction.as_deref().unwrap();
        assert!(system.contains("Sen Termiz davlat universiteti (TerDU) yotoqxonasining"));
        assert!(!system.contains("GDPI"));
        assert!(seen[1].prompt.contains("2026-2027 o'quv yili"));
        assert!(seen[1].prompt.contains("Termiz davlat universiteti rahbariyati"));
    }
}
