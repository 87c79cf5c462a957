pub const LINE_SIGNATURE_HEADER: &str = "X-Line-Signature";
pub const HEALTH_CHECK_BODY: &str = "LINE GPT Bot is running 🚀";
pub const INVALID_SIGNATURE_BODY: &str = "Invalid signature";

pub const REQUIRED_CREDENTIALS: [&str; 3] =
    ["LINE_ACCESS_TOKEN", "LINE_CHANNEL_SECRET", "OPENAI_API_KEY"];

/// Sent instead of an empty or missing completion
pub const APOLOGY_NO_ANSWER: &str = "ขออภัย ระบบไม่สามารถสร้างคำตอบได้ในขณะนี้";
/// Sent by the fallback handler after a failed reply
pub const APOLOGY_ERROR_TRY_LATER: &str = "ขออภัย เกิดข้อผิดพลาด ลองอีกครั้งภายหลัง";

pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";
