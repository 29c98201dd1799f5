use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Derived display status of one test attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TestStatus {
    Pass,
    Failed,
    InProgress,
    Pending,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestImages {
    pub start_image: String,
    pub end_image: String,
}

/// Display-ready projection of one `profile_test_results` row joined with
/// its owning profile. Field names follow the dashboard's wire contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub id: String,
    pub user_name: String,
    pub email: String,
    pub cnic: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub status: TestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub test_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_reason: Option<String>,
    pub cons_result: Option<String>,
    pub seatbelt_result: Option<String>,
    pub lane_result: Option<String>,
    pub handbreak_result: Option<String>,
    pub backlight_result: Option<String>,
    pub overall_result: Option<String>,
    pub final_result: Option<String>,
    pub images: TestImages,
}

/// The five independent pass/fail criteria composing a test. Deserializes
/// from the column name so a sub-check update can never smuggle in an
/// arbitrary SQL identifier.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum SubCheck {
    #[serde(rename = "cons_result")]
    Consistency,
    #[serde(rename = "seatbelt_result")]
    Seatbelt,
    #[serde(rename = "lane_result")]
    Lane,
    #[serde(rename = "handbreak_result")]
    Handbrake,
    #[serde(rename = "backlight_result")]
    Backlight,
}

impl SubCheck {
    pub fn column(self) -> &'static str {
        match self {
            SubCheck::Consistency => "cons_result",
            SubCheck::Seatbelt => "seatbelt_result",
            SubCheck::Lane => "lane_result",
            SubCheck::Handbrake => "handbreak_result",
            SubCheck::Backlight => "backlight_result",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubCheck::Consistency => "Consistency check",
            SubCheck::Seatbelt => "Seatbelt check",
            SubCheck::Lane => "Lane discipline",
            SubCheck::Handbrake => "Handbrake check",
            SubCheck::Backlight => "Backlight check",
        }
    }
}

/// Request body to begin a test attempt for a candidate.
#[derive(Debug, Deserialize)]
pub struct StartTestRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct StartedTestResponse {
    pub id: i64,
}

/// Request body for the end-of-test status update.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub final_result: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub test_end_time: Option<OffsetDateTime>,
}

/// Request body for recording one sub-check outcome.
#[derive(Debug, Deserialize)]
pub struct UpdateResultRequest {
    pub result_type: SubCheck,
    pub result: String,
}
