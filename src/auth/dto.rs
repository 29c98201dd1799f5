use serde::Deserialize;

/// Request body for CNIC sign-in. The full name is optional; when present it
/// is checked case-insensitively against the stored profile.
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub cnic_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Request body for CNIC registration. Both fields are required.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub cnic_id: String,
    pub full_name: String,
}
