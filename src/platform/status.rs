// ABOUTME: Platform status codes and response envelope unwrapping.
// ABOUTME: Every API call returns {status, description, data}; only 1xx codes are success.

use serde::Deserialize;
use std::fmt;

use super::error::PlatformError;

/// Status codes the control plane embeds in every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStatus {
    Ok,
    OkDeployStarted,
    OkPartially,
    ErrorGeneric,
    CaptainNotInitialized,
    UserNotInitialized,
    NotAuthorized,
    AlreadyExists,
    BadName,
    WrongPassword,
    AuthTokenInvalid,
    VerificationFailed,
    IllegalOperation,
    BuildError,
    IllegalParameter,
    NotFound,
    AuthenticationFailed,
    PasswordBackOff,
    Unknown(u32),
}

impl ApiStatus {
    pub fn from_code(code: u32) -> Self {
        match code {
            100 => ApiStatus::Ok,
            101 => ApiStatus::OkDeployStarted,
            102 => ApiStatus::OkPartially,
            1000 => ApiStatus::ErrorGeneric,
            1001 => ApiStatus::CaptainNotInitialized,
            1101 => ApiStatus::UserNotInitialized,
            1102 => ApiStatus::NotAuthorized,
            1103 => ApiStatus::AlreadyExists,
            1104 => ApiStatus::BadName,
            1105 => ApiStatus::WrongPassword,
            1106 => ApiStatus::AuthTokenInvalid,
            1107 => ApiStatus::VerificationFailed,
            1108 => ApiStatus::IllegalOperation,
            1109 => ApiStatus::BuildError,
            1110 => ApiStatus::IllegalParameter,
            1111 => ApiStatus::NotFound,
            1112 => ApiStatus::AuthenticationFailed,
            1113 => ApiStatus::PasswordBackOff,
            other => ApiStatus::Unknown(other),
        }
    }

    pub fn code(&self) -> u32 {
        match self {
            ApiStatus::Ok => 100,
            ApiStatus::OkDeployStarted => 101,
            ApiStatus::OkPartially => 102,
            ApiStatus::ErrorGeneric => 1000,
            ApiStatus::CaptainNotInitialized => 1001,
            ApiStatus::UserNotInitialized => 1101,
            ApiStatus::NotAuthorized => 1102,
            ApiStatus::AlreadyExists => 1103,
            ApiStatus::BadName => 1104,
            ApiStatus::WrongPassword => 1105,
            ApiStatus::AuthTokenInvalid => 1106,
            ApiStatus::VerificationFailed => 1107,
            ApiStatus::IllegalOperation => 1108,
            ApiStatus::BuildError => 1109,
            ApiStatus::IllegalParameter => 1110,
            ApiStatus::NotFound => 1111,
            ApiStatus::AuthenticationFailed => 1112,
            ApiStatus::PasswordBackOff => 1113,
            ApiStatus::Unknown(code) => *code,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApiStatus::Ok => "ok",
            ApiStatus::OkDeployStarted => "ok, deploy started",
            ApiStatus::OkPartially => "ok, partially",
            ApiStatus::ErrorGeneric => "generic error",
            ApiStatus::CaptainNotInitialized => "captain not initialized",
            ApiStatus::UserNotInitialized => "user not initialized",
            ApiStatus::NotAuthorized => "not authorized",
            ApiStatus::AlreadyExists => "already exists",
            ApiStatus::BadName => "bad name",
            ApiStatus::WrongPassword => "wrong password",
            ApiStatus::AuthTokenInvalid => "auth token invalid",
            ApiStatus::VerificationFailed => "verification failed",
            ApiStatus::IllegalOperation => "illegal operation",
            ApiStatus::BuildError => "build error",
            ApiStatus::IllegalParameter => "illegal parameter",
            ApiStatus::NotFound => "not found",
            ApiStatus::AuthenticationFailed => "authentication failed",
            ApiStatus::PasswordBackOff => "password back off",
            ApiStatus::Unknown(_) => "unrecognized status",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ApiStatus::Ok | ApiStatus::OkDeployStarted | ApiStatus::OkPartially
        )
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.label())
    }
}

/// The wrapper every platform response arrives in.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: u32,

    #[serde(default)]
    pub description: String,

    pub data: T,
}

/// Unwrap an envelope, turning non-success status codes into errors.
pub fn unwrap_envelope<T>(envelope: Envelope<T>) -> Result<T, PlatformError> {
    let status = ApiStatus::from_code(envelope.status);
    if status.is_success() {
        Ok(envelope.data)
    } else {
        Err(PlatformError::Api {
            status,
            description: envelope.description,
        })
    }
}
