//! 数据模型定义
//!
//! 按领域划分：requests（HTTP 请求）、responses（HTTP 响应）、entities（业务实体）。
//! 所有对外模型通过 ts-rs 导出 TypeScript 类型给前端使用。

pub mod common;

pub mod attendance;
pub mod auth;
pub mod classes;
pub mod dashboard;
pub mod devices;
pub mod imports;
pub mod provisioning;
pub mod schools;
pub mod students;
pub mod users;

pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::ApiResponse;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 业务错误码，随 ApiResponse 一起返回
///
/// 约定：0 表示成功，其余按 HTTP 状态码分段（40000 段对应 400，以此类推）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/error_code.ts")]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 400
    BadRequest = 40000,
    ImportFileDataInvalid = 40001,
    ImportFileParseFailed = 40002,
    ImportFileMissingColumn = 40003,
    FileTypeNotAllowed = 40004,
    FileSizeExceeded = 40005,
    UserNameInvalid = 40006,
    UserEmailInvalid = 40007,
    UserPasswordInvalid = 40008,
    DeviceNameAmbiguous = 40009,

    // 401
    Unauthorized = 40100,
    AuthFailed = 40101,
    WebhookAuthFailed = 40102,

    // 403
    Forbidden = 40300,
    SchoolPermissionDenied = 40301,

    // 404
    NotFound = 40400,
    UserNotFound = 40401,
    SchoolNotFound = 40402,
    ClassNotFound = 40403,
    StudentNotFound = 40404,
    DeviceNotFound = 40405,
    ProvisioningNotFound = 40406,
    ImportJobNotFound = 40407,

    // 409
    Conflict = 40900,
    UserAlreadyExists = 40901,
    UserEmailAlreadyExists = 40902,
    DuplicateDeviceStudentId = 40903,
    DuplicateStudentName = 40904,
    DeviceSnAlreadyExists = 40905,
    ClassAlreadyExists = 40906,
    ImportLockConflict = 40907,

    // 429
    RateLimitExceeded = 42900,

    // 500
    InternalServerError = 50000,
}

/// 程序启动时间，用于统计启动耗时
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}
