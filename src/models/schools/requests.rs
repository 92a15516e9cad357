use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 学校查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/school.ts")]
pub struct SchoolListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

// 学校创建请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/school.ts")]
pub struct CreateSchoolRequest {
    pub name: String,
    pub timezone: Option<String>,
    pub late_threshold_minutes: Option<i64>,
    pub absence_cutoff_minutes: Option<i64>,
    /// 同时创建一个学校管理员账号
    pub admin: Option<SeedAdminRequest>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/school.ts")]
pub struct SeedAdminRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

// 学校更新请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/school.ts")]
pub struct UpdateSchoolRequest {
    pub name: Option<String>,
    pub timezone: Option<String>,
    pub late_threshold_minutes: Option<i64>,
    pub absence_cutoff_minutes: Option<i64>,
    pub is_active: Option<bool>,
    /// 置 true 时轮换 webhook secret
    pub rotate_webhook_secret: Option<bool>,
}
