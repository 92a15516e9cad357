use super::entities::Gender;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

// 学生查询参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub class_id: Option<i64>,
    /// 按姓名或设备工号模糊查询
    pub search: Option<String>,
    pub is_active: Option<bool>,
}

// 学生更新请求
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct UpdateStudentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub father_name: Option<String>,
    pub gender: Option<Gender>,
    pub class_id: Option<i64>,
    pub parent_phone: Option<String>,
    pub device_student_id: Option<String>,
    pub is_active: Option<bool>,
}

// 下发开通请求（provisioning start）
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct ProvisionStudentRequest {
    pub first_name: String,
    pub last_name: String,
    pub father_name: Option<String>,
    pub gender: Gender,
    pub class_id: i64,
    pub parent_phone: Option<String>,
    /// 指定则校验唯一性，缺省则自动生成
    pub device_student_id: Option<String>,
    /// 目标设备，缺省为学校全部启用设备
    pub device_ids: Option<Vec<i64>>,
    /// 幂等重放键
    pub request_id: Option<String>,
    /// 同名学生已存在时强制继续
    #[serde(default)]
    pub force_duplicate_name: bool,
}

// 名册导出参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct StudentExportParams {
    /// xlsx 或 csv，默认 xlsx
    #[serde(default = "default_export_format")]
    pub format: String,
    pub class_id: Option<i64>,
    pub is_active: Option<bool>,
}

// 模板下载参数
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/student.ts")]
pub struct TemplateParams {
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String {
    "xlsx".to_string()
}

// 学生列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct StudentListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub class_id: Option<i64>,
    pub search: Option<String>,
    pub is_active: Option<bool>,
}
