use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 导入任务状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub enum ImportJobStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

// 进程内导入任务（单实例部署，不落库）
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub struct ImportJob {
    /// UUID
    pub id: String,
    pub school_id: i64,
    pub status: ImportJobStatus,
    pub retry_count: i64,
    pub last_error: Option<String>,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub total_rows: i64,
    pub processed: i64,
    pub success: i64,
    pub failed: i64,
}

// 每所学校的导入指标汇总
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/import.ts")]
pub struct ImportMetrics {
    pub total_runs: i64,
    pub total_success: i64,
    pub total_failed: i64,
    pub success_rate: f64,
    pub retry_rate: f64,
    pub mean_latency_ms: f64,
}
