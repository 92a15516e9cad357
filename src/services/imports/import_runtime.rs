/*!
 * 导入运行时状态
 *
 * 单实例部署假设下的进程内状态：导入任务、幂等结果缓存、
 * 按 (school_id, employee_no) 的导入锁、按学校的指标汇总。
 * 全部用 dashmap 承载，不落库，进程重启即清空。
 */

use dashmap::DashMap;
use once_cell::sync::Lazy;

use crate::models::imports::entities::{ImportJob, ImportJobStatus, ImportMetrics};
use crate::models::imports::responses::DeviceImportCommitResponse;

static IMPORT_RUNTIME: Lazy<ImportRuntime> = Lazy::new(ImportRuntime::new);

/// 指标累加器，对外换算成 ImportMetrics
#[derive(Debug, Default, Clone)]
struct MetricsAccumulator {
    total_runs: i64,
    total_success: i64,
    total_failed: i64,
    retry_runs: i64,
    total_latency_ms: i64,
}

pub struct ImportRuntime {
    /// job_id -> 任务快照
    jobs: DashMap<String, ImportJob>,
    /// "school_id:idempotency_key" -> 已提交结果
    idempotent_results: DashMap<String, DeviceImportCommitResponse>,
    /// "school_id:employee_no" -> 持锁 job_id
    locks: DashMap<String, String>,
    /// school_id -> 指标
    metrics: DashMap<i64, MetricsAccumulator>,
}

impl ImportRuntime {
    fn new() -> Self {
        Self {
            jobs: DashMap::new(),
            idempotent_results: DashMap::new(),
            locks: DashMap::new(),
            metrics: DashMap::new(),
        }
    }

    pub fn get() -> &'static Self {
        &IMPORT_RUNTIME
    }

    pub fn create_job(&self, school_id: i64, total_rows: i64) -> ImportJob {
        let job = ImportJob {
            id: uuid::Uuid::new_v4().to_string(),
            school_id,
            status: ImportJobStatus::Pending,
            retry_count: 0,
            last_error: None,
            started_at: chrono::Utc::now(),
            finished_at: None,
            total_rows,
            processed: 0,
            success: 0,
            failed: 0,
        };
        self.jobs.insert(job.id.clone(), job.clone());
        job
    }

    pub fn get_job(&self, job_id: &str) -> Option<ImportJob> {
        self.jobs.get(job_id).map(|j| j.clone())
    }

    pub fn mark_processing(&self, job_id: &str) {
        if let Some(mut job) = self.jobs.get_mut(job_id) {
            job.status = ImportJobStatus::Processing;
        }
    }

    pub fn mark_success(&self, job_id: &str, processed: i64) {
        if let Some(mut job) = self.jobs.get_mut(job_id) {
            job.status = ImportJobStatus::Success;
            job.processed = processed;
            job.success = processed;
            job.finished_at = Some(chrono::Utc::now());
        }
    }

    pub fn mark_failed(&self, job_id: &str, error: &str) {
        if let Some(mut job) = self.jobs.get_mut(job_id) {
            job.status = ImportJobStatus::Failed;
            job.failed = job.total_rows;
            job.last_error = Some(error.to_string());
            job.finished_at = Some(chrono::Utc::now());
        }
    }

    /// 整批获取锁：任何一个工号已被占用则全部不取，返回冲突的工号列表
    pub fn acquire_locks(
        &self,
        school_id: i64,
        employee_nos: &[String],
        job_id: &str,
    ) -> Result<(), Vec<String>> {
        let conflicts: Vec<String> = employee_nos
            .iter()
            .filter(|no| self.locks.contains_key(&lock_key(school_id, no)))
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            return Err(conflicts);
        }
        for no in employee_nos {
            self.locks
                .insert(lock_key(school_id, no), job_id.to_string());
        }
        Ok(())
    }

    /// 释放本批锁，成功失败都要调用
    pub fn release_locks(&self, school_id: i64, employee_nos: &[String]) {
        for no in employee_nos {
            self.locks.remove(&lock_key(school_id, no));
        }
    }

    pub fn cache_result(
        &self,
        school_id: i64,
        idempotency_key: &str,
        result: DeviceImportCommitResponse,
    ) {
        self.idempotent_results
            .insert(result_key(school_id, idempotency_key), result);
    }

    pub fn cached_result(
        &self,
        school_id: i64,
        idempotency_key: &str,
    ) -> Option<DeviceImportCommitResponse> {
        self.idempotent_results
            .get(&result_key(school_id, idempotency_key))
            .map(|r| r.clone())
    }

    pub fn record_run(&self, school_id: i64, success: bool, retry: bool, latency_ms: i64) {
        let mut entry = self.metrics.entry(school_id).or_default();
        entry.total_runs += 1;
        if success {
            entry.total_success += 1;
        } else {
            entry.total_failed += 1;
        }
        if retry {
            entry.retry_runs += 1;
        }
        entry.total_latency_ms += latency_ms;
    }

    pub fn metrics(&self, school_id: i64) -> ImportMetrics {
        let acc = self
            .metrics
            .get(&school_id)
            .map(|m| m.clone())
            .unwrap_or_default();
        let runs = acc.total_runs;
        ImportMetrics {
            total_runs: runs,
            total_success: acc.total_success,
            total_failed: acc.total_failed,
            success_rate: ratio(acc.total_success, runs),
            retry_rate: ratio(acc.retry_runs, runs),
            mean_latency_ms: if runs == 0 {
                0.0
            } else {
                acc.total_latency_ms as f64 / runs as f64
            },
        }
    }
}

fn lock_key(school_id: i64, employee_no: &str) -> String {
    format!("{school_id}:{employee_no}")
}

fn result_key(school_id: i64, idempotency_key: &str) -> String {
    format!("{school_id}:{idempotency_key}")
}

fn ratio(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locks_are_all_or_nothing() {
        let runtime = ImportRuntime::new();
        let first = vec!["100".to_string(), "101".to_string()];
        assert!(runtime.acquire_locks(1, &first, "job-a").is_ok());

        // 与已持有的 101 冲突，整批拒绝，102 也不能被占用
        let second = vec!["101".to_string(), "102".to_string()];
        let conflicts = runtime.acquire_locks(1, &second, "job-b").unwrap_err();
        assert_eq!(conflicts, vec!["101".to_string()]);
        assert!(!runtime.locks.contains_key("1:102"));

        // 另一所学校的同名工号互不影响
        assert!(runtime.acquire_locks(2, &second, "job-c").is_ok());

        runtime.release_locks(1, &first);
        assert!(runtime.acquire_locks(1, &second, "job-b").is_ok());
    }

    #[test]
    fn test_job_lifecycle() {
        let runtime = ImportRuntime::new();
        let job = runtime.create_job(1, 5);
        assert_eq!(job.status, ImportJobStatus::Pending);

        runtime.mark_processing(&job.id);
        assert_eq!(
            runtime.get_job(&job.id).unwrap().status,
            ImportJobStatus::Processing
        );

        runtime.mark_success(&job.id, 5);
        let done = runtime.get_job(&job.id).unwrap();
        assert_eq!(done.status, ImportJobStatus::Success);
        assert_eq!(done.success, 5);
        assert!(done.finished_at.is_some());
    }

    #[test]
    fn test_metrics_aggregation() {
        let runtime = ImportRuntime::new();
        runtime.record_run(1, true, false, 100);
        runtime.record_run(1, true, true, 300);
        runtime.record_run(1, false, false, 200);

        let metrics = runtime.metrics(1);
        assert_eq!(metrics.total_runs, 3);
        assert_eq!(metrics.total_success, 2);
        assert_eq!(metrics.total_failed, 1);
        assert!((metrics.retry_rate - 1.0 / 3.0).abs() < 1e-9);
        assert!((metrics.mean_latency_ms - 200.0).abs() < 1e-9);

        // 没有记录的学校返回零值
        assert_eq!(runtime.metrics(42).total_runs, 0);
    }
}
