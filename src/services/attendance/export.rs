//! 区间报表的 xlsx 导出

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rust_xlsxwriter::{Format, Workbook};
use tracing::error;

use super::report::{aggregate_days, validate_range};
use super::AttendanceService;
use crate::models::attendance::requests::ReportQuery;
use crate::models::{ApiResponse, ErrorCode};

pub async fn export_report(
    service: &AttendanceService,
    school_id: i64,
    query: ReportQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    if let Err(response) = validate_range(&query) {
        return Ok(response);
    }

    let records = match storage
        .list_attendance_range(school_id, &query.from, &query.to, query.class_id)
        .await
    {
        Ok(records) => records,
        Err(e) => {
            error!("Attendance export failed: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Attendance export failed: {e}"),
                )),
            );
        }
    };
    let days = aggregate_days(&records);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    let headers = ["Date", "Present", "Late", "Absent", "Excused"];
    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| {
                error!("XLSX 写入失败: {}", e);
                actix_web::error::ErrorInternalServerError(format!("XLSX 写入失败: {e}"))
            })?;
    }

    for (row, day) in days.iter().enumerate() {
        let row = (row + 1) as u32;
        worksheet.write_string(row, 0, &day.date).ok();
        worksheet.write_number(row, 1, day.present as f64).ok();
        worksheet.write_number(row, 2, day.late as f64).ok();
        worksheet.write_number(row, 3, day.absent as f64).ok();
        worksheet.write_number(row, 4, day.excused as f64).ok();
    }

    let buffer = workbook.save_to_buffer().map_err(|e| {
        error!("XLSX 生成失败: {}", e);
        actix_web::error::ErrorInternalServerError(format!("XLSX 生成失败: {e}"))
    })?;

    let filename = format!("attendance_{}_{}_{}.xlsx", school_id, query.from, query.to);
    Ok(HttpResponse::Ok()
        .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(buffer))
}
