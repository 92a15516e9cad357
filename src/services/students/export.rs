//! 名册导出与导入模板

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashMap;
use tracing::error;

use super::StudentService;
use crate::models::students::entities::Student;
use crate::models::students::requests::{StudentExportParams, StudentListQuery};
use crate::models::{ApiResponse, ErrorCode};

/// 单次导出上限
const EXPORT_LIMIT: i64 = 10_000;

/// 模板与导入共用的列头
pub(crate) const TEMPLATE_HEADERS: [&str; 7] = [
    "employee_no",
    "first_name",
    "last_name",
    "father_name",
    "class",
    "parent_phone",
    "gender",
];

pub async fn export_students(
    service: &StudentService,
    school_id: i64,
    params: StudentExportParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let list_query = StudentListQuery {
        page: Some(1),
        size: Some(EXPORT_LIMIT),
        class_id: params.class_id,
        search: None,
        is_active: params.is_active,
    };
    let students = match storage
        .list_students_with_pagination(school_id, list_query)
        .await
    {
        Ok(response) => response.items,
        Err(e) => {
            error!("Roster export failed: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Roster export failed: {e}"),
                )),
            );
        }
    };

    // 班级 id -> 名称映射，导出里写名称而不是 id
    let class_names: HashMap<i64, String> = match storage.list_school_classes(school_id).await {
        Ok(classes) => classes.into_iter().map(|c| (c.id, c.name)).collect(),
        Err(e) => {
            error!("Roster export failed: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("Roster export failed: {e}"),
                )),
            );
        }
    };

    match params.format.as_str() {
        "csv" => export_csv(&students, &class_names),
        _ => export_xlsx(&students, &class_names),
    }
}

/// 下载导入模板
pub async fn download_template(format: &str) -> ActixResult<HttpResponse> {
    match format {
        "csv" => generate_template_csv(),
        _ => generate_template_xlsx(),
    }
}

fn export_csv(
    students: &[Student],
    class_names: &HashMap<i64, String>,
) -> ActixResult<HttpResponse> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "device_student_id",
        "full_name",
        "first_name",
        "last_name",
        "father_name",
        "class",
        "gender",
        "parent_phone",
        "is_active",
        "device_sync_status",
    ])
    .map_err(|e| {
        error!("CSV 写入失败: {}", e);
        actix_web::error::ErrorInternalServerError(format!("CSV 写入失败: {e}"))
    })?;

    for student in students {
        wtr.write_record([
            student.device_student_id.clone(),
            student.full_name.clone(),
            student.first_name.clone(),
            student.last_name.clone(),
            student.father_name.clone().unwrap_or_default(),
            class_names
                .get(&student.class_id)
                .cloned()
                .unwrap_or_default(),
            student.gender.to_string(),
            student.parent_phone.clone().unwrap_or_default(),
            student.is_active.to_string(),
            student.device_sync_status.to_string(),
        ])
        .map_err(|e| {
            error!("CSV 写入失败: {}", e);
            actix_web::error::ErrorInternalServerError(format!("CSV 写入失败: {e}"))
        })?;
    }

    let data = wtr.into_inner().map_err(|e| {
        error!("CSV 生成失败: {}", e);
        actix_web::error::ErrorInternalServerError(format!("CSV 生成失败: {e}"))
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(("Content-Disposition", "attachment; filename=\"students.csv\""))
        .body(data))
}

fn export_xlsx(
    students: &[Student],
    class_names: &HashMap<i64, String>,
) -> ActixResult<HttpResponse> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    let headers = [
        "Employee No",
        "Full Name",
        "First Name",
        "Last Name",
        "Father Name",
        "Class",
        "Gender",
        "Parent Phone",
        "Active",
        "Sync Status",
    ];
    for (col, header) in headers.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| {
                error!("XLSX 写入失败: {}", e);
                actix_web::error::ErrorInternalServerError(format!("XLSX 写入失败: {e}"))
            })?;
    }

    for (row, student) in students.iter().enumerate() {
        let row = (row + 1) as u32;
        worksheet.write_string(row, 0, &student.device_student_id).ok();
        worksheet.write_string(row, 1, &student.full_name).ok();
        worksheet.write_string(row, 2, &student.first_name).ok();
        worksheet.write_string(row, 3, &student.last_name).ok();
        worksheet
            .write_string(row, 4, student.father_name.as_deref().unwrap_or(""))
            .ok();
        worksheet
            .write_string(
                row,
                5,
                class_names
                    .get(&student.class_id)
                    .map(String::as_str)
                    .unwrap_or(""),
            )
            .ok();
        worksheet.write_string(row, 6, student.gender.to_string()).ok();
        worksheet
            .write_string(row, 7, student.parent_phone.as_deref().unwrap_or(""))
            .ok();
        worksheet
            .write_string(row, 8, if student.is_active { "yes" } else { "no" })
            .ok();
        worksheet
            .write_string(row, 9, student.device_sync_status.to_string())
            .ok();
    }

    let buffer = workbook.save_to_buffer().map_err(|e| {
        error!("XLSX 生成失败: {}", e);
        actix_web::error::ErrorInternalServerError(format!("XLSX 生成失败: {e}"))
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .insert_header(("Content-Disposition", "attachment; filename=\"students.xlsx\""))
        .body(buffer))
}

fn generate_template_csv() -> ActixResult<HttpResponse> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(TEMPLATE_HEADERS).map_err(|e| {
        error!("CSV 写入失败: {}", e);
        actix_web::error::ErrorInternalServerError(format!("CSV 写入失败: {e}"))
    })?;

    // 示例行
    wtr.write_record([
        "10234",
        "Aziz",
        "Karimov",
        "Bakhtiyor",
        "5-A",
        "+998901234567",
        "male",
    ])
    .map_err(|e| {
        error!("CSV 写入失败: {}", e);
        actix_web::error::ErrorInternalServerError(format!("CSV 写入失败: {e}"))
    })?;

    let data = wtr.into_inner().map_err(|e| {
        error!("CSV 生成失败: {}", e);
        actix_web::error::ErrorInternalServerError(format!("CSV 生成失败: {e}"))
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"student_import_template.csv\"",
        ))
        .body(data))
}

fn generate_template_xlsx() -> ActixResult<HttpResponse> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let header_format = Format::new().set_bold();
    for (col, header) in TEMPLATE_HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(|e| {
                error!("XLSX 写入失败: {}", e);
                actix_web::error::ErrorInternalServerError(format!("XLSX 写入失败: {e}"))
            })?;
    }

    worksheet.write_string(1, 0, "10234").ok();
    worksheet.write_string(1, 1, "Aziz").ok();
    worksheet.write_string(1, 2, "Karimov").ok();
    worksheet.write_string(1, 3, "Bakhtiyor").ok();
    worksheet.write_string(1, 4, "5-A").ok();
    worksheet.write_string(1, 5, "+998901234567").ok();
    worksheet.write_string(1, 6, "male").ok();

    let buffer = workbook.save_to_buffer().map_err(|e| {
        error!("XLSX 生成失败: {}", e);
        actix_web::error::ErrorInternalServerError(format!("XLSX 生成失败: {e}"))
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
        .insert_header((
            "Content-Disposition",
            "attachment; filename=\"student_import_template.xlsx\"",
        ))
        .body(buffer))
}
