//! 名册文件导入
//!
//! 接收 multipart 上传的 xlsx / xls / csv 名册，表头宽松匹配，
//! 逐行校验后批量建档。已存在的设备工号跳过，不覆盖人工维护的数据。

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use calamine::{Reader, Xls, Xlsx};
use futures_util::StreamExt;
use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use tracing::{error, info};

use super::StudentService;
use crate::models::students::entities::Gender;
use crate::models::students::responses::{ImportRowError, StudentImportResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::StudentUpsertData;
use crate::utils::name::{build_full_name, normalize_gender, normalize_header, normalize_name_part};
use crate::utils::validate_magic_bytes;

/// 导入解析错误
#[derive(Debug)]
enum ImportParseError {
    MissingColumn(String),
    ParseFailed(String),
    EmptyFile,
}

impl ImportParseError {
    fn error_code(&self) -> ErrorCode {
        match self {
            Self::MissingColumn(_) => ErrorCode::ImportFileMissingColumn,
            Self::ParseFailed(_) => ErrorCode::ImportFileParseFailed,
            Self::EmptyFile => ErrorCode::ImportFileDataInvalid,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::MissingColumn(col) => format!("缺少必需列: {col}"),
            Self::ParseFailed(msg) => msg.clone(),
            Self::EmptyFile => "文件中没有数据".to_string(),
        }
    }
}

/// 导入行数据（原始字符串，校验后再转换）
#[derive(Debug, Clone)]
struct ImportRow {
    row_num: usize,
    employee_no: String,
    first_name: String,
    last_name: String,
    father_name: Option<String>,
    class_name: String,
    parent_phone: Option<String>,
    gender: String,
}

impl ImportRow {
    /// 表格末尾常见的全空行，跳过而不是报错
    fn is_blank(&self) -> bool {
        self.employee_no.is_empty()
            && self.first_name.is_empty()
            && self.last_name.is_empty()
            && self.father_name.is_none()
            && self.class_name.is_empty()
            && self.parent_phone.is_none()
            && self.gender.is_empty()
    }
}

/// 表头列位置
struct ColumnIndex {
    employee_no: usize,
    first_name: usize,
    last_name: usize,
    father_name: Option<usize>,
    class: usize,
    parent_phone: Option<usize>,
    gender: usize,
}

impl ColumnIndex {
    /// 宽松匹配表头：大小写、星号、同义词都接受
    fn resolve(headers: &[String]) -> Result<Self, ImportParseError> {
        let map: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (normalize_header(h), i))
            .collect();

        let find = |names: &[&str]| names.iter().find_map(|n| map.get(*n).copied());

        Ok(Self {
            employee_no: find(&["employee_no", "employee no", "person id", "device_student_id"])
                .ok_or_else(|| ImportParseError::MissingColumn("employee_no".to_string()))?,
            first_name: find(&["first_name", "first name"])
                .ok_or_else(|| ImportParseError::MissingColumn("first_name".to_string()))?,
            last_name: find(&["last_name", "last name"])
                .ok_or_else(|| ImportParseError::MissingColumn("last_name".to_string()))?,
            father_name: find(&["father_name", "father name", "middle name"]),
            class: find(&["class", "class_name", "class name"])
                .ok_or_else(|| ImportParseError::MissingColumn("class".to_string()))?,
            parent_phone: find(&["parent_phone", "parent phone", "phone"]),
            gender: find(&["gender", "sex"])
                .ok_or_else(|| ImportParseError::MissingColumn("gender".to_string()))?,
        })
    }
}

pub async fn import_students(
    service: &StudentService,
    school_id: i64,
    mut payload: Multipart,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let config = service.get_config();

    let (file_bytes, file_name) = match read_file_from_multipart(&mut payload).await {
        Ok(result) => result,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::BadRequest,
                format!("文件读取失败: {e}"),
            )));
        }
    };

    if file_bytes.len() > config.import.max_file_size {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileSizeExceeded,
            "上传文件超出大小限制",
        )));
    }

    let extension = file_name
        .rfind('.')
        .map(|i| file_name[i..].to_lowercase())
        .unwrap_or_default();
    if !validate_magic_bytes(&file_bytes, &extension) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileTypeNotAllowed,
            "仅支持 xlsx / xls / csv 名册文件",
        )));
    }

    let rows = match parse_file(&file_bytes, &extension) {
        Ok(rows) => rows,
        Err(e) => {
            return Ok(HttpResponse::BadRequest()
                .json(ApiResponse::error_empty(e.error_code(), e.message())));
        }
    };

    if rows.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileDataInvalid,
            "文件中没有数据行",
        )));
    }

    if rows.len() > config.import.max_rows {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ImportFileDataInvalid,
            format!("单次导入最多支持 {} 行", config.import.max_rows),
        )));
    }

    // 班级名 -> id 映射
    let class_ids: HashMap<String, i64> = match storage.list_school_classes(school_id).await {
        Ok(classes) => classes
            .into_iter()
            .map(|c| (c.name.to_lowercase(), c.id))
            .collect(),
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("名册导入失败: {e}"),
                )),
            );
        }
    };

    // 校验并转换
    let mut errors: Vec<ImportRowError> = Vec::new();
    let mut valid: Vec<(usize, String, StudentUpsertData)> = Vec::new();
    let mut seen_nos: HashSet<String> = HashSet::new();

    for row in &rows {
        match convert_row(row, &class_ids) {
            Ok(data) => {
                if !seen_nos.insert(data.device_student_id.clone()) {
                    errors.push(ImportRowError {
                        row: row.row_num,
                        message: format!("批内重复的工号 {}", data.device_student_id),
                    });
                    continue;
                }
                valid.push((row.row_num, data.device_student_id.clone(), data));
            }
            Err(message) => errors.push(ImportRowError {
                row: row.row_num,
                message,
            }),
        }
    }
    let failed = errors.len();

    // 已存在的工号跳过，不覆盖
    let device_ids: Vec<String> = valid.iter().map(|(_, no, _)| no.clone()).collect();
    let existing: HashSet<String> = match storage
        .find_students_by_device_ids(school_id, &device_ids)
        .await
    {
        Ok(students) => students.into_iter().map(|s| s.device_student_id).collect(),
        Err(e) => {
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    format!("名册导入失败: {e}"),
                )),
            );
        }
    };

    let mut skipped = 0;
    let mut to_create: Vec<StudentUpsertData> = Vec::new();
    for (row_num, device_student_id, data) in valid {
        if existing.contains(&device_student_id) {
            skipped += 1;
            errors.push(ImportRowError {
                row: row_num,
                message: format!("工号 {device_student_id} 已存在，跳过"),
            });
        } else {
            to_create.push(data);
        }
    }

    let success = if to_create.is_empty() {
        0
    } else {
        match storage.bulk_upsert_students(school_id, to_create).await {
            Ok(outcome) => (outcome.created.len() + outcome.updated.len()) as i64,
            Err(e) => {
                error!("Roster import failed: {}", e);
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                        ErrorCode::InternalServerError,
                        format!("名册导入失败: {e}"),
                    )),
                );
            }
        }
    };

    info!(
        "Roster import for school {}: {} rows, {} created, {} skipped, {} failed",
        school_id,
        rows.len(),
        success,
        skipped,
        failed
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentImportResponse {
            total: rows.len(),
            success: success as usize,
            skipped,
            failed,
            errors,
        },
        "导入完成",
    )))
}

fn convert_row(row: &ImportRow, class_ids: &HashMap<String, i64>) -> Result<StudentUpsertData, String> {
    if row.employee_no.is_empty() {
        return Err("缺少工号".to_string());
    }
    if row.first_name.is_empty() || row.last_name.is_empty() {
        return Err("缺少姓名".to_string());
    }

    let gender: Gender =
        normalize_gender(&row.gender).ok_or_else(|| format!("无法识别的性别: {}", row.gender))?;

    let class_id = *class_ids
        .get(&row.class_name.to_lowercase())
        .ok_or_else(|| format!("班级不存在: {}", row.class_name))?;

    let first_name = normalize_name_part(&row.first_name);
    let last_name = normalize_name_part(&row.last_name);
    let full_name = build_full_name(&last_name, &first_name);

    Ok(StudentUpsertData {
        class_id,
        first_name,
        last_name,
        father_name: row
            .father_name
            .clone()
            .map(|n| normalize_name_part(&n))
            .filter(|n| !n.is_empty()),
        full_name,
        gender,
        parent_phone: row.parent_phone.clone().filter(|p| !p.is_empty()),
        device_student_id: row.employee_no.clone(),
    })
}

async fn read_file_from_multipart(payload: &mut Multipart) -> Result<(Vec<u8>, String), String> {
    let mut file_bytes = Vec::new();
    let mut file_name = String::new();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| format!("读取字段失败: {e}"))?;

        if field.name().map(|n| n == "file").unwrap_or(false) {
            if let Some(content_disposition) = field.content_disposition() {
                file_name = content_disposition
                    .get_filename()
                    .unwrap_or("upload.csv")
                    .to_string();
            }

            while let Some(chunk) = field.next().await {
                let data = chunk.map_err(|e| format!("读取数据失败: {e}"))?;
                file_bytes.extend_from_slice(&data);
            }
        }
    }

    if file_bytes.is_empty() {
        return Err("未找到文件字段".to_string());
    }

    Ok((file_bytes, file_name))
}

fn parse_file(data: &[u8], extension: &str) -> Result<Vec<ImportRow>, ImportParseError> {
    match extension {
        ".xlsx" => parse_sheet(
            Xlsx::new(Cursor::new(data))
                .map_err(|e| ImportParseError::ParseFailed(format!("打开 XLSX 失败: {e}")))?,
        ),
        ".xls" => parse_sheet(
            Xls::new(Cursor::new(data))
                .map_err(|e| ImportParseError::ParseFailed(format!("打开 XLS 失败: {e}")))?,
        ),
        _ => parse_csv(data),
    }
}

fn parse_csv(data: &[u8]) -> Result<Vec<ImportRow>, ImportParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(data));

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| ImportParseError::ParseFailed(format!("读取表头失败: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut rows = Vec::new();
    for (row_num, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| {
            ImportParseError::ParseFailed(format!("第 {} 行解析失败: {e}", row_num + 2))
        })?;
        let get = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
        let get_opt =
            |idx: Option<usize>| idx.map(|i| get(i)).filter(|s| !s.is_empty());

        let row = ImportRow {
            row_num: row_num + 2, // 1-based, skip header
            employee_no: get(columns.employee_no),
            first_name: get(columns.first_name),
            last_name: get(columns.last_name),
            father_name: get_opt(columns.father_name),
            class_name: get(columns.class),
            parent_phone: get_opt(columns.parent_phone),
            gender: get(columns.gender),
        };
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

fn parse_sheet<'a, R>(mut workbook: R) -> Result<Vec<ImportRow>, ImportParseError>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: std::fmt::Display,
{
    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = sheet_names
        .first()
        .ok_or_else(|| ImportParseError::ParseFailed("工作簿中没有工作表".to_string()))?;

    let range = workbook
        .worksheet_range(sheet_name)
        .map_err(|e| ImportParseError::ParseFailed(format!("读取工作表失败: {e}")))?;

    let mut rows_iter = range.rows();

    let header_row = rows_iter.next().ok_or(ImportParseError::EmptyFile)?;
    let headers: Vec<String> = header_row.iter().map(|cell| cell.to_string()).collect();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut rows = Vec::new();
    for (row_num, row) in rows_iter.enumerate() {
        let get = |idx: usize| -> String {
            row.get(idx)
                .map(|c| c.to_string().trim().to_string())
                .unwrap_or_default()
        };
        let get_opt = |idx: Option<usize>| idx.map(get).filter(|s| !s.is_empty());

        let row = ImportRow {
            row_num: row_num + 2, // 1-based, skip header
            employee_no: get(columns.employee_no),
            first_name: get(columns.first_name),
            last_name: get(columns.last_name),
            father_name: get_opt(columns.father_name),
            class_name: get(columns.class),
            parent_phone: get_opt(columns.parent_phone),
            gender: get(columns.gender),
        };
        if row.is_blank() {
            continue;
        }
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::parse_csv;

    // 表格末尾的全空行不应计入失败行
    #[test]
    fn blank_trailing_rows_are_skipped() {
        let data = b"employee_no,first_name,last_name,class,gender\n\
            10001,Alisher,Karimov,1-A,male\n\
            ,,,,\n\
            ,,,,\n";
        let rows = parse_csv(data).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].employee_no, "10001");
        assert_eq!(rows[0].row_num, 2);
    }

    // 只填了部分列的行要保留，交给校验报错
    #[test]
    fn partially_filled_rows_are_kept() {
        let data = b"employee_no,first_name,last_name,class,gender\n\
            ,Alisher,Karimov,1-A,male\n";
        let rows = parse_csv(data).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].employee_no.is_empty());
    }
}
