/// 验证上传文件的魔术字节是否与扩展名匹配
///
/// 名册导入只接受 xlsx / xls / csv，其余扩展名一律拒绝
pub fn validate_magic_bytes(data: &[u8], extension: &str) -> bool {
    if data.is_empty() {
        return false;
    }

    match extension.to_lowercase().as_str() {
        // OOXML (ZIP 容器)
        ".xlsx" => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),
        // OLE Compound Document
        ".xls" => data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
        // 文本格式不检查魔术字节
        ".csv" => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xlsx_magic() {
        let zip_header = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert!(validate_magic_bytes(&zip_header, ".xlsx"));
        assert!(validate_magic_bytes(&zip_header, ".XLSX"));
        assert!(!validate_magic_bytes(&zip_header, ".xls"));
    }

    #[test]
    fn test_xls_magic() {
        let ole_header = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        assert!(validate_magic_bytes(&ole_header, ".xls"));
        assert!(!validate_magic_bytes(&ole_header, ".xlsx"));
    }

    #[test]
    fn test_csv_skips_check() {
        assert!(validate_magic_bytes(b"employee_no,first_name", ".csv"));
    }

    #[test]
    fn test_empty_data() {
        assert!(!validate_magic_bytes(&[], ".csv"));
        assert!(!validate_magic_bytes(&[], ".xlsx"));
    }

    #[test]
    fn test_unknown_extension() {
        assert!(!validate_magic_bytes(&[0x50, 0x4B, 0x03, 0x04], ".zip"));
        assert!(!validate_magic_bytes(b"%PDF-1.4", ".pdf"));
    }
}
