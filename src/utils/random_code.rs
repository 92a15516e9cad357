use rand::Rng;

/// 生成指定长度的随机数字串（首位不为 0），用于设备学号分配
pub fn numeric_code(length: usize) -> String {
    let mut rng = rand::rng();
    let mut out = String::with_capacity(length);
    out.push(char::from(b'1' + rng.random_range(0..9u8)));
    for _ in 1..length {
        out.push(char::from(b'0' + rng.random_range(0..10u8)));
    }
    out
}

/// 生成随机密码（用于初始化管理员账号）
pub fn random_password(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 生成 webhook 共享密钥（十六进制）
pub fn webhook_secret() -> String {
    let mut rng = rand::rng();
    (0..32)
        .map(|_| format!("{:x}", rng.random_range(0..16u8)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_code_shape() {
        let code = numeric_code(10);
        assert_eq!(code.len(), 10);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
        assert!(!code.starts_with('0'));
    }

    #[test]
    fn test_random_password_length() {
        assert_eq!(random_password(16).len(), 16);
    }

    #[test]
    fn test_webhook_secret_hex() {
        let secret = webhook_secret();
        assert_eq!(secret.len(), 32);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
