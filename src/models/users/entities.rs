use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 平台账号角色
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    SuperAdmin,  // 平台管理员，跨学校
    SchoolAdmin, // 学校管理员
    Teacher,     // 教师
    Guard,       // 门卫，仅看板和实时流
}

impl UserRole {
    pub const SUPER_ADMIN: &'static str = "super_admin";
    pub const SCHOOL_ADMIN: &'static str = "school_admin";
    pub const TEACHER: &'static str = "teacher";
    pub const GUARD: &'static str = "guard";

    pub fn super_admin_roles() -> &'static [&'static UserRole] {
        &[&Self::SuperAdmin]
    }
    pub fn admin_roles() -> &'static [&'static UserRole] {
        &[&Self::SchoolAdmin, &Self::SuperAdmin]
    }
    pub fn staff_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher, &Self::SchoolAdmin, &Self::SuperAdmin]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[
            &Self::Guard,
            &Self::Teacher,
            &Self::SchoolAdmin,
            &Self::SuperAdmin,
        ]
    }

    /// 是否受学校范围限制（super_admin 不受限）
    pub fn is_school_scoped(&self) -> bool {
        !matches!(self, UserRole::SuperAdmin)
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: super_admin, school_admin, teacher, guard"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::SuperAdmin => write!(f, "{}", UserRole::SUPER_ADMIN),
            UserRole::SchoolAdmin => write!(f, "{}", UserRole::SCHOOL_ADMIN),
            UserRole::Teacher => write!(f, "{}", UserRole::TEACHER),
            UserRole::Guard => write!(f, "{}", UserRole::GUARD),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::SUPER_ADMIN => Ok(UserRole::SuperAdmin),
            UserRole::SCHOOL_ADMIN => Ok(UserRole::SchoolAdmin),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::GUARD => Ok(UserRole::Guard),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 账号状态
#[derive(Debug, Clone, Serialize, PartialEq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserStatus {
    Active,
    Inactive,
    Suspended,
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户状态: '{s}'. 支持的状态: active, inactive, suspended"
            ))
        })
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Inactive => write!(f, "inactive"),
            UserStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(format!("Invalid user status: {s}")),
        }
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub school_id: Option<i64>,
    pub display_name: String,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    // 生成访问令牌
    pub async fn generate_access_token(&self) -> String {
        match crate::utils::jwt::JwtUtils::generate_access_token(self.id, &self.role.to_string()) {
            Ok(token) => token,
            Err(e) => {
                tracing::error!("JWT token 生成失败: {}", e);
                format!(
                    "fallback_token_{}_{}",
                    self.id,
                    chrono::Utc::now().timestamp()
                )
            }
        }
    }

    // 生成 token 对（access + refresh）
    pub async fn generate_token_pair(
        &self,
        refresh_token_expiry: Option<chrono::TimeDelta>,
    ) -> Result<crate::utils::jwt::TokenPair, String> {
        crate::utils::jwt::JwtUtils::generate_token_pair(
            self.id,
            &self.role.to_string(),
            refresh_token_expiry,
        )
        .map_err(|e| format!("生成 token 对失败: {e}"))
    }

    /// 是否可以访问指定学校的资源
    pub fn can_access_school(&self, school_id: i64) -> bool {
        match self.role {
            UserRole::SuperAdmin => true,
            _ => self.school_id == Some(school_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: UserRole, school_id: Option<i64>) -> User {
        User {
            id: 1,
            username: "tester01".to_string(),
            email: "tester@example.com".to_string(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            school_id,
            display_name: "Tester".to_string(),
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn super_admin_crosses_schools() {
        let user = user_with(UserRole::SuperAdmin, None);
        assert!(user.can_access_school(1));
        assert!(user.can_access_school(99));
    }

    #[test]
    fn school_admin_is_scoped() {
        let user = user_with(UserRole::SchoolAdmin, Some(7));
        assert!(user.can_access_school(7));
        assert!(!user.can_access_school(8));
    }

    #[test]
    fn role_round_trip() {
        for raw in ["super_admin", "school_admin", "teacher", "guard"] {
            let role: UserRole = raw.parse().unwrap();
            assert_eq!(role.to_string(), raw);
        }
        assert!("admin".parse::<UserRole>().is_err());
    }
}
