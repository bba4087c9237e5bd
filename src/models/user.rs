use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[sea_orm(default_value = "user")]
    pub role: String, // 'user', 'admin'
    pub is_verified: bool,
    pub two_factor_enabled: bool,
    /// `email` (OTP sent on login) or `totp` (authenticator app)
    pub two_factor_method: Option<String>,
    #[serde(skip_serializing)]
    pub totp_secret: Option<String>,
    /// Wrong authenticator codes since the last password step
    #[serde(skip_serializing)]
    #[sea_orm(default_value = 0)]
    pub totp_failed_attempts: i32,
    pub last_login_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::investment::Entity")]
    Investments,
    #[sea_orm(has_many = "super::otp_code::Entity")]
    OtpCodes,
}

impl Related<super::investment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Investments.def()
    }
}

impl Related<super::otp_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OtpCodes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Public view of a user, safe to return from the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub is_verified: bool,
    pub two_factor_enabled: bool,
    pub two_factor_method: Option<String>,
    pub last_login_at: Option<String>,
    pub created_at: String,
}

impl From<Model> for UserDto {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            role: model.role,
            is_verified: model.is_verified,
            two_factor_enabled: model.two_factor_enabled,
            two_factor_method: model.two_factor_method,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
        }
    }
}
