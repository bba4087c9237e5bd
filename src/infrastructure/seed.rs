use chrono::Utc;
use sea_orm::*;

use crate::domain::DomainError;
use crate::infrastructure::auth::hash_password;
use crate::models::{product, user};
use crate::utils::validation::normalize_email;

struct DemoProduct {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    risk_level: &'static str,
    expected_return: f64,
    min_investment: f64,
    max_investment: Option<f64>,
    tenure_months: Option<i32>,
}

const DEMO_PRODUCTS: [DemoProduct; 5] = [
    DemoProduct {
        name: "Government Bond 2031",
        category: "bond",
        description: "Sovereign bond with semi-annual coupons",
        risk_level: "low",
        expected_return: 7.2,
        min_investment: 10_000.0,
        max_investment: Some(10_000_000.0),
        tenure_months: Some(84),
    },
    DemoProduct {
        name: "Nifty 50 Index ETF",
        category: "etf",
        description: "Tracks the fifty largest listed companies",
        risk_level: "medium",
        expected_return: 12.0,
        min_investment: 500.0,
        max_investment: None,
        tenure_months: None,
    },
    DemoProduct {
        name: "Balanced Advantage Fund",
        category: "mutual_fund",
        description: "Dynamic allocation between equity and debt",
        risk_level: "medium",
        expected_return: 10.5,
        min_investment: 1_000.0,
        max_investment: None,
        tenure_months: None,
    },
    DemoProduct {
        name: "Bank Fixed Deposit 1Y",
        category: "fixed_deposit",
        description: "One year deposit at a fixed rate",
        risk_level: "low",
        expected_return: 6.8,
        min_investment: 5_000.0,
        max_investment: Some(2_000_000.0),
        tenure_months: Some(12),
    },
    DemoProduct {
        name: "Blue Chip Equity Basket",
        category: "stock",
        description: "Curated basket of large-cap stocks",
        risk_level: "high",
        expected_return: 14.5,
        min_investment: 2_500.0,
        max_investment: None,
        tenure_months: None,
    },
];

/// Insert demo products that are missing (matched by name)
pub async fn seed_products(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let now = Utc::now().to_rfc3339();
    let mut inserted = 0;

    for demo in DEMO_PRODUCTS.iter() {
        let exists = product::Entity::find()
            .filter(product::Column::Name.eq(demo.name))
            .one(db)
            .await?
            .is_some();
        if exists {
            continue;
        }

        product::ActiveModel {
            name: Set(demo.name.to_owned()),
            category: Set(demo.category.to_owned()),
            description: Set(Some(demo.description.to_owned())),
            risk_level: Set(demo.risk_level.to_owned()),
            expected_return: Set(demo.expected_return),
            min_investment: Set(demo.min_investment),
            max_investment: Set(demo.max_investment),
            tenure_months: Set(demo.tenure_months),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    Ok(inserted)
}

/// Verified admin account; an existing row with the same email is left untouched
pub async fn seed_admin(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<(), DomainError> {
    let email = normalize_email(email);
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Ok(());
    }

    let now = Utc::now().to_rfc3339();
    let password_hash = hash_password(password).map_err(DomainError::Internal)?;

    let admin = user::ActiveModel {
        email: Set(email),
        full_name: Set("Administrator".to_owned()),
        password_hash: Set(password_hash),
        role: Set("admin".to_owned()),
        is_verified: Set(true),
        two_factor_enabled: Set(false),
        two_factor_method: Set(None),
        totp_secret: Set(None),
        totp_failed_attempts: Set(0),
        last_login_at: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    admin.insert(db).await?;
    Ok(())
}

pub async fn seed_demo_data(
    db: &DatabaseConnection,
    admin: Option<(String, String)>,
) -> Result<(), DomainError> {
    let inserted = seed_products(db).await?;
    tracing::info!("Seeded {} demo product(s)", inserted);

    if let Some((email, password)) = admin {
        seed_admin(db, &email, &password).await?;
        tracing::info!("Admin account ensured for {}", email);
    }
    Ok(())
}
