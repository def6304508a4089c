//! Restaurant profile model.
//!
//! A single-row record holding the site's public metadata: contact details,
//! address, weekly opening hours, social links, and branding images. The row
//! is created with defaults on first read.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

/// Maximum length of the restaurant name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of the restaurant description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
}

/// Partial address update; present fields overwrite.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressPatch {
    pub street: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl AddressPatch {
    fn apply(self, current: Address) -> Address {
        Address {
            street: self.street.unwrap_or(current.street),
            city: self.city.unwrap_or(current.city),
            district: self.district.or(current.district),
            postal_code: self.postal_code.or(current.postal_code),
            country: self.country.unwrap_or(current.country),
        }
    }
}

/// Opening hours for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub open: String,
    pub close: String,
    pub is_open: bool,
}

impl DayHours {
    fn weekday() -> Self {
        Self {
            open: "09:00".to_string(),
            close: "22:00".to_string(),
            is_open: true,
        }
    }

    fn sunday() -> Self {
        Self {
            open: "10:00".to_string(),
            close: "21:00".to_string(),
            is_open: true,
        }
    }
}

/// Weekly opening hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            monday: DayHours::weekday(),
            tuesday: DayHours::weekday(),
            wednesday: DayHours::weekday(),
            thursday: DayHours::weekday(),
            friday: DayHours::weekday(),
            saturday: DayHours::weekday(),
            sunday: DayHours::sunday(),
        }
    }
}

/// Partial working-hours update; present days replace the whole day entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkingHoursPatch {
    pub monday: Option<DayHours>,
    pub tuesday: Option<DayHours>,
    pub wednesday: Option<DayHours>,
    pub thursday: Option<DayHours>,
    pub friday: Option<DayHours>,
    pub saturday: Option<DayHours>,
    pub sunday: Option<DayHours>,
}

impl WorkingHoursPatch {
    fn apply(self, current: WorkingHours) -> WorkingHours {
        WorkingHours {
            monday: self.monday.unwrap_or(current.monday),
            tuesday: self.tuesday.unwrap_or(current.tuesday),
            wednesday: self.wednesday.unwrap_or(current.wednesday),
            thursday: self.thursday.unwrap_or(current.thursday),
            friday: self.friday.unwrap_or(current.friday),
            saturday: self.saturday.unwrap_or(current.saturday),
            sunday: self.sunday.unwrap_or(current.sunday),
        }
    }
}

/// Social media links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
}

/// Partial social-links update; present fields overwrite.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocialLinksPatch {
    pub instagram: Option<String>,
    pub facebook: Option<String>,
    pub twitter: Option<String>,
    pub website: Option<String>,
}

impl SocialLinksPatch {
    fn apply(self, current: SocialLinks) -> SocialLinks {
        SocialLinks {
            instagram: self.instagram.or(current.instagram),
            facebook: self.facebook.or(current.facebook),
            twitter: self.twitter.or(current.twitter),
            website: self.website.or(current.website),
        }
    }
}

/// The restaurant profile record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Restaurant {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub address: Json<Address>,
    pub working_hours: Json<WorkingHours>,
    pub social: Json<SocialLinks>,
    pub logo: Option<String>,
    pub banner: Option<String>,
    pub created: i64,
    pub changed: i64,
}

/// Input for updating the restaurant profile. Sub-records merge field-wise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateRestaurant {
    pub name: Option<String>,

    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub description: Option<Option<String>>,

    pub phone: Option<String>,

    #[serde(default, deserialize_with = "crate::models::double_option")]
    pub email: Option<Option<String>>,

    pub address: Option<AddressPatch>,
    pub working_hours: Option<WorkingHoursPatch>,
    pub social: Option<SocialLinksPatch>,
}

impl UpdateRestaurant {
    /// Validate field constraints before any store mutation.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(ref name) = self.name {
            if name.trim().is_empty() {
                return Err(AppError::BadRequest("restaurant name is required".into()));
            }
            if name.chars().count() > MAX_NAME_LEN {
                return Err(AppError::BadRequest(format!(
                    "restaurant name must be at most {MAX_NAME_LEN} characters"
                )));
            }
        }
        if let Some(Some(ref description)) = self.description {
            if description.chars().count() > MAX_DESCRIPTION_LEN {
                return Err(AppError::BadRequest(format!(
                    "restaurant description must be at most {MAX_DESCRIPTION_LEN} characters"
                )));
            }
        }
        Ok(())
    }

    /// Merge this partial update into the existing profile.
    pub fn apply(self, current: Restaurant) -> Restaurant {
        Restaurant {
            id: current.id,
            name: self.name.unwrap_or(current.name),
            description: match self.description {
                Some(description) => description,
                None => current.description,
            },
            phone: self.phone.unwrap_or(current.phone),
            email: match self.email {
                Some(email) => email,
                None => current.email,
            },
            address: Json(match self.address {
                Some(patch) => patch.apply(current.address.0),
                None => current.address.0,
            }),
            working_hours: Json(match self.working_hours {
                Some(patch) => patch.apply(current.working_hours.0),
                None => current.working_hours.0,
            }),
            social: Json(match self.social {
                Some(patch) => patch.apply(current.social.0),
                None => current.social.0,
            }),
            logo: current.logo,
            banner: current.banner,
            created: current.created,
            changed: current.changed,
        }
    }
}

impl Restaurant {
    fn default_profile() -> (String, String, Address) {
        (
            "My Restaurant".to_string(),
            "Where taste and quality meet".to_string(),
            Address {
                street: "1 Example Street".to_string(),
                city: "Istanbul".to_string(),
                district: None,
                postal_code: None,
                country: "Turkey".to_string(),
            },
        )
    }

    /// Fetch the profile, creating a default row on first read.
    pub async fn get_or_create(pool: &PgPool) -> Result<Self> {
        if let Some(restaurant) = Self::find(pool).await? {
            return Ok(restaurant);
        }

        let now = chrono::Utc::now().timestamp();
        let (name, description, address) = Self::default_profile();

        let restaurant = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO restaurant
                (id, name, description, phone, email, address, working_hours, social, created, changed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .bind(description)
        .bind("+90 212 000 00 00")
        .bind(Option::<String>::None)
        .bind(Json(address))
        .bind(Json(WorkingHours::default()))
        .bind(Json(SocialLinks::default()))
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .context("failed to create default restaurant profile")?;

        Ok(restaurant)
    }

    /// Fetch the profile row if it exists.
    pub async fn find(pool: &PgPool) -> Result<Option<Self>> {
        let restaurant = sqlx::query_as::<_, Self>("SELECT * FROM restaurant LIMIT 1")
            .fetch_optional(pool)
            .await
            .context("failed to fetch restaurant profile")?;

        Ok(restaurant)
    }

    /// Update the profile from a merged record.
    pub async fn update(pool: &PgPool, merged: &Restaurant) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();

        let restaurant = sqlx::query_as::<_, Self>(
            r#"
            UPDATE restaurant
            SET name = $1, description = $2, phone = $3, email = $4, address = $5,
                working_hours = $6, social = $7, changed = $8
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(&merged.name)
        .bind(&merged.description)
        .bind(&merged.phone)
        .bind(&merged.email)
        .bind(&merged.address)
        .bind(&merged.working_hours)
        .bind(&merged.social)
        .bind(now)
        .bind(merged.id)
        .fetch_one(pool)
        .await
        .context("failed to update restaurant profile")?;

        Ok(restaurant)
    }

    /// Set the logo image URL.
    pub async fn set_logo(pool: &PgPool, id: Uuid, url: &str) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();

        let restaurant = sqlx::query_as::<_, Self>(
            "UPDATE restaurant SET logo = $1, changed = $2 WHERE id = $3 RETURNING *",
        )
        .bind(url)
        .bind(now)
        .bind(id)
        .fetch_one(pool)
        .await
        .context("failed to update restaurant logo")?;

        Ok(restaurant)
    }

    /// Set the banner image URL.
    pub async fn set_banner(pool: &PgPool, id: Uuid, url: &str) -> Result<Self> {
        let now = chrono::Utc::now().timestamp();

        let restaurant = sqlx::query_as::<_, Self>(
            "UPDATE restaurant SET banner = $1, changed = $2 WHERE id = $3 RETURNING *",
        )
        .bind(url)
        .bind(now)
        .bind(id)
        .fetch_one(pool)
        .await
        .context("failed to update restaurant banner")?;

        Ok(restaurant)
    }
}
