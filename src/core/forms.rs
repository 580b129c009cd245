//! Back-office create/update forms.
//!
//! Each form holds the raw field values the admin typed (dates as `datetime-local`
//! strings, optional text as possibly-empty strings), checks its required fields and
//! turns itself into the JSON payload for the backend. Submitting reports a toast and,
//! on success, the listing to return to.

use crate::entities::{Banner, BannerPosition, Company, Event, Giveaway, Profile, ProfileType};
use crate::errors::{Error, Result};
use crate::query::{QueryClient, Record};
use crate::routes::Navigation;
use crate::ui::Toast;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Value, json};
use tracing::{error, info};

/// Format of `datetime-local` inputs.
const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parses a date input: RFC 3339, `datetime-local` (with or without seconds) or a bare
/// date. Naive values are taken as UTC.
#[must_use]
pub fn parse_datetime_input(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[must_use]
pub fn format_datetime_input(value: DateTime<Utc>) -> String {
    value.format(INPUT_FORMAT).to_string()
}

/// Trimmed text, or null when blank.
fn optional_text(value: &str) -> Value {
    let value = value.trim();
    if value.is_empty() {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

fn optional_date(value: &str, field: &str) -> Result<Value> {
    if value.trim().is_empty() {
        return Ok(Value::Null);
    }
    parse_datetime_input(value)
        .map(|dt| json!(dt))
        .ok_or_else(|| Error::Validation {
            message: format!("Data inválida: {field}"),
        })
}

fn required_date(value: &str, field: &str, missing: &str) -> Result<Value> {
    if value.trim().is_empty() {
        return Err(Error::Validation {
            message: missing.to_string(),
        });
    }
    optional_date(value, field)
}

fn require(value: &str, missing: &str) -> Result<()> {
    if value.trim().is_empty() {
        Err(Error::Validation {
            message: missing.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Toast texts and return path of one form.
#[derive(Debug, Clone, Copy)]
pub struct FormMessages {
    pub created: &'static str,
    pub updated: &'static str,
    pub failed: &'static str,
    pub list_path: &'static str,
}

/// A back-office form bound to one table.
pub trait AdminForm: Default + Send + Sync {
    type Record: Record;
    const MESSAGES: FormMessages;

    /// Pre-fills the form from an existing row.
    fn from_record(record: &Self::Record) -> Self;

    /// Validated backend payload.
    fn payload(&self) -> Result<Value>;
}

/// What the form page should do after a submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOutcome {
    pub toast: Toast,
    /// Set on success: the listing to go back to
    pub navigation: Option<Navigation>,
}

/// Loads the form for `id`, or an empty one for a new row.
pub async fn load_form<F: AdminForm>(client: &QueryClient, id: Option<&str>) -> Result<F> {
    let Some(id) = id else {
        return Ok(F::default());
    };
    client
        .fetch_by_id::<F::Record>(id, "*")
        .await?
        .map(|record| F::from_record(&record))
        .ok_or_else(|| Error::NotFound {
            table: F::Record::TABLE.to_string(),
            id: id.to_string(),
        })
}

/// Validates and saves the form; `id` selects update over insert.
pub async fn submit<F: AdminForm>(client: &QueryClient, id: Option<&str>, form: &F) -> FormOutcome {
    let messages = F::MESSAGES;
    let payload = match form.payload() {
        Ok(payload) => payload,
        Err(Error::Validation { message }) => {
            return FormOutcome {
                toast: Toast::error(message),
                navigation: None,
            };
        }
        Err(e) => {
            return FormOutcome {
                toast: Toast::error(e.to_string()),
                navigation: None,
            };
        }
    };

    let saved = match id {
        Some(id) => client.update::<F::Record>(id, payload).await.map(|()| messages.updated),
        None => client
            .insert::<F::Record>(&payload)
            .await
            .map(|_| messages.created),
    };
    match saved {
        Ok(message) => {
            info!("{message} ({})", F::Record::TABLE);
            FormOutcome {
                toast: Toast::success(message),
                navigation: Some(Navigation::to(messages.list_path)),
            }
        }
        Err(e) => {
            error!("Error saving {}: {e}", F::Record::TABLE);
            FormOutcome {
                toast: Toast::error(messages.failed),
                navigation: None,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventForm {
    pub title: String,
    pub description: String,
    pub start_datetime: String,
    pub end_datetime: String,
    pub location_name: String,
    pub address: String,
    pub city_id: String,
    pub cover_image_url: String,
    pub ticket_url: String,
    pub instagram_url: String,
    pub is_online: bool,
    pub is_featured: bool,
    pub is_active: bool,
}

impl Default for EventForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            start_datetime: String::new(),
            end_datetime: String::new(),
            location_name: String::new(),
            address: String::new(),
            city_id: String::new(),
            cover_image_url: String::new(),
            ticket_url: String::new(),
            instagram_url: String::new(),
            is_online: false,
            is_featured: false,
            is_active: true,
        }
    }
}

const MISSING_REQUIRED: &str = "Preencha os campos obrigatórios";

impl AdminForm for EventForm {
    type Record = Event;
    const MESSAGES: FormMessages = FormMessages {
        created: "Evento criado!",
        updated: "Evento atualizado!",
        failed: "Erro ao salvar evento",
        list_path: "/admin/eventos",
    };

    fn from_record(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            start_datetime: format_datetime_input(event.start_datetime),
            end_datetime: event.end_datetime.map(format_datetime_input).unwrap_or_default(),
            location_name: event.location_name.clone().unwrap_or_default(),
            address: event.address.clone().unwrap_or_default(),
            city_id: event.city_id.clone().unwrap_or_default(),
            cover_image_url: event.cover_image_url.clone().unwrap_or_default(),
            ticket_url: event.ticket_url.clone().unwrap_or_default(),
            instagram_url: event.instagram_url.clone().unwrap_or_default(),
            is_online: event.is_online,
            is_featured: event.is_featured,
            is_active: event.is_active,
        }
    }

    fn payload(&self) -> Result<Value> {
        require(&self.title, MISSING_REQUIRED)?;
        Ok(json!({
            "title": self.title.trim(),
            "description": optional_text(&self.description),
            "start_datetime": required_date(&self.start_datetime, "início", MISSING_REQUIRED)?,
            "end_datetime": optional_date(&self.end_datetime, "término")?,
            "location_name": optional_text(&self.location_name),
            "address": optional_text(&self.address),
            "city_id": optional_text(&self.city_id),
            "cover_image_url": optional_text(&self.cover_image_url),
            "ticket_url": optional_text(&self.ticket_url),
            "instagram_url": optional_text(&self.instagram_url),
            "is_online": self.is_online,
            "is_featured": self.is_featured,
            "is_active": self.is_active,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyForm {
    pub name: String,
    pub description: String,
    pub city_id: String,
    pub category_id: String,
    pub logo_url: String,
    pub instagram_url: String,
    pub website_url: String,
    pub whatsapp: String,
    pub address: String,
    pub is_featured: bool,
    pub is_active: bool,
}

impl Default for CompanyForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            city_id: String::new(),
            category_id: String::new(),
            logo_url: String::new(),
            instagram_url: String::new(),
            website_url: String::new(),
            whatsapp: String::new(),
            address: String::new(),
            is_featured: false,
            is_active: true,
        }
    }
}

impl AdminForm for CompanyForm {
    type Record = Company;
    const MESSAGES: FormMessages = FormMessages {
        created: "Empresa criada!",
        updated: "Empresa atualizada!",
        failed: "Erro ao salvar empresa",
        list_path: "/admin/empresas",
    };

    fn from_record(company: &Company) -> Self {
        Self {
            name: company.name.clone(),
            description: company.description.clone().unwrap_or_default(),
            city_id: company.city_id.clone().unwrap_or_default(),
            category_id: company.category_id.clone().unwrap_or_default(),
            logo_url: company.logo_url.clone().unwrap_or_default(),
            instagram_url: company.instagram_url.clone().unwrap_or_default(),
            website_url: company.website_url.clone().unwrap_or_default(),
            whatsapp: company.whatsapp.clone().unwrap_or_default(),
            address: company.address.clone().unwrap_or_default(),
            is_featured: company.is_featured,
            is_active: company.is_active,
        }
    }

    fn payload(&self) -> Result<Value> {
        require(&self.name, "Preencha o nome da empresa")?;
        Ok(json!({
            "name": self.name.trim(),
            "description": optional_text(&self.description),
            "city_id": optional_text(&self.city_id),
            "category_id": optional_text(&self.category_id),
            "logo_url": optional_text(&self.logo_url),
            "instagram_url": optional_text(&self.instagram_url),
            "website_url": optional_text(&self.website_url),
            "whatsapp": optional_text(&self.whatsapp),
            "address": optional_text(&self.address),
            "is_featured": self.is_featured,
            "is_active": self.is_active,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileForm {
    pub profile_type: ProfileType,
    pub name: String,
    pub bio: String,
    pub city_id: String,
    pub instagram_url: String,
    pub youtube_url: String,
    pub spotify_url: String,
    pub avatar_url: String,
    pub followers_count: i64,
    pub is_featured: bool,
    pub is_active: bool,
}

impl Default for ProfileForm {
    fn default() -> Self {
        Self {
            profile_type: ProfileType::Influencer,
            name: String::new(),
            bio: String::new(),
            city_id: String::new(),
            instagram_url: String::new(),
            youtube_url: String::new(),
            spotify_url: String::new(),
            avatar_url: String::new(),
            followers_count: 0,
            is_featured: false,
            is_active: true,
        }
    }
}

impl AdminForm for ProfileForm {
    type Record = Profile;
    const MESSAGES: FormMessages = FormMessages {
        created: "Perfil criado!",
        updated: "Perfil atualizado!",
        failed: "Erro ao salvar perfil",
        list_path: "/admin/perfis",
    };

    fn from_record(profile: &Profile) -> Self {
        Self {
            profile_type: profile.profile_type,
            name: profile.name.clone(),
            bio: profile.bio.clone().unwrap_or_default(),
            city_id: profile.city_id.clone().unwrap_or_default(),
            instagram_url: profile.instagram_url.clone().unwrap_or_default(),
            youtube_url: profile.youtube_url.clone().unwrap_or_default(),
            spotify_url: profile.spotify_url.clone().unwrap_or_default(),
            avatar_url: profile.avatar_url.clone().unwrap_or_default(),
            followers_count: profile.followers_count,
            is_featured: profile.is_featured,
            is_active: profile.is_active,
        }
    }

    fn payload(&self) -> Result<Value> {
        require(&self.name, "Preencha o nome do perfil")?;
        Ok(json!({
            "type": self.profile_type.as_str(),
            "name": self.name.trim(),
            "bio": optional_text(&self.bio),
            "city_id": optional_text(&self.city_id),
            "instagram_url": optional_text(&self.instagram_url),
            "youtube_url": optional_text(&self.youtube_url),
            "spotify_url": optional_text(&self.spotify_url),
            "avatar_url": optional_text(&self.avatar_url),
            "followers_count": self.followers_count.max(0),
            "is_featured": self.is_featured,
            "is_active": self.is_active,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GiveawayForm {
    pub title: String,
    pub description: String,
    pub prize: String,
    pub rules: String,
    pub cover_image_url: String,
    pub start_datetime: String,
    pub end_datetime: String,
    /// Defaults to the end date when left blank
    pub draw_datetime: String,
    pub is_published: bool,
    pub result_published: bool,
}

impl Default for GiveawayForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            prize: String::new(),
            rules: String::new(),
            cover_image_url: String::new(),
            start_datetime: String::new(),
            end_datetime: String::new(),
            draw_datetime: String::new(),
            is_published: true,
            result_published: false,
        }
    }
}

impl AdminForm for GiveawayForm {
    type Record = Giveaway;
    const MESSAGES: FormMessages = FormMessages {
        created: "Sorteio criado!",
        updated: "Sorteio atualizado!",
        failed: "Erro ao salvar sorteio",
        list_path: "/admin/sorteios",
    };

    fn from_record(giveaway: &Giveaway) -> Self {
        Self {
            title: giveaway.title.clone(),
            description: giveaway.description.clone().unwrap_or_default(),
            prize: giveaway.prize.clone().unwrap_or_default(),
            rules: giveaway.rules.clone().unwrap_or_default(),
            cover_image_url: giveaway.cover_image_url.clone().unwrap_or_default(),
            start_datetime: format_datetime_input(giveaway.start_datetime),
            end_datetime: format_datetime_input(giveaway.end_datetime),
            draw_datetime: format_datetime_input(giveaway.draw_datetime),
            is_published: giveaway.is_published,
            result_published: giveaway.result_published,
        }
    }

    fn payload(&self) -> Result<Value> {
        require(&self.title, MISSING_REQUIRED)?;
        require(&self.prize, MISSING_REQUIRED)?;
        let start = required_date(&self.start_datetime, "início", MISSING_REQUIRED)?;
        let end = required_date(&self.end_datetime, "término", MISSING_REQUIRED)?;
        let draw = match optional_date(&self.draw_datetime, "sorteio")? {
            Value::Null => end.clone(),
            draw => draw,
        };
        Ok(json!({
            "title": self.title.trim(),
            "description": optional_text(&self.description),
            "prize": self.prize.trim(),
            "rules": optional_text(&self.rules),
            "cover_image_url": optional_text(&self.cover_image_url),
            "start_datetime": start,
            "end_datetime": end,
            "draw_datetime": draw,
            "is_published": self.is_published,
            "result_published": self.result_published,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerForm {
    pub title: String,
    pub image_url: String,
    pub link_url: String,
    pub position: BannerPosition,
    pub sort_order: i32,
    pub start_date: String,
    pub end_date: String,
    pub is_active: bool,
}

impl Default for BannerForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            image_url: String::new(),
            link_url: String::new(),
            position: BannerPosition::default(),
            sort_order: 0,
            start_date: String::new(),
            end_date: String::new(),
            is_active: true,
        }
    }
}

impl AdminForm for BannerForm {
    type Record = Banner;
    const MESSAGES: FormMessages = FormMessages {
        created: "Banner criado!",
        updated: "Banner atualizado!",
        failed: "Erro ao salvar banner",
        list_path: "/admin/banners",
    };

    fn from_record(banner: &Banner) -> Self {
        Self {
            title: banner.title.clone(),
            image_url: banner.image_url.clone(),
            link_url: banner.link_url.clone().unwrap_or_default(),
            position: banner.position,
            sort_order: banner.sort_order,
            start_date: banner.start_date.map(format_datetime_input).unwrap_or_default(),
            end_date: banner.end_date.map(format_datetime_input).unwrap_or_default(),
            is_active: banner.is_active,
        }
    }

    fn payload(&self) -> Result<Value> {
        require(&self.title, MISSING_REQUIRED)?;
        require(&self.image_url, MISSING_REQUIRED)?;
        Ok(json!({
            "title": self.title.trim(),
            "image_url": self.image_url.trim(),
            "link_url": optional_text(&self.link_url),
            "position": self.position.as_str(),
            "sort_order": self.sort_order,
            "start_date": optional_date(&self.start_date, "início")?,
            "end_date": optional_date(&self.end_date, "término")?,
            "is_active": self.is_active,
        }))
    }
}
