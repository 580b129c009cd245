//! Demo data set for the in-memory backend.
//!
//! Used by `--demo` runs and by the tests. Dates are relative to the `now` passed in so
//! the same rows stay "upcoming" or "finished" whenever they are loaded.

use crate::backend::MemoryBackend;
use crate::query::Table;
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use tracing::info;

pub const ADMIN_EMAIL: &str = "admin@guialafaiete.com.br";
pub const ADMIN_PASSWORD: &str = "admin123";
pub const USER_EMAIL: &str = "maria@example.com";
pub const USER_PASSWORD: &str = "maria123";

/// Ids of the seeded accounts.
#[derive(Debug, Clone)]
pub struct DemoAccounts {
    pub admin_id: String,
    pub user_id: String,
}

fn event(
    id: &str,
    title: &str,
    start: DateTime<Utc>,
    city_id: Option<&str>,
    is_active: bool,
    created_at: DateTime<Utc>,
) -> Value {
    json!({
        "id": id,
        "title": title,
        "start_datetime": start,
        "city_id": city_id,
        "is_active": is_active,
        "is_featured": false,
        "is_online": false,
        "created_at": created_at,
    })
}

fn with(mut row: Value, extra: Value) -> Value {
    if let (Some(row), Some(extra)) = (row.as_object_mut(), extra.as_object()) {
        for (key, value) in extra {
            row.insert(key.clone(), value.clone());
        }
    }
    row
}

/// Loads the demo rows and accounts into `backend`.
pub fn seed(backend: &MemoryBackend, now: DateTime<Utc>) -> DemoAccounts {
    let days = Duration::days;

    backend.seed(
        Table::Cities,
        vec![
            json!({ "id": "city-1", "name": "Conselheiro Lafaiete", "state": "MG" }),
            json!({ "id": "city-2", "name": "Congonhas", "state": "MG" }),
        ],
    );
    backend.seed(
        Table::CompanyCategories,
        vec![
            json!({ "id": "cat-1", "name": "Restaurantes", "slug": "restaurantes", "icon": "utensils" }),
            json!({ "id": "cat-2", "name": "Saúde", "slug": "saude", "icon": "heart" }),
            json!({ "id": "cat-3", "name": "Moda", "slug": "moda", "icon": "shirt" }),
        ],
    );

    backend.seed(
        Table::Events,
        vec![
            with(
                event("event-active-1", "Festival de Inverno", now + days(3), Some("city-1"), true, now - days(5)),
                json!({
                    "is_featured": true,
                    "description": "Música e gastronomia",
                    "location_name": "Praça Tiradentes",
                }),
            ),
            with(
                event("event-active-2", "Feira de Artesanato", now + days(1), Some("city-1"), true, now - days(4)),
                json!({ "location_name": "Centro Cultural" }),
            ),
            with(
                event("event-active-3", "Corrida Solidária", now + days(10), Some("city-2"), true, now - days(3)),
                json!({ "description": "5 km pela cidade" }),
            ),
            event("event-inactive-1", "Show Cancelado", now + days(2), Some("city-1"), false, now - days(2)),
            event("event-inactive-2", "Palestra Antiga", now - days(5), Some("city-2"), false, now - days(1)),
        ],
    );

    backend.seed(
        Table::Companies,
        vec![
            json!({
                "id": "company-1", "name": "Café da Praça", "city_id": "city-1", "category_id": "cat-1",
                "description": "Café colonial no centro", "is_featured": true, "is_active": true,
                "created_at": now - days(9),
            }),
            json!({
                "id": "company-2", "name": "Clínica Vida", "city_id": "city-2", "category_id": "cat-2",
                "description": "Saúde da família", "is_featured": false, "is_active": true,
                "created_at": now - days(8),
            }),
            json!({
                "id": "company-3", "name": "Loja Fechada", "city_id": "city-1", "category_id": "cat-3",
                "is_featured": false, "is_active": false, "created_at": now - days(7),
            }),
            json!({
                "id": "company-4", "name": "Boutique Estilo", "category_id": "cat-3",
                "is_featured": true, "is_active": true, "created_at": now - days(6),
            }),
        ],
    );

    backend.seed(
        Table::Profiles,
        vec![
            json!({
                "id": "profile-1", "type": "influencer", "name": "Ana Lafaiete", "city_id": "city-1",
                "bio": "Dicas de viagem", "followers_count": 12_500, "is_featured": true, "is_active": true,
                "created_at": now - days(9),
            }),
            json!({
                "id": "profile-2", "type": "musician", "name": "Banda Trem de Minas", "city_id": "city-1",
                "followers_count": 3_200, "is_featured": true, "is_active": true, "created_at": now - days(8),
            }),
            json!({
                "id": "profile-3", "type": "musician", "name": "João Violeiro", "city_id": "city-2",
                "followers_count": 800, "is_featured": false, "is_active": true, "created_at": now - days(7),
            }),
            json!({
                "id": "profile-4", "type": "influencer", "name": "Perfil Inativo",
                "is_featured": false, "is_active": false, "created_at": now - days(6),
            }),
        ],
    );

    backend.seed(
        Table::Giveaways,
        vec![
            json!({
                "id": "giveaway-open", "title": "Jantar para dois", "prize": "Jantar no Café da Praça",
                "start_datetime": now - days(2), "end_datetime": now + days(5), "draw_datetime": now + days(6),
                "is_published": true, "result_published": false, "created_at": now - days(2),
            }),
            json!({
                "id": "giveaway-finished", "title": "Kit de inverno", "prize": "Kit Boutique Estilo",
                "start_datetime": now - days(20), "end_datetime": now - days(10), "draw_datetime": now - days(8),
                "is_published": true, "result_published": true, "created_at": now - days(20),
            }),
            json!({
                "id": "giveaway-draft", "title": "Rascunho", "prize": "A definir",
                "start_datetime": now + days(1), "end_datetime": now + days(15), "draw_datetime": now + days(16),
                "is_published": false, "result_published": false, "created_at": now - days(1),
            }),
        ],
    );

    backend.seed(
        Table::Banners,
        vec![
            json!({
                "id": "banner-1", "title": "Festival de Inverno", "image_url": "https://cdn.example.com/b1.jpg",
                "position": "home_top", "sort_order": 1, "is_active": true,
                "impressions": 1_000, "clicks": 25, "created_at": now - days(3),
            }),
            json!({
                "id": "banner-2", "title": "Campanha antiga", "image_url": "https://cdn.example.com/b2.jpg",
                "position": "home_top", "sort_order": 2, "is_active": false, "created_at": now - days(2),
            }),
            json!({
                "id": "banner-3", "title": "Anuncie aqui", "image_url": "https://cdn.example.com/b3.jpg",
                "position": "home_middle", "sort_order": 1, "is_active": true, "created_at": now - days(1),
            }),
        ],
    );

    let admin_id = backend.add_account(ADMIN_EMAIL, ADMIN_PASSWORD, "Administrador", true);
    let user_id = backend.add_account(USER_EMAIL, USER_PASSWORD, "Maria Souza", false);

    backend.seed(
        Table::UserNotifications,
        vec![
            json!({
                "id": "notification-1", "user_id": user_id, "title": "Bem-vinda!",
                "message": "Seu cadastro foi concluído.", "type": "info", "is_read": true,
                "created_at": now - days(3),
            }),
            json!({
                "id": "notification-2", "user_id": user_id, "title": "Novo sorteio",
                "message": "Participe do sorteio Jantar para dois.", "type": "giveaway", "is_read": false,
                "created_at": now - days(2),
            }),
            json!({
                "id": "notification-3", "user_id": user_id, "title": "Evento amanhã",
                "message": "A Feira de Artesanato começa amanhã.", "type": "event", "is_read": false,
                "created_at": now - days(1),
            }),
        ],
    );
    backend.seed(
        Table::ChatMessages,
        vec![
            json!({
                "id": "chat-1", "user_id": user_id, "sender_id": user_id,
                "message": "Olá, como anuncio minha empresa?", "is_from_admin": false,
                "created_at": now - Duration::hours(2),
            }),
            json!({
                "id": "chat-2", "user_id": user_id, "sender_id": admin_id,
                "message": "Oi Maria! Vamos te enviar os planos.", "is_from_admin": true,
                "created_at": now - Duration::hours(1),
            }),
        ],
    );

    info!("Demo data loaded");
    DemoAccounts { admin_id, user_id }
}
