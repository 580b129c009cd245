//! Entity module - Rust mirror of the backend tables.
//! Each table module has a `Model` struct for rows and a `Column` enum naming its columns,
//! so queries against a table can only mention columns that table actually has.

/// Declares the `Column` enum of a table module together with its wire names.
macro_rules! columns {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Columns of this table
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub enum Column {
            $(
                #[allow(missing_docs)]
                $variant
            ),+
        }

        impl crate::query::Column for Column {
            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }
    };
}

pub mod banner;
pub mod category;
pub mod chat_message;
pub mod city;
pub mod company;
pub mod event;
pub mod giveaway;
pub mod notification;
pub mod profile;
pub mod user;

use serde::{Deserialize, Serialize};

/// Embedded relation reduced to its display name, e.g. `cities(name)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationName {
    /// Display name of the related row
    pub name: String,
}

// Re-export specific types to avoid conflicts
pub use banner::{BannerPosition, Column as BannerColumn, Model as Banner};
pub use category::{Column as CategoryColumn, Model as Category};
pub use chat_message::{Column as ChatMessageColumn, Model as ChatMessage};
pub use city::{Column as CityColumn, Model as City};
pub use company::{Column as CompanyColumn, Model as Company};
pub use event::{Column as EventColumn, Model as Event};
pub use giveaway::{Column as GiveawayColumn, GiveawayStatus, Model as Giveaway};
pub use notification::{Column as NotificationColumn, Model as UserNotification};
pub use profile::{Column as ProfileColumn, Model as Profile, ProfileType};
pub use user::{Column as UserColumn, Model as User};
