//! Back-office table actions.
//!
//! Every admin table offers the same row actions: flip a boolean flag, delete the row.
//! Both go through the query client so the table's cached listings are invalidated, and
//! both report their outcome as a toast instead of an error so the table can keep
//! rendering.

use crate::query::{Column, QueryClient, Record};
use crate::ui::Toast;
use serde_json::{Map, Value};
use tracing::{error, info};

/// Flips a boolean column of one row.
///
/// `current` is the value the table is showing; the row is set to its negation.
pub async fn toggle<R: Record>(
    client: &QueryClient,
    id: &str,
    column: R::Column,
    current: bool,
    success: &str,
) -> Toast {
    let mut patch = Map::new();
    patch.insert(column.name().to_string(), Value::Bool(!current));
    match client.update::<R>(id, Value::Object(patch)).await {
        Ok(()) => {
            info!("{} {id}: {} -> {}", R::TABLE, column.name(), !current);
            Toast::success(success)
        }
        Err(e) => {
            error!("Error toggling {} on {} {id}: {e}", column.name(), R::TABLE);
            Toast::error("Erro ao atualizar status")
        }
    }
}

/// Deletes one row, reporting the outcome with the given messages.
pub async fn remove<R: Record>(client: &QueryClient, id: &str, success: &str, failure: &str) -> Toast {
    match client.delete::<R>(id).await {
        Ok(()) => {
            info!("Deleted {} {id}", R::TABLE);
            Toast::success(success)
        }
        Err(e) => {
            error!("Error deleting {} {id}: {e}", R::TABLE);
            Toast::error(failure)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::{Event, EventColumn};
    use crate::errors::Result;
    use crate::query::{QueryOptions, Table};
    use crate::test_utils::demo_client;

    #[tokio::test]
    async fn test_toggle_flips_and_refreshes_listing() -> Result<()> {
        let (backend, client) = demo_client();
        let active = QueryOptions::<Event>::new().filter(EventColumn::IsActive, true);
        let before = client.fetch(&active).await?.len();

        let toast = toggle::<Event>(&client, "event-active-1", EventColumn::IsActive, true, "Status atualizado!").await;
        assert!(!toast.is_error());
        assert_eq!(client.fetch(&active).await?.len(), before - 1);

        let row = backend
            .rows(Table::Events)
            .into_iter()
            .find(|r| r["id"] == "event-active-1")
            .unwrap();
        assert_eq!(row["is_active"], false);
        Ok(())
    }

    #[tokio::test]
    async fn test_toggle_missing_row_reports_error() {
        let (_backend, client) = demo_client();
        let toast = toggle::<Event>(&client, "nope", EventColumn::IsFeatured, false, "ok").await;
        assert!(toast.is_error());
    }

    #[tokio::test]
    async fn test_remove() -> Result<()> {
        let (_backend, client) = demo_client();
        let all = QueryOptions::<Event>::new();
        let before = client.fetch(&all).await?.len();

        let toast = remove::<Event>(&client, "event-active-1", "Evento excluído com sucesso!", "Erro ao excluir evento").await;
        assert_eq!(toast, Toast::success("Evento excluído com sucesso!"));
        assert_eq!(client.fetch(&all).await?.len(), before - 1);
        Ok(())
    }
}
