use time::{macros::format_description, OffsetDateTime};
use uuid::Uuid;

use crate::events::dto::NewEvent;

/// Session that wraps a catch logged without an explicit event.
pub fn session_for_catch(
    species: &str,
    spot_id: Option<Uuid>,
    now: OffsetDateTime,
) -> anyhow::Result<NewEvent> {
    let date = now.format(format_description!(
        "[month repr:long] [day padding:none], [year]"
    ))?;
    Ok(NewEvent {
        title: format!("Fishing session on {date}"),
        notes: Some(format!("Auto-created for a {species} catch")),
        start_at: now,
        end_at: None,
        spot_id,
    })
}
