use clap::Subcommand;
use serde_json::json;

use super::{open_session, print_json, CliResult};

#[derive(Subcommand)]
pub enum CollectionAction {
    /// Owned items with how many times each was drawn
    List {
        /// Include items not collected yet
        #[arg(long)]
        all: bool,
    },
    /// One catalog item and its acquisitions
    Show {
        /// Item id (e.g. "golden-uni")
        id: String,
    },
    /// Acquisitions grouped by local calendar day
    Calendar,
    /// Delete every acquisition
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

pub async fn run(action: CollectionAction) -> CliResult {
    let mut session = open_session().await?;
    match action {
        CollectionAction::List { all } => {
            let flow = session.flow();
            let owned = flow.log().owned_ids();
            let items: Vec<_> = flow
                .catalog()
                .items()
                .iter()
                .filter(|item| all || owned.contains(item.id.as_str()))
                .map(|item| {
                    json!({
                        "id": item.id,
                        "name": item.name,
                        "rarity": item.rarity,
                        "category": item.category,
                        "count": flow.log().count_for(&item.id),
                    })
                })
                .collect();
            print_json(&items)?;
        }
        CollectionAction::Show { id } => {
            let flow = session.flow();
            let item = flow
                .catalog()
                .get(&id)
                .ok_or_else(|| format!("unknown item: {id}"))?;
            let acquired: Vec<_> = flow
                .log()
                .entries()
                .iter()
                .filter(|e| e.item_id == id)
                .map(|e| e.acquired_at)
                .collect();
            print_json(&json!({ "item": item, "acquiredAt": acquired }))?;
        }
        CollectionAction::Calendar => {
            let mut days = serde_json::Map::new();
            for (day, entries) in session.flow().log().by_day() {
                days.insert(day.to_string(), serde_json::to_value(entries)?);
            }
            print_json(&days)?;
        }
        CollectionAction::Clear { yes } => {
            if !yes {
                return Err("refusing to clear the collection without --yes".into());
            }
            session.flow_mut().log_mut().clear().await?;
            println!("collection cleared");
        }
    }
    Ok(())
}
