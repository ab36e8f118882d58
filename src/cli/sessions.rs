//! Session review commands: list, show.

use uuid::Uuid;

use rehearse::gateway::Lookup;
use rehearse::model::Session;
use rehearse::storage::Storage;
use rehearse::summary::SessionSummary;

use super::format::{format_duration, format_summary, short_id};

pub(super) fn cmd_list(storage: &Storage) -> Result<(), String> {
    let sessions = storage
        .list_sessions()
        .map_err(|e| format!("failed to list sessions: {e}"))?;

    if sessions.is_empty() {
        println!("No sessions");
        return Ok(());
    }

    for s in &sessions {
        let status = storage
            .status(Lookup::Id(s.status))
            .map_or_else(|_| format!("status {}", s.status), |st| st.name);
        let duration = s.duration.map_or_else(|| "open".into(), format_duration);
        println!(
            "{}  {}  [{status}] [{}]  {} item(s), {duration}",
            short_id(s),
            s.start.strftime("%Y-%m-%d %H:%M"),
            s.mode.as_str(),
            s.children.len(),
        );
    }

    Ok(())
}

pub(super) fn cmd_show(storage: &Storage, reference: &str) -> Result<(), String> {
    let session = resolve_session(storage, reference)?;
    let load = |e| format!("failed to load session {}: {e}", short_id(&session));
    let items = storage.load_items(session.id).map_err(load)?;
    let actions = storage.load_actions(session.id).map_err(load)?;

    println!(
        "{}",
        format_summary(&SessionSummary::new(&session, &items, &actions))
    );
    Ok(())
}

/// Resolve a session reference (full UUID or unambiguous prefix) to a session.
fn resolve_session(storage: &Storage, reference: &str) -> Result<Session, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_session(id)
            .map_err(|e| format!("session not found: {e}"));
    }

    let sessions = storage
        .list_sessions()
        .map_err(|e| format!("failed to list sessions: {e}"))?;

    let matches: Vec<&Session> = sessions
        .iter()
        .filter(|s| s.id.to_string().starts_with(reference))
        .collect();

    match matches.as_slice() {
        [] => Err(format!("no session matching '{reference}'")),
        [session] => Ok((*session).clone()),
        many => {
            let ids: Vec<String> = many.iter().map(|s| short_id(s)).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {} sessions: {}",
                many.len(),
                ids.join(", ")
            ))
        }
    }
}
