use crate::{
    error::Error,
    info,
    spotify::{PlaylistService, all_own_playlists},
    types::{Playlist, ReverseOptions, ReverseSummary},
    utils,
};

/// Writes the tracks of the source playlist into the target playlist in
/// reverse order.
///
/// The target is the playlist owned by the user and named
/// `target_playlist_name` (default `"<source name> (reversed)"`). An existing target is only touched when
/// `override_existing` is set, in which case its tracks are cleared first;
/// otherwise the run stops with [`Error::Conflict`] before any write. Entries
/// without a resolvable track are reversed along with the rest and dropped
/// only when the URIs are written.
///
/// # Errors
///
/// - [`Error::NotFound`] if the source playlist does not exist or its id is
///   refused by the service
/// - [`Error::Conflict`] if the target exists and overriding was not requested
/// - any other remote error aborts the run as is
pub async fn reverse<S>(
    api: &S,
    token: &str,
    options: &ReverseOptions,
) -> Result<ReverseSummary, Error>
where
    S: PlaylistService + ?Sized,
{
    let source_id = options.source_playlist_id.as_str();
    let own_playlists = all_own_playlists(api, token).await?;

    let source = match own_playlists.iter().find(|p| p.id == source_id) {
        Some(playlist) => playlist.clone(),
        None => api
            .get_playlist(token, source_id)
            .await
            .map_err(|e| not_found_on_rejection(e, source_id))?
            .ok_or_else(|| source_not_found(source_id))?,
    };

    info!("Fetching tracks from source playlist '{}'...", source_id);
    let pb = utils::spinner(format!("Fetching tracks of '{}'...", source.name));
    let fetched = api.get_playlist_tracks(token, source_id).await;
    pb.finish_and_clear();
    let items = fetched.map_err(|e| not_found_on_rejection(e, source_id))?;

    let target_name = options
        .target_playlist_name
        .clone()
        .unwrap_or_else(|| utils::default_target_name(&source.name));
    let reversed = utils::reverse_items(&items);

    // followed playlists are listed too but cannot be written to
    let user = api.current_user(token).await?;
    let existing: Option<Playlist> = own_playlists
        .into_iter()
        .find(|p| p.name == target_name && owned_by(p, &user.id));

    let (target, replaced_existing) = match existing {
        Some(_) if !options.override_existing => return Err(Error::Conflict(target_name)),
        Some(playlist) => {
            info!(
                "Removing all tracks from existing playlist '{}'...",
                playlist.name
            );
            api.clear_playlist_tracks(token, &playlist.id).await?;
            (playlist, true)
        }
        None => {
            let created = api
                .create_playlist(
                    token,
                    &target_name,
                    options.target_playlist_description.as_deref(),
                )
                .await?;
            (created, false)
        }
    };

    info!(
        "Writing tracks to playlist '{}' in reverse order...",
        target.name
    );
    let (uris, skipped) = utils::writable_uris(&reversed);
    api.add_tracks_to_playlist(token, &target.id, &uris).await?;

    Ok(ReverseSummary {
        target_id: target.id,
        target_name: target.name,
        written: uris.len(),
        skipped,
        replaced_existing,
    })
}

fn owned_by(playlist: &Playlist, user_id: &str) -> bool {
    playlist
        .owner
        .as_ref()
        .is_none_or(|owner| owner.id == user_id)
}

fn source_not_found(source_id: &str) -> Error {
    Error::NotFound(format!("Source playlist '{}'", source_id))
}

// a refused id (bad format, no access) means the same as a missing playlist
fn not_found_on_rejection(e: Error, source_id: &str) -> Error {
    match e {
        Error::Rejected { .. } => source_not_found(source_id),
        other => other,
    }
}
