//! Profile page operations.

use tracing::info;
use validator::Validate;

use super::slug::{slugify, validate_slug, validate_username};
use super::types::{ProfileError, ProfilePage, ProfileUpdate, TeamMember, UpdateProfileRequest};
use crate::identity::{PrincipalContext, Requester};
use crate::store::{ProfileStore, StoreError};
use crate::visibility::evaluate;

/// Resolve a profile page by slug for the public.
pub async fn get_public<S>(store: &S, slug: &str) -> Result<ProfilePage, ProfileError>
where
    S: ProfileStore + ?Sized,
{
    let page = store
        .find_profile_by_slug(slug)
        .await?
        .ok_or(ProfileError::NotFound)?;
    if !evaluate(&page, &Requester::Anonymous).visible {
        return Err(ProfileError::NotFound);
    }
    Ok(page)
}

/// Profiles listed on the team roster, ordered by username.
pub async fn team_roster<S>(store: &S) -> Result<Vec<TeamMember>, ProfileError>
where
    S: ProfileStore + ?Sized,
{
    let team = store.list_team().await?;
    Ok(team.into_iter().map(TeamMember::from).collect())
}

/// The principal's own page, in any state.
pub async fn get_mine<S>(store: &S, principal: &PrincipalContext) -> Result<ProfilePage, ProfileError>
where
    S: ProfileStore + ?Sized,
{
    store
        .get_profile(principal.id)
        .await?
        .ok_or(ProfileError::NotFound)
}

/// Update the principal's own page.
///
/// Setting a username without a slug derives the slug from the username.
pub async fn update_mine<S>(
    store: &S,
    principal: &PrincipalContext,
    req: UpdateProfileRequest,
) -> Result<ProfilePage, ProfileError>
where
    S: ProfileStore + ?Sized,
{
    req.validate()?;
    let mut update = ProfileUpdate::from(req);

    if let Some(username) = &update.username {
        validate_username(username).map_err(ProfileError::Validation)?;
        if update.slug.is_none() {
            update.slug = Some(slugify(username));
        }
    }
    if let Some(slug) = &update.slug {
        validate_slug(slug).map_err(ProfileError::Validation)?;
    }

    if let Some(username) = &update.username {
        if store.username_taken(username, principal.id).await? {
            return Err(ProfileError::Validation(format!(
                "Username '{username}' is already taken"
            )));
        }
    }
    if let Some(slug) = &update.slug {
        if store.slug_taken(slug, principal.id).await? {
            return Err(ProfileError::Validation(format!(
                "Slug '{slug}' is already taken"
            )));
        }
    }

    let page = match store.update_profile(principal.id, update).await {
        Ok(page) => page.ok_or(ProfileError::NotFound)?,
        // Lost a race against another writer claiming the same name.
        Err(StoreError::UniqueViolation(field)) => {
            return Err(ProfileError::Validation(format!(
                "That {field} is already taken"
            )))
        }
        Err(e) => return Err(e.into()),
    };

    info!(principal_id = %principal.id, slug = %page.slug, "Profile page updated");
    Ok(page)
}
