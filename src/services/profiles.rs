//! Profile bootstrap and editing

use chrono::Utc;
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::{Session, User};
use crate::error::Error;
use crate::models::{Profile, ProfileUpdate, PROFILES_TABLE};
use crate::postgrest::Filterable;
use crate::storage::{FileOptions, ImageUpload};
use crate::Grabi;

/// What the app knows about the signed-in user after start-up
#[derive(Debug, Clone)]
pub struct SessionState {
    pub session: Session,
    pub user: User,
    pub profile: Profile,
}

/// Which profile picture to replace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileImage {
    Avatar,
    Banner,
}

#[derive(Serialize)]
struct NewProfileRow<'a> {
    id: &'a str,
    email: Option<&'a str>,
    full_name: Option<&'a str>,
    phone: Option<&'a str>,
    email_verified: bool,
    phone_verified: bool,
}

/// Profile rows of the `profiles` table
pub struct ProfileService {
    grabi: Grabi,
}

impl ProfileService {
    pub(crate) fn new(grabi: Grabi) -> Self {
        Self { grabi }
    }

    /// Fetch a profile by user id
    pub async fn get(&self, user_id: &str) -> Result<Option<Profile>, Error> {
        self.grabi
            .from(PROFILES_TABLE)
            .select("*")
            .eq("id", user_id)
            .execute_one::<Profile>()
            .await
    }

    /// Profile of the signed-in user
    pub async fn current(&self) -> Result<Profile, Error> {
        let user_id = self.grabi.auth().user_id()?;
        self.get(&user_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("profile {}", user_id)))
    }

    /// Read the auth session and mirror the user's profile row
    ///
    /// Returns `None` for visitors. A signed-in user without a profile row
    /// (e.g. the row trigger failed at sign-up) gets one created from the
    /// auth record.
    pub async fn bootstrap(&self) -> Result<Option<SessionState>, Error> {
        let session = match self.grabi.auth().get_session() {
            Some(session) if !session.is_expired() => session,
            Some(_) => {
                info!("stored session expired, continuing as visitor");
                self.grabi.auth().clear_session();
                return Ok(None);
            }
            None => return Ok(None),
        };

        let user = self.grabi.auth().get_user().await?;
        let profile = match self.get(&user.id).await? {
            Some(profile) => profile,
            None => {
                warn!("no profile row for user {}, creating one", user.id);
                self.create_from_user(&user).await?
            }
        };

        Ok(Some(SessionState {
            session,
            user,
            profile,
        }))
    }

    async fn create_from_user(&self, user: &User) -> Result<Profile, Error> {
        let row = NewProfileRow {
            id: &user.id,
            email: user.email.as_deref(),
            full_name: user.full_name(),
            phone: user.phone.as_deref().filter(|p| !p.is_empty()),
            email_verified: user.is_email_confirmed(),
            phone_verified: user.is_phone_confirmed(),
        };

        let rows = self
            .grabi
            .from(PROFILES_TABLE)
            .upsert(&row)
            .on_conflict("id")
            .execute::<Vec<Profile>>()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| Error::database("profile upsert returned no row"))
    }

    /// Update the signed-in user's editable fields
    pub async fn update(&self, changes: &ProfileUpdate) -> Result<Profile, Error> {
        let user_id = self.grabi.auth().user_id()?;
        if changes.is_empty() {
            return self.current().await;
        }

        #[derive(Serialize)]
        struct Patch<'a> {
            #[serde(flatten)]
            changes: &'a ProfileUpdate,
            updated_at: chrono::DateTime<Utc>,
        }

        let rows = self
            .grabi
            .from(PROFILES_TABLE)
            .update(Patch {
                changes,
                updated_at: Utc::now(),
            })
            .eq("id", &user_id)
            .execute::<Vec<Profile>>()
            .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| Error::not_found(format!("profile {}", user_id)))
    }

    /// Upload a new avatar or banner and point the profile at it
    ///
    /// The previous picture is removed from storage afterwards; a failed
    /// removal only leaves an orphan object behind and is not reported.
    pub async fn replace_image(&self, kind: ProfileImage, image: ImageUpload) -> Result<Profile, Error> {
        let user_id = self.grabi.auth().user_id()?;
        let previous = self.current().await?;

        let (bucket_name, prefix) = match kind {
            ProfileImage::Avatar => (&self.grabi.options.buckets.avatars, "avatar"),
            ProfileImage::Banner => (&self.grabi.options.buckets.banners, "banner"),
        };

        let storage = self.grabi.storage();
        let bucket = storage.from(bucket_name);
        let path = format!("{}/{}-{}.{}", user_id, prefix, Uuid::new_v4(), image.extension());

        bucket
            .upload(
                &path,
                image.data,
                FileOptions::default()
                    .with_content_type(&image.content_type)
                    .with_upsert(true),
            )
            .await?;
        let public_url = bucket.get_public_url(&path);

        let changes = match kind {
            ProfileImage::Avatar => ProfileUpdate {
                avatar_url: Some(public_url),
                ..Default::default()
            },
            ProfileImage::Banner => ProfileUpdate {
                banner_url: Some(public_url),
                ..Default::default()
            },
        };
        let profile = self.update(&changes).await?;

        let old_url = match kind {
            ProfileImage::Avatar => previous.avatar_url,
            ProfileImage::Banner => previous.banner_url,
        };
        if let Some(old_path) = old_url.as_deref().and_then(|u| bucket.path_from_public_url(u)) {
            if let Err(e) = bucket.remove(&[old_path.clone()]).await {
                warn!("could not remove old {:?} {}: {}", kind, old_path, e);
            }
        }

        Ok(profile)
    }

    /// Shorthand for replacing the avatar
    pub async fn upload_avatar(&self, image: ImageUpload) -> Result<Profile, Error> {
        self.replace_image(ProfileImage::Avatar, image).await
    }

    /// Shorthand for replacing the banner
    pub async fn upload_banner(&self, image: ImageUpload) -> Result<Profile, Error> {
        self.replace_image(ProfileImage::Banner, image).await
    }
}
