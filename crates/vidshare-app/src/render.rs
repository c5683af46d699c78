//! Plain-text pages for the terminal.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use vidshare_media::Preview;
use vidshare_types::{MediaRef, UserVideos, VideoCollection, VideoRecord};

use crate::screens::{ListingScreen, ProfileScreen, UserListingScreen, ViewStatus};

const UNAUTHENTICATED: &str = "Not logged in. Run `vidshare login` first.\n";

/// Creation time in the viewer's local zone.
pub fn created_at(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// A short description of where a piece of media lives.
pub fn media_summary(media: &MediaRef) -> String {
    match media {
        MediaRef::Url(url) => url.clone(),
        MediaRef::DataUrl(url) => {
            let (head, payload) = url.split_once(',').unwrap_or((url.as_str(), ""));
            let mime = head
                .trim_start_matches("data:")
                .split(';')
                .next()
                .unwrap_or_default();
            inline_summary(mime, payload)
        }
        MediaRef::Inline { mime, base64 } => inline_summary(mime, base64),
    }
}

fn preview_summary(preview: &Preview) -> String {
    match preview.original() {
        Some(file) => format!("{} ({}, {})", file.file_name, file.mime, human_size(file.len())),
        None if preview.is_remote() => preview.source().to_string(),
        None => media_summary(&MediaRef::DataUrl(preview.source().to_string())),
    }
}

fn inline_summary(mime: &str, base64: &str) -> String {
    let mime = if mime.is_empty() { "text/plain" } else { mime };
    format!("<inline {}, {}>", mime, human_size(base64.len() / 4 * 3))
}

fn human_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    }
}

pub fn video(record: &VideoRecord) -> String {
    let mut out = String::new();
    let title = if record.title.is_empty() { "(untitled)" } else { record.title.as_str() };
    let _ = writeln!(out, "  {}", title);
    if !record.description.is_empty() {
        let _ = writeln!(out, "    {}", record.description);
    }
    if let Some(at) = &record.created_at {
        let _ = writeln!(out, "    Created: {}", created_at(at));
    }
    let _ = writeln!(out, "    Video: {}", media_summary(&record.video));
    if let Some(thumbnail) = &record.thumbnail {
        let _ = writeln!(out, "    Thumbnail: {}", media_summary(thumbnail));
    }
    out
}

pub fn collection(videos: &VideoCollection) -> String {
    if videos.is_empty() {
        return "  No videos yet.\n".to_string();
    }
    videos.iter().map(video).collect()
}

pub fn user_section(user: &UserVideos) -> String {
    let mut out = String::new();
    let name = user.display_name();
    let name = if name.is_empty() { user.user_id.as_str() } else { name.as_str() };
    let _ = writeln!(out, "{} [{}]", name, user.user_id);
    if let Some(avatar) = &user.avatar {
        let _ = writeln!(out, "  Avatar: {}", media_summary(avatar));
    }
    out.push_str(&collection(&user.videos));
    out
}

pub fn profile_page(screen: &ProfileScreen) -> String {
    if screen.status() == ViewStatus::Unauthenticated {
        return UNAUTHENTICATED.to_string();
    }

    let profile = screen.profile();
    let mut out = String::new();
    let name = format!("{} {}", profile.first_name, profile.last_name);
    let _ = writeln!(out, "{}", name.trim());
    if let Some(avatar) = screen.avatar() {
        let _ = writeln!(out, "Avatar: {}", preview_summary(avatar));
    }
    let bio = if screen.bio().is_empty() { "(no bio)" } else { screen.bio() };
    let _ = writeln!(out, "Bio: {}", bio);
    let _ = writeln!(out);
    let _ = writeln!(out, "My videos ({}):", screen.videos().len());
    out.push_str(&collection(screen.videos()));
    out
}

pub fn listing_page(screen: &ListingScreen) -> String {
    if screen.status() == ViewStatus::Unauthenticated {
        return UNAUTHENTICATED.to_string();
    }
    if screen.users().is_empty() {
        return "No videos yet.\n".to_string();
    }
    screen
        .users()
        .iter()
        .map(user_section)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn user_listing_page(screen: &UserListingScreen) -> String {
    if screen.status() == ViewStatus::Unauthenticated {
        return UNAUTHENTICATED.to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "Videos of {}:", screen.user_id());
    out.push_str(&collection(screen.videos()));
    out
}
