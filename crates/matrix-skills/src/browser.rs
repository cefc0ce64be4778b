//! Web searches and well-known sites, opened in the default browser.

use crate::error::{SkillError, SkillResult};
use crate::launcher::Launcher;

pub fn google_search_url(query: &str) -> String {
    format!("https://www.google.com/search?q={}", urlencoding::encode(query))
}

pub fn youtube_search_url(query: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(query)
    )
}

pub fn maps_url(place: Option<&str>) -> String {
    match place {
        Some(place) => format!(
            "https://www.google.com/maps/search/{}",
            urlencoding::encode(place)
        ),
        None => String::from("https://www.google.com/maps"),
    }
}

pub const GMAIL_URL: &str = "https://mail.google.com";

/// URL of a site known by name.
pub fn website_url(name: &str) -> Option<&'static str> {
    match name {
        "youtube" => Some("https://www.youtube.com"),
        "gmail" => Some(GMAIL_URL),
        "github" => Some("https://github.com"),
        "stackoverflow" => Some("https://stackoverflow.com"),
        "wikipedia" => Some("https://www.wikipedia.org"),
        _ => None,
    }
}

fn open(launcher: &mut dyn Launcher, url: &str) -> SkillResult<()> {
    tracing::info!("Opening {}", url);
    launcher.open(url).map_err(|source| SkillError::Launch {
        program: String::from("the browser"),
        source,
    })
}

fn require_query(query: Option<&str>) -> SkillResult<&str> {
    query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| SkillError::InvalidInput(String::from("What should I search for?")))
}

pub fn search_web(launcher: &mut dyn Launcher, query: Option<&str>) -> SkillResult<String> {
    let query = require_query(query)?;
    open(launcher, &google_search_url(query))?;
    Ok(format!("Searching for {query}"))
}

pub fn search_youtube(launcher: &mut dyn Launcher, query: Option<&str>) -> SkillResult<String> {
    let query = require_query(query)?;
    open(launcher, &youtube_search_url(query))?;
    Ok(format!("Searching YouTube for {query}"))
}

pub fn open_maps(launcher: &mut dyn Launcher, place: Option<&str>) -> SkillResult<String> {
    let place = place.map(str::trim).filter(|p| !p.is_empty());
    open(launcher, &maps_url(place))?;
    Ok(match place {
        Some(place) => format!("Showing {place} on the map"),
        None => String::from("Opening Google Maps"),
    })
}

pub fn open_gmail(launcher: &mut dyn Launcher) -> SkillResult<String> {
    open(launcher, GMAIL_URL)?;
    Ok(String::from("Opening Gmail"))
}

pub fn open_website(launcher: &mut dyn Launcher, name: &str) -> SkillResult<String> {
    let url = website_url(name).ok_or_else(|| SkillError::NotFound {
        what: "website",
        name: name.to_string(),
    })?;
    open(launcher, url)?;
    Ok(format!("Opening {}", crate::apps::label(name)))
}
