use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The kind of title a request refers to. Anything the request source does
/// not report as a movie is treated as a tv show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaType {
    #[serde(rename = "movie")]
    Movie,
    #[serde(rename = "tv show")]
    TvShow,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::TvShow => "tv show",
        }
    }

    /// Path segment used by the movie database api
    pub fn tmdb_path(&self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::TvShow => "tv",
        }
    }

    /// Movies are looked up by their own rating key in the watch history,
    /// shows by the key of the show which the watched episode belongs to.
    pub fn history_key_param(&self) -> &'static str {
        match self {
            Self::Movie => "rating_key",
            Self::TvShow => "grandparent_rating_key",
        }
    }
}

impl From<&str> for MediaType {
    fn from(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("movie") {
            Self::Movie
        } else {
            Self::TvShow
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
