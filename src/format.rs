use chrono::{Datelike, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const POSTER_SIZE: &str = "w500";
pub const BACKDROP_SIZE: &str = "w1280";
pub const AVATAR_SIZE: &str = "w185";

// Placeholder store data until a pricing source exists.
pub const DISPLAY_PRICE: f64 = 29.90;
pub const FORMATTED_PRICE: &str = "R$ 29,90";
pub const GENRE_MOVIE_COUNT: u32 = 0;

pub const DEFAULT_TRUNCATE: usize = 100;
const DEFAULT_GENRE_ICON: &str = "🎬";
const YOUTUBE: &str = "YouTube";
const NO_DATE: &str = "Data não disponível";
const NO_DURATION: &str = "Duração não disponível";
const NO_BUDGET: &str = "Orçamento não disponível";
const NO_REVENUE: &str = "Receita não disponível";

/// Only `id` is strict. A field of the wrong type reads as absent so the card still renders.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMovie {
    pub id: u64,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub original_title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub vote_average: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub vote_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub popularity: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub adult: Option<bool>,
    #[serde(default, deserialize_with = "lenient")]
    pub genre_ids: Option<Vec<u64>>,
    #[serde(default, deserialize_with = "lenient")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub backdrop_path: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub original_language: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGenre {
    pub id: u64,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCast {
    pub id: u64,
    pub name: Option<String>,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCrew {
    pub id: u64,
    pub name: Option<String>,
    pub job: Option<String>,
    pub department: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawVideo {
    pub id: String,
    pub key: Option<String>,
    pub name: Option<String>,
    pub site: Option<String>,
    #[serde(rename = "type")]
    pub video_type: Option<String>,
    pub official: Option<bool>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawReview {
    pub id: String,
    pub author: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub url: Option<String>,
    pub author_details: Option<RawAuthorDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawAuthorDetails {
    pub rating: Option<f64>,
    pub avatar_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawMovieDetails {
    #[serde(flatten)]
    movie: RawMovie,
    #[serde(default, deserialize_with = "lenient_count")]
    runtime: Option<u32>,
    #[serde(default, deserialize_with = "lenient")]
    tagline: Option<String>,
    genres: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient_count")]
    budget: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    revenue: Option<u64>,
    credits: Option<RawCredits>,
    videos: Option<RawResults>,
    reviews: Option<RawResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawCredits {
    #[serde(default)]
    cast: Vec<Value>,
    #[serde(default)]
    crew: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RawResults {
    #[serde(default)]
    results: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: String,
    pub release_date: Option<String>,
    pub year: Option<i32>,
    pub vote_average: f64,
    pub vote_count: u64,
    pub popularity: f64,
    pub adult: bool,
    pub genre_ids: Vec<u64>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub original_language: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub formatted_release_date: String,
    pub rating: String,
    pub price: f64,
    pub formatted_price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id: u64,
    pub name: String,
    pub movie_count: u32,
    pub icon: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub profile_url: Option<String>,
    pub order: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Crew {
    pub id: u64,
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
    pub profile_path: Option<String>,
    pub profile_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    pub key: Option<String>,
    pub name: Option<String>,
    pub site: Option<String>,
    #[serde(rename = "type")]
    pub video_type: Option<String>,
    pub official: bool,
    pub published_at: Option<String>,
    pub youtube_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub author: String,
    pub content: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub url: Option<String>,
    pub rating: Option<f64>,
    pub avatar_path: Option<String>,
    pub avatar_url: Option<String>,
}

/// Detail page view model: the card fields plus everything appended to the details call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: Movie,
    pub runtime: Option<u32>,
    pub formatted_duration: String,
    pub tagline: Option<String>,
    pub genres: Vec<Genre>,
    pub budget: Option<u64>,
    pub formatted_budget: String,
    pub revenue: Option<u64>,
    pub formatted_revenue: String,
    pub age_rating: &'static str,
    pub cast: Vec<Actor>,
    pub crew: Vec<Crew>,
    pub videos: Vec<Video>,
    pub reviews: Vec<Review>,
}

/// Anything that is not an object, or does not fit the record's schema, yields `None`.
fn parse<T: DeserializeOwned>(raw: &Value) -> Option<T> {
    if !raw.is_object() {
        return None;
    }
    T::deserialize(raw).ok()
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Whole-number counts that TMDB occasionally sends as floats (`12.0`).
fn lenient_count<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let value = Value::deserialize(deserializer)?;
    let count = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    });
    Ok(count.and_then(|c| T::try_from(c).ok()))
}

pub fn image_url(path: Option<&str>, size: &str) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    Some(format!("{IMAGE_BASE}/{size}/{}", path.trim_start_matches('/')))
}

pub fn poster_url(path: Option<&str>) -> Option<String> {
    image_url(path, POSTER_SIZE)
}

pub fn backdrop_url(path: Option<&str>) -> Option<String> {
    image_url(path, BACKDROP_SIZE)
}

pub fn avatar_url(path: Option<&str>) -> Option<String> {
    image_url(path, AVATAR_SIZE)
}

fn parse_release_date(date: Option<&str>) -> Option<NaiveDate> {
    let date = date?.trim();
    let day = date.get(..10).unwrap_or(date);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

pub fn release_year(date: Option<&str>) -> Option<i32> {
    parse_release_date(date).map(|d| d.year())
}

pub fn format_release_date(date: Option<&str>) -> String {
    parse_release_date(date)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NO_DATE.to_string())
}

pub fn format_rating(vote_average: Option<f64>) -> String {
    match vote_average {
        // Halves round up: 7.25 shows as 7.3.
        Some(v) if v != 0.0 && v.is_finite() => format!("{:.1}", (v * 10.0).round() / 10.0),
        _ => "0.0".to_string(),
    }
}

impl From<RawMovie> for Movie {
    fn from(raw: RawMovie) -> Self {
        let year = release_year(raw.release_date.as_deref());
        let formatted_release_date = format_release_date(raw.release_date.as_deref());
        let poster_url = poster_url(raw.poster_path.as_deref());
        let backdrop_url = backdrop_url(raw.backdrop_path.as_deref());
        Movie {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            original_title: raw.original_title,
            overview: raw.overview.unwrap_or_default(),
            release_date: raw.release_date,
            year,
            vote_average: raw.vote_average.unwrap_or_default(),
            vote_count: raw.vote_count.unwrap_or_default(),
            popularity: raw.popularity.unwrap_or_default(),
            adult: raw.adult.unwrap_or(false),
            genre_ids: raw.genre_ids.unwrap_or_default(),
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
            original_language: raw.original_language,
            poster_url,
            backdrop_url,
            formatted_release_date,
            rating: format_rating(raw.vote_average),
            price: DISPLAY_PRICE,
            formatted_price: FORMATTED_PRICE.to_string(),
        }
    }
}

pub fn format_movie(raw: &Value) -> Option<Movie> {
    parse::<RawMovie>(raw).map(Movie::from)
}

pub fn genre_icon(genre_id: u64) -> &'static str {
    match genre_id {
        28 => "🎬",
        12 => "🗺️",
        16 => "🎨",
        35 => "😂",
        80 | 9648 | 53 => "🔍",
        99 | 10770 => "📺",
        18 => "🎭",
        10751 => "👨‍👩‍👧‍👦",
        14 => "🧙‍♂️",
        36 => "📚",
        27 => "👻",
        10402 => "🎵",
        10749 => "💕",
        878 => "🚀",
        10752 => "⚔️",
        37 => "🤠",
        _ => DEFAULT_GENRE_ICON,
    }
}

pub fn format_genre(raw: &Value) -> Option<Genre> {
    let genre = parse::<RawGenre>(raw)?;
    Some(Genre {
        id: genre.id,
        name: genre.name.unwrap_or_default(),
        movie_count: GENRE_MOVIE_COUNT,
        icon: genre_icon(genre.id),
    })
}

pub fn format_actor(raw: &Value) -> Option<Actor> {
    let cast = parse::<RawCast>(raw)?;
    Some(Actor {
        id: cast.id,
        name: cast.name.unwrap_or_default(),
        character: cast.character,
        profile_url: avatar_url(cast.profile_path.as_deref()),
        profile_path: cast.profile_path,
        order: cast.order,
    })
}

pub fn format_crew(raw: &Value) -> Option<Crew> {
    let crew = parse::<RawCrew>(raw)?;
    Some(Crew {
        id: crew.id,
        name: crew.name.unwrap_or_default(),
        job: crew.job,
        department: crew.department,
        profile_url: avatar_url(crew.profile_path.as_deref()),
        profile_path: crew.profile_path,
    })
}

pub fn format_video(raw: &Value) -> Option<Video> {
    let video = parse::<RawVideo>(raw)?;
    // Exact match: TMDB spells it "YouTube".
    let youtube_key = video
        .key
        .as_deref()
        .filter(|k| !k.is_empty() && video.site.as_deref() == Some(YOUTUBE));
    let youtube_url = youtube_key.map(|k| format!("https://www.youtube.com/watch?v={k}"));
    let thumbnail_url =
        youtube_key.map(|k| format!("https://img.youtube.com/vi/{k}/hqdefault.jpg"));
    Some(Video {
        id: video.id,
        key: video.key,
        name: video.name,
        site: video.site,
        video_type: video.video_type,
        official: video.official.unwrap_or(false),
        published_at: video.published_at,
        youtube_url,
        thumbnail_url,
    })
}

pub fn format_review(raw: &Value) -> Option<Review> {
    let review = parse::<RawReview>(raw)?;
    let (rating, avatar_path) = match review.author_details {
        Some(details) => (
            details.rating.filter(|r| *r != 0.0),
            details.avatar_path,
        ),
        None => (None, None),
    };
    Some(Review {
        id: review.id,
        author: review.author.unwrap_or_default(),
        content: review.content.unwrap_or_default(),
        created_at: review.created_at,
        updated_at: review.updated_at,
        url: review.url,
        rating,
        avatar_url: avatar_url(avatar_path.as_deref()),
        avatar_path,
    })
}

pub fn format_movie_details(raw: &Value) -> Option<MovieDetails> {
    let details = parse::<RawMovieDetails>(raw)?;
    let movie = Movie::from(details.movie);
    let credits = details.credits.unwrap_or_default();

    let mut cast: Vec<Actor> = credits.cast.iter().filter_map(format_actor).collect();
    cast.sort_by_key(|a| a.order.unwrap_or(u32::MAX));

    Some(MovieDetails {
        runtime: details.runtime,
        formatted_duration: format_duration(details.runtime),
        tagline: details.tagline.filter(|t| !t.trim().is_empty()),
        genres: details
            .genres
            .unwrap_or_default()
            .iter()
            .filter_map(format_genre)
            .collect(),
        budget: details.budget,
        formatted_budget: format_budget(details.budget),
        revenue: details.revenue,
        formatted_revenue: format_revenue(details.revenue),
        age_rating: age_rating(&movie),
        cast,
        crew: credits.crew.iter().filter_map(format_crew).collect(),
        videos: details
            .videos
            .unwrap_or_default()
            .results
            .iter()
            .filter_map(format_video)
            .collect(),
        reviews: details
            .reviews
            .unwrap_or_default()
            .results
            .iter()
            .filter_map(format_review)
            .collect(),
        movie,
    })
}

pub fn truncate_text(text: Option<&str>, max_chars: usize) -> String {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return String::new();
    };
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars).collect();
    format!("{}...", head.trim())
}

pub fn format_duration(minutes: Option<u32>) -> String {
    let Some(minutes) = minutes.filter(|m| *m > 0) else {
        return NO_DURATION.to_string();
    };
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{hours}h {mins}min")
    } else {
        format!("{mins}min")
    }
}

pub fn format_budget(budget: Option<u64>) -> String {
    budget
        .filter(|b| *b > 0)
        .map(format_usd)
        .unwrap_or_else(|| NO_BUDGET.to_string())
}

pub fn format_revenue(revenue: Option<u64>) -> String {
    revenue
        .filter(|r| *r > 0)
        .map(format_usd)
        .unwrap_or_else(|| NO_REVENUE.to_string())
}

/// Whole dollars with pt-BR digit grouping.
fn format_usd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("US$ {grouped}")
}

pub fn is_adult_content(movie: &Movie) -> bool {
    movie.adult
}

pub fn age_rating(movie: &Movie) -> &'static str {
    if is_adult_content(movie) {
        "18+"
    } else {
        "Livre"
    }
}
