//! Domain records served by the CRUD API

use crate::db::Record;
use crate::validation::{self, ValidationError};
use rusqlite::types::Value as SqlValue;
use rusqlite::Row;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A record type exposed over HTTP.
pub trait Resource: Record {
    /// Collection path segment, e.g. `movies`.
    const PATH: &'static str;

    /// Check a request body and turn it into a draft. Runs before any store call.
    fn draft_from(body: &Map<String, Value>, current_year: i64)
        -> Result<Self::Draft, ValidationError>;

    /// Rows written into an empty table at startup.
    fn sample_data() -> Vec<Self::Draft>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieDraft {
    pub title: String,
    pub director: String,
    pub year: i64,
}

impl MovieDraft {
    fn new(title: &str, director: &str, year: i64) -> Self {
        Self {
            title: title.to_string(),
            director: director.to_string(),
            year,
        }
    }
}

impl Record for Movie {
    const NAME: &'static str = "movie";
    const TABLE: &'static str = "movie";
    const SCHEMA: &'static str = "CREATE TABLE IF NOT EXISTS movie (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT,
        director TEXT,
        year INTEGER
    )";
    const COLUMNS: &'static [&'static str] = &["title", "director", "year"];

    type Draft = MovieDraft;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Movie {
            id: row.get(0)?,
            title: row.get(1)?,
            director: row.get(2)?,
            year: row.get(3)?,
        })
    }

    fn bind(draft: &MovieDraft) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(draft.title.clone()),
            SqlValue::Text(draft.director.clone()),
            SqlValue::Integer(draft.year),
        ]
    }

    fn with_id(id: i64, draft: MovieDraft) -> Self {
        Movie {
            id,
            title: draft.title,
            director: draft.director,
            year: draft.year,
        }
    }
}

impl Resource for Movie {
    const PATH: &'static str = "movies";

    fn draft_from(body: &Map<String, Value>, current_year: i64) -> Result<MovieDraft, ValidationError> {
        let (title, director, year) = (body.get("title"), body.get("director"), body.get("year"));
        validation::require_all("title, director and year", &[title, director, year])?;

        let year = validation::movie_year(year.unwrap_or(&Value::Null), current_year)?;
        let missing = ValidationError::MissingFields("title, director and year");
        Ok(MovieDraft {
            title: validation::text(title).ok_or_else(|| missing.clone())?,
            director: validation::text(director).ok_or(missing)?,
            year,
        })
    }

    fn sample_data() -> Vec<MovieDraft> {
        vec![
            MovieDraft::new("The Shawshank Redemption", "Frank Darabont", 1994),
            MovieDraft::new("The Godfather", "Francis Ford Coppola", 1972),
            MovieDraft::new("The Dark Knight", "Christopher Nolan", 2008),
            MovieDraft::new("Pulp Fiction", "Quentin Tarantino", 1994),
            MovieDraft::new("Fight Club", "David Fincher", 1999),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Director {
    pub id: i64,
    pub name: String,
    #[serde(rename = "birthYear")]
    pub birth_year: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorDraft {
    pub name: String,
    pub birth_year: i64,
}

impl DirectorDraft {
    fn new(name: &str, birth_year: i64) -> Self {
        Self {
            name: name.to_string(),
            birth_year,
        }
    }
}

impl Record for Director {
    const NAME: &'static str = "director";
    const TABLE: &'static str = "directors";
    const SCHEMA: &'static str = "CREATE TABLE IF NOT EXISTS directors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        birthYear INTEGER
    )";
    const COLUMNS: &'static [&'static str] = &["name", "birthYear"];

    type Draft = DirectorDraft;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Director {
            id: row.get(0)?,
            name: row.get(1)?,
            birth_year: row.get(2)?,
        })
    }

    fn bind(draft: &DirectorDraft) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(draft.name.clone()),
            SqlValue::Integer(draft.birth_year),
        ]
    }

    fn with_id(id: i64, draft: DirectorDraft) -> Self {
        Director {
            id,
            name: draft.name,
            birth_year: draft.birth_year,
        }
    }
}

impl Resource for Director {
    const PATH: &'static str = "directors";

    fn draft_from(
        body: &Map<String, Value>,
        current_year: i64,
    ) -> Result<DirectorDraft, ValidationError> {
        let (name, birth_year) = (body.get("name"), body.get("birthYear"));
        validation::require_all("name and birthYear", &[name, birth_year])?;

        let birth_year = validation::birth_year(birth_year.unwrap_or(&Value::Null), current_year)?;
        Ok(DirectorDraft {
            name: validation::text(name)
                .ok_or(ValidationError::MissingFields("name and birthYear"))?,
            birth_year,
        })
    }

    fn sample_data() -> Vec<DirectorDraft> {
        vec![
            DirectorDraft::new("Frank Darabont", 1959),
            DirectorDraft::new("Francis Ford Coppola", 1939),
            DirectorDraft::new("Christopher Nolan", 1970),
            DirectorDraft::new("Quentin Tarantino", 1963),
            DirectorDraft::new("David Fincher", 1962),
        ]
    }
}
