//! Process configuration
//!
//! Every option can be given as a flag or an environment variable (a `.env`
//! file is loaded before parsing). The JWT signing secret has no default:
//! starting without one is a fatal error.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "cinedb", version, about = "Movie and director catalogue API")]
pub struct Config {
    /// Address the HTTP server listens on
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0:5173")]
    pub bind_addr: SocketAddr,

    /// SQLite file holding movies
    #[arg(long = "movie-db", env = "MOVIE_DB_PATH", default_value = "movies.db")]
    pub movie_db_path: PathBuf,

    /// SQLite file holding directors
    #[arg(long = "director-db", env = "DIRECTOR_DB_PATH", default_value = "directors.db")]
    pub director_db_path: PathBuf,

    /// SQLite file holding user credentials
    #[arg(long = "auth-db", env = "AUTH_DB_PATH", default_value = "auth.db")]
    pub auth_db_path: PathBuf,

    /// Secret used to sign and verify access tokens
    #[arg(long, env = "JWT_SECRET", hide_env_values = true, value_parser = non_empty)]
    pub jwt_secret: String,

    /// Skip inserting sample movies and directors into empty tables
    #[arg(long = "no-seed", env = "NO_SEED_SAMPLE_DATA")]
    pub no_seed: bool,
}

fn non_empty(raw: &str) -> Result<String, String> {
    if raw.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_with_secret() {
        let config = Config::try_parse_from(["cinedb", "--jwt-secret", "s3cret"]).unwrap();

        assert_eq!(config.jwt_secret, "s3cret");
        assert_eq!(config.bind_addr.port(), 5173);
        assert_eq!(config.movie_db_path, PathBuf::from("movies.db"));
        assert_eq!(config.director_db_path, PathBuf::from("directors.db"));
        assert!(!config.no_seed);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let result = Config::try_parse_from(["cinedb", "--jwt-secret", "  "]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::try_parse_from([
            "cinedb",
            "--jwt-secret",
            "k",
            "--bind",
            "127.0.0.1:8080",
            "--auth-db",
            "/tmp/users.db",
            "--no-seed",
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(config.auth_db_path, PathBuf::from("/tmp/users.db"));
        assert!(config.no_seed);
    }
}
