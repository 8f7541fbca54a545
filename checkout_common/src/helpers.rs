use std::{env, str::FromStr};

/// Reads `name` from the environment and parses it. Missing or unparseable values yield `None`.
pub fn parse_env<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}
