use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use cross_xdg::BaseDirs;
use tracing::debug;

use crate::program::{DEFAULT_PROGRAM_CAPACITY, DEFAULT_TAPE_SIZE};

pub const PROGRAM_CAPACITY_ENV: &str = "RLEBF_PROGRAM_CAPACITY";
pub const TAPE_SIZE_ENV: &str = "RLEBF_TAPE_SIZE";
pub const CONFIG_FILE_NAME: &str = "rlebf.toml";

/// Largest accepted program capacity or tape size (64 Mi entries).
pub const MAX_LIMIT: usize = 1 << 26;

/// Errors that can occur while resolving [`Limits`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configured size is larger than [`MAX_LIMIT`].
    #[error("{origin} is {value}, the maximum is {max}")]
    OutOfRange { origin: String, value: usize, max: usize },
}

/// Sizes shared by the compiler and the virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of compiled instructions.
    pub program_capacity: usize,
    /// Number of cells on the tape.
    pub tape_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            program_capacity: DEFAULT_PROGRAM_CAPACITY,
            tape_size: DEFAULT_TAPE_SIZE,
        }
    }
}

/// Where one limit can be set, from highest to lowest precedence.
struct Keys {
    flag: &'static str,
    env: &'static str,
    file: &'static str,
}

const PROGRAM_CAPACITY_KEYS: Keys = Keys {
    flag: "--capacity",
    env: PROGRAM_CAPACITY_ENV,
    file: "program_capacity",
};

const TAPE_SIZE_KEYS: Keys = Keys {
    flag: "--tape-size",
    env: TAPE_SIZE_ENV,
    file: "tape_size",
};

impl Limits {
    /// Resolve limits: flags -> env -> config file -> defaults.
    ///
    /// Zero or unparsable values at any layer are ignored. The first value
    /// found that exceeds [`MAX_LIMIT`] is an error.
    pub fn resolve(program_capacity: Option<usize>, tape_size: Option<usize>) -> Result<Self, ConfigError> {
        let file = config_path()
            .and_then(|path| load_from_path(&path))
            .unwrap_or_default();
        Self::resolve_with(program_capacity, tape_size, |key| std::env::var(key).ok(), &file)
    }

    fn resolve_with<E>(
        program_capacity: Option<usize>,
        tape_size: Option<usize>,
        env: E,
        file: &HashMap<String, String>,
    ) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let limits = Self {
            program_capacity: pick(
                program_capacity,
                &PROGRAM_CAPACITY_KEYS,
                &env,
                file,
                defaults.program_capacity,
            )?,
            tape_size: pick(tape_size, &TAPE_SIZE_KEYS, &env, file, defaults.tape_size)?,
        };
        debug!(?limits, "resolved limits");
        Ok(limits)
    }
}

fn pick<E>(
    flag: Option<usize>,
    keys: &Keys,
    env: &E,
    file: &HashMap<String, String>,
    default: usize,
) -> Result<usize, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let layers = [
        (keys.flag.to_string(), flag.filter(|&n| n > 0)),
        (keys.env.to_string(), env(keys.env).as_deref().and_then(parse_size)),
        (
            format!("{CONFIG_FILE_NAME} {}", keys.file),
            file.get(keys.file).map(String::as_str).and_then(parse_size),
        ),
    ];

    match layers.into_iter().find_map(|(origin, value)| value.map(|v| (origin, v))) {
        Some((origin, value)) if value > MAX_LIMIT => Err(ConfigError::OutOfRange {
            origin,
            value,
            max: MAX_LIMIT,
        }),
        Some((_, value)) => Ok(value),
        None => Ok(default),
    }
}

fn parse_size(value: &str) -> Option<usize> {
    value.trim().replace('_', "").parse::<usize>().ok().filter(|&n| n > 0)
}

fn config_path() -> Option<PathBuf> {
    // On Linux: resolves to $XDG_CONFIG_HOME, or /home/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(CONFIG_FILE_NAME);
    Some(path)
}

fn load_from_path(path: &Path) -> Option<HashMap<String, String>> {
    let content = fs::read_to_string(path).ok()?;
    Some(parse_limits_section(&content))
}

/// Collect `key = value` pairs from the `[limits]` section.
fn parse_limits_section(content: &str) -> HashMap<String, String> {
    let mut in_limits = false;
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_limits = &line[1..line.len() - 1] == "limits";
            continue;
        }
        if !in_limits { continue; }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"');
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_match_reference_sizes() {
        let limits = Limits::resolve_with(None, None, no_env, &HashMap::new()).unwrap();
        assert_eq!(limits, Limits { program_capacity: 65536, tape_size: 65536 });
    }

    #[test]
    fn flags_win_over_env_and_file() {
        let file = parse_limits_section("[limits]\ntape_size = 10\nprogram_capacity = 20\n");
        let env = |key: &str| (key == TAPE_SIZE_ENV).then(|| "30".to_string());
        let limits = Limits::resolve_with(Some(5), Some(7), env, &file).unwrap();
        assert_eq!(limits, Limits { program_capacity: 5, tape_size: 7 });
    }

    #[test]
    fn env_wins_over_file() {
        let file = parse_limits_section("[limits]\ntape_size = 10\nprogram_capacity = 20\n");
        let env = |key: &str| (key == TAPE_SIZE_ENV).then(|| "30".to_string());
        let limits = Limits::resolve_with(None, None, env, &file).unwrap();
        assert_eq!(limits, Limits { program_capacity: 20, tape_size: 30 });
    }

    #[test]
    fn zero_and_garbage_fall_through() {
        let file = parse_limits_section("[limits]\ntape_size = 0\nprogram_capacity = lots\n");
        let env = |_: &str| Some("0".to_string());
        let limits = Limits::resolve_with(Some(0), None, env, &file).unwrap();
        assert_eq!(limits, Limits::default());
    }

    #[test]
    fn only_the_limits_section_is_read() {
        let file = parse_limits_section(
            "# comment\ntape_size = 1\n[other]\ntape_size = 2\n[limits]\ntape_size = \"1_024\"\n",
        );
        assert_eq!(file.get("tape_size").map(String::as_str), Some("1_024"));
        let limits = Limits::resolve_with(None, None, no_env, &file).unwrap();
        assert_eq!(limits.tape_size, 1024);
    }

    #[test]
    fn oversized_values_are_rejected() {
        let env = |key: &str| (key == TAPE_SIZE_ENV).then(|| "1000000000000".to_string());
        let err = Limits::resolve_with(None, None, env, &HashMap::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OutOfRange { ref origin, value: 1_000_000_000_000, max: MAX_LIMIT } if origin == TAPE_SIZE_ENV
        ));

        let err = Limits::resolve_with(Some(MAX_LIMIT + 1), None, no_env, &HashMap::new()).unwrap_err();
        assert_eq!(err.to_string(), format!("--capacity is {}, the maximum is {MAX_LIMIT}", MAX_LIMIT + 1));
    }

    #[test]
    fn maximum_itself_is_accepted() {
        let limits = Limits::resolve_with(None, Some(MAX_LIMIT), no_env, &HashMap::new()).unwrap();
        assert_eq!(limits.tape_size, MAX_LIMIT);
    }

    #[test]
    fn oversized_value_in_file_is_rejected() {
        let file = parse_limits_section("[limits]\nprogram_capacity = 999999999999\n");
        let err = Limits::resolve_with(None, None, no_env, &file).unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { ref origin, .. } if origin == "rlebf.toml program_capacity"));
    }

    #[test]
    fn loads_limits_from_config_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "[limits]\nprogram_capacity = 12\ntape_size = 34\n").expect("write config");

        let file = load_from_path(&path).expect("config file should load");
        let limits = Limits::resolve_with(None, None, no_env, &file).unwrap();
        assert_eq!(limits, Limits { program_capacity: 12, tape_size: 34 });
    }

    #[test]
    fn missing_config_file_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(load_from_path(&dir.path().join(CONFIG_FILE_NAME)).is_none());
    }
}
