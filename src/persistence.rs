//! Rollout persistence (§6.4, ambient addition A8): a text stream format and
//! a lockfile compare-and-swap, matching the original implementation's
//! `Rollout::store`/`load`/`compareAndSwap`.

use std::fs;
use std::io;
use std::path::Path;

use crate::policy::MoveCode;
use crate::rollout::Rollout;

/// `<length> <level> <score> <move_0> <move_1> ... <move_{length-1}>`,
/// whitespace-separated.
pub fn format_rollout(rollout: &Rollout, level: usize) -> String {
    let mut out = format!("{} {} {}", rollout.length(), level, rollout.score());
    for &m in rollout.moves() {
        out.push(' ');
        out.push_str(&m.to_string());
    }
    out
}

#[derive(Debug, PartialEq)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed rollout record: {}", self.0)
    }
}

/// Parses the format produced by [`format_rollout`]. Returns the rollout
/// (with its score set) and the recorded level.
pub fn parse_rollout(text: &str) -> Result<(Rollout, usize), ParseError> {
    let mut tokens = text.split_whitespace();
    let length: usize = tokens
        .next()
        .ok_or_else(|| ParseError("missing length".into()))?
        .parse()
        .map_err(|_| ParseError("length is not an integer".into()))?;
    let level: usize = tokens
        .next()
        .ok_or_else(|| ParseError("missing level".into()))?
        .parse()
        .map_err(|_| ParseError("level is not an integer".into()))?;
    let score: f64 = tokens
        .next()
        .ok_or_else(|| ParseError("missing score".into()))?
        .parse()
        .map_err(|_| ParseError("score is not a float".into()))?;

    let mut rollout = Rollout::with_capacity(length);
    for _ in 0..length {
        let code: MoveCode = tokens
            .next()
            .ok_or_else(|| ParseError("fewer moves than declared length".into()))?
            .parse()
            .map_err(|_| ParseError("move code is not an integer".into()))?;
        rollout.add_move(code);
    }
    rollout.set_score(score);
    Ok((rollout, level))
}

pub fn store(path: &Path, rollout: &Rollout, level: usize) -> io::Result<()> {
    fs::write(path, format_rollout(rollout, level))
}

pub fn load(path: &Path) -> io::Result<(Rollout, usize)> {
    let text = fs::read_to_string(path)?;
    parse_rollout(&text).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

/// Loads any rollout at `path`, compares scores, and rewrites only if
/// `candidate` is strictly higher, guarded by a lockfile taken as a single
/// non-blocking create-new attempt (matching the original's non-blocking
/// intent rather than a real blocking file lock).
///
/// Returns `true` if `candidate` was written.
pub fn compare_and_swap(
    path: &Path,
    lockfile: &Path,
    candidate: &Rollout,
    level: usize,
) -> io::Result<bool> {
    let _lock = match fs::OpenOptions::new().create_new(true).write(true).open(lockfile) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(err),
    };

    let should_write = match load(path) {
        Ok((existing, _)) => candidate.score() > existing.score(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => true,
        Err(err) => {
            let _ = fs::remove_file(lockfile);
            return Err(err);
        }
    };

    if should_write {
        store(path, candidate, level)?;
    }

    fs::remove_file(lockfile)?;
    Ok(should_write)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_then_parse_round_trips() {
        let mut rollout = Rollout::new();
        rollout.add_move(1);
        rollout.add_move(0);
        rollout.add_move(1);
        rollout.set_score(2.0);
        let text = format_rollout(&rollout, 3);
        let (parsed, level) = parse_rollout(&text).unwrap();
        assert_eq!(level, 3);
        assert_eq!(parsed.length(), 3);
        assert_eq!(parsed.score(), 2.0);
        assert_eq!(parsed.moves(), rollout.moves());
    }

    #[test]
    fn parse_rejects_truncated_records() {
        assert!(parse_rollout("3 0 2.0 1 0").is_err());
    }

    #[test]
    fn compare_and_swap_writes_strictly_higher_scores_only() {
        let dir = std::env::temp_dir().join(format!("nrpa-cas-test-{}", fastrand::u64(..)));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rollout.txt");
        let lockfile = dir.join("rollout.lock");

        let mut low = Rollout::new();
        low.add_move(0);
        low.set_score(1.0);
        assert!(compare_and_swap(&path, &lockfile, &low, 0).unwrap());
        assert!(!lockfile.exists());

        let mut lower = Rollout::new();
        lower.add_move(0);
        lower.set_score(0.5);
        assert!(!compare_and_swap(&path, &lockfile, &lower, 0).unwrap());

        let mut higher = Rollout::new();
        higher.add_move(1);
        higher.set_score(5.0);
        assert!(compare_and_swap(&path, &lockfile, &higher, 0).unwrap());

        let (on_disk, _) = load(&path).unwrap();
        assert_eq!(on_disk.score(), 5.0);

        fs::remove_dir_all(&dir).unwrap();
    }
}
