//! Utility functions for xtask commands

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use beam_content::ContentFactory;
use beam_core::Position;

/// Parses `X,Y` into a position.
pub fn parse_position(s: &str) -> Result<Position> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| anyhow!("expected X,Y but got '{}'", s))?;
    let x = x
        .trim()
        .parse()
        .with_context(|| format!("invalid x coordinate in '{}'", s))?;
    let y = y
        .trim()
        .parse()
        .with_context(|| format!("invalid y coordinate in '{}'", s))?;
    Ok(Position::new(x, y))
}

/// Content factory over `data_dir`, or over the bundled data when unset.
pub fn factory(data_dir: Option<PathBuf>) -> ContentFactory {
    match data_dir {
        Some(dir) => ContentFactory::new(dir),
        None => ContentFactory::bundled(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinates() {
        assert_eq!(parse_position("3,4").unwrap(), Position::new(3, 4));
        assert_eq!(parse_position(" -1 , 2").unwrap(), Position::new(-1, 2));
        assert!(parse_position("3").is_err());
        assert!(parse_position("a,b").is_err());
    }
}
