use anyhow::{Result, bail};
use recall_game::{Difficulty, encode_share_code, parse_share_code};
use std::collections::HashMap;

/// Seed metadata resolved from the command line.
#[derive(Debug, Clone)]
pub struct SeedInfo {
    pub seed: u64,
    pub code: Option<String>,
    pub source_difficulty: Option<Difficulty>,
}

impl SeedInfo {
    #[must_use]
    pub const fn from_numeric(seed: u64) -> Self {
        Self {
            seed,
            code: None,
            source_difficulty: None,
        }
    }

    #[must_use]
    pub const fn from_share_code(seed: u64, difficulty: Difficulty, code: String) -> Self {
        Self {
            seed,
            code: Some(code),
            source_difficulty: Some(difficulty),
        }
    }

    /// Share codes pin their own tier; numeric seeds run on every tier.
    #[must_use]
    pub fn matches_difficulty(&self, difficulty: Difficulty) -> bool {
        self.source_difficulty.is_none_or(|source| source == difficulty)
    }

    #[must_use]
    pub fn share_code_for(&self, difficulty: Difficulty) -> String {
        if let (Some(code), Some(source)) = (&self.code, self.source_difficulty)
            && source == difficulty
        {
            return code.clone();
        }
        encode_share_code(difficulty, self.seed)
    }
}

/// Resolve CLI seed tokens into canonical seed metadata.
///
/// Accepts literal integers and share codes such as `MD-07-74`.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut deduped: Vec<SeedInfo> = Vec::new();
    let mut index: HashMap<(u64, Option<Difficulty>), usize> = HashMap::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }

        let info = if let Ok(value) = token.parse::<i64>() {
            SeedInfo::from_numeric(value.unsigned_abs())
        } else if let Ok(value) = token.parse::<u64>() {
            SeedInfo::from_numeric(value)
        } else if let Some((difficulty, seed)) = parse_share_code(token) {
            SeedInfo::from_share_code(seed, difficulty, token.to_uppercase())
        } else {
            bail!("Unrecognized seed token: {token}");
        };

        let key = (info.seed, info.source_difficulty);
        if !index.contains_key(&key) {
            index.insert(key, deduped.len());
            deduped.push(info);
        }
    }

    if deduped.is_empty() {
        deduped.push(SeedInfo::from_numeric(1337));
    }

    Ok(deduped)
}
