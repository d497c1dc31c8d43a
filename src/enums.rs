use std::fmt;
use std::str::FromStr;

use serde::{ Deserialize, Serialize };

use crate::error::AppError;

// ─── TokenSource ─────────────────────────────────────────────────────

/// Venues a token can be discovered on. The `token.source` column stores the
/// display name as free text, so unknown venues are still accepted there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenSource {
    Raydium,
    Orca,
    Jupiter,
    PumpFun,
    Moonshot,
}

impl TokenSource {
    /// Canonical string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSource::Raydium => "Raydium",
            TokenSource::Orca => "Orca",
            TokenSource::Jupiter => "Jupiter",
            TokenSource::PumpFun => "Pump.fun",
            TokenSource::Moonshot => "Moonshot",
        }
    }

    pub fn all() -> &'static [TokenSource] {
        &[
            TokenSource::Raydium,
            TokenSource::Orca,
            TokenSource::Jupiter,
            TokenSource::PumpFun,
            TokenSource::Moonshot,
        ]
    }
}

impl fmt::Display for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "raydium" => Ok(TokenSource::Raydium),
            "orca" => Ok(TokenSource::Orca),
            "jupiter" => Ok(TokenSource::Jupiter),
            "pump.fun" | "pumpfun" => Ok(TokenSource::PumpFun),
            "moonshot" => Ok(TokenSource::Moonshot),
            _ => Err(AppError::Validation(format!("Unknown token source: {}", s))),
        }
    }
}
