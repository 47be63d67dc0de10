/// Input validation for path and query parameters
use riftwatch_proxy::MatchPage;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Missing required parameter: {0}")]
    Missing(&'static str),

    #[error("Region code has invalid format (expected a short lowercase code like 'na1')")]
    RegionInvalidFormat,

    #[error("Game name too long (max 16 characters, got {0})")]
    GameNameTooLong(usize),

    #[error("Game name contains invalid characters")]
    GameNameInvalidChars,

    #[error("Tag line too long (max 5 characters, got {0})")]
    TagLineTooLong(usize),

    #[error("Tag line contains invalid characters (only alphanumeric allowed)")]
    TagLineInvalidChars,

    #[error("{0} has invalid format")]
    IdentifierInvalid(&'static str),

    #[error("Invalid {0}: expected a non-negative integer")]
    NotANumber(&'static str),

    #[error("Invalid count: must be between 1 and {max}, got {actual}")]
    CountOutOfRange { max: u32, actual: u32 },
}

const MAX_REGION_LEN: usize = 8;
const MAX_GAME_NAME_LEN: usize = 16;
const MAX_TAG_LINE_LEN: usize = 5;
const MAX_IDENTIFIER_LEN: usize = 128;

/// Validates a region code and returns it lowercased
///
/// Whether the code is actually known is the region router's call.
pub fn validate_region(region: &str) -> Result<String, ValidationError> {
    let region = region.trim();
    if region.is_empty() {
        return Err(ValidationError::Missing("region"));
    }
    if region.len() > MAX_REGION_LEN || !region.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::RegionInvalidFormat);
    }
    Ok(region.to_ascii_lowercase())
}

/// Validates a Riot ID game name
///
/// Rules:
/// - Cannot be empty
/// - Max 16 characters
/// - Letters, digits, spaces, '_' and '.' only
pub fn validate_game_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Missing("gameName"));
    }

    let len = name.chars().count();
    if len > MAX_GAME_NAME_LEN {
        return Err(ValidationError::GameNameTooLong(len));
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '_' || c == '.')
    {
        return Err(ValidationError::GameNameInvalidChars);
    }

    Ok(())
}

/// Validates a Riot ID tag line (the part after '#')
pub fn validate_tag_line(tag: &str) -> Result<(), ValidationError> {
    if tag.is_empty() {
        return Err(ValidationError::Missing("tagLine"));
    }

    let len = tag.chars().count();
    if len > MAX_TAG_LINE_LEN {
        return Err(ValidationError::TagLineTooLong(len));
    }

    if !tag.chars().all(|c| c.is_alphanumeric()) {
        return Err(ValidationError::TagLineInvalidChars);
    }

    Ok(())
}

/// Validates an opaque upstream identifier (PUUID, summoner ID, match ID)
pub fn validate_identifier(name: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::Missing(name));
    }

    if value.len() > MAX_IDENTIFIER_LEN
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::IdentifierInvalid(name));
    }

    Ok(())
}

/// Parses optional `start` / `count` query values into a match page
pub fn parse_match_page(
    start: Option<&str>,
    count: Option<&str>,
) -> Result<MatchPage, ValidationError> {
    let defaults = MatchPage::default();

    let start = match start.filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ValidationError::NotANumber("start"))?,
        None => defaults.start,
    };

    let count = match count.filter(|s| !s.is_empty()) {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| ValidationError::NotANumber("count"))?,
        None => defaults.count,
    };

    if count == 0 || count > MatchPage::MAX_COUNT {
        return Err(ValidationError::CountOutOfRange {
            max: MatchPage::MAX_COUNT,
            actual: count,
        });
    }

    Ok(MatchPage::new(start, count))
}
