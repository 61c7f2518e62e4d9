use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    // Default config carries no API key.
    assert!(result.warnings.iter().any(|w| w.path == "embedding.api_key"));
}

#[test]
fn test_validate_zero_max_match_count() {
    let mut config = Config::default();
    config.search.max_match_count = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "search.max_match_count"));
}

#[test]
fn test_validate_default_count_above_max() {
    let mut config = Config::default();
    config.search.default_match_count = 60;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "search.default_match_count"));
}

#[test]
fn test_validate_zero_num_candidates() {
    let mut config = Config::default();
    config.search.num_candidates = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "search.num_candidates"));
}

#[test]
fn test_validate_small_candidate_pool_warning() {
    let mut config = Config::default();
    config.search.num_candidates = 40;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "search.num_candidates"));
}

#[test]
fn test_validate_unknown_provider() {
    let mut config = Config::default();
    config.embedding.provider = "cohere".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "embedding.provider"));
}

#[test]
fn test_validate_zero_dimension() {
    let mut config = Config::default();
    config.embedding.dimension = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "embedding.dimension"));
}

#[test]
fn test_validate_hashing_provider_needs_no_key() {
    let mut config = Config::default();
    config.embedding.provider = "hashing".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(!result.warnings.iter().any(|w| w.path == "embedding.api_key"));
}

#[test]
fn test_require_valid_reports_first_error() {
    let mut config = Config::default();
    config.search.max_match_count = 0;

    match ConfigValidator::require_valid(&config) {
        Err(ConfigError::InvalidValue { field, .. }) => {
            assert_eq!(field, "search.max_match_count");
        }
        other => panic!("Expected InvalidValue, got {:?}", other),
    }
}

#[test]
fn test_require_valid_returns_warnings() {
    let config = Config::default();
    let warnings = ConfigValidator::require_valid(&config).unwrap();
    assert!(!warnings.is_empty());
}
